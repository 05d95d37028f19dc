//! dtc-lex - Lexical analysis for the DT language.
//!
//! The lexer turns one physical source line at a time into tokens carrying
//! their kind, raw lexeme text, and source location. The driver owns the
//! line loop; see [`tokenize`].

pub mod lexer;
pub mod token;

pub use lexer::tokenize;
pub use token::{Token, TokenKind};
