//! dtc-par - Parsing for the DT language.
//!
//! The parser turns the lexer's token vector into a tree of owned [`Node`]s:
//! [`build_ast`] walks top-level declarations, delegating expression
//! subranges to [`parse_expression`] and function bodies back to itself. On
//! any diagnostic the partially constructed tree is dropped and the error
//! propagates to the driver untouched.

pub mod ast;
pub mod expr;
pub mod stmt;

pub use ast::{Node, NodeKind, Param};
pub use expr::parse_expression;
pub use stmt::{build_ast, parse_into};
