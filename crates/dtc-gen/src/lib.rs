//! dtc-gen - Assembly generation for the DT compiler.
//!
//! Turns a parsed AST into an x86-64 System V assembly listing in NASM
//! syntax and drives the external assembler and linker. The emitter is
//! deliberately thin: it lowers returns of integer-shaped expressions,
//! local variable slots, and string literal addresses; semantic analysis
//! happens in no phase of this compiler.

pub mod asm;
pub mod error;
pub mod link;

pub use asm::{mark_strings, AsmGenerator};
pub use error::{EmitError, Result};
pub use link::assemble_and_link;
