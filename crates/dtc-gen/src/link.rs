//! External assemble and link step.
//!
//! The emitter produces a text listing; an external assembler and linker
//! finish the job: `nasm -f elf64 <out>.asm` followed by `ld <out>.o -o
//! <out>`.

use std::path::Path;
use std::process::Command;

use crate::error::{EmitError, Result};

/// Assemble `asm_path` and link the resulting object into `output`.
///
/// Both tools must be on `PATH`; a missing tool surfaces as the spawn's
/// I/O error, a failing one as [`EmitError::ToolFailed`].
pub fn assemble_and_link(asm_path: &Path, obj_path: &Path, output: &Path) -> Result<()> {
    run(Command::new("nasm").args(["-f", "elf64"]).arg(asm_path), "nasm")?;
    run(
        Command::new("ld").arg(obj_path).arg("-o").arg(output),
        "ld",
    )
}

fn run(command: &mut Command, tool: &str) -> Result<()> {
    let status = command.status()?;
    if !status.success() {
        return Err(EmitError::ToolFailed {
            tool: tool.to_string(),
            status,
        });
    }
    Ok(())
}
