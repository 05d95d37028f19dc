//! NASM text generation.
//!
//! Output targets x86-64 System V in NASM syntax, assembled externally with
//! `nasm -f elf64`. String literals land in `.data` as `_LS<i>` with an
//! `_LS<i>_SZ` length constant; functions become `_FD<i>` labels with a
//! standard frame; `_start` calls `main` and exits through `syscall` 60 with
//! the return value in `rdi`.

use dtc_lex::TokenKind;
use dtc_par::{Node, NodeKind};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::error::{EmitError, Result};

/// Prefix for string literals in `.data` (`_LS1`, `_LS2`, ...).
const STR_PREFIX: &str = "_LS";
/// Suffix for a string's length constant (`_LS1_SZ`).
const STR_LEN_SUFFIX: &str = "_SZ";
/// Prefix for function labels in `.text` (`_FD1`, `_FD2`, ...).
const FUNC_PREFIX: &str = "_FD";
/// Instruction indent.
const TAB: &str = "    ";

/// Walk the tree depth-first, assigning 1-based `assembler_id`s to string
/// literals in encounter order and collecting their bytes.
pub fn mark_strings(node: &mut Node, strings: &mut Vec<String>) {
    for i in 0..node.len() {
        let child = node.child_mut(i);
        if let NodeKind::StrLit {
            value,
            assembler_id,
        } = &mut child.kind
        {
            strings.push(value.clone());
            *assembler_id = Some(strings.len() as u64);
        } else {
            mark_strings(child, strings);
        }
    }
}

/// Per-function entry in the emitter's declaration-order table.
struct FuncInfo {
    id: u64,
    param_count: usize,
}

/// Generates the complete assembly listing for one compilation.
pub struct AsmGenerator {
    output: String,
}

impl AsmGenerator {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// The assembly text produced so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Emit the whole program for `root`, assigning assembler ids to string
    /// literals and functions along the way.
    pub fn generate(&mut self, root: &mut Node) -> Result<()> {
        self.output.push_str("global _start\n");

        // .data: every string literal in the tree, marked with its id.
        self.output.push_str("section .data\n");
        let mut strings = Vec::new();
        mark_strings(root, &mut strings);
        for (i, bytes) in strings.iter().enumerate() {
            let name = format!("{}{}", STR_PREFIX, i + 1);
            self.output
                .push_str(&format!("{TAB}{name}: DB '{bytes}'\n"));
            self.output
                .push_str(&format!("{TAB}{name}{STR_LEN_SUFFIX} EQU $ - {name}\n"));
        }

        self.output.push_str("section .text\n");

        // Index the top-level functions in declaration order; ids are
        // 1-based and the first zero-parameter `main` becomes the entry.
        let mut funcs: IndexMap<String, FuncInfo> = IndexMap::new();
        let mut next_id = 1u64;
        for i in 0..root.len() {
            let child = root.child_mut(i);
            if let NodeKind::Function {
                name,
                params,
                assembler_id,
                ..
            } = &mut child.kind
            {
                let id = next_id;
                next_id += 1;
                *assembler_id = Some(id);
                funcs.entry(name.clone()).or_insert(FuncInfo {
                    id,
                    param_count: params.len(),
                });
            }
        }
        let main_id = funcs
            .get("main")
            .filter(|info| info.param_count == 0)
            .map(|info| info.id)
            .ok_or(EmitError::MissingMain)?;

        // Function bodies.
        for i in 0..root.len() {
            let child = root.child(i);
            if let NodeKind::Function { assembler_id, .. } = &child.kind {
                let id = assembler_id
                    .ok_or_else(|| EmitError::Internal("function without assembler id".into()))?;
                self.label(&format!("{FUNC_PREFIX}{id}"));
                self.line("push rbp");
                self.line("mov rbp, rsp");
                self.compile_function(child)?;
                self.line("mov rsp, rbp");
                self.line("pop rbp");
                self.line("ret");
            }
        }

        // Entry point: call main, exit with its return value.
        self.label("_start");
        self.line("xor rdi, rdi");
        self.line(&format!("call {FUNC_PREFIX}{main_id}"));
        self.line("mov rdi, rax");
        self.line("mov rax, 60");
        self.line("syscall");

        Ok(())
    }

    /// Lower the statements of one function body.
    fn compile_function(&mut self, func: &Node) -> Result<()> {
        // rbp-relative slot for each declared variable, in declaration
        // order; slot n lives at [rbp - 8n].
        let mut offsets: FxHashMap<String, u64> = FxHashMap::default();

        for child in func.children() {
            match &child.kind {
                NodeKind::Return => {
                    if child.is_empty() {
                        self.line("mov rax, 0");
                    } else {
                        self.resolve_expression(child.child(0), &offsets)?;
                    }
                }
                NodeKind::Variable { name, .. } => {
                    self.resolve_expression(child.child(0), &offsets)?;
                    self.line("push rax");
                    let slot = offsets.len() as u64 + 1;
                    offsets.insert(name.clone(), slot * 8);
                }
                other => {
                    return Err(EmitError::Unsupported(format!(
                        "statement {other:?} in function body"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Emit code leaving the expression's value in `rax`.
    fn resolve_expression(&mut self, node: &Node, offsets: &FxHashMap<String, u64>) -> Result<()> {
        match &node.kind {
            NodeKind::Expr => self.resolve_expression(node.child(0), offsets),

            NodeKind::IntLit(v) => {
                self.line(&format!("mov rax, {v}"));
                Ok(())
            }
            NodeKind::BoolLit(b) => {
                self.line(&format!("mov rax, {}", u8::from(*b)));
                Ok(())
            }
            NodeKind::CharLit(c) => {
                self.line(&format!("mov rax, {}", *c as u32));
                Ok(())
            }
            NodeKind::NullLit => {
                self.line("mov rax, 0");
                Ok(())
            }
            NodeKind::StrLit { assembler_id, .. } => {
                let id = assembler_id
                    .ok_or_else(|| EmitError::Internal("string literal without assembler id".into()))?;
                self.line(&format!("mov rax, {STR_PREFIX}{id}"));
                Ok(())
            }

            NodeKind::Identifier { name } => match offsets.get(name) {
                Some(offset) => {
                    self.line(&format!("mov rax, [rbp - {offset}]"));
                    Ok(())
                }
                None => Err(EmitError::UnknownVariable(name.clone())),
            },

            NodeKind::UnaryExpr { op, .. } => {
                self.resolve_expression(node.child(0), offsets)?;
                match op {
                    TokenKind::OpAdd => {}
                    TokenKind::OpSub => self.line("neg rax"),
                    TokenKind::OpBitNot => self.line("not rax"),
                    TokenKind::OpBoolNot => {
                        self.line("cmp rax, 0");
                        self.line("sete al");
                        self.line("movzx rax, al");
                    }
                    other => {
                        return Err(EmitError::Unsupported(format!("unary operator {other:?}")))
                    }
                }
                Ok(())
            }

            NodeKind::BinExpr { op } => {
                // Left to stack, right to rbx, combine into rax.
                self.resolve_expression(node.child(0), offsets)?;
                self.line("push rax");
                self.resolve_expression(node.child(1), offsets)?;
                self.line("mov rbx, rax");
                self.line("pop rax");
                match op {
                    TokenKind::OpAdd => self.line("add rax, rbx"),
                    TokenKind::OpSub => self.line("sub rax, rbx"),
                    TokenKind::OpMul => self.line("imul rax, rbx"),
                    TokenKind::OpDiv => {
                        self.line("cqo");
                        self.line("idiv rbx");
                    }
                    TokenKind::OpMod => {
                        self.line("cqo");
                        self.line("idiv rbx");
                        self.line("mov rax, rdx");
                    }
                    TokenKind::OpBitAnd | TokenKind::OpBoolAnd => self.line("and rax, rbx"),
                    TokenKind::OpBitOr | TokenKind::OpBoolOr => self.line("or rax, rbx"),
                    TokenKind::OpBitXor => self.line("xor rax, rbx"),
                    TokenKind::OpLt => self.compare("setl"),
                    TokenKind::OpLte => self.compare("setle"),
                    TokenKind::OpGt => self.compare("setg"),
                    TokenKind::OpGte => self.compare("setge"),
                    TokenKind::OpEq => self.compare("sete"),
                    TokenKind::OpNeq => self.compare("setne"),
                    other => {
                        return Err(EmitError::Unsupported(format!("binary operator {other:?}")))
                    }
                }
                Ok(())
            }

            other => Err(EmitError::Unsupported(format!("expression {other:?}"))),
        }
    }

    fn compare(&mut self, setcc: &str) {
        self.line("cmp rax, rbx");
        self.line(&format!("{setcc} al"));
        self.line("movzx rax, al");
    }

    fn line(&mut self, instruction: &str) {
        self.output.push_str(TAB);
        self.output.push_str(instruction);
        self.output.push('\n');
    }

    fn label(&mut self, name: &str) {
        self.output.push_str(name);
        self.output.push_str(":\n");
    }
}

impl Default for AsmGenerator {
    fn default() -> Self {
        Self::new()
    }
}
