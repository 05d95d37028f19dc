//! dtc-drv - Compiler driver.
//!
//! The driver owns everything around the core pipeline: command-line
//! parsing, the file-registry session, the line loop feeding the lexer, and
//! the final assemble/link step. Compilation itself is strictly
//! single-threaded and synchronous; one input file is processed end to end
//! on the calling thread.
//!
//! Pipeline:
//!
//! ```text
//! source file --(line loop)--> tokens --> AST --> NASM text --> nasm/ld
//! ```
//!
//! Diagnostics from the lexer or parser propagate here untouched; the
//! driver is the single catch point that renders and prints them.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::bail;
use dtc_gen::{assemble_and_link, AsmGenerator, EmitError};
use dtc_lex::{tokenize, Token};
use dtc_util::{Diagnostic, SourceRegistry};

/// What the driver should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitKind {
    /// Stop after writing `<output>.asm`.
    Asm,
    /// Assemble and link a full executable (the default).
    #[default]
    Executable,
}

/// Compiler configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input source file.
    pub input: PathBuf,
    /// Output executable path; intermediates are `<output>.asm` and
    /// `<output>.o`.
    pub output: PathBuf,
    /// What to produce.
    pub emit: EmitKind,
    /// Log each phase to stderr.
    pub verbose: bool,
}

impl Config {
    /// Parse command-line arguments (without the program name):
    /// `<input> -o <output> [--emit-asm] [--verbose]`.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut input = None;
        let mut output = None;
        let mut emit = EmitKind::default();
        let mut verbose = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-o" => match args.next() {
                    Some(path) => output = Some(PathBuf::from(path)),
                    None => bail!("-o requires an output path"),
                },
                "--emit-asm" => emit = EmitKind::Asm,
                "--verbose" => verbose = true,
                other if !other.starts_with('-') && input.is_none() => {
                    input = Some(PathBuf::from(other));
                }
                other => bail!("unexpected argument '{other}'"),
            }
        }

        match (input, output) {
            (Some(input), Some(output)) => Ok(Config {
                input,
                output,
                emit,
                verbose,
            }),
            _ => bail!("usage: dtc <input> -o <output> [--emit-asm] [--verbose]"),
        }
    }
}

/// Why a compilation stopped.
#[derive(Debug)]
pub enum CompileError {
    /// A lexer or parser diagnostic; rendered in the user-visible format.
    Diagnostic(Diagnostic),
    /// Reading the input or writing an output failed.
    Io(PathBuf, std::io::Error),
    /// The emitter or an external tool failed.
    Emit(EmitError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Diagnostic(diag) => write!(f, "{diag}"),
            CompileError::Io(path, e) => write!(f, "{}: {e}", path.display()),
            CompileError::Emit(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

/// State for one compiler invocation.
pub struct Session {
    pub config: Config,
    /// Registry of source paths for diagnostic rendering.
    pub files: SourceRegistry,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            files: SourceRegistry::new(),
        }
    }

    /// Run the pipeline end to end.
    pub fn compile(&mut self) -> Result<(), CompileError> {
        let input = self.config.input.clone();
        if self.config.verbose {
            eprintln!("Reading: {}", input.display());
        }

        let tokens = self.read_and_lex(&input)?;
        if self.config.verbose {
            eprintln!("Lexed {} tokens", tokens.len());
        }

        let mut ast = dtc_par::build_ast(&tokens).map_err(CompileError::Diagnostic)?;
        if self.config.verbose {
            eprintln!("Parsed {} top-level declarations", ast.len());
        }

        let mut generator = AsmGenerator::new();
        generator.generate(&mut ast).map_err(CompileError::Emit)?;

        let asm_path = path_with_suffix(&self.config.output, ".asm");
        std::fs::write(&asm_path, generator.output())
            .map_err(|e| CompileError::Io(asm_path.clone(), e))?;
        if self.config.verbose {
            eprintln!("Wrote: {}", asm_path.display());
        }

        if self.config.emit == EmitKind::Asm {
            return Ok(());
        }

        let obj_path = path_with_suffix(&self.config.output, ".o");
        assemble_and_link(&asm_path, &obj_path, &self.config.output)
            .map_err(CompileError::Emit)?;
        if self.config.verbose {
            eprintln!("Linked: {}", self.config.output.display());
        }
        Ok(())
    }

    /// Register the input and feed it to the lexer line by line with
    /// 1-based line numbers, tolerating CRLF endings.
    fn read_and_lex(&mut self, input: &Path) -> Result<Vec<Token>, CompileError> {
        let file = File::open(input).map_err(|e| CompileError::Io(input.to_path_buf(), e))?;
        let file_id = self.files.register(input.display().to_string());

        let mut tokens = Vec::new();
        let mut line_num = 0u32;
        for line in BufReader::new(file).lines() {
            let mut line = line.map_err(|e| CompileError::Io(input.to_path_buf(), e))?;
            if line.ends_with('\r') {
                line.pop();
            }
            line_num += 1;
            tokenize(&line, line_num, file_id, &mut tokens)
                .map_err(CompileError::Diagnostic)?;
        }
        Ok(tokens)
    }
}

/// `<path><suffix>`, keeping any existing extension (`out` -> `out.asm`).
fn path_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// CLI entry point; returns the process exit code.
///
/// Exit codes: 0 on success, 1 when compilation or an external tool fails
/// (the diagnostic is printed to stdout in its rendered form), 2 for usage
/// and I/O failures.
pub fn run(args: impl IntoIterator<Item = String>) -> i32 {
    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };

    let mut session = Session::new(config);
    match session.compile() {
        Ok(()) => 0,
        Err(CompileError::Diagnostic(diag)) => {
            println!("{}", diag.render(&session.files));
            1
        }
        Err(CompileError::Io(path, e)) => {
            eprintln!("error: {}: {e}", path.display());
            2
        }
        Err(CompileError::Emit(e)) => {
            eprintln!("error: {e}");
            1
        }
    }
}
