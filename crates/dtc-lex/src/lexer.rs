//! Line-oriented lexer for DT source.
//!
//! The driver feeds the lexer one physical line at a time together with the
//! 1-based line number and the file's registry id; newline handling lives
//! entirely in that caller loop (trailing `\r` included). Tokens are
//! appended to the caller's vector in left-to-right source order.

use dtc_util::{escape_char, Diagnostic, FileId, Result, SourceLoc};

use crate::token::{Token, TokenKind};

/// Append the tokens of one source line to `tokens`.
///
/// `line_num` is the 1-based physical line number; every emitted token
/// carries it along with the 1-based byte column of its first character.
///
/// # Example
///
/// ```
/// use dtc_lex::{tokenize, TokenKind};
/// use dtc_util::FileId;
///
/// let mut tokens = Vec::new();
/// tokenize("int x = 42;", 1, FileId(0), &mut tokens).unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [
///         TokenKind::TypeInt,
///         TokenKind::Identifier,
///         TokenKind::Assign,
///         TokenKind::LitInt,
///         TokenKind::Semicolon,
///     ]
/// );
/// ```
pub fn tokenize(line: &str, line_num: u32, file: FileId, tokens: &mut Vec<Token>) -> Result<()> {
    LineLexer::new(line, line_num, file).run(tokens)
}

/// Scanner state for a single source line.
struct LineLexer<'a> {
    line: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line_num: u32,
    file: FileId,
}

impl<'a> LineLexer<'a> {
    fn new(line: &'a str, line_num: u32, file: FileId) -> Self {
        Self {
            line,
            bytes: line.as_bytes(),
            pos: 0,
            line_num,
            file,
        }
    }

    /// Location of the byte at the current position (1-based column).
    fn loc_here(&self) -> SourceLoc {
        SourceLoc::new(self.line_num, self.pos as u32 + 1, self.file)
    }

    /// True if the line continues with `text` at the current position.
    fn starts_with(&self, text: &str) -> bool {
        self.bytes[self.pos..].starts_with(text.as_bytes())
    }

    fn run(&mut self, tokens: &mut Vec<Token>) -> Result<()> {
        let len = self.bytes.len();
        while self.pos < len {
            let loc = self.loc_here();
            let b = self.bytes[self.pos];

            // Whitespace delimits tokens and is otherwise ignored.
            if b.is_ascii_whitespace() {
                self.pos += 1;
                continue;
            }

            // Numeric literals. A leading '.' enters here too, which is why
            // a bare dot scans as an (unparseable) int literal rather than
            // the Dot operator.
            if b.is_ascii_digit() || b == b'.' {
                tokens.push(self.lex_number(loc));
                continue;
            }

            if b.is_ascii_alphabetic() {
                if let Some((kind, lexeme)) = self.keyword_here() {
                    self.pos += lexeme.len();
                    tokens.push(Token::new(kind, lexeme, loc));
                    continue;
                }
                // Not a keyword; scanned as an identifier below.
            } else {
                match b {
                    b'"' => {
                        tokens.push(self.lex_string(loc)?);
                        continue;
                    }
                    b'\'' => {
                        tokens.push(self.lex_char_literal(loc)?);
                        continue;
                    }
                    b'#' => {
                        // Comment: discard the rest of the line.
                        self.pos = len;
                        continue;
                    }
                    _ => {
                        if let Some((kind, lexeme)) = self.operator_here() {
                            self.pos += lexeme.len();
                            tokens.push(Token::new(kind, lexeme, loc));
                            continue;
                        }
                        // Not an operator; falls through to the identifier
                        // rule, which rejects it if no identifier byte
                        // follows either.
                    }
                }
            }

            tokens.push(self.lex_identifier(loc)?);
        }
        Ok(())
    }

    /// Maximal `[0-9.]` run starting at the current position.
    ///
    /// The kind is `LitInt` unless a `.` appears in the continuation of the
    /// run; the leading character does not count, so `"."` and `".5"` scan
    /// as `LitInt` and are rejected later by the expression parser.
    fn lex_number(&mut self, loc: SourceLoc) -> Token {
        let start = self.pos;
        let mut kind = TokenKind::LitInt;
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'0'..=b'9' => {}
                b'.' => kind = TokenKind::LitDouble,
                _ => break,
            }
            self.pos += 1;
        }
        Token::new(kind, &self.line[start..self.pos], loc)
    }

    /// Keyword beginning exactly at the current position, if any.
    ///
    /// Matching is a literal prefix match: `"integer"` yields the keyword
    /// `int` followed by the identifier `eger`.
    fn keyword_here(&self) -> Option<(TokenKind, &'static str)> {
        let candidates: &[(&'static str, TokenKind)] = match self.bytes[self.pos] {
            b'b' => &[("bool", TokenKind::TypeBool)],
            b'c' => &[("char", TokenKind::TypeChar)],
            b'd' => &[("double", TokenKind::TypeDouble)],
            b'e' => &[("elif", TokenKind::Elif), ("else", TokenKind::Else)],
            b'f' => &[("for", TokenKind::For), ("false", TokenKind::LitBool)],
            b'i' => &[("if", TokenKind::If), ("int", TokenKind::TypeInt)],
            b'n' => &[("null", TokenKind::LitNull)],
            b'r' => &[("return", TokenKind::Return)],
            b's' => &[("string", TokenKind::TypeStr)],
            b't' => &[("true", TokenKind::LitBool)],
            b'w' => &[("while", TokenKind::While)],
            _ => return None,
        };
        candidates
            .iter()
            .find(|(lexeme, _)| self.starts_with(lexeme))
            .map(|&(lexeme, kind)| (kind, lexeme))
    }

    /// Operator or punctuation beginning at the current position.
    ///
    /// Longest match wins within a starting character: `<<=` before `<<`
    /// before `<=` before `<`.
    fn operator_here(&self) -> Option<(TokenKind, &'static str)> {
        let candidates: &[(&'static str, TokenKind)] = match self.bytes[self.pos] {
            b';' => &[(";", TokenKind::Semicolon)],
            b'(' => &[("(", TokenKind::LParen)],
            b')' => &[(")", TokenKind::RParen)],
            b'[' => &[("[", TokenKind::LBracket)],
            b']' => &[("]", TokenKind::RBracket)],
            b'{' => &[("{", TokenKind::LBrace)],
            b'}' => &[("}", TokenKind::RBrace)],
            b'.' => &[(".", TokenKind::Dot)],
            b',' => &[(",", TokenKind::Comma)],
            b'<' => &[
                ("<<=", TokenKind::AssignLshift),
                ("<<", TokenKind::OpLshift),
                ("<=", TokenKind::OpLte),
                ("<", TokenKind::OpLt),
            ],
            b'>' => &[
                (">>=", TokenKind::AssignRshift),
                (">>", TokenKind::OpRshift),
                (">=", TokenKind::OpGte),
                (">", TokenKind::OpGt),
            ],
            b'+' => &[
                ("++", TokenKind::OpInc),
                ("+=", TokenKind::AssignAdd),
                ("+", TokenKind::OpAdd),
            ],
            b'-' => &[
                ("--", TokenKind::OpDec),
                ("-=", TokenKind::AssignSub),
                ("-", TokenKind::OpSub),
            ],
            b'*' => &[("*=", TokenKind::AssignMul), ("*", TokenKind::OpMul)],
            b'/' => &[("/=", TokenKind::AssignDiv), ("/", TokenKind::OpDiv)],
            b'%' => &[("%=", TokenKind::AssignMod), ("%", TokenKind::OpMod)],
            b'|' => &[
                ("|=", TokenKind::AssignBitOr),
                ("||", TokenKind::OpBoolOr),
                ("|", TokenKind::OpBitOr),
            ],
            b'&' => &[
                ("&=", TokenKind::AssignBitAnd),
                ("&&", TokenKind::OpBoolAnd),
                ("&", TokenKind::OpBitAnd),
            ],
            b'~' => &[("~=", TokenKind::AssignBitNot), ("~", TokenKind::OpBitNot)],
            b'^' => &[("^=", TokenKind::AssignBitXor), ("^", TokenKind::OpBitXor)],
            b'!' => &[("!=", TokenKind::OpNeq), ("!", TokenKind::OpBoolNot)],
            b'=' => &[("==", TokenKind::OpEq), ("=", TokenKind::Assign)],
            _ => return None,
        };
        candidates
            .iter()
            .find(|(lexeme, _)| self.starts_with(lexeme))
            .map(|&(lexeme, kind)| (kind, lexeme))
    }

    /// String literal. `raw` holds the text between the quotes with each
    /// backslash dropped and the following byte copied verbatim; decoding
    /// is deferred to the emitter. Unclosed at end of line is a syntax
    /// error at the opening quote.
    fn lex_string(&mut self, loc: SourceLoc) -> Result<Token> {
        let len = self.bytes.len();
        let mut buf = Vec::new();
        let mut i = self.pos + 1;
        while i < len && self.bytes[i] != b'"' {
            if self.bytes[i] == b'\\' {
                i += 1;
                if i >= len {
                    break;
                }
            }
            buf.push(self.bytes[i]);
            i += 1;
        }
        if i >= len {
            return Err(Diagnostic::syntax(loc, "\""));
        }
        self.pos = i + 1;
        Ok(Token::new(
            TokenKind::LitStr,
            String::from_utf8_lossy(&buf).into_owned(),
            loc,
        ))
    }

    /// Character literal: exactly one byte between single quotes, with an
    /// optional leading backslash for escape forms. `raw` is the decoded
    /// character. Anything else is a syntax error at the opening quote.
    fn lex_char_literal(&mut self, loc: SourceLoc) -> Result<Token> {
        let len = self.bytes.len();
        let i = self.pos;
        if i + 2 < len && self.bytes[i + 2] == b'\'' {
            let c = self.bytes[i + 1] as char;
            self.pos = i + 3;
            return Ok(Token::new(TokenKind::LitChar, c.to_string(), loc));
        }
        if i + 3 < len && self.bytes[i + 1] == b'\\' && self.bytes[i + 3] == b'\'' {
            let c = escape_char(self.bytes[i + 2] as char);
            self.pos = i + 4;
            return Ok(Token::new(TokenKind::LitChar, c.to_string(), loc));
        }
        Err(Diagnostic::syntax(loc, "'"))
    }

    /// Identifier fallback: the maximal `[A-Za-z0-9_$]` run.
    ///
    /// A position where the run is empty is a byte no rule accepts; that is
    /// a syntax error rather than an empty identifier.
    fn lex_identifier(&mut self, loc: SourceLoc) -> Result<Token> {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'$' => self.pos += 1,
                _ => break,
            }
        }
        if self.pos == start {
            let near = self.line[start..]
                .chars()
                .next()
                .map(String::from)
                .unwrap_or_default();
            return Err(Diagnostic::syntax(loc, near));
        }
        Ok(Token::new(
            TokenKind::Identifier,
            &self.line[start..self.pos],
            loc,
        ))
    }
}
