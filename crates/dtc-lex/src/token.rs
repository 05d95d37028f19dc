//! Token definitions for the DT language.

use dtc_util::SourceLoc;

/// The closed set of token categories produced by the lexer.
///
/// `Comment` is reserved in the kind set but never emitted; the lexer
/// consumes `#…` to end of line without producing a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,

    // Keywords
    Return,
    If,
    Elif,
    Else,
    While,
    For,

    // Primitive type names
    TypeBool,
    TypeChar,
    TypeDouble,
    TypeInt,
    TypeStr,

    // Literals
    LitBool,
    LitChar,
    LitDouble,
    LitInt,
    LitNull,
    LitStr,

    /// Anything that is not a keyword, literal, or operator.
    Identifier,

    // Comparison operators (the bitwise and boolean forms share this
    // precedence class; see `is_comp_op`)
    OpLt,
    OpLte,
    OpGt,
    OpGte,
    OpEq,
    OpNeq,
    OpBitOr,
    OpBitAnd,
    OpBitXor,
    OpBoolOr,
    OpBoolAnd,

    // Shifts
    OpLshift,
    OpRshift,

    // Arithmetic
    OpAdd,
    OpSub,
    OpMul,
    OpDiv,
    OpMod,

    // Unary
    OpInc,
    OpDec,
    OpBitNot,
    OpBoolNot,

    // Assignments
    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignMod,
    AssignLshift,
    AssignRshift,
    AssignBitOr,
    AssignBitAnd,
    AssignBitNot,
    AssignBitXor,

    /// Reserved; comments are consumed inline and never reach the parser.
    Comment,
}

impl TokenKind {
    /// True for the five primitive type names (`int`, `bool`, ...).
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::TypeBool
                | TokenKind::TypeChar
                | TokenKind::TypeDouble
                | TokenKind::TypeInt
                | TokenKind::TypeStr
        )
    }

    /// True for the six literal kinds.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::LitBool
                | TokenKind::LitChar
                | TokenKind::LitDouble
                | TokenKind::LitInt
                | TokenKind::LitNull
                | TokenKind::LitStr
        )
    }

    /// True for tokens that can act as a unary operator.
    ///
    /// `+` and `-` appear here as well as in [`is_binary_op`]; the
    /// expression parser disambiguates by position.
    ///
    /// [`is_binary_op`]: Self::is_binary_op
    pub fn is_unary_op(self) -> bool {
        matches!(
            self,
            TokenKind::OpBoolNot
                | TokenKind::OpAdd
                | TokenKind::OpSub
                | TokenKind::OpBitNot
                | TokenKind::OpInc
                | TokenKind::OpDec
        )
    }

    /// True for tokens that can act as a binary operator.
    pub fn is_binary_op(self) -> bool {
        matches!(
            self,
            TokenKind::OpLt
                | TokenKind::OpLte
                | TokenKind::OpGt
                | TokenKind::OpGte
                | TokenKind::OpLshift
                | TokenKind::OpRshift
                | TokenKind::OpAdd
                | TokenKind::OpSub
                | TokenKind::OpMul
                | TokenKind::OpDiv
                | TokenKind::OpMod
                | TokenKind::OpBitOr
                | TokenKind::OpBitAnd
                | TokenKind::OpBitXor
                | TokenKind::OpBoolOr
                | TokenKind::OpBoolAnd
                | TokenKind::OpEq
                | TokenKind::OpNeq
        )
    }

    /// True for the comparison precedence class.
    ///
    /// The bitwise and boolean operators are classified here and bind at
    /// the same level as `==` and `<`.
    pub fn is_comp_op(self) -> bool {
        matches!(
            self,
            TokenKind::OpLt
                | TokenKind::OpLte
                | TokenKind::OpGt
                | TokenKind::OpGte
                | TokenKind::OpBitOr
                | TokenKind::OpBitAnd
                | TokenKind::OpBitXor
                | TokenKind::OpBoolOr
                | TokenKind::OpBoolAnd
                | TokenKind::OpEq
                | TokenKind::OpNeq
        )
    }

    /// True for `=` and every compound assignment operator.
    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::AssignAdd
                | TokenKind::AssignSub
                | TokenKind::AssignMul
                | TokenKind::AssignDiv
                | TokenKind::AssignMod
                | TokenKind::AssignLshift
                | TokenKind::AssignRshift
                | TokenKind::AssignBitOr
                | TokenKind::AssignBitAnd
                | TokenKind::AssignBitNot
                | TokenKind::AssignBitXor
        )
    }

    /// The fixed source lexeme for kinds that have one.
    ///
    /// Identifiers and the numeric/char/string literal kinds carry variable
    /// text and return `None`. `LitBool` returns `"true"`; `"false"` is the
    /// other accepted spelling.
    pub fn canonical_lexeme(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Semicolon => ";",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::TypeBool => "bool",
            TokenKind::TypeChar => "char",
            TokenKind::TypeDouble => "double",
            TokenKind::TypeInt => "int",
            TokenKind::TypeStr => "string",
            TokenKind::LitBool => "true",
            TokenKind::LitNull => "null",
            TokenKind::OpLt => "<",
            TokenKind::OpLte => "<=",
            TokenKind::OpGt => ">",
            TokenKind::OpGte => ">=",
            TokenKind::OpEq => "==",
            TokenKind::OpNeq => "!=",
            TokenKind::OpBitOr => "|",
            TokenKind::OpBitAnd => "&",
            TokenKind::OpBitXor => "^",
            TokenKind::OpBoolOr => "||",
            TokenKind::OpBoolAnd => "&&",
            TokenKind::OpLshift => "<<",
            TokenKind::OpRshift => ">>",
            TokenKind::OpAdd => "+",
            TokenKind::OpSub => "-",
            TokenKind::OpMul => "*",
            TokenKind::OpDiv => "/",
            TokenKind::OpMod => "%",
            TokenKind::OpInc => "++",
            TokenKind::OpDec => "--",
            TokenKind::OpBitNot => "~",
            TokenKind::OpBoolNot => "!",
            TokenKind::Assign => "=",
            TokenKind::AssignAdd => "+=",
            TokenKind::AssignSub => "-=",
            TokenKind::AssignMul => "*=",
            TokenKind::AssignDiv => "/=",
            TokenKind::AssignMod => "%=",
            TokenKind::AssignLshift => "<<=",
            TokenKind::AssignRshift => ">>=",
            TokenKind::AssignBitOr => "|=",
            TokenKind::AssignBitAnd => "&=",
            TokenKind::AssignBitNot => "~=",
            TokenKind::AssignBitXor => "^=",
            TokenKind::LitChar
            | TokenKind::LitDouble
            | TokenKind::LitInt
            | TokenKind::LitStr
            | TokenKind::Identifier
            | TokenKind::Comment => return None,
        })
    }
}

/// One lexeme with its kind, original text, and source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// Token category.
    pub kind: TokenKind,
    /// The original lexeme text (used for literal parsing and error
    /// messages). For char literals this is the decoded character.
    pub raw: String,
    /// Location of the lexeme's first character.
    pub loc: SourceLoc,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, raw: impl Into<String>, loc: SourceLoc) -> Self {
        Self {
            kind,
            raw: raw.into(),
            loc,
        }
    }
}
