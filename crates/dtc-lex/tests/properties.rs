//! Property tests for the lexer invariants.

use dtc_lex::{tokenize, Token};
use dtc_util::FileId;
use proptest::prelude::*;

fn lex(line: &str) -> Result<Vec<Token>, dtc_util::Diagnostic> {
    let mut tokens = Vec::new();
    tokenize(line, 1, FileId(0), &mut tokens).map(|_| tokens)
}

/// A lexeme that survives raw-for-raw in the token stream (strings and char
/// literals rewrite their raw text, so they are excluded here).
fn faithful_lexeme() -> impl Strategy<Value = String> {
    prop_oneof![
        // identifiers
        "[a-zA-Z_$][a-zA-Z0-9_$]{0,8}",
        // integer and double literals
        "[0-9]{1,6}",
        "[0-9]{1,4}\\.[0-9]{1,4}",
        // a sampling of fixed lexemes across every category
        prop::sample::select(vec![
            ";", "(", ")", "[", "]", "{", "}", ",", "return", "if", "elif", "else", "while",
            "for", "int", "bool", "char", "double", "string", "true", "false", "null", "<",
            "<=", ">", ">=", "==", "!=", "|", "&", "^", "||", "&&", "<<", ">>", "+", "-", "*",
            "/", "%", "++", "--", "~", "!", "=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=",
            "|=", "&=", "~=", "^=",
        ])
        .prop_map(str::to_string),
    ]
}

proptest! {
    /// Concatenating raw fields and discarding whitespace reproduces the
    /// input line character for character.
    #[test]
    fn raw_concatenation_reproduces_line(lexemes in prop::collection::vec(faithful_lexeme(), 0..12)) {
        let line = lexemes.join(" ");
        let tokens = lex(&line).expect("whitespace-separated lexemes always lex");
        let concatenated: String = tokens.iter().map(|t| t.raw.as_str()).collect();
        let stripped: String = line.split_whitespace().collect();
        prop_assert_eq!(concatenated, stripped);
    }

    /// Every token's column is within the line and its line number is the
    /// one supplied by the caller.
    #[test]
    fn locations_stay_in_bounds(
        lexemes in prop::collection::vec(faithful_lexeme(), 1..10),
        line_num in 1u32..10_000,
    ) {
        let line = lexemes.join("  ");
        let mut tokens = Vec::new();
        tokenize(&line, line_num, FileId(3), &mut tokens).expect("line should lex");
        for token in &tokens {
            prop_assert!(token.loc.col >= 1);
            prop_assert!((token.loc.col as usize) <= line.len());
            prop_assert_eq!(token.loc.line, line_num);
            prop_assert_eq!(token.loc.file, FileId(3));
        }
    }

    /// Tokens come out in left-to-right source order.
    #[test]
    fn tokens_emitted_in_source_order(lexemes in prop::collection::vec(faithful_lexeme(), 1..10)) {
        let line = lexemes.join(" ");
        let tokens = lex(&line).expect("line should lex");
        let cols: Vec<_> = tokens.iter().map(|t| t.loc.col).collect();
        let mut sorted = cols.clone();
        sorted.sort_unstable();
        prop_assert_eq!(cols, sorted);
    }

    /// The lexer never panics on arbitrary printable input; it either
    /// produces tokens or reports a diagnostic.
    #[test]
    fn lexer_total_on_printable_ascii(line in "[ -~]{0,40}") {
        let _ = lex(&line);
    }
}
