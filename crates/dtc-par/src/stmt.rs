//! Statement parsing.
//!
//! The statement parser walks a token range top to bottom and appends the
//! parsed top-level nodes to a parent. It recognizes exactly three shapes at
//! statement position: function definitions, variable declarations, and
//! `return` statements; anything else is a syntax error. Expression
//! subranges are handed to [`parse_expression`] and function bodies recurse
//! back into [`parse_into`].

use dtc_lex::{Token, TokenKind};
use dtc_util::{Diagnostic, Result};

use crate::ast::{Node, NodeKind, Param};
use crate::expr::parse_expression;

/// Parse a complete token vector into an owning `Root` node.
///
/// An empty token vector (a file of blank lines and comments) yields an
/// empty root.
pub fn build_ast(tokens: &[Token]) -> Result<Node> {
    let mut root = Node::root();
    if !tokens.is_empty() {
        parse_into(tokens, 0, tokens.len() - 1, &mut root)?;
    }
    Ok(root)
}

/// Parse the inclusive token range `[start, end]`, appending each parsed
/// statement to `parent`.
///
/// On failure `parent` keeps the statements parsed before the offending
/// one; the caller drops the whole tree on the error path.
pub fn parse_into(tokens: &[Token], start: usize, end: usize, parent: &mut Node) -> Result<()> {
    let mut i = start;
    while i <= end {
        let tok = &tokens[i];
        match tok.kind {
            k if k.is_primitive_type() => {
                i = parse_declaration(tokens, i, end, parent)?;
            }
            TokenKind::Return => {
                i = parse_return(tokens, i, end, parent)?;
            }
            _ => return Err(Diagnostic::syntax(tok.loc, &tok.raw)),
        }
    }
    Ok(())
}

/// A statement beginning with a primitive type name: either a function
/// definition or a variable declaration, decided by the token after the
/// name. Returns the index one past the statement.
fn parse_declaration(
    tokens: &[Token],
    start: usize,
    end: usize,
    parent: &mut Node,
) -> Result<usize> {
    let type_tok = &tokens[start];

    // The type name must be followed by an identifier...
    if start + 1 > end || tokens[start + 1].kind != TokenKind::Identifier {
        return Err(Diagnostic::syntax(type_tok.loc, &type_tok.raw));
    }
    let name_tok = &tokens[start + 1];

    // ...and the token after the identifier picks the statement shape.
    let shape = if start + 2 <= end {
        tokens[start + 2].kind
    } else {
        return Err(Diagnostic::syntax(name_tok.loc, &name_tok.raw));
    };
    match shape {
        TokenKind::LParen => parse_function(tokens, start, end, parent),
        TokenKind::Assign => parse_variable(tokens, start, end, parent),
        _ => Err(Diagnostic::syntax(name_tok.loc, &name_tok.raw)),
    }
}

/// Function definition: `type name ( params ) { body }`.
fn parse_function(tokens: &[Token], start: usize, end: usize, parent: &mut Node) -> Result<usize> {
    let open_paren = start + 2;
    let end_paren = match find_group_end(tokens, open_paren, end, TokenKind::LParen, TokenKind::RParen)
    {
        Some(idx) => idx,
        None => return Err(Diagnostic::unclosed_group(tokens[open_paren].loc)),
    };

    // The signature must be followed by the body's opening brace.
    if end_paren + 1 > end {
        let close = &tokens[end_paren];
        return Err(Diagnostic::syntax(close.loc, &close.raw));
    }
    let open_brace = end_paren + 1;
    if tokens[open_brace].kind != TokenKind::LBrace {
        let tok = &tokens[open_brace];
        return Err(Diagnostic::syntax(tok.loc, &tok.raw));
    }
    let end_brace = match find_group_end(tokens, open_brace, end, TokenKind::LBrace, TokenKind::RBrace)
    {
        Some(idx) => idx,
        None => return Err(Diagnostic::unclosed_group(tokens[open_brace].loc)),
    };

    let mut func = Node::new(
        NodeKind::Function {
            name: tokens[start + 1].raw.clone(),
            return_type: tokens[start].kind,
            params: parse_params(tokens, start + 3, end_paren)?,
            assembler_id: None,
        },
        &tokens[start],
    );

    // Body tokens sit strictly between the braces.
    if open_brace + 1 <= end_brace - 1 {
        parse_into(tokens, open_brace + 1, end_brace - 1, &mut func)?;
    }

    parent.push(func);
    Ok(end_brace + 1)
}

/// Parameters between the parens appear as `(type, name, comma)` triples
/// with no trailing comma.
fn parse_params(tokens: &[Token], start: usize, end_paren: usize) -> Result<Vec<Param>> {
    let mut params = Vec::new();
    let mut i = start;
    while i < end_paren {
        let ty = &tokens[i];
        if !ty.kind.is_primitive_type() {
            return Err(Diagnostic::syntax(ty.loc, &ty.raw));
        }
        let name = &tokens[i + 1];
        if name.kind != TokenKind::Identifier {
            return Err(Diagnostic::syntax(name.loc, &name.raw));
        }
        if i + 2 != end_paren {
            let sep = &tokens[i + 2];
            if sep.kind != TokenKind::Comma {
                return Err(Diagnostic::syntax(sep.loc, &sep.raw));
            }
            if i + 3 == end_paren {
                // Trailing comma with no parameter after it.
                return Err(Diagnostic::syntax(sep.loc, &sep.raw));
            }
        }
        params.push(Param {
            name: name.raw.clone(),
            ty: ty.kind,
        });
        i += 3;
    }
    Ok(params)
}

/// Variable declaration: `type name = initializer ;`.
fn parse_variable(tokens: &[Token], start: usize, end: usize, parent: &mut Node) -> Result<usize> {
    let semi = match find_semicolon(tokens, start + 2, end) {
        Some(idx) => idx,
        // Missing terminator: report the last consumed token.
        None => return Err(Diagnostic::syntax(tokens[end].loc, &tokens[end].raw)),
    };

    let mut var = Node::new(
        NodeKind::Variable {
            name: tokens[start + 1].raw.clone(),
            ty: tokens[start].kind,
        },
        &tokens[start],
    );

    // The initializer sits strictly between the `=` and the `;`; an empty
    // one reports at the semicolon via the expression parser.
    var.push(parse_expression(tokens, start + 3, semi - 1)?);
    parent.push(var);
    Ok(semi + 1)
}

/// Return statement: `return [expression] ;`.
fn parse_return(tokens: &[Token], start: usize, end: usize, parent: &mut Node) -> Result<usize> {
    let semi = match find_semicolon(tokens, start, end) {
        Some(idx) => idx,
        None => return Err(Diagnostic::syntax(tokens[end].loc, &tokens[end].raw)),
    };

    let mut ret = Node::new(NodeKind::Return, &tokens[start]);
    if start + 1 < semi {
        ret.push(parse_expression(tokens, start + 1, semi - 1)?);
    }
    parent.push(ret);
    Ok(semi + 1)
}

/// Index of the closer matching the opener at `open`, counting nesting, or
/// `None` if the group never closes within `[open, end]`.
fn find_group_end(
    tokens: &[Token],
    open: usize,
    end: usize,
    opener: TokenKind,
    closer: TokenKind,
) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i <= end {
        if tokens[i].kind == opener {
            depth += 1;
        } else if tokens[i].kind == closer {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Index of the first `;` in `[start, end]`, if any.
fn find_semicolon(tokens: &[Token], start: usize, end: usize) -> Option<usize> {
    (start..=end).find(|&i| tokens[i].kind == TokenKind::Semicolon)
}
