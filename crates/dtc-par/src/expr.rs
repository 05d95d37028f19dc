//! Expression parsing.
//!
//! Expressions are parsed in two phases. The token range is first flattened
//! into an `Expr` container holding a provisional child per operand and a
//! childless placeholder per operator, with parenthesized groups reduced
//! recursively. A fixed series of precedence sweeps then rewrites the flat
//! child list in place, each sweep consuming the placeholders of one
//! precedence class:
//!
//! 1. prefix unaries (everything unary except `++`/`--`)
//! 2. `*` `/` `%`
//! 3. `+` `-` as binaries, and `++`/`--` binding an identifier neighbor
//! 4. the comparison class (`<` `<=` `>` `>=` `==` `!=` `|` `&` `^` `||` `&&`)
//! 5. assignments
//!
//! After the sweeps the container holds a single fully reduced tree.

use dtc_lex::{Token, TokenKind};
use dtc_util::{Diagnostic, Result};

use crate::ast::{Node, NodeKind};

/// Parse the inclusive token range `[start, end]` into a reduced `Expr`
/// node.
///
/// On failure every partially constructed node is dropped and the
/// diagnostic carries the offending token's location and lexeme. An empty
/// range is a syntax error at `tokens[start]` (the statement terminator the
/// caller located).
pub fn parse_expression(tokens: &[Token], start: usize, end: usize) -> Result<Node> {
    if start > end || start >= tokens.len() {
        let diag = match tokens.get(start).or_else(|| tokens.last()) {
            Some(tok) => Diagnostic::syntax(tok.loc, &tok.raw),
            None => Diagnostic::syntax(Default::default(), ""),
        };
        return Err(diag);
    }

    let mut container = flatten(tokens, start, end)?;
    combine_prefix_unaries(&mut container)?;
    combine_binaries(&mut container, tokens, end, |op| {
        matches!(op, TokenKind::OpMul | TokenKind::OpDiv | TokenKind::OpMod)
    })?;
    combine_additive_and_inc_dec(&mut container, tokens, end)?;
    combine_binaries(&mut container, tokens, end, TokenKind::is_comp_op)?;
    combine_binaries(&mut container, tokens, end, TokenKind::is_assign_op)?;
    validate_reduced(&container)?;
    Ok(container)
}

/// Phase 1: flatten `[start, end]` into an `Expr` container of provisional
/// children.
fn flatten(tokens: &[Token], start: usize, end: usize) -> Result<Node> {
    let mut container = Node::new(NodeKind::Expr, &tokens[start]);

    let mut i = start;
    while i <= end {
        let tok = &tokens[i];
        match tok.kind {
            // Parenthesized group: find the matching closer by nesting
            // count and reduce the interior recursively.
            TokenKind::LParen => {
                let open = i;
                let mut depth = 1usize;
                let mut j = i + 1;
                while j <= end {
                    match tokens[j].kind {
                        TokenKind::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        TokenKind::LParen => depth += 1,
                        _ => {}
                    }
                    j += 1;
                }
                if depth != 0 {
                    return Err(Diagnostic::unclosed_group(tokens[open].loc));
                }
                container.push(parse_expression(tokens, open + 1, j - 1)?);
                i = j + 1;
                continue;
            }

            TokenKind::LitBool => {
                container.push(Node::new(NodeKind::BoolLit(tok.raw == "true"), tok));
            }
            TokenKind::LitChar => {
                let c = tok
                    .raw
                    .chars()
                    .next()
                    .ok_or_else(|| Diagnostic::syntax(tok.loc, &tok.raw))?;
                container.push(Node::new(NodeKind::CharLit(c), tok));
            }
            TokenKind::LitDouble => {
                let value: f64 = tok
                    .raw
                    .parse()
                    .map_err(|_| Diagnostic::syntax(tok.loc, &tok.raw))?;
                container.push(Node::new(NodeKind::DoubleLit(value), tok));
            }
            TokenKind::LitInt => {
                // Rejects the lexer's lone-dot pseudo-literal among other
                // malformed spellings.
                let value: i64 = tok
                    .raw
                    .parse()
                    .map_err(|_| Diagnostic::syntax(tok.loc, &tok.raw))?;
                container.push(Node::new(NodeKind::IntLit(value), tok));
            }
            TokenKind::LitStr => {
                container.push(Node::new(
                    NodeKind::StrLit {
                        value: tok.raw.clone(),
                        assembler_id: None,
                    },
                    tok,
                ));
            }
            TokenKind::LitNull => {
                container.push(Node::new(NodeKind::NullLit, tok));
            }

            k if k.is_unary_op() => {
                // `+` and `-` are unary only at the start of the range or
                // right after another operator placeholder; between two
                // operands they are binary add/sub.
                let prefix_position = container
                    .children()
                    .last()
                    .map_or(true, Node::is_placeholder);
                if matches!(k, TokenKind::OpAdd | TokenKind::OpSub) && !prefix_position {
                    container.push(Node::new(NodeKind::BinExpr { op: k }, tok));
                } else {
                    container.push(Node::new(
                        NodeKind::UnaryExpr {
                            op: k,
                            is_post: false,
                        },
                        tok,
                    ));
                }
            }

            k if k.is_binary_op() || k.is_assign_op() => {
                container.push(Node::new(NodeKind::BinExpr { op: k }, tok));
            }

            TokenKind::Identifier => {
                container.push(Node::new(
                    NodeKind::Identifier {
                        name: tok.raw.clone(),
                    },
                    tok,
                ));
            }

            _ => return Err(Diagnostic::syntax(tok.loc, &tok.raw)),
        }
        i += 1;
    }

    Ok(container)
}

/// Sweep 1: attach operands to prefix unary placeholders (`!` `~` and
/// unary `+`/`-`; `++`/`--` wait for sweep 3).
///
/// The pass runs right to left so a chain of prefixes (`!~x`) consumes the
/// already-reduced operand to its right.
fn combine_prefix_unaries(container: &mut Node) -> Result<()> {
    let mut i = container.len();
    while i > 0 {
        i -= 1;
        let op = match &container.child(i).kind {
            NodeKind::UnaryExpr { op, .. } => *op,
            _ => continue,
        };
        if matches!(op, TokenKind::OpInc | TokenKind::OpDec) {
            continue;
        }
        if i + 1 >= container.len() {
            let node = container.child(i);
            return Err(Diagnostic::syntax(node.loc, &node.raw));
        }
        let operand = container.remove(i + 1);
        container.child_mut(i).push(operand);
    }
    Ok(())
}

/// A left-to-right binary sweep: each placeholder whose operator satisfies
/// `class` consumes the siblings on either side, and the scan resumes at
/// the element that now follows the reduced node, preserving left-to-right
/// association.
fn combine_binaries(
    container: &mut Node,
    tokens: &[Token],
    end: usize,
    class: impl Fn(TokenKind) -> bool,
) -> Result<()> {
    let mut i = 0;
    while i < container.len() {
        let matched = match &container.child(i).kind {
            NodeKind::BinExpr { op } if container.child(i).is_placeholder() => class(*op),
            _ => false,
        };
        if !matched {
            i += 1;
            continue;
        }
        reduce_binary_at(container, tokens, end, i)?;
        // The reduced node sits at i - 1; index i is already the next
        // unexamined sibling.
    }
    Ok(())
}

/// Attach the siblings around the binary placeholder at `i` as its left and
/// right children.
fn reduce_binary_at(container: &mut Node, tokens: &[Token], end: usize, i: usize) -> Result<()> {
    if i == 0 {
        let node = container.child(i);
        return Err(Diagnostic::syntax(node.loc, &node.raw));
    }
    if i + 1 >= container.len() {
        return Err(missing_operand(tokens, end, container.child(i)));
    }
    let right = container.remove(i + 1);
    let left = container.remove(i - 1);
    let node = container.child_mut(i - 1);
    node.push(left);
    node.push(right);
    Ok(())
}

/// Sweep 3: binary `+`/`-`, and `++`/`--` binding an identifier neighbor.
///
/// For `++`/`--` the previous sibling is preferred; only when the operand
/// is found after the operator is `is_post` set. (So `i++` at the end of an
/// expression binds through the previous-identifier branch and keeps
/// `is_post == false`; the flag records which side the operand was on.)
fn combine_additive_and_inc_dec(container: &mut Node, tokens: &[Token], end: usize) -> Result<()> {
    let mut i = 0;
    while i < container.len() {
        let child = container.child(i);
        let is_inc_dec = matches!(
            child.kind,
            NodeKind::UnaryExpr {
                op: TokenKind::OpInc | TokenKind::OpDec,
                ..
            }
        );
        let is_add_sub = child.is_placeholder()
            && matches!(
                child.kind,
                NodeKind::BinExpr {
                    op: TokenKind::OpAdd | TokenKind::OpSub
                }
            );

        if is_inc_dec {
            let prev_is_ident =
                i > 0 && matches!(container.child(i - 1).kind, NodeKind::Identifier { .. });
            let next_is_ident = i + 1 < container.len()
                && matches!(container.child(i + 1).kind, NodeKind::Identifier { .. });

            if prev_is_ident {
                let operand = container.remove(i - 1);
                container.child_mut(i - 1).push(operand);
                // Reduced node now at i - 1; index i is the next sibling.
            } else if next_is_ident {
                let operand = container.remove(i + 1);
                let node = container.child_mut(i);
                node.push(operand);
                if let NodeKind::UnaryExpr { is_post, .. } = &mut node.kind {
                    *is_post = true;
                }
                i += 1;
            } else {
                let node = container.child(i);
                return Err(Diagnostic::syntax(node.loc, &node.raw));
            }
        } else if is_add_sub {
            reduce_binary_at(container, tokens, end, i)?;
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// The diagnostic for a binary operator with no right operand: reported at
/// the token where the operand should have started (the terminator that
/// bounds the range), falling back to the operator itself.
fn missing_operand(tokens: &[Token], end: usize, node: &Node) -> Diagnostic {
    match tokens.get(end + 1) {
        Some(next) => Diagnostic::syntax(next.loc, &next.raw),
        None => Diagnostic::syntax(node.loc, &node.raw),
    }
}

/// Verify the container reduced to a single well-formed tree: one child,
/// and recursively no operator with a missing operand. Leftovers arise
/// from inputs like two adjacent operands, or from the shift operators,
/// which flatten into placeholders but belong to no sweep's class.
fn validate_reduced(container: &Node) -> Result<()> {
    match container.len() {
        1 => check_subtree(container.child(0)),
        0 => Err(Diagnostic::syntax(container.loc, &container.raw)),
        // A second tree where one was expected: report the extra child.
        _ => {
            let node = container.child(1);
            Err(Diagnostic::syntax(node.loc, &node.raw))
        }
    }
}

fn check_subtree(node: &Node) -> Result<()> {
    let arity_ok = match node.kind {
        NodeKind::BinExpr { .. } => node.len() == 2,
        NodeKind::UnaryExpr { .. } => node.len() == 1,
        NodeKind::Expr => node.len() == 1,
        _ => true,
    };
    if !arity_ok {
        return Err(Diagnostic::syntax(node.loc, &node.raw));
    }
    for child in node.children() {
        check_subtree(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtc_lex::tokenize;
    use dtc_util::FileId;

    fn lex(line: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        tokenize(line, 1, FileId(0), &mut tokens).expect("test input should lex");
        tokens
    }

    /// Parse a whole line as one expression.
    fn parse(line: &str) -> Node {
        let tokens = lex(line);
        parse_expression(&tokens, 0, tokens.len() - 1).expect("expression should parse")
    }

    fn parse_err(line: &str) -> Diagnostic {
        let tokens = lex(line);
        parse_expression(&tokens, 0, tokens.len() - 1).expect_err("expression should not parse")
    }

    /// The single reduced child of the returned `Expr` container.
    fn reduced(line: &str) -> Node {
        let mut container = parse(line);
        assert_eq!(container.len(), 1, "container holds the reduced tree");
        container.remove(0)
    }

    fn bin_op(node: &Node) -> TokenKind {
        match node.kind {
            NodeKind::BinExpr { op } => op,
            ref other => panic!("expected BinExpr, got {other:?}"),
        }
    }

    fn ident_name(node: &Node) -> &str {
        match &node.kind {
            NodeKind::Identifier { name } => name,
            other => panic!("expected Identifier, got {other:?}"),
        }
    }

    #[test]
    fn test_single_literal() {
        let node = reduced("42");
        assert_eq!(node.kind, NodeKind::IntLit(42));
    }

    #[test]
    fn test_all_literal_kinds() {
        assert_eq!(reduced("true").kind, NodeKind::BoolLit(true));
        assert_eq!(reduced("false").kind, NodeKind::BoolLit(false));
        assert_eq!(reduced("'a'").kind, NodeKind::CharLit('a'));
        assert_eq!(reduced("1.5").kind, NodeKind::DoubleLit(1.5));
        assert_eq!(reduced("null").kind, NodeKind::NullLit);
        assert_eq!(
            reduced("\"hi\"").kind,
            NodeKind::StrLit {
                value: "hi".into(),
                assembler_id: None
            }
        );
    }

    #[test]
    fn test_mul_binds_tighter_than_add() {
        // a + b * c  =>  +(a, *(b, c))
        let node = reduced("a + b * c");
        assert_eq!(bin_op(&node), TokenKind::OpAdd);
        assert_eq!(ident_name(node.child(0)), "a");
        let rhs = node.child(1);
        assert_eq!(bin_op(rhs), TokenKind::OpMul);
        assert_eq!(ident_name(rhs.child(0)), "b");
        assert_eq!(ident_name(rhs.child(1)), "c");
    }

    #[test]
    fn test_parens_override_precedence() {
        // (a + b) * c  =>  *(Expr[+(a, b)], c)
        let node = reduced("(a + b) * c");
        assert_eq!(bin_op(&node), TokenKind::OpMul);
        let group = node.child(0);
        assert_eq!(group.kind, NodeKind::Expr);
        assert_eq!(group.len(), 1);
        let sum = group.child(0);
        assert_eq!(bin_op(sum), TokenKind::OpAdd);
        assert_eq!(ident_name(sum.child(0)), "a");
        assert_eq!(ident_name(sum.child(1)), "b");
        assert_eq!(ident_name(node.child(1)), "c");
    }

    #[test]
    fn test_trailing_paren_group() {
        // The group's closer may be the last token of the range.
        let node = reduced("(1)");
        assert_eq!(node.kind, NodeKind::Expr);
        assert_eq!(node.child(0).kind, NodeKind::IntLit(1));
    }

    #[test]
    fn test_unary_minus_before_binary_add() {
        // -x + y  =>  +(-(x), y)
        let node = reduced("-x + y");
        assert_eq!(bin_op(&node), TokenKind::OpAdd);
        let neg = node.child(0);
        assert_eq!(
            neg.kind,
            NodeKind::UnaryExpr {
                op: TokenKind::OpSub,
                is_post: false
            }
        );
        assert_eq!(ident_name(neg.child(0)), "x");
        assert_eq!(ident_name(node.child(1)), "y");
    }

    #[test]
    fn test_minus_after_operator_is_unary() {
        // a * -b  =>  *(a, -(b))
        let node = reduced("a * -b");
        assert_eq!(bin_op(&node), TokenKind::OpMul);
        let neg = node.child(1);
        assert!(matches!(
            neg.kind,
            NodeKind::UnaryExpr {
                op: TokenKind::OpSub,
                ..
            }
        ));
        assert_eq!(ident_name(neg.child(0)), "b");
    }

    #[test]
    fn test_prefix_unaries_chain() {
        // !~x  =>  !(~(x))
        let node = reduced("!~x");
        assert!(matches!(
            node.kind,
            NodeKind::UnaryExpr {
                op: TokenKind::OpBoolNot,
                ..
            }
        ));
        let inner = node.child(0);
        assert!(matches!(
            inner.kind,
            NodeKind::UnaryExpr {
                op: TokenKind::OpBitNot,
                ..
            }
        ));
        assert_eq!(ident_name(inner.child(0)), "x");
    }

    #[test]
    fn test_left_associative_addition() {
        // a - b + c  =>  +(-(a, b), c)
        let node = reduced("a - b + c");
        assert_eq!(bin_op(&node), TokenKind::OpAdd);
        let lhs = node.child(0);
        assert_eq!(bin_op(lhs), TokenKind::OpSub);
        assert_eq!(ident_name(lhs.child(0)), "a");
        assert_eq!(ident_name(lhs.child(1)), "b");
    }

    #[test]
    fn test_assignment_chain_is_left_associative() {
        // x = y = 1  =>  =(=(x, y), 1)   (locked as the contract)
        let node = reduced("x = y = 1");
        assert_eq!(bin_op(&node), TokenKind::Assign);
        let inner = node.child(0);
        assert_eq!(bin_op(inner), TokenKind::Assign);
        assert_eq!(ident_name(inner.child(0)), "x");
        assert_eq!(ident_name(inner.child(1)), "y");
        assert_eq!(node.child(1).kind, NodeKind::IntLit(1));
    }

    #[test]
    fn test_compound_assignment() {
        let node = reduced("x += 2");
        assert_eq!(bin_op(&node), TokenKind::AssignAdd);
        assert_eq!(ident_name(node.child(0)), "x");
        assert_eq!(node.child(1).kind, NodeKind::IntLit(2));
    }

    #[test]
    fn test_assignment_binds_after_comparison() {
        // x = a < b  =>  =(x, <(a, b))
        let node = reduced("x = a < b");
        assert_eq!(bin_op(&node), TokenKind::Assign);
        assert_eq!(bin_op(node.child(1)), TokenKind::OpLt);
    }

    #[test]
    fn test_bitwise_shares_comparison_level() {
        // a < b | c  =>  |(<(a, b), c): one precedence class, left to right.
        let node = reduced("a < b | c");
        assert_eq!(bin_op(&node), TokenKind::OpBitOr);
        let lhs = node.child(0);
        assert_eq!(bin_op(lhs), TokenKind::OpLt);
    }

    #[test]
    fn test_boolean_and_in_comparison_class() {
        // a == b && c  =>  &&(==(a, b), c)
        let node = reduced("a == b && c");
        assert_eq!(bin_op(&node), TokenKind::OpBoolAnd);
        assert_eq!(bin_op(node.child(0)), TokenKind::OpEq);
    }

    #[test]
    fn test_increment_prefers_previous_identifier() {
        // i++  => operand found before the operator, is_post stays false.
        let node = reduced("i++");
        assert_eq!(
            node.kind,
            NodeKind::UnaryExpr {
                op: TokenKind::OpInc,
                is_post: false
            }
        );
        assert_eq!(ident_name(node.child(0)), "i");
    }

    #[test]
    fn test_increment_next_identifier_marks_post() {
        // ++i  => operand found after the operator, is_post set.
        let node = reduced("++i");
        assert_eq!(
            node.kind,
            NodeKind::UnaryExpr {
                op: TokenKind::OpInc,
                is_post: true
            }
        );
        assert_eq!(ident_name(node.child(0)), "i");
    }

    #[test]
    fn test_decrement_between_identifiers_takes_previous() {
        // i--j  =>  --(i) and j left over: two trees, rejected.
        let diag = parse_err("i--j");
        assert_eq!(diag.loc().col, 4);
    }

    #[test]
    fn test_increment_without_identifier_neighbor() {
        let diag = parse_err("5 ++ 3");
        assert_eq!(diag, Diagnostic::syntax(lex("5 ++ 3")[1].loc, "++"));
    }

    #[test]
    fn test_missing_right_operand_reports_terminator() {
        // Within "1 + ;" the expression range is [0, 1]; the operand was
        // expected where the ';' sits.
        let tokens = lex("1 + ;");
        let diag = parse_expression(&tokens, 0, 1).expect_err("dangling operator");
        assert_eq!(diag, Diagnostic::syntax(tokens[2].loc, ";"));
    }

    #[test]
    fn test_missing_right_operand_without_terminator() {
        // No token follows the range: fall back to the operator itself.
        let diag = parse_err("1 +");
        assert_eq!(diag.loc().col, 3);
        assert_eq!(diag, Diagnostic::syntax(lex("1 +")[1].loc, "+"));
    }

    #[test]
    fn test_missing_left_operand_reports_operator() {
        let diag = parse_err("* 5");
        assert_eq!(diag, Diagnostic::syntax(lex("* 5")[0].loc, "*"));
    }

    #[test]
    fn test_missing_unary_operand() {
        let diag = parse_err("!");
        assert_eq!(diag, Diagnostic::syntax(lex("!")[0].loc, "!"));
    }

    #[test]
    fn test_unclosed_paren() {
        let tokens = lex("(1 + 2");
        let diag = parse_expression(&tokens, 0, tokens.len() - 1).unwrap_err();
        assert_eq!(diag, Diagnostic::unclosed_group(tokens[0].loc));
    }

    #[test]
    fn test_empty_parens_rejected() {
        let diag = parse_err("()");
        assert_eq!(diag.loc().col, 2);
    }

    #[test]
    fn test_adjacent_operands_rejected() {
        let diag = parse_err("a b");
        assert_eq!(diag, Diagnostic::syntax(lex("a b")[1].loc, "b"));
    }

    #[test]
    fn test_shift_operators_never_reduce() {
        // Shifts flatten into placeholders but no sweep binds them.
        let diag = parse_err("a << b");
        assert_eq!(diag, Diagnostic::syntax(lex("a << b")[1].loc, "<<"));
    }

    #[test]
    fn test_lone_dot_literal_rejected() {
        let diag = parse_err(".");
        assert_eq!(diag, Diagnostic::syntax(lex(".")[0].loc, "."));
    }

    #[test]
    fn test_malformed_double_rejected() {
        let diag = parse_err("1.2.3");
        assert_eq!(diag.loc().col, 1);
    }

    #[test]
    fn test_statement_token_in_expression() {
        let diag = parse_err("1 + return");
        assert_eq!(diag, Diagnostic::syntax(lex("1 + return")[2].loc, "return"));
    }

    #[test]
    fn test_empty_range_rejected() {
        let tokens = lex(";");
        let diag = parse_expression(&tokens, 1, 0).expect_err("empty range");
        assert_eq!(diag, Diagnostic::syntax(tokens[0].loc, ";"));
    }

    #[test]
    fn test_locations_preserved() {
        let tokens = lex("a + b");
        let container = parse_expression(&tokens, 0, 2).unwrap();
        assert_eq!(container.loc, tokens[0].loc);
        let node = container.child(0);
        assert_eq!(node.loc, tokens[1].loc); // the '+'
        assert_eq!(node.child(0).loc, tokens[0].loc);
        assert_eq!(node.child(1).loc, tokens[2].loc);
    }

    #[test]
    fn test_deeply_nested_groups() {
        let node = reduced("((((1))))");
        let mut current = &node;
        let mut depth = 0;
        while let NodeKind::Expr = current.kind {
            assert_eq!(current.len(), 1);
            current = current.child(0);
            depth += 1;
        }
        assert_eq!(current.kind, NodeKind::IntLit(1));
        assert_eq!(depth, 3);
    }
}
