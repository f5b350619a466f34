//! Operator substitution
//!
//! Rewrites infix operators into canonical prefix calls so the sequencer
//! only ever sees calls: `a + b * c` becomes `Add(a, Mult(b, c))`.
//!
//! Precedence is expressed as tiers processed one after another, tightest
//! first. Inside a tier operators associate left to right because every
//! pass rewrites the leftmost remaining operator and rescans.
//!
//! Assignment operators take the whole enclosing statement as operands,
//! and `let x: T = e;` splits into a declaration followed by `Copy(x, e);`.
//!
//! `<` doubles as a generic bracket. It is treated as one when its
//! matching `>` closes a run of type-like tokens and is followed by a
//! token that may follow a type (`(`, `:`, `;`, `,`, ...).

use tracing::debug;

use super::lexer::{Token, TokenTag};
use crate::util::diagnostic::{CompileError, Result};


/// One precedence tier: operator text and the call it becomes
type Tier = &'static [(&'static str, &'static str)];

const MULTIPLICATIVE: Tier = &[("*", "Mult"), ("/", "Div"), ("%", "Mod")];
const ADDITIVE: Tier = &[("+", "Add"), ("-", "Sub")];
const BITWISE: Tier = &[("<<", "Lbs"), (">>", "Rbs"), ("&", "And"), ("|", "Or")];
const RELATIONAL: Tier = &[
    ("<", "Less"),
    (">", "Great"),
    ("<=", "Leq"),
    (">=", "Geq"),
    ("==", "Eq"),
    ("!=", "Neq"),
];
const LOGICAL: Tier = &[("&&", "Andd"), ("||", "Orr")];
const ASSIGNMENT: Tier = &[
    ("=", "Copy"),
    ("+=", "AddEq"),
    ("-=", "SubEq"),
    ("*=", "MultEq"),
    ("/=", "DivEq"),
    ("%=", "ModEq"),
    ("&=", "AndEq"),
    ("|=", "OrEq"),
];

const EXPRESSION_TIERS: [Tier; 5] = [MULTIPLICATIVE, ADDITIVE, BITWISE, RELATIONAL, LOGICAL];

/// Every call name an operator can turn into
pub fn operator_call_names() -> impl Iterator<Item = &'static str> {
    EXPRESSION_TIERS
        .iter()
        .chain(std::iter::once(&ASSIGNMENT))
        .flat_map(|tier| tier.iter().map(|(_, name)| *name))
}

/// C spelling of an operator call, for lowering builtin operations
pub fn c_operator(call: &str) -> Option<&'static str> {
    EXPRESSION_TIERS
        .iter()
        .chain(std::iter::once(&ASSIGNMENT))
        .flat_map(|tier| tier.iter())
        .find(|(_, name)| *name == call)
        .map(|(op, _)| *op)
}

/// Replace every infix operator in `tokens` with a prefix call
pub fn substitute_operators(mut tokens: Vec<Token>) -> Result<Vec<Token>> {
    if let Some(bad) = tokens.iter().find(|t| t.is("++") || t.is("--")) {
        return Err(CompileError::Operator {
            location: bad.location(),
            message: format!("`{}` is not supported; use `+= 1` or `-= 1`", bad.text),
        });
    }

    let mut rewrites = 0;
    for tier in EXPRESSION_TIERS {
        let mut from = 0;
        while let Some(at) = find_operator(&tokens, tier, from) {
            from = substitute_binary(&mut tokens, at, tier)?;
            rewrites += 1;
        }
    }

    let mut from = 0;
    while let Some(at) = find_operator(&tokens, ASSIGNMENT, from) {
        from = substitute_assignment(&mut tokens, at)?;
        rewrites += 1;
    }

    debug!("Substituted {} operators", rewrites);
    Ok(tokens)
}

fn call_name(
    tier: Tier,
    op: &str,
) -> Option<&'static str> {
    tier.iter().find(|(text, _)| *text == op).map(|(_, name)| *name)
}

/// Leftmost operator of `tier` at or after `from`, skipping generic spans
fn find_operator(
    tokens: &[Token],
    tier: Tier,
    from: usize,
) -> Option<usize> {
    let mut i = from;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.tag == TokenTag::Op {
            if tok.is("<") {
                if let Some(close) = generic_close(tokens, i) {
                    i = close + 1;
                    continue;
                }
            }
            if call_name(tier, &tok.text).is_some() && is_binary(tokens, i) {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// `-` is binary only directly after something that ends an operand
fn is_binary(
    tokens: &[Token],
    at: usize,
) -> bool {
    if !tokens[at].is("-") {
        return true;
    }
    at > 0 && ends_operand(&tokens[at - 1])
}

fn ends_operand(tok: &Token) -> bool {
    match tok.tag {
        TokenTag::Ident | TokenTag::Number | TokenTag::Str => true,
        TokenTag::Keyword => tok.is("true") || tok.is("false"),
        _ => tok.is(")") || tok.is("]"),
    }
}

fn is_atom(tok: &Token) -> bool {
    (ends_operand(tok) && !tok.is(")") && !tok.is("]")) || tok.tag == TokenTag::MacroRef
}

fn is_prefix(
    tokens: &[Token],
    at: usize,
) -> bool {
    let tok = &tokens[at];
    match tok.text.as_str() {
        "^" | "@" | "!" => true,
        "-" => at == 0 || !ends_operand(&tokens[at - 1]),
        _ => false,
    }
}

/// Tokens that may appear between generic brackets
fn is_type_like(tok: &Token) -> bool {
    matches!(tok.tag, TokenTag::Ident | TokenTag::Number)
        || matches!(tok.text.as_str(), "^" | "[" | "]" | "," | "<" | ">" | ">>")
}

/// Tokens that may follow a closing generic bracket
fn may_follow_type(tok: Option<&Token>) -> bool {
    match tok {
        None => true,
        Some(t) => matches!(t.text.as_str(), "(" | ")" | ":" | ";" | "," | "{" | "}" | "=" | "]"),
    }
}

fn bracket_delta(tok: &Token) -> i32 {
    match tok.text.as_str() {
        "<" => 1,
        ">" => -1,
        ">>" => -2,
        _ => 0,
    }
}

/// Index of the `>` (or `>>`) closing a generic argument list opened at `open`
pub fn generic_close(
    tokens: &[Token],
    open: usize,
) -> Option<usize> {
    if !tokens.get(open)?.is("<") || open == 0 || tokens[open - 1].tag != TokenTag::Ident {
        return None;
    }
    let mut depth = 1;
    for (k, tok) in tokens.iter().enumerate().skip(open + 1) {
        if !is_type_like(tok) {
            return None;
        }
        depth += bracket_delta(tok);
        if depth == 0 {
            return may_follow_type(tokens.get(k + 1)).then_some(k);
        }
        if depth < 0 {
            return None;
        }
    }
    None
}

/// Index of the `<` opening the generic argument list closed at `close`
fn generic_open(
    tokens: &[Token],
    close: usize,
) -> Option<usize> {
    let mut depth = 0;
    for k in (0..=close).rev() {
        let tok = &tokens[k];
        if !is_type_like(tok) {
            return None;
        }
        depth += bracket_delta(tok);
        if depth == 0 {
            return (generic_close(tokens, k) == Some(close)).then_some(k);
        }
    }
    None
}

/// Index of the bracket matching the opener at `open`
fn match_forward(
    tokens: &[Token],
    open: usize,
) -> Option<usize> {
    let (o, c) = match tokens[open].text.as_str() {
        "(" => ("(", ")"),
        "[" => ("[", "]"),
        "{" => ("{", "}"),
        _ => return None,
    };
    let mut depth = 0;
    for (k, tok) in tokens.iter().enumerate().skip(open) {
        if tok.is(o) {
            depth += 1;
        } else if tok.is(c) {
            depth -= 1;
            if depth == 0 {
                return Some(k);
            }
        }
    }
    None
}

/// Index of the bracket matching the closer at `close`
fn match_backward(
    tokens: &[Token],
    close: usize,
) -> Option<usize> {
    let (o, c) = match tokens[close].text.as_str() {
        ")" => ("(", ")"),
        "]" => ("[", "]"),
        _ => return None,
    };
    let mut depth = 0;
    for k in (0..=close).rev() {
        if tokens[k].is(c) {
            depth += 1;
        } else if tokens[k].is(o) {
            depth -= 1;
            if depth == 0 {
                return Some(k);
            }
        }
    }
    None
}

/// Whether the token at `at` can be the callee or indexed value of a
/// following bracket group
fn attaches(
    tokens: &[Token],
    at: usize,
) -> bool {
    let tok = &tokens[at];
    matches!(tok.tag, TokenTag::Ident | TokenTag::MacroRef)
        || tok.is(")")
        || tok.is("]")
        || ((tok.is(">") || tok.is(">>")) && generic_open(tokens, at).is_some())
}

/// First index of the operand that ends at `end`
fn operand_start(
    tokens: &[Token],
    end: usize,
) -> Option<usize> {
    let mut pos = end;
    loop {
        let tok = &tokens[pos];
        if tok.is(")") || tok.is("]") {
            pos = match_backward(tokens, pos)?;
            if pos > 0 && attaches(tokens, pos - 1) {
                pos -= 1;
                continue;
            }
            break;
        } else if tok.is(">") || tok.is(">>") {
            let open = generic_open(tokens, pos)?;
            pos = open - 1;
            continue;
        } else if is_atom(tok) {
            if pos >= 2 && tokens[pos - 1].is(".") {
                pos -= 2;
                continue;
            }
            break;
        } else {
            return None;
        }
    }
    while pos > 0 && is_prefix(tokens, pos - 1) {
        pos -= 1;
    }
    Some(pos)
}

/// Index one past the operand that starts at `start`
fn operand_end(
    tokens: &[Token],
    start: usize,
) -> Option<usize> {
    let mut pos = start;
    while pos < tokens.len() && is_prefix(tokens, pos) {
        pos += 1;
    }
    let tok = tokens.get(pos)?;
    if tok.is("(") {
        pos = match_forward(tokens, pos)? + 1;
    } else if is_atom(tok) {
        pos += 1;
    } else {
        return None;
    }

    while let Some(tok) = tokens.get(pos) {
        if tok.is("<") {
            match generic_close(tokens, pos) {
                Some(close) if tokens.get(close + 1).is_some_and(|t| t.is("(")) => pos = close + 1,
                _ => break,
            }
        } else if tok.is("(") || tok.is("[") {
            pos = match_forward(tokens, pos)? + 1;
        } else if tok.is(".") && tokens.get(pos + 1).is_some_and(is_atom) {
            pos += 2;
        } else {
            break;
        }
    }
    Some(pos)
}

fn call_tokens(
    name: &str,
    origin: &Token,
    lhs: &[Token],
    rhs: &[Token],
) -> Vec<Token> {
    let mut out = Vec::with_capacity(lhs.len() + rhs.len() + 4);
    out.push(Token::synthetic(name, origin));
    out.push(Token::synthetic("(", origin));
    out.extend_from_slice(lhs);
    out.push(Token::synthetic(",", origin));
    out.extend_from_slice(rhs);
    out.push(Token::synthetic(")", origin));
    out
}

fn missing_operand(
    op: &Token,
    side: &str,
) -> CompileError {
    CompileError::Operator {
        location: op.location(),
        message: format!("missing {} operand for `{}`", side, op.text),
    }
}

/// Rewrite the binary operator at `at`; returns where to resume scanning
fn substitute_binary(
    tokens: &mut Vec<Token>,
    at: usize,
    tier: Tier,
) -> Result<usize> {
    let op = tokens[at].clone();
    let name = call_name(tier, &op.text).ok_or_else(|| missing_operand(&op, "known"))?;

    let start = if at == 0 {
        None
    } else {
        operand_start(tokens, at - 1)
    }
    .ok_or_else(|| missing_operand(&op, "left"))?;
    let end = operand_end(tokens, at + 1)
        .filter(|end| *end > at + 1)
        .ok_or_else(|| missing_operand(&op, "right"))?;

    let call = call_tokens(name, &op, &tokens[start..at], &tokens[at + 1..end]);
    tokens.splice(start..end, call);
    Ok(start)
}

fn is_statement_boundary(tok: &Token) -> bool {
    tok.is(";") || tok.is("{") || tok.is("}")
}

/// Rewrite the assignment operator at `at`; the operands are the rest of
/// the statement on either side
fn substitute_assignment(
    tokens: &mut Vec<Token>,
    at: usize,
) -> Result<usize> {
    let op = tokens[at].clone();
    let name = call_name(ASSIGNMENT, &op.text).ok_or_else(|| missing_operand(&op, "known"))?;

    let mut start = at;
    let mut depth = 0i32;
    while start > 0 {
        let tok = &tokens[start - 1];
        if tok.is(")") || tok.is("]") {
            depth += 1;
        } else if tok.is("(") || tok.is("[") {
            if depth == 0 {
                break;
            }
            depth -= 1;
        } else if depth == 0 && is_statement_boundary(tok) {
            break;
        }
        start -= 1;
    }

    let mut end = at + 1;
    depth = 0;
    while end < tokens.len() {
        let tok = &tokens[end];
        if tok.is("(") || tok.is("[") {
            depth += 1;
        } else if tok.is(")") || tok.is("]") {
            if depth == 0 {
                break;
            }
            depth -= 1;
        } else if depth == 0 && is_statement_boundary(tok) {
            break;
        }
        end += 1;
    }

    if start == at {
        return Err(missing_operand(&op, "left"));
    }
    if end == at + 1 {
        return Err(missing_operand(&op, "right"));
    }

    let lhs = &tokens[start..at];
    let rhs = &tokens[at + 1..end];
    if let Some(chained) = rhs.iter().find(|t| call_name(ASSIGNMENT, &t.text).is_some()) {
        return Err(CompileError::Operator {
            location: chained.location(),
            message: "chained assignment is not supported".to_string(),
        });
    }

    let replacement = if lhs[0].is("let") {
        let_with_initializer(&op, name, lhs, rhs)?
    } else {
        call_tokens(name, &op, lhs, rhs)
    };

    let resume = start + replacement.len();
    tokens.splice(start..end, replacement);
    Ok(resume)
}

/// `let x: T = e` -> `let x: T; Copy(x, e)`
fn let_with_initializer(
    op: &Token,
    name: &str,
    lhs: &[Token],
    rhs: &[Token],
) -> Result<Vec<Token>> {
    let var = lhs.get(1).ok_or_else(|| missing_operand(op, "left"))?;
    if name != "Copy" {
        return Err(CompileError::Operator {
            location: op.location(),
            message: format!("`{}` cannot initialize `{}`", op.text, var.text),
        });
    }
    if !lhs.iter().any(|t| t.is(":")) {
        return Err(CompileError::Operator {
            location: op.location(),
            message: format!("`let {}` needs a type annotation", var.text),
        });
    }

    let mut out = lhs.to_vec();
    out.push(Token::synthetic(";", op));
    out.extend(call_tokens(name, op, std::slice::from_ref(var), rhs));
    Ok(out)
}
