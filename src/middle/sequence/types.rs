//! Types in source position
//!
//! ```text
//! type := '^' type | '[' ']' type | '[' n ']' type
//!       | name | name '<' type (',' type)* '>' | 'type!' '(' expr ')'
//!       | '(' (name ':')? type, ... ')' '->' type
//! ```
//!
//! Naming a generic struct or enum instantiates it on the spot.

use super::cursor::{split_commas, TokenCursor};
use super::expr::sequence_expr;
use crate::driver::CompileContext;
use crate::frontend::lexer::{Token, TokenTag};
use crate::frontend::types::{Type, TypeNode, PRIMITIVE_TYPES};
use crate::middle::generics::{instantiate, InstantiationRequest};
use crate::middle::mangle::mangle_generic;
use crate::util::diagnostic::{CompileError, Result};

/// Parse one type at the cursor
pub fn parse_type(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<Type> {
    let mut ty = Type::null();
    loop {
        if cur.eat("^") {
            ty.append(TypeNode::Pointer);
        } else if cur.peek_is("[") {
            let inner = cur.group("[", "]")?;
            match inner {
                [] => ty.append(TypeNode::Array),
                [n] if n.tag == TokenTag::Number => {
                    let size = n
                        .text
                        .parse::<usize>()
                        .map_err(|_| cur.error(format!("bad array size `{}`", n.text)))?;
                    ty.append(TypeNode::SizedArray(size));
                }
                _ => return Err(cur.error("array size must be a plain number")),
            }
        } else {
            break;
        }
    }

    let location = cur.location();
    let head = cur.next()?;

    if head.is("type!") {
        let inner = cur.group("(", ")")?;
        let node = sequence_expr(ctx, inner)?;
        ty.append_type(&node.ty);
        return Ok(ty);
    }

    if head.is("(") {
        let inner = group_after_open(cur, head)?;
        let mut params = Vec::new();
        for (i, part) in split_commas(inner).into_iter().enumerate() {
            let mut pc = TokenCursor::with_end(part, location.clone());
            let name = match (pc.peek(), pc.peek_at(1)) {
                (Some(n), Some(colon)) if n.tag == TokenTag::Ident && colon.is(":") => {
                    pc.next()?;
                    pc.next()?;
                    n.text.clone()
                }
                _ => format!("_{}", i),
            };
            params.push((name, parse_type(ctx, &mut pc)?));
            expect_end(&pc)?;
        }
        cur.expect("->")?;
        let ret = parse_type(ctx, cur)?;
        ty.append_type(&Type::function(&params, &ret));
        return Ok(ty);
    }

    if head.tag != TokenTag::Ident {
        return Err(CompileError::sequence(
            location,
            format!("expected a type, found `{}`", head.text),
        ));
    }

    if cur.peek_is("<") {
        let args = generic_args(ctx, cur)?;
        let request = InstantiationRequest::ty(&head.text, args.clone(), location);
        instantiate(ctx, &request)?;
        ty.append(TypeNode::Atomic(mangle_generic(&head.text, &args)));
        return Ok(ty);
    }

    if !is_known_type(ctx, &head.text) {
        return Err(CompileError::sequence(
            location,
            format!("unknown type `{}`", head.text),
        ));
    }
    ty.append(TypeNode::Atomic(head.text.clone()));
    Ok(ty)
}

/// `(` already consumed: the tokens up to the matching `)`
fn group_after_open<'a>(
    cur: &mut TokenCursor<'a>,
    open: &Token,
) -> Result<&'a [Token]> {
    let inner = cur.until(&[")"]);
    if !cur.eat(")") {
        return Err(CompileError::sequence(
            open.location(),
            "unclosed `(` in function type",
        ));
    }
    Ok(inner)
}

/// Parse `< type, ... >` at the cursor
pub fn generic_args(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<Vec<Type>> {
    cur.expect("<")?;
    let mut args = Vec::new();
    loop {
        args.push(parse_type(ctx, cur)?);
        if cur.eat(">") {
            return Ok(args);
        }
        cur.expect(",")?;
    }
}

/// Parse a token slice that must be exactly one type
pub fn parse_type_tokens(
    ctx: &mut CompileContext,
    tokens: &[Token],
) -> Result<Type> {
    let mut cur = TokenCursor::new(tokens);
    let ty = parse_type(ctx, &mut cur)?;
    expect_end(&cur)?;
    Ok(ty)
}

fn expect_end(cur: &TokenCursor<'_>) -> Result<()> {
    match cur.peek() {
        Some(t) => Err(cur.error(format!("unexpected `{}` after type", t.text))),
        None => Ok(()),
    }
}

pub fn is_known_type(
    ctx: &CompileContext,
    name: &str,
) -> bool {
    PRIMITIVE_TYPES.contains(&name) || ctx.structs.contains_key(name) || ctx.enums.contains_key(name)
}

/// Spell a type as source tokens attributed to `origin`
pub fn type_tokens(
    ty: &Type,
    origin: &Token,
) -> Vec<Token> {
    let mut out = Vec::new();
    if ty.is_function() {
        out.push(Token::synthetic("(", origin));
        for (i, param) in ty.params().iter().enumerate() {
            if i > 0 {
                out.push(Token::synthetic(",", origin));
            }
            out.extend(type_tokens(&param.without_names(), origin));
        }
        out.push(Token::synthetic(")", origin));
        out.push(Token::synthetic("->", origin));
        let ret = ty.return_type().unwrap_or_else(Type::null);
        out.extend(type_tokens(&ret, origin));
        return out;
    }
    for (i, node) in ty.nodes().iter().enumerate() {
        match node {
            TypeNode::Pointer => out.push(Token::synthetic("^", origin)),
            TypeNode::Array => {
                out.push(Token::synthetic("[", origin));
                out.push(Token::synthetic("]", origin));
            }
            TypeNode::SizedArray(n) => {
                out.push(Token::synthetic("[", origin));
                out.push(Token::synthetic(n.to_string(), origin));
                out.push(Token::synthetic("]", origin));
            }
            TypeNode::Atomic(name) => out.push(Token::synthetic(name.clone(), origin)),
            TypeNode::Function => {
                let rest = Type::from_nodes(ty.nodes()[i..].iter().cloned());
                out.extend(type_tokens(&rest, origin));
                break;
            }
            TypeNode::VarName(_) | TypeNode::Join | TypeNode::Maps => {}
        }
    }
    out
}
