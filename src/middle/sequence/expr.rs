//! Expressions
//!
//! Operators are gone by now, so an expression is a prefix chain over a
//! postfix chain over a primary:
//!
//! ```text
//! expr    := ('^' | '@' | '!' | '-')* postfix
//! postfix := primary ('.' name | '[' expr ']')*
//! primary := literal | name | call | builtin | '(' expr ')'
//! ```

use super::ast::{ASTKind, ASTNode};
use super::calls::sequence_call;
use super::cursor::{split_commas, TokenCursor};
use super::types::{generic_args, parse_type_tokens};
use crate::driver::CompileContext;
use crate::frontend::lexer::{Token, TokenTag};
use crate::frontend::preprocess::compiler::Builtin;
use crate::frontend::types::{literal_type, Type};
use crate::middle::codegen::ctype::c_type;
use crate::util::diagnostic::{CompileError, Result};
use crate::util::span::Location;

/// Sequence a token slice that must be exactly one expression
pub fn sequence_expr(
    ctx: &mut CompileContext,
    tokens: &[Token],
) -> Result<ASTNode> {
    let Some(first) = tokens.first() else {
        return Err(CompileError::sequence(ctx.location(), "expected an expression"));
    };
    let mut cur = TokenCursor::with_end(tokens, first.location());
    let node = unary(ctx, &mut cur)?;
    if let Some(extra) = cur.peek() {
        return Err(cur.error(format!("unexpected `{}` in expression", extra.text)));
    }
    Ok(node)
}

fn unary(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<ASTNode> {
    let location = cur.location();
    if cur.eat("^") {
        let inner = unary(ctx, cur)?;
        if !inner.is_lvalue() {
            return Err(CompileError::sequence(location, "cannot take the address of a temporary"));
        }
        return Ok(address_of(inner));
    }
    if cur.eat("@") {
        let inner = unary(ctx, cur)?;
        if !(inner.ty.is_pointer() || inner.ty.is_array()) {
            return Err(CompileError::sequence(
                location,
                format!("cannot dereference a value of type `{}`", inner.ty),
            ));
        }
        return Ok(deref(inner));
    }
    if cur.eat("!") {
        let inner = unary(ctx, cur)?;
        if !(inner.ty.is_scalar() || inner.ty.is_pointer()) {
            return Err(CompileError::sequence(location, format!("cannot negate `{}`", inner.ty)));
        }
        return Ok(ASTNode::keyword("!", Type::atomic("bool"), vec![inner]));
    }
    if cur.eat("-") {
        let inner = unary(ctx, cur)?;
        if !(inner.ty.is_integer() || inner.ty.is_float()) {
            return Err(CompileError::sequence(location, format!("cannot negate `{}`", inner.ty)));
        }
        let ty = inner.ty.clone();
        return Ok(ASTNode::keyword("-", ty, vec![inner]));
    }
    postfix(ctx, cur)
}

/// `&node`
pub fn address_of(node: ASTNode) -> ASTNode {
    let ty = node.ty.pointer_to();
    ASTNode::keyword("&", ty, vec![node])
}

/// `*node`
pub fn deref(node: ASTNode) -> ASTNode {
    let ty = node.ty.deref().unwrap_or_else(Type::null);
    ASTNode::keyword("*", ty, vec![node])
}

fn postfix(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<ASTNode> {
    let mut node = primary(ctx, cur)?;
    loop {
        if cur.eat(".") {
            let field = cur.expect_ident()?;
            node = member(ctx, node, field)?;
        } else if cur.peek_is("[") {
            let location = cur.location();
            let inner = cur.group("[", "]")?;
            let index = sequence_expr(ctx, inner)?;
            node = subscript(node, index, location)?;
        } else {
            return Ok(node);
        }
    }
}

/// `base.field`, dereferencing pointers as needed
fn member(
    ctx: &CompileContext,
    base: ASTNode,
    field: &Token,
) -> Result<ASTNode> {
    let depth = base.ty.pointer_depth();
    let target = base.ty.base();
    let def = target
        .atomic_name()
        .and_then(|name| ctx.structs.get(name))
        .ok_or_else(|| {
            CompileError::sequence(field.location(), format!("`{}` has no members", base.ty))
        })?;
    let ty = def.member(&field.text).cloned().ok_or_else(|| {
        CompileError::sequence(
            field.location(),
            format!("`{}` has no member `{}`", def.name, field.text),
        )
    })?;

    let mut node = base;
    for _ in 1..depth {
        node = deref(node);
    }
    let op = if depth == 0 { "." } else { "->" };
    Ok(ASTNode::keyword(
        op,
        ty,
        vec![node, ASTNode::atom(field.text.clone(), Type::null())],
    ))
}

fn subscript(
    base: ASTNode,
    index: ASTNode,
    location: Location,
) -> Result<ASTNode> {
    if !(base.ty.is_pointer() || base.ty.is_array()) {
        return Err(CompileError::sequence(location, format!("cannot index into `{}`", base.ty)));
    }
    if !index.ty.is_integer() {
        return Err(CompileError::sequence(
            location,
            format!("index must be an integer, found `{}`", index.ty),
        ));
    }
    let ty = base.ty.deref().unwrap_or_else(Type::null);
    Ok(ASTNode::keyword("[]", ty, vec![base, index]))
}

fn primary(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<ASTNode> {
    if cur.peek_is("(") {
        let inner = cur.group("(", ")")?;
        return sequence_expr(ctx, inner);
    }

    let token = cur.next()?;
    match token.tag {
        TokenTag::Number | TokenTag::Str => literal(token),
        TokenTag::Keyword if token.is("true") || token.is("false") => literal(token),
        TokenTag::MacroRef => builtin(ctx, cur, token),
        TokenTag::Ident if cur.peek_is("<") => {
            let explicit = generic_args(ctx, cur)?;
            let args = cur.group("(", ")")?;
            sequence_call(ctx, token, Some(explicit), args)
        }
        TokenTag::Ident if cur.peek_is("(") => {
            let args = cur.group("(", ")")?;
            sequence_call(ctx, token, None, args)
        }
        TokenTag::Ident => name(ctx, token),
        _ => Err(CompileError::sequence(
            token.location(),
            format!("unexpected `{}` in expression", token.text),
        )),
    }
}

fn literal(token: &Token) -> Result<ASTNode> {
    let ty = literal_type(&token.text).map_err(|source| CompileError::Type {
        location: token.location(),
        source,
    })?;
    let text = c_literal(&token.text, &ty);
    Ok(ASTNode::atom(text, ty))
}

/// C spelling of a literal whose type has been inferred
pub fn c_literal(
    text: &str,
    ty: &Type,
) -> String {
    if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return format!("\"{}\"", inner.replace("\\'", "'").replace('"', "\\\""));
    }
    if text.starts_with('"') || text == "true" || text == "false" {
        return text.to_string();
    }

    let name = ty.atomic_name().unwrap_or_default();
    let (digits, suffixed) = match text.strip_suffix(name) {
        Some(body) if !body.is_empty() => (body, true),
        _ => (text, false),
    };
    let digits: String = digits.chars().filter(|c| *c != '_').collect();

    match name {
        "f32" if digits.contains('.') => format!("{}f", digits),
        "f32" | "f64" if !digits.contains('.') => format!("(({}){})", c_type(ty), digits),
        _ if suffixed => format!("(({}){})", c_type(ty), digits),
        _ => digits,
    }
}

fn name(
    ctx: &CompileContext,
    token: &Token,
) -> Result<ASTNode> {
    if let Some(var) = ctx.symbols.variable(&token.text, ctx.scopes.visible()) {
        return Ok(ASTNode::atom(var.mangled.clone(), var.ty.clone()));
    }
    let overloads = ctx.symbols.overloads(&token.text);
    match overloads.as_slice() {
        [(_, f)] => Ok(ASTNode::atom(f.mangled.clone(), f.ty.clone())),
        [] => Err(CompileError::sequence(
            token.location(),
            format!("unknown name `{}`", token.text),
        )),
        _ => Err(CompileError::sequence(
            token.location(),
            format!("`{}` is overloaded; call it instead of naming it", token.text),
        )),
    }
}

fn builtin(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    token: &Token,
) -> Result<ASTNode> {
    let location = token.location();
    let Some(builtin) = Builtin::from_token(&token.text) else {
        return Err(CompileError::UnknownMacro {
            location,
            name: token.text.trim_end_matches('!').to_string(),
        });
    };
    let inner = cur.group("(", ")")?;
    let parts = split_commas(inner);

    match builtin {
        Builtin::Alloc => {
            let (ty_tokens, count) = match parts.as_slice() {
                [ty] => (*ty, ASTNode::atom("1", Type::atomic("i32"))),
                [ty, n] => {
                    let count = sequence_expr(ctx, n)?;
                    if !count.ty.is_integer() {
                        return Err(CompileError::sequence(location, "alloc! count must be an integer"));
                    }
                    (*ty, count)
                }
                _ => return Err(CompileError::sequence(location, "alloc! takes a type and an optional count")),
            };
            let ty = parse_type_tokens(ctx, ty_tokens)?;
            let size = ASTNode::atom(format!("sizeof({})", c_type(&ty)), Type::atomic("u64"));
            let raw = ASTNode::call("calloc", Type::atomic("void").pointer_to(), vec![count, size]);
            Ok(ASTNode::keyword("cast", ty.pointer_to(), vec![raw]))
        }
        Builtin::Free => {
            let [ptr] = parts.as_slice() else {
                return Err(CompileError::sequence(location, "free! takes one pointer"));
            };
            let ptr = sequence_expr(ctx, ptr)?;
            if !ptr.ty.is_pointer() {
                return Err(CompileError::sequence(
                    location,
                    format!("free! needs a pointer, found `{}`", ptr.ty),
                ));
            }
            Ok(ASTNode::call("free", Type::atomic("void"), vec![ptr]))
        }
        Builtin::Size => {
            let [ty] = parts.as_slice() else {
                return Err(CompileError::sequence(location, "size! takes one type"));
            };
            let ty = parse_type_tokens(ctx, ty)?;
            Ok(ASTNode::atom(format!("sizeof({})", c_type(&ty)), Type::atomic("u64")))
        }
        Builtin::Type => Err(CompileError::sequence(location, "type! is only valid where a type is expected")),
        Builtin::RawC => Ok(ASTNode::new(
            ASTKind::Atom,
            raw_text(inner, &location)?,
            Type::atomic("void"),
            Vec::new(),
        )),
    }
}

/// Contents of the single string argument of `raw_c!`
pub fn raw_text(
    args: &[Token],
    location: &Location,
) -> Result<String> {
    match args {
        [s] if s.tag == TokenTag::Str && s.text.len() >= 2 => Ok(unescape(&s.text[1..s.text.len() - 1])),
        _ => Err(CompileError::sequence(location.clone(), "raw_c! takes one string")),
    }
}

/// Undo `\"` and `\\` escapes, leaving every other escape for C
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('"' | '\\' | '\'')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
