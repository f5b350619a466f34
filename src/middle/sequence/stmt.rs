//! Statements and blocks

use super::ast::ASTNode;
use super::calls::coerce;
use super::cursor::TokenCursor;
use super::expr::{raw_text, sequence_expr};
use super::symbols::{Symbol, SymbolKind};
use super::types::parse_type;
use crate::driver::CompileContext;
use crate::frontend::lexer::Token;
use crate::frontend::types::{compare, Tier, Type};
use crate::util::diagnostic::{CompileError, Result};

/// Sequence `{ ... }` at the cursor in a fresh frame
pub fn sequence_block(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<ASTNode> {
    let inner = cur.group("{", "}")?;
    with_frame(ctx, |ctx| sequence_statements(ctx, inner)).map(ASTNode::scope)
}

/// Run `f` inside a new block frame, closing it whatever happens
pub fn with_frame<T>(
    ctx: &mut CompileContext,
    f: impl FnOnce(&mut CompileContext) -> Result<T>,
) -> Result<T> {
    ctx.scopes.push_frame();
    let result = f(ctx);
    if let Some(frame) = ctx.scopes.pop_frame() {
        ctx.symbols.erase_frame(frame);
    }
    result
}

pub fn sequence_statements(
    ctx: &mut CompileContext,
    tokens: &[Token],
) -> Result<Vec<ASTNode>> {
    let mut cur = TokenCursor::new(tokens);
    let mut out = Vec::new();
    while !cur.at_end() {
        if cur.eat(";") {
            continue;
        }
        out.push(statement(ctx, &mut cur)?);
    }
    Ok(out)
}

fn statement(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<ASTNode> {
    let location = cur.location();
    let Some(head) = cur.peek() else {
        return Err(cur.error("expected a statement"));
    };
    ctx.cursor.line = head.pos.line;

    match head.text.as_str() {
        "let" => {
            cur.next()?;
            let name = cur.expect_ident()?;
            cur.expect(":")?;
            let ty = parse_type(ctx, cur)?;
            cur.expect(";")?;
            let node = declare_local(ctx, name, ty)?;
            Ok(ASTNode::statement("let", vec![node]))
        }
        "if" => sequence_if(ctx, cur),
        "while" => {
            cur.next()?;
            let cond = condition(ctx, cur)?;
            ctx.scopes.enter_loop();
            let body = sequence_block(ctx, cur);
            ctx.scopes.leave_loop();
            Ok(ASTNode::statement("while", vec![cond, body?]))
        }
        "return" => {
            cur.next()?;
            let value = cur.until(&[";"]);
            cur.expect(";")?;
            let ret = ctx.scopes.return_type().cloned().unwrap_or_else(|| Type::atomic("void"));
            if value.is_empty() {
                if !ret.is_void() {
                    return Err(CompileError::sequence(location, format!("missing return value of type `{}`", ret)));
                }
                return Ok(ASTNode::statement("return", Vec::new()));
            }
            if ret.is_void() {
                return Err(CompileError::sequence(location, "returning a value from a void function"));
            }
            let node = sequence_expr(ctx, value)?;
            let fits = compare(&node.ty, &ret, Tier::Exact).is_some()
                || (node.ty.is_scalar() && ret.is_scalar() && compare(&node.ty, &ret, Tier::Casting).is_some());
            if !fits {
                return Err(CompileError::sequence(
                    location,
                    format!("returning `{}` from a function returning `{}`", node.ty, ret),
                ));
            }
            Ok(ASTNode::statement("return", vec![coerce(node, &ret)]))
        }
        "break" | "continue" => {
            let word = cur.next()?.text.clone();
            cur.expect(";")?;
            if !ctx.scopes.in_loop() {
                return Err(CompileError::sequence(location, format!("`{}` outside of a loop", word)));
            }
            Ok(ASTNode::statement(&word, Vec::new()))
        }
        "{" => sequence_block(ctx, cur),
        "raw_c!" => {
            cur.next()?;
            let args = cur.group("(", ")")?;
            let text = raw_text(args, &location)?;
            cur.eat(";");
            Ok(ASTNode::statement("raw", vec![ASTNode::atom(text, Type::null())]))
        }
        _ => {
            let expr = cur.until(&[";"]);
            cur.expect(";")?;
            let node = sequence_expr(ctx, expr)?;
            Ok(ASTNode::statement("expr", vec![node]))
        }
    }
}

fn sequence_if(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<ASTNode> {
    cur.expect("if")?;
    let cond = condition(ctx, cur)?;
    let then = sequence_block(ctx, cur)?;
    let mut children = vec![cond, then];
    if cur.eat("else") {
        if cur.peek_is("if") {
            children.push(sequence_if(ctx, cur)?);
        } else {
            children.push(sequence_block(ctx, cur)?);
        }
    }
    Ok(ASTNode::statement("if", children))
}

/// Condition tokens up to the block that follows
fn condition(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<ASTNode> {
    let location = cur.location();
    let tokens = cur.until(&["{"]);
    let cond = sequence_expr(ctx, tokens)?;
    if !(cond.ty.is_scalar() || cond.ty.is_pointer()) {
        return Err(CompileError::sequence(
            location,
            format!("condition must be a scalar or pointer, found `{}`", cond.ty),
        ));
    }
    Ok(cond)
}

/// Add a local to the innermost frame
pub fn declare_local(
    ctx: &mut CompileContext,
    name: &Token,
    ty: Type,
) -> Result<ASTNode> {
    let frame = ctx.scopes.current_frame();
    if ctx.symbols.declared_in_frame(&name.text, frame) {
        return Err(CompileError::sequence(
            name.location(),
            format!("`{}` is already declared in this scope", name.text),
        ));
    }
    if ty.is_void() {
        return Err(CompileError::sequence(name.location(), format!("`{}` cannot be void", name.text)));
    }
    ctx.symbols.add(Symbol {
        name: name.text.clone(),
        mangled: name.text.clone(),
        kind: SymbolKind::Local,
        ty: ty.clone(),
        ast: None,
        file: name.file.to_string(),
        line: name.pos.line,
        tags: Default::default(),
        frame,
        erased: false,
    });
    Ok(ASTNode::atom(name.text.clone(), ty))
}

/// Sequence a `pre` / `post` block with `params` in scope and discard it
pub fn check_block(
    ctx: &mut CompileContext,
    params: &[(String, Type)],
    block: &[Token],
) -> Result<()> {
    ctx.scopes.enter_function(Type::atomic("void"));
    let result = with_frame(ctx, |ctx| {
        for (name, ty) in params {
            declare_local(ctx, &Token::bare(name.clone()), ty.clone())?;
        }
        sequence_statements(ctx, block).map(|_| ())
    });
    ctx.scopes.leave_function();
    result
}
