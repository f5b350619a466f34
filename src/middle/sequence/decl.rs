//! Top-level definitions
//!
//! ```text
//! let f(a: T) -> R { ... }            function
//! let f(a: T) -> R;                   external declaration
//! let f<T>(a: T) -> R { ... } pre { ... } post { ... }
//! let S: struct { a: T, }             struct (also `let S<T>: struct`)
//! let E: enum { some: T, none: unit, }
//! let g: T;                           global
//! Copy(g, e);                         global initializer
//! raw_c!("...");
//! ```

use tracing::debug;

use super::ast::ASTNode;
use super::calls::coerce;
use super::cursor::{split_commas, TokenCursor};
use super::expr::{raw_text, sequence_expr};
use super::stmt::{declare_local, sequence_block, with_frame};
use super::symbols::{EnumDef, StructDef, Symbol, SymbolKind};
use super::types::{is_known_type, parse_type};
use crate::driver::CompileContext;
use crate::frontend::lexer::{Token, TokenTag};
use crate::frontend::types::{compare, Tier, Type};
use crate::middle::generics::{register_generic, GenericCandidate, GenericKind};
use crate::middle::mangle::mangle_function;
use crate::util::diagnostic::{CompileError, Result};

/// Tag carried by compiler-generated functions a user definition may replace
pub const AUTOGEN_TAG: &str = "autogen";

/// Sequence a run of top-level definitions
pub fn sequence_definitions(
    ctx: &mut CompileContext,
    tokens: &[Token],
) -> Result<()> {
    let mut cur = TokenCursor::new(tokens);
    while !cur.at_end() {
        if cur.eat(";") {
            continue;
        }
        definition(ctx, &mut cur)?;
    }
    Ok(())
}

fn definition(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
) -> Result<()> {
    let location = cur.location();
    let head = cur.next()?;
    ctx.cursor.line = head.pos.line;

    match head.text.as_str() {
        "let" => {
            let name = cur.expect_ident()?;
            if cur.peek_is("<") {
                generic_definition(ctx, cur, name)
            } else if cur.peek_is("(") {
                function(ctx, cur, name)
            } else if cur.eat(":") {
                if cur.eat("struct") {
                    struct_definition(ctx, cur, name)
                } else if cur.eat("enum") {
                    enum_definition(ctx, cur, name)
                } else {
                    global(ctx, cur, name)
                }
            } else {
                Err(cur.error(format!("expected `(`, `<` or `:` after `let {}`", name.text)))
            }
        }
        "raw_c!" => {
            let args = cur.group("(", ")")?;
            let text = raw_text(args, &location)?;
            ctx.raw_c.push(text);
            cur.eat(";");
            Ok(())
        }
        "Copy" => global_initializer(ctx, cur, head),
        other => Err(CompileError::sequence(location, format!("unexpected `{}` at top level", other))),
    }
}

/// `( name: T, ... )` at the cursor
fn parameters(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    at: &Token,
) -> Result<Vec<(Token, Type)>> {
    let inner = cur.group("(", ")")?;
    let mut params: Vec<(Token, Type)> = Vec::new();
    for part in split_commas(inner) {
        let mut pc = TokenCursor::with_end(part, at.location());
        let name = pc.expect_ident()?;
        pc.expect(":")?;
        let ty = parse_type(ctx, &mut pc)?;
        if let Some(extra) = pc.peek() {
            return Err(pc.error(format!("unexpected `{}` in parameter list", extra.text)));
        }
        if params.iter().any(|(p, _)| p.text == name.text) {
            return Err(CompileError::sequence(
                name.location(),
                format!("duplicate parameter `{}`", name.text),
            ));
        }
        params.push((name.clone(), ty));
    }
    Ok(params)
}

fn function(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    name: &Token,
) -> Result<()> {
    let params = parameters(ctx, cur, name)?;
    let ret = if cur.eat("->") {
        parse_type(ctx, cur)?
    } else {
        Type::atomic("void")
    };
    let named: Vec<(String, Type)> = params.iter().map(|(n, t)| (n.text.clone(), t.clone())).collect();
    let ty = Type::function(&named, &ret);

    if cur.eat(";") {
        declare_extern(ctx, name, ty);
        return Ok(());
    }

    let index = register_function(ctx, name, ty)?;
    debug!("Sequencing function `{}`", ctx.symbols.get(index).mangled);

    ctx.scopes.enter_function(ret);
    let body = with_frame(ctx, |ctx| {
        for (param, ty) in &params {
            declare_local(ctx, param, ty.clone())?;
        }
        sequence_block(ctx, cur)
    });
    ctx.scopes.leave_function();

    ctx.symbols.get_mut(index).ast = Some(body?);
    Ok(())
}

fn declare_extern(
    ctx: &mut CompileContext,
    name: &Token,
    ty: Type,
) {
    if ctx.symbols.find_overload(&name.text, &ty.params()).is_some() {
        return;
    }
    let symbol = new_symbol(ctx, name, name.text.clone(), SymbolKind::Extern, ty);
    ctx.symbols.add(symbol);
}

/// Add a function with a body, or take over a bodiless declaration or
/// generated function with the same parameters
fn register_function(
    ctx: &mut CompileContext,
    name: &Token,
    ty: Type,
) -> Result<usize> {
    if let Some(index) = ctx.symbols.find_overload(&name.text, &ty.params()) {
        let tags = ctx.current_tags();
        let existing = ctx.symbols.get_mut(index);
        let replaceable = existing.kind == SymbolKind::Extern || existing.tags.contains(AUTOGEN_TAG);
        if !replaceable {
            return Err(CompileError::sequence(
                name.location(),
                format!(
                    "`{}` is already defined with these parameters at {}:{}",
                    name.text, existing.file, existing.line
                ),
            ));
        }
        let same_return = match (existing.ty.return_type(), ty.return_type()) {
            (Some(a), Some(b)) => compare(&a, &b, Tier::Exact).is_some(),
            _ => false,
        };
        if !same_return {
            return Err(CompileError::sequence(
                name.location(),
                format!("`{}` redefined with a different return type", name.text),
            ));
        }
        existing.kind = SymbolKind::Function;
        existing.ty = ty;
        existing.tags = tags;
        existing.file = name.file.to_string();
        existing.line = name.pos.line;
        return Ok(index);
    }

    let mangled = mangle_function(&name.text, &ty);
    let symbol = new_symbol(ctx, name, mangled, SymbolKind::Function, ty);
    Ok(ctx.symbols.add(symbol))
}

fn new_symbol(
    ctx: &CompileContext,
    name: &Token,
    mangled: String,
    kind: SymbolKind,
    ty: Type,
) -> Symbol {
    Symbol {
        name: name.text.clone(),
        mangled,
        kind,
        ty,
        ast: None,
        file: name.file.to_string(),
        line: name.pos.line,
        tags: ctx.current_tags(),
        frame: 0,
        erased: false,
    }
}

fn global(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    name: &Token,
) -> Result<()> {
    let ty = parse_type(ctx, cur)?;
    let init = if cur.eat("=") {
        let value = cur.until(&[";"]);
        Some(value)
    } else {
        None
    };
    cur.expect(";")?;
    if ctx.symbols.variable(&name.text, &[]).is_some() {
        return Err(CompileError::sequence(
            name.location(),
            format!("global `{}` is already defined", name.text),
        ));
    }
    if ty.is_void() {
        return Err(CompileError::sequence(name.location(), format!("`{}` cannot be void", name.text)));
    }
    let symbol = new_symbol(ctx, name, name.text.clone(), SymbolKind::Global, ty);
    let index = ctx.symbols.add(symbol);
    match init {
        Some(value) => initialize_global(ctx, index, name, value),
        None => Ok(()),
    }
}

/// `Copy(g, e);` at top level sets the initializer of global `g`
fn global_initializer(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    head: &Token,
) -> Result<()> {
    let args = cur.group("(", ")")?;
    cur.eat(";");
    let parts = split_commas(args);
    let [target, value] = parts.as_slice() else {
        return Err(CompileError::sequence(head.location(), "`Copy` takes two arguments"));
    };
    let [name] = *target else {
        return Err(CompileError::sequence(head.location(), "only globals can be initialized at top level"));
    };
    let index = ctx
        .symbols
        .live(&name.text)
        .filter(|(_, s)| s.kind == SymbolKind::Global)
        .last()
        .map(|(i, _)| i)
        .ok_or_else(|| CompileError::sequence(name.location(), format!("unknown global `{}`", name.text)))?;
    initialize_global(ctx, index, name, value)
}

fn initialize_global(
    ctx: &mut CompileContext,
    index: usize,
    name: &Token,
    value: &[Token],
) -> Result<()> {
    let value = sequence_expr(ctx, value)?;
    let global = ctx.symbols.get(index);
    let fits = compare(&value.ty, &global.ty, Tier::Exact).is_some() || (value.ty.is_scalar() && global.ty.is_scalar());
    if !fits {
        return Err(CompileError::sequence(
            name.location(),
            format!("cannot initialize `{}: {}` with `{}`", name.text, global.ty, value.ty),
        ));
    }
    if global.ast.is_some() {
        return Err(CompileError::sequence(
            name.location(),
            format!("global `{}` is already initialized", name.text),
        ));
    }
    let init = coerce(value, &global.ty.clone());
    ctx.symbols.get_mut(index).ast = Some(init);
    Ok(())
}

/// `name: T, ...` inside struct or enum braces
fn members(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    at: &Token,
) -> Result<Vec<(String, Type)>> {
    let inner = cur.group("{", "}")?;
    let mut out: Vec<(String, Type)> = Vec::new();
    for part in split_commas(inner) {
        if part.is_empty() {
            continue;
        }
        let mut pc = TokenCursor::with_end(part, at.location());
        let name = pc.expect_ident()?;
        pc.expect(":")?;
        let ty = parse_type(ctx, &mut pc)?;
        if let Some(extra) = pc.peek() {
            return Err(pc.error(format!("unexpected `{}` in member list", extra.text)));
        }
        if out.iter().any(|(n, _)| *n == name.text) {
            return Err(CompileError::sequence(
                name.location(),
                format!("duplicate member `{}` in `{}`", name.text, at.text),
            ));
        }
        out.push((name.text.clone(), ty));
    }
    Ok(out)
}

fn check_type_name_free(
    ctx: &CompileContext,
    name: &Token,
) -> Result<()> {
    if is_known_type(ctx, &name.text) {
        return Err(CompileError::sequence(
            name.location(),
            format!("type `{}` is already defined", name.text),
        ));
    }
    Ok(())
}

fn struct_definition(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    name: &Token,
) -> Result<()> {
    check_type_name_free(ctx, name)?;
    let file = name.file.to_string();
    // registered before the members so they can point back at it
    ctx.structs.insert(
        name.text.clone(),
        StructDef {
            name: name.text.clone(),
            members: Vec::new(),
            file,
        },
    );
    let members = members(ctx, cur, name)?;
    if let Some(def) = ctx.structs.get_mut(&name.text) {
        def.members = members;
    }
    cur.eat(";");

    let this = Type::atomic(&name.text);
    let zero = vec!["memset(self, 0, sizeof(*self));".to_string()];
    add_generated(ctx, name, "New", &[("self", this.pointer_to())], Type::atomic("void"), zero)?;
    add_generated(ctx, name, "Del", &[("self", this.pointer_to())], Type::atomic("void"), Vec::new())?;
    Ok(())
}

fn enum_definition(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    name: &Token,
) -> Result<()> {
    check_type_name_free(ctx, name)?;
    ctx.enums.insert(
        name.text.clone(),
        EnumDef {
            name: name.text.clone(),
            options: Vec::new(),
            file: name.file.to_string(),
        },
    );
    let options = members(ctx, cur, name)?;
    if let Some(def) = ctx.enums.get_mut(&name.text) {
        def.options = options.clone();
    }
    cur.eat(";");

    let this = Type::atomic(&name.text);
    let ptr = this.pointer_to();
    let zero = vec!["memset(self, 0, sizeof(*self));".to_string()];
    add_generated(ctx, name, "New", &[("self", ptr.clone())], Type::atomic("void"), zero)?;
    add_generated(ctx, name, "Del", &[("self", ptr.clone())], Type::atomic("void"), Vec::new())?;

    for (tag, (option, payload)) in options.iter().enumerate() {
        let unit = payload.is_atomic("unit");
        let wrap_params: Vec<(&str, Type)> = if unit {
            Vec::new()
        } else {
            vec![("value", payload.clone())]
        };
        let mut wrap = vec![
            format!("{} out;", name.text),
            "memset(&out, 0, sizeof(out));".to_string(),
            format!("out.tag = {};", tag),
        ];
        if !unit {
            wrap.push(format!("out.data.{} = value;", option));
        }
        wrap.push("return out;".to_string());
        add_generated(ctx, name, &format!("wrap_{}", option), &wrap_params, this.clone(), wrap)?;

        let is = vec![format!("return self->tag == {};", tag)];
        add_generated(ctx, name, &format!("is_{}", option), &[("self", ptr.clone())], Type::atomic("bool"), is)?;

        if !unit {
            let unwrap = vec![format!("return self->data.{};", option)];
            add_generated(ctx, name, &format!("unwrap_{}", option), &[("self", ptr.clone())], payload.clone(), unwrap)?;
        }
    }
    Ok(())
}

/// Add a compiler-generated function whose body is raw C lines
fn add_generated(
    ctx: &mut CompileContext,
    origin: &Token,
    name: &str,
    params: &[(&str, Type)],
    ret: Type,
    lines: Vec<String>,
) -> Result<()> {
    let named: Vec<(String, Type)> = params.iter().map(|(n, t)| (n.to_string(), t.clone())).collect();
    let ty = Type::function(&named, &ret);
    if ctx.symbols.find_overload(name, &ty.params()).is_some() {
        debug!("Not generating `{}{}`, an overload with those parameters exists", name, ty);
        return Ok(());
    }
    let name_token = Token::synthetic(name, origin);
    let index = register_function(ctx, &name_token, ty)?;

    let body = lines
        .into_iter()
        .map(|line| ASTNode::statement("raw", vec![ASTNode::atom(line, Type::null())]))
        .collect();
    let symbol = ctx.symbols.get_mut(index);
    symbol.ast = Some(ASTNode::scope(body));
    symbol.tags.insert(AUTOGEN_TAG.to_string());
    Ok(())
}

/// `let name<T, ...>` at the cursor (after the name): record a template
fn generic_definition(
    ctx: &mut CompileContext,
    cur: &mut TokenCursor<'_>,
    name: &Token,
) -> Result<()> {
    cur.expect("<")?;
    let mut params = Vec::new();
    loop {
        params.push(cur.expect_ident()?.text.clone());
        if cur.eat(">") {
            break;
        }
        cur.expect(",")?;
    }

    let mut signature = Vec::new();
    let mut ret = Vec::new();
    let kind = if cur.peek_is("(") {
        let inner = cur.group("(", ")")?;
        for part in split_commas(inner) {
            match part {
                [pname, colon, ty @ ..] if pname.tag == TokenTag::Ident && colon.is(":") && !ty.is_empty() => {
                    signature.push((pname.text.clone(), ty.to_vec()));
                }
                _ => return Err(CompileError::sequence(name.location(), "malformed generic parameter list")),
            }
        }
        if cur.eat("->") {
            ret = cur.until(&["{"]).to_vec();
        }
        GenericKind::Function
    } else {
        cur.expect(":")?;
        if cur.eat("struct") {
            GenericKind::Struct
        } else if cur.eat("enum") {
            GenericKind::Enum
        } else {
            return Err(cur.error("expected `struct` or `enum` after `:` in a generic definition"));
        }
    };

    let body = braced(cur)?;
    let (mut pre, mut post) = (None, None);
    loop {
        if cur.eat("pre") {
            pre = Some(cur.group("{", "}")?.to_vec());
        } else if cur.eat("post") {
            post = Some(cur.group("{", "}")?.to_vec());
        } else {
            break;
        }
    }
    cur.eat(";");

    let candidate = GenericCandidate::new(kind, params, signature, ret, body, pre, post, name.clone());
    register_generic(ctx, &name.text, candidate);
    Ok(())
}

/// `{ ... }` at the cursor, braces included
fn braced(cur: &mut TokenCursor<'_>) -> Result<Vec<Token>> {
    let open = cur.peek().cloned().ok_or_else(|| cur.error("expected `{`"))?;
    let inner = cur.group("{", "}")?;
    let mut out = Vec::with_capacity(inner.len() + 2);
    out.push(open.clone());
    out.extend(inner.iter().cloned());
    out.push(Token::synthetic("}", inner.last().unwrap_or(&open)));
    Ok(out)
}

