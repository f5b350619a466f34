//! C emission
//!
//! Turns the sequenced program held by the compile context into one C
//! translation unit:
//!
//! 1. standard includes, then `raw_c!` chunks in the order they appeared
//! 2. a `typedef` for every struct and enum
//! 3. struct and enum bodies, each after the types it holds by value
//! 4. prototypes for every function with a body
//! 5. globals, then function definitions
//!
//! Enums lower to `struct E { int32_t tag; union { ... } data; }`, one
//! union member per non-`unit` option.

pub mod ctype;
pub mod expr;
pub mod stmt;

use std::collections::HashSet;

use tracing::debug;

use self::ctype::c_decl;
use self::expr::emit_expr;
use self::stmt::emit_block;
use crate::driver::CompileContext;
use crate::frontend::types::{Type, TypeNode};
use crate::middle::sequence::symbols::{Symbol, SymbolKind};

const INCLUDES: &[&str] = &["stdint.h", "stdbool.h", "stdlib.h", "string.h"];

/// Indented line writer for generated C
#[derive(Debug, Default)]
pub struct CEmitter {
    indent: usize,
    output: String,
}

impl CEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write one line at the current indentation
    pub fn writeln(
        &mut self,
        line: &str,
    ) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    pub fn finish(self) -> String {
        self.output
    }
}

/// Render the whole program as C source
pub fn render(ctx: &CompileContext) -> String {
    let mut out = CEmitter::new();

    for header in INCLUDES {
        out.writeln(&format!("#include <{}>", header));
    }
    out.blank();
    for chunk in &ctx.raw_c {
        out.writeln(chunk);
    }
    if !ctx.raw_c.is_empty() {
        out.blank();
    }

    let types = type_order(ctx);
    for name in &types {
        out.writeln(&format!("typedef struct {} {};", name, name));
    }
    if !types.is_empty() {
        out.blank();
    }
    for name in &types {
        emit_type(&mut out, ctx, name);
    }

    let functions: Vec<&Symbol> = ctx
        .symbols
        .iter()
        .filter(|s| s.kind == SymbolKind::Function && s.ast.is_some())
        .collect();
    for symbol in &functions {
        out.writeln(&format!("{};", signature(symbol)));
    }
    if !functions.is_empty() {
        out.blank();
    }

    let mut any_global = false;
    for symbol in ctx.symbols.iter().filter(|s| s.kind == SymbolKind::Global) {
        let decl = c_decl(&symbol.ty, &symbol.mangled);
        match &symbol.ast {
            Some(init) => out.writeln(&format!("{} = {};", decl, emit_expr(init))),
            None => out.writeln(&format!("{};", decl)),
        }
        any_global = true;
    }
    if any_global {
        out.blank();
    }

    for symbol in &functions {
        emit_function(&mut out, symbol);
    }

    debug!("Rendered {} types and {} functions", types.len(), functions.len());
    out.finish()
}

/// `R name(T a, U b)`
fn signature(symbol: &Symbol) -> String {
    let names = symbol.ty.param_names();
    let params: Vec<String> = symbol
        .ty
        .params()
        .iter()
        .zip(&names)
        .map(|(ty, name)| c_decl(ty, name))
        .collect();
    let params = if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    };
    let ret = symbol.ty.return_type().unwrap_or_else(|| Type::atomic("void"));
    c_decl(&ret, &format!("{}({})", symbol.mangled, params))
}

fn emit_function(
    out: &mut CEmitter,
    symbol: &Symbol,
) {
    let Some(body) = &symbol.ast else {
        return;
    };
    if !symbol.tags.is_empty() {
        let tags: Vec<&str> = symbol.tags.iter().map(String::as_str).collect();
        out.writeln(&format!("/* tags: {} */", tags.join(", ")));
    }
    out.writeln(&signature(symbol));
    emit_block(out, body);
    out.blank();
}

fn emit_type(
    out: &mut CEmitter,
    ctx: &CompileContext,
    name: &str,
) {
    if let Some(def) = ctx.structs.get(name) {
        out.writeln(&format!("struct {}", name));
        out.writeln("{");
        out.indent();
        if def.members.is_empty() {
            out.writeln("char _empty;");
        }
        for (member, ty) in &def.members {
            out.writeln(&format!("{};", c_decl(ty, member)));
        }
        out.dedent();
        out.writeln("};");
        out.blank();
    } else if let Some(def) = ctx.enums.get(name) {
        out.writeln(&format!("struct {}", name));
        out.writeln("{");
        out.indent();
        out.writeln("int32_t tag;");
        let payloads: Vec<&(String, Type)> = def.options.iter().filter(|(_, ty)| !ty.is_atomic("unit")).collect();
        if !payloads.is_empty() {
            out.writeln("union");
            out.writeln("{");
            out.indent();
            for (option, ty) in payloads {
                out.writeln(&format!("{};", c_decl(ty, option)));
            }
            out.dedent();
            out.writeln("} data;");
        }
        out.dedent();
        out.writeln("};");
        out.blank();
    }
}

/// Struct and enum names, each after every type it contains by value
fn type_order(ctx: &CompileContext) -> Vec<String> {
    let mut order = Vec::new();
    let mut done = HashSet::new();
    let names = ctx.structs.keys().chain(ctx.enums.keys());
    for name in names {
        visit(ctx, name, &mut done, &mut order);
    }
    order
}

fn visit(
    ctx: &CompileContext,
    name: &str,
    done: &mut HashSet<String>,
    order: &mut Vec<String>,
) {
    if !done.insert(name.to_string()) {
        return;
    }
    let fields: Vec<&Type> = match (ctx.structs.get(name), ctx.enums.get(name)) {
        (Some(def), _) => def.members.iter().map(|(_, ty)| ty).collect(),
        (None, Some(def)) => def.options.iter().map(|(_, ty)| ty).collect(),
        (None, None) => return,
    };
    for ty in fields {
        if let Some(dep) = held_by_value(ty) {
            visit(ctx, dep, done, order);
        }
    }
    order.push(name.to_string());
}

/// Name of the type stored inline by a member of type `ty`
fn held_by_value(ty: &Type) -> Option<&str> {
    let nodes = ty.nodes();
    let start = nodes.iter().take_while(|n| matches!(n, TypeNode::SizedArray(_))).count();
    match &nodes[start..] {
        [TypeNode::Atomic(name)] => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
