//! Macro expansion
//!
//! Runs over a file's tokens before rules and operator substitution.
//! Every `name!` reference is resolved in this order:
//!
//! 1. `let name! = tokens;` defines a textual substitution
//! 2. `let name!(params) -> ret { body }` defines a full macro
//! 3. compiler directives are handed to the driver and removed
//! 4. compiler builtins are left in place for the sequencer
//! 5. pseudo-defines (`line!`, `file!`, ...) become literals
//! 6. defines are replaced by their tokens
//! 7. full macros are invoked and their output spliced in
//!
//! Replacements are rescanned, so a define may expand to other defines
//! and a macro may print further macro calls.

pub mod compiler;
pub mod runtime;


pub use compiler::{is_reserved, Builtin, CompilerMacro, Directive, PSEUDO_DEFINES};
pub use runtime::{
    command_line, quote_arg, CachedRuntime, Host, MacroHandle, MacroRuntime, ProcessOutput,
    RuntimeError,
};

use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use tracing::debug;

use super::lexer::{lex_in, Token, TokenTag};
use super::token_list::{NodeId, TokenList};
use crate::util::diagnostic::{CompileError, Result};
use crate::util::span::Location;

/// User defines and compiled macros of one compilation
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    defines: IndexMap<String, Vec<Token>>,
    macros: IndexMap<String, MacroHandle>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(
        &mut self,
        name: &str,
        tokens: Vec<Token>,
        location: &Location,
    ) -> Result<()> {
        self.check_free(name, location)?;
        debug!("Defined `{}!` as {} tokens", name, tokens.len());
        self.defines.insert(name.to_string(), tokens);
        Ok(())
    }

    pub fn add_macro(
        &mut self,
        handle: MacroHandle,
        location: &Location,
    ) -> Result<()> {
        self.check_free(&handle.name, location)?;
        self.macros.insert(handle.name.clone(), handle);
        Ok(())
    }

    pub fn get_define(
        &self,
        name: &str,
    ) -> Option<&[Token]> {
        self.defines.get(name).map(Vec::as_slice)
    }

    pub fn get_macro(
        &self,
        name: &str,
    ) -> Option<&MacroHandle> {
        self.macros.get(name)
    }

    pub fn is_defined(
        &self,
        name: &str,
    ) -> bool {
        self.defines.contains_key(name) || self.macros.contains_key(name)
    }

    /// Fail when `name` is already a define, a macro or reserved
    pub fn check_free(
        &self,
        name: &str,
        location: &Location,
    ) -> Result<()> {
        let existing = if self.defines.contains_key(name) {
            "define"
        } else if self.macros.contains_key(name) {
            "macro"
        } else if is_reserved(name) {
            "compiler macro"
        } else {
            return Ok(());
        };
        Err(CompileError::NameCollision {
            location: location.clone(),
            name: format!("{}!", name),
            existing,
        })
    }
}

/// What the expander needs from the compilation it runs in
pub trait ExpansionContext {
    fn macros(&mut self) -> &mut MacroTable;

    fn runtime(&mut self) -> &mut dyn MacroRuntime;

    /// The file that included the current one, if any
    fn previous_file(&self) -> Option<String>;

    /// Carry out a compiler directive; `args` are the tokens between the
    /// parentheses
    fn directive(
        &mut self,
        directive: Directive,
        args: &[Token],
        at: &Token,
    ) -> Result<()>;
}

/// Expand every macro reference in `tokens`
pub fn expand_macros(
    tokens: &mut TokenList,
    ctx: &mut dyn ExpansionContext,
) -> Result<()> {
    let mut cur = tokens.head();
    while let Some(at) = cur {
        let tok = tokens.get(at).clone();
        let Some(name) = tok.macro_name().map(str::to_string) else {
            cur = tokens.next(at);
            continue;
        };

        if let Some(let_id) = tokens.prev(at).filter(|p| tokens.get(*p).is("let")) {
            cur = define_macro(tokens, ctx, let_id, at, &name)?;
            continue;
        }

        match CompilerMacro::from_name(&name) {
            Some(CompilerMacro::Directive(directive)) => {
                let (args, after) = call_args(tokens, at)?;
                let after = skip_semicolon(tokens, after);
                remove_span(tokens, at, after);
                debug!("Running {} at {}", directive, tok.location());
                ctx.directive(directive, &args, &tok)?;
                cur = after;
                continue;
            }
            Some(CompilerMacro::Builtin(_)) => {
                cur = tokens.next(at);
                continue;
            }
            None => {}
        }

        if PSEUDO_DEFINES.contains(&name.as_str()) {
            let literal = pseudo_define(&name, &tok, ctx.previous_file());
            let id = tokens.splice(at, 1, vec![literal]);
            cur = id.and_then(|id| tokens.next(id));
            continue;
        }

        if let Some(body) = ctx.macros().get_define(&name) {
            let replacement: Vec<Token> = body
                .iter()
                .map(|t| Token::synthetic(t.text.clone(), &tok))
                .collect();
            cur = tokens.splice(at, 1, replacement);
            continue;
        }

        if let Some(handle) = ctx.macros().get_macro(&name).cloned() {
            let (args, after) = call_args(tokens, at)?;
            let output = ctx
                .runtime()
                .invoke(&handle, &split_args(&args))
                .map_err(|err| macro_failed(&tok, &name, err))?;
            let replacement = lex_output(&output, &tok, &name)?;
            let count = span_len(tokens, at, after);
            cur = tokens.splice(at, count, replacement);
            continue;
        }

        return Err(CompileError::UnknownPreprocToken {
            location: tok.location(),
            name: tok.text.clone(),
        });
    }
    Ok(())
}

/// Handle `let name! ...`; returns where to continue scanning
fn define_macro(
    tokens: &mut TokenList,
    ctx: &mut dyn ExpansionContext,
    let_id: NodeId,
    at: NodeId,
    name: &str,
) -> Result<Option<NodeId>> {
    let tok = tokens.get(at).clone();
    let location = tok.location();
    let malformed = |message: String| CompileError::MalformedMacro {
        location: location.clone(),
        message,
    };

    let next = tokens
        .next(at)
        .ok_or_else(|| malformed(format!("`let {}` ends the file", tok.text)))?;

    if tokens.get(next).is("=") {
        let mut body = Vec::new();
        let mut cur = tokens.next(next);
        let end = loop {
            let id = cur.ok_or_else(|| malformed(format!("define `{}` is missing `;`", tok.text)))?;
            if tokens.get(id).is(";") {
                break id;
            }
            body.push(tokens.get(id).clone());
            cur = tokens.next(id);
        };
        let after = tokens.next(end);
        remove_span(tokens, let_id, after);
        ctx.macros().define(name, body, &location)?;
        return Ok(after);
    }

    if tokens.get(next).is("(") {
        let body_open = find_token(tokens, next, "{")
            .ok_or_else(|| malformed(format!("macro `{}` has no body", tok.text)))?;
        let body_close = matching_close(tokens, body_open)
            .ok_or_else(|| malformed(format!("macro `{}` body is not closed", tok.text)))?;

        let captured = collect_through(tokens, next, body_close);
        let source = format!("let main{}\n", render_source(&captured));

        let after = skip_semicolon(tokens, tokens.next(body_close));
        remove_span(tokens, let_id, after);

        ctx.macros().check_free(name, &location)?;
        let handle = ctx
            .runtime()
            .compile(name, &source)
            .map_err(|err| macro_failed(&tok, name, err))?;
        ctx.macros().add_macro(handle, &location)?;
        return Ok(after);
    }

    Err(malformed(format!(
        "`let {}` must be followed by `=` or `(`",
        tok.text
    )))
}

/// Tokens from `from` up to and including `last`
fn collect_through(
    tokens: &TokenList,
    from: NodeId,
    last: NodeId,
) -> Vec<Token> {
    let mut out = Vec::new();
    for (id, tok) in tokens.iter_from(from) {
        out.push(tok.clone());
        if id == last {
            break;
        }
    }
    out
}

/// Render captured tokens back to source, one line per source line
fn render_source(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut line = tokens.first().map(|t| t.pos.line).unwrap_or(0);
    for tok in tokens {
        if tok.pos.line > line {
            out.push('\n');
            line = tok.pos.line;
        } else {
            out.push(' ');
        }
        out.push_str(&tok.text);
    }
    out
}

fn find_token(
    tokens: &TokenList,
    from: NodeId,
    text: &str,
) -> Option<NodeId> {
    tokens.iter_from(from).find(|(_, t)| t.is(text)).map(|(id, _)| id)
}

/// Matching closer for the bracket at `open`
fn matching_close(
    tokens: &TokenList,
    open: NodeId,
) -> Option<NodeId> {
    let (o, c) = match tokens.get(open).text.as_str() {
        "(" => ("(", ")"),
        "{" => ("{", "}"),
        "[" => ("[", "]"),
        _ => return None,
    };
    let mut depth = 0usize;
    for (id, tok) in tokens.iter_from(open) {
        if tok.is(o) {
            depth += 1;
        } else if tok.is(c) {
            depth -= 1;
            if depth == 0 {
                return Some(id);
            }
        }
    }
    None
}

/// Tokens between the parentheses following `at`, and the node after `)`
fn call_args(
    tokens: &TokenList,
    at: NodeId,
) -> Result<(Vec<Token>, Option<NodeId>)> {
    let tok = tokens.get(at);
    let malformed = || CompileError::MalformedMacro {
        location: tok.location(),
        message: format!("`{}` must be called with parentheses", tok.text),
    };
    let open = tokens.next(at).filter(|id| tokens.get(*id).is("(")).ok_or_else(malformed)?;
    let close = matching_close(tokens, open).ok_or_else(malformed)?;

    let mut args = Vec::new();
    let mut cur = tokens.next(open);
    while let Some(id) = cur.filter(|id| *id != close) {
        args.push(tokens.get(id).clone());
        cur = tokens.next(id);
    }
    Ok((args, tokens.next(close)))
}

/// Split argument tokens at top-level commas, rendering each argument
pub fn split_args(args: &[Token]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut depth = 0i32;
    for tok in args {
        match tok.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            "," if depth == 0 => {
                out.push(current.join(" "));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(&tok.text);
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

fn skip_semicolon(
    tokens: &TokenList,
    at: Option<NodeId>,
) -> Option<NodeId> {
    match at {
        Some(id) if tokens.get(id).is(";") => tokens.next(id),
        other => other,
    }
}

/// Number of live nodes from `from` up to (not including) `until`
fn span_len(
    tokens: &TokenList,
    from: NodeId,
    until: Option<NodeId>,
) -> usize {
    tokens
        .iter_from(from)
        .take_while(|(id, _)| Some(*id) != until)
        .count()
}

fn remove_span(
    tokens: &mut TokenList,
    from: NodeId,
    until: Option<NodeId>,
) {
    let count = span_len(tokens, from, until);
    tokens.splice(from, count, Vec::new());
}

fn macro_failed(
    at: &Token,
    name: &str,
    err: RuntimeError,
) -> CompileError {
    CompileError::MacroFailed {
        location: at.location(),
        name: name.to_string(),
        message: err.to_string(),
    }
}

/// Lex macro output, attributing every token to the call site
fn lex_output(
    output: &str,
    at: &Token,
    name: &str,
) -> Result<Vec<Token>> {
    let tokens = lex_in(output, at.file.clone()).map_err(|err| CompileError::MacroFailed {
        location: at.location(),
        name: name.to_string(),
        message: format!("output does not lex: {}", err),
    })?;
    Ok(tokens
        .into_iter()
        .map(|t| Token::new(t.text, t.tag, at.pos, at.file.clone()))
        .collect())
}

/// Literal token for a pseudo-define
fn pseudo_define(
    name: &str,
    at: &Token,
    previous_file: Option<String>,
) -> Token {
    let quoted = |s: &str| format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""));
    let (text, tag) = match name {
        "line" => (at.pos.line.to_string(), TokenTag::Number),
        "file" => (quoted(at.file.as_str()), TokenTag::Str),
        "prev_file" => (quoted(previous_file.as_deref().unwrap_or("")), TokenTag::Str),
        "comp_time" => {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            (format!("{}u64", secs), TokenTag::Number)
        }
        "version" => (quoted(crate::VERSION), TokenTag::Str),
        _ => (quoted(std::env::consts::OS), TokenTag::Str),
    };
    Token::new(text, tag, at.pos, at.file.clone())
}
