//! Compiler directives
//!
//! Run by the macro expander as soon as it meets them, so an included
//! file is fully translated before the rest of the including file.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::context::CompileContext;
use super::packages::resolve_package;
use super::pipeline::translate_file;
use crate::frontend::lexer::{lex, Token, TokenTag};
use crate::frontend::preprocess::Directive;
use crate::frontend::rules::Rule;
use crate::middle::sequence::cursor::split_commas;
use crate::middle::sequence::expr::unescape;
use crate::util::diagnostic::{CompileError, Result};

/// Carry out `directive` with the tokens between its parentheses
pub fn run(
    ctx: &mut CompileContext,
    directive: Directive,
    args: &[Token],
    at: &Token,
) -> Result<()> {
    let args = string_args(directive, args, at)?;
    let location = at.location();

    match directive {
        Directive::Include => {
            for file in &args {
                let path = relative_to_current(ctx, file);
                translate_file(ctx, &path)?;
            }
        }
        Directive::Package => {
            for name in &args {
                let files = resolve_package(ctx, name, &location)?;
                info!("Including package `{}` ({} files)", name, files.len());
                for path in files {
                    translate_file(ctx, &path)?;
                }
            }
        }
        Directive::Link => {
            for object in args {
                if !ctx.links.contains(&object) {
                    ctx.links.push(object);
                }
            }
        }
        Directive::Flag => {
            for flag in args {
                if !ctx.flags.contains(&flag) {
                    ctx.flags.push(flag);
                }
            }
        }
        Directive::Tag => {
            let file = ctx.cursor.file.clone();
            ctx.file_tags.entry(file).or_default().extend(args);
        }
        Directive::NewRule => {
            let [name, engine, input, output] = args.as_slice() else {
                return Err(malformed(at, "new_rule! takes a name, an engine, an input and an output"));
            };
            let file = at.file.as_str();
            let input = lex(input, file)?;
            let output = lex(output, file)?;
            let rule = Rule::new(name, engine, input, output)?;
            ctx.rules.define(rule, &location)?;
        }
        Directive::UseRule => {
            for name in &args {
                ctx.rules.activate(name, &location)?;
            }
        }
        Directive::RemRule => {
            for name in &args {
                ctx.rules.deactivate(name, &location)?;
            }
        }
        Directive::DialectRule => {
            for name in &args {
                ctx.rules.add_dialect(name, &location)?;
            }
        }
        Directive::ClearRules => ctx.rules.clear_active(),
        Directive::Erase => {
            for name in &args {
                let count = ctx.symbols.erase_name(name);
                debug!("Erased {} symbols named `{}`", count, name);
            }
        }
    }
    Ok(())
}

/// Every argument of a directive is a single string literal
fn string_args(
    directive: Directive,
    args: &[Token],
    at: &Token,
) -> Result<Vec<String>> {
    if args.is_empty() {
        return Ok(Vec::new());
    }
    split_commas(args)
        .into_iter()
        .map(|part| match part {
            [s] if s.tag == TokenTag::Str && s.text.len() >= 2 => Ok(unescape(&s.text[1..s.text.len() - 1])),
            _ => Err(malformed(at, &format!("arguments of {} must be strings", directive))),
        })
        .collect()
}

fn malformed(
    at: &Token,
    message: &str,
) -> CompileError {
    CompileError::MalformedMacro {
        location: at.location(),
        message: message.to_string(),
    }
}

/// `file` relative to the directory of the file being translated
fn relative_to_current(
    ctx: &CompileContext,
    file: &str,
) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match Path::new(&ctx.cursor.file).parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}
