//! Per-file translation
//!
//! ```text
//! read -> style checks -> lex -> expand_macros -> apply_rules
//!      -> substitute_operators -> sequence_file
//! ```
//!
//! Includes re-enter [`translate_file`] from the macro expander. The
//! cursor and the file's active rules are saved around every file and
//! restored afterwards, whether it succeeded or not.

use std::fs;
use std::mem;
use std::path::Path;

use tracing::{debug, info, warn};

use super::context::{CompileContext, Cursor};
use super::dump::{write_dump, FailureDump};
use super::style;
use crate::frontend::lexer::lex;
use crate::frontend::operators::substitute_operators;
use crate::frontend::preprocess::expand_macros;
use crate::frontend::rules::apply_rules;
use crate::frontend::token_list::TokenList;
use crate::middle::sequence::sequence_file;
use crate::util::diagnostic::{CompileError, Phase, Result, ResultExt};

/// Translate the file at `path`, once per compilation
pub fn translate_file(
    ctx: &mut CompileContext,
    path: &Path,
) -> Result<()> {
    let name = path.display().to_string();
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if ctx.visited.contains(&canonical) {
        debug!("Skipping {}, already translated", name);
        return Ok(());
    }
    let source = fs::read_to_string(path)
        .map_err(|err| CompileError::io(path, err))
        .in_file(&name, Phase::Reading)?;
    ctx.visited.insert(canonical);
    translate_source(ctx, &name, &source)
}

/// Translate `source` as if read from a file called `name`
pub fn translate_source(
    ctx: &mut CompileContext,
    name: &str,
    source: &str,
) -> Result<()> {
    let prev_file = (!ctx.cursor.file.is_empty()).then(|| ctx.cursor.file.clone());
    let saved_cursor = mem::replace(
        &mut ctx.cursor,
        Cursor {
            file: name.to_string(),
            prev_file,
            line: 1,
        },
    );
    let saved_rules = ctx.rules.swap_active(Vec::new());

    let result = run_phases(ctx, name, source);

    ctx.rules.swap_active(saved_rules);
    ctx.cursor = saved_cursor;
    result
}

fn run_phases(
    ctx: &mut CompileContext,
    name: &str,
    source: &str,
) -> Result<()> {
    info!("Translating {}", name);
    if ctx.config.checks_style() {
        style::check_file(ctx, Path::new(name), source);
    }

    let tokens = lex(source, name).map_err(CompileError::from).in_file(name, Phase::Lexing)?;
    let mut list = TokenList::from_tokens(tokens);

    let mut phase = Phase::Preprocessing;
    let outcome = phases(ctx, &mut list, &mut phase);
    if let Err(err) = &outcome {
        if ctx.config.dump_on_error {
            let dump = FailureDump::new(name, phase, err, &list.to_vec());
            match write_dump(&ctx.config.dump_dir(), &dump) {
                Ok(path) => info!("Wrote failure dump {}", path.display()),
                Err(io) => warn!("Could not write failure dump for {}: {}", name, io),
            }
        }
    }
    outcome.in_file(name, phase)
}

fn phases(
    ctx: &mut CompileContext,
    list: &mut TokenList,
    phase: &mut Phase,
) -> Result<()> {
    expand_macros(list, ctx)?;

    *phase = Phase::Rules;
    let rewrites = apply_rules(list, &ctx.rules);
    debug!("{} rule rewrites", rewrites);

    *phase = Phase::Operators;
    let tokens = substitute_operators(list.to_vec())?;

    *phase = Phase::Sequencing;
    sequence_file(ctx, &tokens)
}
