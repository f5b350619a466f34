//! Generic instantiation
//!
//! Generic definitions are kept as token templates and instantiated
//! eagerly, the first time a call or a type names them with concrete
//! types. An instance is ordinary code afterwards: functions become plain
//! overloads of the generic's name and structs and enums are registered
//! under their mangled names.
//!
//! ```text
//! request -> already present? -> candidates, newest first
//!         -> shape check -> memo -> pre -> body -> post
//! ```
//!
//! The substitution is recorded in the candidate's memo before its body is
//! sequenced, so a generic that (directly or not) needs itself terminates.

pub mod infer;
pub mod instance;


use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info};

pub use infer::{infer_candidate, InstanceIndex};
pub use instance::{InstantiationRequest, RequestKind, SpecializationKey};

use crate::driver::CompileContext;
use crate::frontend::lexer::Token;
use crate::frontend::types::compare::pointer_shape;
use crate::frontend::types::{compare, Tier, Type};
use crate::middle::mangle::mangle_generic;
use crate::middle::sequence::decl::{sequence_definitions, AUTOGEN_TAG};
use crate::middle::sequence::stmt::check_block;
use crate::middle::sequence::types::{parse_type_tokens, type_tokens};
use crate::util::diagnostic::{codes, CompileError, Diagnostic, Result};
use crate::util::span::Location;

/// What a generic definition produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericKind {
    Function,
    Struct,
    Enum,
}

/// One generic definition of a name
#[derive(Debug, Clone)]
pub struct GenericCandidate {
    pub kind: GenericKind,
    /// Generic parameter names
    pub params: Vec<String>,
    /// Declared function parameters: name and type tokens
    pub signature: Vec<(String, Vec<Token>)>,
    /// Return type tokens; empty means `void`
    pub ret: Vec<Token>,
    /// `{ ... }` including the braces
    pub body: Vec<Token>,
    /// Contents of the `pre { ... }` block
    pub pre: Option<Vec<Token>>,
    /// Contents of the `post { ... }` block
    pub post: Option<Vec<Token>>,
    pub origin: String,
    /// Where the definition starts, for synthesized tokens
    pub at: Token,
    instantiated: HashSet<Vec<Type>>,
}

impl GenericCandidate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: GenericKind,
        params: Vec<String>,
        signature: Vec<(String, Vec<Token>)>,
        ret: Vec<Token>,
        body: Vec<Token>,
        pre: Option<Vec<Token>>,
        post: Option<Vec<Token>>,
        at: Token,
    ) -> Self {
        Self {
            kind,
            params,
            signature,
            ret,
            body,
            pre,
            post,
            origin: at.file.to_string(),
            at,
            instantiated: HashSet::new(),
        }
    }

    /// Same parameters, declared types and body
    pub fn same_shape(
        &self,
        other: &GenericCandidate,
    ) -> bool {
        self.kind == other.kind
            && self.params == other.params
            && self.signature == other.signature
            && self.ret == other.ret
            && self.body == other.body
            && self.pre == other.pre
            && self.post == other.post
    }

    /// Substitutions already instantiated from this candidate
    pub fn instances(&self) -> usize {
        self.instantiated.len()
    }

    /// Replace every generic parameter in `tokens` with its type
    fn substitute(
        &self,
        tokens: &[Token],
        substitution: &[Vec<Token>],
    ) -> Vec<Token> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            match self.params.iter().position(|p| token.is(p)) {
                Some(i) => out.extend(substitution[i].iter().map(|t| Token::synthetic(t.text.clone(), token))),
                None => out.push(token.clone()),
            }
        }
        out
    }
}

/// Generic candidates by base name, in registration order
#[derive(Debug, Clone, Default)]
pub struct GenericTable {
    candidates: IndexMap<String, Vec<GenericCandidate>>,
}

impl GenericTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate; returns `false` when one of identical shape exists
    pub fn register(
        &mut self,
        name: &str,
        candidate: GenericCandidate,
    ) -> bool {
        let list = self.candidates.entry(name.to_string()).or_default();
        if list.iter().any(|c| c.same_shape(&candidate)) {
            return false;
        }
        list.push(candidate);
        true
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.candidates.contains_key(name)
    }

    pub fn candidates(
        &self,
        name: &str,
    ) -> &[GenericCandidate] {
        self.candidates.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn candidate_mut(
        &mut self,
        name: &str,
        index: usize,
    ) -> Option<&mut GenericCandidate> {
        self.candidates.get_mut(name)?.get_mut(index)
    }

    /// Total number of instances across every generic
    pub fn instance_count(&self) -> usize {
        self.candidates.values().flatten().map(GenericCandidate::instances).sum()
    }
}

/// Register a generic definition, warning about identical re-registration
pub fn register_generic(
    ctx: &mut CompileContext,
    name: &str,
    candidate: GenericCandidate,
) {
    let location = candidate.at.location();
    if ctx.generics.register(name, candidate) {
        debug!("Registered generic `{}`", name);
    } else {
        ctx.warnings.push(Diagnostic::warning(
            codes::DUPLICATE_GENERIC,
            format!("generic `{}` registered again with an identical shape", name),
            Some(location),
        ));
    }
}

/// Substitution for an implicit call, from the newest candidate that fits
pub fn infer_substitution(
    ctx: &CompileContext,
    name: &str,
    arg_types: &[Type],
    location: &Location,
) -> Result<Vec<Type>> {
    let mut reasons = Vec::new();
    for (i, candidate) in ctx.generics.candidates(name).iter().enumerate().rev() {
        match infer_candidate(candidate, arg_types, &ctx.instances) {
            Ok(substitution) => return Ok(substitution),
            Err(reason) => reasons.push(format!("  candidate #{} ({}): {}", i, candidate.origin, reason)),
        }
    }
    Err(CompileError::NoViableCandidate {
        location: location.clone(),
        name: name.to_string(),
        reasons: reasons.join("\n"),
    })
}

/// Make sure the instance `request` describes exists
pub fn instantiate(
    ctx: &mut CompileContext,
    request: &InstantiationRequest,
) -> Result<()> {
    let key = request.specialization_key();
    if already_present(ctx, request) {
        debug!("`{}` already present", key);
        return Ok(());
    }

    let count = ctx.generics.candidates(&request.name).len();
    if count == 0 {
        return Err(CompileError::NoViableCandidate {
            location: request.location.clone(),
            name: request.name.clone(),
            reasons: format!("  no generic named `{}`", request.name),
        });
    }

    let mut reasons = Vec::new();
    for index in (0..count).rev() {
        let candidate = ctx.generics.candidates(&request.name)[index].clone();
        let reject = |reason: String| format!("  candidate #{} ({}): {}", index, candidate.origin, reason);

        let wants_type = request.kind == RequestKind::Type;
        if wants_type == (candidate.kind == GenericKind::Function) {
            reasons.push(reject(if wants_type {
                "is a function, not a type".to_string()
            } else {
                "is a type, not a function".to_string()
            }));
            continue;
        }
        if candidate.params.len() != request.substitution.len() {
            reasons.push(reject(format!(
                "takes {} generic parameters, {} given",
                candidate.params.len(),
                request.substitution.len()
            )));
            continue;
        }

        let substitution: Vec<Vec<Token>> = request
            .substitution
            .iter()
            .map(|t| type_tokens(t, &candidate.at))
            .collect();

        let mut params = Vec::new();
        if candidate.kind == GenericKind::Function {
            match declared_types(ctx, &candidate, &substitution, &request.call_site) {
                Ok(declared) => params = declared,
                Err(reason) => {
                    reasons.push(reject(reason));
                    continue;
                }
            }
        }

        if candidate.instantiated.contains(&request.substitution) {
            debug!("`{}` already instantiated from candidate #{}", key, index);
            return Ok(());
        }
        remember(ctx, &request.name, index, &request.substitution, true);

        if let Some(pre) = &candidate.pre {
            let block = candidate.substitute(pre, &substitution);
            if let Err(err) = check_block(ctx, &params, &block) {
                remember(ctx, &request.name, index, &request.substitution, false);
                reasons.push(reject(format!("pre-condition failed: {}", err)));
                continue;
            }
        }

        info!("Instantiating {} from {}", key, candidate.origin);
        emit_instance(ctx, request, &candidate, &substitution).map_err(|err| CompileError::Instantiation {
            location: request.location.clone(),
            name: key.to_string(),
            message: err.to_string(),
        })?;

        if let Some(post) = &candidate.post {
            let block = candidate.substitute(post, &substitution);
            check_block(ctx, &params, &block).map_err(|err| CompileError::PostCondition {
                location: request.location.clone(),
                name: key.to_string(),
                source: Box::new(err),
            })?;
        }
        return Ok(());
    }

    Err(CompileError::NoViableCandidate {
        location: request.location.clone(),
        name: key.to_string(),
        reasons: reasons.join("\n"),
    })
}

fn already_present(
    ctx: &CompileContext,
    request: &InstantiationRequest,
) -> bool {
    match request.kind {
        RequestKind::Type => {
            let mangled = mangle_generic(&request.name, &request.substitution);
            ctx.structs.contains_key(&mangled) || ctx.enums.contains_key(&mangled)
        }
        RequestKind::Call => ctx
            .symbols
            .find_overload(&request.name, &request.call_site)
            .is_some_and(|index| !ctx.symbols.get(index).tags.contains(AUTOGEN_TAG)),
    }
}

fn remember(
    ctx: &mut CompileContext,
    name: &str,
    index: usize,
    substitution: &[Type],
    add: bool,
) {
    if let Some(candidate) = ctx.generics.candidate_mut(name, index) {
        if add {
            candidate.instantiated.insert(substitution.to_vec());
        } else {
            candidate.instantiated.remove(substitution);
        }
    }
}

/// Declared parameter types with the substitution applied, checked
/// against the call site
fn declared_types(
    ctx: &mut CompileContext,
    candidate: &GenericCandidate,
    substitution: &[Vec<Token>],
    call_site: &[Type],
) -> std::result::Result<Vec<(String, Type)>, String> {
    if candidate.signature.len() != call_site.len() {
        return Err(format!(
            "takes {} arguments, {} given",
            candidate.signature.len(),
            call_site.len()
        ));
    }
    let mut params = Vec::new();
    for ((name, tokens), actual) in candidate.signature.iter().zip(call_site) {
        let tokens = candidate.substitute(tokens, substitution);
        let declared = parse_type_tokens(ctx, &tokens).map_err(|e| e.to_string())?;
        let actual = actual.without_names();
        let aligned = pointer_shape(&declared) == pointer_shape(&actual);
        if !aligned || compare(&declared, &actual, Tier::Casting).is_none() {
            return Err(format!("argument `{}`: expected `{}`, found `{}`", name, declared, actual));
        }
        params.push((name.clone(), declared));
    }
    Ok(params)
}

/// Rebuild the definition with concrete types and sequence it
fn emit_instance(
    ctx: &mut CompileContext,
    request: &InstantiationRequest,
    candidate: &GenericCandidate,
    substitution: &[Vec<Token>],
) -> Result<()> {
    let at = &candidate.at;
    let tok = |text: &str| Token::synthetic(text, at);
    let mut tokens = vec![tok("let")];

    match candidate.kind {
        GenericKind::Function => {
            tokens.push(tok(&request.name));
            tokens.push(tok("("));
            for (i, (name, ty)) in candidate.signature.iter().enumerate() {
                if i > 0 {
                    tokens.push(tok(","));
                }
                tokens.push(tok(name));
                tokens.push(tok(":"));
                tokens.extend(candidate.substitute(ty, substitution));
            }
            tokens.push(tok(")"));
            if !candidate.ret.is_empty() {
                tokens.push(tok("->"));
                tokens.extend(candidate.substitute(&candidate.ret, substitution));
            }
        }
        GenericKind::Struct | GenericKind::Enum => {
            let mangled = mangle_generic(&request.name, &request.substitution);
            ctx.instances
                .insert(mangled.clone(), (request.name.clone(), request.substitution.clone()));
            tokens.push(tok(&mangled));
            tokens.push(tok(":"));
            tokens.push(tok(if candidate.kind == GenericKind::Struct { "struct" } else { "enum" }));
        }
    }
    tokens.extend(candidate.substitute(&candidate.body, substitution));

    sequence_definitions(ctx, &tokens)
}
