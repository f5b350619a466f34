//! Substitution inference for implicit generic calls
//!
//! Each declared parameter type is matched against the argument type with
//! pointer depth aligned token by token. A generic parameter binds whatever
//! type remains, and `S<..>` matches a known instance of `S` argument by
//! argument.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{GenericCandidate, GenericKind};
use crate::frontend::lexer::{Token, TokenTag};
use crate::frontend::types::compare::pointer_shape;
use crate::frontend::types::{compare, Tier, Type, TypeNode};
use crate::middle::sequence::cursor::split_commas;

/// Mangled instance name to (generic name, type arguments)
pub type InstanceIndex = IndexMap<String, (String, Vec<Type>)>;

/// Infer a substitution for `candidate` from argument types
pub fn infer_candidate(
    candidate: &GenericCandidate,
    arg_types: &[Type],
    instances: &InstanceIndex,
) -> Result<Vec<Type>, String> {
    if candidate.kind != GenericKind::Function {
        return Err("is a type, not a function".to_string());
    }
    if candidate.signature.len() != arg_types.len() {
        return Err(format!(
            "takes {} arguments, {} given",
            candidate.signature.len(),
            arg_types.len()
        ));
    }

    let mut bindings: HashMap<String, Type> = HashMap::new();
    for ((param, declared), actual) in candidate.signature.iter().zip(arg_types) {
        unify_argument(declared, actual, &candidate.params, &mut bindings, instances)
            .map_err(|reason| format!("argument `{}`: {}", param, reason))?;
    }

    candidate
        .params
        .iter()
        .map(|p| {
            bindings
                .get(p)
                .cloned()
                .ok_or_else(|| format!("cannot infer `{}` from the arguments", p))
        })
        .collect()
}

fn unify_argument(
    declared: &[Token],
    actual: &Type,
    params: &[String],
    bindings: &mut HashMap<String, Type>,
    instances: &InstanceIndex,
) -> Result<(), String> {
    let actual = actual.without_names();
    unify(declared, actual.nodes(), params, bindings, instances)
}

fn unify(
    declared: &[Token],
    nodes: &[TypeNode],
    params: &[String],
    bindings: &mut HashMap<String, Type>,
    instances: &InstanceIndex,
) -> Result<(), String> {
    let mismatch = || {
        format!(
            "expected `{}`, found `{}`",
            crate::frontend::lexer::join_text(declared),
            Type::from_nodes(nodes.iter().cloned())
        )
    };

    let mut ti = 0;
    let mut ni = 0;
    while let Some(token) = declared.get(ti) {
        if token.is("^") {
            if nodes.get(ni) != Some(&TypeNode::Pointer) {
                return Err(mismatch());
            }
            ti += 1;
            ni += 1;
        } else if token.is("[") {
            match (declared.get(ti + 1), declared.get(ti + 2)) {
                (Some(close), _) if close.is("]") => {
                    if nodes.get(ni) != Some(&TypeNode::Array) {
                        return Err(mismatch());
                    }
                    ti += 2;
                }
                (Some(n), Some(close)) if close.is("]") => {
                    let size: usize = n.text.parse().map_err(|_| mismatch())?;
                    if nodes.get(ni) != Some(&TypeNode::SizedArray(size)) {
                        return Err(mismatch());
                    }
                    ti += 3;
                }
                _ => return Err(mismatch()),
            }
            ni += 1;
        } else if token.tag == TokenTag::Ident && params.contains(&token.text) {
            if ti + 1 != declared.len() || ni >= nodes.len() {
                return Err(mismatch());
            }
            let bound = Type::from_nodes(nodes[ni..].iter().cloned());
            return bind(&token.text, bound, bindings);
        } else if token.tag == TokenTag::Ident && declared.get(ti + 1).is_some_and(|t| t.is("<")) {
            let close = declared.len() - 1;
            if !declared[close].is(">") || ni + 1 != nodes.len() {
                return Err(mismatch());
            }
            let Some(TypeNode::Atomic(mangled)) = nodes.get(ni) else {
                return Err(mismatch());
            };
            let Some((generic, args)) = instances.get(mangled) else {
                return Err(mismatch());
            };
            let parts = split_commas(&declared[ti + 2..close]);
            if *generic != token.text || parts.len() != args.len() {
                return Err(mismatch());
            }
            for (part, arg) in parts.into_iter().zip(args) {
                unify(part, arg.nodes(), params, bindings, instances)?;
            }
            return Ok(());
        } else {
            if nodes.get(ni) != Some(&TypeNode::Atomic(token.text.clone())) {
                return Err(mismatch());
            }
            ti += 1;
            ni += 1;
        }
    }
    if ni == nodes.len() {
        Ok(())
    } else {
        Err(mismatch())
    }
}

/// Bind `param`; a second binding must agree up to literal-family casts
fn bind(
    param: &str,
    ty: Type,
    bindings: &mut HashMap<String, Type>,
) -> Result<(), String> {
    match bindings.get(param) {
        Some(existing)
            if pointer_shape(existing) == pointer_shape(&ty) && compare(existing, &ty, Tier::Casting).is_some() =>
        {
            Ok(())
        }
        Some(existing) => Err(format!("`{}` is both `{}` and `{}`", param, existing, ty)),
        None => {
            bindings.insert(param.to_string(), ty);
            Ok(())
        }
    }
}
