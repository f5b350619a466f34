//! Call resolution
//!
//! A call picks the best live overload: every argument is compared with
//! its parameter and the overload is ranked by its worst tier, then by the
//! total number of changes. The winner's arguments are adjusted to fit
//! (`&` / `*` for pointer levels, a cast for a literal-family change).
//!
//! When nothing fits, operator calls on primitives fall back to the C
//! operator, and names with generic candidates are instantiated from the
//! argument types before resolving again.

use tracing::debug;

use super::ast::{ASTKind, ASTNode};
use super::cursor::split_commas;
use super::decl::AUTOGEN_TAG;
use super::expr::{address_of, deref, sequence_expr};
use crate::driver::CompileContext;
use crate::frontend::lexer::Token;
use crate::frontend::operators::c_operator;
use crate::frontend::types::compare::pointer_shape;
use crate::frontend::types::{best_match, compare, Match, Tier, Type};
use crate::middle::generics::{infer_substitution, instantiate, InstantiationRequest};
use crate::util::diagnostic::{CompileError, Result};
use crate::util::span::Location;

/// Sequence `name(args)` or `name<explicit>(args)`
pub fn sequence_call(
    ctx: &mut CompileContext,
    name: &Token,
    explicit: Option<Vec<Type>>,
    arg_tokens: &[Token],
) -> Result<ASTNode> {
    let location = name.location();
    let args = split_commas(arg_tokens)
        .into_iter()
        .map(|part| sequence_expr(ctx, part))
        .collect::<Result<Vec<_>>>()?;
    let arg_types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();

    let explicit_given = explicit.is_some();
    if let Some(substitution) = explicit {
        let request = InstantiationRequest::call(&name.text, substitution, arg_types.clone(), location.clone());
        instantiate(ctx, &request)?;
    }

    if let Some(index) = resolve(ctx, &name.text, &args) {
        let generated = ctx.symbols.get(index).tags.contains(AUTOGEN_TAG);
        if generated && !explicit_given && ctx.generics.contains(&name.text) {
            // a user generic for the same name takes over a generated function
            if let Ok(substitution) = infer_substitution(ctx, &name.text, &arg_types, &location) {
                let request = InstantiationRequest::call(&name.text, substitution, arg_types.clone(), location.clone());
                instantiate(ctx, &request)?;
                if let Some(index) = resolve(ctx, &name.text, &args) {
                    return Ok(emit_call(ctx, index, args));
                }
            }
        }
        return Ok(emit_call(ctx, index, args));
    }

    if c_operator(&name.text).is_some() {
        if let Some(node) = builtin_operator(&name.text, &args, &location)? {
            return Ok(node);
        }
    }

    if !explicit_given && ctx.generics.contains(&name.text) {
        let substitution = infer_substitution(ctx, &name.text, &arg_types, &location)?;
        debug!("Inferred substitution for `{}` at {}", name.text, location);
        let request = InstantiationRequest::call(&name.text, substitution, arg_types.clone(), location.clone());
        instantiate(ctx, &request)?;
        if let Some(index) = resolve(ctx, &name.text, &args) {
            return Ok(emit_call(ctx, index, args));
        }
    }

    Err(no_overload(ctx, &name.text, &arg_types, location))
}

/// Best live overload of `name` for `args`
pub fn resolve(
    ctx: &CompileContext,
    name: &str,
    args: &[ASTNode],
) -> Option<usize> {
    ctx.symbols
        .overloads(name)
        .into_iter()
        .filter_map(|(index, symbol)| rank(&symbol.ty.params(), args).map(|m| (m, index)))
        .min_by_key(|(m, _)| *m)
        .map(|(_, index)| index)
}

/// Rank of an overload: worst tier over all arguments, summed changes
fn rank(
    params: &[Type],
    args: &[ASTNode],
) -> Option<Match> {
    if params.len() != args.len() {
        return None;
    }
    let mut total = Match {
        tier: Tier::Exact,
        changes: 0,
    };
    for (param, arg) in params.iter().zip(args) {
        let m = argument_match(param, arg)?;
        total.tier = total.tier.max(m.tier);
        total.changes += m.changes;
    }
    Some(total)
}

/// How well `arg` fits `param`, if it can be adjusted to fit at all.
///
/// Pointer levels may only differ at the front, and a missing level can
/// only be supplied for an lvalue.
pub fn argument_match(
    param: &Type,
    arg: &ASTNode,
) -> Option<Match> {
    let param = param.without_names();
    let m = best_match(&param, &arg.ty)?;
    if pointer_shape(&param.base()) != pointer_shape(&arg.ty.base()) {
        return None;
    }
    let (want, have) = (param.pointer_depth(), arg.ty.pointer_depth());
    if want > have && (want - have > 1 || !arg.is_lvalue()) {
        return None;
    }
    Some(m)
}

/// Adjust `arg` to exactly `param`
pub fn coerce(
    arg: ASTNode,
    param: &Type,
) -> ASTNode {
    let param = param.without_names();
    let mut node = arg;
    while node.ty.pointer_depth() < param.pointer_depth() {
        node = address_of(node);
    }
    while node.ty.pointer_depth() > param.pointer_depth() {
        node = deref(node);
    }
    if compare(&node.ty, &param, Tier::Exact).is_none() {
        node = ASTNode::keyword("cast", param, vec![node]);
    }
    node
}

fn emit_call(
    ctx: &CompileContext,
    index: usize,
    args: Vec<ASTNode>,
) -> ASTNode {
    let symbol = ctx.symbols.get(index);
    let ret = symbol.ty.return_type().unwrap_or_else(|| Type::atomic("void"));
    let args = args
        .into_iter()
        .zip(symbol.ty.params())
        .map(|(arg, param)| coerce(arg, &param))
        .collect();
    ASTNode::call(symbol.mangled.clone(), ret, args)
}

fn no_overload(
    ctx: &CompileContext,
    name: &str,
    arg_types: &[Type],
    location: Location,
) -> CompileError {
    let args = arg_types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ");
    let overloads = ctx.symbols.overloads(name);
    if overloads.is_empty() {
        return CompileError::sequence(location, format!("unknown function `{}({})`", name, args));
    }
    let known = overloads
        .iter()
        .map(|(_, s)| format!("\n  {}{}", name, s.ty.without_names()))
        .collect::<String>();
    CompileError::sequence(
        location,
        format!("no overload of `{}` accepts ({}); candidates:{}", name, args, known),
    )
}

fn is_numeric(ty: &Type) -> bool {
    ty.is_integer() || ty.is_float()
}

fn is_pointer_like(ty: &Type) -> bool {
    ty.is_pointer() || ty.is_atomic("str")
}

/// Struct or enum values, assigned by plain C assignment
fn is_aggregate(ty: &Type) -> bool {
    ty.atomic_name().is_some_and(|name| name != "void") && !ty.is_scalar() && !ty.is_atomic("str")
}

fn same_type(
    l: &Type,
    r: &Type,
) -> bool {
    l.without_names() == r.without_names()
}

fn is_literal(node: &ASTNode) -> bool {
    node.kind == ASTKind::Atom && !node.is_lvalue()
}

fn bits(ty: &Type) -> u32 {
    ty.atomic_name()
        .and_then(|n| n[1..].parse().ok())
        .unwrap_or(0)
}

/// Result type of a C arithmetic operator
fn arithmetic_result(
    lhs: &ASTNode,
    rhs: &ASTNode,
) -> Type {
    let (l, r) = (&lhs.ty, &rhs.ty);
    if l == r || is_literal(rhs) {
        return l.clone();
    }
    if is_literal(lhs) {
        return r.clone();
    }
    if l.is_float() || r.is_float() {
        return if l.is_atomic("f64") || r.is_atomic("f64") {
            Type::atomic("f64")
        } else {
            Type::atomic("f32")
        };
    }
    if bits(r) > bits(l) {
        r.clone()
    } else {
        l.clone()
    }
}

/// Lower an operator call on primitives to its C operator.
///
/// `Ok(None)` when the operands are not primitives the operator accepts.
pub fn builtin_operator(
    name: &str,
    args: &[ASTNode],
    location: &Location,
) -> Result<Option<ASTNode>> {
    let (Some(op), [lhs, rhs]) = (c_operator(name), args) else {
        return Ok(None);
    };
    let (l, r) = (&lhs.ty, &rhs.ty);
    let void = Type::atomic("void");
    let boolean = Type::atomic("bool");

    let ty = match name {
        "Copy" => {
            let by_value = same_type(l, r) && (is_pointer_like(l) || is_aggregate(l));
            ((l.is_scalar() && r.is_scalar()) || by_value).then_some(void)
        }
        "AddEq" | "SubEq" => ((is_numeric(l) && is_numeric(r)) || (l.is_pointer() && r.is_integer())).then_some(void),
        "MultEq" | "DivEq" | "ModEq" => (is_numeric(l) && is_numeric(r)).then_some(void),
        "AndEq" | "OrEq" => (l.is_integer() && r.is_integer()).then_some(void),
        "Add" | "Sub" if l.is_pointer() && r.is_integer() => Some(l.clone()),
        "Add" | "Sub" | "Mult" | "Div" => (is_numeric(l) && is_numeric(r)).then(|| arithmetic_result(lhs, rhs)),
        "Mod" => (l.is_integer() && r.is_integer()).then(|| arithmetic_result(lhs, rhs)),
        "Lbs" | "Rbs" => (l.is_integer() && r.is_integer()).then(|| l.clone()),
        "And" | "Or" => ((l.is_integer() && r.is_integer()) || (l.is_atomic("bool") && r.is_atomic("bool")))
            .then(|| arithmetic_result(lhs, rhs)),
        "Less" | "Great" | "Leq" | "Geq" => {
            ((is_numeric(l) && is_numeric(r)) || (l == r && l.is_pointer())).then_some(boolean)
        }
        "Eq" | "Neq" => ((l.is_scalar() && r.is_scalar()) || (l == r && is_pointer_like(l))).then_some(boolean),
        "Andd" | "Orr" => {
            ((l.is_scalar() || l.is_pointer()) && (r.is_scalar() || r.is_pointer())).then_some(boolean)
        }
        _ => None,
    };
    let Some(ty) = ty else {
        return Ok(None);
    };

    if op.ends_with('=') && !matches!(op, "==" | "!=" | "<=" | ">=") && !lhs.is_lvalue() {
        return Err(CompileError::sequence(
            location.clone(),
            format!("left side of `{}` is not assignable", op),
        ));
    }
    Ok(Some(ASTNode::keyword(op, ty, vec![lhs.clone(), rhs.clone()])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(
        name: &str,
        ty: Type,
    ) -> ASTNode {
        ASTNode::atom(name, ty)
    }

    fn lit(
        text: &str,
        ty: &str,
    ) -> ASTNode {
        ASTNode::atom(text, Type::atomic(ty))
    }

    #[test]
    fn test_argument_match_auto_ref_needs_lvalue() {
        let param = Type::atomic("i32").pointer_to();
        let m = argument_match(&param, &var("x", Type::atomic("i32"))).unwrap();
        assert_eq!(m.tier, Tier::AutoRef);
        assert!(argument_match(&param, &lit("3", "i32")).is_none());
    }

    #[test]
    fn test_argument_match_rejects_inner_pointer_skips() {
        let param = Type::from_nodes([
            crate::frontend::types::TypeNode::Array,
            crate::frontend::types::TypeNode::Pointer,
            crate::frontend::types::TypeNode::Atomic("i32".into()),
        ]);
        let arg = Type::from_nodes([
            crate::frontend::types::TypeNode::Array,
            crate::frontend::types::TypeNode::Atomic("i32".into()),
        ]);
        assert!(argument_match(&param, &var("xs", arg)).is_none());
    }

    #[test]
    fn test_coerce_inserts_ref_and_cast() {
        let node = coerce(var("x", Type::atomic("i32")), &Type::atomic("i32").pointer_to());
        assert_eq!(node.text, "&");

        let node = coerce(lit("3", "i32"), &Type::atomic("u8"));
        assert_eq!(node.text, "cast");
        assert_eq!(node.ty, Type::atomic("u8"));

        let node = coerce(var("p", Type::atomic("f64").pointer_to()), &Type::atomic("f64"));
        assert_eq!(node.text, "*");
    }

    #[test]
    fn test_builtin_arithmetic_types() {
        let loc = Location::default();
        let sum = builtin_operator("Add", &[var("a", Type::atomic("u8")), lit("1", "i32")], &loc)
            .unwrap()
            .unwrap();
        assert_eq!(sum.text, "+");
        assert_eq!(sum.ty, Type::atomic("u8"));

        let wide = builtin_operator("Mult", &[var("a", Type::atomic("i16")), var("b", Type::atomic("i64"))], &loc)
            .unwrap()
            .unwrap();
        assert_eq!(wide.ty, Type::atomic("i64"));

        let cmp = builtin_operator("Less", &[var("a", Type::atomic("f32")), var("b", Type::atomic("f64"))], &loc)
            .unwrap()
            .unwrap();
        assert_eq!(cmp.ty, Type::atomic("bool"));
    }

    #[test]
    fn test_builtin_pointer_rules() {
        let loc = Location::default();
        let p = || var("p", Type::atomic("i32").pointer_to());
        let q = || var("q", Type::atomic("u8").pointer_to());

        assert!(builtin_operator("Eq", &[p(), p()], &loc).unwrap().is_some());
        assert!(builtin_operator("Eq", &[p(), q()], &loc).unwrap().is_none());
        assert!(builtin_operator("Copy", &[p(), p()], &loc).unwrap().is_some());
        assert!(builtin_operator("Mult", &[p(), p()], &loc).unwrap().is_none());
        let moved = builtin_operator("Add", &[p(), lit("1", "i32")], &loc).unwrap().unwrap();
        assert_eq!(moved.ty, Type::atomic("i32").pointer_to());
    }

    #[test]
    fn test_assignment_needs_lvalue() {
        let loc = Location::default();
        let err = builtin_operator("Copy", &[lit("1", "i32"), lit("2", "i32")], &loc).unwrap_err();
        assert!(err.to_string().contains("not assignable"));
    }

    #[test]
    fn test_struct_values_copy_by_assignment() {
        let loc = Location::default();
        let s = || var("s", Type::atomic("Point"));
        let t = || var("t", Type::atomic("Line"));
        let copy = builtin_operator("Copy", &[s(), s()], &loc).unwrap().unwrap();
        assert_eq!(copy.text, "=");
        assert_eq!(copy.ty, Type::atomic("void"));
        assert!(builtin_operator("Copy", &[s(), t()], &loc).unwrap().is_none());
        assert!(builtin_operator("Copy", &[s(), lit("1", "i32")], &loc).unwrap().is_none());
        assert!(builtin_operator("Add", &[s(), s()], &loc).unwrap().is_none());
        assert!(builtin_operator("Eq", &[s(), s()], &loc).unwrap().is_none());
    }
}
