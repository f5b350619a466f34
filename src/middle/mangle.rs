//! Name mangling
//!
//! - functions: `name_<enc>` where `<enc>` spells the function type node
//!   by node (`FN`, `MAPS`, `JOIN`, `PTR`, `ARR`, `SARR<n>` and atomic
//!   names, var names left out), so overloads never collide
//! - generic structs and enums: `name_GEN_<enc>(_JOIN_<enc>)*_ENDGEN`
//! - `main` and anything with an empty type keep their names

use crate::frontend::types::{Type, TypeNode};

/// Canonical encoding of a type
pub fn encode_type(ty: &Type) -> String {
    if ty.is_null() {
        return String::new();
    }
    ty.nodes()
        .iter()
        .filter_map(|node| match node {
            TypeNode::Pointer => Some("PTR".to_string()),
            TypeNode::Atomic(name) => Some(name.clone()),
            TypeNode::Join => Some("JOIN".to_string()),
            TypeNode::Function => Some("FN".to_string()),
            TypeNode::Maps => Some("MAPS".to_string()),
            TypeNode::VarName(_) => None,
            TypeNode::Array => Some("ARR".to_string()),
            TypeNode::SizedArray(n) => Some(format!("SARR{}", n)),
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Mangled C name of a function symbol
pub fn mangle_function(
    name: &str,
    ty: &Type,
) -> String {
    let enc = encode_type(ty);
    if name == "main" || enc.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", name, enc)
    }
}

/// Mangled name of a generic struct or enum instance
pub fn mangle_generic(
    name: &str,
    args: &[Type],
) -> String {
    if args.is_empty() {
        return name.to_string();
    }
    let args = args.iter().map(encode_type).collect::<Vec<_>>().join("_JOIN_");
    format!("{}_GEN_{}_ENDGEN", name, args)
}
