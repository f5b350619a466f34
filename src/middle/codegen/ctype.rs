//! Type mapping: Oak types to C types
//!
//! - Primitives map directly to `<stdint.h>` / `<stdbool.h>` types
//! - `^T` and `[]T` both become `T*`
//! - `[n]T` becomes a C array in declarators
//! - Function types become function pointers
//! - Structs and enums use their (possibly mangled) typedef name

use crate::frontend::types::{Type, TypeNode};

/// C spelling of an atomic type name
pub fn c_atomic(name: &str) -> &str {
    match name {
        "i8" => "int8_t",
        "i16" => "int16_t",
        "i32" => "int32_t",
        "i64" => "int64_t",
        "i128" => "__int128",
        "u8" => "uint8_t",
        "u16" => "uint16_t",
        "u32" => "uint32_t",
        "u64" => "uint64_t",
        "u128" => "unsigned __int128",
        "f32" => "float",
        "f64" => "double",
        "bool" => "bool",
        "str" => "char*",
        "void" | "unit" | "NULL" => "void",
        other => other,
    }
}

/// C type name usable in casts and `sizeof`
pub fn c_type(ty: &Type) -> String {
    c_decl(ty, "").trim_end().to_string()
}

/// C declaration of `name` with type `ty`
pub fn c_decl(
    ty: &Type,
    name: &str,
) -> String {
    let nodes: Vec<&TypeNode> = ty
        .nodes()
        .iter()
        .filter(|n| !matches!(n, TypeNode::VarName(_)))
        .collect();

    // leading sized arrays become declarator suffixes
    let mut dims = String::new();
    let mut i = 0;
    while let Some(TypeNode::SizedArray(n)) = nodes.get(i) {
        dims.push_str(&format!("[{}]", n));
        i += 1;
    }
    let mut stars = String::new();
    while let Some(TypeNode::Pointer | TypeNode::Array | TypeNode::SizedArray(_)) = nodes.get(i) {
        stars.push('*');
        i += 1;
    }

    match nodes.get(i) {
        Some(TypeNode::Function) => {
            let rest = Type::from_nodes(nodes[i..].iter().map(|n| (*n).clone()));
            let ret = rest.return_type().unwrap_or_else(Type::null);
            let params: Vec<String> = rest.params().iter().map(c_type).collect();
            let params = if params.is_empty() {
                "void".to_string()
            } else {
                params.join(", ")
            };
            format!("{} (*{}{}{})({})", c_type(&ret), stars, name, dims, params)
        }
        Some(TypeNode::Atomic(atomic)) => {
            let base = c_atomic(atomic);
            if name.is_empty() {
                format!("{}{}{}", base, stars, dims)
            } else {
                format!("{}{} {}{}", base, stars, name, dims)
            }
        }
        _ => format!("void{} {}{}", stars, name, dims),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        assert_eq!(c_type(&Type::atomic("i32")), "int32_t");
        assert_eq!(c_type(&Type::atomic("u8").pointer_to()), "uint8_t*");
        assert_eq!(c_type(&Type::atomic("str")), "char*");
        assert_eq!(c_type(&Type::atomic("unit")), "void");
        assert_eq!(c_type(&Type::atomic("Node_GEN_i32_ENDGEN")), "Node_GEN_i32_ENDGEN");
    }

    #[test]
    fn test_arrays() {
        let open = Type::from_nodes([TypeNode::Array, TypeNode::Atomic("f64".into())]);
        assert_eq!(c_decl(&open, "xs"), "double* xs");

        let sized = Type::from_nodes([TypeNode::SizedArray(4), TypeNode::Atomic("i8".into())]);
        assert_eq!(c_decl(&sized, "buf"), "int8_t buf[4]");
        assert_eq!(c_type(&sized), "int8_t[4]");
    }

    #[test]
    fn test_function_pointer() {
        let f = Type::function(&[("x".into(), Type::atomic("i32"))], &Type::atomic("bool"));
        assert_eq!(c_decl(&f, "pred"), "bool (*pred)(int32_t)");
        let g = Type::function(&[], &Type::atomic("void"));
        assert_eq!(c_type(&g), "void (*)(void)");
    }
}
