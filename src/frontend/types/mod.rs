//! Structural type representation
//!
//! A [`Type`] is a flat sequence of [`TypeNode`]s read left to right:
//! `^[]i32` is `[Pointer, Array, Atomic("i32")]` and a function
//! `(a: i32, b: ^u8) -> bool` is
//! `[Function, VarName(a), Atomic(i32), Join, VarName(b), Pointer,
//! Atomic(u8), Maps, Atomic(bool)]`.
//!
//! The null type `NULL` is the identity of [`Type::append`], which makes
//! building types node by node from an empty start straightforward.

pub mod compare;
pub mod literal;

#[cfg(test)]
mod tests;

pub use compare::{best_match, compare, Match, Tier};
pub use literal::literal_type;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

/// Name of the null type
pub const NULL_TYPE: &str = "NULL";

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_id() -> u64 {
    NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Integer atomics, narrowest first
pub const INTEGER_TYPES: &[&str] = &["i8", "i16", "i32", "i64", "i128", "u8", "u16", "u32", "u64", "u128"];

/// Float atomics, narrowest first
pub const FLOAT_TYPES: &[&str] = &["f32", "f64"];

/// Every atomic the C backend knows natively
pub const PRIMITIVE_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "u8", "u16", "u32", "u64", "u128", "f32", "f64", "bool",
    "str", "void", "unit",
];

/// Type errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid suffix `{suffix}` on literal `{literal}`")]
    InvalidSuffix { literal: String, suffix: String },
    #[error("literal `{literal}` does not fit in {ty}")]
    OutOfRange { literal: String, ty: String },
    #[error("malformed literal `{literal}`")]
    Malformed { literal: String },
    #[error("malformed type: {0}")]
    MalformedType(String),
}

/// A single node of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    Pointer,
    Atomic(String),
    Join,
    Function,
    Maps,
    VarName(String),
    Array,
    SizedArray(usize),
}

/// A structural type
#[derive(Debug, Clone)]
pub struct Type {
    nodes: SmallVec<[TypeNode; 4]>,
    id: u64,
}

impl Type {
    /// The null type, identity of `append`
    pub fn null() -> Self {
        Self::atomic(NULL_TYPE)
    }

    pub fn atomic(name: &str) -> Self {
        Self::from_nodes([TypeNode::Atomic(name.to_string())])
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = TypeNode>) -> Self {
        let nodes: SmallVec<[TypeNode; 4]> = nodes.into_iter().collect();
        if nodes.is_empty() {
            return Self::null();
        }
        Self { nodes, id: fresh_id() }
    }

    /// Function type from named parameters and a return type
    pub fn function(
        params: &[(String, Type)],
        ret: &Type,
    ) -> Self {
        let mut out = Self::from_nodes([TypeNode::Function]);
        for (i, (name, ty)) in params.iter().enumerate() {
            if i > 0 {
                out.append(TypeNode::Join);
            }
            out.append(TypeNode::VarName(name.clone()));
            out.append_type(ty);
        }
        out.append(TypeNode::Maps);
        out.append_type(ret);
        out
    }

    /// Identity of this particular value; not part of equality
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn nodes(&self) -> &[TypeNode] {
        &self.nodes
    }

    pub fn is_null(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0] == TypeNode::Atomic(NULL_TYPE.to_string())
    }

    /// Append a node; appending onto the null type replaces it
    pub fn append(
        &mut self,
        node: TypeNode,
    ) {
        if self.is_null() {
            self.nodes.clear();
        }
        self.nodes.push(node);
        self.id = fresh_id();
    }

    /// Append every node of `other`; appending a null type is a no-op
    pub fn append_type(
        &mut self,
        other: &Type,
    ) {
        if other.is_null() {
            return;
        }
        if self.is_null() {
            self.nodes.clear();
        }
        self.nodes.extend(other.nodes.iter().cloned());
        self.id = fresh_id();
    }

    /// `^self`
    pub fn pointer_to(&self) -> Type {
        let mut nodes: SmallVec<[TypeNode; 4]> = SmallVec::new();
        nodes.push(TypeNode::Pointer);
        nodes.extend(self.nodes.iter().cloned());
        Self { nodes, id: fresh_id() }
    }

    /// Strip one leading pointer or array level
    pub fn deref(&self) -> Option<Type> {
        match self.nodes.first()? {
            TypeNode::Pointer | TypeNode::Array | TypeNode::SizedArray(_) => {
                Some(Type::from_nodes(self.nodes[1..].iter().cloned()))
            }
            _ => None,
        }
    }

    /// Number of leading pointer levels
    pub fn pointer_depth(&self) -> usize {
        self.nodes.iter().take_while(|n| **n == TypeNode::Pointer).count()
    }

    /// Strip leading pointers
    pub fn base(&self) -> Type {
        let depth = self.pointer_depth();
        Type::from_nodes(self.nodes[depth..].iter().cloned())
    }

    /// The atomic name when this is a (non-pointer) atomic type
    pub fn atomic_name(&self) -> Option<&str> {
        match self.nodes.as_slice() {
            [TypeNode::Atomic(name)] => Some(name),
            _ => None,
        }
    }

    pub fn is_atomic(
        &self,
        name: &str,
    ) -> bool {
        self.atomic_name() == Some(name)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.nodes.first(), Some(TypeNode::Pointer))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.nodes.first(), Some(TypeNode::Array | TypeNode::SizedArray(_)))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.nodes.first(), Some(TypeNode::Function))
    }

    pub fn is_void(&self) -> bool {
        self.is_atomic("void") || self.is_null()
    }

    pub fn is_integer(&self) -> bool {
        self.atomic_name().is_some_and(|n| INTEGER_TYPES.contains(&n))
    }

    pub fn is_float(&self) -> bool {
        self.atomic_name().is_some_and(|n| FLOAT_TYPES.contains(&n))
    }

    /// Numeric or bool: operands the C operators accept directly
    pub fn is_scalar(&self) -> bool {
        self.is_integer() || self.is_float() || self.is_atomic("bool")
    }

    /// Parameter types of a function type
    pub fn params(&self) -> Vec<Type> {
        if !self.is_function() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut i = 1;
        while i < self.nodes.len() && self.nodes[i] != TypeNode::Maps {
            let end = type_end(&self.nodes, i);
            if end > i {
                out.push(Type::from_nodes(self.nodes[i..end].iter().cloned()));
            }
            i = end;
            if self.nodes.get(i) == Some(&TypeNode::Join) {
                i += 1;
            }
        }
        out
    }

    /// Parameter names of a function type, in order
    pub fn param_names(&self) -> Vec<String> {
        self.params()
            .iter()
            .map(|p| match p.nodes.first() {
                Some(TypeNode::VarName(name)) => name.clone(),
                _ => String::new(),
            })
            .collect()
    }

    /// Return type of a function type
    pub fn return_type(&self) -> Option<Type> {
        if !self.is_function() {
            return None;
        }
        let mut i = 1;
        while i < self.nodes.len() && self.nodes[i] != TypeNode::Maps {
            i = type_end(&self.nodes, i);
            if self.nodes.get(i) == Some(&TypeNode::Join) {
                i += 1;
            }
        }
        let start = i + 1;
        if start > self.nodes.len() {
            return None;
        }
        let end = type_end(&self.nodes, start);
        Some(Type::from_nodes(self.nodes[start..end].iter().cloned()))
    }

    /// The type with every var name label removed
    pub fn without_names(&self) -> Type {
        Type::from_nodes(
            self.nodes
                .iter()
                .filter(|n| !matches!(n, TypeNode::VarName(_)))
                .cloned(),
        )
    }
}

/// Index just past the type starting at `start`
fn type_end(
    nodes: &[TypeNode],
    start: usize,
) -> usize {
    let mut i = start;
    while let Some(TypeNode::VarName(_)) = nodes.get(i) {
        i += 1;
    }
    while let Some(TypeNode::Pointer | TypeNode::Array | TypeNode::SizedArray(_)) = nodes.get(i) {
        i += 1;
    }
    match nodes.get(i) {
        Some(TypeNode::Atomic(_)) => i + 1,
        Some(TypeNode::Function) => {
            i += 1;
            while i < nodes.len() && nodes[i] != TypeNode::Maps {
                i = type_end(nodes, i);
                if nodes.get(i) == Some(&TypeNode::Join) {
                    i += 1;
                }
            }
            // skip Maps, then the return type
            type_end(nodes, i + 1)
        }
        _ => i.min(nodes.len()),
    }
}

impl PartialEq for Type {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for Type {}

impl std::hash::Hash for Type {
    fn hash<H: std::hash::Hasher>(
        &self,
        state: &mut H,
    ) {
        self.nodes.hash(state);
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for Type {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for node in &self.nodes {
            match node {
                TypeNode::Pointer => write!(f, "^")?,
                TypeNode::Atomic(name) => write!(f, "{}", name)?,
                TypeNode::Join => write!(f, ", ")?,
                TypeNode::Function => write!(f, "(")?,
                TypeNode::Maps => write!(f, ") -> ")?,
                TypeNode::VarName(name) => write!(f, "{}: ", name)?,
                TypeNode::Array => write!(f, "[]")?,
                TypeNode::SizedArray(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}
