//! Instantiation requests and memo keys

use std::fmt;

use crate::frontend::types::Type;
use crate::util::span::Location;

/// What a request wants to exist afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A function overload callable with the call-site types
    Call,
    /// A struct or enum named by its mangled name
    Type,
}

/// Request to apply a substitution to a generic
#[derive(Debug, Clone)]
pub struct InstantiationRequest {
    pub name: String,
    pub kind: RequestKind,
    /// One type per generic parameter
    pub substitution: Vec<Type>,
    /// Argument types at the call site (empty for types)
    pub call_site: Vec<Type>,
    pub location: Location,
}

impl InstantiationRequest {
    pub fn call(
        name: &str,
        substitution: Vec<Type>,
        call_site: Vec<Type>,
        location: Location,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: RequestKind::Call,
            substitution,
            call_site,
            location,
        }
    }

    pub fn ty(
        name: &str,
        substitution: Vec<Type>,
        location: Location,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: RequestKind::Type,
            substitution,
            call_site: Vec::new(),
            location,
        }
    }

    pub fn specialization_key(&self) -> SpecializationKey {
        SpecializationKey::new(self.name.clone(), self.substitution.clone())
    }
}

/// A generic applied to concrete types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecializationKey {
    pub name: String,
    pub type_args: Vec<Type>,
}

impl SpecializationKey {
    pub fn new(
        name: String,
        type_args: Vec<Type>,
    ) -> Self {
        Self { name, type_args }
    }
}

impl fmt::Display for SpecializationKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.type_args.is_empty() {
            return write!(f, "{}", self.name);
        }
        let args = self
            .type_args
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}<{}>", self.name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let key = SpecializationKey::new(
            "Pair".to_string(),
            vec![Type::atomic("i32"), Type::atomic("u8").pointer_to()],
        );
        assert_eq!(key.to_string(), "Pair<i32, ^u8>");
        assert_eq!(SpecializationKey::new("f".to_string(), vec![]).to_string(), "f");
    }

    #[test]
    fn test_key_equality_ignores_type_ids() {
        let a = SpecializationKey::new("f".to_string(), vec![Type::atomic("i32")]);
        let b = SpecializationKey::new("f".to_string(), vec![Type::atomic("i32")]);
        assert_eq!(a, b);
    }
}
