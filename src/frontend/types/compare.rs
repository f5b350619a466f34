//! Three-tier structural type comparison
//!
//! - `Exact`: var name labels are ignored, everything else must match.
//! - `AutoRef`: a pointer level present on only one side may be skipped.
//! - `Casting`: additionally, atomics of the same literal family
//!   (integers, floats) may stand in for each other.
//!
//! Every skipped pointer and every coercion counts as one change.
//! Overloads rank by tier first and by fewest changes second.

use std::cmp::Ordering;

use super::{Type, TypeNode, FLOAT_TYPES, INTEGER_TYPES};

/// Comparison tier, strictest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Exact,
    AutoRef,
    Casting,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Exact, Tier::AutoRef, Tier::Casting];
}

/// Result of a successful comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub tier: Tier,
    pub changes: usize,
}

impl PartialOrd for Match {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Match {
    /// Smaller is better
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then(self.changes.cmp(&other.changes))
    }
}

fn same_family(
    a: &str,
    b: &str,
) -> bool {
    (INTEGER_TYPES.contains(&a) && INTEGER_TYPES.contains(&b))
        || (FLOAT_TYPES.contains(&a) && FLOAT_TYPES.contains(&b))
}

fn unlabeled(ty: &Type) -> Vec<&TypeNode> {
    ty.nodes()
        .iter()
        .filter(|n| !matches!(n, TypeNode::VarName(_)))
        .collect()
}

/// Compare two types under `tier`, returning the number of changes
pub fn compare(
    a: &Type,
    b: &Type,
    tier: Tier,
) -> Option<usize> {
    let a = unlabeled(a);
    let b = unlabeled(b);
    let (mut i, mut j, mut changes) = (0, 0, 0);

    loop {
        match (a.get(i), b.get(j)) {
            (None, None) => return Some(changes),
            (Some(x), Some(y)) if x == y => {
                i += 1;
                j += 1;
            }
            (Some(TypeNode::Pointer), _) if tier >= Tier::AutoRef => {
                i += 1;
                changes += 1;
            }
            (_, Some(TypeNode::Pointer)) if tier >= Tier::AutoRef => {
                j += 1;
                changes += 1;
            }
            (Some(TypeNode::Atomic(x)), Some(TypeNode::Atomic(y)))
                if tier == Tier::Casting && same_family(x, y) =>
            {
                i += 1;
                j += 1;
                changes += 1;
            }
            _ => return None,
        }
    }
}

/// Strictest tier under which `a` matches `b`
pub fn best_match(
    a: &Type,
    b: &Type,
) -> Option<Match> {
    Tier::ALL
        .iter()
        .find_map(|&tier| compare(a, b, tier).map(|changes| Match { tier, changes }))
}

/// Pointer and array markers of a type, atomics reduced to placeholders.
///
/// Two types with equal shapes differ at most in atomic names.
pub fn pointer_shape(ty: &Type) -> Vec<TypeNode> {
    ty.nodes()
        .iter()
        .filter(|n| !matches!(n, TypeNode::VarName(_)))
        .map(|n| match n {
            TypeNode::Atomic(_) => TypeNode::Atomic(String::new()),
            other => other.clone(),
        })
        .collect()
}
