//! Sequenced AST
//!
//! One tree per definition. Expression nodes carry the type the sequencer
//! resolved for them, so the emitter never has to look anything up.
//!
//! | kind        | `text`                                  | children          |
//! |-------------|-----------------------------------------|-------------------|
//! | `Scope`     | empty                                   | statements        |
//! | `Statement` | form: `expr let return break continue`  | form dependent    |
//! |             | `if while raw`                          |                   |
//! | `Atom`      | C spelling of a name or literal         | none              |
//! | `Keyword`   | C operator (`+`, `&`, `.`, `[]`, cast)  | operands          |
//! | `Call`      | mangled callee                          | arguments         |

use crate::frontend::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ASTKind {
    Scope,
    Statement,
    Atom,
    Keyword,
    Call,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTNode {
    pub kind: ASTKind,
    pub ty: Type,
    pub children: Vec<ASTNode>,
    pub text: String,
}

impl ASTNode {
    pub fn new(
        kind: ASTKind,
        text: impl Into<String>,
        ty: Type,
        children: Vec<ASTNode>,
    ) -> Self {
        Self {
            kind,
            ty,
            children,
            text: text.into(),
        }
    }

    pub fn atom(
        text: impl Into<String>,
        ty: Type,
    ) -> Self {
        Self::new(ASTKind::Atom, text, ty, Vec::new())
    }

    pub fn scope(statements: Vec<ASTNode>) -> Self {
        Self::new(ASTKind::Scope, "", Type::null(), statements)
    }

    pub fn statement(
        form: &str,
        children: Vec<ASTNode>,
    ) -> Self {
        Self::new(ASTKind::Statement, form, Type::null(), children)
    }

    /// A C operator applied to operands
    pub fn keyword(
        op: impl Into<String>,
        ty: Type,
        operands: Vec<ASTNode>,
    ) -> Self {
        Self::new(ASTKind::Keyword, op, ty, operands)
    }

    pub fn call(
        callee: impl Into<String>,
        ty: Type,
        args: Vec<ASTNode>,
    ) -> Self {
        Self::new(ASTKind::Call, callee, ty, args)
    }

    /// Whether the node denotes a storage location
    pub fn is_lvalue(&self) -> bool {
        match self.kind {
            ASTKind::Atom => self
                .text
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_'),
            ASTKind::Keyword => matches!(self.text.as_str(), "*" | "." | "->" | "[]"),
            _ => false,
        }
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ASTNode::size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lvalues() {
        let x = ASTNode::atom("x", Type::atomic("i32"));
        assert!(x.is_lvalue());
        assert!(!ASTNode::atom("3", Type::atomic("i32")).is_lvalue());

        let deref = ASTNode::keyword("*", Type::atomic("i32"), vec![x.clone()]);
        assert!(deref.is_lvalue());
        let sum = ASTNode::keyword("+", Type::atomic("i32"), vec![x.clone(), x]);
        assert!(!sum.is_lvalue());
    }

    #[test]
    fn test_size_counts_every_node() {
        let body = ASTNode::scope(vec![ASTNode::statement(
            "return",
            vec![ASTNode::atom("0", Type::atomic("i32"))],
        )]);
        assert_eq!(body.size(), 3);
    }
}
