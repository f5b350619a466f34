//! Expression rendering
//!
//! Expressions are rendered to a single C string. Operators are fully
//! parenthesized, so precedence never has to be reconstructed.

use super::ctype::c_type;
use crate::middle::sequence::ast::{ASTKind, ASTNode};

/// Render an expression node
pub fn emit_expr(node: &ASTNode) -> String {
    match node.kind {
        ASTKind::Atom => node.text.clone(),
        ASTKind::Call => {
            let args: Vec<String> = node.children.iter().map(emit_expr).collect();
            format!("{}({})", node.text, args.join(", "))
        }
        ASTKind::Keyword => emit_operator(node),
        // statements never appear inside expressions
        ASTKind::Scope | ASTKind::Statement => String::new(),
    }
}

/// Render an expression at statement level, without the outer parentheses
pub fn emit_expr_top(node: &ASTNode) -> String {
    let text = emit_expr(node);
    let binary = node.kind == ASTKind::Keyword && node.children.len() == 2 && !is_access(&node.text);
    match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) if binary => inner.to_string(),
        _ => text,
    }
}

fn is_access(op: &str) -> bool {
    matches!(op, "." | "->" | "[]")
}

fn emit_operator(node: &ASTNode) -> String {
    let op = node.text.as_str();
    match (op, node.children.as_slice()) {
        ("cast", [inner]) => format!("(({}){})", c_type(&node.ty), emit_expr(inner)),
        ("." | "->", [object, field]) => format!("{}{}{}", emit_expr(object), op, field.text),
        ("[]", [base, index]) => format!("{}[{}]", emit_expr(base), emit_expr(index)),
        (_, [operand]) => format!("({}{})", op, emit_expr(operand)),
        (_, [lhs, rhs]) => format!("({} {} {})", emit_expr(lhs), op, emit_expr(rhs)),
        _ => String::new(),
    }
}
