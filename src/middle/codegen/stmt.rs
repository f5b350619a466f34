//! Statement rendering

use super::ctype::c_decl;
use super::expr::{emit_expr, emit_expr_top};
use super::CEmitter;
use crate::middle::sequence::ast::{ASTKind, ASTNode};

/// Emit the statements of a scope between braces
pub fn emit_block(
    out: &mut CEmitter,
    scope: &ASTNode,
) {
    out.writeln("{");
    out.indent();
    emit_stmts(out, scope);
    out.dedent();
    out.writeln("}");
}

pub fn emit_stmts(
    out: &mut CEmitter,
    scope: &ASTNode,
) {
    for stmt in &scope.children {
        emit_stmt(out, stmt);
    }
}

pub fn emit_stmt(
    out: &mut CEmitter,
    stmt: &ASTNode,
) {
    if stmt.kind == ASTKind::Scope {
        emit_block(out, stmt);
        return;
    }

    match (stmt.text.as_str(), stmt.children.as_slice()) {
        ("let", [name]) => out.writeln(&format!("{};", c_decl(&name.ty, &name.text))),
        ("expr", [value]) => out.writeln(&format!("{};", emit_expr_top(value))),
        ("return", []) => out.writeln("return;"),
        ("return", [value]) => out.writeln(&format!("return {};", emit_expr(value))),
        ("break", _) => out.writeln("break;"),
        ("continue", _) => out.writeln("continue;"),
        ("raw", [text]) => out.writeln(&text.text),
        ("while", [cond, body]) => {
            out.writeln(&format!("while ({})", emit_expr_top(cond)));
            emit_block(out, body);
        }
        ("if", [..]) => emit_if(out, stmt, "if"),
        _ => {}
    }
}

fn emit_if(
    out: &mut CEmitter,
    stmt: &ASTNode,
    lead: &str,
) {
    let [cond, then, rest @ ..] = stmt.children.as_slice() else {
        return;
    };
    out.writeln(&format!("{} ({})", lead, emit_expr_top(cond)));
    emit_block(out, then);
    match rest {
        [next] if next.kind == ASTKind::Statement => emit_if(out, next, "else if"),
        [otherwise] => {
            out.writeln("else");
            emit_block(out, otherwise);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::types::Type;

    fn int(text: &str) -> ASTNode {
        ASTNode::atom(text, Type::atomic("i32"))
    }

    fn render(stmt: &ASTNode) -> String {
        let mut out = CEmitter::new();
        emit_stmt(&mut out, stmt);
        out.finish()
    }

    #[test]
    fn test_let_and_return() {
        let decl = ASTNode::statement("let", vec![int("x")]);
        assert_eq!(render(&decl), "int32_t x;\n");
        let ret = ASTNode::statement("return", vec![int("x")]);
        assert_eq!(render(&ret), "return x;\n");
    }

    #[test]
    fn test_if_else_chain() {
        let cond = ASTNode::keyword("<", Type::atomic("bool"), vec![int("x"), int("0")]);
        let body = |v: &str| {
            ASTNode::scope(vec![ASTNode::statement("return", vec![int(v)])])
        };
        let inner = ASTNode::statement("if", vec![cond.clone(), body("1"), body("2")]);
        let outer = ASTNode::statement("if", vec![cond, body("0"), inner]);
        let expected = "\
if (x < 0)
{
    return 0;
}
else if (x < 0)
{
    return 1;
}
else
{
    return 2;
}
";
        assert_eq!(render(&outer), expected);
    }

    #[test]
    fn test_while_with_raw_body() {
        let cond = ASTNode::atom("running", Type::atomic("bool"));
        let body = ASTNode::scope(vec![
            ASTNode::statement("raw", vec![ASTNode::atom("tick();", Type::null())]),
            ASTNode::statement("break", Vec::new()),
        ]);
        let stmt = ASTNode::statement("while", vec![cond, body]);
        assert_eq!(render(&stmt), "while (running)\n{\n    tick();\n    break;\n}\n");
    }
}
