//! Sequencing tests over whole snippets

use crate::driver::testing::{sequence, to_c};
use crate::frontend::types::Type;
use crate::middle::sequence::symbols::SymbolKind;
use crate::util::diagnostic::CompileError;

fn error_of(source: &str) -> String {
    match sequence(source) {
        Ok(_) => panic!("expected an error for:\n{}", source),
        Err(err) => err.root().to_string(),
    }
}

#[test]
fn test_function_and_call() {
    let c = to_c(
        "let add(a: i32, b: i32) -> i32 { return a + b; }\n\
         let main() -> i32 { return add(1, 2); }\n",
    )
    .unwrap();
    assert!(c.contains("int32_t add_FN_i32_JOIN_i32_MAPS_i32(int32_t a, int32_t b)"));
    assert!(c.contains("return (a + b);"));
    assert!(c.contains("return add_FN_i32_JOIN_i32_MAPS_i32(1, 2);"));
    assert!(c.contains("int32_t main(void)"));
}

#[test]
fn test_exact_overload_wins() {
    let c = to_c(
        "let f(x: i64) -> i32 { return 1; }\n\
         let f(x: i32) -> i32 { return 2; }\n\
         let main() -> i32 { return f(5); }\n",
    )
    .unwrap();
    assert!(c.contains("return f_FN_i32_MAPS_i32(5);"));
}

#[test]
fn test_local_assignment() {
    let c = to_c("let main() -> i32 { let x: i32 = 5; x += 2; return x; }").unwrap();
    assert!(c.contains("int32_t x;"));
    assert!(c.contains("x = 5;"));
    assert!(c.contains("x += 2;"));
}

#[test]
fn test_auto_reference_for_lvalue() {
    let c = to_c(
        "let S: struct { x: i32, }\n\
         let main() -> i32 { let s: S; New(s); return s.x; }\n",
    )
    .unwrap();
    assert!(c.contains("New_FN_PTR_S_MAPS_void((&s));"));
    assert!(c.contains("return s.x;"));
}

#[test]
fn test_struct_and_enum_values_assign() {
    let c = to_c(
        "let S: struct { x: i32, }\n\
         let Opt: enum { some: i32, none: unit, }\n\
         let main() -> i32 { let a: S; let b: S = a; let o: Opt = wrap_some(1); return b.x; }\n",
    )
    .unwrap();
    assert!(c.contains("b = a;"));
    assert!(c.contains("o = wrap_some_FN_i32_MAPS_Opt(1);"));

    let err = error_of(
        "let S: struct { x: i32, }\n\
         let T: struct { x: i32, }\n\
         let main() -> i32 { let a: S; let b: T = a; return 0; }\n",
    );
    assert!(err.contains("Copy("), "{}", err);
}

#[test]
fn test_user_copy_overload_wins() {
    let c = to_c(
        "let S: struct { x: i32, }\n\
         let Copy(dst: ^S, src: S) { dst.x = src.x + 1; }\n\
         let main() -> i32 { let a: S; let b: S = a; return b.x; }\n",
    )
    .unwrap();
    assert!(c.contains("Copy_FN_PTR_S_JOIN_S_MAPS_void((&b), a);"));
}

#[test]
fn test_member_through_pointer() {
    let c = to_c(
        "let S: struct { x: i32, }\n\
         let get(p: ^S) -> i32 { return p.x; }\n",
    )
    .unwrap();
    assert!(c.contains("return p->x;"));
}

#[test]
fn test_recursive_struct() {
    let ctx = sequence("let Node: struct { next: ^Node, value: i32, }").unwrap();
    let node = &ctx.structs["Node"];
    assert_eq!(node.member("next"), Some(&Type::atomic("Node").pointer_to()));
    assert_eq!(node.member("value"), Some(&Type::atomic("i32")));
}

#[test]
fn test_struct_generates_new_and_del() {
    let ctx = sequence("let S: struct { x: i32, }").unwrap();
    let names: Vec<&str> = ctx.symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["New", "Del"]);
    assert!(ctx.symbols.iter().all(|s| s.tags.contains("autogen")));
}

#[test]
fn test_user_new_replaces_generated() {
    let ctx = sequence(
        "let S: struct { x: i32, }\n\
         let New(self: ^S) { self.x = 7; }\n",
    )
    .unwrap();
    let news: Vec<_> = ctx.symbols.overloads("New");
    assert_eq!(news.len(), 1);
    assert!(!news[0].1.tags.contains("autogen"));
}

#[test]
fn test_enum_layout_and_helpers() {
    let c = to_c("let Opt: enum { some: i32, none: unit, }").unwrap();
    assert!(c.contains("int32_t tag;"));
    assert!(c.contains("int32_t some;"));
    assert!(c.contains("} data;"));
    assert!(c.contains("Opt wrap_some_FN_i32_MAPS_Opt(int32_t value)"));
    assert!(c.contains("Opt wrap_none_FN_MAPS_Opt(void)"));
    assert!(c.contains("return self->tag == 1;"));
    assert!(c.contains("return self->data.some;"));
    assert!(!c.contains("unwrap_none"));
}

#[test]
fn test_globals() {
    let c = to_c("let count: i32 = 3;\nlet flag: bool;\n").unwrap();
    assert!(c.contains("int32_t count = 3;"));
    assert!(c.contains("bool flag;"));
}

#[test]
fn test_extern_keeps_plain_name() {
    let ctx = sequence(
        "let puts(s: str) -> i32;\n\
         let main() -> i32 { puts(\"hi\"); return 0; }\n",
    )
    .unwrap();
    let (_, puts) = ctx.symbols.overloads("puts")[0];
    assert_eq!(puts.kind, SymbolKind::Extern);
    let c = crate::middle::render(&ctx);
    assert!(c.contains("puts(\"hi\");"));
    assert!(!c.contains("int32_t puts"));
}

#[test]
fn test_raw_c_at_top_level_and_in_body() {
    let c = to_c(
        "raw_c!(\"#include <stdio.h>\");\n\
         let main() -> i32 { raw_c!(\"printf(\\\"hi\\\\n\\\");\"); return 0; }\n",
    )
    .unwrap();
    assert!(c.contains("#include <stdio.h>\n"));
    assert!(c.contains("printf(\"hi\\n\");"));
}

#[test]
fn test_control_flow() {
    let c = to_c(
        "let count(n: i32) -> i32 {\n\
             let i: i32 = 0;\n\
             while i < n {\n\
                 if i == 3 { break; } else if i == 1 { i += 2; continue; } else { i += 1; }\n\
             }\n\
             return i;\n\
         }\n",
    )
    .unwrap();
    assert!(c.contains("while (i < n)"));
    assert!(c.contains("if (i == 3)"));
    assert!(c.contains("else if (i == 1)"));
    assert!(c.contains("break;"));
    assert!(c.contains("continue;"));
}

#[test]
fn test_alloc_and_free() {
    let c = to_c("let main() -> i32 { let p: ^i32 = alloc!(i32, 4); free!(p); return 0; }").unwrap();
    assert!(c.contains("p = ((int32_t*)calloc(4, sizeof(int32_t)));"));
    assert!(c.contains("free(p);"));
}

#[test]
fn test_shift_closer_split() {
    let ctx = sequence(
        "let Box<T>: struct { item: T, }\n\
         let main() -> i32 { let b: Box<Box<i32>>; return 0; }\n",
    )
    .unwrap();
    assert!(ctx.structs.contains_key("Box_GEN_i32_ENDGEN"));
    assert!(ctx.structs.contains_key("Box_GEN_Box_GEN_i32_ENDGEN_ENDGEN"));
}

#[test]
fn test_locals_leave_scope() {
    let err = error_of("let main() -> i32 { { let x: i32; } return x; }");
    assert!(err.contains("unknown name `x`"), "{}", err);
}

#[test]
fn test_sequencing_errors() {
    assert!(error_of("let main() -> i32 { break; return 0; }").contains("outside of a loop"));
    assert!(error_of("let main() -> i32 { let x: i32; let x: i32; return 0; }").contains("already declared"));
    assert!(error_of("let main() -> i32 { return; }").contains("missing return value"));
    assert!(error_of("let f() { return 1; }").contains("void function"));
    assert!(error_of("let x: Missing;").contains("unknown type `Missing`"));
    assert!(error_of("let f() {}\nlet f() {}\n").contains("already defined"));
}

#[test]
fn test_unknown_function_lists_overloads() {
    let err = error_of(
        "let f(x: ^i32) -> i32 { return 0; }\n\
         let main() -> i32 { return f(true); }\n",
    );
    assert!(err.contains("f("), "{}", err);
}

#[test]
fn test_error_carries_file_context() {
    let err = sequence("let main() -> i32 { return y; }").err().unwrap();
    assert_eq!(err.file_trail(), vec!["test.oak"]);
    assert!(matches!(err.root(), CompileError::Sequence { .. }));
}
