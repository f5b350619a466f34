use pretty_assertions::assert_eq;

use crate::driver::testing::{quiet_context, to_c};
use crate::middle::codegen::{render, CEmitter};

fn position(
    haystack: &str,
    needle: &str,
) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("`{}` missing from:\n{}", needle, haystack))
}

#[test]
fn test_empty_program() {
    let c = render(&quiet_context());
    assert_eq!(
        c,
        "#include <stdint.h>\n#include <stdbool.h>\n#include <stdlib.h>\n#include <string.h>\n\n"
    );
}

#[test]
fn test_emitter_indentation() {
    let mut out = CEmitter::new();
    out.writeln("{");
    out.indent();
    out.writeln("x;");
    out.dedent();
    out.writeln("}");
    assert_eq!(out.finish(), "{\n    x;\n}\n");
}

#[test]
fn test_section_order() {
    let c = to_c(
        "raw_c!(\"#include <stdio.h>\");\n\
         let S: struct { x: i32, }\n\
         let total: i32 = 0;\n\
         let main() -> i32 { return total; }\n",
    )
    .unwrap();
    let include = position(&c, "#include <stdio.h>");
    let typedef = position(&c, "typedef struct S S;");
    let body = position(&c, "struct S\n{\n    int32_t x;\n};");
    let prototype = position(&c, "int32_t main(void);");
    let global = position(&c, "int32_t total = 0;");
    let definition = position(&c, "int32_t main(void)\n{\n    return total;\n}");
    assert!(include < typedef);
    assert!(typedef < body);
    assert!(body < prototype);
    assert!(prototype < global);
    assert!(global < definition);
}

#[test]
fn test_value_members_are_defined_first() {
    let err = to_c(
        "let Outer: struct { inner: Inner, next: ^Outer, }\n\
         let Inner: struct { x: i32, }\n",
    )
    .unwrap_err();
    // `Inner` is unknown where `Outer` names it
    assert!(err.root().to_string().contains("unknown type `Inner`"));

    let c = to_c(
        "let Inner: struct { x: i32, }\n\
         let Pair<T>: struct { left: T, right: T, }\n\
         let Outer: struct { pair: Pair<Inner>, }\n",
    )
    .unwrap();
    let inner = position(&c, "struct Inner\n{");
    let pair = position(&c, "struct Pair_GEN_Inner_ENDGEN\n{");
    let outer = position(&c, "struct Outer\n{");
    assert!(inner < pair);
    assert!(pair < outer);
}

#[test]
fn test_empty_struct_gets_a_member() {
    let c = to_c("let Unit: struct { }").unwrap();
    assert!(c.contains("struct Unit\n{\n    char _empty;\n};"));
}

#[test]
fn test_unit_only_enum_has_no_union() {
    let c = to_c("let Color: enum { red: unit, green: unit, }").unwrap();
    assert!(c.contains("struct Color\n{\n    int32_t tag;\n};"));
}

#[test]
fn test_tags_are_written_as_comments() {
    let c = to_c(
        "tag!(\"hot\");\n\
         let main() -> i32 { return 0; }\n",
    )
    .unwrap();
    assert!(c.contains("/* tags: hot */\nint32_t main(void)"));
}

#[test]
fn test_generated_functions_are_marked() {
    let c = to_c("let S: struct { x: i32, }").unwrap();
    assert!(c.contains("/* tags: autogen */\nvoid New_FN_PTR_S_MAPS_void(S* self)"));
    assert!(c.contains("memset(self, 0, sizeof(*self));"));
}
