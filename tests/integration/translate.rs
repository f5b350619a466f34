use acorn::translate;

#[test]
fn test_program_with_structs_and_generics() {
    let source = r#"
        // counters and pairs
        let Counter: struct { hits: i32, }
        let Pair<A, B>: struct { first: A, second: B, }

        let bump(c: ^Counter, by: i32) { c.hits += by; }

        let swap<A, B>(p: Pair<A, B>) -> Pair<B, A> {
            let out: Pair<B, A>;
            out.first = p.second;
            out.second = p.first;
            return out;
        }

        let main() -> i32 {
            let c: Counter;
            New(c);
            bump(c, 2);
            let p: Pair<i32, bool>;
            p.first = c.hits;
            p.second = true;
            let q: Pair<bool, i32> = swap(p);
            return q.second;
        }
    "#;
    let c = translate(source, "program.oak").unwrap();
    assert!(c.contains("typedef struct Pair_GEN_i32_JOIN_bool_ENDGEN Pair_GEN_i32_JOIN_bool_ENDGEN;"));
    assert!(c.contains("typedef struct Pair_GEN_bool_JOIN_i32_ENDGEN Pair_GEN_bool_JOIN_i32_ENDGEN;"));
    assert!(c.contains("bump_FN_PTR_Counter_JOIN_i32_MAPS_void((&c), 2);"));
    assert!(c.contains("c->hits += by;"));
    assert!(c.contains(
        "q = swap_FN_Pair_GEN_i32_JOIN_bool_ENDGEN_MAPS_Pair_GEN_bool_JOIN_i32_ENDGEN(p);"
    ));
}

#[test]
fn test_enum_round_trip_through_helpers() {
    let source = r#"
        let Shape: enum { circle: f64, dot: unit, }
        let area(s: ^Shape) -> f64 {
            if is_dot(s) { return 0.0; }
            return unwrap_circle(s) * unwrap_circle(s) * 3.0;
        }
        let main() -> i32 {
            let s: Shape = wrap_circle(2.0);
            area(s);
            return 0;
        }
    "#;
    let c = translate(source, "shapes.oak").unwrap();
    assert!(c.contains("if (is_dot_FN_PTR_Shape_MAPS_bool(s))"));
    assert!(c.contains("s = wrap_circle_FN_f64_MAPS_Shape(2.0);"));
    assert!(c.contains("area_FN_PTR_Shape_MAPS_f64((&s));"));
}

#[test]
fn test_errors_name_the_file() {
    let err = translate("let main() -> i32 { return missing; }", "broken.oak").unwrap_err();
    let text = format!("{:#}", err);
    assert!(text.contains("Failed to translate broken.oak"), "{}", text);
    assert!(text.contains("unknown name `missing`"), "{}", text);
}
