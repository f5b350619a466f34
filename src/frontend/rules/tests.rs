//! Rule engine tests

use super::*;
use crate::frontend::lexer::lex;

fn tokens(source: &str) -> Vec<Token> {
    lex(source, "rules.oak").unwrap()
}

fn rule(
    name: &str,
    engine: &str,
    input: &str,
    output: &str,
) -> Rule {
    Rule::new(name, engine, tokens(input), tokens(output)).unwrap()
}

fn texts(list: &TokenList) -> String {
    list.iter()
        .map(|(_, t)| t.text.clone())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_literal_rule_rewrites_every_match() {
    let mut set = RuleSet::new();
    let loc = Location::default();
    set.define(rule("fn_kw", "literal", "fn", "let"), &loc).unwrap();
    set.activate("fn_kw", &loc).unwrap();

    let mut list = TokenList::from_tokens(tokens("fn a ( ) ; fn b ( ) ;"));
    let count = apply_rules(&mut list, &set);

    assert_eq!(count, 2);
    assert_eq!(texts(&list), "let a ( ) ; let b ( ) ;");
}

#[test]
fn test_inactive_rule_does_not_fire() {
    let mut set = RuleSet::new();
    set.define(rule("fn_kw", "literal", "fn", "let"), &Location::default())
        .unwrap();

    let mut list = TokenList::from_tokens(tokens("fn a"));
    assert_eq!(apply_rules(&mut list, &set), 0);
    assert_eq!(texts(&list), "fn a");
}

#[test]
fn test_capture_rule_substitutes_bindings() {
    let mut set = RuleSet::new();
    let loc = Location::default();
    set.define(rule("swap", "capture", "swap $a $b", "$b $a"), &loc)
        .unwrap();
    set.activate("swap", &loc).unwrap();

    let mut list = TokenList::from_tokens(tokens("swap x y ;"));
    apply_rules(&mut list, &set);
    assert_eq!(texts(&list), "y x ;");
}

#[test]
fn test_capture_repeated_name_must_agree() {
    let mut set = RuleSet::new();
    let loc = Location::default();
    set.define(rule("dup", "capture", "$a == $a", "true"), &loc)
        .unwrap();
    set.activate("dup", &loc).unwrap();

    let mut list = TokenList::from_tokens(tokens("x == y ; z == z"));
    apply_rules(&mut list, &set);
    assert_eq!(texts(&list), "x == y ; true");
}

#[test]
fn test_literal_engine_treats_dollar_literally() {
    let mut set = RuleSet::new();
    let loc = Location::default();
    set.define(rule("lit", "literal", "$a", "b"), &loc).unwrap();
    set.activate("lit", &loc).unwrap();

    let mut list = TokenList::from_tokens(tokens("x $a"));
    apply_rules(&mut list, &set);
    assert_eq!(texts(&list), "x b");
}

#[test]
fn test_chained_rules_reach_fixpoint() {
    let mut set = RuleSet::new();
    let loc = Location::default();
    set.define(rule("one", "literal", "a", "b"), &loc).unwrap();
    set.define(rule("two", "literal", "b", "c"), &loc).unwrap();
    set.activate("one", &loc).unwrap();
    set.add_dialect("two", &loc).unwrap();

    let mut list = TokenList::from_tokens(tokens("a a"));
    let count = apply_rules(&mut list, &set);
    assert_eq!(count, 4);
    assert_eq!(texts(&list), "c c");
}

#[test]
fn test_unknown_engine_is_fatal() {
    let err = Rule::new("r", "glob", tokens("a"), tokens("b")).unwrap_err();
    assert!(matches!(err, CompileError::UnknownEngine { .. }));
}

#[test]
fn test_duplicate_rule_name_collides() {
    let mut set = RuleSet::new();
    let loc = Location::default();
    set.define(rule("r", "literal", "a", "b"), &loc).unwrap();
    let err = set.define(rule("r", "literal", "c", "d"), &loc).unwrap_err();
    assert!(matches!(err, CompileError::NameCollision { existing: "rule", .. }));
}

#[test]
fn test_empty_input_rejected() {
    let mut set = RuleSet::new();
    let err = set
        .define(rule("r", "literal", "", "b"), &Location::default())
        .unwrap_err();
    assert!(matches!(err, CompileError::MalformedMacro { .. }));
}

#[test]
fn test_unknown_rule_activation() {
    let mut set = RuleSet::new();
    let err = set.activate("missing", &Location::default()).unwrap_err();
    assert!(matches!(err, CompileError::UnknownRule { .. }));
}

#[test]
fn test_deactivate_and_swap() {
    let mut set = RuleSet::new();
    let loc = Location::default();
    set.define(rule("r", "literal", "a", "b"), &loc).unwrap();
    set.activate("r", &loc).unwrap();
    assert_eq!(set.firing().len(), 1);

    let saved = set.swap_active(Vec::new());
    assert!(set.firing().is_empty());
    set.swap_active(saved);
    set.deactivate("r", &loc).unwrap();
    assert!(set.active().is_empty());
}
