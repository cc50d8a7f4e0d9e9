//! Snapshot tests for the `projector-syntax` end-to-end suite.
//!
//! These tests use `insta` to validate stable, user-facing outputs.

use std::sync::Arc;

use insta::assert_snapshot;
use projector_core::Context;

use projector_syntax::inspect::{match_to_string, pattern_to_string};
use projector_syntax::{
    Matcher, Parser, PatternBuilder, PatternRegistry, SupportedLanguage, Template,
    define_argument, define_block, define_chain,
};

fn chain_template() -> Template {
    let receiver = Template::expression(
        "receiver",
        SupportedLanguage::Python,
        "${recv}",
        [("recv", define_argument("recv", ["identifier"]))],
    )
    .unwrap_or_else(|err| panic!("start: {err}"));
    let method = Template::expression(
        "method",
        SupportedLanguage::Python,
        "${name}()",
        [("name", define_argument("name", ["identifier"]))],
    )
    .unwrap_or_else(|err| panic!("link: {err}"));
    let chain = define_chain("calls", Arc::new(receiver), vec![Arc::new(method)], 2)
        .unwrap_or_else(|err| panic!("chain: {err}"));
    Template::expression(
        "calls",
        SupportedLanguage::Python,
        "${calls}",
        [("calls", chain)],
    )
    .unwrap_or_else(|err| panic!("template: {err}"))
}

#[test]
fn snapshot_chain_match_outline() {
    let mut builder = PatternBuilder::new(SupportedLanguage::Python)
        .unwrap_or_else(|err| panic!("builder: {err}"));
    let mut registry = PatternRegistry::new(SupportedLanguage::Python);
    let pattern = builder
        .compile(&chain_template())
        .unwrap_or_else(|err| panic!("compile: {err}"));
    registry
        .register(pattern)
        .unwrap_or_else(|err| panic!("register: {err}"));
    let mut parser =
        Parser::new(SupportedLanguage::Python).unwrap_or_else(|err| panic!("parser: {err}"));
    let parsed = parser
        .parse("a.b().c()\n")
        .unwrap_or_else(|err| panic!("parse: {err}"));

    let matches = Matcher::new(&registry).find_all(&parsed, &Context::new());
    let outline: Vec<String> = matches.iter().map(match_to_string).collect();
    assert_snapshot!(outline.concat(), @r#"
    calls @ 0..9 "a.b().c()"
      chain calls
        start 0..1 "a"
        link 1..5 ".b()"
        link 5..9 ".c()"
    receiver @ 0..1 "a"
      arg recv = identifier "a"
    method @ 1..5 ".b()"
      arg name = identifier "b"
    method @ 5..9 ".c()"
      arg name = identifier "c"
    "#);
}

#[test]
fn snapshot_typescript_block_pattern() {
    let guard = Template::statement(
        "guard",
        SupportedLanguage::TypeScript,
        "if (${cond}) ${body}",
        [
            ("cond", define_argument("cond", ["identifier"])),
            ("body", define_block([("scope", "cond")])),
        ],
    )
    .unwrap_or_else(|err| panic!("template: {err}"));
    let mut builder = PatternBuilder::new(SupportedLanguage::TypeScript)
        .unwrap_or_else(|err| panic!("builder: {err}"));
    let pattern = builder
        .compile(&guard)
        .unwrap_or_else(|err| panic!("compile: {err}"));

    assert_snapshot!(pattern_to_string(pattern.root()), @r#"
    if_statement ["if"] {
      condition: parenthesized_expression ["(", ")"] {
        <argument cond: identifier>
      }
      consequence: <block scope=cond>
    }
    "#);
}
