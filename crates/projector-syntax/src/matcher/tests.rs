//! Unit tests for scanning and verification.

use std::sync::Arc;

use projector_core::{BlockDelimiter, CodeRange, Context, MatcherConfig};
use rstest::rstest;

use super::verify::block_range;
use super::*;
use crate::builder::PatternBuilder;
use crate::cursor::Keyword;
use crate::language::SupportedLanguage;
use crate::parser::{ParseResult, Parser};
use crate::template::{
    Template, define_aggregation, define_argument, define_block, define_chain,
    define_context_variable,
};

fn python(source: &str) -> ParseResult {
    let mut parser = Parser::new(SupportedLanguage::Python).expect("parser");
    parser.parse(source).expect("parse")
}

fn registry_of(templates: &[Template]) -> PatternRegistry {
    let mut builder = PatternBuilder::new(SupportedLanguage::Python).expect("builder");
    let mut registry = PatternRegistry::new(SupportedLanguage::Python);
    for template in templates {
        registry
            .register(builder.compile(template).expect("compile"))
            .expect("register");
    }
    registry
}

fn call_of_f(allowed: &[&str]) -> Template {
    Template::expression(
        "call_f",
        SupportedLanguage::Python,
        "f(${x})",
        [("x", define_argument("x", allowed.iter().copied()))],
    )
    .expect("template")
}

fn with_sheet() -> Template {
    Template::statement(
        "with_sheet",
        SupportedLanguage::Python,
        "with ${ctx} as sheet:\n    ${body}\n",
        [
            ("ctx", define_argument("ctx", ["call"])),
            ("body", define_block([("sheet", "sheet")])),
        ],
    )
    .expect("template")
}

fn names(matches: &[Match<'_>]) -> Vec<String> {
    matches
        .iter()
        .map(|found| found.pattern().name().to_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[rstest]
#[case("a + b\n", 1)]
#[case("a - b\n", 0)]
fn operator_tokens_must_agree(#[case] source: &str, #[case] expected: usize) {
    let plus = Template::expression(
        "plus",
        SupportedLanguage::Python,
        "${l} + ${r}",
        [
            ("l", define_argument("l", ["identifier"])),
            ("r", define_argument("r", ["identifier"])),
        ],
    )
    .expect("template");
    let registry = registry_of(&[plus]);
    let parsed = python(source);

    let matches = Matcher::new(&registry).find_all(&parsed, &Context::new());
    assert_eq!(matches.len(), expected);
}

#[rstest]
#[case("f(__empty_list)\n", Some("__empty_list"))]
#[case("f([1, 2])\n", Some("[1, 2]"))]
#[case("f(xs)\n", None)]
fn empty_placeholders_read_as_their_type(#[case] source: &str, #[case] bound: Option<&str>) {
    let registry = registry_of(&[call_of_f(&["list"])]);
    let parsed = python(source);

    let matches = Matcher::new(&registry).find_all(&parsed, &Context::new());
    assert_eq!(matches.first().and_then(|found| found.arg_text("x")), bound);
}

#[rstest]
#[case(true, Some("g()"))]
#[case(false, None)]
fn parenthesized_calls_are_unwrapped(#[case] unwrap: bool, #[case] bound: Option<&str>) {
    let registry = registry_of(&[call_of_f(&["call"])]);
    let parsed = python("f((g()))\n");
    let config = MatcherConfig::default().with_unwrap_parenthesized_calls(unwrap);
    let matcher = Matcher::new(&registry).with_config(config).expect("config");

    let matches = matcher.find_all(&parsed, &Context::new());
    assert_eq!(matches.first().and_then(|found| found.arg_text("x")), bound);
}

#[rstest]
#[case(Context::new(), "sheet.cell(1)\n", true)]
#[case(Context::new(), "book.cell(1)\n", false)]
#[case(Context::new().extend([("sheet", Some("book"))]), "book.cell(1)\n", true)]
#[case(Context::new().extend([("sheet", Some("book"))]), "sheet.cell(1)\n", false)]
#[case(Context::new().extend([("sheet", None::<&str>)]), "page.cell(1)\n", true)]
fn context_variables_follow_their_binding(
    #[case] context: Context,
    #[case] source: &str,
    #[case] matched: bool,
) {
    let cell = Template::expression(
        "cell",
        SupportedLanguage::Python,
        "${sheet}.cell(${row})",
        [
            ("sheet", define_context_variable("sheet")),
            ("row", define_argument("row", ["integer"])),
        ],
    )
    .expect("template");
    let registry = registry_of(&[cell]);
    let parsed = python(source);

    let matches = Matcher::new(&registry).find_all(&parsed, &context);
    assert_eq!(!matches.is_empty(), matched);
}

#[test]
fn required_context_gates_candidates() {
    let gated = call_of_f(&["identifier"]).with_required_context(["mathdsl"]);
    let registry = registry_of(&[gated]);
    let parsed = python("f(x)\n");
    let matcher = Matcher::new(&registry);

    assert!(matcher.find_all(&parsed, &Context::new()).is_empty());
    let bound = Context::new().extend([("mathdsl", None::<&str>)]);
    assert_eq!(matcher.find_all(&parsed, &bound).len(), 1);
}

#[test]
fn comments_before_a_block_body_are_skipped() {
    let registry = registry_of(&[with_sheet()]);
    let parsed = python("with open_sheet() as sheet:\n    # header\n    pass\n");

    let matches = Matcher::new(&registry).find_all(&parsed, &Context::new());
    assert_eq!(names(&matches), ["with_sheet"]);
    let block = matches
        .first()
        .and_then(|found| found.blocks().first())
        .expect("block range");
    assert_eq!(block.declared().get("sheet").map(String::as_str), Some("sheet"));
}

// ---------------------------------------------------------------------------
// Sub-regions
// ---------------------------------------------------------------------------

#[test]
fn block_bodies_are_scanned_with_the_declared_bindings() {
    let cell = Template::expression(
        "cell",
        SupportedLanguage::Python,
        "sheet.cell(${row})",
        [("row", define_argument("row", ["integer"]))],
    )
    .expect("template")
    .with_required_context(["sheet"]);
    let registry = registry_of(&[with_sheet(), cell]);
    let parsed = python("with open_sheet() as sheet:\n    sheet.cell(1)\nsheet.cell(2)\n");

    let matches = Matcher::new(&registry).find_all(&parsed, &Context::new());
    assert_eq!(names(&matches), ["with_sheet", "cell"]);
    assert_eq!(matches.get(1).and_then(|found| found.arg_text("row")), Some("1"));
    assert_eq!(matches.get(1).map(Match::depth), Some(1));
}

#[rstest]
#[case::after_the_colon(BlockDelimiter::Colon, Some(":"), CodeRange::new(9, 20))]
#[case::no_colon_seen(BlockDelimiter::Colon, None, CodeRange::new(13, 20))]
#[case::other_keyword(BlockDelimiter::Colon, Some("else"), CodeRange::new(13, 20))]
#[case::braces_trimmed(BlockDelimiter::Brace, None, CodeRange::new(13, 19))]
fn block_ranges_skip_their_opening_byte(
    #[case] delimiter: BlockDelimiter,
    #[case] keyword: Option<&str>,
    #[case] expected: CodeRange,
) {
    let token = keyword.map(|text| Keyword { text, start: 8 });
    assert_eq!(
        block_range(delimiter, CodeRange::new(12, 20), token),
        expected
    );
}

#[rstest]
#[case(None, vec![0, 1, 2])]
#[case(Some(1), vec![0, 1])]
fn nesting_limit_stops_sub_region_scans(#[case] limit: Option<usize>, #[case] depths: Vec<usize>) {
    let registry = registry_of(&[with_sheet()]);
    let parsed = python(concat!(
        "with a() as sheet:\n",
        "    with b() as sheet:\n",
        "        with c() as sheet:\n",
        "            pass\n",
    ));
    let mut matcher = Matcher::new(&registry);
    if let Some(depth) = limit {
        matcher = matcher
            .with_config(MatcherConfig::default().with_max_nesting_depth(depth))
            .expect("config");
    }

    let matches = matcher.find_all(&parsed, &Context::new());
    let found: Vec<usize> = matches.iter().map(Match::depth).collect();
    assert_eq!(found, depths);
}

#[test]
fn aggregation_parts_exclude_structural_tokens() {
    let part = Template::expression(
        "name",
        SupportedLanguage::Python,
        "${x}",
        [("x", define_argument("x", ["identifier"]))],
    )
    .expect("part");
    let select = Template::expression(
        "select",
        SupportedLanguage::Python,
        "select${args}",
        [(
            "args",
            define_aggregation("args", "argument_list", vec![Arc::new(part)], None),
        )],
    )
    .expect("template");
    let registry = registry_of(&[select]);
    let parsed = python("select(a, b)\n");

    let matches = Matcher::new(&registry).find_all(&parsed, &Context::new());
    assert_eq!(names(&matches), ["select", "name", "name"]);
    let select_match = matches.first().expect("select match");
    let parts: Vec<&str> = select_match
        .aggregation("args")
        .expect("aggregation")
        .parts()
        .iter()
        .map(|part| select_match.text_at(part.range()))
        .collect();
    assert_eq!(parts, ["a", "b"]);
    assert_eq!(
        select_match.segments(),
        [
            CodeRange::new(0, 7),
            CodeRange::new(8, 10),
            CodeRange::new(11, 12)
        ]
    );
}

fn method_chain(minimum_length: usize) -> Template {
    let receiver = Template::expression(
        "receiver",
        SupportedLanguage::Python,
        "${recv}",
        [("recv", define_argument("recv", ["identifier"]))],
    )
    .expect("start");
    chain_from(receiver, minimum_length)
}

fn chain_from(receiver: Template, minimum_length: usize) -> Template {
    let method = Template::expression(
        "method",
        SupportedLanguage::Python,
        "${name}()",
        [("name", define_argument("name", ["identifier"]))],
    )
    .expect("link");
    let chain = define_chain(
        "calls",
        Arc::new(receiver),
        vec![Arc::new(method)],
        minimum_length,
    )
    .expect("chain");
    Template::expression(
        "calls",
        SupportedLanguage::Python,
        "${calls}",
        [("calls", chain)],
    )
    .expect("template")
}

#[test]
fn chains_carve_start_and_links_in_document_order() {
    let registry = registry_of(&[method_chain(2)]);
    let parsed = python("a.b().c()\n");

    let matches = Matcher::new(&registry).find_all(&parsed, &Context::new());
    assert_eq!(names(&matches), ["calls", "receiver", "method", "method"]);

    let chain_match = matches.first().expect("chain match");
    let chain = chain_match.chain("calls").expect("chain ranges");
    assert_eq!(chain_match.text_at(chain.start().range()), "a");
    let links: Vec<&str> = chain
        .links()
        .iter()
        .map(|link| chain_match.text_at(link.range()))
        .collect();
    assert_eq!(links, [".b()", ".c()"]);

    let link_ranges: Vec<CodeRange> = matches.iter().skip(2).map(Match::range).collect();
    assert_eq!(link_ranges, [CodeRange::new(1, 5), CodeRange::new(5, 9)]);
}

#[test]
fn chains_below_the_minimum_do_not_match() {
    let registry = registry_of(&[method_chain(2)]);
    let parsed = python("a.b()\n");

    assert!(
        Matcher::new(&registry)
            .find_all(&parsed, &Context::new())
            .is_empty()
    );
}

#[test]
fn calls_on_the_spine_are_links_not_starts() {
    let reader = Template::expression(
        "reader",
        SupportedLanguage::Python,
        "pl.read(${f})",
        [("f", define_argument("f", ["string"]))],
    )
    .expect("start");
    let registry = registry_of(&[chain_from(reader, 2)]);

    let call_shaped = python("pl.read(\"a\").b().c()\n");
    assert!(
        Matcher::new(&registry)
            .find_all(&call_shaped, &Context::new())
            .is_empty()
    );
}

#[test]
fn chains_whose_path_ends_on_a_call_do_not_match() {
    let registry = registry_of(&[method_chain(2)]);
    let parsed = python("f().b().c()\n");

    assert!(
        Matcher::new(&registry)
            .find_all(&parsed, &Context::new())
            .is_empty()
    );
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

#[test]
fn match_root_checks_only_the_node_under_the_cursor() {
    let registry = registry_of(&[call_of_f(&["identifier"])]);
    let parsed = python("f(a)\n");
    let matcher = Matcher::new(&registry);
    let mut cursor = parsed.cursor();

    assert!(matcher.match_root(&cursor, &Context::new()).is_none());
    assert!(cursor.goto_first_child());
    assert!(matcher.match_root(&cursor, &Context::new()).is_none());
    assert!(cursor.goto_first_child());
    let found = matcher
        .match_root(&cursor, &Context::new())
        .expect("call matches");
    assert_eq!(found.arg_text("x"), Some("a"));
}

#[test]
fn find_matches_in_stays_inside_the_range() {
    let registry = registry_of(&[call_of_f(&["identifier"])]);
    let parsed = python("f(a)\nf(b)\nf(c)\n");

    let matches =
        Matcher::new(&registry).find_matches_in(&parsed, CodeRange::new(5, 9), &Context::new());
    let bound: Vec<&str> = matches.iter().filter_map(|found| found.arg_text("x")).collect();
    assert_eq!(bound, ["b"]);
}

#[rstest]
#[case::from_the_start(CodeRange::new(0, 9))]
#[case::inside_the_callee(CodeRange::new(1, 9))]
#[case::at_the_inner_call(CodeRange::new(4, 9))]
fn find_matches_in_reaches_siblings_after_a_partial_token(#[case] range: CodeRange) {
    let inner = Template::expression(
        "call_g",
        SupportedLanguage::Python,
        "g(${x})",
        [("x", define_argument("x", ["identifier"]))],
    )
    .expect("template");
    let registry = registry_of(&[inner]);
    let parsed = python("foo(g(a))\n");

    let matches = Matcher::new(&registry).find_matches_in(&parsed, range, &Context::new());
    let texts: Vec<&str> = matches.iter().map(Match::text).collect();
    assert_eq!(texts, ["g(a)"]);
}

#[test]
fn find_matches_returns_the_cursor_where_it_started() {
    let registry = registry_of(&[call_of_f(&["identifier"])]);
    let parsed = python("f(a)\nf(b)\n");
    let mut cursor = parsed.cursor();
    assert!(cursor.goto_first_child());
    let before = cursor.snapshot();

    let matches = Matcher::new(&registry).find_matches(&mut cursor, &Context::new(), None);
    assert_eq!(matches.len(), 2);
    assert_eq!(cursor.snapshot(), before);
}

#[test]
fn match_positions_are_one_based() {
    let registry = registry_of(&[call_of_f(&["identifier"])]);
    let parsed = python("x = 1\ny = f(a)\n");

    let matches = Matcher::new(&registry).find_all(&parsed, &Context::new());
    let found = matches.first().expect("match");
    assert_eq!(found.start_position(), (2, 5));
    assert_eq!(found.end_position(), (2, 9));
    assert_eq!(found.text(), "f(a)");
}

#[test]
fn invalid_configuration_is_rejected() {
    let registry = registry_of(&[]);
    let result = Matcher::new(&registry)
        .with_config(MatcherConfig::default().with_max_nesting_depth(0));
    assert!(matches!(result, Err(ProjectorError::Config(_))));
}
