//! Behaviour-driven development (BDD) step definitions for projector-syntax
//! scenarios.

mod scenarios;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use projector_core::Context;
use rstest::fixture;
use rstest_bdd_macros::{given, then, when};

use crate::{
    Match, Matcher, Parser, PatternBuilder, PatternRegistry, SupportedLanguage, Template,
    define_aggregation, define_argument, define_block, define_chain,
};

// =============================================================================
// Test World
// =============================================================================

/// State shared across BDD steps.
#[derive(Default)]
struct TestWorld {
    /// Language of the registered templates.
    language: Option<SupportedLanguage>,
    /// Templates registered before matching, in registration order.
    templates: Vec<Template>,
    /// Names bound in the root context.
    context: Vec<String>,
    /// Matches found by the last scan.
    matches: Vec<MatchSnapshot>,
}

/// Owned copy of the parts of a match the scenarios inspect.
#[derive(Debug)]
struct MatchSnapshot {
    pattern: String,
    depth: usize,
    args: BTreeMap<String, String>,
}

impl From<&Match<'_>> for MatchSnapshot {
    fn from(found: &Match<'_>) -> Self {
        Self {
            pattern: found.pattern().name().to_owned(),
            depth: found.depth(),
            args: found
                .args()
                .keys()
                .filter_map(|name| {
                    found
                        .arg_text(name)
                        .map(|text| (name.clone(), text.to_owned()))
                })
                .collect(),
        }
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

/// Turns the `\n` escapes used in feature files into newlines.
fn unescape(s: &str) -> String {
    strip_quotes(s).replace("\\n", "\n")
}

fn add_template(world: &RefCell<TestWorld>, template: Template) {
    let mut w = world.borrow_mut();
    w.language = Some(template.language());
    w.templates.push(template);
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("the norm templates")]
fn given_norm_templates(world: &RefCell<TestWorld>) {
    for (name, source) in [
        ("generic_norm", "${recv}.norm(${v}, ${ord})"),
        ("numpy_norm", "np.linalg.norm(${v}, ${ord})"),
    ] {
        let template = Template::expression(
            name,
            SupportedLanguage::Python,
            source,
            [
                ("recv", define_argument("recv", ["*"])),
                ("v", define_argument("v", ["identifier"])),
                ("ord", define_argument("ord", ["integer"])),
            ],
        )
        .expect("norm template");
        add_template(world, template);
    }
}

#[given("the select template with identifier parts")]
fn given_select_template(world: &RefCell<TestWorld>) {
    let part = Template::expression(
        "column",
        SupportedLanguage::Python,
        "${x}",
        [("x", define_argument("x", ["identifier"]))],
    )
    .expect("part template");
    let select = Template::expression(
        "select",
        SupportedLanguage::Python,
        "select${columns}",
        [(
            "columns",
            define_aggregation("columns", "argument_list", vec![Arc::new(part)], None),
        )],
    )
    .expect("select template");
    add_template(world, select);
}

#[given("the sheet templates")]
fn given_sheet_templates(world: &RefCell<TestWorld>) {
    let with_sheet = Template::statement(
        "with_sheet",
        SupportedLanguage::Python,
        "with ${ctx} as sheet:\n    ${body}\n",
        [
            ("ctx", define_argument("ctx", ["call"])),
            ("body", define_block([("sheet", "sheet")])),
        ],
    )
    .expect("with template");
    let cell = Template::expression(
        "cell",
        SupportedLanguage::Python,
        "sheet.cell(${row})",
        [("row", define_argument("row", ["integer"]))],
    )
    .expect("cell template")
    .with_required_context(["sheet"]);
    add_template(world, with_sheet);
    add_template(world, cell);
}

#[given("the method chain template")]
fn given_chain_template(world: &RefCell<TestWorld>) {
    let start = Template::expression(
        "receiver",
        SupportedLanguage::Python,
        "${recv}",
        [("recv", define_argument("recv", ["identifier"]))],
    )
    .expect("start template");
    let link = Template::expression(
        "method",
        SupportedLanguage::Python,
        "${name}()",
        [("name", define_argument("name", ["identifier"]))],
    )
    .expect("link template");
    let chain = define_chain("calls", Arc::new(start), vec![Arc::new(link)], 2).expect("chain");
    let template = Template::expression(
        "calls",
        SupportedLanguage::Python,
        "${calls}",
        [("calls", chain)],
    )
    .expect("chain template");
    add_template(world, template);
}

#[given("the context binds {name}")]
fn given_context_binding(world: &RefCell<TestWorld>, name: String) {
    world
        .borrow_mut()
        .context
        .push(strip_quotes(&name).to_owned());
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the source {source} is matched")]
fn when_source_matched(world: &RefCell<TestWorld>, source: String) {
    let mut w = world.borrow_mut();
    let language = w.language.expect("language should be set");
    let mut builder = PatternBuilder::new(language).expect("builder");
    let mut registry = PatternRegistry::new(language);
    for template in &w.templates {
        let pattern = builder.compile(template).expect("compile");
        registry.register(pattern).expect("register");
    }
    let context = Context::new().extend(w.context.iter().map(|name| (name.as_str(), None::<&str>)));

    let mut parser = Parser::new(language).expect("parser");
    let parsed = parser.parse(&unescape(&source)).expect("parse");
    let matches = Matcher::new(&registry).find_all(&parsed, &context);
    w.matches = matches.iter().map(MatchSnapshot::from).collect();
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("{count} matches are found")]
fn then_match_count(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    assert_eq!(w.matches.len(), count, "matches: {:?}", w.matches);
}

#[then("the matched patterns are {names}")]
fn then_matched_patterns(world: &RefCell<TestWorld>, names: String) {
    let w = world.borrow();
    let found: Vec<&str> = w.matches.iter().map(|m| m.pattern.as_str()).collect();
    let expected: Vec<&str> = strip_quotes(&names).split(", ").collect();
    assert_eq!(found, expected);
}

#[then("match {index} binds {arg} to {text}")]
fn then_match_binds(world: &RefCell<TestWorld>, index: usize, arg: String, text: String) {
    let w = world.borrow();
    let found = w.matches.get(index).expect("match index in range");
    assert_eq!(
        found.args.get(strip_quotes(&arg)).map(String::as_str),
        Some(strip_quotes(&text))
    );
}

#[then("match {index} is nested at depth {depth}")]
fn then_match_depth(world: &RefCell<TestWorld>, index: usize, depth: usize) {
    let w = world.borrow();
    let found = w.matches.get(index).expect("match index in range");
    assert_eq!(found.depth, depth);
}
