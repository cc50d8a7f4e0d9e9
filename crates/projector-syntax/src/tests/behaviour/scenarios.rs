//! Scenario bindings for the `projector-syntax` BDD feature file.
//!
//! These functions bind Gherkin scenario names to the step definitions in the
//! parent module.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use super::TestWorld;

/// Fixture providing the shared BDD world.
#[fixture]
fn world() -> RefCell<TestWorld> {
    super::world()
}

#[scenario(
    path = "tests/features/projector_syntax.feature",
    name = "The most specific pattern claims a call"
)]
fn most_specific_pattern_wins(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/projector_syntax.feature",
    name = "A generic pattern matches when the specific one does not"
)]
fn generic_pattern_fallback(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/projector_syntax.feature",
    name = "Aggregation parts are matched one by one"
)]
fn aggregation_parts(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/projector_syntax.feature",
    name = "A block body sees the names its header declares"
)]
fn block_scoping(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/projector_syntax.feature",
    name = "Gated patterns match once the context binds their names"
)]
fn context_gating(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/projector_syntax.feature",
    name = "Method chains carve their start and links"
)]
fn method_chains(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/projector_syntax.feature",
    name = "Short method chains are ignored"
)]
fn short_method_chains(world: RefCell<TestWorld>) {
    drop(world);
}
