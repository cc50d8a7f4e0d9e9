//! Crate-level tests for `projector_syntax`.

mod behaviour;
