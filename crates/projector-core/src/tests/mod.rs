//! Unit tests for `projector_core` types.

mod config_tests;
