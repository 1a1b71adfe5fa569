/// Checks on nesting results, used in `debug_assert!()` blocks and tests
pub mod assertions;
