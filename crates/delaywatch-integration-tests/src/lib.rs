//! Cross-crate tests for DelayWatch. See `tests/`.
