//! End-to-end tests for the Prism client live under `tests/`
