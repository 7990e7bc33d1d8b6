//! Property test suite entry point.

mod safety_tests;
