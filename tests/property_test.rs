// tests/property_test.rs

//! Property-based tests for gameframe
//!
//! These tests use property-based testing to verify invariants that should
//! hold regardless of input values.

mod property {
    pub mod roundtrip_test;
}
