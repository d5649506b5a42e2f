//! Database query implementations.

pub mod branches;
pub mod swift_codes;
