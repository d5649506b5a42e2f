//! SwiftCodes Core Library
//!
//! Headquarters/branch hierarchy over SWIFT code records: normalization,
//! link resolution, bulk import, incremental mutation, hierarchy queries
//! and a read-only consistency audit.

pub mod audit;
pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod mutate;
pub mod normalize;
pub mod query;
pub mod records;
pub mod resolver;

pub use error::{SwiftError, SwiftResult};
