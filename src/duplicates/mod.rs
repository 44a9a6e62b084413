//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Aggregating hashed records into duplicate groups ([`index`])
//! - Selecting the keeper within each group ([`policy`])

pub mod index;
pub mod policy;

pub use index::{DuplicateGroup, GroupIndex};
pub use policy::{select_keeper, KeepPolicy};
