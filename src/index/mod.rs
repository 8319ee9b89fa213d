//! Ordered Collections
//!
//! The array-backed index behind container children and materialized sorted
//! query results.

mod ordered;

pub use ordered::{Comparator, IndexError, OrderedIndex};
