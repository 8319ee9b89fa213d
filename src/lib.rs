//! contentdir - query and hierarchy-traversal core of a media content directory
//!
//! Components:
//! - Ordered index: container children and sorted result materialization
//! - Property path resolver: `ns:element@attribute` paths compiled to extractors
//! - Criteria compiler: the boolean query grammar, shunting-yard to postfix
//! - Evaluator: postfix walk against one node's extracted values
//! - Tree traversal: Browse/Search with pagination, sorting, identity lookup
//!
//! The XML wire encoding of media objects, the media-class builder layer, and
//! resource transfer metadata live outside this crate; nodes arrive here fully
//! formed and only tree linkage and querying happen below.

pub mod error;
pub mod index;
pub mod node;
pub mod path;
pub mod query;
pub mod tree;
pub mod value;

pub use error::{Error, Result};
pub use node::{ContentNode, IdGenerator, MetaElement, NodeKind, Resource, SequentialIds};
pub use path::{Extractor, KindHint, PropertyPath};
pub use query::{CompareOp, CompileOptions, Connective, SearchExpression};
pub use tree::{
    BrowseResult, ChildOrder, DescendantCache, LockPolicy, SearchResult, SortCriterion,
    TreeConfig,
};
pub use value::Value;

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Compile search-criteria text with default options.
pub fn compile(criteria: &str) -> Result<SearchExpression> {
    SearchExpression::compile(criteria)
}

/// LRU cache of compiled search criteria, keyed by raw criteria text.
///
/// Control points tend to re-send the identical criteria string for every
/// page of a result set; caching the compiled expression skips re-parsing.
/// Compilation errors are not cached; they are deterministic and cheap.
pub struct QueryCache {
    inner: Mutex<LruCache<String, Arc<SearchExpression>>>,
    options: CompileOptions,
}

impl QueryCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_options(capacity, CompileOptions::default())
    }

    pub fn with_options(capacity: NonZeroUsize, options: CompileOptions) -> Self {
        QueryCache {
            inner: Mutex::new(LruCache::new(capacity)),
            options,
        }
    }

    /// Fetch the compiled form of `criteria`, compiling and caching on miss.
    pub fn get_or_compile(&self, criteria: &str) -> Result<Arc<SearchExpression>> {
        if let Some(hit) = self.inner.lock().get(criteria) {
            return Ok(Arc::clone(hit));
        }
        let compiled = Arc::new(SearchExpression::compile_with(criteria, self.options)?);
        self.inner
            .lock()
            .put(criteria.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
