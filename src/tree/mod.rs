//! Tree Traversal
//!
//! Mutation and concurrent, ordered traversal of the container hierarchy:
//! Browse, Search, their sorted variants, and identity lookup. Each level is
//! snapshotted under a read lock that is released before descending, so
//! traversal never holds a lock across recursion; the price is that there is
//! no cross-level atomicity under concurrent mutation.

mod sort;

pub use sort::SortCriterion;

use crate::error::{Error, Result};
use crate::index::IndexError;
use crate::node::ContentNode;
use crate::query::SearchExpression;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Process-wide lock used by containers configured with [`LockPolicy::Shared`].
static SHARED_TREE_LOCK: RwLock<()> = RwLock::new(());

/// How container child indices are guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// One reader/writer lock per container (default).
    #[default]
    PerContainer,
    /// One process-wide lock shared by every container that opts in. Trades
    /// concurrency for a single globally consistent lock order.
    Shared,
}

impl LockPolicy {
    pub(crate) fn read_shared(&self) -> Option<RwLockReadGuard<'static, ()>> {
        match self {
            LockPolicy::PerContainer => None,
            LockPolicy::Shared => Some(SHARED_TREE_LOCK.read()),
        }
    }

    pub(crate) fn write_shared(&self) -> Option<RwLockWriteGuard<'static, ()>> {
        match self {
            LockPolicy::PerContainer => None,
            LockPolicy::Shared => Some(SHARED_TREE_LOCK.write()),
        }
    }
}

/// Placement of container children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildOrder {
    /// Id-sorted index, binary-search identity lookup (server use).
    #[default]
    ById,
    /// Caller-supplied order, linear identity lookup (control-point use).
    Insertion,
}

/// Container construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeConfig {
    pub lock_policy: LockPolicy,
    pub child_order: ChildOrder,
}

/// One page of children plus the pre-slice total.
#[derive(Debug, Clone)]
pub struct BrowseResult {
    pub page: Vec<Arc<ContentNode>>,
    pub total: usize,
}

/// Matches of a search plus how the traversal ended. A truncated search
/// reports `total = 0`, so `exhaustive` is the only way to tell a cut-off
/// search from a genuinely empty one.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub matches: Vec<Arc<ContentNode>>,
    pub total: usize,
    pub exhaustive: bool,
}

/// Caller-supplied cache of visited id → node pairs for descendant lookup.
/// Holds only weak references, so it never keeps a removed node alive.
#[derive(Default)]
pub struct DescendantCache {
    map: Mutex<HashMap<String, Weak<ContentNode>>>,
}

impl DescendantCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached node that is still reachable.
    pub fn get(&self, id: &str) -> Option<Arc<ContentNode>> {
        self.map.lock().get(id).and_then(Weak::upgrade)
    }

    /// Record a visited node, refreshing an existing entry only when its
    /// previous referent is no longer reachable.
    fn record(&self, node: &Arc<ContentNode>) {
        let mut map = self.map.lock();
        match map.get(node.id()) {
            Some(existing) if existing.upgrade().is_some() => {}
            _ => {
                map.insert(node.id().to_string(), Arc::downgrade(node));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

impl ContentNode {
    /// Link `child` into this container.
    ///
    /// Fails with [`Error::ParentConflict`] when the child already belongs to
    /// a different live container, and with [`Error::DuplicateIdentity`] when
    /// the id collides and `overwrite` is off. On overwrite the displaced
    /// child's parent reference is cleared. The index is unchanged on error.
    pub fn add_child(self: &Arc<Self>, child: Arc<ContentNode>, overwrite: bool) -> Result<()> {
        self.check_parent_conflict(&child)?;
        let _shared = self.lock_policy().write_shared();
        let mut children = self.children().write();
        match children.index.insert(Arc::clone(&child), overwrite) {
            Ok(displaced) => {
                if let Some(old) = displaced {
                    old.clear_parent();
                }
            }
            Err(IndexError::KeyCollision) => {
                return Err(Error::DuplicateIdentity(child.id().to_string()));
            }
        }
        child.set_parent(Arc::downgrade(self));
        children.populated = true;
        Ok(())
    }

    /// Link a batch of children, all-or-nothing: every parent conflict and id
    /// collision is detected before anything is placed.
    pub fn add_children(
        self: &Arc<Self>,
        batch: Vec<Arc<ContentNode>>,
        overwrite: bool,
    ) -> Result<()> {
        for child in &batch {
            self.check_parent_conflict(child)?;
        }
        let _shared = self.lock_policy().write_shared();
        let mut children = self.children().write();
        if !overwrite {
            for (n, child) in batch.iter().enumerate() {
                if children.index.find(child).is_some()
                    || batch[..n].iter().any(|prior| prior.id() == child.id())
                {
                    return Err(Error::DuplicateIdentity(child.id().to_string()));
                }
            }
        }
        let displaced = children
            .index
            .insert_many(batch.iter().map(Arc::clone).collect(), overwrite)
            .map_err(|IndexError::KeyCollision| {
                // Collisions were ruled out above
                debug_assert!(false, "collision after validation");
                Error::DuplicateIdentity(self.id().to_string())
            })?;
        for old in displaced {
            old.clear_parent();
        }
        for child in &batch {
            child.set_parent(Arc::downgrade(self));
        }
        // An empty batch must not flip an empty container to populated
        children.populated = !children.index.is_empty();
        Ok(())
    }

    /// Unlink `child`. Returns whether it was present; the container reverts
    /// to unpopulated when it empties.
    pub fn remove_child(&self, child: &Arc<ContentNode>) -> bool {
        let _shared = self.lock_policy().write_shared();
        let mut children = self.children().write();
        match children.index.remove(child) {
            Some(removed) => {
                removed.clear_parent();
                if children.index.is_empty() {
                    children.populated = false;
                }
                true
            }
            None => false,
        }
    }

    /// Unlink a batch of children, returning how many were present.
    pub fn remove_children(&self, batch: &[Arc<ContentNode>]) -> usize {
        let _shared = self.lock_policy().write_shared();
        let mut children = self.children().write();
        let removed = children.index.remove_many(batch);
        for child in &removed {
            child.clear_parent();
        }
        if children.index.is_empty() {
            children.populated = false;
        }
        removed.len()
    }

    /// One page of children in index order. `limit == 0` means unbounded;
    /// `total` is the pre-slice child count.
    pub fn browse(&self, start: usize, limit: usize) -> BrowseResult {
        let snapshot = self.level_snapshot();
        let total = snapshot.len();
        BrowseResult {
            page: page_of(snapshot, start, limit),
            total,
        }
    }

    /// One page of children under a sort criterion. Fails with
    /// [`Error::AmbiguousOrdering`] when the criterion ties two distinct
    /// children; no partial page is returned.
    pub fn browse_sorted(
        &self,
        start: usize,
        limit: usize,
        criterion: &SortCriterion,
    ) -> Result<BrowseResult> {
        let snapshot = self.level_snapshot();
        let total = snapshot.len();
        let sorted = sort_nodes(snapshot, criterion)?;
        Ok(BrowseResult {
            page: page_of(sorted, start, limit),
            total,
        })
    }

    /// Depth-first pre-order search of this container's subtree. Matches
    /// before `start` are counted but not returned; once `limit` matches are
    /// collected (`limit != 0`) traversal stops immediately and the result is
    /// marked non-exhaustive with `total = 0`. A completed traversal reports
    /// the exact match count.
    pub fn search(
        &self,
        expression: &SearchExpression,
        start: usize,
        limit: usize,
    ) -> Result<SearchResult> {
        debug!(container = self.id(), start, limit, "search");
        let mut matches = Vec::new();
        let mut seen = 0usize;
        let complete = self.search_into(expression, start, limit, &mut seen, &mut matches)?;
        if !complete {
            debug!(container = self.id(), collected = matches.len(), "search truncated");
        }
        Ok(SearchResult {
            matches,
            total: if complete { seen } else { 0 },
            exhaustive: complete,
        })
    }

    /// Search without early termination, ordered by a sort criterion. The
    /// total is always the exact match count.
    pub fn search_sorted(
        &self,
        expression: &SearchExpression,
        criterion: &SortCriterion,
        start: usize,
        limit: usize,
    ) -> Result<SearchResult> {
        debug!(container = self.id(), start, limit, "search_sorted");
        let mut matches = Vec::new();
        let mut seen = 0usize;
        self.search_into(expression, 0, 0, &mut seen, &mut matches)?;
        let total = matches.len();
        let sorted = sort_nodes(matches, criterion)?;
        Ok(SearchResult {
            matches: page_of(sorted, start, limit),
            total,
            exhaustive: true,
        })
    }

    /// Returns false when truncated by the limit. Siblings are matched before
    /// any of them is descended into, and the level's lock is released before
    /// recursing.
    fn search_into(
        &self,
        expression: &SearchExpression,
        start: usize,
        limit: usize,
        seen: &mut usize,
        out: &mut Vec<Arc<ContentNode>>,
    ) -> Result<bool> {
        let level = self.level_snapshot();
        trace!(container = self.id(), children = level.len(), "search level");
        for child in &level {
            if expression.matches(child)? {
                *seen += 1;
                if *seen > start {
                    out.push(Arc::clone(child));
                    if limit != 0 && out.len() == limit {
                        return Ok(false);
                    }
                }
            }
        }
        for child in &level {
            if child.is_container()
                && !child.search_into(expression, start, limit, seen, out)?
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Pre-order lookup of a descendant by id. A caller-supplied cache is
    /// consulted first and populated with every node visited on the way.
    pub fn get_descendant(
        self: &Arc<Self>,
        id: &str,
        cache: Option<&DescendantCache>,
    ) -> Option<Arc<ContentNode>> {
        if let Some(cache) = cache {
            if let Some(hit) = cache.get(id) {
                return Some(hit);
            }
        }
        self.find_descendant(id, cache)
    }

    fn find_descendant(
        &self,
        id: &str,
        cache: Option<&DescendantCache>,
    ) -> Option<Arc<ContentNode>> {
        let level = self.level_snapshot();
        for child in &level {
            if let Some(cache) = cache {
                cache.record(child);
            }
            if child.id() == id {
                return Some(Arc::clone(child));
            }
            if child.is_container() {
                if let Some(found) = child.find_descendant(id, cache) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Snapshot the child sequence under the read lock, releasing it before
    /// returning so no lock is held while the caller works the level.
    fn level_snapshot(&self) -> Vec<Arc<ContentNode>> {
        let _shared = self.lock_policy().read_shared();
        self.children().read().index.snapshot()
    }

    fn check_parent_conflict(self: &Arc<Self>, child: &Arc<ContentNode>) -> Result<()> {
        if let Some(current) = child.parent() {
            if !Arc::ptr_eq(&current, self) {
                return Err(Error::ParentConflict(child.id().to_string()));
            }
        }
        Ok(())
    }
}

fn page_of(nodes: Vec<Arc<ContentNode>>, start: usize, limit: usize) -> Vec<Arc<ContentNode>> {
    let take = if limit == 0 { usize::MAX } else { limit };
    nodes.into_iter().skip(start).take(take).collect()
}

/// Materialize a sorted sequence, rejecting criteria that tie two distinct
/// nodes.
fn sort_nodes(
    nodes: Vec<Arc<ContentNode>>,
    criterion: &SortCriterion,
) -> Result<Vec<Arc<ContentNode>>> {
    let mut sorted = crate::index::OrderedIndex::sorted(criterion.comparator());
    for node in nodes {
        sorted
            .insert(node, false)
            .map_err(|IndexError::KeyCollision| Error::AmbiguousOrdering)?;
    }
    Ok(sorted.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchExpression;

    fn track(id: &str, title: &str) -> Arc<ContentNode> {
        Arc::new(
            ContentNode::item(id)
                .with_element("dc", "title", title)
                .with_element("upnp", "class", "object.item.audioItem.musicTrack"),
        )
    }

    fn album(id: &str, title: &str) -> Arc<ContentNode> {
        Arc::new(
            ContentNode::container(id)
                .with_element("dc", "title", title)
                .with_element("upnp", "class", "object.container.album.musicAlbum"),
        )
    }

    #[test]
    fn test_add_and_remove_child_linkage() {
        let root = Arc::new(ContentNode::container("0"));
        let child = track("1", "Rain");
        root.add_child(Arc::clone(&child), false).unwrap();
        assert!(root.is_populated());
        let browsed = root.browse(0, 0);
        assert_eq!(browsed.total, 1);
        assert_eq!(browsed.page[0].id(), "1");
        assert!(Arc::ptr_eq(&child.parent().unwrap(), &root));

        assert!(root.remove_child(&child));
        assert!(child.parent().is_none());
        assert!(!root.is_populated());
        assert_eq!(root.browse(0, 0).total, 0);
        assert!(!root.remove_child(&child));
    }

    #[test]
    fn test_duplicate_identity_leaves_index_unchanged() {
        let root = Arc::new(ContentNode::container("0"));
        root.add_child(track("1", "One"), false).unwrap();
        let before: Vec<String> = root
            .browse(0, 0)
            .page
            .iter()
            .map(|n| n.id().to_string())
            .collect();

        let err = root.add_child(track("1", "Other"), false).unwrap_err();
        assert_eq!(err, Error::DuplicateIdentity("1".to_string()));
        let after: Vec<String> = root
            .browse(0, 0)
            .page
            .iter()
            .map(|n| n.id().to_string())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_overwrite_clears_displaced_parent() {
        let root = Arc::new(ContentNode::container("0"));
        let old = track("1", "Old");
        root.add_child(Arc::clone(&old), false).unwrap();
        let new = track("1", "New");
        root.add_child(Arc::clone(&new), true).unwrap();
        assert!(old.parent().is_none());
        assert!(Arc::ptr_eq(&new.parent().unwrap(), &root));
        assert_eq!(root.browse(0, 0).total, 1);
    }

    #[test]
    fn test_parent_conflict() {
        let a = Arc::new(ContentNode::container("a"));
        let b = Arc::new(ContentNode::container("b"));
        let child = track("1", "One");
        a.add_child(Arc::clone(&child), false).unwrap();
        let err = b.add_child(Arc::clone(&child), false).unwrap_err();
        assert_eq!(err, Error::ParentConflict("1".to_string()));
        assert_eq!(b.browse(0, 0).total, 0);
        // Re-adding to the same parent is not a conflict
        assert!(matches!(
            a.add_child(child, false),
            Err(Error::DuplicateIdentity(_))
        ));
    }

    #[test]
    fn test_add_children_all_or_nothing() {
        let root = Arc::new(ContentNode::container("0"));
        root.add_child(track("2", "Two"), false).unwrap();
        let err = root
            .add_children(vec![track("1", "One"), track("2", "Dup")], false)
            .unwrap_err();
        assert_eq!(err, Error::DuplicateIdentity("2".to_string()));
        assert_eq!(root.browse(0, 0).total, 1);

        root.add_children(vec![track("1", "One"), track("3", "Three")], false)
            .unwrap();
        assert_eq!(root.browse(0, 0).total, 3);
    }

    #[test]
    fn test_empty_batch_does_not_populate() {
        let root = Arc::new(ContentNode::container("0"));
        root.add_children(Vec::new(), false).unwrap();
        assert!(!root.is_populated());
        assert_eq!(root.child_count(), 0);

        // An empty batch against a populated container changes nothing
        root.add_child(track("1", "One"), false).unwrap();
        root.add_children(Vec::new(), false).unwrap();
        assert!(root.is_populated());
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn test_browse_pagination() {
        let root = Arc::new(ContentNode::container("0"));
        for n in 1..=5 {
            root.add_child(track(&n.to_string(), "t"), false).unwrap();
        }
        let page = root.browse(1, 2);
        assert_eq!(page.total, 5);
        let ids: Vec<&str> = page.page.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        // limit 0 is unbounded
        assert_eq!(root.browse(0, 0).page.len(), 5);
    }

    #[test]
    fn test_insertion_order_children() {
        let config = TreeConfig {
            child_order: ChildOrder::Insertion,
            ..TreeConfig::default()
        };
        let root = Arc::new(ContentNode::container_with("0", config));
        for id in ["9", "3", "7"] {
            root.add_child(track(id, "t"), false).unwrap();
        }
        let result = root.browse(0, 0);
        let ids: Vec<&str> = result.page.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["9", "3", "7"]);
    }

    #[test]
    fn test_browse_sorted_and_ambiguity() {
        let root = Arc::new(ContentNode::container("0"));
        root.add_children(
            vec![track("1", "Revolver"), track("2", "Abbey Road"), track("3", "Help!")],
            false,
        )
        .unwrap();
        let by_title = SortCriterion::parse("+dc:title").unwrap();
        let result = root.browse_sorted(0, 2, &by_title).unwrap();
        assert_eq!(result.total, 3);
        let titles: Vec<&str> = result.page.iter().map(|n| n.id()).collect();
        assert_eq!(titles, vec!["2", "3"]);

        root.add_child(track("4", "Help!"), false).unwrap();
        assert_eq!(
            root.browse_sorted(0, 0, &by_title).unwrap_err(),
            Error::AmbiguousOrdering
        );
    }

    #[test]
    fn test_browse_sorted_with_caller_comparator() {
        let root = Arc::new(ContentNode::container("0"));
        root.add_children(
            vec![track("1", "Charlie"), track("2", "Alpha"), track("3", "Bravo")],
            false,
        )
        .unwrap();
        // Order by title through an arbitrary closure rather than a parsed spec
        let by_title = SortCriterion::by(|a, b| {
            a.element_values("dc", "title")
                .first()
                .map(crate::value::Value::string_value)
                .cmp(&b.element_values("dc", "title").first().map(|v| v.string_value()))
        });
        let result = root.browse_sorted(0, 0, &by_title).unwrap();
        let ids: Vec<&str> = result.page.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_search_limit_and_exhaustiveness() {
        let root = Arc::new(ContentNode::container("0"));
        for n in 1..=5 {
            root.add_child(track(&n.to_string(), "t"), false).unwrap();
        }
        let expr = SearchExpression::compile("upnp:class derivedfrom \"object.item\"").unwrap();

        let truncated = root.search(&expr, 0, 2).unwrap();
        assert_eq!(truncated.matches.len(), 2);
        assert!(!truncated.exhaustive);
        // Truncated totals are reported as unknown, spelled 0
        assert_eq!(truncated.total, 0);

        let full = root.search(&expr, 0, 0).unwrap();
        assert_eq!(full.matches.len(), 5);
        assert!(full.exhaustive);
        assert_eq!(full.total, 5);
    }

    #[test]
    fn test_search_is_pre_order_and_skips_start() {
        let root = Arc::new(ContentNode::container("0"));
        let disc1 = album("10", "Disc 1");
        let disc2 = album("20", "Disc 2");
        disc1.add_child(track("11", "a"), false).unwrap();
        disc2.add_child(track("21", "b"), false).unwrap();
        root.add_children(vec![disc1.clone(), disc2.clone()], false)
            .unwrap();

        let everything = SearchExpression::compile("@id exists true").unwrap();
        let all = root.search(&everything, 0, 0).unwrap();
        let ids: Vec<&str> = all.matches.iter().map(|n| n.id()).collect();
        // Both containers are matched before either is descended into
        assert_eq!(ids, vec!["10", "20", "11", "21"]);

        let offset = root.search(&everything, 2, 0).unwrap();
        let ids: Vec<&str> = offset.matches.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["11", "21"]);
        assert_eq!(offset.total, 4);
    }

    #[test]
    fn test_search_sorted_has_exact_total() {
        let root = Arc::new(ContentNode::container("0"));
        let sub = album("9", "Albums");
        sub.add_child(track("3", "Charlie"), false).unwrap();
        root.add_child(sub, false).unwrap();
        root.add_children(vec![track("1", "Echo"), track("2", "Alpha")], false)
            .unwrap();

        let items = SearchExpression::compile("upnp:class derivedfrom \"object.item\"").unwrap();
        let by_title = SortCriterion::parse("+dc:title").unwrap();
        let result = root.search_sorted(&items, &by_title, 0, 2).unwrap();
        assert!(result.exhaustive);
        assert_eq!(result.total, 3);
        let ids: Vec<&str> = result.matches.iter().map(|n| n.id()).collect();
        // Alpha, Charlie (Echo is past the page)
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_search_does_not_match_malformed_leaf_lazily() {
        // An incomparable leaf surfaces as an error, not a silent false
        let root = Arc::new(ContentNode::container("0"));
        root.add_child(
            Arc::new(
                ContentNode::item("1").with_resource(
                    "http://h/a.mp3",
                    vec![("size".to_string(), crate::value::Value::Integer(10))],
                ),
            ),
            false,
        )
        .unwrap();
        let expr = SearchExpression::compile("res@size = \"big\"").unwrap();
        assert!(root.search(&expr, 0, 0).is_err());
    }

    #[test]
    fn test_get_descendant_with_cache() {
        let root = Arc::new(ContentNode::container("0"));
        let sub = album("10", "Albums");
        let leaf = track("11", "x");
        sub.add_child(Arc::clone(&leaf), false).unwrap();
        root.add_child(Arc::clone(&sub), false).unwrap();

        let cache = DescendantCache::new();
        let found = root.get_descendant("11", Some(&cache)).unwrap();
        assert!(Arc::ptr_eq(&found, &leaf));
        // Both visited nodes were recorded
        assert!(cache.get("10").is_some());
        assert!(cache.get("11").is_some());
        assert!(root.get_descendant("99", Some(&cache)).is_none());

        // A dead entry is refreshed on the next walk
        sub.remove_child(&leaf);
        drop(found);
        drop(leaf);
        assert!(cache.get("11").is_none());
        let replacement = track("11", "fresh");
        sub.add_child(Arc::clone(&replacement), false).unwrap();
        let found = root.get_descendant("11", Some(&cache)).unwrap();
        assert!(Arc::ptr_eq(&found, &replacement));
    }

    #[test]
    fn test_shared_lock_policy() {
        let config = TreeConfig {
            lock_policy: LockPolicy::Shared,
            ..TreeConfig::default()
        };
        let root = Arc::new(ContentNode::container_with("0", config));
        let sub = Arc::new(ContentNode::container_with("1", config));
        sub.add_child(track("2", "t"), false).unwrap();
        root.add_child(sub, false).unwrap();
        // Traversal takes and releases the shared lock level by level
        let expr = SearchExpression::compile("@id exists true").unwrap();
        assert_eq!(root.search(&expr, 0, 0).unwrap().matches.len(), 2);
    }

    #[test]
    fn test_concurrent_search_and_mutation() {
        let root = Arc::new(ContentNode::container("0"));
        for n in 0..32 {
            root.add_child(track(&format!("seed{}", n), "t"), false)
                .unwrap();
        }
        let expr =
            Arc::new(SearchExpression::compile("upnp:class derivedfrom \"object.item\"").unwrap());
        std::thread::scope(|s| {
            let writer_root = Arc::clone(&root);
            s.spawn(move || {
                for n in 0..64 {
                    writer_root
                        .add_child(track(&format!("w{}", n), "t"), false)
                        .unwrap();
                }
            });
            for _ in 0..3 {
                let root = Arc::clone(&root);
                let expr = Arc::clone(&expr);
                s.spawn(move || {
                    for _ in 0..32 {
                        let result = root.search(&expr, 0, 0).unwrap();
                        assert!(result.matches.len() >= 32);
                        assert!(result.matches.len() <= 96);
                    }
                });
            }
        });
        assert_eq!(root.browse(0, 0).total, 96);
    }
}
