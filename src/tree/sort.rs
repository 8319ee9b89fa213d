//! Sort Criteria
//!
//! An ordering over content nodes, either caller-supplied or compiled from
//! the textual form directories exchange: a comma-separated list of signed
//! property paths (`+dc:title,-upnp:originalTrackNumber`). Whatever its
//! origin, a criterion must be a strict total order over the nodes it is
//! applied to for the duration of one call; ties between distinct nodes make
//! the sorted operations fail rather than return an arbitrary page.

use crate::error::{Error, Result};
use crate::index::Comparator;
use crate::node::ContentNode;
use crate::path::{Extractor, KindHint};
use std::cmp::Ordering;
use std::sync::Arc;

/// An ordering function over two content nodes.
#[derive(Clone)]
pub struct SortCriterion {
    cmp: Comparator<Arc<ContentNode>>,
}

impl std::fmt::Debug for SortCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortCriterion").finish_non_exhaustive()
    }
}

impl SortCriterion {
    /// Wrap an arbitrary comparator.
    pub fn by<F>(cmp: F) -> Self
    where
        F: Fn(&ContentNode, &ContentNode) -> Ordering + Send + Sync + 'static,
    {
        SortCriterion {
            cmp: Arc::new(move |a: &Arc<ContentNode>, b: &Arc<ContentNode>| cmp(a, b)),
        }
    }

    /// Compile a textual sort specification. Each key is a property path
    /// prefixed with `+` (ascending) or `-` (descending); keys apply in
    /// order, and a node missing the property sorts before one that has it.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut keys: Vec<(Arc<Extractor>, bool)> = Vec::new();
        for term in spec.split(',') {
            let term = term.trim();
            let (ascending, path) = match term.chars().next() {
                Some('+') => (true, &term[1..]),
                Some('-') => (false, &term[1..]),
                _ => {
                    return Err(Error::malformed(format!(
                        "sort key `{}` must begin with `+` or `-`",
                        term
                    )))
                }
            };
            if path.is_empty() {
                return Err(Error::malformed("sort key is missing a property path"));
            }
            keys.push((Arc::new(Extractor::compile(path, KindHint::Any)?), ascending));
        }
        Ok(SortCriterion {
            cmp: Arc::new(move |a: &Arc<ContentNode>, b: &Arc<ContentNode>| {
                for (extractor, ascending) in &keys {
                    let av = extractor.extract(a).into_iter().next();
                    let bv = extractor.extract(b).into_iter().next();
                    let ordering = match (&av, &bv) {
                        (None, None) => Ordering::Equal,
                        (None, Some(_)) => Ordering::Less,
                        (Some(_), None) => Ordering::Greater,
                        (Some(a), Some(b)) => a.compare(b),
                    };
                    let ordering = if *ascending {
                        ordering
                    } else {
                        ordering.reverse()
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            }),
        })
    }

    /// Compare two nodes under this criterion.
    pub fn compare(&self, a: &Arc<ContentNode>, b: &Arc<ContentNode>) -> Ordering {
        (self.cmp)(a, b)
    }

    pub(crate) fn comparator(&self) -> Comparator<Arc<ContentNode>> {
        Arc::clone(&self.cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(id: &str, title: &str) -> Arc<ContentNode> {
        Arc::new(ContentNode::item(id).with_element("dc", "title", title))
    }

    #[test]
    fn test_ascending_by_title() {
        let criterion = SortCriterion::parse("+dc:title").unwrap();
        let a = titled("1", "Abbey Road");
        let b = titled("2", "Revolver");
        assert_eq!(criterion.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_descending_flips() {
        let criterion = SortCriterion::parse("-dc:title").unwrap();
        let a = titled("1", "Abbey Road");
        let b = titled("2", "Revolver");
        assert_eq!(criterion.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_missing_value_sorts_first() {
        let criterion = SortCriterion::parse("+dc:title").unwrap();
        let untitled = Arc::new(ContentNode::item("1"));
        let b = titled("2", "Abbey Road");
        assert_eq!(criterion.compare(&untitled, &b), Ordering::Less);
    }

    #[test]
    fn test_secondary_key_breaks_ties() {
        let criterion = SortCriterion::parse("+dc:title,-@id").unwrap();
        let a = titled("1", "Same");
        let b = titled("2", "Same");
        assert_eq!(criterion.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_unsigned_key_rejected() {
        let err = SortCriterion::parse("dc:title").unwrap_err();
        assert!(err.to_string().contains("`+` or `-`"));
    }

    #[test]
    fn test_invalid_path_rejected() {
        assert!(matches!(
            SortCriterion::parse("+res@flavor").unwrap_err(),
            Error::InvalidAttribute { .. }
        ));
    }
}
