//! Error Taxonomy
//!
//! Every failure in this crate is deterministic given its inputs; nothing is
//! retried internally and nothing here performs I/O.

/// Crate-wide error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The search criteria text could not be compiled, or a compiled leaf
    /// compared a literal against a value it cannot be parsed as.
    #[error("malformed search criteria: {0}")]
    MalformedSearchCriteria(String),

    /// A property path named an attribute outside the allowed set for its
    /// element.
    #[error("invalid attribute `{attribute}` for element `{element}`")]
    InvalidAttribute { element: String, attribute: String },

    /// A child with the same id already exists and overwrite was not
    /// requested.
    #[error("duplicate object id `{0}`")]
    DuplicateIdentity(String),

    /// The node being added is already the child of a different container.
    #[error("object `{0}` already belongs to a different container")]
    ParentConflict(String),

    /// The sort comparator reported two distinct nodes as equal, so no total
    /// order exists over the result set.
    #[error("sort criterion is not a total order over the result set")]
    AmbiguousOrdering,
}

impl Error {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Error::MalformedSearchCriteria(detail.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_fragment() {
        let err = Error::malformed("unexpected token `and`");
        assert_eq!(
            err.to_string(),
            "malformed search criteria: unexpected token `and`"
        );
    }

    #[test]
    fn test_invalid_attribute_display() {
        let err = Error::InvalidAttribute {
            element: "res".into(),
            attribute: "flavor".into(),
        };
        assert!(err.to_string().contains("`flavor`"));
        assert!(err.to_string().contains("`res`"));
    }
}
