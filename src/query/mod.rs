//! Search Criteria
//!
//! The boolean metadata query language: a restricted expression grammar over
//! typed, possibly multi-valued properties. Criteria text is tokenized,
//! shunting-yard compiled into a fixed postfix instruction sequence, and
//! evaluated per node with a boolean stack. Compiled expressions are immutable
//! and safe to share across threads.

mod compiler;
mod eval;
mod lexer;

pub use compiler::{CompileOptions, Connective, SearchExpression};
pub use lexer::CompareOp;
