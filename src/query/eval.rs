//! Expression Evaluation
//!
//! Walks a compiled instruction sequence against one node's extracted
//! property values with a boolean stack. Evaluation is read-only and safely
//! reentrant from any thread.

use super::compiler::{Connective, Instruction, SearchExpression};
use super::lexer::CompareOp;
use crate::error::{Error, Result};
use crate::node::ContentNode;
use crate::path::Extractor;
use memchr::memmem;

impl SearchExpression {
    /// Decide whether `node` matches this expression.
    pub fn matches(&self, node: &ContentNode) -> Result<bool> {
        let Some(instructions) = self.instructions() else {
            return Ok(true);
        };
        let ignore_case = self.ignore_case();
        let mut stack: Vec<bool> = Vec::new();
        for instruction in instructions {
            match instruction {
                Instruction::Literal {
                    extractor,
                    literal,
                    op,
                } => {
                    stack.push(eval_leaf(extractor, literal, *op, node, ignore_case)?);
                }
                Instruction::Connective(connective) => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        // The compiler verifies stack discipline; an underflow
                        // here means the instruction sequence was corrupted.
                        debug_assert!(false, "connective without two operands");
                        return Ok(false);
                    };
                    stack.push(match connective {
                        Connective::And => left && right,
                        Connective::Or => left || right,
                    });
                }
            }
        }
        Ok(stack.pop().unwrap_or(false))
    }
}

/// Reduce one property's value sequence against a literal under an operator.
fn eval_leaf(
    extractor: &Extractor,
    literal: &str,
    op: CompareOp,
    node: &ContentNode,
    ignore_case: bool,
) -> Result<bool> {
    let values = extractor.extract(node);
    match op {
        CompareOp::Exists => Ok((!values.is_empty() && literal == "true")
            || (values.is_empty() && literal == "false")),

        // All six relational operators test exact equivalence only; true
        // when some extracted value is equivalent to the literal.
        CompareOp::Eq
        | CompareOp::Neq
        | CompareOp::Lt
        | CompareOp::Le
        | CompareOp::Gt
        | CompareOp::Ge => {
            for value in &values {
                match value.equivalent(literal, ignore_case) {
                    Some(true) => return Ok(true),
                    Some(false) => {}
                    None => {
                        return Err(Error::malformed(format!(
                            "operator `{}` cannot compare `{}` against `{}`",
                            op.name(),
                            literal,
                            value.string_value()
                        )))
                    }
                }
            }
            Ok(false)
        }

        // Substring tests: the last value visited decides. An empty value
        // sequence yields false.
        CompareOp::Contains | CompareOp::DoesNotContain => {
            let mut result = false;
            for value in &values {
                let found = contains(&value.string_value(), literal, ignore_case);
                result = if op == CompareOp::Contains {
                    found
                } else {
                    !found
                };
            }
            Ok(result)
        }

        // Prefix test with the same last-value-wins reduction.
        CompareOp::DerivedFrom => {
            let mut result = false;
            for value in &values {
                result = starts_with(&value.string_value(), literal, ignore_case);
            }
            Ok(result)
        }
    }
}

fn contains(haystack: &str, needle: &str, ignore_case: bool) -> bool {
    if ignore_case {
        let haystack = haystack.to_ascii_lowercase();
        let needle = needle.to_ascii_lowercase();
        return memmem::find(haystack.as_bytes(), needle.as_bytes()).is_some();
    }
    memmem::find(haystack.as_bytes(), needle.as_bytes()).is_some()
}

fn starts_with(value: &str, prefix: &str, ignore_case: bool) -> bool {
    if ignore_case {
        // get() rather than slicing: the prefix length may not fall on a
        // character boundary of the value
        value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    } else {
        value.starts_with(prefix)
    }
}
