//! Criteria Compiler
//!
//! Shunting-yard compilation of tokenized criteria into a fixed postfix
//! instruction sequence. Compilation happens once per query string; the
//! resulting expression is reused across every node the traversal visits.

use super::lexer::{CompareOp, Lexer, Token};
use crate::error::{Error, Result};
use crate::path::{Extractor, KindHint};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// One postfix instruction.
#[derive(Debug, Clone)]
pub(crate) enum Instruction {
    /// Compiled leaf: extract the property, reduce its values against the
    /// literal under the operator, push one boolean.
    Literal {
        extractor: Arc<Extractor>,
        literal: String,
        op: CompareOp,
    },
    /// Pop two booleans, push their conjunction/disjunction.
    Connective(Connective),
}

/// Operator-stack entry during shunting-yard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackOp {
    LeftParen,
    Compare(CompareOp),
    Logic(Connective),
}

impl StackOp {
    fn precedence(&self) -> u8 {
        match self {
            StackOp::LeftParen => 30,
            StackOp::Compare(_) => 20,
            StackOp::Logic(_) => 10,
        }
    }
}

/// Postfix output before leaf folding.
#[derive(Debug)]
enum OutTok {
    Property(String),
    Value(String),
    Compare(CompareOp),
    Logic(Connective),
}

/// Compilation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Fold ASCII case in lexical comparison, substring, and prefix tests.
    pub ignore_case: bool,
}

/// A compiled, immutable search expression.
pub struct SearchExpression {
    kind: ExprKind,
    ignore_case: bool,
}

impl std::fmt::Debug for SearchExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchExpression")
            .field("ignore_case", &self.ignore_case)
            .finish_non_exhaustive()
    }
}

enum ExprKind {
    /// Empty or `*` criteria: every node matches
    MatchAll,
    Program(Vec<Instruction>),
}

impl SearchExpression {
    /// Compile criteria text with default options.
    pub fn compile(criteria: &str) -> Result<Self> {
        Self::compile_with(criteria, CompileOptions::default())
    }

    /// Compile criteria text.
    pub fn compile_with(criteria: &str, options: CompileOptions) -> Result<Self> {
        let trimmed = criteria.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(SearchExpression {
                kind: ExprKind::MatchAll,
                ignore_case: options.ignore_case,
            });
        }

        let tokens = Lexer::new(trimmed).tokenize()?;
        let output = shunting_yard(tokens)?;
        let instructions = fold_instructions(output)?;
        debug!(
            criteria = trimmed,
            instructions = instructions.len(),
            "compiled search criteria"
        );
        Ok(SearchExpression {
            kind: ExprKind::Program(instructions),
            ignore_case: options.ignore_case,
        })
    }

    /// Whether this expression matches unconditionally.
    pub fn is_match_all(&self) -> bool {
        matches!(self.kind, ExprKind::MatchAll)
    }

    pub(crate) fn instructions(&self) -> Option<&[Instruction]> {
        match &self.kind {
            ExprKind::MatchAll => None,
            ExprKind::Program(instructions) => Some(instructions),
        }
    }

    pub(crate) fn ignore_case(&self) -> bool {
        self.ignore_case
    }
}

/// Reorder the token stream into postfix. Property and value tokens emit
/// directly; operators go through the stack by precedence; parens bracket.
fn shunting_yard(tokens: Vec<Token>) -> Result<Vec<OutTok>> {
    let mut output: Vec<OutTok> = Vec::new();
    let mut stack: Vec<StackOp> = Vec::new();

    fn push_operator(op: StackOp, stack: &mut Vec<StackOp>, output: &mut Vec<OutTok>) {
        while let Some(top) = stack.last().copied() {
            if top == StackOp::LeftParen || top.precedence() < op.precedence() {
                break;
            }
            stack.pop();
            emit(top, output);
        }
        stack.push(op);
    }

    for token in tokens {
        match token {
            Token::Property(text) => output.push(OutTok::Property(text)),
            Token::Value(text) => output.push(OutTok::Value(text)),
            Token::Compare(op) => push_operator(StackOp::Compare(op), &mut stack, &mut output),
            Token::And => push_operator(StackOp::Logic(Connective::And), &mut stack, &mut output),
            Token::Or => push_operator(StackOp::Logic(Connective::Or), &mut stack, &mut output),
            Token::LeftParen => stack.push(StackOp::LeftParen),
            Token::RightParen => loop {
                match stack.pop() {
                    Some(StackOp::LeftParen) => break,
                    Some(op) => emit(op, &mut output),
                    None => {
                        return Err(Error::malformed(
                            "unmatched `)` without a left parenthesis",
                        ))
                    }
                }
            },
        }
    }

    while let Some(op) = stack.pop() {
        if op == StackOp::LeftParen {
            return Err(Error::malformed("unclosed `(` in criteria"));
        }
        emit(op, &mut output);
    }
    Ok(output)
}

fn emit(op: StackOp, output: &mut Vec<OutTok>) {
    match op {
        StackOp::Compare(c) => output.push(OutTok::Compare(c)),
        StackOp::Logic(l) => output.push(OutTok::Logic(l)),
        StackOp::LeftParen => {}
    }
}

/// Pending operand while folding postfix output into instructions.
enum Operand {
    Property(String),
    Value(String),
}

/// Fold the postfix token stream into the instruction sequence, compiling
/// each distinct property path once and verifying that the stream reduces to
/// exactly one boolean. Ill-formed streams (a property with no operator, a
/// connective short of operands) are rejected here so the evaluator never
/// sees them.
fn fold_instructions(output: Vec<OutTok>) -> Result<Vec<Instruction>> {
    let mut instructions: Vec<Instruction> = Vec::new();
    let mut operands: Vec<Operand> = Vec::new();
    let mut extractors: HashMap<String, Arc<Extractor>> = HashMap::new();
    let mut depth: usize = 0;

    for tok in output {
        match tok {
            OutTok::Property(text) => operands.push(Operand::Property(text)),
            OutTok::Value(text) => operands.push(Operand::Value(text)),
            OutTok::Compare(op) => {
                let value = operands.pop();
                let property = operands.pop();
                let (Some(Operand::Property(property)), Some(Operand::Value(literal))) =
                    (property, value)
                else {
                    return Err(Error::malformed(format!(
                        "operator `{}` is missing a property or value",
                        op.name()
                    )));
                };
                let extractor = match extractors.entry(property) {
                    Entry::Occupied(cached) => Arc::clone(cached.get()),
                    Entry::Vacant(slot) => {
                        let compiled = Arc::new(Extractor::compile(slot.key(), KindHint::Any)?);
                        slot.insert(Arc::clone(&compiled));
                        compiled
                    }
                };
                instructions.push(Instruction::Literal {
                    extractor,
                    literal,
                    op,
                });
                depth += 1;
            }
            OutTok::Logic(connective) => {
                if depth < 2 {
                    let name = match connective {
                        Connective::And => "and",
                        Connective::Or => "or",
                    };
                    return Err(Error::malformed(format!(
                        "`{}` is missing a relation on one side",
                        name
                    )));
                }
                depth -= 1;
                instructions.push(Instruction::Connective(connective));
            }
        }
    }

    if depth != 1 || !operands.is_empty() {
        return Err(Error::malformed("criteria does not reduce to one relation"));
    }
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(expr: &SearchExpression) -> Vec<String> {
        expr.instructions()
            .unwrap()
            .iter()
            .map(|i| match i {
                Instruction::Literal { op, literal, .. } => {
                    format!("{} {}", op.name(), literal)
                }
                Instruction::Connective(Connective::And) => "and".to_string(),
                Instruction::Connective(Connective::Or) => "or".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_empty_and_star_match_all() {
        assert!(SearchExpression::compile("").unwrap().is_match_all());
        assert!(SearchExpression::compile("  *  ").unwrap().is_match_all());
    }

    #[test]
    fn test_single_relation() {
        let expr = SearchExpression::compile("upnp:class = \"object.container\"").unwrap();
        assert_eq!(ops(&expr), vec!["= object.container"]);
    }

    #[test]
    fn test_postfix_order_for_connectives() {
        let expr = SearchExpression::compile(
            "dc:title contains \"a\" and upnp:class derivedfrom \"object.item\" or @id = \"0\"",
        )
        .unwrap();
        // Equal-precedence logical operators associate left
        assert_eq!(
            ops(&expr),
            vec![
                "contains a",
                "derivedfrom object.item",
                "and",
                "= 0",
                "or"
            ]
        );
    }

    #[test]
    fn test_parens_override_association() {
        let expr = SearchExpression::compile(
            "dc:title contains \"a\" and (upnp:class exists true or @id = \"0\")",
        )
        .unwrap();
        assert_eq!(
            ops(&expr),
            vec!["contains a", "exists true", "= 0", "or", "and"]
        );
    }

    #[test]
    fn test_unmatched_right_paren() {
        let err = SearchExpression::compile("dc:title exists true)").unwrap_err();
        assert!(err.to_string().contains("left parenthesis"));
    }

    #[test]
    fn test_unclosed_left_paren() {
        let err = SearchExpression::compile("(dc:title = \"x\"").unwrap_err();
        assert!(matches!(err, Error::MalformedSearchCriteria(_)));
    }

    #[test]
    fn test_property_without_relation() {
        // Lexes (and/or are operator-state tokens) but cannot fold
        let err = SearchExpression::compile("dc:title and dc:creator exists true").unwrap_err();
        assert!(matches!(err, Error::MalformedSearchCriteria(_)));
    }

    #[test]
    fn test_invalid_attribute_surfaces_at_compile() {
        let err = SearchExpression::compile("res@flavor = \"x\"").unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { .. }));
    }

    #[test]
    fn test_extractors_cached_per_property_text() {
        let expr = SearchExpression::compile(
            "dc:title contains \"a\" or dc:title contains \"b\"",
        )
        .unwrap();
        let instructions = expr.instructions().unwrap();
        let extractors: Vec<_> = instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Literal { extractor, .. } => Some(Arc::clone(extractor)),
                _ => None,
            })
            .collect();
        assert_eq!(extractors.len(), 2);
        assert!(Arc::ptr_eq(&extractors[0], &extractors[1]));
    }
}
