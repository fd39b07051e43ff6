//! # exprima
//!
//! exprima is an embeddable, general-purpose expression evaluator written
//! in Rust. Small, side-effect-free expressions (e.g. inside configuration
//! files) are parsed once into an abstract syntax tree and then evaluated
//! repeatedly against a caller-supplied environment of variables and
//! functions, with support for optional chaining, named arguments,
//! callbacks and conditionals.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    ast::Expr,
    error::{EvaluatorError, ParseError},
    interpreter::{
        environment::EvaluationEnvironment,
        evaluator::core::Interpreter,
        parser::core::parse_program,
        tokenizer::{core::Tokenizer, token::Token},
        value::core::Value,
    },
};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` enum and related types that represent
/// the syntactic structure of source code as a tree. The AST is built by
/// the parser and traversed by the evaluator; every node carries the
/// source span it covers.
///
/// # Responsibilities
/// - Defines expression variants for all language constructs.
/// - Attaches source spans to AST nodes for error reporting.
/// - Renders trees back into parseable source text.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised while tokenizing,
/// parsing, or evaluating code, each carrying the source position it
/// refers to.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (tokenizer, parser,
///   evaluator).
/// - Attaches source positions and detailed messages for user feedback.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of expression evaluation.
///
/// This module ties together tokenizing, parsing, evaluation, value
/// representations, environments and the function contract to provide a
/// complete runtime for expression evaluation.
///
/// # Responsibilities
/// - Coordinates all core components: tokenizer, parser, evaluator and
///   value types.
/// - Provides the environments evaluations run against.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion.
///
/// This module provides reusable conversion routines used by the value
/// layer, guaranteeing that conversions between `i64`, `f64` and `usize`
/// never lose data silently.
pub mod util;

/// Tokenizes the given source text into a flat token list.
///
/// Comments and whitespace are skipped; the returned tokens are exactly
/// what the parser would consume.
///
/// # Errors
/// Returns a [`ParseError`] for unknown tokens or unterminated strings.
///
/// # Examples
/// ```
/// use exprima::interpreter::tokenizer::token::TokenType;
///
/// let tokens = exprima::tokenize("1 + 2 * 3").unwrap();
/// let types = tokens.iter().map(|t| t.token_type).collect::<Vec<_>>();
///
/// assert_eq!(types,
///            vec![TokenType::Long,
///                 TokenType::Plus,
///                 TokenType::Long,
///                 TokenType::Multiplication,
///                 TokenType::Long]);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();

    while let Some(token) = tokenizer.consume_token()? {
        tokens.push(token);
    }

    Ok(tokens)
}

/// Parses the given source text into an abstract syntax tree.
///
/// The resulting program is immutable and can be evaluated any number of
/// times, each evaluation against its own environment.
///
/// # Errors
/// Returns a [`ParseError`] if the source fails to tokenize or does not
/// form a valid program.
///
/// # Examples
/// ```
/// let program = exprima::parse("if 1 < 2 then \"y\" else \"n\"").unwrap();
/// assert_eq!(program.expressionify(), "if (1 < 2) then \"y\" else \"n\"");
/// ```
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let mut tokenizer = Tokenizer::new(source);
    parse_program(&mut tokenizer)
}

/// Parses and evaluates the given source text in one step.
///
/// Convenience entry point for hosts that do not retain the AST; parsing
/// dominates the cost, so hosts evaluating the same expression repeatedly
/// should [`parse`] once and keep an [`Interpreter`] around instead.
///
/// # Errors
/// Returns an [`EvaluatorError`] wrapping either the parse or the runtime
/// failure.
///
/// # Examples
/// ```
/// use exprima::interpreter::{environment::EvaluationEnvironment, value::core::Value};
///
/// let result = exprima::evaluate("1 + 2 * 3", &EvaluationEnvironment::new()).unwrap();
/// assert_eq!(result, Value::Long(7));
/// ```
pub fn evaluate(source: &str, environment: &EvaluationEnvironment) -> Result<Value, EvaluatorError> {
    let program = parse(source)?;
    let value = Interpreter::new().evaluate_expression(&program, environment)?;
    Ok(value)
}
