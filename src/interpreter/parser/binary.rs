use log::trace;

use crate::{
    ast::{ComparisonOperation, EqualityOperation, Expr, MathOperation, Span},
    interpreter::{
        parser::core::{
            ParseResult, consume_token_balanced, parse_lowest, parse_next, peek_token_balanced,
            unexpected_token,
        },
        tokenizer::{
            core::Tokenizer,
            token::{Token, TokenType},
        },
    },
};

/// Precedence mode used for the right-hand side of a binary expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrecedenceMode {
    /// Continue with the next-higher rung (left-associative chaining).
    Higher,
    /// Re-enter the ladder at the lowest rung (bracketed constructs).
    Reset,
}

/// Parses an expression with the binary expression pattern.
///
/// The left-hand side is parsed by the next-higher rung. Then, while the
/// upcoming token matches one of the declared operators, the operator is
/// consumed, a right-hand side is parsed with the requested precedence
/// mode, the optional per-operator terminator is required, and both sides
/// are folded through `wrap`. The fold chains to the left.
///
/// # Parameters
/// - `tokenizer`: Token source.
/// - `precedence_self`: Ladder index of the calling rung.
/// - `rhs_precedence`: Precedence mode for right-hand sides.
/// - `operators`: Token types that represent this kind of expression.
/// - `terminators`: Optional closing token per operator (e.g. `]`).
/// - `wrap`: Folds `(lhs, rhs, operator)` into the resulting node.
///
/// # Returns
/// The folded expression, or the next rung's result if no operator matched.
pub(crate) fn parse_binary_expression<F>(tokenizer: &mut Tokenizer,
                                         precedence_self: usize,
                                         rhs_precedence: PrecedenceMode,
                                         operators: &[TokenType],
                                         terminators: Option<&[TokenType]>,
                                         wrap: F)
                                         -> ParseResult<Expr>
    where F: Fn(Expr, Expr, &Token) -> Expr
{
    let mut lhs = parse_next(tokenizer, precedence_self)?;

    while let Some(token) = tokenizer.peek_token()? {
        let Some(operator_index) = operators.iter().position(|t| *t == token.token_type) else {
            break;
        };

        tokenizer.consume_token()?;

        let rhs = match rhs_precedence {
            PrecedenceMode::Higher => parse_next(tokenizer, precedence_self)?,
            PrecedenceMode::Reset => parse_lowest(tokenizer)?,
        };

        // Terminator requested, expect and eat it, fail otherwise
        if let Some(terminators) = terminators {
            let expected = terminators[operator_index];
            match tokenizer.consume_token()? {
                Some(t) if t.token_type == expected => {},
                other => {
                    return Err(unexpected_token(other.as_ref(),
                                                &expected.to_string(),
                                                tokenizer));
                },
            }
        }

        lhs = wrap(lhs, rhs, &token);
    }

    Ok(lhs)
}

fn binary_span(lhs: &Expr, rhs: &Expr) -> Span {
    Span::across(lhs.span(), rhs.span())
}

/// Parses an assignment expression: `identifier = expression`.
///
/// The target must be a bare identifier, so the parser speculatively
/// consumes one and rolls back when no assign operator follows. The value
/// re-enters the whole ladder, which is why chains like `a = b = c` do not
/// parse without parentheses.
pub(crate) fn parse_assignment(tokenizer: &mut Tokenizer,
                               precedence_self: usize)
                               -> ParseResult<Expr> {
    let Some(identifier) = tokenizer.peek_token()? else {
        return parse_next(tokenizer, precedence_self);
    };

    if identifier.token_type != TokenType::Identifier {
        return parse_next(tokenizer, precedence_self);
    }

    // Save before consuming the identifier
    tokenizer.save_state();
    consume_token_balanced(tokenizer)?;

    match peek_token_balanced(tokenizer)? {
        Some(token) if token.token_type == TokenType::Assign => {
            // Definitely an assignment expression
            tokenizer.discard_state();
            tokenizer.consume_token()?;

            let value = parse_lowest(tokenizer)?;
            let span = Span::new(identifier.position(), value.span().tail);

            Ok(Expr::Assignment { name: identifier.lexeme,
                                  value: Box::new(value),
                                  span })
        },
        _ => {
            trace!("not an assignment expression");
            tokenizer.restore_state();
            parse_next(tokenizer, precedence_self)
        },
    }
}

/// Parses null-coalescing expressions: `nullCoalesce := concat ('??' concat)*`
pub(crate) fn parse_null_coalesce(tokenizer: &mut Tokenizer,
                                  precedence_self: usize)
                                  -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[TokenType::NullCoalesce],
                            None,
                            |lhs, rhs, _| {
                                let span = binary_span(&lhs, &rhs);
                                Expr::NullCoalesce { lhs: Box::new(lhs),
                                                     rhs: Box::new(rhs),
                                                     span }
                            })
}

/// Parses concatenation expressions: `concat := disjunction ('&' disjunction)*`
pub(crate) fn parse_concatenation(tokenizer: &mut Tokenizer,
                                  precedence_self: usize)
                                  -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[TokenType::Concatenate],
                            None,
                            |lhs, rhs, _| {
                                let span = binary_span(&lhs, &rhs);
                                Expr::Concatenation { lhs: Box::new(lhs),
                                                      rhs: Box::new(rhs),
                                                      span }
                            })
}

/// Parses disjunction expressions: `disjunction := conjunction ('||' conjunction)*`
pub(crate) fn parse_disjunction(tokenizer: &mut Tokenizer,
                                precedence_self: usize)
                                -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[TokenType::BoolOr],
                            None,
                            |lhs, rhs, _| {
                                let span = binary_span(&lhs, &rhs);
                                Expr::Disjunction { lhs: Box::new(lhs),
                                                    rhs: Box::new(rhs),
                                                    span }
                            })
}

/// Parses conjunction expressions: `conjunction := equality ('&&' equality)*`
pub(crate) fn parse_conjunction(tokenizer: &mut Tokenizer,
                                precedence_self: usize)
                                -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[TokenType::BoolAnd],
                            None,
                            |lhs, rhs, _| {
                                let span = binary_span(&lhs, &rhs);
                                Expr::Conjunction { lhs: Box::new(lhs),
                                                    rhs: Box::new(rhs),
                                                    span }
                            })
}

/// Parses equality expressions for `==`, `!=`, `===` and `!==`.
pub(crate) fn parse_equality(tokenizer: &mut Tokenizer,
                             precedence_self: usize)
                             -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[
        TokenType::ValueEquals,
        TokenType::ValueNotEquals,
        TokenType::ValueEqualsExact,
        TokenType::ValueNotEqualsExact,
    ],
                            None,
                            |lhs, rhs, operator| {
                                let operation = match operator.token_type {
                                    TokenType::ValueNotEquals => EqualityOperation::NotEqual,
                                    TokenType::ValueEqualsExact => EqualityOperation::EqualExact,
                                    TokenType::ValueNotEqualsExact => {
                                        EqualityOperation::NotEqualExact
                                    },
                                    _ => EqualityOperation::Equal,
                                };
                                let span = binary_span(&lhs, &rhs);
                                Expr::Equality { lhs: Box::new(lhs),
                                                 rhs: Box::new(rhs),
                                                 operation,
                                                 span }
                            })
}

/// Parses comparison expressions for `<`, `<=`, `>` and `>=`.
pub(crate) fn parse_comparison(tokenizer: &mut Tokenizer,
                               precedence_self: usize)
                               -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[
        TokenType::LessThan,
        TokenType::LessThanOrEqual,
        TokenType::GreaterThan,
        TokenType::GreaterThanOrEqual,
    ],
                            None,
                            |lhs, rhs, operator| {
                                let operation = match operator.token_type {
                                    TokenType::LessThan => ComparisonOperation::LessThan,
                                    TokenType::LessThanOrEqual => {
                                        ComparisonOperation::LessThanOrEqual
                                    },
                                    TokenType::GreaterThan => ComparisonOperation::GreaterThan,
                                    _ => ComparisonOperation::GreaterThanOrEqual,
                                };
                                let span = binary_span(&lhs, &rhs);
                                Expr::Comparison { lhs: Box::new(lhs),
                                                   rhs: Box::new(rhs),
                                                   operation,
                                                   span }
                            })
}

/// Parses addition and subtraction: `additive := multiplicative (('+' | '-') multiplicative)*`
pub(crate) fn parse_additive(tokenizer: &mut Tokenizer,
                             precedence_self: usize)
                             -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[TokenType::Plus, TokenType::Minus],
                            None,
                            |lhs, rhs, operator| {
                                let operation = if operator.token_type == TokenType::Minus {
                                    MathOperation::Sub
                                } else {
                                    MathOperation::Add
                                };
                                let span = binary_span(&lhs, &rhs);
                                Expr::Math { lhs: Box::new(lhs),
                                             rhs: Box::new(rhs),
                                             operation,
                                             span }
                            })
}

/// Parses multiplication-level expressions for `*`, `/` and `%`.
pub(crate) fn parse_multiplicative(tokenizer: &mut Tokenizer,
                                   precedence_self: usize)
                                   -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[TokenType::Multiplication, TokenType::Division, TokenType::Modulo],
                            None,
                            |lhs, rhs, operator| {
                                let operation = match operator.token_type {
                                    TokenType::Division => MathOperation::Div,
                                    TokenType::Modulo => MathOperation::Mod,
                                    _ => MathOperation::Mul,
                                };
                                let span = binary_span(&lhs, &rhs);
                                Expr::Math { lhs: Box::new(lhs),
                                             rhs: Box::new(rhs),
                                             operation,
                                             span }
                            })
}

/// Parses exponentiation: `exponent := unary ('^' unary)*`
///
/// Chains left-associatively, like every other binary rung: `2 ^ 3 ^ 2`
/// is `(2 ^ 3) ^ 2`.
pub(crate) fn parse_exponentiation(tokenizer: &mut Tokenizer,
                                   precedence_self: usize)
                                   -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[TokenType::Exponent],
                            None,
                            |lhs, rhs, _| {
                                let span = binary_span(&lhs, &rhs);
                                Expr::Math { lhs: Box::new(lhs),
                                             rhs: Box::new(rhs),
                                             operation: MathOperation::Pow,
                                             span }
                            })
}

/// Parses indexing: `lhs[rhs]` and `lhs?[rhs]`.
///
/// The index expression re-enters the whole ladder and is terminated by a
/// closing bracket.
pub(crate) fn parse_index(tokenizer: &mut Tokenizer, precedence_self: usize) -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Reset,
                            &[TokenType::BracketOpen, TokenType::OptionalBracketOpen],
                            Some(&[TokenType::BracketClose, TokenType::BracketClose]),
                            |lhs, rhs, operator| {
                                let optional =
                                    operator.token_type == TokenType::OptionalBracketOpen;
                                let span = binary_span(&lhs, &rhs);
                                Expr::Index { lhs: Box::new(lhs),
                                              rhs: Box::new(rhs),
                                              optional,
                                              span }
                            })
}

/// Parses member access: `lhs.rhs` and `lhs?.rhs`.
pub(crate) fn parse_member_access(tokenizer: &mut Tokenizer,
                                  precedence_self: usize)
                                  -> ParseResult<Expr> {
    parse_binary_expression(tokenizer,
                            precedence_self,
                            PrecedenceMode::Higher,
                            &[TokenType::Dot, TokenType::OptionalDot],
                            None,
                            |lhs, rhs, operator| {
                                let optional = operator.token_type == TokenType::OptionalDot;
                                let span = binary_span(&lhs, &rhs);
                                Expr::MemberAccess { lhs: Box::new(lhs),
                                                     rhs: Box::new(rhs),
                                                     optional,
                                                     span }
                            })
}
