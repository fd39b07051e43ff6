use crate::{
    ast::{Expr, Span},
    interpreter::{
        parser::core::{ParseResult, parse_lowest, parse_next, unexpected_token},
        tokenizer::{
            core::Tokenizer,
            token::{Token, TokenType},
        },
    },
};

/// Parses an expression with the unary expression pattern.
///
/// If the upcoming token matches one of the declared operators it is
/// consumed, the operand is parsed (with reset precedence for bracketed
/// forms), the optional per-operator terminator is required, and the
/// operand is wrapped through `wrap`. Otherwise the next rung takes over.
///
/// # Parameters
/// - `tokenizer`: Token source.
/// - `precedence_self`: Ladder index of the calling rung.
/// - `reset_precedence`: Whether the operand re-enters the ladder at the
///   lowest rung.
/// - `operators`: Token types that represent this kind of expression.
/// - `terminators`: Optional closing token per operator (e.g. `)`).
/// - `wrap`: Wraps `(input, operator, span)` into the resulting node.
pub(crate) fn parse_unary_expression<F>(tokenizer: &mut Tokenizer,
                                        precedence_self: usize,
                                        reset_precedence: bool,
                                        operators: &[TokenType],
                                        terminators: Option<&[TokenType]>,
                                        wrap: F)
                                        -> ParseResult<Expr>
    where F: Fn(Expr, &Token, Span) -> Expr
{
    let Some(token) = tokenizer.peek_token()? else {
        return parse_next(tokenizer, precedence_self);
    };

    let Some(operator_index) = operators.iter().position(|t| *t == token.token_type) else {
        return parse_next(tokenizer, precedence_self);
    };

    // Consume the operator
    tokenizer.consume_token()?;

    let input = if reset_precedence {
        parse_lowest(tokenizer)?
    } else {
        parse_next(tokenizer, precedence_self)?
    };

    // Terminator requested, expect and eat it, fail otherwise
    if let Some(terminators) = terminators {
        let expected = terminators[operator_index];
        match tokenizer.consume_token()? {
            Some(t) if t.token_type == expected => {},
            other => return Err(unexpected_token(other.as_ref(), &expected.to_string(), tokenizer)),
        }
    }

    let span = Span::new(token.position(), input.span().tail);
    Ok(wrap(input, &token, span))
}

/// Parses logical negation: `!input`.
pub(crate) fn parse_negation(tokenizer: &mut Tokenizer, precedence_self: usize) -> ParseResult<Expr> {
    parse_unary_expression(tokenizer,
                           precedence_self,
                           false,
                           &[TokenType::BoolNot],
                           None,
                           |input, _, span| Expr::Invert { input: Box::new(input),
                                                           span })
}

/// Parses numeric sign flips: `-input`.
pub(crate) fn parse_flip_sign(tokenizer: &mut Tokenizer,
                              precedence_self: usize)
                              -> ParseResult<Expr> {
    parse_unary_expression(tokenizer,
                           precedence_self,
                           false,
                           &[TokenType::Minus],
                           None,
                           |input, _, span| Expr::FlipSign { input: Box::new(input),
                                                             span })
}

/// Parses a parenthesized expression: `( expression )`.
///
/// The inner expression re-enters the ladder at the lowest rung and is
/// returned as-is, without a wrapper node.
pub(crate) fn parse_parenthesis(tokenizer: &mut Tokenizer,
                                precedence_self: usize)
                                -> ParseResult<Expr> {
    parse_unary_expression(tokenizer,
                           precedence_self,
                           true,
                           &[TokenType::ParenthesisOpen],
                           Some(&[TokenType::ParenthesisClose]),
                           |input, _, _| input)
}
