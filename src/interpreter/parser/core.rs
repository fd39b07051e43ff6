use log::trace;

use crate::{
    ast::{Expr, LiteralValue, Span},
    error::ParseError,
    interpreter::{
        parser::{
            binary::{
                parse_additive, parse_assignment, parse_comparison, parse_concatenation,
                parse_conjunction, parse_disjunction, parse_equality, parse_exponentiation,
                parse_index, parse_member_access, parse_multiplicative, parse_null_coalesce,
            },
            call::{parse_callback, parse_function_invocation},
            unary::{parse_flip_sign, parse_negation, parse_parenthesis},
        },
        tokenizer::{
            core::Tokenizer,
            token::{Token, TokenType},
        },
    },
};

/// Result type used by all parser functions.
pub type ParseResult<T> = Result<T, ParseError>;

/// One rung of the precedence ladder: parses its own form at the given
/// ladder index or delegates to the next-higher rung.
pub(crate) type ExpressionParser = fn(&mut Tokenizer, usize) -> ParseResult<Expr>;

/// The precedence ladder, ordered from lowest precedence (index 0) to
/// highest. Every rung either matches its own construct or hands over to
/// the rung after it; bracketed constructs re-enter the ladder at index 0.
pub(crate) static PRECEDENCE_LADDER: &[ExpressionParser] = &[
    parse_assignment,
    parse_null_coalesce,
    parse_concatenation,
    parse_disjunction,
    parse_conjunction,
    parse_equality,
    parse_comparison,
    parse_additive,
    parse_multiplicative,
    parse_exponentiation,
    parse_negation,
    parse_flip_sign,
    parse_index,
    parse_member_access,
    parse_function_invocation,
    parse_if_then_else,
    parse_callback,
    parse_parenthesis,
    parse_primary,
];

/// Parses all available tokens into an abstract syntax tree.
///
/// Each program line starts at the lowest-precedence rung and climbs up.
/// Empty input is rejected, so the resulting program always carries at
/// least one line.
///
/// # Parameters
/// - `tokenizer`: Token source for a single parse session.
///
/// # Returns
/// The root [`Expr::Program`] node, ready for evaluation.
///
/// # Errors
/// Any lexical error of the tokenizer, or an `UnexpectedToken` error when
/// the token stream does not form a valid program.
pub fn parse_program(tokenizer: &mut Tokenizer) -> ParseResult<Expr> {
    let mut lines = Vec::new();

    while tokenizer.peek_token()?.is_some() {
        lines.push(parse_lowest(tokenizer)?);
    }

    // Completely empty expression, should've at least parsed one line
    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
        return Err(unexpected_token(None, "an expression", tokenizer));
    };

    let span = Span::across(first.span(), last.span());
    Ok(Expr::Program { lines, span })
}

/// Invokes the lowest rung of the precedence ladder.
pub(crate) fn parse_lowest(tokenizer: &mut Tokenizer) -> ParseResult<Expr> {
    PRECEDENCE_LADDER[0](tokenizer, 0)
}

/// Invokes the rung following the one identified by `precedence_self`.
pub(crate) fn parse_next(tokenizer: &mut Tokenizer, precedence_self: usize) -> ParseResult<Expr> {
    PRECEDENCE_LADDER[precedence_self + 1](tokenizer, precedence_self + 1)
}

/// Builds an `UnexpectedToken` error from the offending token (or end of
/// input) and a description of what the grammar required.
pub(crate) fn unexpected_token(found: Option<&Token>,
                               expected: &str,
                               tokenizer: &Tokenizer)
                               -> ParseError {
    let (found_text, position) = match found {
        Some(token) => (format!("'{}'", token.lexeme), token.position()),
        None => ("end of input".to_string(), tokenizer.position()),
    };

    ParseError::UnexpectedToken { expected: expected.to_string(),
                                  found: found_text,
                                  position }
}

/// Peeks the upcoming token while a speculative save frame is open,
/// closing the frame before a lexical error can escape.
pub(crate) fn peek_token_balanced(tokenizer: &mut Tokenizer) -> ParseResult<Option<Token>> {
    match tokenizer.peek_token() {
        Ok(token) => Ok(token),
        Err(error) => {
            tokenizer.restore_state();
            Err(error)
        },
    }
}

/// Consumes the upcoming token while a speculative save frame is open,
/// closing the frame before a lexical error can escape.
pub(crate) fn consume_token_balanced(tokenizer: &mut Tokenizer) -> ParseResult<Option<Token>> {
    match tokenizer.consume_token() {
        Ok(token) => Ok(token),
        Err(error) => {
            tokenizer.restore_state();
            Err(error)
        },
    }
}

/// Parses an `if <condition> then <positive> else <negative>` expression.
///
/// All three operands re-enter the ladder at the lowest rung. Both keywords
/// are mandatory; the conditional has no single-branch form.
fn parse_if_then_else(tokenizer: &mut Tokenizer, precedence_self: usize) -> ParseResult<Expr> {
    let Some(token) = tokenizer.peek_token()? else {
        return parse_next(tokenizer, precedence_self);
    };

    if token.token_type != TokenType::KeyIf {
        return parse_next(tokenizer, precedence_self);
    }

    trace!("parsing an if-then-else expression");
    tokenizer.consume_token()?;

    let condition = parse_lowest(tokenizer)?;

    match tokenizer.consume_token()? {
        Some(t) if t.token_type == TokenType::KeyThen => {},
        other => return Err(unexpected_token(other.as_ref(), "'then'", tokenizer)),
    }

    let positive = parse_lowest(tokenizer)?;

    match tokenizer.consume_token()? {
        Some(t) if t.token_type == TokenType::KeyElse => {},
        other => return Err(unexpected_token(other.as_ref(), "'else'", tokenizer)),
    }

    let negative = parse_lowest(tokenizer)?;
    let span = Span::new(token.position(), negative.span().tail);

    Ok(Expr::IfThenElse { condition: Box::new(condition),
                          positive: Box::new(positive),
                          negative: Box::new(negative),
                          span })
}

/// Parses a primary (atomic) expression: a numeric, string or keyword
/// literal, or an identifier.
fn parse_primary(tokenizer: &mut Tokenizer, _precedence_self: usize) -> ParseResult<Expr> {
    let Some(token) = tokenizer.consume_token()? else {
        return Err(unexpected_token(None, "a value", tokenizer));
    };

    let span = token.span();

    match token.token_type {
        TokenType::Long => Ok(Expr::Long { value: parse_long_with_exponent(&token)?,
                                           span }),
        TokenType::Double => {
            let value = token.lexeme
                             .parse::<f64>()
                             .map_err(|_| ParseError::LiteralTooLarge { position:
                                                                            token.position() })?;
            Ok(Expr::Double { value, span })
        },
        TokenType::Str => Ok(Expr::Str { value: token.lexeme.clone(),
                                         span }),
        TokenType::Identifier => Ok(Expr::Identifier { name: token.lexeme.clone(),
                                                       span }),
        TokenType::True => Ok(Expr::Literal { value: LiteralValue::True,
                                              span }),
        TokenType::False => Ok(Expr::Literal { value: LiteralValue::False,
                                               span }),
        TokenType::Null => Ok(Expr::Literal { value: LiteralValue::Null,
                                              span }),
        _ => Err(unexpected_token(Some(&token), "a value", tokenizer)),
    }
}

/// Parses an integer token which supports exponent notation (`3e2 == 300`)
/// on a consistent 64-bit path.
///
/// # Errors
/// `LiteralTooLarge` if the mantissa, the exponent or the combined value
/// does not fit into an `i64`.
fn parse_long_with_exponent(token: &Token) -> ParseResult<i64> {
    let error = || ParseError::LiteralTooLarge { position: token.position() };

    match token.lexeme.split_once('e') {
        None => token.lexeme.parse::<i64>().map_err(|_| error()),
        Some((mantissa, exponent)) => {
            let mantissa = mantissa.parse::<i64>().map_err(|_| error())?;
            let exponent = exponent.parse::<u32>().map_err(|_| error())?;

            10i64.checked_pow(exponent)
                 .and_then(|power| mantissa.checked_mul(power))
                 .ok_or_else(error)
        },
    }
}
