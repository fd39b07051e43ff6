use log::trace;

use crate::{
    ast::{Expr, InvocationArgument, Position, Span},
    interpreter::{
        parser::core::{
            ParseResult, consume_token_balanced, parse_lowest, parse_next, peek_token_balanced,
            unexpected_token,
        },
        tokenizer::{core::Tokenizer, token::TokenType},
    },
};

/// Parses a function invocation: `callee(args)` or `callee?(args)`.
///
/// The common case is an identifier callee, which requires speculation:
/// the identifier is consumed tentatively and put back when no opening
/// parenthesis follows. Any other callee (such as a parenthesized callback)
/// is parsed by the higher rungs first; an argument list directly after it
/// invokes the resulting value. Chained invocations (`f(1)(2)`) fold to the
/// left.
pub(crate) fn parse_function_invocation(tokenizer: &mut Tokenizer,
                                        precedence_self: usize)
                                        -> ParseResult<Expr> {
    let Some(first) = tokenizer.peek_token()? else {
        return parse_next(tokenizer, precedence_self);
    };

    let mut callee = if first.token_type == TokenType::Identifier {
        // Store before consuming the identifier
        tokenizer.save_state();
        consume_token_balanced(tokenizer)?;

        match peek_token_balanced(tokenizer)? {
            Some(paren)
                if paren.token_type == TokenType::ParenthesisOpen
                   || paren.token_type == TokenType::OptionalParenthesisOpen =>
            {
                // Not going to need to restore anymore, this has to be an invocation
                tokenizer.discard_state();
                let span = first.span();
                Expr::Identifier { name: first.lexeme,
                                   span }
            },
            _ => {
                trace!("not a function invocation expression");
                tokenizer.restore_state();
                return parse_next(tokenizer, precedence_self);
            },
        }
    } else {
        parse_next(tokenizer, precedence_self)?
    };

    while let Some(paren) = tokenizer.peek_token()? {
        let optional = match paren.token_type {
            TokenType::ParenthesisOpen => false,
            TokenType::OptionalParenthesisOpen => true,
            _ => break,
        };

        tokenizer.consume_token()?;
        let (arguments, tail) = parse_argument_list(tokenizer)?;

        let span = Span::new(callee.span().head, tail);
        callee = Expr::FunctionInvocation { callee: Box::new(callee),
                                            arguments,
                                            optional,
                                            span };
    }

    Ok(callee)
}

/// Parses the comma-separated argument list of an invocation, after the
/// opening parenthesis has been consumed. Arguments may be named
/// (`name = value`), which requires one token of speculation to tell a
/// name from an ordinary identifier expression.
fn parse_argument_list(tokenizer: &mut Tokenizer)
                       -> ParseResult<(Vec<InvocationArgument>, Position)> {
    let mut arguments = Vec::new();

    // As long as there is no closing parenthesis, there are still arguments left
    while let Some(token) = tokenizer.peek_token()? {
        if token.token_type == TokenType::ParenthesisClose {
            break;
        }

        if !arguments.is_empty() {
            // Arguments other than the first one need to be separated out by a comma
            if token.token_type != TokenType::Comma {
                return Err(unexpected_token(Some(&token), "','", tokenizer));
            }
            tokenizer.consume_token()?;
        }

        let mut name = None;

        if let Some(candidate) = tokenizer.peek_token()?
           && candidate.token_type == TokenType::Identifier
        {
            // Save before consuming so the next token can be peeked too
            tokenizer.save_state();
            consume_token_balanced(tokenizer)?;

            match peek_token_balanced(tokenizer)? {
                Some(assign) if assign.token_type == TokenType::Assign => {
                    // Is a named argument
                    tokenizer.discard_state();
                    tokenizer.consume_token()?;
                    name = Some(candidate.lexeme);
                },
                _ => {
                    trace!("not a named argument");
                    tokenizer.restore_state();
                },
            }
        }

        let value = parse_lowest(tokenizer)?;
        arguments.push(InvocationArgument { value, name });
    }

    // Invocations have to be terminated with a closing parenthesis
    match tokenizer.consume_token()? {
        Some(t) if t.token_type == TokenType::ParenthesisClose => Ok((arguments, t.position())),
        other => Err(unexpected_token(other.as_ref(), "')'", tokenizer)),
    }
}

/// Parses a callback expression: `(a, b) -> body`.
///
/// Telling a callback from a parenthesized expression requires unbounded
/// lookahead: the parser saves once before the opening parenthesis and
/// rolls back as soon as anything other than a plain identifier list
/// followed by `->` shows up.
pub(crate) fn parse_callback(tokenizer: &mut Tokenizer, precedence_self: usize) -> ParseResult<Expr> {
    // Part of a member access chain, the parenthesis cannot open a callback here
    if let Some(previous) = tokenizer.previous_token()
       && previous.token_type == TokenType::Dot
    {
        return parse_next(tokenizer, precedence_self);
    }

    let Some(head) = tokenizer.peek_token()? else {
        return parse_next(tokenizer, precedence_self);
    };

    if head.token_type != TokenType::ParenthesisOpen {
        return parse_next(tokenizer, precedence_self);
    }

    // Save once before consuming anything
    tokenizer.save_state();
    consume_token_balanced(tokenizer)?;

    let mut signature = Vec::new();

    // As long as there is no closing parenthesis, there are still parameters left
    loop {
        let Some(token) = peek_token_balanced(tokenizer)? else {
            break;
        };

        if token.token_type == TokenType::ParenthesisClose {
            break;
        }

        if !signature.is_empty() {
            // Parameters other than the first one need to be separated out by a
            // comma; anything else is more likely a parenthesized expression
            if token.token_type != TokenType::Comma {
                trace!("not a callback expression");
                tokenizer.restore_state();
                return parse_next(tokenizer, precedence_self);
            }
            consume_token_balanced(tokenizer)?;
        }

        // Only identifiers may appear within a callback's signature
        match peek_token_balanced(tokenizer)? {
            Some(parameter) if parameter.token_type == TokenType::Identifier => {
                consume_token_balanced(tokenizer)?;
                signature.push(parameter.lexeme);
            },
            _ => {
                trace!("not a callback expression");
                tokenizer.restore_state();
                return parse_next(tokenizer, precedence_self);
            },
        }
    }

    // The signature has to be terminated by a closing parenthesis and the
    // arrow operator; anything else rolls back to the parenthesis rung
    match consume_token_balanced(tokenizer)? {
        Some(t) if t.token_type == TokenType::ParenthesisClose => {},
        _ => {
            trace!("not a callback expression");
            tokenizer.restore_state();
            return parse_next(tokenizer, precedence_self);
        },
    }

    match peek_token_balanced(tokenizer)? {
        Some(t) if t.token_type == TokenType::Arrow => {
            tokenizer.discard_state();
            tokenizer.consume_token()?;
        },
        _ => {
            trace!("not a callback expression");
            tokenizer.restore_state();
            return parse_next(tokenizer, precedence_self);
        },
    }

    let body = parse_lowest(tokenizer)?;
    let span = Span::new(head.position(), body.span().tail);

    Ok(Expr::Callback { signature,
                        body: Box::new(body),
                        span })
}
