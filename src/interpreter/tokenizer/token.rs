use crate::{
    ast::{Position, Span},
    error::ParseError,
    interpreter::tokenizer::core::Tokenizer,
};

/// Coarse classification of token types.
///
/// The tokenizer uses the category to decide which token types may
/// legitimately follow a numeric literal (everything that is not a value)
/// and which tokens are invisible to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    /// Literals and identifiers.
    Value,
    /// Arithmetic, comparison, equality and boolean operators.
    Operator,
    /// Structural symbols such as parentheses, brackets, commas and dots.
    Symbol,
    /// Reserved words of the conditional construct.
    Keyword,
    /// Tokens skipped by the token stream, such as comments.
    Invisible,
}

/// All token types of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// `[A-Za-z][A-Za-z0-9_]*`
    Identifier,
    /// `-?[0-9]+(e[0-9]+)?`
    Long,
    /// `-?[0-9]*.[0-9]+`
    Double,
    /// `"..."` with `\"` escaping a quote
    Str,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `if`
    KeyIf,
    /// `then`
    KeyThen,
    /// `else`
    KeyElse,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiplication,
    /// `/`
    Division,
    /// `%`
    Modulo,
    /// `^`
    Exponent,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `==`
    ValueEquals,
    /// `!=`
    ValueNotEquals,
    /// `===`
    ValueEqualsExact,
    /// `!==`
    ValueNotEqualsExact,
    /// `&&`
    BoolAnd,
    /// `||`
    BoolOr,
    /// `!`
    BoolNot,
    /// `&`
    Concatenate,
    /// `??`
    NullCoalesce,
    /// `=`
    Assign,
    /// `->`
    Arrow,
    /// `(`
    ParenthesisOpen,
    /// `)`
    ParenthesisClose,
    /// `?(`
    OptionalParenthesisOpen,
    /// `[`
    BracketOpen,
    /// `]`
    BracketClose,
    /// `?[`
    OptionalBracketOpen,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `?.`
    OptionalDot,
    /// `#` to end of line
    Comment,
}

impl TokenType {
    /// Returns the category this token type belongs to.
    #[must_use]
    pub const fn category(self) -> TokenCategory {
        match self {
            Self::Identifier
            | Self::Long
            | Self::Double
            | Self::Str
            | Self::True
            | Self::False
            | Self::Null => TokenCategory::Value,

            Self::KeyIf | Self::KeyThen | Self::KeyElse => TokenCategory::Keyword,

            Self::Plus
            | Self::Minus
            | Self::Multiplication
            | Self::Division
            | Self::Modulo
            | Self::Exponent
            | Self::GreaterThan
            | Self::GreaterThanOrEqual
            | Self::LessThan
            | Self::LessThanOrEqual
            | Self::ValueEquals
            | Self::ValueNotEquals
            | Self::ValueEqualsExact
            | Self::ValueNotEqualsExact
            | Self::BoolAnd
            | Self::BoolOr
            | Self::BoolNot
            | Self::Concatenate
            | Self::NullCoalesce
            | Self::Assign
            | Self::Arrow => TokenCategory::Operator,

            Self::ParenthesisOpen
            | Self::ParenthesisClose
            | Self::OptionalParenthesisOpen
            | Self::BracketOpen
            | Self::BracketClose
            | Self::OptionalBracketOpen
            | Self::Comma
            | Self::Dot
            | Self::OptionalDot => TokenCategory::Symbol,

            Self::Comment => TokenCategory::Invisible,
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Identifier => "an identifier",
            Self::Long => "an integer literal",
            Self::Double => "a decimal literal",
            Self::Str => "a string literal",
            Self::True => "'true'",
            Self::False => "'false'",
            Self::Null => "'null'",
            Self::KeyIf => "'if'",
            Self::KeyThen => "'then'",
            Self::KeyElse => "'else'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Multiplication => "'*'",
            Self::Division => "'/'",
            Self::Modulo => "'%'",
            Self::Exponent => "'^'",
            Self::GreaterThan => "'>'",
            Self::GreaterThanOrEqual => "'>='",
            Self::LessThan => "'<'",
            Self::LessThanOrEqual => "'<='",
            Self::ValueEquals => "'=='",
            Self::ValueNotEquals => "'!='",
            Self::ValueEqualsExact => "'==='",
            Self::ValueNotEqualsExact => "'!=='",
            Self::BoolAnd => "'&&'",
            Self::BoolOr => "'||'",
            Self::BoolNot => "'!'",
            Self::Concatenate => "'&'",
            Self::NullCoalesce => "'??'",
            Self::Assign => "'='",
            Self::Arrow => "'->'",
            Self::ParenthesisOpen => "'('",
            Self::ParenthesisClose => "')'",
            Self::OptionalParenthesisOpen => "'?('",
            Self::BracketOpen => "'['",
            Self::BracketClose => "']'",
            Self::OptionalBracketOpen => "'?['",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::OptionalDot => "'?.'",
            Self::Comment => "a comment",
        };
        write!(f, "{text}")
    }
}

/// A single token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The matched token type.
    pub token_type: TokenType,
    /// Zero-based row of the token's first character.
    pub row:        usize,
    /// Zero-based column of the token's first character.
    pub col:        usize,
    /// The matched text. For strings, the content without quotes and with
    /// escapes resolved.
    pub lexeme:     String,
}

impl Token {
    /// Returns the position of the token's first character.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    /// Returns a span covering the token's start position.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::at(self.position())
    }
}

/// A token reader tries to match one token type at the current cursor.
///
/// Returns `Ok(Some(lexeme))` on a match, `Ok(None)` when the upcoming
/// characters are not of this type (the tokenizer restores the cursor), and
/// an error for irrecoverable situations such as unterminated strings.
pub type TokenReader = fn(&mut Tokenizer) -> Result<Option<String>, ParseError>;

/// The fixed trial order of token readers.
///
/// Values come first, keywords before identifiers and the decimal form
/// before the integer form. Multi-character operators are tried before the
/// operators they are prefixed by (`&&` before `&`, `===` before `==`
/// before `=`, and so on).
pub static TOKEN_TRIAL_ORDER: &[(TokenType, TokenReader)] = &[
    (TokenType::True, read_true),
    (TokenType::False, read_false),
    (TokenType::Null, read_null),
    (TokenType::KeyIf, read_key_if),
    (TokenType::KeyThen, read_key_then),
    (TokenType::KeyElse, read_key_else),
    (TokenType::Identifier, read_identifier),
    (TokenType::Double, read_double),
    (TokenType::Long, read_long),
    (TokenType::Str, read_string),
    (TokenType::Comment, read_comment),
    (TokenType::Arrow, read_arrow),
    (TokenType::ValueEqualsExact, read_value_equals_exact),
    (TokenType::ValueNotEqualsExact, read_value_not_equals_exact),
    (TokenType::ValueEquals, read_value_equals),
    (TokenType::ValueNotEquals, read_value_not_equals),
    (TokenType::GreaterThanOrEqual, read_greater_than_or_equal),
    (TokenType::LessThanOrEqual, read_less_than_or_equal),
    (TokenType::BoolAnd, read_bool_and),
    (TokenType::BoolOr, read_bool_or),
    (TokenType::NullCoalesce, read_null_coalesce),
    (TokenType::OptionalDot, read_optional_dot),
    (TokenType::OptionalBracketOpen, read_optional_bracket_open),
    (TokenType::OptionalParenthesisOpen, read_optional_parenthesis_open),
    (TokenType::Plus, read_plus),
    (TokenType::Minus, read_minus),
    (TokenType::Multiplication, read_multiplication),
    (TokenType::Division, read_division),
    (TokenType::Modulo, read_modulo),
    (TokenType::Exponent, read_exponent),
    (TokenType::GreaterThan, read_greater_than),
    (TokenType::LessThan, read_less_than),
    (TokenType::BoolNot, read_bool_not),
    (TokenType::Concatenate, read_concatenate),
    (TokenType::Assign, read_assign),
    (TokenType::ParenthesisOpen, read_parenthesis_open),
    (TokenType::ParenthesisClose, read_parenthesis_close),
    (TokenType::BracketOpen, read_bracket_open),
    (TokenType::BracketClose, read_bracket_close),
    (TokenType::Comma, read_comma),
    (TokenType::Dot, read_dot),
];

/// Outcome of a character collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectorOutcome {
    /// The collector stopped at a legitimate boundary.
    ReadOkay,
    /// The collector hit a character that cannot belong to the token.
    CharMismatch,
    /// The input ended before the collector could read anything.
    NoNextChar,
}

const fn is_identifier_char(c: char, is_first: bool) -> bool {
    c.is_ascii_alphabetic() || (!is_first && (c == '_' || c.is_ascii_digit()))
}

/// Consumes the exact character sequence or fails without further checks.
fn collect_sequence(tokenizer: &mut Tokenizer, text: &str) -> Option<String> {
    for expected in text.chars() {
        if tokenizer.next_char() != Some(expected) {
            return None;
        }
    }
    Some(text.to_string())
}

/// Consumes an exact word, requiring a non-identifier boundary after it so
/// that e.g. `iffy` stays an identifier.
fn collect_word(tokenizer: &mut Tokenizer, word: &str) -> Option<String> {
    collect_sequence(tokenizer, word)?;

    if let Some(next) = tokenizer.peek_next_char()
       && is_identifier_char(next, false)
    {
        return None;
    }

    Some(word.to_string())
}

/// Collects as many digits as possible into `result`.
///
/// The collector stops cleanly at whitespace, newlines, an optional decimal
/// point or exponent marker, and any character that would start a non-value
/// token. Any other character means the digits cannot form a token here.
fn collect_digits(tokenizer: &mut Tokenizer,
                  result: &mut String,
                  stop_before_dot: bool,
                  stop_before_exponent: bool)
                  -> Result<CollectorOutcome, ParseError> {
    if !tokenizer.has_next_char() {
        return Ok(CollectorOutcome::NoNextChar);
    }

    while let Some(c) = tokenizer.next_char() {
        if c.is_ascii_digit() {
            result.push(c);
            continue;
        }

        // Whitespace or a newline stops the number notation
        if Tokenizer::is_considered_whitespace(c) || c == '\n' {
            tokenizer.undo_next_char();
            break;
        }

        if c == '.' && stop_before_dot {
            tokenizer.undo_next_char();
            break;
        }

        if c == 'e' && stop_before_exponent {
            tokenizer.undo_next_char();
            break;
        }

        tokenizer.undo_next_char();

        if would_follow_non_value(tokenizer)? {
            break;
        }

        return Ok(CollectorOutcome::CharMismatch);
    }

    Ok(CollectorOutcome::ReadOkay)
}

/// Collects an optionally negative integer part into `result`.
fn collect_integer(tokenizer: &mut Tokenizer,
                   result: &mut String,
                   stop_before_dot: bool,
                   stop_before_exponent: bool)
                   -> Result<CollectorOutcome, ParseError> {
    let Some(first) = tokenizer.peek_next_char() else {
        return Ok(CollectorOutcome::NoNextChar);
    };

    // May start with any digit or a minus sign (negative number)
    if first.is_ascii_digit() || first == '-' {
        result.push(first);
        let _ = tokenizer.next_char();
    } else {
        return Ok(CollectorOutcome::CharMismatch);
    }

    let outcome = collect_digits(tokenizer, result, stop_before_dot, stop_before_exponent)?;

    if outcome == CollectorOutcome::CharMismatch {
        return Ok(CollectorOutcome::CharMismatch);
    }

    // A minus sign alone at the end of input is not a number
    if outcome == CollectorOutcome::NoNextChar && first == '-' {
        return Ok(CollectorOutcome::NoNextChar);
    }

    Ok(CollectorOutcome::ReadOkay)
}

/// Probes whether the upcoming characters would match any non-value token,
/// using a save/restore pair so the cursor is left untouched.
fn would_follow_non_value(tokenizer: &mut Tokenizer) -> Result<bool, ParseError> {
    for (token_type, reader) in TOKEN_TRIAL_ORDER {
        if token_type.category() == TokenCategory::Value {
            continue;
        }

        tokenizer.save_state();
        let result = reader(tokenizer);
        tokenizer.restore_state();

        if result?.is_some() {
            return Ok(true);
        }
    }

    Ok(false)
}

fn read_identifier(tokenizer: &mut Tokenizer) -> Result<Option<String>, ParseError> {
    let Some(first) = tokenizer.next_char() else {
        return Ok(None);
    };

    // Identifiers always start with letters
    if !is_identifier_char(first, true) {
        return Ok(None);
    }

    let mut result = String::from(first);

    // Collect until no more identifier chars remain
    while let Some(c) = tokenizer.peek_next_char() {
        if !is_identifier_char(c, false) {
            break;
        }
        result.push(c);
        let _ = tokenizer.next_char();
    }

    Ok(Some(result))
}

fn read_long(tokenizer: &mut Tokenizer) -> Result<Option<String>, ParseError> {
    let mut result = String::new();

    if collect_integer(tokenizer, &mut result, false, true)? != CollectorOutcome::ReadOkay {
        return Ok(None);
    }

    if !result.chars().any(|c| c.is_ascii_digit()) {
        return Ok(None);
    }

    // Optional integer exponent: 3e2 == 300
    if tokenizer.peek_next_char() == Some('e') {
        let _ = tokenizer.next_char();

        let mut exponent = String::new();
        if collect_digits(tokenizer, &mut exponent, false, false)? != CollectorOutcome::ReadOkay
           || !exponent.chars().any(|c| c.is_ascii_digit())
        {
            return Ok(None);
        }

        result.push('e');
        result.push_str(&exponent);
    }

    Ok(Some(result))
}

fn read_double(tokenizer: &mut Tokenizer) -> Result<Option<String>, ParseError> {
    let mut result = String::new();

    // Shorthand .5 notation, normalized to 0.5
    if tokenizer.peek_next_char() == Some('.') {
        result.push('0');
        result.push('.');
        let _ = tokenizer.next_char();
    } else {
        // A double starts out like an integer
        if collect_integer(tokenizer, &mut result, true, true)? != CollectorOutcome::ReadOkay {
            return Ok(None);
        }

        // Missing decimal point
        if tokenizer.next_char() != Some('.') {
            return Ok(None);
        }

        result.push('.');
    }

    let digits_before = result.len();

    if collect_digits(tokenizer, &mut result, false, false)? != CollectorOutcome::ReadOkay
       || result.len() == digits_before
    {
        return Ok(None);
    }

    Ok(Some(result))
}

fn read_string(tokenizer: &mut Tokenizer) -> Result<Option<String>, ParseError> {
    let start = tokenizer.position();

    // String start marker not found
    if tokenizer.next_char() != Some('"') {
        return Ok(None);
    }

    let mut result = String::new();
    let mut terminated = false;

    while let Some(c) = tokenizer.next_char() {
        if c == '"' {
            // Escaped double quote character: drop the backslash, keep the quote
            if tokenizer.previous_char() == Some('\\') {
                result.pop();
                result.push('"');
                continue;
            }

            terminated = true;
            break;
        }

        result.push(c);
    }

    // Strings need to be terminated
    if !terminated {
        return Err(ParseError::UnterminatedString { position: start });
    }

    Ok(Some(result))
}

fn read_comment(tokenizer: &mut Tokenizer) -> Result<Option<String>, ParseError> {
    if tokenizer.next_char() != Some('#') {
        return Ok(None);
    }

    let mut result = String::new();

    while let Some(c) = tokenizer.peek_next_char() {
        if c == '\n' {
            break;
        }
        result.push(c);
        let _ = tokenizer.next_char();
    }

    Ok(Some(result))
}

macro_rules! word_reader {
    ($name:ident, $word:literal) => {
        fn $name(tokenizer: &mut Tokenizer) -> Result<Option<String>, ParseError> {
            Ok(collect_word(tokenizer, $word))
        }
    };
}

macro_rules! symbol_reader {
    ($name:ident, $lexeme:literal) => {
        fn $name(tokenizer: &mut Tokenizer) -> Result<Option<String>, ParseError> {
            Ok(collect_sequence(tokenizer, $lexeme))
        }
    };
}

word_reader!(read_true, "true");
word_reader!(read_false, "false");
word_reader!(read_null, "null");
word_reader!(read_key_if, "if");
word_reader!(read_key_then, "then");
word_reader!(read_key_else, "else");

symbol_reader!(read_arrow, "->");
symbol_reader!(read_value_equals_exact, "===");
symbol_reader!(read_value_not_equals_exact, "!==");
symbol_reader!(read_value_equals, "==");
symbol_reader!(read_value_not_equals, "!=");
symbol_reader!(read_greater_than_or_equal, ">=");
symbol_reader!(read_less_than_or_equal, "<=");
symbol_reader!(read_bool_and, "&&");
symbol_reader!(read_bool_or, "||");
symbol_reader!(read_null_coalesce, "??");
symbol_reader!(read_optional_dot, "?.");
symbol_reader!(read_optional_bracket_open, "?[");
symbol_reader!(read_optional_parenthesis_open, "?(");
symbol_reader!(read_plus, "+");
symbol_reader!(read_minus, "-");
symbol_reader!(read_multiplication, "*");
symbol_reader!(read_division, "/");
symbol_reader!(read_modulo, "%");
symbol_reader!(read_exponent, "^");
symbol_reader!(read_greater_than, ">");
symbol_reader!(read_less_than, "<");
symbol_reader!(read_bool_not, "!");
symbol_reader!(read_concatenate, "&");
symbol_reader!(read_assign, "=");
symbol_reader!(read_parenthesis_open, "(");
symbol_reader!(read_parenthesis_close, ")");
symbol_reader!(read_bracket_open, "[");
symbol_reader!(read_bracket_close, "]");
symbol_reader!(read_comma, ",");
symbol_reader!(read_dot, ".");
