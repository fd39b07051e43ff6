use crate::ast::Position;

#[derive(Debug)]
/// Represents all errors that can occur while tokenizing or parsing source
/// text.
pub enum ParseError {
    /// No token reader matched the upcoming characters.
    UnknownToken {
        /// Position of the first unreadable character.
        position: Position,
    },
    /// A string literal was opened but never closed.
    UnterminatedString {
        /// Position of the opening quote.
        position: Position,
    },
    /// Found a token other than the one the grammar requires.
    UnexpectedToken {
        /// Human-readable description of what was expected.
        expected: String,
        /// The token (or end of input) that was actually found.
        found:    String,
        /// Position of the offending token.
        position: Position,
    },
    /// A numeric literal does not fit into the 64-bit value range.
    LiteralTooLarge {
        /// Position of the literal.
        position: Position,
    },
}

impl ParseError {
    /// Returns the source position the error refers to.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::UnknownToken { position }
            | Self::UnterminatedString { position }
            | Self::UnexpectedToken { position, .. }
            | Self::LiteralTooLarge { position } => *position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownToken { position } => {
                write!(f, "Error at {position}: Unknown token.")
            },

            Self::UnterminatedString { position } => {
                write!(f, "Error at {position}: Unterminated string literal.")
            },

            Self::UnexpectedToken { expected,
                                    found,
                                    position, } => {
                write!(f, "Error at {position}: Expected {expected} but found {found}.")
            },

            Self::LiteralTooLarge { position } => {
                write!(f, "Error at {position}: Numeric literal is too large.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
