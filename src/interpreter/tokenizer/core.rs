use log::trace;

use crate::{
    ast::Position,
    error::ParseError,
    interpreter::tokenizer::token::{TOKEN_TRIAL_ORDER, Token, TokenCategory},
};

/// The complete cursor state of a [`Tokenizer`].
///
/// A plain value that is cheap to copy; the save-state stack stores full
/// copies so that speculative reads can be rolled back exactly, including
/// the lazily read token stream.
#[derive(Debug, Clone, Default)]
pub struct TokenizerState {
    /// Index of the next character to read.
    pub char_index:     usize,
    /// Zero-based row of the cursor.
    pub row:            usize,
    /// Zero-based column of the cursor.
    pub col:            usize,
    /// Column counts of previous lines, so that undoing a newline restores
    /// the column exactly.
    pub col_stack:      Vec<usize>,
    /// The lazily read upcoming token, if any.
    pub current_token:  Option<Token>,
    /// The most recently consumed token, if any.
    pub previous_token: Option<Token>,
}

/// Turns raw source text into a stream of tokens, with support for
/// speculative reads.
///
/// The tokenizer exposes a character cursor to the token readers and a
/// lazily advancing token stream to the parser. Both share the save-state
/// stack: `save_state` pushes a full copy of the cursor state, and every
/// push must be balanced by exactly one `restore_state` (roll back) or
/// `discard_state` (commit) on all paths.
///
/// A tokenizer instance belongs to a single parse session and must not be
/// shared across threads.
pub struct Tokenizer {
    text:        Vec<char>,
    state:       TokenizerState,
    save_states: Vec<TokenizerState>,
}

impl Tokenizer {
    /// Creates a tokenizer over the given source text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self { text:        text.chars().collect(),
               state:       TokenizerState::default(),
               save_states: Vec::new(), }
    }

    /// Returns whether the character cursor has input left.
    #[must_use]
    pub fn has_next_char(&self) -> bool {
        self.state.char_index < self.text.len()
    }

    /// Returns whether `c` counts as whitespace between tokens. Newlines are
    /// consumed between tokens but are significant inside readers.
    #[must_use]
    pub const fn is_considered_whitespace(c: char) -> bool {
        c == ' ' || c == '\t'
    }

    /// Returns the current cursor position.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.state.row, self.state.col)
    }

    /// Consumes and returns the next character, updating row and column.
    pub fn next_char(&mut self) -> Option<char> {
        let next = *self.text.get(self.state.char_index)?;
        self.state.char_index += 1;

        if next == '\n' {
            self.state.row += 1;
            self.state.col_stack.push(self.state.col);
            self.state.col = 0;
        } else {
            self.state.col += 1;
        }

        Some(next)
    }

    /// Returns the next character without consuming it.
    #[must_use]
    pub fn peek_next_char(&self) -> Option<char> {
        self.text.get(self.state.char_index).copied()
    }

    /// Returns the character before the most recently consumed one.
    #[must_use]
    pub fn previous_char(&self) -> Option<char> {
        if self.state.char_index < 2 {
            return None;
        }
        self.text.get(self.state.char_index - 2).copied()
    }

    /// Steps the cursor back by one character, restoring row and column
    /// exactly, including backward over a newline.
    pub fn undo_next_char(&mut self) {
        if self.state.char_index == 0 {
            return;
        }

        let last = self.text[self.state.char_index - 1];

        if last == '\n' {
            self.state.row -= 1;
            self.state.col = self.state.col_stack.pop().unwrap_or(0);
        } else {
            self.state.col -= 1;
        }

        self.state.char_index -= 1;
    }

    /// Pushes a full copy of the current state onto the save stack.
    pub fn save_state(&mut self) {
        self.save_states.push(self.state.clone());
        trace!("saved tokenizer state {} (char_index={})",
               self.save_states.len(),
               self.state.char_index);
    }

    /// Pops the most recent save and rolls the cursor back to it.
    pub fn restore_state(&mut self) {
        let depth = self.save_states.len();
        if let Some(state) = self.save_states.pop() {
            self.state = state;
        }
        trace!("restored tokenizer state {} (char_index={})",
               depth,
               self.state.char_index);
    }

    /// Pops the most recent save without rolling back, committing the
    /// speculative read. Returns the popped state so the caller can use it
    /// as the token's start position.
    pub fn discard_state(&mut self) -> TokenizerState {
        let depth = self.save_states.len();
        let state = self.save_states.pop().unwrap_or_default();
        trace!("discarded tokenizer state {} (char_index={})", depth, state.char_index);
        state
    }

    /// Returns the number of open save frames. Zero once a parse completed.
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.save_states.len()
    }

    /// Returns the upcoming token without consuming it, reading it lazily.
    ///
    /// # Errors
    /// Returns a `ParseError` if the upcoming characters form no valid
    /// token.
    pub fn peek_token(&mut self) -> Result<Option<Token>, ParseError> {
        if self.state.current_token.is_none() {
            self.read_next_token()?;
        }

        Ok(self.state.current_token.clone())
    }

    /// Consumes and returns the upcoming token, advancing to the next one.
    ///
    /// # Errors
    /// Returns a `ParseError` if the upcoming characters form no valid
    /// token.
    pub fn consume_token(&mut self) -> Result<Option<Token>, ParseError> {
        if self.state.current_token.is_none() {
            self.read_next_token()?;
        }

        let result = self.state.current_token.take();
        self.read_next_token()?;

        if result.is_some() {
            trace!("consumed token {result:?}");
            self.state.previous_token.clone_from(&result);
        }

        Ok(result)
    }

    /// Returns the most recently consumed token, if any.
    #[must_use]
    pub const fn previous_token(&self) -> Option<&Token> {
        self.state.previous_token.as_ref()
    }

    fn eat_whitespace(&mut self) {
        while let Some(c) = self.peek_next_char() {
            if !Self::is_considered_whitespace(c) && c != '\n' {
                break;
            }
            let _ = self.next_char();
        }
    }

    /// Reads the next token into the local state, or `None` at end of input.
    ///
    /// Iterates the token types in trial order: each reader runs under a
    /// save frame which is discarded on success and restored on failure.
    /// Invisible tokens (comments) are skipped.
    fn read_next_token(&mut self) -> Result<(), ParseError> {
        loop {
            self.eat_whitespace();

            if !self.has_next_char() {
                self.state.current_token = None;
                return Ok(());
            }

            let mut matched = false;

            for (token_type, reader) in TOKEN_TRIAL_ORDER {
                self.save_state();

                let lexeme = match reader(self) {
                    Ok(lexeme) => lexeme,
                    Err(error) => {
                        self.discard_state();
                        return Err(error);
                    },
                };

                match lexeme {
                    Some(lexeme) => {
                        // Commit, but keep the saved row/col as the token position
                        let previous_state = self.discard_state();
                        self.state.current_token = Some(Token { token_type: *token_type,
                                                                row: previous_state.row,
                                                                col: previous_state.col,
                                                                lexeme });
                        matched = true;
                        break;
                    },
                    None => self.restore_state(),
                }
            }

            // No token reader matched
            if !matched {
                return Err(ParseError::UnknownToken { position: self.position() });
            }

            if let Some(token) = &self.state.current_token
               && token.token_type.category() == TokenCategory::Invisible
            {
                continue;
            }

            return Ok(());
        }
    }
}
