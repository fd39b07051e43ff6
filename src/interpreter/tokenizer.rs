/// The tokenizer core: character cursor, save-state stack, and the lazily
/// advancing token stream.
///
/// Holds the mutable cursor state and implements the trial-order token read
/// loop on top of the readers declared in [`token`].
pub mod core;

/// Token definitions and readers.
///
/// Declares the token types, their categories, and one reader function per
/// type, arranged in the fixed trial order the tokenizer probes.
pub mod token;
