/// Core evaluation logic.
///
/// Contains the `Interpreter`, the dispatch over every expression variant,
/// name resolution across the environments, and assignment handling.
pub mod core;

/// Member access and indexing.
///
/// Dispatches on the runtime shape of the accessed value, with the
/// optional variants turning misses into null instead of errors.
pub mod access;

/// Function invocation and callbacks.
///
/// Implements argument evaluation and binding (positional and named), the
/// validation and invocation protocol, and the callable values produced by
/// callback expressions.
pub mod function;
