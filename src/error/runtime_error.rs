use crate::ast::Span;

#[derive(Debug)]
/// Represents all errors that can occur while evaluating a parsed expression.
pub enum RuntimeError {
    /// Referenced a variable that no environment knows about.
    UndefinedVariable {
        /// The symbol that failed to resolve.
        name: String,
        /// Source span of the identifier.
        span: Span,
    },
    /// Called a function that no environment knows about.
    UndefinedFunction {
        /// The symbol that failed to resolve.
        name: String,
        /// Source span of the invocation.
        span: Span,
    },
    /// A named argument does not match any declared argument of the callee.
    UndefinedFunctionArgumentName {
        /// The function being invoked.
        function: String,
        /// The argument name that failed to match.
        name:     String,
        /// Source span of the argument.
        span:     Span,
    },
    /// A positional argument appeared after a named argument.
    NonNamedFunctionArgument {
        /// The function being invoked.
        function: String,
        /// Source span of the offending argument.
        span:     Span,
    },
    /// Tried to assign to a name that already exists in some environment.
    IdentifierInUse {
        /// The name that is already taken.
        name: String,
        /// Source span of the assignment target.
        span: Span,
    },
    /// Accessed a member that the value does not carry.
    UnknownMember {
        /// The field name that failed to resolve.
        name: String,
        /// Source span of the access.
        span: Span,
    },
    /// Indexed an ordered sequence outside of its bounds.
    InvalidIndex {
        /// The index that was requested.
        index:  i64,
        /// The length of the indexed sequence.
        length: usize,
        /// Source span of the index expression.
        span:   Span,
    },
    /// Indexed a mapping with a key it does not contain.
    InvalidMapKey {
        /// The key that was requested.
        key:  String,
        /// Source span of the index expression.
        span: Span,
    },
    /// Indexed a value that is neither a sequence nor a mapping.
    NonIndexableValue {
        /// Source span of the index expression.
        span: Span,
    },
    /// Invoked a value that is not callable.
    NonCallableValue {
        /// Rendered form of the callee expression.
        callee: String,
        /// Source span of the invocation.
        span:   Span,
    },
    /// A function rejected its invocation while executing.
    InvalidFunctionInvocation {
        /// The function being invoked.
        function:       String,
        /// Index of the argument the function complained about.
        argument_index: usize,
        /// Rendered form of the offending argument value.
        value:          String,
        /// The function's own description of the problem.
        message:        String,
        /// Source span of the invocation.
        span:           Span,
    },
    /// An argument failed the callee's pre-invocation validation.
    InvalidFunctionArgumentType {
        /// The function being invoked.
        function:       String,
        /// Index of the rejected argument.
        argument_index: usize,
        /// Description of the expectation that was violated.
        message:        String,
        /// Source span of the invocation.
        span:           Span,
    },
}

impl RuntimeError {
    /// Returns the source span the error refers to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. }
            | Self::UndefinedFunction { span, .. }
            | Self::UndefinedFunctionArgumentName { span, .. }
            | Self::NonNamedFunctionArgument { span, .. }
            | Self::IdentifierInUse { span, .. }
            | Self::UnknownMember { span, .. }
            | Self::InvalidIndex { span, .. }
            | Self::InvalidMapKey { span, .. }
            | Self::NonIndexableValue { span }
            | Self::NonCallableValue { span, .. }
            | Self::InvalidFunctionInvocation { span, .. }
            | Self::InvalidFunctionArgumentType { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let position = self.span().head;

        match self {
            Self::UndefinedVariable { name, .. } => {
                write!(f, "Error at {position}: Undefined variable '{name}'.")
            },
            Self::UndefinedFunction { name, .. } => {
                write!(f, "Error at {position}: Undefined function '{name}'.")
            },
            Self::UndefinedFunctionArgumentName { function, name, .. } => write!(f,
                   "Error at {position}: Function '{function}' has no argument named '{name}'."),

            Self::NonNamedFunctionArgument { function, .. } => write!(f,
                   "Error at {position}: Positional argument of '{function}' may not follow a named argument."),

            Self::IdentifierInUse { name, .. } => {
                write!(f, "Error at {position}: Identifier '{name}' is already in use.")
            },
            Self::UnknownMember { name, .. } => {
                write!(f, "Error at {position}: Unknown member '{name}'.")
            },
            Self::InvalidIndex { index, length, .. } => write!(f,
                   "Error at {position}: Index {index} is out of bounds for a sequence of length {length}."),

            Self::InvalidMapKey { key, .. } => {
                write!(f, "Error at {position}: Mapping contains no key '{key}'.")
            },
            Self::NonIndexableValue { .. } => {
                write!(f, "Error at {position}: Value cannot be indexed.")
            },
            Self::NonCallableValue { callee, .. } => {
                write!(f, "Error at {position}: '{callee}' is not callable.")
            },
            Self::InvalidFunctionInvocation { function,
                                              argument_index,
                                              value,
                                              message,
                                              .. } => write!(f,
                   "Error at {position}: Invalid invocation of '{function}' (argument {argument_index}, value {value}): {message}."),

            Self::InvalidFunctionArgumentType { function,
                                                argument_index,
                                                message,
                                                .. } => write!(f,
                   "Error at {position}: Invalid argument {argument_index} of '{function}': {message}."),
        }
    }
}

impl std::error::Error for RuntimeError {}
