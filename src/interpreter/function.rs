use std::{collections::HashMap, rc::Rc};

use crate::{
    error::RuntimeError,
    interpreter::{
        environment::EvaluationEnvironment,
        std_functions,
        value::{core::Value, interpreter::ValueInterpreter},
    },
};

/// One declared argument of an [`ExpressionFunction`].
///
/// The declared name is what named arguments bind against
/// (case-insensitively); required arguments must be non-null once binding
/// and evaluation are done.
#[derive(Debug, Clone)]
pub struct FunctionArgument {
    /// The argument name, as matched by named arguments.
    pub name:     String,
    /// Whether a null value for this argument rejects the invocation.
    pub required: bool,
}

impl FunctionArgument {
    /// Creates an argument description.
    #[must_use]
    pub fn new(name: &str, required: bool) -> Self {
        Self { name: name.to_string(),
               required }
    }
}

/// Describes why a function rejected its invocation, pointing at the
/// argument that caused it.
#[derive(Debug)]
pub struct FunctionFailure {
    /// Index of the offending argument.
    pub argument_index: usize,
    /// Description of the problem.
    pub message:        String,
}

impl FunctionFailure {
    /// Creates a failure description for the given argument index.
    #[must_use]
    pub fn new(argument_index: usize, message: impl Into<String>) -> Self {
        Self { argument_index,
               message: message.into() }
    }
}

/// Error channel of [`ExpressionFunction::apply`].
#[derive(Debug)]
pub enum FunctionError {
    /// The function rejected its invocation; the interpreter attaches the
    /// invocation context and surfaces an `InvalidFunctionInvocation`.
    Invalid(FunctionFailure),
    /// An evaluation error escaped a callback body; surfaced unchanged.
    Evaluation(Box<RuntimeError>),
}

impl From<FunctionFailure> for FunctionError {
    fn from(failure: FunctionFailure) -> Self {
        Self::Invalid(failure)
    }
}

impl From<RuntimeError> for FunctionError {
    fn from(error: RuntimeError) -> Self {
        Self::Evaluation(Box::new(error))
    }
}

/// Result type of a function invocation.
pub type FunctionResult = Result<Value, FunctionError>;

/// A callable value: a host-supplied function, a standard function, or a
/// callback defined within an expression.
pub trait ExpressionFunction {
    /// Invokes the function with already-bound arguments.
    ///
    /// # Errors
    /// A [`FunctionError`] when the invocation is rejected or a callback
    /// body fails to evaluate.
    fn apply(&self, environment: &EvaluationEnvironment, arguments: &[Value]) -> FunctionResult;

    /// The declared argument list, in binding order.
    ///
    /// `None` means the function is variadic and unchecked; named
    /// arguments are rejected for such functions since they cannot be
    /// matched against anything.
    fn arguments(&self) -> Option<&[FunctionArgument]> {
        None
    }

    /// Validates bound arguments before the invocation is performed.
    ///
    /// The default checks that every required argument received a non-null
    /// value.
    ///
    /// # Errors
    /// A [`FunctionFailure`] naming the first argument that violates the
    /// declaration.
    fn validate_arguments(&self,
                          arguments: &[Value],
                          _value_interpreter: &dyn ValueInterpreter)
                          -> Result<(), FunctionFailure> {
        if let Some(definitions) = self.arguments() {
            for (index, definition) in definitions.iter().enumerate() {
                if definition.required && arguments.get(index).is_none_or(Value::is_null) {
                    return Err(FunctionFailure::new(index,
                                                    format!("missing required argument '{}'",
                                                            definition.name)));
                }
            }
        }

        Ok(())
    }
}

/// Handler signature of a [`NativeFunction`].
pub type NativeHandler = Box<dyn Fn(&EvaluationEnvironment, &[Value]) -> FunctionResult>;

/// An [`ExpressionFunction`] backed by a host closure.
pub struct NativeFunction {
    arguments: Option<Vec<FunctionArgument>>,
    handler:   NativeHandler,
}

impl NativeFunction {
    /// Creates a variadic function without declared arguments.
    #[must_use]
    pub fn new(handler: NativeHandler) -> Self {
        Self { arguments: None,
               handler }
    }

    /// Creates a function with a declared argument list.
    #[must_use]
    pub fn with_arguments(arguments: Vec<FunctionArgument>, handler: NativeHandler) -> Self {
        Self { arguments: Some(arguments),
               handler }
    }
}

impl ExpressionFunction for NativeFunction {
    fn apply(&self, environment: &EvaluationEnvironment, arguments: &[Value]) -> FunctionResult {
        (self.handler)(environment, arguments)
    }

    fn arguments(&self) -> Option<&[FunctionArgument]> {
        self.arguments.as_deref()
    }
}

/// Lookup table of standard functions, consulted first during function
/// resolution. Symbols are normalized to lowercase.
#[derive(Default)]
pub struct FunctionRegistry {
    entries: HashMap<String, Rc<dyn ExpressionFunction>>,
}

impl FunctionRegistry {
    /// Creates a registry without any functions.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry carrying the standard function library.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::default();
        std_functions::install(&mut registry);
        registry
    }

    /// Registers a function under the given (case-insensitive) name,
    /// replacing any previous entry.
    pub fn register(&mut self, name: &str, function: Rc<dyn ExpressionFunction>) {
        self.entries.insert(name.to_lowercase(), function);
    }

    /// Looks up a function by its lowercased symbol.
    #[must_use]
    pub fn lookup(&self, symbol: &str) -> Option<Rc<dyn ExpressionFunction>> {
        self.entries.get(&symbol.to_lowercase()).cloned()
    }
}
