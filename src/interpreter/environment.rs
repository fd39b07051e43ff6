use std::{collections::HashMap, rc::Rc};

use crate::interpreter::{
    function::ExpressionFunction,
    value::{
        core::Value,
        interpreter::{StandardValueInterpreter, ValueInterpreter},
    },
};

/// A producer backing a live variable; invoked on every lookup.
pub type LiveVariable = Rc<dyn Fn() -> Value>;

/// The caller-supplied evaluation environment.
///
/// Bundles the static variables, live (producer-backed) variables,
/// functions and the value interpreter an evaluation runs against. Symbols
/// are normalized to lowercase on insertion, making resolution
/// case-insensitive.
///
/// The environment is assembled through consuming builder methods:
///
/// ```
/// use exprima::interpreter::{environment::EvaluationEnvironment, value::core::Value};
///
/// let environment = EvaluationEnvironment::new()
///     .with_static_variable("greeting", Value::from("hello"));
///
/// assert_eq!(exprima::evaluate("Greeting & \"!\"", &environment).unwrap(),
///            Value::from("hello!"));
/// ```
#[derive(Clone)]
pub struct EvaluationEnvironment {
    static_variables:  HashMap<String, Value>,
    live_variables:    HashMap<String, LiveVariable>,
    functions:         HashMap<String, Rc<dyn ExpressionFunction>>,
    value_interpreter: Rc<dyn ValueInterpreter>,
}

impl Default for EvaluationEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationEnvironment {
    /// Creates an empty environment using the standard value interpreter.
    #[must_use]
    pub fn new() -> Self {
        Self { static_variables:  HashMap::new(),
               live_variables:    HashMap::new(),
               functions:         HashMap::new(),
               value_interpreter: Rc::new(StandardValueInterpreter), }
    }

    /// Adds a static variable.
    #[must_use]
    pub fn with_static_variable(mut self, name: &str, value: Value) -> Self {
        self.static_variables.insert(name.to_lowercase(), value);
        self
    }

    /// Adds a live variable whose producer runs on every lookup.
    #[must_use]
    pub fn with_live_variable(mut self, name: &str, producer: LiveVariable) -> Self {
        self.live_variables.insert(name.to_lowercase(), producer);
        self
    }

    /// Adds a function.
    #[must_use]
    pub fn with_function(mut self, name: &str, function: Rc<dyn ExpressionFunction>) -> Self {
        self.functions.insert(name.to_lowercase(), function);
        self
    }

    /// Replaces the value interpreter.
    #[must_use]
    pub fn with_value_interpreter(mut self, value_interpreter: Rc<dyn ValueInterpreter>) -> Self {
        self.value_interpreter = value_interpreter;
        self
    }

    /// The static variable mapping, keyed by lowercased symbol.
    #[must_use]
    pub const fn static_variables(&self) -> &HashMap<String, Value> {
        &self.static_variables
    }

    /// The live variable mapping, keyed by lowercased symbol.
    #[must_use]
    pub const fn live_variables(&self) -> &HashMap<String, LiveVariable> {
        &self.live_variables
    }

    /// The function mapping, keyed by lowercased symbol.
    #[must_use]
    pub const fn functions(&self) -> &HashMap<String, Rc<dyn ExpressionFunction>> {
        &self.functions
    }

    /// The value interpreter of this environment.
    #[must_use]
    pub fn value_interpreter(&self) -> &dyn ValueInterpreter {
        self.value_interpreter.as_ref()
    }

    /// Returns a copy of this environment whose static variables are
    /// extended (and shadowed where colliding) by `bindings`. Used to bind
    /// callback parameters per invocation.
    #[must_use]
    pub(crate) fn extend_static_variables(&self, bindings: HashMap<String, Value>) -> Self {
        let mut extended = self.clone();
        extended.static_variables.extend(bindings);
        extended
    }
}

/// The per-evaluation scratch environment.
///
/// Holds the variables and functions created by assignment expressions
/// during a single `evaluate_expression` call. A fresh instance is created
/// per call and never shared across evaluations; callbacks escaping the
/// call keep the instance they were created under.
#[derive(Default)]
pub struct InterpretationEnvironment {
    /// Variables assigned during the evaluation, keyed by lowercased
    /// symbol.
    pub(crate) variables: HashMap<String, Value>,
    /// Functions assigned during the evaluation, keyed by lowercased
    /// symbol.
    pub(crate) functions: HashMap<String, Rc<dyn ExpressionFunction>>,
}
