use std::{cell::RefCell, rc::Rc};

use log::{debug, trace};

use crate::{
    ast::{ComparisonOperation, EqualityOperation, Expr, LiteralValue, Span},
    error::RuntimeError,
    interpreter::{
        environment::{EvaluationEnvironment, InterpretationEnvironment},
        function::{ExpressionFunction, FunctionRegistry},
        value::core::Value,
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The tree-walking expression evaluator.
///
/// Holds the standard function registry and nothing else; every
/// `evaluate_expression` call brings its own caller-supplied environment
/// and allocates a fresh interpretation environment for the assignments
/// made during that evaluation. A parsed expression can therefore be
/// evaluated any number of times, concurrently if each evaluation supplies
/// its own environment.
#[derive(Clone)]
pub struct Interpreter {
    standard_functions: Rc<FunctionRegistry>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter carrying the standard function library.
    #[must_use]
    pub fn new() -> Self {
        Self { standard_functions: Rc::new(FunctionRegistry::standard()), }
    }

    /// Creates an interpreter with a custom standard function registry.
    #[must_use]
    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Self { standard_functions: Rc::new(registry), }
    }

    /// Evaluates an expression against the given environment.
    ///
    /// Every evaluation starts out with a fresh interpretation
    /// environment; state is not kept between evaluation sessions.
    ///
    /// # Parameters
    /// - `expression`: The parsed expression, typically a whole program.
    /// - `environment`: The caller-supplied variables, functions and value
    ///   interpreter.
    ///
    /// # Returns
    /// The resulting value; for programs, the value of the last line.
    ///
    /// # Errors
    /// A [`RuntimeError`] when a name fails to resolve, an access is
    /// invalid, or a function rejects its invocation.
    pub fn evaluate_expression(&self,
                               expression: &Expr,
                               environment: &EvaluationEnvironment)
                               -> EvalResult<Value> {
        debug!("evaluating expression");
        let interpretation = Rc::new(RefCell::new(InterpretationEnvironment::default()));
        self.evaluate_sub(expression, environment, &interpretation)
    }

    /// Evaluates an expression within an already-running evaluation,
    /// sharing its interpretation environment.
    pub(crate) fn evaluate_sub(&self,
                               expression: &Expr,
                               environment: &EvaluationEnvironment,
                               interpretation: &Rc<RefCell<InterpretationEnvironment>>)
                               -> EvalResult<Value> {
        let value_interpreter = environment.value_interpreter();

        match expression {
            Expr::Program { lines, .. } => {
                // The return value of a program is the value of its last line
                let mut last = Value::Null;
                for line in lines {
                    last = self.evaluate_sub(line, environment, interpretation)?;
                }
                Ok(last)
            },

            Expr::Long { value, .. } => Ok(Value::Long(*value)),
            Expr::Double { value, .. } => Ok(Value::Double(*value)),
            Expr::Str { value, .. } => {
                Ok(Value::Str(value_interpreter.as_string(&Value::Str(value.clone()))))
            },
            Expr::Literal { value, .. } => Ok(match value {
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Null => Value::Null,
            }),

            Expr::Identifier { name, span } => {
                self.lookup_variable(environment, interpretation, name, *span)
            },

            Expr::FunctionInvocation { callee,
                                       arguments,
                                       optional,
                                       span, } => {
                self.evaluate_invocation(callee, arguments, *optional, *span, environment, interpretation)
            },

            Expr::Callback { signature, body, .. } => {
                Ok(self.make_callback(signature, body, environment, interpretation))
            },

            Expr::IfThenElse { condition,
                               positive,
                               negative,
                               .. } => {
                let condition = self.evaluate_sub(condition, environment, interpretation)?;

                // Only the selected branch is evaluated
                if value_interpreter.as_boolean(&condition) {
                    self.evaluate_sub(positive, environment, interpretation)
                } else {
                    self.evaluate_sub(negative, environment, interpretation)
                }
            },

            Expr::MemberAccess { lhs,
                                 rhs,
                                 optional,
                                 span, } => {
                self.evaluate_member_access(lhs, rhs, *optional, *span, environment, interpretation)
            },

            Expr::Index { lhs,
                          rhs,
                          optional,
                          span, } => {
                self.evaluate_index(lhs, rhs, *optional, *span, environment, interpretation)
            },

            Expr::Assignment { name, value, span } => {
                self.evaluate_assignment(name, value, *span, environment, interpretation)
            },

            Expr::NullCoalesce { lhs, rhs, .. } => {
                let value = self.evaluate_sub(lhs, environment, interpretation)?;

                // Input value is non-null, return that
                if !value.is_null() {
                    return Ok(value);
                }

                // Fall back to the right-hand side
                self.evaluate_sub(rhs, environment, interpretation)
            },

            Expr::Math { lhs, rhs, operation, .. } => {
                let rhs = self.evaluate_sub(rhs, environment, interpretation)?;
                let lhs = self.evaluate_sub(lhs, environment, interpretation)?;
                Ok(value_interpreter.perform_math(&lhs, &rhs, *operation))
            },

            Expr::Equality { lhs, rhs, operation, .. } => {
                let rhs = self.evaluate_sub(rhs, environment, interpretation)?;
                let lhs = self.evaluate_sub(lhs, environment, interpretation)?;

                let strict = matches!(operation,
                                      EqualityOperation::EqualExact
                                      | EqualityOperation::NotEqualExact);
                let equal = value_interpreter.are_equal(&lhs, &rhs, strict);

                let result = match operation {
                    EqualityOperation::Equal | EqualityOperation::EqualExact => equal,
                    EqualityOperation::NotEqual | EqualityOperation::NotEqualExact => !equal,
                };
                Ok(Value::Bool(result))
            },

            Expr::Comparison { lhs, rhs, operation, .. } => {
                let rhs = self.evaluate_sub(rhs, environment, interpretation)?;
                let lhs = self.evaluate_sub(lhs, environment, interpretation)?;

                let ordering = value_interpreter.compare(&lhs, &rhs);
                let result = match operation {
                    ComparisonOperation::LessThan => ordering < 0,
                    ComparisonOperation::LessThanOrEqual => ordering <= 0,
                    ComparisonOperation::GreaterThan => ordering > 0,
                    ComparisonOperation::GreaterThanOrEqual => ordering >= 0,
                };
                Ok(Value::Bool(result))
            },

            Expr::Conjunction { lhs, rhs, .. } => {
                // Both sides are always evaluated
                let rhs = self.evaluate_sub(rhs, environment, interpretation)?;
                let lhs = self.evaluate_sub(lhs, environment, interpretation)?;
                Ok(Value::Bool(value_interpreter.as_boolean(&lhs)
                               && value_interpreter.as_boolean(&rhs)))
            },

            Expr::Disjunction { lhs, rhs, .. } => {
                // Both sides are always evaluated
                let rhs = self.evaluate_sub(rhs, environment, interpretation)?;
                let lhs = self.evaluate_sub(lhs, environment, interpretation)?;
                Ok(Value::Bool(value_interpreter.as_boolean(&lhs)
                               || value_interpreter.as_boolean(&rhs)))
            },

            Expr::Concatenation { lhs, rhs, .. } => {
                let rhs = self.evaluate_sub(rhs, environment, interpretation)?;
                let lhs = self.evaluate_sub(lhs, environment, interpretation)?;
                Ok(Value::Str(format!("{}{}",
                                      value_interpreter.as_string(&lhs),
                                      value_interpreter.as_string(&rhs))))
            },

            Expr::Invert { input, .. } => {
                let input = self.evaluate_sub(input, environment, interpretation)?;
                Ok(Value::Bool(!value_interpreter.as_boolean(&input)))
            },

            Expr::FlipSign { input, .. } => {
                let input = self.evaluate_sub(input, environment, interpretation)?;

                if value_interpreter.has_decimal_point(&input) {
                    Ok(Value::Double(-value_interpreter.as_double(&input)))
                } else {
                    Ok(Value::Long(value_interpreter.as_long(&input).wrapping_neg()))
                }
            },
        }
    }

    /// Looks up a variable: static variables first, then live variables
    /// (invoking the producer), then the assignments of the running
    /// evaluation.
    pub(crate) fn lookup_variable(&self,
                                  environment: &EvaluationEnvironment,
                                  interpretation: &Rc<RefCell<InterpretationEnvironment>>,
                                  name: &str,
                                  span: Span)
                                  -> EvalResult<Value> {
        let symbol = name.to_lowercase();
        trace!("looking up variable {symbol}");

        if let Some(value) = environment.static_variables().get(&symbol) {
            return Ok(value.clone());
        }

        if let Some(producer) = environment.live_variables().get(&symbol) {
            return Ok(producer());
        }

        if let Some(value) = interpretation.borrow().variables.get(&symbol) {
            return Ok(value.clone());
        }

        Err(RuntimeError::UndefinedVariable { name: name.to_string(),
                                              span })
    }

    /// Looks up a function: the standard registry first, then environment
    /// functions, then the assignments of the running evaluation. A miss
    /// is not an error here; the caller decides.
    pub(crate) fn lookup_function(&self,
                                  environment: &EvaluationEnvironment,
                                  interpretation: &Rc<RefCell<InterpretationEnvironment>>,
                                  name: &str)
                                  -> Option<Rc<dyn ExpressionFunction>> {
        let symbol = name.to_lowercase();
        trace!("looking up function {symbol}");

        if let Some(function) = self.standard_functions.lookup(&symbol) {
            return Some(function);
        }

        if let Some(function) = environment.functions().get(&symbol) {
            return Some(Rc::clone(function));
        }

        interpretation.borrow().functions.get(&symbol).cloned()
    }

    /// Evaluates an assignment: the value first, then registration into
    /// the interpretation environment, rejecting names that exist anywhere
    /// already. The result of an assignment is the assigned value.
    fn evaluate_assignment(&self,
                           name: &str,
                           value: &Expr,
                           span: Span,
                           environment: &EvaluationEnvironment,
                           interpretation: &Rc<RefCell<InterpretationEnvironment>>)
                           -> EvalResult<Value> {
        let rhs = self.evaluate_sub(value, environment, interpretation)?;
        let symbol = name.to_lowercase();

        match &rhs {
            Value::Function(function) => {
                let in_use = self.standard_functions.lookup(&symbol).is_some()
                             || environment.functions().contains_key(&symbol)
                             || interpretation.borrow().functions.contains_key(&symbol);

                if in_use {
                    return Err(RuntimeError::IdentifierInUse { name: name.to_string(),
                                                               span });
                }

                trace!("storing function {symbol} within the interpretation environment");
                interpretation.borrow_mut().functions.insert(symbol, Rc::clone(function));
            },
            _ => {
                let in_use = environment.static_variables().contains_key(&symbol)
                             || environment.live_variables().contains_key(&symbol)
                             || interpretation.borrow().variables.contains_key(&symbol);

                if in_use {
                    return Err(RuntimeError::IdentifierInUse { name: name.to_string(),
                                                               span });
                }

                trace!("storing variable {symbol} within the interpretation environment");
                interpretation.borrow_mut().variables.insert(symbol, rhs.clone());
            },
        }

        // Assignments always return their assigned value
        Ok(rhs)
    }
}
