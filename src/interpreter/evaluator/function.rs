use std::{cell::RefCell, collections::HashMap, rc::Rc};

use log::trace;

use crate::{
    ast::{Expr, InvocationArgument, Span},
    error::RuntimeError,
    interpreter::{
        environment::{EvaluationEnvironment, InterpretationEnvironment},
        evaluator::core::{EvalResult, Interpreter},
        function::{ExpressionFunction, FunctionError, FunctionResult},
        value::core::Value,
    },
};

impl Interpreter {
    /// Evaluates a function invocation.
    ///
    /// The callee resolves either by name (identifier callees, looked up
    /// through the registry and environments) or by value (any other
    /// expression, which must produce a callable). Arguments are evaluated
    /// left to right and bound against the callee's declared argument
    /// list: named arguments match case-insensitively, positional
    /// arguments fill the next unfilled slot, unfilled slots stay null.
    ///
    /// # Errors
    /// - `UndefinedFunction` when a non-optional identifier callee cannot
    ///   be resolved.
    /// - `NonCallableValue` when an expression callee produces something
    ///   that cannot be invoked.
    /// - `UndefinedFunctionArgumentName` for named arguments the callee
    ///   does not declare (variadic callees reject all named arguments).
    /// - `NonNamedFunctionArgument` for positional arguments after named
    ///   ones.
    /// - `InvalidFunctionArgumentType` when pre-invocation validation
    ///   rejects an argument.
    /// - `InvalidFunctionInvocation` when the function itself rejects the
    ///   call while executing.
    pub(crate) fn evaluate_invocation(&self,
                                      callee: &Expr,
                                      arguments: &[InvocationArgument],
                                      optional: bool,
                                      span: Span,
                                      environment: &EvaluationEnvironment,
                                      interpretation: &Rc<RefCell<InterpretationEnvironment>>)
                                      -> EvalResult<Value> {
        let function: Rc<dyn ExpressionFunction> = match callee {
            Expr::Identifier { name, .. } => {
                match self.lookup_function(environment, interpretation, name) {
                    Some(function) => function,
                    // Function does not exist, but the call was optional
                    None if optional => {
                        trace!("function {name} not found, returning null (optional call)");
                        return Ok(Value::Null);
                    },
                    None => {
                        return Err(RuntimeError::UndefinedFunction { name: name.clone(),
                                                                     span });
                    },
                }
            },
            other => {
                let value = self.evaluate_sub(other, environment, interpretation)?;

                match value {
                    Value::Function(function) => function,
                    Value::Null if optional => return Ok(Value::Null),
                    _ => {
                        return Err(RuntimeError::NonCallableValue { callee:
                                                                        other.expressionify(),
                                                                    span });
                    },
                }
            },
        };

        let function_name = match callee {
            Expr::Identifier { name, .. } => name.clone(),
            other => other.expressionify(),
        };

        let definitions = function.arguments();

        // With declared arguments, pre-fill every slot with null so that
        // unbound slots keep that value
        let mut values: Vec<Value> = match definitions {
            Some(definitions) => vec![Value::Null; definitions.len()],
            None => Vec::new(),
        };

        let mut encountered_named = false;
        let mut positional_counter = 0usize;

        // Evaluate and bind all arguments, in source order
        for argument in arguments {
            let value = self.evaluate_sub(&argument.value, environment, interpretation)?;

            // A named argument, matched against the declared argument list
            if let (Some(definitions), Some(argument_name)) = (definitions, &argument.name) {
                encountered_named = true;

                let matched = definitions.iter()
                                         .position(|definition| {
                                             definition.name.eq_ignore_ascii_case(argument_name)
                                         });

                let Some(index) = matched else {
                    return Err(RuntimeError::UndefinedFunctionArgumentName {
                        function: function_name,
                        name: argument_name.clone(),
                        span: argument.value.span(),
                    });
                };

                trace!("matched named argument {argument_name} to index {index}");
                values[index] = value;
                continue;
            }

            // A positional argument after a named one is ambiguous
            if encountered_named {
                return Err(RuntimeError::NonNamedFunctionArgument { function: function_name,
                                                                    span: argument.value.span(), });
            }

            match definitions {
                // Variadic callee: collect positionals, reject names since
                // they cannot be matched against anything
                None => {
                    if let Some(argument_name) = &argument.name {
                        return Err(RuntimeError::UndefinedFunctionArgumentName {
                            function: function_name,
                            name: argument_name.clone(),
                            span: argument.value.span(),
                        });
                    }
                    values.push(value);
                },
                // Fill the next positional slot; arguments beyond the
                // declared list are dropped
                Some(_) => {
                    if positional_counter < values.len() {
                        values[positional_counter] = value;
                        positional_counter += 1;
                    }
                },
            }
        }

        // Let the function validate its arguments before the call happens
        function.validate_arguments(&values, environment.value_interpreter())
                .map_err(|failure| RuntimeError::InvalidFunctionArgumentType {
                    function: function_name.clone(),
                    argument_index: failure.argument_index,
                    message: failure.message,
                    span,
                })?;

        match function.apply(environment, &values) {
            Ok(result) => {
                trace!("invoked function {function_name}");
                Ok(result)
            },
            Err(FunctionError::Evaluation(error)) => Err(*error),
            Err(FunctionError::Invalid(failure)) => {
                let value = values.get(failure.argument_index)
                                  .map_or_else(|| "null".to_string(),
                                               |v| environment.value_interpreter().as_string(v));

                Err(RuntimeError::InvalidFunctionInvocation { function: function_name,
                                                              argument_index:
                                                                  failure.argument_index,
                                                              value,
                                                              message: failure.message,
                                                              span })
            },
        }
    }

    /// Builds the callable value of a callback expression.
    ///
    /// The callable owns a snapshot of the defining evaluation environment
    /// taken at this moment, plus a handle on the running interpretation
    /// environment, so it stays invocable after `evaluate_expression`
    /// returns.
    pub(crate) fn make_callback(&self,
                                signature: &[String],
                                body: &Expr,
                                environment: &EvaluationEnvironment,
                                interpretation: &Rc<RefCell<InterpretationEnvironment>>)
                                -> Value {
        trace!("setting up the callable for a callback expression");

        Value::Function(Rc::new(CallbackFunction { interpreter: self.clone(),
                                                   environment: environment.clone(),
                                                   interpretation: Rc::clone(interpretation),
                                                   signature: signature.to_vec(),
                                                   body: Rc::new(body.clone()), }))
    }
}

/// The callable behind a callback expression.
///
/// Each invocation extends the captured environment's static variables
/// with the position-matched signature bindings (missing arguments become
/// null) and evaluates the body against that extended environment.
struct CallbackFunction {
    interpreter:    Interpreter,
    environment:    EvaluationEnvironment,
    interpretation: Rc<RefCell<InterpretationEnvironment>>,
    signature:      Vec<String>,
    body:           Rc<Expr>,
}

impl ExpressionFunction for CallbackFunction {
    fn apply(&self, _environment: &EvaluationEnvironment, arguments: &[Value]) -> FunctionResult {
        let mut bindings = HashMap::new();

        for (index, parameter) in self.signature.iter().enumerate() {
            let value = arguments.get(index).cloned().unwrap_or(Value::Null);
            trace!("binding {parameter} for a callback invocation");
            bindings.insert(parameter.to_lowercase(), value);
        }

        let environment = self.environment.extend_static_variables(bindings);
        let result = self.interpreter
                         .evaluate_sub(&self.body, &environment, &self.interpretation)?;

        Ok(result)
    }
}
