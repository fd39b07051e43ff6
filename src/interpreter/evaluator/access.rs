use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::{Expr, Span},
    error::RuntimeError,
    interpreter::{
        environment::{EvaluationEnvironment, InterpretationEnvironment},
        evaluator::core::{EvalResult, Interpreter},
        value::core::Value,
    },
    util::num::i64_to_usize_checked,
};

impl Interpreter {
    /// Evaluates a member access (`lhs.field` / `lhs?.field`).
    ///
    /// An identifier selector contributes its symbol directly; any other
    /// selector expression is evaluated and coerced to a string. Field
    /// lookup goes through the container's [`ObjectView`] and is
    /// case-insensitive.
    ///
    /// [`ObjectView`]: crate::interpreter::value::core::ObjectView
    pub(crate) fn evaluate_member_access(&self,
                                         lhs: &Expr,
                                         rhs: &Expr,
                                         optional: bool,
                                         span: Span,
                                         environment: &EvaluationEnvironment,
                                         interpretation: &Rc<RefCell<InterpretationEnvironment>>)
                                         -> EvalResult<Value> {
        let container = self.evaluate_sub(lhs, environment, interpretation)?;

        let field_name = match rhs {
            // Already an identifier, use its symbol
            Expr::Identifier { name, .. } => name.clone(),
            // Evaluate the name expression as a string
            other => {
                let value = self.evaluate_sub(other, environment, interpretation)?;
                environment.value_interpreter().as_string(&value)
            },
        };

        // Cannot access any members of null
        if container.is_null() {
            if optional {
                return Ok(Value::Null);
            }
            return Err(RuntimeError::UnknownMember { name: field_name,
                                                     span });
        }

        if let Value::Object(object) = &container
           && let Some(value) = object.get_field(&field_name)
        {
            return Ok(value);
        }

        // Found no field with the required name
        if optional {
            return Ok(Value::Null);
        }

        Err(RuntimeError::UnknownMember { name: field_name,
                                          span })
    }

    /// Evaluates an index access (`lhs[rhs]` / `lhs?[rhs]`), dispatching
    /// on the container's runtime shape: sequences take an integer index
    /// with a bounds check, mappings take a string key with a membership
    /// check.
    pub(crate) fn evaluate_index(&self,
                                 lhs: &Expr,
                                 rhs: &Expr,
                                 optional: bool,
                                 span: Span,
                                 environment: &EvaluationEnvironment,
                                 interpretation: &Rc<RefCell<InterpretationEnvironment>>)
                                 -> EvalResult<Value> {
        let value_interpreter = environment.value_interpreter();

        let key = self.evaluate_sub(rhs, environment, interpretation)?;
        let container = self.evaluate_sub(lhs, environment, interpretation)?;

        match &container {
            Value::Array(items) => {
                let index = value_interpreter.as_long(&key);

                match i64_to_usize_checked(index).filter(|i| *i < items.len()) {
                    Some(index) => Ok(items[index].clone()),
                    None if optional => Ok(Value::Null),
                    None => Err(RuntimeError::InvalidIndex { index,
                                                             length: items.len(),
                                                             span }),
                }
            },

            Value::Map(entries) => {
                let key = value_interpreter.as_string(&key);

                match entries.get(&key) {
                    Some(value) => Ok(value.clone()),
                    None if optional => Ok(Value::Null),
                    None => Err(RuntimeError::InvalidMapKey { key, span }),
                }
            },

            Value::Null if optional => Ok(Value::Null),

            // Cannot index this type of value
            _ => Err(RuntimeError::NonIndexableValue { span }),
        }
    }
}
