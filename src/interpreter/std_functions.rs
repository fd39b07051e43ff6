use std::rc::Rc;

use crate::{
    interpreter::{
        environment::EvaluationEnvironment,
        function::{FunctionArgument, FunctionFailure, FunctionRegistry, FunctionResult, NativeFunction},
        value::core::Value,
    },
    util::num::i64_to_usize_checked,
};

/// Declares the standard function table.
///
/// Each entry provides a name, the declared argument list (`None` for
/// variadic functions) and the handler. The macro produces the `install`
/// function that loads the whole table into a registry.
macro_rules! standard_functions {
    (
        $(
            $name:literal => {
                args: $args:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        /// Installs the standard function library into `registry`.
        pub(crate) fn install(registry: &mut FunctionRegistry) {
            $(
                let function = match $args {
                    Some(arguments) => NativeFunction::with_arguments(arguments, Box::new($func)),
                    None => NativeFunction::new(Box::new($func)),
                };
                registry.register($name, Rc::new(function));
            )*
        }
    };
}

standard_functions! {
    "split" => {
        args: Some(vec![
            FunctionArgument::new("input", true),
            FunctionArgument::new("separator", false),
        ]),
        func: split,
    },
    "len" => {
        args: Some(vec![FunctionArgument::new("value", true)]),
        func: len,
    },
    "str" => {
        args: Some(vec![FunctionArgument::new("value", false)]),
        func: stringify,
    },
    "range" => {
        args: Some(vec![
            FunctionArgument::new("start", true),
            FunctionArgument::new("end", true),
        ]),
        func: range,
    },
    "min" => {
        args: Some(vec![
            FunctionArgument::new("a", true),
            FunctionArgument::new("b", true),
        ]),
        func: |environment: &EvaluationEnvironment, arguments: &[Value]| {
            min_max(environment, arguments, true)
        },
    },
    "max" => {
        args: Some(vec![
            FunctionArgument::new("a", true),
            FunctionArgument::new("b", true),
        ]),
        func: |environment: &EvaluationEnvironment, arguments: &[Value]| {
            min_max(environment, arguments, false)
        },
    },
}

/// Splits a string on a literal separator, `,` by default.
fn split(_environment: &EvaluationEnvironment, arguments: &[Value]) -> FunctionResult {
    let Value::Str(input) = &arguments[0] else {
        return Err(FunctionFailure::new(0, "expected a string to split").into());
    };

    let separator = match arguments.get(1) {
        None | Some(Value::Null) => ",",
        Some(Value::Str(separator)) => separator.as_str(),
        Some(_) => return Err(FunctionFailure::new(1, "expected a string separator").into()),
    };

    let parts = input.split(separator).map(Value::from).collect::<Vec<_>>();
    Ok(Value::from(parts))
}

/// Returns the length of a string (in characters), array or map.
fn len(_environment: &EvaluationEnvironment, arguments: &[Value]) -> FunctionResult {
    let length = match &arguments[0] {
        Value::Str(s) => s.chars().count(),
        Value::Array(a) => a.len(),
        Value::Map(m) => m.len(),
        _ => return Err(FunctionFailure::new(0, "expected a string, array or map").into()),
    };

    Ok(Value::Long(i64::try_from(length).unwrap_or(i64::MAX)))
}

/// Renders any value through the environment's value interpreter.
fn stringify(environment: &EvaluationEnvironment, arguments: &[Value]) -> FunctionResult {
    let value = arguments.first().unwrap_or(&Value::Null);
    Ok(Value::Str(environment.value_interpreter().as_string(value)))
}

/// Builds the inclusive integer range `[start, end]`; empty when the end
/// lies before the start.
fn range(_environment: &EvaluationEnvironment, arguments: &[Value]) -> FunctionResult {
    let &Value::Long(start) = &arguments[0] else {
        return Err(FunctionFailure::new(0, "expected an integer start").into());
    };
    let &Value::Long(end) = &arguments[1] else {
        return Err(FunctionFailure::new(1, "expected an integer end").into());
    };

    if end < start {
        return Ok(Value::from(Vec::new()));
    }

    let count = end.checked_sub(start)
                   .and_then(|span| span.checked_add(1))
                   .and_then(i64_to_usize_checked)
                   .ok_or_else(|| FunctionFailure::new(1, "range is too large"))?;

    let mut items = Vec::with_capacity(count);
    for value in start..=end {
        items.push(Value::Long(value));
    }

    Ok(Value::from(items))
}

/// Returns the smaller (or larger) of two numbers, keeping the original
/// value shape.
fn min_max(environment: &EvaluationEnvironment,
           arguments: &[Value],
           minimum: bool)
           -> FunctionResult {
    let value_interpreter = environment.value_interpreter();

    for (index, argument) in arguments.iter().enumerate().take(2) {
        if value_interpreter.try_parse_number(argument).is_none() {
            return Err(FunctionFailure::new(index, "expected a number").into());
        }
    }

    let ordering = value_interpreter.compare(&arguments[0], &arguments[1]);
    let pick_first = if minimum { ordering <= 0 } else { ordering >= 0 };

    Ok(if pick_first {
        arguments[0].clone()
    } else {
        arguments[1].clone()
    })
}
