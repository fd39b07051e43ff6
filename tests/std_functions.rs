use exprima::{
    error::{EvaluatorError, RuntimeError},
    interpreter::{environment::EvaluationEnvironment, value::core::Value},
};

fn eval(source: &str) -> Value {
    exprima::evaluate(source, &EvaluationEnvironment::new())
        .unwrap_or_else(|e| panic!("evaluation of {source:?} failed: {e}"))
}

fn eval_err(source: &str) -> EvaluatorError {
    match exprima::evaluate(source, &EvaluationEnvironment::new()) {
        Ok(value) => panic!("evaluation of {source:?} succeeded with {value:?} but was expected to fail"),
        Err(error) => error,
    }
}

fn strings(items: &[&str]) -> Value {
    Value::from(items.iter().map(|s| Value::from(*s)).collect::<Vec<_>>())
}

#[test]
fn split_requires_its_input() {
    assert!(matches!(eval_err("split()"),
                     EvaluatorError::Runtime(RuntimeError::InvalidFunctionArgumentType { .. })));
    assert!(matches!(eval_err("split(5)"),
                     EvaluatorError::Runtime(RuntimeError::InvalidFunctionInvocation { .. })));
}

#[test]
fn split_on_the_default_separator() {
    assert_eq!(eval("split(\"hello,world,test\")"), strings(&["hello", "world", "test"]));
    assert_eq!(eval("split(\"another , weird,ex am ple\")"),
               strings(&["another ", " weird", "ex am ple"]));
}

#[test]
fn split_on_a_custom_separator() {
    assert_eq!(eval("split(\"hello|world|test\", \"|\")"), strings(&["hello", "world", "test"]));
    assert_eq!(eval("split(\"hello|world,test\", \"|\")"), strings(&["hello", "world,test"]));
    assert_eq!(eval("split(\"myhelloworldhellotext\", \"hello\")"),
               strings(&["my", "world", "text"]));
}

#[test]
fn split_accepts_named_arguments() {
    assert_eq!(eval("split(separator = \"|\", input = \"a|b\")"), strings(&["a", "b"]));
}

#[test]
fn split_results_chain_into_indexing() {
    assert_eq!(eval("split(\"a,b,c\")[0]"), Value::from("a"));
    assert_eq!(eval("split(\"a,b,c\")?[9]"), Value::Null);
}

#[test]
fn len_counts_strings_and_collections() {
    assert_eq!(eval("len(\"hello\")"), Value::Long(5));
    assert_eq!(eval("len(\"\" & \"\")"), Value::Long(0));
    assert_eq!(eval("len(split(\"a,b,c\"))"), Value::Long(3));

    assert!(matches!(eval_err("len(5)"),
                     EvaluatorError::Runtime(RuntimeError::InvalidFunctionInvocation { .. })));
}

#[test]
fn str_renders_any_value() {
    assert_eq!(eval("str(5)"), Value::from("5"));
    assert_eq!(eval("str(1.5)"), Value::from("1.5"));
    assert_eq!(eval("str(null)"), Value::from("null"));
    assert_eq!(eval("str(true)"), Value::from("true"));
    assert_eq!(eval("str(split(\"a,b\"))"), Value::from("[a, b]"));
}

#[test]
fn range_builds_inclusive_sequences() {
    assert_eq!(eval("range(1, 4)"),
               Value::from(vec![Value::Long(1), Value::Long(2), Value::Long(3), Value::Long(4)]));
    assert_eq!(eval("range(5, 1)"), Value::from(Vec::new()));
    assert_eq!(eval("len(range(1, 100))"), Value::Long(100));

    assert!(matches!(eval_err("range(1.5, 2)"),
                     EvaluatorError::Runtime(RuntimeError::InvalidFunctionInvocation { .. })));
}

#[test]
fn min_and_max_keep_the_picked_value() {
    assert_eq!(eval("min(2, 1.5)"), Value::Double(1.5));
    assert_eq!(eval("min(1, 2)"), Value::Long(1));
    assert_eq!(eval("max(\"2\", 10)"), Value::Long(10));
    assert_eq!(eval("max(7, 7.0)"), Value::Long(7));

    assert!(matches!(eval_err("min(null, 1)"),
                     EvaluatorError::Runtime(RuntimeError::InvalidFunctionArgumentType { .. })));
}
