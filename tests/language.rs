use std::{cell::Cell, rc::Rc};

use exprima::{
    error::{EvaluatorError, ParseError, RuntimeError},
    interpreter::{
        environment::EvaluationEnvironment,
        function::{FunctionArgument, FunctionFailure, NativeFunction},
        parser::core::parse_program,
        tokenizer::core::Tokenizer,
        value::core::{ObjectView, Value},
    },
};

fn eval(source: &str) -> Value {
    eval_with(source, &EvaluationEnvironment::new())
}

fn eval_with(source: &str, environment: &EvaluationEnvironment) -> Value {
    exprima::evaluate(source, environment)
        .unwrap_or_else(|e| panic!("evaluation of {source:?} failed: {e}"))
}

fn eval_err(source: &str) -> EvaluatorError {
    eval_err_with(source, &EvaluationEnvironment::new())
}

fn eval_err_with(source: &str, environment: &EvaluationEnvironment) -> EvaluatorError {
    match exprima::evaluate(source, environment) {
        Ok(value) => panic!("evaluation of {source:?} succeeded with {value:?} but was expected to fail"),
        Err(error) => error,
    }
}

/// An environment with a `tick` live variable and a `tick_fn` function,
/// both counting their invocations through the returned cell.
fn counting_environment() -> (Rc<Cell<i64>>, EvaluationEnvironment) {
    let count = Rc::new(Cell::new(0));

    let for_variable = Rc::clone(&count);
    let for_function = Rc::clone(&count);

    let environment =
        EvaluationEnvironment::new()
            .with_live_variable("tick",
                                Rc::new(move || {
                                    for_variable.set(for_variable.get() + 1);
                                    Value::Long(for_variable.get())
                                }))
            .with_function("tick_fn",
                           Rc::new(NativeFunction::new(Box::new(move |_, _| {
                                       for_function.set(for_function.get() + 1);
                                       Ok(Value::Long(for_function.get()))
                                   }))));

    (count, environment)
}

/// A function declaring arguments `x`, `y`, `z` which returns the bound
/// argument values as an array.
fn declared_args_environment() -> EvaluationEnvironment {
    let collect = NativeFunction::with_arguments(vec![
                                                     FunctionArgument::new("x", false),
                                                     FunctionArgument::new("y", false),
                                                     FunctionArgument::new("z", false),
                                                 ],
                                                 Box::new(|_, arguments| {
                                                     Ok(Value::from(arguments.to_vec()))
                                                 }));

    let collect_variadic =
        NativeFunction::new(Box::new(|_, arguments: &[Value]| Ok(Value::from(arguments.to_vec()))));

    EvaluationEnvironment::new().with_function("f", Rc::new(collect))
                                .with_function("g", Rc::new(collect_variadic))
}

#[test]
fn literals_and_arithmetic() {
    assert_eq!(eval("1 + 2 * 3"), Value::Long(7));
    assert_eq!(eval("10 / 4"), Value::Long(2));
    assert_eq!(eval("10.0 / 4"), Value::Double(2.5));
    assert_eq!(eval("7 % 3"), Value::Long(1));
    assert_eq!(eval("2 ^ 10"), Value::Long(1024));
    assert_eq!(eval("3e2"), Value::Long(300));
    assert_eq!(eval(".5"), Value::Double(0.5));
    assert_eq!(eval("1.5 + 1"), Value::Double(2.5));
    assert_eq!(eval("(1 + 2) * 3"), Value::Long(9));
}

#[test]
fn exponentiation_chains_to_the_left() {
    assert_eq!(eval("2 ^ 3 ^ 2"), Value::Long(64));
}

#[test]
fn sign_flips_and_negation() {
    assert_eq!(eval("-(2)"), Value::Long(-2));
    assert_eq!(eval("-(2.5)"), Value::Double(-2.5));
    assert_eq!(eval("0 - 2"), Value::Long(-2));
    assert_eq!(eval("!true"), Value::Bool(false));
    assert_eq!(eval("!(1 > 2)"), Value::Bool(true));
}

#[test]
fn strings_and_concatenation() {
    assert_eq!(eval("\"a\" & \"b\""), Value::from("ab"));
    assert_eq!(eval("\"n = \" & 5"), Value::from("n = 5"));
    assert_eq!(eval(r#""a\"b""#), Value::from("a\"b"));
    assert_eq!(eval("1 & 2 & 3"), Value::from("123"));
}

#[test]
fn unterminated_string_reports_start_position() {
    let error = eval_err("\"unterminated");

    match error {
        EvaluatorError::Parse(ParseError::UnterminatedString { position }) => {
            assert_eq!(position.line(), 1);
            assert_eq!(position.column(), 1);
        },
        other => panic!("expected an unterminated string error, got {other}"),
    }
}

#[test]
fn comparisons() {
    assert_eq!(eval("1 < 2"), Value::Bool(true));
    assert_eq!(eval("2 <= 2"), Value::Bool(true));
    assert_eq!(eval("3 > 4"), Value::Bool(false));
    assert_eq!(eval("3 >= 3"), Value::Bool(true));
    assert_eq!(eval("\"10\" > 9"), Value::Bool(true));
}

#[test]
fn equality_coerces_unless_exact() {
    assert_eq!(eval("1 == \"1\""), Value::Bool(true));
    assert_eq!(eval("1 === \"1\""), Value::Bool(false));
    assert_eq!(eval("1 !== \"1\""), Value::Bool(true));
    assert_eq!(eval("1 == 1.0"), Value::Bool(true));
    assert_eq!(eval("1 === 1.0"), Value::Bool(false));
    assert_eq!(eval("\"A\" == \"a\""), Value::Bool(true));
    assert_eq!(eval("\"A\" === \"a\""), Value::Bool(false));
    assert_eq!(eval("null == null"), Value::Bool(true));
    assert_eq!(eval("null != 1"), Value::Bool(true));
}

#[test]
fn boolean_operators_evaluate_both_sides() {
    let (count, environment) = counting_environment();
    assert_eq!(eval_with("tick > 0 || tick > 0", &environment), Value::Bool(true));
    assert_eq!(count.get(), 2);

    let (count, environment) = counting_environment();
    assert_eq!(eval_with("tick < 0 && tick < 0", &environment), Value::Bool(false));
    assert_eq!(count.get(), 2);
}

#[test]
fn null_coalesce_short_circuits() {
    assert_eq!(eval("null ?? 5"), Value::Long(5));
    assert_eq!(eval("null ?? null ?? \"x\""), Value::from("x"));

    let (count, environment) = counting_environment();
    assert_eq!(eval_with("3 ?? tick", &environment), Value::Long(3));
    assert_eq!(count.get(), 0);
}

#[test]
fn if_then_else_evaluates_one_branch() {
    assert_eq!(eval("if 1 < 2 then \"y\" else \"n\""), Value::from("y"));
    assert_eq!(eval("if false then 1 else 2"), Value::Long(2));

    let (count, environment) = counting_environment();
    assert_eq!(eval_with("if true then 1 else tick", &environment), Value::Long(1));
    assert_eq!(count.get(), 0);
}

#[test]
fn variable_resolution_is_case_insensitive() {
    let environment = EvaluationEnvironment::new().with_static_variable("a", Value::Long(42));

    assert_eq!(eval_with("a", &environment), Value::Long(42));
    assert_eq!(eval_with("A", &environment), Value::Long(42));
    assert_eq!(eval_with("a", &environment), eval_with("A", &environment));
}

#[test]
fn undefined_variable_is_an_error() {
    assert!(matches!(eval_err("nope"),
                     EvaluatorError::Runtime(RuntimeError::UndefinedVariable { .. })));
}

#[test]
fn live_variables_invoke_their_producer() {
    let (count, environment) = counting_environment();

    assert_eq!(eval_with("tick + tick", &environment), Value::Long(3));
    assert_eq!(count.get(), 2);
}

#[test]
fn assignments_bind_and_yield_their_value() {
    assert_eq!(eval("a = 10\na + 5"), Value::Long(15));
    assert_eq!(eval("a = 3"), Value::Long(3));
    assert_eq!(eval("a = 2\nb = a * a\nb + a"), Value::Long(6));
}

#[test]
fn reassignment_is_an_error() {
    assert!(matches!(eval_err("a = 1\na = 2"),
                     EvaluatorError::Runtime(RuntimeError::IdentifierInUse { .. })));

    // Shadowing an environment variable is rejected as well
    let environment = EvaluationEnvironment::new().with_static_variable("a", Value::Long(1));
    assert!(matches!(eval_err_with("a = 2", &environment),
                     EvaluatorError::Runtime(RuntimeError::IdentifierInUse { .. })));

    // A callback may not take a name the standard registry holds
    assert!(matches!(eval_err("split = (x) -> x"),
                     EvaluatorError::Runtime(RuntimeError::IdentifierInUse { .. })));
}

#[test]
fn named_arguments_bind_by_declared_name() {
    let environment = declared_args_environment();

    assert_eq!(eval_with("f(1, y = 2, z = 3)", &environment),
               Value::from(vec![Value::Long(1), Value::Long(2), Value::Long(3)]));

    // Unfilled slots stay null
    assert_eq!(eval_with("f(1, z = 3)", &environment),
               Value::from(vec![Value::Long(1), Value::Null, Value::Long(3)]));

    // Name matching ignores case
    assert_eq!(eval_with("f(Y = 2)", &environment),
               Value::from(vec![Value::Null, Value::Long(2), Value::Null]));
}

#[test]
fn positional_after_named_is_an_error() {
    let environment = declared_args_environment();

    assert!(matches!(eval_err_with("f(y = 1, 2)", &environment),
                     EvaluatorError::Runtime(RuntimeError::NonNamedFunctionArgument { .. })));
}

#[test]
fn unknown_argument_names_are_errors() {
    let environment = declared_args_environment();

    assert!(matches!(eval_err_with("f(q = 1)", &environment),
                     EvaluatorError::Runtime(RuntimeError::UndefinedFunctionArgumentName { .. })));

    // Variadic functions reject all named arguments
    assert!(matches!(eval_err_with("g(x = 1)", &environment),
                     EvaluatorError::Runtime(RuntimeError::UndefinedFunctionArgumentName { .. })));
}

#[test]
fn arguments_evaluate_left_to_right() {
    let (count, environment) = counting_environment();
    let environment =
        environment.with_function("collect",
                                  Rc::new(NativeFunction::new(Box::new(|_,
                                                                        arguments: &[Value]| {
                                              Ok(Value::from(arguments.to_vec()))
                                          }))));

    assert_eq!(eval_with("collect(tick_fn(), tick_fn())", &environment),
               Value::from(vec![Value::Long(1), Value::Long(2)]));
    assert_eq!(count.get(), 2);
}

#[test]
fn undefined_function_is_an_error_unless_optional() {
    assert!(matches!(eval_err("missing()"),
                     EvaluatorError::Runtime(RuntimeError::UndefinedFunction { .. })));
    assert_eq!(eval("missing?()"), Value::Null);
}

#[test]
fn callbacks_are_callable_values() {
    assert_eq!(eval("((x, y) -> x + y)(3, 4)"), Value::Long(7));
    assert_eq!(eval("add = (x, y) -> x + y\nadd(3, 4)"), Value::Long(7));

    // Missing callback arguments become null
    assert_eq!(eval("pick = (a, b) -> a ?? b ?? \"none\"\npick()"), Value::from("none"));
}

#[test]
fn callbacks_capture_their_environment() {
    let environment = EvaluationEnvironment::new().with_static_variable("base", Value::Long(10));

    assert_eq!(eval_with("f = (x) -> x + base\nf(5)", &environment), Value::Long(15));
}

#[test]
fn host_functions_can_invoke_callbacks() {
    let apply_ten =
        NativeFunction::with_arguments(vec![FunctionArgument::new("callback", true)],
                                       Box::new(|environment, arguments: &[Value]| {
                                           let Value::Function(callback) = &arguments[0] else {
                                               return Err(FunctionFailure::new(0,
                                                                               "expected a callback")
                                                                               .into());
                                           };
                                           callback.apply(environment, &[Value::Long(10)])
                                       }));

    let environment = EvaluationEnvironment::new().with_function("apply_ten", Rc::new(apply_ten));

    assert_eq!(eval_with("apply_ten((n) -> n * 2)", &environment), Value::Long(20));
}

#[test]
fn invoking_a_non_callable_is_an_error() {
    assert!(matches!(eval_err("(1 + 2)(3)"),
                     EvaluatorError::Runtime(RuntimeError::NonCallableValue { .. })));
}

#[test]
fn optional_chaining_yields_null() {
    assert_eq!(eval("null?.foo?.bar"), Value::Null);
    assert_eq!(eval("null?[0]"), Value::Null);

    assert!(matches!(eval_err("null.foo"),
                     EvaluatorError::Runtime(RuntimeError::UnknownMember { .. })));
}

#[test]
fn array_indexing_is_bounds_checked() {
    let environment =
        EvaluationEnvironment::new().with_static_variable("arr",
                                                          Value::from(vec![Value::Long(10),
                                                                           Value::Long(20),
                                                                           Value::Long(30)]));

    assert_eq!(eval_with("arr[1]", &environment), Value::Long(20));
    assert_eq!(eval_with("arr?[5]", &environment), Value::Null);
    assert_eq!(eval_with("arr?[-1]", &environment), Value::Null);

    assert!(matches!(eval_err_with("arr[5]", &environment),
                     EvaluatorError::Runtime(RuntimeError::InvalidIndex { .. })));
    assert!(matches!(eval_err_with("arr[-1]", &environment),
                     EvaluatorError::Runtime(RuntimeError::InvalidIndex { .. })));
}

#[test]
fn map_indexing_is_membership_checked() {
    let mut entries = std::collections::BTreeMap::new();
    entries.insert("a".to_string(), Value::Long(1));

    let environment = EvaluationEnvironment::new().with_static_variable("m", Value::from(entries));

    assert_eq!(eval_with("m[\"a\"]", &environment), Value::Long(1));
    assert_eq!(eval_with("m?[\"b\"]", &environment), Value::Null);

    assert!(matches!(eval_err_with("m[\"b\"]", &environment),
                     EvaluatorError::Runtime(RuntimeError::InvalidMapKey { .. })));
}

#[test]
fn indexing_other_values_is_an_error() {
    assert!(matches!(eval_err("5[0]"),
                     EvaluatorError::Runtime(RuntimeError::NonIndexableValue { .. })));
}

struct CatalogItem;

impl ObjectView for CatalogItem {
    fn get_field(&self, name: &str) -> Option<Value> {
        match name.to_lowercase().as_str() {
            "name" => Some(Value::from("screwdriver")),
            "price" => Some(Value::Long(4)),
            _ => None,
        }
    }
}

#[test]
fn member_access_goes_through_object_views() {
    let environment =
        EvaluationEnvironment::new().with_static_variable("item",
                                                          Value::Object(Rc::new(CatalogItem)));

    assert_eq!(eval_with("item.name", &environment), Value::from("screwdriver"));
    assert_eq!(eval_with("item.PRICE", &environment), Value::Long(4));
    assert_eq!(eval_with("item?.missing", &environment), Value::Null);

    assert!(matches!(eval_err_with("item.missing", &environment),
                     EvaluatorError::Runtime(RuntimeError::UnknownMember { .. })));
}

#[test]
fn programs_yield_their_last_line() {
    assert_eq!(eval("1\n2\n3"), Value::Long(3));
    assert_eq!(eval("a = 2 # bind\na * 3"), Value::Long(6));
}

#[test]
fn empty_programs_are_parse_errors() {
    assert!(matches!(eval_err(""), EvaluatorError::Parse(ParseError::UnexpectedToken { .. })));
    assert!(matches!(eval_err("# only a comment"),
                     EvaluatorError::Parse(ParseError::UnexpectedToken { .. })));
}

#[test]
fn tokens_carry_their_positions() {
    let tokens = exprima::tokenize("1 +\n 2").unwrap();

    let positions = tokens.iter()
                          .map(|token| (token.row, token.col))
                          .collect::<Vec<_>>();

    assert_eq!(positions, vec![(0, 0), (0, 2), (1, 1)]);
}

#[test]
fn comments_are_invisible() {
    let tokens = exprima::tokenize("1 # a comment\n+ 2").unwrap();
    assert_eq!(tokens.len(), 3);
}

#[test]
fn unknown_tokens_are_lexical_errors() {
    assert!(matches!(exprima::tokenize("@"), Err(ParseError::UnknownToken { .. })));
}

#[test]
fn save_state_stack_is_balanced_after_parsing() {
    // Speculation-heavy input: invocations, named arguments, callbacks
    let mut tokenizer = Tokenizer::new("f(x, y = 2) ?? ((a) -> a)(1)");
    assert!(parse_program(&mut tokenizer).is_ok());
    assert_eq!(tokenizer.save_depth(), 0);

    // Syntax error paths close their frames too
    let mut tokenizer = Tokenizer::new("f(1,");
    assert!(parse_program(&mut tokenizer).is_err());
    assert_eq!(tokenizer.save_depth(), 0);

    // As do lexical errors surfacing mid-speculation
    let mut tokenizer = Tokenizer::new("f $");
    assert!(parse_program(&mut tokenizer).is_err());
    assert_eq!(tokenizer.save_depth(), 0);
}

#[test]
fn expressionify_round_trips() {
    let sources = [
        "1 + 2 * 3",
        "a = split(\"x,y\")[1] ?? \"d\"",
        "((x, y) -> x + y)(3, 4)",
        "if a && b then !(c) else d.e?.f",
        "\"quote \\\" inside\" & name",
        "2 ^ 3 ^ 2 - -(4)",
    ];

    for source in sources {
        let once = exprima::parse(source)
            .unwrap_or_else(|e| panic!("failed to parse {source:?}: {e}"))
            .expressionify();
        let twice = exprima::parse(&once)
            .unwrap_or_else(|e| panic!("failed to re-parse {once:?}: {e}"))
            .expressionify();

        assert_eq!(once, twice, "round trip of {source:?}");
    }
}

#[test]
fn evaluation_is_deterministic() {
    let program = exprima::parse("a = 2\nif a < 3 then a * 10 else a").unwrap();
    let interpreter = exprima::interpreter::evaluator::core::Interpreter::new();
    let environment = EvaluationEnvironment::new();

    let first = interpreter.evaluate_expression(&program, &environment).unwrap();
    let second = interpreter.evaluate_expression(&program, &environment).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, Value::Long(20));
}
