use std::fs;

use exprima::interpreter::environment::EvaluationEnvironment;
use walkdir::WalkDir;

/// Walks the expression corpus and checks every script against the
/// expectation in its `# expect:` header line.
#[test]
fn expression_scripts_work() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/expressions").into_iter()
                                         .filter_map(Result::ok)
                                         .filter(|e| {
                                             e.path().extension().is_some_and(|ext| ext == "expr")
                                         })
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        let expected = content.lines()
                              .find_map(|line| line.strip_prefix("# expect: "))
                              .unwrap_or_else(|| panic!("{path:?} carries no '# expect:' header"));

        count += 1;

        let value = exprima::evaluate(&content, &EvaluationEnvironment::new())
            .unwrap_or_else(|e| panic!("Script {path:?} failed:\n{content}\nError: {e}"));

        assert_eq!(value.to_string(), expected, "script {path:?}");
    }

    assert!(count > 0, "No expression scripts found in tests/expressions");
}
