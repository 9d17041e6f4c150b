use std::fs;

use osaker::{
    environment::Entry,
    error::{ErrorKind, OsakerError},
    io::BufferOutput,
    values::{OsakaType, Primitive, Value},
    Interpreter,
};

fn run(interpreter: &mut Interpreter, source: &str) -> Result<Vec<String>, OsakerError> {
    let mut output = BufferOutput::new();
    interpreter.eval(source, &mut output)?;
    Ok(output.lines)
}

fn error_kind(source: &str) -> ErrorKind {
    let mut interpreter = Interpreter::new();
    run(&mut interpreter, source)
        .expect_err("expected the script to fail")
        .kind()
}

#[test]
fn literals_round_trip_through_inspect() -> Result<(), OsakerError> {
    let mut interpreter = Interpreter::new();
    let lines = run(
        &mut interpreter,
        r#"
        :o s <-- "Osaka Daioh" ~nyan
        :o single <-- 'chiyo-chan' ~nyan
        :o n <-- -42 ~chiyo
        :o t <-- yes ~tomo
        :o f <-- nuhuh ~tomo
        :< s :< single :< n :< t :< f
        "#,
    )?;
    assert_eq!(
        lines,
        vec![
            r#"s <-- "Osaka Daioh" ~nyan"#,
            r#"single <-- "chiyo-chan" ~nyan"#,
            "n <-- -42 ~chiyo",
            "t <-- yes ~tomo",
            "f <-- no ~tomo",
        ]
    );
    Ok(())
}

#[test]
fn boolean_literal_normalization() -> Result<(), OsakerError> {
    let mut interpreter = Interpreter::new();
    let lines = run(&mut interpreter, ":o flag <-- yaa ~tomo\n:< flag")?;
    assert_eq!(lines, vec!["flag <-- yes ~tomo"]);
    assert_eq!(
        interpreter.environment().value("flag"),
        Some(&Value::from(Primitive::Boolean(true)))
    );
    Ok(())
}

#[test]
fn delete_invariant() -> Result<(), OsakerError> {
    let mut interpreter = Interpreter::new();
    run(&mut interpreter, ":o x <-- 1 ~chiyo\n:3 x")?;
    let error = run(&mut interpreter, ":3 x").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NameError);
    assert_eq!(run(&mut interpreter, ":< x")?, Vec::<String>::new());
    Ok(())
}

#[test]
fn type_mismatch_rejection() {
    assert_eq!(error_kind(r#":o x <-- "5" ~chiyo"#), ErrorKind::IncorrectTypeError);
    assert_eq!(error_kind(":o x <-- 5 ~nyan"), ErrorKind::IncorrectTypeError);
    assert_eq!(error_kind(":o x <-- ya ~chiyo"), ErrorKind::IncorrectTypeError);
}

#[test]
fn math_binds_an_integer() -> Result<(), OsakerError> {
    let mut interpreter = Interpreter::new();
    run(&mut interpreter, ":o answer <-- (:m 1 + 1) ~chiyo")?;
    let answer = interpreter.environment().value("answer").cloned();
    assert_eq!(answer.as_ref().map(Value::osaka_type), Some(OsakaType::Integer));
    assert_eq!(answer.and_then(|v| v.as_integer()), Some(2));
    Ok(())
}

#[test]
fn error_taxonomy() {
    assert_eq!(error_kind(":o x <-- 1 ~chiyo @"), ErrorKind::LexError);
    assert_eq!(error_kind(":o x 1 ~chiyo"), ErrorKind::SyntaxError);
    assert_eq!(error_kind(":o x <-- y ~chiyo"), ErrorKind::NameError);
    assert_eq!(
        error_kind(":o b <-- yes ~tomo :o x <-- :m b + 1 ~chiyo"),
        ErrorKind::TypeKindError
    );
    assert_eq!(error_kind(":o x <-- 1 ~int"), ErrorKind::TypeNotFound);
    assert_eq!(
        error_kind(":o x <-- 123456789012345678901234567890 ~chiyo"),
        ErrorKind::CastError
    );
    assert_eq!(
        error_kind(":D nope! <-- 'nope/nope.osaka' ~azumanga"),
        ErrorKind::ModuleNotFound
    );
    assert_eq!(error_kind(":m 1 / 0"), ErrorKind::ArithmeticError);
}

#[test]
fn lex_error_names_character_and_position() {
    let error = error_kind_with_message(":< x\n  ?");
    assert_eq!(error.kind(), ErrorKind::LexError);
    assert_eq!(error.location, Some([2, 3]));
    assert!(error.to_string().contains("'?'"));
}

fn error_kind_with_message(source: &str) -> OsakerError {
    osaker::tokenize(source).expect_err("expected a lexical error")
}

#[test]
fn imports_bind_a_namespace() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("utils.osaka"),
        ":o greeting <-- 'hello' ~nyan\n:o count <-- 3 ~chiyo\n:< count\n",
    )?;
    fs::write(
        dir.path().join("main.osaka"),
        ":D utils! <-- 'utils.osaka' ~azumanga\n:o twice <-- :m utils!count * 2 ~chiyo\n:< utils!greeting\n:< twice\n",
    )?;

    let source = fs::read_to_string(dir.path().join("main.osaka"))?;
    let mut interpreter = Interpreter::with_base_dir(dir.path());
    let lines = run(&mut interpreter, &source)?;
    assert_eq!(
        lines,
        vec![
            "count <-- 3 ~chiyo",
            r#"utils!greeting <-- "hello" ~nyan"#,
            "twice <-- 6 ~chiyo",
        ]
    );
    match interpreter.environment().get("utils!") {
        Some(Entry::Namespace(utils)) => assert_eq!(utils.len(), 2),
        other => panic!("expected a namespace, got {:?}", other),
    }
    Ok(())
}

#[test]
fn imports_are_independent_copies() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("lib.osaka"), ":o x <-- 1 ~chiyo")?;
    let mut interpreter = Interpreter::with_base_dir(dir.path());
    run(
        &mut interpreter,
        ":D a! <-- 'lib.osaka' ~azumanga :D b! <-- 'lib.osaka' ~azumanga :o a!x <-- 5 ~chiyo :3 b!x",
    )?;
    let env = interpreter.environment();
    assert_eq!(env.value("a!x").and_then(Value::as_integer), Some(5));
    assert!(env.resolve("b!x").is_none());
    assert!(env.resolve("b!").is_some());
    Ok(())
}

#[test]
fn inspect_namespace_dumps_entries() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("lib.osaka"), ":o x <-- 1 ~chiyo :o y <-- no ~tomo")?;
    let mut interpreter = Interpreter::with_base_dir(dir.path());
    let lines = run(&mut interpreter, ":D lib! <-- \"lib.osaka\" ~azumanga :< lib!")?;
    assert_eq!(
        lines,
        vec!["lib! <-- ~azumanga\n  lib!x <-- 1 ~chiyo\n  lib!y <-- no ~tomo"]
    );
    Ok(())
}

#[test]
fn nested_imports_resolve_relative_to_the_module() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("lib"))?;
    fs::write(dir.path().join("lib").join("inner.osaka"), ":o deep <-- 'yes' ~nyan")?;
    fs::write(
        dir.path().join("lib").join("outer.osaka"),
        ":D inner! <-- 'inner.osaka' ~azumanga",
    )?;
    let mut interpreter = Interpreter::with_base_dir(dir.path());
    let lines = run(
        &mut interpreter,
        ":D outer! <-- 'lib/outer.osaka' ~azumanga :< outer!inner!deep",
    )?;
    assert_eq!(lines, vec![r#"outer!inner!deep <-- "yes" ~nyan"#]);
    Ok(())
}

#[test]
fn failing_module_reports_inner_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("broken.osaka"), ":o ok <-- 1 ~chiyo\n:3 ghost")?;
    let mut interpreter = Interpreter::with_base_dir(dir.path());
    let error = run(&mut interpreter, ":D broken! <-- 'broken.osaka' ~azumanga").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NameError);
    assert!(error.to_string().contains("broken.osaka"));
    assert!(interpreter.environment().resolve("broken!").is_none());
    Ok(())
}

#[test]
fn namespace_is_not_a_value() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("lib.osaka"), ":o x <-- 1 ~chiyo")?;
    let import = ":D lib! <-- 'lib.osaka' ~azumanga\r\n";

    let mut interpreter = Interpreter::with_base_dir(dir.path());
    let error = run(&mut interpreter, &format!("{}:o y <-- lib! ~chiyo", import)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TypeKindError);
    assert_eq!(error.location, Some([2, 10]));
    assert_eq!(
        error.to_string(),
        "[line 2, column 10] 'lib!' is a namespace, not a value"
    );

    let mut interpreter = Interpreter::with_base_dir(dir.path());
    let error = run(&mut interpreter, &format!("{}:m lib! + 1", import)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TypeKindError);
    assert_eq!(error.location, Some([2, 4]));
    assert!(interpreter.environment().resolve("lib!x").is_some());
    Ok(())
}

#[test]
fn crlf_scripts_run() -> Result<(), OsakerError> {
    let mut interpreter = Interpreter::new();
    let lines = run(
        &mut interpreter,
        ":o quote <-- 'say \"hi\"' ~nyan\r\n:o n <-- 2 ~chiyo\r\n:< quote\r\n:< n\r\n",
    )?;
    assert_eq!(lines, vec!["quote <-- 'say \"hi\"' ~nyan", "n <-- 2 ~chiyo"]);
    Ok(())
}
