use std::collections::HashMap;

use clinch::{
    Arguments, Grammar, RunnerConfig, RunnerError, SearchPaths, Session, Signature, Status, Value,
};

const DOC: &str = "Help docstring
";

const USAGE: &str = "usage: prog p1 p2 [options] [--help | -?]\n";

struct Ran {
    code: i32,
    stdout: String,
    stderr: String,
    call: Option<Vec<Value>>,
}

fn default_shorts() -> Signature {
    Signature::new("prog")
        .required("p1")
        .required("p2")
        .optional("first_option", "default_value")
        .optional("second_option", 5)
        .optional("third_option", [4, 3])
        .optional("last_option", false)
        .doc(DOC)
}

fn run_target<S: Status>(
    grammar: &Grammar,
    config: &RunnerConfig,
    command_line: &str,
    target: impl FnOnce(Arguments) -> anyhow::Result<S>,
) -> (anyhow::Result<i32>, String, String) {
    let environment = HashMap::<String, String>::new();
    let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
    let mut session = Session::new(
        &mut stdout,
        &mut stderr,
        &environment,
        SearchPaths::default(),
    );

    let result = grammar.run_with(command_line.split_whitespace(), &mut session, config, target);

    (
        result,
        String::from_utf8(stdout).unwrap(),
        String::from_utf8(stderr).unwrap(),
    )
}

/// Run a grammar with a target that records its call
fn run(grammar: &Grammar, command_line: &str) -> Ran {
    let mut call = None;
    let config = RunnerConfig::default().with_exit_on_completion(false);

    let (result, stdout, stderr) = run_target(grammar, &config, command_line, |arguments| {
        call = Some(arguments.into_call());
        Ok(())
    });

    Ran {
        code: result.unwrap(),
        stdout,
        stderr,
        call,
    }
}

fn call(values: &[Value]) -> Option<Vec<Value>> {
    Some(values.to_vec())
}

#[test]
fn defaults_only() {
    let ran = run(&default_shorts().build().unwrap(), "p1 p2");

    assert_eq!(ran.code, 0);
    assert_eq!(ran.stderr, "");
    assert_eq!(
        ran.call,
        call(&[
            "p1".into(),
            "p2".into(),
            "default_value".into(),
            5.into(),
            [4, 3].into(),
            false.into(),
        ])
    );
}

#[test]
fn all_options_long_and_short() {
    let grammar = default_shorts().build().unwrap();
    let expected = call(&[
        "p1".into(),
        "p2".into(),
        "specific_value".into(),
        10.into(),
        [16, 9].into(),
        true.into(),
    ]);

    let long = run(
        &grammar,
        "p1 p2 --third-option 16 9 --second-option 10 --first-option specific_value --last-option",
    );
    assert_eq!(long.code, 0);
    assert_eq!(long.call, expected);

    let short = run(&grammar, "p1 p2 -t 16 9 -s 10 -f specific_value -l");
    assert_eq!(short.code, 0);
    assert_eq!(short.call, expected);
}

#[test]
fn errors_with_usage() {
    let grammar = default_shorts().build().unwrap();

    let cases = [
        (
            "p1 p2 --second-option x",
            "Argument of option --second-option has wrong type (<int> expected)",
        ),
        ("p1 p2 -s x", "Argument of option -s has wrong type (<int> expected)"),
        (
            "p1 p2 --third-option 1 y",
            "Argument 2 of option --third-option has wrong type (<int> expected)",
        ),
        ("p1 p2 -t", "Option '-t' should be followed by a list of 2 <int>, found 0"),
        (
            "p1 p2 -t 1 2 3",
            "Option '-t' should be followed by a list of 2 <int>, found 3",
        ),
        ("p1 p2 p3", "Unrecognized parameter 'p3'"),
        ("p1", "Too few parameters (2 required)"),
        ("p1 p2 -s", "Option '-s' should be followed by a <int>"),
        ("-x p1 p2", "Unrecognized option '-x'"),
    ];

    for (command_line, message) in cases {
        let ran = run(&grammar, command_line);

        assert_eq!(ran.code, 1, "{command_line}");
        assert_eq!(ran.stdout, "", "{command_line}");
        assert_eq!(ran.stderr, format!("{USAGE}{message}\n"), "{command_line}");
        assert_eq!(ran.call, None, "{command_line}");
    }
}

#[test]
fn duplicate_option_has_no_usage() {
    let ran = run(&default_shorts().build().unwrap(), "p1 p2 -l --last-option");

    assert_eq!(ran.code, 1);
    assert_eq!(ran.stderr, "Option '--last-option' found twice\n");
    assert_eq!(ran.call, None);
}

#[test]
fn explicit_aliases() {
    let grammar = default_shorts()
        .alias("first_option", ["1"])
        .alias("second_option", ["2", "s", "so"])
        .build()
        .unwrap();

    let ran = run(&grammar, "p1 p2 -1 specific_value -so 12");
    assert_eq!(ran.code, 0);
    assert_eq!(
        ran.call,
        call(&[
            "p1".into(),
            "p2".into(),
            "specific_value".into(),
            12.into(),
            [4, 3].into(),
            false.into(),
        ])
    );

    let ran = run(&grammar, "p1 p2 -f x");
    assert_eq!(ran.stderr, format!("{USAGE}Unrecognized option '-f'\n"));
}

#[test]
fn help_request() {
    let grammar = default_shorts().build().unwrap();
    let ran = run(&grammar, "-?");

    assert_eq!(ran.code, 0);
    assert_eq!(ran.stderr, "");
    assert_eq!(ran.call, None);
    assert_eq!(
        ran.stdout,
        "\n  prog p1 p2 [options] [--help | -?]\n\
         \n  Help docstring\n\
         \n\
         Options:\n\
         --first-option  | -f <str> (default='default_value')\n\
         --second-option | -s <int> (default=5)\n\
         --third-option  | -t <list of int> (default=[4, 3])\n\
         --last-option   | -l (default=False)\n\
         --help          | -? print this help\n\
         \n"
    );

    assert_eq!(run(&grammar, "p1 --help").stdout, ran.stdout);
}

#[test]
fn version_request() {
    let grammar = Signature::new("prog")
        .required("p1")
        .required("p2")
        .optional("long_name_option", "default_value")
        .version("1.2.3")
        .build()
        .unwrap();

    let ran = run(&grammar, "-V");
    assert_eq!(ran.code, 0);
    assert_eq!(ran.stdout, "");
    assert_eq!(ran.stderr, "version 1.2.3 (prog)\n");
    assert_eq!(ran.call, None);

    let ran = run(&grammar, "p1");
    assert_eq!(ran.stderr, format!("{USAGE}Too few parameters (2 required)\n"));
}

#[test]
fn single_short_option_usage() {
    let grammar = Signature::new("prog")
        .required("p1")
        .required("p2")
        .optional("option", "default_value")
        .version("1.2.3")
        .build()
        .unwrap();

    let ran = run(&grammar, "p1");
    assert_eq!(
        ran.stderr,
        "usage: prog p1 p2 [--option | -o <str> (default='default_value')] \
         [--version | -V] [--help | -?]\n\
         Too few parameters (2 required)\n"
    );
}

#[test]
fn varargs() {
    let grammar = Signature::new("prog")
        .required("p1")
        .required("p2")
        .optional("option", "default_value")
        .variadic("varargs")
        .build()
        .unwrap();

    let ran = run(&grammar, "p1 p2 -o 123");
    assert_eq!(ran.call, call(&["p1".into(), "p2".into(), "123".into()]));

    let ran = run(&grammar, "p1 p2 p3 p4 -o 123");
    assert_eq!(
        ran.call,
        call(&[
            "p1".into(),
            "p2".into(),
            "123".into(),
            "p3".into(),
            "p4".into()
        ])
    );

    let ran = run(&grammar, "p1 p2 p3 p4 -o 123 -x");
    assert_eq!(ran.code, 1);
    assert_eq!(
        ran.stderr,
        "usage: prog p1 p2 [varargs] [--option | -o <str> (default='default_value')] \
         [--help | -?]\n\
         Unrecognized option '-x'\n"
    );
}

#[test]
fn status_codes() {
    let grammar = default_shorts().build().unwrap();
    let config = RunnerConfig::default().with_exit_on_completion(false);

    let (result, stdout, stderr) = run_target(&grammar, &config, "p1 p2 -l", |arguments| {
        Ok(match arguments.get::<bool>("last_option")? {
            true => 12i32,
            false => 0,
        })
    });

    assert_eq!(result.unwrap(), 12);
    assert_eq!(stdout, "");
    assert_eq!(stderr, "");

    let (result, _, _) = run_target(&grammar, &config, "p1 p2", |_| Ok(None::<i32>));
    assert_eq!(result.unwrap(), 0);
}

#[test]
fn target_errors() {
    let grammar = Signature::new("prog").build().unwrap();
    let config = RunnerConfig::default()
        .with_exit_on_completion(false)
        .with_error_code(3);

    let (result, stdout, stderr) = run_target(&grammar, &config, "", |_| -> anyhow::Result<()> {
        anyhow::bail!("I just raise")
    });

    assert_eq!(result.unwrap(), 3);
    assert_eq!(stdout, "");
    assert_eq!(stderr, "I just raise\n");

    let (result, _, stderr) = run_target(&grammar, &config, "", |_| -> anyhow::Result<()> {
        Err(RunnerError::message("plain failure").into())
    });

    assert_eq!(result.unwrap(), 3);
    assert_eq!(stderr, "plain failure\n");
}

#[test]
fn target_errors_escape_in_debug_mode() {
    let grammar = Signature::new("prog").build().unwrap();
    let config = RunnerConfig::default()
        .with_exit_on_completion(false)
        .with_debug_mode(true);

    let (result, stdout, stderr) = run_target(&grammar, &config, "", |_| -> anyhow::Result<()> {
        anyhow::bail!("I just raise")
    });

    assert_eq!(result.unwrap_err().to_string(), "I just raise");
    assert_eq!(stdout, "");
    assert_eq!(stderr, "I just raise\n");
}

#[test]
fn grammar_is_reusable() {
    let grammar = default_shorts().build().unwrap();

    let first = run(&grammar, "a b -s 1");
    let second = run(&grammar, "a b");

    assert_eq!(first.call.unwrap()[3], Value::Int(1));
    assert_eq!(second.call.unwrap()[3], Value::Int(5));
    assert_eq!(run(&grammar, "-?").stdout, run(&grammar, "-?").stdout);
}
