use std::io::{self, Write};

use indent_write::io::IndentWriter;
use lazy_format::lazy_format;
use textwrap::Options;

use crate::{
    errors::RunnerError,
    grammar::{Grammar, HELP_TOKENS, VERSION_TOKENS, Variables},
    help::{OptionsSummary, option_line, reserved_line, substitute},
};

/// Docstring lines this short (or shorter) are dropped from the help message
const SHORT_LINE: usize = 2;

/// Docstring lines are wrapped to this width, including their indentation
const WIDTH: usize = 80;

/// Write `usage: <usage line>`
pub fn write_usage(out: &mut (impl Write + ?Sized), grammar: &Grammar) -> io::Result<()> {
    writeln!(out, "usage: {}", grammar.usage())
}

/// Write an error, preceded by the usage line if the error calls for it.
pub fn write_error(
    out: &mut (impl Write + ?Sized),
    grammar: &Grammar,
    error: &RunnerError,
) -> io::Result<()> {
    if error.shows_usage() {
        write_usage(out, grammar)?;
    }

    writeln!(out, "{error}")
}

/// Write `version <version> (<program>)`
pub fn write_version(
    out: &mut (impl Write + ?Sized),
    grammar: &Grammar,
    variables: &Variables,
) -> io::Result<()> {
    match variables.version() {
        Some(version) => writeln!(out, "version {version} ({})", grammar.program()),
        None => Ok(()),
    }
}

/*
Overall structure:

  prog p1 p2 [options] [--help | -?]

  Docstring, wrapped to 80 columns, with
   continuation lines indented.

Options:
--first-option  | -f <str> (default='default_value')
--version       | -V print version (1.2.3)
--help          | -? print this help

 */
pub fn write_help(
    out: &mut (impl Write + ?Sized),
    grammar: &Grammar,
    variables: &Variables,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(IndentWriter::new("  ", &mut *out), "{}", grammar.usage())?;

    if let Some(doc) = grammar.doc() {
        writeln!(out)?;

        let doc = substitute(doc, variables).to_string();
        let options = Options::new(WIDTH - 2).subsequent_indent(" ");
        let mut indented = IndentWriter::new("  ", &mut *out);

        doc.lines()
            .map(str::trim)
            .filter(|line| line.chars().count() > SHORT_LINE)
            .try_for_each(|line| writeln!(indented, "{}", textwrap::fill(line, &options)))?;
    }

    writeln!(out)?;

    if let OptionsSummary::Deferred = grammar.options_summary() {
        write_options(out, grammar, variables)?;
        writeln!(out)?;
    }

    Ok(())
}

fn write_options(
    out: &mut (impl Write + ?Sized),
    grammar: &Grammar,
    variables: &Variables,
) -> io::Result<()> {
    let width = grammar
        .options()
        .iter()
        .map(|option| option.primary().chars().count())
        .max()
        .unwrap_or(0);

    writeln!(out, "Options:")?;

    grammar
        .options()
        .iter()
        .try_for_each(|option| writeln!(out, "{}", option_line(option, width)))?;

    if let Some(version) = variables.version() {
        let description = lazy_format!("print version ({version})");
        writeln!(out, "{}", reserved_line(&VERSION_TOKENS, width, description))?;
    }

    writeln!(out, "{}", reserved_line(&HELP_TOKENS, width, "print this help"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Signature;

    const DOC: &str = "
        Help docstring
    ";

    fn render(grammar: &Grammar) -> String {
        let mut out = Vec::new();
        write_help(&mut out, grammar, &grammar.resolve_variables()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn help() {
        let grammar = Signature::new("prog")
            .required("p1")
            .required("p2")
            .optional("first_option", "default_value")
            .optional("second_option", 5)
            .optional("third_option", [4, 3])
            .optional("last_option", false)
            .doc(DOC)
            .build()
            .unwrap();

        assert_eq!(
            render(&grammar),
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
    }

    #[test]
    fn help_with_version() {
        let grammar = Signature::new("prog")
            .required("p1")
            .required("p2")
            .optional("long_name_option", "default_value")
            .doc("Version {VERSION}: {message}")
            .version("1.2.3")
            .variable("message", "you can dynamically customize help message !")
            .build()
            .unwrap();

        let help = render(&grammar);

        assert!(help.contains("  Version 1.2.3: you can dynamically customize help message !\n"));
        assert!(help.contains(
            "Options:\n\
             --long-name-option | -l <str> (default='default_value')\n\
             --version          | -V print version (1.2.3)\n\
             --help             | -? print this help\n"
        ));
    }

    #[test]
    fn help_without_options_block() {
        let grammar = Signature::new("prog")
            .required("path")
            .optional("count", 1)
            .build()
            .unwrap();

        assert_eq!(
            render(&grammar),
            "\n  prog path [--count | -c <int> (default=1)] [--help | -?]\n\n"
        );
    }

    #[test]
    fn options_align_by_characters() {
        let grammar = Signature::new("prog")
            .optional("café_mode", false)
            .optional("other", 1)
            .build()
            .unwrap();

        assert!(render(&grammar).contains(
            "Options:\n\
             --café-mode | -c (default=False)\n\
             --other     | -o <int> (default=1)\n\
             --help      | -? print this help\n"
        ));
    }

    #[test]
    fn long_docstring_lines_wrap() {
        let grammar = Signature::new("prog")
            .doc("word ".repeat(30))
            .build()
            .unwrap();

        let help = render(&grammar);
        let lines: Vec<&str> = help.lines().skip(3).take_while(|l| !l.is_empty()).collect();

        assert!(lines.len() > 1);
        assert!(lines[0].starts_with("  word"));
        assert!(lines[1..].iter().all(|line| line.starts_with("   word")));
        assert!(lines.iter().all(|line| line.len() <= 80));
    }

    #[test]
    fn rendering_is_idempotent() {
        let grammar = Signature::new("prog")
            .optional("a_option", 1)
            .optional("b_option", [1.5])
            .doc("{VERSION}")
            .version_with(|| "computed".to_owned())
            .build()
            .unwrap();

        assert_eq!(render(&grammar), render(&grammar));
    }

    #[test]
    fn errors_with_and_without_usage() {
        let grammar = Signature::new("prog").required("p1").build().unwrap();

        let mut out = Vec::new();
        write_error(&mut out, &grammar, &RunnerError::TooFewParameters { required: 1 }).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "usage: prog p1 [--help | -?]\nToo few parameters (1 required)\n"
        );

        let mut out = Vec::new();
        write_error(&mut out, &grammar, &RunnerError::message("plain")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "plain\n");
    }

    #[test]
    fn version() {
        let grammar = Signature::new("prog").version("1.2.3").build().unwrap();

        let mut out = Vec::new();
        write_version(&mut out, &grammar, &grammar.resolve_variables()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "version 1.2.3 (prog)\n");
    }
}
