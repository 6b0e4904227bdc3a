mod error;

use std::{collections::HashMap, fs, path::PathBuf};

use clinch::{Arguments, DefaultsFile, RunnerConfig, RunnerError, Signature};
use lazy_format::lazy_format;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::TallyError;

const DOC: &str = "\
Count the words in one or more text files, and print the most common ones.

Options can also be set with TALLY_* environment variables, or in a tally.conf file. \
This is tally version {VERSION}.";

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn tally(arguments: Arguments) -> anyhow::Result<i32> {
    let top = arguments.get::<i64>("top")?;
    let min_length = arguments.get::<i64>("min_length")?;
    let ignore = arguments.get::<Vec<String>>("ignore")?;
    let case_sensitive = arguments.get::<bool>("case_sensitive")?;

    // Bad option values are the user's fault, so they come with a usage line
    if top < 1 {
        return Err(RunnerError::usage(TallyError::Top(top).to_string()).into());
    }
    let min_length = usize::try_from(min_length)
        .map_err(|_| RunnerError::usage(TallyError::MinLength(min_length).to_string()))?;

    let paths = std::iter::once(arguments.get::<String>("path")?)
        .chain(arguments.variadic().iter().cloned())
        .map(PathBuf::from);

    let mut counts: HashMap<String, usize> = HashMap::new();

    for path in paths {
        let text = fs::read_to_string(&path).map_err(|source| TallyError::Read {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), bytes = text.len(), "counting");

        text.split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|word| word.chars().count() >= min_length.max(1))
            .map(|word| match case_sensitive {
                true => word.to_owned(),
                false => word.to_lowercase(),
            })
            .filter(|word| !ignore.iter().any(|ignored| ignored == word))
            .for_each(|word| *counts.entry(word).or_default() += 1);
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then_with(|| a.cmp(b)));

    let width = counts
        .iter()
        .take(top as usize)
        .map(|(word, _)| word.chars().count())
        .max()
        .unwrap_or(0);

    for (word, count) in counts.iter().take(top as usize) {
        println!("{}", lazy_format!("{word:width$}  {count}"));
    }

    // Exit with 2 if nothing was counted, like grep does when nothing matches
    Ok(if counts.is_empty() { 2 } else { 0 })
}

fn signature() -> Signature {
    Signature::new("tally")
        .required("path")
        .optional("top", 10)
        .optional("min_length", 1)
        .optional("ignore", Vec::<String>::new())
        .optional("case_sensitive", false)
        .optional("debug", false)
        .variadic("more_paths")
        .alias("case_sensitive", ["C"])
        // `--debug` is checked before parsing, so it has no short form
        .alias("debug", Vec::<String>::new())
        .doc(DOC)
        .version(env!("CARGO_PKG_VERSION"))
        .env_prefix("TALLY")
        .defaults_file(DefaultsFile::named("tally.conf"))
}

fn main() -> anyhow::Result<()> {
    let debug_mode = std::env::args().any(|arg| arg == "--debug");
    init_tracing(debug_mode);

    let grammar = signature().build()?;
    let config = RunnerConfig::default().with_debug_mode(debug_mode);

    grammar.run(&config, tally)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_long_form_only() {
        let grammar = signature().build().unwrap();
        let debug = grammar.option_named("debug").unwrap();

        assert_eq!(debug.tokens().collect::<Vec<_>>(), ["--debug"]);
        assert!(grammar.option_for("-d").is_none());
        assert_eq!(grammar.option_for("-C").unwrap().name(), "case_sensitive");
    }
}
