/*!
The pieces of usage and help messages, as lazily formatted [`Display`]
values. Nothing here does any I/O; see [`printers`][crate::printers] for
writing them out.
 */

use core::fmt::{self, Display, Formatter, Write as _};

use joinery::JoinableIterator;
use lazy_format::lazy_format;

use crate::{
    grammar::{Grammar, HELP_TOKENS, OptionSpec, VERSION_TOKENS, Variables},
    value::OptionType,
};

/// An option with a primary token shorter than this can be shown inline in
/// the usage line, if it's the only option.
const INLINE_LIMIT: usize = 9;

/// How the options are summarized in the usage line
#[derive(Debug, Clone, Copy)]
pub enum OptionsSummary<'a> {
    /// There are no options
    None,

    /// A single short option, shown in full
    Inline(&'a OptionSpec),

    /// `[options]`, described in the Options block of the help message
    Deferred,
}

impl Grammar {
    #[must_use]
    pub fn options_summary(&self) -> OptionsSummary<'_> {
        match self.options() {
            [] => OptionsSummary::None,
            [option] if option.primary().chars().count() < INLINE_LIMIT => {
                OptionsSummary::Inline(option)
            }
            _ => OptionsSummary::Deferred,
        }
    }

    /// The usage line, without any prefix: `prog p1 p2 [options] [--help | -?]`
    pub fn usage(&self) -> impl Display + '_ {
        let summary = self.options_summary();

        let required = lazy_format!(" {name}" for name in self.required());

        let variadic = lazy_format!(match (self.variadic()) {
            None => "",
            Some(_) => " [varargs]",
        });

        let options = lazy_format!(match (summary) {
            OptionsSummary::None => "",
            OptionsSummary::Inline(option) => (" [{}]", option_line(option, 0)),
            OptionsSummary::Deferred => " [options]",
        });

        let version = lazy_format!(match ((self.has_version(), summary)) {
            (false, _) | (true, OptionsSummary::Deferred) => "",
            (true, _) => (" [{}]", VERSION_TOKENS.iter().join_with(" | ")),
        });

        lazy_format!(
            "{program}{required}{variadic}{options}{version} [{help}]",
            program = self.program(),
            help = HELP_TOKENS.iter().join_with(" | "),
        )
    }
}

/**
A single option, as shown in the Options block (and inline in the usage line):

```text
--second-option | -s <int> (default=5)
```

The primary token is padded to `width`.
*/
pub fn option_line(option: &OptionSpec, width: usize) -> impl Display + '_ {
    let aliases = lazy_format!(match (option.aliases()) {
        [] => "",
        aliases => (
            "| -{} ",
            aliases.iter().join_with(" | -")
        ),
    });

    let marker = lazy_format!(match (option.option_type()) {
        OptionType::Bool => "",
        kind => ("{} ", kind.marker()),
    });

    lazy_format!(
        "{primary:width$} {aliases}{marker}(default={default})",
        primary = option.primary(),
        default = option.default(),
    )
}

/// A reserved line at the end of the Options block, such as
/// `--help | -? print this help`
pub fn reserved_line<'a>(
    tokens: &'a [&'a str],
    width: usize,
    description: impl Display + 'a,
) -> impl Display + 'a {
    let (primary, aliases) = tokens.split_first().map_or(("", &[][..]), |(p, a)| (*p, a));

    lazy_format!(
        "{primary:width$} | {aliases} {description}",
        aliases = aliases.iter().join_with(" | "),
    )
}

/**
Fill the `{name}` placeholders of a docstring. `{{` and `}}` are literal
braces. Placeholders without a matching variable are left as they are.
*/
pub fn substitute<'a>(text: &'a str, variables: &'a Variables) -> impl Display + 'a {
    Substituted { text, variables }
}

struct Substituted<'a> {
    text: &'a str,
    variables: &'a Variables,
}

impl Display for Substituted<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut rest = self.text;

        while let Some(brace) = rest.find(['{', '}']) {
            f.write_str(&rest[..brace])?;
            let tail = &rest[brace..];

            if let Some(escaped) = tail.strip_prefix("{{").or_else(|| tail.strip_prefix("}}")) {
                f.write_char(tail.as_bytes()[0] as char)?;
                rest = escaped;
                continue;
            }

            let placeholder = tail
                .strip_prefix('{')
                .and_then(|inner| inner.split_once('}'))
                .and_then(|(name, after)| Some((self.variables.get(name)?, after)));

            match placeholder {
                Some((value, after)) => {
                    f.write_str(value)?;
                    rest = after;
                }
                None => {
                    f.write_str(&tail[..1])?;
                    rest = &tail[1..];
                }
            }
        }

        f.write_str(rest)
    }
}
