/*!
Error types for [`clinch`][crate].

[`ConfigurationError`] is a programmer error, found while building a grammar
from a [`Signature`][crate::Signature]. [`RunnerError`] is a user error, found
while parsing a command line; some of them are shown after a usage line and
some on their own (see [`RunnerError::shows_usage`]).
 */

use std::path::PathBuf;

use thiserror::Error;

use crate::value::{OptionType, Value};

/// A [`Signature`][crate::Signature] couldn't be turned into a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// Keyword catch-all parameters can't be expressed on the command line
    #[error("Keywords parameter '**{0}' is not allowed")]
    Keywords(String),

    /// An alias was given for something that isn't an optional parameter
    #[error("This option does not exist so can't be given an alias: {0}")]
    UnknownAlias(String),

    /// Boolean options are presence flags, so they always default to false
    #[error("Default value for boolean '{0}' must be 'False'")]
    TrueBoolean(String),

    #[error("Required parameter '{0}' must come before the optional parameters")]
    RequiredAfterOptional(String),

    #[error("Parameter '{parameter}' comes after the variadic parameter '{variadic}'")]
    AfterVariadic { parameter: String, variadic: String },

    #[error("Parameter '{0}' is declared more than once")]
    Duplicate(String),

    #[error("Invalid parameter name {0:?}")]
    InvalidName(String),

    #[error("Empty alias given for option '{0}'")]
    EmptyAlias(String),
}

/// An error in the command line (or in an override of it).
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum RunnerError {
    /// The same option was given twice, possibly through different aliases
    #[error("Option '{option}' found twice")]
    FoundTwice { option: String },

    #[error("Unrecognized option '{0}'")]
    UnrecognizedOption(String),

    #[error("Unrecognized parameter '{0}'")]
    UnrecognizedParameter(String),

    #[error("Too few parameters ({required} required)")]
    TooFewParameters { required: usize },

    /// A scalar option was last on the command line, or was followed by
    /// another option
    #[error("Option '{option}' should be followed by a {}", .expected.marker())]
    MissingValue {
        option: String,
        expected: OptionType,
    },

    #[error("Argument of option {option} has wrong type ({} expected)", .expected.marker())]
    WrongType {
        option: String,
        expected: OptionType,
    },

    /// An element of a list option couldn't be coerced. `position` counts
    /// from 1.
    #[error(
        "Argument {position} of option {option} has wrong type ({} expected)",
        .expected.marker()
    )]
    WrongElementType {
        option: String,
        position: usize,
        expected: OptionType,
    },

    /// A list option with an empty default got no elements
    #[error("Option '{option}' should be followed by a list of {}", .element.marker())]
    EmptyList { option: String, element: OptionType },

    /// A list option with a non-empty default got the wrong number of
    /// elements
    #[error(
        "Option '{option}' should be followed by a list of {expected} {}, found {found}",
        .element.marker()
    )]
    WrongCount {
        option: String,
        element: OptionType,
        expected: usize,
        found: usize,
    },

    /// An environment variable or defaults file gave a value that doesn't
    /// fit the option
    #[error(
        "Value {value} for option '{option}' from {source_name} has wrong type ({} expected)",
        .expected.marker()
    )]
    WrongOverrideType {
        option: String,
        source_name: String,
        value: Value,
        expected: OptionType,
    },

    #[error("Defaults file '{}' not found", .path.display())]
    DefaultsFileMissing { path: PathBuf },

    #[error("Could not load defaults file '{}': {reason}", .path.display())]
    DefaultsFile { path: PathBuf, reason: String },

    /// A target-specific error, shown after the usage line
    #[error("{0}")]
    Usage(String),

    /// A target-specific error, shown on its own
    #[error("{0}")]
    Message(String),
}

/// An [`Arguments`][crate::Arguments] accessor asked for a parameter that
/// doesn't exist, or with the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no parameter '{name}' of type {expected}")]
pub struct AccessError {
    pub name: String,
    pub expected: &'static str,
}

impl RunnerError {
    /// Create an error that is printed after the usage line
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Create an error that is printed on its own
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// True if the usage line should be printed before this error
    #[must_use]
    pub fn shows_usage(&self) -> bool {
        !matches!(
            self,
            Self::FoundTwice { .. }
                | Self::DefaultsFileMissing { .. }
                | Self::DefaultsFile { .. }
                | Self::Message(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let int = || OptionType::Int;

        assert_eq!(
            RunnerError::WrongType {
                option: "--second-option".to_owned(),
                expected: int()
            }
            .to_string(),
            "Argument of option --second-option has wrong type (<int> expected)"
        );

        assert_eq!(
            RunnerError::MissingValue {
                option: "-s".to_owned(),
                expected: int()
            }
            .to_string(),
            "Option '-s' should be followed by a <int>"
        );

        assert_eq!(
            RunnerError::WrongCount {
                option: "-t".to_owned(),
                element: int(),
                expected: 2,
                found: 0
            }
            .to_string(),
            "Option '-t' should be followed by a list of 2 <int>, found 0"
        );

        assert_eq!(
            RunnerError::EmptyList {
                option: "--files".to_owned(),
                element: OptionType::Str
            }
            .to_string(),
            "Option '--files' should be followed by a list of <str>"
        );
    }

    #[test]
    fn usage_classes() {
        assert!(RunnerError::UnrecognizedOption("-x".to_owned()).shows_usage());
        assert!(RunnerError::usage("nope").shows_usage());
        assert!(
            !RunnerError::FoundTwice {
                option: "-l".to_owned()
            }
            .shows_usage()
        );
        assert!(!RunnerError::message("nope").shows_usage());
    }
}
