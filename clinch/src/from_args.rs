use clinch_parser::{ArgAccess, ArgumentsParser, Classification};
use tracing::trace;

use crate::{
    errors::RunnerError,
    grammar::{Grammar, HELP_TOKENS, VERSION_TOKENS},
    state::ParsedArguments,
};

/// The outcome of scanning a command line
#[derive(Debug, Clone, PartialEq)]
pub enum Request<'arg> {
    /// `--help` or `-?` was found
    Help,

    /// `--version` or `-V` was found, and the grammar has a version
    Version,

    /// Everything was parsed; the target can be called
    Run(ParsedArguments<'arg>),
}

impl Grammar {
    /// Decide what a token means for this grammar
    #[must_use]
    pub fn classify(&self, token: &str) -> Classification {
        if HELP_TOKENS.contains(&token) {
            Classification::Help
        } else if self.has_version() && VERSION_TOKENS.contains(&token) {
            Classification::Version
        } else if self.table().contains(token) {
            Classification::Option
        } else {
            Classification::Other
        }
    }

    /**
    Scan a command line (excluding the program name) in a single left to right
    pass. The first error stops the scan. A help or version request stops it
    too, even if there are problems later on the command line.

    Only the command line is considered here; see
    [`Grammar::assemble`][crate::Grammar::assemble] for layering in overrides.
    */
    pub fn parse<'arg>(
        &self,
        args: impl IntoIterator<Item = &'arg str>,
    ) -> Result<Request<'arg>, RunnerError> {
        let mut state = ParsedArguments::new(self);
        let mut parser = ArgumentsParser::new(args, |token: &str| self.classify(token));

        loop {
            let visitor = Visitor {
                grammar: self,
                state: &mut state,
            };

            match parser.next_arg(visitor) {
                None => break,
                Some(Ok(Flow::Continue)) => continue,
                Some(Ok(Flow::Help)) => return Ok(Request::Help),
                Some(Ok(Flow::Version)) => return Ok(Request::Version),
                Some(Err(error)) => return Err(error),
            }
        }

        match state.positional().len() < self.required().len() {
            true => Err(RunnerError::TooFewParameters {
                required: self.required().len(),
            }),
            false => Ok(Request::Run(state)),
        }
    }
}

enum Flow {
    Continue,
    Help,
    Version,
}

struct Visitor<'a, 'arg> {
    grammar: &'a Grammar,
    state: &'a mut ParsedArguments<'arg>,
}

impl<'arg> clinch_parser::Visitor<'arg> for Visitor<'_, 'arg> {
    type Value = Result<Flow, RunnerError>;

    fn visit_help(self, token: &'arg str) -> Self::Value {
        trace!(token, "help requested");
        Ok(Flow::Help)
    }

    fn visit_version(self, token: &'arg str) -> Self::Value {
        trace!(token, "version requested");
        Ok(Flow::Version)
    }

    fn visit_option(self, option: &'arg str, arguments: impl ArgAccess<'arg>) -> Self::Value {
        self.state
            .add_option(self.grammar, option, arguments)
            .map(|()| Flow::Continue)
    }

    fn visit_unrecognized_option(self, option: &'arg str) -> Self::Value {
        Err(RunnerError::UnrecognizedOption(option.to_owned()))
    }

    fn visit_positional(self, argument: &'arg str) -> Self::Value {
        self.state
            .add_positional(self.grammar, argument)
            .map(|()| Flow::Continue)
    }
}
