/*!
Running a target function against a command line: parse, layer in the
overrides, call the target, and turn whatever happened into an exit code.
 */

use std::{
    io::{self, Write},
    process,
};

use tracing::{debug, warn};

use crate::{
    arguments::{Arguments, LoadedArguments},
    defaults_file::{DefaultsFile, Located, SearchPaths},
    errors::RunnerError,
    from_args::Request,
    grammar::Grammar,
    overrides::{Environment, ProcessEnvironment},
    printers::{write_error, write_help, write_version},
    value::Value,
};

/// The name of the placeholder variable holding the path of the defaults
/// file that was found, if any
pub const DEFAULTS_PATH_VARIABLE: &str = "defaults_path_file";

/// Things that a target can return, and that turn into an exit code
pub trait Status {
    fn code(self) -> i32;
}

impl Status for () {
    fn code(self) -> i32 {
        0
    }
}

impl Status for i32 {
    fn code(self) -> i32 {
        self
    }
}

impl Status for u8 {
    fn code(self) -> i32 {
        self.into()
    }
}

impl Status for Option<i32> {
    fn code(self) -> i32 {
        self.unwrap_or(0)
    }
}

/// Runtime behavior of [`Grammar::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Errors from the target are returned to the caller after being
    /// reported, instead of becoming an exit code.
    pub debug_mode: bool,

    /// Exit the process with the resulting code when the run is over
    pub exit_on_completion: bool,

    /// The exit code used for every kind of error
    pub error_code: i32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            exit_on_completion: true,
            error_code: 1,
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn with_debug_mode(self, debug_mode: bool) -> Self {
        Self { debug_mode, ..self }
    }

    #[must_use]
    pub fn with_exit_on_completion(self, exit_on_completion: bool) -> Self {
        Self {
            exit_on_completion,
            ..self
        }
    }

    #[must_use]
    pub fn with_error_code(self, error_code: i32) -> Self {
        Self { error_code, ..self }
    }
}

/// Everything a run touches outside of the grammar itself
pub struct Session<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub environment: &'a dyn Environment,
    pub search_paths: SearchPaths,
}

impl<'a> Session<'a> {
    pub fn new(
        stdout: &'a mut dyn Write,
        stderr: &'a mut dyn Write,
        environment: &'a dyn Environment,
        search_paths: SearchPaths,
    ) -> Self {
        Self {
            stdout,
            stderr,
            environment,
            search_paths,
        }
    }
}

/// What to do once the command line has been handled
enum Outcome {
    Help,
    Version,
    Call(Arguments),
}

impl Grammar {
    /**
    Run `target` against the arguments, environment, and standard streams
    of the current process. With the default [`RunnerConfig`] this exits the
    process when it's done.
    */
    pub fn run<S, F>(&self, config: &RunnerConfig, target: F) -> anyhow::Result<i32>
    where
        S: Status,
        F: FnOnce(Arguments) -> anyhow::Result<S>,
    {
        let loaded = LoadedArguments::from_env();
        let stdout = io::stdout();
        let stderr = io::stderr();
        let mut stdout = stdout.lock();
        let mut stderr = stderr.lock();

        let mut session = Session::new(
            &mut stdout,
            &mut stderr,
            &ProcessEnvironment,
            SearchPaths::for_program(self.program()),
        );

        self.run_with(loaded.args(), &mut session, config, target)
    }

    /**
    Run `target` against an explicit command line (excluding the program
    name) and [`Session`].

    Returns the exit code. The only error returned is a target error in
    debug mode; it has already been reported on the session's error stream.
    */
    pub fn run_with<'arg, S, F>(
        &self,
        args: impl IntoIterator<Item = &'arg str>,
        session: &mut Session<'_>,
        config: &RunnerConfig,
        target: F,
    ) -> anyhow::Result<i32>
    where
        S: Status,
        F: FnOnce(Arguments) -> anyhow::Result<S>,
    {
        let result = match self.prepare(args, session) {
            Ok(Outcome::Help) => Ok(0),
            Ok(Outcome::Version) => Ok(0),
            Err(error) => {
                write_error(&mut *session.stderr, self, &error)?;
                Ok(config.error_code)
            }
            Ok(Outcome::Call(arguments)) => match target(arguments) {
                Ok(status) => Ok(status.code()),
                Err(error) => match error.downcast_ref::<RunnerError>() {
                    Some(error) => {
                        write_error(&mut *session.stderr, self, error)?;
                        Ok(config.error_code)
                    }
                    None => {
                        writeln!(&mut *session.stderr, "{error}")?;

                        match config.debug_mode {
                            true => Err(error),
                            false => Ok(config.error_code),
                        }
                    }
                },
            },
        };

        session.stdout.flush()?;
        session.stderr.flush()?;

        let code = result?;
        debug!(code, "run complete");

        if config.exit_on_completion {
            process::exit(code);
        }

        Ok(code)
    }

    /// Everything up to calling the target
    fn prepare<'arg>(
        &self,
        args: impl IntoIterator<Item = &'arg str>,
        session: &mut Session<'_>,
    ) -> Result<Outcome, RunnerError> {
        let mut variables = self.resolve_variables();

        let located = match &self.defaults_file {
            None => Ok(None),
            Some(file) => file.locate(&session.search_paths),
        };

        if let Ok(Some(located)) = &located {
            variables.set(DEFAULTS_PATH_VARIABLE, located.path().display().to_string());
        }

        let parsed = match self.parse(args)? {
            Request::Help => {
                write_help(&mut *session.stdout, self, &variables).map_err(io_error)?;
                return Ok(Outcome::Help);
            }
            Request::Version => {
                write_version(&mut *session.stderr, self, &variables).map_err(io_error)?;
                return Ok(Outcome::Version);
            }
            Request::Run(parsed) => parsed,
        };

        let environment = self.environment_overrides(session.environment)?;

        let file = match (located?, &self.defaults_file) {
            (Some(located), Some(file)) => {
                self.load_defaults(file, &located, &mut *session.stderr)?
            }
            _ => None,
        };

        let file = file.unwrap_or_else(|| vec![None; self.options().len()]);

        Ok(Outcome::Call(self.assemble(&parsed, environment, file)))
    }

    /// Read a located defaults file. Problems with a searched file are
    /// reported as warnings, and its values are skipped.
    fn load_defaults(
        &self,
        file: &DefaultsFile,
        located: &Located,
        stderr: &mut dyn Write,
    ) -> Result<Option<Vec<Option<Value>>>, RunnerError> {
        let path = located.path();

        let values = file
            .read(path)
            .and_then(|entries| self.file_overrides(path, entries));

        match (values, located) {
            (Ok(values), _) => Ok(Some(values)),
            (Err(error), Located::Explicit(_)) => Err(error),
            (Err(error), Located::Searched(_)) => {
                warn!(path = %path.display(), %error, "skipping defaults file");
                writeln!(stderr, "warning: {error}").map_err(io_error)?;
                Ok(None)
            }
        }
    }
}

fn io_error(error: io::Error) -> RunnerError {
    RunnerError::message(error.to_string())
}
