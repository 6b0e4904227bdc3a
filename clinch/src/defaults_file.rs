/*!
Defaults files: a flat mapping of option names to values, read from a file
and layered between the environment and the command line.

A [`DefaultsFile`] is either *explicit* (an absolute path, or a name inside
a configured directory), in which case a missing or broken file is an error,
or *searched*, in which case it's looked up in a list of [`SearchPaths`] and
silently skipped when absent.

The file format is pluggable through [`DefaultsFormat`]. Files ending in
`.json` are read with [`Json`]; everything else is read with
[`Assignments`].
 */

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{errors::RunnerError, grammar::Grammar, literal, value::Value};

/// The contents of a defaults file couldn't be understood
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("line {line}: {reason}")]
    Line { line: usize, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("expected an object at the top level")]
    NotAnObject,

    #[error("key '{key}' has a value that isn't a literal")]
    NotALiteral { key: String },
}

/// A parser for the contents of a defaults file. Produces a flat list of
/// `option name → value` pairs, in file order.
pub trait DefaultsFormat {
    fn parse(&self, text: &str) -> Result<Vec<(String, Value)>, FormatError>;
}

/**
The default format: one `name = literal` assignment per line. Blank lines and
lines starting with `#` are ignored.

```text
# defaults for my program
first_option = 'from the file'
second-option = 12
sizes = [16, 9]
```
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct Assignments;

impl DefaultsFormat for Assignments {
    fn parse(&self, text: &str) -> Result<Vec<(String, Value)>, FormatError> {
        text.lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .map(|(line, content)| -> Result<(String, Value), FormatError> {
                let (key, value) = content.split_once('=').ok_or_else(|| FormatError::Line {
                    line,
                    reason: "expected 'name = value'".to_owned(),
                })?;

                let value = literal::parse(value).map_err(|error| FormatError::Line {
                    line,
                    reason: error.to_string(),
                })?;

                Ok((key.trim().to_owned(), value))
            })
            .collect()
    }
}

/// A JSON object whose values are strings, numbers, booleans, or arrays of
/// those.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl DefaultsFormat for Json {
    fn parse(&self, text: &str) -> Result<Vec<(String, Value)>, FormatError> {
        let parsed: serde_json::Value = serde_json::from_str(text)?;

        let serde_json::Value::Object(object) = parsed else {
            return Err(FormatError::NotAnObject);
        };

        object
            .into_iter()
            .map(|(key, value)| match from_json(value) {
                Some(value) => Ok((key, value)),
                None => Err(FormatError::NotALiteral { key }),
            })
            .collect()
    }
}

fn from_json(value: serde_json::Value) -> Option<Value> {
    use serde_json::Value as J;

    match value {
        J::String(s) => Some(Value::Str(s)),
        J::Bool(b) => Some(Value::Bool(b)),
        J::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float)),
        J::Array(items) => items
            .into_iter()
            .map(from_json)
            .collect::<Option<_>>()
            .map(Value::List),
        J::Null | J::Object(_) => None,
    }
}

/// Where a [`DefaultsFile`] is looked for, when it isn't explicit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    directories: Vec<PathBuf>,
}

impl SearchPaths {
    #[must_use]
    pub fn new(directories: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
        }
    }

    /// The usual search path for a program: the working directory, then the
    /// user's configuration directory for the program, then `/etc/<program>`.
    #[must_use]
    pub fn for_program(program: &str) -> Self {
        let directories = [
            std::env::current_dir().ok(),
            dirs::config_dir().map(|dir| dir.join(program)),
            Some(Path::new("/etc").join(program)),
        ];

        Self {
            directories: directories.into_iter().flatten().collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }
}

/// A defaults file that was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// An explicit file. Problems with it are errors.
    Explicit(PathBuf),

    /// A file found in the search paths. Problems with it are warnings.
    Searched(PathBuf),
}

impl Located {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Located::Explicit(path) | Located::Searched(path) => path,
        }
    }
}

/// The configuration of a defaults file for a grammar
#[derive(Clone)]
pub struct DefaultsFile {
    name: PathBuf,
    directory: Option<PathBuf>,
    format: Option<Arc<dyn DefaultsFormat + Send + Sync>>,
}

impl DefaultsFile {
    /// A defaults file with this name. An absolute path is explicit;
    /// anything else is looked for in the search paths.
    pub fn named(name: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: None,
            format: None,
        }
    }

    /// Look for the file only in this directory. This makes the file
    /// explicit.
    #[must_use]
    pub fn in_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Use this format instead of choosing one from the file extension
    #[must_use]
    pub fn with_format(mut self, format: impl DefaultsFormat + Send + Sync + 'static) -> Self {
        self.format = Some(Arc::new(format));
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// Find the file. Returns `Ok(None)` if a searched file wasn't found in
    /// any of the search paths.
    pub fn locate(&self, search: &SearchPaths) -> Result<Option<Located>, RunnerError> {
        let explicit = match &self.directory {
            Some(directory) => Some(directory.join(&self.name)),
            None if self.name.is_absolute() => Some(self.name.clone()),
            None => None,
        };

        match explicit {
            Some(path) if path.is_file() => Ok(Some(Located::Explicit(path))),
            Some(path) => Err(RunnerError::DefaultsFileMissing { path }),
            None => Ok(search
                .directories()
                .iter()
                .map(|directory| directory.join(&self.name))
                .find(|path| path.is_file())
                .map(Located::Searched)),
        }
    }

    /// Read and parse the file at `path`, with the configured format
    pub fn read(&self, path: &Path) -> Result<Vec<(String, Value)>, RunnerError> {
        let failed = |reason: String| RunnerError::DefaultsFile {
            path: path.to_owned(),
            reason,
        };

        let text = fs::read_to_string(path).map_err(|error| failed(error.to_string()))?;

        let parsed = match &self.format {
            Some(format) => format.parse(&text),
            None => match path.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => Json.parse(&text),
                _ => Assignments.parse(&text),
            },
        };

        parsed.map_err(|error| failed(error.to_string()))
    }
}

impl fmt::Debug for DefaultsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultsFile")
            .field("name", &self.name)
            .field("directory", &self.directory)
            .field("format", &self.format.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Grammar {
    /**
    Match the entries of a defaults file to the options of this grammar.
    Returns one slot per option, in declaration order. Keys may be written
    with `-` or `_`; unknown keys are skipped with a warning. Values have to
    fit the type of their option (integers are widened to floats).
    */
    pub fn file_overrides(
        &self,
        path: &Path,
        entries: Vec<(String, Value)>,
    ) -> Result<Vec<Option<Value>>, RunnerError> {
        let mut values = vec![None; self.options().len()];

        for (key, value) in entries {
            let name = key.to_lowercase().replace('-', "_");

            let Some(index) = self.options().iter().position(|option| option.name() == name)
            else {
                warn!(path = %path.display(), key = %key, "unknown key in defaults file");
                continue;
            };

            let option = &self.options()[index];

            let value = option.option_type().conform(value).map_err(|value| {
                RunnerError::WrongOverrideType {
                    option: option.name().to_owned(),
                    source_name: format!("defaults file '{}'", path.display()),
                    value,
                    expected: option.option_type().clone(),
                }
            })?;

            debug!(path = %path.display(), key = %key, %value, "defaults file override");
            values[index] = Some(value);
        }

        Ok(values)
    }
}
