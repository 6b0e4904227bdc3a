use tracing::debug;

use crate::{
    errors::{AccessError, RunnerError},
    from_args::Request,
    grammar::Grammar,
    state::ParsedArguments,
    value::Value,
};

/// An owned copy of the process arguments, for the parser to borrow from.
#[derive(Debug, Clone, Default)]
pub struct LoadedArguments {
    arguments: Vec<String>,
}

impl LoadedArguments {
    /// Load the arguments of the current process. Arguments that aren't
    /// valid unicode are converted lossily.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            arguments: std::env::args_os()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
        }
    }

    /// The program name, as it was invoked
    #[must_use]
    pub fn argv0(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    /// Every argument after the program name
    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().skip(1).map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LoadedArguments {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            arguments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Types that can be read out of a [`Value`] by [`Arguments::get`]
pub trait FromValue: Sized {
    /// The type name used in error messages
    const TYPE: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const TYPE: &'static str = "str";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for bool {
    const TYPE: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    const TYPE: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for f64 {
    const TYPE: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for Value {
    const TYPE: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TYPE: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

/**
The fully assembled arguments of a single call: the required values, the
final value of every option, and the variadic values. This is what a target
receives.

```
use clinch::{Signature, Value};

let grammar = Signature::new("prog")
    .required("path")
    .optional("count", 1)
    .variadic("rest")
    .build()
    .unwrap();

let arguments = grammar.assemble_from(["file", "x", "-c", "3"]).unwrap();

assert_eq!(arguments.get::<String>("path").unwrap(), "file");
assert_eq!(arguments.get::<i64>("count").unwrap(), 3);
assert_eq!(arguments.variadic(), ["x"]);
assert_eq!(
    arguments.into_call(),
    [Value::from("file"), Value::Int(3), Value::from("x")]
);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    required: Vec<(String, String)>,
    options: Vec<(String, Value)>,
    variadic: Vec<String>,
}

impl Arguments {
    /// Get a required parameter or an option by name
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, AccessError> {
        let required = self
            .required
            .iter()
            .find(|(required, _)| required == name)
            .map(|(_, value)| Value::Str(value.clone()));

        let value = match required {
            Some(ref value) => Some(value),
            None => self
                .options
                .iter()
                .find(|(option, _)| option == name)
                .map(|(_, value)| value),
        };

        value.and_then(T::from_value).ok_or_else(|| AccessError {
            name: name.to_owned(),
            expected: T::TYPE,
        })
    }

    /// The required parameters, in order
    pub fn required(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Every option with its final value, in declaration order
    pub fn options(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    #[inline]
    #[must_use]
    pub fn variadic(&self) -> &[String] {
        &self.variadic
    }

    /// Flatten into positional call order: required values, then options in
    /// declaration order, then variadic values.
    #[must_use]
    pub fn into_call(self) -> Vec<Value> {
        let required = self.required.into_iter().map(|(_, value)| Value::Str(value));
        let options = self.options.into_iter().map(|(_, value)| value);
        let variadic = self.variadic.into_iter().map(Value::Str);

        required.chain(options).chain(variadic).collect()
    }
}

impl Grammar {
    /**
    Layer every source of option values into the final arguments. For each
    option the first of these that is present wins: the command line, the
    defaults file, the environment, the declared default.

    `environment` and `file` hold one slot per option, in declaration order.
    */
    #[must_use]
    pub fn assemble(
        &self,
        parsed: &ParsedArguments<'_>,
        environment: Vec<Option<Value>>,
        file: Vec<Option<Value>>,
    ) -> Arguments {
        let options = self
            .options()
            .iter()
            .zip(environment)
            .zip(file)
            .enumerate()
            .map(|(index, ((option, environment), file))| {
                let value = parsed
                    .option(index)
                    .cloned()
                    .or(file)
                    .or(environment)
                    .unwrap_or_else(|| option.default().clone());

                (option.name().to_owned(), value)
            })
            .collect();

        let arguments = Arguments {
            required: self
                .required()
                .iter()
                .cloned()
                .zip(parsed.positional().iter().map(|&arg| arg.to_owned()))
                .collect(),
            options,
            variadic: parsed.variadic().iter().map(|&arg| arg.to_owned()).collect(),
        };

        debug!(call = ?arguments, "assembled call parameters");
        arguments
    }

    /// Parse a command line and assemble it with only the declared
    /// defaults. Help and version requests are reported as errors.
    pub fn assemble_from<'arg>(
        &self,
        args: impl IntoIterator<Item = &'arg str>,
    ) -> Result<Arguments, RunnerError> {
        match self.parse(args)? {
            Request::Run(parsed) => {
                let empty = || vec![None; self.options().len()];
                Ok(self.assemble(&parsed, empty(), empty()))
            }
            Request::Help | Request::Version => Err(RunnerError::usage(
                "help and version requests can't be assembled into a call",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Signature;

    fn grammar() -> Grammar {
        Signature::new("test")
            .required("p1")
            .required("p2")
            .optional("first_option", "default_value")
            .optional("second_option", 5)
            .optional("third_option", [4, 3])
            .optional("last_option", false)
            .build()
            .unwrap()
    }

    #[test]
    fn empty_command_line_gives_defaults_in_order() {
        let arguments = grammar().assemble_from(["a", "b"]).unwrap();

        assert_eq!(
            arguments.into_call(),
            [
                Value::from("a"),
                Value::from("b"),
                Value::from("default_value"),
                Value::Int(5),
                Value::from([4, 3]),
                Value::Bool(false),
            ]
        );
    }

    #[test]
    fn layering_precedence() {
        let grammar = grammar();
        let Request::Run(parsed) = grammar.parse(["a", "b", "-s", "1"]).unwrap() else {
            panic!("expected a run")
        };

        let environment = vec![
            Some(Value::from("env")),
            Some(Value::Int(2)),
            Some(Value::from([7, 7])),
            None,
        ];
        let file = vec![None, Some(Value::Int(3)), Some(Value::from([8, 8])), None];

        let arguments = grammar.assemble(&parsed, environment, file);

        assert_eq!(arguments.get::<String>("first_option").unwrap(), "env");
        assert_eq!(arguments.get::<i64>("second_option").unwrap(), 1);
        assert_eq!(arguments.get::<Vec<i64>>("third_option").unwrap(), [8, 8]);
        assert!(!arguments.get::<bool>("last_option").unwrap());
    }

    #[test]
    fn accessor_errors() {
        let arguments = grammar().assemble_from(["a", "b"]).unwrap();

        assert_eq!(arguments.get::<String>("p2").unwrap(), "b");
        assert_eq!(
            arguments.get::<i64>("first_option"),
            Err(AccessError {
                name: "first_option".to_owned(),
                expected: "int"
            })
        );
        assert!(arguments.get::<Value>("nope").is_err());
        assert_eq!(arguments.get::<f64>("second_option").unwrap(), 5.0);
    }

    #[test]
    fn loaded_arguments() {
        let loaded: LoadedArguments = ["prog", "a", "-b"].into_iter().collect();

        assert_eq!(loaded.argv0(), Some("prog"));
        assert_eq!(loaded.args().collect::<Vec<_>>(), ["a", "-b"]);
    }
}
