/*!
Signature-driven command line parsing. Declare the parameters of a function,
and `clinch` derives a command line for it: long and short options with type
checking, a usage line and help message, version printing, and overrides from
environment variables and a defaults file.

```no_run
use clinch::{RunnerConfig, Signature};

fn main() -> anyhow::Result<()> {
    let grammar = Signature::new("resize")
        .required("path")
        .optional("size", [640, 480])
        .optional("quality", 0.8)
        .optional("dry_run", false)
        .doc("Resize an image. Version {VERSION}.")
        .version("1.0.0")
        .env_prefix("RESIZE")
        .build()?;

    grammar.run(&RunnerConfig::default(), |arguments| {
        let path: String = arguments.get("path")?;
        let size: Vec<i64> = arguments.get("size")?;
        println!("resizing {path} to {size:?}");
        Ok(())
    })?;

    Ok(())
}
```

A [`Signature`] lists required parameters, then optional parameters with
defaults, then optionally a variadic parameter. [`Signature::build`] checks it
and produces a [`Grammar`], which can be run any number of times. The type of
each option comes from its default; see [`Value`] and [`OptionType`].

Every option `name` gets a primary token `--name` (with `_` spelled as `-`)
and, usually, a short `-n` alias. For each option, the value comes from the
first of these that's present:

1. the command line
2. the defaults file ([`DefaultsFile`])
3. the environment (`<PREFIX>_<NAME>`, see [`Signature::env_prefix`])
4. the declared default
*/

pub mod arguments;
pub mod defaults_file;
pub mod errors;
pub mod from_args;
pub mod grammar;
pub mod help;
pub mod literal;
pub mod overrides;
pub mod printers;
pub mod runner;
pub mod state;
pub mod value;

pub use arguments::{Arguments, FromValue, LoadedArguments};
pub use defaults_file::{Assignments, DefaultsFile, DefaultsFormat, Json, SearchPaths};
pub use errors::{AccessError, ConfigurationError, RunnerError};
pub use from_args::Request;
pub use grammar::{Grammar, OptionSpec, ParameterKind, ParameterSpec, Signature};
pub use overrides::{Environment, ProcessEnvironment};
pub use runner::{RunnerConfig, Session, Status};
pub use value::{OptionType, Value};
