/*!
Option values that come from outside of the command line: environment
variables, read through the [`Environment`] trait. Defaults files live in
[`defaults_file`][crate::defaults_file].
 */

use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
};

use tracing::debug;

use crate::{errors::RunnerError, grammar::Grammar, literal, value::Value};

/// A source of environment variables
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// The environment of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<K, V, S> Environment for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.as_ref().to_owned())
    }
}

impl<K, V> Environment for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.as_ref().to_owned())
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, name: &str) -> Option<String> {
        E::var(self, name)
    }
}

/// The name of the environment variable for an option: `<PREFIX>_<NAME>`
#[must_use]
pub fn variable_name(prefix: &str, option: &str) -> String {
    format!("{prefix}_{option}").to_uppercase()
}

impl Grammar {
    /**
    Read an override for every option from the environment. Returns one slot
    per option, in declaration order; all of them are empty if the grammar
    has no environment prefix.

    A variable is first read as a literal (`'text'`, `5`, `[1, 2]`, ...). If
    that doesn't fit the option, the raw text is coerced the way a
    command-line argument would be, so that `APP_NAME=hello` works for a
    string option.
     */
    pub fn environment_overrides(
        &self,
        environment: &dyn Environment,
    ) -> Result<Vec<Option<Value>>, RunnerError> {
        let Some(prefix) = self.env_prefix.as_deref() else {
            return Ok(vec![None; self.options().len()]);
        };

        self.options()
            .iter()
            .map(|option| -> Result<Option<Value>, RunnerError> {
                let variable = variable_name(prefix, option.name());

                let Some(raw) = environment.var(&variable) else {
                    return Ok(None);
                };

                let kind = option.option_type();

                let value = literal::parse(&raw)
                    .ok()
                    .and_then(|value| kind.conform(value).ok())
                    .or_else(|| kind.coerce(&raw).ok())
                    .ok_or_else(|| RunnerError::WrongOverrideType {
                        option: option.name().to_owned(),
                        source_name: format!("environment variable {variable}"),
                        value: Value::Str(raw.clone()),
                        expected: kind.clone(),
                    })?;

                debug!(variable = %variable, %value, "environment override");
                Ok(Some(value))
            })
            .collect()
    }
}
