/*!
Building a [`Grammar`] out of a declared [`Signature`].

A signature lists the parameters of a target function, in order: required
parameters, then optional parameters with their defaults, then at most one
variadic parameter. Building it derives the command-line tokens for every
optional parameter and checks that the declaration makes sense.
 */

use std::{collections::HashMap, fmt, sync::Arc};

use tracing::debug;

use crate::{
    defaults_file::DefaultsFile,
    errors::ConfigurationError,
    value::{OptionType, Value},
};

/// Tokens that request the help message. Always available.
pub const HELP_TOKENS: [&str; 2] = ["--help", "-?"];

/// Tokens that request the version. Only available when the signature has a
/// version.
pub const VERSION_TOKENS: [&str; 2] = ["--version", "-V"];

/// What kind of parameter a [`ParameterSpec`] declares
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    /// Must be given on every invocation, positionally
    Required,

    /// Exposed as a command-line option, with a default
    Optional { default: Value },

    /// Collects every extra positional argument
    Variadic,

    /// A keyword catch-all. These can't be expressed on the command line, so
    /// building a grammar with one always fails.
    Keywords,
}

/// A single declared parameter of a target function
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
}

/// A value for the docstring placeholders. Computed variables are evaluated
/// each time the grammar is run.
#[derive(Clone)]
pub enum Variable {
    Fixed(String),
    Computed(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Variable {
    pub fn resolve(&self) -> String {
        match self {
            Variable::Fixed(value) => value.clone(),
            Variable::Computed(compute) => compute(),
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Variable::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/**
The declaration of a target function: its parameters, in order, plus the
things that decorate it (docstring, version, placeholder variables, alias
overrides, and override sources).

```
use clinch::Signature;

let grammar = Signature::new("example")
    .required("p1")
    .required("p2")
    .optional("first_option", "default_value")
    .optional("second_option", 5)
    .optional("third_option", [4, 3])
    .optional("last_option", false)
    .doc("Help docstring")
    .build()
    .unwrap();

assert_eq!(grammar.option_for("-s").unwrap().name(), "second_option");
```
*/
#[derive(Debug, Clone, Default)]
pub struct Signature {
    program: String,
    parameters: Vec<ParameterSpec>,
    aliases: Vec<(String, Vec<String>)>,
    doc: Option<String>,
    version: Option<Variable>,
    variables: Vec<(String, Variable)>,
    env_prefix: Option<String>,
    defaults_file: Option<DefaultsFile>,
}

impl Signature {
    /// Start a signature for a program. The program name is shown in usage
    /// messages.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Add any kind of parameter
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Add a required positional parameter
    #[must_use]
    pub fn required(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterSpec {
            name: name.into(),
            kind: ParameterKind::Required,
        })
    }

    /// Add an optional parameter. Its type is the type of the default.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.parameter(ParameterSpec {
            name: name.into(),
            kind: ParameterKind::Optional {
                default: default.into(),
            },
        })
    }

    /// Add a variadic parameter, which collects any extra positionals
    #[must_use]
    pub fn variadic(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterSpec {
            name: name.into(),
            kind: ParameterKind::Variadic,
        })
    }

    /// Declare a keyword catch-all. Grammars don't support these.
    #[must_use]
    pub fn keywords(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterSpec {
            name: name.into(),
            kind: ParameterKind::Keywords,
        })
    }

    /// Replace the automatic short alias of an optional parameter with an
    /// explicit list (which may be empty). Each alias `x` becomes `-x`.
    /// Calling this again for the same parameter adds to its list.
    #[must_use]
    pub fn alias<I>(mut self, name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let name = name.into().to_lowercase();
        let aliases = aliases.into_iter().map(Into::into);

        match self.aliases.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => existing.extend(aliases),
            None => self.aliases.push((name, aliases.collect())),
        }

        self
    }

    /// The docstring shown in the help message. It may contain `{name}`
    /// placeholders for [variables][Signature::variable].
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Enable `--version` / `-V`, printing this version. Also available to
    /// the docstring as `{VERSION}`.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(Variable::Fixed(version.into()));
        self
    }

    /// Like [`version`][Signature::version], but computed each run
    #[must_use]
    pub fn version_with(mut self, version: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.version = Some(Variable::Computed(Arc::new(version)));
        self
    }

    /// Add a placeholder variable for the docstring
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables
            .push((name.into(), Variable::Fixed(value.into())));
        self
    }

    /// Add a placeholder variable that is computed each run
    #[must_use]
    pub fn variable_with(
        mut self,
        name: impl Into<String>,
        value: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.variables
            .push((name.into(), Variable::Computed(Arc::new(value))));
        self
    }

    /// Read overrides for each option `name` from the environment variable
    /// `<PREFIX>_<NAME>`.
    #[must_use]
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Read overrides from a defaults file
    #[must_use]
    pub fn defaults_file(mut self, file: DefaultsFile) -> Self {
        self.defaults_file = Some(file);
        self
    }

    /// Check the signature and derive its grammar.
    pub fn build(self) -> Result<Grammar, ConfigurationError> {
        let mut required = Vec::new();
        let mut options: Vec<OptionSpec> = Vec::new();
        let mut variadic: Option<String> = None;
        let mut seen: Vec<String> = Vec::new();

        for ParameterSpec { name, kind } in self.parameters {
            if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(ConfigurationError::InvalidName(name));
            }

            if let ParameterKind::Keywords = kind {
                return Err(ConfigurationError::Keywords(name));
            }

            if let Some(variadic) = &variadic {
                return Err(ConfigurationError::AfterVariadic {
                    parameter: name,
                    variadic: variadic.clone(),
                });
            }

            if seen.iter().any(|seen| seen.eq_ignore_ascii_case(&name)) {
                return Err(ConfigurationError::Duplicate(name));
            }
            seen.push(name.clone());

            match kind {
                ParameterKind::Required if !options.is_empty() => {
                    return Err(ConfigurationError::RequiredAfterOptional(name));
                }
                ParameterKind::Required => required.push(name),
                ParameterKind::Optional { default } => {
                    let name = name.to_lowercase();

                    if default == Value::Bool(true) {
                        return Err(ConfigurationError::TrueBoolean(name));
                    }

                    options.push(OptionSpec::new(name, default));
                }
                ParameterKind::Variadic => variadic = Some(name),
                ParameterKind::Keywords => unreachable!("keywords were rejected above"),
            }
        }

        if let Some((name, _)) = self
            .aliases
            .iter()
            .find(|(name, _)| !options.iter().any(|option| option.name == *name))
        {
            return Err(ConfigurationError::UnknownAlias(name.clone()));
        }

        if let Some((name, _)) = self
            .aliases
            .iter()
            .find(|(_, aliases)| aliases.iter().any(String::is_empty))
        {
            return Err(ConfigurationError::EmptyAlias(name.clone()));
        }

        let table = OptionTable::derive(&mut options, &self.aliases);

        let tokens: Vec<Vec<String>> = options
            .iter()
            .map(|option| option.tokens().collect())
            .collect();

        debug!(
            program = %self.program,
            required = ?required,
            options = ?tokens,
            variadic = ?variadic,
            "built grammar"
        );

        Ok(Grammar {
            program: self.program,
            doc: self.doc,
            required,
            options,
            variadic,
            table,
            version: self.version,
            variables: self.variables,
            env_prefix: self.env_prefix,
            defaults_file: self.defaults_file,
        })
    }
}

/// A single optional parameter, as it appears on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    name: String,
    primary: String,
    aliases: Vec<String>,
    default: Value,
    kind: OptionType,
}

impl OptionSpec {
    fn new(name: String, default: Value) -> Self {
        let primary = match name.chars().count() {
            1 => format!("-{name}"),
            _ => format!("--{}", name.replace('_', "-")),
        };

        Self {
            kind: default.option_type(),
            name,
            primary,
            aliases: Vec::new(),
            default,
        }
    }

    /// The parameter name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The main token: `--dash-name`, or `-x` for one-character names
    #[inline]
    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// The short aliases, without their leading `-`
    #[inline]
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[inline]
    #[must_use]
    pub fn default(&self) -> &Value {
        &self.default
    }

    #[inline]
    #[must_use]
    pub fn option_type(&self) -> &OptionType {
        &self.kind
    }

    /// Every token that resolves to this option, primary first
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.primary.clone())
            .chain(self.aliases.iter().map(|alias| format!("-{alias}")))
    }
}

/// Maps every command-line token to the index of its option.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    tokens: HashMap<String, usize>,
}

impl OptionTable {
    /// Register every primary token, then the short aliases in declaration
    /// order. A short alias that is already taken (or reserved) is silently
    /// skipped, so the first option to claim a letter keeps it.
    fn derive(options: &mut [OptionSpec], explicit: &[(String, Vec<String>)]) -> Self {
        let mut tokens: HashMap<String, usize> = options
            .iter()
            .enumerate()
            .map(|(index, option)| (option.primary.clone(), index))
            .collect();

        for (index, option) in options.iter_mut().enumerate() {
            let listed = explicit.iter().find(|(name, _)| *name == option.name);

            let requested: Vec<String> = match listed {
                Some((_, aliases)) => aliases.clone(),
                None => match option.name.chars().next() {
                    Some(first) if option.name.chars().count() > 1 => vec![first.to_string()],
                    _ => Vec::new(),
                },
            };

            for alias in requested {
                let token = format!("-{alias}");

                if tokens.contains_key(&token)
                    || HELP_TOKENS.contains(&token.as_str())
                    || VERSION_TOKENS.contains(&token.as_str())
                {
                    continue;
                }

                tokens.insert(token, index);
                option.aliases.push(alias);
            }
        }

        Self { tokens }
    }

    /// Find the option index for a token
    #[inline]
    #[must_use]
    pub fn get(&self, token: &str) -> Option<usize> {
        self.tokens.get(token).copied()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    /// The number of tokens in the table
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// The immutable command-line grammar of a single target. Built once with
/// [`Signature::build`], then run any number of times.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) program: String,
    pub(crate) doc: Option<String>,
    pub(crate) required: Vec<String>,
    pub(crate) options: Vec<OptionSpec>,
    pub(crate) variadic: Option<String>,
    pub(crate) table: OptionTable,
    pub(crate) version: Option<Variable>,
    pub(crate) variables: Vec<(String, Variable)>,
    pub(crate) env_prefix: Option<String>,
    pub(crate) defaults_file: Option<DefaultsFile>,
}

impl Grammar {
    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[inline]
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The required parameter names, in order
    #[inline]
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// The optional parameters, in declaration order
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    #[inline]
    #[must_use]
    pub fn variadic(&self) -> Option<&str> {
        self.variadic.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn table(&self) -> &OptionTable {
        &self.table
    }

    /// True if `--version` is available
    #[inline]
    #[must_use]
    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    /// Find the option that a token resolves to
    #[must_use]
    pub fn option_for(&self, token: &str) -> Option<&OptionSpec> {
        self.table.get(token).map(|index| &self.options[index])
    }

    /// Find an option by its parameter name
    #[must_use]
    pub fn option_named(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.name == name)
    }

    /// Evaluate the placeholder variables (and the version, as `VERSION`)
    /// for a single run.
    #[must_use]
    pub fn resolve_variables(&self) -> Variables {
        let mut variables = Variables::default();

        if let Some(version) = &self.version {
            variables.set("VERSION", version.resolve());
        }

        for (name, variable) in &self.variables {
            variables.set(name, variable.resolve());
        }

        variables
    }
}

/// Resolved placeholder variables for a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: Vec<(String, String)>,
}

impl Variables {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.values.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// The resolved version, if the grammar has one
    #[inline]
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.get("VERSION")
    }
}
