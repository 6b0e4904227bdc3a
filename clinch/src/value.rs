/*!
The closed set of values an option can hold, and the types derived from
them. The type of an option is decided once, from its declared default, and
every command-line argument for that option is coerced with the function for
that type.
 */

use core::fmt::{self, Display, Write as _};

use lazy_format::lazy_format;

use crate::literal;

/// A value held by an option: a default, an override, or a parsed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<Value>),
}

/// The type of an option, derived from its default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    Str,
    Bool,
    Int,
    Float,
    List(Box<OptionType>),
}

/// A single argument couldn't be coerced into the expected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionError;

impl Value {
    /// The type of options that use this value as their default. A list's
    /// element type is the type of its first element, or `str` if it's empty.
    #[must_use]
    pub fn option_type(&self) -> OptionType {
        match self {
            Value::Str(_) => OptionType::Str,
            Value::Bool(_) => OptionType::Bool,
            Value::Int(_) => OptionType::Int,
            Value::Float(_) => OptionType::Float,
            Value::List(items) => OptionType::List(Box::new(
                items
                    .first()
                    .map(Value::option_type)
                    .unwrap_or(OptionType::Str),
            )),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Get a float. Integers are widened.
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(f) => Some(f),
            Value::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl OptionType {
    /// The short name of the type, as used inside type markers
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            OptionType::Str => "str",
            OptionType::Bool => "bool",
            OptionType::Int => "int",
            OptionType::Float => "float",
            OptionType::List(_) => "list",
        }
    }

    /// The marker shown after an option in usage messages: `<int>`,
    /// `<list of str>`, or nothing at all for boolean flags.
    pub fn marker(&self) -> impl Display + '_ {
        lazy_format!(match (self) {
            OptionType::Bool => "",
            OptionType::List(element) => ("<list of {}>", element.name()),
            scalar => ("<{}>", scalar.name()),
        })
    }

    /// Convert a single command-line argument into a value of this type.
    pub fn coerce(&self, argument: &str) -> Result<Value, CoercionError> {
        match self {
            OptionType::Str => Ok(Value::Str(argument.to_owned())),
            OptionType::Bool => coerce_bool(argument),
            OptionType::Int => argument
                .trim()
                .parse()
                .map(Value::Int)
                .map_err(|_| CoercionError),
            OptionType::Float => argument
                .trim()
                .parse()
                .map(Value::Float)
                .map_err(|_| CoercionError),
            // A nested list has to be spelled out as a literal
            OptionType::List(_) => literal::parse(argument)
                .map_err(|_| CoercionError)
                .and_then(|value| self.conform(value).map_err(|_| CoercionError)),
        }
    }

    /// Check that a value (usually an override from a file or environment
    /// variable) fits this type. Integers are widened into floats. The value
    /// is handed back unchanged if it doesn't fit.
    pub fn conform(&self, value: Value) -> Result<Value, Value> {
        match (self, value) {
            (OptionType::Str, value @ Value::Str(_))
            | (OptionType::Bool, value @ Value::Bool(_))
            | (OptionType::Int, value @ Value::Int(_))
            | (OptionType::Float, value @ Value::Float(_)) => Ok(value),
            (OptionType::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (OptionType::List(element), Value::List(items)) => {
                let mut conformed = Vec::with_capacity(items.len());
                let mut items = items.into_iter();

                while let Some(item) = items.next() {
                    match element.conform(item) {
                        Ok(item) => conformed.push(item),
                        Err(item) => {
                            conformed.push(item);
                            conformed.extend(items);
                            return Err(Value::List(conformed));
                        }
                    }
                }

                Ok(Value::List(conformed))
            }
            (_, value) => Err(value),
        }
    }
}

fn coerce_bool(argument: &str) -> Result<Value, CoercionError> {
    match argument.trim() {
        "true" | "True" | "1" => Ok(Value::Bool(true)),
        "false" | "False" | "0" => Ok(Value::Bool(false)),
        _ => Err(CoercionError),
    }
}

/// Values are displayed in their literal form, which can be read back by
/// [`literal::parse`]: `'text'`, `5`, `2.5`, `True`, `[4, 3]`.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write_quoted(f, s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::List(items) => {
                f.write_char('[')?;
                items.iter().enumerate().try_for_each(|(i, item)| match i {
                    0 => write!(f, "{item}"),
                    _ => write!(f, ", {item}"),
                })?;
                f.write_char(']')
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = match s.contains('\'') && !s.contains('"') {
        true => '"',
        false => '\'',
    };

    f.write_char(quote)?;
    s.chars().try_for_each(|c| match c {
        '\\' => f.write_str("\\\\"),
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        c if c == quote => write!(f, "\\{c}"),
        c => f.write_char(c),
    })?;
    f.write_char(quote)
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(value: [T; N]) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}
