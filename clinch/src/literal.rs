/*!
A strict literal grammar, used to read option values out of environment
variables and defaults files:

```text
literal := string | bool | number | list
string  := '…' | "…"            (backslash escapes: \\ \' \" \n \t \r)
bool    := true | false | True | False
number  := [+-]? digits                        → int
         | [+-]? digits? . digits? exponent?   → float
list    := [ (literal (, literal)* ,?)? ]
         | ( (literal (, literal)* ,?)? )
```

Nothing else is evaluated; in particular there are no expressions.
 */

use core::{iter::Peekable, str::CharIndices};

use thiserror::Error;

use crate::value::Value;

/// The text wasn't a literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid literal at offset {offset}: {reason}")]
pub struct LiteralError {
    pub offset: usize,
    pub reason: &'static str,
}

/// Parse an entire string as a single literal. Leading and trailing
/// whitespace is allowed.
pub fn parse(input: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        input,
        chars: input.char_indices().peekable(),
    };

    let value = parser.literal()?;
    parser.skip_whitespace();

    match parser.chars.peek() {
        None => Ok(value),
        Some(&(offset, _)) => Err(LiteralError {
            offset,
            reason: "unexpected trailing characters",
        }),
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(offset, _)| offset)
            .unwrap_or(self.input.len())
    }

    fn error<T>(&mut self, reason: &'static str) -> Result<T, LiteralError> {
        Err(LiteralError {
            offset: self.offset(),
            reason,
        })
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn literal(&mut self) -> Result<Value, LiteralError> {
        self.skip_whitespace();

        match self.chars.peek() {
            None => self.error("expected a literal"),
            Some(&(_, quote @ ('\'' | '"'))) => {
                self.chars.next();
                self.string(quote)
            }
            Some(&(_, '[')) => {
                self.chars.next();
                self.list(']')
            }
            Some(&(_, '(')) => {
                self.chars.next();
                self.list(')')
            }
            Some(&(_, c)) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => self.number(),
            Some(&(_, c)) if c.is_alphabetic() => self.word(),
            Some(_) => self.error("unexpected character"),
        }
    }

    fn string(&mut self, quote: char) -> Result<Value, LiteralError> {
        let mut out = String::new();

        loop {
            match self.chars.next() {
                None => return self.error("unterminated string"),
                Some((_, c)) if c == quote => return Ok(Value::Str(out)),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, c @ ('\\' | '\'' | '"'))) => out.push(c),
                    Some((_, c)) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return self.error("unterminated string"),
                },
                Some((_, c)) => out.push(c),
            }
        }
    }

    fn list(&mut self, close: char) -> Result<Value, LiteralError> {
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();

            if self.chars.next_if(|&(_, c)| c == close).is_some() {
                return Ok(Value::List(items));
            }

            items.push(self.literal()?);
            self.skip_whitespace();

            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, c)) if c == close => return Ok(Value::List(items)),
                Some(_) => return self.error("expected ',' or the end of the list"),
                None => return self.error("unterminated list"),
            }
        }
    }

    /// Collect the characters of a bare token (number or word)
    fn bare(&mut self) -> (usize, &'a str) {
        let start = self.offset();

        while self
            .chars
            .next_if(|&(_, c)| c.is_alphanumeric() || matches!(c, '+' | '-' | '.' | '_'))
            .is_some()
        {}

        let end = self.offset();
        (start, &self.input[start..end])
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let (offset, token) = self.bare();

        let digits_only = token
            .trim_start_matches(['+', '-'])
            .chars()
            .all(|c| c.is_ascii_digit());

        let result = match digits_only {
            true => token.parse().map(Value::Int).ok(),
            false if token.chars().any(|c| c.is_ascii_digit()) => {
                token.parse().map(Value::Float).ok()
            }
            false => None,
        };

        result.ok_or(LiteralError {
            offset,
            reason: "invalid number",
        })
    }

    fn word(&mut self) -> Result<Value, LiteralError> {
        let (offset, token) = self.bare();

        match token {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            _ => Err(LiteralError {
                offset,
                reason: "unquoted word",
            }),
        }
    }
}
