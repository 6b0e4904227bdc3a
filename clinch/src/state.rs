use clinch_parser::ArgAccess;

use crate::{
    errors::RunnerError,
    grammar::Grammar,
    value::{OptionType, Value},
};

/// The state of a single parse, in the middle of being built up from the
/// command line. Nothing here outlives the run that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArguments<'arg> {
    positional: Vec<&'arg str>,
    variadic: Vec<&'arg str>,

    /// One slot per option of the grammar, in declaration order
    options: Vec<Option<Value>>,
}

impl<'arg> ParsedArguments<'arg> {
    #[must_use]
    pub fn new(grammar: &Grammar) -> Self {
        Self {
            positional: Vec::with_capacity(grammar.required().len()),
            variadic: Vec::new(),
            options: vec![None; grammar.options().len()],
        }
    }

    /// Values for the required parameters, in order
    #[inline]
    #[must_use]
    pub fn positional(&self) -> &[&'arg str] {
        &self.positional
    }

    #[inline]
    #[must_use]
    pub fn variadic(&self) -> &[&'arg str] {
        &self.variadic
    }

    /// The value given on the command line for the option at `index`, if
    /// there was one
    #[inline]
    #[must_use]
    pub fn option(&self, index: usize) -> Option<&Value> {
        self.options.get(index).and_then(Option::as_ref)
    }

    /// Fill the next required slot, or else add to the variadic parameter.
    pub fn add_positional(
        &mut self,
        grammar: &Grammar,
        argument: &'arg str,
    ) -> Result<(), RunnerError> {
        if self.positional.len() < grammar.required().len() {
            self.positional.push(argument);
        } else if grammar.variadic().is_some() {
            self.variadic.push(argument);
        } else {
            return Err(RunnerError::UnrecognizedParameter(argument.to_owned()));
        }

        Ok(())
    }

    /// Handle the option `token`, pulling its arguments (if any) from
    /// `arguments`.
    pub fn add_option(
        &mut self,
        grammar: &Grammar,
        token: &'arg str,
        mut arguments: impl ArgAccess<'arg>,
    ) -> Result<(), RunnerError> {
        let index = grammar
            .table()
            .get(token)
            .ok_or_else(|| RunnerError::UnrecognizedOption(token.to_owned()))?;

        if self.options[index].is_some() {
            return Err(RunnerError::FoundTwice {
                option: token.to_owned(),
            });
        }

        let spec = &grammar.options()[index];

        let value = match spec.option_type() {
            OptionType::Bool => Value::Bool(true),
            OptionType::List(element) => {
                let expected = spec.default().as_list().map_or(0, <[Value]>::len);
                let items = take_list(token, element, &mut arguments)?;

                match (expected, items.len()) {
                    (0, 0) => {
                        return Err(RunnerError::EmptyList {
                            option: token.to_owned(),
                            element: (**element).clone(),
                        });
                    }
                    (0, _) => {}
                    (expected, found) if expected != found => {
                        return Err(RunnerError::WrongCount {
                            option: token.to_owned(),
                            element: (**element).clone(),
                            expected,
                            found,
                        });
                    }
                    _ => {}
                }

                Value::List(items)
            }
            scalar => {
                let argument = arguments.take().ok_or_else(|| RunnerError::MissingValue {
                    option: token.to_owned(),
                    expected: scalar.clone(),
                })?;

                scalar
                    .coerce(argument)
                    .map_err(|_| RunnerError::WrongType {
                        option: token.to_owned(),
                        expected: scalar.clone(),
                    })?
            }
        };

        self.options[index] = Some(value);
        Ok(())
    }
}

/// Take every argument up to the next known option, coercing each one.
fn take_list<'arg>(
    token: &str,
    element: &OptionType,
    arguments: &mut impl ArgAccess<'arg>,
) -> Result<Vec<Value>, RunnerError> {
    let mut items = Vec::new();

    while let Some(argument) = arguments.take() {
        let item = element
            .coerce(argument)
            .map_err(|_| RunnerError::WrongElementType {
                option: token.to_owned(),
                position: items.len() + 1,
                expected: element.clone(),
            })?;

        items.push(item);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::grammar::Signature;

    /// Hands out a fixed list of arguments
    struct Queue<'a>(VecDeque<&'a str>);

    impl<'a> ArgAccess<'a> for Queue<'a> {
        fn take(&mut self) -> Option<&'a str> {
            self.0.pop_front()
        }
    }

    fn grammar() -> Grammar {
        Signature::new("test")
            .required("p1")
            .optional("size", 5)
            .optional("pair", [4, 3])
            .optional("files", Vec::<String>::new())
            .optional("verbose", false)
            .build()
            .unwrap()
    }

    fn add<'a>(
        state: &mut ParsedArguments<'a>,
        grammar: &Grammar,
        token: &'a str,
        arguments: &[&'a str],
    ) -> Result<(), RunnerError> {
        state.add_option(grammar, token, Queue(arguments.iter().copied().collect()))
    }

    #[test]
    fn scalars_and_flags() {
        let grammar = grammar();
        let mut state = ParsedArguments::new(&grammar);

        add(&mut state, &grammar, "-s", &["10"]).unwrap();
        add(&mut state, &grammar, "--verbose", &[]).unwrap();

        assert_eq!(state.option(0), Some(&Value::Int(10)));
        assert_eq!(state.option(1), None);
        assert_eq!(state.option(3), Some(&Value::Bool(true)));
    }

    #[test]
    fn found_twice_through_an_alias() {
        let grammar = grammar();
        let mut state = ParsedArguments::new(&grammar);

        add(&mut state, &grammar, "--verbose", &[]).unwrap();
        assert_eq!(
            add(&mut state, &grammar, "-v", &[]),
            Err(RunnerError::FoundTwice {
                option: "-v".to_owned()
            })
        );
    }

    #[test]
    fn list_arity() {
        let grammar = grammar();

        let mut state = ParsedArguments::new(&grammar);
        add(&mut state, &grammar, "-p", &["16", "9"]).unwrap();
        assert_eq!(state.option(1), Some(&Value::from([16, 9])));

        let mut state = ParsedArguments::new(&grammar);
        assert_eq!(
            add(&mut state, &grammar, "-p", &["16"]),
            Err(RunnerError::WrongCount {
                option: "-p".to_owned(),
                element: OptionType::Int,
                expected: 2,
                found: 1
            })
        );

        let mut state = ParsedArguments::new(&grammar);
        assert_eq!(
            add(&mut state, &grammar, "-p", &["16", "x"]),
            Err(RunnerError::WrongElementType {
                option: "-p".to_owned(),
                position: 2,
                expected: OptionType::Int
            })
        );
    }

    #[test]
    fn open_ended_lists() {
        let grammar = grammar();

        let mut state = ParsedArguments::new(&grammar);
        add(&mut state, &grammar, "--files", &["a", "b", "c"]).unwrap();
        assert_eq!(state.option(2), Some(&Value::from(["a", "b", "c"])));

        let mut state = ParsedArguments::new(&grammar);
        assert_eq!(
            add(&mut state, &grammar, "--files", &[]),
            Err(RunnerError::EmptyList {
                option: "--files".to_owned(),
                element: OptionType::Str
            })
        );
    }

    #[test]
    fn positionals() {
        let grammar = grammar();
        let mut state = ParsedArguments::new(&grammar);

        state.add_positional(&grammar, "a").unwrap();
        assert_eq!(
            state.add_positional(&grammar, "b"),
            Err(RunnerError::UnrecognizedParameter("b".to_owned()))
        );
        assert_eq!(state.positional(), ["a"]);
    }
}
