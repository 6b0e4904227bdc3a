#![no_std]

/*!
Low-level token handling for `clinch`. Walks a command line one token at a
time, deciding whether each token is a help request, a version request, a
known option, an unknown option, or a plain positional argument. No type
handling happens here, and the set of known options is supplied by the caller
through a [`Classifier`]. Usually this is too low level to use directly.
*/

use core::iter::Peekable;

/// The role a single token plays on the command line, as decided by a
/// [`Classifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The token asks for the help message (`--help`, `-?`)
    Help,

    /// The token asks for the version (`--version`, `-V`). Classifiers should
    /// only return this when a version is actually available.
    Version,

    /// The token is one of the known option tokens
    Option,

    /// The token is anything else. The parser decides whether this is an
    /// unrecognized option or a positional argument.
    Other,
}

/**
A [`Classifier`] knows the option table of a particular grammar. The
[`ArgumentsParser`] consults it for every token it reads, and also for every
token an option tries to consume as its argument: tokens classified as
[`Classification::Option`] are never handed out as arguments.
*/
pub trait Classifier {
    fn classify(&self, token: &str) -> Classification;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Classification,
{
    #[inline]
    fn classify(&self, token: &str) -> Classification {
        self(token)
    }
}

/**
The [`ArgumentsParser`] type operates by passing the tokens it finds into a
[`Visitor`], to be handled.
 */
pub trait Visitor<'arg> {
    type Value;

    /// A help request
    fn visit_help(self, token: &'arg str) -> Self::Value;

    /// A version request
    fn visit_version(self, token: &'arg str) -> Self::Value;

    /// A known option, such as `--option` or `-o`. The option pulls as many
    /// arguments as it needs from `arguments`.
    fn visit_option(self, option: &'arg str, arguments: impl ArgAccess<'arg>) -> Self::Value;

    /// A token starting with `-` that isn't a known option
    fn visit_unrecognized_option(self, option: &'arg str) -> Self::Value;

    /// A positional argument
    fn visit_positional(self, argument: &'arg str) -> Self::Value;
}

/**
[`ArgAccess`] allows a visitor to decide how many arguments a given option
needs, based on the identity of the option.

Consider `--size 10 --verbose`. Whether `10` belongs to `--size` depends on
the type of `--size`, which the parser doesn't know. Instead, the visitor
requests arguments through this trait only for options that need them. Flags
should simply ignore it, so that the next token is parsed independently.
*/
pub trait ArgAccess<'arg> {
    /**
    Get the next argument. This returns [`None`] if all of the tokens have
    been exhausted, or if the next token is itself a known option; in that
    case the token is left in place to be parsed normally.
    */
    fn take(&mut self) -> Option<&'arg str>;
}

/**
An `ArgumentsParser` is the main entry point into `clinch_parser`. It reads
one token in each call to [`next_arg`][ArgumentsParser::next_arg], sending it
to the given [`Visitor`].

[clinch-parser][crate] operates entirely on borrowed data, because we assume
that command-line arguments can be loaded early on and then handled in a
borrowed form for the rest of the program. The ubiquitous `'arg` lifetime
refers to this borrowed command line data.
*/
#[derive(Debug, Clone)]
pub struct ArgumentsParser<'arg, I, C>
where
    I: Iterator<Item = &'arg str>,
{
    args: Peekable<I>,
    classifier: C,
}

impl<'arg, I, C> ArgumentsParser<'arg, I, C>
where
    I: Iterator<Item = &'arg str>,
    C: Classifier,
{
    /**
    Create a new [`ArgumentsParser`] from an iterator of tokens. This list
    should *exclude* the name of the program, which is commonly passed as the
    first argument in the list.
     */
    #[inline]
    #[must_use]
    pub fn new(args: impl IntoIterator<IntoIter = I>, classifier: C) -> Self {
        Self {
            args: args.into_iter().peekable(),
            classifier,
        }
    }

    /// Read a single token and hand it to the visitor. Returns [`None`] once
    /// the tokens are exhausted.
    pub fn next_arg<V>(&mut self, visitor: V) -> Option<V::Value>
    where
        V: Visitor<'arg>,
    {
        let token = self.args.next()?;

        Some(match self.classifier.classify(token) {
            Classification::Help => visitor.visit_help(token),
            Classification::Version => visitor.visit_version(token),
            Classification::Option => visitor.visit_option(token, FollowingArgs { parent: self }),
            Classification::Other if token.starts_with('-') => {
                visitor.visit_unrecognized_option(token)
            }
            Classification::Other => visitor.visit_positional(token),
        })
    }
}

/// ArgAccess implementation that takes arguments from the tokens following
/// an option, stopping at the next known option.
struct FollowingArgs<'a, 'arg, I, C>
where
    I: Iterator<Item = &'arg str>,
{
    parent: &'a mut ArgumentsParser<'arg, I, C>,
}

impl<'arg, I, C> ArgAccess<'arg> for FollowingArgs<'_, 'arg, I, C>
where
    I: Iterator<Item = &'arg str>,
    C: Classifier,
{
    fn take(&mut self) -> Option<&'arg str> {
        let next = *self.parent.args.peek()?;

        match self.parent.classifier.classify(next) {
            Classification::Option => None,
            _ => self.parent.args.next(),
        }
    }
}
