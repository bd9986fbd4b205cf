use crate::{Equation, Rational, RationalError, Term};
use std::{iter::Peekable, ops::Range};
use thiserror::Error;

/// Parse an [`Equation`] from a single line of text.
///
/// Whitespace is insignificant and gets stripped before tokenizing, so any
/// spans in a [`ParseError`] are relative to the text with its whitespace
/// removed.
pub fn parse(src: &str) -> Result<Equation, ParseError> {
    let stripped: String = src.chars().filter(|c| !c.is_whitespace()).collect();

    Parser::new(&stripped).parse()
}

/// A small recursive descent parser for linear equations.
///
/// The grammar:
///
/// ```text
/// equation := side ["=" side]
/// side     := [signs term {signs term}]
/// signs    := {"+" | "-"}
/// term     := part ["/" signs part]
/// part     := NUMBER [IDENTIFIER]
///           | IDENTIFIER [NUMBER]
/// ```
///
/// Everything on the right hand side gets moved to the left, so the resulting
/// [`Equation`] is implicitly equal to zero.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
    end_of_input: usize,
}

/// One side of a fraction.
#[derive(Debug, Clone, PartialEq)]
struct Part<'a> {
    number: Option<i64>,
    variable: Option<&'a str>,
    span: Range<usize>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
            end_of_input: src.len(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Equation, ParseError> {
        let mut equation = Equation::new();

        self.side(&mut equation, false)?;

        if self.peek()? == Some(TokenKind::Equals) {
            let _ = self.advance()?;
            self.side(&mut equation, true)?;
        }

        match self.tokens.next() {
            None => Ok(equation),
            Some(Ok(token)) => {
                debug_assert_eq!(token.kind, TokenKind::Equals);
                Err(ParseError::MultipleEqualsSigns)
            },
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Result<Option<TokenKind>, ParseError> {
        match self.tokens.peek() {
            Some(Ok(token)) => Ok(Some(token.kind)),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(None),
        }
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::InvalidTerm {
                span: self.end_of_input..self.end_of_input,
            }),
        }
    }

    fn side(
        &mut self,
        equation: &mut Equation,
        right_hand_side: bool,
    ) -> Result<(), ParseError> {
        loop {
            let (negative, signs) = self.signs()?;

            match self.peek()? {
                None | Some(TokenKind::Equals) => {
                    return match signs {
                        // a dangling sign, e.g. "x + = 2"
                        Some(span) => Err(ParseError::InvalidTerm { span }),
                        None => Ok(()),
                    };
                },
                _ => {},
            }

            let term = self.term()?;

            if negative != right_hand_side {
                equation.add_term(term.with_coefficient(-term.coefficient()));
            } else {
                equation.add_term(term);
            }
        }
    }

    /// Consume a run of `+` and `-` signs, returning whether they negate the
    /// term that follows.
    fn signs(&mut self) -> Result<(bool, Option<Range<usize>>), ParseError> {
        let mut negative = false;
        let mut span: Option<Range<usize>> = None;

        while let Some(kind) = self.peek()? {
            if kind != TokenKind::Plus && kind != TokenKind::Minus {
                break;
            }

            let token = self.advance()?;

            if kind == TokenKind::Minus {
                negative = !negative;
            }
            span = Some(match span {
                Some(previous) => previous.start..token.span.end,
                None => token.span,
            });
        }

        Ok((negative, span))
    }

    fn term(&mut self) -> Result<Term, ParseError> {
        let numerator = self.part()?;
        let start = numerator.span.start;

        let term = if self.peek()? == Some(TokenKind::Slash) {
            let _ = self.advance()?;
            let (negative, _) = self.signs()?;
            let denominator = self.part()?;
            let span = start..denominator.span.end;

            let term = fraction(numerator, denominator, span)?;

            if negative {
                term.with_coefficient(-term.coefficient())
            } else {
                term
            }
        } else {
            let coefficient = Rational::from(numerator.number.unwrap_or(1));
            Term::new(coefficient, numerator.variable.unwrap_or(""))
        };

        self.end_of_term(start)?;

        Ok(term)
    }

    /// A term can only be followed by a sign, an equals sign, or nothing.
    fn end_of_term(&mut self, start: usize) -> Result<(), ParseError> {
        match self.tokens.peek() {
            None => Ok(()),
            Some(Ok(token)) => match token.kind {
                TokenKind::Plus | TokenKind::Minus | TokenKind::Equals => {
                    Ok(())
                },
                _ => Err(ParseError::InvalidTerm {
                    span: start..token.span.end,
                }),
            },
            Some(Err(e)) => Err(e.clone()),
        }
    }

    fn part(&mut self) -> Result<Part<'a>, ParseError> {
        let first = self.advance()?;

        match first.kind {
            TokenKind::Number => {
                let number = Some(number(&first)?);

                if self.peek()? == Some(TokenKind::Identifier) {
                    let variable = self.advance()?;
                    Ok(Part {
                        number,
                        variable: Some(variable.text),
                        span: first.span.start..variable.span.end,
                    })
                } else {
                    Ok(Part {
                        number,
                        variable: None,
                        span: first.span,
                    })
                }
            },
            TokenKind::Identifier => {
                if self.peek()? == Some(TokenKind::Number) {
                    let coefficient = self.advance()?;
                    Ok(Part {
                        number: Some(number(&coefficient)?),
                        variable: Some(first.text),
                        span: first.span.start..coefficient.span.end,
                    })
                } else {
                    Ok(Part {
                        number: None,
                        variable: Some(first.text),
                        span: first.span,
                    })
                }
            },
            _ => Err(ParseError::InvalidTerm { span: first.span }),
        }
    }
}

fn number(token: &Token<'_>) -> Result<i64, ParseError> {
    debug_assert_eq!(token.kind, TokenKind::Number);

    token
        .text
        .parse()
        .map_err(|_| ParseError::NumberOutOfRange {
            span: token.span.clone(),
        })
}

fn fraction(
    numerator: Part<'_>,
    denominator: Part<'_>,
    span: Range<usize>,
) -> Result<Term, ParseError> {
    let variable = match (numerator.variable, denominator.variable) {
        (Some(_), Some(_)) => return Err(ParseError::InvalidTerm { span }),
        // something like "9/x" isn't linear
        (None, Some(_)) if denominator.number.is_none() => {
            return Err(ParseError::InvalidTerm { span });
        },
        (None, Some(variable)) | (Some(variable), None) => variable,
        (None, None) => "",
    };

    let coefficient = Rational::new(
        numerator.number.unwrap_or(1),
        denominator.number.unwrap_or(1),
    )?;

    Ok(Term::new(coefficient, variable))
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Term format is invalid")]
    InvalidTerm { span: Range<usize> },
    #[error("Term format is invalid")]
    InvalidCharacter { character: char, index: usize },
    #[error("An equation may only contain one \"=\"")]
    MultipleEqualsSigns,
    #[error("The number is too big to fit in a 64-bit integer")]
    NumberOutOfRange { span: Range<usize> },
    #[error(transparent)]
    Arithmetic(#[from] RationalError),
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(&mut self, kind: TokenKind) -> Token<'a> {
        let start = self.cursor;
        self.advance();
        let end = self.cursor;

        Token::from_text(self.src, start..end, kind)
    }

    fn take_while<P>(&mut self, kind: TokenKind, mut predicate: P) -> Token<'a>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        let end = self.cursor;
        debug_assert!(start != end, "Callers must check the first character");

        Token::from_text(self.src, start..end, kind)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = match self.peek()? {
            '+' => self.chomp(TokenKind::Plus),
            '-' => self.chomp(TokenKind::Minus),
            '/' => self.chomp(TokenKind::Slash),
            '=' => self.chomp(TokenKind::Equals),
            '0'..='9' => {
                self.take_while(TokenKind::Number, |c| c.is_ascii_digit())
            },
            letter if letter.is_alphabetic() => {
                self.take_while(TokenKind::Identifier, char::is_alphabetic)
            },
            other => {
                return Some(Err(ParseError::InvalidCharacter {
                    character: other,
                    index: self.cursor,
                }))
            },
        };

        Some(Ok(token))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(src: &'a str, span: Range<usize>, kind: TokenKind) -> Self {
        Token {
            text: &src[span.clone()],
            span,
            kind,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum TokenKind {
    Number,
    Identifier,
    Plus,
    Minus,
    Slash,
    Equals,
}

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    macro_rules! tokenize_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let mut tokens = Tokens::new($src);

                let got = tokens.next().unwrap().unwrap();

                let Range { start, end } = got.span;
                assert_eq!(start, 0);
                assert_eq!(end, $src.len());
                assert_eq!(got.kind, $should_be);

                assert!(
                    tokens.next().is_none(),
                    "{:?} should be empty",
                    tokens
                );
            }
        };
    }

    tokenize_test!(plus, "+", TokenKind::Plus);
    tokenize_test!(minus, "-", TokenKind::Minus);
    tokenize_test!(slash, "/", TokenKind::Slash);
    tokenize_test!(equals, "=", TokenKind::Equals);
    tokenize_test!(single_digit_integer, "3", TokenKind::Number);
    tokenize_test!(multi_digit_integer, "31", TokenKind::Number);
    tokenize_test!(simple_identifier, "x", TokenKind::Identifier);
    tokenize_test!(longer_identifier, "hello", TokenKind::Identifier);
    tokenize_test!(non_ascii_identifier, "пять", TokenKind::Identifier);

    #[test]
    fn letters_and_digits_are_separate_tokens() {
        let kinds: Vec<_> = Tokens::new("y12x")
            .map(|tok| tok.unwrap().kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Number,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn unknown_characters_are_errors() {
        let inputs = vec![("*", '*', 0), ("x_1", '_', 1), ("3.5", '.', 1)];

        for (src, character, index) in inputs {
            let got: Result<Vec<_>, _> = Tokens::new(src).collect();

            assert_eq!(
                got,
                Err(ParseError::InvalidCharacter { character, index })
            );
        }
    }
}
