use crate::error::ParseError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A closed `[...]` span on one line; group 1 is the inner text
    pub(crate) static ref CHORD_SPAN: Regex =
        Regex::new(r"\[([^\[\]\n]*)\]").expect("chord span pattern is valid");

    /// A closed `{...}` span on one line; group 1 is the inner text
    pub(crate) static ref DIRECTIVE_SPAN: Regex =
        Regex::new(r"\{([^{}\n]*)\}").expect("directive span pattern is valid");
}

/// Token types of a ChordPro line
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Plain lyric text between spans
    Text(String),
    /// Inner text of a `[...]` span, not yet checked against the chord grammar
    Chord(String),
    /// `{name}` or `{name: value}`, untrimmed
    Directive { name: String, value: Option<String> },
}

/// A token with its position in the source
#[derive(Debug, Clone)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// Lexer for a single line of ChordPro. Spans never cross line boundaries,
/// so the parser runs one lexer per source line.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, line: usize) -> Self {
        Self {
            chars: input.chars().peekable(),
            line,
            column: 1,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.column += 1;
        Some(c)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consume up to and including `close`, returning the text in between.
    /// `None` when the line ends first.
    fn read_until(&mut self, close: char) -> Option<String> {
        let mut inner = String::new();
        loop {
            match self.advance()? {
                c if c == close => return Some(inner),
                c => inner.push(c),
            }
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<LocatedToken>, ParseError> {
        let mut tokens = Vec::new();

        while let Some(&c) = self.peek() {
            let line = self.line;
            let column = self.column;

            let token = match c {
                '[' => {
                    self.advance();
                    let inner = self.read_until(']').ok_or_else(|| ParseError::Malformed {
                        line,
                        column,
                        reason: "Chord bracket '[' is never closed".to_string(),
                    })?;
                    Token::Chord(inner)
                }
                '{' => {
                    self.advance();
                    let inner = self.read_until('}').ok_or_else(|| ParseError::Malformed {
                        line,
                        column,
                        reason: "Directive brace '{' is never closed".to_string(),
                    })?;
                    match inner.split_once(':') {
                        Some((name, value)) => Token::Directive {
                            name: name.to_string(),
                            value: Some(value.to_string()),
                        },
                        None => Token::Directive { name: inner, value: None },
                    }
                }
                _ => {
                    let mut text = String::new();
                    while let Some(&c) = self.peek() {
                        if c == '[' || c == '{' {
                            break;
                        }
                        text.push(c);
                        self.advance();
                    }
                    Token::Text(text)
                }
            };

            tokens.push(LocatedToken { token, line, column });
        }

        Ok(tokens)
    }
}
