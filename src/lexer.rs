use std::fmt;
use std::iter::{Fuse, Peekable};
use std::str::Chars;

use crate::error::LexError;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Span(pub usize, pub usize);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn factor(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Sign::Positive => "",
            Sign::Negative => "-",
        }
    }
}

impl Default for Sign {
    fn default() -> Self {
        Sign::Positive
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    Number(f64),
    Variable(String),
    Function(String),
    OpenBracket,
    CloseBracket,
    Plus,
    Minus,
    Mult,
    Div,
    Pow,
}

impl TokenKind {
    /// Numbers, variables and functions; everything that can be an operand.
    pub fn is_value(&self) -> bool {
        match self {
            TokenKind::Number(_) | TokenKind::Variable(_) | TokenKind::Function(_) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> String {
        match self {
            TokenKind::Number(x) => return x.to_string(),
            TokenKind::Variable(x) => x.as_str(),
            TokenKind::Function(x) => x.as_str(),
            TokenKind::OpenBracket => "(",
            TokenKind::CloseBracket => ")",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Mult => "*",
            TokenKind::Div => "/",
            TokenKind::Pow => "^",
        }
        .into()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub sign: Sign,
    /// Set when a `+` or `-` directly in front of this token was folded away.
    pub explicit_sign: bool,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            sign: Sign::Positive,
            explicit_sign: false,
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.sign.prefix(), self.kind.name())
    }
}

struct CharStream<'a> {
    index: usize,
    iterator: Peekable<Fuse<Chars<'a>>>,
}

impl<'a> CharStream<'a> {
    fn new(line: &'a str) -> CharStream<'a> {
        Self {
            index: 0,
            iterator: line.chars().fuse().peekable(),
        }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.iterator.next();
        if c.is_some() {
            self.index += 1;
        }
        c
    }

    fn peek(&mut self) -> Option<char> {
        self.iterator.peek().cloned()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut buffer = String::new();

        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            buffer.push(c);
            self.next();
        }

        buffer
    }
}

const DIGITS: &str = "0123456789.";
const OPEN_BRACKETS: &str = "({[";
const CLOSE_BRACKETS: &str = ")}]";

fn parse_token(stream: &mut CharStream, c: char) -> Result<TokenKind, LexError> {
    let begin = stream.index;

    if c.is_ascii_alphabetic() {
        let name = stream.take_while(|c| c.is_ascii_alphabetic());

        return Ok(if c.is_ascii_uppercase() {
            TokenKind::Function(name)
        } else {
            TokenKind::Variable(name)
        });
    }

    if DIGITS.contains(c) {
        let text = stream.take_while(|c| DIGITS.contains(c));

        return match text.parse() {
            Ok(x) => Ok(TokenKind::Number(x)),
            Err(_) => Err(LexError::MalformedNumber {
                text,
                span: Span(begin, stream.index),
            }),
        };
    }

    stream.next();

    let kind = match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Mult,
        '/' => TokenKind::Div,
        '^' => TokenKind::Pow,
        c if OPEN_BRACKETS.contains(c) => TokenKind::OpenBracket,
        c if CLOSE_BRACKETS.contains(c) => TokenKind::CloseBracket,
        c => {
            return Err(LexError::InvalidCharacter {
                ch: c,
                span: Span(begin, stream.index),
            })
        }
    };

    Ok(kind)
}

/// First pass: classifies characters into tokens, keeping `+` and `-` as
/// standalone operator tokens.
pub fn scan(line: &str) -> Result<Vec<Token>, LexError> {
    let mut stream = CharStream::new(line);
    let mut tokens = vec![];

    while let Some(c) = stream.peek() {
        let begin = stream.index;
        let kind = parse_token(&mut stream, c)?;
        tokens.push(Token::new(kind, Span(begin, stream.index)));
    }

    Ok(tokens)
}

/// Second pass: removes every `+` and `-`, marking the token that follows.
///
/// A `-` makes the next token negative. Signs overwrite rather than compose,
/// so only the last operator of a run like `-+-` decides the sign.
pub fn fold_signs(tokens: Vec<Token>) -> Result<Vec<Token>, LexError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut pending: Option<Token> = None;

    for mut token in tokens {
        if let Some(op) = pending.take() {
            token.explicit_sign = true;
            if op.kind == TokenKind::Minus {
                token.sign = Sign::Negative;
            }
        }

        match token.kind {
            TokenKind::Plus | TokenKind::Minus => pending = Some(token),
            _ => out.push(token),
        }
    }

    if let Some(op) = pending {
        return Err(LexError::DanglingSign { span: op.span });
    }

    Ok(out)
}

pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    let tokens = fold_signs(scan(line)?)?;
    trace!("tokenized {} characters into {} tokens", line.len(), tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod test {
    use super::{fold_signs, scan, tokenize, CharStream, Sign, Span, TokenKind};
    use crate::error::LexError;

    #[test]
    fn test_charstream() {
        let line = "abc";
        let mut stream = CharStream::new(line);

        assert_eq!(stream.peek(), Some('a'));
        assert_eq!(stream.next(), Some('a'));
        assert_eq!(stream.peek(), Some('b'));
        assert_eq!(stream.next(), Some('b'));
        assert_eq!(stream.index, 2);
        assert_eq!(stream.next(), Some('c'));
        assert_eq!(stream.peek(), None);
        assert_eq!(stream.next(), None);
        assert_eq!(stream.index, 3);
    }

    fn test_match(string: &str, kinds: impl IntoIterator<Item = TokenKind>) {
        let tokens = scan(string).unwrap();
        let kinds: Vec<_> = kinds.into_iter().collect();
        let found: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();

        assert_eq!(found, kinds);
    }

    #[test]
    fn test_operators() {
        test_match(
            "+-*/^",
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Mult,
                TokenKind::Div,
                TokenKind::Pow,
            ],
        );
    }

    #[test]
    fn test_brackets() {
        use super::TokenKind::{CloseBracket as C, OpenBracket as O};
        test_match("({[)}]", vec![O, O, O, C, C, C]);
    }

    #[test]
    fn test_idents() {
        test_match(
            "foo*Bar*xY*Sin",
            vec![
                TokenKind::Variable("foo".into()),
                TokenKind::Mult,
                TokenKind::Function("Bar".into()),
                TokenKind::Mult,
                TokenKind::Variable("xY".into()),
                TokenKind::Mult,
                TokenKind::Function("Sin".into()),
            ],
        );
    }

    #[test]
    fn test_numbers() {
        test_match(
            "1*.2*3.*4.5",
            vec![
                TokenKind::Number(1.0),
                TokenKind::Mult,
                TokenKind::Number(0.2),
                TokenKind::Mult,
                TokenKind::Number(3.0),
                TokenKind::Mult,
                TokenKind::Number(4.5),
            ],
        );
    }

    #[test]
    fn test_adjacent_runs() {
        test_match(
            "2x3Sin",
            vec![
                TokenKind::Number(2.0),
                TokenKind::Variable("x".into()),
                TokenKind::Number(3.0),
                TokenKind::Function("Sin".into()),
            ],
        );
    }

    #[test]
    fn test_spans() {
        let tokens = scan("12+abc").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| t.span).collect();

        assert_eq!(spans, vec![Span(0, 2), Span(2, 3), Span(3, 6)]);
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            scan("1 + 2"),
            Err(LexError::InvalidCharacter {
                ch: ' ',
                span: Span(1, 2)
            })
        );
        assert_eq!(
            scan("a_b"),
            Err(LexError::InvalidCharacter {
                ch: '_',
                span: Span(1, 2)
            })
        );
    }

    #[test]
    fn test_malformed_number() {
        assert_eq!(
            scan("2*1.2.3"),
            Err(LexError::MalformedNumber {
                text: "1.2.3".into(),
                span: Span(2, 7)
            })
        );
        assert!(scan(".").is_err());
    }

    #[test]
    fn test_fold_signs() {
        let tokens = tokenize("1-2+3").unwrap();
        let summary: Vec<_> = tokens
            .iter()
            .map(|t| (t.kind.clone(), t.sign, t.explicit_sign))
            .collect();

        assert_eq!(
            summary,
            vec![
                (TokenKind::Number(1.0), Sign::Positive, false),
                (TokenKind::Number(2.0), Sign::Negative, true),
                (TokenKind::Number(3.0), Sign::Positive, true),
            ]
        );
    }

    #[test]
    fn test_signs_overwrite() {
        let sign_of_last = |s: &str| tokenize(s).unwrap().last().unwrap().sign;

        assert_eq!(sign_of_last("--5"), Sign::Negative);
        assert_eq!(sign_of_last("+-5"), Sign::Negative);
        assert_eq!(sign_of_last("-+5"), Sign::Positive);
        assert_eq!(sign_of_last("2*-(1)"), Sign::Positive);
    }

    #[test]
    fn test_sign_on_bracket() {
        let tokens = tokenize("-(1)").unwrap();

        assert_eq!(tokens[0].kind, TokenKind::OpenBracket);
        assert_eq!(tokens[0].sign, Sign::Negative);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Minus));
    }

    #[test]
    fn test_dangling_sign() {
        assert_eq!(
            tokenize("1-"),
            Err(LexError::DanglingSign { span: Span(1, 2) })
        );
        assert!(fold_signs(scan("+").unwrap()).is_err());
    }

    #[test]
    fn test_empty() {
        assert_eq!(tokenize(""), Ok(vec![]));
    }
}
