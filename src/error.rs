use thiserror::Error;

use crate::lexer::Span;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("invalid character '{ch}'")]
    InvalidCharacter { ch: char, span: Span },
    #[error("malformed number '{text}'")]
    MalformedNumber { text: String, span: Span },
    #[error("sign operator without an operand")]
    DanglingSign { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidCharacter { span, .. } => *span,
            LexError::MalformedNumber { span, .. } => *span,
            LexError::DanglingSign { span } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupError {
    #[error("unbalanced brackets")]
    UnbalancedBrackets { span: Span },
    #[error("function '{name}' is missing its argument")]
    MissingArgument { name: String, span: Span },
    #[error("nesting deeper than {limit} levels")]
    MaxDepthExceeded { limit: usize, span: Span },
}

impl GroupError {
    pub fn span(&self) -> Span {
        match self {
            GroupError::UnbalancedBrackets { span } => *span,
            GroupError::MissingArgument { span, .. } => *span,
            GroupError::MaxDepthExceeded { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("operator '{op}' is missing an operand")]
    MissingOperand { op: String, span: Span },
    #[error("unexpected token '{token}'")]
    UnexpectedToken { token: String, span: Span },
    #[error("nesting deeper than {limit} levels")]
    MaxDepthExceeded { limit: usize },
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::MissingOperand { span, .. } => Some(*span),
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::MaxDepthExceeded { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("undefined variable '{0}'")]
    UnboundVariable(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("a context is required to evaluate '{0}'")]
    ContextRequired(String),
    #[error("power with {0} operand(s), expected at least 2")]
    MalformedPower(usize),
    #[error("evaluation deeper than {0} levels")]
    MaxDepthExceeded(usize),
}

/// Any failure of the tokenize, group, parse, evaluate pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl Error {
    /// Location in the input the error refers to, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Lex(e) => Some(e.span()),
            Error::Group(e) => Some(e.span()),
            Error::Parse(e) => e.span(),
            Error::Eval(_) => None,
        }
    }
}
