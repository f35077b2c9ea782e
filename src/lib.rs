#[macro_use]
extern crate log;

pub mod ast;
pub mod config;
pub mod error;
pub mod eval;
pub mod funcs;
pub mod group;
pub mod lexer;
pub mod parser;

pub use ast::Expression;
pub use config::Limits;
pub use error::{Error, EvalError, GroupError, LexError, ParseError};
pub use eval::{evaluate, Context, Func};
pub use group::{group, group_with, TokenGroup};
pub use lexer::{tokenize, Sign, Span, Token, TokenKind};
pub use parser::{parse, parse_with};

/// Tokenizes, groups and parses `line` into an expression tree.
pub fn compile_with(line: &str, limits: &Limits) -> Result<Expression, Error> {
    let tokens = tokenize(line)?;
    let root = group_with(tokens, limits)?;
    let expr = parse_with(&root, limits)?;
    Ok(expr)
}

pub fn compile(line: &str) -> Result<Expression, Error> {
    compile_with(line, &Limits::default())
}

/// Compiles `line` and evaluates it against `ctx`, using the context's limits
/// when one is given.
pub fn calculate(line: &str, ctx: Option<&Context>) -> Result<f64, Error> {
    let limits = ctx.map(|c| *c.limits()).unwrap_or_default();
    let expr = compile_with(line, &limits)?;
    Ok(evaluate(&expr, ctx)?)
}
