use crate::ast::Expression;
use crate::config::Limits;
use crate::error::ParseError;
use crate::group::TokenGroup;
use crate::lexer::{Sign, Token, TokenKind};

fn operator(item: &TokenGroup) -> Option<&Token> {
    match item {
        TokenGroup::Leaf(token) => match token.kind {
            TokenKind::Mult | TokenKind::Div | TokenKind::Pow => Some(token),
            _ => None,
        },
        _ => None,
    }
}

fn unexpected_token(item: &TokenGroup) -> ParseError {
    let token = match item {
        TokenGroup::Leaf(token) | TokenGroup::Call(token, _) => token.kind.name(),
        TokenGroup::Group(_) => "(".into(),
    };

    ParseError::UnexpectedToken {
        token,
        span: item.span(),
    }
}

fn missing_operand(op: &Token) -> ParseError {
    ParseError::MissingOperand {
        op: op.kind.name(),
        span: op.span,
    }
}

struct Parser {
    limits: Limits,
}

impl Parser {
    // A call and its bracketed argument are two levels here but one bracket
    // level for the grouper, hence the doubled bound.
    fn enter(&self, depth: usize) -> Result<usize, ParseError> {
        if depth >= self.limits.max_depth.saturating_mul(2) {
            Err(ParseError::MaxDepthExceeded {
                limit: self.limits.max_depth,
            })
        } else {
            Ok(depth + 1)
        }
    }

    /// Resolves a single operand: a leaf value, a bracketed group or a
    /// function call.
    fn parse_primitive(&self, item: &TokenGroup, depth: usize) -> Result<Expression, ParseError> {
        match item {
            TokenGroup::Leaf(token) => match &token.kind {
                TokenKind::Number(x) => Ok(Expression::Literal(*x, token.sign)),
                TokenKind::Variable(name) => Ok(Expression::Variable(name.clone(), token.sign)),
                _ => Err(unexpected_token(item)),
            },
            TokenGroup::Group(group) => {
                let depth = self.enter(depth)?;
                self.parse_sum(&group.children, group.sign(), depth)
            }
            TokenGroup::Call(function, arg) => {
                let name = match &function.kind {
                    TokenKind::Function(name) => name.clone(),
                    _ => return Err(unexpected_token(item)),
                };
                let arg = self.parse_primitive(arg, self.enter(depth)?)?;

                Ok(Expression::Call(name, Box::new(arg), function.sign))
            }
        }
    }

    /// Parses the `^` chain starting at `start`. Returns the operand, or a
    /// `Power` when at least one `^` follows, and the index after the chain.
    fn parse_power(
        &self,
        items: &[TokenGroup],
        start: usize,
        depth: usize,
    ) -> Result<(Expression, usize), ParseError> {
        let mut operands = vec![self.parse_primitive(&items[start], depth)?];
        let mut i = start + 1;

        while let Some(op) = items
            .get(i)
            .and_then(operator)
            .filter(|t| t.kind == TokenKind::Pow)
        {
            let operand = items.get(i + 1).ok_or_else(|| missing_operand(op))?;

            operands.push(self.parse_primitive(operand, depth)?);
            i += 2;
        }

        if operands.len() == 1 {
            Ok((operands.remove(0), i))
        } else {
            Ok((Expression::Power(operands, Sign::Positive), i))
        }
    }

    /// Parses one addend: operands joined by `*`, `/` or juxtaposition. The
    /// term ends at an operand carrying an explicit sign that no operator
    /// binds to the left, or at the end of the group.
    fn parse_term(
        &self,
        items: &[TokenGroup],
        start: usize,
        depth: usize,
    ) -> Result<(Expression, usize), ParseError> {
        let mut factors = vec![];
        let mut chained = false;
        let mut invert = false;
        let mut i = start;

        loop {
            let (factor, next) = self.parse_power(items, i, depth)?;
            if next > i + 1 {
                chained = true;
            }

            factors.push(if invert {
                Expression::inverse(factor)
            } else {
                factor
            });

            i = next;
            let item = match items.get(i) {
                Some(item) => item,
                None => break,
            };

            if let Some(op) = operator(item) {
                if i + 1 >= items.len() {
                    return Err(missing_operand(op));
                }

                invert = op.kind == TokenKind::Div;
                chained = true;
                i += 1;
            } else if !item.explicit_sign() {
                invert = false;
                chained = true;
            } else {
                break;
            }
        }

        if !chained && factors.len() == 1 {
            Ok((factors.remove(0), i))
        } else {
            Ok((Expression::Product(factors, Sign::Positive), i))
        }
    }

    fn parse_sum(
        &self,
        items: &[TokenGroup],
        sign: Sign,
        depth: usize,
    ) -> Result<Expression, ParseError> {
        let mut terms = vec![];
        let mut i = 0;

        while i < items.len() {
            let (term, next) = self.parse_term(items, i, depth)?;
            terms.push(term);
            i = next;
        }

        Ok(Expression::Sum(terms, sign))
    }
}

/// Builds the expression tree for a grouped token sequence. The result is
/// always a `Sum`.
pub fn parse_with(root: &TokenGroup, limits: &Limits) -> Result<Expression, ParseError> {
    let parser = Parser { limits: *limits };

    let expr = match root {
        TokenGroup::Group(group) => parser.parse_sum(&group.children, group.sign(), 0)?,
        item => parser.parse_sum(std::slice::from_ref(item), Sign::Positive, 0)?,
    };

    trace!("parsed {} top level terms", expr.children().len());
    Ok(expr)
}

pub fn parse(root: &TokenGroup) -> Result<Expression, ParseError> {
    parse_with(root, &Limits::default())
}
