use itertools::Itertools;
use std::fmt;

use crate::lexer::Sign;

/// Expression tree produced by the parser. Every node carries the sign that
/// sign folding attached to it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(f64, Sign),
    Variable(String, Sign),
    Call(String, Box<Expression>, Sign),
    Sum(Vec<Expression>, Sign),
    Product(Vec<Expression>, Sign),
    /// Right-associative chain `a^b^c`, at least two operands.
    Power(Vec<Expression>, Sign),
}

impl Expression {
    pub fn sign(&self) -> Sign {
        match self {
            Expression::Literal(_, sign)
            | Expression::Variable(_, sign)
            | Expression::Call(_, _, sign)
            | Expression::Sum(_, sign)
            | Expression::Product(_, sign)
            | Expression::Power(_, sign) => *sign,
        }
    }

    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::Sum(children, _)
            | Expression::Product(children, _)
            | Expression::Power(children, _) => children,
            Expression::Call(_, arg, _) => std::slice::from_ref(&**arg),
            Expression::Literal(..) | Expression::Variable(..) => &[],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Literal(..) => "literal",
            Expression::Variable(..) => "variable",
            Expression::Call(..) => "call",
            Expression::Sum(..) => "sum",
            Expression::Product(..) => "product",
            Expression::Power(..) => "power",
        }
    }

    /// `operand^-1`, the form division takes in a product.
    pub fn inverse(operand: Expression) -> Expression {
        Expression::Power(
            vec![operand, Expression::Literal(-1.0, Sign::Positive)],
            Sign::Positive,
        )
    }
}

// Fully parenthesized; the output tokenizes and parses back to an equal value.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Literal(x, sign) => {
                let x = x * sign.factor();
                if x.is_nan() {
                    write!(f, "(0/0)")
                } else if x.is_infinite() {
                    write!(f, "{}(1/0)", if x < 0.0 { "-" } else { "" })
                } else {
                    write!(f, "{}", x)
                }
            }
            Expression::Variable(name, sign) => write!(f, "{}{}", sign.prefix(), name),
            Expression::Call(name, arg, sign) => write!(f, "{}{}({})", sign.prefix(), name, arg),
            Expression::Sum(children, sign) => {
                write!(f, "{}({})", sign.prefix(), children.iter().join("+"))
            }
            Expression::Product(children, sign) if children.is_empty() => {
                write!(f, "{}(1)", sign.prefix())
            }
            Expression::Product(children, sign) => {
                write!(f, "{}({})", sign.prefix(), children.iter().join("*"))
            }
            Expression::Power(children, sign) => {
                write!(f, "{}({})", sign.prefix(), children.iter().join("^"))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::Expression;
    use crate::lexer::Sign::{Negative as N, Positive as P};

    fn lit(x: f64) -> Expression {
        Expression::Literal(x, P)
    }

    #[test]
    fn test_display() {
        let expr = Expression::Sum(
            vec![
                lit(1.0),
                Expression::Literal(22.0, N),
                Expression::Product(
                    vec![
                        lit(4.0),
                        Expression::Power(vec![lit(9.0), lit(2.0)], P),
                        Expression::inverse(lit(2.0)),
                    ],
                    P,
                ),
                Expression::Call(
                    "Sin".into(),
                    Box::new(Expression::Variable("a".into(), N)),
                    N,
                ),
            ],
            P,
        );

        assert_eq!(expr.to_string(), "(1+-22+(4*(9^2)*(2^-1))+-Sin(-a))");
    }

    #[test]
    fn test_display_empty() {
        assert_eq!(Expression::Sum(vec![], P).to_string(), "()");
        assert_eq!(Expression::Product(vec![], N).to_string(), "-(1)");
    }

    #[test]
    fn test_display_fractions() {
        assert_eq!(lit(0.25).to_string(), "0.25");
        assert_eq!(lit(1e21).to_string(), "1000000000000000000000");
        assert_eq!(Expression::Literal(-1.0, N).to_string(), "1");
        assert_eq!(lit(std::f64::INFINITY).to_string(), "(1/0)");
        assert_eq!(Expression::Literal(std::f64::INFINITY, N).to_string(), "-(1/0)");
        assert_eq!(lit(std::f64::NEG_INFINITY).to_string(), "-(1/0)");
        assert_eq!(lit(std::f64::NAN).to_string(), "(0/0)");
    }

    #[test]
    fn test_views() {
        let call = Expression::Call("Abs".into(), Box::new(lit(3.0)), N);

        assert_eq!(call.sign(), N);
        assert_eq!(call.children(), &[lit(3.0)]);
        assert_eq!(call.kind_name(), "call");
        assert!(lit(1.0).children().is_empty());
    }
}
