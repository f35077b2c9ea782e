use rand::random;
use std::f64::consts;

use crate::ast::Expression;
use crate::config::Limits;
use crate::error::EvalError;
use crate::eval::{evaluate, Context};
use crate::lexer::Sign;

fn set_const(ctx: &mut Context, key: &str, val: f64) {
    ctx.set_variable(key, Expression::Literal(val, Sign::Positive))
}

fn set_closure<F: 'static>(ctx: &mut Context, key: &str, fun: F)
where
    F: Fn(&Context, &Expression) -> Result<f64, EvalError> + Send + Sync,
{
    ctx.set_function(key, fun);
}

/// Registers a function that evaluates its argument first and maps the value.
fn set_unary<F: 'static>(ctx: &mut Context, key: &str, fun: F)
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    set_closure(ctx, key, move |ctx: &Context, arg: &Expression| {
        let x = evaluate(arg, Some(ctx))?;
        Ok(fun(x))
    });
}

/// Context with the usual constants and functions. Function names are
/// capitalized, as only capitalized identifiers are parsed as calls.
pub fn create() -> Context {
    create_with(Limits::default())
}

pub fn create_with(limits: Limits) -> Context {
    let mut ctx = Context::with_limits(limits);

    {
        let c = &mut ctx;
        set_const(c, "pi", consts::PI);
        set_const(c, "e", consts::E);

        set_unary(c, "Asin", |x| x.asin());
        set_unary(c, "Acos", |x| x.acos());
        set_unary(c, "Atan", |x| x.atan());
        set_unary(c, "Sin", |x| x.sin());
        set_unary(c, "Cos", |x| x.cos());
        set_unary(c, "Tan", |x| x.tan());
        set_unary(c, "Sinh", |x| x.sinh());
        set_unary(c, "Cosh", |x| x.cosh());
        set_unary(c, "Tanh", |x| x.tanh());
        set_unary(c, "Ln", |x| x.ln());
        set_unary(c, "Log", |x| x.log10());
        set_unary(c, "Abs", |x| x.abs());
        set_unary(c, "Ceil", |x| x.ceil());
        set_unary(c, "Floor", |x| x.floor());
        set_unary(c, "Round", |x| x.round());
        set_unary(c, "Sqrt", |x| x.sqrt());
        set_unary(c, "Exp", |x| x.exp());
        set_unary(c, "Sign", |x| if x == 0.0 { 0.0 } else { x.signum() });

        set_unary(c, "Rand", |x| x * random::<f64>());
    }

    ctx
}

#[cfg(test)]
mod test {
    use super::{create, create_with};
    use crate::ast::Expression;
    use crate::config::Limits;
    use crate::eval::evaluate;
    use crate::lexer::Sign::Positive as P;
    use approx::assert_relative_eq;

    fn call(name: &str, x: f64) -> f64 {
        let ctx = create();
        let expr = Expression::Call(name.into(), Box::new(Expression::Literal(x, P)), P);
        evaluate(&expr, Some(&ctx)).unwrap()
    }

    #[test]
    fn test_constants() {
        let ctx = create();
        let pi = evaluate(&Expression::Variable("pi".into(), P), Some(&ctx)).unwrap();

        assert_relative_eq!(pi, std::f64::consts::PI);
    }

    #[test]
    fn test_unary() {
        assert_relative_eq!(call("Sin", 0.5), 0.5f64.sin());
        assert_relative_eq!(call("Sqrt", 16.0), 4.0);
        assert_relative_eq!(call("Log", 1000.0), 3.0);
        assert_relative_eq!(call("Ln", std::f64::consts::E), 1.0);
        assert_eq!(call("Abs", -2.0), 2.0);
        assert_eq!(call("Floor", 2.7), 2.0);
        assert_eq!(call("Sign", -3.0), -1.0);
        assert_eq!(call("Sign", 0.0), 0.0);
    }

    #[test]
    fn test_rand() {
        for _ in 0..100 {
            let x = call("Rand", 5.0);
            assert!(x >= 0.0 && x < 5.0);
        }
    }

    #[test]
    fn test_create_with_limits() {
        let limits = Limits::default().with_max_eval_depth(10);
        assert_eq!(create_with(limits).limits(), &limits);
    }

    #[test]
    fn test_lowercase_names_are_not_functions() {
        let ctx = create();
        assert!(ctx.function("sin").is_none());
        assert!(ctx.function("Sin").is_some());
    }
}
