use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::Expression;
use crate::config::Limits;
use crate::error::EvalError;

/// A function callable from expressions. It receives the unevaluated argument
/// and decides itself whether and how to evaluate it.
pub trait Func: Send + Sync {
    fn call(&self, ctx: &Context, arg: &Expression) -> Result<f64, EvalError>;
}

impl<F> Func for F
where
    F: Fn(&Context, &Expression) -> Result<f64, EvalError> + Send + Sync,
{
    fn call(&self, ctx: &Context, arg: &Expression) -> Result<f64, EvalError> {
        self(ctx, arg)
    }
}

/// Variable and function bindings. Never modified during evaluation, so one
/// context can serve any number of evaluations, on any number of threads.
#[derive(Clone, Default)]
pub struct Context {
    variables: HashMap<String, Expression>,
    functions: HashMap<String, Arc<dyn Func>>,
    limits: Limits,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Context {
            limits,
            ..Context::default()
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn variable(&self, key: &str) -> Option<&Expression> {
        self.variables.get(key)
    }

    pub fn function(&self, key: &str) -> Option<&dyn Func> {
        self.functions.get(key).map(|f| &**f)
    }

    pub fn set_variable(&mut self, key: &str, val: Expression) {
        self.variables.insert(key.into(), val);
    }

    pub fn set_function<F: 'static>(&mut self, key: &str, fun: F)
    where
        F: Fn(&Context, &Expression) -> Result<f64, EvalError> + Send + Sync,
    {
        self.functions.insert(key.into(), Arc::new(fun));
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut functions: Vec<_> = self.functions.keys().collect();
        functions.sort();

        f.debug_struct("Context")
            .field("variables", &self.variables)
            .field("functions", &functions)
            .field("limits", &self.limits)
            .finish()
    }
}

thread_local! {
    static DEPTH: Cell<usize> = Cell::new(0);
}

// Counts nesting per thread, so evaluations started from inside a function
// call share the budget of the evaluation that called it.
struct DepthGuard;

impl DepthGuard {
    fn enter(limit: usize) -> Result<DepthGuard, EvalError> {
        DEPTH.with(|depth| {
            if depth.get() >= limit {
                Err(EvalError::MaxDepthExceeded(limit))
            } else {
                depth.set(depth.get() + 1);
                Ok(DepthGuard)
            }
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn evaluate_node(node: &Expression, ctx: Option<&Context>, limit: usize) -> Result<f64, EvalError> {
    let _guard = DepthGuard::enter(limit)?;

    match node {
        Expression::Literal(x, sign) => Ok(x * sign.factor()),
        Expression::Variable(name, sign) => {
            let ctx = ctx.ok_or_else(|| EvalError::ContextRequired(name.clone()))?;
            let val = match ctx.variable(name) {
                Some(val) => val,
                None => return Err(EvalError::UnboundVariable(name.clone())),
            };

            Ok(evaluate_node(val, Some(ctx), limit)? * sign.factor())
        }
        Expression::Call(name, arg, sign) => {
            let ctx = ctx.ok_or_else(|| EvalError::ContextRequired(name.clone()))?;
            let fun = match ctx.function(name) {
                Some(fun) => fun,
                None => return Err(EvalError::UnknownFunction(name.clone())),
            };

            Ok(fun.call(ctx, arg)? * sign.factor())
        }
        Expression::Sum(children, sign) => {
            let mut total = 0.0;
            for child in children {
                total += evaluate_node(child, ctx, limit)?;
            }
            Ok(total * sign.factor())
        }
        Expression::Product(children, sign) => {
            let mut total = 1.0;
            for child in children {
                total *= evaluate_node(child, ctx, limit)?;
            }
            Ok(total * sign.factor())
        }
        Expression::Power(children, sign) => {
            let (last, bases) = match children.split_last() {
                Some(split) if children.len() >= 2 => split,
                _ => return Err(EvalError::MalformedPower(children.len())),
            };

            let mut exponent = evaluate_node(last, ctx, limit)?;
            for base in bases.iter().rev() {
                exponent = evaluate_node(base, ctx, limit)?.powf(exponent);
            }
            Ok(exponent * sign.factor())
        }
    }
}

/// Evaluates `root` against `ctx`. Variables and function calls need a
/// context; everything else evaluates without one.
pub fn evaluate(root: &Expression, ctx: Option<&Context>) -> Result<f64, EvalError> {
    let limit = ctx
        .map(|c| c.limits.max_eval_depth)
        .unwrap_or_else(|| Limits::default().max_eval_depth);

    evaluate_node(root, ctx, limit).map_err(|err| {
        debug!("evaluation failed: {}", err);
        err
    })
}
