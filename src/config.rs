use std::env;

pub const DEFAULT_MAX_DEPTH: usize = 128;
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 512;

pub const MAX_DEPTH_VAR: &str = "EXPR_CALC_MAX_DEPTH";
pub const MAX_EVAL_DEPTH_VAR: &str = "EXPR_CALC_MAX_EVAL_DEPTH";

/// Bounds on recursion so adversarial input fails with an error instead of
/// exhausting the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum bracket and function nesting accepted by the grouper and parser.
    /// The argument of a function call sits one level below the call, as if
    /// bracketed, so `Sin1` and `Sin(1)` nest exactly as deep as `(1)`.
    pub max_depth: usize,
    /// Maximum depth of the evaluation walk, variable indirection included.
    pub max_eval_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: DEFAULT_MAX_DEPTH,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }
}

fn read_var(key: &str, default: usize) -> usize {
    match env::var(key) {
        Ok(val) => match val.trim().parse() {
            Ok(x) => x,
            Err(_) => {
                warn!("ignoring {}={:?}, expected a positive integer", key, val);
                default
            }
        },
        Err(_) => default,
    }
}

impl Limits {
    pub fn from_env() -> Self {
        let limits = Limits {
            max_depth: read_var(MAX_DEPTH_VAR, DEFAULT_MAX_DEPTH),
            max_eval_depth: read_var(MAX_EVAL_DEPTH_VAR, DEFAULT_MAX_EVAL_DEPTH),
        };
        debug!("using {:?}", limits);
        limits
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Limits { max_depth, ..self }
    }

    pub fn with_max_eval_depth(self, max_eval_depth: usize) -> Self {
        Limits {
            max_eval_depth,
            ..self
        }
    }
}
