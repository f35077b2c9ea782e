//! AFL target: any input must come back as a value or an error, never a panic.
//!
//! cargo afl build --features fuzz --bin fuzz

use afl::fuzz;
use expr_calculator::{calculate, funcs, Limits};

fn main() {
    let ctx = funcs::create_with(Limits::default().with_max_depth(64));

    fuzz!(|data: &[u8]| {
        if let Ok(line) = std::str::from_utf8(data) {
            let _ = calculate(line, Some(&ctx));
        }
    });
}
