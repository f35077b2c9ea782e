#[macro_use]
extern crate log;

use std::io;
use std::io::prelude::*;

use env_logger::Env;
use expr_calculator::{compile_with, evaluate, funcs, Context, Error, Limits, Span};

fn print_error(line: &str, err: &Error) {
    if let Some(Span(a, b)) = err.span() {
        eprintln!("{}", line);

        let mut msg = String::new();
        (0..a).for_each(|_| msg.push(' '));
        (a..b.max(a + 1)).for_each(|_| msg.push('^'));
        eprintln!("{}", msg);
    }

    eprintln!("error: {}", err);
}

fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => chars.all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// `name=expression` binds a variable, anything else is evaluated.
fn execute_line(line: &str, ctx: &mut Context) {
    let limits = *ctx.limits();

    if let Some((name, rhs)) = line.split_once('=') {
        let (name, rhs) = (name.trim(), rhs.trim());
        if !is_variable_name(name) {
            eprintln!("error: invalid variable name '{}'", name);
            return;
        }

        match compile_with(rhs, &limits) {
            Ok(expr) => {
                println!(" {} = {}", name, expr);
                ctx.set_variable(name, expr);
            }
            Err(err) => print_error(rhs, &err),
        }
        return;
    }

    let root = match compile_with(line, &limits) {
        Ok(x) => x,
        Err(err) => {
            print_error(line, &err);
            return;
        }
    };

    match evaluate(&root, Some(ctx)) {
        Ok(x) => println!(" {:?}", x),
        Err(err) => print_error(line, &Error::from(err)),
    }
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let exit_cmds = vec!["exit", "quit"];
    let input = io::stdin();
    let mut output = io::stdout();

    let limits = Limits::from_env();
    let mut ctx = funcs::create_with(limits);

    info!("starting calculator with {:?}", limits);

    loop {
        output.write_all(b">>> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim();
        if exit_cmds.contains(&line) {
            break;
        }
        if line.is_empty() {
            continue;
        }

        execute_line(line, &mut ctx);
    }

    Ok(())
}
