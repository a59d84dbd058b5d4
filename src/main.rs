use std::env;
use std::fs;
use std::process;

use minicc::{codegen, lexer, offsets, parser};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: minicc <file.c>");
        process::exit(1);
    }
    let path = &args[1];

    let mut source = fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("{path}: {err}");
        process::exit(1);
    });
    if !source.ends_with('\n') {
        source.push('\n');
    }

    let tokens = lexer::tokenize(&source).unwrap_or_else(|diag| diag.fatal(path, &source));
    let program = parser::parse(tokens).unwrap_or_else(|diag| diag.fatal(path, &source));
    offsets::assign(&program);
    let asm = codegen::generate(&program).unwrap_or_else(|diag| diag.fatal(path, &source));

    print!("{asm}");
}
