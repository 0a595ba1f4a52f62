use log::debug;
use meval_rs::{Associativity, Compiler};

fn main() {
    pretty_env_logger::init();

    let mut compiler = Compiler::new();
    compiler
        .register_operator("%", 3, Associativity::Left, |a, b| a % b)
        .expect("valid operator");

    for expr in ["2 ^ 3 ^ 2", "8 - 3 - 2", "( cos(42.0) * 3.14159 + 2 ) ^2.45", "17 % 5", "sin()"] {
        match compiler.compile(expr) {
            Ok(compiled) => {
                debug!("compiled: {compiled:?}");
                match compiled.eval(None) {
                    Ok(result) => println!("{expr} = {result}"),
                    Err(err) => println!("{expr}: evaluation error: {err}"),
                }
            }
            Err(err) => println!("{expr}: compile error: {err}"),
        }
    }
}
