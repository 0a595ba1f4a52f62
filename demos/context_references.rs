use meval_rs::{Compiler, MapContext};

fn main() {
    pretty_env_logger::init();

    let mut compiler = Compiler::new();
    let mut context = MapContext::new();
    context.set_value("radius", 2.0);
    context
        .compile_and_add("area", "pi() * radius ^ 2", &mut compiler)
        .expect("Failed to compile");

    let expression = compiler.compile("area * 3").expect("Failed to compile");
    match expression.eval(Some(&mut context)) {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {}", err),
    }

    // radius now depends on area, which depends on radius.
    context
        .compile_and_add("radius", "sqrt(area)", &mut compiler)
        .expect("Failed to compile");
    match expression.eval(Some(&mut context)) {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {}", err),
    }
}
