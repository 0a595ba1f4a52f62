use meval_rs::{Compiler, MapContext};

fn main() {
    pretty_env_logger::init();

    let mut contexts: Vec<MapContext> = vec![
        [("price", 120.0), ("volume", 3000.0)].into_iter().collect(),
        [("price", 80.0), ("volume", 6000.0)].into_iter().collect(),
        [("price", 95.5)].into_iter().collect(),
    ];

    let expression = "price * volume / 1000";

    let compiled = Compiler::new().compile(expression).unwrap();
    for (i, result) in compiled.eval_batch(&mut contexts).into_iter().enumerate() {
        println!("Result {}: {:?}", i, result);
    }
}
