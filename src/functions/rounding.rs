use crate::ast::Grammar;
use meval_macros::meval_fn;

pub fn register(grammar: &mut Grammar) {
    grammar.insert_function("ceil", CEIL_ARITY, ceil);
    grammar.insert_function("floor", FLOOR_ARITY, floor);
}

#[meval_fn]
pub fn ceil(x: f64) -> f64 {
    x.ceil()
}

#[meval_fn]
pub fn floor(x: f64) -> f64 {
    x.floor()
}
