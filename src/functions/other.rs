use crate::ast::Grammar;
use meval_macros::meval_fn;
use std::f64::consts;

pub fn register(grammar: &mut Grammar) {
    grammar.insert_function("pi", PI_ARITY, pi);
    grammar.insert_function("rand", RAND_ARITY, rand);
}

#[meval_fn]
pub fn pi() -> f64 {
    consts::PI
}

/// Uniformly distributed in `[0, 1)`.
#[meval_fn]
pub fn rand() -> f64 {
    ::rand::random::<f64>()
}
