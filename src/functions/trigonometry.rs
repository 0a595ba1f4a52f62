use crate::ast::Grammar;
use meval_macros::meval_fn;

pub fn register(grammar: &mut Grammar) {
    grammar.insert_function("sin", SIN_ARITY, sin);
    grammar.insert_function("cos", COS_ARITY, cos);
    grammar.insert_function("tan", TAN_ARITY, tan);
    grammar.insert_function("asin", ASIN_ARITY, asin);
    grammar.insert_function("acos", ACOS_ARITY, acos);
    grammar.insert_function("atan", ATAN_ARITY, atan);
    grammar.insert_function("atan2", ATAN2_ARITY, atan2);
}

#[meval_fn]
pub fn sin(x: f64) -> f64 {
    x.sin()
}

#[meval_fn]
pub fn cos(x: f64) -> f64 {
    x.cos()
}

#[meval_fn]
pub fn tan(x: f64) -> f64 {
    x.tan()
}

#[meval_fn]
pub fn asin(x: f64) -> f64 {
    x.asin()
}

#[meval_fn]
pub fn acos(x: f64) -> f64 {
    x.acos()
}

#[meval_fn]
pub fn atan(x: f64) -> f64 {
    x.atan()
}

/// Four-quadrant arctangent of `y / x`.
#[meval_fn]
pub fn atan2(y: f64, x: f64) -> f64 {
    y.atan2(x)
}
