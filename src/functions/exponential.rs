use crate::ast::Grammar;
use meval_macros::meval_fn;

pub fn register(grammar: &mut Grammar) {
    grammar.insert_function("sqrt", SQRT_ARITY, sqrt);
    grammar.insert_function("exp", EXP_ARITY, exp);
    grammar.insert_function("ln", LN_ARITY, ln);
    grammar.insert_function("log10", LOG10_ARITY, log10);
    grammar.insert_function("log", LOG10_ARITY, log10);
}

#[meval_fn]
pub fn sqrt(x: f64) -> f64 {
    x.sqrt()
}

#[meval_fn]
pub fn exp(x: f64) -> f64 {
    x.exp()
}

/// Natural logarithm.
#[meval_fn]
pub fn ln(x: f64) -> f64 {
    x.ln()
}

#[meval_fn]
pub fn log10(x: f64) -> f64 {
    x.log10()
}
