pub mod ast;
pub mod functions;

pub use ast::{
    Associativity, CompileError, Compiler, CompilerConfig, Context, EvalError, Expression,
    Grammar, GrammarError, LexError, MapContext,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Compiles `input` against the default grammar.
pub fn compile(input: &str) -> Result<Expression, CompileError> {
    Compiler::build(&Grammar::default(), input)
}

/// Compiles and evaluates `expression` in one go.
pub fn evaluate_expression(
    expression: &str,
    context: Option<&mut dyn Context>,
) -> Result<f64, Error> {
    let ast = compile(expression)?;
    Ok(ast.eval(context)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_expression() {
        let mut context: MapContext = [("price", 100.0), ("volume", 50.0)].into_iter().collect();

        assert_eq!(
            evaluate_expression("price + volume", Some(&mut context)).unwrap(),
            150.0
        );
        assert_eq!(
            evaluate_expression("(price - volume) * 2", Some(&mut context)).unwrap(),
            100.0
        );
        assert_eq!(evaluate_expression("1.0 + 2.0", None).unwrap(), 3.0);
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            evaluate_expression("(1 + 2", None),
            Err(Error::Compile(CompileError::MismatchedParenthesis { .. }))
        ));
        assert!(matches!(
            evaluate_expression("price", None),
            Err(Error::Eval(EvalError::NoContext { .. }))
        ));

        let mut context = MapContext::new();
        let err = evaluate_expression("price", Some(&mut context)).unwrap_err();
        assert_eq!(err.to_string(), "Could not find 'price' in context");
    }
}
