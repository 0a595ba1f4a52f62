pub mod exponential;
pub mod other;
pub mod rounding;
pub mod trigonometry;

use crate::ast::Grammar;

/// Registers every built-in function into `grammar`.
pub fn register_functions(grammar: &mut Grammar) {
    trigonometry::register(grammar);
    exponential::register(grammar);
    rounding::register(grammar);
    other::register(grammar);
}

#[cfg(test)]
mod tests {
    use crate::ast::Compiler;
    use std::f64::consts::PI;

    fn eval(compiler: &mut Compiler, input: &str) -> f64 {
        compiler.compile(input).unwrap().eval(None).unwrap()
    }

    #[test]
    fn test_builtin_functions() {
        let mut compiler = Compiler::new();
        let cases = [
            (0.0, "sin(0.0)"),
            (0.0, "asin(0.0)"),
            (1.0, "cos(0.0)"),
            (0.0, "acos(1.0)"),
            (0.0, "tan(0.0)"),
            (0.0, "atan(0.0)"),
            (0.0, "sqrt(0.0)"),
            (3.0, "sqrt(9)"),
            (1.0, "exp(0.0)"),
            (0.0, "ln(1.0)"),
            (1.0, "log(10.0)"),
            (2.0, "log10(100)"),
            (2.0, "ceil(1.5)"),
            (1.0, "floor(1.5)"),
        ];

        for (expected, input) in cases {
            assert_eq!(eval(&mut compiler, input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_multi_and_zero_argument_functions() {
        let mut compiler = Compiler::new();
        assert!((eval(&mut compiler, "atan2(1.0,1.0)") - PI / 4.0).abs() < 1e-15);
        assert!((eval(&mut compiler, "pi() / 4") - PI / 4.0).abs() < 1e-15);
        assert_eq!(eval(&mut compiler, "2 * pi()"), 2.0 * PI);
    }

    #[test]
    fn test_can_generate_random() {
        let mut compiler = Compiler::new();
        let expression = compiler.compile("rand()").unwrap();
        for _ in 0..100 {
            let value = expression.eval(None).unwrap();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_generated_reducers() {
        assert_eq!(super::trigonometry::ATAN2_ARITY, 2);
        assert_eq!(super::other::PI_ARITY, 0);
        assert_eq!(super::exponential::SQRT_ARITY, 1);
        assert_eq!(super::exponential::sqrt(&[16.0]), 4.0);
        // Wrong argument counts never reach a reducer from a compiled tree.
        assert!(super::exponential::sqrt(&[1.0, 2.0]).is_nan());
    }
}
