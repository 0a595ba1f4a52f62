use crate::ast::{CompileError, Compiler, EvalError, Expression, ExpressionId};
use std::collections::HashMap;

/// A source of named expressions that references are resolved against.
///
/// Implementors also carry the [`CallStack`] used to detect cyclic
/// references. Evaluation borrows the context mutably, so one context can
/// only take part in a single evaluation at a time.
pub trait Context {
    /// Returns the expression bound to `name`.
    fn get(&self, name: &str) -> Result<Expression, EvalError>;

    fn call_stack(&self) -> &CallStack;

    fn call_stack_mut(&mut self) -> &mut CallStack;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    name: String,
    expression: ExpressionId,
}

/// References currently being resolved, outermost first.
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|frame| frame.name.as_str())
    }

    /// If `expression` is already being evaluated, returns the chain of
    /// names from its first frame through `name`, the reference that would
    /// evaluate it again.
    pub fn cycle(&self, expression: ExpressionId, name: &str) -> Option<Vec<String>> {
        let first = self
            .frames
            .iter()
            .position(|frame| frame.expression == expression)?;

        let mut chain: Vec<String> = self.frames[first..]
            .iter()
            .map(|frame| frame.name.clone())
            .collect();
        chain.push(name.to_string());
        Some(chain)
    }

    pub(crate) fn push(&mut self, name: &str, expression: ExpressionId) {
        self.frames.push(Frame {
            name: name.to_string(),
            expression,
        });
    }

    pub(crate) fn pop(&mut self) {
        let frame = self.frames.pop();
        debug_assert!(frame.is_some(), "call stack popped while empty");
    }
}

/// The simplest [`Context`]: a dictionary of expressions.
#[derive(Debug, Clone, Default)]
pub struct MapContext {
    call_stack: CallStack,
    expressions: HashMap<String, Expression>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `expression`, replacing any previous binding.
    pub fn add(&mut self, name: &str, expression: Expression) {
        self.expressions.insert(name.to_string(), expression);
    }

    /// Binds `name` to a constant.
    pub fn set_value(&mut self, name: &str, value: f64) {
        self.add(name, Expression::literal(value));
    }

    /// Compiles `input` with `compiler` and binds the result to `name`. On
    /// error the context is left untouched.
    pub fn compile_and_add(
        &mut self,
        name: &str,
        input: &str,
        compiler: &mut Compiler,
    ) -> Result<(), CompileError> {
        let expression = compiler.compile(input)?;
        self.add(name, expression);
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Option<Expression> {
        self.expressions.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.expressions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for MapContext {
    fn from_iter<T: IntoIterator<Item = (&'a str, f64)>>(iter: T) -> Self {
        let mut context = MapContext::new();
        for (name, value) in iter {
            context.set_value(name, value);
        }
        context
    }
}

impl Context for MapContext {
    fn get(&self, name: &str) -> Result<Expression, EvalError> {
        self.expressions
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::NotFound {
                name: name.to_string(),
            })
    }

    fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    fn call_stack_mut(&mut self) -> &mut CallStack {
        &mut self.call_stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_store_expression() {
        let mut compiler = Compiler::new();
        let mut context = MapContext::new();

        context.compile_and_add("foo", "3.0", &mut compiler).unwrap();
        assert!(context.contains("foo"));
        assert_eq!(context.get("foo").unwrap().eval(None).unwrap(), 3.0);

        assert!(context.compile_and_add("bar", "+0x", &mut compiler).is_err());
        assert!(!context.contains("bar"));
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_add_overwrites_and_delete_removes() {
        let mut context = MapContext::new();
        context.set_value("x", 1.0);
        context.set_value("x", 2.0);
        assert_eq!(context.len(), 1);
        assert_eq!(context.get("x").unwrap().eval(None).unwrap(), 2.0);

        assert!(context.delete("x").is_some());
        assert!(context.delete("x").is_none());
        assert!(context.is_empty());
        assert_eq!(
            context.get("x").unwrap_err(),
            EvalError::NotFound {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_from_values() {
        let context: MapContext = [("price", 100.0), ("volume", 50.0)].into_iter().collect();
        assert_eq!(context.len(), 2);
        assert_eq!(context.get("volume").unwrap().eval(None).unwrap(), 50.0);
    }

    #[test]
    fn test_call_stack_cycle_chain() {
        let a = Expression::literal(1.0);
        let b = Expression::literal(2.0);
        let c = Expression::literal(3.0);

        let mut stack = CallStack::new();
        stack.push("a", a.id());
        stack.push("b", b.id());
        stack.push("c", c.id());
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        assert_eq!(
            stack.cycle(b.id(), "b"),
            Some(vec!["b".to_string(), "c".to_string(), "b".to_string()])
        );
        assert_eq!(stack.cycle(Expression::literal(4.0).id(), "d"), None);

        stack.pop();
        stack.pop();
        stack.pop();
        assert!(stack.is_empty());
    }
}
