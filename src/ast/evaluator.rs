use crate::ast::{Context, EvalError, Expression, Node};
use log::trace;
use rayon::prelude::*;

impl Expression {
    /// Evaluates the tree. References are resolved against `context`; with
    /// no context, any reference is an error.
    pub fn eval(&self, context: Option<&mut dyn Context>) -> Result<f64, EvalError> {
        self.eval_arena(context)
    }

    /// Evaluates the tree once per context, in parallel.
    pub fn eval_batch<C>(&self, contexts: &mut [C]) -> Vec<Result<f64, EvalError>>
    where
        C: Context + Send,
    {
        contexts
            .par_iter_mut()
            .map(|context| {
                let context: &mut dyn Context = context;
                self.eval(Some(context))
            })
            .collect()
    }

    /// Children are stored before their parent, so one pass in index order
    /// sees every operand before the operation using it. Only references
    /// recurse, into the expression they resolve to.
    fn eval_arena<'c>(
        &self,
        mut context: Option<&mut (dyn Context + 'c)>,
    ) -> Result<f64, EvalError> {
        let nodes = &self.tree.nodes[..=self.root().index()];
        let mut values: Vec<f64> = Vec::with_capacity(nodes.len());
        let mut args: Vec<f64> = Vec::new();

        for node in nodes {
            let value = match node {
                Node::Literal(value) => *value,

                Node::Reference(name) => resolve(name, context.as_deref_mut())?,

                Node::Operation {
                    label,
                    children,
                    arity,
                    reducer,
                } => {
                    if children.len() != *arity {
                        return Err(EvalError::BadTree {
                            expected: *arity,
                            got: children.len(),
                        });
                    }

                    args.clear();
                    args.extend(children.iter().map(|child| values[child.index()]));
                    let value = reducer.call(&args);
                    trace!("{label} {args:?} = {value}");
                    value
                }
            };
            values.push(value);
        }

        values.pop().ok_or(EvalError::BadTree {
            expected: 1,
            got: 0,
        })
    }
}

fn resolve<'c>(name: &str, context: Option<&mut (dyn Context + 'c)>) -> Result<f64, EvalError> {
    let Some(context) = context else {
        return Err(EvalError::NoContext {
            name: name.to_string(),
        });
    };

    let expression = context.get(name)?;
    if let Some(chain) = context.call_stack().cycle(expression.id(), name) {
        return Err(EvalError::CyclicDependency { chain });
    }

    trace!("resolving '{name}'");
    context.call_stack_mut().push(name, expression.id());
    let result = expression.eval_arena(Some(&mut *context));
    context.call_stack_mut().pop();
    result
}
