use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

mod compiler;
mod context;
mod error;
mod evaluator;
mod grammar;
mod lexer;

pub use compiler::*;
pub use context::*;
pub use error::*;
pub use grammar::*;
pub use lexer::*;

/// The function combining the evaluated operands of an operator or function.
#[derive(Clone)]
pub struct Reducer(Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>);

impl Reducer {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(function))
    }

    pub fn call(&self, args: &[f64]) -> f64 {
        (self.0)(args)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reducer(..)")
    }
}

/// Index of a node inside the arena of one [`Expression`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Literal(f64),
    /// A variable, resolved against the context at evaluation time.
    Reference(String),
    /// An operator or function application. `label` is the operator symbol
    /// or `name()` for functions.
    Operation {
        label: String,
        children: Vec<NodeId>,
        arity: usize,
        reducer: Reducer,
    },
}

/// Process-unique identity of a compiled expression, shared by its clones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionId(u64);

static NEXT_EXPRESSION_ID: AtomicU64 = AtomicU64::new(0);

impl ExpressionId {
    fn next() -> Self {
        Self(NEXT_EXPRESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct Tree {
    id: ExpressionId,
    nodes: Vec<Node>,
    root: NodeId,
}

/// A compiled, immutable expression tree.
///
/// Cloning is cheap and keeps the [`ExpressionId`]; the tree can be evaluated
/// from several threads at once as long as each uses its own context.
#[derive(Debug, Clone)]
pub struct Expression {
    tree: Arc<Tree>,
}

impl Expression {
    /// An expression made of a single literal.
    pub fn literal(value: f64) -> Self {
        let mut builder = TreeBuilder::default();
        let root = builder.literal(value);
        builder.finish(root)
    }

    pub fn id(&self) -> ExpressionId {
        self.tree.id
    }

    pub fn root(&self) -> NodeId {
        self.tree.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.nodes.get(id.0)
    }

    /// All nodes, children always stored before their parent. The root is
    /// the last node.
    pub fn nodes(&self) -> &[Node] {
        &self.tree.nodes
    }

    /// Names of all references, in source order, duplicates included.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.tree.nodes.iter().filter_map(|node| match node {
            Node::Reference(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Appends nodes to an arena and seals it into an [`Expression`].
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub(crate) fn literal(&mut self, value: f64) -> NodeId {
        self.push(Node::Literal(value))
    }

    pub(crate) fn reference(&mut self, name: &str) -> NodeId {
        self.push(Node::Reference(name.to_string()))
    }

    pub(crate) fn operation(
        &mut self,
        label: String,
        children: Vec<NodeId>,
        arity: usize,
        reducer: Reducer,
    ) -> NodeId {
        debug_assert_eq!(children.len(), arity, "operation '{}' arity", label);
        debug_assert!(children.iter().all(|child| child.0 < self.nodes.len()));
        self.push(Node::Operation {
            label,
            children,
            arity,
            reducer,
        })
    }

    pub(crate) fn finish(self, root: NodeId) -> Expression {
        Expression {
            tree: Arc::new(Tree {
                id: ExpressionId::next(),
                nodes: self.nodes,
                root,
            }),
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}
