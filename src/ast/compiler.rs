use crate::ast::{
    Associativity, CompileError, Expression, FunctionDescriptor, Grammar, GrammarError, Lexer,
    NodeId, OperatorDescriptor, Reducer, TokenKind, TreeBuilder,
};
use log::{debug, trace};
use lru::LruCache;
use std::num::NonZeroUsize;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Number of compiled expressions kept, keyed by source text. `0`
    /// disables the cache.
    pub cache_capacity: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 128,
        }
    }
}

/// Compiles source text into [`Expression`] trees against the [`Grammar`] it
/// owns.
pub struct Compiler {
    grammar: Grammar,
    cache: Option<LruCache<String, Expression>>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// A compiler for the default grammar: arithmetic operators and the
    /// built-in functions.
    pub fn new() -> Self {
        Self::with_grammar(Grammar::default())
    }

    pub fn with_grammar(grammar: Grammar) -> Self {
        Self::with_config(grammar, CompilerConfig::default())
    }

    pub fn with_config(grammar: Grammar, config: CompilerConfig) -> Self {
        Self {
            grammar,
            cache: NonZeroUsize::new(config.cache_capacity).map(LruCache::new),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Mutable access to the grammar. Drops every cached expression, since
    /// the same text may now compile differently.
    pub fn grammar_mut(&mut self) -> &mut Grammar {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
        &mut self.grammar
    }

    pub fn register_operator<F>(
        &mut self,
        symbol: &str,
        precedence: i32,
        associativity: Associativity,
        reducer: F,
    ) -> Result<(), GrammarError>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.grammar_mut()
            .register_operator(symbol, precedence, associativity, reducer)
    }

    pub fn register_function<F>(
        &mut self,
        name: &str,
        arity: usize,
        reducer: F,
    ) -> Result<(), GrammarError>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.grammar_mut().register_function(name, arity, reducer)
    }

    /// Compiles `input`, reusing a cached tree for text seen before.
    pub fn compile(&mut self, input: &str) -> Result<Expression, CompileError> {
        if let Some(expression) = self.cache.as_mut().and_then(|cache| cache.get(input)) {
            trace!("Cache hit for expression: {}", input);
            return Ok(expression.clone());
        }

        let expression = Self::build(&self.grammar, input)?;
        if let Some(cache) = self.cache.as_mut() {
            cache.put(input.to_string(), expression.clone());
        }
        Ok(expression)
    }

    /// Compiles `input` against `grammar` without any caching.
    pub fn build(grammar: &Grammar, input: &str) -> Result<Expression, CompileError> {
        debug!("Compiling expression: {}", input);
        let expression = ShuntingYard::new(grammar, input).run()?;
        trace!("Compiled tree: {:#?}", expression);
        Ok(expression)
    }
}

#[derive(Debug)]
enum Pending<'g> {
    Infix(&'g OperatorDescriptor),
    Function(&'g FunctionDescriptor),
    OpenParen,
}

struct ShuntingYard<'a> {
    input: &'a str,
    grammar: &'a Grammar,
    builder: TreeBuilder,
    output: Vec<NodeId>,
    operators: Vec<Pending<'a>>,
}

impl<'a> ShuntingYard<'a> {
    fn new(grammar: &'a Grammar, input: &'a str) -> Self {
        Self {
            input,
            grammar,
            builder: TreeBuilder::default(),
            output: Vec::new(),
            operators: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Expression, CompileError> {
        let mut lexer = Lexer::new(self.input, self.grammar);

        while let Some(token) = lexer.next_token()? {
            match token.kind {
                TokenKind::Number => {
                    let value =
                        token
                            .text
                            .parse::<f64>()
                            .map_err(|source| CompileError::InvalidNumber {
                                literal: token.text.to_string(),
                                source,
                            })?;
                    let node = self.builder.literal(value);
                    self.output.push(node);
                }

                TokenKind::Identifier => match self.grammar.function(token.text) {
                    Some(function) => self.operators.push(Pending::Function(function)),
                    None => {
                        let node = self.builder.reference(token.text);
                        self.output.push(node);
                    }
                },

                TokenKind::Comma => {
                    if !self.reduce_until_open_paren()? {
                        return Err(CompileError::MisplacedComma {
                            input: self.input.to_string(),
                        });
                    }
                }

                TokenKind::Operator => {
                    let incoming = self.grammar.operator(token.text).ok_or_else(|| {
                        CompileError::UnknownOperator(token.text.to_string())
                    })?;
                    self.push_infix(incoming)?;
                }

                TokenKind::OpenParen => self.operators.push(Pending::OpenParen),

                TokenKind::CloseParen => {
                    if !self.reduce_until_open_paren()? {
                        return Err(self.mismatched_parenthesis());
                    }
                    self.operators.pop();
                    // A group right after a function name is its argument list.
                    if let Some(Pending::Function(_)) = self.operators.last() {
                        self.reduce_top()?;
                    }
                }
            }
        }

        while !self.operators.is_empty() {
            self.reduce_top()?;
        }

        match self.output.as_slice() {
            &[root] => Ok(self.builder.finish(root)),
            rest => Err(CompileError::LeftoverOperands { count: rest.len() }),
        }
    }

    /// Equal precedence reduces only when the incoming operator is left
    /// associative, so right associative chains nest to the right.
    fn push_infix(&mut self, incoming: &'a OperatorDescriptor) -> Result<(), CompileError> {
        while let Some(Pending::Infix(top)) = self.operators.last() {
            let reduce = top.precedence > incoming.precedence
                || (top.precedence == incoming.precedence && incoming.is_left_associative());
            if !reduce {
                break;
            }
            self.reduce_top()?;
        }
        self.operators.push(Pending::Infix(incoming));
        Ok(())
    }

    /// Reduces operators until an open parenthesis is on top. Returns `false`
    /// if the stack ran empty first.
    fn reduce_until_open_paren(&mut self) -> Result<bool, CompileError> {
        loop {
            match self.operators.last() {
                None => return Ok(false),
                Some(Pending::OpenParen) => return Ok(true),
                Some(_) => self.reduce_top()?,
            }
        }
    }

    fn reduce_top(&mut self) -> Result<(), CompileError> {
        match self.operators.pop() {
            Some(Pending::Infix(op)) => {
                self.apply(op.symbol.clone(), OperatorDescriptor::ARITY, &op.reducer)
            }
            Some(Pending::Function(function)) => {
                self.apply(function.label(), function.arity, &function.reducer)
            }
            // Only reachable once the input is exhausted.
            Some(Pending::OpenParen) => Err(self.mismatched_parenthesis()),
            None => Ok(()),
        }
    }

    fn apply(&mut self, label: String, arity: usize, reducer: &Reducer) -> Result<(), CompileError> {
        let available = self.output.len();
        if available < arity {
            return Err(CompileError::StackUnderflow {
                operator: label,
                needed: arity,
                available,
            });
        }

        // The last pushed operand is the last argument.
        let children = self.output.split_off(available - arity);
        let node = self.builder.operation(label, children, arity, reducer.clone());
        self.output.push(node);
        Ok(())
    }

    fn mismatched_parenthesis(&self) -> CompileError {
        CompileError::MismatchedParenthesis {
            input: self.input.to_string(),
        }
    }
}
