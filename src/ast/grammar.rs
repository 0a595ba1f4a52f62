use crate::ast::{GrammarError, Reducer, TokenKind};
use crate::functions::register_functions;
use log::debug;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

/// A binary infix operator.
#[derive(Debug, Clone)]
pub struct OperatorDescriptor {
    pub symbol: String,
    pub precedence: i32,
    pub associativity: Associativity,
    pub(crate) reducer: Reducer,
}

impl OperatorDescriptor {
    /// Infix operators are always binary.
    pub const ARITY: usize = 2;

    pub fn is_left_associative(&self) -> bool {
        self.associativity == Associativity::Left
    }
}

/// A named function with a fixed number of arguments.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    pub name: String,
    pub arity: usize,
    pub(crate) reducer: Reducer,
}

impl FunctionDescriptor {
    /// How the function shows up in compile errors, e.g. `sin()`.
    pub fn label(&self) -> String {
        format!("{}()", self.name)
    }
}

#[derive(Debug, Clone)]
enum Symbol {
    Operator(OperatorDescriptor),
    OpenParen,
    CloseParen,
    Comma,
}

/// Tables of known symbols and functions consulted by the lexer and the
/// compiler.
///
/// A grammar is a plain value: each [`Compiler`](crate::ast::Compiler) owns
/// one, so registering an operator never affects another compiler.
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: HashMap<String, Symbol>,
    symbol_chars: HashSet<char>,
    /// Byte length of the longest registered symbol.
    max_symbol_len: usize,
    functions: HashMap<String, FunctionDescriptor>,
}

impl Default for Grammar {
    /// The arithmetic operators plus the built-in function library.
    fn default() -> Self {
        let mut grammar = Self::arithmetic();
        register_functions(&mut grammar);
        grammar
    }
}

impl Grammar {
    /// A grammar that only knows `(`, `)` and `,`.
    pub fn empty() -> Self {
        let mut grammar = Self {
            symbols: HashMap::new(),
            symbol_chars: HashSet::new(),
            max_symbol_len: 0,
            functions: HashMap::new(),
        };
        grammar.insert_symbol("(", Symbol::OpenParen);
        grammar.insert_symbol(")", Symbol::CloseParen);
        grammar.insert_symbol(",", Symbol::Comma);
        grammar
    }

    /// `+ -` (2, left), `* /` (3, left) and `^` (4, right), without functions.
    pub fn arithmetic() -> Self {
        let mut grammar = Self::empty();
        grammar.insert_operator("+", 2, Associativity::Left, |a, b| a + b);
        grammar.insert_operator("-", 2, Associativity::Left, |a, b| a - b);
        grammar.insert_operator("*", 3, Associativity::Left, |a, b| a * b);
        grammar.insert_operator("/", 3, Associativity::Left, |a, b| a / b);
        grammar.insert_operator("^", 4, Associativity::Right, f64::powf);
        grammar
    }

    /// Registers (or replaces) a binary infix operator.
    ///
    /// The symbol must be made of punctuation only: letters, digits, `_` and
    /// whitespace are rejected, as are the reserved `(`, `)` and `,`.
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
        let reserved = matches!(
            self.symbols.get(symbol),
            Some(Symbol::OpenParen | Symbol::CloseParen | Symbol::Comma)
        );
        if !is_operator_syntax(symbol) || reserved {
            return Err(GrammarError::InvalidOperatorSyntax(symbol.to_string()));
        }
        self.insert_operator(symbol, precedence, associativity, reducer);
        Ok(())
    }

    /// Registers (or replaces) a function taking exactly `arity` arguments.
    pub fn register_function<F>(
        &mut self,
        name: &str,
        arity: usize,
        reducer: F,
    ) -> Result<(), GrammarError>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        if !is_identifier(name) {
            return Err(GrammarError::InvalidFunctionName(name.to_string()));
        }
        self.insert_function(name, arity, reducer);
        Ok(())
    }

    pub fn operator(&self, symbol: &str) -> Option<&OperatorDescriptor> {
        match self.symbols.get(symbol) {
            Some(Symbol::Operator(op)) => Some(op),
            _ => None,
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name)
    }

    pub fn remove_function(&mut self, name: &str) -> Option<FunctionDescriptor> {
        self.functions.remove(name)
    }

    /// The token kind of a complete registered symbol.
    pub fn symbol_kind(&self, text: &str) -> Option<TokenKind> {
        self.symbols.get(text).map(|symbol| match symbol {
            Symbol::Operator(_) => TokenKind::Operator,
            Symbol::OpenParen => TokenKind::OpenParen,
            Symbol::CloseParen => TokenKind::CloseParen,
            Symbol::Comma => TokenKind::Comma,
        })
    }

    /// No registered symbol is longer than this many bytes.
    pub fn max_symbol_len(&self) -> usize {
        self.max_symbol_len
    }

    /// Whether `c` occurs in at least one registered symbol.
    pub fn is_symbol_char(&self, c: char) -> bool {
        self.symbol_chars.contains(&c)
    }

    pub(crate) fn insert_operator<F>(
        &mut self,
        symbol: &str,
        precedence: i32,
        associativity: Associativity,
        reducer: F,
    ) where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        debug!("register operator {symbol:?} precedence {precedence} {associativity:?}");
        let descriptor = OperatorDescriptor {
            symbol: symbol.to_string(),
            precedence,
            associativity,
            reducer: Reducer::new(move |args: &[f64]| reducer(args[0], args[1])),
        };
        self.insert_symbol(symbol, Symbol::Operator(descriptor));
    }

    pub(crate) fn insert_function<F>(&mut self, name: &str, arity: usize, reducer: F)
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        debug!("register function {name}/{arity}");
        self.functions.insert(
            name.to_string(),
            FunctionDescriptor {
                name: name.to_string(),
                arity,
                reducer: Reducer::new(reducer),
            },
        );
    }

    fn insert_symbol(&mut self, text: &str, symbol: Symbol) {
        self.symbol_chars.extend(text.chars());
        self.max_symbol_len = self.max_symbol_len.max(text.len());
        self.symbols.insert(text.to_string(), symbol);
    }
}

fn is_operator_syntax(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| !(c.is_alphanumeric() || c == '_' || c.is_whitespace()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
