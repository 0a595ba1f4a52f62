use std::num::ParseFloatError;
use thiserror::Error;

/// Errors raised while cutting the input into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A number literal is followed by a letter or digit it cannot absorb.
    #[error("Bad number syntax {0:?}")]
    BadNumberSyntax(String),
    #[error("Got unexpected character '{0}'")]
    UnexpectedCharacter(char),
    /// Symbol characters that do not start with any registered symbol.
    #[error("Invalid token {0:?} found")]
    InvalidToken(String),
}

/// Errors raised while turning a token stream into a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The lexer accepted a literal that `f64` parsing rejects, which is the
    /// case for every `0x`/`0b` literal and for the `i` suffix.
    #[error("Lexer gave us value {literal}, which cannot be converted to a float: {source}")]
    InvalidNumber {
        literal: String,
        source: ParseFloatError,
    },

    /// A symbol the lexer accepted that the grammar has no operator for.
    #[error("Operator '{0}' is not yet implemented")]
    UnknownOperator(String),

    #[error("Mismatched parenthesis in {input}")]
    MismatchedParenthesis { input: String },

    #[error("Misplaced comma or mismatched parenthesis in {input}")]
    MisplacedComma { input: String },

    #[error("Evaluation stack error for '{operator}', need {needed} element, but only {available} provided")]
    StackUnderflow {
        operator: String,
        needed: usize,
        available: usize,
    },

    #[error("Evaluation stack error, still got {count} elements instead of 1 at the final state")]
    LeftoverOperands { count: usize },
}

/// Errors raised while evaluating a compiled tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("'{name}' referenced, but no context provided")]
    NoContext { name: String },

    #[error("Could not find '{name}' in context")]
    NotFound { name: String },

    /// `chain` runs from the first repeated reference to the one closing the
    /// cycle, so its first and last names are equal.
    #[error("Got cyclic dependency {}", .chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    #[error("Bad tree, expression expected {expected} children, got {got}")]
    BadTree { expected: usize, got: usize },
}

/// Errors raised when extending a [`Grammar`](crate::ast::Grammar).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Invalid operator syntax {0:?}")]
    InvalidOperatorSyntax(String),

    #[error("Invalid function name {0:?}")]
    InvalidFunctionName(String),
}
