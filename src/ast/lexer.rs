use crate::ast::{Grammar, LexError};
use log::trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Identifier,
    Operator,
    OpenParen,
    CloseParen,
    Comma,
}

/// A slice of the input together with its kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str) -> Self {
        Self { kind, text }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    Whitespace,
    Number,
    Hexadecimal,
    Binary,
    NumberEnd,
    Identifier,
    Symbol,
    Done,
}

enum Step<'a> {
    Next(State),
    Emit(Token<'a>),
}

/// Pull-based tokenizer.
///
/// Each call to [`Lexer::next_token`] runs the state machine until one token
/// is produced. After the end of input or the first error, the lexer stays
/// exhausted.
pub struct Lexer<'a> {
    input: &'a str,
    grammar: &'a Grammar,
    start: usize,
    pos: usize,
    state: State,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, grammar: &'a Grammar) -> Self {
        Self {
            input,
            grammar,
            start: 0,
            pos: 0,
            state: State::Whitespace,
        }
    }

    /// Returns the next token, `Ok(None)` at the end of input.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, LexError> {
        loop {
            let step = match self.state {
                State::Done => return Ok(None),
                State::Whitespace => self.lex_whitespace(),
                State::Number => self.lex_number(),
                State::Hexadecimal => Ok(self.lex_hexadecimal()),
                State::Binary => Ok(self.lex_binary()),
                State::NumberEnd => self.lex_number_end(),
                State::Identifier => Ok(self.lex_identifier()),
                State::Symbol => self.lex_symbol(),
            };

            match step {
                Ok(Step::Next(state)) => self.state = state,
                Ok(Step::Emit(token)) => {
                    trace!("token {:?} {:?}", token.kind, token.text);
                    self.state = State::Whitespace;
                    return Ok(Some(token));
                }
                Err(err) => {
                    self.state = State::Done;
                    return Err(err);
                }
            }
        }
    }

    fn lex_whitespace(&mut self) -> Result<Step<'a>, LexError> {
        self.accept_run(char::is_whitespace);
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return Ok(Step::Next(State::Done));
        };

        if c.is_ascii_digit() {
            return Ok(Step::Next(State::Number));
        }
        // A sign only belongs to a number when a digit follows it.
        if (c == '+' || c == '-') && self.peek_second().is_some_and(|d| d.is_ascii_digit()) {
            return Ok(Step::Next(State::Number));
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(Step::Next(State::Identifier));
        }
        if self.grammar.is_symbol_char(c) {
            return Ok(Step::Next(State::Symbol));
        }
        Err(LexError::UnexpectedCharacter(c))
    }

    fn lex_number(&mut self) -> Result<Step<'a>, LexError> {
        let signed = self.accept(|c| c == '+' || c == '-');

        if self.accept(|c| c == '0') {
            if self.accept(|c| c == 'x' || c == 'X') {
                if signed {
                    return Err(self.bad_number());
                }
                return Ok(Step::Next(State::Hexadecimal));
            }
            if self.accept(|c| c == 'b' || c == 'B') {
                if signed {
                    return Err(self.bad_number());
                }
                return Ok(Step::Next(State::Binary));
            }
        }

        self.accept_run(|c| c.is_ascii_digit());
        if self.accept(|c| c == '.') {
            self.accept_run(|c| c.is_ascii_digit());
        }
        if self.accept(|c| c == 'e' || c == 'E') {
            self.accept(|c| c == '+' || c == '-');
        }
        self.accept_run(|c| c.is_ascii_digit());
        self.accept(|c| c == 'i');

        Ok(Step::Next(State::NumberEnd))
    }

    /// The letter case of the first hex letter selects the alphabet for the
    /// rest of the literal, so `0xAbE` stops after `A`.
    fn lex_hexadecimal(&mut self) -> Step<'a> {
        self.accept_run(|c| c.is_ascii_digit());
        if self.accept(|c| matches!(c, 'a'..='f')) {
            self.accept_run(|c| c.is_ascii_digit() || matches!(c, 'a'..='f'));
        } else if self.accept(|c| matches!(c, 'A'..='F')) {
            self.accept_run(|c| c.is_ascii_digit() || matches!(c, 'A'..='F'));
        }
        Step::Next(State::NumberEnd)
    }

    fn lex_binary(&mut self) -> Step<'a> {
        self.accept_run(|c| c == '0' || c == '1');
        Step::Next(State::NumberEnd)
    }

    fn lex_number_end(&mut self) -> Result<Step<'a>, LexError> {
        if self.accept(|c| c.is_ascii_alphanumeric()) {
            return Err(self.bad_number());
        }
        Ok(Step::Emit(self.emit(TokenKind::Number)))
    }

    fn lex_identifier(&mut self) -> Step<'a> {
        self.accept_run(|c| c.is_ascii_alphanumeric() || c == '_');
        Step::Emit(self.emit(TokenKind::Identifier))
    }

    /// Longest match: keep scanning symbol characters, at most as far as the
    /// longest registered symbol, and remember the last position at which
    /// the scanned text was a registered symbol.
    fn lex_symbol(&mut self) -> Result<Step<'a>, LexError> {
        let grammar = self.grammar;
        let mut longest = None;
        loop {
            if let Some(kind) = grammar.symbol_kind(self.current()) {
                longest = Some((kind, self.pos));
            }
            if self.pos - self.start >= grammar.max_symbol_len()
                || !self.accept(|c| grammar.is_symbol_char(c))
            {
                break;
            }
        }

        let Some((kind, end)) = longest else {
            return Err(LexError::InvalidToken(self.current().to_string()));
        };
        self.pos = end;
        Ok(Step::Emit(self.emit(kind)))
    }

    // helpers

    fn current(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    fn emit(&mut self, kind: TokenKind) -> Token<'a> {
        let token = Token::new(kind, self.current());
        self.start = self.pos;
        token
    }

    fn bad_number(&self) -> LexError {
        LexError::BadNumberSyntax(self.current().to_string())
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn accept(&mut self, valid: impl Fn(char) -> bool) -> bool {
        match self.peek() {
            Some(c) if valid(c) => {
                self.pos += c.len_utf8();
                true
            }
            _ => false,
        }
    }

    fn accept_run(&mut self, valid: impl Fn(char) -> bool) {
        while self.accept(&valid) {}
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Associativity;

    fn lex_all(input: &str, grammar: &Grammar) -> Result<Vec<(TokenKind, String)>, LexError> {
        Lexer::new(input, grammar)
            .map(|token| token.map(|t| (t.kind, t.text.to_string())))
            .collect()
    }

    fn tokens(expected: &[(TokenKind, &str)]) -> Vec<(TokenKind, String)> {
        expected
            .iter()
            .map(|(kind, text)| (*kind, text.to_string()))
            .collect()
    }

    #[test]
    fn test_lex_numbers() {
        let numbers = [
            "2455",
            "-46",
            "+89e67",
            "+89.46E67",
            "35i",
            "35.46e-67",
            "35.46e+067",
            "0b111001",
            "0xabcdef46",
            "0XAB",
        ];
        let grammar = Grammar::default();
        let input = numbers.join(" ");

        let lexed = lex_all(&input, &grammar).unwrap();
        let expected: Vec<_> = numbers
            .iter()
            .map(|n| (TokenKind::Number, n.to_string()))
            .collect();
        assert_eq!(lexed, expected);
    }

    #[test]
    fn test_report_bad_number_syntax() {
        let grammar = Grammar::default();
        let cases = [
            ("+0xA234", "+0x"),
            ("-0b0", "-0b"),
            ("0B02", "0B02"),
            ("0xAbE", "0xAb"),
            ("12abc", "12a"),
            ("1.5e3x", "1.5e3x"),
        ];

        for (input, bad) in cases {
            let mut lexer = Lexer::new(input, &grammar);
            assert_eq!(
                lexer.next_token(),
                Err(LexError::BadNumberSyntax(bad.to_string())),
                "input {:?}",
                input
            );
        }
        assert_eq!(
            LexError::BadNumberSyntax("+0x".to_string()).to_string(),
            "Bad number syntax \"+0x\""
        );
    }

    #[test]
    fn test_complex_lex() {
        use TokenKind::*;
        let grammar = Grammar::default();
        let input = " 45 + - */ +44 -36 (,)foo sqrt()-56e23^";

        let expected = tokens(&[
            (Number, "45"),
            (Operator, "+"),
            (Operator, "-"),
            (Operator, "*"),
            (Operator, "/"),
            (Number, "+44"),
            (Number, "-36"),
            (OpenParen, "("),
            (Comma, ","),
            (CloseParen, ")"),
            (Identifier, "foo"),
            (Identifier, "sqrt"),
            (OpenParen, "("),
            (CloseParen, ")"),
            (Number, "-56e23"),
            (Operator, "^"),
        ]);

        assert_eq!(lex_all(input, &grammar).unwrap(), expected);
    }

    #[test]
    fn test_identifiers() {
        use TokenKind::*;
        let grammar = Grammar::default();
        assert_eq!(
            lex_all("_x1 foo_bar Baz9", &grammar).unwrap(),
            tokens(&[(Identifier, "_x1"), (Identifier, "foo_bar"), (Identifier, "Baz9")])
        );
    }

    #[test]
    fn test_end_of_input_is_sticky() {
        let grammar = Grammar::default();
        let mut lexer = Lexer::new("  1  ", &grammar);
        assert_eq!(
            lexer.next_token(),
            Ok(Some(Token::new(TokenKind::Number, "1")))
        );
        assert_eq!(lexer.next_token(), Ok(None));
        assert_eq!(lexer.next_token(), Ok(None));

        assert_eq!(Lexer::new("", &grammar).next_token(), Ok(None));
        assert_eq!(Lexer::new(" \t\n", &grammar).next_token(), Ok(None));
    }

    #[test]
    fn test_report_unexpected_character() {
        let grammar = Grammar::default();
        let mut lexer = Lexer::new("1 @", &grammar);
        assert!(lexer.next_token().is_ok());

        let err = lexer.next_token().unwrap_err();
        assert_eq!(err, LexError::UnexpectedCharacter('@'));
        assert_eq!(err.to_string(), "Got unexpected character '@'");

        // The lexer is exhausted after an error.
        assert_eq!(lexer.next_token(), Ok(None));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_longest_symbol_match() {
        let mut grammar = Grammar::default();
        grammar
            .register_operator("@@", 5, Associativity::Left, |a, b| a + b)
            .unwrap();

        let mut lexer = Lexer::new("@@ @@@@ @", &grammar);
        for _ in 0..3 {
            let token = lexer.next_token().unwrap().unwrap();
            assert_eq!(token, Token::new(TokenKind::Operator, "@@"));
        }

        let err = lexer.next_token().unwrap_err();
        assert_eq!(err, LexError::InvalidToken("@".to_string()));
        assert_eq!(err.to_string(), "Invalid token \"@\" found");
    }

    #[test]
    fn test_symbol_scan_stops_at_longest_symbol() {
        use TokenKind::*;
        let grammar = Grammar::default();
        let depth = 5_000;
        let input = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

        let lexed = lex_all(&input, &grammar).unwrap();
        assert_eq!(lexed.len(), 2 * depth + 1);
        assert_eq!(lexed[0], (OpenParen, "(".to_string()));
        assert_eq!(lexed[depth], (Number, "1".to_string()));
        assert_eq!(lexed[2 * depth], (CloseParen, ")".to_string()));
    }

    #[test]
    fn test_longest_match_prefers_multi_char_symbol() {
        use TokenKind::*;
        let mut grammar = Grammar::default();
        grammar
            .register_operator("<", 1, Associativity::Left, |a, b| (a < b) as i32 as f64)
            .unwrap();
        grammar
            .register_operator("<=", 1, Associativity::Left, |a, b| (a <= b) as i32 as f64)
            .unwrap();

        assert_eq!(
            lex_all("a<=b <c ()", &grammar).unwrap(),
            tokens(&[
                (Identifier, "a"),
                (Operator, "<="),
                (Identifier, "b"),
                (Operator, "<"),
                (Identifier, "c"),
                (OpenParen, "("),
                (CloseParen, ")"),
            ])
        );
    }

    #[test]
    fn test_sign_without_digit_is_operator() {
        use TokenKind::*;
        let grammar = Grammar::default();
        assert_eq!(
            lex_all("+-5 - x", &grammar).unwrap(),
            tokens(&[
                (Operator, "+"),
                (Number, "-5"),
                (Operator, "-"),
                (Identifier, "x"),
            ])
        );
    }
}
