use std::path::Path;

use log::trace;

use crate::error::{CompileError, ErrorContext};

use super::{
    state::{LexerState, Span},
    token::{KEYWORDS, ONE_SYMBOL_TOKENS, OPERATOR_CHARS, PUNCTUATION_TOKENS, TWO_SYMBOLS_TOKENS},
    Token, TokenKind,
};

#[derive(Debug)]
pub struct Lexer {
    filename: String,
    chars: Vec<char>,
    index: usize,
    peek: Option<char>,
    state: LexerState,
    missing_semicolon: bool,
}

impl Lexer {
    pub fn new(filename: impl Into<String>, source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut lexer = Self {
            filename: filename.into(),
            chars,
            index: 0,
            peek: None,
            state: LexerState::new(),
            missing_semicolon: false,
        };
        lexer.bump();
        lexer
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), &source))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Makes the next `error_context` point just past the previous token.
    pub fn set_missing_semicolon(&mut self) {
        self.missing_semicolon = true;
    }

    /// Consumes the lookahead and loads the next character.
    fn bump(&mut self) {
        let old = self.peek;
        self.peek = self.chars.get(self.index).copied();
        if self.peek.is_some() {
            self.index += 1;
        }
        self.state.advance(old, self.peek);
    }

    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        while self.peek.is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.state.start_token();

        let kind = match self.peek {
            None => TokenKind::Eof,
            Some(c) if c.is_ascii_digit() => self.read_number()?,
            Some(c) if c.is_alphabetic() => self.read_word(),
            Some(c) if OPERATOR_CHARS.contains(&c) => self.read_operator(c)?,
            Some(c) => match PUNCTUATION_TOKENS.get(&c) {
                Some(kind) => {
                    self.bump();
                    kind.clone()
                }
                None => {
                    return Err(self.lexical_error(format!("unexpected token '{}'", c), 1));
                }
            },
        };

        let span = self.state.finish_token();
        trace!("token {:?} at {}:{}", kind, span.line, span.column);
        Ok(Token {
            kind,
            line: span.line,
        })
    }

    fn read_number(&mut self) -> Result<TokenKind, CompileError> {
        let mut digits = String::new();
        let mut has_decimal = false;

        while let Some(c) = self.peek {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if c == '.' && !has_decimal {
                has_decimal = true;
                digits.push(c);
            } else {
                break;
            }
            self.bump();
        }

        if !self.is_valid_end_of_number() {
            let length = self.state.token_length() + 1;
            return Err(self.lexical_error("invalid decimal literal", length));
        }

        if has_decimal {
            digits.parse().map(TokenKind::Real).map_err(|_| {
                let length = self.state.token_length();
                self.lexical_error("invalid decimal literal", length)
            })
        } else {
            digits.parse().map(TokenKind::Num).map_err(|_| {
                let length = self.state.token_length();
                self.lexical_error("integer literal out of range", length)
            })
        }
    }

    fn is_valid_end_of_number(&self) -> bool {
        match self.peek {
            None => true,
            Some(c) => {
                OPERATOR_CHARS.contains(&c)
                    || matches!(c, ';' | ')' | '}' | ']')
                    || c.is_whitespace()
            }
        }
    }

    fn read_word(&mut self) -> TokenKind {
        let mut s = String::new();
        while let Some(c) = self.peek.filter(|c| c.is_alphanumeric()) {
            s.push(c);
            self.bump();
        }

        if let Some(kind) = KEYWORDS.get(s.as_str()) {
            kind.clone()
        } else {
            TokenKind::Ident(s)
        }
    }

    fn read_operator(&mut self, c: char) -> Result<TokenKind, CompileError> {
        self.bump();
        if let Some(next) = self.peek {
            let two = format!("{}{}", c, next);
            if let Some(kind) = TWO_SYMBOLS_TOKENS.get(two.as_str()) {
                self.bump();
                return Ok(kind.clone());
            }
        }

        match ONE_SYMBOL_TOKENS.get(&c) {
            Some(kind) => Ok(kind.clone()),
            None => Err(self.lexical_error(format!("unexpected token '{}'", c), 1)),
        }
    }

    fn lexical_error(&mut self, message: impl Into<String>, length: usize) -> CompileError {
        let span = Span {
            length,
            ..self.state.token_start()
        };
        CompileError::Lexical {
            message: message.into(),
            context: self.context_for(span),
        }
    }

    /// Diagnostic snapshot for the token most recently handed to the parser.
    pub fn error_context(&mut self) -> ErrorContext {
        let span = if self.missing_semicolon {
            let previous = self.state.previous_token();
            Span {
                line: previous.line,
                column: previous.end_column(),
                length: 1,
            }
        } else {
            let last = self.state.last_token();
            Span {
                length: last.length.max(1),
                ..last
            }
        };
        self.context_for(span)
    }

    fn context_for(&mut self, span: Span) -> ErrorContext {
        // Finish the current line so it can be shown in full.
        while self.peek.is_some_and(|c| c != '\n') {
            self.bump();
        }

        let lines = self.state.lines();
        let line_text = lines
            .get((span.line as usize).saturating_sub(1))
            .cloned()
            .unwrap_or_default();

        ErrorContext {
            filename: self.filename.clone(),
            line: span.line,
            column: span.column,
            length: span.length,
            line_text,
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn tokenize(source: &str) -> Result<Vec<TokenKind>, CompileError> {
        let mut lexer = Lexer::new("test", source);
        let mut kinds = vec![];
        loop {
            let token = lexer.next_token()?;
            if token.kind == TokenKind::Eof {
                return Ok(kinds);
            }
            kinds.push(token.kind);
        }
    }

    #[test]
    fn real_literal() {
        assert_eq!(tokenize("1.5").unwrap(), vec![TokenKind::Real(1.5)]);
    }

    #[test]
    fn integer_literal() {
        assert_eq!(tokenize("42").unwrap(), vec![TokenKind::Num(42)]);
    }

    #[rstest]
    #[case("1.a")]
    #[case("12x")]
    #[case("1.2.3")]
    fn invalid_decimal_literal(#[case] source: &str) {
        let err = tokenize(source).unwrap_err();
        assert!(matches!(err, CompileError::Lexical { .. }));
        assert_eq!(err.message(), "invalid decimal literal");
    }

    #[test]
    fn invalid_decimal_literal_underlines_whole_literal() {
        let mut lexer = Lexer::new("test", "a = 1.b;");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let Err(CompileError::Lexical { context, .. }) = lexer.next_token() else {
            panic!("expected a lexical error");
        };
        assert_eq!(context.line, 1);
        assert_eq!(context.column, 4);
        assert_eq!(context.length, 3);
        assert_eq!(context.line_text, "a = 1.b;");
    }

    #[test]
    fn integer_literal_out_of_range() {
        let err = tokenize("99999999999").unwrap_err();
        assert_eq!(err.message(), "integer literal out of range");
    }

    #[test]
    fn keywords_and_identifiers() {
        let kinds = tokenize("int x float whiley while").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Basic(crate::lexer::BasicType::Int),
                TokenKind::Ident("x".to_string()),
                TokenKind::Basic(crate::lexer::BasicType::Float),
                TokenKind::Ident("whiley".to_string()),
                TokenKind::While,
            ]
        );
    }

    #[rstest]
    #[case("<=", TokenKind::LessEqual)]
    #[case(">=", TokenKind::GreaterEqual)]
    #[case("==", TokenKind::DoubleEqual)]
    #[case("!=", TokenKind::NotEqual)]
    #[case("&&", TokenKind::And)]
    #[case("||", TokenKind::Or)]
    #[case("<", TokenKind::LessThan)]
    #[case("=", TokenKind::Equal)]
    #[case("!", TokenKind::Not)]
    fn operators(#[case] source: &str, #[case] expected: TokenKind) {
        assert_eq!(tokenize(source).unwrap(), vec![expected]);
    }

    #[test]
    fn two_character_operator_only_when_legal() {
        assert_eq!(
            tokenize("x=-1").unwrap(),
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Equal,
                TokenKind::Minus,
                TokenKind::Num(1),
            ]
        );
    }

    #[rstest]
    #[case("&x")]
    #[case("a | b")]
    #[case("#")]
    #[case("a_b")]
    fn unexpected_token(#[case] source: &str) {
        let err = tokenize(source).unwrap_err();
        assert!(err.message().starts_with("unexpected token"));
    }

    #[test]
    fn tracks_lines() {
        let mut lexer = Lexer::new("test", "{\n  x\n\n  y }");
        assert_eq!(lexer.next_token().unwrap().line, 1);
        assert_eq!(lexer.next_token().unwrap().line, 2);
        assert_eq!(lexer.next_token().unwrap().line, 4);
        assert_eq!(lexer.next_token().unwrap().line, 4);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn missing_semicolon_points_at_previous_line() {
        let mut lexer = Lexer::new("test", "x = 1\ny = 2;");
        for _ in 0..4 {
            lexer.next_token().unwrap();
        }
        lexer.set_missing_semicolon();
        let context = lexer.error_context();
        assert_eq!(context.line, 1);
        assert_eq!(context.column, 5);
        assert_eq!(context.length, 1);
        assert_eq!(context.line_text, "x = 1");
        assert_eq!(context.lines, vec!["x = 1".to_string(), "y = 2;".to_string()]);
    }
}
