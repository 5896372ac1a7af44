/// Position of a token in the source: 1-based line, 0-based column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub column: usize,
    pub length: usize,
}

impl Span {
    pub fn end_column(&self) -> usize {
        self.column + self.length
    }
}

/// Line/column bookkeeping for diagnostics.
///
/// `line` and `column` always describe the lexer's lookahead character. Each
/// finished token is recorded so that an error can point either at the token
/// the parser is looking at or, for a missing `;`, just past the token before
/// it (possibly on a previous line).
#[derive(Debug)]
pub struct LexerState {
    line: u32,
    column: usize,
    current_line: String,
    lines: Vec<String>,
    token_start: Span,
    last_token: Span,
    previous_token: Span,
}

impl LexerState {
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 0,
            current_line: String::new(),
            lines: vec![],
            token_start: Span::default(),
            last_token: Span::default(),
            previous_token: Span::default(),
        }
    }

    /// Moves the lookahead from `old` to `new`.
    pub fn advance(&mut self, old: Option<char>, new: Option<char>) {
        match old {
            Some('\n') => {
                self.lines.push(std::mem::take(&mut self.current_line));
                self.line += 1;
                self.column = 0;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        if let Some(c) = new {
            if c != '\n' && c != '\r' {
                self.current_line.push(c);
            }
        }
    }

    pub fn start_token(&mut self) {
        self.token_start = Span {
            line: self.line,
            column: self.column,
            length: 0,
        };
    }

    /// Length of the token being read, counting the characters consumed so far.
    pub fn token_length(&self) -> usize {
        self.column.saturating_sub(self.token_start.column)
    }

    pub fn finish_token(&mut self) -> Span {
        let span = Span {
            length: self.token_length(),
            ..self.token_start
        };
        self.previous_token = self.last_token;
        self.last_token = span;
        span
    }

    pub fn token_start(&self) -> Span {
        self.token_start
    }

    pub fn last_token(&self) -> Span {
        self.last_token
    }

    pub fn previous_token(&self) -> Span {
        self.previous_token
    }

    /// All lines seen so far, the partially read current one included.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.lines.clone();
        lines.push(self.current_line.clone());
        lines
    }
}
