use std::fmt::Write;

/// Snapshot of where the lexer was when a lexical or syntax error was raised.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorContext {
    pub filename: String,
    /// 1-based line of the offending token.
    pub line: u32,
    /// 0-based column of the first offending character.
    pub column: usize,
    /// Number of characters to underline.
    pub length: usize,
    pub line_text: String,
    /// Every source line read so far, without line terminators.
    pub lines: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error("could not access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("LexicalError: {message}")]
    Lexical {
        message: String,
        context: ErrorContext,
    },
    #[error("SyntaxError: {message}")]
    Syntax {
        message: String,
        context: ErrorContext,
    },
    #[error("TypeError: {message}")]
    Type { message: String, line: u32 },
    #[error("InternalError: {0}")]
    Internal(String),
}

impl CompileError {
    pub fn type_error(message: impl Into<String>, line: u32) -> Self {
        CompileError::Type {
            message: message.into(),
            line,
        }
    }

    pub fn message(&self) -> String {
        match self {
            CompileError::Lexical { message, .. }
            | CompileError::Syntax { message, .. }
            | CompileError::Type { message, .. } => message.clone(),
            CompileError::Io { .. } | CompileError::Internal(_) => self.to_string(),
        }
    }

    /// Source line the error points at, when known.
    pub fn line(&self) -> Option<u32> {
        match self {
            CompileError::Lexical { context, .. } | CompileError::Syntax { context, .. } => {
                Some(context.line)
            }
            CompileError::Type { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Renders a diagnostic for the terminal.
    ///
    /// ```text
    ///   File "input.txt", line 4 position 8
    ///     a = 1.b;
    ///         ^^^
    /// LexicalError: invalid decimal literal
    /// ```
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut result = String::new();
        match self {
            CompileError::Lexical { context, .. } | CompileError::Syntax { context, .. } => {
                let _ = writeln!(
                    result,
                    "  File \"{}\", line {} position {}",
                    context.filename, context.line, context.column
                );
                let _ = writeln!(result, "    {}", context.line_text);
                let _ = writeln!(
                    result,
                    "    {}{}",
                    " ".repeat(context.column),
                    "^".repeat(context.length.max(1))
                );
            }
            CompileError::Type { line, .. } => {
                let lines: Vec<&str> = source.lines().collect();
                let target = (*line as usize).saturating_sub(1);
                let first = target.saturating_sub(2);
                let last = (target + 3).min(lines.len());

                let _ = writeln!(result, "  File \"{}\", line {}", filename, line);
                for (i, text) in lines.iter().enumerate().take(last).skip(first) {
                    let marker = if i == target { "---->" } else { "     " };
                    let _ = writeln!(result, "{} {} {}", marker, i + 1, text);
                }
                result.push('\n');
            }
            CompileError::Io { .. } | CompileError::Internal(_) => {}
        }
        result.push_str(&self.to_string());
        result
    }
}
