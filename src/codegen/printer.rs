use std::fmt::Write;

use super::Statement;

const INDENT: usize = 8;

/// Renders TAC one statement per line. A label shares the line of the
/// statement that follows it.
pub fn render(statements: &[Statement]) -> String {
    let mut out = String::new();
    let mut pending: Option<String> = None;

    for statement in statements {
        if let Statement::Label(label) = statement {
            if let Some(previous) = pending.replace(format!("{}:", label)) {
                let _ = writeln!(out, "{}", previous);
            }
            continue;
        }
        let prefix = pending.take().unwrap_or_default();
        let _ = writeln!(out, "{:<width$} {}", prefix, statement, width = INDENT - 1);
    }
    if let Some(label) = pending {
        let _ = writeln!(out, "{}", label);
    }
    out
}
