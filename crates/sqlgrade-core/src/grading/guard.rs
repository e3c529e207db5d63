//! Lexical checks applied to untrusted SQL before it reaches the database.
//!
//! This is a first gate only. The executor additionally runs every statement
//! with `query_only` enabled and refuses statements SQLite reports as writing.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    Empty,
    NotAQuery { keyword: String },
    MultipleStatements,
    UnterminatedLiteral,
    SandboxTableMissing { table: String },
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Empty => write!(f, "query is empty"),
            GuardError::NotAQuery { keyword } => write!(
                f,
                "only SELECT/WITH/VALUES queries are allowed (found '{}')",
                keyword
            ),
            GuardError::MultipleStatements => write!(f, "only one statement per answer is allowed"),
            GuardError::UnterminatedLiteral => write!(f, "unterminated string literal or comment"),
            GuardError::SandboxTableMissing { table } => {
                write!(f, "only the '{}' table may be queried here", table)
            }
        }
    }
}

impl std::error::Error for GuardError {}

const QUERY_KEYWORDS: &[&str] = &["select", "with", "values"];

/// Accepts a single read-only statement, optionally terminated by `;`.
pub fn check_read_only(sql: &str) -> Result<(), GuardError> {
    let tokens = scan(sql)?;
    let first = match tokens.first_word {
        Some(w) => w,
        None => return Err(GuardError::Empty),
    };
    if !QUERY_KEYWORDS.contains(&first.to_ascii_lowercase().as_str()) {
        return Err(GuardError::NotAQuery { keyword: first });
    }
    if tokens.statements > 1 {
        return Err(GuardError::MultipleStatements);
    }
    Ok(())
}

/// The narrower rule for the practice runner: a SELECT that names the sandbox table.
pub fn check_sandbox(sql: &str, table: &str) -> Result<(), GuardError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(GuardError::Empty);
    }
    if !trimmed.to_ascii_lowercase().starts_with("select") {
        let keyword = trimmed
            .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .next()
            .unwrap_or_default()
            .to_string();
        return Err(GuardError::NotAQuery { keyword });
    }
    if !trimmed
        .to_ascii_lowercase()
        .contains(&table.to_ascii_lowercase())
    {
        return Err(GuardError::SandboxTableMissing {
            table: table.to_string(),
        });
    }
    check_read_only(trimmed)
}

struct Scan {
    first_word: Option<String>,
    statements: usize,
}

/// Walks the text skipping comments and quoted sections. Counts statements as
/// runs of non-trivia separated by `;`.
fn scan(sql: &str) -> Result<Scan, GuardError> {
    let chars: Vec<char> = sql.chars().collect();
    let mut i = 0;
    let mut first_word: Option<String> = None;
    let mut statements = 0;
    let mut in_statement = false;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                loop {
                    if i + 1 >= chars.len() {
                        return Err(GuardError::UnterminatedLiteral);
                    }
                    if chars[i] == '*' && chars[i + 1] == '/' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
                continue;
            }
            ';' => {
                in_statement = false;
                i += 1;
                continue;
            }
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            _ => {}
        }

        if !in_statement {
            in_statement = true;
            statements += 1;
        }

        match c {
            '\'' | '"' | '`' => {
                i = skip_quoted(&chars, i, c)?;
            }
            '[' => {
                i = skip_quoted(&chars, i, ']')?;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                if first_word.is_none() {
                    first_word = Some(chars[start..i].iter().collect());
                }
            }
            _ => {
                if first_word.is_none() {
                    first_word = Some(c.to_string());
                }
                i += 1;
            }
        }
    }

    Ok(Scan {
        first_word,
        statements,
    })
}

/// Returns the index just past the closing quote. Doubled quotes are escapes.
fn skip_quoted(chars: &[char], open: usize, close: char) -> Result<usize, GuardError> {
    let mut i = open + 1;
    while i < chars.len() {
        if chars[i] == close {
            if close != ']' && chars.get(i + 1) == Some(&close) {
                i += 2;
                continue;
            }
            return Ok(i + 1);
        }
        i += 1;
    }
    Err(GuardError::UnterminatedLiteral)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_queries() {
        assert!(check_read_only("SELECT 1;").is_ok());
        assert!(check_read_only("select * from students").is_ok());
        assert!(check_read_only("WITH x AS (SELECT 1) SELECT * FROM x;").is_ok());
        assert!(check_read_only("VALUES (1), (2);").is_ok());
    }

    #[test]
    fn skips_leading_comments() {
        assert!(check_read_only("-- q1\n/* answer */ SELECT 1;").is_ok());
        assert!(check_read_only("SELECT 1; -- trailing").is_ok());
    }

    #[test]
    fn rejects_writes() {
        assert_eq!(
            check_read_only("DELETE FROM students;"),
            Err(GuardError::NotAQuery {
                keyword: "DELETE".into()
            })
        );
        assert!(check_read_only("drop table x").is_err());
        assert!(check_read_only("(SELECT 1)").is_err());
    }

    #[test]
    fn rejects_stacked_statements() {
        assert_eq!(
            check_read_only("SELECT 1; DROP TABLE students;"),
            Err(GuardError::MultipleStatements)
        );
    }

    #[test]
    fn semicolons_inside_literals_are_not_separators() {
        assert!(check_read_only("SELECT 'a;b', \"c;d\" FROM t;").is_ok());
        assert!(check_read_only("SELECT 'it''s; fine';").is_ok());
    }

    #[test]
    fn empty_and_unterminated() {
        assert_eq!(check_read_only("  ;  "), Err(GuardError::Empty));
        assert_eq!(check_read_only("-- nothing"), Err(GuardError::Empty));
        assert_eq!(
            check_read_only("SELECT 'oops"),
            Err(GuardError::UnterminatedLiteral)
        );
    }

    #[test]
    fn sandbox_requires_select_on_table() {
        assert!(check_sandbox("SELECT * FROM test", "test").is_ok());
        assert!(matches!(
            check_sandbox("SELECT * FROM students", "test"),
            Err(GuardError::SandboxTableMissing { .. })
        ));
        assert!(matches!(
            check_sandbox("with t as (select 1) select * from test", "test"),
            Err(GuardError::NotAQuery { .. })
        ));
        assert!(matches!(
            check_sandbox("SELECT * FROM test; DELETE FROM test", "test"),
            Err(GuardError::MultipleStatements)
        ));
    }
}
