//! Statement splitting and classification.
//!
//! Splitting is purely textual: every `;` terminates a statement. This is
//! not a SQL parser, so a semicolon inside a string literal also splits.

/// How a statement is treated during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Row-returning; wrapped to capture its execution plan.
    Query,
    /// Executed as-is and never fingerprinted (`SET`, `CREATE`, `INSERT`, ...).
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<'a> {
    pub text: &'a str,
    pub kind: StatementKind,
}

impl Statement<'_> {
    pub fn is_plan_eligible(&self) -> bool {
        self.kind == StatementKind::Query
    }
}

/// Split `sql` into trimmed, non-empty statements, preserving order.
pub fn split_statements(sql: &str) -> Vec<Statement<'_>> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|text| Statement {
            text,
            kind: classify(text),
        })
        .collect()
}

pub fn classify(statement: &str) -> StatementKind {
    if is_plan_eligible(statement) {
        StatementKind::Query
    } else {
        StatementKind::Passthrough
    }
}

/// True when the trimmed text starts with `SELECT`, case-insensitively.
pub fn is_plan_eligible(statement: &str) -> bool {
    statement
        .trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"))
}
