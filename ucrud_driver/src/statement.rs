use sqlparser::ast::Statement;
use sqlparser::dialect::Dialect;
use sqlparser::parser::Parser;

/// The kind of statement being executed; decides how a write is reported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementMetadata {
    DDL,
    Insert,
    DML,
    Query,
    Unknown,
}

impl StatementMetadata {
    /// Classify `sql` using the given dialect, falling back to the leading keyword when the
    /// statement cannot be parsed.
    #[must_use]
    pub fn parse(sql: &str, dialect: &dyn Dialect) -> StatementMetadata {
        let statements = Parser::parse_sql(dialect, sql).unwrap_or_default();

        if let Some(statement) = statements.first() {
            Self::match_statement(statement)
        } else {
            Self::match_keyword(sql)
        }
    }

    fn match_statement(statement: &Statement) -> StatementMetadata {
        match statement {
            Statement::CreateSchema { .. }
            | Statement::CreateDatabase { .. }
            | Statement::CreateView { .. }
            | Statement::CreateIndex(_)
            | Statement::CreateTable(_)
            | Statement::CreateSequence { .. }
            | Statement::AlterTable { .. }
            | Statement::AlterIndex { .. }
            | Statement::Drop { .. } => StatementMetadata::DDL,
            Statement::Query(_) => StatementMetadata::Query,
            Statement::Insert(_) => StatementMetadata::Insert,
            Statement::Update { .. } | Statement::Delete(_) => StatementMetadata::DML,
            _ => StatementMetadata::Unknown,
        }
    }

    fn match_keyword(sql: &str) -> StatementMetadata {
        let keyword = sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_start_matches('(')
            .to_lowercase();

        match keyword.as_str() {
            "select" | "with" | "show" => StatementMetadata::Query,
            "insert" => StatementMetadata::Insert,
            "update" | "delete" => StatementMetadata::DML,
            "create" | "alter" | "drop" => StatementMetadata::DDL,
            _ => StatementMetadata::Unknown,
        }
    }

    /// Whether the statement modifies rows and must be committed
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(self, StatementMetadata::Insert | StatementMetadata::DML)
    }
}
