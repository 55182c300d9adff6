//! Typed table definitions and DDL rendering.
//!
//! Tables are declared as data (columns, types, key hints) and rendered into
//! Redshift DDL. Both CREATE and DROP are idempotent (`IF NOT EXISTS` /
//! `IF EXISTS`) so re-running the schema stage never fails on its own output.
//!
//! Sort and distribution keys are advisory physical-layout hints; they change
//! access efficiency, never correctness.

mod tables;

pub use tables::{artists, songplay, songs, staging_events, staging_songs, time, users};

/// SQL column types used by the warehouse schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// Unbounded VARCHAR.
    Varchar,
    /// VARCHAR with an explicit length.
    VarcharN(u16),
    SmallInt,
    Int,
    BigInt,
    /// Redshift FLOAT (double precision).
    Float,
    Timestamp,
}

impl SqlType {
    fn as_sql(&self) -> String {
        match self {
            SqlType::Varchar => "VARCHAR".to_string(),
            SqlType::VarcharN(n) => format!("VARCHAR({n})"),
            SqlType::SmallInt => "SMALLINT".to_string(),
            SqlType::Int => "INT".to_string(),
            SqlType::BigInt => "BIGINT".to_string(),
            SqlType::Float => "FLOAT".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
        }
    }
}

/// A single column definition.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub ty: SqlType,
    not_null: bool,
    primary_key: bool,
    /// Auto-increment identity column (Redshift `IDENTITY(0,1)`).
    identity: bool,
    sort_key: bool,
    dist_key: bool,
    references: Option<(&'static str, &'static str)>,
}

impl Column {
    pub fn new(name: &'static str, ty: SqlType) -> Self {
        Self {
            name,
            ty,
            not_null: false,
            primary_key: false,
            identity: false,
            sort_key: false,
            dist_key: false,
            references: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn sort_key(mut self) -> Self {
        self.sort_key = true;
        self
    }

    pub fn dist_key(mut self) -> Self {
        self.dist_key = true;
        self
    }

    pub fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }

    fn render(&self) -> String {
        let mut sql = format!("    {} {}", self.name, self.ty.as_sql());
        if self.identity {
            sql.push_str(" IDENTITY(0,1)");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if let Some((table, column)) = self.references {
            sql.push_str(&format!(" REFERENCES {table}({column})"));
        }
        if self.sort_key {
            sql.push_str(" SORTKEY");
        }
        if self.dist_key {
            sql.push_str(" DISTKEY");
        }
        sql
    }
}

/// A table definition: name plus ordered columns.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: &'static str,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: &'static str, columns: Vec<Column>) -> Self {
        Self { name, columns }
    }

    /// Render the idempotent CREATE statement.
    pub fn create_statement(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(Column::render).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            columns.join(",\n")
        )
    }

    /// Render the idempotent DROP statement.
    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }

    /// Names of the tables this table declares foreign-key references to.
    pub fn referenced_tables(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter_map(|c| c.references.map(|(table, _)| table))
            .collect()
    }

    fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}
