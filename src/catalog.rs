//! Ordered statement catalogs.
//!
//! Four catalogs, executed by the driver in sequence: drop, create, copy,
//! insert. Order within each catalog matters where foreign keys are involved:
//! `songplay` references all four dimensions, so it is created and inserted
//! last, and dropped first.

use crate::config::Config;
use crate::error::{ConfigError, StatementStage};
use crate::{load, schema, transform};

/// A named statement, ready for execution or display.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Stable name used for logging and failure attribution.
    pub name: &'static str,
    pub stage: StatementStage,
    pub sql: String,
}

impl Statement {
    fn new(name: &'static str, stage: StatementStage, sql: String) -> Self {
        Self { name, stage, sql }
    }
}

/// Tables in dependency order: staging first, then the dimensions `songplay`
/// references, then `songplay` itself.
fn tables_in_create_order() -> Vec<schema::Table> {
    vec![
        schema::staging_events(),
        schema::staging_songs(),
        schema::users(),
        schema::songs(),
        schema::artists(),
        schema::time(),
        schema::songplay(),
    ]
}

/// DROP statements, reverse dependency order.
pub fn drop_catalog() -> Vec<Statement> {
    let mut tables = tables_in_create_order();
    tables.reverse();
    tables
        .into_iter()
        .map(|t| Statement::new(t.name, StatementStage::Drop, t.drop_statement()))
        .collect()
}

/// CREATE statements, dependency order.
pub fn create_catalog() -> Vec<Statement> {
    tables_in_create_order()
        .into_iter()
        .map(|t| Statement::new(t.name, StatementStage::Create, t.create_statement()))
        .collect()
}

/// COPY statements for the two staging tables.
pub fn copy_catalog(config: &Config) -> Result<Vec<Statement>, ConfigError> {
    Ok(vec![
        Statement::new(
            "staging_events",
            StatementStage::Copy,
            load::copy_staging_events(config)?,
        ),
        Statement::new(
            "staging_songs",
            StatementStage::Copy,
            load::copy_staging_songs(config)?,
        ),
    ])
}

/// INSERT statements: dimensions first, fact table last, so referential
/// checks (where enforced) see populated targets.
pub fn insert_catalog() -> Vec<Statement> {
    vec![
        Statement::new("users", StatementStage::Insert, transform::insert_users().to_string()),
        Statement::new("songs", StatementStage::Insert, transform::insert_songs().to_string()),
        Statement::new(
            "artists",
            StatementStage::Insert,
            transform::insert_artists().to_string(),
        ),
        Statement::new("time", StatementStage::Insert, transform::insert_time().to_string()),
        Statement::new(
            "songplay",
            StatementStage::Insert,
            transform::insert_songplay().to_string(),
        ),
    ]
}

/// All four catalogs concatenated in execution order, for `--dry-run` output.
pub fn full_run(config: &Config) -> Result<Vec<Statement>, ConfigError> {
    let mut statements = drop_catalog();
    statements.extend(create_catalog());
    statements.extend(copy_catalog(config)?);
    statements.extend(insert_catalog());
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_satisfies_references() {
        let catalog = create_catalog();
        let position = |name: &str| {
            catalog
                .iter()
                .position(|s| s.name == name)
                .unwrap_or_else(|| panic!("missing create statement for {name}"))
        };

        let songplay = position("songplay");
        for dim in ["users", "songs", "artists", "time"] {
            assert!(position(dim) < songplay, "{dim} must be created before songplay");
        }
    }

    #[test]
    fn test_drop_order_is_reverse_of_create() {
        let create: Vec<_> = create_catalog().iter().map(|s| s.name).collect();
        let mut drop: Vec<_> = drop_catalog().iter().map(|s| s.name).collect();
        drop.reverse();
        assert_eq!(create, drop);
        assert_eq!(drop_catalog()[0].name, "songplay");
    }

    #[test]
    fn test_insert_order_puts_fact_last() {
        let catalog = insert_catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.last().unwrap().name, "songplay");
    }

    #[test]
    fn test_all_ddl_is_idempotent() {
        for stmt in drop_catalog() {
            assert!(stmt.sql.contains("DROP TABLE IF EXISTS"), "{}", stmt.name);
        }
        for stmt in create_catalog() {
            assert!(stmt.sql.contains("CREATE TABLE IF NOT EXISTS"), "{}", stmt.name);
        }
    }

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(drop_catalog().len(), 7);
        assert_eq!(create_catalog().len(), 7);
        assert_eq!(insert_catalog().len(), 5);
    }
}
