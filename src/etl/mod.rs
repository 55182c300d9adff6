//! The ETL driver.
//!
//! Connects to the warehouse and executes the statement catalogs strictly
//! sequentially: drop, create, copy, insert. Each catalog preserves its list
//! order; the first failed statement aborts the run and surfaces the engine's
//! error unchanged. There are no retries and no rollback logic of our own:
//! transaction semantics belong to the warehouse.

use snafu::prelude::*;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use crate::catalog::{self, Statement};
use crate::config::Config;
use crate::error::{ConnectSnafu, EtlError, StatementSnafu, StatementStage};

/// Which part of the run to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Full refresh: drop, create, copy, insert.
    #[default]
    All,
    /// Drop and recreate all tables.
    Schema,
    /// Bulk-load the staging tables.
    Load,
    /// Populate the star schema from staging.
    Transform,
}

/// Statistics about an ETL run.
#[derive(Debug, Clone, Default)]
pub struct EtlStats {
    pub statements_executed: usize,
    /// Rows the bulk loader reported loading into staging.
    pub rows_loaded: u64,
    /// Rows inserted into the dimensional model.
    pub rows_inserted: u64,
}

/// The ETL driver: a warehouse connection plus the run configuration.
pub struct Etl {
    config: Config,
    pool: PgPool,
    stats: EtlStats,
}

impl Etl {
    /// Validate the configuration and connect to the warehouse.
    pub async fn connect(config: Config) -> Result<Self, EtlError> {
        config.validate()?;

        let options = PgConnectOptions::new()
            .host(&config.warehouse.host)
            .port(config.warehouse.port)
            .database(&config.warehouse.dbname)
            .username(&config.warehouse.user)
            .password(&config.warehouse.password);

        // A run is a single sequential statement stream; one connection is
        // enough, the second covers pool warmup.
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context(ConnectSnafu)?;

        info!(
            host = %config.warehouse.host,
            dbname = %config.warehouse.dbname,
            "Connected to warehouse"
        );

        Ok(Self {
            config,
            pool,
            stats: EtlStats::default(),
        })
    }

    /// Run the requested stage(s) and return the run statistics.
    pub async fn run(&mut self, stage: Stage) -> Result<EtlStats, EtlError> {
        if matches!(stage, Stage::All | Stage::Schema) {
            info!("Dropping tables");
            self.execute_catalog(catalog::drop_catalog()).await?;
            info!("Creating tables");
            self.execute_catalog(catalog::create_catalog()).await?;
        }

        if matches!(stage, Stage::All | Stage::Load) {
            info!("Loading staging tables");
            let copies = catalog::copy_catalog(&self.config)?;
            self.execute_catalog(copies).await?;
        }

        if matches!(stage, Stage::All | Stage::Transform) {
            info!("Populating star schema");
            self.execute_catalog(catalog::insert_catalog()).await?;
        }

        info!(
            statements = self.stats.statements_executed,
            rows_loaded = self.stats.rows_loaded,
            rows_inserted = self.stats.rows_inserted,
            "Run complete"
        );
        Ok(self.stats.clone())
    }

    /// Execute one catalog in list order, stopping at the first failure.
    async fn execute_catalog(&mut self, statements: Vec<Statement>) -> Result<(), EtlError> {
        for stmt in statements {
            debug!(name = stmt.name, stage = %stmt.stage, "Executing statement");
            let result = sqlx::query(&stmt.sql)
                .execute(&self.pool)
                .await
                .context(StatementSnafu {
                    name: stmt.name,
                    stage: stmt.stage,
                })?;

            self.stats.statements_executed += 1;
            match stmt.stage {
                StatementStage::Copy => self.stats.rows_loaded += result.rows_affected(),
                StatementStage::Insert => self.stats.rows_inserted += result.rows_affected(),
                _ => {}
            }
            debug!(
                name = stmt.name,
                rows = result.rows_affected(),
                "Statement complete"
            );
        }
        Ok(())
    }
}
