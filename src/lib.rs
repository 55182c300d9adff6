//! starlift: a star-schema warehouse loader.
//!
//! Loads JSON event logs and song metadata from S3 into Redshift staging
//! tables, then reshapes them into a fact table (`songplay`) and four
//! dimensions (`users`, `songs`, `artists`, `time`). Every run is a full
//! refresh: drop, create, bulk-load, transform.
//!
//! # Example
//!
//! ```ignore
//! use starlift::{Config, Etl, Stage, error::EtlError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EtlError> {
//!     let config = Config::from_file("starlift.yaml")?;
//!     let mut etl = Etl::connect(config).await?;
//!     let stats = etl.run(Stage::All).await?;
//!     println!("Executed {} statements", stats.statements_executed);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod etl;
pub mod load;
pub mod schema;
pub mod transform;

// Re-export main types
pub use catalog::Statement;
pub use config::Config;
pub use etl::{Etl, EtlStats, Stage};
