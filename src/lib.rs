pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use db::{connect, init_db, MigrationError, MigrationReport, MigrationRunner, Repository};
pub use domain::{Decision, DecisionStatus, Event, ProcessedEvent, RuntimeOverride, Timestamp};
pub use error::AppError;
pub use orchestration::{DispatchOutcome, Dispatcher, EventHandler};
