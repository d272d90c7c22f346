//! dte-persistence
//!
//! Capa Postgres (Diesel) del motor de workflow. Provee implementaciones
//! durables de `EventStore` y `PhaseRepository` más utilidades de conexión y
//! migraciones embebidas.
//!
//! Módulos:
//! - `pg`: implementaciones sobre Postgres (workflow_event_log append-only,
//!   evidencia, transiciones rechazadas y versiones de fase).
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::init_dotenv;
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, ConnectionProvider, PgEventStore, PgPhaseRepository, PgPool, PgVersionStore,
             PoolProvider};
