//! Game-data ingestion for a Factorio production planner
//!
//! Executes the game's data definition scripts (core, base, then mods), reads
//! back the prototype tables, and builds typed items, recipes, crafting
//! machines, miners, resources and modules with localized names and icons.

pub mod error;
pub mod icons;
pub mod ingest;
pub mod interpret;
pub mod locale;
#[cfg(feature = "lua")]
pub mod lua;
pub mod models;
pub mod names;
pub mod script;
pub mod sources;
pub mod value;

pub use error::IngestError;
#[cfg(feature = "lua")]
pub use ingest::load_game_data;
pub use ingest::{LoadOptions, load_with_engine};
pub use models::GameData;
pub use script::{ScriptEngine, ScriptFault};
pub use value::Value;
