//! Fatal ingestion errors
//!
//! Everything recoverable (missing icons, unreadable locale files, absent
//! optional fields) is handled where it happens and never reaches this type.

use std::path::PathBuf;

use crate::script::ScriptFault;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A definition script failed to evaluate.
    #[error(transparent)]
    Script(#[from] ScriptFault),

    /// Two recipe prototypes share a technical name.
    #[error("duplicate recipe '{name}'")]
    DuplicateRecipe { name: String },

    /// The game root has no core data loader.
    #[error("no game data found under {}", root.display())]
    MissingGameData { root: PathBuf },
}
