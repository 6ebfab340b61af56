//! Script evaluator capability
//!
//! The data scripts are executed by an embeddable evaluator that the rest of
//! the crate only sees through [`ScriptEngine`].

use std::path::Path;

use crate::value::Value;

/// A definition script failed to load or evaluate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("script {script} failed: {message}")]
pub struct ScriptFault {
    /// Script path or chunk name.
    pub script: String,
    /// Evaluator diagnostic.
    pub message: String,
}

impl ScriptFault {
    pub fn new(script: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            message: message.into(),
        }
    }
}

/// One mutable evaluation context. Not shared between threads.
pub trait ScriptEngine {
    /// Called before each data directory's search paths are added. Modules
    /// cached by earlier directories must be forgotten so `require` resolves
    /// against the directory being processed.
    fn begin_directory(&mut self) -> Result<(), ScriptFault> {
        Ok(())
    }

    /// Make `require` lookups resolve `<dir>/?.lua` ahead of every directory
    /// added before it.
    fn extend_search_path(&mut self, dir: &Path) -> Result<(), ScriptFault>;

    /// Execute a script file.
    fn execute(&mut self, script: &Path) -> Result<(), ScriptFault>;

    /// Execute an in-memory chunk under `name`.
    fn execute_source(&mut self, name: &str, source: &str) -> Result<(), ScriptFault>;

    /// Read a global by dotted path (`"data.raw"`). `None` when absent.
    fn read_global(&self, path: &str) -> Result<Option<Value>, ScriptFault>;
}
