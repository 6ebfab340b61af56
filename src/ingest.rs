//! Full ingestion pass
//!
//! Scripts execute core, base, then mods. Item prototypes are registered after
//! every directory so the earliest declaration of an item wins; everything else
//! is interpreted once from the final namespace. Locale files and display names
//! are applied last.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::info;

use crate::error::IngestError;
use crate::icons::IconResolver;
use crate::interpret::{DEFAULT_ITEM_CATEGORIES, Interpreter, RAW_GLOBAL};
use crate::locale::load_locale;
use crate::models::GameData;
use crate::names::bind_names;
use crate::script::{ScriptEngine, ScriptFault};
use crate::sources::{self, DataSource};
use crate::value::Value;

pub const DEFAULT_LANGUAGE: &str = "en";

/// What to load and how.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Game installation holding `data/core` and `data/base`.
    pub game_root: PathBuf,
    /// Mod directories, executed in this order.
    pub mods: Vec<PathBuf>,
    /// Locale subdirectory to read translations from.
    pub language: String,
    /// Prototype categories read as items.
    pub item_categories: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            game_root: PathBuf::new(),
            mods: Vec::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            item_categories: DEFAULT_ITEM_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl LoadOptions {
    pub fn new(game_root: impl Into<PathBuf>) -> Self {
        Self {
            game_root: game_root.into(),
            ..Self::default()
        }
    }

    pub fn with_mods(mut self, mods: Vec<PathBuf>) -> Self {
        self.mods = mods;
        self
    }

    pub fn sources(&self) -> Vec<DataSource> {
        sources::data_sources(&self.game_root, &self.mods)
    }
}

/// Run a full pass with a fresh Lua state.
///
/// The state is dropped when this returns, whether or not a script failed.
#[cfg(feature = "lua")]
pub fn load_game_data(options: &LoadOptions) -> Result<GameData, IngestError> {
    let mut engine = crate::lua::LuaEngine::new();
    load_with_engine(&mut engine, options)
}

/// Run a full pass with the given evaluator.
///
/// On a script fault the engine keeps whatever earlier scripts defined, so the
/// caller may inspect it; nothing is interpreted from it here.
pub fn load_with_engine<E: ScriptEngine>(
    engine: &mut E,
    options: &LoadOptions,
) -> Result<GameData, IngestError> {
    if !sources::is_game_root(&options.game_root) {
        return Err(IngestError::MissingGameData {
            root: options.game_root.clone(),
        });
    }

    let sources = options.sources();
    let dirs: Vec<PathBuf> = sources.iter().map(|s| s.dir.clone()).collect();

    let mut data = GameData::default();
    let mut icons = IconResolver::new(dirs.clone());

    sources::execute_sources(engine, &sources, |engine, source| {
        let raw = read_item_prototypes(engine, &options.item_categories)?;
        Interpreter::new(&mut data, &mut icons).interpret_items(&raw, &options.item_categories);
        info!("Processed {} ({} items so far)", source.dir.display(), data.items.len());
        Ok(())
    })?;

    if let Some(raw) = engine.read_global(RAW_GLOBAL)? {
        Interpreter::new(&mut data, &mut icons).interpret_all(&raw, &options.item_categories)?;
    }

    let locale = load_locale(&dirs, &options.language);
    bind_names(&mut data, &locale);
    data.locale = locale;

    info!("{}", data.stats());
    Ok(data)
}

/// Copy out just the item categories of `data.raw`, shaped like `data.raw`.
fn read_item_prototypes<E, S>(engine: &E, categories: &[S]) -> Result<Value, ScriptFault>
where
    E: ScriptEngine,
    S: AsRef<str>,
{
    let mut raw = BTreeMap::new();
    for category in categories {
        let category = category.as_ref();
        if let Some(entries) = engine.read_global(&format!("{}.{}", RAW_GLOBAL, category))? {
            raw.insert(category.to_string(), entries);
        }
    }
    Ok(Value::Table(raw))
}
