//! Data directory ordering and definition script execution
//!
//! Scripts run core first, then base, then each mod in the order the caller
//! gave. The same order is reused for icons and locale files.

use std::env;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::IngestError;
use crate::script::ScriptEngine;

/// Compatibility globals for older data scripts, run after the core loader.
const BOOTSTRAP: &str = include_str!("bootstrap.lua");
const BOOTSTRAP_NAME: &str = "bootstrap";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Core,
    Base,
    Mod,
}

/// One data directory taking part in ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub kind: SourceKind,
    pub dir: PathBuf,
}

impl DataSource {
    /// The script executed for this directory.
    pub fn entry_script(&self) -> PathBuf {
        match self.kind {
            SourceKind::Core => self.dir.join("lualib").join("dataloader.lua"),
            SourceKind::Base | SourceKind::Mod => self.dir.join("data.lua"),
        }
    }

    /// Directories added to the module search path before the entry script runs.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        match self.kind {
            SourceKind::Core | SourceKind::Base => vec![self.dir.join("lualib"), self.dir.clone()],
            SourceKind::Mod => vec![self.dir.clone()],
        }
    }
}

/// Core, base, then mods in the supplied order.
pub fn data_sources(game_root: &Path, mods: &[PathBuf]) -> Vec<DataSource> {
    let data = game_root.join("data");
    let mut sources = vec![
        DataSource {
            kind: SourceKind::Core,
            dir: data.join("core"),
        },
        DataSource {
            kind: SourceKind::Base,
            dir: data.join("base"),
        },
    ];
    sources.extend(mods.iter().map(|m| DataSource {
        kind: SourceKind::Mod,
        dir: m.clone(),
    }));
    sources
}

/// Execute every source in order.
///
/// `after_each` sees the engine once a directory's scripts have run. The first
/// script fault aborts the pass; whatever earlier scripts defined stays in the
/// engine.
pub fn execute_sources<E, F>(
    engine: &mut E,
    sources: &[DataSource],
    mut after_each: F,
) -> Result<(), IngestError>
where
    E: ScriptEngine,
    F: FnMut(&E, &DataSource) -> Result<(), IngestError>,
{
    for source in sources {
        engine.begin_directory()?;
        for dir in source.search_paths() {
            engine.extend_search_path(&dir)?;
        }

        let script = source.entry_script();
        info!("Executing {}", script.display());
        engine.execute(&script)?;

        if source.kind == SourceKind::Core {
            engine.execute_source(BOOTSTRAP_NAME, BOOTSTRAP)?;
        }

        after_each(engine, source)?;
    }
    Ok(())
}

/// True when `root` looks like a game installation.
pub fn is_game_root(root: &Path) -> bool {
    root.join("data")
        .join("core")
        .join("lualib")
        .join("dataloader.lua")
        .is_file()
}

/// Conventional install locations, most specific first.
pub fn default_install_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for var in ["ProgramFiles", "ProgramFiles(x86)"] {
        if let Some(dir) = env::var_os(var) {
            candidates.push(PathBuf::from(dir).join("Factorio"));
        }
    }
    if let Some(home) = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")) {
        let home = PathBuf::from(home);
        candidates.push(home.join("Documents").join("Factorio"));
        candidates.push(home.join("factorio"));
        candidates.push(home.join(".factorio"));
        candidates.push(
            home.join(".local")
                .join("share")
                .join("Steam")
                .join("steamapps")
                .join("common")
                .join("Factorio"),
        );
    }
    candidates
}

/// First candidate that holds game data.
pub fn locate_game_root(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|c| is_game_root(c)).cloned()
}

/// Mod directories below each root, in root order then file-name order.
///
/// Only directories with a `data.lua` count. Packaged mods are skipped.
pub fn discover_mods(mod_roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut mods = Vec::new();

    for root in mod_roots.iter().filter(|r| r.is_dir()) {
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if entry.file_type().is_dir() && path.join("data.lua").is_file() {
                debug!("Found mod directory {}", path.display());
                mods.push(path.to_path_buf());
            } else if path.extension().is_some_and(|ext| ext == "zip") {
                debug!("Skipping packaged mod {}", path.display());
            }
        }
    }

    mods
}
