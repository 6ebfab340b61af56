//! Locale file loading
//!
//! Translation files live at `<data dir>/locale/<language>/*.cfg` and use an
//! INI-like syntax: `[section]` headers followed by `key=value` lines.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

/// Section for lines that appear before any header.
pub const NO_SECTION: &str = "none";

/// Section name -> key -> localized string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleTable {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl LocaleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.sections.get(name)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, String>)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge one file's contents. Keys already present are overwritten.
    pub fn merge_str(&mut self, text: &str) {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut current = NO_SECTION.to_string();

        for line in text.lines() {
            if let Some(name) = section_header(line) {
                current = name.to_string();
                continue;
            }
            if line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                self.sections
                    .entry(current.clone())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
            }
        }
    }

    /// Read and merge a single file.
    pub fn merge_file(&mut self, path: &Path) -> std::io::Result<()> {
        let text = fs::read_to_string(path)?;
        self.merge_str(&text);
        Ok(())
    }
}

/// `[name]` on a line of its own.
fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']')
}

/// Translation files of one data directory, in file-name order.
pub fn find_locale_files(data_dir: &Path, language: &str) -> Vec<PathBuf> {
    let locale_dir = data_dir.join("locale").join(language);
    if !locale_dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(&locale_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "cfg"))
        .collect()
}

/// Load every translation file for `language` across `dirs`, in order.
///
/// Unreadable files are reported and skipped.
pub fn load_locale<P: AsRef<Path>>(dirs: &[P], language: &str) -> LocaleTable {
    let mut table = LocaleTable::new();
    let mut loaded = 0;

    for dir in dirs {
        for file in find_locale_files(dir.as_ref(), language) {
            match table.merge_file(&file) {
                Ok(()) => loaded += 1,
                Err(e) => warn!("Failed to load locale file {}: {}", file.display(), e),
            }
        }
    }

    info!("Loaded {} locale files for '{}'", loaded, language);
    table
}
