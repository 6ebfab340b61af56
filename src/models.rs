//! Data models for ingested game prototypes

use std::collections::{BTreeMap, BTreeSet};

use crate::icons::Icon;
use crate::locale::LocaleTable;

/// Recipe duration used when a recipe declares zero or no `energy_required`.
pub const DEFAULT_RECIPE_TIME: f64 = 0.5;
pub const DEFAULT_RECIPE_CATEGORY: &str = "crafting";
pub const DEFAULT_RESOURCE_CATEGORY: &str = "basic-solid";
/// Module slots an assembler gets when it declares none.
pub const DEFAULT_ASSEMBLER_MODULE_SLOTS: u32 = 2;

#[derive(Debug, Clone)]
pub struct Item {
    pub name: String,
    pub friendly_name: Option<String>,
    pub icon: Option<Icon>,
    /// Recipes listing this item as a result.
    pub recipes: BTreeSet<String>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            friendly_name: None,
            icon: None,
            recipes: BTreeSet::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub category: String,
    pub time: f64,
    pub ingredients: BTreeMap<String, f64>,
    pub results: BTreeMap<String, f64>,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineKind {
    Assembler,
    Furnace,
}

/// Assembling machine or furnace
#[derive(Debug, Clone)]
pub struct CraftingMachine {
    pub name: String,
    pub kind: MachineKind,
    pub friendly_name: Option<String>,
    pub icon: Option<Icon>,
    pub max_ingredients: u32,
    pub module_slots: u32,
    pub speed: f64,
    pub categories: BTreeSet<String>,
    pub allowed_effects: BTreeSet<String>,
}

impl CraftingMachine {
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct MiningDrill {
    pub name: String,
    pub friendly_name: Option<String>,
    pub icon: Option<Icon>,
    pub mining_power: f64,
    pub speed: f64,
    pub module_slots: u32,
    pub resource_categories: BTreeSet<String>,
}

impl MiningDrill {
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub category: String,
    pub hardness: f64,
    pub time: f64,
    /// Technical name of the item this resource yields.
    pub result: String,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub friendly_name: Option<String>,
    pub speed_bonus: f64,
}

impl Module {
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }
}

/// Everything one ingestion pass produces.
///
/// Built from empty by [`crate::ingest::load_with_engine`] and handed to the
/// caller; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct GameData {
    pub items: BTreeMap<String, Item>,
    pub recipes: BTreeMap<String, Recipe>,
    pub machines: BTreeMap<String, CraftingMachine>,
    pub miners: BTreeMap<String, MiningDrill>,
    pub resources: BTreeMap<String, Resource>,
    pub modules: BTreeMap<String, Module>,
    /// `recipe-name` translations, queried by display code.
    pub recipe_names: BTreeMap<String, String>,
    pub locale: LocaleTable,
    /// Shared stand-in for every unresolved icon.
    pub unknown_icon: Icon,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            recipes: BTreeMap::new(),
            machines: BTreeMap::new(),
            miners: BTreeMap::new(),
            resources: BTreeMap::new(),
            modules: BTreeMap::new(),
            recipe_names: BTreeMap::new(),
            locale: LocaleTable::default(),
            unknown_icon: Icon::placeholder(),
        }
    }
}

impl GameData {
    /// Icon to draw for an entity, the placeholder when it has none.
    pub fn icon_or_unknown<'a>(&'a self, icon: Option<&'a Icon>) -> &'a Icon {
        icon.unwrap_or(&self.unknown_icon)
    }

    /// Localized recipe name, falling back to the technical name.
    pub fn recipe_display_name<'a>(&'a self, recipe: &'a str) -> &'a str {
        self.recipe_names
            .get(recipe)
            .map(String::as_str)
            .unwrap_or(recipe)
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            items: self.items.len(),
            recipes: self.recipes.len(),
            machines: self.machines.len(),
            miners: self.miners.len(),
            resources: self.resources.len(),
            modules: self.modules.len(),
            locale_sections: self.locale.sections().count(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    pub items: usize,
    pub recipes: usize,
    pub machines: usize,
    pub miners: usize,
    pub resources: usize,
    pub modules: usize,
    pub locale_sections: usize,
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} items, {} recipes, {} crafting machines, {} miners, {} resources, {} modules ({} locale sections)",
            self.items,
            self.recipes,
            self.machines,
            self.miners,
            self.resources,
            self.modules,
            self.locale_sections
        )
    }
}
