//! Conversion of raw prototype tables into typed entities
//!
//! `data.raw` is keyed by prototype category, then by technical name. Each
//! category has one conversion routine; all of them tolerate missing fields and
//! fall back to the defaults in [`crate::models`].

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::error::IngestError;
use crate::icons::{Icon, IconResolver};
use crate::models::{
    CraftingMachine, DEFAULT_ASSEMBLER_MODULE_SLOTS, DEFAULT_RECIPE_CATEGORY,
    DEFAULT_RECIPE_TIME, DEFAULT_RESOURCE_CATEGORY, GameData, Item, MachineKind, MiningDrill,
    Module, Recipe, Resource,
};
use crate::value::Value;

/// Global holding every prototype declared by the data scripts.
pub const RAW_GLOBAL: &str = "data.raw";

/// Prototype categories whose entries are items.
pub const DEFAULT_ITEM_CATEGORIES: &[&str] = &[
    "item",
    "fluid",
    "capsule",
    "module",
    "ammo",
    "gun",
    "armor",
    "blueprint",
    "deconstruction-item",
    "tool",
    "repair-tool",
    "mining-tool",
    "rail-planner",
];

/// Entries of one category, in name order. Non-table entries are skipped.
fn prototypes<'v>(raw: &'v Value, category: &str) -> Vec<(&'v str, &'v Value)> {
    raw.get(category)
        .and_then(Value::as_table)
        .map(|entries| {
            entries
                .iter()
                .filter(|(_, v)| v.is_table())
                .map(|(k, v)| (k.as_str(), v))
                .collect()
        })
        .unwrap_or_default()
}

/// Writes converted prototypes into a [`GameData`].
pub struct Interpreter<'a> {
    data: &'a mut GameData,
    icons: &'a mut IconResolver,
}

impl<'a> Interpreter<'a> {
    pub fn new(data: &'a mut GameData, icons: &'a mut IconResolver) -> Self {
        Self { data, icons }
    }

    /// Register the item-like prototypes of `raw`. Safe to call repeatedly:
    /// names already known are left alone.
    pub fn interpret_items<S: AsRef<str>>(&mut self, raw: &Value, categories: &[S]) {
        for category in categories {
            for (name, values) in prototypes(raw, category.as_ref()) {
                self.add_item(name, values);
            }
        }
    }

    /// Full pass over the final namespace.
    pub fn interpret_all<S: AsRef<str>>(
        &mut self,
        raw: &Value,
        item_categories: &[S],
    ) -> Result<(), IngestError> {
        self.interpret_items(raw, item_categories);

        for (name, values) in prototypes(raw, "recipe") {
            self.add_recipe(name, values)?;
        }
        for (name, values) in prototypes(raw, "assembling-machine") {
            self.add_assembler(name, values);
        }
        for (name, values) in prototypes(raw, "furnace") {
            self.add_furnace(name, values);
        }
        for (name, values) in prototypes(raw, "mining-drill") {
            self.add_miner(name, values);
        }
        for (name, values) in prototypes(raw, "resource") {
            self.add_resource(name, values);
        }
        for (name, values) in prototypes(raw, "module") {
            self.add_module(name, values);
        }

        info!(
            "Interpreted {} items, {} recipes, {} machines, {} miners, {} resources, {} modules",
            self.data.items.len(),
            self.data.recipes.len(),
            self.data.machines.len(),
            self.data.miners.len(),
            self.data.resources.len(),
            self.data.modules.len()
        );
        Ok(())
    }

    /// First declaration wins; later ones with the same name are discarded.
    pub fn add_item(&mut self, name: &str, values: &Value) {
        if self.data.items.contains_key(name) {
            return;
        }
        let mut item = Item::new(name);
        item.icon = self.icon(values);
        self.data.items.insert(name.to_string(), item);
    }

    pub fn add_recipe(&mut self, name: &str, values: &Value) -> Result<(), IngestError> {
        if self.data.recipes.contains_key(name) {
            return Err(IngestError::DuplicateRecipe {
                name: name.to_string(),
            });
        }

        let body = recipe_body(values);
        let results = extract_results(body);
        if results.is_empty() {
            warn!("Recipe {} declares no results, skipping", name);
            return Ok(());
        }
        let ingredients = extract_ingredients(body);

        let time = match body.number_or("energy_required", 0.0) {
            t if t == 0.0 => DEFAULT_RECIPE_TIME,
            t => t,
        };
        let category = values
            .str_field("category")
            .unwrap_or(DEFAULT_RECIPE_CATEGORY)
            .to_string();

        for item in ingredients.keys() {
            self.item_for_recipe(item);
        }
        for item in results.keys() {
            self.item_for_recipe(item).recipes.insert(name.to_string());
        }

        let recipe = Recipe {
            name: name.to_string(),
            category,
            time,
            ingredients,
            results,
            icon: self.icon(values),
        };
        self.data.recipes.insert(name.to_string(), recipe);
        Ok(())
    }

    pub fn add_assembler(&mut self, name: &str, values: &Value) {
        let module_slots = match module_slots(values) {
            0 => DEFAULT_ASSEMBLER_MODULE_SLOTS,
            n => n,
        };
        let machine = CraftingMachine {
            name: name.to_string(),
            kind: MachineKind::Assembler,
            friendly_name: None,
            icon: self.icon(values),
            max_ingredients: as_count(values.number_or("ingredient_count", 0.0)),
            module_slots,
            speed: values.number_or("crafting_speed", 0.0),
            categories: string_set(values, "crafting_categories"),
            allowed_effects: string_set(values, "allowed_effects"),
        };
        self.insert_machine(machine);
    }

    /// Furnaces take a single ingredient and no module effects.
    pub fn add_furnace(&mut self, name: &str, values: &Value) {
        let machine = CraftingMachine {
            name: name.to_string(),
            kind: MachineKind::Furnace,
            friendly_name: None,
            icon: self.icon(values),
            max_ingredients: 1,
            module_slots: module_slots(values),
            speed: values.number_or("crafting_speed", 0.0),
            categories: string_set(values, "crafting_categories"),
            allowed_effects: BTreeSet::new(),
        };
        self.insert_machine(machine);
    }

    pub fn add_miner(&mut self, name: &str, values: &Value) {
        let miner = MiningDrill {
            name: name.to_string(),
            friendly_name: None,
            icon: self.icon(values),
            mining_power: values.number_or("mining_power", 0.0),
            speed: values.number_or("mining_speed", 0.0),
            module_slots: module_slots(values),
            resource_categories: string_set(values, "resource_categories"),
        };
        self.data.miners.entry(name.to_string()).or_insert(miner);
    }

    pub fn add_resource(&mut self, name: &str, values: &Value) {
        let Some(minable) = values.get("minable") else {
            warn!("Resource {} is not minable, skipping", name);
            return;
        };

        let result = minable.str_field("result").or_else(|| {
            minable
                .get("results")
                .and_then(|r| r.index(1))
                .and_then(entry_name)
        });
        let Some(result) = result else {
            warn!("Resource {} yields nothing, skipping", name);
            return;
        };

        let category = values
            .str_field("category")
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_RESOURCE_CATEGORY);

        let resource = Resource {
            name: name.to_string(),
            category: category.to_string(),
            hardness: minable.number_or("hardness", 0.0),
            time: minable.number_or("mining_time", 0.0),
            result: result.to_string(),
        };
        self.data.resources.entry(name.to_string()).or_insert(resource);
    }

    /// Only speed modules are modelled.
    pub fn add_module(&mut self, name: &str, values: &Value) {
        let bonus = values
            .get("effect")
            .and_then(|e| e.get("speed"))
            .map(|speed| speed.number_or("bonus", 0.0));

        match bonus {
            Some(speed_bonus) if speed_bonus > 0.0 => {
                self.data.modules.entry(name.to_string()).or_insert(Module {
                    name: name.to_string(),
                    friendly_name: None,
                    speed_bonus,
                });
            }
            _ => debug!("Module {} has no speed bonus, ignoring", name),
        }
    }

    fn insert_machine(&mut self, machine: CraftingMachine) {
        if self.data.machines.contains_key(&machine.name) {
            debug!("Crafting machine {} already defined, keeping the first", machine.name);
            return;
        }
        self.data.machines.insert(machine.name.clone(), machine);
    }

    /// Items referenced by recipes but never declared get a bare entry.
    fn item_for_recipe(&mut self, name: &str) -> &mut Item {
        self.data
            .items
            .entry(name.to_string())
            .or_insert_with(|| Item::new(name))
    }

    fn icon(&mut self, values: &Value) -> Option<Icon> {
        let nominal = values.str_field("icon").or_else(|| {
            values
                .get("icons")
                .and_then(|layers| layers.index(1))
                .and_then(|layer| layer.str_field("icon"))
        })?;
        self.icons.resolve(nominal)
    }
}

/// Older recipes keep their fields under `normal` instead of at the top level.
fn recipe_body(values: &Value) -> &Value {
    let declares = ["ingredients", "result", "results"]
        .iter()
        .any(|k| values.get(k).is_some());
    if declares {
        return values;
    }
    values
        .get("normal")
        .filter(|n| n.is_table())
        .unwrap_or(values)
}

fn extract_results(body: &Value) -> BTreeMap<String, f64> {
    if let Some(name) = body.str_field("result") {
        let count = match body.number_or("result_count", 0.0) {
            c if c == 0.0 => 1.0,
            c => c,
        };
        return BTreeMap::from([(name.to_string(), count)]);
    }
    amounts(body.get("results"))
}

fn extract_ingredients(body: &Value) -> BTreeMap<String, f64> {
    amounts(body.get("ingredients"))
}

/// Sum `(name, amount)` entries, accepting both `{name=, amount=}` and
/// `{name, amount}` shapes.
fn amounts(list: Option<&Value>) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    let Some(list) = list else {
        return out;
    };
    for entry in list.elements() {
        let Some(name) = entry_name(entry) else {
            continue;
        };
        *out.entry(name.to_string()).or_insert(0.0) += entry_amount(entry);
    }
    out
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry
        .str_field("name")
        .or_else(|| entry.index(1).and_then(Value::as_str))
}

fn entry_amount(entry: &Value) -> f64 {
    if let Some(amount) = entry
        .get("amount")
        .or_else(|| entry.index(2))
        .and_then(Value::as_f64)
    {
        return amount;
    }
    match (
        entry.get("amount_min").and_then(Value::as_f64),
        entry.get("amount_max").and_then(Value::as_f64),
    ) {
        (Some(min), Some(max)) => (min + max) / 2.0,
        _ => 1.0,
    }
}

/// Top-level `module_slots`, else the nested `module_specification` form.
fn module_slots(values: &Value) -> u32 {
    let slots = values
        .get("module_slots")
        .or_else(|| {
            values
                .get("module_specification")
                .and_then(|spec| spec.get("module_slots"))
        })
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    as_count(slots)
}

fn as_count(n: f64) -> u32 {
    n.max(0.0) as u32
}

fn string_set(values: &Value, key: &str) -> BTreeSet<String> {
    values.string_list(key).into_iter().collect()
}
