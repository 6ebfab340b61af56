//! Applies localized names to ingested entities

use crate::locale::LocaleTable;
use crate::models::GameData;

/// Sections whose keys name items.
pub const ITEM_NAME_SECTIONS: &[&str] = &["item-name", "fluid-name", "entity-name", "equipment-name"];
pub const ENTITY_NAME_SECTION: &str = "entity-name";
pub const MODULE_NAME_SECTION: &str = "item-name";
pub const RECIPE_NAME_SECTION: &str = "recipe-name";

/// Overlay display names from `locale`.
///
/// Keys that match no entity are ignored, and entities without a key keep
/// their technical name.
pub fn bind_names(data: &mut GameData, locale: &LocaleTable) {
    for section in ITEM_NAME_SECTIONS {
        for (key, value) in locale.section(section).into_iter().flatten() {
            if let Some(item) = data.items.get_mut(key) {
                item.friendly_name = Some(value.clone());
            }
        }
    }

    for (key, value) in locale.section(RECIPE_NAME_SECTION).into_iter().flatten() {
        data.recipe_names.insert(key.clone(), value.clone());
    }

    for (key, value) in locale.section(ENTITY_NAME_SECTION).into_iter().flatten() {
        if let Some(machine) = data.machines.get_mut(key) {
            machine.friendly_name = Some(value.clone());
        }
        if let Some(miner) = data.miners.get_mut(key) {
            miner.friendly_name = Some(value.clone());
        }
    }

    for (key, value) in locale.section(MODULE_NAME_SECTION).into_iter().flatten() {
        if let Some(module) = data.modules.get_mut(key) {
            module.friendly_name = Some(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{CraftingMachine, Item, MachineKind, Module};

    fn sample() -> GameData {
        let mut data = GameData::default();
        for name in ["iron-plate", "water", "stone-furnace"] {
            data.items.insert(name.to_string(), Item::new(name));
        }
        data.machines.insert(
            "stone-furnace".to_string(),
            CraftingMachine {
                name: "stone-furnace".to_string(),
                kind: MachineKind::Furnace,
                friendly_name: None,
                icon: None,
                max_ingredients: 1,
                module_slots: 0,
                speed: 1.0,
                categories: BTreeSet::from(["smelting".to_string()]),
                allowed_effects: BTreeSet::new(),
            },
        );
        data.modules.insert(
            "speed-module".to_string(),
            Module {
                name: "speed-module".to_string(),
                friendly_name: None,
                speed_bonus: 0.2,
            },
        );
        data
    }

    #[test]
    fn binds_names_by_section() {
        let mut locale = LocaleTable::new();
        locale.merge_str(
            "[item-name]\n\
             iron-plate=Iron plate\n\
             speed-module=Speed module\n\
             [fluid-name]\n\
             water=Water\n\
             [entity-name]\n\
             stone-furnace=Stone furnace\n\
             [recipe-name]\n\
             basic-oil-processing=Basic oil processing\n",
        );

        let mut data = sample();
        bind_names(&mut data, &locale);

        assert_eq!(data.items["iron-plate"].display_name(), "Iron plate");
        assert_eq!(data.items["water"].display_name(), "Water");
        assert_eq!(data.items["stone-furnace"].display_name(), "Stone furnace");
        assert_eq!(data.machines["stone-furnace"].display_name(), "Stone furnace");
        assert_eq!(data.modules["speed-module"].display_name(), "Speed module");
        assert_eq!(
            data.recipe_display_name("basic-oil-processing"),
            "Basic oil processing"
        );
        assert_eq!(data.recipe_display_name("unknown-recipe"), "unknown-recipe");
    }

    #[test]
    fn unmatched_keys_create_nothing() {
        let mut locale = LocaleTable::new();
        locale.merge_str("[item-name]\nghost=Ghost\n[entity-name]\nphantom=Phantom\n");

        let mut data = sample();
        bind_names(&mut data, &locale);

        assert_eq!(data.items.len(), 3);
        assert!(!data.items.contains_key("ghost"));
        assert_eq!(data.items["iron-plate"].display_name(), "iron-plate");
    }

    #[test]
    fn empty_locale_is_a_no_op() {
        let mut data = sample();
        bind_names(&mut data, &LocaleTable::new());
        assert!(data.items.values().all(|i| i.friendly_name.is_none()));
        assert!(data.recipe_names.is_empty());
    }
}
