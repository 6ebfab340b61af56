//! End-to-end ingestion over a throwaway game tree with the embedded Lua engine.

#![cfg(feature = "lua")]

use std::fs;
use std::path::{Path, PathBuf};

use foreman_data::icons::IconColours;
use foreman_data::models::{DEFAULT_RECIPE_TIME, MachineKind};
use foreman_data::{IngestError, LoadOptions, load_game_data};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

const DATALOADER: &str = r#"
data = { raw = {} }

function data:extend(prototypes)
  for _, p in ipairs(prototypes) do
    self.raw[p.type] = self.raw[p.type] or {}
    self.raw[p.type][p.name] = p
  end
end
"#;

const BASE_DATA: &str = r#"
require("prototypes.item")
require("prototypes.recipe")
require("prototypes.entity")
"#;

const BASE_ITEMS: &str = r#"
data:extend({
  { type = "item", name = "iron-plate", icon = "__base__/graphics/icons/iron-plate.png", stack_size = 100 },
  { type = "item", name = "iron-gear-wheel", icon = "__base__/graphics/icons/missing.png", stack_size = 100 },
  { type = "fluid", name = "water", icon = "__base__/graphics/icons/water.png" },
  { type = "module", name = "speed-module", effect = { speed = { bonus = 0.2 }, consumption = { bonus = 0.5 } } },
  { type = "module", name = "productivity-module", effect = { productivity = { bonus = 0.04 } } },
})
"#;

const BASE_RECIPES: &str = r#"
data:extend({
  { type = "recipe", name = "iron-gear-wheel", ingredients = { { "iron-plate", 2 } }, result = "iron-gear-wheel" },
  { type = "recipe", name = "iron-plate", category = "smelting", energy_required = 3.5,
    ingredients = { { "iron-ore", 1 } }, result = "iron-plate" },
  { type = "recipe", name = "pipe", ingredients = { { type = "item", name = "iron-plate", amount = 1 } },
    results = { { type = "item", name = "pipe", amount = 1 } } },
})
"#;

const BASE_ENTITIES: &str = r#"
data:extend({
  { type = "assembling-machine", name = "assembling-machine-2", ingredient_count = 4, module_slots = 0,
    crafting_speed = 0.75, crafting_categories = { "crafting", "advanced-crafting" },
    allowed_effects = { "speed", "consumption" } },
  { type = "furnace", name = "stone-furnace", module_slots = 0, crafting_speed = 1,
    crafting_categories = { "smelting" } },
  { type = "mining-drill", name = "burner-mining-drill", mining_power = 2.5, mining_speed = 0.35,
    resource_categories = { "basic-solid" } },
  { type = "resource", name = "iron-ore", minable = { hardness = 0.9, mining_time = 2, result = "iron-ore" } },
  { type = "resource", name = "crude-oil", category = "basic-fluid",
    minable = { hardness = 1, mining_time = 1, results = { { type = "fluid", name = "crude-oil", amount = 10 } } } },
})
"#;

const MOD_DATA: &str = r#"
local n = table_size({ a = 1, b = 2 })
local first = unpack({ "x", "y" })
data:extend({
  { type = "item", name = "iron-plate", icon = "__mymod__/graphics/better-plate.png", stack_size = n },
  { type = "recipe", name = "gizmo", category = first == "x" and "crafting" or "broken",
    ingredients = { { "iron-gear-wheel", 3 }, { "unobtainium", 1 } }, result = "gizmo", result_count = 2 },
})
"#;

struct Fixture {
    _tmp: TempDir,
    root: PathBuf,
    mymod: PathBuf,
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn write_png(path: &Path, colour: Rgba<u8>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(8, 8, colour).save(path).unwrap();
}

fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("factorio");
    let data = root.join("data");
    let base = data.join("base");
    let mymod = tmp.path().join("mods").join("mymod");

    write(&data.join("core/lualib/dataloader.lua"), DATALOADER);
    write(&base.join("data.lua"), BASE_DATA);
    write(&base.join("prototypes/item.lua"), BASE_ITEMS);
    write(&base.join("prototypes/recipe.lua"), BASE_RECIPES);
    write(&base.join("prototypes/entity.lua"), BASE_ENTITIES);
    write_png(&base.join("graphics/icons/iron-plate.png"), Rgba([0, 0, 255, 255]));
    write(&base.join("graphics/icons/water.png"), "not a png");
    write(
        &base.join("locale/en/base.cfg"),
        "[item-name]\niron-plate=Iron plate\nspeed-module=Speed module\n\
         [entity-name]\nassembling-machine-2=Assembling machine 2\nburner-mining-drill=Burner mining drill\n\
         [recipe-name]\npipe=Pipe\n",
    );

    write(&mymod.join("data.lua"), MOD_DATA);
    write_png(&mymod.join("graphics/better-plate.png"), Rgba([255, 0, 0, 255]));
    write(&mymod.join("locale/en/mymod.cfg"), "[item-name]\niron-plate=Forged iron\ngizmo=Gizmo\n");

    Fixture {
        _tmp: tmp,
        root,
        mymod,
    }
}

fn load(f: &Fixture) -> foreman_data::GameData {
    let options = LoadOptions::new(&f.root).with_mods(vec![f.mymod.clone()]);
    load_game_data(&options).unwrap()
}

#[test]
fn builds_every_collection() {
    let f = fixture();
    let data = load(&f);

    assert_eq!(data.recipes.len(), 4);
    assert_eq!(data.machines.len(), 2);
    assert_eq!(data.miners.len(), 1);
    assert_eq!(data.resources.len(), 2);
    assert_eq!(data.modules.len(), 1);
    assert_eq!(data.modules["speed-module"].speed_bonus, 0.2);
}

#[test]
fn recipes_only_reference_known_items() {
    let f = fixture();
    let data = load(&f);

    for recipe in data.recipes.values() {
        assert!(!recipe.results.is_empty());
        for item in recipe.ingredients.keys().chain(recipe.results.keys()) {
            assert!(data.items.contains_key(item), "{} not registered", item);
        }
    }
    let unobtainium = &data.items["unobtainium"];
    assert!(unobtainium.icon.is_none());
    assert_eq!(unobtainium.display_name(), "unobtainium");
    assert!(data.items["iron-plate"].recipes.contains("iron-plate"));
}

#[test]
fn recipe_fields_follow_defaults() {
    let f = fixture();
    let data = load(&f);

    let gear = &data.recipes["iron-gear-wheel"];
    assert_eq!(gear.time, DEFAULT_RECIPE_TIME);
    assert_eq!(gear.category, "crafting");
    assert_eq!(gear.ingredients["iron-plate"], 2.0);
    assert_eq!(gear.results["iron-gear-wheel"], 1.0);

    let plate = &data.recipes["iron-plate"];
    assert_eq!(plate.time, 3.5);
    assert_eq!(plate.category, "smelting");

    let gizmo = &data.recipes["gizmo"];
    assert_eq!(gizmo.category, "crafting");
    assert_eq!(gizmo.results["gizmo"], 2.0);
    assert_eq!(gizmo.ingredients["iron-gear-wheel"], 3.0);
}

#[test]
fn machines_apply_module_slot_policy() {
    let f = fixture();
    let data = load(&f);

    let assembler = &data.machines["assembling-machine-2"];
    assert_eq!(assembler.kind, MachineKind::Assembler);
    assert_eq!(assembler.module_slots, 2);
    assert_eq!(assembler.max_ingredients, 4);
    assert_eq!(assembler.display_name(), "Assembling machine 2");

    let furnace = &data.machines["stone-furnace"];
    assert_eq!(furnace.kind, MachineKind::Furnace);
    assert_eq!(furnace.module_slots, 0);
    assert_eq!(furnace.max_ingredients, 1);
    assert_eq!(furnace.display_name(), "stone-furnace");

    assert_eq!(data.miners["burner-mining-drill"].display_name(), "Burner mining drill");
}

#[test]
fn resources_yield_one_item() {
    let f = fixture();
    let data = load(&f);

    let iron = &data.resources["iron-ore"];
    assert_eq!(iron.category, "basic-solid");
    assert_eq!(iron.result, "iron-ore");
    assert_eq!(data.resources["crude-oil"].result, "crude-oil");
}

#[test]
fn base_item_beats_mod_but_mod_locale_beats_base() {
    let f = fixture();
    let data = load(&f);

    let plate = &data.items["iron-plate"];
    let icon = plate.icon.as_ref().expect("base icon resolves");
    assert!(icon.path().unwrap().ends_with("base/graphics/icons/iron-plate.png"));
    assert_eq!(plate.display_name(), "Forged iron");
    assert_eq!(data.items["gizmo"].display_name(), "Gizmo");
    assert_eq!(data.modules["speed-module"].display_name(), "Speed module");
    assert_eq!(data.recipe_display_name("pipe"), "Pipe");
}

#[test]
fn unresolved_icons_fall_back_to_placeholder() {
    let f = fixture();
    let data = load(&f);

    let gear = &data.items["iron-gear-wheel"];
    let water = &data.items["water"];
    assert!(gear.icon.is_none());
    assert!(water.icon.is_none());
    assert!(data.icon_or_unknown(gear.icon.as_ref()).is_placeholder());

    let mut colours = IconColours::new();
    let plate_icon = data.items["iron-plate"].icon.as_ref();
    assert_eq!(colours.colour(plate_icon), Rgba([127, 127, 255, 255]));
}

#[test]
fn broken_mod_script_is_fatal() {
    let f = fixture();
    write(&f.mymod.join("data.lua"), "data:extend({ { type = 'item', name = 'x' } })\nerror('mod exploded')");

    let options = LoadOptions::new(&f.root).with_mods(vec![f.mymod.clone()]);
    match load_game_data(&options) {
        Err(IngestError::Script(fault)) => {
            assert!(fault.script.ends_with("data.lua"));
            assert!(fault.message.contains("mod exploded"));
        }
        other => panic!("expected script fault, got {:?}", other.map(|d| d.stats())),
    }
}

#[test]
fn language_selects_locale_directory() {
    let f = fixture();
    write(
        &f.root.join("data/base/locale/de/base.cfg"),
        "[item-name]\niron-plate=Eisenplatte\n",
    );

    let options = LoadOptions {
        language: "de".to_string(),
        ..LoadOptions::new(&f.root)
    };
    let data = load_game_data(&options).unwrap();
    assert_eq!(data.items["iron-plate"].display_name(), "Eisenplatte");
    assert_eq!(data.machines["assembling-machine-2"].display_name(), "assembling-machine-2");
}

#[test]
fn mod_require_resolves_inside_mod_directory() {
    let f = fixture();
    write(&f.mymod.join("data.lua"), "require(\"prototypes.item\")\n");
    write(
        &f.mymod.join("prototypes/item.lua"),
        "data:extend({ { type = \"item\", name = \"mod-thing\", stack_size = 50 } })\n",
    );

    let data = load(&f);
    assert!(data.items.contains_key("mod-thing"));
    assert!(data.items.contains_key("iron-plate"));
    assert!(data.items.contains_key("speed-module"));
}

#[test]
fn cyclic_prototype_tables_do_not_stall_ingestion() {
    let f = fixture();
    write(
        &f.mymod.join("data.lua"),
        "local p = { type = \"item\", name = \"loopy\" }\np.a = p\np.b = p\ndata:extend({ p })\n",
    );

    let data = load(&f);
    assert!(data.items.contains_key("loopy"));
}

#[test]
fn missing_entry_script_is_a_script_fault() {
    let f = fixture();
    fs::remove_file(f.mymod.join("data.lua")).unwrap();

    let options = LoadOptions::new(&f.root).with_mods(vec![f.mymod.clone()]);
    match load_game_data(&options) {
        Err(IngestError::Script(fault)) => assert!(fault.script.ends_with("data.lua")),
        other => panic!("expected script fault, got {:?}", other.map(|d| d.stats())),
    }
}
