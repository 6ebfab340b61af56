//! Embedded Lua evaluator backing [`ScriptEngine`]

use std::collections::{BTreeMap, HashSet};
use std::ffi::c_void;
use std::fs;
use std::path::Path;

use mlua::{Lua, Table, Value as LuaValue};

use crate::script::{ScriptEngine, ScriptFault};
use crate::value::Value;

/// Nesting limit when copying tables out of the evaluator. Prototype tables are
/// shallow; sprite definitions rarely go past ten levels.
const MAX_DEPTH: usize = 32;

/// A single Lua state. Dropping it releases the evaluator.
pub struct LuaEngine {
    lua: Lua,
    /// `package.loaded` entries present before any data script ran.
    builtin_modules: Option<HashSet<String>>,
}

impl LuaEngine {
    pub fn new() -> Self {
        Self {
            lua: Lua::new(),
            builtin_modules: None,
        }
    }

    fn loaded_modules(&self) -> mlua::Result<Table> {
        let package: Table = self.lua.globals().get("package")?;
        package.get("loaded")
    }
}

impl Default for LuaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for LuaEngine {
    fn begin_directory(&mut self) -> Result<(), ScriptFault> {
        let fault = |e: mlua::Error| ScriptFault::new("package.loaded", e.to_string());
        let loaded = self.loaded_modules().map_err(fault)?;

        if self.builtin_modules.is_none() {
            let names = loaded
                .pairs::<String, LuaValue>()
                .map(|pair| pair.map(|(name, _)| name))
                .collect::<mlua::Result<HashSet<_>>>()
                .map_err(fault)?;
            self.builtin_modules = Some(names);
            return Ok(());
        }

        if let Some(builtin) = &self.builtin_modules {
            let stale = loaded
                .pairs::<String, LuaValue>()
                .filter_map(|pair| match pair {
                    Ok((name, _)) if builtin.contains(&name) => None,
                    other => Some(other.map(|(name, _)| name)),
                })
                .collect::<mlua::Result<Vec<_>>>()
                .map_err(fault)?;
            for name in stale {
                loaded.set(name, LuaValue::Nil).map_err(fault)?;
            }
        }
        Ok(())
    }

    fn extend_search_path(&mut self, dir: &Path) -> Result<(), ScriptFault> {
        let fault = |e: mlua::Error| ScriptFault::new("package.path", e.to_string());

        let package: Table = self.lua.globals().get("package").map_err(fault)?;
        let current: String = package.get("path").map_err(fault)?;
        let entry = dir.join("?.lua");
        package
            .set("path", format!("{};{}", entry.display(), current))
            .map_err(fault)
    }

    fn execute(&mut self, script: &Path) -> Result<(), ScriptFault> {
        let name = script.display().to_string();
        let source =
            fs::read_to_string(script).map_err(|e| ScriptFault::new(name.clone(), e.to_string()))?;
        self.lua
            .load(source.as_str())
            .set_name(format!("@{}", name))
            .exec()
            .map_err(|e| ScriptFault::new(name, e.to_string()))
    }

    fn execute_source(&mut self, name: &str, source: &str) -> Result<(), ScriptFault> {
        self.lua
            .load(source)
            .set_name(format!("={}", name))
            .exec()
            .map_err(|e| ScriptFault::new(name, e.to_string()))
    }

    fn read_global(&self, path: &str) -> Result<Option<Value>, ScriptFault> {
        let fault = |e: mlua::Error| ScriptFault::new(path, e.to_string());

        let mut current = LuaValue::Table(self.lua.globals());
        for segment in path.split('.') {
            current = match current {
                LuaValue::Table(t) => t.get::<LuaValue>(segment).map_err(fault)?,
                _ => return Ok(None),
            };
        }

        convert(current, &mut Vec::new()).map_err(fault)
    }
}

/// `ancestors` holds the tables currently being copied. A table that appears
/// among its own ancestors is dropped, as is anything nested past [`MAX_DEPTH`].
fn convert(value: LuaValue, ancestors: &mut Vec<*const c_void>) -> mlua::Result<Option<Value>> {
    let converted = match value {
        LuaValue::Boolean(b) => Some(Value::Bool(b)),
        LuaValue::Integer(i) => Some(Value::Number(i as f64)),
        LuaValue::Number(n) => Some(Value::Number(n)),
        LuaValue::String(s) => Some(Value::String(String::from(s.to_string_lossy()))),
        LuaValue::Table(t) => {
            let ptr = t.to_pointer();
            if ancestors.len() >= MAX_DEPTH || ancestors.contains(&ptr) {
                return Ok(None);
            }
            ancestors.push(ptr);
            let table = convert_table(&t, ancestors);
            ancestors.pop();
            Some(table?)
        }
        _ => None,
    };
    Ok(converted)
}

fn convert_table(table: &Table, ancestors: &mut Vec<*const c_void>) -> mlua::Result<Value> {
    let mut positional: Vec<(i64, Value)> = Vec::new();
    let mut named: BTreeMap<String, Value> = BTreeMap::new();

    for pair in table.pairs::<LuaValue, LuaValue>() {
        let (key, value) = pair?;
        let Some(value) = convert(value, ancestors)? else {
            continue;
        };
        match key {
            LuaValue::Integer(i) => positional.push((i as i64, value)),
            LuaValue::Number(n) if n.fract() == 0.0 => positional.push((n as i64, value)),
            LuaValue::String(s) => {
                named.insert(String::from(s.to_string_lossy()), value);
            }
            _ => {}
        }
    }

    positional.sort_by_key(|(i, _)| *i);
    let is_sequence = positional
        .iter()
        .enumerate()
        .all(|(idx, (key, _))| *key == idx as i64 + 1);

    if named.is_empty() && is_sequence {
        return Ok(Value::List(positional.into_iter().map(|(_, v)| v).collect()));
    }

    for (key, value) in positional {
        named.insert(key.to_string(), value);
    }
    Ok(Value::Table(named))
}
