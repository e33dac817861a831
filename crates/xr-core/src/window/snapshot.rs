//! Offline window system backed by a JSON snapshot.
//!
//! ```json
//! {
//!   "root": "0x100",
//!   "atoms": { "_NET_WM_PID": 300 },
//!   "windows": {
//!     "0x400001": {
//!       "_NET_WM_PID": { "type": "CARDINAL", "format": 32, "items": [4321] },
//!       "WM_NAME":     { "type": "STRING",   "format": 8,  "text": "xterm" },
//!       "_RAW":        { "type": "_BLOB",    "format": 8,  "bytes": [1, 2, 3] }
//!     }
//!   }
//! }
//! ```
//!
//! Window ids are hex (`0x…`) or decimal strings. Atoms listed under
//! `atoms` keep their ids; other names used in the file are assigned ids
//! after the predefined range, in name order. Values are encoded in
//! native byte order at load time, exactly as a live server delivers them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{predefined_atom, PropertyData, WindowSystem, PREDEFINED_ATOMS};
use crate::registry::AtomResolver;
use xr_common::{AtomId, Error, Result, WindowId};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSnapshot {
    root: String,
    #[serde(default)]
    atoms: BTreeMap<String, u32>,
    #[serde(default)]
    windows: BTreeMap<String, BTreeMap<String, RawProperty>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProperty {
    #[serde(rename = "type")]
    type_name: String,
    format: u8,
    #[serde(default)]
    items: Option<Vec<i64>>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    bytes: Option<Vec<u8>>,
}

/// Window system read from a snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotSystem {
    root: WindowId,
    by_name: HashMap<String, AtomId>,
    by_id: HashMap<AtomId, String>,
    windows: HashMap<WindowId, HashMap<AtomId, PropertyData>>,
}

impl SnapshotSystem {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let system = Self::from_json(&content)
            .map_err(|e| Error::Config(format!("snapshot {}: {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            windows = system.windows.len(),
            atoms = system.by_name.len(),
            "loaded window snapshot"
        );
        Ok(system)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        let root = parse_window(&raw.root)?;

        let mut system = SnapshotSystem {
            root,
            by_name: HashMap::new(),
            by_id: HashMap::new(),
            windows: HashMap::new(),
        };
        system.assign_atoms(&raw)?;

        for (key, properties) in &raw.windows {
            let window = parse_window(key)?;
            let mut table = HashMap::with_capacity(properties.len());
            for (name, prop) in properties {
                let data = system
                    .encode(prop)
                    .map_err(|e| Error::Config(format!("window {key} property {name}: {e}")))?;
                table.insert(system.atom(name)?, data);
            }
            system.windows.insert(window, table);
        }

        Ok(system)
    }

    fn assign_atoms(&mut self, raw: &RawSnapshot) -> Result<()> {
        for (idx, name) in PREDEFINED_ATOMS.iter().enumerate() {
            self.add_atom(name, AtomId(idx as u32 + 1));
        }

        for (name, &id) in &raw.atoms {
            if id == 0 {
                return Err(Error::Config(format!("atom {name} cannot use id 0")));
            }
            if let Some(existing) = self.by_id.get(&AtomId(id)) {
                if existing != name {
                    return Err(Error::Config(format!(
                        "atom id {id} given to both {existing} and {name}"
                    )));
                }
            }
            if predefined_atom(name).is_some_and(|p| p.0 != id) {
                return Err(Error::Config(format!(
                    "atom {name} is predefined and cannot be renumbered"
                )));
            }
            self.add_atom(name, AtomId(id));
        }

        let used: BTreeSet<&str> = raw
            .windows
            .values()
            .flat_map(|props| {
                props
                    .iter()
                    .flat_map(|(name, p)| [name.as_str(), p.type_name.as_str()])
            })
            .collect();

        let mut last = self
            .by_id
            .keys()
            .map(|id| id.0)
            .max()
            .unwrap_or(0)
            .max(PREDEFINED_ATOMS.len() as u32);
        for name in used {
            if !self.by_name.contains_key(name) {
                last = last.checked_add(1).ok_or_else(|| {
                    Error::Config(format!("no atom id left for {name} after {last:#x}"))
                })?;
                self.add_atom(name, AtomId(last));
            }
        }
        Ok(())
    }

    fn atom(&self, name: &str) -> Result<AtomId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::Config(format!("atom {name} was not assigned an id")))
    }

    fn add_atom(&mut self, name: &str, id: AtomId) {
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
    }

    fn encode(&self, prop: &RawProperty) -> Result<PropertyData> {
        let type_id = self.atom(&prop.type_name)?;
        let width = prop.format;
        if !matches!(width, 8 | 16 | 32) {
            return Err(Error::Config(format!("format must be 8, 16 or 32, got {width}")));
        }

        let bytes = match (&prop.items, &prop.text, &prop.bytes) {
            (Some(items), None, None) => encode_items(items, width)?,
            (None, Some(text), None) => {
                if width != 8 {
                    return Err(Error::Config("text needs format 8".to_string()));
                }
                text.as_bytes().to_vec()
            }
            (None, None, Some(bytes)) => bytes.clone(),
            _ => {
                return Err(Error::Config(
                    "exactly one of items, text or bytes is required".to_string(),
                ))
            }
        };

        Ok(PropertyData {
            bytes,
            type_id,
            bit_width: width,
        })
    }
}

/// Items may be given signed or unsigned; both must fit the width.
fn encode_items(items: &[i64], width: u8) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(items.len() * usize::from(width / 8));
    for &item in items {
        let out_of_range =
            || Error::Config(format!("item {item} does not fit in {width} bits"));
        match width {
            8 => {
                let v = u8::try_from(item)
                    .or_else(|_| i8::try_from(item).map(|v| v as u8))
                    .map_err(|_| out_of_range())?;
                out.push(v);
            }
            16 => {
                let v = u16::try_from(item)
                    .or_else(|_| i16::try_from(item).map(|v| v as u16))
                    .map_err(|_| out_of_range())?;
                out.extend_from_slice(&v.to_ne_bytes());
            }
            _ => {
                let v = u32::try_from(item)
                    .or_else(|_| i32::try_from(item).map(|v| v as u32))
                    .map_err(|_| out_of_range())?;
                out.extend_from_slice(&v.to_ne_bytes());
            }
        }
    }
    Ok(out)
}

fn parse_window(text: &str) -> Result<WindowId> {
    text.parse::<WindowId>().map_err(Error::Config)
}

impl AtomResolver for SnapshotSystem {
    fn intern(&self, name: &str) -> Result<Option<AtomId>> {
        Ok(self.by_name.get(name).copied())
    }

    fn atom_name(&self, id: AtomId) -> Option<String> {
        self.by_id.get(&id).cloned()
    }
}

impl WindowSystem for SnapshotSystem {
    fn root_window(&self) -> WindowId {
        self.root
    }

    fn property(
        &self,
        window: WindowId,
        attribute: AtomId,
        max_length: usize,
    ) -> Result<PropertyData> {
        let properties = match self.windows.get(&window) {
            Some(properties) => properties,
            None if window == self.root => return Ok(PropertyData::absent()),
            None => return Err(Error::NoSuchWindow { window }),
        };

        let Some(data) = properties.get(&attribute) else {
            return Ok(PropertyData::absent());
        };
        let mut data = data.clone();
        data.bytes.truncate(max_length);
        Ok(data)
    }
}
