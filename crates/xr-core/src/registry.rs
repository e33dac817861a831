//! Atom to format mapping.
//!
//! The registry is an append-only list of [`AtomMapping`]s. Lookups scan
//! from the newest entry backwards, so a later registration for the same
//! atom shadows an earlier one. It is filled once at startup (built-in
//! table, then config mappings) and only read afterwards.

use crate::format::{DisplayFormat, FormatSpec};
use xr_common::{AtomId, Error, Result};
use xr_config::MappingConfig;

/// Format used when nothing is registered: hex, any width.
pub const DEFAULT_FORMAT: &str = "0x";

/// Display format used when nothing is registered: every field, joined.
pub const DEFAULT_DFORMAT: &str = " = $0+\n";

/// Name lookups the registry cannot answer itself.
///
/// Implemented by the window system connection.
pub trait AtomResolver {
    /// Runtime id for `name`, or `None` when the server has never seen it.
    fn intern(&self, name: &str) -> Result<Option<AtomId>>;

    /// Best-effort reverse lookup.
    fn atom_name(&self, id: AtomId) -> Option<String>;
}

/// Resolver that knows no atoms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl AtomResolver for NullResolver {
    fn intern(&self, _name: &str) -> Result<Option<AtomId>> {
        Ok(None)
    }

    fn atom_name(&self, _id: AtomId) -> Option<String> {
        None
    }
}

/// One registry entry. Either format half may be absent, in which case a
/// lookup leaves that half to the next source.
#[derive(Debug, Clone)]
pub struct AtomMapping {
    pub id: AtomId,
    pub name: String,
    pub format: Option<FormatSpec>,
    pub dformat: Option<DisplayFormat>,
}

/// Entry of the built-in table. `atom` is `None` for atoms that are not
/// predefined by the protocol and must be interned.
struct BuiltinEntry {
    name: &'static str,
    atom: Option<AtomId>,
    format: &'static str,
    dformat: Option<&'static str>,
}

const BUILTIN_TABLE: &[BuiltinEntry] = &[
    BuiltinEntry {
        name: "ATOM",
        atom: Some(AtomId(4)),
        format: "32a",
        dformat: None,
    },
    BuiltinEntry {
        name: "CARDINAL",
        atom: Some(AtomId(6)),
        format: "0c",
        dformat: None,
    },
    BuiltinEntry {
        name: "INTEGER",
        atom: Some(AtomId(19)),
        format: "0i",
        dformat: None,
    },
    BuiltinEntry {
        name: "STRING",
        atom: Some(AtomId(31)),
        format: "8s",
        dformat: None,
    },
    BuiltinEntry {
        name: "WINDOW",
        atom: Some(AtomId(33)),
        format: "32x",
        dformat: Some(": window id # $0+\n"),
    },
    BuiltinEntry {
        name: "UTF8_STRING",
        atom: None,
        format: "8u",
        dformat: None,
    },
];

/// Formats chosen for one property.
#[derive(Debug, Clone)]
pub struct ResolvedFormats {
    pub format: FormatSpec,
    pub dformat: DisplayFormat,
}

#[derive(Debug, Clone, Default)]
pub struct AtomRegistry {
    mappings: Vec<AtomMapping>,
}

impl AtomRegistry {
    /// Empty registry; every lookup falls through to the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in table.
    ///
    /// Table atoms without a predefined id are interned through `resolver`
    /// and skipped when the server does not know them.
    pub fn with_builtins(resolver: &dyn AtomResolver) -> Result<Self> {
        let mut registry = Self::new();
        for entry in BUILTIN_TABLE {
            let id = match entry.atom {
                Some(id) => id,
                None => match resolver.intern(entry.name)? {
                    Some(id) => id,
                    None => {
                        tracing::debug!(atom = entry.name, "builtin atom unknown to server");
                        continue;
                    }
                },
            };
            registry.register(id, entry.name, Some(entry.format), entry.dformat)?;
        }
        Ok(registry)
    }

    /// Append a mapping. Both format strings are validated here so a bad
    /// mapping fails at startup instead of at render time.
    pub fn register(
        &mut self,
        id: AtomId,
        name: &str,
        format: Option<&str>,
        dformat: Option<&str>,
    ) -> Result<()> {
        let format = format.map(FormatSpec::parse).transpose()?;
        let dformat = dformat.map(DisplayFormat::parse).transpose()?;
        tracing::debug!(
            atom = %id,
            name,
            format = format.as_ref().map(FormatSpec::as_str),
            dformat = dformat.as_ref().map(DisplayFormat::as_str),
            "registered atom mapping"
        );
        self.mappings.push(AtomMapping {
            id,
            name: name.to_string(),
            format,
            dformat,
        });
        Ok(())
    }

    /// Register user mappings from configuration, after the built-ins.
    ///
    /// Atom names unknown to the server are skipped: no property can carry
    /// them. Returns the number of mappings registered.
    pub fn register_config(
        &mut self,
        mappings: &[MappingConfig],
        resolver: &dyn AtomResolver,
    ) -> Result<usize> {
        let mut registered = 0;
        for (idx, mapping) in mappings.iter().enumerate() {
            let Some(id) = resolver.intern(&mapping.atom)? else {
                tracing::debug!(atom = %mapping.atom, "configured atom unknown to server");
                continue;
            };
            self.register(
                id,
                &mapping.atom,
                mapping.format.as_deref(),
                mapping.dformat.as_deref(),
            )
            .map_err(|e| Error::Config(format!("mappings[{idx}] ({}): {e}", mapping.atom)))?;
            registered += 1;
        }
        Ok(registered)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Formats of the most recent mapping for `id`.
    ///
    /// Only that one mapping is consulted: a missing half is not filled
    /// from an older mapping for the same atom.
    pub fn lookup(&self, id: AtomId) -> (Option<&FormatSpec>, Option<&DisplayFormat>) {
        match self.mappings.iter().rev().find(|m| m.id == id) {
            Some(m) => (m.format.as_ref(), m.dformat.as_ref()),
            None => (None, None),
        }
    }

    /// Pick formats for a property: the property's own mapping first, then
    /// the mapping of its declared type, then the defaults. Each half is
    /// taken from the first source that has it.
    pub fn resolve_formats(&self, property: AtomId, type_id: AtomId) -> Result<ResolvedFormats> {
        let (mut format, mut dformat) = self.lookup(property);
        if !type_id.is_none() {
            let (type_format, type_dformat) = self.lookup(type_id);
            format = format.or(type_format);
            dformat = dformat.or(type_dformat);
        }

        let format = match format {
            Some(f) => f.clone(),
            None => FormatSpec::parse(DEFAULT_FORMAT)?,
        };
        let dformat = match dformat {
            Some(d) => d.clone(),
            None => DisplayFormat::parse(DEFAULT_DFORMAT)?,
        };
        tracing::debug!(
            property = %property,
            type_id = %type_id,
            format = format.as_str(),
            dformat = dformat.as_str(),
            "resolved formats"
        );
        Ok(ResolvedFormats { format, dformat })
    }

    /// Human-readable name for `id`: registered name, then the resolver,
    /// then a synthesized placeholder.
    pub fn resolve_name(&self, id: AtomId, resolver: &dyn AtomResolver) -> String {
        if let Some(m) = self.mappings.iter().rev().find(|m| m.id == id) {
            return m.name.clone();
        }
        resolver
            .atom_name(id)
            .unwrap_or_else(|| format!("undefined atom # {:#x}", id.0))
    }
}
