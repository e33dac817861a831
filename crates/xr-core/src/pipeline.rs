//! Property read pipeline.
//!
//! intern attribute → fetch bytes → resolve formats → width check →
//! decode → render. Each step either hands a value to the next or fails
//! with a typed error; nothing is printed here.

use serde::Serialize;

use crate::decode::decode;
use crate::format::ValueFormatter;
use crate::registry::AtomRegistry;
use crate::window::WindowSystem;
use xr_common::{AtomId, Error, ProcessId, Result, WindowId};

/// A property rendered through its display format.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedProperty {
    pub window: WindowId,
    pub name: String,
    pub atom: AtomId,
    pub type_name: String,
    pub bit_width: u8,
    pub format: String,
    pub dformat: String,
    /// Display format header, printed between name and text.
    #[serde(skip)]
    pub header: String,
    pub field_count: usize,
    pub text: String,
    /// Value of the first field directive.
    pub value: Option<String>,
    pub truncated: bool,
}

impl RenderedProperty {
    /// The property value as a process id.
    pub fn process_id(&self) -> Result<ProcessId> {
        let value = self.value.as_deref().unwrap_or_default();
        ProcessId::parse(value).ok_or_else(|| Error::InvalidProcessId(value.to_string()))
    }

    /// `NAME<header><text>`, the way property listings print it.
    pub fn line(&self) -> String {
        format!("{}{}{}", self.name, self.header, self.text)
    }
}

pub struct PropertyPipeline<'a, W: WindowSystem> {
    system: &'a W,
    registry: &'a AtomRegistry,
    max_length: usize,
}

impl<'a, W: WindowSystem> PropertyPipeline<'a, W> {
    pub fn new(system: &'a W, registry: &'a AtomRegistry, max_length: usize) -> Self {
        Self {
            system,
            registry,
            max_length,
        }
    }

    /// Read and render property `name` of `window`.
    ///
    /// An attribute the server has never interned, or one not set on the
    /// window, is [`Error::AttributeAbsent`]. A registered format whose size
    /// disagrees with the property is [`Error::TypeSizeMismatch`].
    #[tracing::instrument(level = "debug", skip(self, window), fields(window = %window))]
    pub fn read(&self, window: WindowId, name: &str) -> Result<RenderedProperty> {
        let atom = self
            .system
            .intern(name)?
            .ok_or_else(|| Error::AttributeAbsent {
                name: name.to_string(),
                detail: "no such atom on any window".to_string(),
            })?;

        let data = self.system.property(window, atom, self.max_length)?;
        if data.is_absent() {
            return Err(Error::AttributeAbsent {
                name: name.to_string(),
                detail: "not found".to_string(),
            });
        }

        let resolved = self.registry.resolve_formats(atom, data.type_id)?;
        resolved.format.check_width(data.bit_width)?;

        let fields = decode(&data.bytes, data.type_id, &resolved.format, data.bit_width)?;
        let formatter = ValueFormatter::new(self.registry, self.system, self.max_length);
        let rendered = resolved
            .dformat
            .render(&fields, &resolved.format, &formatter)?;

        tracing::debug!(
            property = name,
            bytes = data.bytes.len(),
            fields = fields.len(),
            truncated = rendered.truncated,
            "rendered property"
        );

        Ok(RenderedProperty {
            window,
            name: name.to_string(),
            atom,
            type_name: self.registry.resolve_name(data.type_id, self.system),
            bit_width: data.bit_width,
            format: resolved.format.as_str().to_string(),
            dformat: resolved.dformat.as_str().to_string(),
            header: resolved.dformat.header().to_string(),
            field_count: fields.len(),
            value: rendered.first_value().map(str::to_string),
            text: rendered.text,
            truncated: rendered.truncated,
        })
    }
}
