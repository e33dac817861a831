//! Window system access.
//!
//! The engine needs four things from the window system: intern an
//! attribute name, fetch a property's raw bytes, reverse-resolve an atom
//! id, and name the root window. [`WindowSystem`] captures exactly that.
//! Two backends exist: a live X11 connection and a JSON snapshot.

pub mod snapshot;
#[cfg(feature = "x11")]
pub mod x11;

use serde::Serialize;

use crate::decode::decode;
use crate::format::FormatSpec;
use crate::registry::AtomResolver;
use xr_common::{AtomId, Error, Result, WindowId};

pub use snapshot::SnapshotSystem;
#[cfg(feature = "x11")]
pub use x11::X11System;

/// Attribute the window manager sets on the root to name the focused window.
pub const ACTIVE_WINDOW_PROPERTY: &str = "_NET_ACTIVE_WINDOW";

/// Atoms every X server predefines, indexed by `id - 1`.
pub const PREDEFINED_ATOMS: &[&str] = &[
    "PRIMARY",
    "SECONDARY",
    "ARC",
    "ATOM",
    "BITMAP",
    "CARDINAL",
    "COLORMAP",
    "CURSOR",
    "CUT_BUFFER0",
    "CUT_BUFFER1",
    "CUT_BUFFER2",
    "CUT_BUFFER3",
    "CUT_BUFFER4",
    "CUT_BUFFER5",
    "CUT_BUFFER6",
    "CUT_BUFFER7",
    "DRAWABLE",
    "FONT",
    "INTEGER",
    "PIXMAP",
    "POINT",
    "RECTANGLE",
    "RESOURCE_MANAGER",
    "RGB_COLOR_MAP",
    "RGB_BEST_MAP",
    "RGB_BLUE_MAP",
    "RGB_DEFAULT_MAP",
    "RGB_GRAY_MAP",
    "RGB_GREEN_MAP",
    "RGB_RED_MAP",
    "STRING",
    "VISUALID",
    "WINDOW",
    "WM_COMMAND",
    "WM_HINTS",
    "WM_CLIENT_MACHINE",
    "WM_ICON_NAME",
    "WM_ICON_SIZE",
    "WM_NAME",
    "WM_NORMAL_HINTS",
    "WM_SIZE_HINTS",
    "WM_ZOOM_HINTS",
    "MIN_SPACE",
    "NORM_SPACE",
    "MAX_SPACE",
    "END_SPACE",
    "SUPERSCRIPT_X",
    "SUPERSCRIPT_Y",
    "SUBSCRIPT_X",
    "SUBSCRIPT_Y",
    "UNDERLINE_POSITION",
    "UNDERLINE_THICKNESS",
    "STRIKEOUT_ASCENT",
    "STRIKEOUT_DESCENT",
    "ITALIC_ANGLE",
    "X_HEIGHT",
    "QUAD_WIDTH",
    "WEIGHT",
    "POINT_SIZE",
    "RESOLUTION",
    "COPYRIGHT",
    "NOTICE",
    "FONT_NAME",
    "FAMILY_NAME",
    "FULL_NAME",
    "CAP_HEIGHT",
    "WM_CLASS",
    "WM_TRANSIENT_FOR",
];

/// Id of a predefined atom.
pub fn predefined_atom(name: &str) -> Option<AtomId> {
    PREDEFINED_ATOMS
        .iter()
        .position(|n| *n == name)
        .map(|idx| AtomId(idx as u32 + 1))
}

/// Name of a predefined atom.
pub fn predefined_name(id: AtomId) -> Option<&'static str> {
    let idx = usize::try_from(id.0).ok()?.checked_sub(1)?;
    PREDEFINED_ATOMS.get(idx).copied()
}

/// Raw property contents as the window system returns them.
///
/// A property that is not set on the window has `bit_width == 0` and no
/// bytes. Multi-byte items are in native byte order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PropertyData {
    pub bytes: Vec<u8>,
    pub type_id: AtomId,
    pub bit_width: u8,
}

impl PropertyData {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.bit_width == 0
    }
}

/// The window system collaborator.
pub trait WindowSystem: AtomResolver {
    /// Root window of the default screen.
    fn root_window(&self) -> WindowId;

    /// Fetch `attribute` from `window`, reading at most `max_length` bytes.
    ///
    /// Fails with [`Error::NoSuchWindow`] when the window does not exist and
    /// [`Error::PropertyFetchFailed`] on other protocol failures. A property
    /// not set on the window is not an error: see [`PropertyData::absent`].
    fn property(&self, window: WindowId, attribute: AtomId, max_length: usize)
        -> Result<PropertyData>;
}

/// Which window to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSelector {
    Id(WindowId),
    Root,
    /// The window the window manager reports as focused.
    Active,
}

/// Turn a selector into a concrete window id.
pub fn resolve_target<W: WindowSystem + ?Sized>(
    system: &W,
    selector: TargetSelector,
) -> Result<WindowId> {
    let window = match selector {
        TargetSelector::Id(window) => window,
        TargetSelector::Root => system.root_window(),
        TargetSelector::Active => active_window(system)?,
    };
    tracing::debug!(?selector, window = %window, "resolved target window");
    Ok(window)
}

fn active_window<W: WindowSystem + ?Sized>(system: &W) -> Result<WindowId> {
    let unavailable = || {
        Error::PropertyFetchFailed(format!(
            "window manager does not report {ACTIVE_WINDOW_PROPERTY}; pass a window id"
        ))
    };

    let atom = system.intern(ACTIVE_WINDOW_PROPERTY)?.ok_or_else(unavailable)?;
    let data = system.property(system.root_window(), atom, 4)?;
    if data.bit_width != 32 {
        return Err(unavailable());
    }

    let spec = FormatSpec::parse("32x")?;
    let fields = decode(&data.bytes, data.type_id, &spec, data.bit_width)?;
    match fields.first() {
        Some(field) if field.value != 0 => Ok(WindowId(field.value as u32)),
        _ => Err(unavailable()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_atoms_match_protocol_ids() {
        assert_eq!(predefined_atom("ATOM"), Some(AtomId(4)));
        assert_eq!(predefined_atom("CARDINAL"), Some(AtomId(6)));
        assert_eq!(predefined_atom("INTEGER"), Some(AtomId(19)));
        assert_eq!(predefined_atom("STRING"), Some(AtomId(31)));
        assert_eq!(predefined_atom("WINDOW"), Some(AtomId(33)));
        assert_eq!(predefined_atom("WM_TRANSIENT_FOR"), Some(AtomId(68)));
        assert_eq!(predefined_atom("_NET_WM_PID"), None);

        assert_eq!(predefined_name(AtomId(39)), Some("WM_NAME"));
        assert_eq!(predefined_name(AtomId(0)), None);
        assert_eq!(predefined_name(AtomId(69)), None);
    }

    #[test]
    fn absent_property() {
        let absent = PropertyData::absent();
        assert!(absent.is_absent());
        assert!(absent.bytes.is_empty());
        assert_eq!(absent.type_id, AtomId::NONE);
        let data = PropertyData {
            bytes: vec![1],
            type_id: AtomId(31),
            bit_width: 8,
        };
        assert!(!data.is_absent());
    }

    #[test]
    fn resolves_active_window() {
        let system = SnapshotSystem::from_json(
            r#"{
                "root": "0x100",
                "windows": {
                    "0x100": {
                        "_NET_ACTIVE_WINDOW": {"type": "WINDOW", "format": 32, "items": [4194305]}
                    },
                    "0x400001": {}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            resolve_target(&system, TargetSelector::Active).unwrap(),
            WindowId(0x400001)
        );
        assert_eq!(
            resolve_target(&system, TargetSelector::Root).unwrap(),
            WindowId(0x100)
        );
        assert_eq!(
            resolve_target(&system, TargetSelector::Id(WindowId(7))).unwrap(),
            WindowId(7)
        );
    }

    #[test]
    fn active_window_requires_window_manager_support() {
        let system = SnapshotSystem::from_json(r#"{"root": "0x100"}"#).unwrap();
        assert!(matches!(
            resolve_target(&system, TargetSelector::Active),
            Err(Error::PropertyFetchFailed(_))
        ));
    }
}
