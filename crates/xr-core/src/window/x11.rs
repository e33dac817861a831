//! Live X11 backend over `x11rb`.

use x11rb::connection::Connection;
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt as _};
use x11rb::protocol::ErrorKind;
use x11rb::rust_connection::RustConnection;

use super::{PropertyData, WindowSystem};
use crate::registry::AtomResolver;
use xr_common::{AtomId, Error, Result, WindowId};

/// Connection to an X server.
pub struct X11System {
    conn: RustConnection,
    root: WindowId,
}

impl X11System {
    /// Connect to `display`, or to `$DISPLAY` when `None`.
    pub fn connect(display: Option<&str>) -> Result<Self> {
        let (conn, screen) =
            x11rb::connect(display).map_err(|e| Error::Connection(e.to_string()))?;
        let root = conn
            .setup()
            .roots
            .get(screen)
            .map(|s| WindowId(s.root))
            .ok_or_else(|| Error::Connection(format!("screen {screen} does not exist")))?;
        let display_name = display.unwrap_or("$DISPLAY");
        tracing::debug!(display = display_name, screen, root = %root, "connected to X server");
        Ok(Self { conn, root })
    }
}

fn connection_error(e: ConnectionError) -> Error {
    Error::Connection(e.to_string())
}

fn fetch_error(e: ReplyError) -> Error {
    match e {
        ReplyError::ConnectionError(e) => connection_error(e),
        ReplyError::X11Error(e) => Error::PropertyFetchFailed(format!("{:?}", e.error_kind)),
    }
}

impl AtomResolver for X11System {
    fn intern(&self, name: &str) -> Result<Option<AtomId>> {
        let reply = self
            .conn
            .intern_atom(true, name.as_bytes())
            .map_err(connection_error)?
            .reply()
            .map_err(fetch_error)?;
        let atom = AtomId(reply.atom);
        Ok((!atom.is_none()).then_some(atom))
    }

    fn atom_name(&self, id: AtomId) -> Option<String> {
        let reply = self.conn.get_atom_name(id.0).ok()?.reply().ok()?;
        Some(String::from_utf8_lossy(&reply.name).into_owned())
    }
}

impl WindowSystem for X11System {
    fn root_window(&self) -> WindowId {
        self.root
    }

    fn property(
        &self,
        window: WindowId,
        attribute: AtomId,
        max_length: usize,
    ) -> Result<PropertyData> {
        let long_length = u32::try_from(max_length.div_ceil(4)).unwrap_or(u32::MAX);
        let reply = self
            .conn
            .get_property(false, window.0, attribute.0, AtomEnum::ANY, 0, long_length)
            .map_err(connection_error)?
            .reply()
            .map_err(|e| match e {
                ReplyError::X11Error(ref x) if x.error_kind == ErrorKind::Window => {
                    Error::NoSuchWindow { window }
                }
                other => fetch_error(other),
            })?;

        if reply.format == 0 {
            return Ok(PropertyData::absent());
        }
        let mut bytes = reply.value;
        bytes.truncate(max_length);
        Ok(PropertyData {
            bytes,
            type_id: AtomId(reply.type_),
            bit_width: reply.format,
        })
    }
}
