// What the platform can do, and the narrow contracts we talk to it through.
// The bridge only ever sees these traits; `native.rs` provides the desktop
// implementations and the tests provide in-memory fakes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::types::{Blob, File, PNG_MIME};

/// Which I/O backends exist. Read once at startup, never re-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub open: bool,
    pub save: bool,  // native save picker (otherwise: download fallback)
    pub copy: bool,  // clipboard write
    pub paste: bool, // clipboard read
    pub share: bool,
}

impl Capabilities {
    #[cfg(test)]
    pub const ALL: Capabilities = Capabilities {
        open: true,
        save: true,
        copy: true,
        paste: true,
        share: true,
    };

    /// Detect the desktop backends once. `clipboard_ok` is whether a system clipboard
    /// connection could be made; anything listed in `config.disabled` is
    /// reported absent regardless.
    pub fn detect(config: &Config, clipboard_ok: bool) -> Self {
        let on = |name: &str| !config.disabled.iter().any(|d| d.eq_ignore_ascii_case(name));
        let caps = Capabilities {
            open: on("open"),
            save: on("save"),
            copy: clipboard_ok && on("copy"),
            paste: clipboard_ok && on("paste"),
            share: on("share"),
        };
        info!(?caps, "platform capabilities");
        caps
    }
}

/// Filter shown in the open/save pickers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileOptions {
    pub description: &'static str,
    pub mime: &'static str,
    pub extensions: &'static [&'static str],
}

impl FileOptions {
    pub const PNG: FileOptions = FileOptions {
        description: "PNG files",
        mime: PNG_MIME,
        extensions: &[".png"],
    };
}

/// Native open/save file pickers. Dismissing a picker is `Err(Error::Aborted)`.
pub trait FilePicker {
    type Writer: Writable;

    async fn open_file(&self, options: &FileOptions) -> Result<File, Error>;
    async fn save_file(&self, options: &FileOptions) -> Result<Self::Writer, Error>;
}

/// Destination chosen in the save picker. Nothing is committed before `close`.
pub trait Writable {
    async fn write(&mut self, blob: &Blob) -> Result<(), Error>;
    async fn close(self) -> Result<(), Error>;
}

/// Temporary reference to a blob, valid until revoked.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectUrl(pub String);

/// The download-link fallback used when there is no save picker.
pub trait Downloads {
    fn create_object_url(&self, blob: &Blob) -> ObjectUrl;
    /// Activate a link to `url`. An empty `download` name means "let the
    /// platform pick one".
    fn click(&self, url: &ObjectUrl, download: &str) -> Result<(), Error>;
    fn revoke_object_url(&self, url: &ObjectUrl);
}

pub type PendingBlob = Pin<Box<dyn Future<Output = Result<Blob, Error>>>>;

/// One representation stored under a MIME type: either bytes we already
/// have, or an export that has not finished yet.
pub enum ClipboardData {
    Ready(Blob),
    Pending(PendingBlob),
}

impl fmt::Debug for ClipboardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardData::Ready(b) => write!(f, "Ready({} bytes of {})", b.size(), b.mime()),
            ClipboardData::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// A clipboard entry: the same content offered under one or more types.
#[derive(Debug, Default)]
pub struct ClipboardItem {
    entries: Vec<(String, ClipboardData)>,
}

impl ClipboardItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mime: impl Into<String>, data: ClipboardData) -> Self {
        self.entries.push((mime.into(), data));
        self
    }

    /// Declared types, in insertion order.
    pub fn types(&self) -> Vec<String> {
        self.entries.iter().map(|(t, _)| t.clone()).collect()
    }

    /// Take out the payload for `mime`, waiting for it if it is still pending.
    pub async fn get_type(&mut self, mime: &str) -> Result<Blob, Error> {
        let pos = self
            .entries
            .iter()
            .position(|(t, _)| t == mime)
            .ok_or_else(|| Error::Clipboard(format!("type {mime} not on clipboard item")))?;
        let (_, data) = self.entries.remove(pos);
        match data {
            ClipboardData::Ready(blob) => Ok(blob),
            ClipboardData::Pending(fut) => fut.await,
        }
    }
}

/// System clipboard. Permission problems surface as `Error::Clipboard`.
pub trait Clipboard {
    async fn write(&self, items: Vec<ClipboardItem>) -> Result<(), Error>;
    async fn read(&self) -> Result<Vec<ClipboardItem>, Error>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareData {
    pub files: Vec<File>,
}

/// System share. Dismissing the share sheet is `Err(Error::Aborted)`.
pub trait Share {
    fn can_share(&self, data: &ShareData) -> bool;
    async fn share(&self, data: ShareData) -> Result<(), Error>;
}
