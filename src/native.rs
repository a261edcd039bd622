// Desktop implementations of the platform contracts.
// Visual: O/S open the OS file dialogs, C/V go through the real system
// clipboard, H hands the PNG to whatever app the OS opens images with.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use rfd::{AsyncFileDialog, FileHandle};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::platform::{
    Clipboard, ClipboardData, ClipboardItem, Downloads, FileOptions, FilePicker, ObjectUrl, Share,
    ShareData, Writable,
};
use crate::types::{Blob, DEFAULT_FILE_NAME, File, PNG_MIME};

const TEXT_MIME: &str = "text/plain";

/* ---------- File pickers (rfd) ---------- */

pub struct NativePicker;

fn dialog(options: &FileOptions) -> AsyncFileDialog {
    // rfd wants extensions without the leading dot.
    let exts: Vec<&str> = options.extensions.iter().map(|e| e.trim_start_matches('.')).collect();
    AsyncFileDialog::new().add_filter(options.description, &exts)
}

impl FilePicker for NativePicker {
    type Writer = NativeWritable;

    async fn open_file(&self, options: &FileOptions) -> Result<File, Error> {
        let handle = dialog(options).pick_file().await.ok_or(Error::Aborted)?;
        let bytes = handle.read().await;
        debug!(path = ?handle.path(), bytes = bytes.len(), "picked file");
        Ok(File::new(handle.file_name(), Blob::new(options.mime, bytes)))
    }

    async fn save_file(&self, options: &FileOptions) -> Result<NativeWritable, Error> {
        let handle = dialog(options)
            .set_file_name(DEFAULT_FILE_NAME)
            .save_file()
            .await
            .ok_or(Error::Aborted)?;
        Ok(NativeWritable { handle, buf: Vec::new() })
    }
}

/// Collects writes and commits them to the chosen file on `close`.
pub struct NativeWritable {
    handle: FileHandle,
    buf: Vec<u8>,
}

impl Writable for NativeWritable {
    async fn write(&mut self, blob: &Blob) -> Result<(), Error> {
        self.buf.extend_from_slice(blob.bytes());
        Ok(())
    }

    async fn close(self) -> Result<(), Error> {
        self.handle
            .write(&self.buf)
            .await
            .map_err(|e| Error::FileAccess(format!("{}: {e}", self.handle.path().display())))?;
        info!(path = ?self.handle.path(), "wrote file");
        Ok(())
    }
}

/* ---------- Download fallback ---------- */

/// Object URLs backed by an in-memory table; "clicking" one drops the blob
/// into the download directory.
pub struct DownloadDir {
    dir: PathBuf,
    urls: RefCell<HashMap<ObjectUrl, Blob>>,
    next_id: Cell<u64>,
}

impl DownloadDir {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, urls: RefCell::new(HashMap::new()), next_id: Cell::new(0) }
    }

    /// The user's download folder, or the working directory if there is none.
    pub fn from_env() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}

/// `name`, or `stem (n).ext` for the first n that is not taken yet.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) => (s, format!(".{e}")),
        None => (name, String::new()),
    };
    (1..)
        .map(|n| dir.join(format!("{stem} ({n}){ext}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

impl Downloads for DownloadDir {
    fn create_object_url(&self, blob: &Blob) -> ObjectUrl {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let url = ObjectUrl(format!("blob:pixelpad/{id}"));
        self.urls.borrow_mut().insert(url.clone(), blob.clone());
        url
    }

    fn click(&self, url: &ObjectUrl, download: &str) -> Result<(), Error> {
        let urls = self.urls.borrow();
        let blob = urls
            .get(url)
            .ok_or_else(|| Error::FileAccess(format!("{} was revoked", url.0)))?;
        let name = if download.is_empty() { DEFAULT_FILE_NAME } else { download };
        let path = unique_path(&self.dir, name);
        std::fs::write(&path, blob.bytes())
            .map_err(|e| Error::FileAccess(format!("{}: {e}", path.display())))?;
        info!(?path, "downloaded");
        Ok(())
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        self.urls.borrow_mut().remove(url);
    }
}

/* ---------- System clipboard (arboard) ---------- */

pub struct SystemClipboard {
    inner: Option<RefCell<arboard::Clipboard>>, // None when no clipboard could be reached
}

impl SystemClipboard {
    pub fn connect() -> Self {
        match arboard::Clipboard::new() {
            Ok(c) => Self { inner: Some(RefCell::new(c)) },
            Err(e) => {
                warn!("system clipboard unavailable: {e}");
                Self { inner: None }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    fn handle(&self) -> Result<&RefCell<arboard::Clipboard>, Error> {
        self.inner.as_ref().ok_or_else(|| Error::Clipboard("no system clipboard".into()))
    }
}

fn clip_err(e: arboard::Error) -> Error {
    Error::Clipboard(e.to_string())
}

impl Clipboard for SystemClipboard {
    async fn write(&self, items: Vec<ClipboardItem>) -> Result<(), Error> {
        let clip = self.handle()?;
        for mut item in items {
            if !item.types().iter().any(|t| t == PNG_MIME) {
                debug!(types = ?item.types(), "no PNG in clipboard item, skipping");
                continue;
            }
            // Resolve the (possibly still encoding) PNG before touching the clipboard.
            let blob = item.get_type(PNG_MIME).await?;
            let rgba = image::load_from_memory(blob.bytes())?.to_rgba8();
            let data = arboard::ImageData {
                width: rgba.width() as usize,
                height: rgba.height() as usize,
                bytes: Cow::Owned(rgba.into_raw()),
            };
            clip.borrow_mut().set_image(data).map_err(clip_err)?;
        }
        Ok(())
    }

    async fn read(&self) -> Result<Vec<ClipboardItem>, Error> {
        let clip = self.handle()?;
        let mut item = ClipboardItem::new();
        let mut any = false;

        match clip.borrow_mut().get_image() {
            Ok(img) => {
                let (w, h) = (img.width as u32, img.height as u32);
                let rgba = RgbaImage::from_raw(w, h, img.bytes.into_owned()).ok_or_else(|| {
                    Error::Clipboard("clipboard image has the wrong size".into())
                })?;
                let mut png = Vec::new();
                rgba.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
                item = item.with(PNG_MIME, ClipboardData::Ready(Blob::new(PNG_MIME, png)));
                any = true;
            }
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => return Err(clip_err(e)),
        }
        match clip.borrow_mut().get_text() {
            Ok(text) => {
                let blob = Blob::new(TEXT_MIME, text.into_bytes());
                item = item.with(TEXT_MIME, ClipboardData::Ready(blob));
                any = true;
            }
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => return Err(clip_err(e)),
        }

        Ok(if any { vec![item] } else { Vec::new() })
    }
}

/* ---------- Share (open) ---------- */

/// "Share" on the desktop: drop the files in a temp folder and let the OS
/// open them with the default image app.
pub struct SystemShare {
    dir: PathBuf,
}

impl SystemShare {
    pub fn new() -> Self {
        Self { dir: std::env::temp_dir().join("pixelpad-share") }
    }
}

impl Share for SystemShare {
    fn can_share(&self, data: &ShareData) -> bool {
        !data.files.is_empty()
            && data
                .files
                .iter()
                .all(|f| f.blob.mime() == PNG_MIME && f.blob.size() > 0)
    }

    async fn share(&self, data: ShareData) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Share(format!("{}: {e}", self.dir.display())))?;
        for file in data.files {
            let path = self.dir.join(&file.name);
            std::fs::write(&path, file.blob.bytes())
                .map_err(|e| Error::Share(format!("{}: {e}", path.display())))?;
            open::that(&path).map_err(|e| Error::Share(format!("{}: {e}", path.display())))?;
            info!(?path, "shared");
        }
        Ok(())
    }
}
