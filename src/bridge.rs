// I/O bridge: open, save, copy, paste and share on top of whichever backends
// this platform has. Every operation goes through the canvas session's single
// export (`to_blob`) and import (`get_image`) path.
//
// The canvas is shared with the paint loop, so it is only borrowed between
// awaits, never across one. Strokes drawn while an operation is suspended
// are fine: an export sees whatever was painted before it was called.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::canvas::CanvasSession;
use crate::error::Error;
use crate::platform::{
    Capabilities, Clipboard, ClipboardData, ClipboardItem, Downloads, FileOptions, FilePicker,
    Share, ShareData, Writable,
};
use crate::types::{DEFAULT_FILE_NAME, File, PNG_MIME};

/// Where `save` sends the image. Chosen once from the capability set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SavePath {
    NativePicker,
    DownloadLink,
}

/// The concrete backends a bridge is built from.
pub struct Backends<F, D, C, S> {
    pub picker: F,
    pub downloads: D,
    pub clipboard: C,
    pub share: S,
}

pub struct IoBridge<F, D, C, S> {
    canvas: Rc<RefCell<CanvasSession>>,
    caps: Capabilities,
    save_path: SavePath,
    picker: F,
    downloads: D,
    clipboard: C,
    share: S,
}

/// Picker/share dismissal is a normal outcome: `Ok(None)`.
fn unless_aborted<T>(r: Result<T, Error>) -> Result<Option<T>, Error> {
    match r {
        Ok(v) => Ok(Some(v)),
        Err(Error::Aborted) => {
            debug!("dismissed by user");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl<F, D, C, S> IoBridge<F, D, C, S>
where
    F: FilePicker,
    D: Downloads,
    C: Clipboard,
    S: Share,
{
    pub fn new(
        canvas: Rc<RefCell<CanvasSession>>,
        caps: Capabilities,
        backends: Backends<F, D, C, S>,
    ) -> Self {
        let save_path = if caps.save {
            SavePath::NativePicker
        } else {
            SavePath::DownloadLink
        };
        Self {
            canvas,
            caps,
            save_path,
            picker: backends.picker,
            downloads: backends.downloads,
            clipboard: backends.clipboard,
            share: backends.share,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn save_path(&self) -> SavePath {
        self.save_path
    }

    /// Pick a PNG and paint it at the origin.
    pub async fn open(&self) -> Result<(), Error> {
        let Some(file) = unless_aborted(self.picker.open_file(&FileOptions::PNG).await)? else {
            return Ok(());
        };
        let image = CanvasSession::get_image(file.blob).await?;
        self.canvas.borrow_mut().draw_image(&image);
        info!(name = %file.name, "opened");
        Ok(())
    }

    /// Save the surface through the save picker, or through a download link
    /// when there is no picker.
    pub async fn save(&self) -> Result<(), Error> {
        let export = self.canvas.borrow().to_blob();
        let blob = export.await?;

        match self.save_path {
            SavePath::NativePicker => {
                let Some(mut writer) =
                    unless_aborted(self.picker.save_file(&FileOptions::PNG).await)?
                else {
                    return Ok(());
                };
                writer.write(&blob).await?;
                writer.close().await?;
                info!(bytes = blob.size(), "saved");
            }
            SavePath::DownloadLink => {
                let url = self.downloads.create_object_url(&blob);
                let clicked = self.downloads.click(&url, "");
                self.downloads.revoke_object_url(&url);
                clicked?;
                info!(bytes = blob.size(), "downloaded");
            }
        }
        Ok(())
    }

    /// Put the surface on the clipboard as PNG. The export is handed over
    /// still pending; the clipboard resolves it.
    pub async fn copy(&self) -> Result<(), Error> {
        let export = self.canvas.borrow().to_blob();
        let item = ClipboardItem::new().with(PNG_MIME, ClipboardData::Pending(Box::pin(export)));
        self.clipboard.write(vec![item]).await?;
        info!("copied");
        Ok(())
    }

    /// Paint every PNG found on the clipboard. Other types are skipped.
    /// Returns how many images were drawn.
    pub async fn paste(&self) -> Result<usize, Error> {
        let items = self.clipboard.read().await?;
        let mut drawn = 0;
        for mut item in items {
            for ty in item.types() {
                if ty != PNG_MIME {
                    debug!(%ty, "skipping clipboard type");
                    continue;
                }
                let blob = item.get_type(&ty).await?;
                let image = CanvasSession::get_image(blob).await?;
                self.canvas.borrow_mut().draw_image(&image);
                drawn += 1;
            }
        }
        info!(drawn, "pasted");
        Ok(drawn)
    }

    /// Offer the surface to the system share target, if it will take it.
    pub async fn share(&self) -> Result<(), Error> {
        if !self.caps.share {
            debug!("share unavailable");
            return Ok(());
        }
        let export = self.canvas.borrow().to_blob();
        let file = File::new(DEFAULT_FILE_NAME, export.await?);
        let data = ShareData { files: vec![file] };
        if !self.share.can_share(&data) {
            debug!("payload not shareable");
            return Ok(());
        }
        if unless_aborted(self.share.share(data).await)?.is_some() {
            info!("shared");
        }
        Ok(())
    }
}
