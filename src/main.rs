// What you SEE now:
// • A white canvas. Hold Left Mouse and drag to paint 2x2 black dabs.
// • 1..9 pick a palette color (next strokes only).
// • O open a PNG, S save (picker, or the Downloads folder without one),
//   C copy, V paste, H share. These run in the background: you can keep
//   painting while a dialog is up.
// • ESC quits.

mod bridge;
mod canvas;
mod color;
mod config;
mod draw;
mod error;
mod native;
mod platform;
mod raster;
mod surface;
mod types;

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use futures_lite::future;
use tracing::{error, info, warn};

use bridge::{Backends, IoBridge};
use canvas::CanvasSession;
use color::parse_color;
use config::Config;
use draw::{Command, Drawer, InputEvent};
use error::Error;
use native::{DownloadDir, NativePicker, SystemClipboard, SystemShare};
use platform::Capabilities;

type Bridge = IoBridge<NativePicker, DownloadDir, SystemClipboard, SystemShare>;

/// An I/O operation in flight, labelled for the log.
struct Task {
    name: &'static str,
    fut: Pin<Box<dyn Future<Output = Result<(), Error>>>>,
}

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,pixelpad=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .init();
}

/// Start the operation behind `cmd`, unless this platform lacks it.
fn spawn(bridge: &Rc<Bridge>, cmd: Command) -> Option<Task> {
    let caps = bridge.capabilities();
    let b = Rc::clone(bridge);
    let (name, fut): (&'static str, Pin<Box<dyn Future<Output = Result<(), Error>>>>) = match cmd {
        Command::Open if caps.open => ("open", Box::pin(async move { b.open().await })),
        // Without a save picker, save still works through the download folder.
        Command::Save => ("save", Box::pin(async move { b.save().await })),
        Command::Copy if caps.copy => ("copy", Box::pin(async move { b.copy().await })),
        Command::Paste if caps.paste => (
            "paste",
            Box::pin(async move { b.paste().await.map(|_| ()) }),
        ),
        Command::Share if caps.share => ("share", Box::pin(async move { b.share().await })),
        Command::Color(_) => return None,
        other => {
            warn!(?other, "not supported on this platform");
            return None;
        }
    };
    Some(Task { name, fut })
}

fn main() -> Result<(), Error> {
    setup_logging();

    /* --- Settings + platform detection (once, never again) --- */
    let config = Config::load();
    let clipboard = SystemClipboard::connect();
    let caps = Capabilities::detect(&config, clipboard.is_available());

    /* --- Surface: painted background, then the pen color ---
       Visual: window opens on a blank canvas. */
    let background = parse_color(&config.background)?;
    let pen = parse_color(&config.color)?;
    let session = Rc::new(RefCell::new(CanvasSession::new(
        config.width,
        config.height,
        background,
        pen,
        config.brush_size,
    )));
    let mut drawer = Drawer::new(&config.title, config.width, config.height)?;

    let backends = Backends {
        picker: NativePicker,
        downloads: DownloadDir::from_env(),
        clipboard,
        share: SystemShare::new(),
    };
    let bridge = Rc::new(IoBridge::new(Rc::clone(&session), caps, backends));
    info!(save = ?bridge.save_path(), "ready");

    let mut tasks: Vec<Task> = Vec::new();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Input. Strokes are applied right here, synchronously. */
        for event in drawer.poll_events() {
            match event {
                InputEvent::PointerDown(p) => session.borrow_mut().pointer_down(p),
                InputEvent::PointerMove(p) => {
                    session.borrow_mut().pointer_move(p);
                }
                InputEvent::PointerUp => session.borrow_mut().pointer_up(),
                InputEvent::Command(Command::Color(i)) => match config.palette.get(i) {
                    Some(c) => {
                        session.borrow_mut().set_color(c);
                    }
                    None => warn!(swatch = i + 1, "no palette entry"),
                },
                InputEvent::Command(cmd) => tasks.extend(spawn(&bridge, cmd)),
            }
        }

        /* 2) Give every pending I/O operation one poll. Failures are logged
              and dropped; the canvas stays as it was. */
        tasks.retain_mut(|task| match future::block_on(future::poll_once(&mut task.fut)) {
            None => true,
            Some(Ok(())) => false,
            Some(Err(e)) => {
                error!(op = task.name, "{e}");
                false
            }
        });

        /* 3) Present (this is when the on-screen image updates). */
        drawer.present(session.borrow().surface().frame())?;
    }

    Ok(())
}
