//! Tracing setup for the demo binary.
//!
//! Events go to two sinks with separate filters. The daily log file follows
//! `RUST_LOG` (default `uistack=info`). The log pane under the stage shows
//! the kernel's lifecycle events at debug level so window, popup, toast and
//! mask transitions can be watched live; `UISTACK_PANE_LOG` replaces its
//! target list (same `target=level` syntax).

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE: &str = "uistack.log";
const FILE_FILTER: &str = "uistack=info";
const PANE_ENV: &str = "UISTACK_PANE_LOG";

pub struct LoggingGuard {
    _file: WorkerGuard,
    log_dir: PathBuf,
    pane_rx: Option<Receiver<String>>,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn take_log_rx(&mut self) -> Option<Receiver<String>> {
        self.pane_rx.take()
    }
}

/// Pane targets: kernel lifecycle at debug, everything else from this crate
/// at info. A parseable `spec` replaces the defaults.
fn pane_targets(spec: Option<&str>) -> Targets {
    if let Some(targets) = spec.and_then(|s| s.parse::<Targets>().ok()) {
        return targets;
    }
    Targets::new()
        .with_target("uistack", Level::INFO)
        .with_target("uistack::kernel", Level::DEBUG)
}

#[derive(Clone)]
struct PaneMakeWriter {
    tx: Sender<String>,
}

impl<'a> MakeWriter<'a> for PaneMakeWriter {
    type Writer = PaneWriter;

    fn make_writer(&'a self) -> Self::Writer {
        PaneWriter {
            buf: Vec::with_capacity(128),
            tx: self.tx.clone(),
        }
    }
}

/// Collects one formatted event; its non-empty lines reach the pane on drop.
struct PaneWriter {
    buf: Vec<u8>,
    tx: Sender<String>,
}

impl Write for PaneWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PaneWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            let _ = self.tx.send(line.to_string());
        }
    }
}

fn log_dir() -> Option<PathBuf> {
    uistack::kernel::services::adapters::ensure_log_dir()
        .or_else(|_| -> io::Result<PathBuf> {
            let dir = std::env::temp_dir().join("uistack").join("logs");
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        })
        .ok()
}

pub fn init() -> Option<LoggingGuard> {
    let log_dir = log_dir()?;
    let (file, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE));
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(FILE_FILTER));

    let (pane_tx, pane_rx) = mpsc::channel::<String>();
    let pane_spec = std::env::var(PANE_ENV).ok();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(file_filter);
    let pane_layer = tracing_subscriber::fmt::layer()
        .with_writer(PaneMakeWriter { tx: pane_tx })
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .compact()
        .with_filter(pane_targets(pane_spec.as_deref()));

    if tracing_subscriber::registry()
        .with(file_layer)
        .with(pane_layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _file: file_guard,
        log_dir,
        pane_rx: Some(pane_rx),
    })
}

#[cfg(test)]
#[path = "../tests/unit/logging.rs"]
mod tests;
