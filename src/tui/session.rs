//! Terminal session of the demo.
//!
//! Entering the session switches to raw mode on the alternate screen with the
//! cursor hidden. Leaving it happens exactly once, from whichever path gets
//! there first: dropping the session, a panic, or a termination signal.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

/// How long the signal thread waits for the main loop before forcing an exit.
pub const SIGNAL_GRACE: Duration = Duration::from_secs(2);

pub trait TerminalOps: Send + Sync + 'static {
    fn enter(&self) -> io::Result<()>;
    fn leave(&self) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct CrosstermOps;

impl TerminalOps for CrosstermOps {
    fn enter(&self) -> io::Result<()> {
        use crossterm::terminal::{enable_raw_mode, EnterAlternateScreen};
        use crossterm::{cursor, execute};

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)
    }

    fn leave(&self) -> io::Result<()> {
        use crossterm::terminal::{disable_raw_mode, LeaveAlternateScreen};
        use crossterm::{cursor, execute};

        let raw = disable_raw_mode();
        let screen = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
        raw.and(screen)
    }
}

/// Why the demo loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The `q` binding.
    Quit,
    /// Ctrl+C read as a key while in raw mode.
    Interrupted,
    Signal(TerminationSignal),
}

impl SessionEnd {
    pub fn exit_code(self) -> i32 {
        match self {
            SessionEnd::Quit => 0,
            SessionEnd::Interrupted => TerminationSignal::SigInt.exit_code(),
            SessionEnd::Signal(signal) => signal.exit_code(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigInt,
    SigTerm,
}

impl TerminationSignal {
    #[cfg(unix)]
    pub fn from_raw(sig: i32) -> Option<Self> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};

        match sig {
            SIGINT => Some(TerminationSignal::SigInt),
            SIGTERM => Some(TerminationSignal::SigTerm),
            _ => None,
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::SigInt => 130,
            TerminationSignal::SigTerm => 143,
        }
    }
}

/// Cloneable handle that leaves the session at most once.
#[derive(Clone)]
pub struct SessionRestorer {
    left: Arc<AtomicBool>,
    ops: Arc<dyn TerminalOps>,
}

impl SessionRestorer {
    pub fn restore(&self) -> io::Result<()> {
        if self.left.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.leave()
    }

    pub fn is_restored(&self) -> bool {
        self.left.load(Ordering::SeqCst)
    }
}

pub struct TerminalSession {
    restorer: SessionRestorer,
}

impl TerminalSession {
    pub fn open() -> io::Result<Self> {
        Self::with_ops(Arc::new(CrosstermOps))
    }

    pub fn with_ops(ops: Arc<dyn TerminalOps>) -> io::Result<Self> {
        ops.enter()?;
        Ok(Self {
            restorer: SessionRestorer {
                left: Arc::new(AtomicBool::new(false)),
                ops,
            },
        })
    }

    pub fn restorer(&self) -> SessionRestorer {
        self.restorer.clone()
    }

    /// Leaves the alternate screen before the already-installed panic hook
    /// runs, so the panic report lands on the normal screen.
    pub fn restore_on_panic(&self) {
        let restorer = self.restorer();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restorer.restore();
            previous(info);
        }));
    }

    /// Forwards SIGINT/SIGTERM to the main loop over `tx`. If the loop has
    /// not left the session within [`SIGNAL_GRACE`], the signal thread
    /// restores the terminal and exits the process itself.
    #[cfg(unix)]
    pub fn forward_signals(
        &self,
        tx: Sender<TerminationSignal>,
    ) -> io::Result<std::thread::JoinHandle<()>> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let restorer = self.restorer();
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        Ok(std::thread::spawn(move || {
            for raw in signals.forever() {
                let Some(signal) = TerminationSignal::from_raw(raw) else {
                    continue;
                };
                if tx.send(signal).is_err() {
                    let _ = restorer.restore();
                    std::process::exit(signal.exit_code());
                }
                std::thread::sleep(SIGNAL_GRACE);
                if !restorer.is_restored() {
                    let _ = restorer.restore();
                    std::process::exit(signal.exit_code());
                }
            }
        }))
    }

    #[cfg(not(unix))]
    pub fn forward_signals(&self, tx: Sender<TerminationSignal>) -> io::Result<()> {
        drop(tx);
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.restorer.restore();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tui/session.rs"]
mod tests;
