use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use uistack::kernel::services::adapters::{get_config_path, load_config_or_default};
use uistack::kernel::services::ports::UiConfig;
use uistack::tui::crossterm::{into_key_code, is_interrupt};
use uistack::tui::demo::DemoScene;
use uistack::tui::render::render;
use uistack::tui::session::{SessionEnd, TerminalSession, TerminationSignal};

mod logging;

const FRAME: Duration = Duration::from_millis(16);
/// Cap on the frame delta fed to the clocks.
const MAX_DT: f32 = 0.25;

fn load_config() -> UiConfig {
    match std::env::args().nth(1) {
        Some(path) => load_config_or_default(Path::new(&path)),
        None => get_config_path()
            .map(|path| load_config_or_default(&path))
            .unwrap_or_default(),
    }
}

fn run(scene: &mut DemoScene, session: &TerminalSession) -> io::Result<SessionEnd> {
    let (signal_tx, signal_rx) = mpsc::channel::<TerminationSignal>();
    let _signals = session.forward_signals(signal_tx)?;

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut last = Instant::now();

    loop {
        if let Ok(signal) = signal_rx.try_recv() {
            tracing::info!(?signal, "termination signal");
            return Ok(SessionEnd::Signal(signal));
        }

        terminal.draw(|frame| render(scene, frame))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if is_interrupt(&key) {
                    return Ok(SessionEnd::Interrupted);
                }
                if let Some(code) = into_key_code(key) {
                    scene.handle_key(code);
                }
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_DT);
        last = now;
        scene.tick(dt);

        if scene.should_quit() {
            return Ok(SessionEnd::Quit);
        }
    }
}

fn main() -> io::Result<()> {
    let mut logging = logging::init();
    let log_rx = logging.as_mut().and_then(|guard| guard.take_log_rx());

    let config = load_config();
    tracing::info!(?config, "starting demo");
    let mut scene =
        DemoScene::new(config, log_rx).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let session = TerminalSession::open()?;
    session.restore_on_panic();
    let end = run(&mut scene, &session);
    drop(session);

    let end = end?;
    tracing::info!(?end, "demo finished");
    if let Some(guard) = logging.as_ref() {
        eprintln!("logs: {}", guard.log_dir().display());
    }
    let code = end.exit_code();
    if code != 0 {
        drop(logging);
        std::process::exit(code);
    }
    Ok(())
}
