//! Demo scene driven by the terminal host.
//!
//! Every capability is one of the in-memory adapters. Loads resolve after a
//! simulated latency, and the demo views write what they are told into a
//! shared [`Board`] that the renderer reads back.

use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};

use rustc_hash::FxHashMap;
use serde_json::{json, Value};

use crate::core::KeyCode;
use crate::kernel::services::adapters::{ManualTimer, PendingLoad, QueuedLoader, RecordingHierarchy};
use crate::kernel::services::bus::CloseAnimDone;
use crate::kernel::services::ports::{
    Behaviors, FocusHandler, HandlerResult, InstanceId, KeyHandler, LoadKind, LoadingMask,
    ParameterHandler, PopupCloseAnim, ToastView, UiConfig, ViewInstance,
};
use crate::kernel::{UiError, UiManager, UiParts};

const LOG_BUFFER_CAP: usize = 200;
const MAX_LOG_DRAIN_PER_TICK: usize = 256;
const DEFAULT_LATENCY: f32 = 0.6;
const MAX_LATENCY: f32 = 5.0;
const CLOSE_ANIM_SECS: f32 = 0.4;
const MASK_FADE_SECS: f32 = 0.3;
const TOAST_OUT_SECS: f32 = 0.25;
const TOAST_SECS: f32 = 2.5;
const MANUAL_MASK_KEY: &str = "manual";

pub const WINDOWS: [&str; 3] = ["lobby", "map", "shop"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Window,
    Popup,
}

#[derive(Debug, Clone)]
pub struct Card {
    pub name: String,
    pub role: Role,
    pub overlay: bool,
    pub param: Option<String>,
    pub focused: bool,
    pub closing: bool,
    pub last_key: Option<KeyCode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Hidden,
    Shown,
    Leaving,
}

#[derive(Debug, Clone, Default)]
pub struct MaskCard {
    pub style: String,
    pub phase: Phase,
}

#[derive(Debug, Clone, Default)]
pub struct ToastCard {
    pub content: String,
    pub phase: Phase,
}

/// Requests the demo views make while handling input. The scene applies them
/// once the manager call that triggered them has returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    ClosePopup(InstanceId),
    Toast(String),
}

#[derive(Debug)]
struct RunningAnim {
    remaining: f32,
    done: CloseAnimDone,
}

#[derive(Debug, Default)]
pub struct BoardState {
    pub cards: FxHashMap<InstanceId, Card>,
    pub mask: MaskCard,
    pub toasts: Vec<ToastCard>,
    intents: Vec<Intent>,
    anims: Vec<RunningAnim>,
}

pub type Board = Rc<RefCell<BoardState>>;

#[derive(Clone)]
struct DemoView {
    id: InstanceId,
    board: Board,
}

impl DemoView {
    fn update(&self, f: impl FnOnce(&mut Card)) {
        if let Some(card) = self.board.borrow_mut().cards.get_mut(&self.id) {
            f(card);
        }
    }
}

impl ParameterHandler for DemoView {
    fn set_parameter(&mut self, param: Option<&Value>) -> HandlerResult {
        let shown = param.map(Value::to_string);
        self.update(|card| card.param = shown);
        Ok(())
    }
}

impl FocusHandler for DemoView {
    fn on_focus(&mut self) -> HandlerResult {
        self.update(|card| card.focused = true);
        Ok(())
    }

    fn on_lose_focus(&mut self) -> HandlerResult {
        self.update(|card| card.focused = false);
        Ok(())
    }

    fn on_close(&mut self) -> HandlerResult {
        self.update(|card| {
            card.focused = false;
            card.closing = true;
        });
        Ok(())
    }
}

impl KeyHandler for DemoView {
    fn on_key(&mut self, key: KeyCode) -> HandlerResult {
        let mut board = self.board.borrow_mut();
        let Some(card) = board.cards.get_mut(&self.id) else {
            return Err(format!("no card for {:?}", self.id).into());
        };
        card.last_key = Some(key);
        let intent = match (card.role, key) {
            (Role::Popup, key) if key.is_cancel() => Some(Intent::ClosePopup(self.id)),
            (Role::Popup, KeyCode::Enter) if card.name == "confirm" => {
                Some(Intent::ClosePopup(self.id))
            }
            (Role::Window, KeyCode::Enter) => {
                Some(Intent::Toast(format!("hello from {}", card.name)))
            }
            _ => None,
        };
        board.intents.extend(intent);
        Ok(())
    }
}

struct DemoCloseAnim {
    id: InstanceId,
    board: Board,
}

impl PopupCloseAnim for DemoCloseAnim {
    fn execute_close(&mut self, done: CloseAnimDone) -> HandlerResult {
        let mut board = self.board.borrow_mut();
        if let Some(card) = board.cards.get_mut(&self.id) {
            card.closing = true;
        }
        board.anims.push(RunningAnim {
            remaining: CLOSE_ANIM_SECS,
            done,
        });
        Ok(())
    }
}

struct DemoMask {
    style: &'static str,
    board: Board,
}

impl DemoMask {
    fn set(&self, phase: Phase) {
        let mut board = self.board.borrow_mut();
        board.mask.style.clear();
        board.mask.style.push_str(self.style);
        board.mask.phase = phase;
    }
}

impl LoadingMask for DemoMask {
    fn show(&mut self) {
        self.set(Phase::Shown);
    }

    fn close(&mut self) -> f32 {
        self.set(Phase::Leaving);
        MASK_FADE_SECS
    }

    fn hide(&mut self) {
        self.set(Phase::Hidden);
    }
}

struct DemoToast {
    slot: usize,
    board: Board,
}

impl DemoToast {
    fn set(&self, phase: Phase, content: Option<&str>) {
        let mut board = self.board.borrow_mut();
        if let Some(card) = board.toasts.get_mut(self.slot) {
            card.phase = phase;
            if let Some(content) = content {
                card.content = content.to_string();
            }
        }
    }
}

impl ToastView for DemoToast {
    fn show(&mut self, content: &str) {
        self.set(Phase::Shown, Some(content));
    }

    fn play_out(&mut self) -> f32 {
        self.set(Phase::Leaving, None);
        TOAST_OUT_SECS
    }

    fn hide(&mut self) {
        self.set(Phase::Hidden, None);
    }
}

struct InFlight {
    load: PendingLoad,
    remaining: f32,
}

pub struct DemoScene {
    ui: UiManager,
    loader: QueuedLoader,
    scene: RecordingHierarchy,
    scaled: ManualTimer,
    realtime: ManualTimer,
    board: Board,
    in_flight: Vec<InFlight>,
    latency: f32,
    paused: bool,
    manual_mask: bool,
    visits: u64,
    toasts_sent: u64,
    logs: VecDeque<String>,
    log_rx: Option<Receiver<String>>,
    quit: bool,
}

impl DemoScene {
    pub fn new(config: UiConfig, log_rx: Option<Receiver<String>>) -> Result<Self, UiError> {
        let board: Board = Rc::new(RefCell::new(BoardState::default()));
        let loader = QueuedLoader::new();
        let scene = RecordingHierarchy::new();
        let scaled = ManualTimer::new();
        let realtime = ManualTimer::new();

        let toast_board = board.clone();
        let toast_factory = move || -> Box<dyn ToastView> {
            let slot = {
                let mut state = toast_board.borrow_mut();
                state.toasts.push(ToastCard::default());
                state.toasts.len() - 1
            };
            Box::new(DemoToast {
                slot,
                board: toast_board.clone(),
            })
        };

        let mut ui = UiManager::new(UiParts {
            hierarchy: Box::new(scene.clone()),
            timer: Box::new(scaled.clone()),
            realtime_timer: Box::new(realtime.clone()),
            default_mask: Box::new(DemoMask {
                style: "default",
                board: board.clone(),
            }),
            toast_factory: Box::new(toast_factory),
            config,
        });
        ui.init(Box::new(loader.clone()))?;

        Ok(Self {
            ui,
            loader,
            scene,
            scaled,
            realtime,
            board,
            in_flight: Vec::new(),
            latency: DEFAULT_LATENCY,
            paused: false,
            manual_mask: false,
            visits: 0,
            toasts_sent: 0,
            logs: VecDeque::new(),
            log_rx,
            quit: false,
        })
    }

    pub fn ui(&self) -> &UiManager {
        &self.ui
    }

    pub fn scene(&self) -> &RecordingHierarchy {
        &self.scene
    }

    pub fn board(&self) -> Ref<'_, BoardState> {
        self.board.borrow()
    }

    pub fn logs(&self) -> &VecDeque<String> {
        &self.logs
    }

    pub fn latency(&self) -> f32 {
        self.latency
    }

    pub fn holds_manual_mask(&self) -> bool {
        self.manual_mask
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Loads still waiting on the simulated latency, with seconds left.
    pub fn in_flight(&self) -> Vec<(LoadKind, String, f32)> {
        let mut out: Vec<_> = self
            .in_flight
            .iter()
            .map(|f| (f.load.kind, f.load.name.clone(), f.remaining.max(0.0)))
            .collect();
        out.extend(
            self.loader
                .pending()
                .into_iter()
                .map(|(kind, name)| (kind, name, self.latency)),
        );
        out
    }

    /// Host shortcuts first; everything else goes through the focus chain.
    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char(ch @ '1'..='3') => {
                let idx = ch as usize - '1' as usize;
                self.open_window(WINDOWS[idx]);
            }
            KeyCode::Char('w') => self.ui.close_window(),
            KeyCode::Char('i') => self.ui.show_popup("inventory", None, None),
            KeyCode::Char('o') => self.ui.show_popup("tooltip", None, None),
            KeyCode::Char('c') => self.open_confirm(),
            KeyCode::Char('x') => self.ui.show_popup("missing", None, None),
            KeyCode::Char('t') => {
                self.toasts_sent += 1;
                let content = format!("toast #{}", self.toasts_sent);
                self.ui.show_toast(&content, TOAST_SECS);
            }
            KeyCode::Char('d') => {
                self.ui.dismiss_toast();
            }
            KeyCode::Char('z') => {
                if let Some(top) = self.ui.popup_names().pop() {
                    self.ui.close_popup(&top);
                }
            }
            KeyCode::Char('m') => {
                self.manual_mask = !self.manual_mask;
                if self.manual_mask {
                    self.ui.show_loading_mask(MANUAL_MASK_KEY);
                } else {
                    self.ui.hide_loading_mask(MANUAL_MASK_KEY);
                }
            }
            KeyCode::Char('s') => self.ui.set_loading_mask("spinner"),
            KeyCode::Char('r') => {
                if !self.ui.reset_loading_mask() {
                    tracing::info!("loading mask reset refused");
                }
            }
            KeyCode::Char(' ') => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "game time toggled");
            }
            KeyCode::Char('+') => self.latency = (self.latency + 0.2).min(MAX_LATENCY),
            KeyCode::Char('-') => self.latency = (self.latency - 0.2).max(0.0),
            key => {
                if !self.ui.handle_key(key) {
                    tracing::debug!(?key, "key not consumed");
                }
                self.apply_intents();
            }
        }
    }

    /// Advances both clocks, the simulated loads and the close animations by
    /// `dt` seconds, then delivers everything that completed.
    pub fn tick(&mut self, dt: f32) {
        self.poll_logs();
        self.realtime.advance(dt);
        if !self.paused {
            self.scaled.advance(dt);
            self.advance_anims(dt);
        }
        self.advance_loads(dt);
        self.ui.pump();
        self.apply_intents();
        self.forget_unloaded();
    }

    fn open_window(&mut self, name: &str) {
        self.visits += 1;
        let param = json!({ "visit": self.visits });
        let board = self.board.clone();
        let ready = format!("{name} ready");
        self.ui.show_window(
            name,
            Some(param),
            Some(Box::new(move || {
                board.borrow_mut().intents.push(Intent::Toast(ready));
            })),
        );
    }

    fn open_confirm(&mut self) {
        let board = self.board.clone();
        self.ui.show_popup(
            "confirm",
            Some(json!({ "question": "really?" })),
            Some(Box::new(move || {
                board
                    .borrow_mut()
                    .intents
                    .push(Intent::Toast("confirm closed".to_string()));
            })),
        );
    }

    fn apply_intents(&mut self) {
        loop {
            let intents = std::mem::take(&mut self.board.borrow_mut().intents);
            if intents.is_empty() {
                break;
            }
            for intent in intents {
                match intent {
                    Intent::ClosePopup(id) => {
                        self.ui.close_popup_instance(id);
                    }
                    Intent::Toast(content) => self.ui.show_toast(&content, TOAST_SECS),
                }
            }
        }
    }

    fn advance_anims(&mut self, dt: f32) {
        let finished: Vec<RunningAnim> = {
            let mut board = self.board.borrow_mut();
            for anim in board.anims.iter_mut() {
                anim.remaining -= dt;
            }
            let (finished, running) = std::mem::take(&mut board.anims)
                .into_iter()
                .partition(|a| a.remaining <= 0.0);
            board.anims = running;
            finished
        };
        for anim in finished {
            anim.done.signal();
        }
    }

    fn advance_loads(&mut self, dt: f32) {
        for load in self.loader.take_all() {
            self.in_flight.push(InFlight {
                load,
                remaining: self.latency,
            });
        }
        for flight in self.in_flight.iter_mut() {
            flight.remaining -= dt;
        }
        let (ready, waiting): (Vec<InFlight>, Vec<InFlight>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|f| f.remaining <= 0.0);
        self.in_flight = waiting;
        for flight in ready {
            let PendingLoad { kind, name, reply } = flight.load;
            let instance = self.instantiate(kind, &name);
            tracing::debug!(?kind, name = %name, found = instance.is_some(), "demo load resolved");
            reply.deliver(instance);
        }
    }

    fn instantiate(&self, kind: LoadKind, name: &str) -> Option<ViewInstance> {
        let id = self.loader.next_instance_id();
        let behaviors = match kind {
            LoadKind::Window => self.view(id, name, Role::Window, false),
            LoadKind::Popup => match name {
                "missing" => return None,
                "tooltip" => self.view(id, name, Role::Popup, true),
                "confirm" => {
                    let anim = DemoCloseAnim {
                        id,
                        board: self.board.clone(),
                    };
                    self.view(id, name, Role::Popup, false).with_close_anim(anim)
                }
                _ => self.view(id, name, Role::Popup, false),
            },
            LoadKind::LoadingMask => match name {
                "spinner" => Behaviors::new().with_loading_mask(DemoMask {
                    style: "spinner",
                    board: self.board.clone(),
                }),
                _ => Behaviors::new(),
            },
        };
        Some(ViewInstance::new(id, behaviors))
    }

    fn view(&self, id: InstanceId, name: &str, role: Role, overlay: bool) -> Behaviors {
        self.board.borrow_mut().cards.insert(
            id,
            Card {
                name: name.to_string(),
                role,
                overlay,
                param: None,
                focused: false,
                closing: false,
                last_key: None,
            },
        );
        let view = DemoView {
            id,
            board: self.board.clone(),
        };
        Behaviors::new()
            .with_parameter(view.clone())
            .with_focus(view.clone())
            .with_key(view)
            .with_overlay(overlay)
    }

    fn forget_unloaded(&mut self) {
        for id in self.loader.take_unloaded() {
            self.board.borrow_mut().cards.remove(&id);
            self.scene.detach(id);
            tracing::debug!(instance = ?id, "demo instance destroyed");
        }
    }

    fn poll_logs(&mut self) {
        let Some(rx) = self.log_rx.take() else {
            return;
        };

        let mut drained = 0usize;
        let mut disconnected = false;

        loop {
            match rx.try_recv() {
                Ok(line) => {
                    drained += 1;
                    self.logs.push_back(line);
                    while self.logs.len() > LOG_BUFFER_CAP {
                        self.logs.pop_front();
                    }
                    if drained >= MAX_LOG_DRAIN_PER_TICK {
                        break;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if !disconnected {
            self.log_rx = Some(rx);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tui/demo.rs"]
mod tests;
