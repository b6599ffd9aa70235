//! Recording capability doubles shared by the kernel unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::core::KeyCode;
use crate::kernel::services::bus::CloseAnimDone;
use crate::kernel::services::ports::{
    Behaviors, FocusHandler, HandlerError, HandlerResult, KeyHandler, LoadingMask,
    ParameterHandler, PopupCloseAnim, ToastFactory, ToastView,
};

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

pub struct Spy {
    tag: &'static str,
    log: Log,
    fail: bool,
}

impl Spy {
    pub fn new(tag: &'static str, log: &Log) -> Self {
        Self {
            tag,
            log: log.clone(),
            fail: false,
        }
    }

    pub fn failing(tag: &'static str, log: &Log) -> Self {
        Self {
            fail: true,
            ..Self::new(tag, log)
        }
    }

    fn record(&self, event: String) -> HandlerResult {
        self.log.borrow_mut().push(format!("{}:{}", self.tag, event));
        if self.fail {
            Err(HandlerError::new(format!("{} refused", self.tag)))
        } else {
            Ok(())
        }
    }
}

impl ParameterHandler for Spy {
    fn set_parameter(&mut self, param: Option<&Value>) -> HandlerResult {
        let shown = param.map_or_else(|| "none".to_string(), Value::to_string);
        self.record(format!("param:{shown}"))
    }
}

impl FocusHandler for Spy {
    fn on_focus(&mut self) -> HandlerResult {
        self.record("focus".to_string())
    }

    fn on_lose_focus(&mut self) -> HandlerResult {
        self.record("lose".to_string())
    }

    fn on_close(&mut self) -> HandlerResult {
        self.record("close".to_string())
    }
}

impl KeyHandler for Spy {
    fn on_key(&mut self, key: KeyCode) -> HandlerResult {
        self.record(format!("key:{key:?}"))
    }
}

/// Parameter, focus and key handlers all logging under `tag`.
pub fn spied(tag: &'static str, log: &Log) -> Behaviors {
    Behaviors::new()
        .with_parameter(Spy::new(tag, log))
        .with_focus(Spy::new(tag, log))
        .with_key(Spy::new(tag, log))
}

/// Close animation that parks its completion handle until the test releases it.
#[derive(Clone, Default)]
pub struct HeldAnim {
    parked: Rc<RefCell<Vec<CloseAnimDone>>>,
}

impl HeldAnim {
    pub fn parked_len(&self) -> usize {
        self.parked.borrow().len()
    }

    pub fn finish_all(&self) {
        let parked = std::mem::take(&mut *self.parked.borrow_mut());
        for done in parked {
            done.signal();
        }
    }
}

impl PopupCloseAnim for HeldAnim {
    fn execute_close(&mut self, done: CloseAnimDone) -> HandlerResult {
        self.parked.borrow_mut().push(done);
        Ok(())
    }
}

pub struct MaskSpy {
    tag: &'static str,
    log: Log,
    transition: f32,
}

impl MaskSpy {
    pub fn new(tag: &'static str, log: &Log, transition: f32) -> Self {
        Self {
            tag,
            log: log.clone(),
            transition,
        }
    }
}

impl LoadingMask for MaskSpy {
    fn show(&mut self) {
        self.log.borrow_mut().push(format!("{}:show", self.tag));
    }

    fn close(&mut self) -> f32 {
        self.log.borrow_mut().push(format!("{}:close", self.tag));
        self.transition
    }

    fn hide(&mut self) {
        self.log.borrow_mut().push(format!("{}:hide", self.tag));
    }
}

pub struct ToastSpy {
    id: usize,
    log: Log,
    transition: f32,
}

impl ToastView for ToastSpy {
    fn show(&mut self, content: &str) {
        self.log
            .borrow_mut()
            .push(format!("toast{}:show:{}", self.id, content));
    }

    fn play_out(&mut self) -> f32 {
        self.log.borrow_mut().push(format!("toast{}:out", self.id));
        self.transition
    }

    fn hide(&mut self) {
        self.log.borrow_mut().push(format!("toast{}:hide", self.id));
    }
}

/// Factory numbering each display it builds, starting at 1.
pub fn toast_factory(log: &Log, transition: f32) -> impl ToastFactory + 'static {
    let log = log.clone();
    let mut built = 0;
    move || -> Box<dyn ToastView> {
        built += 1;
        Box::new(ToastSpy {
            id: built,
            log: log.clone(),
            transition,
        })
    }
}
