use super::behavior::Behaviors;
use crate::kernel::services::bus::LoadReply;

/// Loader-owned handle of an instantiated view. The kernel never destroys it itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

#[derive(Debug)]
pub struct ViewInstance {
    pub id: InstanceId,
    pub behaviors: Behaviors,
}

impl ViewInstance {
    pub fn new(id: InstanceId, behaviors: Behaviors) -> Self {
        Self { id, behaviors }
    }

    pub fn bare(id: InstanceId) -> Self {
        Self::new(id, Behaviors::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Window,
    Popup,
    LoadingMask,
}

/// Asynchronous instantiation service.
///
/// Every request must eventually be answered through its [`LoadReply`], with
/// `None` when instantiation failed.
pub trait UiLoader {
    fn load_window(&mut self, name: &str, reply: LoadReply);

    fn load_popup(&mut self, name: &str, reply: LoadReply);

    fn load_loading_mask(&mut self, name: &str, reply: LoadReply);

    fn unload_instance(&mut self, instance: InstanceId);
}
