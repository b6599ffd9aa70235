use super::loader::InstanceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Window,
    Popup,
    LoadingMask,
    Toast,
}

/// The scene the loaded views live in.
pub trait ViewHierarchy {
    /// Parents `instance` under `layer`, stretched to fill it.
    fn attach(&mut self, instance: InstanceId, layer: Layer);

    fn set_active(&mut self, instance: InstanceId, active: bool);
}
