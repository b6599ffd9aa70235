pub mod hierarchy;
pub mod loader;
pub mod settings;
pub mod timer;

pub use hierarchy::{NodeState, RecordingHierarchy};
pub use loader::{PendingLoad, QueuedLoader};
pub use settings::{
    ensure_log_dir, get_config_path, get_log_dir, load_config, load_config_or_default,
    parse_config, ConfigError,
};
pub use timer::ManualTimer;
