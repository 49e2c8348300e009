//! Collaborator seams for the guiding engine: time and persisted settings.
pub mod clock;
pub mod settings;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use settings::{MemoryStore, SettingValue, SettingsStore};
