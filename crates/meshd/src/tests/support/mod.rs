//! Shared fixtures for the daemon test suites.

mod conf_dir;
mod doubles;
pub mod keys;
mod reporter;

pub use conf_dir::TestConfDir;
pub use doubles::{
    CallLog, CountingSockets, LoopbackResolver, RecordingDevice, RecordingScriptRunner,
};
pub use reporter::{HealthEvent, RecordingHealthReporter};
