//! Mapping between settings and the engine's flat key-value records.

mod microscope;
mod record;
mod task;

pub use record::{EngineRecord, ParState};
