#[cfg(test)]
mod tests;

pub mod confidence;
pub mod config;
pub mod error;
pub mod name;
pub mod parameter;
pub mod setting;
pub mod store;
pub mod translate;
pub mod validate;
pub mod value;

pub use config::Config;
pub use error::{ErrorKind, ValidationError, ValidationReport};
pub use name::{Domain, ParamName};
pub use setting::{AnalysisSetting, MicroscopeSetting, Setting, TaskSetting};
pub use store::{ParameterStore, SchemaTable};
pub use translate::EngineRecord;
pub use validate::PostedParameters;
