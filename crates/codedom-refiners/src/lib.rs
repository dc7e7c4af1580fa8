//! Per-language refiner pipelines
//!
//! A refiner takes the language-agnostic code model built by the front-end
//! and reshapes it for one target: import seeding, union lowering, naming
//! conventions, reserved-word escaping and synthesized members.

pub mod config;
pub mod error;
pub mod passes;
pub mod pipeline;
pub mod reserved;
mod targets;

pub use config::{GenerationConfiguration, GenerationLanguage};
pub use error::{RefinerError, RefinerResult};
pub use passes::{AdditionalDataCorrection, CoreTypeCorrections, DefaultImport, EscapeStyle, UsingSpec};
pub use pipeline::{refine, refine_targets, RefinerPass, RefinerPipeline, TargetOutput};
pub use reserved::ReservedNames;
