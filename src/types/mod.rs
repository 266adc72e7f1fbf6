//! Canonical types produced by the blueprint normalizer.

pub mod blueprint;
pub mod message;
pub mod point;
pub mod prompt;

pub use blueprint::{BlueprintHeader, CanonicalBlueprint, ModelRef};
pub use message::{Message, Role};
pub use point::{Point, PointKind, DEFAULT_MULTIPLIER, MAX_MULTIPLIER, MIN_MULTIPLIER};
pub use prompt::{Prompt, PromptInput};
