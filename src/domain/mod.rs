pub mod contact;
pub mod types;

pub use contact::{ContactMessage, NewContact};
pub use types::{ClassificationResult, Label, LivenessOutcome};
