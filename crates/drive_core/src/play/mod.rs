//! Play records and the play classifier.

pub mod classifier;
pub mod types;

pub use classifier::{togo_bucket, yard_bucket, PlayClassifier, MAX_YARD_BUCKET};
pub use types::{CanonicalPlay, Outcome, PlayKind, PlayType, RawEvent, Situation};
