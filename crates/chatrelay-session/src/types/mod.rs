pub mod outcome;
pub mod view;

pub use outcome::{IgnoreReason, SubmitOutcome};
pub use view::ChatViewState;
