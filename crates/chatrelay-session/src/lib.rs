pub mod builder;
pub mod error;
pub mod history;
pub mod manager;
pub mod preview;
pub mod session;
pub mod types;
pub mod view;

pub use builder::SessionManagerBuilder;
pub use error::{Result, SessionError};
pub use history::{build_history, derive_processing};
pub use manager::SessionManager;
pub use preview::PreviewAggregator;
pub use session::{ChatSession, SessionDeps};
pub use types::{ChatViewState, IgnoreReason, SubmitOutcome};
pub use view::ViewStateProjector;

// Re-export key types from chatrelay-types
pub use chatrelay_types::{Phase, SessionConfig, SessionStatus};
