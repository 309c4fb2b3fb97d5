mod progress;
mod queries;
mod service;
mod view;
mod workflow;

// Public API of the screening subsystem.
pub use crate::error::ScreeningError;
pub use progress::ScreeningProgress;
pub use service::ScreeningSession;
pub use view::{ScreeningHistoryService, ScreeningListItem, ScreeningRecordId};
pub use workflow::{ScreeningAnswerResult, ScreeningLoopService};
