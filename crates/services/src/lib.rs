#![forbid(unsafe_code)]

pub mod error;
pub mod screenings;

pub use screening_core::Clock;

pub use error::ScreeningError;

pub use screenings::{
    ScreeningAnswerResult, ScreeningHistoryService, ScreeningListItem, ScreeningLoopService,
    ScreeningProgress, ScreeningRecordId, ScreeningSession,
};
