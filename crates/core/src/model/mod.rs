mod age;
mod catalog;
mod ids;
mod milestone;
mod record;
mod response;
mod result;

pub use age::{AgeError, ChronologicalAge};
pub use catalog::{CatalogError, MilestoneCatalog};
pub use ids::{MilestoneId, ParseIdError, ScreeningId};
pub use milestone::{Milestone, MilestoneCategory, MilestoneDraft, MilestoneError};
pub use record::{ScreeningRecord, ScreeningRecordError};
pub use response::{RecordedAnswer, Response, ResponseError};
pub use result::{AssessmentResult, AssessmentResultError, CategoryScore, DelayStatus};
