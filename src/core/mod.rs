pub mod email;
pub mod intake;
pub mod processor;

pub use crate::domain::model::{ProcessOutcome, ProcessingStage, SurveyResponseDetail};
pub use crate::domain::ports::{CrmProvider, SurveyProvider};
pub use crate::utils::error::Result;
