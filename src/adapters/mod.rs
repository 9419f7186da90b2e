// Adapters layer: reqwest-backed implementations of the domain ports.

pub mod attio;
pub mod surveymonkey;

pub use attio::AttioClient;
pub use surveymonkey::SurveyMonkeyClient;
