pub mod controller;
pub mod report;

pub use controller::{DeepSearchConfig, DeepSearchController};
pub use report::{DeepSearchReport, QuestionSection};
