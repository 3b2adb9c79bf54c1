//! Study audit log entities.

pub mod model;

pub use model::{CreateStudyLog, StudyLog, StudyLogAction, StudyLogWithActor};
