//! Repository implementations.

pub mod study_log;
pub mod user;

pub use study_log::StudyLogRepository;
pub use user::UserRepository;
