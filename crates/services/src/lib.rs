#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_service;
pub mod error;
pub mod progress_service;
pub mod quiz_service;
pub mod resume_service;
pub mod user_service;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use content_service::{ChapterContent, ContentService};
pub use error::{
    ContentServiceError, ProgressServiceError, QuizServiceError, ResumeServiceError,
    UserServiceError,
};
pub use progress_service::{ProgressService, SaveProgressRequest, UserProgressSummary};
pub use quiz_service::{AnswerDetail, QuizService, SubmitAnswerRequest, SubmittedAnswer};
pub use resume_service::{QuizResume, ResumePoint, ResumeService};
pub use user_service::UserService;
