mod answer;
mod chapter;
mod ids;
mod progress;
mod question;
mod user;

pub use ids::{ChapterId, ParseIdError, QuestionId, UserId, UserIdError, VideoId};

pub use answer::QuizAnswer;
pub use chapter::{Chapter, ChapterError, Video, VideoError};
pub use progress::{ContentType, ParseContentTypeError, Progress, ProgressError, ProgressUpdate};
pub use question::{AnswerOption, ParseAnswerOptionError, QuestionError, QuizQuestion};
pub use user::User;
