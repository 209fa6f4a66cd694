use course_core::model::{
    AnswerOption, Chapter, ChapterId, ContentType, Progress, QuestionId, QuizAnswer, QuizQuestion,
    User, UserId, Video, VideoId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn chapter_id_from_i64(v: i64) -> Result<ChapterId, StorageError> {
    Ok(ChapterId::new(i64_to_u64("chapter_id", v)?))
}

pub(crate) fn video_id_from_i64(v: i64) -> Result<VideoId, StorageError> {
    Ok(VideoId::new(i64_to_u64("video_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn user_id_from_string(s: String) -> Result<UserId, StorageError> {
    UserId::new(s).map_err(ser)
}

pub(crate) fn parse_answer_option(s: &str) -> Result<AnswerOption, StorageError> {
    s.parse::<AnswerOption>()
        .map_err(|_| StorageError::Serialization(format!("invalid answer option: {s}")))
}

pub(crate) fn parse_content_type(s: &str) -> Result<ContentType, StorageError> {
    s.parse::<ContentType>()
        .map_err(|_| StorageError::Serialization(format!("invalid content type: {s}")))
}

pub(crate) fn map_chapter_row(row: &SqliteRow) -> Result<Chapter, StorageError> {
    Chapter::new(
        chapter_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        u32_from_i64(
            "order_index",
            row.try_get::<i64, _>("order_index").map_err(ser)?,
        )?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_video_row(row: &SqliteRow) -> Result<Video, StorageError> {
    Video::new(
        video_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        chapter_id_from_i64(row.try_get::<i64, _>("chapter_id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("video_url").map_err(ser)?,
        u32_from_i64(
            "duration_seconds",
            row.try_get::<i64, _>("duration_seconds").map_err(ser)?,
        )?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<QuizQuestion, StorageError> {
    let correct: String = row.try_get("correct_answer").map_err(ser)?;

    QuizQuestion::new(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        chapter_id_from_i64(row.try_get::<i64, _>("chapter_id").map_err(ser)?)?,
        row.try_get::<String, _>("question_text").map_err(ser)?,
        row.try_get::<String, _>("option_a").map_err(ser)?,
        row.try_get::<String, _>("option_b").map_err(ser)?,
        row.try_get::<String, _>("option_c").map_err(ser)?,
        row.try_get::<String, _>("option_d").map_err(ser)?,
        parse_answer_option(correct.as_str())?,
        u32_from_i64(
            "order_index",
            row.try_get::<i64, _>("order_index").map_err(ser)?,
        )?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: row.try_get("id").map_err(ser)?,
        user_id: user_id_from_string(row.try_get::<String, _>("user_id").map_err(ser)?)?,
        username: row.try_get("username").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<Progress, StorageError> {
    let content_type: String = row.try_get("content_type").map_err(ser)?;
    let video_timestamp = row
        .try_get::<Option<i64>, _>("video_timestamp")
        .map_err(ser)?
        .map(|v| u32_from_i64("video_timestamp", v))
        .transpose()?;
    let quiz_question_index = row
        .try_get::<Option<i64>, _>("quiz_question_index")
        .map_err(ser)?
        .map(|v| u32_from_i64("quiz_question_index", v))
        .transpose()?;

    Ok(Progress {
        id: row.try_get("id").map_err(ser)?,
        user_id: user_id_from_string(row.try_get::<String, _>("user_id").map_err(ser)?)?,
        chapter_id: chapter_id_from_i64(row.try_get::<i64, _>("chapter_id").map_err(ser)?)?,
        content_type: parse_content_type(content_type.as_str())?,
        video_timestamp,
        quiz_question_index,
        is_completed: row.try_get::<i64, _>("is_completed").map_err(ser)? != 0,
        last_updated: row.try_get("last_updated").map_err(ser)?,
    })
}

pub(crate) fn map_answer_row(row: &SqliteRow) -> Result<QuizAnswer, StorageError> {
    let user_answer: String = row.try_get("user_answer").map_err(ser)?;

    Ok(QuizAnswer {
        id: row.try_get("id").map_err(ser)?,
        user_id: user_id_from_string(row.try_get::<String, _>("user_id").map_err(ser)?)?,
        chapter_id: chapter_id_from_i64(row.try_get::<i64, _>("chapter_id").map_err(ser)?)?,
        question_id: question_id_from_i64(row.try_get::<i64, _>("question_id").map_err(ser)?)?,
        user_answer: parse_answer_option(user_answer.as_str())?,
        is_correct: row.try_get::<i64, _>("is_correct").map_err(ser)? != 0,
        answered_at: row.try_get("answered_at").map_err(ser)?,
    })
}
