//! End-to-end progress flows over the in-memory backend.

use course_core::model::{Chapter, ChapterId, ContentType};
use course_core::time::{fixed_clock, fixed_now};
use services::{AppServices, SaveProgressRequest};
use storage::repository::Storage;

async fn build_services() -> AppServices {
    let storage = Storage::in_memory();
    for (id, title, order_index) in [
        (1u64, "Introduction to Programming", 1u32),
        (2, "Variables and Data Types", 2),
    ] {
        let chapter =
            Chapter::new(ChapterId::new(id), title, "", order_index, fixed_now()).expect("chapter");
        storage
            .catalog
            .upsert_chapter(&chapter)
            .await
            .expect("seed chapter");
    }

    let services = AppServices::with_storage(&storage, fixed_clock());
    services.users().login("learner").await.expect("login");
    services
}

fn video_save(chapter: u64, timestamp: u32, is_completed: bool) -> SaveProgressRequest {
    SaveProgressRequest {
        user_id: "learner".to_string(),
        chapter_id: ChapterId::new(chapter),
        content_type: "video".to_string(),
        video_timestamp: Some(timestamp),
        quiz_question_index: None,
        is_completed,
    }
}

fn quiz_save(chapter: u64, index: u32) -> SaveProgressRequest {
    SaveProgressRequest {
        user_id: "learner".to_string(),
        chapter_id: ChapterId::new(chapter),
        content_type: "quiz".to_string(),
        video_timestamp: None,
        quiz_question_index: Some(index),
        is_completed: false,
    }
}

#[tokio::test]
async fn resave_replaces_the_row_in_place() {
    let services = build_services().await;
    let progress = services.progress();

    progress.save_progress(video_save(1, 120, false)).await.expect("first save");
    progress.save_progress(video_save(1, 300, true)).await.expect("second save");

    let rows = progress
        .chapter_progress("learner", ChapterId::new(1))
        .await
        .expect("chapter progress");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].video_timestamp, Some(300));
    assert!(rows[0].is_completed);
}

#[tokio::test]
async fn video_and_quiz_rows_live_side_by_side() {
    let services = build_services().await;
    let progress = services.progress();

    progress.save_progress(video_save(1, 45, false)).await.expect("video save");
    progress.save_progress(quiz_save(1, 3)).await.expect("quiz save");

    let rows = progress
        .chapter_progress("learner", ChapterId::new(1))
        .await
        .expect("chapter progress");
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn latest_progress_follows_the_most_recent_save() {
    let services = build_services().await;
    let progress = services.progress();

    progress.save_progress(video_save(1, 45, false)).await.expect("video save");
    progress.save_progress(quiz_save(2, 0)).await.expect("quiz save");

    // The fixed clock stamps both rows identically; the newer row id wins.
    let summary = progress.latest_progress("learner").await.expect("summary");
    assert!(summary.has_progress);
    assert_eq!(summary.last_chapter_id, Some(ChapterId::new(2)));
    assert_eq!(summary.last_content_type, Some(ContentType::Quiz));
    assert_eq!(summary.last_quiz_question, Some(0));
    assert_eq!(
        summary.chapter_title.as_deref(),
        Some("Variables and Data Types")
    );
}

#[tokio::test]
async fn reset_then_resave_starts_a_fresh_row() {
    let services = build_services().await;
    let progress = services.progress();

    progress.save_progress(video_save(1, 45, false)).await.expect("video save");
    progress.save_progress(quiz_save(2, 1)).await.expect("quiz save");

    assert_eq!(progress.reset_progress("learner").await.expect("reset"), 2);
    assert_eq!(progress.reset_progress("learner").await.expect("reset again"), 0);
    assert_eq!(
        progress.latest_progress("learner").await.expect("summary"),
        services::UserProgressSummary::none()
    );

    let revived = progress.save_progress(video_save(1, 10, false)).await.expect("resave");
    assert_eq!(revived.video_timestamp, Some(10));
    let rows = progress.all_progress("learner").await.expect("all progress");
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn all_progress_orders_by_chapter_then_content_type() {
    let services = build_services().await;
    let progress = services.progress();

    progress.save_progress(video_save(2, 5, false)).await.expect("save");
    progress.save_progress(quiz_save(1, 0)).await.expect("save");
    progress.save_progress(video_save(1, 9, false)).await.expect("save");

    let rows = progress.all_progress("learner").await.expect("all progress");
    let keys: Vec<_> = rows.iter().map(|r| (r.chapter_id, r.content_type)).collect();
    assert_eq!(
        keys,
        vec![
            (ChapterId::new(1), ContentType::Quiz),
            (ChapterId::new(1), ContentType::Video),
            (ChapterId::new(2), ContentType::Video),
        ]
    );
}
