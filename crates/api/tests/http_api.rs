//! Router tests pinning the response envelope contract.
//!
//! Every body shape asserted here is load-bearing for the frontend; treat a
//! failing assertion as a breaking API change, not a test to update.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use course_core::model::{
    AnswerOption, Chapter, ChapterId, QuestionId, QuizQuestion, Video, VideoId,
};
use course_core::time::{fixed_clock, fixed_now};
use serde_json::{Value, json};
use services::AppServices;
use storage::repository::Storage;
use tower::ServiceExt;

use api::state::AppState;

/// Two chapters; only the first has a video and questions, so the second
/// doubles as the "empty chapter" case.
async fn test_app() -> Router {
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

    let video = Video::new(
        VideoId::new(1),
        ChapterId::new(1),
        "Welcome to Programming",
        "https://example.com/videos/intro.mp4",
        300,
        fixed_now(),
    )
    .expect("video");
    storage
        .catalog
        .upsert_video(&video)
        .await
        .expect("seed video");

    for (id, order_index) in [(1u64, 1u32), (2, 2)] {
        let question = QuizQuestion::new(
            QuestionId::new(id),
            ChapterId::new(1),
            format!("Question {id}"),
            "a",
            "b",
            "c",
            "d",
            AnswerOption::B,
            order_index,
            fixed_now(),
        )
        .expect("question");
        storage
            .catalog
            .upsert_question(&question)
            .await
            .expect("seed question");
    }

    let services = AppServices::with_storage(&storage, fixed_clock());
    api::app(AppState::new(services))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn login(app: &Router, user_id: &str) {
    let (status, _) = send(
        app,
        post_json("/api/auth/login", &json!({ "user_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn submit(app: &Router, user_id: &str, chapter: u64, question: u64, letter: &str) {
    let (status, _) = send(
        app,
        post_json(
            "/api/quiz/submit",
            &json!({
                "user_id": user_id,
                "chapter_id": chapter,
                "question_id": question,
                "user_answer": letter,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

//
// ─── HEALTH + AUTH ─────────────────────────────────────────────────────────────
//

#[tokio::test]
async fn health_reports_the_database_as_connected() {
    let app = test_app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn login_creates_the_user_and_wraps_it() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        post_json("/api/auth/login", &json!({ "user_id": "u1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["user_id"], "u1");
    assert_eq!(body["user"]["username"], "u1");

    // Second login returns the same row.
    let (_, again) = send(
        &app,
        post_json("/api/auth/login", &json!({ "user_id": "u1" })),
    )
    .await;
    assert_eq!(again["user"]["id"], body["user"]["id"]);
}

#[tokio::test]
async fn blank_user_id_on_login_is_a_bad_request() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        post_json("/api/auth/login", &json!({ "user_id": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], "User ID cannot be empty");
}

#[tokio::test]
async fn malformed_login_body_keeps_the_envelope() {
    let app = test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{"))
        .expect("request");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    let message = body["message"].as_str().expect("message");
    assert!(
        message.starts_with("Invalid request format"),
        "got: {message}"
    );
}

#[tokio::test]
async fn logout_always_succeeds() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/logout")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");
}

#[tokio::test]
async fn unknown_user_lookup_is_not_found() {
    let app = test_app().await;
    let (status, body) = send(&app, get("/api/auth/user/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], "User not found");
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

#[tokio::test]
async fn chapter_listing_matches_the_outline() {
    let app = test_app().await;
    let (status, body) = send(&app, get("/api/chapters")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let chapters = body["chapters"].as_array().expect("chapters array");
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0]["title"], "Introduction to Programming");
    assert_eq!(chapters[1]["order_index"], json!(2));
}

#[tokio::test]
async fn chapter_payloads_serve_full_rows() {
    let app = test_app().await;

    let (_, chapter) = send(&app, get("/api/chapters/1")).await;
    assert_eq!(chapter["chapter"]["title"], "Introduction to Programming");

    let (_, video) = send(&app, get("/api/chapters/1/video")).await;
    assert_eq!(
        video["video"]["video_url"],
        "https://example.com/videos/intro.mp4"
    );
    assert_eq!(video["video"]["duration_seconds"], json!(300));

    // Questions come back whole, solution included.
    let (_, quiz) = send(&app, get("/api/chapters/1/quiz")).await;
    let questions = quiz["questions"].as_array().expect("questions array");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["correct_answer"], "B");
}

#[tokio::test]
async fn chapter_misses_map_to_not_found() {
    let app = test_app().await;

    let (status, body) = send(&app, get("/api/chapters/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Chapter not found");

    let (status, body) = send(&app, get("/api/chapters/2/video")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Video not found for this chapter");

    let (status, body) = send(&app, get("/api/chapters/2/quiz")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No quiz questions found for this chapter");
}

#[tokio::test]
async fn chapter_content_nests_what_exists() {
    let app = test_app().await;

    let (status, body) = send(&app, get("/api/chapters/1/content")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chapter"]["title"], "Introduction to Programming");
    assert_eq!(body["chapter"]["video"]["id"], json!(1));
    assert_eq!(
        body["chapter"]["quiz_questions"]
            .as_array()
            .expect("questions")
            .len(),
        2
    );

    // A bare chapter omits both keys instead of sending null/[].
    let (_, bare) = send(&app, get("/api/chapters/2/content")).await;
    assert!(bare["chapter"].get("video").is_none());
    assert!(bare["chapter"].get("quiz_questions").is_none());
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

fn video_save(user_id: &str, chapter: u64, timestamp: u32) -> Value {
    json!({
        "user_id": user_id,
        "chapter_id": chapter,
        "content_type": "video",
        "video_timestamp": timestamp,
    })
}

#[tokio::test]
async fn save_progress_requires_a_known_user() {
    let app = test_app().await;
    let (status, body) = send(&app, post_json("/api/progress", &video_save("u1", 1, 10))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn save_progress_validation_messages_pass_through() {
    let app = test_app().await;
    login(&app, "u1").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/progress",
            &json!({ "user_id": "u1", "chapter_id": 1, "content_type": "audio" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid content type. Must be 'video' or 'quiz'");

    let (status, body) = send(
        &app,
        post_json(
            "/api/progress",
            &json!({ "user_id": "u1", "chapter_id": 1, "content_type": "video" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "video_timestamp is required for video content type"
    );

    let (status, body) = send(&app, post_json("/api/progress", &video_save("u1", 99, 10))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Chapter not found");
}

#[tokio::test]
async fn saved_progress_row_comes_back() {
    let app = test_app().await;
    login(&app, "u1").await;

    let (status, body) = send(&app, post_json("/api/progress", &video_save("u1", 1, 42))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], "Progress saved successfully");
    assert_eq!(body["progress"]["content_type"], "video");
    assert_eq!(body["progress"]["video_timestamp"], json!(42));
    assert_eq!(body["progress"]["is_completed"], json!(false));
    // The unused position field is omitted, not null.
    assert!(body["progress"].get("quiz_question_index").is_none());
}

#[tokio::test]
async fn latest_progress_envelope_with_and_without_rows() {
    let app = test_app().await;

    // No rows: still 200, flagged and messaged.
    let (status, body) = send(&app, get("/api/progress/user/ghost")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["progress"]["has_progress"], json!(false));
    assert_eq!(body["message"], "No progress found for this user");

    login(&app, "u1").await;
    send(&app, post_json("/api/progress", &video_save("u1", 1, 42))).await;

    let (status, body) = send(&app, get("/api/progress/user/u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["has_progress"], json!(true));
    assert_eq!(body["progress"]["last_chapter_id"], json!(1));
    assert_eq!(
        body["progress"]["chapter_title"],
        "Introduction to Programming"
    );
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn progress_views_list_rows() {
    let app = test_app().await;
    login(&app, "u1").await;
    send(&app, post_json("/api/progress", &video_save("u1", 1, 42))).await;
    send(
        &app,
        post_json(
            "/api/progress",
            &json!({
                "user_id": "u1",
                "chapter_id": 2,
                "content_type": "quiz",
                "quiz_question_index": 0,
            }),
        ),
    )
    .await;

    let (_, all) = send(&app, get("/api/progress/user/u1/all")).await;
    let rows = all["progress"].as_array().expect("progress array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["chapter_id"], json!(1));
    assert_eq!(rows[1]["chapter_id"], json!(2));

    let (_, scoped) = send(&app, get("/api/progress/user/u1/chapter/1")).await;
    assert_eq!(scoped["progress"].as_array().expect("rows").len(), 1);
}

#[tokio::test]
async fn reset_progress_counts_rows() {
    let app = test_app().await;
    login(&app, "u1").await;
    send(&app, post_json("/api/progress", &video_save("u1", 1, 42))).await;
    send(&app, post_json("/api/progress", &video_save("u1", 2, 7))).await;

    let (status, body) = send(&app, delete("/api/progress/user/u1/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Progress reset successfully");
    assert_eq!(body["deleted"], json!(2));

    // Idempotent: nothing left to delete.
    let (_, again) = send(&app, delete("/api/progress/user/u1/reset")).await;
    assert_eq!(again["deleted"], json!(0));
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[tokio::test]
async fn submitted_answer_envelope_matches_the_contract() {
    let app = test_app().await;

    // No login required: the ledger keys on the external id alone.
    let (status, body) = send(
        &app,
        post_json(
            "/api/quiz/submit",
            &json!({
                "user_id": "drive-by",
                "chapter_id": 1,
                "question_id": 1,
                "user_answer": "B",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], "Answer submitted successfully");
    assert_eq!(body["is_correct"], json!(true));
    assert_eq!(body["correct_answer"], "B");
    assert_eq!(body["answer"]["quiz_question_id"], json!(1));
    assert_eq!(body["answer"]["chapter_id"], json!(1));
    assert_eq!(body["answer"]["user_answer"], "B");
}

#[tokio::test]
async fn submit_answer_error_mapping() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/quiz/submit",
            &json!({
                "user_id": "u1",
                "chapter_id": 1,
                "question_id": 1,
                "user_answer": "E",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid answer. Must be A, B, C, or D");

    // Question 1 exists, but not under chapter 2.
    let (status, body) = send(
        &app,
        post_json(
            "/api/quiz/submit",
            &json!({
                "user_id": "u1",
                "chapter_id": 2,
                "question_id": 1,
                "user_answer": "A",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Quiz question not found");
}

#[tokio::test]
async fn history_endpoints_scope_their_key() {
    let app = test_app().await;
    submit(&app, "u1", 1, 1, "B").await;
    submit(&app, "u1", 1, 2, "C").await;
    submit(&app, "other", 1, 1, "A").await;

    let (_, chapter) = send(&app, get("/api/quiz/history/user/u1/chapter/1")).await;
    let answers = chapter["answers"].as_array().expect("answers");
    assert_eq!(answers.len(), 2);
    // Newest first; rows are enriched with the question at read time.
    assert_eq!(answers[0]["question_text"], "Question 2");
    assert_eq!(answers[0]["correct_answer"], "B");
    assert_eq!(answers[0]["is_correct"], json!(false));

    let (_, question) = send(&app, get("/api/quiz/history/user/u1/question/1")).await;
    assert_eq!(question["answers"].as_array().expect("answers").len(), 1);

    let (_, all) = send(&app, get("/api/quiz/history/user/u1")).await;
    assert_eq!(all["answers"].as_array().expect("answers").len(), 2);
}

#[tokio::test]
async fn score_summary_envelope() {
    let app = test_app().await;
    submit(&app, "u1", 1, 1, "B").await;
    submit(&app, "u1", 1, 2, "C").await;

    let (status, body) = send(&app, get("/api/quiz/score/user/u1")).await;
    assert_eq!(status, StatusCode::OK);
    let scores = body["scores"].as_array().expect("scores");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0]["chapter_title"], "Introduction to Programming");
    assert_eq!(scores[0]["total_answered"], json!(2));
    assert_eq!(scores[0]["total_correct"], json!(1));
    assert_eq!(scores[0]["total_wrong"], json!(1));
    assert_eq!(scores[0]["percentage"], json!(50.0));
}

#[tokio::test]
async fn clear_history_scopes_to_the_query() {
    let app = test_app().await;
    submit(&app, "u1", 1, 1, "B").await;
    submit(&app, "u1", 1, 2, "A").await;

    let (_, other) = send(&app, delete("/api/quiz/history/user/u1/clear?chapter_id=2")).await;
    assert_eq!(other["deleted"], json!(0));

    let (status, body) = send(&app, delete("/api/quiz/history/user/u1/clear")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Quiz history cleared successfully");
    assert_eq!(body["deleted"], json!(2));
}

#[tokio::test]
async fn with_history_requires_the_user_id_param() {
    let app = test_app().await;

    let (status, body) = send(&app, get("/api/quiz/chapter/1/with-history")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "user_id query parameter is required");

    submit(&app, "u1", 1, 1, "B").await;
    let (status, body) = send(&app, get("/api/quiz/chapter/1/with-history?user_id=u1")).await;
    assert_eq!(status, StatusCode::OK);
    let quiz = &body["quiz"];
    assert_eq!(quiz["total_questions"], json!(2));
    assert_eq!(quiz["questions_answered"], json!(1));
    assert_eq!(quiz["correct_answers"], json!(1));
    assert_eq!(quiz["questions"][0]["has_answered"], json!(true));
    assert_eq!(quiz["questions"][0]["correct_answer"], "B");
    // The solution stays hidden for the untouched question.
    assert_eq!(quiz["questions"][1]["correct_answer"], Value::Null);

    let (status, body) = send(&app, get("/api/quiz/chapter/2/with-history?user_id=u1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No quiz questions found for this chapter");
}

#[tokio::test]
async fn resume_envelope_flat_shape() {
    let app = test_app().await;

    let (status, body) = send(&app, get("/api/quiz/resume/user/u1/chapter/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], json!(false));
    assert_eq!(body["resume_point"]["question_id"], json!(1));
    assert_eq!(body["resume_point"]["order_index"], json!(1));
    assert_eq!(body["resume_point"]["question_text"], "Question 1");

    submit(&app, "u1", 1, 1, "B").await;
    submit(&app, "u1", 1, 2, "D").await;

    let (_, body) = send(&app, get("/api/quiz/resume/user/u1/chapter/1")).await;
    assert_eq!(body["completed"], json!(true));
    assert_eq!(body["message"], "All quiz questions completed");
    assert!(body.get("resume_point").is_none());
}
