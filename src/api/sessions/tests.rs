use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use crate::db::types::AuditStatus;
use crate::repositories::{audit, responses, sessions, students, violations};
use crate::test_support::{self, TEST_EXAM_PASSWORD};

fn login_body(name: &str, student_id: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "degree": "B.Tech",
        "course": "Computer Science",
        "studentId": student_id,
        "examPassword": password
    })
}

async fn login(ctx: &test_support::TestContext, name: &str, student_id: &str) -> serde_json::Value {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/session/login",
            Some(login_body(name, student_id, TEST_EXAM_PASSWORD)),
        ))
        .await
        .expect("login response");
    assert_eq!(response.status(), StatusCode::OK);
    test_support::read_json(response).await
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn login_issues_session_and_burns_the_attempt() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-001", "Ada Lovelace").await;
    test_support::insert_question(ctx.state.db(), "B", false).await;
    test_support::insert_question(ctx.state.db(), "A", false).await;

    let body = login(&ctx, "Ada Lovelace", "COLL-001").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["studentId"], "COLL-001");
    assert_eq!(body["data"]["questionCount"], 2);
    assert_eq!(body["data"]["durationMinutes"], 45);
    assert!(body["data"]["sessionId"].as_str().is_some());

    let student = students::find_by_identifier(ctx.state.db(), "COLL-001")
        .await
        .expect("lookup")
        .expect("student exists");
    assert!(student.has_attempted);

    // The roster entry is single-use; a second login must be refused even
    // though the first session is still running.
    let second = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/session/login",
            Some(login_body("Ada Lovelace", "COLL-001", TEST_EXAM_PASSWORD)),
        ))
        .await
        .expect("second login");
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    let body = test_support::read_json(second).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Already Used"));
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn simultaneous_logins_admit_exactly_one() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-100", "Radia Perlman").await;
    test_support::insert_question(ctx.state.db(), "A", false).await;

    // Both requests race the same roster row; the row lock serializes the
    // one-time-use check, so exactly one session may be issued.
    let body = login_body("Radia Perlman", "COLL-100", TEST_EXAM_PASSWORD);
    let (first, second) = tokio::join!(
        ctx.app.clone().oneshot(test_support::json_request(
            Method::POST,
            "/api/session/login",
            Some(body.clone()),
        )),
        ctx.app.clone().oneshot(test_support::json_request(
            Method::POST,
            "/api/session/login",
            Some(body),
        )),
    );

    let mut statuses = vec![first.expect("first login").status(), second.expect("second login").status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::UNAUTHORIZED]);

    let active = sessions::count_active(ctx.state.db()).await.expect("count");
    assert_eq!(active, 1);
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn login_rejects_bad_credentials() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-002", "Grace Hopper").await;
    test_support::insert_question(ctx.state.db(), "A", false).await;

    let wrong_password = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/session/login",
            Some(login_body("Grace Hopper", "COLL-002", "nope")),
        ))
        .await
        .expect("wrong password");
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_id = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/session/login",
            Some(login_body("Grace Hopper", "COLL-404", TEST_EXAM_PASSWORD)),
        ))
        .await
        .expect("unknown id");
    assert_eq!(unknown_id.status(), StatusCode::UNAUTHORIZED);

    // Name must match the roster record for the identifier.
    let wrong_name = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/session/login",
            Some(login_body("Someone Else", "COLL-002", TEST_EXAM_PASSWORD)),
        ))
        .await
        .expect("wrong name");
    assert_eq!(wrong_name.status(), StatusCode::UNAUTHORIZED);

    // None of the failures consumed the attempt.
    let body = login(&ctx, "grace hopper", "COLL-002").await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn assignment_is_fixed_and_groups_stay_intact() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-003", "Alan Turing").await;
    test_support::insert_question(ctx.state.db(), "A", false).await;
    test_support::insert_question(ctx.state.db(), "B", false).await;
    let header =
        test_support::insert_group_question(ctx.state.db(), "A", false, Some(7), true, None).await;
    let first_member =
        test_support::insert_group_question(ctx.state.db(), "C", false, Some(7), false, Some(1))
            .await;
    let second_member =
        test_support::insert_group_question(ctx.state.db(), "D", false, Some(7), false, Some(2))
            .await;

    let body = login(&ctx, "Alan Turing", "COLL-003").await;
    // The header carries no display number and is excluded from the count.
    assert_eq!(body["data"]["questionCount"], 4);
    let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();

    let uri = format!("/api/session/{session_id}/questions");
    let first = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(Method::GET, &uri, None))
            .await
            .expect("questions"),
    )
    .await;
    let second = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(Method::GET, &uri, None))
            .await
            .expect("questions again"),
    )
    .await;

    // The order was fixed at login; refreshing must not reshuffle.
    assert_eq!(first["data"], second["data"]);

    let items = first["data"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|q| q.get("correctOption").is_none()));

    let group_ids: Vec<i64> = items
        .iter()
        .filter(|q| q["questionGroupId"] == 7)
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(
        group_ids,
        vec![header as i64, first_member as i64, second_member as i64],
        "group must appear as one block, header first"
    );

    let header_item = items.iter().find(|q| q["id"] == header as i64).unwrap();
    assert!(header_item["sequence"].is_null());

    let sequences: Vec<i64> =
        items.iter().filter_map(|q| q["sequence"].as_i64()).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn submit_scores_and_closes_the_session() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-004", "Edsger Dijkstra").await;
    let single = test_support::insert_question(ctx.state.db(), "B", false).await;
    let multi = test_support::insert_question(ctx.state.db(), "A,C", true).await;

    let body = login(&ctx, "Edsger Dijkstra", "COLL-004").await;
    let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();

    let submit_uri = format!("/api/session/{session_id}/submit");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &submit_uri,
            Some(serde_json::json!({
                "answers": [
                    {"questionId": single, "selectedOption": "B"},
                    {"questionId": multi, "selectedOption": ["A"]},
                    {"questionId": 999_999, "selectedOption": "A"}
                ]
            })),
        ))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["totalQuestions"], 2);

    let status_uri = format!("/api/session/{session_id}/status");
    let status = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(Method::GET, &status_uri, None))
            .await
            .expect("status"),
    )
    .await;
    assert_eq!(status["data"]["status"], "COMPLETED");
    // 1.0 for the exact single answer, 0.5 for one of two multi letters.
    assert_eq!(status["data"]["score"], 1.5);
    assert!(status["data"]["endedAt"].as_str().is_some());

    let recorded = responses::list_for_session(ctx.state.db(), &session_id).await.expect("rows");
    assert_eq!(recorded.len(), 2);
    let single_row = recorded.iter().find(|r| r.question_id == single).unwrap();
    assert!(single_row.is_correct);
    assert_eq!(single_row.partial_score, None);
    let multi_row = recorded.iter().find(|r| r.question_id == multi).unwrap();
    assert!(!multi_row.is_correct);
    assert_eq!(multi_row.partial_score, Some(0.5));

    let submitted =
        audit::count_for_session(ctx.state.db(), &session_id, AuditStatus::Submitted)
            .await
            .expect("audit count");
    assert_eq!(submitted, 1);

    // The session is closed; a second submission is refused.
    let again = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &submit_uri,
            Some(serde_json::json!({
                "answers": [{"questionId": single, "selectedOption": "C"}]
            })),
        ))
        .await
        .expect("second submit");
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn submit_rejects_empty_and_unassigned_answers() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-005", "Barbara Liskov").await;
    test_support::insert_question(ctx.state.db(), "A", false).await;

    let body = login(&ctx, "Barbara Liskov", "COLL-005").await;
    let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();
    let submit_uri = format!("/api/session/{session_id}/submit");

    let empty = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &submit_uri,
            Some(serde_json::json!({"answers": []})),
        ))
        .await
        .expect("empty submit");
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let unassigned = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &submit_uri,
            Some(serde_json::json!({
                "answers": [{"questionId": 424_242, "selectedOption": "A"}]
            })),
        ))
        .await
        .expect("unassigned submit");
    assert_eq!(unassigned.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(unassigned).await;
    assert!(body["message"].as_str().unwrap().contains("No Valid Answers"));
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn violation_terminates_exactly_once() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-006", "Donald Knuth").await;
    test_support::insert_question(ctx.state.db(), "A", false).await;

    let body = login(&ctx, "Donald Knuth", "COLL-006").await;
    let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();
    let violation_uri = format!("/api/session/{session_id}/violation");

    let first = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &violation_uri,
                Some(serde_json::json!({"reason": "Tab switch detected"})),
            ))
            .await
            .expect("first violation"),
    )
    .await;
    assert_eq!(first["data"]["status"], "TERMINATED");

    // A second report is recorded but cannot move the session again.
    let second = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &violation_uri,
                Some(serde_json::json!({"reason": "Browser focus lost"})),
            ))
            .await
            .expect("second violation"),
    )
    .await;
    assert_eq!(second["data"]["status"], "TERMINATED");

    let status_uri = format!("/api/session/{session_id}/status");
    let status = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(Method::GET, &status_uri, None))
            .await
            .expect("status"),
    )
    .await;
    assert_eq!(status["data"]["status"], "TERMINATED");
    assert_eq!(status["data"]["violationReason"], "Tab switch detected");

    // Both reports were logged, but only the first kicked the candidate.
    let trail = violations::list_for_session(ctx.state.db(), &session_id).await.expect("trail");
    let reasons: Vec<&str> = trail.iter().map(|v| v.reason.as_str()).collect();
    assert_eq!(reasons, vec!["Tab switch detected", "Browser focus lost"]);
    let kicked = audit::count_for_session(ctx.state.db(), &session_id, AuditStatus::KickedOut)
        .await
        .expect("audit count");
    assert_eq!(kicked, 1);

    let blank = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &violation_uri,
            Some(serde_json::json!({"reason": "  "})),
        ))
        .await
        .expect("blank reason");
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn expired_session_is_terminated_on_next_poll() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-007", "Margaret Hamilton").await;
    test_support::insert_question(ctx.state.db(), "A", false).await;

    let body = login(&ctx, "Margaret Hamilton", "COLL-007").await;
    let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();

    sqlx::query("UPDATE sessions SET expires_at = NOW() - INTERVAL '1 minute' WHERE session_id = $1")
        .bind(&session_id)
        .execute(ctx.state.db())
        .await
        .expect("force expiry");

    let uri = format!("/api/session/{session_id}/questions");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, None))
        .await
        .expect("expired fetch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let status_uri = format!("/api/session/{session_id}/status");
    let status = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(Method::GET, &status_uri, None))
            .await
            .expect("status"),
    )
    .await;
    assert_eq!(status["data"]["status"], "TERMINATED");
    assert_eq!(status["data"]["violationReason"], "Session expired");
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn unknown_session_returns_not_found() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/session/not-a-session/status",
            None,
        ))
        .await
        .expect("status");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = test_support::read_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "requires a local Postgres instance"]
async fn health_reports_active_session_count() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "COLL-008", "Katherine Johnson").await;
    test_support::insert_question(ctx.state.db(), "A", false).await;

    let before = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/health", None))
            .await
            .expect("health"),
    )
    .await;
    assert_eq!(before["status"], "healthy");
    assert_eq!(before["active_sessions"], 0);

    login(&ctx, "Katherine Johnson", "COLL-008").await;

    let after = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/health", None))
            .await
            .expect("health"),
    )
    .await;
    assert_eq!(after["active_sessions"], 1);
}
