use chrono::NaiveDate;
use serde_json::{Value, json};
use storage::dto::{CreateAthleteRequest, PlanSessionRequest, PlannedExerciseInput};
use storage::models::ExercisePerformance;
use storage::repository::{PerformanceRepository, PerformanceStore, SessionRepository, SessionStore};
use storage::services::aggregation::ExerciseSummary;
use storage::services::{plan_session, register_athlete, update_exercise_performance};
use storage::{ClientConfig, Filters, PostgrestClient, StorageError};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PostgrestClient {
    PostgrestClient::new(&ClientConfig::new(server.uri(), "test-token")).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn performance_row(total_sessions: i64, average_weight: i64) -> Value {
    json!({
        "athlete_id": 1,
        "exercise_id": 7,
        "total_sessions": total_sessions,
        "average_reps": 5,
        "average_weight": average_weight,
        "personal_best_reps": 5,
        "personal_best_weight": 100
    })
}

#[tokio::test]
async fn test_select_sends_token_and_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exercises"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("name", "eq.Bench Press"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 3, "name": "Bench Press" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let rows: Vec<Value> = client
        .select("exercises", &Filters::new().eq("name", "Bench Press"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 3);
}

#[tokio::test]
async fn test_insert_asks_for_representation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/exercises"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({ "name": "Deadlift" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([{ "id": 12, "name": "Deadlift" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let exercise = storage::repository::ExerciseRepository::new(&client)
        .create("  Deadlift ")
        .await
        .unwrap();

    assert_eq!(exercise.id, 12);
}

#[tokio::test]
async fn test_conflict_status_is_unique_violation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/exercise_performance"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .insert::<_, Value>("exercise_performance", &performance_row(1, 500))
        .await
        .unwrap_err();

    assert!(err.is_unique_violation());
    assert!(err.is_network());
}

#[tokio::test]
async fn test_server_error_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workout_trends"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .select::<Value>("workout_trends", &Filters::new().eq("athlete_id", 1))
        .await
        .unwrap_err();

    match err {
        StorageError::Http { status, body, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_body_reads_as_no_rows() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let rows: Vec<Value> = client
        .insert("users", &json!({ "name": "Sam" }))
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_replace_performance_is_conditional_on_version() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/exercise_performance"))
        .and(query_param("athlete_id", "eq.1"))
        .and(query_param("exercise_id", "eq.7"))
        .and(query_param("total_sessions", "eq.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let current: ExercisePerformance = serde_json::from_value(performance_row(4, 500)).unwrap();
    let next: ExercisePerformance = serde_json::from_value(performance_row(5, 480)).unwrap();

    let written = PerformanceRepository::new(&client)
        .replace_performance(&current, &next)
        .await
        .unwrap();

    assert!(written.is_none());
}

#[tokio::test]
async fn test_performance_update_retries_after_lost_race() {
    let server = MockServer::start().await;

    // First read sees version 1; a competing writer moves the row to 2
    Mock::given(method("GET"))
        .and(path("/exercise_performance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([performance_row(1, 500)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exercise_performance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([performance_row(2, 500)])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/exercise_performance"))
        .and(query_param("total_sessions", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/exercise_performance"))
        .and(query_param("total_sessions", "eq.2"))
        .and(body_partial_json(json!({ "total_sessions": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([performance_row(3, 500)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let summary = ExerciseSummary::from_sets(&[5], &[100]).unwrap();
    let row = update_exercise_performance(&PerformanceRepository::new(&client), 1, 7, &summary)
        .await
        .unwrap();

    assert_eq!(row.total_sessions, 3);
}

#[tokio::test]
async fn test_mark_completed_detects_prior_completion() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/workout_sessions"))
        .and(query_param("id", "eq.11"))
        .and(query_param("completed", "eq.N"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workout_sessions"))
        .and(query_param("id", "eq.11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 11,
            "athlete_id": 3,
            "date": "2024-05-15",
            "completed": "Y"
        }])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = SessionRepository::new(&client).mark_completed(11).await;

    assert!(matches!(result, Err(StorageError::AlreadyCompleted(11))));
}

#[tokio::test]
async fn test_delete_missing_session_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workout_sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = SessionRepository::new(&client)
        .delete(3, date(2024, 5, 15))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

fn signup_request() -> CreateAthleteRequest {
    CreateAthleteRequest {
        name: "Sam Carter".to_string(),
        email: "sam@example.com".to_string(),
        age: Some(29),
        fitness_goals: Some("Run a 5k".to_string()),
        medical_conditions: None,
    }
}

#[tokio::test]
async fn test_register_athlete_links_user_and_athlete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("email", "eq.sam@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("email", "eq.sam@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 42,
            "name": "Sam Carter",
            "email": "sam@example.com",
            "role": "client"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_partial_json(json!({ "email": "sam@example.com", "role": "client" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/athletes"))
        .and(body_partial_json(json!({ "user_id": 42, "age": 29 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 5,
            "user_id": 42,
            "age": 29,
            "fitness_goals": "Run a 5k",
            "medical_conditions": null
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (user, athlete) = register_athlete(&client, &signup_request()).await.unwrap();

    assert_eq!(user.id, 42);
    assert_eq!(athlete.user_id, 42);
    assert_eq!(athlete.id, 5);
}

#[tokio::test]
async fn test_register_athlete_rejects_taken_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 42,
            "name": "Sam Carter",
            "email": "sam@example.com",
            "role": "client"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = register_athlete(&client, &signup_request()).await;

    assert!(matches!(result, Err(StorageError::Conflict(_))));
}

#[tokio::test]
async fn test_plan_session_resolves_names_and_stores_details() {
    let server = MockServer::start().await;
    let session = json!({ "id": 11, "athlete_id": 3, "date": "2024-05-15", "completed": "N" });
    let detail = json!({
        "id": 100,
        "workout_session_id": 11,
        "exercise_id": 4,
        "sets": 2,
        "reps": [5, 5],
        "weight": [100, 110],
        "instructions": "Belt on the top set"
    });

    // Nothing scheduled yet; afterwards the new session is found
    Mock::given(method("GET"))
        .and(path("/workout_sessions"))
        .and(query_param("athlete_id", "eq.3"))
        .and(query_param("date", "eq.2024-05-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workout_sessions"))
        .and(query_param("athlete_id", "eq.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exercises"))
        .and(query_param("name", "eq.Squat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 4, "name": "Squat" }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exercises"))
        .and(query_param("id", "in.(4)"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 4, "name": "Squat" }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/workout_sessions"))
        .and(body_partial_json(json!({ "athlete_id": 3, "completed": "N" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([session])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/workout_details"))
        .and(body_partial_json(json!([{ "exercise_id": 4, "reps": [5, 5], "weight": [100, 110] }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([detail.clone()])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workout_details"))
        .and(query_param("workout_session_id", "eq.11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([detail])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = PlanSessionRequest {
        athlete_id: 3,
        date: date(2024, 5, 15),
        exercises: vec![PlannedExerciseInput {
            name: "Squat".to_string(),
            sets: 2,
            reps: vec!["5".to_string(), "5".to_string()],
            weight: vec!["100".to_string(), "110".to_string()],
            instructions: "Belt on the top set".to_string(),
        }],
    };

    let details = plan_session(&client, &request).await.unwrap();

    assert_eq!(details.session.id, 11);
    assert!(!details.session.completed.is_completed());
    assert_eq!(details.exercises.len(), 1);
    assert_eq!(details.exercises[0].name, "Squat");
    assert_eq!(details.exercises[0].weight, vec![100, 110]);
}

#[tokio::test]
async fn test_plan_session_refuses_second_session_on_same_day() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workout_sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 11,
            "athlete_id": 3,
            "date": "2024-05-15",
            "completed": "N"
        }])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = PlanSessionRequest {
        athlete_id: 3,
        date: date(2024, 5, 15),
        exercises: vec![PlannedExerciseInput {
            name: "Squat".to_string(),
            sets: 1,
            reps: vec!["5".to_string()],
            weight: vec!["100".to_string()],
            instructions: String::new(),
        }],
    };

    let result = plan_session(&client, &request).await;

    assert!(matches!(result, Err(StorageError::Conflict(_))));
    assert!(
        SessionRepository::new(&client)
            .find_session(3, date(2024, 5, 15))
            .await
            .unwrap()
            .is_some()
    );
}
