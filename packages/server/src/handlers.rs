//! HTTP handler functions for the ward map API.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use ward_map_analytics::{RankingError, ranking, summary};
use ward_map_server_models::{ApiHealth, AskRequest, AskResponse, TopPriorityParams};
use ward_map_source::{Snapshot, SourceError};

use crate::{ASK_TOP_N, AppState, DEFAULT_TOP_N};

/// Message returned by the ask endpoint when there is nothing to rank.
const NO_DATA: &str = "No ward data available.";

/// Largest ask body read; anything bigger is answered as an empty question.
const ASK_BODY_LIMIT: usize = 256 * 1024;

/// Reasons a snapshot could not be produced for a request.
#[derive(Debug, thiserror::Error)]
enum SnapshotError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

/// Reads a fresh snapshot on the blocking thread pool.
async fn read_snapshot(state: &AppState) -> Result<Snapshot, SnapshotError> {
    let selector = Arc::clone(&state.selector);
    Ok(web::block(move || selector.snapshot()).await??)
}

fn snapshot_failure(e: &SnapshotError) -> HttpResponse {
    log::error!("Failed to load ward data: {e}");
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": "Failed to load ward data"
    }))
}

/// Reads an ask body of at most [`ASK_BODY_LIMIT`] bytes.
///
/// Any body that cannot be read or parsed becomes an empty question.
async fn read_ask_request(payload: web::Payload) -> AskRequest {
    let body = match payload.to_bytes_limited(ASK_BODY_LIMIT).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            log::debug!("Failed to read ask body, treating as empty question: {e}");
            return AskRequest::default();
        }
        Err(e) => {
            log::debug!("Ask body over {ASK_BODY_LIMIT} bytes, treating as empty question: {e}");
            return AskRequest::default();
        }
    };

    serde_json::from_slice(&body).unwrap_or_else(|e| {
        log::debug!("Unparsable ask body, treating as empty question: {e}");
        AskRequest::default()
    })
}

/// `GET /v1/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /v1/tables/wards/`
///
/// Returns the full current snapshot.
pub async fn wards(state: web::Data<AppState>) -> HttpResponse {
    match read_snapshot(&state).await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot.records),
        Err(e) => snapshot_failure(&e),
    }
}

/// `GET /v1/tables/highest_priority/`
///
/// Returns the single highest-priority ward, or `{}` when there are none.
pub async fn highest_priority(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = match read_snapshot(&state).await {
        Ok(snapshot) => snapshot,
        Err(e) => return snapshot_failure(&e),
    };

    match ranking::highest(&snapshot.records) {
        Ok(ward) => HttpResponse::Ok().json(ward),
        Err(RankingError::EmptySnapshot) => HttpResponse::Ok().json(serde_json::json!({})),
    }
}

/// `GET /v1/tables/top_priority/?n=3`
///
/// Returns the `n` highest-priority wards in descending order.
pub async fn top_priority(
    state: web::Data<AppState>,
    params: web::Query<TopPriorityParams>,
) -> HttpResponse {
    let n = params.n.unwrap_or(DEFAULT_TOP_N);

    match read_snapshot(&state).await {
        Ok(snapshot) => HttpResponse::Ok().json(ranking::top_n(&snapshot.records, n)),
        Err(e) => snapshot_failure(&e),
    }
}

/// `POST /v1/query/ask`
///
/// Always answers `200 {"result": ...}`. Unparsable or oversized bodies count
/// as an empty question; missing data and LLM failures are explained in
/// `result`.
pub async fn ask(state: web::Data<AppState>, payload: web::Payload) -> HttpResponse {
    let request = read_ask_request(payload).await;
    let question = request.question_text();

    let digest = match read_snapshot(&state).await {
        Ok(snapshot) => summary::digest_top(&snapshot.records, ASK_TOP_N).ok(),
        Err(e) => {
            log::error!("Failed to load ward data for question: {e}");
            None
        }
    };

    let result = match digest {
        Some(digest) => {
            let answer = state.resolver.resolve(question, &digest).await;
            log::debug!("Answered question from {} source", answer.source);
            answer.text
        }
        None => NO_DATA.to_string(),
    };

    HttpResponse::Ok().json(AskResponse { result })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use actix_web::{App, middleware, test};
    use ward_map_ai::resolver::AnswerResolver;
    use ward_map_source::SourcePaths;
    use ward_map_source::selector::SourceSelector;
    use ward_map_ward_models::WardRecord;

    use super::*;

    const CSV: &str = "\
ward_name,Population,PM25,Avg_Temp,Green_Are,Open_Land,Priority_Sci,Priority_Level
A,1000,40.5,31,12,4,0.9,High
B,900,22,29,30,9,0.5,Low
C,800,55,33,8,2,0.9,High
";

    fn state_for(dir: &Path, csv: Option<&str>) -> web::Data<AppState> {
        let fallback = dir.join("ward_priority.csv");
        if let Some(csv) = csv {
            std::fs::write(&fallback, csv).unwrap();
        }
        let paths = SourcePaths {
            live: dir.join("live_wards.jsonl"),
            fallback,
        };
        web::Data::new(AppState {
            selector: Arc::new(SourceSelector::from_paths(&paths)),
            resolver: Arc::new(AnswerResolver::new(None, 200)),
        })
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .wrap(middleware::NormalizePath::trim())
                    .app_data($state)
                    .configure(crate::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn highest_priority_breaks_ties_by_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state_for(dir.path(), Some(CSV)));

        let req = test::TestRequest::get()
            .uri("/v1/tables/highest_priority/")
            .to_request();
        let ward: WardRecord = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ward.ward_name, "A");

        let req = test::TestRequest::get()
            .uri("/v1/tables/top_priority/?n=2")
            .to_request();
        let top: Vec<WardRecord> = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = top.iter().map(|w| w.ward_name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
    }

    #[actix_web::test]
    async fn wards_prefers_live_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state_for(dir.path(), Some(CSV)));

        let req = test::TestRequest::get().uri("/v1/tables/wards/").to_request();
        let wards: Vec<WardRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(wards.len(), 3);

        std::fs::write(
            dir.path().join("live_wards.jsonl"),
            "{\"ward_name\":\"Live\",\"Priority_Sci\":0.1}\n",
        )
        .unwrap();

        let req = test::TestRequest::get().uri("/v1/tables/wards").to_request();
        let wards: Vec<WardRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(wards.len(), 1);
        assert_eq!(wards[0].ward_name, "Live");
        assert!(wards[0].pm25.abs() < f64::EPSILON);
    }

    #[actix_web::test]
    async fn highest_priority_of_empty_snapshot_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state_for(dir.path(), Some("ward_name,Priority_Sci\n")));

        let req = test::TestRequest::get()
            .uri("/v1/tables/highest_priority/")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({}));
    }

    #[actix_web::test]
    async fn ask_without_credential_returns_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state_for(dir.path(), Some(CSV)));

        let req = test::TestRequest::post()
            .uri("/v1/query/ask")
            .set_json(serde_json::json!({ "question": "What is the top ward?" }))
            .to_request();
        let resp: AskResponse = test::call_and_read_body_json(&app, req).await;
        assert!(resp.result.starts_with("[Mock]"));
        assert!(resp.result.contains("'What is the top ward?'"));
        assert!(resp.result.contains("Highest priority ward: A with score 0.900."));
    }

    #[actix_web::test]
    async fn ask_tolerates_garbage_body() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state_for(dir.path(), Some(CSV)));

        let req = test::TestRequest::post()
            .uri("/v1/query/ask")
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn ask_answers_oversized_body_as_empty_question() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state_for(dir.path(), Some(CSV)));

        let padding = "x".repeat(ASK_BODY_LIMIT + 1);
        let req = test::TestRequest::post()
            .uri("/v1/query/ask")
            .set_json(serde_json::json!({ "query": "Too long?", "padding": padding }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let resp: AskResponse = test::read_body_json(resp).await;
        assert!(resp.result.contains("Your question: ''"));
    }

    #[actix_web::test]
    async fn ask_with_no_data_explains_in_result() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state_for(dir.path(), Some("ward_name,Priority_Sci\n")));

        let req = test::TestRequest::post()
            .uri("/v1/query/ask")
            .set_json(serde_json::json!({ "query": "Anything?" }))
            .to_request();
        let resp: AskResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.result, NO_DATA);
    }

    #[actix_web::test]
    async fn missing_fallback_is_a_server_error_for_tables_only() {
        let dir = tempfile::tempdir().unwrap();
        let app = app!(state_for(dir.path(), None));

        let req = test::TestRequest::get().uri("/v1/tables/wards/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

        let req = test::TestRequest::post()
            .uri("/v1/query/ask")
            .set_json(serde_json::json!({ "query": "Anything?" }))
            .to_request();
        let resp: AskResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.result, NO_DATA);
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().configure(crate::configure)).await;
        let req = test::TestRequest::get().uri("/v1/health").to_request();
        let health: ApiHealth = test::call_and_read_body_json(&app, req).await;
        assert!(health.healthy);
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
