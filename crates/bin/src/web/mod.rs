//! Browser form and HTTP API.
//!
//! # Routes
//! - GET /: prediction form
//! - POST /predict: form submission, answered with the re-rendered form
//! - POST /api/predict: JSON feature record, answered with a JSON report
//! - POST /batch: CSV body, answered with the CSV plus predictions
//! - GET /schema: encoding schema as JSON
//! - GET /health: health check

pub(crate) mod form;
pub(crate) mod page;

use hyper::body::HttpBody;
use hyper::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderValue};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use incomeclass::output::DOWNLOAD_FILE_NAME;
use incomeclass::{BatchTable, FeatureRecord, PredictionService, ServiceError};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use form::{FormError, Submission, check_bounds, parse_submission};
use page::Outcome;

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";
const CSV: &str = "text/csv; charset=utf-8";

const ROUTES: [&str; 6] = ["/", "/predict", "/api/predict", "/batch", "/schema", "/health"];

/// Shared by every request.
#[derive(Debug)]
pub(crate) struct AppState {
    pub(crate) service: PredictionService,
    pub(crate) max_upload_bytes: usize,
}

#[derive(Debug, Error)]
enum BodyError {
    #[error("Failed to read request body: {0}")]
    Read(#[from] hyper::Error),

    #[error("Request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Bind the listener and return its address with the server future.
///
/// The server stops accepting connections once `shutdown` completes and
/// finishes after in-flight requests are answered.
pub(crate) fn bind(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<
    (
        SocketAddr,
        impl Future<Output = Result<(), hyper::Error>> + Send,
    ),
    hyper::Error,
> {
    let make_svc = make_service_fn(move |_conn| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(req, Arc::clone(&state))))
        }
    });

    let server = Server::try_bind(&addr)?.serve(make_svc);
    let local_addr = server.local_addr();
    info!("HTTP server listening on http://{}", local_addr);

    Ok((local_addr, server.with_graceful_shutdown(shutdown)))
}

/// Completes on Ctrl+C.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Route one request.
pub(crate) async fn handle(
    req: Request<Body>,
    state: Arc<AppState>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    debug!(%method, %path, "Request");

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/") => index(&state),
        (&Method::POST, "/predict") => predict_form(req, &state).await,
        (&Method::POST, "/api/predict") => predict_json(req, &state).await,
        (&Method::POST, "/batch") => predict_batch(req, &state).await,
        (&Method::GET, "/schema") => schema(&state),
        (&Method::GET, "/health") => respond(StatusCode::OK, JSON, r#"{"status":"ok"}"#),
        (_, route) if ROUTES.contains(&route) => respond(
            StatusCode::METHOD_NOT_ALLOWED,
            TEXT,
            format!("Method {} not allowed for {}", method, route),
        ),
        _ => respond(StatusCode::NOT_FOUND, TEXT, format!("No route for {}", path)),
    };

    Ok(response)
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn json_error(status: StatusCode, message: &str) -> Response<Body> {
    let body = serde_json::json!({ "error": message }).to_string();
    respond(status, JSON, body)
}

const fn error_status(error: &ServiceError) -> StatusCode {
    if error.is_input_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn read_body(body: Body, limit: usize) -> Result<Vec<u8>, BodyError> {
    let mut body = body;
    let mut bytes = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

const fn body_error_status(error: &BodyError) -> StatusCode {
    match error {
        BodyError::Read(_) => StatusCode::BAD_REQUEST,
        BodyError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
    }
}

fn index(state: &AppState) -> Response<Body> {
    let html = page::render(
        state.service.schema(),
        &FeatureRecord::default(),
        Outcome::Empty,
    );
    respond(StatusCode::OK, HTML, html)
}

async fn predict_form(req: Request<Body>, state: &AppState) -> Response<Body> {
    let schema = state.service.schema();
    let body = match read_body(req.into_body(), state.max_upload_bytes).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Rejected form body: {}", e);
            let problems = [e.to_string()];
            let html = page::render(schema, &FeatureRecord::default(), Outcome::Problems(&problems));
            return respond(body_error_status(&e), HTML, html);
        }
    };

    let Submission { record, problems } = match parse_submission(&body) {
        Ok(submission) => submission,
        Err(e @ FormError::Decode(_)) => Submission {
            record: FeatureRecord::default(),
            problems: vec![e.to_string()],
        },
    };
    if !problems.is_empty() {
        let html = page::render(schema, &record, Outcome::Problems(&problems));
        return respond(StatusCode::BAD_REQUEST, HTML, html);
    }

    match state.service.predict(&record) {
        Ok(prediction) => {
            info!(prediction = %prediction.bracket, "Form prediction");
            let html = page::render(schema, &record, Outcome::Prediction(&prediction));
            respond(StatusCode::OK, HTML, html)
        }
        Err(e) => {
            warn!("Form prediction failed: {}", e);
            let problems = [e.to_string()];
            let html = page::render(schema, &record, Outcome::Problems(&problems));
            respond(error_status(&e), HTML, html)
        }
    }
}

async fn predict_json(req: Request<Body>, state: &AppState) -> Response<Body> {
    let body = match read_body(req.into_body(), state.max_upload_bytes).await {
        Ok(body) => body,
        Err(e) => return json_error(body_error_status(&e), &e.to_string()),
    };

    let record: FeatureRecord = match serde_json::from_slice(&body) {
        Ok(record) => record,
        Err(e) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                &format!("Invalid feature record: {}", e),
            );
        }
    };

    let problems = check_bounds(&record);
    if !problems.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, &problems.join("; "));
    }

    let report = match state.service.report(record) {
        Ok(report) => report,
        Err(e) => {
            warn!("API prediction failed: {}", e);
            return json_error(error_status(&e), &e.to_string());
        }
    };

    match serde_json::to_string(&report) {
        Ok(json) => respond(StatusCode::OK, JSON, json),
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

async fn predict_batch(req: Request<Body>, state: &AppState) -> Response<Body> {
    let body = match read_body(req.into_body(), state.max_upload_bytes).await {
        Ok(body) => body,
        Err(e) => return respond(body_error_status(&e), TEXT, e.to_string()),
    };

    let result = BatchTable::from_reader(body.as_slice())
        .map_err(ServiceError::from)
        .and_then(|table| state.service.predict_table(table))
        .and_then(|predicted| predicted.to_csv_bytes().map_err(ServiceError::from));

    match result {
        Ok(csv) => {
            let mut response = respond(StatusCode::OK, CSV, csv);
            let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME);
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                response.headers_mut().insert(CONTENT_DISPOSITION, value);
            }
            response
        }
        Err(e) => {
            warn!("Batch prediction failed: {}", e);
            respond(error_status(&e), TEXT, e.to_string())
        }
    }
}

fn schema(state: &AppState) -> Response<Body> {
    match state.service.schema().to_json() {
        Ok(json) => respond(StatusCode::OK, JSON, json),
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incomeclass::{ServiceConfig, UnknownLabelPolicy};
    use rstest::{fixture, rstest};
    use std::path::PathBuf;

    fn demo(file: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos")
            .join(file)
    }

    #[fixture]
    fn state() -> Arc<AppState> {
        let config = ServiceConfig {
            model_path: demo("best_model.json"),
            schema_path: Some(demo("encoding_schema.json")),
            unknown_labels: UnknownLabelPolicy::Reject,
        };
        Arc::new(AppState {
            service: PredictionService::load(&config).unwrap(),
            max_upload_bytes: 64 * 1024,
        })
    }

    async fn send(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, Response<Body>) {
        let response = handle(req, state).await.unwrap();
        (response.status(), response)
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post(path: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap()
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn test_health(state: Arc<AppState>) {
        let (status, response) = send(state, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }

    #[rstest]
    #[tokio::test]
    async fn test_form_page(state: Arc<AppState>) {
        let (status, response) = send(state, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], HTML);
        let html = body_text(response).await;
        assert!(html.contains("<form method=\"post\" action=\"/predict\">"));
        assert!(html.contains("<option value=\"Tech-support\" selected>"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_form_prediction(state: Arc<AppState>) {
        let body = "age=52&workclass=Private&fnlwgt=200000&educational-num=16\
            &marital-status=Married-civ-spouse&occupation=Exec-managerial&relationship=Husband\
            &race=White&gender=Male&capital-gain=15024&capital-loss=0&hours-per-week=60\
            &native-country=United-States";
        let req = post("/predict", "application/x-www-form-urlencoded", body);

        let (status, response) = send(state, req).await;

        assert_eq!(status, StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Prediction: <strong>&gt;50K</strong>"));
        assert!(html.contains("value=\"200000\""));
    }

    #[rstest]
    #[tokio::test]
    async fn test_form_inline_error(state: Arc<AppState>) {
        let req = post("/predict", "application/x-www-form-urlencoded", "age=12");
        let (status, response) = send(state, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Age must be between 18 and 65, got 12"));
        assert!(!html.contains("id=\"prediction\""));
    }

    #[rstest]
    #[tokio::test]
    async fn test_form_unknown_label(state: Arc<AppState>) {
        let req = post(
            "/predict",
            "application/x-www-form-urlencoded",
            "workclass=Freelance",
        );
        let (status, response) = send(state, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Unknown workclass label &#39;Freelance&#39;"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_api_predict(state: Arc<AppState>) {
        let record = serde_json::to_string(&FeatureRecord::default()).unwrap();
        let (status, response) = send(state, post("/api/predict", JSON, record)).await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value["input"]["workclass"], "Private");
        assert_eq!(value["encoded"]["workclass"], 4);
        assert!(value["prediction"] == "<=50K" || value["prediction"] == ">50K");
    }

    #[rstest]
    #[tokio::test]
    async fn test_api_rejects_bad_json(state: Arc<AppState>) {
        let (status, response) = send(state, post("/api/predict", JSON, "{\"age\": 30}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(value["error"].as_str().unwrap().starts_with("Invalid feature record"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_batch_download(state: Arc<AppState>) {
        let csv = std::fs::read_to_string(demo("employees.csv")).unwrap();
        let (status, response) = send(state, post("/batch", "text/csv", csv.clone())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"predicted_classes.csv\""
        );
        let output = body_text(response).await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), csv.lines().count());
        assert!(lines[0].ends_with(",PredictedClass"));
        assert!(lines[2].ends_with(",>50K"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_batch_schema_mismatch(state: Arc<AppState>) {
        let csv = "age,job\n30,Sales\n";
        let (status, response) = send(state, post("/batch", "text/csv", csv)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("workclass"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_upload_limit(state: Arc<AppState>) {
        let body = vec![b'a'; 64 * 1024 + 1];
        let (status, _) = send(state, post("/batch", "text/csv", body)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[rstest]
    #[tokio::test]
    async fn test_schema_route(state: Arc<AppState>) {
        let (status, response) = send(state, get("/schema")).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value["version"], 1);
    }

    #[rstest]
    #[case::unknown_path(Method::GET, "/missing", StatusCode::NOT_FOUND)]
    #[case::wrong_method(Method::GET, "/predict", StatusCode::METHOD_NOT_ALLOWED)]
    #[case::post_to_health(Method::POST, "/health", StatusCode::METHOD_NOT_ALLOWED)]
    #[tokio::test]
    async fn test_routing_errors(
        state: Arc<AppState>,
        #[case] method: Method,
        #[case] path: &str,
        #[case] expected: StatusCode,
    ) {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(state, req).await;
        assert_eq!(status, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn test_server_round_trip(state: Arc<AppState>) {
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (local_addr, server) = bind(addr, state, async move {
            shutdown_rx.await.ok();
        })
        .unwrap();
        let task = tokio::spawn(server);

        let client = hyper::Client::new();
        let uri = format!("http://{}/health", local_addr).parse().unwrap();
        let response = client.get(uri).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap().unwrap();
    }
}
