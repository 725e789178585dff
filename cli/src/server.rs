use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, Request, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use tally_core::error::TrackerError;
use tally_core::models::{
    Activity, CalorieGoal, DailySummary, FoodLogEntry, NewActivity, WaterDay, WaterEntry,
    parse_date,
};
use tally_core::service::Tracker;

const BODY_LIMIT: usize = 50 * 1024 * 1024; // 50 MB

const DEFAULT_GOAL: i64 = 2000;

#[derive(Clone)]
struct AppState {
    tracker: Arc<Mutex<Tracker>>,
    api_key: Option<String>,
}

impl AppState {
    fn tracker(&self) -> MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct AddFoodRequest {
    name: String,
    quantity: f64,
    date: Option<String>,
}

#[derive(Serialize)]
struct AddFoodResponse {
    message: String,
    calories: f64,
}

#[derive(Deserialize)]
struct DateQuery {
    date: Option<String>,
}

#[derive(Serialize)]
struct FoodsResponse {
    foods: Vec<FoodLogEntry>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct ClearResponse {
    message: &'static str,
    deleted: usize,
}

fn default_goal() -> i64 {
    DEFAULT_GOAL
}

#[derive(Deserialize)]
struct SetGoalRequest {
    #[serde(default = "default_goal")]
    goal: i64,
    date: String,
}

#[derive(Deserialize)]
struct CreateActivityRequest {
    activity_name: String,
    #[serde(default, alias = "duration_minutes")]
    duration: i64,
    #[serde(default)]
    calories_burned: i64,
    date: String,
}

#[derive(Serialize)]
struct TotalBurnedResponse {
    date: NaiveDate,
    total_burned: i64,
}

#[derive(Deserialize)]
struct AddWaterRequest {
    amount_ml: i64,
    date: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

// --- Error handling ---

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            Self::Internal(err) => {
                tracing::error!(error = %format!("{err:#}"), "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { detail: message })).into_response()
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::NotFound(msg) => Self::NotFound(msg),
            TrackerError::InvalidInput(msg) => Self::BadRequest(msg),
            TrackerError::Storage(err) => Self::Internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

fn parse_optional_date(date: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    Ok(date.map(parse_date).transpose()?)
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    detail: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

// --- Handlers ---

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the tally calorie tracker API".to_string(),
    })
}

async fn add_food(
    State(state): State<AppState>,
    payload: Result<Json<AddFoodRequest>, JsonRejection>,
) -> Result<Json<AddFoodResponse>, ApiError> {
    let Json(req) = payload?;
    let date = parse_optional_date(req.date.as_deref())?;
    let (entry, message) = state.tracker().add_food(&req.name, req.quantity, date)?;
    Ok(Json(AddFoodResponse {
        message,
        calories: entry.calories,
    }))
}

async fn list_foods(
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> Result<Json<FoodsResponse>, ApiError> {
    let date = parse_optional_date(params.date.as_deref())?;
    let foods = state.tracker().list_foods(date)?;
    Ok(Json(FoodsResponse { foods }))
}

async fn foods_by_date(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<FoodsResponse>, ApiError> {
    let date = parse_date(&date_str)?;
    let foods = state.tracker().list_foods(Some(date))?;
    Ok(Json(FoodsResponse { foods }))
}

async fn clear_foods(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    let deleted = state.tracker().clear_foods()?;
    Ok(Json(ClearResponse {
        message: "All foods cleared!",
        deleted,
    }))
}

async fn delete_food(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    state.tracker().delete_food(id)?;
    Ok(Json(MessageResponse {
        message: format!("Food with ID {id} deleted."),
    }))
}

async fn food_suggestions(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(state.tracker().food_suggestions())
}

async fn set_goal(
    State(state): State<AppState>,
    payload: Result<Json<SetGoalRequest>, JsonRejection>,
) -> Result<Json<CalorieGoal>, ApiError> {
    let Json(req) = payload?;
    let date = parse_date(&req.date)?;
    let goal = state.tracker().set_goal(date, req.goal)?;
    Ok(Json(goal))
}

async fn get_goal(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<CalorieGoal>, ApiError> {
    let date = parse_date(&date_str)?;
    let goal = state.tracker().get_goal(date)?;
    Ok(Json(goal))
}

async fn create_activity(
    State(state): State<AppState>,
    payload: Result<Json<CreateActivityRequest>, JsonRejection>,
) -> Result<Json<Activity>, ApiError> {
    let Json(req) = payload?;
    let activity = NewActivity {
        activity_name: req.activity_name,
        duration_minutes: req.duration,
        calories_burned: req.calories_burned,
        date: parse_date(&req.date)?,
    };
    let created = state.tracker().add_activity(&activity)?;
    Ok(Json(created))
}

async fn list_activities(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let date = parse_date(&date_str)?;
    let activities = state.tracker().activities_for_date(date)?;
    Ok(Json(activities))
}

async fn total_burned(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<TotalBurnedResponse>, ApiError> {
    let date = parse_date(&date_str)?;
    let total_burned = state.tracker().total_burned(date)?;
    Ok(Json(TotalBurnedResponse { date, total_burned }))
}

async fn add_water(
    State(state): State<AppState>,
    payload: Result<Json<AddWaterRequest>, JsonRejection>,
) -> Result<Json<WaterEntry>, ApiError> {
    let Json(req) = payload?;
    let date = parse_optional_date(req.date.as_deref())?;
    let entry = state.tracker().add_water(req.amount_ml, date)?;
    Ok(Json(entry))
}

async fn get_water(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<WaterDay>, ApiError> {
    let date = parse_date(&date_str)?;
    let water = state.tracker().water_for_date(date)?;
    Ok(Json(water))
}

async fn get_summary(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = parse_date(&date_str)?;
    let summary = state.tracker().daily_summary(date)?;
    Ok(Json(summary))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/add_food", post(add_food))
        .route("/foods", get(list_foods).delete(clear_foods))
        .route("/foods_by_date/{date}", get(foods_by_date))
        .route("/food/{id}", delete(delete_food))
        .route("/food_suggestions", get(food_suggestions))
        .route("/calorie_goal/", post(set_goal))
        .route("/calorie_goal/{date}", get(get_goal))
        .route("/activity/", post(create_activity))
        .route("/activities/{date}", get(list_activities))
        .route("/activities/{date}/total_burned", get(total_burned))
        .route("/water", post(add_water))
        .route("/water/{date}", get(get_water))
        .route("/summary/{date}", get(get_summary))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

// --- Server startup ---

/// First and last four characters of the key, or a mask when it is too short
/// to shorten.
fn key_preview(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub async fn start_server(
    tracker: Tracker,
    port: u16,
    bind: &str,
    api_key: Option<String>,
    new_api_key: bool,
) -> anyhow::Result<()> {
    let state = AppState {
        tracker: Arc::new(Mutex::new(tracker)),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        if new_api_key {
            eprintln!("Generated API key: {key}");
            eprintln!("Send it as 'Authorization: Bearer <key>'. It is also saved in the api_key file.");
        } else {
            eprintln!(
                "API key: {} (see api_key file in data directory)",
                key_preview(key)
            );
        }
    } else {
        tracing::warn!("authentication disabled (--no-auth), API is open to anyone");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        tracing::warn!(
            bind,
            "listening on a non-loopback address with no authentication"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    tracing::info!("listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
