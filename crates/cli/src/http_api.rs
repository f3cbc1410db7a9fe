use crate::server_security::bearer_token;
use axum::{
    async_trait,
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE},
        request::Parts,
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use mindverse_guidance::{GuidanceError, GuidanceRequest, GuidanceService};
use mindverse_protocol::{ApiResponse, FieldError, Validator, API_VERSION};
use mindverse_store::{
    GuidanceSummary, Language, NewUser, SavedGuidance, Store, StoreError, UiTheme, WisdomFilter,
    WisdomSource, WisdomView, NAME_MAX_CHARS, PASSWORD_MIN_CHARS,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use uuid::Uuid;

const DEFAULT_HISTORY_LIMIT: usize = 10;
const MAX_PAGE_LIMIT: usize = 100;
const DEFAULT_WISDOM_LIMIT: usize = 20;
const KARMA_HISTORY_LIMIT: usize = 20;

#[derive(Clone)]
pub(crate) struct AppState {
    service: Arc<GuidanceService>,
}

impl AppState {
    pub(crate) fn new(service: GuidanceService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    fn store(&self) -> &Store {
        self.service.store()
    }
}

pub(crate) fn router(state: AppState, cors_origin: Option<&str>) -> anyhow::Result<Router> {
    let origin = match cors_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin)
                .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {origin}"))?,
        ),
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Ok(Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/guidance/analyze", post(analyze))
        .route("/api/guidance/history", get(history))
        .route("/api/guidance/daily-affirmation", get(daily_affirmation))
        .route("/api/guidance/stats", get(stats))
        .route("/api/guidance/:id", get(guidance_by_id))
        .route("/api/guidance/:id/save", post(save).delete(unsave))
        .route("/api/guidance/:id/rate", post(rate))
        .route("/api/wisdom", get(list_wisdom))
        .route("/api/wisdom/:id", get(wisdom_by_id))
        .route("/api/user/profile", get(profile))
        .route("/api/user/preferences", put(update_preferences))
        .route("/api/user/karma", get(karma))
        .route("/api/user/saved", get(saved))
        .fallback(route_not_found)
        .layer(cors)
        .with_state(state))
}

// ---- errors ---------------------------------------------------------------

#[derive(Debug)]
pub(crate) enum ApiError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    Unauthorized(&'static str),
    InsufficientKarma {
        message: &'static str,
        required: u32,
        current: u32,
        with_shortfall: bool,
    },
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<GuidanceError> for ApiError {
    fn from(err: GuidanceError) -> Self {
        match err {
            GuidanceError::Validation(errors) => Self::Validation(errors),
            GuidanceError::NotFound(message) => Self::NotFound(message),
            GuidanceError::InsufficientKarma { required, current } => Self::InsufficientKarma {
                message: "Insufficient karma balance",
                required,
                current,
                with_shortfall: true,
            },
            GuidanceError::NoAffirmations => {
                Self::NotFound("No daily affirmations available".to_string())
            }
            GuidanceError::Store(StoreError::Conflict(message)) => Self::Conflict(message),
            GuidanceError::Store(StoreError::NotFound(message)) => Self::NotFound(message),
            GuidanceError::Store(other) => Self::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        GuidanceError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid JSON request: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::BadRequest("Invalid id".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::validation_failed(errors)),
            )
                .into_response(),
            Self::BadRequest(message) => failure(StatusCode::BAD_REQUEST, message),
            Self::Unauthorized(message) => {
                let mut response = failure(StatusCode::UNAUTHORIZED, message);
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            Self::InsufficientKarma {
                message,
                required,
                current,
                with_shortfall,
            } => {
                let mut body = json!({
                    "success": false,
                    "message": message,
                    "requiredKarma": required,
                    "currentKarma": current,
                });
                if with_shortfall {
                    body["shortfall"] = json!(required.saturating_sub(current));
                }
                (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
            }
            Self::NotFound(message) => failure(StatusCode::NOT_FOUND, message),
            Self::Conflict(message) => failure(StatusCode::CONFLICT, message),
            Self::Internal(detail) => {
                log::error!("Request failed: {detail}");
                failure(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::failure(message))).into_response()
}

type ApiResult<T> = Result<T, ApiError>;

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

fn ok_with_message<T: Serialize>(message: &str, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok_with_message(message, data))
}

fn message(message: &str) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::message(message))
}

// ---- auth -----------------------------------------------------------------

/// Caller identified by a `Bearer` session token.
pub(crate) struct AuthUser {
    user_id: Uuid,
    token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized("No token, authorization denied"))?;
        let user_id = state
            .store()
            .session_user(token, Utc::now())
            .await
            .ok_or(ApiError::Unauthorized("Token is not valid"))?;
        Ok(Self {
            user_id,
            token: token.to_string(),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct LoginBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "MindVerse API is running",
        "timestamp": Utc::now(),
        "version": API_VERSION,
    }))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let name_message = |label: &str| {
        format!("{label} is required and must be less than {NAME_MAX_CHARS} characters")
    };
    Validator::new()
        .length("firstName", &body.first_name, 1, NAME_MAX_CHARS, &name_message("First name"))
        .length("lastName", &body.last_name, 1, NAME_MAX_CHARS, &name_message("Last name"))
        .email("email", &body.email)
        .check(
            body.password.chars().count() >= PASSWORD_MIN_CHARS,
            "password",
            "Password must be at least 8 characters",
        )
        .finish()
        .map_err(ApiError::Validation)?;

    let now = Utc::now();
    let user = state
        .store()
        .create_user(
            NewUser {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                password: body.password,
            },
            now,
        )
        .await?;
    let token = state.store().create_session(user.id, now).await?;

    Ok((
        StatusCode::CREATED,
        ok_with_message(
            "User registered successfully",
            json!({ "token": token, "user": user.profile() }),
        ),
    ))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    Validator::new()
        .email("email", &body.email)
        .check(!body.password.is_empty(), "password", "Password is required")
        .finish()
        .map_err(ApiError::Validation)?;

    let user = state
        .store()
        .user_by_email(&body.email)
        .await
        .filter(|u| u.is_active && u.check_password(&body.password))
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;
    let token = state.store().create_session(user.id, Utc::now()).await?;
    let user = state.store().user(user.id).await?;

    Ok(ok_with_message(
        "Login successful",
        json!({ "token": token, "user": user.profile() }),
    ))
}

async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    state.store().revoke_session(&auth.token).await?;
    Ok(message("Logged out successfully"))
}

// ---- guidance -------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBody {
    #[serde(default)]
    problem_text: String,
    #[serde(default)]
    selected_books: Vec<String>,
    #[serde(default)]
    emotions: Vec<String>,
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SaveBody {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    personal_notes: String,
}

#[derive(Deserialize)]
struct RateBody {
    rating: Option<i64>,
    feedback: Option<String>,
}

async fn analyze(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<AnalyzeBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let selected_books = parse_books(&body.selected_books)?;
    let receipt = state
        .service
        .request_guidance(GuidanceRequest {
            user_id: auth.user_id,
            problem_text: body.problem_text,
            selected_books,
            emotions: body.emotions,
        })
        .await?;
    Ok(ok_with_message("Guidance generated successfully", receipt))
}

fn parse_books(raw: &[String]) -> ApiResult<Vec<WisdomSource>> {
    raw.iter()
        .map(|name| {
            WisdomSource::parse(name).ok_or_else(|| {
                ApiError::Validation(vec![FieldError::new(
                    "selectedBooks",
                    format!("Unknown wisdom text: {name}"),
                )])
            })
        })
        .collect()
}

async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_PAGE_LIMIT);
    Ok(ok(state
        .store()
        .guidance_history(auth.user_id, page, limit)
        .await))
}

async fn daily_affirmation(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let affirmation = state
        .service
        .daily_affirmation(auth.user_id, today)
        .await
        .map_err(|err| match err {
            GuidanceError::InsufficientKarma { required, current } => {
                ApiError::InsufficientKarma {
                    message: "Insufficient karma for daily affirmation",
                    required,
                    current,
                    with_shortfall: false,
                }
            }
            other => other.into(),
        })?;
    Ok(ok(affirmation))
}

async fn stats(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(ok(state
        .service
        .guidance_stats(auth.user_id, Utc::now())
        .await?))
}

async fn guidance_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    Ok(ok(state.service.guidance(auth.user_id, id).await?))
}

async fn save(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    raw: Bytes,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let body = parse_save_body(&raw)?;
    state
        .service
        .save_guidance(auth.user_id, id, body.tags, body.personal_notes)
        .await?;
    Ok(message("Guidance saved successfully"))
}

/// An absent body saves with no tags or notes; anything else must be a
/// well-formed object.
fn parse_save_body(raw: &[u8]) -> ApiResult<SaveBody> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(SaveBody::default());
    }
    let value: Value = serde_json::from_slice(raw)
        .map_err(|err| ApiError::BadRequest(format!("Invalid JSON request: {err}")))?;
    let tags_ok = value
        .get("tags")
        .map_or(true, |tags| tags.as_array().is_some_and(|t| t.iter().all(Value::is_string)));
    let notes_ok = value
        .get("personalNotes")
        .map_or(true, Value::is_string);
    Validator::new()
        .check(value.is_object(), "body", "Request body must be a JSON object")
        .check(tags_ok, "tags", "Tags must be an array")
        .check(notes_ok, "personalNotes", "Personal notes must be a string")
        .finish()
        .map_err(ApiError::Validation)?;
    serde_json::from_value(value)
        .map_err(|err| ApiError::BadRequest(format!("Invalid JSON request: {err}")))
}

async fn unsave(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    state.service.unsave_guidance(auth.user_id, id).await?;
    Ok(message("Guidance removed from saved collection"))
}

async fn rate(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RateBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let Json(body) = payload?;
    state
        .service
        .rate_guidance(auth.user_id, id, body.rating.unwrap_or(0), body.feedback)
        .await?;
    Ok(message("Rating submitted successfully"))
}

// ---- wisdom ---------------------------------------------------------------

#[derive(Deserialize)]
struct WisdomQueryParams {
    source: Option<String>,
    theme: Option<String>,
    emotion: Option<String>,
    category: Option<String>,
    limit: Option<usize>,
}

async fn list_wisdom(
    State(state): State<AppState>,
    query: Result<Query<WisdomQueryParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(params) = query?;
    let source = match params.source.as_deref() {
        Some(raw) => Some(WisdomSource::parse(raw).ok_or_else(|| {
            ApiError::Validation(vec![FieldError::new(
                "source",
                format!("Unknown wisdom text: {raw}"),
            )])
        })?),
        None => None,
    };
    let filter = WisdomFilter {
        source,
        theme: params.theme,
        emotion: params.emotion,
        category: params.category,
    };
    let limit = params
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_WISDOM_LIMIT)
        .min(MAX_PAGE_LIMIT);
    let texts: Vec<WisdomView> = state
        .store()
        .list_wisdom(&filter, limit)
        .await
        .into_iter()
        .map(WisdomView::from)
        .collect();
    Ok(ok(json!({ "count": texts.len(), "wisdomTexts": texts })))
}

async fn wisdom_by_id(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let text = state
        .store()
        .wisdom(id)
        .await
        .map_err(|_| ApiError::NotFound("Wisdom text not found".to_string()))?;
    Ok(ok(WisdomView::from(text)))
}

// ---- user -----------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesBody {
    language: Option<Language>,
    preferred_wisdom_texts: Option<Vec<String>>,
    theme: Option<UiTheme>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedEntry {
    #[serde(flatten)]
    saved: SavedGuidance,
    guidance: Option<GuidanceSummary>,
}

async fn profile(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let user = state.store().user(auth.user_id).await?;
    Ok(ok(user.profile()))
}

async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<PreferencesBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let preferred = body
        .preferred_wisdom_texts
        .as_deref()
        .map(parse_books)
        .transpose()?;
    let now = Utc::now();
    let preferences = state
        .store()
        .update_user(auth.user_id, |user| {
            if let Some(language) = body.language {
                user.preferences.language = language;
            }
            if let Some(preferred) = preferred {
                user.preferences.preferred_wisdom_texts = preferred;
            }
            if let Some(theme) = body.theme {
                user.preferences.theme = theme;
            }
            user.updated_at = now;
            Ok(user.preferences.clone())
        })
        .await?;
    Ok(ok_with_message("Preferences updated successfully", preferences))
}

async fn karma(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let user = state.store().user(auth.user_id).await?;
    let transactions: Vec<_> = user
        .karma_transactions
        .iter()
        .rev()
        .take(KARMA_HISTORY_LIMIT)
        .collect();
    Ok(ok(json!({
        "karmaBalance": user.karma_balance,
        "totalKarmaEarned": user.total_karma_earned,
        "totalKarmaSpent": user.total_karma_spent,
        "transactions": transactions,
    })))
}

async fn saved(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let user = state.store().user(auth.user_id).await?;
    let ids: Vec<Uuid> = user.saved_guidance.iter().map(|s| s.guidance_id).collect();
    let guidance = state.store().guidance_many(auth.user_id, &ids).await;
    let entries: Vec<SavedEntry> = user
        .saved_guidance
        .into_iter()
        .map(|saved| SavedEntry {
            guidance: guidance
                .iter()
                .find(|g| g.id == saved.guidance_id)
                .map(|g| g.summary()),
            saved,
        })
        .collect();
    Ok(ok(entries))
}

async fn route_not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "Route not found")
}
