//! HTTP route handlers.

use std::convert::Infallible;

use askama::Template;
use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Response},
    routing::{get, patch},
};
use tower_http::services::ServeDir;
use tracing::{debug, error, warn};

use crate::domain::{AuthState, GeoPoint, InvalidCoordinate, NewStop, Stop, StopFormErrors, StopId};
use crate::geocode::GeocodeError;
use crate::journal::JournalError;
use crate::route::distance_between;
use crate::supabase::SupabaseError;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Cookie holding the session token for page loads.
pub const SESSION_COOKIE: &str = "journey_token";

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/stops", get(list_stops).post(add_stop))
        .route("/api/stops/:id", patch(edit_stop).delete(delete_stop))
        .route("/api/geocode", get(geocode))
        .route("/api/distance", get(distance))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Session from the `Authorization` header, falling back to the
/// session cookie. Never rejects; handlers decide what needs a session.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(auth_from_headers(&parts.headers))
    }
}

fn auth_from_headers(headers: &HeaderMap) -> AuthState {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        return AuthState::from_bearer(value.to_str().ok());
    }

    match session_cookie(headers) {
        Some(token) => AuthState::from_bearer(Some(&format!("Bearer {token}"))),
        None => AuthState::Unauthenticated,
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Journal page, or the sign-in page without a session.
async fn index_page(State(state): State<AppState>, auth: AuthState) -> Response {
    if !auth.is_authenticated() {
        return sign_in_page(&state);
    }

    match state.journal.list_stops(&auth).await {
        Ok(stops) => html_page(StatusCode::OK, &IndexTemplate::from_stops(&stops)),
        Err(JournalError::Unauthenticated | JournalError::Store(SupabaseError::Unauthorized)) => {
            sign_in_page(&state)
        }
        Err(e) => error_page(AppError::from(e)),
    }
}

fn sign_in_page(state: &AppState) -> Response {
    let template = SignInTemplate {
        supabase_url: state.sign_in.as_ref().map(|c| c.url.clone()),
        anon_key: state.sign_in.as_ref().map(|c| c.anon_key.clone()),
    };
    html_page(StatusCode::OK, &template)
}

fn html_page(status: StatusCode, template: &impl Template) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {e}")).into_response()
        }
    }
}

fn error_page(err: AppError) -> Response {
    let status = err.status();
    err.log(status);

    let template = ErrorTemplate {
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        message: err.message(),
        details: None,
    };
    html_page(status, &template)
}

/// All stops in route order, with the total distance and map data.
async fn list_stops(
    State(state): State<AppState>,
    auth: AuthState,
) -> Result<Json<StopsResponse>, AppError> {
    let stops = state.journal.list_stops(&auth).await?;
    Ok(Json(StopsResponse::from_stops(stops)))
}

/// Add a stop. Without coordinates the location is geocoded.
async fn add_stop(
    State(state): State<AppState>,
    auth: AuthState,
    body: Result<Json<NewStop>, JsonRejection>,
) -> Result<(StatusCode, Json<Stop>), AppError> {
    if !auth.is_authenticated() {
        return Err(AppError::Unauthorized);
    }

    let Json(form) = body?;
    let stop = form.validate().map_err(AppError::invalid_form)?;

    let point = match stop.point {
        Some(point) => point,
        None => state
            .geocoder
            .resolve(&stop.location)
            .await?
            .map(|s| s.point)
            .ok_or_else(|| {
                AppError::invalid_form(StopFormErrors {
                    location: Some("Could not find location"),
                    ..Default::default()
                })
            })?,
    };

    let created = state.journal.add_stop(&auth, stop, point).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Change a stop's date or description.
async fn edit_stop(
    State(state): State<AppState>,
    auth: AuthState,
    Path(id): Path<String>,
    body: Result<Json<EditStopRequest>, JsonRejection>,
) -> Result<Json<Stop>, AppError> {
    if !auth.is_authenticated() {
        return Err(AppError::Unauthorized);
    }

    let Json(req) = body?;
    let edit = req.validate().map_err(AppError::invalid_form)?;
    let stop = state.journal.edit_stop(&auth, &StopId::new(id), edit).await?;
    Ok(Json(stop))
}

/// Delete a stop.
async fn delete_stop(
    State(state): State<AppState>,
    auth: AuthState,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let outcome = state.journal.delete_stop(&auth, &StopId::new(id)).await?;
    debug!(location_removed = outcome.location_removed, "delete complete");
    Ok(StatusCode::NO_CONTENT)
}

/// Place autocomplete.
async fn geocode(
    State(state): State<AppState>,
    auth: AuthState,
    Query(req): Query<GeocodeRequest>,
) -> Result<Json<GeocodeResponse>, AppError> {
    if !auth.is_authenticated() {
        return Err(AppError::Unauthorized);
    }

    let suggestions = state.geocoder.search(&req.q).await?;
    Ok(Json(GeocodeResponse {
        suggestions: suggestions.as_ref().clone(),
    }))
}

/// Great-circle distance between two `lat,lng` points.
async fn distance(Query(req): Query<DistanceRequest>) -> Result<Json<DistanceResponse>, AppError> {
    let from = GeoPoint::parse_pair(&req.from)?;
    let to = GeoPoint::parse_pair(&req.to)?;
    Ok(Json(DistanceResponse {
        km: distance_between(from, to),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unauthorized,
    NotFound { message: String },
    Unprocessable { message: String, fields: Option<StopFormErrors> },
    /// Store or geocoder unreachable or failing
    Upstream { message: String },
    Internal { message: String },
}

impl AppError {
    fn invalid_form(fields: StopFormErrors) -> Self {
        AppError::Unprocessable {
            message: "Please correct the highlighted fields".to_string(),
            fields: Some(fields),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Unauthorized => "Please sign in".to_string(),
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Unprocessable { message, .. }
            | AppError::Upstream { message }
            | AppError::Internal { message } => message.clone(),
        }
    }

    fn log(&self, status: StatusCode) {
        let message = self.message();
        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }
    }
}

impl From<JournalError> for AppError {
    fn from(e: JournalError) -> Self {
        match e {
            JournalError::Unauthenticated => AppError::Unauthorized,
            JournalError::NotFound(id) => AppError::NotFound {
                message: format!("Stop {id} not found"),
            },
            JournalError::Store(e) => AppError::from(e),
        }
    }
}

impl From<SupabaseError> for AppError {
    fn from(e: SupabaseError) -> Self {
        match e {
            SupabaseError::Unauthorized => AppError::Unauthorized,
            SupabaseError::NotFound(message) => AppError::NotFound { message },
            e @ (SupabaseError::Http(_) | SupabaseError::Api { .. }) => AppError::Upstream {
                message: e.to_string(),
            },
            e => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<GeocodeError> for AppError {
    fn from(e: GeocodeError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
        }
    }
}

impl From<InvalidCoordinate> for AppError {
    fn from(e: InvalidCoordinate) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        self.log(status);

        let error = self.message();
        let fields = match self {
            AppError::Unprocessable { fields, .. } => fields,
            _ => None,
        };

        (status, Json(ErrorResponse { error, fields })).into_response()
    }
}
