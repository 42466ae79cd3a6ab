use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use super::alerts::AlertPublisher;
use super::domain::RequestId;
use super::register::{RequestFilter, StatusFilter};
use super::report::{row_view, ExportOptions};
use super::repository::RequestRepository;
use super::service::{CancellationService, ServiceError};
use super::settings::SystemSettings;
use super::validation::RequestDraft;
use crate::directory::{CompanyId, UserDraft, UserId};
use crate::error::AppError;

type SharedService<R, A> = Arc<CancellationService<R, A>>;

/// Router builder exposing request, report, directory, and settings endpoints.
pub fn cancellation_router<R, A>(service: SharedService<R, A>) -> Router
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/requests",
            post(create_request_handler::<R, A>).get(list_requests_handler::<R, A>),
        )
        .route(
            "/api/v1/requests/:request_id",
            get(get_request_handler::<R, A>)
                .put(update_request_handler::<R, A>)
                .delete(delete_request_handler::<R, A>),
        )
        .route(
            "/api/v1/requests/:request_id/status",
            get(request_status_handler::<R, A>),
        )
        .route("/api/v1/reports/summary", get(report_handler::<R, A>))
        .route("/api/v1/reports/export.csv", get(export_handler::<R, A>))
        .route(
            "/api/v1/settings",
            get(get_settings_handler::<R, A>).put(update_settings_handler::<R, A>),
        )
        .route(
            "/api/v1/companies",
            get(list_companies_handler::<R, A>).post(add_company_handler::<R, A>),
        )
        .route(
            "/api/v1/companies/:company_id",
            delete(remove_company_handler::<R, A>),
        )
        .route(
            "/api/v1/users",
            get(list_users_handler::<R, A>).post(add_user_handler::<R, A>),
        )
        .route(
            "/api/v1/users/:user_id",
            put(update_user_handler::<R, A>).delete(remove_user_handler::<R, A>),
        )
        .route("/api/v1/alerts/sweep", post(sweep_alerts_handler::<R, A>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodayQuery {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RequestListQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) status: StatusFilter,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportQuery {
    #[serde(default)]
    pub(crate) bom: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompanyInput {
    pub(crate) name: String,
}

/// The engine never reads the clock; routes resolve a missing `today` here.
fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) async fn create_request_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Json(draft): Json<RequestDraft>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.register().create(draft) {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn list_requests_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Query(query): Query<RequestListQuery>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    let filter = RequestFilter {
        search: query.search,
        status: query.status,
    };
    let today = resolve_today(query.today);
    let settings = service.settings().snapshot();

    match service.register().list(&filter) {
        Ok(requests) => {
            let rows: Vec<_> = requests
                .iter()
                .map(|request| row_view(request, today, &settings))
                .collect();
            (StatusCode::OK, Json(rows)).into_response()
        }
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn get_request_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.register().get(&RequestId(request_id)) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn update_request_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(request_id): Path<String>,
    Json(draft): Json<RequestDraft>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.register().update(&RequestId(request_id), draft) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn delete_request_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.delete_request(&RequestId(request_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn request_status_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(request_id): Path<String>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    let today = resolve_today(query.today);
    match service.request_status(&RequestId(request_id), today) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn report_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.report(resolve_today(query.today)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Query(query): Query<ExportQuery>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    let mut buffer = Vec::new();
    let options = ExportOptions {
        include_bom: query.bom,
    };

    match service.export(&mut buffer, options) {
        Ok(_) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"cancellation-report.csv\"",
                ),
            ],
            buffer,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_settings_handler<R, A>(
    State(service): State<SharedService<R, A>>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    (StatusCode::OK, Json(service.settings().snapshot())).into_response()
}

pub(crate) async fn update_settings_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Json(settings): Json<SystemSettings>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.settings().update(settings) {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn list_companies_handler<R, A>(
    State(service): State<SharedService<R, A>>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    (StatusCode::OK, Json(service.companies().list())).into_response()
}

pub(crate) async fn add_company_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Json(input): Json<CompanyInput>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    let added_on = resolve_today(None);
    match service.companies().add(&input.name, added_on) {
        Ok(company) => (StatusCode::CREATED, Json(company)).into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn remove_company_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(company_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.companies().remove(&CompanyId(company_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn list_users_handler<R, A>(
    State(service): State<SharedService<R, A>>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    (StatusCode::OK, Json(service.users().list())).into_response()
}

pub(crate) async fn add_user_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Json(draft): Json<UserDraft>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    let added_on = resolve_today(None);
    match service.users().add(draft, added_on) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn update_user_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(user_id): Path<String>,
    Json(draft): Json<UserDraft>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.users().update(&UserId(user_id), draft) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn remove_user_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.users().remove(&UserId(user_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn sweep_alerts_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.sweep_alerts(resolve_today(query.today)) {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ServiceError) -> Response {
    AppError::Service(err).into_response()
}
