use actix_web::{
    HttpRequest, HttpResponse, delete,
    error::{JsonPayloadError, QueryPayloadError},
    get, post, put,
    web::{self, Path, ServiceConfig},
};
use tracing::{Instrument, instrument};

use crate::{
    api::{
        rest::{MessageResponse, PaginationQuery, TufeAddRequest, TufeResponse, TufeUpdateRequest},
        state::AppState,
    },
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{PaginationInput, TufeAddInputType, TufeUpdateInputType},
        validation::parse_month,
    },
};

/**
 * Registers the endpoints together with the extractor configuration.
 */
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(root)
        .service(tufe_list)
        .service(tufe_add)
        .service(tufe_get)
        .service(tufe_update)
        .service(tufe_delete);
}

/**
 * Liveness endpoint.
 */
#[instrument(level = "info", skip(http_request), fields(service = "root", trace_id = get_trace_id(&http_request)))]
#[get("/")]
pub async fn root(http_request: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse::new("Welcome to the TUFE API"))
}

/**
 * Endpoint to retrieve a page of records ordered by month.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "listTufe", trace_id = get_trace_id(&http_request), result))]
#[get("/tufe")]
pub async fn tufe_list(http_request: HttpRequest, pagination: web::Query<PaginationQuery>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let pagination_input = PaginationInput::from(pagination.into_inner()).validate()?;
    let records = app_state.tufe_service.get_tufe_list(pagination_input).instrument(span).await?;
    let response: Vec<TufeResponse> = records.into_iter().map(TufeResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/**
 * Endpoint to add a new record.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "addTufe", trace_id = get_trace_id(&http_request), result))]
#[post("/tufe")]
pub async fn tufe_add(http_request: HttpRequest, request_body: web::Json<TufeAddRequest>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let tufe_add_input = TufeAddInputType::try_from(request_body.into_inner())?;
    let stored = app_state.tufe_service.add_tufe(tufe_add_input).instrument(span).await?;
    Ok(HttpResponse::Created().json(TufeResponse::from(stored)))
}

/**
 * Endpoint to retrieve the record for a month.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "getTufe", trace_id = get_trace_id(&http_request), result))]
#[get("/tufe/{month}")]
pub async fn tufe_get(path: Path<String>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let month = parse_month(&path.into_inner())?;
    let record = app_state.tufe_service.get_tufe(month).instrument(span).await?;
    Ok(HttpResponse::Ok().json(TufeResponse::from(record)))
}

/**
 * Endpoint to partially update the record for a month.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "updateTufe", trace_id = get_trace_id(&http_request), result))]
#[put("/tufe/{month}")]
pub async fn tufe_update(path: Path<String>, http_request: HttpRequest, request_body: web::Json<TufeUpdateRequest>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let month = parse_month(&path.into_inner())?;
    let tufe_update_input = TufeUpdateInputType::try_from(request_body.into_inner())?;
    let updated = app_state.tufe_service.update_tufe(month, tufe_update_input).instrument(span).await?;
    Ok(HttpResponse::Ok().json(TufeResponse::from(updated)))
}

/**
 * Endpoint to delete the record for a month.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "deleteTufe", trace_id = get_trace_id(&http_request), result))]
#[delete("/tufe/{month}")]
pub async fn tufe_delete(path: Path<String>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let month = parse_month(&path.into_inner())?;
    app_state.tufe_service.delete_tufe(month).instrument(span).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("TUFE record deleted")))
}

/**
 * Maps malformed JSON bodies, including missing fields, to a validation error.
 */
fn json_error_handler(err: JsonPayloadError, _http_request: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Invalid request body: {}", err);
    ApplicationError::new(ErrorType::Validation, format!("Invalid request body: {err}")).into()
}

/**
 * Maps malformed query strings to a validation error.
 */
fn query_error_handler(err: QueryPayloadError, _http_request: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Invalid query string: {}", err);
    ApplicationError::new(ErrorType::Validation, format!("Invalid query string: {err}")).into()
}

/**
 * Retrieves the trace ID from the HTTP request headers.
 * If the trace ID is not present, a new UUID is generated.
 */
fn get_trace_id(http_request: &HttpRequest) -> String {
    http_request.headers().get("X-Trace-ID")
        .and_then(|v| v.to_str().ok().map(std::string::ToString::to_string))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
