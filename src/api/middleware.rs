use actix_web::{body::MessageBody, dev::{ServiceRequest, ServiceResponse}, middleware::Next, Error};
use tracing::info;

/**
 * Middleware logging method, path, status and duration of every request.
 */
pub async fn timing_middleware(
    request: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let start_time = std::time::Instant::now();
    let path = request.path().to_owned();
    let method = request.method().to_string();
    let response = next.call(request).await;
    let status = response.as_ref().map_or(500, |service_response| service_response.status().as_u16());
    info!(target: "performance", method = %method, path = %path, status, elapsed = ?start_time.elapsed(), "Request processed");
    response
}
