use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde_json::json;

use crate::domain::flow::FlowError;
use crate::services::ServiceError;

pub mod admin;
pub mod api;
pub mod kiosk;

fn flow_status(err: &FlowError) -> StatusCode {
    match err {
        FlowError::IllegalTransition { .. } | FlowError::SubmissionInFlight => {
            StatusCode::CONFLICT
        }
        FlowError::EmptyCart
        | FlowError::InvalidDetails(_)
        | FlowError::UnknownProduct(_)
        | FlowError::ProductUnavailable(_)
        | FlowError::UnknownSize { .. }
        | FlowError::UnknownAddon { .. }
        | FlowError::Closed => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Map a service failure to a JSON error response.
///
/// Repository failures are logged under `context` and answered without
/// details.
pub(crate) fn error_response(err: &ServiceError, context: &str) -> HttpResponse {
    let status = match err {
        ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Flow(flow) => flow_status(flow),
        ServiceError::Repository(_) => {
            log::error!("{context}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    HttpResponse::build(status).json(json!({ "error": err.to_string() }))
}
