use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Access denied")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidRequest(_)
            | DomainError::UnknownProduct(_)
            | DomainError::InsufficientStock { .. } => AppError::BadRequest(e.to_string()),
            DomainError::Unauthorized => AppError::Forbidden,
            // The merged variant stays merged: a non-owner gets the same 404
            // as a request for a nonexistent id.
            DomainError::NotFound | DomainError::NotFoundOrUnauthorized => AppError::NotFound,
            DomainError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Forbidden => HttpResponse::Forbidden().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::BadRequest("nope".into()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(
            AppError::Forbidden.error_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            AppError::NotFound.error_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_error_returns_500_and_hides_details() {
        let err = AppError::Internal("connection reset".into());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_request_maps_to_bad_request() {
        let app: AppError = DomainError::InvalidRequest("missing items".into()).into();
        assert!(matches!(app, AppError::BadRequest(_)));
    }

    #[test]
    fn insufficient_stock_maps_to_bad_request_with_product_name() {
        let app: AppError = DomainError::InsufficientStock {
            product: "Latte".into(),
        }
        .into();
        match app {
            AppError::BadRequest(msg) => assert!(msg.contains("Latte")),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn unknown_product_maps_to_bad_request() {
        let app: AppError = DomainError::UnknownProduct(Uuid::new_v4()).into();
        assert!(matches!(app, AppError::BadRequest(_)));
    }

    #[test]
    fn ownership_failures_map_to_the_same_not_found() {
        let merged: AppError = DomainError::NotFoundOrUnauthorized.into();
        let plain: AppError = DomainError::NotFound.into();
        assert!(matches!(merged, AppError::NotFound));
        assert!(matches!(plain, AppError::NotFound));
        assert_eq!(merged.to_string(), plain.to_string());
    }

    #[test]
    fn unauthorized_maps_to_forbidden() {
        let app: AppError = DomainError::Unauthorized.into();
        assert!(matches!(app, AppError::Forbidden));
    }

    #[test]
    fn storage_maps_to_internal() {
        let app: AppError = DomainError::Storage("oops".into()).into();
        assert!(matches!(app, AppError::Internal(_)));
    }
}
