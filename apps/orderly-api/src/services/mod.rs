//! Service layer.
//!
//! Handlers stay thin: they parse input, call a service, and shape the
//! response. Everything with a rule behind it lives here.

pub mod auth_service;
pub mod health_service;
pub mod order_service;

pub use auth_service::AuthService;
pub use health_service::{HealthReport, HealthService};
pub use order_service::OrderService;

use orderly_core::{CoreError, ValidationError};
use orderly_db::DbError;

use crate::error::ApiError;

/// Failure of a service operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Domain(CoreError::Validation(err))
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => e.into(),
            ServiceError::Db(e) => e.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
