use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::app_error::AppError;

/// `Json` body whose rejections (bad syntax, wrong field types, missing
/// content type) answer `400 INVALID_INPUT` like every other input error.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError::InvalidInput(rejection.body_text())),
        }
    }
}
