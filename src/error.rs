use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not read submission: {0}")]
    Decode(String),

    #[error("screenshot is larger than {limit} bytes")]
    ScreenshotTooLarge { limit: usize },

    #[error("could not compose email: {0}")]
    Compose(String),

    #[error("could not send email: {0}")]
    Delivery(String),

    #[error("could not render template: {0}")]
    Render(#[from] minijinja::Error),

    #[error("page '{0}' not found")]
    PageNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A `302 Found` pointing at `location`
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // The submitter only ever sees the generic error page
            AppError::Decode(_)
            | AppError::ScreenshotTooLarge { .. }
            | AppError::Compose(_)
            | AppError::Delivery(_) => found("/error"),
            AppError::PageNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string()).into_response()
            }
            AppError::Render(_) | AppError::Io(_) | AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
