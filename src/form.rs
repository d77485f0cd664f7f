use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{multipart::Field, Form, FromRequest, Multipart, Query, Request},
    http::header::CONTENT_TYPE,
};

use crate::error::AppError;
use crate::models::{BugReport, Screenshot};
use crate::AppState;

const SCREENSHOT_FIELD: &str = "screenshot";

#[async_trait]
impl FromRequest<Arc<AppState>> for BugReport {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        decode(req, state.config.max_screenshot_size).await
    }
}

/// Collects field values where the first value seen for a name wins
#[derive(Default)]
struct FormFields {
    report: BugReport,
    seen: HashSet<String>,
}

impl FormFields {
    fn set(&mut self, name: &str, value: String) {
        if !self.seen.insert(name.to_string()) {
            return;
        }
        match name {
            "product" => self.report.product = value,
            "category" => self.report.category = value,
            "email" => self.report.email = value,
            "action" => self.report.action = value,
            "context" => self.report.context = value,
            "description" => self.report.description = value,
            _ => {}
        }
    }
}

/// Decode a submission, either multipart or url-encoded.
///
/// Missing text fields are left empty. A missing screenshot is not an error.
/// Body values take precedence over query string values of the same name.
pub async fn decode(req: Request, max_screenshot_size: usize) -> Result<BugReport, AppError> {
    let query = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
        .map(|Query(pairs)| pairs)
        .unwrap_or_default();

    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    let mut fields = FormFields::default();

    if is_multipart {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::Decode(e.to_string()))?;
        read_multipart(multipart, &mut fields, max_screenshot_size).await?;
    } else {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, &())
            .await
            .map_err(|e| AppError::Decode(e.to_string()))?;
        for (name, value) in pairs {
            fields.set(&name, value);
        }
    }

    for (name, value) in query {
        fields.set(&name, value);
    }
    Ok(fields.report)
}

async fn read_multipart(
    mut multipart: Multipart,
    fields: &mut FormFields,
    max_screenshot_size: usize,
) -> Result<(), AppError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Decode(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == SCREENSHOT_FIELD {
            // Browsers send an empty part with no filename when nothing was picked
            let Some(filename) = field
                .file_name()
                .filter(|f| !f.is_empty())
                .map(|f| f.to_string())
            else {
                continue;
            };
            if fields.report.screenshot.is_some() {
                continue;
            }
            let data = read_limited(&mut field, max_screenshot_size).await?;
            fields.report.attach(Screenshot::new(filename, data));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Decode(format!("Failed to read field '{}': {}", name, e)))?;
        fields.set(&name, value);
    }

    Ok(())
}

async fn read_limited(field: &mut Field<'_>, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Decode(format!("Failed to read screenshot: {}", e)))?
    {
        if data.len() + chunk.len() > limit {
            return Err(AppError::ScreenshotTooLarge { limit });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
