use std::borrow::Cow;
use std::sync::LazyLock;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::Method;
use axum::http::request::Parts;
use jiff::civil::Date;
use regex::Regex;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};

/// strftime/strptime pattern for dates of birth
pub const DOB_FORMAT: &str = "%Y-%m-%d";

static DOB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("dob pattern is a valid regex")
});

/// Checks that `dob` is present, shaped `YYYY-MM-DD` and a real calendar date.
pub fn validate_dob(dob: &str) -> Result<(), ValidationError> {
    if dob.is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed("is required")));
    }
    if !DOB_PATTERN.is_match(dob) {
        return Err(ValidationError::new("format")
            .with_message(Cow::Borrowed("must be in YYYY-MM-DD format")));
    }
    if Date::strptime(DOB_FORMAT, dob).is_err() {
        return Err(ValidationError::new("date")
            .with_message(Cow::Borrowed("must be a valid calendar date")));
    }
    Ok(())
}

/// Flattens field errors into `"field: message; field: message"`, sorted by field.
pub fn validation_details(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Client-facing text for a body that is not valid JSON for the target type.
fn body_rejection_message(method: &Method) -> &'static str {
    if *method == Method::PUT {
        "Invalid body"
    } else {
        "Invalid request body"
    }
}

/// JSON body extractor that runs `Validate` before the handler sees the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let message = body_rejection_message(req.method());
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::warn!(reason = %rejection.body_text(), "Invalid request body");
                AppError::bad_request(message)
            })?;

        value.validate().map_err(|errors| {
            let details = validation_details(&errors);
            tracing::warn!(details = %details, "Request validation failed");
            AppError::validation(details)
        })?;

        Ok(ValidatedJson(value))
    }
}

/// `{id}` path segment parsed as a user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i32);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let raw = match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(raw)) => raw,
            Err(rejection) => {
                tracing::warn!(reason = %rejection.body_text(), "Missing user id");
                return Err(AppError::bad_request("Invalid User ID"));
            }
        };

        raw.parse::<i32>().map(UserId).map_err(|_| {
            tracing::warn!(user_id = %raw, "Invalid user id");
            AppError::bad_request("Invalid User ID")
        })
    }
}
