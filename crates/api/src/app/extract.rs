//! Request body extraction.
//!
//! Handlers authorize the caller before looking at the body, so the body is
//! captured as raw bytes and decoded on demand. Every decode failure becomes a
//! 400 `validation_failed` in the usual error shape.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use validator::Validate;

use fellowship_core::FieldViolation;

use crate::app::errors::{ApiError, ApiResult};

/// Raw JSON body, decoded only once the handler asks for it.
#[derive(Debug)]
pub struct JsonBody(Result<Bytes, String>);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| e.body_text());
        Ok(Self(bytes))
    }
}

impl JsonBody {
    /// Deserialize without field rules.
    pub fn decode<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let bytes = self.0.as_ref().map_err(|message| violation("body", message.clone()))?;
        serde_json::from_slice(bytes).map_err(decode_error)
    }

    /// Deserialize, then run the DTO's `validator` rules.
    pub fn validated<T: DeserializeOwned + Validate>(&self) -> ApiResult<T> {
        let body: T = self.decode()?;
        body.validate()?;
        Ok(body)
    }
}

fn violation(field: &str, message: String) -> ApiError {
    ApiError::Validation(vec![FieldViolation {
        field: field.to_string(),
        message,
    }])
}

fn decode_error(err: serde_json::Error) -> ApiError {
    match err.classify() {
        Category::Syntax | Category::Eof | Category::Io => {
            violation("body", "request body is not valid JSON".to_string())
        }
        Category::Data => {
            let text = err.to_string();
            // Parser positions are not useful to clients.
            let message = text
                .rsplit_once(" at line ")
                .map_or(text.as_str(), |(head, _)| head)
                .to_string();
            let field = named_field(&message).unwrap_or("body").to_string();
            violation(&field, message)
        }
    }
}

/// Field named by serde's "missing field `x`" / "unknown field `x`" messages.
fn named_field(message: &str) -> Option<&str> {
    let rest = message
        .strip_prefix("missing field `")
        .or_else(|| message.strip_prefix("unknown field `"))?;
    rest.split('`').next()
}
