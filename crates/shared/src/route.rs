//! Project ids as they appear in page routes.
//!
//! Routes carry the base64 encoding of the decimal project id, so project 12
//! is reached at `/project/MTI=`.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::RouteError;

pub fn encode_project_id(project_id: u64) -> String {
    STANDARD.encode(project_id.to_string())
}

pub fn decode_project_id(param: &str) -> Result<u64, RouteError> {
    let bytes = STANDARD
        .decode(param.trim())
        .map_err(|e| RouteError::Encoding(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| RouteError::Encoding(e.to_string()))?;
    text.trim()
        .parse()
        .map_err(|_| RouteError::NotAnId(text.clone()))
}
