//! Request extraction helpers.

use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::error::ApiError;

/// Unwrap a JSON body, turning axum's rejection into the contract's 400 shape.
///
/// Handlers take `Result<Json<T>, JsonRejection>` instead of `Json<T>` so a
/// malformed body still produces the `{"success": false, ...}` envelope
/// rather than axum's plain-text rejection.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::BadRequest(format!(
            "Invalid request format: {}",
            rejection.body_text()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_a_parsed_body() {
        let body: Result<Json<u32>, JsonRejection> = Ok(Json(7));
        assert_eq!(json_body(body).expect("parsed"), 7);
    }
}
