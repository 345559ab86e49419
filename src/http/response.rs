//! Verdict → HTTP response.
//!
//! # Mapping
//! - Available: 200, body `"<synced message>\n\r"`
//! - Unavailable: 503, body `"<reason>\r\n"`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::health::verdict::{Verdict, SYNCED_MESSAGE};

impl IntoResponse for Verdict {
    fn into_response(self) -> Response {
        match self {
            Verdict::Available => (StatusCode::OK, format!("{}\n\r", SYNCED_MESSAGE)).into_response(),
            Verdict::Unavailable(reason) => {
                (StatusCode::SERVICE_UNAVAILABLE, format!("{}\r\n", reason)).into_response()
            }
        }
    }
}
