// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps every `WfmError` to the 404-with-`{detail}` shape the HTTP surface
//! promises (spec.md §6, §7): every failure kind surfaces the same way,
//! the distinction lives in the `detail` message and in server-side logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use wfm_core::WfmError;
use wfm_wire::ErrorResponse;

pub struct ApiError(pub WfmError);

impl From<WfmError> for ApiError {
    fn from(err: WfmError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "request failed");
        (StatusCode::NOT_FOUND, Json(ErrorResponse::new(self.0.detail()))).into_response()
    }
}
