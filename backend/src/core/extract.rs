//! Extractors - wrapper degli extractor di axum che rispondono con `AppError`
//!
//! Senza wrapper un body JSON malformato o un UUID non valido nella URL
//! produrrebbero una risposta `text/plain`; così invece il client riceve
//! sempre `{"detail": ..., "details": ...}`.

use crate::core::AppError;
use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Body JSON in ingresso e risposta JSON in uscita
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Form `application/x-www-form-urlencoded`
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct Form<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);
