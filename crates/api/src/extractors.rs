//! Request extractors.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use serde::Deserialize;

use crate::error::ApiError;

/// JSON body whose rejection renders as a 400 error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string whose rejection renders as a 400 error body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// Path parameters whose rejection renders as a 400 error body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Name of the multipart field carrying the spreadsheet.
pub const FILE_FIELD: &str = "file";

/// Spreadsheet bytes taken from the `file` field of a multipart body.
#[derive(Debug)]
pub struct CsvUpload {
    /// Client-supplied file name, if any.
    pub file_name: Option<String>,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl<S> FromRequest<S> for CsvUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Expected a multipart upload: {e}")))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read multipart field: {e}")))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }
            let file_name = field.file_name().map(ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file content: {e}")))?;
            if bytes.is_empty() {
                return Err(ApiError::bad_request("Uploaded file is empty"));
            }
            return Ok(Self {
                file_name,
                bytes: bytes.to_vec(),
            });
        }

        Err(ApiError::bad_request("Missing file in multipart request"))
    }
}

/// `?dryRun=` flag shared by the import endpoints. Defaults to a dry run.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunQuery {
    /// When true nothing is written.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

const fn default_dry_run() -> bool {
    true
}
