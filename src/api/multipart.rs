//! multipart/form-data decoding for upload requests, backed by `multer`

use crate::api::http::HttpError;
use bytes::Bytes;
use futures_util::stream;
use multer::Multipart;
use std::convert::Infallible;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FormPart {
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Boundary parameter of a `multipart/form-data` content type, if it is one.
pub fn boundary(content_type: &str) -> Option<String> {
    multer::parse_boundary(content_type).ok()
}

/// Split an already buffered form body into its parts.
pub async fn parse(body: Vec<u8>, boundary: String) -> Result<Vec<FormPart>, HttpError> {
    let body = stream::once(async move { Ok::<_, Infallible>(Bytes::from(body)) });
    let mut multipart = Multipart::new(body, boundary);
    let mut parts = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());
        let data = field.bytes().await.map_err(malformed)?.to_vec();

        parts.push(FormPart {
            name,
            filename,
            content_type,
            data,
        });
    }

    Ok(parts)
}

fn malformed(err: multer::Error) -> HttpError {
    HttpError::BadRequest(format!("malformed multipart body: {err}"))
}
