//! Minimal HTTP/1.1 request reading and response writing on top of tokio.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

const MAX_HEADER_BYTES: usize = 64 * 1024;
const READ_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Content-Length is required")]
    LengthRequired,

    #[error("Request timeout")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    pub fn status_code(&self) -> u16 {
        match self {
            HttpError::BadRequest(_) => 400,
            HttpError::PayloadTooLarge { .. } => 413,
            HttpError::LengthRequired => 411,
            HttpError::Timeout => 408,
            HttpError::Io(_) => 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_string(value)
            .unwrap_or_else(|_| r#"{"success":false,"error":"Failed to serialize response"}"#.to_string());
        Self { status, body }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "success": false, "error": message }))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            reason_phrase(self.status),
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        411 => "Length Required",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Read one request: the header block, then exactly `Content-Length` body bytes.
///
/// Answers `Expect: 100-continue` before reading the body so clients that
/// wait for it (curl does for large uploads) proceed.
pub async fn read_request<S>(stream: &mut S, max_body: usize) -> Result<HttpRequest, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        if let Some(pos) = find_subsequence(&buffer, b"\r\n\r\n", 0) {
            break pos;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Err(HttpError::BadRequest("header block too large".to_string()));
        }
        let n = read_some(stream, &mut chunk).await?;
        if n == 0 {
            return Err(HttpError::BadRequest("connection closed before headers".to_string()));
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let (method, path, headers) = parse_head(&head)?;

    if headers
        .get("transfer-encoding")
        .is_some_and(|te| te.to_ascii_lowercase().contains("chunked"))
    {
        return Err(HttpError::LengthRequired);
    }

    let content_length = match headers.get("content-length") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| HttpError::BadRequest(format!("invalid Content-Length: {raw}")))?,
        None => 0,
    };
    if content_length > max_body {
        return Err(HttpError::PayloadTooLarge { limit: max_body });
    }

    let mut body = buffer.split_off(header_end + 4);
    if body.len() < content_length
        && headers
            .get("expect")
            .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"))
    {
        stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await?;
    }

    while body.len() < content_length {
        let n = read_some(stream, &mut chunk).await?;
        if n == 0 {
            return Err(HttpError::BadRequest("connection closed before body".to_string()));
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(HttpRequest {
        method,
        path,
        headers,
        body,
    })
}

pub async fn write_response<S>(stream: &mut S, response: &HttpResponse) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await
}

async fn read_some<S>(stream: &mut S, chunk: &mut [u8]) -> Result<usize, HttpError>
where
    S: AsyncRead + Unpin,
{
    match timeout(READ_IDLE_TIMEOUT, stream.read(chunk)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(HttpError::Timeout),
    }
}

fn parse_head(head: &str) -> Result<(String, String, HashMap<String, String>), HttpError> {
    let mut lines = head.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| HttpError::BadRequest("empty request".to_string()))?;

    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method.to_string(), target),
        _ => return Err(HttpError::BadRequest("invalid request line".to_string())),
    };

    // Remove query parameters and a trailing slash, except for root
    let path = target.split('?').next().unwrap_or("/").trim_end_matches('/');
    let path = (if path.is_empty() { "/" } else { path }).to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    Ok((method, path, headers))
}

fn find_subsequence(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_parse_head() {
        let (method, path, headers) =
            parse_head("POST /import-csv/?x=1 HTTP/1.1\r\nHost: localhost\r\nContent-Type: text/csv").unwrap();
        assert_eq!(method, "POST");
        assert_eq!(path, "/import-csv");
        assert_eq!(headers.get("content-type").map(String::as_str), Some("text/csv"));
    }

    #[test]
    fn test_parse_head_rejects_garbage() {
        assert!(parse_head("GARBAGE").is_err());
    }

    #[test]
    fn test_find_subsequence() {
        assert_eq!(find_subsequence(b"abc--xyz--", b"--", 0), Some(3));
        assert_eq!(find_subsequence(b"abc--xyz--", b"--", 4), Some(8));
        assert_eq!(find_subsequence(b"abc", b"zz", 0), None);
    }

    #[test]
    fn test_response_bytes() {
        let response = HttpResponse::error(400, "Table name is required");
        let text = String::from_utf8(response.to_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains(&format!("Content-Length: {}\r\n", response.body.len())));

        let (_, body) = text.split_once("\r\n\r\n").unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Table name is required");
    }

    #[tokio::test]
    async fn test_read_request_with_body() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(b"POST /import-csv HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello")
            .await
            .unwrap();

        let request = read_request(&mut server, 1024).await.unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/import-csv");
        assert_eq!(request.body, b"hello");
    }

    #[tokio::test]
    async fn test_read_request_answers_expect_continue() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(b"POST /import-csv HTTP/1.1\r\nContent-Length: 3\r\nExpect: 100-continue\r\n\r\n")
            .await
            .unwrap();

        let reader = tokio::spawn(async move { read_request(&mut server, 1024).await });

        let mut interim = [0u8; 25];
        client.read_exact(&mut interim).await.unwrap();
        assert_eq!(&interim, b"HTTP/1.1 100 Continue\r\n\r\n");
        client.write_all(b"abc").await.unwrap();

        let request = reader.await.unwrap().unwrap();
        assert_eq!(request.body, b"abc");
    }

    #[tokio::test]
    async fn test_read_request_rejects_large_body() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(b"POST /import-csv HTTP/1.1\r\nContent-Length: 2048\r\n\r\n")
            .await
            .unwrap();

        let err = read_request(&mut server, 1024).await.unwrap_err();
        assert_eq!(err.status_code(), 413);
    }
}
