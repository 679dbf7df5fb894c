//! Collaborator contracts: the agent that serves file pages, and the task
//! whose sandbox a file may live in.

use crate::error::HostError;
use async_trait::async_trait;
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Paging endpoint exposed by the agent.
pub const READ_ENDPOINT: &str = "/files/read.json";

/// HTTP status the agent uses for a missing path.
pub const STATUS_NOT_FOUND: u16 = 404;

/// An agent able to serve byte ranges of its files.
///
/// Implementations own transport concerns (connection reuse, auth,
/// timeouts). Errors they return are surfaced to callers untouched.
#[async_trait]
pub trait Host: Send + Sync {
    /// Stable identity of this host, e.g. `10.0.0.5:5051`.
    fn key(&self) -> String;

    /// Issue one request against `endpoint` with the given paging params.
    ///
    /// A missing path must come back as a response with status 404, not
    /// as an `Err`.
    async fn fetch(&self, endpoint: &str, params: &ReadParams) -> Result<HostResponse, HostError>;
}

/// Query parameters of one paging request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadParams {
    /// Resolved path on the agent.
    pub path: String,
    /// Byte offset to start from.
    pub offset: i64,
    /// Maximum number of bytes to return.
    pub length: i64,
}

impl ReadParams {
    /// Render as a URL query string (without the leading `?`).
    pub fn to_query(&self) -> Result<String, HostError> {
        serde_urlencoded::to_string(self).map_err(|e| HostError::InvalidUri(e.to_string()))
    }
}

/// Raw response handed back by a [`Host`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResponse {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded body.
    pub body: Vec<u8>,
}

impl HostResponse {
    /// Build a 200 response carrying a JSON body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Build an empty 404 response.
    pub fn not_found() -> Self {
        Self {
            status: STATUS_NOT_FOUND,
            body: Vec::new(),
        }
    }

    /// Check if the agent reported a missing path.
    pub fn is_not_found(&self) -> bool {
        self.status == STATUS_NOT_FOUND
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Successful paging payload.
///
/// `offset` carries the total size of the file at fetch time, not the
/// offset that was requested.
///
/// Agents put the raw file bytes of the page inside the `data` string. A
/// page boundary can cut a multibyte character, so `data` is kept as bytes
/// and never validated as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadResponse {
    /// Current size of the file in bytes.
    pub offset: i64,
    /// Bytes available in the requested range.
    #[serde(default, deserialize_with = "deserialize_data")]
    pub data: Vec<u8>,
}

impl ReadResponse {
    /// Encode as an agent would: raw bytes inside the JSON string, with only
    /// the escapes JSON requires.
    pub fn to_body(&self) -> Vec<u8> {
        let mut body = format!("{{\"offset\":{},\"data\":\"", self.offset).into_bytes();
        for &byte in &self.data {
            match byte {
                b'"' => body.extend_from_slice(b"\\\""),
                b'\\' => body.extend_from_slice(b"\\\\"),
                b'\n' => body.extend_from_slice(b"\\n"),
                b'\r' => body.extend_from_slice(b"\\r"),
                b'\t' => body.extend_from_slice(b"\\t"),
                0x00..=0x1f => body.extend_from_slice(format!("\\u{byte:04x}").as_bytes()),
                _ => body.push(byte),
            }
        }
        body.extend_from_slice(b"\"}");
        body
    }
}

/// Take `data` as bytes so a string holding a partial character decodes.
fn deserialize_data<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DataVisitor;

    impl<'de> Visitor<'de> for DataVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string of file bytes")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Vec<u8>, E> {
            Ok(v.as_bytes().to_vec())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Vec<u8>, E> {
            Ok(v.into_bytes())
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Vec<u8>, E> {
            Ok(v.to_vec())
        }

        fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
            Ok(v)
        }
    }

    deserializer.deserialize_bytes(DataVisitor)
}

/// A task whose sandbox directory files are resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: String,
    /// Absolute sandbox directory on the agent.
    pub directory: String,
}

impl Task {
    /// Create a task reference.
    pub fn new(id: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            directory: directory.into(),
        }
    }

    /// Get the task id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the sandbox directory.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Join `path` onto the sandbox directory. Absolute paths win.
    pub fn resolve(&self, path: &str) -> String {
        Path::new(&self.directory)
            .join(path)
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_encoding() {
        let params = ReadParams {
            path: "/var/sandbox/std out".to_string(),
            offset: 10,
            length: 1024,
        };
        let query = params.to_query().unwrap();
        assert_eq!(query, "path=%2Fvar%2Fsandbox%2Fstd+out&offset=10&length=1024");
    }

    #[test]
    fn test_response_decoding() {
        let resp = HostResponse::ok(r#"{"offset": 12, "data": "hello"}"#);
        let payload: ReadResponse = resp.json().unwrap();
        assert_eq!(payload.offset, 12);
        assert_eq!(payload.data, b"hello");
    }

    #[test]
    fn test_response_with_partial_character() {
        // "é" is 0xC3 0xA9; a one byte page carries only the lead byte
        let mut body = br#"{"offset": 2, "data": ""#.to_vec();
        body.push(0xC3);
        body.extend_from_slice(br#""}"#);

        let payload: ReadResponse = HostResponse::ok(body).json().unwrap();
        assert_eq!(payload.offset, 2);
        assert_eq!(payload.data, vec![0xC3]);
    }

    #[test]
    fn test_body_escapes() {
        let page = ReadResponse {
            offset: 9,
            data: b"a\"b\\\n\x01\xA9".to_vec(),
        };
        let body = page.to_body();
        assert!(body.starts_with(br#"{"offset":9,"data":"a\"b\\\n\u0001"#));

        let decoded: ReadResponse = HostResponse::ok(body).json().unwrap();
        assert_eq!(decoded, page);
    }

    #[test]
    fn test_response_missing_data_defaults_empty() {
        let payload: ReadResponse = HostResponse::ok(r#"{"offset": 3}"#).json().unwrap();
        assert_eq!(payload.offset, 3);
        assert!(payload.data.is_empty());
    }

    #[test]
    fn test_not_found() {
        assert!(HostResponse::not_found().is_not_found());
        assert!(!HostResponse::ok("{}").is_not_found());
    }

    #[test]
    fn test_task_resolve() {
        let task = Task::new("task-1", "/var/lib/mesos/slaves/s1/runs/r1");
        assert_eq!(task.resolve("stdout"), "/var/lib/mesos/slaves/s1/runs/r1/stdout");
        assert_eq!(task.resolve("/etc/hosts"), "/etc/hosts");

        let trailing = Task::new("task-2", "/sandbox/");
        assert_eq!(trailing.resolve("stderr"), "/sandbox/stderr");
    }
}
