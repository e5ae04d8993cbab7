//! Fixed response bodies and the JSON types exchanged with clients.
//!
//! The bodies are byte-exact: clients compare them verbatim, so they are kept
//! as literals rather than produced by a serializer.

use serde::{Deserialize, Serialize};

/// Protocol major version the `/api/hello` route requires.
pub const REQUIRED_MAJOR_VERSION: u8 = 2;

// ---------------------------------------------------------------------------
// Landing page
// ---------------------------------------------------------------------------

/// HTML document served at `/`.
pub const ROOT_HTML: &str = r#"
	<!DOCTYPE html>
	<html lang="en">
	<head>
		<meta charset="UTF-8">
		<meta name="viewport" content="width=device-width, initial-scale=1.0">
		<title>HTTP/2 Example</title>
	</head>
	<body>
		<h1>Welcome to the HTTP/2 Server</h1>
		<p>Visit <a href="/api/hello">/api/hello</a> for a JSON response.</p>
	</body>
	</html>"#;

// ---------------------------------------------------------------------------
// Hello endpoint
// ---------------------------------------------------------------------------

/// Exact body of a successful `GET /api/hello`.
pub const HELLO_BODY: &str = r#"{"message": "Hello, HTTP/2!"}"#;

/// Decoded form of [`HELLO_BODY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

/// Greeting returned by `GET /hello`.
///
/// The name is used verbatim, whitespace included; only a missing or empty
/// name falls back to `World`.
pub fn greeting(name: Option<&str>) -> String {
    let name = match name {
        Some(n) if !n.is_empty() => n,
        _ => "World",
    };
    format!("Hello, {name}!")
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// JSON error body returned by the not-found fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
