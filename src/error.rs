/// Error type shared by the API client, the session store and the screens.
///
/// Every variant is `Clone` so a failed request can travel inside an iced
/// `Message` back to the screen that started it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The request never produced an HTTP response (connection refused, DNS, ...)
    #[error("request failed: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("backend rejected the request ({status})")]
    Backend { status: u16, detail: Option<String> },

    /// The response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Reading or writing the local session database failed
    #[error("session storage failed: {0}")]
    Storage(String),
}

impl Error {
    /// Message to show the user: the backend's `detail` when it sent one,
    /// otherwise the given fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Backend { detail: Some(detail), .. } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Build a backend error from a status code and the raw response body.
    ///
    /// The backend reports failures as `{"detail": "..."}`. Validation errors
    /// carry a list in `detail` instead of a string; those have no single
    /// message worth showing and are dropped.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("detail")
                    .and_then(|d| d.as_str())
                    .map(str::to_string)
            });

        Error::Backend { status, detail }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_extracted() {
        let err = Error::from_response(
            400,
            r#"{"detail":"Slot already taken for this professional"}"#,
        );

        assert_eq!(
            err,
            Error::Backend {
                status: 400,
                detail: Some("Slot already taken for this professional".into()),
            }
        );
        assert_eq!(
            err.user_message("Booking failed"),
            "Slot already taken for this professional"
        );
    }

    #[test]
    fn test_validation_list_falls_back() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"field required"}]}"#;
        let err = Error::from_response(422, body);

        assert_eq!(err.user_message("Booking failed"), "Booking failed");
    }

    #[test]
    fn test_non_json_body_falls_back() {
        let err = Error::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(err, Error::Backend { status: 502, detail: None });
    }

    #[test]
    fn test_network_error_uses_fallback() {
        let err = Error::Network("connection refused".into());
        assert_eq!(err.user_message("Could not connect."), "Could not connect.");
    }

    #[test]
    fn test_bad_json_is_a_decode_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(err.user_message("Could not read the session"), "Could not read the session");
    }
}
