//! Helpers shared by the HTTP clients.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::util::{is_http_url, normalize_text_option};

/// Trim an endpoint, require an http(s) scheme and drop trailing slashes.
///
/// The error is a human readable reason for the caller's configuration error.
pub(crate) fn normalize_endpoint(raw: String) -> Result<String, String> {
    let endpoint = normalize_text_option(Some(raw))
        .ok_or_else(|| "endpoint must not be empty".to_string())?;
    if is_http_url(&endpoint) {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err("endpoint must include http:// or https://".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Build a compact error message from a failed response.
pub(crate) fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = crate::util::compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_endpoint_rejects_invalid_values() {
        assert!(normalize_endpoint(String::new()).is_err());
        assert!(normalize_endpoint("api.example.com".to_string()).is_err());
    }

    #[test]
    fn normalize_endpoint_trims_trailing_slashes() {
        assert_eq!(
            normalize_endpoint(" https://api.example.com/// ".to_string()),
            Ok("https://api.example.com".to_string())
        );
    }

    #[test]
    fn parse_api_error_prefers_json_message() {
        assert_eq!(
            parse_api_error(
                StatusCode::BAD_REQUEST,
                r#"{"error":"bad_request","message":"species is required"}"#
            ),
            "species is required (400)"
        );
        assert_eq!(
            parse_api_error(StatusCode::SERVICE_UNAVAILABLE, "  "),
            "HTTP 503"
        );
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down (502)"
        );
    }
}
