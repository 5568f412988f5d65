pub mod embedding;

mod error;

pub use error::{Error, Result};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(
		AUTHORIZATION,
		format!("Bearer {api_key}").parse().map_err(Error::InvalidHeaderValue)?,
	);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_non_string_default_header() {
		let mut defaults = Map::new();
		defaults.insert("x-request-source".to_string(), Value::from(1));
		assert!(matches!(
			auth_headers("key", &defaults),
			Err(Error::InvalidConfig { .. })
		));
	}

	#[test]
	fn builds_bearer_and_default_headers() {
		let mut defaults = Map::new();
		defaults.insert("x-request-source".to_string(), Value::from("fovea"));
		let headers = auth_headers("key", &defaults).expect("Expected headers.");
		assert_eq!(headers.get(AUTHORIZATION).expect("Expected auth header."), "Bearer key");
		assert_eq!(headers.get("x-request-source").expect("Expected default header."), "fovea");
	}
}
