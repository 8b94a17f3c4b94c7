//! Header conversion helpers.

use reqwest::header::HeaderMap;
use std::collections::HashMap;

/// Convert a `HeaderMap` to a `HashMap<String, String>`.
///
/// Header values that are not valid UTF-8 are filtered out.
pub fn headermap_to_hashmap(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|v_str| (k.as_str().to_string(), v_str.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    #[test]
    fn conversion_lowercases_names_and_drops_binary_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("abc123"),
        );
        headers.insert(
            HeaderName::from_static("x-binary"),
            HeaderValue::from_bytes(&[0xff]).unwrap(),
        );

        let map = headermap_to_hashmap(&headers);
        assert_eq!(map.get("x-request-id").map(String::as_str), Some("abc123"));
        assert!(!map.contains_key("x-binary"));
    }
}
