//! Form encoding of possibly nested query mappings.
//!
//! Flattens a JSON-shaped mapping into `application/x-www-form-urlencoded`
//! pairs, with nested objects and arrays written PHP-style as
//! `parent[key]=value`. Keys and values are percent-encoded, with two
//! exceptions that make encoded URLs easier to read in logs and browser bars:
//! - A literal `/` is restored in values after encoding.
//! - A `null` value emits the bare key with no `=`.
//!
//! Output order follows the iteration order of the input map, so the same
//! input always encodes to the same string.
//!
//! # Example
//! ```rust
//! use openid_connect_client::query::http_build_query;
//! use serde_json::{Map, json};
//!
//! let mut query = Map::new();
//! query.insert("response_type".to_string(), json!("code"));
//! query.insert("scope".to_string(), json!("openid email"));
//!
//! assert_eq!(http_build_query(&query), "response_type=code&scope=openid%20email");
//! ```

use itertools::Itertools;
use serde_json::{Map, Value};
use urlencoding::encode;

/// Encodes a mapping as a form-encoded string, recursing into nested
/// objects and arrays.
pub fn http_build_query(query: &Map<String, Value>) -> String {
    let mut params = Vec::new();
    for (key, value) in query {
        push_pair(&mut params, encode(key).into_owned(), value);
    }
    params.iter().join("&")
}

fn push_pair(params: &mut Vec<String>, key: String, value: &Value) {
    match value {
        Value::Object(children) => {
            for (child_key, child) in children {
                push_pair(params, format!("{key}[{}]", encode(child_key)), child);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pair(params, format!("{key}[{index}]"), item);
            }
        }
        // If a query parameter value is null, only append its key.
        Value::Null => params.push(key),
        Value::String(value) => params.push(format!("{key}={}", encode_value(value))),
        other => params.push(format!("{key}={}", encode_value(&other.to_string()))),
    }
}

// For better readability of paths in query strings, slashes stay literal.
fn encode_value(value: &str) -> String {
    encode(value).replace("%2F", "/")
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::http_build_query;

    #[test]
    fn test_flat_query() {
        let mut query = Map::new();
        query.insert("client_id".to_string(), json!("my_client_id"));
        query.insert("response_type".to_string(), json!("code"));

        assert_eq!(
            http_build_query(&query),
            "client_id=my_client_id&response_type=code"
        );
    }

    #[test]
    fn test_value_encoding() {
        let mut query = Map::new();
        query.insert("scope".to_string(), json!("openid email"));
        query.insert("redirect_uri".to_string(), json!("https://rp.example.com/cb"));

        // Space is percent-encoded, slashes stay literal.
        assert_eq!(
            http_build_query(&query),
            "redirect_uri=https%3A//rp.example.com/cb&scope=openid%20email"
        );
    }

    #[test]
    fn test_nested_query() {
        let mut query = Map::new();
        query.insert("outer".to_string(), json!({"inner": "value", "deep": {"most": "x"}}));

        assert_eq!(
            http_build_query(&query),
            "outer[deep][most]=x&outer[inner]=value"
        );
    }

    #[test]
    fn test_array_query() {
        let mut query = Map::new();
        query.insert("items".to_string(), json!(["a", "b"]));

        assert_eq!(http_build_query(&query), "items[0]=a&items[1]=b");
    }

    #[test]
    fn test_null_emits_bare_key() {
        let mut query = Map::new();
        query.insert("flag".to_string(), json!(null));
        query.insert("code".to_string(), json!("abc"));

        assert_eq!(http_build_query(&query), "code=abc&flag");
    }

    #[test]
    fn test_scalar_values() {
        let mut query = Map::new();
        query.insert("count".to_string(), json!(3));
        query.insert("enabled".to_string(), json!(true));

        assert_eq!(http_build_query(&query), "count=3&enabled=true");
    }

    #[test]
    fn test_round_trip_with_form_decoder() {
        let mut query = Map::new();
        query.insert("grant_type".to_string(), json!("authorization_code"));
        query.insert("profile".to_string(), json!({"given name": "Ada B"}));

        let encoded = http_build_query(&query);
        let decoded: Vec<(String, String)> = url::form_urlencoded::parse(encoded.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(
            decoded,
            vec![
                ("grant_type".to_string(), "authorization_code".to_string()),
                ("profile[given name]".to_string(), "Ada B".to_string()),
            ]
        );
    }
}
