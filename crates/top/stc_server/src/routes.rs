use stc_density::EngineConfig;
use stc_engine::GlobalMapsCache;

use crate::ServerError;

pub const GLOBAL_MAPS_PATH: &str = "/api/adaptive/global";
pub const HEALTH_PATH: &str = "/health";

/// Lets shared caches keep the maps for a minute and serve them stale while refreshing.
pub const GLOBAL_MAPS_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=30";

const GLOBAL_MAPS_ERROR_BODY: &str = r#"{"error":"Failed to generate global adaptive maps"}"#;

/// A response, before it is handed to the HTTP server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub cache_control: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Reply {
    fn json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: "application/json",
            cache_control: None,
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            cache_control: None,
            body: body.as_bytes().to_vec(),
        }
    }
}

/// Route one request. `url` is the raw request target, including the query string.
pub fn handle(cache: &GlobalMapsCache, defaults: EngineConfig, method: &str, url: &str) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    if method != "GET" {
        stc_log::debug!("405 {method} {path}");
        return Reply::text(405, "method not allowed");
    }

    match path {
        GLOBAL_MAPS_PATH => {
            let config = parse_config(query, defaults);
            match global_maps(cache, config) {
                Ok(body) => Reply {
                    cache_control: Some(GLOBAL_MAPS_CACHE_CONTROL),
                    ..Reply::json(200, body)
                },
                Err(err) => {
                    stc_log::error!(
                        "Error generating global adaptive maps: {}",
                        stc_error::format_ref(&err)
                    );
                    Reply::json(500, GLOBAL_MAPS_ERROR_BODY.as_bytes().to_vec())
                }
            }
        }
        HEALTH_PATH => Reply::text(200, "ok"),
        _ => {
            stc_log::warn!("404 path: {path}");
            Reply::text(404, "not found")
        }
    }
}

fn global_maps(cache: &GlobalMapsCache, config: EngineConfig) -> Result<Vec<u8>, ServerError> {
    stc_tracing::profile_function!();
    let maps = cache.get_or_create(config)?;
    Ok(serde_json::to_vec(&*maps)?)
}

/// `binCount` and `kernelWidth` from a query string, clamped to the accepted ranges.
///
/// Parameters are read the way a browser's `Number()` would: absent means default,
/// empty means `0`, anything that is not a finite number means default.
pub fn parse_config(query: &str, defaults: EngineConfig) -> EngineConfig {
    let param = |name: &str, default: usize| -> usize {
        let Some(value) = query_param(query, name) else {
            return default;
        };

        let value = value.trim();
        let number = if value.is_empty() {
            0.0
        } else {
            value.parse::<f64>().unwrap_or(f64::NAN)
        };

        if number.is_finite() {
            number.floor() as usize // saturating: negatives become 0
        } else {
            default
        }
    };

    EngineConfig::clamped(
        param("binCount", defaults.bin_count),
        param("kernelWidth", defaults.kernel_width),
    )
}

/// The first value of `name` in a `a=1&b=2` query string. `+` is a space; no other decoding.
fn query_param<'a>(query: &'a str, name: &str) -> Option<std::borrow::Cow<'a, str>> {
    query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
        .next()
        .map(|value| {
            if value.contains('+') {
                value.replace('+', " ").into()
            } else {
                value.into()
            }
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stc_engine::{DatasetSnapshot, InMemorySource, TimestampSource};

    use super::*;

    fn defaults() -> EngineConfig {
        EngineConfig::new(1024, 2)
    }

    #[test]
    fn query_parsing() {
        let parse = |query| parse_config(query, defaults());

        assert_eq!(parse(""), EngineConfig::new(1024, 2));
        assert_eq!(parse("binCount=128&kernelWidth=5"), EngineConfig::new(128, 5));
        assert_eq!(parse("kernelWidth=7"), EngineConfig::new(1024, 7));
        assert_eq!(parse("binCount=99.9"), EngineConfig::new(99, 2));
        assert_eq!(parse("binCount=1e3"), EngineConfig::new(1000, 2));
        assert_eq!(parse("binCount=+256+"), EngineConfig::new(256, 2));

        // Clamped.
        assert_eq!(parse("binCount=10&kernelWidth=100"), EngineConfig::new(64, 25));
        assert_eq!(parse("binCount=100000&kernelWidth=-3"), EngineConfig::new(4096, 0));

        // Not a number: default. Empty: zero, then clamped.
        assert_eq!(parse("binCount=abc&kernelWidth=NaN"), EngineConfig::new(1024, 2));
        assert_eq!(parse("binCount=inf"), EngineConfig::new(1024, 2));
        assert_eq!(parse("binCount=&kernelWidth="), EngineConfig::new(64, 0));
        assert_eq!(parse("binCount"), EngineConfig::new(64, 2));

        // First occurrence wins.
        assert_eq!(parse("binCount=128&binCount=256"), EngineConfig::new(128, 2));
    }

    #[test]
    fn out_of_range_defaults_are_clamped_too() {
        let config = parse_config("binCount=x", EngineConfig::new(10, 99));
        assert_eq!(config, EngineConfig::new(64, 25));
    }

    struct FailingSource;

    impl TimestampSource for FailingSource {
        fn load(&self) -> anyhow::Result<DatasetSnapshot> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn routing() {
        let cache = GlobalMapsCache::new(Arc::new(InMemorySource(DatasetSnapshot::new([
            1.0, 2.0, 3.0,
        ]))));

        let reply = handle(&cache, defaults(), "GET", "/health");
        assert_eq!((reply.status, reply.body.as_slice()), (200, &b"ok"[..]));

        assert_eq!(handle(&cache, defaults(), "GET", "/nope").status, 404);
        assert_eq!(handle(&cache, defaults(), "POST", GLOBAL_MAPS_PATH).status, 405);

        let reply = handle(&cache, defaults(), "GET", "/api/adaptive/global?binCount=64");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/json");
        assert_eq!(reply.cache_control, Some(GLOBAL_MAPS_CACHE_CONTROL));

        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(json["binCount"], 64);
        assert_eq!(json["kernelWidth"], 2);
        assert_eq!(json["rowCount"], 3);
        assert_eq!(json["domain"], serde_json::json!([1.0, 3.0]));
        assert_eq!(json["warpMap"].as_array().map(Vec::len), Some(64));
    }

    #[test]
    fn failures_are_500() {
        let cache = GlobalMapsCache::new(Arc::new(FailingSource));
        let reply = handle(&cache, defaults(), "GET", GLOBAL_MAPS_PATH);
        assert_eq!(reply.status, 500);
        assert_eq!(reply.cache_control, None);

        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "Failed to generate global adaptive maps" })
        );
    }
}
