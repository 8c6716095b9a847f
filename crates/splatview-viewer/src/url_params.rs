//! Configuration overrides from the page URL (`?splat=...&model=...`)

use splatview_core::{ConfigError, ViewerConfig};

/// Query parameters that map onto [`ViewerConfig::apply_override`]
pub const QUERY_KEYS: [&str; 5] = ["splat", "model", "label", "fov", "log"];

/// Apply `key=value` pairs, returning the ones that were rejected
pub fn apply_pairs<K, V>(
    config: &mut ViewerConfig,
    pairs: impl IntoIterator<Item = (K, V)>,
) -> Vec<ConfigError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| config.apply_override(key.as_ref(), value.as_ref()).err())
        .collect()
}

/// Read overrides from `window.location`
#[cfg(target_arch = "wasm32")]
pub fn apply_page_params(config: &mut ViewerConfig) -> Vec<ConfigError> {
    let Some(href) = web_sys::window().and_then(|w| w.location().href().ok()) else {
        return Vec::new();
    };
    let Ok(url) = web_sys::Url::new(&href) else {
        return Vec::new();
    };
    let params = url.search_params();
    let pairs = QUERY_KEYS
        .iter()
        .filter_map(|key| params.get(key).map(|value| (*key, value)));
    apply_pairs(config, pairs)
}
