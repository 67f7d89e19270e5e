//! Utility functions and helpers.

pub mod http;
pub mod table;

use url::Url;

use crate::error::Result;

/// Resolve the JSON API endpoint of a leaderboard page URL.
///
/// `.../private/view/123` becomes `.../private/view/123.json`; URLs that
/// already end in `.json` are returned unchanged.
pub fn json_endpoint(leaderboard_url: &str) -> Result<Url> {
    let mut url = Url::parse(leaderboard_url.trim())?;
    if !url.path().ends_with(".json") {
        let path = format!("{}.json", url.path().trim_end_matches('/'));
        url.set_path(&path);
    }
    Ok(url)
}
