use anyhow::{anyhow, Context, Result};
use url::Url;

pub const STREAM_SUFFIX: &str = "/ws";
pub const RESULT_PATH: &str = "/json";
pub const COMPLETION_PATH: &str = "/html";
pub const STATUS_PATH: &str = "/status";
pub const VIEW_PARAM: &str = "view";
pub const ID_PARAM: &str = "id";

/// Turns what the user typed into a page URL: a full URL is taken as is, a
/// bare job id becomes `<base>/status?id=<id>`.
pub fn page_url(input: &str, base_url: &str) -> Result<Url> {
    if input.contains("://") {
        return Url::parse(input).with_context(|| format!("Invalid page URL: {}", input));
    }
    let mut url = Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
    url.set_path(STATUS_PATH);
    url.set_query(None);
    url.query_pairs_mut().append_pair(ID_PARAM, input);
    Ok(url)
}

pub fn param(page: &Url, key: &str) -> Option<String> {
    page.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn job_id(page: &Url) -> Option<String> {
    param(page, ID_PARAM).filter(|id| !id.is_empty())
}

/// Read-only mode: the `view` parameter is present, whatever its value.
pub fn is_view_mode(page: &Url) -> bool {
    param(page, VIEW_PARAM).is_some()
}

/// Same origin, `wss` for `https` pages and `ws` otherwise, page path plus
/// `/ws`, query kept.
pub fn stream_url(page: &Url) -> Result<Url> {
    let mut url = page.clone();
    let scheme = if page.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|_| anyhow!("Cannot derive a {} URL from {}", scheme, page))?;
    let path = format!("{}{}", url.path(), STREAM_SUFFIX);
    url.set_path(&path);
    url.set_fragment(None);
    Ok(url)
}

pub fn result_url(page: &Url, id: &str) -> Url {
    same_origin(page, RESULT_PATH, id)
}

pub fn completion_url(page: &Url, id: &str) -> Url {
    same_origin(page, COMPLETION_PATH, id)
}

fn same_origin(page: &Url, path: &str, id: &str) -> Url {
    let mut url = page.clone();
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair(ID_PARAM, id);
    url
}
