use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use common::endpoints::RESULT_PATH;
use common::{parse_job, Job, ModelError};

/// Why the result document could not be turned into a job. Every variant is
/// final: nothing retries a failed fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("requesting {url}: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status { url: Url, status: StatusCode },
    #[error("job is not finished yet (redirected to {0})")]
    NotDone(Url),
    #[error("job document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// GET the result document. No timeout is applied.
pub async fn fetch_job(client: &reqwest::Client, url: &Url) -> Result<Job, FetchError> {
    log::info!("fetching {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| FetchError::Request { url: url.clone(), source })?;

    // the server sends unfinished jobs back to their status page
    if response.url().path() != RESULT_PATH {
        return Err(FetchError::NotDone(response.url().clone()));
    }
    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.clone(),
            status: response.status(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|source| FetchError::Request { url: url.clone(), source })?;
    parse_document(&body)
}

pub fn parse_document(body: &str) -> Result<Job, FetchError> {
    let raw: serde_json::Value = serde_json::from_str(body)?;
    Ok(parse_job(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_errors() {
        assert!(matches!(parse_document("<html>"), Err(FetchError::Json(_))));
        assert!(matches!(
            parse_document(r#"{"Sessions": [], "Messages": []}"#),
            Err(FetchError::Model(ModelError::MissingField("Characters")))
        ));
    }

    #[test]
    fn test_parse_document_ok() {
        let job = parse_document(
            r#"{"JobId": "a", "State": "done", "Sessions": [{"Number": "abc"}], "Messages": [], "Characters": []}"#,
        )
        .unwrap();
        assert_eq!(job.id.0, "a");
        assert_eq!(job.sessions.len(), 1);
    }
}
