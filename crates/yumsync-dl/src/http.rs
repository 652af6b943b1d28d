use tracing::trace;
use ureq::{http::Response, Body};
use url::Url;

use crate::{
    error::{DownloadError, Result},
    http_client::SHARED_AGENT,
};

pub struct Http;

impl Http {
    /// Issues a GET request and returns the response once the status is a success.
    ///
    /// Non-2xx statuses become [`DownloadError::HttpError`]; connection level failures
    /// become [`DownloadError::Network`].
    pub fn fetch(url: &str) -> Result<Response<Body>> {
        validate_url(url)?;
        trace!("GET {}", url);

        match SHARED_AGENT.get(url).call() {
            Ok(resp) if resp.status().is_success() => Ok(resp),
            Ok(resp) => {
                Err(DownloadError::HttpError {
                    status: resp.status().as_u16(),
                    url: url.to_string(),
                })
            }
            Err(ureq::Error::StatusCode(status)) => {
                Err(DownloadError::HttpError {
                    status,
                    url: url.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches the complete response body of `url` into memory.
    pub fn bytes(url: &str) -> Result<Vec<u8>> {
        let mut resp = Self::fetch(url)?;
        let body = resp
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        Ok(body)
    }
}

pub fn validate_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|source| {
        DownloadError::InvalidUrl {
            url: url.to_string(),
            source,
        }
    })
}
