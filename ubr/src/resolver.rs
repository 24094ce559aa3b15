use crate::{
    assets::{Asset, Query, Release},
    picker::AssetPicker,
};
use anyhow::{anyhow, Result};
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client,
};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// The total time allowed for one upstream request, from connecting until the body is read.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(2);

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// The ways that resolving an asset can fail. Not finding a matching asset is not an error.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The upstream API could not be reached, the connection failed, or the request timed out.
    #[error("request for release info from {url} failed")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    /// The upstream response body was not a release document.
    #[error("could not parse release info from {url}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

/// `Resolver` looks up the latest release for a project and picks the asset matching a query.
///
/// It holds no per-request state, so a single instance can be shared by all request handlers.
#[derive(Clone, Debug)]
pub struct Resolver {
    client: Client,
    api_base_url: Url,
}

impl Resolver {
    /// Creates a new resolver that talks to the API at `api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_base_url` cannot have path segments appended to it (for example a
    /// `mailto:` URL) or if the HTTP client cannot be built.
    pub fn new(api_base_url: Url) -> Result<Self> {
        if api_base_url.cannot_be_a_base() {
            return Err(anyhow!(
                "the API base URL `{api_base_url}` cannot be used as a base for other URLs"
            ));
        }

        Ok(Self {
            client: reqwest_client()?,
            api_base_url,
        })
    }

    /// Finds the first asset in the project's latest release that matches the query's format and
    /// architecture. Returns `Ok(None)` when the release has no such asset.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Network`] if the upstream request fails or times out, and
    /// [`ResolveError::Decode`] if the response is not a release document. The upstream status
    /// code is not checked, so an error response usually shows up as one of these or as a release
    /// with no assets.
    pub async fn resolve(&self, query: &Query) -> Result<Option<Asset>, ResolveError> {
        debug!("Fetching assets for project `{}`", query.project_name());
        let release = self.fetch_release(&query.owner, &query.repo).await?;

        let picker = AssetPicker::new(&query.format, &query.architecture);
        Ok(picker.pick_asset(release.assets))
    }

    async fn fetch_release(&self, owner: &str, repo: &str) -> Result<Release, ResolveError> {
        let url = self.release_info_url(owner, repo);
        debug!("Getting release info from `{url}`");

        let network_err = |source| ResolveError::Network {
            url: url.clone(),
            source,
        };

        let resp = self
            .client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(network_err)?;

        let status = resp.status();
        if !status.is_success() {
            warn!("got {status} from `{url}`, will try to parse the body anyway");
        }

        let body = resp.bytes().await.map_err(network_err)?;
        Release::from_json(&body).map_err(|source| ResolveError::Decode {
            url: url.clone(),
            source,
        })
    }

    pub(crate) fn release_info_url(&self, owner: &str, repo: &str) -> Url {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .expect("could not get path segments for url")
            .pop_if_empty()
            .extend(["repos", owner, repo, "releases", "latest"]);
        url
    }
}

fn reqwest_client() -> Result<Client> {
    let builder = Client::builder().gzip(true).timeout(UPSTREAM_TIMEOUT);

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&format!("ubr version {}", crate::VERSION))?,
    );
    Ok(builder.default_headers(headers).build()?)
}
