use serde::{Deserialize, Deserializer};
use url::Url;

/// A single downloadable file attached to a release.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub content_type: String,
    #[serde(rename = "browser_download_url")]
    pub url: Url,
}

/// The subset of GitHub's "latest release" document that we care about. Anything else in the
/// response is ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Release {
    // GitHub error documents, like `{"message": "Not Found"}`, have no `assets` key. These, and an
    // `assets` of `null`, are treated as a release with nothing in it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) assets: Vec<Asset>,
}

impl Release {
    /// Parses a release document. A body of `null` is an empty release.
    pub(crate) fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        Ok(serde_json::from_slice::<Option<Release>>(body)?.unwrap_or_default())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Asset>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Asset>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The four path segments of an inbound request.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub owner: String,
    pub repo: String,
    pub format: String,
    pub architecture: String,
}

impl Query {
    #[must_use]
    pub fn new(owner: &str, repo: &str, format: &str, architecture: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            format: format.to_string(),
            architecture: architecture.to_string(),
        }
    }

    pub(crate) fn project_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
