use crate::assets::Asset;
use itertools::Itertools;
use log::debug;

/// A rule describing which release asset satisfies a (format, architecture) pair from the request
/// path.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct MatchRule {
    pub(crate) format: &'static str,
    pub(crate) architecture: &'static str,
    pub(crate) content_type: &'static str,
    pub(crate) name_fragment: &'static str,
}

// Supporting another format or architecture means adding a row here. A pair with no row can never
// match anything.
pub(crate) const RULES: &[MatchRule] = &[MatchRule {
    format: "gzip",
    architecture: "linux",
    content_type: "application/gzip",
    name_fragment: "linux",
}];

impl MatchRule {
    /// Looks up the rule for the given pair. Both values are compared exactly, so `Gzip` or
    /// `LINUX` find nothing.
    pub(crate) fn for_query(format: &str, architecture: &str) -> Option<&'static MatchRule> {
        RULES
            .iter()
            .find(|r| r.format == format && r.architecture == architecture)
    }

    // The content type has to match exactly, including case. The name check is a case-insensitive
    // substring match.
    fn matches(&self, asset: &Asset) -> bool {
        if asset.content_type != self.content_type {
            debug!(
                "content type `{}` is not `{}`",
                asset.content_type, self.content_type,
            );
            return false;
        }
        if !asset.name.to_lowercase().contains(self.name_fragment) {
            debug!("name does not contain `{}`", self.name_fragment);
            return false;
        }
        true
    }
}

#[derive(Debug)]
pub(crate) struct AssetPicker {
    rule: Option<&'static MatchRule>,
}

impl AssetPicker {
    pub(crate) fn new(format: &str, architecture: &str) -> Self {
        Self {
            rule: MatchRule::for_query(format, architecture),
        }
    }

    /// Returns the first asset, in the order given, that satisfies our rule.
    pub(crate) fn pick_asset(&self, assets: Vec<Asset>) -> Option<Asset> {
        let Some(rule) = self.rule else {
            debug!("there is no rule for this format and architecture, so nothing can match");
            return None;
        };

        if assets.is_empty() {
            debug!("the release has no assets");
            return None;
        }

        debug!(
            "picking from assets {} using content type `{}` and name fragment `{}`",
            assets.iter().map(|a| a.name.as_str()).join(", "),
            rule.content_type,
            rule.name_fragment,
        );

        // This could all be done with the iterator's .find() method, but then there's no place to
        // put the debugging output.
        for asset in assets {
            debug!("matching against asset name = {}", asset.name);
            if rule.matches(&asset) {
                debug!("picked asset named {}", asset.name);
                return Some(asset);
            }
        }

        debug!("no asset matched");
        None
    }
}
