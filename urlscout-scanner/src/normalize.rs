//! Canonicalisation of raw `href` values into comparable absolute URLs.
//!
//! Normalisation failures are routine (every `mailto:` link is one), so the
//! functions here return `Option` rather than an error.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use url::{Origin, Url};

const PSEUDO_SCHEMES: [&str; 3] = ["mailto:", "tel:", "javascript:"];

/// An absolute `http`/`https` URL without a fragment.
///
/// The displayed form is the `url` crate serialisation of the first spelling
/// seen. Equality and hashing use the lower-cased string, so two URLs that
/// differ only in path casing are treated as the same entry.
#[derive(Debug, Clone)]
pub struct NormalizedUrl {
    url: Url,
    key: String,
}

impl NormalizedUrl {
    /// Parses an absolute URL. Relative input is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || is_pseudo_link(raw) {
            return None;
        }
        Url::parse(raw).ok().and_then(Self::from_url)
    }

    /// Wraps an already-parsed URL, stripping the fragment.
    pub fn from_url(mut url: Url) -> Option<Self> {
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return None;
        }
        url.set_fragment(None);
        let key = url.as_str().to_lowercase();
        Some(Self { url, key })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// The lower-cased string used for deduplication.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn origin(&self) -> Origin {
        self.url.origin()
    }

    pub fn same_origin(&self, other: &NormalizedUrl) -> bool {
        self.origin() == other.origin()
    }

    pub fn into_string(self) -> String {
        self.url.into()
    }
}

impl PartialEq for NormalizedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for NormalizedUrl {}

impl Hash for NormalizedUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for NormalizedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalises a raw link found on a page.
///
/// A link starting with `/` is resolved against the origin of `base`; any
/// other input must already be an absolute URL. Fragments are dropped and
/// only `http`/`https` survive.
pub fn normalize(raw: &str, base: &Url) -> Option<NormalizedUrl> {
    let raw = raw.trim();
    if raw.is_empty() || is_pseudo_link(raw) {
        return None;
    }

    if raw.starts_with('/') {
        // An absolute-path reference only keeps scheme, host and port of base.
        return base.join(raw).ok().and_then(NormalizedUrl::from_url);
    }

    NormalizedUrl::parse(raw)
}

/// Like [`normalize`], but also resolves page-relative references such as
/// `about.html`, `../up` or `?page=2` against `page`.
pub fn normalize_relative(raw: &str, page: &Url) -> Option<NormalizedUrl> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') || is_pseudo_link(raw) {
        return None;
    }

    match Url::parse(raw) {
        Ok(absolute) => NormalizedUrl::from_url(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            page.join(raw).ok().and_then(NormalizedUrl::from_url)
        }
        Err(_) => None,
    }
}

fn is_pseudo_link(raw: &str) -> bool {
    PSEUDO_SCHEMES.iter().any(|scheme| {
        raw.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
