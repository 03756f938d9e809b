//! Canonical URLs on the source site.
//!
//! Every identifier in the pipeline is derived from a [`CanonicalUrl`], so
//! two spellings of the same page (query noise, fragment, missing trailing
//! slash, `www.` prefix) always map to the same cache key.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{ScrapeError, ScrapeResult};

pub const DEFAULT_BASE_URL: &str = "https://chireads.com";

static CHAPTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)chap(?:itre|ter)-(\d+)").expect("chapter slug regex is valid"));

/// Kind of page a URL points to, judged from its path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Category,
    Novel,
    Chapter,
    Other,
}

/// The trusted site all fetches are restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSite {
    base: Url,
}

impl SourceSite {
    pub fn new(base_url: &str) -> ScrapeResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ScrapeError::invalid_url(base_url, e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(ScrapeError::invalid_url(
                base_url,
                "base url must be an absolute http(s) url",
            ));
        }
        Ok(Self { base })
    }

    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    pub fn home(&self) -> CanonicalUrl {
        let mut url = self.base.clone();
        url.set_path("/");
        url.set_query(None);
        url.set_fragment(None);
        CanonicalUrl(url)
    }

    /// Canonicalize an absolute URL, rejecting relative or foreign input.
    pub fn canonicalize(&self, raw: &str) -> ScrapeResult<CanonicalUrl> {
        let parsed = Url::parse(raw.trim())
            .map_err(|e| ScrapeError::invalid_url(raw, e.to_string()))?;
        self.normalize(parsed, raw)
    }

    /// Resolve a possibly relative href found on `page`, then canonicalize.
    pub fn resolve(&self, page: &CanonicalUrl, href: &str) -> ScrapeResult<CanonicalUrl> {
        let joined = page
            .0
            .join(href.trim())
            .map_err(|e| ScrapeError::invalid_url(href, e.to_string()))?;
        self.normalize(joined, href)
    }

    fn normalize(&self, mut url: Url, raw: &str) -> ScrapeResult<CanonicalUrl> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScrapeError::invalid_url(raw, "unsupported scheme"));
        }

        let host = url
            .host_str()
            .map(|h| h.trim_start_matches("www.").to_string())
            .ok_or_else(|| ScrapeError::invalid_url(raw, "missing host"))?;
        if host != self.host().trim_start_matches("www.") {
            return Err(ScrapeError::invalid_url(
                raw,
                format!("host `{}` is outside {}", host, self.host()),
            ));
        }
        if url.port_or_known_default() != self.base.port_or_known_default()
            && url.scheme() == self.base.scheme()
        {
            return Err(ScrapeError::invalid_url(raw, "port mismatch"));
        }

        url.set_scheme(self.base.scheme())
            .map_err(|_| ScrapeError::invalid_url(raw, "cannot normalize scheme"))?;
        url.set_host(self.base.host_str())
            .map_err(|e| ScrapeError::invalid_url(raw, e.to_string()))?;
        url.set_port(self.base.port())
            .map_err(|_| ScrapeError::invalid_url(raw, "cannot normalize port"))?;
        url.set_query(None);
        url.set_fragment(None);

        let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
        let path = if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", segments.join("/"))
        };
        url.set_path(&path);

        Ok(CanonicalUrl(url))
    }
}

impl Default for SourceSite {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
        }
    }
}

/// An absolute, normalized URL on the source site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn segments(&self) -> Vec<&str> {
        self.0.path().split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Last non-empty path segment, or an empty string for the home page.
    pub fn slug(&self) -> &str {
        self.0
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .unwrap_or("")
    }

    /// The page one path segment up, `None` for the home page.
    pub fn parent(&self) -> Option<CanonicalUrl> {
        let segments = self.segments();
        let (_, rest) = segments.split_last()?;
        let path = if rest.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", rest.join("/"))
        };
        let mut url = self.0.clone();
        url.set_path(&path);
        Some(CanonicalUrl(url))
    }

    pub fn kind(&self) -> PageKind {
        let segments = self.segments();
        match segments.as_slice() {
            [] => PageKind::Home,
            ["category", _] => PageKind::Category,
            ["category", _, _] => PageKind::Novel,
            ["category", _, _, _] => PageKind::Chapter,
            [_, _, slug] if CHAPTER_NUMBER.is_match(slug) => PageKind::Chapter,
            _ => PageKind::Other,
        }
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Serialize for CanonicalUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CanonicalUrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Url::parse(&raw)
            .map(CanonicalUrl)
            .map_err(serde::de::Error::custom)
    }
}

macro_rules! page_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(CanonicalUrl);

        impl $name {
            pub fn new(url: CanonicalUrl) -> Self {
                Self(url)
            }

            pub fn url(&self) -> &CanonicalUrl {
                &self.0
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            pub fn slug(&self) -> &str {
                self.0.slug()
            }
        }

        impl From<CanonicalUrl> for $name {
            fn from(url: CanonicalUrl) -> Self {
                Self(url)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

page_id!(
    /// Identity of a chapter page: its canonical URL.
    ChapterId
);

page_id!(
    /// Identity of a novel page: its canonical URL.
    NovelId
);

impl ChapterId {
    /// Chapter number taken from a `chapitre-N` / `chapter-N` slug.
    pub fn number(&self) -> Option<u32> {
        CHAPTER_NUMBER
            .captures(self.slug())
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// The novel page a chapter URL lives under.
    pub fn novel_id(&self) -> Option<NovelId> {
        if self.0.kind() != PageKind::Chapter {
            return None;
        }
        self.0.parent().map(NovelId::new)
    }
}

/// Turn a slug like `super-gene` into `Super Gene`.
pub fn slug_to_title(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
