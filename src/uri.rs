use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use url::Url;

/// A locator as the API sends it.
///
/// Strings that parse as absolute URLs become [`LenientUrl::Absolute`];
/// anything else (relative paths, `feed/...` stream ids, malformed links) is
/// kept verbatim as [`LenientUrl::Relative`]. Deserializing a string never
/// fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LenientUrl {
    Absolute(Url),
    Relative(String),
}

impl LenientUrl {
    /// Parse leniently
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) => LenientUrl::Absolute(url),
            Err(_) => LenientUrl::Relative(input.to_string()),
        }
    }

    /// The locator as sent by the server (normalized for absolute URLs)
    pub fn as_str(&self) -> &str {
        match self {
            LenientUrl::Absolute(url) => url.as_str(),
            LenientUrl::Relative(s) => s,
        }
    }

    /// The parsed URL, if the locator was absolute
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            LenientUrl::Absolute(url) => Some(url),
            LenientUrl::Relative(_) => None,
        }
    }

    /// Check if the locator parsed as an absolute URL
    pub fn is_absolute(&self) -> bool {
        matches!(self, LenientUrl::Absolute(_))
    }

    /// Resolve against a base URL; `None` if the locator cannot be joined
    pub fn resolve(&self, base: &Url) -> Option<Url> {
        match self {
            LenientUrl::Absolute(url) => Some(url.clone()),
            LenientUrl::Relative(s) => base.join(s).ok(),
        }
    }
}

impl fmt::Display for LenientUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Url> for LenientUrl {
    fn from(url: Url) -> Self {
        LenientUrl::Absolute(url)
    }
}

impl Serialize for LenientUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LenientUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LenientUrlVisitor;

        impl<'de> Visitor<'de> for LenientUrlVisitor {
            type Value = LenientUrl;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a URL string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LenientUrl, E> {
                Ok(LenientUrl::parse(v))
            }
        }

        deserializer.deserialize_str(LenientUrlVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url() {
        let url: LenientUrl = serde_json::from_str(r#""https://blog.example.com/feed""#).unwrap();
        assert!(url.is_absolute());
        assert_eq!(url.as_url().unwrap().host_str(), Some("blog.example.com"));
    }

    #[test]
    fn test_malformed_url_is_kept() {
        for raw in ["/images/logo.png", "http://exa mple.com/[bad", "feed/http://x.com/rss"] {
            let json = serde_json::to_string(raw).unwrap();
            let url: LenientUrl = serde_json::from_str(&json).unwrap();
            assert_eq!(url.as_str(), raw);
        }
    }

    #[test]
    fn test_resolve_relative() {
        let base = Url::parse("https://example.com/blog/").unwrap();
        let url = LenientUrl::parse("images/a.png");
        assert!(!url.is_absolute());
        assert_eq!(
            url.resolve(&base).unwrap().as_str(),
            "https://example.com/blog/images/a.png"
        );
    }

    #[test]
    fn test_non_string_is_rejected() {
        assert!(serde_json::from_str::<LenientUrl>("42").is_err());
    }

    #[test]
    fn test_serialize_round_trip_text() {
        let url = LenientUrl::parse("not a url");
        assert_eq!(serde_json::to_string(&url).unwrap(), r#""not a url""#);
    }
}
