use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Normalize a user supplied hashtag: trim whitespace and strip leading `#` markers.
///
/// Returns an empty string when nothing usable remains.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().trim_start_matches('#').trim().to_string()
}

/// Kind of a remote media item as reported by the source.
///
/// Only [`MediaKind::Image`] is ingested; everything else is carried through so
/// it can be logged as unhandled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaKind {
    Image,
    Video,
    CarouselAlbum,
    Other(String),
}

impl MediaKind {
    pub fn as_str(&self) -> &str {
        match self {
            MediaKind::Image => "IMAGE",
            MediaKind::Video => "VIDEO",
            MediaKind::CarouselAlbum => "CAROUSEL_ALBUM",
            MediaKind::Other(kind) => kind,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MediaKind::Image)
    }
}

impl From<String> for MediaKind {
    fn from(value: String) -> Self {
        match value.to_uppercase().as_str() {
            "IMAGE" => MediaKind::Image,
            "VIDEO" => MediaKind::Video,
            "CAROUSEL_ALBUM" | "CAROUSEL" => MediaKind::CarouselAlbum,
            _ => MediaKind::Other(value),
        }
    }
}

impl From<&str> for MediaKind {
    fn from(value: &str) -> Self {
        MediaKind::from(value.to_string())
    }
}

impl From<MediaKind> for String {
    fn from(kind: MediaKind) -> Self {
        kind.as_str().to_string()
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// One remote media item from a listing call. Never persisted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub id: String,
    pub kind: MediaKind,
    pub source_url: Option<String>,
    pub caption: String,
    pub permalink: String,
    /// Creation time as reported by the source, unparsed.
    pub timestamp: Option<String>,
}

impl MediaDescriptor {
    /// Source URL if present and non-blank.
    pub fn usable_source_url(&self) -> Option<&str> {
        self.source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Ranking used when listing media for a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Recent,
    Top,
}

impl SearchMode {
    /// Name of the remote edge serving this ranking.
    pub fn edge(&self) -> &'static str {
        match self {
            SearchMode::Recent => "recent_media",
            SearchMode::Top => "top_media",
        }
    }
}

impl FromStr for SearchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recent" | "recent_media" => Ok(SearchMode::Recent),
            "top" | "top_media" => Ok(SearchMode::Top),
            _ => Err(anyhow::anyhow!("Invalid search mode: {}", s)),
        }
    }
}

impl Display for SearchMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SearchMode::Recent => write!(f, "recent"),
            SearchMode::Top => write!(f, "top"),
        }
    }
}
