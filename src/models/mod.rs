use serde::{Deserialize, Serialize};

pub mod history;
pub mod playlist;
pub mod user;

pub use history::{HistoryEntry, NewHistoryEntry};
pub use playlist::{NewPlaylistEntry, Playlist, PlaylistEntry, PlaylistWithEntries};
pub use user::User;

/// A playable track as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    /// External track identifier (music gateway video id)
    pub id: String,
    pub title: String,
    pub artist: String,
    /// URL of the largest thumbnail variant, or empty
    pub thumbnail: String,
}

/// A search result: a track plus the artist id, which clients send back when
/// recording history so the home feed can follow the artist
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchHit {
    #[serde(flatten)]
    pub track: Track,
    pub artist_id: Option<String>,
}

/// One home feed section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomeFeed {
    /// Human readable label describing why these tracks were picked
    pub title: String,
    pub tracks: Vec<Track>,
}

// ============================================================================
// Music Gateway API Types
// ============================================================================

/// Song record as returned by the music gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrack {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artists: Vec<CatalogArtistRef>,
    /// Image variants, smallest first
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogArtistRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Artist page as returned by GET /artists/{id}
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtistCatalog {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub songs: Option<CatalogShelf>,
    #[serde(default)]
    pub singles: Option<CatalogShelf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogShelf {
    #[serde(default)]
    pub results: Vec<CatalogTrack>,
}

/// Direct audio source resolved by the gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamSource {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl CatalogTrack {
    /// URL of the last (highest resolution) thumbnail, or an empty string
    pub fn best_thumbnail(&self) -> &str {
        self.thumbnails
            .last()
            .map(|thumb| thumb.url.as_str())
            .unwrap_or_default()
    }

    pub fn primary_artist(&self) -> Option<&CatalogArtistRef> {
        self.artists.first()
    }

    /// Normalizes the record into a [`Track`].
    ///
    /// Returns `None` for records without a video id, which cannot be played.
    pub fn to_track(&self, default_artist: &str) -> Option<Track> {
        let id = self.video_id.as_deref().filter(|id| !id.is_empty())?;

        let artist = self
            .primary_artist()
            .map(|artist| artist.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(default_artist);

        Some(Track {
            id: id.to_string(),
            title: self.title.clone(),
            artist: artist.to_string(),
            thumbnail: self.best_thumbnail().to_string(),
        })
    }

    pub fn to_search_hit(&self, default_artist: &str) -> Option<SearchHit> {
        let track = self.to_track(default_artist)?;
        let artist_id = self.primary_artist().and_then(|artist| artist.id.clone());

        Some(SearchHit { track, artist_id })
    }
}

impl ArtistCatalog {
    /// The listing recommendations are drawn from: "songs" when present and
    /// non-empty, otherwise "singles", otherwise nothing.
    pub fn top_listing(&self) -> &[CatalogTrack] {
        match (&self.songs, &self.singles) {
            (Some(songs), _) if !songs.results.is_empty() => songs.results.as_slice(),
            (_, Some(singles)) => singles.results.as_slice(),
            _ => &[],
        }
    }
}
