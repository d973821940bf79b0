//! External music catalog abstraction
//!
//! The catalog is the only source of track metadata and audio URLs. It is
//! injected into the application state, so tests and alternative gateways can
//! stand in for the HTTP implementation.

use crate::{
    error::AppResult,
    models::{ArtistCatalog, CatalogTrack, StreamSource},
};

pub mod music_gateway;

pub use music_gateway::MusicGatewayProvider;

/// Trait for music catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExternalCatalog: Send + Sync {
    /// Searches songs by free text, returning at most `limit` records
    async fn search_songs(&self, query: &str, limit: usize) -> AppResult<Vec<CatalogTrack>>;

    /// Fetches an artist page with its song and single listings
    async fn artist(&self, artist_id: &str) -> AppResult<ArtistCatalog>;

    /// Query completions for a partial search string
    async fn suggestions(&self, query: &str) -> AppResult<Vec<String>>;

    /// Resolves a direct audio URL for a track; `None` when the track is unknown
    async fn stream_source(&self, video_id: &str) -> AppResult<Option<StreamSource>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
