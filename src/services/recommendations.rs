use std::sync::Arc;

use crate::{
    config::Config,
    db::Store,
    models::{CatalogTrack, HomeFeed, Track},
    services::providers::ExternalCatalog,
};

/// Constants behind home feed generation
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Tracks taken from the artist page of the last played artist
    pub artist_track_limit: usize,
    /// Fixed search query for the generic feed
    pub fallback_query: String,
    pub fallback_limit: usize,
    pub popular_title: String,
    /// Title shown when no strategy produced anything
    pub unavailable_title: String,
    /// Artist name for generic feed tracks that carry none
    pub popular_default_artist: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            artist_track_limit: 8,
            fallback_query: "Hits Poland Rap Pop".to_string(),
            fallback_limit: 20,
            popular_title: "🔥 Trending hits in Poland".to_string(),
            unavailable_title: "Couldn't load trending hits".to_string(),
            popular_default_artist: "Various artists".to_string(),
        }
    }
}

impl From<&Config> for FeedConfig {
    fn from(config: &Config) -> Self {
        Self {
            fallback_query: config.feed_fallback_query.clone(),
            popular_title: config.feed_popular_title.clone(),
            unavailable_title: config.feed_unavailable_title.clone(),
            ..Self::default()
        }
    }
}

/// Ways of filling the home feed, tried in order until one yields a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStrategy {
    /// Songs by the artist of the user's most recent play
    ListeningHistory,
    /// Generic popular songs; always yields, possibly with no tracks
    Popular,
}

/// Picks the tracks shown on a user's home screen.
///
/// Never fails: store and catalog errors are logged and make the current
/// strategy fall through to the next one.
pub struct HomeFeedSelector {
    store: Store,
    catalog: Arc<dyn ExternalCatalog>,
    config: FeedConfig,
    strategies: Vec<FeedStrategy>,
}

impl HomeFeedSelector {
    pub fn new(store: Store, catalog: Arc<dyn ExternalCatalog>, config: FeedConfig) -> Self {
        Self {
            store,
            catalog,
            config,
            strategies: vec![FeedStrategy::ListeningHistory, FeedStrategy::Popular],
        }
    }

    /// Replaces the strategy cascade
    pub fn with_strategies(mut self, strategies: Vec<FeedStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub async fn home_feed(&self, user_id: i64) -> HomeFeed {
        for strategy in &self.strategies {
            if let Some(feed) = self.run(*strategy, user_id).await {
                tracing::debug!(
                    user_id,
                    strategy = ?strategy,
                    tracks = feed.tracks.len(),
                    "Home feed selected"
                );
                return feed;
            }
        }

        HomeFeed {
            title: self.config.unavailable_title.clone(),
            tracks: Vec::new(),
        }
    }

    async fn run(&self, strategy: FeedStrategy, user_id: i64) -> Option<HomeFeed> {
        match strategy {
            FeedStrategy::ListeningHistory => self.from_listening_history(user_id).await,
            FeedStrategy::Popular => Some(self.popular().await),
        }
    }

    async fn from_listening_history(&self, user_id: i64) -> Option<HomeFeed> {
        let last_played = match self.store.latest_history_entry(user_id).await {
            Ok(entry) => entry?,
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Failed to read listening history");
                return None;
            }
        };
        let artist_id = last_played.artist_id.as_deref().filter(|id| !id.is_empty())?;

        let artist = match self.catalog.artist(artist_id).await {
            Ok(artist) => artist,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    artist_id = %artist_id,
                    provider = self.catalog.name(),
                    "Artist lookup failed, falling back"
                );
                return None;
            }
        };

        let tracks = normalize(
            artist
                .top_listing()
                .iter()
                .take(self.config.artist_track_limit),
            &last_played.artist_name,
        );

        if tracks.is_empty() {
            return None;
        }

        Some(HomeFeed {
            title: format!("Because you listen to {}", last_played.artist_name),
            tracks,
        })
    }

    async fn popular(&self) -> HomeFeed {
        match self
            .catalog
            .search_songs(&self.config.fallback_query, self.config.fallback_limit)
            .await
        {
            Ok(songs) => HomeFeed {
                title: self.config.popular_title.clone(),
                tracks: normalize(
                    songs.iter().take(self.config.fallback_limit),
                    &self.config.popular_default_artist,
                ),
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = self.catalog.name(),
                    "Popular songs search failed"
                );
                HomeFeed {
                    title: self.config.unavailable_title.clone(),
                    tracks: Vec::new(),
                }
            }
        }
    }
}

fn normalize<'a>(records: impl Iterator<Item = &'a CatalogTrack>, default_artist: &str) -> Vec<Track> {
    records
        .filter_map(|record| record.to_track(default_artist))
        .collect()
}
