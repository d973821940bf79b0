/// Music gateway provider
///
/// Talks to a JSON HTTP gateway in front of the streaming service:
///
/// 1. Search: `GET /search?q=&filter=songs&limit=` → list of song records
/// 2. Artist: `GET /artists/{id}` → artist page with "songs" and "singles" shelves
/// 3. Suggestions: `GET /suggestions?q=` → list of strings
/// 4. Stream: `GET /stream/{video_id}` → `{url, title}`, 404 for unknown tracks
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{ArtistCatalog, CatalogTrack, StreamSource},
    services::providers::ExternalCatalog,
};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const ARTIST_CACHE_TTL: u64 = 86400; // 1 day
const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Clone)]
pub struct MusicGatewayProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    cache: Cache,
}

impl MusicGatewayProvider {
    pub fn new(cache: Cache, api_url: String, api_key: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            cache,
        }
    }

    /// Gateway URL under the base URL. Each segment is percent-encoded on
    /// its own, so ids cannot leave their segment or add a query.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_url).map_err(|e| {
            AppError::Internal(format!("Invalid gateway URL {}: {}", self.api_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal(format!("Gateway URL cannot have a path: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str]) -> AppResult<RequestBuilder> {
        let request = self.http_client.get(self.endpoint(segments)?);
        Ok(match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        })
    }

    /// Turns a non-success status into an `ExternalApi` error
    async fn check_status(response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalApi(format!(
            "Gateway returned status {}: {}",
            status, body
        )))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = Self::check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    fn reject_blank(query: &str) -> AppResult<()> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn reject_invalid_id(id: &str) -> AppResult<()> {
        if matches!(id.trim(), "" | "." | "..") {
            return Err(AppError::InvalidInput(format!("Invalid catalog id: {:?}", id)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ExternalCatalog for MusicGatewayProvider {
    async fn search_songs(&self, query: &str, limit: usize) -> AppResult<Vec<CatalogTrack>> {
        Self::reject_blank(query)?;

        cached!(
            self.cache,
            CacheKey::SongSearch {
                query: query.to_string(),
                limit,
            },
            SEARCH_CACHE_TTL,
            async {
                let limit_param = limit.to_string();
                let mut songs: Vec<CatalogTrack> = self
                    .fetch_json(self.get(&["search"])?.query(&[
                        ("q", query),
                        ("filter", "songs"),
                        ("limit", limit_param.as_str()),
                    ]))
                    .await?;
                songs.truncate(limit);

                tracing::info!(
                    query = %query,
                    results = songs.len(),
                    provider = self.name(),
                    "Song search completed"
                );

                Ok::<_, AppError>(songs)
            }
        )
    }

    async fn artist(&self, artist_id: &str) -> AppResult<ArtistCatalog> {
        Self::reject_invalid_id(artist_id)?;

        cached!(
            self.cache,
            CacheKey::Artist(artist_id.to_string()),
            ARTIST_CACHE_TTL,
            async {
                let catalog: ArtistCatalog = self
                    .fetch_json(self.get(&["artists", artist_id])?)
                    .await?;

                tracing::info!(
                    artist_id = %artist_id,
                    artist = %catalog.name,
                    songs = catalog.songs.as_ref().map_or(0, |s| s.results.len()),
                    singles = catalog.singles.as_ref().map_or(0, |s| s.results.len()),
                    provider = self.name(),
                    "Artist catalog fetched"
                );

                Ok::<_, AppError>(catalog)
            }
        )
    }

    async fn suggestions(&self, query: &str) -> AppResult<Vec<String>> {
        Self::reject_blank(query)?;
        self.fetch_json(self.get(&["suggestions"])?.query(&[("q", query)]))
            .await
    }

    async fn stream_source(&self, video_id: &str) -> AppResult<Option<StreamSource>> {
        Self::reject_invalid_id(video_id)?;

        let response = self.get(&["stream", video_id])?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(video_id = %video_id, "Gateway does not know this track");
            return Ok(None);
        }

        let source: StreamSource = Self::check_status(response).await?.json().await?;
        Ok(Some(source))
    }

    fn name(&self) -> &'static str {
        "music_gateway"
    }
}
