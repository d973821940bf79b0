/// Read-through caching for gateway lookups.
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues its result for caching with `$ttl` seconds to live, and
/// returns it. Cache read failures are logged and treated as misses so that an
/// unavailable Redis never takes the gateway down with it.
///
/// # Example
/// ```rust,ignore
/// let artist: ArtistCatalog = cached!(self.cache, CacheKey::Artist(id.to_string()), 86400, async {
///     self.fetch_artist(id).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache lookup failed");
                }
                match $block.await {
                    Ok(value) => {
                        $cache.set_in_background(&key, &value, $ttl);
                        Ok(value)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }};
}
