/// Read-through caching for async computations.
///
/// Returns the cached value for `$key` when present. Otherwise, including
/// when the cache cannot be read, awaits `$block`, queues its result for a
/// background cache write with `$ttl` seconds to live, and returns it. Must
/// be used inside a function returning `AppResult<T>`.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Detail(id), CacheKey::Detail(id).ttl(), async move {
///     self.fetch_detail(id).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get_from_cache(&key).await {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
