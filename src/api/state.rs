use std::{sync::Arc, time::Duration};

use crate::{
    config::{Config, StorageBackend},
    db::{self, Cache, CacheWriterHandle, MemoryKeyValueStore, RedisKeyValueStore},
    services::{
        auth::{
            AuthGateway, IdentityProvider, KeyValueIdentityProvider, OAuthVerifier,
            PostgresIdentityProvider, UserInfoVerifier, DEFAULT_SESSION_IDLE_TIMEOUT,
        },
        browse::BrowseService,
        catalog::{MovieCatalog, TmdbClient},
        trending::{InMemoryMetricStore, MetricStore, PostgresMetricStore, RedisMetricStore},
        watchlist::{KeyValueWatchlistStore, PostgresWatchlistStore, WatchlistStore},
    },
};

/// Shared application state
///
/// Every service sits behind an `Arc`, so cloning the state per request is
/// cheap and all handlers see the same stores and sessions.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGateway>,
    pub watchlist: Arc<dyn WatchlistStore>,
    pub trending: Arc<dyn MetricStore>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub browse: Arc<BrowseService>,
}

impl AppState {
    pub fn new(
        auth: AuthGateway,
        watchlist: Arc<dyn WatchlistStore>,
        trending: Arc<dyn MetricStore>,
        catalog: Arc<dyn MovieCatalog>,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            browse: Arc::new(BrowseService::new(catalog.clone(), trending.clone())),
            watchlist,
            trending,
            catalog,
        }
    }

    /// Process-local stores around the given catalog and OAuth verifier
    pub fn in_memory(catalog: Arc<dyn MovieCatalog>, oauth: Arc<dyn OAuthVerifier>) -> Self {
        Self::in_memory_with_idle_timeout(catalog, oauth, DEFAULT_SESSION_IDLE_TIMEOUT)
    }

    fn in_memory_with_idle_timeout(
        catalog: Arc<dyn MovieCatalog>,
        oauth: Arc<dyn OAuthVerifier>,
        idle_timeout: Duration,
    ) -> Self {
        let identity: Arc<dyn IdentityProvider> = Arc::new(KeyValueIdentityProvider::new(Arc::new(
            MemoryKeyValueStore::new(),
        )));

        Self::new(
            AuthGateway::new(identity, oauth).with_idle_timeout(idle_timeout),
            Arc::new(KeyValueWatchlistStore::new(Arc::new(
                MemoryKeyValueStore::new(),
            ))),
            Arc::new(InMemoryMetricStore::new()),
            catalog,
        )
    }

    /// Composes the state for the configured backends
    ///
    /// Returns the cache writer handle when response caching is enabled so
    /// the caller can flush it on shutdown.
    pub async fn from_config(config: &Config) -> anyhow::Result<(Self, Option<CacheWriterHandle>)> {
        let (cache, cache_writer) = if config.cache_enabled {
            let client = db::create_redis_client(&config.redis_url)?;
            let (cache, handle) = Cache::new(client);
            tracing::info!("TMDB response cache enabled");
            (cache, Some(handle))
        } else {
            (Cache::disabled(), None)
        };

        let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbClient::new(
            cache,
            config.tmdb_api_token.clone(),
            config.tmdb_api_url.clone(),
        ));

        let oauth: Arc<dyn OAuthVerifier> =
            Arc::new(UserInfoVerifier::new().with_provider("google", &config.google_userinfo_url));
        let idle_timeout = config.session_idle_timeout();

        let state = match config.storage_backend {
            StorageBackend::Memory => Self::in_memory_with_idle_timeout(catalog, oauth, idle_timeout),
            StorageBackend::Redis => {
                let client = db::create_redis_client(&config.redis_url)?;
                let kv = Arc::new(RedisKeyValueStore::connect(client.clone()).await?);
                let identity: Arc<dyn IdentityProvider> =
                    Arc::new(KeyValueIdentityProvider::new(kv.clone()));
                Self::new(
                    AuthGateway::new(identity, oauth).with_idle_timeout(idle_timeout),
                    Arc::new(KeyValueWatchlistStore::new(kv)),
                    Arc::new(RedisMetricStore::connect(client).await?),
                    catalog,
                )
            }
            StorageBackend::Postgres => {
                let pool = db::create_pool(&config.database_url).await?;
                let identity: Arc<dyn IdentityProvider> =
                    Arc::new(PostgresIdentityProvider::new(pool.clone()));
                Self::new(
                    AuthGateway::new(identity, oauth).with_idle_timeout(idle_timeout),
                    Arc::new(PostgresWatchlistStore::new(pool.clone())),
                    Arc::new(PostgresMetricStore::new(pool)),
                    catalog,
                )
            }
        };

        tracing::info!(
            backend = ?config.storage_backend,
            watchlist = state.watchlist.name(),
            trending = state.trending.name(),
            catalog = state.catalog.name(),
            "Application state ready"
        );

        Ok((state, cache_writer))
    }
}
