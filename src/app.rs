use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use reqwest::Client;
use tokio::{net::TcpListener, time::timeout};
use tokio_cron_scheduler::JobScheduler;

use crate::{
    ai::LinearUrlModel,
    cache::{MemoryResultCache, ResultCache, SqliteResultCache},
    captcha::RecaptchaClient,
    config::{AppConfig, CacheBackend},
    db::{self, contacts::ContactRepository},
    detection::DetectionService,
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    liveness::HttpLivenessProbe,
    tasks::scheduler::configure_cache_purge,
    web::{self, AppState},
};

pub struct PhishShieldApp {
    listener: TcpListener,
    router: Router,
    scheduler: JobScheduler,
    contacts: ContactRepository,
    shutdown: Shutdown,
}

impl PhishShieldApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let pool = db::init_pool(&paths.db_path).await?;
        let contacts = ContactRepository::new(pool.clone());

        let model = LinearUrlModel::load(&config.model.path)?;
        tracing::info!(
            target: "detect",
            path = %config.model.path.display(),
            classes = ?model.classes(),
            vocabulary = model.vocabulary_size(),
            "url model loaded"
        );

        let cache: Arc<dyn ResultCache> = match config.cache.backend {
            CacheBackend::Sqlite => Arc::new(SqliteResultCache::new(pool)),
            CacheBackend::Memory => Arc::new(MemoryResultCache::new()),
        };
        tracing::info!(
            target: "cache",
            backend = ?config.cache.backend,
            ttl_secs = config.cache.ttl.as_secs(),
            "result cache ready"
        );

        let http_client = Client::builder()
            .user_agent(format!("phishshield/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let probe = Arc::new(HttpLivenessProbe::new(http_client.clone(), &config.liveness));
        let captcha = Arc::new(RecaptchaClient::new(http_client, config.recaptcha.clone()));
        let detection = Arc::new(DetectionService::new(
            cache.clone(),
            probe,
            Arc::new(model),
            config.cache.ttl,
        ));

        let scheduler = configure_cache_purge(&config.cache.purge_cron, cache).await?;

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.bind_addr))?;

        let state = Arc::new(AppState {
            config,
            detection,
            captcha,
            contacts: contacts.clone(),
        });

        Ok(Self {
            listener,
            router: web::router(state),
            scheduler,
            contacts,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let PhishShieldApp {
            listener,
            router,
            mut scheduler,
            contacts,
            shutdown,
        } = self;

        let shutdown_timeout = Duration::from_secs(5);
        let addr = listener.local_addr()?;
        tracing::info!(target: "http", %addr, "PhishShield listening");

        let mut shutdown_listener = shutdown.subscribe();
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_listener.notified().await;
                tracing::info!("shutdown signal received (CTRL+C / SIGTERM)");
            })
            .await;
        shutdown.trigger();

        if let Err(err) = &served {
            tracing::error!(target: "http", error = %err, "server stopped with error");
        }

        match timeout(shutdown_timeout, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(target: "scheduler", ?err, "scheduler shutdown failed");
            }
            Err(_) => {
                tracing::warn!(
                    target: "scheduler",
                    "scheduler did not stop within {:?}",
                    shutdown_timeout
                );
            }
        }

        if timeout(shutdown_timeout, contacts.close()).await.is_err() {
            tracing::warn!(
                target: "db",
                "database pool did not close within {:?}",
                shutdown_timeout
            );
        }

        tracing::info!("PhishShield stopped");
        served.context("http server failed")
    }
}
