use std::{process, sync::Arc, time::Duration};

use sitedesk::{
    application::{
        admin::{AdminContentService, AdminProductService},
        error::AppError,
        repos::{HealthRepo, ProductsRepo, SingletonRepo},
    },
    cache::{
        CacheConfig, CacheConsumer, CacheRegistry, CacheState, CacheTrigger, EventQueue, L1Store,
    },
    config,
    infra::{
        admin_client::{AdminClient, ResetOutcome},
        db::PostgresRepositories,
        error::InfraError,
        http, telemetry,
    },
};
use sitedesk_api_types::SingletonKind;
use tokio::{sync::watch, try_join};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(InfraError::from)?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Reset(args) => run_reset(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories.clone(), &settings);

    let cache_handle = app.cache_trigger.clone().map(|trigger| {
        let interval_ms = trigger.config().auto_consume_interval_ms;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
            interval.tick().await; // first tick is immediate
            loop {
                interval.tick().await;
                trigger.consumer().consume_all().await;
            }
        })
    });

    let result = serve_http(&settings, app.api_state, app.cache_state).await;

    if let Some(handle) = cache_handle {
        handle.abort();
        let _ = handle.await;
    }
    repositories.close().await;
    info!(target = "sitedesk::serve", "Shutdown complete");

    result
}

async fn run_reset(settings: config::Settings, args: config::ResetArgs) -> Result<(), AppError> {
    let kind = SingletonKind::from(args.kind);
    let client = match args.admin_url.as_deref() {
        Some(url) => AdminClient::new(url),
        None => AdminClient::for_listener(settings.server.admin_addr),
    }
    .map_err(InfraError::from)?;

    let outcome = client.reset(kind).await.map_err(InfraError::from)?;
    match outcome {
        ResetOutcome::Removed { message } => {
            info!(target = "sitedesk::reset", kind = %kind, admin = %client.base(), "{message}");
        }
        ResetOutcome::NothingStored => {
            info!(target = "sitedesk::reset", kind = %kind, "No document stored; nothing to reset");
        }
    }
    Ok(())
}

struct ApplicationContext {
    api_state: http::ApiState,
    cache_state: Option<CacheState>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(
        database_url,
        settings.database.max_connections.get(),
        settings.database.acquire_timeout,
    )
    .await
    .map_err(InfraError::from)?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> ApplicationContext {
    let singletons_repo: Arc<dyn SingletonRepo> = repositories.clone();
    let products_repo: Arc<dyn ProductsRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories;

    let cache_config = CacheConfig::from(&settings.cache);
    let (cache_trigger, cache_state) = if cache_config.is_enabled() {
        let l1 = Arc::new(L1Store::new(&cache_config));
        let registry = Arc::new(CacheRegistry::new());
        let queue = Arc::new(EventQueue::new_with_limit(cache_config.max_event_queue_len));
        let consumer = Arc::new(CacheConsumer::new(
            cache_config.clone(),
            l1.clone(),
            registry.clone(),
            queue.clone(),
        ));
        let trigger = Arc::new(CacheTrigger::new(cache_config.clone(), queue, consumer));
        let state = CacheState {
            config: cache_config,
            l1,
            registry,
        };
        (Some(trigger), Some(state))
    } else {
        (None, None)
    };

    let content = Arc::new(
        AdminContentService::new(singletons_repo, products_repo.clone())
            .with_cache_trigger_opt(cache_trigger.clone()),
    );
    let products = Arc::new(
        AdminProductService::new(products_repo).with_cache_trigger_opt(cache_trigger.clone()),
    );

    ApplicationContext {
        api_state: http::ApiState {
            content,
            products,
            health: health_repo,
        },
        cache_state,
        cache_trigger,
    }
}

async fn serve_http(
    settings: &config::Settings,
    api_state: http::ApiState,
    cache_state: Option<CacheState>,
) -> Result<(), AppError> {
    let public_router = http::build_public_router(api_state.clone(), cache_state);
    let admin_router = http::build_admin_router(api_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(InfraError::from)?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "sitedesk::serve",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "Listening"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for shutdown signal");
            return;
        }
        info!(target = "sitedesk::serve", "Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(shutdown_requested(shutdown_rx.clone()));
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(shutdown_requested(shutdown_rx.clone()));

    let grace = settings.server.graceful_shutdown;
    let deadline = async move {
        shutdown_requested(shutdown_rx).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = async { try_join!(public_server, admin_server) } => {
            result.map_err(InfraError::from)?;
        }
        () = deadline => {
            warn!(
                target = "sitedesk::serve",
                grace_secs = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    // A dropped sender means the signal listener failed; keep serving.
    if rx.wait_for(|requested| *requested).await.is_err() {
        std::future::pending::<()>().await;
    }
}
