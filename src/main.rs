use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use axum::Router;
use lambda_runtime::{LambdaEvent, service_fn};
use photo_search::{
    config::{AppConfig, Mode},
    handlers::lambda_handlers,
    models::events::{S3Notification, SearchEvent},
    routes,
    services::{
        AppState,
        ingest_service::IngestService,
        intent::LexIntents,
        labels::RekognitionLabels,
        metadata::S3Metadata,
        search_index::{OpenSearchIndex, PhotoIndex},
        search_service::SearchService,
        signing::{CredentialSource, SdkCredentialSource},
    },
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env_and_args()?;
    tracing::info!("Starting photo-search with config: {:?}", cfg);

    // --- AWS clients, built once per process ---
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(cfg.region.clone()))
        .load()
        .await;
    let credentials: Arc<dyn CredentialSource> = Arc::new(SdkCredentialSource::new(&sdk_config));
    let index: Arc<dyn PhotoIndex> = if cfg.index_host.contains("://") {
        Arc::new(OpenSearchIndex::with_base_url(
            reqwest::Client::new(),
            &cfg.index_host,
            cfg.index_name.clone(),
        )?)
    } else {
        Arc::new(OpenSearchIndex::new(
            reqwest::Client::new(),
            cfg.index_host.clone(),
            cfg.index_name.clone(),
        ))
    };

    match cfg.mode {
        Mode::Index => {
            let service = ingest_service(&cfg, &sdk_config, index, credentials);
            tracing::info!("Running index handler on the Lambda runtime");
            lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Notification>| {
                let service = service.clone();
                async move { lambda_handlers::index_photos(&service, event).await }
            }))
            .await
            .map_err(|err| anyhow::anyhow!(err))
        }
        Mode::Search => {
            let service = search_service(&cfg, &sdk_config, index, credentials)?;
            tracing::info!("Running search handler on the Lambda runtime");
            lambda_runtime::run(service_fn(move |event: LambdaEvent<SearchEvent>| {
                let service = service.clone();
                async move { lambda_handlers::search_photos(&service, event).await }
            }))
            .await
            .map_err(|err| anyhow::anyhow!(err))
        }
        Mode::Serve => {
            let state = AppState {
                ingest: ingest_service(&cfg, &sdk_config, index.clone(), credentials.clone()),
                search: search_service(&cfg, &sdk_config, index, credentials)?,
            };
            serve(&cfg, state).await
        }
    }
}

fn ingest_service(
    cfg: &AppConfig,
    sdk_config: &SdkConfig,
    index: Arc<dyn PhotoIndex>,
    credentials: Arc<dyn CredentialSource>,
) -> IngestService {
    IngestService::new(
        Arc::new(RekognitionLabels::new(aws_sdk_rekognition::Client::new(
            sdk_config,
        ))),
        Arc::new(S3Metadata::new(aws_sdk_s3::Client::new(sdk_config))),
        index,
        credentials,
        cfg.signing_scope(),
    )
    .with_max_labels(cfg.max_labels)
}

fn search_service(
    cfg: &AppConfig,
    sdk_config: &SdkConfig,
    index: Arc<dyn PhotoIndex>,
    credentials: Arc<dyn CredentialSource>,
) -> Result<SearchService> {
    let intents = LexIntents::new(
        aws_sdk_lexruntimev2::Client::new(sdk_config),
        cfg.bot_settings()?,
    );
    Ok(SearchService::new(
        Arc::new(intents),
        index,
        credentials,
        cfg.signing_scope(),
    ))
}

/// Local HTTP server exposing both handlers.
async fn serve(cfg: &AppConfig, state: AppState) -> Result<()> {
    let app: Router = routes::routes::routes().with_state(state);

    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
