mod cli;

use anisearch::{
    config,
    metadata::{
        providers::build_providers, AniSearchImageProvider, AniSearchSeriesProvider,
        ImageProvider, MetadataProvider, SearchQuery,
    },
    CatalogId,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, QueryArgs};
use tokio_util::sync::CancellationToken;

fn query_from(args: QueryArgs) -> SearchQuery {
    let mut query = SearchQuery {
        title: args.title,
        ..SearchQuery::default()
    };
    if let Some(id) = args.id {
        query = query.with_id(id);
    }
    query
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

/// Load config, build providers, and wire Ctrl-C to a cancellation token.
fn setup(
    config_path: Option<&std::path::Path>,
) -> Result<(AniSearchSeriesProvider, AniSearchImageProvider, CancellationToken)> {
    let config = config::load_config_or_default(config_path)?;
    let (series, images) = build_providers(&config).context("Failed to build providers")?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    Ok((series, images, cancel))
}

async fn print_metadata(args: QueryArgs, config_path: Option<&std::path::Path>) -> Result<()> {
    let (series, _, cancel) = setup(config_path)?;
    let record = series.get_metadata(&query_from(args), &cancel).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn print_search(args: QueryArgs, config_path: Option<&std::path::Path>) -> Result<()> {
    let (series, _, cancel) = setup(config_path)?;
    let results = series
        .get_search_results(&query_from(args), &cancel)
        .await?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

async fn print_images(id: &str, config_path: Option<&std::path::Path>) -> Result<()> {
    let (_, images, cancel) = setup(config_path)?;
    let id = CatalogId::parse(id)?;
    let found = images.get_images(&id, &cancel).await?;
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(path)?;
    config::validate_config(&config)?;
    println!("Configuration is valid");
    println!("  Catalog: {}", config.catalog.base_url);
    println!("  Cache: {}", config.cache.resolved_dir().display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "anisearch=trace,anisearch_common=debug".to_string()
        } else {
            "anisearch=info,anisearch_common=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("anisearch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Metadata(args) => block_on(print_metadata(args, cli.config.as_deref())),
        Commands::Search(args) => block_on(print_search(args, cli.config.as_deref())),
        Commands::Images { id } => block_on(print_images(&id, cli.config.as_deref())),
    }
}
