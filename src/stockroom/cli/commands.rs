use super::print::{print_config, print_items, StdinPrompt, TerminalSink};
use super::setup::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use stockroom::api::{ConfigAction, StockroomApi};
use stockroom::capacity::CapacityMonitor;
use stockroom::commands::add::image_data_url;
use stockroom::config::StockroomConfig;
use stockroom::error::{Result, StockroomError};
use stockroom::fetch::{ReqwestTransport, RetryingFetch};
use stockroom::inventory::Inventory;
use stockroom::store::durable::DurableStore;
use stockroom::store::fs::FsBackend;
use stockroom::sync::SyncCoordinator;
use tracing_subscriber::EnvFilter;

const HOME_ENV: &str = "STOCKROOM_HOME";

struct AppContext {
    api: StockroomApi<FsBackend, TerminalSink, StdinPrompt>,
    home: PathBuf,
    config: StockroomConfig,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Add {
            name,
            quantity,
            image,
        }) => handle_add(&mut ctx, name.join(" "), quantity, image),
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::Adjust { id, delta }) => {
            ctx.api.adjust_quantity(&id, delta)?;
            Ok(())
        }
        Some(Commands::Remove { id }) => {
            ctx.api.remove_item(&id)?;
            Ok(())
        }
        Some(Commands::Clear) => {
            ctx.api.clear()?;
            Ok(())
        }
        Some(Commands::Export { dir }) => handle_export(&ctx, dir),
        Some(Commands::Import { file }) => {
            ctx.api.import_file(&file)?;
            Ok(())
        }
        Some(Commands::Usage) => {
            ctx.api.usage()?;
            Ok(())
        }
        Some(Commands::Sync { endpoint }) => handle_sync(&ctx, endpoint),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn home_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "stockroom", "stockroom")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| StockroomError::Config("Could not determine data directory".into()))
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let home = home_dir()?;
    let config = StockroomConfig::load(&home)?;

    let key = cli
        .inventory
        .clone()
        .unwrap_or_else(|| config.storage_key.clone());
    let backend = FsBackend::new(home.join("store")).with_quota(config.quota_bytes);
    let monitor = CapacityMonitor::new(config.quota_bytes, config.warn_threshold_percent);
    let inventory = Inventory::open(DurableStore::new(backend), key, monitor);

    let api = StockroomApi::new(
        inventory,
        TerminalSink,
        StdinPrompt {
            assume_yes: cli.yes,
        },
    );

    Ok(AppContext { api, home, config })
}

fn handle_add(
    ctx: &mut AppContext,
    name: String,
    quantity: u32,
    image: Option<PathBuf>,
) -> Result<()> {
    let image = image.as_deref().map(image_data_url).transpose()?;
    ctx.api.add_item(name, quantity, image)?;
    Ok(())
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_items()?;
    print_items(&result.listed_items);
    Ok(())
}

fn handle_export(ctx: &AppContext, dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    ctx.api.export(&dir)?;
    Ok(())
}

fn handle_sync(ctx: &AppContext, endpoint: Option<String>) -> Result<()> {
    let Some(endpoint) = endpoint.or_else(|| ctx.config.sync_endpoint.clone()) else {
        return Err(StockroomError::Config(
            "No sync endpoint configured. Pass --endpoint or run `stockroom config sync-endpoint URL`"
                .into(),
        ));
    };

    let fetch = RetryingFetch::new(ReqwestTransport::new(), ctx.config.retry_policy());
    let coordinator = SyncCoordinator::new(fetch, endpoint);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // The sink already showed the failure.
    if runtime.block_on(ctx.api.sync_now(&coordinator)).is_err() {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let show_all = matches!(action, ConfigAction::ShowAll);
    let result = ctx.api.config(&ctx.home, action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    Ok(())
}
