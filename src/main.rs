//! tcga-fetch - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tcga_fetch::{
    cli::{Args, Commands, Config, Verbosity},
    display,
    loader::DEFAULT_DATA_TYPE,
    GdcClient, Pam50Table, TcgaLoader,
};
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tcga_fetch={}", verbosity.log_filter())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_loader(args: &Args, config: &Config) -> Result<TcgaLoader> {
    let client = GdcClient::from_config(config)?.with_progress(args.verbosity().show_progress());
    let loader = TcgaLoader::with_client(config, client)
        .with_context(|| format!("Failed to prepare data directory {}", config.data_dir().display()))?;
    Ok(loader)
}

async fn run_all(loader: &TcgaLoader, auto_download_pam50: bool) -> Result<()> {
    display::banner(&format!("Loading {} data from GDC API", loader.project_id()));

    let dataset = loader.load_all(auto_download_pam50).await?;

    println!();
    display::banner("Data loading complete!");
    display::print_summary(&dataset.summary, &dataset.pam50);
    Ok(())
}

fn print_pam50(table: &Pam50Table) {
    if table.is_empty() {
        println!("{}", "PAM50 Subtypes: Not found".yellow());
        return;
    }

    println!("PAM50 rows: {}", table.len());
    println!("Columns: {}", table.columns().join(", "));
    for (subtype, count) in table.subtype_counts() {
        println!("  {:<12} {}", subtype, count);
    }
}

async fn check_status(loader: &TcgaLoader) -> Result<()> {
    let client = loader.client();
    println!("\nChecking GDC API at {}...\n", client.base_url());

    match client.status().await {
        Ok(status) => {
            let field = |key: &str| {
                status
                    .get(key)
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string()
            };
            println!("  {} GDC API reachable", "✓".green());
            println!("  Status:       {}", field("status"));
            println!("  Version:      {}", field("tag"));
            println!("  Data release: {}", field("data_release"));
            Ok(())
        }
        Err(e) => {
            eprintln!("  {} GDC API unreachable: {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

fn show_config(args: &Args, config: &Config) {
    display::banner("tcga-fetch Configuration");

    println!("\nGDC:");
    println!("  Base URL:   {}", config.gdc.base_url);
    println!("  Project:    {}", config.gdc.project_id);
    println!("  Page size:  {}", config.gdc.page_size);
    println!("  Timeouts:   {}s request / {}s download",
        config.gdc.request_timeout_sec, config.gdc.download_timeout_sec);
    println!();

    println!("Retry:");
    println!("  Attempts:   {}", config.retry.max_retries);
    println!("  Base delay: {}ms", config.retry.base_delay_ms);
    println!("  Jitter:     {}", if config.retry.jitter { "enabled" } else { "disabled" });
    println!();

    println!("Paths:");
    println!("  Data dir:   {}", config.data_dir().display());
    match (&args.config, Config::default_path()) {
        (Some(path), _) => println!("  Config:     {}", path.display()),
        (None, Some(path)) if path.exists() => println!("  Config:     {}", path.display()),
        _ => println!("  Config:     (built-in defaults)"),
    }
    println!();

    println!("PAM50:");
    println!("  File name:  {}", config.pam50.file_name);
    println!("  Auto-download: {}", if config.pam50.auto_download { "enabled" } else { "disabled" });
    for mirror in &config.pam50.mirrors {
        println!("  Mirror:     {}", mirror);
    }
    println!("\nVerbosity: {}", args.verbosity().as_str());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity());

    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    args.apply_to(&mut config);
    config.validate()?;

    let loader = || build_loader(&args, &config);

    match args.command() {
        Commands::All { auto_download_pam50 } => {
            run_all(&loader()?, auto_download_pam50 || config.pam50.auto_download).await?;
        }
        Commands::Manifest { data_type } => {
            let manifest = loader()?.get_file_manifest(&data_type).await?;
            println!("Manifest: {} files", manifest.len());
        }
        Commands::Clinical => {
            let clinical = loader()?.get_clinical_data().await?;
            println!("Clinical data: {} cases", clinical.len());
        }
        Commands::Pam50 { auto_download } => {
            let table = loader()?
                .get_pam50_subtypes(auto_download || config.pam50.auto_download)
                .await?;
            print_pam50(&table);
        }
        Commands::FetchPam50 { url, file_name } => {
            let path = loader()?
                .download_pam50_from_url(url.as_deref(), file_name.as_deref())
                .await?;
            println!("PAM50 file: {}", path.display());
        }
        Commands::LoadPam50 { path } => {
            let table = loader()?.load_pam50_from_file(&path).await?;
            print_pam50(&table);
        }
        Commands::Download { file_id, file_name } => {
            let path = loader()?.download_file(&file_id, &file_name).await?;
            println!("Downloaded: {}", path.display());
        }
        Commands::DownloadManifest { limit } => {
            let loader = loader()?;
            let manifest = loader.get_file_manifest(DEFAULT_DATA_TYPE).await?;
            let paths = loader.download_manifest_files(&manifest, limit).await?;
            println!("Downloaded {} of {} files into {}",
                paths.len(), manifest.len(), loader.data_dir().display());
        }
        Commands::Status => check_status(&loader()?).await?,
        Commands::Config => show_config(&args, &config),
    }

    Ok(())
}
