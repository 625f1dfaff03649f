use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

use bootsys::status::LocalTime;
use bootsys::{app, BootConfig, BootMenu, DeferredNavigator, Navigator, SystemOpener};

#[derive(Parser)]
#[command(name = "bootsys")]
#[command(author = "RavenLinux Team")]
#[command(version)]
#[command(about = "Retro boot menu for project links", long_about = None)]
struct Cli {
    /// Menu file (default: ~/.config/bootsys/menu.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the boot message shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the [HH:MM:SS] status prefix
    #[arg(long)]
    no_timestamps: bool,

    /// Print the chosen URL on exit instead of opening it
    #[arg(long)]
    print_url: bool,

    /// Quit once the exit dialog is acknowledged
    #[arg(long)]
    quit_on_exit: bool,

    /// Log file (default: ~/.cache/bootsys/bootsys.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BootConfig::load(cli.config.as_deref()).context("Failed to load boot menu")?;
    if cli.no_timestamps {
        config.menu.timestamps = false;
    }
    if cli.quit_on_exit {
        config.menu.quit_on_exit = true;
    }

    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_logging(cli.log_file, cli.verbose)?;
    info!("Loaded {} boot entries", config.entries.len());

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    app::install_panic_hook();

    if cli.print_url {
        let menu = run_menu(&config, DeferredNavigator::default(), rng)?;
        for url in menu.into_navigator().into_visited() {
            println!("{url}");
        }
    } else {
        run_menu(&config, SystemOpener, rng)?;
    }

    Ok(())
}

/// Run a session; a failed navigation becomes the program's error once the
/// terminal is back to normal
fn run_menu<N: Navigator>(config: &BootConfig, navigator: N, rng: StdRng) -> Result<BootMenu<N>> {
    let menu = BootMenu::new(config, navigator, rng, Box::new(LocalTime));
    let mut menu = app::run(menu)?;
    match menu.take_navigation_error() {
        Some(err) => Err(err),
        None => Ok(menu),
    }
}

/// The terminal belongs to the UI, so logs go to a file
fn init_logging(path: Option<PathBuf>, verbose: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bootsys/bootsys.log"),
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
