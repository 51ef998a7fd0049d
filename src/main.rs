// ============================================================================
// PrijsWijs - Prix de l'électricité du jour
// ============================================================================
// Récupère les prix spot horaires (EnergyZero), les classe par rapport au pic
// et au creux du jour, et affiche le rapport annoté sous forme de notification.
//
// Modes :
// - une fois (par défaut) : une notification puis fin du programme
// - horaire (--watch ou "poll_hourly" dans les settings) : jusqu'à Ctrl-C
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use prijswijs::api::EnergyZeroSource;
use prijswijs::cache::PriceCache;
use prijswijs::notification::TerminalNotifier;
use prijswijs::report::ReportFormatter;
use prijswijs::service::PriceService;
use prijswijs::settings::Settings;

/// Arguments de la ligne de commande
#[derive(Debug, Parser)]
#[command(name = "prijswijs")]
#[command(about = "Today's electricity spot prices as an annotated notification", long_about = None)]
struct Cli {
    /// Rafraîchir à chaque heure pleine jusqu'à Ctrl-C
    #[arg(long, conflicts_with = "once")]
    watch: bool,

    /// Une seule notification, même si les settings demandent le mode horaire
    #[arg(long)]
    once: bool,

    /// Fichier de settings (défaut : ~/.config/prijswijs/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Pas de couleurs dans la sortie
    #[arg(long)]
    plain: bool,
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// La sortie standard est réservée à la notification : les logs vont dans un
// fichier avec rotation quotidienne.
//
// Les logs sont écrits dans :
// - Linux : ~/.local/share/prijswijs/logs/prijswijs.log
// - macOS : ~/Library/Application Support/prijswijs/logs/prijswijs.log
//
// RUST_LOG=trace prijswijs --watch
// ============================================================================

fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = prijswijs::data_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "prijswijs.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prijswijs=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    let settings_path = match cli.settings {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let settings = Settings::load(&settings_path)?;
    let poll_hourly = cli.watch || (settings.poll_hourly && !cli.once);
    info!(?settings_path, poll_hourly, "PrijsWijs starting up");

    let formatter = ReportFormatter::new(settings.formatter)?;

    // Sans cache, on continue : seul le repli en cas de panne API est perdu
    let cache = match PriceCache::in_data_dir() {
        Ok(cache) => Some(cache),
        Err(e) => {
            error!(error = ?e, "Price cache unavailable");
            None
        }
    };

    let source = EnergyZeroSource {
        include_vat: settings.include_vat,
    };
    let mut service = PriceService::new(source, TerminalNotifier::new(cli.plain), cache, formatter);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = if poll_hourly {
        runtime.block_on(service.run_hourly())
    } else {
        runtime.block_on(service.run_once(chrono::Utc::now()))
    };

    match &result {
        Ok(_) => info!("PrijsWijs exited normally"),
        Err(e) => error!(error = ?e, "PrijsWijs exited with error"),
    }
    result
}
