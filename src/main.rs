//! Ticketflow command line client
//!
//! Main application entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ticketflow::{
    config::Settings,
    i18n::I18n,
    models::{EventFilter, PricingRules},
    reports,
    services::ServiceFactory,
    state::{FileSessionStorage, MemorySessionStorage, Session, SessionStorage},
    utils::{
        helpers::{format_date, format_money, truncate_text},
        logging,
    },
    TicketflowError,
};

#[derive(Parser, Debug)]
#[command(name = "ticketflow", version, about = "Ticketflow event ticketing client")]
struct Cli {
    /// Configuration file, without extension
    #[arg(long, env = "TICKETFLOW_CONFIG", default_value = "config")]
    config: String,

    /// UI language, e.g. `de` or `fr-CH`
    #[arg(long, env = "LANG")]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the platform API is reachable
    Health,
    /// Sign in and store the session
    Login {
        email: String,
        #[arg(long, env = "TICKETFLOW_PASSWORD")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// List published events
    Events {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List the signed-in user's tickets
    Tickets,
    /// Organizer dashboard totals
    Dashboard,
    /// Export an event's participants as CSV
    ExportParticipants {
        event_id: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::load_from(&cli.config).context("loading configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;
    info!("Starting {}", ticketflow::info());

    // Initialize i18n system
    let mut i18n = I18n::with_bundled(&settings.i18n)?;
    i18n.load_translations(Path::new(&settings.i18n.translations_dir)).await?;
    let i18n = Arc::new(i18n);
    let lang = i18n.detect_language(cli.lang.as_deref());

    // Every request of this run is abandoned on Ctrl-C
    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling requests");
            cancel_on_signal.cancel();
        }
    });

    let services = ServiceFactory::new(&settings)?.scoped(cancel);
    let storage: Arc<dyn SessionStorage> = match &settings.storage.session_path {
        Some(path) => Arc::new(FileSessionStorage::new(path)),
        None => Arc::new(MemorySessionStorage::new()),
    };
    let session = Arc::new(Session::new(&services, storage));

    if let Err(e) = run(cli.command, &settings, &services, &session, &i18n, &lang).await {
        eprintln!("{}", e.user_message(&i18n, &lang));
        return Err(e.into());
    }

    Ok(())
}

async fn run(
    command: Command,
    settings: &Settings,
    services: &ServiceFactory,
    session: &Session,
    i18n: &I18n,
    lang: &str,
) -> Result<(), TicketflowError> {
    match command {
        Command::Health => {
            let health = services.health_check().await;
            if health.is_healthy() {
                println!("API reachable at {}", services.api.base_url());
            }
            for issue in health.get_issues() {
                println!("! {}", issue);
            }
        }
        Command::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            let mut params = ticketflow::i18n::TranslationParams::new();
            params.insert("name".to_string(), user.first_name.clone());
            println!("{}", i18n.t("app.welcome", lang, Some(&params)));
        }
        Command::Logout => {
            session.logout().await?;
        }
        Command::Events { search, category, page } => {
            let filter = EventFilter {
                search,
                category,
                page: Some(page),
                ..EventFilter::default()
            };
            let events = services.event_service.list_events(&filter).await?;
            if events.items.is_empty() {
                println!("{}", i18n.t("events.no_results", lang, None));
            }
            for event in &events.items {
                println!(
                    "{}  {}  {}  {}  {}",
                    event.id,
                    format_date(event.start_date),
                    truncate_text(&event.title, 40),
                    format_money(event.price, &settings.pricing.currency),
                    i18n.tp("events.remaining", lang, i64::from(event.remaining_capacity()), None),
                );
            }
            println!("page {}/{}", events.page, events.total_pages());
        }
        Command::Tickets => {
            require_session(session).await?;
            let rules = PricingRules::from(&settings.pricing);
            for order in services.ticket_service.get_user_tickets().await? {
                println!(
                    "{}  {}  {}  {:?}",
                    order.id,
                    order.event.title,
                    i18n.tp("tickets.count", lang, i64::from(order.quantity), None),
                    order.payment_status,
                );
                if ticketflow::state::can_refund(&order, chrono::Utc::now()) {
                    let estimate = rules.calculate_refund_amount(&order, order.ticket_details.len());
                    println!("    refundable, up to {}", format_money(estimate, &rules.currency));
                }
            }
        }
        Command::Dashboard => {
            require_session(session).await?;
            let stats = services.organizer_service.get_dashboard_stats().await?;
            let summary = reports::summarize_dashboard(&stats, &PricingRules::from(&settings.pricing));
            let currency = &settings.pricing.currency;
            println!("{}: {}", i18n.t("reports.revenue", lang, None), format_money(summary.gross_revenue, currency));
            println!("payout (est.): {}", format_money(summary.organizer_payout, currency));
            println!("{}: {:.1}%", i18n.t("reports.fill_rate", lang, None), summary.average_fill_rate);
            for event in &summary.events {
                println!("  {}  {:.1}%  {}", event.title, event.fill_rate, format_money(event.gross_revenue, currency));
            }
        }
        Command::ExportParticipants { event_id, out_dir } => {
            require_session(session).await?;
            let event = services.event_service.get_event(&event_id).await?;
            let participants = services.organizer_service.get_participants(&event_id).await?;
            let export = reports::export_participants(&event.title, &participants);
            let path = export.save_to(&out_dir).await?;
            println!("{} rows written to {}", export.row_count(), path.display());
        }
    }

    Ok(())
}

async fn require_session(session: &Session) -> Result<(), TicketflowError> {
    if session.initialize().await?.is_none() {
        return Err(TicketflowError::Unauthorized("Please log in first".to_string()));
    }
    Ok(())
}
