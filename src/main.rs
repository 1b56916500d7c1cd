//! # Campus-route CLI
//!
//! Command-line front end for the campus-route library. Plans accessible
//! walking routes on the Gilmorehill campus against the configured routing
//! backends, rendering into an in-memory map whose route layers can be
//! exported as GeoJSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use campus_route::{
    headless_session, AppConfig, BasemapStyle, Error, FileStore, Language, Locale,
    LocationResolver, MapboxGeocoder, MemoryStore, PreferenceStore, Role, RoutingProfile,
    LANDMARKS, LANGUAGE_KEY,
};
use clap::{Parser, Subcommand};
use log::{error, warn, LevelFilter};

mod cli;

/// Command-line interface for campus-route
#[derive(Parser)]
#[command(name = "campus-route")]
#[command(about = "Accessible walking routes on the University of Glasgow's Gilmorehill campus")]
#[command(long_about = "Plans all-access or step-free walking routes between campus locations:
  campus-route search origin kelvin
  campus-route route --from \"Boyd Orr\" --to \"Fraser Building\"
  campus-route route --from Stair --to Library --profile step-free --geojson route.json
  campus-route landmarks --lang zh
  campus-route lang zh

Environment:
  CAMPUS_ROUTE_ACCESS_TOKEN        Mapbox token for remote geocoding
  CAMPUS_ROUTE_ALL_ACCESS_URL      All-access routing backend
  CAMPUS_ROUTE_STEP_FREE_URL       Step-free routing backend
  CAMPUS_ROUTE_GEOCODE_URL         Geocoding endpoint")]
#[command(version = env!("CAMPUS_ROUTE_VERSION"))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preference file holding the saved language
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the suggestions an input would offer for some text
    Search {
        /// Input being typed into: origin or destination
        role: Role,
        /// Text typed
        text: String,
    },

    /// Plan a route between two locations
    Route {
        /// Start location (first suggestion is used)
        #[arg(long)]
        from: String,

        /// End location (first suggestion is used)
        #[arg(long)]
        to: String,

        /// all-access or step-free
        #[arg(long, default_value = "all-access")]
        profile: RoutingProfile,

        /// detailed, high-contrast or satellite
        #[arg(long, default_value = "detailed")]
        style: BasemapStyle,

        /// Language for this run only (en or zh)
        #[arg(long)]
        lang: Option<Language>,

        /// Write the drawn route layers to this file as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// No spinner
        #[arg(short, long)]
        quiet: bool,
    },

    /// List campus landmarks with their accessibility details
    Landmarks {
        /// Language for this run only (en or zh)
        #[arg(long)]
        lang: Option<Language>,
    },

    /// Save the interface language
    Lang {
        /// en or zh
        language: Language,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if cli.verbose {
        logger.filter_module("campus_route", LevelFilter::Debug);
    }
    logger.target(env_logger::Target::Stderr).init();

    if cli.verbose {
        eprintln!("🗺️  Campus-route v{} starting...", env!("CAMPUS_ROUTE_VERSION"));
    }

    if let Err(e) = run(cli).await {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let prefs = cli.prefs.unwrap_or_else(default_prefs_path);

    match cli.command {
        Command::Search { role, text } => search(&config, role, &text).await,
        Command::Route {
            from,
            to,
            profile,
            style,
            lang,
            geojson,
            quiet,
        } => {
            let store = preference_store(&prefs, lang)?;
            let request = RouteRequest {
                from,
                to,
                profile,
                style,
                geojson,
                quiet,
            };
            route(&config, store, request).await
        }
        Command::Landmarks { lang } => {
            let store = preference_store(&prefs, lang)?;
            list_landmarks(&Locale::load(store.as_ref()));
            Ok(())
        }
        Command::Lang { language } => {
            let mut store = FileStore::open(&prefs)
                .with_context(|| format!("opening preferences {}", prefs.display()))?;
            let mut locale = Locale::load(&store);
            locale.set_language(language, &mut store);
            println!("{}", locale.localize("title"));
            eprintln!("💾 Saved language '{language}' to {}", prefs.display());
            Ok(())
        }
    }
}

struct RouteRequest {
    from: String,
    to: String,
    profile: RoutingProfile,
    style: BasemapStyle,
    geojson: Option<PathBuf>,
    quiet: bool,
}

async fn search(config: &AppConfig, role: Role, text: &str) -> Result<()> {
    warn_without_token(config);
    let resolver = LocationResolver::new(MapboxGeocoder::new(&config.geocoding));
    let candidates = resolver.resolve(role, text).await;

    if candidates.is_empty() {
        eprintln!("🔍 No suggestions for '{text}'");
        if let Some(suggestion) = resolver.suggest(text) {
            eprintln!("💡 Did you mean '{suggestion}'?");
        }
        return Ok(());
    }

    for (i, candidate) in candidates.iter().enumerate() {
        println!(
            "{}. {} ({:.5}, {:.5})",
            i + 1,
            candidate.label,
            candidate.coordinate.lng,
            candidate.coordinate.lat
        );
    }
    Ok(())
}

async fn route(
    config: &AppConfig,
    store: Box<dyn PreferenceStore>,
    request: RouteRequest,
) -> Result<()> {
    warn_without_token(config);
    let mut session = headless_session(config, store);
    session.set_profile(request.profile);
    session.switch_style(request.style).await?;

    let spinner = cli::Spinner::start("Resolving locations", request.quiet);
    let located = async {
        let from = session.locate(Role::Origin, &request.from).await?;
        let to = session.locate(Role::Destination, &request.to).await?;
        Ok::<_, Error>((from, to))
    }
    .await;
    let (from, to) = match located {
        Ok(pair) => pair,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };

    spinner.set_message(&format!("Planning {} route", request.profile));
    if let Err(e) = session.plan_route().await {
        spinner.clear();
        if let Some(notice) = session.notice() {
            eprintln!("⚠️  {notice}");
        }
        return Err(e.into());
    }
    spinner.finish(&format!("✅ {} route planned", request.profile));

    println!("{} → {}", from.label, to.label);
    if let Some(info) = session.info() {
        println!("{info}");
    }

    if let Some(path) = request.geojson {
        let collection = session.map().to_feature_collection();
        let data = serde_json::to_string_pretty(&collection)?;
        fs::write(&path, data).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("📁 Saved route layers to {}", path.display());
    }
    Ok(())
}

fn list_landmarks(locale: &Locale) {
    for landmark in LANDMARKS.iter() {
        println!("{} {}", landmark.category.glyph(), landmark.popup_text(locale));
        println!();
    }
}

/// Saved preferences, or a throwaway store when the language is given for
/// this run only
fn preference_store(path: &Path, lang: Option<Language>) -> Result<Box<dyn PreferenceStore>> {
    match lang {
        Some(lang) => {
            let mut store = MemoryStore::default();
            store.set(LANGUAGE_KEY, lang.code())?;
            Ok(Box::new(store))
        }
        None => {
            let store = FileStore::open(path)
                .with_context(|| format!("opening preferences {}", path.display()))?;
            Ok(Box::new(store))
        }
    }
}

fn default_prefs_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => Path::new(&home)
            .join(".config")
            .join("campus-route")
            .join("prefs.json"),
        None => PathBuf::from("campus-route-prefs.json"),
    }
}

fn warn_without_token(config: &AppConfig) {
    if config.geocoding.access_token.is_empty() {
        warn!("CAMPUS_ROUTE_ACCESS_TOKEN is not set; only campus landmarks can be searched");
    }
}
