use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use meal_strategist::api_connection::Provider;
use meal_strategist::briefing::PcmFileSink;
use meal_strategist::cli::{parse_args, Command, PrefsAction};
use meal_strategist::config::PlannerConfig;
use meal_strategist::geolocation::{locate_with_timeout, GeoPoint, IpLocator};
use meal_strategist::meal_visualizer::split_data_uri;
use meal_strategist::preference_store::PreferenceStore;
use meal_strategist::preferences::Preferences;
use meal_strategist::render::{render_day, render_plan};
use meal_strategist::session::{BriefingOutcome, Session, VisualizationOutcome};

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn resolve_location(config: &PlannerConfig, lat: Option<f64>, lng: Option<f64>, no_locate: bool) -> Result<Option<GeoPoint>> {
    if let (Some(lat), Some(lng)) = (lat, lng) {
        let point = GeoPoint::new(lat, lng).with_context(|| format!("Invalid coordinate {}, {}", lat, lng))?;
        return Ok(Some(point));
    }
    if no_locate {
        return Ok(None);
    }
    Ok(locate_with_timeout(&IpLocator::new(), config.locate_timeout).await)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = parse_args();
    init_logging(cli_args.verbose);

    let config = PlannerConfig::from_env();
    let preference_store = PreferenceStore::new(&config.preferences_path);
    let provider = Arc::new(Provider::gemini_with_base_url(&config.api_key_env_var, &config.base_url));
    let session = Session::new(provider, preference_store.clone());

    match cli_args.command {
        Command::Prefs { action } => match action {
            PrefsAction::Show => {
                println!("{}", serde_json::to_string_pretty(&session.preferences())?);
            }
            PrefsAction::Set(edit) => {
                let prefs = session.update_preferences(|p| edit.apply(p))?;
                info!(path = %preference_store.path().display(), "preferences saved");
                println!("{}", serde_json::to_string_pretty(&prefs)?);
            }
            PrefsAction::Reset => {
                session.update_preferences(|p| *p = Preferences::default())?;
                println!("Preferences reset to defaults.");
            }
        },
        Command::Plan { lat, lng, no_locate, json, day } => {
            let location = resolve_location(&config, lat, lng, no_locate).await?;
            let plan = session.generate_plan(location).await.map_err(|e| {
                if e.is_user_correctable() {
                    anyhow::Error::new(e).context("Preferences rejected; adjust them with `meal-strategist prefs set`")
                } else {
                    e.into()
                }
            })?;
            match day {
                Some(day) => {
                    let text = render_day(&plan, day)
                        .with_context(|| format!("Plan has {} day(s), no day {}", plan.days.len(), day))?;
                    print!("{}", text);
                }
                None if json => println!("{}", serde_json::to_string_pretty(plan.as_ref())?),
                None => print!("{}", render_plan(&plan)),
            }
        }
        Command::Scan { image, mime } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read image file '{}'", image.display()))?;
            let encoded = general_purpose::STANDARD.encode(bytes);
            let detected = session.scan_pantry(&encoded, &mime).await?;
            println!("Detected: {}", detected);
            if let Some(message) = &session.state().error {
                warn!("{}", message);
            }
            let prefs = session.preferences();
            println!("Pantry ({} items): {}", prefs.ingredient_count(), prefs.available_ingredients);
        }
        Command::Visualize { dish, out } => match session.visualize_meal(&dish).await {
            VisualizationOutcome::Rendered(uri) | VisualizationOutcome::Cached(uri) => match out {
                Some(path) => {
                    let (_, payload) = split_data_uri(&uri).context("Image service returned a malformed data URI")?;
                    let bytes = general_purpose::STANDARD.decode(payload)?;
                    tokio::fs::write(&path, bytes)
                        .await
                        .with_context(|| format!("Failed to write image to '{}'", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", uri),
            },
            VisualizationOutcome::Pending => println!("Visualization already in progress for '{}'.", dish),
            VisualizationOutcome::Unavailable => {
                warn!(%dish, "visualization unavailable");
                println!("Visualization unavailable for '{}'.", dish);
            }
        },
        Command::Brief { text, out } => {
            let mut sink = PcmFileSink { path: out.clone() };
            match session.play_briefing(&text, &mut sink).await {
                BriefingOutcome::Played { frames, duration } => {
                    println!(
                        "Briefing written to {} ({} samples, {:.1}s, f32 24kHz mono)",
                        out.display(),
                        frames,
                        duration.as_secs_f32()
                    );
                }
                BriefingOutcome::Busy => println!("A briefing is already playing."),
                BriefingOutcome::Unavailable => println!("Audio briefing unavailable."),
            }
        }
    }

    Ok(())
}
