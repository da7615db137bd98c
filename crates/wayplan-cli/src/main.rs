use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use wayplan_core::{load_app_config_from_env, AppConfig};
use wayplan_session::{
    http_collaborators, JsonFileStore, KeyValueStore, MemoryStore, RouteOutcome, Session,
    TokioClock,
};

#[derive(Debug, Parser)]
#[command(name = "wayplan")]
#[command(about = "Route planning from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for a place and print the suggestions.
    Search {
        query: String,
    },
    /// List named points of interest near a coordinate.
    Resolve {
        lat: f64,
        lng: f64,
    },
    /// Optimize a route over the stops in a JSON file and print the result.
    Plan {
        /// Path to a JSON document: {"stops": [{"name", "lat", "lng", "is_priority"?}]}
        file: PathBuf,
        /// Also print the route as a JSON document.
        #[arg(long)]
        json: bool,
    },
    /// List saved routes and recent searches.
    Saved,
}

#[derive(Debug, Deserialize)]
struct StopInput {
    name: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    is_priority: bool,
}

#[derive(Debug, Deserialize)]
struct PlanInput {
    stops: Vec<StopInput>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let session = build_session(&config)?;

    match cli.command {
        Commands::Search { query } => {
            let suggestions = session.search_input(&query, None).await;
            if let Some(advisory) = session.advisory() {
                eprintln!("{advisory}");
            }
            for s in suggestions {
                println!("{}  ({:.5}, {:.5})", s.label, s.lat, s.lng);
            }
        }
        Commands::Resolve { lat, lng } => {
            let items = session.resolve_point(lat, lng).await;
            if items.is_empty() {
                println!("nothing known near {lat:.5}, {lng:.5}");
            }
            for item in items {
                match item.subtitle {
                    Some(subtitle) => println!("{}  ({subtitle})", item.name),
                    None => println!("{}", item.name),
                }
            }
        }
        Commands::Plan { file, json } => {
            let input: PlanInput = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            for stop in &input.stops {
                let id = session
                    .add_stop(&stop.name, stop.lat, stop.lng)
                    .map_err(|e| anyhow::anyhow!("stop {:?}: {e}", stop.name))?;
                if stop.is_priority {
                    session.toggle_priority(id);
                }
            }

            match session.compute_route().await {
                RouteOutcome::Computed(summary) | RouteOutcome::Partial(summary) => {
                    let names: Vec<String> = {
                        let stops = session.stops();
                        summary.order.iter().map(|&i| stops[i].name.clone()).collect()
                    };
                    println!("order: {}", names.join(" -> "));
                    println!("distance: {:.1} km", summary.total_distance_m / 1_000.0);
                    if let Some(duration) = summary.total_duration_s {
                        println!("duration: {:.0} min", duration / 60.0);
                    }
                    if let Some(url) = session.export_directions_url() {
                        println!("directions: {url}");
                    }
                    if json {
                        println!("{}", session.export_json());
                    }
                }
                RouteOutcome::NotEnoughStops => {
                    anyhow::bail!("need at least two stops to plan a route");
                }
                RouteOutcome::Failed | RouteOutcome::Superseded => {
                    if let Some(advisory) = session.advisory() {
                        eprintln!("{advisory}");
                    }
                    anyhow::bail!("route computation failed");
                }
            }
        }
        Commands::Saved => {
            for route in session.saved_routes() {
                println!(
                    "{}  {}  ({} stops)",
                    route.id,
                    route.name,
                    route.stops.len()
                );
            }
            for recent in session.recents() {
                println!("recent: {}  ({:.5}, {:.5})", recent.name, recent.lat, recent.lng);
            }
        }
    }

    Ok(())
}

fn build_session(config: &AppConfig) -> anyhow::Result<Arc<Session>> {
    let collaborators =
        http_collaborators(config).map_err(|e| anyhow::anyhow!("collaborator setup: {e}"))?;
    let store: Arc<dyn KeyValueStore> = match &config.storage_path {
        Some(dir) => Arc::new(JsonFileStore::new(dir.clone())),
        None => Arc::new(MemoryStore::default()),
    };
    Ok(Session::new(config, collaborators, store, Arc::new(TokioClock)))
}
