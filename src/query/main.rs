//! Query server for country resolution.
//!
//! Provides an HTTP API for resolving coordinates to countries, country
//! names or codes to coordinates, and distances between countries.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geocountry::config::{Config, DEFAULT_LISTEN};
use geocountry::features::{DistanceMethod, DistanceUnit};
use geocountry::{CountryData, CountryStore, DataPaths, Resolver, ResolverOptions};

mod response;
use response::{api_error, CountryResponse, DistanceResponse, HealthResponse, ReverseResponse};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Country resolution query server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding geohash_index.json.gz, polygons.json.gz and metadata.json.gz
    #[arg(long, default_value = "data", conflicts_with = "config")]
    data_dir: PathBuf,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Disable the exhaustive scan when indexed candidates miss
    #[arg(long)]
    no_fallback: bool,
}

/// Application state shared across handlers
struct AppState {
    store: CountryStore,
    options: ResolverOptions,
}

impl AppState {
    fn resolver(&self) -> Resolver<'_> {
        Resolver::with_options(&self.store, self.options)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Geocountry Query Server");

    let (paths, mut options, listen) = match &args.config {
        Some(path) => {
            let config = Config::load_from_file(path)?;
            (config.data, config.resolver, config.server.listen)
        }
        None => (
            DataPaths::in_dir(&args.data_dir),
            ResolverOptions::default(),
            DEFAULT_LISTEN.to_string(),
        ),
    };
    let listen = args.listen.clone().unwrap_or(listen);
    if args.no_fallback {
        options.exhaustive_fallback = false;
    }

    info!("Loading country data from {}", paths.polygons.display());
    let store = CountryStore::load(&paths).context("Failed to load country data")?;
    info!(
        "Loaded {} countries, {} index cells",
        store.len(),
        store.cell_count()
    );

    let state = Arc::new(AppState { store, options });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/reverse", get(reverse_handler))
        .route("/v1/country", get(country_handler))
        .route("/v1/distance", get(distance_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if state.store.is_empty() {
        "degraded"
    } else {
        "ok"
    };
    Json(HealthResponse {
        status,
        countries: state.store.all_country_ids().len(),
        cells: state.store.cell_count(),
    })
}

/// Coordinate → country
async fn reverse_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReverseQueryParams>,
) -> Result<Json<ReverseResponse>, (StatusCode, String)> {
    let result = state
        .resolver()
        .resolve_coordinates(params.point_lat, params.point_lon)
        .map_err(api_error)?;

    Ok(Json(ReverseResponse::new(params.point_lat, params.point_lon, result)))
}

/// Country name or ISO code → representative coordinate
async fn country_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CountryQueryParams>,
) -> Result<Json<CountryResponse>, (StatusCode, String)> {
    let result = state
        .resolver()
        .resolve_country(&params.text)
        .map_err(api_error)?;

    Ok(Json(CountryResponse::from(result)))
}

/// Distance between two countries' representative coordinates
async fn distance_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DistanceQueryParams>,
) -> Result<Json<DistanceResponse>, (StatusCode, String)> {
    let unit = parse_or_default::<DistanceUnit>(params.unit.as_deref()).map_err(api_error)?;
    let method = parse_or_default::<DistanceMethod>(params.method.as_deref()).map_err(api_error)?;

    let distance = state
        .resolver()
        .country_distance(&params.from, &params.to, method, unit)
        .map_err(api_error)?;

    Ok(Json(DistanceResponse {
        from: params.from,
        to: params.to,
        distance,
        unit: unit.as_str(),
        method: method.as_str(),
    }))
}

#[derive(Deserialize)]
struct ReverseQueryParams {
    /// Point latitude
    #[serde(rename = "point.lat")]
    point_lat: f64,
    /// Point longitude
    #[serde(rename = "point.lon")]
    point_lon: f64,
}

#[derive(Deserialize)]
struct CountryQueryParams {
    /// Country name, ISO alpha-2 or alpha-3 code
    text: String,
}

#[derive(Deserialize)]
struct DistanceQueryParams {
    from: String,
    to: String,
    /// km (default), mi or nmi
    unit: Option<String>,
    /// haversine (default) or vincenty
    method: Option<String>,
}

fn parse_or_default<T>(value: Option<&str>) -> geocountry::Result<T>
where
    T: std::str::FromStr<Err = geocountry::GeoError> + Default,
{
    value.map_or_else(|| Ok(T::default()), |v| v.parse())
}
