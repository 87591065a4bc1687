use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod locate;
mod presets;
mod project;
mod render;
mod svg;
mod trace;

#[derive(Debug, Parser)]
#[command(name = "geotrace")]
#[command(about = "Geo-locate IP addresses and trace routes onto a world map")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up the geographic location of one or more IP addresses
    Locate {
        /// Addresses to locate
        #[arg(required = true)]
        addresses: Vec<String>,
        /// Query providers directly, bypassing the on-disk cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Trace the network path to a host
    Trace {
        /// Host name or address to trace
        target: String,
        /// Also geo-locate every routable hop
        #[arg(long)]
        locate: bool,
    },
    /// Project a latitude/longitude onto a map image and viewport
    Project {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        long: f64,
        /// Viewport width in pixels
        #[arg(long, default_value = "800")]
        width: i32,
        /// Viewport height in pixels
        #[arg(long, default_value = "600")]
        height: i32,
        /// Map preset name (defaults to `GEOTRACE_MAP`)
        #[arg(long)]
        map: Option<String>,
    },
    /// Draw located addresses or a traced path as an SVG map
    Render {
        /// Addresses to place on the map
        addresses: Vec<String>,
        /// Trace the path to this host and draw its hops instead
        #[arg(long, conflicts_with = "addresses")]
        trace: Option<String>,
        /// Output SVG file
        #[arg(long, short, default_value = "map.svg")]
        output: PathBuf,
        #[arg(long, default_value = "1000")]
        width: i32,
        #[arg(long, default_value = "500")]
        height: i32,
        /// Map preset name (defaults to `GEOTRACE_MAP`)
        #[arg(long)]
        map: Option<String>,
        /// Connect hops with curved rather than straight lines
        #[arg(long)]
        curved: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = geotrace_core::load_app_config_from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Commands::Locate {
            addresses,
            no_cache,
        } => locate::run_locate(&config, &addresses, no_cache).await?,
        Commands::Trace { target, locate } => trace::run_trace(&config, &target, locate).await?,
        Commands::Project {
            lat,
            long,
            width,
            height,
            map,
        } => project::run_project(&config, lat, long, width, height, map.as_deref())?,
        Commands::Render {
            addresses,
            trace,
            output,
            width,
            height,
            map,
            curved,
        } => {
            let options = render::RenderOptions {
                output,
                width,
                height,
                map,
                curved,
            };
            render::run_render(&config, &addresses, trace.as_deref(), &options).await?;
        }
    }

    Ok(())
}
