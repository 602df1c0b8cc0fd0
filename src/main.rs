//! api-rendr - serve an API described by an endpoint definition document

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rendr::api;
use api_rendr::config::{Config, StaticDir};

#[derive(Parser)]
#[command(name = "api-rendr")]
#[command(about = "Serve an API described by a declarative endpoint document")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RenderArgs {
    /// Endpoint definition document (.json, .toml, .yaml)
    definitions: Option<PathBuf>,

    /// Serve a directory, as ROUTE=DIR (repeatable)
    #[arg(long = "static", value_name = "ROUTE=DIR")]
    static_dirs: Vec<StaticDir>,

    /// Prefix for every route
    #[arg(long)]
    mount_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the definitions and start the HTTP server
    Serve {
        #[command(flatten)]
        render: RenderArgs,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Render the definitions and print the resulting routes
    Routes {
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("api_rendr={},tower_http=debug", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    let _ = dotenvy::dotenv();

    // Load config
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Serve { render, port } => {
            let mut config = apply_render_args(config, render);
            if let Some(port) = port {
                config.http_port = port;
            }
            let production = config.production
                || std::env::var("APP_ENV").map(|env| env == "production").unwrap_or(false);
            api::set_production_mode(production);

            let router = api::create_router(&config)?;
            let address = config.listen_address();
            let listener = tokio::net::TcpListener::bind(&address).await?;

            tracing::info!("Starting HTTP server on {}", address);
            println!("api-rendr running at http://localhost:{}", config.http_port);

            axum::serve(listener, router).await?;
        }

        Commands::Routes { render } => {
            let config = apply_render_args(config, render);
            let renderer = api::render_config(&config)?;

            let entries = renderer.table().entries();
            let statics = renderer.table().static_routes();
            if entries.is_empty() && statics.is_empty() {
                println!("No routes defined");
            }
            for entry in entries {
                println!(
                    "{:<12} {:<40} {}",
                    entry.method.as_str().to_uppercase(),
                    entry.path,
                    entry.handler
                );
            }
            for route in statics {
                println!("{:<12} {:<40} static", "*", route);
            }

            // surfaces conflicts and unsupported options without serving
            renderer.into_router()?;
        }
    }

    Ok(())
}

/// Command line arguments take precedence over the config file
fn apply_render_args(mut config: Config, args: RenderArgs) -> Config {
    if let Some(definitions) = args.definitions {
        config.endpoints = Some(definitions);
    }
    if let Some(mount_path) = args.mount_path {
        config.mount_path = mount_path;
    }
    config.static_dirs.extend(args.static_dirs);
    config
}
