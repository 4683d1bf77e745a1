// SPDX-License-Identifier: MIT OR Apache-2.0
//! FlowForce site runtime
//!
//! Command-line front end for the site's motion core:
//! - Headless simulation of a home page visit (intro, smooth scroll,
//!   pinned horizontal section, backdrops)
//! - Blog listings from the local content directory
//! - Config file generation
//!
//! ## Architecture
//!
//! The binary plays the part of the browser. [`sim::SimHost`] implements the
//! scroll core's host seams, [`pages::HomePage`] composes the page out of the
//! `flowforce_scroll` building blocks and [`sim::run`] drives it frame by
//! frame.

mod config;
mod content;
mod pages;
mod sim;

use clap::{Parser, Subcommand};
use config::{ConfigError, SiteConfig};
use content::{ContentSource, LocalContentSource, RELATED_POSTS_LIMIT};
use flowforce_scroll::{ScrollError, Viewport};
use sim::SimulationOptions;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "flowforce")]
#[command(author, version, about = "FlowForce site runtime")]
struct Cli {
    /// Site config file (RON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the content directory
    #[arg(long)]
    content_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a visit of the home page and print the report
    Simulate {
        /// Route being visited
        #[arg(short, long, default_value = "/")]
        route: String,
        /// Viewport width
        #[arg(long, default_value_t = 1440.0)]
        width: f32,
        /// Viewport height
        #[arg(long, default_value_t = 900.0)]
        height: f32,
        /// Render without a surface
        #[arg(long)]
        server: bool,
        /// Prefer reduced motion
        #[arg(long)]
        reduced_motion: bool,
        /// The intro already played this session
        #[arg(long)]
        returning: bool,
        /// Page with the arrow keys instead of the wheel
        #[arg(long)]
        keyboard: bool,
        /// Intro resources fail to load
        #[arg(long)]
        failing_resources: bool,
        /// Simulated time in milliseconds
        #[arg(short, long, default_value_t = 20_000.0)]
        duration_ms: f64,
    },
    /// List blog posts, newest first
    Posts {
        /// Only posts with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show one post and its related posts
    Post {
        /// Post slug
        slug: String,
    },
    /// List every tag in use
    Tags,
    /// Write the effective config to a file
    InitConfig {
        /// Destination
        path: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum SiteError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scroll(#[from] ScrollError),
    #[error("Failed to format output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("No post named {0}")]
    PostNotFound(String),
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("flowforce_site=debug".parse().unwrap())
        .add_directive("flowforce_scroll=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("flowforce failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SiteError> {
    let mut config = match &cli.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };
    if let Some(dir) = cli.content_dir {
        config.content_dir = dir;
    }
    tracing::info!("Starting {} v{}", config.name, env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Simulate {
            route,
            width,
            height,
            server,
            reduced_motion,
            returning,
            keyboard,
            failing_resources,
            duration_ms,
        } => {
            let options = SimulationOptions {
                route,
                viewport: (!server).then(|| Viewport::new(width, height)),
                reduced_motion,
                returning_visitor: returning,
                keyboard,
                failing_resources,
                duration_ms,
                ..SimulationOptions::default()
            };
            let report = sim::run(&config, &options)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Posts { tag } => {
            let source = LocalContentSource::open(&config.content_dir);
            let posts = match tag {
                Some(tag) => source.by_tag(&tag),
                None => source.listings(),
            };
            println!("{}", serde_json::to_string_pretty(&posts)?);
        }
        Commands::Post { slug } => {
            let source = LocalContentSource::open(&config.content_dir);
            let post = source
                .post(&slug)
                .ok_or_else(|| SiteError::PostNotFound(slug.clone()))?;
            let related = source.related(&post.slug, &post.tags, RELATED_POSTS_LIMIT);
            let output = serde_json::json!({ "post": post, "related": related });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Tags => {
            let source = LocalContentSource::open(&config.content_dir);
            for tag in source.tags() {
                println!("{tag}");
            }
        }
        Commands::InitConfig { path } => {
            config.save(&path)?;
            tracing::info!("Wrote config to {}", path.display());
        }
    }
    Ok(())
}
