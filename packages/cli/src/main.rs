#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the quake map.

mod render;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use quake_map_feed::fetcher::FeedFetcher;
use quake_map_feed::registry;
use quake_map_feed::transport::HttpTransport;
use quake_map_quake_models::{FeedWindow, FilterCriteria};
use quake_map_view::ViewConfig;
use quake_map_view::frame::ResetToken;
use quake_map_view::model::{DerivedView, ViewModel};

#[derive(Parser)]
#[command(name = "quake_map", about = "Recent earthquakes from the USGS summary feeds")]
struct Cli {
    /// Feed window to load
    #[arg(long, global = true, default_value_t = FeedWindow::Day, value_parser = parse_window)]
    window: FeedWindow,
    /// Minimum magnitude; events without a magnitude are always shown
    #[arg(long, global = true, default_value_t = 0.0)]
    min_mag: f64,
    /// Path to a view config TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show summary statistics and the map framing (default)
    Summary,
    /// List every event passing the filter with its marker
    Events,
    /// Group events into map clusters at a zoom level
    Clusters {
        /// Map zoom level
        #[arg(long, default_value = "2")]
        zoom: u8,
        /// Expand the cluster containing this event index one level deeper
        #[arg(long)]
        expand: Option<usize>,
    },
    /// List the configured feeds
    Feeds,
    /// Show the magnitude color legend
    Legend,
}

fn parse_window(s: &str) -> Result<FeedWindow, String> {
    s.parse::<FeedWindow>()
        .map_err(|e| format!("{e}: expected one of hour, day, week, month"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let mut cli = Cli::parse();

    let command = cli.command.take().unwrap_or(Commands::Summary);
    match &command {
        Commands::Feeds => {
            print_feeds(cli.json)?;
            return Ok(());
        }
        Commands::Legend => {
            print_legend(cli.json)?;
            return Ok(());
        }
        Commands::Summary | Commands::Events | Commands::Clusters { .. } => {}
    }

    let criteria = FilterCriteria::new(cli.min_mag)?;
    let config = match &cli.config {
        Some(path) => ViewConfig::load(path)?,
        None => ViewConfig::default(),
    };

    let start = Instant::now();
    let transport = HttpTransport::default();
    let mut fetcher = FeedFetcher::from_registry();
    if !cli.json {
        println!("{}", render::LOADING_MESSAGE);
    }
    let outcome = fetcher.fetch(&transport, cli.window).await?;
    log::info!("Fetch finished ({outcome:?}) in {:.2?}", start.elapsed());

    if let Some(reason) = fetcher.status().error() {
        log::error!("Failed to load {} feed: {reason}", cli.window);
        if let Some(line) = render::status_line(fetcher.status()) {
            eprintln!("{line}");
        }
        return Err(reason.into());
    }

    let events = fetcher.events();
    let mut model = ViewModel::new(config);
    let view = model.derive(fetcher.generation(), &events, criteria);

    match command {
        Commands::Summary => print_summary(&cli, &mut model, &fetcher, &view)?,
        Commands::Events => print_events(cli.json, &model, &view)?,
        Commands::Clusters { zoom, expand } => {
            print_clusters(cli.json, &model, &view, zoom, expand)?;
        }
        Commands::Feeds | Commands::Legend => {}
    }

    fetcher.teardown();
    Ok(())
}

fn print_summary(
    cli: &Cli,
    model: &mut ViewModel,
    fetcher: &FeedFetcher,
    view: &DerivedView,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = model.frame(view, ResetToken::default());

    if cli.json {
        let out = serde_json::json!({
            "window": cli.window,
            "minMagnitude": cli.min_mag,
            "status": fetcher.status(),
            "stats": view.stats,
            "bounds": view.bounds,
            "frame": frame,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if let Some(line) = render::status_line(fetcher.status()) {
        println!("{line}");
    }
    for line in render::summary_lines(cli.window, cli.min_mag, view) {
        println!("{line}");
    }
    if let Some(frame) = frame {
        println!("{}", render::frame_line(&frame));
    }
    Ok(())
}

fn print_events(
    json: bool,
    model: &ViewModel,
    view: &DerivedView,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&view.collection)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("{}", render::EMPTY_MESSAGE);
        return Ok(());
    }
    for (event, visual) in view.collection.iter().zip(model.marker_visuals(view)) {
        println!("{}", render::event_line(event, &visual));
    }
    log::debug!("{} marker visuals cached", model.icons().len());
    Ok(())
}

fn print_clusters(
    json: bool,
    model: &ViewModel,
    view: &DerivedView,
    zoom: u8,
    expand: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut items = model.clusters(view, zoom);
    let mut zoom = zoom;

    if let Some(index) = expand {
        let Some(item) = items.iter().find(|i| i.members().contains(&index)) else {
            return Err(format!("no event with index {index} at zoom {zoom}").into());
        };
        items = model.expand(view, item, zoom);
        zoom = zoom.saturating_add(1);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("{}", render::EMPTY_MESSAGE);
        return Ok(());
    }
    println!("{} markers at zoom {zoom}", items.len());
    for item in &items {
        println!("  {}", render::cluster_line(item, &view.collection));
    }
    Ok(())
}

fn print_feeds(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let base = registry::base_url();
    let feeds = registry::all_feeds();

    if json {
        println!("{}", serde_json::to_string_pretty(&feeds)?);
        return Ok(());
    }
    for feed in &feeds {
        println!("{:<6} {:<28} {}", feed.window, feed.name, feed.url(&base));
    }
    Ok(())
}

fn print_legend(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let entries: Vec<_> = quake_map_quake_models::MagnitudeClass::legend()
            .iter()
            .map(|class| {
                serde_json::json!({
                    "class": class,
                    "label": class.legend_label(),
                    "minMagnitude": class.lower_bound(),
                    "color": class.color().hex(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for line in render::legend_lines() {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_window_before_subcommand() {
        let cli = Cli::try_parse_from(["quake_map", "--window", "week", "summary"]).unwrap();
        assert_eq!(cli.window, FeedWindow::Week);
        assert!(matches!(cli.command, Some(Commands::Summary)));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "quake_map",
            "clusters",
            "--zoom",
            "5",
            "--window",
            "hour",
            "--min-mag",
            "2.5",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.window, FeedWindow::Hour);
        assert!((cli.min_mag - 2.5).abs() < f64::EPSILON);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Some(Commands::Clusters {
                zoom: 5,
                expand: None
            })
        ));
    }

    #[test]
    fn window_defaults_to_day() {
        let cli = Cli::try_parse_from(["quake_map"]).unwrap();
        assert_eq!(cli.window, FeedWindow::Day);
        assert!(cli.command.is_none());
    }

    #[test]
    fn unknown_window_is_rejected() {
        assert!(Cli::try_parse_from(["quake_map", "--window", "year"]).is_err());
    }
}
