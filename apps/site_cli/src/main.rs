use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use menu_state::{menu_links, Breakpoint, MenuLink};
use nav_client::{CachedNavigation, CmsNavigationProvider, NavigationSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod replay;

use config::load_settings;
use replay::{parse_script, Replay};

#[derive(Parser, Debug)]
#[command(about = "Navigation and menu overlay tooling for the portfolio site")]
struct Cli {
    #[arg(long, default_value = "site.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the navigation items, falling back to the static list.
    Nav {
        #[arg(long)]
        json: bool,
    },
    /// Apply a comma-separated event script to a fresh menu controller,
    /// e.g. `burger,tick:600,resize:800,escape,settle`.
    Replay {
        script: String,
        /// Viewport width at mount.
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli.config)?;

    match cli.command {
        Command::Nav { json } => {
            let source = CachedNavigation::with_ttl(
                CmsNavigationProvider::new(settings.cms_url, settings.cms_api_token),
                settings.nav_cache_ttl,
            );
            let outcome = source.load().await;
            if let Some(reason) = &outcome.fallback {
                info!(code = ?reason.code, "serving fallback navigation");
            }

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome.items)
                        .context("failed to encode navigation items")?
                );
            } else {
                for link in menu_links(&outcome.items) {
                    print_link(&link, 0);
                }
            }
        }
        Command::Replay {
            script,
            width,
            json,
        } => {
            let events = parse_script(&script)?;
            let mut replay = Replay::new(Breakpoint::new(settings.compact_breakpoint), Some(width));
            for event in events {
                let step = replay.apply(event);
                if json {
                    println!("{}", serde_json::to_string(&step)?);
                } else {
                    println!(
                        "{:<16} phase={:?} requested_open={} settled={} compact={} label={:?}",
                        step.event,
                        step.phase,
                        step.state.requested_open,
                        step.state.animation_settled,
                        step.state.is_compact_layout,
                        step.burger.aria_label(),
                    );
                }
            }
            info!(phase = ?replay.state().phase(), "replay finished");
        }
    }

    Ok(())
}

fn print_link(link: &MenuLink, depth: usize) {
    let marker = if link.external { " (external)" } else { "" };
    println!(
        "{}- {} -> {}{marker}",
        "  ".repeat(depth),
        link.label,
        link.href
    );
    for child in &link.children {
        print_link(child, depth + 1);
    }
}
