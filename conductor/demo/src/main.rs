//! Checkout Demo
//!
//! Headless driver for the checkout confirmation sequence. Wires the Conductor
//! to the tokio timer engine, taps the button, and prints every message the
//! Conductor emits. The next tap is sent as soon as the previous one has
//! played out (sequence completed or reset applied).
//!
//! # Usage
//!
//! ```bash
//! # Play the sequence once, then reset
//! checkout-demo
//!
//! # Three taps at double speed, JSON output
//! checkout-demo --taps 3 --time-scale 0.5 --json
//!
//! # Narrower button and a custom config file
//! checkout-demo --button-width 280 --config ./choreography.toml
//!
//! # With verbose logging
//! RUST_LOG=debug checkout-demo
//! ```
//!
//! # Environment Variables
//!
//! - `CHECKOUT_CONFIG`: Configuration file path
//! - `CHECKOUT_TIME_SCALE`: Playback multiplier (1.0 = as designed)
//! - `CHECKOUT_BUTTON_WIDTH`: Button width in points
//! - `CHECKOUT_SPRING_DAMPING`: Reveal spring damping
//! - `RUST_LOG`: Log filter (overrides `--log-level`)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

use checkout_conductor::{
    default_config_path, load_config_from_path, ChoreographyMessage, Conductor, ConfigOverrides,
    SurfaceEvent, TextLayout, TimerEngine,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "checkout-demo")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "CHECKOUT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of taps to send (the first plays the sequence, the next resets)
    #[arg(short = 'n', long, default_value_t = 2)]
    taps: u32,

    /// Playback multiplier (0 = settle instantly, 2 = half speed)
    #[arg(short = 't', long, value_name = "SCALE")]
    time_scale: Option<f32>,

    /// Button width in points
    #[arg(short = 'w', long, value_name = "PX")]
    button_width: Option<f32>,

    /// Print messages as JSON lines
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "CHECKOUT_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "checkout_demo={level},checkout_conductor={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_message(msg: &ChoreographyMessage, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(msg)?);
    } else {
        println!("{msg:?}");
    }
    Ok(())
}

/// A tap has fully played out once the sequence completes or a reset lands
fn tap_settled(msg: &ChoreographyMessage) -> bool {
    matches!(
        msg,
        ChoreographyMessage::SequenceCompleted { .. } | ChoreographyMessage::ResetApplied { .. }
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config =
        load_config_from_path(config_path).context("Failed to load choreography config")?;
    ConfigOverrides {
        time_scale: args.time_scale,
        button_width: args.button_width,
    }
    .apply(&mut config);
    config
        .validate()
        .context("Invalid command line overrides")?;

    info!(
        source = %config.source(),
        time_scale = config.time_scale,
        button_width = config.layout.button_width,
        "Configuration loaded"
    );

    let layout = TextLayout::new(config.layout.clone(), config.copy.clone());
    let engine = TimerEngine::new(Handle::current(), config.time_scale);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(8);

    let conductor = Conductor::new(engine, layout, config, tx);
    let mut handle = tokio::spawn(conductor.run(event_rx));

    let mut remaining = args.taps;
    let mut event_tx = Some(event_tx);
    if remaining == 0 {
        event_tx = None;
    } else if let Some(sender) = &event_tx {
        sender.send(SurfaceEvent::PrimaryTap).await?;
        remaining -= 1;
    }

    let conductor = loop {
        tokio::select! {
            Some(msg) = rx.recv() => {
                print_message(&msg, args.json)?;
                if tap_settled(&msg) {
                    if remaining == 0 {
                        // Hang up; the run loop exits once the sequence is at rest
                        event_tx = None;
                    } else if let Some(sender) = &event_tx {
                        sender.send(SurfaceEvent::PrimaryTap).await?;
                        remaining -= 1;
                    }
                }
            }
            result = &mut handle => {
                break result.context("Conductor task panicked")??;
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                handle.abort();
                return Ok(());
            }
        }
    };

    // Messages emitted just before the loop returned
    while let Ok(msg) = rx.try_recv() {
        print_message(&msg, args.json)?;
    }

    let stats = conductor.stats();
    if args.json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!("{stats:?}");
    }
    info!(
        runs_completed = stats.runs_completed,
        resets = stats.resets,
        "Demo finished"
    );

    Ok(())
}
