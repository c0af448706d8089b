//! # Greenwood Main Entry Point
//!
//! Parses the command line, starts a session on the requested map, and
//! runs the macroquad frame loop: poll input, tick the session, render.

use clap::Parser;
use greenwood::{config, Display, GameContext, GreenwoodResult, Session};
use macroquad::prelude::*;

/// Command line arguments for the Greenwood engine.
#[derive(Parser, Debug)]
#[command(name = "greenwood")]
#[command(about = "A 2D tile-based action RPG engine")]
#[command(version)]
struct Args {
    /// Map to start on
    #[arg(short, long, default_value = "meadow")]
    map: String,

    /// Directory holding map definition files
    #[arg(short, long, default_value = "assets")]
    assets: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[macroquad::main("Greenwood")]
async fn main() -> GreenwoodResult<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&args.log_level),
    )
    .init();
    log::info!("Starting Greenwood v{}", greenwood::VERSION);

    let context = GameContext::new(&args.assets);
    let mut session = Session::new(context, &args.map)?;
    let mut display = Display::new(config::TILE_SIZE);

    loop {
        for event in display.poll_input_events() {
            session.handle_input(event)?;
        }
        session.update(get_frame_time())?;

        for cue in session.drain_cues() {
            // No audio backend yet; cues land in the log
            log::debug!("sound cue: {cue:?}");
        }

        display.render(session.scene())?;
        next_frame().await;
    }
}
