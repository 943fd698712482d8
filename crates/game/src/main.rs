//! Cowduction - headless tractor-beam abduction run.
//!
//! Spawns a pasture of cows and farmers, flies the craft with a scripted pilot and
//! reports the score. Tuning comes from `config.ron` in the working directory.

mod config;
mod gunfire;
mod herd;
mod hud;
mod session;
mod ufo;

use anyhow::Result;

use config::GameConfig;
use session::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    log::info!(
        "Starting Cowduction: {} cows, {} farmers, {:.0}s run, {}-segment beam",
        config.herd.cows,
        config.herd.farmers,
        config.session.duration_seconds,
        config.grapple.number_of_joints
    );

    if std::env::args().any(|arg| arg == "--write-config") {
        config.save();
        log::info!("Wrote config.ron");
    }

    let mut session = Session::new(&config);
    let summary = session.run();

    println!("╔══════════════════════════════════════╗");
    println!("║            COWDUCTION REPORT         ║");
    println!("╠══════════════════════════════════════╣");
    println!("  Time        {:>8.1}s", summary.elapsed);
    println!("  Score       {:>8.0}", summary.score);
    println!("  Abductions  {:>8}", summary.abductions);
    println!("  Shots/Hits  {:>4}/{:<4}", summary.shots, summary.hits);
    println!("  Accuracy    {:>7.0}%", session.hud.accuracy() * 100.0);
    println!("  Releases    {:>8}", summary.releases);
    println!("  Cows left   {:>8}", summary.cows_left);
    println!("  Hull damage {:>8.0}", summary.hull_damage);
    println!("╚══════════════════════════════════════╝");

    Ok(())
}
