//! Ocean Drift - Entry Point
//!
//! Interactive driver for the drift simulation. Reads commands from stdin,
//! advances virtual time on request, and persists the session to a JSON
//! save file. Rendering here is plain text; the engine only hands back
//! event batches.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use ocean_drift::catalog::data::default_catalog;
use ocean_drift::core::config::SimConfig;
use ocean_drift::core::error::Result;
use ocean_drift::core::types::Severity;
use ocean_drift::sim::progression::progress_fraction;
use ocean_drift::sim::session::{DiscoveryOutcome, GameSession, SessionEvent};

/// Idle ocean-drifting simulation
#[derive(Parser, Debug)]
#[command(name = "ocean-drift")]
#[command(about = "Drift across the ocean, investigate discoveries, upgrade your vessel")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Save file path
    #[arg(long, default_value = "ocean-drift-save.json")]
    save: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("ocean_drift=info")
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut session = GameSession::new(default_catalog(), SimConfig::default(), seed);

    // Resume from disk when a save exists; a corrupt file keeps the fresh
    // session instead of crashing.
    if args.save.exists() {
        match std::fs::read_to_string(&args.save) {
            Ok(blob) => match session.load_str(&blob) {
                Ok(()) => {
                    session.state.events.record("Loaded saved game");
                    println!("Loaded save from {}", args.save.display());
                }
                Err(e) => println!("Could not load save ({e}); starting fresh."),
            },
            Err(e) => println!("Could not read save file ({e}); starting fresh."),
        }
    }

    println!();
    println!("=== OCEAN DRIFT ===");
    println!("Your vessel drifts with the current. Keep an eye out for discoveries!");
    println!();
    println!("Commands:");
    println!("  run <seconds>      - Let time pass");
    println!("  status / s         - Show vessel, distance, resources");
    println!("  investigate <id>   - Investigate a discovery");
    println!("  anchor / sail      - Pause or resume the journey");
    println!("  upgrade            - Upgrade to the next vessel tier");
    println!("  install <id> <slot>- Install a module");
    println!("  sell <slot>        - Sell the module in a slot");
    println!("  log                - Show the event history");
    println!("  save               - Save the game");
    println!("  quit / q           - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or_default();
        match command {
            "quit" | "q" => break,
            "status" | "s" => display_status(&session),
            "run" => {
                let seconds: u64 = parts.next().and_then(|v| v.parse().ok()).unwrap_or(10);
                let events = session.advance(seconds * 1000);
                present_events(&mut session, &events, &args.save)?;
            }
            "investigate" | "i" => {
                let Some(id) = parts.next().and_then(|v| v.parse::<u64>().ok()) else {
                    println!("Usage: investigate <id>");
                    continue;
                };
                match session.investigate(ocean_drift::core::types::DiscoveryId(id)) {
                    Some(summary) => {
                        println!("{} (+{} nautical miles)", summary.message, summary.bonus);
                        if let Some(gain) = &summary.resource {
                            println!("  +{} {}", gain.amount, gain.name);
                        }
                    }
                    None => println!("That discovery is already gone."),
                }
                let events = session.drain_events();
                present_events(&mut session, &events, &args.save)?;
            }
            "anchor" => {
                session.set_sailing(false);
                println!("Anchor dropped. Resume with 'sail'.");
                session.drain_events();
            }
            "sail" => {
                session.set_sailing(true);
                println!("The journey resumes.");
                session.drain_events();
            }
            "upgrade" => match session.upgrade_vessel() {
                Ok(receipt) => println!("Upgraded: {} -> {}", receipt.from, receipt.to),
                Err(reason) => println!("Cannot upgrade: {reason}"),
            },
            "install" => {
                let module = parts.next().unwrap_or("autocollector");
                let slot: usize = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0);
                match session.install_module(module, slot) {
                    Ok(receipt) => {
                        println!("Installed {} in slot {}.", receipt.module_name, receipt.slot)
                    }
                    Err(reason) => println!("Cannot install: {reason}"),
                }
            }
            "sell" => {
                let Some(slot) = parts.next().and_then(|v| v.parse::<usize>().ok()) else {
                    println!("Usage: sell <slot>");
                    continue;
                };
                match session.sell_module(slot) {
                    Ok(receipt) => {
                        print!(
                            "Sold {} for {} nautical miles",
                            receipt.module_name, receipt.distance_refund
                        );
                        for refund in &receipt.material_refunds {
                            print!(", +{} {}", refund.amount, refund.id);
                        }
                        println!();
                    }
                    Err(reason) => println!("Cannot sell: {reason}"),
                }
            }
            "log" => {
                for entry in session.state.events.iter() {
                    println!("  [{}] {}", entry.time, entry.message);
                }
            }
            "save" => {
                write_save(&session, &args.save)?;
                println!("Game saved to {}", args.save.display());
            }
            _ => println!("Unknown command: {command}"),
        }
    }

    write_save(&session, &args.save)?;
    println!("Saved. Fair winds!");
    Ok(())
}

fn write_save(session: &GameSession, path: &PathBuf) -> Result<()> {
    let blob = session.save_string()?;
    std::fs::write(path, blob)?;
    Ok(())
}

fn present_events(
    session: &mut GameSession,
    events: &[SessionEvent],
    save_path: &PathBuf,
) -> Result<()> {
    for event in events {
        match event {
            SessionEvent::DiscoverySpawned {
                id,
                type_name,
                position,
                ..
            } => {
                println!(
                    "A {} appears on the horizon at {:.0}%! (investigate {})",
                    type_name, position, id.0
                );
            }
            SessionEvent::DiscoveryRemoved { id, outcome } => {
                if *outcome == DiscoveryOutcome::Ignored {
                    println!("Discovery {} drifted away unclaimed.", id.0);
                }
            }
            SessionEvent::Notify { message, severity } => {
                let prefix = match severity {
                    Severity::Success => "✅",
                    Severity::Error => "❌",
                    Severity::Info => "•",
                };
                println!("{prefix} {message}");
            }
            SessionEvent::AutoSave => {
                write_save(session, save_path)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn display_status(session: &GameSession) {
    let state = &session.state;
    let vessel = &session.catalog.vessels()[state.current_vessel];
    println!();
    println!(
        "=== {} {} — {} nautical miles ===",
        vessel.icon, vessel.name, state.distance
    );
    println!(
        "  Drift speed: {} / tick | Sailing: {} | Journey: {:.1}%",
        vessel.drift_speed,
        if state.is_sailing { "yes" } else { "anchored" },
        progress_fraction(&session.config, state.distance) * 100.0
    );

    print!("  Resources:");
    for def in session.catalog.resources() {
        print!(" {}{} {}", def.icon, def.name, state.resources.balance(&def.id));
    }
    println!();

    println!("  Slots ({}):", vessel.module_slots);
    for slot in 0..vessel.module_slots {
        match state.module_in_slot(slot) {
            Some(installed) => {
                let name = session
                    .catalog
                    .module(&installed.module_id)
                    .map(|m| m.name.as_str())
                    .unwrap_or(installed.module_id.as_str());
                println!("    [{slot}] {name}");
            }
            None => println!("    [{slot}] empty"),
        }
    }

    if state.discoveries.is_empty() {
        println!("  Horizon: clear");
    } else {
        println!("  Horizon:");
        for discovery in &state.discoveries {
            let def = &session.catalog.discovery_types()[discovery.type_index];
            println!(
                "    [{}] {} (expires at {}ms)",
                discovery.id.0, def.name, discovery.expires_at_ms
            );
        }
    }
    println!();
}
