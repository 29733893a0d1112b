use anyhow::{Context, Result};
use clap::Parser;
use pigeon_data::Position;
use pigeon_park_lib::app::{App, RunOptions, RunReport};
use pigeon_park_lib::model::config::AppConfig;
use pigeon_park_lib::model::metrics::init_logging;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 60.0)]
    seconds: f64,

    /// Frames per simulated second (defaults to world.target_fps)
    #[arg(long)]
    fps: Option<u64>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Fixed player position as X,Y
    #[arg(long, value_parser = parse_position)]
    threat: Option<Position>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad X: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad Y: {e}"))?;
    Ok(Position::new(x, y))
}

fn print_summary(report: &RunReport) {
    println!(
        "{} frames, {} spawns, {} sent away, {} left the park",
        report.frames, report.spawns, report.forced_flees, report.despawns
    );
    for c in &report.captures {
        println!(
            "  t={:>7.2}s station {:>2}: {} ({}, {:?}) worth {}",
            c.time,
            c.station,
            c.pigeon.name,
            c.pigeon.species.as_str(),
            c.pigeon.tier,
            c.pigeon.price()
        );
    }
    println!("Earnings: {}", report.earnings);
    for region in &report.snapshot.regions {
        let s = &region.states;
        println!(
            "  region {}: {}/{} (normal {}, cautious {}, backoff {}, flee {})",
            region.id,
            region.population,
            region.target_count,
            s.normal,
            s.cautious,
            s.backoff,
            s.flee
        );
    }
    for st in &report.snapshot.stations {
        println!(
            "  station {} {:?} on {:?}: {}/{} feed",
            st.id, st.trap, st.terrain, st.remaining_feed, st.max_feed
        );
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config))?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }

    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let options = RunOptions {
        seconds: args.seconds,
        fps: args.fps.unwrap_or(config.world.target_fps),
        threat: args.threat,
    };

    let mut app = App::new(config)?;
    let report = app.run(&options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}
