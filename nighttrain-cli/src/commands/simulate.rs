//! Simulate command - drive a scripted vehicle along a path file.
//!
//! Runs a full session headlessly: the vehicle advances a fixed distance per
//! tick, the session tracks it and spawns content into a recording world.
//! Events are printed as they happen; a summary follows at the end.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use nighttrain::path::PathStore;
use nighttrain::session::{Session, SessionStats};

use super::common::{ConfigLocation, PolicyArg};
use crate::error::CliError;
use crate::sim::{EventLog, RecordingWorld, ScriptedVehicle, VEHICLE};

/// Default distance per tick in metres.
pub const DEFAULT_SPEED: f32 = 4.0;

/// Arguments for `nighttrain simulate`.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Path file to drive (defaults to general.path_file from the config)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Metres travelled per tick
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    pub speed: f32,

    /// Number of ticks to run (defaults to one traversal of the path)
    #[arg(long)]
    pub ticks: Option<usize>,

    /// Waypoint the vehicle starts on
    #[arg(long, default_value_t = 0)]
    pub start_index: usize,

    /// Treat the path as open even if the config says looped
    #[arg(long)]
    pub no_loop: bool,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the schedule policy
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Print only a JSON summary
    #[arg(long)]
    pub json: bool,
}

/// Outcome of a simulation run.
#[derive(Debug)]
pub struct SimulationOutcome {
    pub ticks: usize,
    pub stats: SessionStats,
    pub events: EventLog,
    pub world: RecordingWorld,
    pub live_after_stop: usize,
}

/// Drive `store` according to `args`.
pub fn simulate(
    store: Arc<PathStore>,
    mut session: Session,
    args: &SimulateArgs,
    echo: bool,
) -> Result<SimulationOutcome, CliError> {
    if !(args.speed.is_finite() && args.speed > 0.0) {
        return Err(CliError::Config(format!(
            "--speed must be a positive number of metres (got {})",
            args.speed
        )));
    }
    if args.start_index >= store.len() {
        return Err(CliError::Config(format!(
            "--start-index {} is beyond the last waypoint {}",
            args.start_index,
            store.last_index()
        )));
    }

    let mut vehicle = ScriptedVehicle::new(store.clone(), args.start_index);
    let mut world = RecordingWorld::default();
    let mut events = EventLog::new(echo);

    let remaining = vehicle.total_length() - vehicle.distance();
    let ticks = args
        .ticks
        .unwrap_or_else(|| (remaining / args.speed).ceil() as usize + 1);

    session.start(VEHICLE, &vehicle, &mut world)?;
    tracing::info!(
        ticks,
        speed = args.speed,
        start_index = args.start_index,
        "Simulation started"
    );

    let mut ran = 0;
    for tick in 1..=ticks {
        vehicle.advance(args.speed);
        events.set_tick(tick);
        let report = session.tick(&vehicle, &mut world, &mut events);
        ran = tick;

        if let Some(&last) = report.markers.last() {
            let window = store.window_range(last);
            tracing::debug!(
                tick,
                marker = last,
                window_start = *window.start(),
                window_end = *window.end(),
                active = session.scheduler().active_len(),
                "Markers crossed"
            );
        }
        if vehicle.at_end() && session.tracker().is_finished() {
            break;
        }
    }

    let stats = session.stats();
    session.stop(&mut world);
    let live_after_stop = world.live();
    if live_after_stop > 0 {
        tracing::warn!(live = live_after_stop, "Entities left alive after stop");
    }

    Ok(SimulationOutcome {
        ticks: ran,
        stats,
        events,
        world,
        live_after_stop,
    })
}

/// Run the simulate command.
pub fn run(args: SimulateArgs, location: &ConfigLocation) -> Result<(), CliError> {
    let config = location.load()?;
    let file = match &args.path {
        Some(path) => path.clone(),
        None => config.resolve_path_file(location.base_dir()),
    };

    let mut store_config = config.path_store_config();
    if args.no_loop {
        store_config = store_config.with_looped(false);
    }
    let store = Arc::new(PathStore::load_file(&file, store_config)?);

    let mut session_config = config.session_config();
    if let Some(seed) = args.seed {
        session_config = session_config.with_seed(seed);
    }
    if let Some(policy) = args.policy {
        session_config = session_config.with_policy(policy.to_policy(&config));
    }
    let session = Session::new(store.clone(), session_config);

    if !args.json {
        println!(
            "Driving {} ({} waypoints, {}) at {} m/tick",
            file.display(),
            store.len(),
            if store.is_looped() { "looped" } else { "open" },
            args.speed
        );
        println!();
    }

    let outcome = simulate(store, session, &args, !args.json)?;

    if args.json {
        let value = serde_json::json!({
            "file": file.display().to_string(),
            "ticks": outcome.ticks,
            "session": serde_json::to_value(&outcome.stats)?,
            "world": {
                "spawned": serde_json::to_value(&outcome.world.spawned)?,
                "despawned": outcome.world.despawned,
                "peak_live": outcome.world.peak_live,
                "engagements": outcome.world.engagements,
                "live_after_stop": outcome.live_after_stop,
            },
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let stats = &outcome.stats;
    println!();
    println!("Simulation Summary");
    println!("==================");
    println!("  Ticks:           {}", outcome.ticks);
    println!("  Progress:        {}", stats.progress);
    println!("  Markers crossed: {}", stats.markers_crossed);
    println!("  Laps completed:  {}", stats.laps_completed);
    println!("  Collected:       {}", stats.collected);
    println!(
        "  Spawned:         {} ({} failed)",
        stats.spawned, stats.spawn_failures
    );
    println!("  Despawned:       {}", stats.despawned);
    println!("  Peak live:       {}", outcome.world.peak_live);
    if let Some(deviation) = stats.heading_deviation {
        println!("  Heading offset:  {:.1} deg", deviation);
    }
    if outcome.live_after_stop > 0 {
        println!("  Leaked:          {}", outcome.live_after_stop);
    }

    Ok(())
}
