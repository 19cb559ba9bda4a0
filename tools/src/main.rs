//! keeper-runner: headless host for the reptile keeper simulation.
//!
//! Usage:
//!   keeper-runner --seed 12345 --ticks 1000 --db keeper.db
//!   keeper-runner --db keeper.db --config keeper.json --realtime
//!   keeper-runner --db keeper.db --ipc-mode

use anyhow::Result;
use reptile_core::{
    clock::{ClockSource, ManualClock, SystemClock},
    command::{CommandOutcome, PlayerCommand},
    config::SimConfig,
    engine::SimEngine,
    event::SimEvent,
    save::SaveManager,
    snapshot::EngineSnapshot,
    species::SpeciesId,
    store::{KvStore, SqliteStore},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Collection used when there is no usable save.
const DEFAULT_REPTILES: [(SpeciesId, &str); 3] = [
    (SpeciesId::PogonaVitticeps, "Sunny"),
    (SpeciesId::LeopardGecko, "Luna"),
    (SpeciesId::BallPython, "Orion"),
];

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Command { command: PlayerCommand },
    Save,
    Quit,
}

#[derive(serde::Serialize)]
struct IpcResponse {
    state:   EngineSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<CommandOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events:  Vec<SimEvent>,
}

type Saves = SaveManager<SqliteStore>;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match find_arg(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.tick_interval_ms = parse_arg(&args, "--tick-ms", config.tick_interval_ms);
    let ticks = parse_arg(&args, "--ticks", 1_000u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let realtime = args.iter().any(|a| a == "--realtime");
    let db = find_arg(&args, "--db").unwrap_or(":memory:");

    if !ipc_mode {
        println!("Reptile Keeper: keeper-runner");
        println!("  seed:      {}", config.seed);
        println!("  ticks:     {ticks}");
        println!("  tick ms:   {}", config.tick_interval_ms);
        println!("  db:        {db}");
        println!();
    }

    let store = SqliteStore::open(db, &config.namespace)?;
    store.migrate()?;
    let mut saves = SaveManager::new(store);
    saves.initialize()?;

    let mut engine = SimEngine::new(config);
    let persist = open_collection(&mut engine, &saves)?;

    if ipc_mode {
        run_ipc_loop(&mut engine, &mut saves, persist)?;
    } else if realtime {
        let clock = SystemClock::new();
        run_ticks(&mut engine, &mut saves, persist, &clock, ticks, |ms| {
            std::thread::sleep(Duration::from_millis(ms))
        })?;
    } else {
        let clock = ManualClock::new(0);
        run_ticks(&mut engine, &mut saves, persist, &clock, ticks, |ms| clock.advance(ms))?;
    }

    save_now(&engine, &mut saves, persist)?;
    if !ipc_mode {
        print_summary(&engine, &saves);
    }
    Ok(())
}

/// Restore the saved collection, or seed as many defaults as capacity allows.
/// Returns whether saving is allowed: a stored save that could not be
/// restored is never overwritten.
fn open_collection<S: KvStore>(engine: &mut SimEngine, saves: &SaveManager<S>) -> Result<bool> {
    if engine.restore_or_default(saves) {
        return Ok(true);
    }
    let unusable = saves.has_save_data()?;
    if unusable {
        log::error!("Stored save could not be restored; saving is disabled for this run");
    }
    log::info!("Starting a new collection");
    for (species, name) in DEFAULT_REPTILES.iter().take(engine.config.capacity) {
        engine.add(*species, name)?;
    }
    Ok(!unusable)
}

/// Tick `ticks` times, measuring each step on `clock` and auto-saving on
/// the configured cadence. `wait` lets the clock move between ticks.
fn run_ticks(
    engine: &mut SimEngine,
    saves: &mut Saves,
    persist: bool,
    clock: &dyn ClockSource,
    ticks: u64,
    wait: impl Fn(u64),
) -> Result<()> {
    let interval = engine.config.tick_interval_ms;
    let autosave = engine.config.autosave_every_ticks.max(1);
    let mut last = clock.now_ms();

    for n in 1..=ticks {
        wait(interval);
        let now = clock.now_ms();
        let events = engine.tick(now.saturating_sub(last));
        last = now;
        for event in &events {
            log::info!("{}", serde_json::to_string(event)?);
        }
        if n % autosave == 0 {
            // Auto-save failures are logged by the save layer; keep ticking.
            let _ = save_now(engine, saves, persist);
        }
    }
    Ok(())
}

fn save_now<S: KvStore>(engine: &SimEngine, saves: &mut SaveManager<S>, persist: bool) -> Result<()> {
    if !persist {
        log::warn!("Save skipped: the stored save is kept as it was");
        return Ok(());
    }
    saves.save(engine.reptiles(), engine.now())?;
    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine, saves: &mut Saves, persist: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let mut response = IpcResponse {
            state:   engine.snapshot(),
            outcome: None,
            events:  Vec::new(),
        };
        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Tick { count } => {
                let interval = engine.config.tick_interval_ms;
                response.events = engine.run_ticks(count, interval);
            }
            IpcCommand::Command { command } => match engine.apply(command) {
                Ok(outcome) => response.outcome = Some(outcome),
                Err(e) => {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            },
            IpcCommand::Save => {
                if !persist {
                    write_error(&mut stdout, "saving is disabled: stored save could not be restored")?;
                    continue;
                }
                if let Err(e) = save_now(engine, saves, persist) {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            }
        }
        response.state = engine.snapshot();
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(engine: &SimEngine, saves: &Saves) {
    let stats = saves.statistics();
    println!("=== RUN SUMMARY ===");
    println!("  sim time:       {} ms", engine.now());
    println!("  ticks run:      {}", engine.clock.ticks_run);
    println!("  reptiles:       {}", engine.count());
    println!("  keeper level:   {}", engine.keeper_level());
    println!("  saves:          {} ok / {} failed", stats.successful_saves, stats.failed_saves);
    println!("  save size:      {} bytes", stats.data_size);
    println!();
    for r in engine.reptiles() {
        println!(
            "  {:<12} {:?}  {:?}  health {:>3}  hunger {:>3}  {:.1} g",
            r.name, r.life_stage, r.behavior, r.health.overall_health, r.health.hunger, r.mass_g
        );
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
