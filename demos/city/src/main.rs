//! city — grid-city traffic demo for the av navigation engine.
//!
//! Runs the built-in 20×12 city for three simulated minutes: one player
//! vehicle lapping Start → Goal plus a handful of NPCs, with traffic
//! lights, pedestrian crossings, and randomly spawning roadwork.  Writes
//! a per-tick CSV trace and prints a summary table at the end.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use av_agent::{AgentKind, AgentState};
use av_core::{AgentId, Cell, SimConfig, Tick};
use av_grid::GridEvent;
use av_path::Algorithm;
use av_sim::{AgentSnapshot, CsvTraceObserver, SimBuilder, SimObserver};

// ── Constants ─────────────────────────────────────────────────────────────────

const NPC_COUNT:        usize = 5;
const PEDESTRIAN_COUNT: usize = 4;
const SEED:             u64   = 42;
const SIM_MINUTES:      u64   = 3;
const TICKS_PER_MINUTE: u64   = 600; // 0.1 s per tick

// ── Observer wrapper to count events around the trace writer ─────────────────

struct CountingObserver {
    trace:       CsvTraceObserver,
    ticks:       u64,
    grid_events: usize,
    removals:    usize,
    respawns:    usize,
}

impl CountingObserver {
    fn new(trace: CsvTraceObserver) -> Self {
        Self { trace, ticks: 0, grid_events: 0, removals: 0, respawns: 0 }
    }
}

impl SimObserver for CountingObserver {
    fn on_tick_end(&mut self, tick: Tick, snapshots: &[AgentSnapshot]) {
        self.ticks += 1;
        self.trace.on_tick_end(tick, snapshots);
    }

    fn on_grid_event(&mut self, _tick: Tick, _event: &GridEvent) {
        self.grid_events += 1;
    }

    fn on_agent_removed(&mut self, tick: Tick, agent: AgentId) {
        self.removals += 1;
        println!("  [{tick}] {agent} gave up and left");
    }

    fn on_agent_respawned(&mut self, tick: Tick, agent: AgentId, cell: Cell) {
        self.respawns += 1;
        println!("  [{tick}] {agent} respawned at {cell}");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    println!("=== city — grid traffic demo ===");
    println!("NPCs: {NPC_COUNT}  |  Pedestrians: {PEDESTRIAN_COUNT}  |  Seed: {SEED}");
    println!();

    // 1. Sim config: three simulated minutes at 10 ticks per second.
    let config = SimConfig {
        total_ticks: SIM_MINUTES * TICKS_PER_MINUTE,
        seed: SEED,
        ..SimConfig::default()
    };

    // 2. Build the sim on the default city map.
    let mut sim = SimBuilder::new(config)
        .algorithm(Algorithm::AStar)
        .npc_count(NPC_COUNT)
        .pedestrian_count(PEDESTRIAN_COUNT)
        .build()?;
    println!(
        "Map: {}×{}, {} traffic lights, {} crossings",
        sim.grid.cols(),
        sim.grid.rows(),
        sim.grid.light_cells().len(),
        sim.grid.crossing_cells().len()
    );
    println!("Sim: {} ticks ({SIM_MINUTES} min)", config.total_ticks);
    println!();

    // 3. Trace output.
    std::fs::create_dir_all("output/city")?;
    let trace = CsvTraceObserver::create(Path::new("output/city/trace.csv"))?;
    let mut obs = CountingObserver::new(trace);

    // 4. Run.
    let t0 = Instant::now();
    sim.run(&mut obs);
    let elapsed = t0.elapsed();
    obs.trace.finish()?;

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks       : {}", obs.ticks);
    println!("  grid events : {}", obs.grid_events);
    println!("  removals    : {}", obs.removals);
    println!("  respawns    : {}", obs.respawns);
    println!("  trace       : output/city/trace.csv");
    println!();

    // 6. Final agent table.
    println!("{:<10} {:<8} {:<10} {:<8} {:>9}", "Agent", "Kind", "Cell", "State", "Progress");
    println!("{}", "-".repeat(48));
    for agent in sim.agents() {
        let kind = match agent.kind {
            AgentKind::Player => "player",
            AgentKind::Npc => "npc",
        };
        let state = match agent.state {
            AgentState::Idle => "idle",
            AgentState::Moving => "moving",
            AgentState::Waiting => "waiting",
            AgentState::Recomputing => "replan",
            AgentState::Removed => "removed",
        };
        println!(
            "{:<10} {:<8} {:<10} {:<8} {:>8.0}%",
            agent.id.index(),
            kind,
            agent.cell.to_string(),
            state,
            agent.route_progress() * 100.0,
        );
    }

    Ok(())
}
