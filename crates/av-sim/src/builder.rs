//! Fluent builder for constructing a [`Sim`].

use rustc_hash::FxHashMap;

use av_agent::{Agent, AgentKind, Occupancy, Policy};
use av_core::{AgentId, AgentRng, Cell, SimConfig, SimRng};
use av_grid::Grid;
use av_path::{Algorithm, DEFAULT_NODE_BUDGET};
use av_traffic::{CrossingZone, LightBoard, LightTiming, ObstacleField};

use crate::error::{SimError, SimResult};
use crate::sim::{pick_distant_destination, Sim};

/// Minimum spawn spacing between NPCs placed at startup.
const SPAWN_MIN_SPACING: u32 = 5;

/// Rejection-sampling attempts per NPC before accepting any free cell.
const SPAWN_ATTEMPTS: usize = 30;

/// Fluent builder for [`Sim`].
///
/// # Defaults
///
/// | Method                 | Default                      |
/// |------------------------|------------------------------|
/// | `.grid(g)`             | [`Grid::default_city`]       |
/// | `.algorithm(a)`        | `Algorithm::AStar`           |
/// | `.npc_count(n)`        | 5                            |
/// | `.pedestrian_count(n)` | 4                            |
/// | `.light_timing(t)`     | `LightTiming::default()`     |
/// | `.node_budget(n)`      | `DEFAULT_NODE_BUDGET` (500)  |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::default())
///     .npc_count(8)
///     .algorithm(Algorithm::AStar)
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config: SimConfig,
    grid: Option<Grid>,
    algorithm: Algorithm,
    npc_count: usize,
    pedestrian_count: usize,
    light_timing: LightTiming,
    node_budget: usize,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            grid: None,
            algorithm: Algorithm::AStar,
            npc_count: 5,
            pedestrian_count: 4,
            light_timing: LightTiming::default(),
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }

    /// Supply the city map.  Must carry a Start and a Goal marker.
    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn npc_count(mut self, count: usize) -> Self {
        self.npc_count = count;
        self
    }

    pub fn pedestrian_count(mut self, count: usize) -> Self {
        self.pedestrian_count = count;
        self
    }

    pub fn light_timing(mut self, timing: LightTiming) -> Self {
        self.light_timing = timing;
        self
    }

    /// Cap on cells a single route search may expand.
    pub fn node_budget(mut self, budget: usize) -> Self {
        self.node_budget = budget;
        self
    }

    /// Validate inputs, place the population, and return a ready-to-run
    /// [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        let grid = self.grid.unwrap_or_else(Grid::default_city);
        let start = grid.find_start().ok_or(SimError::NoStart)?;
        let goal = grid.find_goal().ok_or(SimError::NoGoal)?;

        if self.config.tick_duration_secs <= 0.0 {
            return Err(SimError::Config(
                "tick duration must be positive".into(),
            ));
        }
        let roads = grid.road_cells();
        if self.npc_count + 1 > roads.len() {
            return Err(SimError::Config(format!(
                "{} vehicles cannot fit on {} road cells",
                self.npc_count + 1,
                roads.len()
            )));
        }

        // Independent RNG streams per subsystem, all derived from the one
        // seed.
        let mut master = SimRng::new(self.config.seed);
        let obstacles = ObstacleField::new(master.child(1));
        let crossings = CrossingZone::new(&grid, self.pedestrian_count, master.child(2));

        let mut lights = LightBoard::new(self.light_timing);
        lights.sync_with_grid(&grid);

        let mut occupancy = Occupancy::new();
        let mut agents = Vec::with_capacity(self.npc_count + 1);
        let mut rngs = Vec::with_capacity(self.npc_count + 1);

        // The player drives Start → Goal.
        let player_id = AgentId(0);
        let player = Agent::new(player_id, AgentKind::Player, Policy::player(), start, goal);
        occupancy.reserve(player_id, start);
        agents.push(player);
        rngs.push(AgentRng::new(self.config.seed, player_id));

        // NPCs scatter over the road network with a minimum spacing, which
        // is relaxed when the map is too crowded to satisfy it.
        for n in 1..=self.npc_count {
            let id = AgentId(n as u32);
            let mut rng = AgentRng::new(self.config.seed, id);
            let policy = Policy::npc(&mut rng);

            let cell = scatter_cell(&roads, &agents, &occupancy, &mut master);
            let dest = pick_distant_destination(&grid, cell, &mut rng);

            let mut npc = Agent::new(id, AgentKind::Npc, policy, cell, dest);
            npc.spawn_delay_secs = Policy::npc_spawn_delay(&mut rng);
            occupancy.reserve(id, cell);
            agents.push(npc);
            rngs.push(rng);
        }

        Ok(Sim {
            clock: self.config.make_clock(),
            config: self.config,
            grid,
            lights,
            crossings,
            obstacles,
            algorithm: self.algorithm,
            node_budget: self.node_budget,
            agents,
            rngs,
            occupancy,
            route_index: FxHashMap::default(),
            rng: master,
            pending_events: Vec::new(),
            player_goal_secs: 0.0,
        })
    }
}

/// Pick a free road cell at least [`SPAWN_MIN_SPACING`] from every placed
/// vehicle, falling back to any free cell.
fn scatter_cell(
    roads: &[Cell],
    placed: &[Agent],
    occupancy: &Occupancy,
    rng: &mut SimRng,
) -> Cell {
    let free: Vec<Cell> = roads
        .iter()
        .copied()
        .filter(|&c| occupancy.is_free(c))
        .collect();
    debug_assert!(!free.is_empty(), "validated against road count");

    for _ in 0..SPAWN_ATTEMPTS {
        let cell = free[rng.gen_range(0..free.len())];
        if placed
            .iter()
            .all(|a| cell.manhattan(a.cell) >= SPAWN_MIN_SPACING)
        {
            return cell;
        }
    }
    free[rng.gen_range(0..free.len())]
}
