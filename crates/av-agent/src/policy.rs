//! Driving policies.
//!
//! The player and the NPCs run the same decision core; what differs is
//! captured here as plain data.  NPC traits are randomized per agent from
//! its own deterministic RNG stream, so respawning one NPC never perturbs
//! another's personality.

use av_core::AgentRng;

/// Player base speed in cells per second.
const PLAYER_BASE_SPEED: f32 = 3.0;

/// NPCs drive at three quarters of the player base before their individual
/// speed factor is applied.
const NPC_BASE_RATIO: f32 = 0.75;

/// Per-agent driving parameters.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Policy {
    /// Nominal speed in cells per second before any factor.
    pub base_speed: f32,
    /// Personality speed multiplier.
    pub speed_factor: f32,
    /// Seconds of waiting on a taken cell before switching to a crawl.
    pub patience_secs: f32,
    /// Seconds without progress before the agent gives up.
    pub stuck_timeout_secs: f32,
    /// Whether giving up removes the agent (NPCs) or not (the player).
    pub removable: bool,
    /// Hard stop when the next cell is an occupied crossing, instead of
    /// merely slowing down.
    pub hard_stop_for_pedestrians: bool,
    /// Speed multiplier while crawling behind a blocking agent.
    pub blocked_crawl_factor: f32,
}

impl Policy {
    /// The player's fixed policy: patient, careful around pedestrians, and
    /// never removed from the simulation.
    pub fn player() -> Self {
        Self {
            base_speed: PLAYER_BASE_SPEED,
            speed_factor: 1.0,
            patience_secs: 4.0,
            stuck_timeout_secs: 10.0,
            removable: false,
            hard_stop_for_pedestrians: true,
            blocked_crawl_factor: 0.2,
        }
    }

    /// A randomized NPC personality.
    ///
    /// Aggressiveness in [0.3, 1.0] maps linearly onto the crawl factor
    /// range [0.3, 0.6]: pushier drivers creep harder at a blockage.
    pub fn npc(rng: &mut AgentRng) -> Self {
        let aggressiveness: f32 = rng.gen_range(0.3..1.0);
        Self {
            base_speed: PLAYER_BASE_SPEED * NPC_BASE_RATIO,
            speed_factor: rng.gen_range(0.5..1.4),
            patience_secs: rng.gen_range(0.5..3.0),
            stuck_timeout_secs: 10.0,
            removable: true,
            hard_stop_for_pedestrians: false,
            blocked_crawl_factor: 0.3 + (aggressiveness - 0.3) * (0.3 / 0.7),
        }
    }

    /// Randomized delay before a freshly spawned NPC starts driving.
    pub fn npc_spawn_delay(rng: &mut AgentRng) -> f32 {
        rng.gen_range(0.0..2.0)
    }

    /// Full speed in cells per second.
    #[inline]
    pub fn cruise_speed(&self) -> f32 {
        self.base_speed * self.speed_factor
    }

    /// Crawl speed in cells per second.
    #[inline]
    pub fn crawl_speed(&self) -> f32 {
        self.cruise_speed() * self.blocked_crawl_factor
    }
}
