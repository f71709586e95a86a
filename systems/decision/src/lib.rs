#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick orchestration of the grid model, hazard projection, tracking,
//! pathing, scoring and close-quarters systems.
//!
//! [`DecisionLoop`] owns every piece of state that survives between
//! snapshots. Everything else is rebuilt from the snapshot on each tick.

use lasergrid_core::{AgentView, Cell, Command, Direction, Snapshot};
use lasergrid_system_combat::{engage, CombatSearch, CombatTuning, Hero};
use lasergrid_system_path_cost::{PathCoster, PenaltyTuning};
use lasergrid_system_scoring::{RewardTuning, Scorer};
use lasergrid_system_tracking::{AgentTracker, TrackerTuning};
use lasergrid_world::{GridModel, HazardField, ParseError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Tuning of every system driven by the loop.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Danger constants of the path sweep.
    pub penalties: PenaltyTuning,
    /// Rewards of the target selector.
    pub rewards: RewardTuning,
    /// Idle and reload thresholds of the agent tracker.
    pub tracker: TrackerTuning,
    /// Limits and weights of the close-quarters systems.
    pub combat: CombatTuning,
    /// Number of ticks the laser trace projects ahead.
    pub hazard_horizon: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            penalties: PenaltyTuning::default(),
            rewards: RewardTuning::default(),
            tracker: TrackerTuning::default(),
            combat: CombatTuning::default(),
            hazard_horizon: HazardField::DEFAULT_HORIZON,
        }
    }
}

/// Failures that prevent a tick from producing a decision.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The snapshot could not be turned into a grid.
    #[error("malformed snapshot: {0}")]
    Parse(#[from] ParseError),
}

/// Lifecycle of the controlled robot as seen by the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    /// No robot of ours on the board.
    #[default]
    Waiting,
    /// Our robot is falling or was hit by a laser.
    Dead,
    /// Our robot is alive and taking commands.
    Playing,
}

/// System that produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    /// Our robot is not on the board yet.
    Waiting,
    /// Our robot is dying.
    Dead,
    /// Straight-line fire at an aligned agent.
    Engage,
    /// First step toward the selected target.
    Pursue,
    /// No target could be reached.
    Stranded,
    /// Adversarial search near other agents.
    CloseQuarters,
}

/// Command chosen for one snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Command to send to the server.
    pub command: Command,
    /// Destination the command heads for, if any.
    pub target: Option<Cell>,
    /// System that chose the command.
    pub reason: Reason,
}

impl Decision {
    fn hold(reason: Reason) -> Self {
        Self {
            command: Command::Stop,
            target: None,
            reason,
        }
    }
}

/// Cross-tick driver that turns snapshots into commands.
#[derive(Debug)]
pub struct DecisionLoop {
    config: EngineConfig,
    tracker: AgentTracker,
    state: PlayState,
    level: Option<u32>,
    tick: u64,
    gold_collected: u32,
    previous_gold: Vec<Cell>,
    last_own_fire: Option<u64>,
    jump_vector: Option<Direction>,
}

impl Default for DecisionLoop {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DecisionLoop {
    /// Creates a loop waiting for its first snapshot.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let tracker = AgentTracker::new(config.tracker.clone());
        Self {
            config,
            tracker,
            state: PlayState::Waiting,
            level: None,
            tick: 0,
            gold_collected: 0,
            previous_gold: Vec::new(),
            last_own_fire: None,
            jump_vector: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Ticks played since the last reset.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Gold picked up since the last reset.
    #[must_use]
    pub fn gold_collected(&self) -> u32 {
        self.gold_collected
    }

    /// Agents tracked on the latest tick.
    #[must_use]
    pub fn roster(&self) -> AgentView {
        self.tracker.roster()
    }

    /// Produces the command for one snapshot.
    pub fn tick(&mut self, snapshot: &Snapshot) -> Result<Decision, EngineError> {
        let grid = GridModel::from_snapshot(snapshot)?;

        let Some(hero) = grid.hero() else {
            self.enter(PlayState::Waiting);
            return Ok(Decision::hold(Reason::Waiting));
        };
        if hero.state.is_dying() {
            self.enter(PlayState::Dead);
            return Ok(Decision::hold(Reason::Dead));
        }

        let level = snapshot.level_progress.as_ref().map(|progress| progress.current);
        if self.state != PlayState::Playing || level != self.level {
            self.restart(level);
        }

        self.tick += 1;
        let tick = self.tick;
        if !hero.airborne() && self.previous_gold.contains(&hero.cell) {
            self.gold_collected += 1;
            debug!(cell = %hero.cell, total = self.gold_collected, "gold collected");
        }
        self.previous_gold = grid.gold().to_vec();

        let hazards = HazardField::build(&grid, self.config.hazard_horizon);
        self.tracker.observe(tick, &grid, self.gold_collected);
        let roster = self.tracker.roster();

        let gun_ready = self
            .last_own_fire
            .map_or(true, |fired| tick.saturating_sub(fired) >= self.config.tracker.gun_reload);

        let decision = match engage(&grid, &hazards, hero.cell, &roster, gun_ready && !hero.airborne()) {
            Some(direction) => Decision {
                command: Command::from(direction),
                target: None,
                reason: Reason::Engage,
            },
            None => self.navigate(&grid, &hazards, hero.cell, hero.airborne(), gun_ready, &roster),
        };

        if decision.command.is_fire() {
            self.last_own_fire = Some(tick);
        }
        self.jump_vector = match decision.command {
            Command::Jump(direction) if direction.is_cardinal() => Some(direction),
            _ => None,
        };

        debug!(
            tick,
            hero = %hero.cell,
            command = %decision.command,
            reason = ?decision.reason,
            agents = roster.len(),
            "decision"
        );
        Ok(decision)
    }

    fn navigate(
        &self,
        grid: &GridModel,
        hazards: &HazardField,
        origin: Cell,
        airborne: bool,
        gun_ready: bool,
        roster: &AgentView,
    ) -> Decision {
        let coster = PathCoster::new(grid, hazards, &self.config.penalties);
        let costs = coster.sweep(origin, roster);
        let selection = Scorer::new(grid, &self.config.rewards).decide(&costs, roster, self.gold_collected);
        let target = selection.target.map(|target| target.cell);

        if CombatSearch::in_close_quarters(origin, roster, &self.config.combat) {
            let target_costs = target.map(|cell| coster.sweep(cell, &AgentView::default()));
            let hero = Hero {
                cell: origin,
                airborne,
                jump_vector: self.jump_vector,
                ammo_ready: gun_ready,
            };
            let mut search = CombatSearch::new(
                grid,
                hazards,
                &self.config.combat,
                target_costs.as_ref(),
                hero,
                roster,
            );
            if let Some(outcome) = search.run() {
                return Decision {
                    command: Command::from(outcome.direction),
                    target,
                    reason: Reason::CloseQuarters,
                };
            }
        }

        Decision {
            command: Command::from(selection.direction),
            target,
            reason: if target.is_some() {
                Reason::Pursue
            } else {
                Reason::Stranded
            },
        }
    }

    fn enter(&mut self, state: PlayState) {
        if self.state != state {
            info!(from = ?self.state, to = ?state, "robot state changed");
            self.state = state;
        }
    }

    fn restart(&mut self, level: Option<u32>) {
        info!(?level, "starting a new life");
        self.enter(PlayState::Playing);
        self.level = level;
        self.tracker.reset();
        self.tick = 0;
        self.gold_collected = 0;
        self.previous_gold.clear();
        self.last_own_fire = None;
        self.jump_vector = None;
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;

    #[test]
    fn partial_config_overrides_only_named_values() {
        let config: EngineConfig = toml::from_str(
            "hazard_horizon = 6\n\n[combat]\nradius = 2\n\n[rewards]\ngold = 35.0\n",
        )
        .expect("valid config");

        assert_eq!(config.hazard_horizon, 6);
        assert_eq!(config.combat.radius, 2);
        assert_eq!(config.combat.max_agents, 3);
        assert_eq!(config.rewards.gold, 35.0);
        assert_eq!(config.tracker.gun_reload, 3);
        assert_eq!(config.penalties, EngineConfig::default().penalties);
    }

    #[test]
    fn empty_config_is_the_default() {
        let config: EngineConfig = toml::from_str("").expect("empty config");
        assert_eq!(config, EngineConfig::default());
    }
}
