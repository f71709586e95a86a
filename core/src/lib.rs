#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the lasergrid engine.
//!
//! This crate defines the vocabulary that connects the world model, the pure
//! decision systems, and the adapters. Adapters deserialize a [`Snapshot`]
//! each tick, the world crate turns it into typed grid queries, and systems
//! reason over those queries and the tracked [`Agent`] roster until a single
//! [`Command`] is produced for the game server.

mod direction;
mod element;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use direction::Direction;
pub use element::{Category, Element, RobotState};

/// Location of a single board cell.
///
/// `x` grows to the right and `y` grows upward. Coordinates are signed so that
/// neighbour arithmetic can step off the board and be rejected by bounds
/// checks instead of wrapping.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    x: i32,
    y: i32,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Cell reached by applying the displacement of `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        Self::new(self.x + direction.dx(), self.y + direction.dy())
    }

    /// Cell displaced by `distance` repetitions of `direction`.
    #[must_use]
    pub const fn ray(self, direction: Direction, distance: i32) -> Self {
        Self::new(
            self.x + direction.dx() * distance,
            self.y + direction.dy() * distance,
        )
    }

    /// The four orthogonal neighbours in [`Direction::CARDINALS`] order.
    #[must_use]
    pub const fn neighbours(self) -> [Cell; 4] {
        [
            self.step(Direction::Up),
            self.step(Direction::Down),
            self.step(Direction::Left),
            self.step(Direction::Right),
        ]
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Squared Euclidean distance between two cells.
    #[must_use]
    pub fn distance_squared(self, other: Cell) -> u64 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dy = u64::from(self.y.abs_diff(other.y));
        dx * dx + dy * dy
    }

    /// Reports whether `other` is one orthogonal step away.
    #[must_use]
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

/// One of the three stacked board layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Walls, floor, exits, gold, boxes, holes and emitters.
    Terrain,
    /// Robots, zombies and beams on the ground.
    GroundUnits,
    /// Robots mid jump.
    AirUnits,
}

impl Layer {
    /// All layers in wire order.
    pub const ALL: [Layer; 3] = [Layer::Terrain, Layer::GroundUnits, Layer::AirUnits];

    /// Position of the layer inside the snapshot's `layers` array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Terrain => 0,
            Self::GroundUnits => 1,
            Self::AirUnits => 2,
        }
    }
}

/// Action sent to the game server for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Walk one cell.
    Go(Direction),
    /// Jump, optionally two cells toward a cardinal.
    Jump(Direction),
    /// Pull a box, optionally from a cardinal.
    Pull(Direction),
    /// Fire, optionally toward a cardinal.
    Fire(Direction),
    /// Sacrifice the robot and restart the level.
    Die,
    /// Stay in place.
    Stop,
}

impl Command {
    /// Cardinal the command acts toward, if any.
    #[must_use]
    pub const fn heading(self) -> Option<Direction> {
        match self {
            Self::Go(direction)
            | Self::Jump(direction)
            | Self::Pull(direction)
            | Self::Fire(direction) => {
                if direction.is_cardinal() {
                    Some(direction)
                } else {
                    None
                }
            }
            Self::Die | Self::Stop => None,
        }
    }

    /// Reports whether the command fires a laser.
    #[must_use]
    pub const fn is_fire(self) -> bool {
        matches!(self, Self::Fire(_))
    }
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up | Direction::Down | Direction::Left | Direction::Right => {
                Self::Go(direction)
            }
            Direction::UpJump
            | Direction::DownJump
            | Direction::LeftJump
            | Direction::RightJump
            | Direction::Jump => Self::Jump(direction.cardinal()),
            Direction::FireUp
            | Direction::FireDown
            | Direction::FireLeft
            | Direction::FireRight
            | Direction::Fire => Self::Fire(direction.cardinal()),
            Direction::Pull => Self::Pull(Direction::Stop),
            Direction::Die => Self::Die,
            Direction::Stop => Self::Stop,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (act, direction) = match *self {
            Self::Go(direction) => return f.write_str(direction.cardinal().token()),
            Self::Jump(direction) => (1, direction),
            Self::Pull(direction) => (2, direction),
            Self::Fire(direction) => (3, direction),
            Self::Die => return f.write_str(Direction::Die.token()),
            Self::Stop => return f.write_str(Direction::Stop.token()),
        };
        if direction.is_cardinal() {
            write!(f, "ACT({act}),{}", direction.token())
        } else {
            write!(f, "ACT({act})")
        }
    }
}

/// Stable identifier assigned to a tracked opponent or zombie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable record of a tracked opponent robot or zombie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Identity persisted across ticks on a best-effort basis.
    pub id: AgentId,
    /// Cell occupied on the current tick.
    pub cell: Cell,
    /// Direction of the most recent observed move.
    pub facing: Option<Direction>,
    /// Whether the agent is mid jump.
    pub airborne: bool,
    /// Tick of the most recent observed shot, if any.
    pub last_fire_tick: Option<u64>,
    /// Tick of the most recent observed move or first sighting.
    pub last_move_tick: u64,
    /// Whether the agent has neither moved nor fired recently.
    pub idle: bool,
    /// Whether the agent is a zombie rather than a robot.
    pub is_zombie: bool,
    /// Whether the agent's gun has reloaded.
    pub ammo_ready: bool,
}

/// Read-only roster of tracked agents ordered by identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentView {
    agents: Vec<Agent>,
}

impl AgentView {
    /// Creates a view from the provided agents, sorting them by identifier.
    #[must_use]
    pub fn from_agents(mut agents: Vec<Agent>) -> Self {
        agents.sort_by_key(|agent| agent.id);
        Self { agents }
    }

    /// Iterates over the agents in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Number of agents in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Reports whether the view holds no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent standing on `cell`, if any.
    #[must_use]
    pub fn at(&self, cell: Cell) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.cell == cell)
    }

    /// Consumes the view, returning the agents in identifier order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Agent> {
        self.agents
    }
}

/// Level counters attached to multi-level games.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    /// Number of levels in the game.
    pub total: u32,
    /// Level currently being played.
    pub current: u32,
    /// Most recently passed level, negative when none.
    pub last_passed: i32,
}

/// Raw board record delivered by the game server each tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Offset of the visible window inside the full map.
    #[serde(default)]
    pub offset: Cell,
    /// Position of the controlled robot inside the full map.
    #[serde(default)]
    pub hero_position: Cell,
    /// Whether the level has already been completed.
    #[serde(default)]
    pub level_finished: bool,
    /// Terrain, ground-unit and air-unit layer strings.
    pub layers: Vec<String>,
    /// Level counters, when the server reports them.
    #[serde(default)]
    pub level_progress: Option<LevelProgress>,
    /// Whether player names are rendered.
    #[serde(default)]
    pub show_name: Option<bool>,
}

impl Snapshot {
    /// Builds a snapshot from bare layer strings with default metadata.
    #[must_use]
    pub fn from_layers<S: Into<String>>(layers: [S; 3]) -> Self {
        Self {
            layers: layers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentId, Cell, Command, Direction, Layer, Snapshot};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Cell::new(1, 1);
        let destination = Cell::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
        assert_eq!(origin.distance_squared(destination), 13);
    }

    #[test]
    fn stepping_follows_direction_vectors() {
        let origin = Cell::new(2, 2);
        assert_eq!(origin.step(Direction::Up), Cell::new(2, 3));
        assert_eq!(origin.step(Direction::LeftJump), Cell::new(0, 2));
        assert_eq!(origin.ray(Direction::Right, 3), Cell::new(5, 2));
        assert_eq!(origin.step(Direction::Stop), origin);
        assert!(origin.neighbours().iter().all(|cell| cell.is_adjacent(origin)));
    }

    #[test]
    fn commands_render_wire_tokens() {
        assert_eq!(Command::Go(Direction::Up).to_string(), "UP");
        assert_eq!(Command::from(Direction::LeftJump).to_string(), "ACT(1),LEFT");
        assert_eq!(Command::Fire(Direction::Right).to_string(), "ACT(3),RIGHT");
        assert_eq!(Command::Pull(Direction::Up).to_string(), "ACT(2),UP");
        assert_eq!(Command::from(Direction::Jump).to_string(), "ACT(1)");
        assert_eq!(Command::Die.to_string(), "ACT(0)");
        assert_eq!(Command::Stop.to_string(), "");
    }

    #[test]
    fn snapshot_deserializes_camel_case_record() {
        let json = r#"{
            "offset": {"x": 0, "y": 0},
            "heroPosition": {"x": 2, "y": 1},
            "levelFinished": false,
            "layers": ["....", "-☺--", "----"],
            "levelProgress": {"total": 5, "current": 2, "lastPassed": 1}
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).expect("valid snapshot");
        assert_eq!(snapshot.hero_position, Cell::new(2, 1));
        assert_eq!(snapshot.layers.len(), Layer::ALL.len());
        assert_eq!(snapshot.level_progress.map(|progress| progress.current), Some(2));
        assert_eq!(snapshot.show_name, None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_round_trips_through_bincode() {
        assert_round_trip(&Cell::new(-3, 17));
    }

    #[test]
    fn agent_id_round_trips_through_bincode() {
        assert_round_trip(&AgentId::new(42));
    }

    #[test]
    fn command_round_trips_through_bincode() {
        assert_round_trip(&Command::Jump(Direction::Down));
    }
}
