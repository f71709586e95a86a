use serde::{Deserialize, Serialize};

use crate::Cell;

/// Every move, jump, fire and control action understood by the game server.
///
/// Transformations between variants are closed `match` tables rather than
/// arithmetic so that each mapping can be read off directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// One cell toward increasing `y`.
    Up,
    /// One cell toward decreasing `y`.
    Down,
    /// One cell toward decreasing `x`.
    Left,
    /// One cell toward increasing `x`.
    Right,
    /// Jump two cells toward increasing `y`.
    UpJump,
    /// Jump two cells toward decreasing `y`.
    DownJump,
    /// Jump two cells toward decreasing `x`.
    LeftJump,
    /// Jump two cells toward increasing `x`.
    RightJump,
    /// Fire a laser toward increasing `y`.
    FireUp,
    /// Fire a laser toward decreasing `y`.
    FireDown,
    /// Fire a laser toward decreasing `x`.
    FireLeft,
    /// Fire a laser toward increasing `x`.
    FireRight,
    /// Jump in place.
    Jump,
    /// Pull a neighbouring box.
    Pull,
    /// Fire without a direction.
    Fire,
    /// Reset the level, sacrificing the robot.
    Die,
    /// Stay in place.
    Stop,
}

impl Direction {
    /// The four single-cell moves in sweep order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The four jumps in sweep order.
    pub const JUMPS: [Direction; 4] = [
        Direction::UpJump,
        Direction::DownJump,
        Direction::LeftJump,
        Direction::RightJump,
    ];

    /// The four directed fire actions.
    pub const FIRES: [Direction; 4] = [
        Direction::FireUp,
        Direction::FireDown,
        Direction::FireLeft,
        Direction::FireRight,
    ];

    /// Horizontal displacement applied by the move.
    #[must_use]
    pub const fn dx(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
            Self::LeftJump => -2,
            Self::RightJump => 2,
            _ => 0,
        }
    }

    /// Vertical displacement applied by the move.
    #[must_use]
    pub const fn dy(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
            Self::UpJump => 2,
            Self::DownJump => -2,
            _ => 0,
        }
    }

    /// Base path cost of the move.
    #[must_use]
    pub const fn cost(self) -> f32 {
        match self {
            Self::Up | Self::Down | Self::Left | Self::Right => 1.0,
            Self::UpJump | Self::DownJump | Self::LeftJump | Self::RightJump => 2.0,
            Self::Stop => 0.0,
            _ => 1.0,
        }
    }

    /// Wire token understood by the server.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::UpJump => "ACT(1),UP",
            Self::DownJump => "ACT(1),DOWN",
            Self::LeftJump => "ACT(1),LEFT",
            Self::RightJump => "ACT(1),RIGHT",
            Self::FireUp => "ACT(3),UP",
            Self::FireDown => "ACT(3),DOWN",
            Self::FireLeft => "ACT(3),LEFT",
            Self::FireRight => "ACT(3),RIGHT",
            Self::Jump => "ACT(1)",
            Self::Pull => "ACT(2)",
            Self::Fire => "ACT(3)",
            Self::Die => "ACT(0)",
            Self::Stop => "",
        }
    }

    /// Reports whether the variant is one of [`Direction::CARDINALS`].
    #[must_use]
    pub const fn is_cardinal(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }

    /// Reports whether the variant is one of [`Direction::JUMPS`].
    #[must_use]
    pub const fn is_jump(self) -> bool {
        matches!(
            self,
            Self::UpJump | Self::DownJump | Self::LeftJump | Self::RightJump
        )
    }

    /// Reports whether the variant is one of [`Direction::FIRES`].
    #[must_use]
    pub const fn is_fire(self) -> bool {
        matches!(
            self,
            Self::FireUp | Self::FireDown | Self::FireLeft | Self::FireRight
        )
    }

    /// Opposite cardinal; non-cardinals map to [`Direction::Stop`].
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            _ => Self::Stop,
        }
    }

    /// Quarter turn `Up -> Left -> Down -> Right -> Up`.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
            _ => Self::Stop,
        }
    }

    /// Quarter turn `Up -> Right -> Down -> Left -> Up`.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
            _ => Self::Stop,
        }
    }

    /// Reflection across the top-left to bottom-right diagonal.
    #[must_use]
    pub const fn mirror_top_bottom(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Right => Self::Down,
            Self::Down => Self::Right,
            Self::Left => Self::Up,
            _ => Self::Stop,
        }
    }

    /// Reflection across the bottom-left to top-right diagonal.
    #[must_use]
    pub const fn mirror_bottom_top(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Up,
            Self::Down => Self::Left,
            Self::Left => Self::Down,
            _ => Self::Stop,
        }
    }

    /// Cardinal component of a move, jump or fire; other actions map to `Stop`.
    #[must_use]
    pub const fn cardinal(self) -> Self {
        match self {
            Self::Up | Self::UpJump | Self::FireUp => Self::Up,
            Self::Down | Self::DownJump | Self::FireDown => Self::Down,
            Self::Left | Self::LeftJump | Self::FireLeft => Self::Left,
            Self::Right | Self::RightJump | Self::FireRight => Self::Right,
            _ => Self::Stop,
        }
    }

    /// Jump variant of a cardinal; other variants map to the bare `Jump`.
    #[must_use]
    pub const fn to_jump(self) -> Self {
        match self.cardinal() {
            Self::Up => Self::UpJump,
            Self::Down => Self::DownJump,
            Self::Left => Self::LeftJump,
            Self::Right => Self::RightJump,
            _ => Self::Jump,
        }
    }

    /// Fire variant of a cardinal; other variants map to the bare `Fire`.
    #[must_use]
    pub const fn to_fire(self) -> Self {
        match self.cardinal() {
            Self::Up => Self::FireUp,
            Self::Down => Self::FireDown,
            Self::Left => Self::FireLeft,
            Self::Right => Self::FireRight,
            _ => Self::Fire,
        }
    }

    /// Cardinal leading from `from` toward `to`, horizontal axis first.
    ///
    /// Returns `None` when both cells coincide.
    #[must_use]
    pub fn between(from: Cell, to: Cell) -> Option<Self> {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        if dx < 0 {
            Some(Self::Left)
        } else if dx > 0 {
            Some(Self::Right)
        } else if dy < 0 {
            Some(Self::Down)
        } else if dy > 0 {
            Some(Self::Up)
        } else {
            None
        }
    }
}
