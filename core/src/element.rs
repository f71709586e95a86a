use serde::{Deserialize, Serialize};

use crate::Direction;

/// Coarse grouping used by queries that do not care about the exact glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Walkable ground, explored or not.
    Floor,
    /// Impassable wall segment.
    Wall,
    /// Collectable gold.
    Gold,
    /// Level exit.
    Exit,
    /// Hole that swallows grounded robots.
    Hole,
    /// Pushable box.
    Box,
    /// Cell where zombies spawn.
    ZombieStart,
    /// Robot start cell.
    Start,
    /// The controlled robot.
    Robot,
    /// Any other player's robot.
    OtherRobot,
    /// Live or dying zombie.
    Zombie,
    /// Laser emitter that is still charging.
    LaserMachine,
    /// Laser emitter about to fire.
    LaserMachineReady,
    /// Active laser beam.
    Laser,
    /// Collectable perk.
    Perk,
}

/// Lifecycle stage of a robot as shown by its glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotState {
    /// Standing on the ground.
    Alive,
    /// Falling into a hole.
    Falling,
    /// Mid jump.
    Flying,
    /// Hit by a laser.
    LaserDeath,
}

impl RobotState {
    /// Reports whether the robot is about to be removed from play.
    #[must_use]
    pub const fn is_dying(self) -> bool {
        matches!(self, Self::Falling | Self::LaserDeath)
    }
}

/// Every glyph the server may place on a layer.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Empty,
    Floor,

    AngleInLeft,
    WallFront,
    AngleInRight,
    WallRight,
    AngleBackRight,
    WallBack,
    AngleBackLeft,
    WallLeft,
    WallBackAngleLeft,
    WallBackAngleRight,
    AngleOutRight,
    AngleOutLeft,
    Space,

    LaserMachineChargingLeft,
    LaserMachineChargingRight,
    LaserMachineChargingUp,
    LaserMachineChargingDown,

    LaserMachineReadyLeft,
    LaserMachineReadyRight,
    LaserMachineReadyUp,
    LaserMachineReadyDown,

    Start,
    Exit,
    Hole,
    Box,
    ZombieStart,
    Gold,

    Robot,
    RobotFalling,
    RobotFlying,
    RobotLaser,

    RobotOther,
    RobotOtherFalling,
    RobotOtherFlying,
    RobotOtherLaser,

    LaserLeft,
    LaserRight,
    LaserUp,
    LaserDown,

    FemaleZombie,
    MaleZombie,
    ZombieDie,

    UnstoppableLaserPerk,
    DeathRayPerk,
    UnlimitedFirePerk,
}

impl Element {
    /// The complete catalog in glyph-table order.
    pub const ALL: [Element; 47] = [
        Element::Empty,
        Element::Floor,
        Element::AngleInLeft,
        Element::WallFront,
        Element::AngleInRight,
        Element::WallRight,
        Element::AngleBackRight,
        Element::WallBack,
        Element::AngleBackLeft,
        Element::WallLeft,
        Element::WallBackAngleLeft,
        Element::WallBackAngleRight,
        Element::AngleOutRight,
        Element::AngleOutLeft,
        Element::Space,
        Element::LaserMachineChargingLeft,
        Element::LaserMachineChargingRight,
        Element::LaserMachineChargingUp,
        Element::LaserMachineChargingDown,
        Element::LaserMachineReadyLeft,
        Element::LaserMachineReadyRight,
        Element::LaserMachineReadyUp,
        Element::LaserMachineReadyDown,
        Element::Start,
        Element::Exit,
        Element::Hole,
        Element::Box,
        Element::ZombieStart,
        Element::Gold,
        Element::Robot,
        Element::RobotFalling,
        Element::RobotFlying,
        Element::RobotLaser,
        Element::RobotOther,
        Element::RobotOtherFalling,
        Element::RobotOtherFlying,
        Element::RobotOtherLaser,
        Element::LaserLeft,
        Element::LaserRight,
        Element::LaserUp,
        Element::LaserDown,
        Element::FemaleZombie,
        Element::MaleZombie,
        Element::ZombieDie,
        Element::UnstoppableLaserPerk,
        Element::DeathRayPerk,
        Element::UnlimitedFirePerk,
    ];

    /// Glyph used for the element on the wire.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '-',
            Self::Floor => '.',
            Self::AngleInLeft => '╔',
            Self::WallFront => '═',
            Self::AngleInRight => '┐',
            Self::WallRight => '│',
            Self::AngleBackRight => '┘',
            Self::WallBack => '─',
            Self::AngleBackLeft => '└',
            Self::WallLeft => '║',
            Self::WallBackAngleLeft => '┌',
            Self::WallBackAngleRight => '╗',
            Self::AngleOutRight => '╝',
            Self::AngleOutLeft => '╚',
            Self::Space => ' ',
            Self::LaserMachineChargingLeft => '˂',
            Self::LaserMachineChargingRight => '˃',
            Self::LaserMachineChargingUp => '˄',
            Self::LaserMachineChargingDown => '˅',
            Self::LaserMachineReadyLeft => '◄',
            Self::LaserMachineReadyRight => '►',
            Self::LaserMachineReadyUp => '▲',
            Self::LaserMachineReadyDown => '▼',
            Self::Start => 'S',
            Self::Exit => 'E',
            Self::Hole => 'O',
            Self::Box => 'B',
            Self::ZombieStart => 'Z',
            Self::Gold => '$',
            Self::Robot => '☺',
            Self::RobotFalling => 'o',
            Self::RobotFlying => '*',
            Self::RobotLaser => '☻',
            Self::RobotOther => 'X',
            Self::RobotOtherFalling => 'x',
            Self::RobotOtherFlying => '^',
            Self::RobotOtherLaser => '&',
            Self::LaserLeft => '←',
            Self::LaserRight => '→',
            Self::LaserUp => '↑',
            Self::LaserDown => '↓',
            Self::FemaleZombie => '♀',
            Self::MaleZombie => '♂',
            Self::ZombieDie => '✝',
            Self::UnstoppableLaserPerk => 'l',
            Self::DeathRayPerk => 'r',
            Self::UnlimitedFirePerk => 'f',
        }
    }

    /// Resolves a wire glyph, returning `None` for characters outside the table.
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|element| element.glyph() == glyph)
    }

    /// Category the element belongs to.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Empty | Self::Floor => Category::Floor,
            Self::AngleInLeft
            | Self::WallFront
            | Self::AngleInRight
            | Self::WallRight
            | Self::AngleBackRight
            | Self::WallBack
            | Self::AngleBackLeft
            | Self::WallLeft
            | Self::WallBackAngleLeft
            | Self::WallBackAngleRight
            | Self::AngleOutRight
            | Self::AngleOutLeft
            | Self::Space => Category::Wall,
            Self::LaserMachineChargingLeft
            | Self::LaserMachineChargingRight
            | Self::LaserMachineChargingUp
            | Self::LaserMachineChargingDown => Category::LaserMachine,
            Self::LaserMachineReadyLeft
            | Self::LaserMachineReadyRight
            | Self::LaserMachineReadyUp
            | Self::LaserMachineReadyDown => Category::LaserMachineReady,
            Self::Start => Category::Start,
            Self::Exit => Category::Exit,
            Self::Hole => Category::Hole,
            Self::Box => Category::Box,
            Self::ZombieStart => Category::ZombieStart,
            Self::Gold => Category::Gold,
            Self::Robot | Self::RobotFalling | Self::RobotFlying | Self::RobotLaser => {
                Category::Robot
            }
            Self::RobotOther
            | Self::RobotOtherFalling
            | Self::RobotOtherFlying
            | Self::RobotOtherLaser => Category::OtherRobot,
            Self::LaserLeft | Self::LaserRight | Self::LaserUp | Self::LaserDown => {
                Category::Laser
            }
            Self::FemaleZombie | Self::MaleZombie | Self::ZombieDie => Category::Zombie,
            Self::UnstoppableLaserPerk | Self::DeathRayPerk | Self::UnlimitedFirePerk => {
                Category::Perk
            }
        }
    }

    /// Inherent facing of emitters and beams.
    #[must_use]
    pub const fn facing(self) -> Option<Direction> {
        match self {
            Self::LaserMachineChargingLeft | Self::LaserMachineReadyLeft | Self::LaserLeft => {
                Some(Direction::Left)
            }
            Self::LaserMachineChargingRight | Self::LaserMachineReadyRight | Self::LaserRight => {
                Some(Direction::Right)
            }
            Self::LaserMachineChargingUp | Self::LaserMachineReadyUp | Self::LaserUp => {
                Some(Direction::Up)
            }
            Self::LaserMachineChargingDown | Self::LaserMachineReadyDown | Self::LaserDown => {
                Some(Direction::Down)
            }
            _ => None,
        }
    }

    /// Robot lifecycle stage for self and opponent glyphs.
    #[must_use]
    pub const fn robot_state(self) -> Option<RobotState> {
        match self {
            Self::Robot | Self::RobotOther => Some(RobotState::Alive),
            Self::RobotFalling | Self::RobotOtherFalling => Some(RobotState::Falling),
            Self::RobotFlying | Self::RobotOtherFlying => Some(RobotState::Flying),
            Self::RobotLaser | Self::RobotOtherLaser => Some(RobotState::LaserDeath),
            _ => None,
        }
    }

    /// Beam glyph travelling in the provided cardinal direction.
    #[must_use]
    pub const fn beam(facing: Direction) -> Option<Self> {
        match facing {
            Direction::Left => Some(Self::LaserLeft),
            Direction::Right => Some(Self::LaserRight),
            Direction::Up => Some(Self::LaserUp),
            Direction::Down => Some(Self::LaserDown),
            _ => None,
        }
    }

    /// Reports whether the element is a wall segment.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self.category(), Category::Wall)
    }

    /// Reports whether the element is a charging or ready laser emitter.
    #[must_use]
    pub const fn is_emitter(self) -> bool {
        matches!(
            self.category(),
            Category::LaserMachine | Category::LaserMachineReady
        )
    }

    /// Reports whether the element is a zombie that is still dangerous.
    #[must_use]
    pub const fn is_live_zombie(self) -> bool {
        matches!(self, Self::FemaleZombie | Self::MaleZombie)
    }
}
