#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick board model for lasergrid.
//!
//! A [`GridModel`] is parsed from the three layer strings of a [`Snapshot`]
//! and answers typed queries about terrain, units and beams. The model is
//! immutable once built; a fresh one is constructed for every snapshot. The
//! [`HazardField`] projects beams forward in time on top of it and the
//! [`DistanceField`] provides breadth-first step counts.

mod hazard;
mod navigation;

use std::{cell::OnceCell, fmt};

use lasergrid_core::{Category, Cell, Direction, Element, Layer, RobotState, Snapshot};
use thiserror::Error;

pub use hazard::HazardField;
pub use navigation::DistanceField;

/// Errors raised while parsing snapshot layers.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The snapshot did not carry exactly three layers.
    #[error("expected 3 layers, found {found}")]
    LayerCount {
        /// Number of layers received.
        found: usize,
    },
    /// A layer disagreed in length with the terrain layer.
    #[error("layer {layer} holds {found} glyphs, expected {expected}")]
    LayerLength {
        /// Index of the offending layer.
        layer: usize,
        /// Glyph count of the terrain layer.
        expected: usize,
        /// Glyph count of the offending layer.
        found: usize,
    },
    /// The layer length has no integer square root.
    #[error("layer length {length} is not a perfect square")]
    NotSquare {
        /// Glyph count of the layers.
        length: usize,
    },
    /// The layers were empty.
    #[error("board is empty")]
    Empty,
    /// A glyph outside the element table was encountered.
    #[error("unknown glyph {glyph:?} in layer {layer} at ({x}, {y})")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Index of the layer holding the glyph.
        layer: usize,
        /// Column of the glyph.
        x: i32,
        /// Row of the glyph.
        y: i32,
    },
}

/// Element found on the board together with its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Located {
    /// Cell holding the element.
    pub cell: Cell,
    /// Element found at the cell.
    pub element: Element,
    /// Inherent facing of the element, if it has one.
    pub facing: Option<Direction>,
}

/// Active laser segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Beam {
    /// Cell currently lit by the beam.
    pub cell: Cell,
    /// Direction the beam travels.
    pub facing: Direction,
}

/// Laser emitter on the terrain layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Emitter {
    /// Cell holding the emitter.
    pub cell: Cell,
    /// Direction the emitter fires.
    pub facing: Direction,
    /// Whether the emitter fires on the next tick.
    pub ready: bool,
}

/// Robot glyph found on one of the unit layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Robot {
    /// Cell holding the robot.
    pub cell: Cell,
    /// Lifecycle stage shown by the glyph.
    pub state: RobotState,
}

impl Robot {
    /// Reports whether the robot is mid jump.
    #[must_use]
    pub fn airborne(&self) -> bool {
        self.state == RobotState::Flying
    }
}

/// Parsed three-layer board.
#[derive(Debug)]
pub struct GridModel {
    size: i32,
    layers: [Vec<Element>; 3],
    raw: [String; 3],
    offset: Cell,
    hero_position: Cell,
    level_finished: bool,
    walls: OnceCell<Vec<Cell>>,
    boxes: OnceCell<Vec<Cell>>,
    gold: OnceCell<Vec<Cell>>,
}

impl GridModel {
    /// Parses the layers and metadata of a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, ParseError> {
        let [terrain, ground, air] = snapshot.layers.as_slice() else {
            return Err(ParseError::LayerCount {
                found: snapshot.layers.len(),
            });
        };
        let mut model = Self::from_layers([terrain.as_str(), ground.as_str(), air.as_str()])?;
        model.offset = snapshot.offset;
        model.hero_position = snapshot.hero_position;
        model.level_finished = snapshot.level_finished;
        Ok(model)
    }

    /// Parses three bare layer strings.
    pub fn from_layers(layers: [&str; 3]) -> Result<Self, ParseError> {
        let length = layers[0].chars().count();
        if length == 0 {
            return Err(ParseError::Empty);
        }
        for (layer, text) in layers.iter().enumerate().skip(1) {
            let found = text.chars().count();
            if found != length {
                return Err(ParseError::LayerLength {
                    layer,
                    expected: length,
                    found,
                });
            }
        }

        let size = integer_sqrt(length).ok_or(ParseError::NotSquare { length })?;
        let side = i32::try_from(size).map_err(|_| ParseError::NotSquare { length })?;

        let mut parsed: [Vec<Element>; 3] = Default::default();
        for (layer, text) in layers.iter().enumerate() {
            let mut elements = Vec::with_capacity(length);
            for (index, glyph) in text.chars().enumerate() {
                let Some(element) = Element::from_glyph(glyph) else {
                    let (x, y) = position_of(index, size);
                    return Err(ParseError::UnknownGlyph { glyph, layer, x, y });
                };
                elements.push(element);
            }
            parsed[layer] = elements;
        }

        Ok(Self {
            size: side,
            layers: parsed,
            raw: layers.map(str::to_owned),
            offset: Cell::default(),
            hero_position: Cell::default(),
            level_finished: false,
            walls: OnceCell::new(),
            boxes: OnceCell::new(),
            gold: OnceCell::new(),
        })
    }

    /// Side length of the square board.
    #[must_use]
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Offset of the visible window inside the full map.
    #[must_use]
    pub fn offset(&self) -> Cell {
        self.offset
    }

    /// Hero position reported by the server in full-map coordinates.
    #[must_use]
    pub fn hero_position(&self) -> Cell {
        self.hero_position
    }

    /// Whether the level has been completed.
    #[must_use]
    pub fn level_finished(&self) -> bool {
        self.level_finished
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.size).contains(&cell.x()) && (0..self.size).contains(&cell.y())
    }

    /// Dense index of the cell, see [`cell_index`].
    #[must_use]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        cell_index(self.size, cell)
    }

    /// Cells of the board in row-major layer order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let side = self.size;
        (0..side).rev().flat_map(move |y| (0..side).map(move |x| Cell::new(x, y)))
    }

    /// Element on `layer` at `cell`, `None` off the board.
    #[must_use]
    pub fn element_at(&self, layer: Layer, cell: Cell) -> Option<Element> {
        let index = self.index_of(cell)?;
        self.layers[layer.index()].get(index).copied()
    }

    /// Element on `layer` at `cell`, or `default` off the board.
    #[must_use]
    pub fn element_or(&self, layer: Layer, cell: Cell, default: Element) -> Element {
        self.element_at(layer, cell).unwrap_or(default)
    }

    /// Reports whether `cell` on `layer` holds any of `elements`.
    #[must_use]
    pub fn is_any_at(&self, layer: Layer, cell: Cell, elements: &[Element]) -> bool {
        self.element_at(layer, cell)
            .is_some_and(|element| elements.contains(&element))
    }

    /// Category of the terrain at `cell`, treating off-board cells as walls.
    #[must_use]
    pub fn terrain_category(&self, cell: Cell) -> Category {
        self.element_or(Layer::Terrain, cell, Element::Space)
            .category()
    }

    /// Reports whether any orthogonal neighbour of `cell` holds one of `elements`.
    #[must_use]
    pub fn is_near(&self, layer: Layer, cell: Cell, elements: &[Element]) -> bool {
        self.count_near(layer, cell, elements) > 0
    }

    /// Counts orthogonal neighbours of `cell` holding one of `elements`.
    #[must_use]
    pub fn count_near(&self, layer: Layer, cell: Cell, elements: &[Element]) -> usize {
        if !self.contains(cell) {
            return 0;
        }
        cell.neighbours()
            .into_iter()
            .filter(|&neighbour| self.is_any_at(layer, neighbour, elements))
            .count()
    }

    /// Every occurrence of `elements` on `layer` in row-major order.
    #[must_use]
    pub fn find(&self, layer: Layer, elements: &[Element]) -> Vec<Located> {
        let elements_on_layer = &self.layers[layer.index()];
        self.cells()
            .zip(elements_on_layer.iter().copied())
            .filter(|(_, element)| elements.contains(element))
            .map(|(cell, element)| Located {
                cell,
                element,
                facing: element.facing(),
            })
            .collect()
    }

    fn find_category(&self, layer: Layer, category: Category) -> Vec<Cell> {
        self.cells()
            .zip(self.layers[layer.index()].iter())
            .filter(|(_, element)| element.category() == category)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Terrain wall cells.
    #[must_use]
    pub fn walls(&self) -> &[Cell] {
        self.walls
            .get_or_init(|| self.find_category(Layer::Terrain, Category::Wall))
    }

    /// Cells holding gold.
    #[must_use]
    pub fn gold(&self) -> &[Cell] {
        self.gold
            .get_or_init(|| self.find_category(Layer::Terrain, Category::Gold))
    }

    /// Cells holding boxes on any layer.
    #[must_use]
    pub fn boxes(&self) -> &[Cell] {
        self.boxes.get_or_init(|| {
            let mut boxes = self.find_category(Layer::Terrain, Category::Box);
            boxes.extend(self.find_category(Layer::GroundUnits, Category::Box));
            boxes
        })
    }

    /// Level exits.
    #[must_use]
    pub fn exits(&self) -> Vec<Cell> {
        self.find_category(Layer::Terrain, Category::Exit)
    }

    /// Robot start cells.
    #[must_use]
    pub fn starts(&self) -> Vec<Cell> {
        self.find_category(Layer::Terrain, Category::Start)
    }

    /// Holes.
    #[must_use]
    pub fn holes(&self) -> Vec<Cell> {
        self.find_category(Layer::Terrain, Category::Hole)
    }

    /// Zombie spawn points.
    #[must_use]
    pub fn zombie_starts(&self) -> Vec<Cell> {
        self.find_category(Layer::Terrain, Category::ZombieStart)
    }

    /// Zombies that are not dying.
    #[must_use]
    pub fn zombies(&self) -> Vec<Cell> {
        self.find(
            Layer::GroundUnits,
            &[Element::FemaleZombie, Element::MaleZombie],
        )
        .into_iter()
        .map(|located| located.cell)
        .collect()
    }

    /// Perks still on the board.
    #[must_use]
    pub fn perks(&self) -> Vec<Located> {
        self.find(
            Layer::Terrain,
            &[
                Element::UnstoppableLaserPerk,
                Element::DeathRayPerk,
                Element::UnlimitedFirePerk,
            ],
        )
    }

    /// Active beams on the ground layer.
    #[must_use]
    pub fn beams(&self) -> Vec<Beam> {
        self.find(
            Layer::GroundUnits,
            &[
                Element::LaserLeft,
                Element::LaserRight,
                Element::LaserUp,
                Element::LaserDown,
            ],
        )
        .into_iter()
        .filter_map(|located| {
            located.facing.map(|facing| Beam {
                cell: located.cell,
                facing,
            })
        })
        .collect()
    }

    /// Beam lighting `cell` on the current tick.
    #[must_use]
    pub fn beam_at(&self, cell: Cell) -> Option<Direction> {
        self.element_at(Layer::GroundUnits, cell)
            .filter(|element| element.category() == Category::Laser)
            .and_then(Element::facing)
    }

    /// Charging and ready laser emitters.
    #[must_use]
    pub fn laser_machines(&self) -> Vec<Emitter> {
        self.cells()
            .zip(self.layers[Layer::Terrain.index()].iter().copied())
            .filter_map(|(cell, element)| {
                let ready = match element.category() {
                    Category::LaserMachine => false,
                    Category::LaserMachineReady => true,
                    _ => return None,
                };
                let facing = element.facing()?;
                Some(Emitter {
                    cell,
                    facing,
                    ready,
                })
            })
            .collect()
    }

    /// Terrain cells that have not been revealed yet.
    #[must_use]
    pub fn unexplored(&self) -> Vec<Cell> {
        self.find(Layer::Terrain, &[Element::Empty])
            .into_iter()
            .map(|located| located.cell)
            .collect()
    }

    /// The controlled robot, searched on the ground layer then the air layer.
    #[must_use]
    pub fn hero(&self) -> Option<Robot> {
        self.robots(Category::Robot).into_iter().next()
    }

    /// Every other player's robot, grounded ones first.
    #[must_use]
    pub fn opponents(&self) -> Vec<Robot> {
        self.robots(Category::OtherRobot)
    }

    fn robots(&self, category: Category) -> Vec<Robot> {
        [Layer::GroundUnits, Layer::AirUnits]
            .into_iter()
            .flat_map(|layer| {
                self.cells()
                    .zip(self.layers[layer.index()].iter().copied())
                    .filter(|(_, element)| element.category() == category)
                    .filter_map(|(cell, element)| {
                        element.robot_state().map(|state| Robot { cell, state })
                    })
            })
            .collect()
    }

    /// Reports whether a straight ray connects `from` and `to`.
    ///
    /// The cells strictly between the endpoints must be on the board and free
    /// of walls, emitters and boxes. Cells that do not share a row or column
    /// never have a clear path.
    #[must_use]
    pub fn has_clear_path(&self, from: Cell, to: Cell) -> bool {
        if from.x() != to.x() && from.y() != to.y() {
            return false;
        }
        let Some(direction) = Direction::between(from, to) else {
            return true;
        };
        let mut cursor = from.step(direction);
        while cursor != to {
            if !self.contains(cursor) || self.blocks_ray(cursor) {
                return false;
            }
            cursor = cursor.step(direction);
        }
        true
    }

    /// Reports whether a beam travelling through `cell` would stop there.
    #[must_use]
    pub fn blocks_ray(&self, cell: Cell) -> bool {
        let terrain = self.element_or(Layer::Terrain, cell, Element::Space);
        terrain.is_wall()
            || terrain.is_emitter()
            || terrain == Element::Box
            || self.element_at(Layer::GroundUnits, cell) == Some(Element::Box)
    }

    /// Categories stacked on `cell` across all layers, `Floor` when empty.
    #[must_use]
    pub fn categories_at(&self, cell: Cell) -> Vec<Category> {
        let mut stack: Vec<Category> = Layer::ALL
            .iter()
            .filter_map(|&layer| self.element_at(layer, cell))
            .map(Element::category)
            .filter(|&category| category != Category::Floor)
            .collect();
        if stack.is_empty() {
            stack.push(Category::Floor);
        }
        stack
    }

    /// Raw layer string as received.
    #[must_use]
    pub fn layer_string(&self, layer: Layer) -> &str {
        &self.raw[layer.index()]
    }

    fn legend_line(
        f: &mut fmt::Formatter<'_>,
        label: &str,
        cells: impl IntoIterator<Item = Cell>,
    ) -> fmt::Result {
        write!(f, "{label}:")?;
        for cell in cells {
            write!(f, " {cell}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for GridModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<char>> = self
            .raw
            .iter()
            .map(|layer| layer.chars().collect())
            .collect();
        let side = usize::try_from(self.size).map_err(|_| fmt::Error)?;
        writeln!(f, "Board:")?;
        for row in 0..side {
            let span = row * side..(row + 1) * side;
            for (position, layer) in rows.iter().enumerate() {
                if position > 0 {
                    f.write_str("  ")?;
                }
                for glyph in layer.get(span.clone()).unwrap_or_default() {
                    write!(f, "{glyph}")?;
                }
            }
            writeln!(f)?;
        }
        Self::legend_line(f, "Robot", self.hero().map(|robot| robot.cell))?;
        Self::legend_line(f, "Others", self.opponents().iter().map(|robot| robot.cell))?;
        Self::legend_line(f, "Gold", self.gold().iter().copied())?;
        Self::legend_line(f, "Exits", self.exits())?;
        Self::legend_line(f, "Boxes", self.boxes().iter().copied())?;
        Self::legend_line(f, "Holes", self.holes())?;
        Self::legend_line(
            f,
            "Laser machines",
            self.laser_machines().iter().map(|emitter| emitter.cell),
        )?;
        Self::legend_line(f, "Lasers", self.beams().iter().map(|beam| beam.cell))?;
        Self::legend_line(f, "Zombies", self.zombies())?;
        Self::legend_line(f, "Perks", self.perks().iter().map(|perk| perk.cell))
    }
}

/// Dense index of `cell` on a `size` x `size` board.
///
/// Layer strings store row `y` at offset `(size - 1 - y) * size`, so the
/// index is `(size - 1 - y) * size + x`. Off-board cells have no index.
#[must_use]
pub fn cell_index(size: i32, cell: Cell) -> Option<usize> {
    if !(0..size).contains(&cell.x()) || !(0..size).contains(&cell.y()) {
        return None;
    }
    let side = usize::try_from(size).ok()?;
    let row = usize::try_from(size - 1 - cell.y()).ok()?;
    let column = usize::try_from(cell.x()).ok()?;
    row.checked_mul(side)?.checked_add(column)
}

fn integer_sqrt(length: usize) -> Option<usize> {
    let mut root = 0usize;
    while root * root < length {
        root += 1;
    }
    (root * root == length).then_some(root)
}

fn position_of(index: usize, size: usize) -> (i32, i32) {
    let column = i32::try_from(index % size).unwrap_or(i32::MAX);
    let row = i32::try_from(size - 1 - index / size).unwrap_or(i32::MAX);
    (column, row)
}
