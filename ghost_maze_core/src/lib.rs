use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

pub mod avatar;
pub mod constants;
pub mod coordinator;
pub mod game;
pub mod ghost;
pub mod map;
pub mod movement;
pub mod timer;
pub mod world;

use constants::TILE_SIZE;

/// Represents a tile coordinate on the maze grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Returns manhattan distance between two positions
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the tile one step away in `direction`.
    ///
    /// This is pure coordinate arithmetic: stepping off the top or left edge wraps around
    /// `usize`, and the resulting coordinate is simply rejected by later validity checks.
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position {
            x: self.x.wrapping_add_signed(dx),
            y: self.y.wrapping_add_signed(dy),
        }
    }

    /// The pixel anchor of this tile.
    pub fn to_pixel(self) -> PixelPosition {
        PixelPosition::new(self.x as f32 * TILE_SIZE, self.y as f32 * TILE_SIZE)
    }
}

/// One of the four unit movement vectors, or standing still.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    Zero,
}

impl Direction {
    /// Neighbour enumeration order used by path search.
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Right,
        Direction::Left,
    ];

    /// The `(dx, dy)` components, with y growing downwards.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Zero => (0, 0),
        }
    }

    /// Converts a unit (or zero) vector back into a direction.
    pub fn from_delta(dx: isize, dy: isize) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            (0, 0) => Some(Direction::Zero),
            _ => None,
        }
    }

    /// The direction from `from` to an adjacent tile `to`.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        let dx = to.x as isize - from.x as isize;
        let dy = to.y as isize - from.y as isize;
        Self::from_delta(dx, dy)
    }

    pub fn reversed(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Zero => Direction::Zero,
        }
    }

    /// The two perpendicular directions: first the components swapped, then swapped and
    /// negated.
    pub fn laterals(self) -> [Direction; 2] {
        match self {
            Direction::Up => [Direction::Left, Direction::Right],
            Direction::Down => [Direction::Right, Direction::Left],
            Direction::Left => [Direction::Up, Direction::Down],
            Direction::Right => [Direction::Down, Direction::Up],
            Direction::Zero => [Direction::Zero, Direction::Zero],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
            Direction::Zero => "Zero",
        }
    }
}

/// A continuous position in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: f32,
    pub y: f32,
}

impl PixelPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        PixelPosition { x, y }
    }

    /// Converts a position given in (possibly fractional) tile units.
    pub fn from_tile_units(x: f32, y: f32) -> Self {
        PixelPosition::new(x * TILE_SIZE, y * TILE_SIZE)
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: PixelPosition) -> f32 {
        (self - other).length()
    }

    /// Returns the unit vector pointing the same way, or the zero vector unchanged.
    pub fn normalized(self) -> PixelPosition {
        let length = self.length();
        if length > 0.0 {
            PixelPosition::new(self.x / length, self.y / length)
        } else {
            self
        }
    }

    /// The tile containing this position (coordinates are truncated).
    pub fn tile(self) -> Position {
        Position::new(
            (self.x / TILE_SIZE).max(0.0) as usize,
            (self.y / TILE_SIZE).max(0.0) as usize,
        )
    }

    /// The tile whose anchor is closest to this position.
    pub fn nearest_tile(self) -> Position {
        Position::new(
            (self.x / TILE_SIZE).round().max(0.0) as usize,
            (self.y / TILE_SIZE).round().max(0.0) as usize,
        )
    }
}

impl Add for PixelPosition {
    type Output = PixelPosition;

    fn add(self, other: PixelPosition) -> PixelPosition {
        PixelPosition::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for PixelPosition {
    fn add_assign(&mut self, other: PixelPosition) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for PixelPosition {
    type Output = PixelPosition;

    fn sub(self, other: PixelPosition) -> PixelPosition {
        PixelPosition::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for PixelPosition {
    type Output = PixelPosition;

    fn mul(self, scale: f32) -> PixelPosition {
        PixelPosition::new(self.x * scale, self.y * scale)
    }
}
