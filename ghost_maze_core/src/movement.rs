use std::mem;

use crate::{Direction, PixelPosition, Position, constants::CONTACT_RADIUS};

/// A tunnel mouth: leaving `from` towards `heading` relocates the mover to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teleport {
    pub from: Position,
    pub heading: Direction,
    pub to: Position,
}

/// The two ends of the side tunnel on row 13.
pub const TELEPORTS: [Teleport; 2] = [
    Teleport {
        from: Position::new(1, 13),
        heading: Direction::Left,
        to: Position::new(27, 13),
    },
    Teleport {
        from: Position::new(28, 13),
        heading: Direction::Right,
        to: Position::new(2, 13),
    },
];

/// What happened during one call to [`Mover::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Already at the destination tile; nothing moved.
    Stationary,
    /// Moved part of the way towards the destination tile.
    InTransit,
    /// Reached the destination tile and snapped onto it.
    Arrived,
    /// Went through a tunnel mouth and reappeared on the other side.
    Wrapped,
}

/// Converts continuous per-frame displacement into tile-to-tile steps.
///
/// `current_tile == next_tile` holds exactly when the mover sits on a tile boundary; that is
/// the only moment at which its owner may choose a new destination.
#[derive(Debug, Clone)]
pub struct Mover {
    spawn: PixelPosition,
    position: PixelPosition,
    current_tile: Position,
    next_tile: Position,
    direction: Direction,
    speed: f32,
}

impl Mover {
    pub fn new(spawn: PixelPosition, direction: Direction, speed: f32) -> Self {
        let tile = spawn.tile();
        Mover {
            spawn,
            position: spawn,
            current_tile: tile,
            next_tile: tile,
            direction,
            speed,
        }
    }

    pub fn is_at_destination(&self) -> bool {
        self.current_tile == self.next_tile
    }

    /// Moves towards `next_tile` by at most `speed * elapsed_millis` pixels.
    pub fn advance(&mut self, elapsed_millis: u32) -> Advance {
        if self.is_at_destination() {
            return Advance::Stationary;
        }

        let destination = self.next_tile.to_pixel();
        let remaining = destination - self.position;
        let displacement = self.speed * elapsed_millis as f32;

        if displacement < remaining.length() {
            self.position += remaining.normalized() * displacement;
            return Advance::InTransit;
        }

        let teleport = TELEPORTS.iter().find(|teleport| {
            teleport.from == self.current_tile
                && teleport.from.step(teleport.heading) == self.next_tile
        });

        let outcome = match teleport {
            Some(teleport) => {
                self.position = teleport.to.to_pixel();
                self.next_tile = self.position.tile();
                Advance::Wrapped
            }
            None => {
                self.position = destination;
                Advance::Arrived
            }
        };
        self.current_tile = self.next_tile;
        outcome
    }

    /// Turns around in place: the tile being left becomes the destination again.
    pub fn reverse(&mut self) {
        mem::swap(&mut self.current_tile, &mut self.next_tile);
        self.direction = self.direction.reversed();
    }

    /// Returns to the spawn point, standing still on its tile.
    pub fn reset(&mut self, direction: Direction, speed: f32) {
        self.position = self.spawn;
        self.current_tile = self.position.tile();
        self.next_tile = self.current_tile;
        self.direction = direction;
        self.speed = speed;
    }

    pub fn position(&self) -> PixelPosition {
        self.position
    }

    pub fn current_tile(&self) -> Position {
        self.current_tile
    }

    pub fn next_tile(&self) -> Position {
        self.next_tile
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_next_tile(&mut self, tile: Position) {
        self.next_tile = tile;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

/// Anything that walks the maze on a [`Mover`].
pub trait Agent {
    fn mover(&self) -> &Mover;

    fn position(&self) -> PixelPosition {
        self.mover().position()
    }

    fn current_tile(&self) -> Position {
        self.mover().current_tile()
    }

    fn direction(&self) -> Direction {
        self.mover().direction()
    }

    /// Whether two agents are close enough to collide.
    fn touches(&self, other: &dyn Agent) -> bool {
        self.position().distance(other.position()) < CONTACT_RADIUS
    }
}
