use crate::{
    Direction, PixelPosition, Position,
    constants::{AVATAR_SPAWN, AVATAR_SPEED, MOUTH_MILLIS},
    movement::{Agent, Mover},
    timer::Timer,
    world::{BlockType, World},
};

/// Asset identifier for the avatar.
pub fn avatar_sprite(direction: Direction, mouth_open: bool) -> String {
    if !mouth_open || direction == Direction::Zero {
        "Avatar/Closed.png".to_string()
    } else {
        format!("Avatar/Open-{}.png", direction.name())
    }
}

/// The player-steered agent.
#[derive(Debug, Clone)]
pub struct Avatar {
    mover: Mover,
    mouth_timer: Timer,
    mouth_open: bool,
    captures_in_row: u32,
}

impl Avatar {
    pub fn new() -> Self {
        let (x, y) = AVATAR_SPAWN;
        Self::with_spawn(PixelPosition::from_tile_units(x, y))
    }

    pub fn with_spawn(spawn: PixelPosition) -> Self {
        Avatar {
            mover: Mover::new(spawn, Direction::Left, AVATAR_SPEED),
            mouth_timer: Timer::new(MOUTH_MILLIS, true),
            mouth_open: false,
            captures_in_row: 0,
        }
    }

    /// Moves the avatar and keeps it going in its direction until a wall stops it.
    pub fn update(&mut self, elapsed_millis: u32, world: &World) {
        if self.mover.direction() == Direction::Zero {
            self.mouth_timer.pause();
        } else {
            self.mover.advance(elapsed_millis);
            self.mouth_timer.resume();
        }

        if self.mover.is_at_destination() {
            let ahead = World::tile_in_direction(self.mover.current_tile(), self.mover.direction());
            if world.tile_validity(ahead, BlockType::NoBlock) {
                self.mover.set_next_tile(ahead);
            } else {
                self.mover.set_direction(Direction::Zero);
            }
        }

        if self.mouth_timer.update(elapsed_millis) {
            self.mouth_open = !self.mouth_open;
        }
    }

    /// Requests a new heading. Returns `false` if the request was ignored.
    ///
    /// The turn is checked from the tile the avatar is heading for, so a request made between
    /// two tiles takes effect once the avatar gets there.
    pub fn set_direction(&mut self, direction: Direction, world: &World) -> bool {
        if direction == self.mover.direction() {
            return false;
        }

        let ahead = World::tile_in_direction(self.mover.next_tile(), direction);
        if !world.tile_validity(ahead, BlockType::NoBlock) {
            return false;
        }

        self.mover.set_direction(direction);
        true
    }

    pub fn reset(&mut self) {
        self.mover.reset(Direction::Left, AVATAR_SPEED);
        self.mouth_open = false;
        self.mouth_timer.reset();
    }

    /// Counts a ghost capture and returns how many came before it since the last pellet.
    pub fn register_capture(&mut self) -> u32 {
        let previous = self.captures_in_row;
        self.captures_in_row += 1;
        previous
    }

    pub fn reset_captures(&mut self) {
        self.captures_in_row = 0;
    }

    pub fn captures_in_row(&self) -> u32 {
        self.captures_in_row
    }

    pub fn mouth_open(&self) -> bool {
        self.mouth_open
    }

    pub fn next_tile(&self) -> Position {
        self.mover.next_tile()
    }

    pub fn sprite(&self) -> String {
        avatar_sprite(self.mover.direction(), self.mouth_open)
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for Avatar {
    fn mover(&self) -> &Mover {
        &self.mover
    }
}
