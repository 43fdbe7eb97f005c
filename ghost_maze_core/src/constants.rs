//! Gameplay tuning shared across the simulation.

/// Edge length of a square tile in pixels.
pub const TILE_SIZE: f32 = 22.0;

/// Pixels per millisecond.
pub const AVATAR_SPEED: f32 = 0.25;
pub const GHOST_SPEED: f32 = 0.15;
/// Applied to a ghost's speed while it is dead and heading home.
pub const DEAD_GHOST_SPEED_MULTIPLIER: f32 = 3.0;

pub const VULNERABLE_MILLIS: u32 = 8_000;
pub const INVERT_MILLIS: u32 = 5_000;
pub const WOBBLE_MILLIS: u32 = 150;
pub const MOUTH_MILLIS: u32 = 80;
pub const PELLET_BLINK_MILLIS: u32 = 100;

pub const STARTING_LIVES: u8 = 3;

pub const DOT_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
/// Doubled for each further ghost caught on the same power pellet.
pub const GHOST_CAPTURE_BASE_SCORE: u32 = 200;

/// Pixel distance under which the avatar and a ghost touch.
pub const CONTACT_RADIUS: f32 = 10.0;
/// Pixel distance under which the avatar picks up an item.
pub const PICKUP_RADIUS: f32 = 5.0;

/// Avatar spawn point in tile units.
pub const AVATAR_SPAWN: (f32, f32) = (14.5, 22.0);
