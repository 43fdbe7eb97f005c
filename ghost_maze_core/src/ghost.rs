use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    Direction, PixelPosition, Position,
    constants::{DEAD_GHOST_SPEED_MULTIPLIER, GHOST_SPEED},
    coordinator::GhostCoordinator,
    movement::{Advance, Agent, Mover},
    world::{BlockType, World},
};

/// The four ghosts. Only the red one has its own set of exit destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostColor {
    Red,
    Cyan,
    Pink,
    Orange,
}

impl GhostColor {
    /// Fixed update order.
    pub const ALL: [GhostColor; 4] = [
        GhostColor::Red,
        GhostColor::Cyan,
        GhostColor::Pink,
        GhostColor::Orange,
    ];

    pub fn initial_direction(self) -> Direction {
        match self {
            GhostColor::Red => Direction::Left,
            GhostColor::Cyan => Direction::Up,
            GhostColor::Pink => Direction::Down,
            GhostColor::Orange => Direction::Up,
        }
    }

    pub fn spawn(self) -> PixelPosition {
        match self {
            GhostColor::Red => PixelPosition::from_tile_units(14.5, 10.0),
            GhostColor::Cyan => PixelPosition::from_tile_units(13.0, 13.0),
            GhostColor::Pink => PixelPosition::from_tile_units(14.5, 13.0),
            GhostColor::Orange => PixelPosition::from_tile_units(16.0, 13.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GhostColor::Red => "Red",
            GhostColor::Cyan => "Cyan",
            GhostColor::Pink => "Pink",
            GhostColor::Orange => "Orange",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostState {
    /// Touching the avatar costs the player a life.
    #[default]
    Healthy,
    /// Touching the avatar kills the ghost.
    Vulnerable,
    /// Heading back to the home tile, ignoring everything else on the way.
    Dead,
}

/// Asset identifier for a ghost in the given situation.
pub fn ghost_sprite(
    color: GhostColor,
    state: GhostState,
    direction: Direction,
    wobble: bool,
) -> String {
    let frame = if wobble { 0 } else { 1 };
    match state {
        GhostState::Dead => "Ghosts/Dead.png".to_string(),
        GhostState::Vulnerable => format!("Ghosts/Vulnerable/Wobble_{frame}.png"),
        GhostState::Healthy => {
            let facing = match direction {
                Direction::Up | Direction::Down | Direction::Left => direction.name(),
                _ => "Right",
            };
            format!("Ghosts/{}/{}_Wobble_{frame}.png", color.name(), facing)
        }
    }
}

/// A single ghost: path follower with a random walk as fallback.
#[derive(Debug, Clone)]
pub struct Ghost {
    color: GhostColor,
    state: GhostState,
    mover: Mover,
    path: VecDeque<Position>,
    must_exit_base: bool,
}

impl Ghost {
    pub fn new(color: GhostColor) -> Self {
        Self::with_spawn(color, color.spawn())
    }

    /// A ghost of `color` that starts (and resets) at `spawn` instead of its usual spot.
    pub fn with_spawn(color: GhostColor, spawn: PixelPosition) -> Self {
        Ghost {
            color,
            state: GhostState::Healthy,
            mover: Mover::new(spawn, color.initial_direction(), GHOST_SPEED),
            path: VecDeque::new(),
            must_exit_base: true,
        }
    }

    /// Runs one frame of the ghost's behaviour.
    ///
    /// New destinations are only chosen when the ghost stands exactly on a tile. The
    /// coordinator must already have been pre-updated for this frame.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        elapsed_millis: u32,
        coordinator: &GhostCoordinator,
        world: &World,
        rng: &mut R,
    ) {
        if self.state == GhostState::Vulnerable && !coordinator.is_vulnerable() {
            debug!(color = self.color.name(), "ghost recovered");
            self.state = GhostState::Healthy;
        }

        if coordinator.invert_pending() && self.path.is_empty() && self.state != GhostState::Dead
        {
            self.mover.reverse();
        }

        if self.mover.is_at_destination() {
            self.choose_next_tile(world, rng);
        }

        if self.mover.advance(elapsed_millis) == Advance::Wrapped {
            // A route planned across the tunnel mouth no longer starts next to the ghost.
            if let Some(&destination) = self.path.back() {
                self.set_path(world, destination);
            }
        }
    }

    fn choose_next_tile<R: Rng + ?Sized>(&mut self, world: &World, rng: &mut R) {
        let current = self.mover.current_tile();

        if let Some(next) = self.path.pop_front() {
            self.mover.set_next_tile(next);
            if let Some(direction) = Direction::between(current, next) {
                self.mover.set_direction(direction);
            }
        } else if self.state == GhostState::Dead && current == world.home_tile() {
            self.revive(world, rng);
        } else if self.must_exit_base {
            self.must_exit_base = false;
            self.set_exit_path(world, rng);
        } else {
            let direction = self.random_direction(self.mover.direction(), world, rng);
            self.mover.set_direction(direction);
            self.mover
                .set_next_tile(World::tile_in_direction(current, direction));
        }
    }

    /// Sends the ghost home. Has no effect on a ghost that is already dead.
    pub fn die(&mut self, world: &World) {
        if self.state == GhostState::Dead {
            return;
        }

        self.state = GhostState::Dead;
        self.set_path(world, world.home_tile());
        self.mover
            .set_speed(self.mover.speed() * DEAD_GHOST_SPEED_MULTIPLIER);
        debug!(color = self.color.name(), "ghost died");
    }

    /// Brings a dead ghost back to life and routes it out of the base.
    pub fn revive<R: Rng + ?Sized>(&mut self, world: &World, rng: &mut R) {
        self.mover.set_speed(GHOST_SPEED);
        self.set_exit_path(world, rng);
        self.state = GhostState::Healthy;
        debug!(color = self.color.name(), "ghost revived");
    }

    /// Turns the ghost vulnerable unless it is dead.
    pub fn make_vulnerable(&mut self) {
        if self.state != GhostState::Dead {
            self.state = GhostState::Vulnerable;
        }
    }

    pub fn reset(&mut self) {
        self.mover
            .reset(self.color.initial_direction(), GHOST_SPEED);
        self.state = GhostState::Healthy;
        self.path.clear();
        self.must_exit_base = true;
    }

    /// Replaces the current route with one towards `destination`.
    ///
    /// The route starts at the tile the ghost is heading for, so it stays connected even when
    /// the ghost is between two tiles.
    pub fn set_path(&mut self, world: &World, destination: Position) {
        let origin = self.mover.next_tile();
        self.path = world.path_search(origin, destination).into();
        if self.path.is_empty() && origin != destination {
            warn!(
                color = self.color.name(),
                ?origin,
                ?destination,
                "no route for ghost"
            );
        }
    }

    /// Routes the ghost to a random exit destination for its color.
    pub fn set_exit_path<R: Rng + ?Sized>(&mut self, world: &World, rng: &mut R) {
        if let Some(destination) = world.exits().choose(self.color, rng) {
            self.set_path(world, destination);
        }
    }

    /// Picks a direction to keep wandering in from the current tile.
    ///
    /// Straight ahead and both turns are equally likely among the open ones. Turning back is
    /// only chosen at a dead end.
    pub fn random_direction<R: Rng + ?Sized>(
        &self,
        reference: Direction,
        world: &World,
        rng: &mut R,
    ) -> Direction {
        let current = self.mover.current_tile();
        let [left, right] = reference.laterals();
        let open: Vec<Direction> = [reference, left, right]
            .into_iter()
            .filter(|direction| {
                world.tile_validity(
                    World::tile_in_direction(current, *direction),
                    BlockType::NoBlock,
                )
            })
            .collect();

        if open.is_empty() {
            reference.reversed()
        } else {
            open[rng.random_range(0..open.len())]
        }
    }

    pub fn sprite(&self, wobble: bool) -> String {
        ghost_sprite(self.color, self.state, self.mover.direction(), wobble)
    }

    pub fn color(&self) -> GhostColor {
        self.color
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn speed(&self) -> f32 {
        self.mover.speed()
    }

    pub fn next_tile(&self) -> Position {
        self.mover.next_tile()
    }

    pub fn path(&self) -> &VecDeque<Position> {
        &self.path
    }

    pub fn must_exit_base(&self) -> bool {
        self.must_exit_base
    }
}

impl Agent for Ghost {
    fn mover(&self) -> &Mover {
        &self.mover
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::world::load_world_from_string;

    const CORRIDOR: &str = "\
xxxxxxx
xH...Rx
xxxxxxx";

    const JUNCTION: &str = "\
xxxxx
x.R.x
xx.xx
xxHxx
xxxxx";

    fn ghost_on(color: GhostColor, tile: Position) -> Ghost {
        Ghost::with_spawn(color, tile.to_pixel())
    }

    #[test]
    fn die_speeds_up_and_heads_home_then_revive_restores_speed() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let coordinator = GhostCoordinator::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ghost = ghost_on(GhostColor::Red, Position::new(4, 1));
        let before = ghost.speed();

        ghost.die(&world);
        assert_eq!(ghost.state(), GhostState::Dead);
        assert!((ghost.speed() - before * 3.0).abs() < f32::EPSILON);
        assert_eq!(
            ghost.path().iter().copied().collect::<Vec<_>>(),
            vec![Position::new(3, 1), Position::new(2, 1), Position::new(1, 1)]
        );

        for _ in 0..200 {
            ghost.update(16, &coordinator, &world, &mut rng);
            if ghost.state() == GhostState::Healthy {
                break;
            }
        }
        assert_eq!(ghost.state(), GhostState::Healthy);
        assert_eq!(ghost.speed(), before);
        assert_eq!(ghost.path().back(), Some(&Position::new(5, 1)));
    }

    #[test]
    fn die_twice_does_not_stack_speed() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let mut ghost = ghost_on(GhostColor::Cyan, Position::new(3, 1));
        ghost.die(&world);
        ghost.die(&world);
        assert!((ghost.speed() - GHOST_SPEED * 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn dead_ghost_is_not_made_vulnerable() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let mut ghost = ghost_on(GhostColor::Pink, Position::new(3, 1));
        ghost.die(&world);
        ghost.make_vulnerable();
        assert_eq!(ghost.state(), GhostState::Dead);
    }

    #[test]
    fn vulnerable_ghost_recovers_once_window_is_closed() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let coordinator = GhostCoordinator::new();
        let mut rng = StdRng::seed_from_u64(2);
        let mut ghost = ghost_on(GhostColor::Orange, Position::new(3, 1));
        ghost.make_vulnerable();
        ghost.update(16, &coordinator, &world, &mut rng);
        assert_eq!(ghost.state(), GhostState::Healthy);
    }

    #[test]
    fn first_arrival_after_reset_routes_out_of_base() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let coordinator = GhostCoordinator::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut ghost = ghost_on(GhostColor::Red, Position::new(1, 1));
        assert!(ghost.must_exit_base());

        ghost.update(16, &coordinator, &world, &mut rng);
        assert!(!ghost.must_exit_base());
        assert_eq!(ghost.path().back(), Some(&Position::new(5, 1)));
    }

    #[test]
    fn path_following_sets_direction_towards_next_tile() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let coordinator = GhostCoordinator::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut ghost = ghost_on(GhostColor::Red, Position::new(1, 1));
        ghost.set_path(&world, Position::new(4, 1));

        ghost.update(16, &coordinator, &world, &mut rng);
        assert_eq!(ghost.next_tile(), Position::new(2, 1));
        assert_eq!(ghost.direction(), Direction::Right);
        assert_eq!(ghost.path().len(), 2);
    }

    #[test]
    fn pending_inversion_skips_ghosts_with_a_path() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let mut coordinator = GhostCoordinator::new();
        let mut rng = StdRng::seed_from_u64(5);

        let mut routed = ghost_on(GhostColor::Red, Position::new(1, 1));
        routed.set_path(&world, Position::new(4, 1));
        let mut ghosts = [routed];
        coordinator.handle_vulnerable_event(&mut ghosts);
        assert!(coordinator.invert_pending());

        let [mut routed] = ghosts;
        routed.update(16, &coordinator, &world, &mut rng);
        assert_eq!(routed.direction(), Direction::Right);
        assert_eq!(routed.next_tile(), Position::new(2, 1));
    }

    #[test]
    fn pending_inversion_reverses_wandering_ghost_mid_tile() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let mut coordinator = GhostCoordinator::new();
        let mut rng = StdRng::seed_from_u64(6);
        let mut ghost = ghost_on(GhostColor::Cyan, Position::new(2, 1));
        ghost.must_exit_base = false;
        ghost.mover.set_direction(Direction::Right);

        // Leaves (2, 1) heading right without reaching (3, 1).
        ghost.update(16, &coordinator, &world, &mut rng);
        assert_eq!(ghost.next_tile(), Position::new(3, 1));
        assert_eq!(ghost.direction(), Direction::Right);

        let mut ghosts = [ghost];
        coordinator.handle_vulnerable_event(&mut ghosts);
        let [mut ghost] = ghosts;
        ghost.update(1, &coordinator, &world, &mut rng);
        assert_eq!(ghost.direction(), Direction::Left);
        assert_eq!(ghost.next_tile(), Position::new(2, 1));
        assert_eq!(ghost.current_tile(), Position::new(3, 1));
    }

    #[test]
    fn random_direction_reverses_only_at_dead_ends() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let ghost = ghost_on(GhostColor::Red, Position::new(5, 1));
        for _ in 0..10 {
            assert_eq!(
                ghost.random_direction(Direction::Right, &world, &mut rng),
                Direction::Left
            );
        }
    }

    #[test]
    fn random_direction_picks_among_open_turns() {
        let world = load_world_from_string(JUNCTION).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let ghost = ghost_on(GhostColor::Red, Position::new(2, 1));

        let seen: HashSet<Direction> = (0..64)
            .map(|_| ghost.random_direction(Direction::Up, &world, &mut rng))
            .collect();
        assert_eq!(seen, HashSet::from([Direction::Left, Direction::Right]));

        let seen: HashSet<Direction> = (0..64)
            .map(|_| ghost.random_direction(Direction::Down, &world, &mut rng))
            .collect();
        assert_eq!(
            seen,
            HashSet::from([Direction::Down, Direction::Left, Direction::Right])
        );
    }

    #[test]
    fn reset_restores_spawn_state() {
        let world = load_world_from_string(CORRIDOR).unwrap();
        let mut ghost = ghost_on(GhostColor::Pink, Position::new(3, 1));
        ghost.must_exit_base = false;
        ghost.die(&world);

        ghost.reset();
        assert_eq!(ghost.state(), GhostState::Healthy);
        assert_eq!(ghost.speed(), GHOST_SPEED);
        assert_eq!(ghost.direction(), Direction::Down);
        assert!(ghost.path().is_empty());
        assert!(ghost.must_exit_base());
        assert_eq!(ghost.position(), Position::new(3, 1).to_pixel());
    }

    #[test]
    fn sprite_names() {
        assert_eq!(
            ghost_sprite(GhostColor::Red, GhostState::Healthy, Direction::Up, true),
            "Ghosts/Red/Up_Wobble_0.png"
        );
        assert_eq!(
            ghost_sprite(GhostColor::Orange, GhostState::Healthy, Direction::Zero, false),
            "Ghosts/Orange/Right_Wobble_1.png"
        );
        assert_eq!(
            ghost_sprite(GhostColor::Cyan, GhostState::Vulnerable, Direction::Left, false),
            "Ghosts/Vulnerable/Wobble_1.png"
        );
        assert_eq!(
            ghost_sprite(GhostColor::Pink, GhostState::Dead, Direction::Down, true),
            "Ghosts/Dead.png"
        );
    }
}
