use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Direction, PixelPosition, Position,
    avatar::Avatar,
    constants::{
        DOT_SCORE, GHOST_CAPTURE_BASE_SCORE, PELLET_BLINK_MILLIS, POWER_PELLET_SCORE,
        STARTING_LIVES,
    },
    coordinator::GhostCoordinator,
    ghost::{Ghost, GhostColor, GhostState},
    movement::Agent,
    timer::Timer,
    world::{Item, World},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Playing,
    LevelCleared,
    GameOver,
}

/// What a single call to [`Game::step`] amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOutcome {
    Running,
    /// A healthy ghost caught the avatar; everything went back to its spawn.
    LifeLost,
    LevelCleared,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub position: PixelPosition,
    pub tile: Position,
    pub direction: Direction,
    pub sprite: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostSnapshot {
    pub color: GhostColor,
    pub state: GhostState,
    #[serde(flatten)]
    pub agent: AgentSnapshot,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub score: u32,
    pub lives: u8,
    pub status: GameStatus,
    pub dots_left: usize,
    pub pellets_visible: bool,
    pub ghosts_vulnerable: bool,
    pub avatar: AgentSnapshot,
    pub ghosts: Vec<GhostSnapshot>,
}

/// One round of the game on a single maze.
#[derive(Debug, Clone)]
pub struct Game {
    world: World,
    avatar: Avatar,
    ghosts: [Ghost; 4],
    coordinator: GhostCoordinator,
    rng: StdRng,
    score: u32,
    lives: u8,
    status: GameStatus,
    pellet_blink: Timer,
    pellets_visible: bool,
}

impl Game {
    pub fn new(world: World, seed: u64) -> Self {
        Game {
            world,
            avatar: Avatar::new(),
            ghosts: GhostColor::ALL.map(Ghost::new),
            coordinator: GhostCoordinator::new(),
            rng: StdRng::seed_from_u64(seed),
            score: 0,
            lives: STARTING_LIVES,
            status: GameStatus::Playing,
            pellet_blink: Timer::new(PELLET_BLINK_MILLIS, true),
            pellets_visible: true,
        }
    }

    /// Advances the game by `elapsed_millis`, steering the avatar with `input` first if given.
    pub fn step(&mut self, elapsed_millis: u32, input: Option<Direction>) -> FrameOutcome {
        match self.status {
            GameStatus::LevelCleared => return FrameOutcome::LevelCleared,
            GameStatus::GameOver => return FrameOutcome::GameOver,
            GameStatus::Playing => {}
        }

        if !self.world.dots_remaining() {
            return self.finish(GameStatus::LevelCleared);
        }
        if self.lives == 0 {
            return self.finish(GameStatus::GameOver);
        }

        if self.pellet_blink.update(elapsed_millis) {
            self.pellets_visible = !self.pellets_visible;
        }

        self.coordinator
            .update_ghosts(elapsed_millis, &mut self.ghosts, &self.world, &mut self.rng);

        if let Some(direction) = input {
            self.avatar.set_direction(direction, &self.world);
        }
        self.avatar.update(elapsed_millis, &self.world);

        self.collect_items();
        self.resolve_contacts()
    }

    fn collect_items(&mut self) {
        match self.world.collect_item_at(self.avatar.position()) {
            Some(Item::Dot) => self.score += DOT_SCORE,
            Some(Item::PowerPellet) => {
                self.score += POWER_PELLET_SCORE;
                self.avatar.reset_captures();
                self.coordinator.handle_vulnerable_event(&mut self.ghosts);
            }
            None => {}
        }
    }

    fn resolve_contacts(&mut self) -> FrameOutcome {
        let touching: Vec<usize> = (0..self.ghosts.len())
            .filter(|&index| self.ghosts[index].touches(&self.avatar))
            .collect();

        if touching
            .iter()
            .any(|&index| self.ghosts[index].state() == GhostState::Healthy)
        {
            return self.lose_life();
        }

        for index in touching {
            let ghost = &mut self.ghosts[index];
            if ghost.state() != GhostState::Vulnerable {
                continue;
            }
            let streak = self.avatar.register_capture();
            let points = GHOST_CAPTURE_BASE_SCORE << streak.min(16);
            self.score += points;
            ghost.die(&self.world);
            debug!(color = ghost.color().name(), points, "ghost captured");
        }
        FrameOutcome::Running
    }

    fn lose_life(&mut self) -> FrameOutcome {
        self.lives = self.lives.saturating_sub(1);
        info!(lives = self.lives, score = self.score, "life lost");
        if self.lives == 0 {
            return self.finish(GameStatus::GameOver);
        }
        self.reset_entities();
        FrameOutcome::LifeLost
    }

    fn finish(&mut self, status: GameStatus) -> FrameOutcome {
        self.reset_entities();
        self.status = status;
        match status {
            GameStatus::LevelCleared => {
                info!(score = self.score, "level cleared");
                FrameOutcome::LevelCleared
            }
            _ => {
                info!(score = self.score, "game over");
                FrameOutcome::GameOver
            }
        }
    }

    fn reset_entities(&mut self) {
        self.avatar.reset();
        self.coordinator.reset();
        for ghost in self.ghosts.iter_mut() {
            ghost.reset();
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let wobble = self.coordinator.wobble();
        GameSnapshot {
            score: self.score,
            lives: self.lives,
            status: self.status,
            dots_left: self.world.dots_left(),
            pellets_visible: self.pellets_visible,
            ghosts_vulnerable: self.coordinator.is_vulnerable(),
            avatar: AgentSnapshot {
                position: self.avatar.position(),
                tile: self.avatar.current_tile(),
                direction: self.avatar.direction(),
                sprite: self.avatar.sprite(),
            },
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| GhostSnapshot {
                    color: ghost.color(),
                    state: ghost.state(),
                    agent: AgentSnapshot {
                        position: ghost.position(),
                        tile: ghost.current_tile(),
                        direction: ghost.direction(),
                        sprite: ghost.sprite(wobble),
                    },
                })
                .collect(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn ghosts(&self) -> &[Ghost; 4] {
        &self.ghosts
    }

    pub fn coordinator(&self) -> &GhostCoordinator {
        &self.coordinator
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn pellets_visible(&self) -> bool {
        self.pellets_visible
    }
}
