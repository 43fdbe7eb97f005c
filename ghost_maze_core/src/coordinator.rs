use rand::Rng;
use tracing::debug;

use crate::{
    constants::{INVERT_MILLIS, VULNERABLE_MILLIS, WOBBLE_MILLIS},
    ghost::{Ghost, GhostState},
    timer::Timer,
    world::World,
};

/// Timers and flags shared by every ghost.
///
/// One coordinator drives all four ghosts. Each frame runs [`GhostCoordinator::pre_update`],
/// then every ghost's update in a fixed order, then [`GhostCoordinator::post_update`], so all
/// ghosts observe the same flags during a frame.
#[derive(Debug, Clone)]
pub struct GhostCoordinator {
    vulnerable_timer: Timer,
    invert_timer: Timer,
    wobble_timer: Timer,
    vulnerable: bool,
    invert_pending: bool,
    wobble: bool,
}

impl GhostCoordinator {
    pub fn new() -> Self {
        let mut vulnerable_timer = Timer::new(VULNERABLE_MILLIS, false);
        vulnerable_timer.pause();
        GhostCoordinator {
            vulnerable_timer,
            invert_timer: Timer::new(INVERT_MILLIS, true),
            wobble_timer: Timer::new(WOBBLE_MILLIS, true),
            vulnerable: false,
            invert_pending: false,
            wobble: false,
        }
    }

    /// Advances the shared timers and raises the flags the ghosts act on this frame.
    pub fn pre_update(&mut self, elapsed_millis: u32, ghosts: &[Ghost]) {
        if self.wobble_timer.update(elapsed_millis) {
            self.wobble = !self.wobble;
        }

        let any_vulnerable = ghosts
            .iter()
            .any(|ghost| ghost.state() == GhostState::Vulnerable);

        let window_expired = self.vulnerable_timer.update(elapsed_millis);
        if window_expired || (self.vulnerable && !any_vulnerable) {
            debug!(expired = window_expired, "vulnerability window closed");
            self.vulnerable_timer.pause();
            self.vulnerable = false;
            self.invert_pending = true;
            self.invert_timer.reset();
            self.invert_timer.resume();
        } else if self.invert_timer.update(elapsed_millis) {
            debug!("periodic ghost inversion");
            self.invert_pending = true;
        }
    }

    /// Consumes the inversion request once every ghost has seen it.
    pub fn post_update(&mut self) {
        self.invert_pending = false;
    }

    /// Runs a complete ghost frame: shared pre-update, each ghost in order, post-update.
    pub fn update_ghosts<R: Rng + ?Sized>(
        &mut self,
        elapsed_millis: u32,
        ghosts: &mut [Ghost],
        world: &World,
        rng: &mut R,
    ) {
        self.pre_update(elapsed_millis, ghosts);
        for ghost in ghosts.iter_mut() {
            ghost.update(elapsed_millis, self, world, rng);
        }
        self.post_update();
    }

    /// Opens the vulnerability window, typically because a power pellet was eaten.
    pub fn handle_vulnerable_event(&mut self, ghosts: &mut [Ghost]) {
        self.invert_pending = true;
        self.vulnerable = true;
        self.vulnerable_timer.reset();
        self.vulnerable_timer.resume();
        self.invert_timer.pause();

        for ghost in ghosts.iter_mut() {
            ghost.make_vulnerable();
        }
        debug!("vulnerability window opened");
    }

    /// Returns the shared state to how it is at the start of a life.
    pub fn reset(&mut self) {
        self.vulnerable_timer.pause();
        self.vulnerable_timer.reset();
        self.invert_timer.reset();
        self.invert_timer.resume();
        self.wobble_timer.reset();
        self.vulnerable = false;
        self.invert_pending = false;
        self.wobble = false;
    }

    pub fn is_vulnerable(&self) -> bool {
        self.vulnerable
    }

    pub fn invert_pending(&self) -> bool {
        self.invert_pending
    }

    /// Cosmetic phase used to alternate between the two ghost sprite frames.
    pub fn wobble(&self) -> bool {
        self.wobble
    }

    pub fn vulnerable_timer(&self) -> &Timer {
        &self.vulnerable_timer
    }

    pub fn invert_timer(&self) -> &Timer {
        &self.invert_timer
    }
}

impl Default for GhostCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
