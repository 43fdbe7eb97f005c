/// A millisecond countdown that reports each expiry exactly once.
///
/// A looping timer refills itself on expiry, a one-shot timer pauses itself instead.
/// While paused, [`Timer::update`] does nothing and never reports an expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    maximum_millis: u32,
    remaining_millis: i64,
    looping: bool,
    paused: bool,
}

impl Timer {
    pub fn new(maximum_millis: u32, looping: bool) -> Self {
        Timer {
            maximum_millis,
            remaining_millis: i64::from(maximum_millis),
            looping,
            paused: false,
        }
    }

    /// Deducts `elapsed_millis` and returns `true` if the timer expired on this call.
    pub fn update(&mut self, elapsed_millis: u32) -> bool {
        if self.paused {
            return false;
        }

        self.remaining_millis -= i64::from(elapsed_millis);
        if self.remaining_millis > 0 {
            return false;
        }

        if self.looping {
            self.reset();
        } else {
            self.pause();
        }
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Refills the timer. The paused state is left untouched.
    pub fn reset(&mut self) {
        self.remaining_millis = i64::from(self.maximum_millis);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn remaining_millis(&self) -> i64 {
        self.remaining_millis
    }
}
