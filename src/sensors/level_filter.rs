//! Per-probe hysteresis.
//!
//! A level flag only flips after `limit` consecutive stable samples disagree
//! with it.  Any agreeing sample resets the streak, so alternating noise
//! never moves the flag.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOutcome {
    /// The flag flipped on this update.
    pub changed: bool,
    /// Flag value after the update.
    pub flag: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFilter {
    flag: bool,
    mismatch_streak: u8,
    limit: u8,
}

impl LevelFilter {
    /// A filter that starts with the flag cleared.
    pub fn new(limit: u8) -> Self {
        Self {
            flag: false,
            mismatch_streak: 0,
            limit: limit.max(1),
        }
    }

    pub fn update(&mut self, reading: bool) -> FilterOutcome {
        if reading == self.flag {
            self.mismatch_streak = 0;
            return FilterOutcome { changed: false, flag: self.flag };
        }

        self.mismatch_streak = self.mismatch_streak.saturating_add(1);
        if self.mismatch_streak >= self.limit {
            self.flag = reading;
            self.mismatch_streak = 0;
            FilterOutcome { changed: true, flag: self.flag }
        } else {
            FilterOutcome { changed: false, flag: self.flag }
        }
    }

    pub fn flag(&self) -> bool {
        self.flag
    }

    pub fn mismatch_streak(&self) -> u8 {
        self.mismatch_streak
    }
}
