use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const XP_PER_CORRECT_ANSWER: u64 = 10;
pub const XP_PER_LEVEL: u64 = 100;

/// Per-user gamification state, one record per user in `user_progress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: u64,
    pub total_xp: u64,
    pub current_level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: NaiveDate,
}

impl UserProgress {
    /// The record created the first time a user is seen.
    pub fn new(user_id: u64, today: NaiveDate) -> Self {
        Self {
            user_id,
            total_xp: 0,
            current_level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: today,
        }
    }

    /// Update the daily streak for activity on `today`.
    ///
    /// Same day keeps the streak, the next day extends it, a gap restarts it
    /// at one. Dates earlier than the last activity are ignored.
    pub fn record_activity(&mut self, today: NaiveDate) {
        let gap = (today - self.last_activity_date).num_days();

        if self.current_streak == 0 {
            self.current_streak = 1;
        } else if gap == 1 {
            self.current_streak += 1;
        } else if gap > 1 {
            self.current_streak = 1;
        }

        if gap > 0 {
            self.last_activity_date = today;
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    pub fn award_xp(&mut self, xp: u64) {
        self.total_xp += xp;
        self.current_level = level_for(self.total_xp);
    }
}

pub fn level_for(total_xp: u64) -> u32 {
    u32::try_from(total_xp / XP_PER_LEVEL + 1).unwrap_or(u32::MAX)
}
