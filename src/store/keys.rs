use super::{Json, Key, Text};
use crate::scores::{LeaderboardEntry, TournamentEntry};

pub const OWNED_SKINS: Key<Vec<String>, Json> = Key::new("owned_skins");
pub const CURRENT_SKIN: Key<String, Text> = Key::new("current_skin");
pub const LEADERBOARD: Key<Vec<LeaderboardEntry>, Json> = Key::new("leaderboard");
pub const HIGH_SCORE: Key<u32, Text> = Key::new("high_score");
pub const TOURNAMENT_WEEKLY: Key<Vec<TournamentEntry>, Json> = Key::new("tournament_weekly");
pub const SOUND_ENABLED: Key<bool, Text> = Key::new("sound_enabled");
