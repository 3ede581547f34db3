//! All-time leaderboard, weekly tournament and high score.

pub mod week;

use crate::app::time::now_millis;
use crate::game::constants::{ALL_TIME_CAPACITY, WEEKLY_CAPACITY};
use crate::game::types::RunResult;
use crate::store::{self, Store};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u32,
    #[serde(rename = "address")]
    pub player_label: String,
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    #[serde(rename = "perfect", default)]
    pub is_perfect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentEntry {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    #[serde(rename = "week")]
    pub week_key: i64,
}

impl From<&RunResult> for LeaderboardEntry {
    fn from(result: &RunResult) -> Self {
        Self {
            score: result.score,
            player_label: result.player_label.clone(),
            timestamp_ms: result.timestamp_ms,
            is_perfect: result.is_perfect,
        }
    }
}

trait Ranked {
    fn ranked(&self) -> &LeaderboardEntry;
}

impl Ranked for LeaderboardEntry {
    fn ranked(&self) -> &LeaderboardEntry {
        self
    }
}

impl Ranked for TournamentEntry {
    fn ranked(&self) -> &LeaderboardEntry {
        &self.entry
    }
}

/// Stable sort: perfect games first, then score descending. Equal keys keep
/// insertion order.
fn rank<T: Ranked>(entries: &mut Vec<T>, capacity: usize) {
    entries.sort_by(|a, b| {
        let (a, b) = (a.ranked(), b.ranked());
        b.is_perfect
            .cmp(&a.is_perfect)
            .then_with(|| b.score.cmp(&a.score))
    });
    entries.truncate(capacity);
}

#[derive(Debug, Default)]
struct Boards {
    all_time: Vec<LeaderboardEntry>,
    tournament: Vec<TournamentEntry>,
    high_score: u32,
}

pub struct Scoreboard {
    boards: Mutex<Boards>,
    store: Store,
    retained_weeks: Option<usize>,
}

impl Scoreboard {
    pub async fn load(store: Store, retained_weeks: Option<usize>) -> Self {
        let boards = Boards {
            all_time: store.load_or(&store::LEADERBOARD, Vec::new()).await,
            tournament: store.load_or(&store::TOURNAMENT_WEEKLY, Vec::new()).await,
            high_score: store.load_or(&store::HIGH_SCORE, 0).await,
        };
        tracing::info!(
            all_time = boards.all_time.len(),
            tournament = boards.tournament.len(),
            high_score = boards.high_score,
            "scoreboard loaded"
        );
        Self {
            boards: Mutex::new(boards),
            store,
            retained_weeks,
        }
    }

    /// Call once per finished run; a second call counts the run twice.
    pub async fn record_run(&self, result: RunResult) {
        let entry = LeaderboardEntry::from(&result);
        let week_key = week::week_key(result.timestamp_ms);

        let (all_time, tournament, new_high_score) = {
            let mut boards = self.boards.lock().await;

            boards.all_time.push(entry.clone());
            rank(&mut boards.all_time, ALL_TIME_CAPACITY);

            let (mut this_week, other_weeks): (Vec<_>, Vec<_>) = boards
                .tournament
                .drain(..)
                .partition(|existing| existing.week_key == week_key);
            this_week.push(TournamentEntry { entry, week_key });
            rank(&mut this_week, WEEKLY_CAPACITY);
            this_week.extend(other_weeks);
            if let Some(weeks) = self.retained_weeks {
                prune_weeks(&mut this_week, weeks);
            }
            boards.tournament = this_week;

            let new_high_score = if result.score > boards.high_score {
                boards.high_score = result.score;
                Some(result.score)
            } else {
                None
            };

            (
                boards.all_time.clone(),
                boards.tournament.clone(),
                new_high_score,
            )
        };

        tracing::debug!(
            score = result.score,
            perfect = result.is_perfect,
            week_key,
            "run recorded"
        );

        if let Some(high_score) = new_high_score {
            self.store.save_logged(&store::HIGH_SCORE, &high_score).await;
        }
        self.store.save_logged(&store::LEADERBOARD, &all_time).await;
        self.store
            .save_logged(&store::TOURNAMENT_WEEKLY, &tournament)
            .await;
    }

    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.boards.lock().await.all_time.clone()
    }

    /// Current week's key and its ranked entries.
    pub async fn weekly_board(&self) -> (i64, Vec<TournamentEntry>) {
        let week_key = week::week_key(now_millis());
        (week_key, self.weekly_board_for(week_key).await)
    }

    /// Stored order is already ranked, so this only filters.
    pub async fn weekly_board_for(&self, week_key: i64) -> Vec<TournamentEntry> {
        self.boards
            .lock()
            .await
            .tournament
            .iter()
            .filter(|entry| entry.week_key == week_key)
            .cloned()
            .collect()
    }

    pub async fn high_score(&self) -> u32 {
        self.boards.lock().await.high_score
    }
}

/// Keeps only the `weeks` most recent tournament weeks.
fn prune_weeks(entries: &mut Vec<TournamentEntry>, weeks: usize) {
    let keep: BTreeSet<i64> = entries
        .iter()
        .map(|entry| entry.week_key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .take(weeks.max(1))
        .collect();
    entries.retain(|entry| keep.contains(&entry.week_key));
}
