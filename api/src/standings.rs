use crate::{LeaderboardEntry, Match, Pick, UserId};
use std::collections::{BTreeMap, HashMap};

pub const LEADER_EMOJI: &str = "💪";
pub const LAST_PLACE_EMOJI: &str = "💩";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: u32,
    pub entry: LeaderboardEntry,
}

/// Sort by score (descending) and assign competition ranks: tied players
/// share a rank and the next rank skips ahead (1, 1, 3).
///
/// Entries without a server-provided emoji get the leader / last-place marker
/// when that position is not tied.
pub fn rank_leaderboard(entries: &[LeaderboardEntry]) -> Vec<RankedEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));

    let mut ranked: Vec<RankedEntry> = Vec::with_capacity(sorted.len());
    for (idx, entry) in sorted.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if prev.entry.score == entry.score => prev.rank,
            _ => idx as u32 + 1,
        };
        ranked.push(RankedEntry { rank, entry });
    }

    let len = ranked.len();
    if len > 1 {
        if ranked[0].entry.score > ranked[1].entry.score && ranked[0].entry.emoji.is_none() {
            ranked[0].entry.emoji = Some(LEADER_EMOJI.to_string());
        }
        if ranked[len - 1].entry.score < ranked[len - 2].entry.score
            && ranked[len - 1].entry.emoji.is_none()
        {
            ranked[len - 1].entry.emoji = Some(LAST_PLACE_EMOJI.to_string());
        }
    }
    ranked
}

// ---------------------------------------------------------------------------
// All-picks history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryRow {
    pub username: String,
    pub pick: Option<Pick>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekHistory {
    pub week: u32,
    pub completed: bool,
    /// Picks withheld until every match of the week is completed.
    pub hidden: bool,
    pub rows: Vec<HistoryRow>,
}

/// Raw data behind the all-picks view. Kept unprocessed so the privacy
/// toggle can be flipped without refetching.
#[derive(Debug, Clone, Default)]
pub struct PickHistory {
    pub players: Vec<LeaderboardEntry>,
    pub matches: Vec<Match>,
    pub picks_by_user: HashMap<UserId, Vec<Pick>>,
    pub current_week: u32,
}

impl PickHistory {
    /// Group picks per week, newest week first, one row per player.
    pub fn weeks(&self, hide_current: bool) -> Vec<WeekHistory> {
        let mut by_week: BTreeMap<u32, Vec<&Match>> = BTreeMap::new();
        for m in &self.matches {
            by_week.entry(m.week).or_default().push(m);
        }

        by_week
            .into_iter()
            .rev()
            .map(|(week, matches)| {
                let completed = matches.iter().all(|m| m.is_completed);
                let hidden = hide_current && week == self.current_week && !completed;
                let rows = if hidden {
                    Vec::new()
                } else {
                    self.players
                        .iter()
                        .map(|player| HistoryRow {
                            username: player.username.clone(),
                            pick: self.pick_for(player.user_id, week).cloned(),
                        })
                        .collect()
                };
                WeekHistory { week, completed, hidden, rows }
            })
            .collect()
    }

    fn pick_for(&self, user_id: UserId, week: u32) -> Option<&Pick> {
        self.picks_by_user
            .get(&user_id)?
            .iter()
            .find(|p| p.matchup.week == week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Team;

    fn entry(id: UserId, name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: id,
            username: name.to_string(),
            score,
            emoji: None,
        }
    }

    #[test]
    fn ties_share_a_rank_and_the_next_rank_skips() {
        let ranked = rank_leaderboard(&[
            entry(1, "anna", 3),
            entry(2, "ben", 5),
            entry(3, "cleo", 5),
            entry(4, "dan", 1),
        ]);
        let ranks: Vec<(String, u32)> = ranked
            .iter()
            .map(|r| (r.entry.username.clone(), r.rank))
            .collect();
        assert_eq!(
            ranks,
            vec![
                ("ben".to_string(), 1),
                ("cleo".to_string(), 1),
                ("anna".to_string(), 3),
                ("dan".to_string(), 4),
            ]
        );
    }

    #[test]
    fn emoji_only_marks_untied_extremes() {
        let ranked = rank_leaderboard(&[entry(1, "a", 5), entry(2, "b", 5), entry(3, "c", 1)]);
        assert_eq!(ranked[0].entry.emoji, None);
        assert_eq!(ranked[1].entry.emoji, None);
        assert_eq!(ranked[2].entry.emoji.as_deref(), Some(LAST_PLACE_EMOJI));

        let ranked = rank_leaderboard(&[entry(1, "a", 7), entry(2, "b", 2), entry(3, "c", 2)]);
        assert_eq!(ranked[0].entry.emoji.as_deref(), Some(LEADER_EMOJI));
        assert_eq!(ranked[2].entry.emoji, None);
    }

    #[test]
    fn single_player_gets_no_emoji() {
        let ranked = rank_leaderboard(&[entry(1, "solo", 4)]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].entry.emoji, None);
    }

    fn game(id: u32, week: u32, completed: bool) -> Match {
        Match {
            id,
            week,
            is_completed: completed,
            ..Default::default()
        }
    }

    fn history() -> PickHistory {
        let pick = Pick {
            id: 1,
            matchup: game(11, 1, true),
            chosen: Team {
                id: 5,
                name: "Detroit Lions".into(),
                ..Default::default()
            },
            is_correct: Some(true),
        };
        PickHistory {
            players: vec![entry(1, "anna", 1), entry(2, "ben", 0)],
            matches: vec![game(11, 1, true), game(21, 2, true), game(22, 2, false)],
            picks_by_user: HashMap::from([(1, vec![pick])]),
            current_week: 2,
        }
    }

    #[test]
    fn weeks_are_listed_newest_first_with_a_row_per_player() {
        let weeks = history().weeks(false);
        assert_eq!(weeks.iter().map(|w| w.week).collect::<Vec<_>>(), vec![2, 1]);
        assert!(!weeks[0].completed);
        assert!(weeks[1].completed);

        let week1 = &weeks[1];
        assert_eq!(week1.rows.len(), 2);
        assert_eq!(
            week1.rows[0].pick.as_ref().map(|p| p.chosen.name.as_str()),
            Some("Detroit Lions")
        );
        assert!(week1.rows[1].pick.is_none());
    }

    #[test]
    fn privacy_hides_only_the_unfinished_current_week() {
        let weeks = history().weeks(true);
        assert!(weeks[0].hidden);
        assert!(weeks[0].rows.is_empty());
        assert!(!weeks[1].hidden);

        let mut finished = history();
        finished.matches.iter_mut().for_each(|m| m.is_completed = true);
        assert!(!finished.weeks(true)[0].hidden);
    }
}
