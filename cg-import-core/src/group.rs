//! Cross-page grouping.

use std::collections::BTreeMap;

use crate::types::{ParsedScore, Playtype, ScoreRecord};

/// SP and DP record lists for one game version.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VersionScores {
    pub sp: Vec<ScoreRecord>,
    pub dp: Vec<ScoreRecord>,
}

impl VersionScores {
    pub fn len(&self) -> usize {
        self.sp.len() + self.dp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sp.is_empty() && self.dp.is_empty()
    }
}

/// Partition parsed scores by game version, keeping playtypes separate.
///
/// Page-then-row order is preserved within each list. Versions come out in
/// sorted order so batch emission is deterministic.
pub fn group_by_version(
    sp: Vec<ParsedScore>,
    dp: Vec<ParsedScore>,
) -> BTreeMap<String, VersionScores> {
    let mut groups: BTreeMap<String, VersionScores> = BTreeMap::new();

    for parsed in sp.into_iter().chain(dp) {
        let group = groups.entry(parsed.version).or_default();
        match parsed.playtype {
            Playtype::Sp => group.sp.push(parsed.record),
            Playtype::Dp => group.dp.push(parsed.record),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, Judgements, MatchType};

    fn score(version: &str, playtype: Playtype, id: &str) -> ParsedScore {
        ParsedScore {
            version: version.to_string(),
            playtype,
            record: ScoreRecord {
                match_type: MatchType::InGameId,
                identifier: id.to_string(),
                difficulty: Difficulty::Another,
                lamp: "CLEAR".to_string(),
                score: 1000,
                time_achieved: 0,
                judgements: Judgements {
                    pgreat: 400,
                    great: 200,
                },
                optional: None,
            },
        }
    }

    #[test]
    fn partitions_by_version_and_playtype() {
        let sp = vec![
            score("29", Playtype::Sp, "a"),
            score("29", Playtype::Sp, "b"),
            score("30", Playtype::Sp, "c"),
        ];
        let dp = vec![score("29", Playtype::Dp, "d")];

        let groups = group_by_version(sp, dp);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["29"].sp.len(), 2);
        assert_eq!(groups["29"].dp.len(), 1);
        assert_eq!(groups["30"].sp.len(), 1);
        assert!(groups["30"].dp.is_empty());
    }

    #[test]
    fn grouping_is_a_partition() {
        let sp = vec![
            score("29", Playtype::Sp, "a"),
            score("30", Playtype::Sp, "b"),
            score("29", Playtype::Sp, "c"),
        ];
        let dp = vec![
            score("31", Playtype::Dp, "d"),
            score("29", Playtype::Dp, "e"),
        ];
        let total = sp.len() + dp.len();

        let groups = group_by_version(sp, dp);

        let mut ids: Vec<String> = groups
            .values()
            .flat_map(|g| g.sp.iter().chain(&g.dp))
            .map(|r| r.identifier.clone())
            .collect();
        ids.sort();
        assert_eq!(ids.len(), total);
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn order_within_a_group_is_preserved() {
        let sp = vec![
            score("29", Playtype::Sp, "first"),
            score("29", Playtype::Sp, "second"),
            score("29", Playtype::Sp, "third"),
        ];
        let groups = group_by_version(sp, Vec::new());
        let ids: Vec<&str> = groups["29"].sp.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }
}
