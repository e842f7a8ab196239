//! BATCH-MANUAL payload construction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::group::VersionScores;
use crate::site::Site;
use crate::types::{Playtype, ScoreRecord};

/// BATCH-MANUAL header identifying the game, playtype and originating
/// service for one batch of scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchMeta {
    pub game: String,
    pub playtype: Playtype,
    pub service: String,
    pub version: String,
}

/// One submittable/exportable batch: all scores for a (version, playtype)
/// pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchPayload {
    pub meta: BatchMeta,
    pub scores: Vec<ScoreRecord>,
}

impl BatchPayload {
    fn new(version: &str, playtype: Playtype, service: &str, scores: Vec<ScoreRecord>) -> Self {
        Self {
            meta: BatchMeta {
                game: "iidx".to_string(),
                playtype,
                service: service.to_string(),
                version: version.to_string(),
            },
            scores,
        }
    }
}

/// Build one batch per (version, playtype) pair that has at least one score.
///
/// Versions are emitted in sorted order, SP before DP within a version.
pub fn build_batches(
    groups: BTreeMap<String, VersionScores>,
    service: &str,
) -> Vec<BatchPayload> {
    let mut batches = Vec::new();

    for (version, scores) in groups {
        if !scores.sp.is_empty() {
            batches.push(BatchPayload::new(&version, Playtype::Sp, service, scores.sp));
        }
        if !scores.dp.is_empty() {
            batches.push(BatchPayload::new(&version, Playtype::Dp, service, scores.dp));
        }
    }

    batches
}

/// File name for an exported batch:
/// `export-<site>-iidx<version>-<sp|dp>-<timestamp>.json`.
pub fn export_filename(
    site: Site,
    version: &str,
    playtype: Playtype,
    at: DateTime<Utc>,
) -> String {
    format!(
        "export-{}-iidx{}-{}-{}.json",
        site.slug(),
        version,
        playtype.file_slug(),
        at.format("%Y%m%d%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::{Difficulty, Judgements, MatchType};

    fn record(id: &str) -> ScoreRecord {
        ScoreRecord {
            match_type: MatchType::InGameId,
            identifier: id.to_string(),
            difficulty: Difficulty::Hyper,
            lamp: "EX HARD CLEAR".to_string(),
            score: 1500,
            time_achieved: 0,
            judgements: Judgements {
                pgreat: 600,
                great: 300,
            },
            optional: None,
        }
    }

    fn groups() -> BTreeMap<String, VersionScores> {
        let mut groups = BTreeMap::new();
        groups.insert(
            "29".to_string(),
            VersionScores {
                sp: vec![record("a"), record("b")],
                dp: vec![record("c")],
            },
        );
        groups.insert(
            "30".to_string(),
            VersionScores {
                sp: vec![record("d")],
                dp: Vec::new(),
            },
        );
        groups
    }

    #[test]
    fn empty_playtype_groups_are_skipped() {
        let batches = build_batches(groups(), "kt-cg-iidx-importer");

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].meta.version, "29");
        assert_eq!(batches[0].meta.playtype, Playtype::Sp);
        assert_eq!(batches[0].scores.len(), 2);
        assert_eq!(batches[1].meta.version, "29");
        assert_eq!(batches[1].meta.playtype, Playtype::Dp);
        assert_eq!(batches[2].meta.version, "30");
        assert_eq!(batches[2].meta.playtype, Playtype::Sp);
    }

    #[test]
    fn meta_carries_game_and_service() {
        let batches = build_batches(groups(), "kt-cg-iidx-importer (GAN)");
        assert_eq!(batches[0].meta.game, "iidx");
        assert_eq!(batches[0].meta.service, "kt-cg-iidx-importer (GAN)");
    }

    #[test]
    fn payload_wire_shape() {
        let batches = build_batches(groups(), "kt-cg-iidx-importer");
        let value = serde_json::to_value(&batches[2]).unwrap();
        assert_eq!(value["meta"]["playtype"], "SP");
        assert_eq!(value["meta"]["version"], "30");
        assert_eq!(value["scores"][0]["matchType"], "inGameID");
    }

    #[test]
    fn export_filename_format() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap();
        assert_eq!(
            export_filename(Site::Ganymede, "29", Playtype::Dp, at),
            "export-gan-iidx29-dp-20240601123045.json"
        );
    }
}
