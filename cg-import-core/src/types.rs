use serde::Serialize;

/// How Kamaitachi should match a record to a chart. CG exposes the in-game
/// chart id, so this is always `inGameID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchType {
    #[serde(rename = "inGameID")]
    InGameId,
}

/// Chart difficulty as displayed on CG.
///
/// BEGINNER exists on the site but Kamaitachi does not track it; the parser
/// drops those rows, so an emitted record never carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Beginner,
    Normal,
    Hyper,
    Another,
    Leggendaria,
}

impl Difficulty {
    /// Decode the trailing letter of a chart code like `SPA` or `DPL`.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(Self::Beginner),
            'N' => Some(Self::Normal),
            'H' => Some(Self::Hyper),
            'A' => Some(Self::Another),
            'L' => Some(Self::Leggendaria),
            _ => None,
        }
    }
}

/// Single-player or double-player chart variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Playtype {
    Sp,
    Dp,
}

impl Playtype {
    /// Decode the leading two letters of a chart code like `SPA` or `DPL`.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "SP" => Some(Self::Sp),
            "DP" => Some(Self::Dp),
            _ => None,
        }
    }

    /// Lowercase form used in export file names.
    pub fn file_slug(self) -> &'static str {
        match self {
            Self::Sp => "sp",
            Self::Dp => "dp",
        }
    }
}

impl std::fmt::Display for Playtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sp => write!(f, "SP"),
            Self::Dp => write!(f, "DP"),
        }
    }
}

/// Judgement counts CG exposes for a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Judgements {
    pub pgreat: u32,
    pub great: u32,
}

/// Optional metrics. CG shows miss count as `-` when unknown, in which case
/// the whole object is omitted from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionalMetrics {
    pub bp: u32,
}

/// One performance on one chart, shaped exactly like a BATCH-MANUAL score
/// object on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub match_type: MatchType,
    pub identifier: String,
    pub difficulty: Difficulty,
    pub lamp: String,
    pub score: u32,
    pub time_achieved: i64,
    pub judgements: Judgements,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<OptionalMetrics>,
}

/// A parsed record plus the keys it is grouped by.
///
/// `version` and `playtype` are carried alongside the record rather than on
/// it, so the serialized payload never contains them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScore {
    pub version: String,
    pub playtype: Playtype,
    pub record: ScoreRecord,
}
