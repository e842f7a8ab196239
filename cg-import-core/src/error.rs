/// Errors that can occur while interpreting a profile page.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No score grid found in page markup")]
    MissingScoreGrid,

    #[error("Score row {row}: missing {what}")]
    MissingElement { row: usize, what: &'static str },

    #[error("Score row {row}: expected 3 cells, found {found}")]
    WrongCellCount { row: usize, found: usize },

    #[error("Score row {row}: chart link {href:?} does not end in /<version>/<id>")]
    InvalidChartLink { row: usize, href: String },

    #[error("Score row {row}: unknown difficulty code {code:?}")]
    UnknownDifficulty { row: usize, code: String },

    #[error("Score row {row}: unknown playtype {code:?}")]
    UnknownPlaytype { row: usize, code: String },

    #[error("Score row {row}: invalid count {value:?}")]
    InvalidCount { row: usize, value: String },

    #[error("Unrecognized timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("Malformed pagination text {0:?}")]
    InvalidPageInfo(String),

    #[error("Not a recognized Cardinal Gate host: {0}")]
    UnknownSite(String),
}
