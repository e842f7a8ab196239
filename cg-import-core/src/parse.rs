//! Profile page markup parsing.
//!
//! A profile page carries one `.score-grid` container with a `.grid-x` row
//! per chart. Each row has three direct `.cell` children: chart metadata
//! (link, chart code, clear lamp), an unused middle cell, and the result
//! (score, judgement tooltip, achievement timestamp). The sibling text node
//! after the grid holds the pagination info.
//!
//! A row that deviates from that shape is a fatal error for the whole page;
//! the only rows skipped on purpose are BEGINNER charts, which Kamaitachi
//! does not track.

use scraper::{ElementRef, Html, Selector};

use crate::dates::parse_timestamp;
use crate::error::ParseError;
use crate::paginate::PageInfo;
use crate::types::{
    Difficulty, Judgements, MatchType, OptionalMetrics, ParsedScore, Playtype, ScoreRecord,
};

/// Sentinel CG shows when the miss count for a play is unknown.
const UNKNOWN_MISS_COUNT: &str = "-";

/// Scores from one page, partitioned by playtype.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageScores {
    pub sp: Vec<ParsedScore>,
    pub dp: Vec<ParsedScore>,
}

impl PageScores {
    pub fn len(&self) -> usize {
        self.sp.len() + self.dp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sp.is_empty() && self.dp.is_empty()
    }

    /// Append another page's scores, preserving order.
    pub fn extend(&mut self, other: PageScores) {
        self.sp.extend(other.sp);
        self.dp.extend(other.dp);
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn score_grid(doc: &Html) -> Result<ElementRef<'_>, ParseError> {
    doc.select(&selector(".score-grid"))
        .next()
        .ok_or(ParseError::MissingScoreGrid)
}

/// Direct children of `el` carrying the given class.
fn child_elements_with_class<'a>(el: ElementRef<'a>, class: &str) -> Vec<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().classes().any(|c| c == class))
        .collect()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Read the pagination text node following the score grid.
///
/// The text is four space-separated tokens ("Page 3 of 25"); absence means
/// the profile fits on a single page.
pub fn parse_page_info(doc: &Html) -> Result<PageInfo, ParseError> {
    let grid = score_grid(doc)?;

    let Some(sibling) = grid.next_siblings().filter_map(ElementRef::wrap).next() else {
        return Ok(PageInfo::default());
    };

    let text = element_text(sibling);
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let parse = |token: &str| -> Result<u32, ParseError> {
        token
            .parse()
            .map_err(|_| ParseError::InvalidPageInfo(text.clone()))
    };

    match (tokens.get(1), tokens.get(3)) {
        (Some(&current), Some(&total)) => Ok(PageInfo {
            current: parse(current)?,
            total: parse(total)?,
        }),
        _ => Err(ParseError::InvalidPageInfo(text.clone())),
    }
}

/// Parse every score row on a page.
pub fn parse_page(doc: &Html) -> Result<PageScores, ParseError> {
    let grid = score_grid(doc)?;
    let mut scores = PageScores::default();

    for (row, element) in child_elements_with_class(grid, "grid-x").into_iter().enumerate() {
        if let Some(parsed) = parse_row(element, row)? {
            match parsed.playtype {
                Playtype::Sp => scores.sp.push(parsed),
                Playtype::Dp => scores.dp.push(parsed),
            }
        }
    }

    Ok(scores)
}

/// Parse one `.grid-x` row. Returns `None` for BEGINNER charts.
fn parse_row(element: ElementRef<'_>, row: usize) -> Result<Option<ParsedScore>, ParseError> {
    let cells = child_elements_with_class(element, "cell");
    if cells.len() != 3 {
        return Err(ParseError::WrongCellCount {
            row,
            found: cells.len(),
        });
    }
    let chart_cell = cells[0];
    let result_cell = cells[2];

    // Chart cell: link encodes version and chart id, the second <strong>
    // holds the chart code, and .label holds the clear lamp.
    let link = chart_cell
        .select(&selector("a"))
        .next()
        .ok_or(ParseError::MissingElement {
            row,
            what: "chart link",
        })?;
    let href = link
        .value()
        .attr("href")
        .ok_or(ParseError::MissingElement {
            row,
            what: "chart link href",
        })?;
    let (version, identifier) = chart_link_keys(href, row)?;

    let code = chart_cell
        .select(&selector("strong"))
        .nth(1)
        .map(element_text)
        .ok_or(ParseError::MissingElement {
            row,
            what: "chart code",
        })?;

    let difficulty = code
        .chars()
        .last()
        .and_then(Difficulty::from_code)
        .ok_or_else(|| ParseError::UnknownDifficulty {
            row,
            code: code.clone(),
        })?;
    if difficulty == Difficulty::Beginner {
        return Ok(None);
    }

    let playtype = code
        .get(..2)
        .and_then(Playtype::from_prefix)
        .ok_or_else(|| ParseError::UnknownPlaytype {
            row,
            code: code.clone(),
        })?;

    let lamp = chart_cell
        .select(&selector(".label"))
        .next()
        .map(element_text)
        .ok_or(ParseError::MissingElement {
            row,
            what: "clear lamp",
        })?;

    // Result cell: <strong> text is "<score> <suffix>", its title attribute
    // is "pgreat, great, misses", and the second nested .cell is the
    // achievement timestamp.
    let result = result_cell
        .select(&selector("strong"))
        .next()
        .ok_or(ParseError::MissingElement {
            row,
            what: "score value",
        })?;

    let score_text = element_text(result);
    let score = score_text
        .split_whitespace()
        .next()
        .map(|token| parse_count(token, row))
        .transpose()?
        .ok_or(ParseError::MissingElement {
            row,
            what: "score value",
        })?;

    let title = result
        .value()
        .attr("title")
        .ok_or(ParseError::MissingElement {
            row,
            what: "judgement tooltip",
        })?;
    let (judgements, optional) = parse_judgements(title, row)?;

    let timestamp = result_cell
        .select(&selector(".cell"))
        .nth(1)
        .map(element_text)
        .ok_or(ParseError::MissingElement {
            row,
            what: "timestamp cell",
        })?;
    let time_achieved = parse_timestamp(&timestamp)?;

    Ok(Some(ParsedScore {
        version,
        playtype,
        record: ScoreRecord {
            match_type: MatchType::InGameId,
            identifier,
            difficulty,
            lamp,
            score,
            time_achieved,
            judgements,
            optional,
        },
    }))
}

/// The chart link path ends in `/<version>/<identifier>`.
fn chart_link_keys(href: &str, row: usize) -> Result<(String, String), ParseError> {
    let mut segments = href
        .trim_end_matches('/')
        .rsplit('/')
        .filter(|s| !s.is_empty());

    match (segments.next(), segments.next()) {
        (Some(identifier), Some(version)) => Ok((version.to_string(), identifier.to_string())),
        _ => Err(ParseError::InvalidChartLink {
            row,
            href: href.to_string(),
        }),
    }
}

/// Tooltip format: `"<pgreat> PGREAT, <great> GREAT, <misses> MC"`, with `-`
/// for an unknown miss count.
fn parse_judgements(
    title: &str,
    row: usize,
) -> Result<(Judgements, Option<OptionalMetrics>), ParseError> {
    let fields: Vec<&str> = title.split(',').collect();
    if fields.len() < 3 {
        return Err(ParseError::MissingElement {
            row,
            what: "judgement tooltip fields",
        });
    }

    let token = |field: &str| -> Result<String, ParseError> {
        field
            .trim()
            .split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or(ParseError::MissingElement {
                row,
                what: "judgement tooltip fields",
            })
    };

    let judgements = Judgements {
        pgreat: parse_count(&token(fields[0])?, row)?,
        great: parse_count(&token(fields[1])?, row)?,
    };

    let miss_token = token(fields[2])?;
    let optional = if miss_token == UNKNOWN_MISS_COUNT {
        None
    } else {
        Some(OptionalMetrics {
            bp: parse_count(&miss_token, row)?,
        })
    };

    Ok((judgements, optional))
}

/// Parse a count that may carry thousands separators.
fn parse_count(value: &str, row: usize) -> Result<u32, ParseError> {
    value
        .replace(',', "")
        .parse()
        .map_err(|_| ParseError::InvalidCount {
            row,
            value: value.to_string(),
        })
}
