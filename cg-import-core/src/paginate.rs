//! Page queue computation.

/// Hard cap on pages fetched in one run. Keeps load on the CG servers
/// bounded no matter how long the profile is.
pub const PAGE_LIMIT: usize = 10;

/// Current/total page counts read from the profile's pagination text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current: u32,
    pub total: u32,
}

impl Default for PageInfo {
    /// Single-page fallback used when the profile has no pagination text.
    fn default() -> Self {
        Self {
            current: 1,
            total: 1,
        }
    }
}

/// Pages to fetch: `current` through `total`, at most `limit` entries.
///
/// Never reaches back before the current page; earlier pages hold scores the
/// operator has already imported on a previous run.
pub fn page_queue(info: PageInfo, limit: usize) -> Vec<u32> {
    (info.current..=info.total).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_at_limit() {
        let queue = page_queue(
            PageInfo {
                current: 3,
                total: 25,
            },
            10,
        );
        assert_eq!(queue, vec![3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn single_page() {
        let queue = page_queue(PageInfo::default(), PAGE_LIMIT);
        assert_eq!(queue, vec![1]);
    }

    #[test]
    fn fewer_pages_than_limit() {
        let queue = page_queue(
            PageInfo {
                current: 4,
                total: 6,
            },
            10,
        );
        assert_eq!(queue, vec![4, 5, 6]);
    }

    #[test]
    fn current_past_total_yields_nothing() {
        let queue = page_queue(
            PageInfo {
                current: 7,
                total: 6,
            },
            10,
        );
        assert!(queue.is_empty());
    }
}
