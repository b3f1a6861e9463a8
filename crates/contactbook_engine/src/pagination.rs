/* 📖 # Why "parse or default" for page and limit?

Query parameters come straight from a browser URL. A malformed or missing value is not worth
an error response: the list endpoint falls back to page 1 and 10 contacts per page instead.
Values are read the way a lenient integer parser reads them: leading whitespace, an optional
sign, then digits up to the first other character ("3abc" is 3). Zero, negative and
unreadable values all fall back to the default.
*/

use serde::{Deserialize, Serialize};

use crate::contact::Contact;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// A validated page request: both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Create a request; zero values are replaced by their defaults.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Build a request from raw query parameter values.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(
            parse_or_default(page, DEFAULT_PAGE),
            parse_or_default(limit, DEFAULT_LIMIT),
        )
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records to skip: `(page - 1) * limit`, saturating.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

fn parse_or_default(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(parse_leading_integer)
        .filter(|value| *value >= 1)
        .map_or(default, |value| value as u64)
}

/// Parse an optional sign followed by digits, ignoring whatever follows them.
/// Magnitudes beyond the i128 range saturate.
fn parse_leading_integer(raw: &str) -> Option<i128> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: Vec<u8> = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.iter().fold(0i128, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i128::from(*digit))
    });
    let clamped = magnitude.min(i128::from(u64::MAX));
    Some(if negative { -clamped } else { clamped })
}

/// Pagination metadata returned with every page of contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_contacts: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total_contacts: u64) -> Self {
        let total_pages = total_contacts.div_ceil(request.limit());
        Self {
            current_page: request.page(),
            total_pages,
            total_contacts,
            has_next_page: request.page() < total_pages,
            has_prev_page: request.page() > 1,
        }
    }
}

/// One page of contacts together with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub pagination: Pagination,
}
