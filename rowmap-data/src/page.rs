use serde::{Deserialize, Serialize};

/// Page size used when a page is requested without a limit.
pub const BASE_LIMIT: u64 = 50;

/// Largest limit or offset a statement carries; SQL integers are signed 64-bit.
const MAX_WINDOW: u64 = i64::MAX as u64;

/// Pagination parameters, deserializable from query params.
///
/// Pages are 1-based. A missing page, or a page below 1, means "no pagination".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Pageable {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// The resolved `(limit, offset)` of a paginated select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

impl Pageable {
    /// No pagination: every row.
    pub fn unpaged() -> Self {
        Self::default()
    }

    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(page: u64) -> Self {
        Self {
            page: Some(page),
            limit: None,
        }
    }

    /// `limit` rows skipping `limit * (page - 1)`; `None` when unpaginated.
    ///
    /// A zero limit falls back to [`BASE_LIMIT`]. Limit and offset saturate
    /// at `i64::MAX`, past the end of any table.
    pub fn window(&self) -> Option<Window> {
        let page = self.page.filter(|p| *p >= 1)?;
        let limit = self
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(BASE_LIMIT)
            .min(MAX_WINDOW);
        Some(Window {
            limit,
            offset: limit.saturating_mul(page - 1).min(MAX_WINDOW),
        })
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        let (page, size) = match pageable.window() {
            Some(window) => (pageable.page.unwrap_or(1), window.limit),
            None => (1, total_elements),
        };
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}
