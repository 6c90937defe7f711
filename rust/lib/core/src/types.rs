use serde::{Deserialize, Serialize};

/// Query parameters for paginated list endpoints.
///
/// `page` is zero-based; callers with one-based pages convert before use.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    /// Page index.
    #[serde(default)]
    pub page: usize,

    /// Maximum number of results per page.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Name filter. `*` matches any run of characters.
    #[serde(default)]
    pub name: Option<String>,
}

fn default_limit() -> usize {
    10
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 0,
            limit: default_limit(),
            name: None,
        }
    }
}

impl ListParams {
    /// Effective page size. A zero limit means one record per page.
    pub fn page_size(&self) -> usize {
        self.limit.max(1)
    }

    /// Number of records to skip for this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size())
    }

    /// Slice one page out of `all`, reporting whether more pages follow.
    pub fn paginate<T: Serialize>(&self, all: Vec<T>) -> ListResult<T> {
        let total = all.len();
        let offset = self.offset().min(total);
        let size = self.page_size();
        let end = offset.saturating_add(size).min(total);
        let items: Vec<T> = all.into_iter().skip(offset).take(size).collect();
        ListResult {
            items,
            more: end < total,
        }
    }
}

/// Result wrapper for list operations.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T: Serialize> {
    pub items: Vec<T>,
    pub more: bool,
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
