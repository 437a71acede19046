/// Paging parameters and paged result envelopes for list endpoints

use crate::config::LimitsConfig;
use crate::enums::string_enum;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 50;

string_enum! {
    pub enum SortDirection {
        Asc => "asc",
        Desc => "desc",
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Desc
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub order_by: Option<String>,
    #[serde(default)]
    pub order_dir: SortDirection,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            order_by: None,
            order_dir: SortDirection::default(),
        }
    }
}

impl PaginationParams {
    pub fn validate(&self, limits: &LimitsConfig) -> Result<(), ValidationError> {
        if self.page == 0 {
            return Err(ValidationError::new("page", "page must be at least 1"));
        }
        if self.per_page == 0 {
            return Err(ValidationError::new("per_page", "per_page must be at least 1"));
        }
        if self.per_page > limits.max_per_page {
            return Err(ValidationError::new(
                "per_page",
                format!("per_page cannot exceed {}", limits.max_per_page),
            ));
        }
        Ok(())
    }

    /// Number of rows to skip for this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let total_pages = if params.per_page == 0 {
            0
        } else {
            total.div_ceil(u64::from(params.per_page))
        };
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }
}
