//! Movie models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

/// Movie with its vote counts derived from the vote ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub hates: i64,
}

/// New movie creation payload
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    /// Stamped by the server, never taken from the client
    pub created_at: DateTime<Utc>,
}

/// Request for movie creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Ordering of movie listings, always descending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MovieSort {
    #[default]
    Date,
    Likes,
    Hates,
}

impl MovieSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieSort::Date => "date",
            MovieSort::Likes => "likes",
            MovieSort::Hates => "hates",
        }
    }
}

impl fmt::Display for MovieSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected `sort_by` value
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported sort key '{0}', expected one of: date, likes, hates")]
pub struct UnknownSortKey(pub String);

impl FromStr for MovieSort {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(MovieSort::Date),
            "likes" => Ok(MovieSort::Likes),
            "hates" => Ok(MovieSort::Hates),
            other => Err(UnknownSortKey(other.to_string())),
        }
    }
}

/// Offset/limit window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Page number (1-based)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Listing criteria handed to the movie repository
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub sort: MovieSort,
    /// Restrict the listing to the movies of one owner
    pub owner_username: Option<String>,
    pub page: Page,
}

/// Query parameters for movie listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieQuery {
    /// One of `date`, `likes`, `hates`
    pub sort_by: Option<String>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

impl MovieQuery {
    pub fn sort(&self) -> Result<MovieSort, UnknownSortKey> {
        self.sort_by
            .as_deref()
            .map(MovieSort::from_str)
            .unwrap_or(Ok(MovieSort::Date))
    }

    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

/// Response for movie listing with pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieListResponse {
    pub items: Vec<Movie>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}
