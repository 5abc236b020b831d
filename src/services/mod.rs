//! Service layer for the blog data layer.
//!
//! This module contains the backend clients:
//! - Content reads and search (`ContentClient`)
//! - Comments, likes and view counts (`EngagementClient`)
//! - The failure policy both apply (`FailurePolicy`)

mod content;
mod engagement;
mod policy;

pub use content::{ContentClient, DEFAULT_FEATURED_LIMIT, SEARCH_PAGE_SIZE};
pub use engagement::EngagementClient;
pub use policy::FailurePolicy;
