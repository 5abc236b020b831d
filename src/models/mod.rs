// src/models/mod.rs

//! Domain models for the blog data layer.
//!
//! This module contains all data structures used throughout the application,
//! organized by the backend that owns them.

mod config;
mod content;
mod engagement;

// Re-export all public types
pub use config::{
    CdnConfig, Config, ContentConfig, EngagementConfig, HttpConfig, RevalidationConfig, env,
};
pub use content::{
    Article, Author, Category, ContentResponse, FormatSize, Media, MediaFormat, MediaFormats,
    Meta, Pagination,
};
pub use engagement::{Comment, Like, NewComment, NewLike, ViewCount};
