//! Step resolution and static site build for ragwalk.
//!
//! Maps a step id and locale to localized content, a demo handle and
//! previous/next navigation, and renders every catalog step to disk.
//! [`assembler::PageAssembler`] is the entry point for single pages,
//! [`pipeline::build_site`] for whole builds.

pub mod assembler;
pub mod catalog;
pub mod content;
pub mod locale;
pub mod navigation;
pub mod pipeline;
pub mod routes;
