//! Services built on top of the repositories.
//!
//! `content` resolves library references into displayable content and
//! `search` holds the tag and fuzzy matching helpers the repositories share.

pub mod content;
pub mod search;
