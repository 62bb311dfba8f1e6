//! Mention protocol for lead chat messages
//!
//! Chat bodies embed lead references inline as `@[<leadId>:<leadName>]`.
//! This crate is the single place that produces and consumes that grammar:
//! - [`parse`] splits a body into text runs and mention references
//! - [`MentionToken`] validates and encodes a reference
//! - [`render_display`] turns a body into human-readable text for previews
//!
//! Parsing never fails: anything that is not a complete token is plain text.

pub mod parser;
pub mod token;

pub use parser::{mentions, parse, render_display, Segment, Segments};
pub use token::{MentionError, MentionToken, TOKEN_PREFIX, TOKEN_SUFFIX};
