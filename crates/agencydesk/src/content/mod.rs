//! Rich text handling for the editor.
//!
//! - **Sanitizing**: [`HtmlSanitizer`] removes script-bearing markup from
//!   editor HTML, or rejects it outright in [`SanitizeMode::Reject`].
//!
//! - **Derived text**: slugs, plain-text excerpts, reading time and tag
//!   normalization.
//!
//! # Example
//!
//! ```
//! use agencydesk::content::{excerpt, slugify, HtmlSanitizer, SanitizeMode};
//!
//! let sanitizer = HtmlSanitizer::new(SanitizeMode::Strip);
//! let clean = sanitizer
//!     .sanitize("<p onclick=\"steal()\">Launch day</p>")
//!     .unwrap();
//! assert_eq!(clean.html, "<p>Launch day</p>");
//!
//! assert_eq!(slugify("Launch Day!"), "launch-day");
//! assert_eq!(excerpt(&clean.html, 200), "Launch day");
//! ```

mod sanitize;
mod text;

pub use sanitize::{builtin_rules, HtmlSanitizer, RuleScope, SanitizeMode, SanitizeRule, Sanitized};
pub use text::{
    excerpt, normalize_tags, reading_minutes, slugify, strip_tags, unique_slug, word_count,
    EMPTY_SLUG,
};
