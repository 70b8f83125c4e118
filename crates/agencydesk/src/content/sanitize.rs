//! Rich text sanitizer.
//!
//! Editor output is HTML. Before it is stored, an ordered list of regex rules
//! removes markup that would run script in a visitor's browser.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};

/// Upper bound on full passes over the rule list in strip mode.
const MAX_STRIP_PASSES: usize = 16;

/// Matches a single opening or self-closing tag.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[a-zA-Z][^>]*>").expect("valid tag regex"));

/// What the sanitizer does with unsafe markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizeMode {
    /// Remove offending markup and keep the rest.
    #[default]
    Strip,
    /// Refuse the write.
    Reject,
}

/// Where a rule looks for matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Anywhere in the document.
    Document,
    /// Only inside the angle brackets of a tag.
    InsideTags,
}

/// One compiled sanitizer rule.
#[derive(Debug)]
pub struct SanitizeRule {
    /// Rule name, reported when the rule fires.
    pub name: &'static str,

    /// What the rule removes.
    pub description: &'static str,

    /// Where the rule applies.
    pub scope: RuleScope,

    regex: Regex,
}

impl SanitizeRule {
    /// Compile a rule.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(
        name: &'static str,
        description: &'static str,
        scope: RuleScope,
        pattern: &str,
    ) -> Self {
        Self {
            name,
            description,
            scope,
            regex: Regex::new(pattern).expect("Invalid sanitizer pattern"),
        }
    }

    /// Whether the rule matches anywhere it applies.
    #[must_use]
    pub fn matches(&self, html: &str) -> bool {
        match self.scope {
            RuleScope::Document => self.regex.is_match(html),
            RuleScope::InsideTags => TAG_RE
                .find_iter(html)
                .any(|tag| self.regex.is_match(tag.as_str())),
        }
    }

    /// Remove every match. Returns `None` when nothing matched.
    #[must_use]
    pub fn strip(&self, html: &str) -> Option<String> {
        match self.scope {
            RuleScope::Document => {
                if self.regex.is_match(html) {
                    Some(self.regex.replace_all(html, "").into_owned())
                } else {
                    None
                }
            }
            RuleScope::InsideTags => {
                let mut fired = false;
                let out = TAG_RE.replace_all(html, |caps: &Captures<'_>| {
                    let tag = &caps[0];
                    if self.regex.is_match(tag) {
                        fired = true;
                        self.regex.replace_all(tag, "").into_owned()
                    } else {
                        tag.to_string()
                    }
                });
                fired.then(|| out.into_owned())
            }
        }
    }
}

/// Paired element removed along with everything between its tags.
///
/// An unclosed opening tag swallows the rest of the document.
fn block_pattern(tag: &str) -> String {
    format!(r"(?is)<{tag}\b[^>]*>.*?(?:</{tag}\s*>|\z)|</{tag}\s*>")
}

/// The built-in rule list, in application order.
#[must_use]
pub fn builtin_rules() -> Vec<SanitizeRule> {
    vec![
        SanitizeRule::new(
            "script_block",
            "<script> elements and their contents",
            RuleScope::Document,
            &block_pattern("script"),
        ),
        SanitizeRule::new(
            "style_block",
            "<style> elements and their contents",
            RuleScope::Document,
            &block_pattern("style"),
        ),
        SanitizeRule::new(
            "iframe_block",
            "<iframe> elements and their contents",
            RuleScope::Document,
            &block_pattern("iframe"),
        ),
        SanitizeRule::new(
            "object_block",
            "<object> elements and their contents",
            RuleScope::Document,
            &block_pattern("object"),
        ),
        SanitizeRule::new(
            "embed_tag",
            "<embed> tags",
            RuleScope::Document,
            r"(?i)</?embed\b[^>]*>",
        ),
        SanitizeRule::new(
            "event_handler",
            "Inline on* event handler attributes",
            RuleScope::InsideTags,
            r#"(?i)[\s/]+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#,
        ),
        SanitizeRule::new(
            "script_url",
            "Attributes whose value is a javascript: or vbscript: URL",
            RuleScope::InsideTags,
            r#"(?i)[\s/]+[a-z][a-z0-9:_-]*\s*=\s*(?:"\s*(?:javascript|vbscript):[^"]*"|'\s*(?:javascript|vbscript):[^']*'|(?:javascript|vbscript):[^\s>]*)"#,
        ),
    ]
}

/// Output of a successful sanitize pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// Cleaned HTML.
    pub html: String,
    /// Names of the rules that removed something, in firing order.
    pub removed: Vec<&'static str>,
}

impl Sanitized {
    /// Whether the input was already clean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Rule-based HTML sanitizer.
#[derive(Debug)]
pub struct HtmlSanitizer {
    mode: SanitizeMode,
    rules: Vec<SanitizeRule>,
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new(SanitizeMode::default())
    }
}

impl HtmlSanitizer {
    /// Create a sanitizer with the built-in rules.
    #[must_use]
    pub fn new(mode: SanitizeMode) -> Self {
        Self {
            mode,
            rules: builtin_rules(),
        }
    }

    /// The configured mode.
    #[must_use]
    pub fn mode(&self) -> SanitizeMode {
        self.mode
    }

    /// The active rules.
    #[must_use]
    pub fn rules(&self) -> &[SanitizeRule] {
        &self.rules
    }

    /// Clean `html` according to the configured mode.
    ///
    /// # Errors
    ///
    /// In [`SanitizeMode::Reject`], returns [`Error::ContentRejected`] naming
    /// the first rule that matched. In [`SanitizeMode::Strip`], returns the
    /// same error if markup is still unsafe once stripping settles.
    pub fn sanitize(&self, html: &str) -> Result<Sanitized> {
        match self.mode {
            SanitizeMode::Strip => self.strip(html),
            SanitizeMode::Reject => {
                if let Some(rule) = self.first_match(html) {
                    debug!(rule = rule.name, "Content rejected by sanitizer rule");
                    return Err(Error::ContentRejected {
                        rule: rule.name.to_string(),
                    });
                }
                Ok(Sanitized {
                    html: html.to_string(),
                    removed: Vec::new(),
                })
            }
        }
    }

    fn first_match(&self, html: &str) -> Option<&SanitizeRule> {
        self.rules.iter().find(|r| r.matches(html))
    }

    /// Apply every rule until a full pass removes nothing.
    ///
    /// Removing one match can splice the surrounding text into new markup
    /// (`<scr<script></script>ipt>`), so a single pass is not enough.
    fn strip(&self, html: &str) -> Result<Sanitized> {
        let mut current = html.to_string();
        let mut removed = Vec::new();

        for _ in 0..MAX_STRIP_PASSES {
            let mut changed = false;
            for rule in &self.rules {
                if let Some(next) = rule.strip(&current) {
                    trace!(rule = rule.name, "Sanitizer rule removed markup");
                    current = next;
                    changed = true;
                    if !removed.contains(&rule.name) {
                        removed.push(rule.name);
                    }
                }
            }
            if !changed {
                break;
            }
        }

        if let Some(rule) = self.first_match(&current) {
            warn!(rule = rule.name, "Markup still unsafe after stripping");
            return Err(Error::ContentRejected {
                rule: rule.name.to_string(),
            });
        }

        if !removed.is_empty() {
            debug!(rules = ?removed, "Stripped unsafe markup");
        }
        Ok(Sanitized {
            html: current,
            removed,
        })
    }
}
