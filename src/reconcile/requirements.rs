//! Per-site category requirement gate

use std::collections::HashMap;

use crate::models::{CategoryRequirement, SiteId};

use super::normalize::category_key;

/// Answers whether new records of a category may be added at one site.
///
/// A category without a rule is allowed. Only an explicit `required = false`
/// rule forbids insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementGate {
    site: SiteId,
    rules: HashMap<String, CategoryRequirement>,
}

impl RequirementGate {
    /// A gate that knows no rules and therefore allows every category
    pub fn permissive(site: SiteId) -> Self {
        Self {
            site,
            rules: HashMap::new(),
        }
    }

    /// Index the rules for `site`; rows for other sites are ignored.
    ///
    /// When two rows normalize to the same category key the later row wins.
    pub fn build(site: SiteId, rows: Vec<CategoryRequirement>) -> Self {
        let mut rules = HashMap::with_capacity(rows.len());
        for row in rows {
            if row.site_id != site {
                tracing::warn!(
                    "Ignoring requirement for site {} while building gate for {}",
                    row.site_id,
                    site
                );
                continue;
            }
            let key = category_key(&row.category);
            if key.is_empty() {
                continue;
            }
            rules.insert(key, row);
        }
        tracing::debug!(site = %site, rules = rules.len(), "Requirement gate built");
        Self { site, rules }
    }

    pub fn site(&self) -> &SiteId {
        &self.site
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn requirement_for(&self, category: &str) -> Option<&CategoryRequirement> {
        self.rules.get(&category_key(category))
    }

    pub fn is_allowed(&self, category: &str) -> bool {
        self.requirement_for(category)
            .map(|r| r.required)
            .unwrap_or(true)
    }

    /// Human-readable reason a new record in `category` is refused, if it is
    pub fn rejection_reason(&self, category: &str) -> Option<String> {
        let rule = self.requirement_for(category).filter(|r| !r.required)?;
        let mut reason = format!(
            "Category '{}' is not required at site {}; new records cannot be added",
            category.trim(),
            self.site
        );
        if let Some(text) = rule.rule_text.as_deref().filter(|t| !t.trim().is_empty()) {
            reason.push_str(&format!(". Rule: {}", text.trim()));
        }
        if let Some(note) = rule.parse_note.as_deref().filter(|t| !t.trim().is_empty()) {
            reason.push_str(&format!(". Note: {}", note.trim()));
        }
        Some(reason)
    }
}
