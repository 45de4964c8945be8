//! Role templates.
//!
//! A template is static, in-process configuration: a name, a description, an
//! icon and a list of matcher rules. Resolving a template against the
//! permission catalog yields the initial permission set of a new role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a template, e.g. `"physician"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Icon shown next to a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateIcon {
    Shield,
    Stethoscope,
    HeartPulse,
    Pill,
    FlaskConical,
    ClipboardList,
    Receipt,
    UserCog,
}

impl TemplateIcon {
    /// Short glyph for terminal output.
    pub fn glyph(self) -> &'static str {
        match self {
            TemplateIcon::Shield => "🛡",
            TemplateIcon::Stethoscope => "🩺",
            TemplateIcon::HeartPulse => "💓",
            TemplateIcon::Pill => "💊",
            TemplateIcon::FlaskConical => "🧪",
            TemplateIcon::ClipboardList => "📋",
            TemplateIcon::Receipt => "🧾",
            TemplateIcon::UserCog => "⚙",
        }
    }
}

/// A rule selecting permissions from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PermissionMatcher {
    /// Every permission whose category equals the value, ignoring case.
    Category(String),
    /// Every permission whose name matches the glob, ignoring case.
    /// `*` matches any run of characters, e.g. `"*:view"`.
    NamePattern(String),
}

impl PermissionMatcher {
    pub fn category(name: impl Into<String>) -> Self {
        Self::Category(name.into())
    }

    pub fn name_pattern(pattern: impl Into<String>) -> Self {
        Self::NamePattern(pattern.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTemplate {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub icon: TemplateIcon,
    pub matchers: Vec<PermissionMatcher>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_serialization_shape() {
        let json = serde_json::to_string(&PermissionMatcher::category("labs")).unwrap();
        assert_eq!(json, r#"{"kind":"category","value":"labs"}"#);

        let parsed: PermissionMatcher =
            serde_json::from_str(r#"{"kind":"name_pattern","value":"*:view"}"#).unwrap();
        assert_eq!(parsed, PermissionMatcher::name_pattern("*:view"));
    }

    #[test]
    fn test_unknown_icon_is_rejected() {
        let result: Result<TemplateIcon, _> = serde_json::from_str(r#""rocket""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_template_id_display() {
        assert_eq!(TemplateId::new("nurse").to_string(), "nurse");
    }
}
