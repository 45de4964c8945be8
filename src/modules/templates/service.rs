use regex::{Regex, RegexBuilder};
use roledesk_core::EditorError;
use roledesk_models::{Permission, PermissionId, PermissionMatcher, RoleTemplate, TemplateId};
use std::collections::BTreeSet;
use tracing::debug;

use super::builtin::builtin_templates;

/// Holds the template set and resolves templates against a catalog.
#[derive(Debug, Clone)]
pub struct RoleTemplateEngine {
    templates: Vec<RoleTemplate>,
}

impl Default for RoleTemplateEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RoleTemplateEngine {
    pub fn new(templates: Vec<RoleTemplate>) -> Self {
        Self { templates }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_templates())
    }

    pub fn templates(&self) -> &[RoleTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &TemplateId) -> Option<&RoleTemplate> {
        self.templates.iter().find(|t| &t.id == id)
    }

    /// Union of the permissions matched by each of the template's matchers.
    ///
    /// The result is a set, so it does not depend on matcher order or on the
    /// order of `all`.
    pub fn resolve(
        template: &RoleTemplate,
        all: &[Permission],
    ) -> Result<BTreeSet<PermissionId>, EditorError> {
        let mut resolved = BTreeSet::new();
        for matcher in &template.matchers {
            match matcher {
                PermissionMatcher::Category(category) => resolved.extend(
                    all.iter()
                        .filter(|p| p.category.eq_ignore_ascii_case(category))
                        .map(|p| p.id),
                ),
                PermissionMatcher::NamePattern(pattern) => {
                    let glob = compile_glob(pattern)?;
                    resolved.extend(all.iter().filter(|p| glob.is_match(&p.name)).map(|p| p.id));
                }
            }
        }

        debug!(
            template = %template.id,
            resolved = resolved.len(),
            "Template resolved"
        );
        Ok(resolved)
    }
}

/// Compiles a `*` glob into an anchored, case-insensitive regex.
fn compile_glob(pattern: &str) -> Result<Regex, EditorError> {
    let source = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|e| EditorError::InvariantViolation(format!("bad name pattern {pattern:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledesk_models::TemplateIcon;

    fn catalog() -> Vec<Permission> {
        vec![
            Permission::new(1, "labs:view", "labs", ""),
            Permission::new(2, "labs:order", "labs", ""),
            Permission::new(3, "patients:view", "patients", ""),
            Permission::new(4, "billing:view", "Billing", ""),
        ]
    }

    fn template(matchers: Vec<PermissionMatcher>) -> RoleTemplate {
        RoleTemplate {
            id: TemplateId::new("t"),
            name: "T".into(),
            description: String::new(),
            icon: TemplateIcon::Shield,
            matchers,
        }
    }

    fn ids(raw: &[i64]) -> BTreeSet<PermissionId> {
        raw.iter().copied().map(PermissionId::new).collect()
    }

    #[test]
    fn test_category_match_ignores_case() {
        let t = template(vec![PermissionMatcher::category("billing")]);
        assert_eq!(RoleTemplateEngine::resolve(&t, &catalog()).unwrap(), ids(&[4]));
    }

    #[test]
    fn test_name_pattern_globs() {
        let t = template(vec![PermissionMatcher::name_pattern("*:VIEW")]);
        assert_eq!(RoleTemplateEngine::resolve(&t, &catalog()).unwrap(), ids(&[1, 3, 4]));
    }

    #[test]
    fn test_name_pattern_is_anchored_and_literal() {
        let t = template(vec![PermissionMatcher::name_pattern("labs")]);
        assert!(RoleTemplateEngine::resolve(&t, &catalog()).unwrap().is_empty());

        let dotted = template(vec![PermissionMatcher::name_pattern("labs.view")]);
        assert!(RoleTemplateEngine::resolve(&dotted, &catalog()).unwrap().is_empty());
    }

    #[test]
    fn test_overlapping_matchers_union() {
        let t = template(vec![
            PermissionMatcher::category("labs"),
            PermissionMatcher::name_pattern("labs:view"),
        ]);
        assert_eq!(RoleTemplateEngine::resolve(&t, &catalog()).unwrap(), ids(&[1, 2]));
    }

    #[test]
    fn test_engine_lookup() {
        let engine = RoleTemplateEngine::builtin();
        assert!(engine.get(&TemplateId::new("nurse")).is_some());
        assert!(engine.get(&TemplateId::new("astronaut")).is_none());
    }
}
