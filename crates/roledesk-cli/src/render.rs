//! Plain-text rendering of catalog and role views.

use roledesk::PermissionCatalog;
use roledesk::RoleTemplateEngine;
use roledesk_models::{CategorySummary, Permission, PermissionCategory, PermissionId, Role};
use std::collections::BTreeSet;
use std::fmt::Write;

/// One permission as a checklist line.
pub fn permission_line(permission: &Permission, selected: bool) -> String {
    let mark = if selected { "[x]" } else { "[ ]" };
    if permission.description.is_empty() {
        format!("{mark} {}", permission.name)
    } else {
        format!("{mark} {} - {}", permission.name, permission.description)
    }
}

/// Grouped permissions, one heading per category.
///
/// With `selected` set, every line carries a checkbox.
pub fn render_catalog(
    groups: &[PermissionCategory],
    selected: Option<&BTreeSet<PermissionId>>,
) -> String {
    if groups.is_empty() {
        return "No permissions match.\n".to_string();
    }

    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{} ({})", group.category, group.len());
        for permission in &group.permissions {
            let line = match selected {
                Some(ids) => permission_line(permission, ids.contains(&permission.id)),
                None if permission.description.is_empty() => permission.name.clone(),
                None => format!("{} - {}", permission.name, permission.description),
            };
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

pub fn render_summary(summary: &[CategorySummary]) -> String {
    let mut out = String::new();
    for entry in summary {
        let marker = if entry.is_complete() {
            "●"
        } else if entry.is_partial() {
            "◐"
        } else {
            "○"
        };
        let _ = writeln!(
            out,
            "  {marker} {:<20} {}/{}",
            entry.category, entry.selected, entry.total
        );
    }
    out
}

pub fn role_label(role: &Role, active: bool) -> String {
    let pointer = if active { "▸" } else { " " };
    format!(
        "{pointer} {} ({} permissions)",
        role.name,
        role.permission_ids.len()
    )
}

/// Template list with the number of catalog permissions each one resolves to.
pub fn render_templates(engine: &RoleTemplateEngine, catalog: &PermissionCatalog) -> String {
    let mut out = String::new();
    for template in engine.templates() {
        let count = RoleTemplateEngine::resolve(template, catalog.all())
            .map(|ids| ids.len().to_string())
            .unwrap_or_else(|e| format!("error: {e}"));
        let _ = writeln!(
            out,
            "{} {:<16} {:>3} permissions  {}",
            template.icon.glyph(),
            template.name,
            count,
            template.description
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledesk_models::RoleId;

    fn catalog() -> PermissionCatalog {
        PermissionCatalog::from_permissions(vec![
            Permission::new(1, "labs:view", "labs", "View lab results"),
            Permission::new(2, "labs:order", "labs", ""),
        ])
    }

    #[test]
    fn test_render_catalog_with_checkboxes() {
        let selected = BTreeSet::from([PermissionId::new(1)]);
        let out = render_catalog(catalog().grouped(), Some(&selected));
        assert!(out.starts_with("labs (2)\n"));
        assert!(out.contains("  [x] labs:view - View lab results\n"));
        assert!(out.contains("  [ ] labs:order\n"));
    }

    #[test]
    fn test_render_catalog_empty() {
        assert_eq!(render_catalog(&[], None), "No permissions match.\n");
    }

    #[test]
    fn test_summary_markers() {
        let catalog = catalog();
        let partial = catalog.category_summary(&BTreeSet::from([PermissionId::new(2)]));
        assert!(render_summary(&partial).contains("◐"));

        let complete = catalog.category_summary(catalog.ids());
        assert!(render_summary(&complete).contains("2/2"));
    }

    #[test]
    fn test_role_label() {
        let role = Role {
            id: RoleId::new(1),
            name: "Nurse".into(),
            description: String::new(),
            permission_ids: BTreeSet::from([PermissionId::new(1)]),
        };
        assert_eq!(role_label(&role, true), "▸ Nurse (1 permissions)");
    }

    #[test]
    fn test_render_templates_lists_builtins() {
        let out = render_templates(&RoleTemplateEngine::builtin(), &catalog());
        assert!(out.contains("Lab Technician"));
        assert_eq!(out.lines().count(), RoleTemplateEngine::builtin().templates().len());
    }
}
