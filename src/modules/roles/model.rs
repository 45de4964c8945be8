use roledesk_core::EditorError;
use roledesk_models::{CreateRoleDto, PermissionId, RoleTemplate, TemplateId};
use std::collections::BTreeSet;

use crate::modules::catalog::PermissionCatalog;
use crate::modules::templates::RoleTemplateEngine;

/// The create-role form.
///
/// Applying a template fills every field and links the draft to it. Editing
/// the name or description afterwards turns the draft into a plain custom
/// role; the resolved permissions stay selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDraft {
    name: String,
    description: String,
    permission_ids: BTreeSet<PermissionId>,
    template: Option<TemplateId>,
}

impl RoleDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn from_template(
        template: &RoleTemplate,
        catalog: &PermissionCatalog,
    ) -> Result<Self, EditorError> {
        let mut draft = Self::default();
        draft.apply_template(template, catalog)?;
        Ok(draft)
    }

    /// Replaces the whole draft with the template's values.
    pub fn apply_template(
        &mut self,
        template: &RoleTemplate,
        catalog: &PermissionCatalog,
    ) -> Result<(), EditorError> {
        let resolved = RoleTemplateEngine::resolve(template, catalog.all())?;

        self.name = template.name.clone();
        self.description = template.description.clone();
        self.permission_ids = resolved;
        self.template = Some(template.id.clone());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn permission_ids(&self) -> &BTreeSet<PermissionId> {
        &self.permission_ids
    }

    pub fn template(&self) -> Option<&TemplateId> {
        self.template.as_ref()
    }

    pub fn is_template_derived(&self) -> bool {
        self.template.is_some()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name != self.name {
            self.name = name;
            self.template = None;
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        if description != self.description {
            self.description = description;
            self.template = None;
        }
    }

    pub fn set_permission_ids(&mut self, ids: impl IntoIterator<Item = PermissionId>) {
        self.permission_ids = ids.into_iter().collect();
    }

    pub fn toggle_permission(&mut self, id: PermissionId) -> bool {
        if self.permission_ids.remove(&id) {
            false
        } else {
            self.permission_ids.insert(id)
        }
    }

    pub fn to_dto(&self) -> CreateRoleDto {
        CreateRoleDto::new(
            self.name.clone(),
            self.description.clone(),
            self.permission_ids.iter().copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledesk_models::{Permission, PermissionMatcher, TemplateIcon};

    fn catalog() -> PermissionCatalog {
        PermissionCatalog::from_permissions(vec![
            Permission::new(1, "labs:view", "labs", ""),
            Permission::new(2, "labs:order", "labs", ""),
            Permission::new(3, "billing:view", "billing", ""),
        ])
    }

    fn lab_template() -> RoleTemplate {
        RoleTemplate {
            id: TemplateId::new("lab"),
            name: "Lab Tech".into(),
            description: "Runs the lab".into(),
            icon: TemplateIcon::FlaskConical,
            matchers: vec![PermissionMatcher::category("labs")],
        }
    }

    #[test]
    fn test_apply_template_fills_draft() {
        let draft = RoleDraft::from_template(&lab_template(), &catalog()).unwrap();
        assert_eq!(draft.name(), "Lab Tech");
        assert_eq!(draft.description(), "Runs the lab");
        assert_eq!(draft.permission_ids().len(), 2);
        assert_eq!(draft.template(), Some(&TemplateId::new("lab")));
    }

    #[test]
    fn test_manual_name_edit_unlinks_template_but_keeps_permissions() {
        let mut draft = RoleDraft::from_template(&lab_template(), &catalog()).unwrap();
        draft.set_name("Night Lab Tech");
        assert!(!draft.is_template_derived());
        assert_eq!(draft.permission_ids().len(), 2);
    }

    #[test]
    fn test_setting_same_value_keeps_linkage() {
        let mut draft = RoleDraft::from_template(&lab_template(), &catalog()).unwrap();
        draft.set_name("Lab Tech");
        draft.set_description("Runs the lab");
        assert!(draft.is_template_derived());
    }

    #[test]
    fn test_description_edit_unlinks_template() {
        let mut draft = RoleDraft::from_template(&lab_template(), &catalog()).unwrap();
        draft.set_description("");
        assert!(!draft.is_template_derived());
    }

    #[test]
    fn test_permission_edits_keep_linkage() {
        let mut draft = RoleDraft::from_template(&lab_template(), &catalog()).unwrap();
        assert!(draft.toggle_permission(PermissionId::new(3)));
        assert!(draft.is_template_derived());
    }

    #[test]
    fn test_to_dto() {
        let mut draft = RoleDraft::new("Clerk", "Front office");
        draft.set_permission_ids([PermissionId::new(3)]);
        let dto = draft.to_dto();
        assert_eq!(dto.name, "Clerk");
        assert_eq!(dto.permission_ids, BTreeSet::from([PermissionId::new(3)]));
    }
}
