use roledesk_core::permissions::{
    CATEGORY_APPOINTMENTS, CATEGORY_BILLING, CATEGORY_LABS, CATEGORY_MEDICAL_RECORDS,
    CATEGORY_PATIENTS, CATEGORY_PHARMACY, CATEGORY_PRESCRIPTIONS, LABS_ORDER, PATIENTS_CREATE,
    PATIENTS_EDIT, RECORDS_EDIT, REPORTS_VIEW,
};
use roledesk_models::{PermissionMatcher, RoleTemplate, TemplateIcon, TemplateId};

fn template(
    id: &str,
    name: &str,
    description: &str,
    icon: TemplateIcon,
    matchers: Vec<PermissionMatcher>,
) -> RoleTemplate {
    RoleTemplate {
        id: TemplateId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        icon,
        matchers,
    }
}

/// Templates shipped with the editor, in display order.
pub fn builtin_templates() -> Vec<RoleTemplate> {
    vec![
        template(
            "administrator",
            "Administrator",
            "Full access to every permission",
            TemplateIcon::Shield,
            vec![PermissionMatcher::name_pattern("*")],
        ),
        template(
            "physician",
            "Physician",
            "Diagnoses patients, writes notes and prescriptions, orders labs",
            TemplateIcon::Stethoscope,
            vec![
                PermissionMatcher::category(CATEGORY_PATIENTS),
                PermissionMatcher::category(CATEGORY_MEDICAL_RECORDS),
                PermissionMatcher::category(CATEGORY_PRESCRIPTIONS),
                PermissionMatcher::category(CATEGORY_LABS),
                PermissionMatcher::name_pattern("appointments:*"),
            ],
        ),
        template(
            "nurse",
            "Nurse",
            "Ward care: charting, schedules and lab orders",
            TemplateIcon::HeartPulse,
            vec![
                PermissionMatcher::name_pattern("*:view"),
                PermissionMatcher::name_pattern(PATIENTS_EDIT),
                PermissionMatcher::name_pattern(RECORDS_EDIT),
                PermissionMatcher::name_pattern(LABS_ORDER),
            ],
        ),
        template(
            "pharmacist",
            "Pharmacist",
            "Dispenses medication and manages pharmacy stock",
            TemplateIcon::Pill,
            vec![
                PermissionMatcher::category(CATEGORY_PHARMACY),
                PermissionMatcher::name_pattern("prescriptions:view"),
                PermissionMatcher::name_pattern("patients:view"),
            ],
        ),
        template(
            "lab_technician",
            "Lab Technician",
            "Processes lab orders and enters results",
            TemplateIcon::FlaskConical,
            vec![
                PermissionMatcher::category(CATEGORY_LABS),
                PermissionMatcher::name_pattern("patients:view"),
            ],
        ),
        template(
            "receptionist",
            "Receptionist",
            "Front desk: registration and scheduling",
            TemplateIcon::ClipboardList,
            vec![
                PermissionMatcher::category(CATEGORY_APPOINTMENTS),
                PermissionMatcher::name_pattern("patients:view"),
                PermissionMatcher::name_pattern(PATIENTS_CREATE),
                PermissionMatcher::name_pattern(PATIENTS_EDIT),
            ],
        ),
        template(
            "billing_clerk",
            "Billing Clerk",
            "Invoices, payments and financial reports",
            TemplateIcon::Receipt,
            vec![
                PermissionMatcher::category(CATEGORY_BILLING),
                PermissionMatcher::name_pattern(REPORTS_VIEW),
                PermissionMatcher::name_pattern("patients:view"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledesk_core::permissions::DEFAULT_CATALOG;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_are_unique() {
        let templates = builtin_templates();
        let ids: HashSet<_> = templates.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn test_every_builtin_has_matchers() {
        assert!(builtin_templates().iter().all(|t| !t.matchers.is_empty()));
    }

    #[test]
    fn test_category_matchers_name_default_categories() {
        let known: HashSet<&str> = DEFAULT_CATALOG.iter().map(|s| s.category).collect();
        for template in builtin_templates() {
            for matcher in &template.matchers {
                if let PermissionMatcher::Category(category) = matcher {
                    assert!(known.contains(category.as_str()), "{category} in {}", template.id);
                }
            }
        }
    }
}
