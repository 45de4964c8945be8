//! Default permission catalog.
//!
//! Backends seed their permission table from [`DEFAULT_CATALOG`] when it is
//! empty. Names follow the `category:action` convention; the category half is
//! repeated explicitly so grouping never depends on parsing the name.
//!
//! # Example
//!
//! ```ignore
//! use roledesk_core::permissions;
//!
//! for entry in permissions::DEFAULT_CATALOG {
//!     println!("{} ({})", entry.name, entry.category);
//! }
//! ```

/// A seedable permission definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSeed {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

const fn seed(
    name: &'static str,
    category: &'static str,
    description: &'static str,
) -> PermissionSeed {
    PermissionSeed {
        name,
        category,
        description,
    }
}

// =============================================================================
// Categories
// =============================================================================

pub const CATEGORY_PATIENTS: &str = "patients";
pub const CATEGORY_APPOINTMENTS: &str = "appointments";
pub const CATEGORY_MEDICAL_RECORDS: &str = "medical_records";
pub const CATEGORY_PRESCRIPTIONS: &str = "prescriptions";
pub const CATEGORY_LABS: &str = "labs";
pub const CATEGORY_PHARMACY: &str = "pharmacy";
pub const CATEGORY_BILLING: &str = "billing";
pub const CATEGORY_REPORTS: &str = "reports";
pub const CATEGORY_USERS: &str = "users";
pub const CATEGORY_ROLES: &str = "roles";
pub const CATEGORY_SETTINGS: &str = "settings";

// =============================================================================
// Patients permissions
// =============================================================================

/// Permission to view patient demographics
pub const PATIENTS_VIEW: &str = "patients:view";
/// Permission to register patients
pub const PATIENTS_CREATE: &str = "patients:create";
/// Permission to edit patient demographics
pub const PATIENTS_EDIT: &str = "patients:edit";
/// Permission to archive patients
pub const PATIENTS_DELETE: &str = "patients:delete";

// =============================================================================
// Appointments permissions
// =============================================================================

/// Permission to view the schedule
pub const APPOINTMENTS_VIEW: &str = "appointments:view";
/// Permission to book appointments
pub const APPOINTMENTS_CREATE: &str = "appointments:create";
/// Permission to reschedule or cancel appointments
pub const APPOINTMENTS_EDIT: &str = "appointments:edit";

// =============================================================================
// Medical records permissions
// =============================================================================

/// Permission to read clinical notes
pub const RECORDS_VIEW: &str = "medical_records:view";
/// Permission to write clinical notes
pub const RECORDS_EDIT: &str = "medical_records:edit";
/// Permission to sign off clinical notes
pub const RECORDS_SIGN: &str = "medical_records:sign";

// =============================================================================
// Prescriptions permissions
// =============================================================================

/// Permission to view prescriptions
pub const PRESCRIPTIONS_VIEW: &str = "prescriptions:view";
/// Permission to issue prescriptions
pub const PRESCRIPTIONS_CREATE: &str = "prescriptions:create";
/// Permission to cancel prescriptions
pub const PRESCRIPTIONS_CANCEL: &str = "prescriptions:cancel";

// =============================================================================
// Labs permissions
// =============================================================================

/// Permission to view lab results
pub const LABS_VIEW: &str = "labs:view";
/// Permission to order lab tests
pub const LABS_ORDER: &str = "labs:order";
/// Permission to enter lab results
pub const LABS_RESULT: &str = "labs:result";

// =============================================================================
// Pharmacy permissions
// =============================================================================

/// Permission to view pharmacy stock
pub const PHARMACY_VIEW: &str = "pharmacy:view";
/// Permission to dispense medication
pub const PHARMACY_DISPENSE: &str = "pharmacy:dispense";
/// Permission to adjust stock levels
pub const PHARMACY_STOCK: &str = "pharmacy:stock";

// =============================================================================
// Billing permissions
// =============================================================================

/// Permission to view invoices
pub const BILLING_VIEW: &str = "billing:view";
/// Permission to raise invoices
pub const BILLING_CREATE: &str = "billing:create";
/// Permission to record payments and refunds
pub const BILLING_PAYMENTS: &str = "billing:payments";

// =============================================================================
// Reports permissions
// =============================================================================

/// Permission to view reports
pub const REPORTS_VIEW: &str = "reports:view";
/// Permission to export reports
pub const REPORTS_EXPORT: &str = "reports:export";

// =============================================================================
// Users permissions
// =============================================================================

/// Permission to view staff accounts
pub const USERS_VIEW: &str = "users:view";
/// Permission to create and edit staff accounts
pub const USERS_MANAGE: &str = "users:manage";

// =============================================================================
// Roles permissions
// =============================================================================

/// Permission to view roles
pub const ROLES_VIEW: &str = "roles:view";
/// Permission to create and edit roles
pub const ROLES_MANAGE: &str = "roles:manage";
/// Permission to assign roles to users
pub const ROLES_ASSIGN: &str = "roles:assign";

// =============================================================================
// Settings permissions
// =============================================================================

/// Permission to read settings
pub const SETTINGS_VIEW: &str = "settings:view";
/// Permission to update settings
pub const SETTINGS_UPDATE: &str = "settings:update";

/// The seed catalog, in display order.
pub const DEFAULT_CATALOG: &[PermissionSeed] = &[
    seed(PATIENTS_VIEW, CATEGORY_PATIENTS, "View patient demographics"),
    seed(PATIENTS_CREATE, CATEGORY_PATIENTS, "Register new patients"),
    seed(PATIENTS_EDIT, CATEGORY_PATIENTS, "Edit patient demographics"),
    seed(PATIENTS_DELETE, CATEGORY_PATIENTS, "Archive patient records"),
    seed(APPOINTMENTS_VIEW, CATEGORY_APPOINTMENTS, "View the appointment schedule"),
    seed(APPOINTMENTS_CREATE, CATEGORY_APPOINTMENTS, "Book appointments"),
    seed(APPOINTMENTS_EDIT, CATEGORY_APPOINTMENTS, "Reschedule or cancel appointments"),
    seed(RECORDS_VIEW, CATEGORY_MEDICAL_RECORDS, "Read clinical notes"),
    seed(RECORDS_EDIT, CATEGORY_MEDICAL_RECORDS, "Write clinical notes"),
    seed(RECORDS_SIGN, CATEGORY_MEDICAL_RECORDS, "Sign off clinical notes"),
    seed(PRESCRIPTIONS_VIEW, CATEGORY_PRESCRIPTIONS, "View prescriptions"),
    seed(PRESCRIPTIONS_CREATE, CATEGORY_PRESCRIPTIONS, "Issue prescriptions"),
    seed(PRESCRIPTIONS_CANCEL, CATEGORY_PRESCRIPTIONS, "Cancel prescriptions"),
    seed(LABS_VIEW, CATEGORY_LABS, "View lab results"),
    seed(LABS_ORDER, CATEGORY_LABS, "Order lab tests"),
    seed(LABS_RESULT, CATEGORY_LABS, "Enter lab results"),
    seed(PHARMACY_VIEW, CATEGORY_PHARMACY, "View pharmacy stock"),
    seed(PHARMACY_DISPENSE, CATEGORY_PHARMACY, "Dispense medication"),
    seed(PHARMACY_STOCK, CATEGORY_PHARMACY, "Adjust stock levels"),
    seed(BILLING_VIEW, CATEGORY_BILLING, "View invoices"),
    seed(BILLING_CREATE, CATEGORY_BILLING, "Raise invoices"),
    seed(BILLING_PAYMENTS, CATEGORY_BILLING, "Record payments and refunds"),
    seed(REPORTS_VIEW, CATEGORY_REPORTS, "View reports"),
    seed(REPORTS_EXPORT, CATEGORY_REPORTS, "Export reports"),
    seed(USERS_VIEW, CATEGORY_USERS, "View staff accounts"),
    seed(USERS_MANAGE, CATEGORY_USERS, "Create and edit staff accounts"),
    seed(ROLES_VIEW, CATEGORY_ROLES, "View roles"),
    seed(ROLES_MANAGE, CATEGORY_ROLES, "Create and edit roles"),
    seed(ROLES_ASSIGN, CATEGORY_ROLES, "Assign roles to users"),
    seed(SETTINGS_VIEW, CATEGORY_SETTINGS, "Read system settings"),
    seed(SETTINGS_UPDATE, CATEGORY_SETTINGS, "Update system settings"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_catalog_names_are_unique() {
        let names: HashSet<_> = DEFAULT_CATALOG.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), DEFAULT_CATALOG.len());
    }

    #[test]
    fn test_default_catalog_names_carry_their_category() {
        for entry in DEFAULT_CATALOG {
            assert!(
                entry.name.starts_with(&format!("{}:", entry.category)),
                "{} is not prefixed by {}",
                entry.name,
                entry.category
            );
        }
    }
}
