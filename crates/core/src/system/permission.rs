//! Permission codes and the global catalogue.
//!
//! Codes take the form `module.resource.action`. Grants may also be the
//! module wildcard `module.*` or the global wildcard `*`.

use std::collections::BTreeSet;

use tessera_shared::auth::{WILDCARD_PERMISSION, permission_grants};

use crate::error::{DomainError, DomainResult};

/// Every permission the application checks, with a description.
pub const PERMISSION_CATALOG: &[(&str, &str)] = &[
    ("*", "Full access to every module"),
    ("system.*", "Full access to system administration"),
    ("system.users.read", "View users"),
    ("system.users.create", "Create users"),
    ("system.users.update", "Update users and their roles"),
    ("system.users.delete", "Delete users"),
    ("system.roles.read", "View roles"),
    ("system.roles.create", "Create roles"),
    ("system.roles.update", "Update roles and their permissions"),
    ("system.roles.delete", "Delete roles"),
    ("system.permissions.read", "View the permission catalogue"),
    ("system.tenant.read", "View tenant settings"),
    ("system.tenant.update", "Update tenant settings"),
    ("system.jobs.read", "View background jobs"),
    ("system.jobs.create", "Enqueue background jobs"),
    ("system.jobs.retry", "Retry failed background jobs"),
    ("finance.*", "Full access to finance"),
    ("finance.accounts.read", "View the chart of accounts"),
    ("finance.accounts.create", "Create accounts"),
    ("finance.accounts.update", "Update accounts"),
    ("finance.fiscal_years.read", "View fiscal years and periods"),
    ("finance.fiscal_years.create", "Create fiscal years"),
    ("finance.fiscal_years.close", "Close and reopen fiscal periods and years"),
    ("finance.exchange_rates.read", "View exchange rates"),
    ("finance.exchange_rates.create", "Create exchange rates"),
    ("finance.journal_entries.read", "View journal entries"),
    ("finance.journal_entries.create", "Create journal entries"),
    ("finance.journal_entries.update", "Edit draft journal entries"),
    ("finance.journal_entries.delete", "Delete draft journal entries"),
    ("finance.journal_entries.post", "Post journal entries"),
    ("finance.journal_entries.void", "Void posted journal entries"),
    ("finance.tax_rules.read", "View tax rules"),
    ("finance.tax_rules.create", "Create tax rules"),
    ("finance.tax_rules.update", "Update tax rules"),
    ("finance.tax_rules.delete", "Delete tax rules"),
    ("finance.cheques.read", "View cheques"),
    ("finance.cheques.create", "Register cheques"),
    ("finance.cheques.update", "Deposit, clear, bounce, or cancel cheques"),
    ("finance.credit_notes.read", "View credit notes"),
    ("finance.credit_notes.create", "Create credit notes"),
    ("finance.credit_notes.update", "Issue, apply, or cancel credit notes"),
    ("crm.*", "Full access to CRM"),
    ("crm.partners.read", "View business partners"),
    ("crm.partners.create", "Create business partners"),
    ("crm.partners.update", "Update business partners"),
    ("crm.partners.delete", "Delete business partners"),
    ("crm.leads.read", "View leads"),
    ("crm.leads.create", "Create leads"),
    ("crm.leads.update", "Progress leads"),
    ("crm.leads.convert", "Convert leads to opportunities"),
    ("crm.opportunities.read", "View opportunities"),
    ("crm.opportunities.create", "Create opportunities"),
    ("crm.opportunities.update", "Update opportunity stages"),
    ("sales.*", "Full access to sales"),
    ("sales.quotes.read", "View sales quotes"),
    ("sales.quotes.create", "Create sales quotes"),
    ("sales.quotes.update", "Edit and progress sales quotes"),
    ("sales.quotes.convert", "Convert accepted quotes to orders"),
    ("sales.orders.read", "View sales orders"),
    ("sales.orders.create", "Create sales orders"),
    ("sales.orders.update", "Edit and progress sales orders"),
    ("sales.invoices.read", "View sales invoices"),
    ("sales.invoices.create", "Create sales invoices"),
    ("sales.invoices.update", "Edit and issue sales invoices"),
    ("sales.invoices.record_payment", "Record customer payments"),
    ("sales.shipments.read", "View shipments"),
    ("sales.shipments.create", "Create shipments"),
    ("sales.shipments.update", "Pack, ship, deliver, or cancel shipments"),
    ("sales.returns.read", "View sales returns"),
    ("sales.returns.create", "Request sales returns"),
    ("sales.returns.approve", "Approve or reject sales returns"),
    ("sales.returns.update", "Receive and refund sales returns"),
    ("sales.commission_rules.read", "View commission rules"),
    ("sales.commission_rules.create", "Create commission rules"),
    ("sales.commission_rules.update", "Update commission rules"),
    ("sales.commission_rules.delete", "Delete commission rules"),
    ("procurement.*", "Full access to procurement"),
    ("procurement.quotes.read", "View purchase quotes"),
    ("procurement.quotes.create", "Create purchase quotes"),
    ("procurement.quotes.update", "Edit and progress purchase quotes"),
    ("procurement.orders.read", "View purchase orders"),
    ("procurement.orders.create", "Create purchase orders"),
    ("procurement.orders.update", "Edit and progress purchase orders"),
    ("procurement.orders.approve", "Approve purchase orders"),
    ("procurement.receipts.read", "View goods receipts"),
    ("procurement.receipts.create", "Receive goods"),
    ("procurement.bills.read", "View supplier bills"),
    ("procurement.bills.create", "Create supplier bills"),
    ("procurement.bills.update", "Edit, approve, or cancel supplier bills"),
    ("procurement.bills.record_payment", "Record supplier payments"),
    ("hr.*", "Full access to HR"),
    ("hr.employees.read", "View employees"),
    ("hr.employees.create", "Create employees"),
    ("hr.employees.update", "Update employees"),
    ("hr.leave.read", "View leave types, allocations, and requests"),
    ("hr.leave.create", "Create leave types, allocations, and requests"),
    ("hr.leave.update", "Adjust allocations and cancel requests"),
    ("hr.leave.approve", "Approve or reject leave requests"),
    ("hr.social_security.read", "View social security rates"),
    ("hr.social_security.create", "Create social security rates"),
    ("hr.social_security.update", "Update social security rates"),
    ("hr.payrolls.read", "View payrolls"),
    ("hr.payrolls.create", "Create payrolls"),
    ("hr.payrolls.calculate", "Calculate payrolls"),
    ("hr.payrolls.approve", "Approve payrolls"),
    ("hr.payrolls.pay", "Mark payrolls as paid"),
    ("hr.payrolls.cancel", "Cancel payrolls"),
];

/// Validates the shape of a permission code.
///
/// # Errors
///
/// Returns a validation error unless the code is `*`, `module.*`, or three
/// lower-case dot-separated segments.
pub fn validate_permission_code(code: &str) -> DomainResult<()> {
    if code == WILDCARD_PERMISSION {
        return Ok(());
    }
    let segments: Vec<&str> = code.split('.').collect();
    let valid_segment = |s: &&str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    };
    let ok = match segments.as_slice() {
        [module, "*"] => valid_segment(module),
        [_, _, _] => segments.iter().all(valid_segment),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "Invalid permission code '{code}'"
        )))
    }
}

/// The effective permissions of a user (union over their roles).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    /// Returns true if any granted code covers `code`.
    #[must_use]
    pub fn grants(&self, code: &str) -> bool {
        self.0.iter().any(|granted| permission_grants(granted, code))
    }

    /// Returns the codes in sorted order.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

impl FromIterator<String> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_catalog_codes_are_valid_and_unique() {
        let mut seen = BTreeSet::new();
        for (code, _) in PERMISSION_CATALOG {
            validate_permission_code(code).unwrap();
            assert!(seen.insert(*code), "duplicate permission {code}");
        }
    }

    #[rstest]
    #[case("*", true)]
    #[case("finance.*", true)]
    #[case("finance.journal_entries.post", true)]
    #[case("Finance.accounts.read", false)]
    #[case("finance.accounts", false)]
    #[case("finance..read", false)]
    #[case("a.b.c.d", false)]
    #[case("", false)]
    fn test_validate_permission_code(#[case] code: &str, #[case] valid: bool) {
        assert_eq!(validate_permission_code(code).is_ok(), valid);
    }

    #[test]
    fn test_permission_set_grants() {
        let set: PermissionSet = ["sales.*".to_string(), "hr.employees.read".to_string()]
            .into_iter()
            .collect();
        assert!(set.grants("sales.returns.approve"));
        assert!(set.grants("hr.employees.read"));
        assert!(!set.grants("hr.employees.update"));

        let admin: PermissionSet = std::iter::once("*".to_string()).collect();
        assert!(admin.grants("finance.journal_entries.void"));
    }

    #[test]
    fn test_into_vec_is_sorted_and_deduplicated() {
        let set: PermissionSet = ["b.c.d", "a.b.c", "b.c.d"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(set.into_vec(), vec!["a.b.c".to_string(), "b.c.d".to_string()]);
    }
}
