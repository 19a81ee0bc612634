//! Customers and suppliers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;

/// A customer, a supplier, or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPartner {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Upper-case partner code.
    pub code: String,
    /// Legal or trading name.
    pub name: String,
    /// Can appear on sales documents.
    pub is_customer: bool,
    /// Can appear on purchase documents.
    pub is_supplier: bool,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Tax registration number.
    pub tax_number: Option<String>,
    /// Maximum open receivable.
    pub credit_limit: Decimal,
    /// Inactive partners cannot be used on new documents.
    pub is_active: bool,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating or updating a partner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInput {
    /// Partner code.
    pub code: String,
    /// Name.
    pub name: String,
    /// Customer flag.
    #[serde(default)]
    pub is_customer: bool,
    /// Supplier flag.
    #[serde(default)]
    pub is_supplier: bool,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Tax number.
    pub tax_number: Option<String>,
    /// Credit limit.
    #[serde(default)]
    pub credit_limit: Decimal,
}

struct ValidPartner {
    code: String,
    name: String,
    credit_limit: Decimal,
}

fn validate(input: &PartnerInput) -> DomainResult<ValidPartner> {
    if !input.is_customer && !input.is_supplier {
        return Err(DomainError::validation(
            "partner must be a customer, a supplier, or both",
        ));
    }
    Ok(ValidPartner {
        code: guard::code("code", &input.code)?,
        name: guard::required("name", &input.name)?,
        credit_limit: guard::non_negative("credit limit", input.credit_limit)?,
    })
}

impl BusinessPartner {
    /// Creates an active partner.
    ///
    /// # Errors
    ///
    /// Fails when neither role is set, the code or name is empty, or the
    /// credit limit is negative.
    pub fn create(tenant_id: Uuid, input: PartnerInput, actor: Option<Uuid>) -> DomainResult<Self> {
        let valid = validate(&input)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            code: valid.code,
            name: valid.name,
            is_customer: input.is_customer,
            is_supplier: input.is_supplier,
            email: guard::optional(input.email).map(|e| e.to_lowercase()),
            phone: guard::optional(input.phone),
            tax_number: guard::optional(input.tax_number),
            credit_limit: valid.credit_limit,
            is_active: true,
            audit: AuditInfo::new(actor),
        })
    }

    /// Updates the partner.
    ///
    /// # Errors
    ///
    /// Same rules as [`BusinessPartner::create`]; state is unchanged on failure.
    pub fn update(&mut self, input: PartnerInput, actor: Option<Uuid>) -> DomainResult<()> {
        let valid = validate(&input)?;
        self.code = valid.code;
        self.name = valid.name;
        self.is_customer = input.is_customer;
        self.is_supplier = input.is_supplier;
        self.email = guard::optional(input.email).map(|e| e.to_lowercase());
        self.phone = guard::optional(input.phone);
        self.tax_number = guard::optional(input.tax_number);
        self.credit_limit = valid.credit_limit;
        self.audit.touch(actor);
        Ok(())
    }

    /// Deactivates the partner.
    pub fn deactivate(&mut self, actor: Option<Uuid>) {
        self.is_active = false;
        self.audit.touch(actor);
    }

    /// Reactivates the partner.
    pub fn activate(&mut self, actor: Option<Uuid>) {
        self.is_active = true;
        self.audit.touch(actor);
    }

    /// Fails unless the partner can be used as a customer.
    ///
    /// # Errors
    ///
    /// Returns an invalid-operation error for inactive or non-customer partners.
    pub fn ensure_customer(&self) -> DomainResult<()> {
        if !self.is_active || !self.is_customer {
            return Err(DomainError::invalid(format!(
                "Partner {} is not an active customer",
                self.code
            )));
        }
        Ok(())
    }

    /// Fails unless the partner can be used as a supplier.
    ///
    /// # Errors
    ///
    /// Returns an invalid-operation error for inactive or non-supplier partners.
    pub fn ensure_supplier(&self) -> DomainResult<()> {
        if !self.is_active || !self.is_supplier {
            return Err(DomainError::invalid(format!(
                "Partner {} is not an active supplier",
                self.code
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(is_customer: bool, is_supplier: bool) -> PartnerInput {
        PartnerInput {
            code: "c-001".to_string(),
            name: "Contoso".to_string(),
            is_customer,
            is_supplier,
            email: Some("Sales@Contoso.com".to_string()),
            phone: None,
            tax_number: Some(" ".to_string()),
            credit_limit: dec!(10000),
        }
    }

    #[test]
    fn test_create_uppercases_code() {
        let partner = BusinessPartner::create(Uuid::new_v4(), input(true, false), None).unwrap();
        assert_eq!(partner.code, "C-001");
        assert_eq!(partner.email.as_deref(), Some("sales@contoso.com"));
        assert!(partner.tax_number.is_none());
        assert!(partner.ensure_customer().is_ok());
        assert!(partner.ensure_supplier().is_err());
    }

    #[test]
    fn test_create_requires_a_role() {
        let err = BusinessPartner::create(Uuid::new_v4(), input(false, false), None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_negative_credit_limit_rejected() {
        let mut i = input(true, true);
        i.credit_limit = dec!(-1);
        assert!(BusinessPartner::create(Uuid::new_v4(), i, None).is_err());
    }

    #[test]
    fn test_update_and_deactivate() {
        let mut partner = BusinessPartner::create(Uuid::new_v4(), input(true, false), None).unwrap();
        assert!(partner.update(input(false, false), None).is_err());
        assert!(partner.is_customer);
        partner.update(input(false, true), None).unwrap();
        assert!(partner.is_supplier && !partner.is_customer);
        partner.deactivate(None);
        assert!(partner.ensure_supplier().is_err());
        partner.activate(None);
        assert!(partner.ensure_supplier().is_ok());
    }
}
