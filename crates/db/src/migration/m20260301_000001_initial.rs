//! Initial database migration.
//!
//! Creates one Postgres schema per module with all tables, constraints, and
//! indexes. Statuses are lower-snake text checked by the domain enums.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: SCHEMAS
        // ============================================================
        db.execute_unprepared(SCHEMAS_SQL).await?;

        // ============================================================
        // PART 2: SYSTEM CORE
        // ============================================================
        db.execute_unprepared(SYSTEM_SQL).await?;

        // ============================================================
        // PART 3: FINANCE
        // ============================================================
        db.execute_unprepared(FINANCE_SQL).await?;

        // ============================================================
        // PART 4: CRM
        // ============================================================
        db.execute_unprepared(CRM_SQL).await?;

        // ============================================================
        // PART 5: SALES
        // ============================================================
        db.execute_unprepared(SALES_SQL).await?;

        // ============================================================
        // PART 6: PROCUREMENT
        // ============================================================
        db.execute_unprepared(PROCUREMENT_SQL).await?;

        // ============================================================
        // PART 7: HR
        // ============================================================
        db.execute_unprepared(HR_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const SCHEMAS_SQL: &str = r"
CREATE SCHEMA IF NOT EXISTS system;
CREATE SCHEMA IF NOT EXISTS finance;
CREATE SCHEMA IF NOT EXISTS crm;
CREATE SCHEMA IF NOT EXISTS sales;
CREATE SCHEMA IF NOT EXISTS procurement;
CREATE SCHEMA IF NOT EXISTS hr;
";

const SYSTEM_SQL: &str = r"
CREATE TABLE system.tenants (
    id UUID PRIMARY KEY,
    code VARCHAR(32) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    base_currency CHAR(3) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE TABLE system.users (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    email VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    last_login_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE UNIQUE INDEX idx_users_tenant_email ON system.users(tenant_id, email) WHERE NOT is_deleted;

CREATE TABLE system.roles (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    is_system BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE UNIQUE INDEX idx_roles_tenant_name ON system.roles(tenant_id, name) WHERE NOT is_deleted;

CREATE TABLE system.permissions (
    id UUID PRIMARY KEY,
    code VARCHAR(150) NOT NULL UNIQUE,
    description TEXT NOT NULL
);

CREATE TABLE system.role_permissions (
    role_id UUID NOT NULL REFERENCES system.roles(id) ON DELETE CASCADE,
    permission_id UUID NOT NULL REFERENCES system.permissions(id) ON DELETE CASCADE,
    PRIMARY KEY (role_id, permission_id)
);

CREATE TABLE system.user_roles (
    user_id UUID NOT NULL REFERENCES system.users(id) ON DELETE CASCADE,
    role_id UUID NOT NULL REFERENCES system.roles(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, role_id)
);

CREATE TABLE system.user_sessions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES system.users(id) ON DELETE CASCADE,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    refresh_token_hash CHAR(64) NOT NULL UNIQUE,
    user_agent TEXT,
    ip_address VARCHAR(64),
    expires_at TIMESTAMPTZ NOT NULL,
    revoked_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_user_sessions_user ON system.user_sessions(user_id) WHERE revoked_at IS NULL;

CREATE TABLE system.queued_jobs (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    job_type VARCHAR(100) NOT NULL,
    payload JSONB NOT NULL DEFAULT '{}'::jsonb,
    status VARCHAR(20) NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 0,
    max_attempts INTEGER NOT NULL DEFAULT 3,
    last_error TEXT,
    run_after TIMESTAMPTZ NOT NULL DEFAULT now(),
    started_at TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_job_attempts CHECK (attempts >= 0 AND attempts <= max_attempts)
);

CREATE INDEX idx_queued_jobs_due ON system.queued_jobs(run_after) WHERE status = 'pending';

CREATE TABLE system.number_sequences (
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    prefix VARCHAR(16) NOT NULL,
    next_value BIGINT NOT NULL DEFAULT 1,
    PRIMARY KEY (tenant_id, prefix)
);
";

const FINANCE_SQL: &str = r"
CREATE TABLE finance.accounts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type VARCHAR(20) NOT NULL,
    parent_id UUID REFERENCES finance.accounts(id),
    is_active BOOLEAN NOT NULL DEFAULT true,
    allow_posting BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE UNIQUE INDEX idx_accounts_tenant_code ON finance.accounts(tenant_id, code) WHERE NOT is_deleted;

CREATE TABLE finance.fiscal_years (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status VARCHAR(20) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_fiscal_year_dates CHECK (end_date > start_date)
);

CREATE INDEX idx_fiscal_years_tenant ON finance.fiscal_years(tenant_id, start_date);

CREATE TABLE finance.fiscal_periods (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    fiscal_year_id UUID NOT NULL REFERENCES finance.fiscal_years(id) ON DELETE CASCADE,
    period_number INTEGER NOT NULL,
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status VARCHAR(20) NOT NULL,
    closed_at TIMESTAMPTZ,
    closed_by UUID,
    UNIQUE (fiscal_year_id, period_number)
);

CREATE INDEX idx_fiscal_periods_dates ON finance.fiscal_periods(tenant_id, start_date, end_date);

CREATE TABLE finance.exchange_rates (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    from_currency CHAR(3) NOT NULL,
    to_currency CHAR(3) NOT NULL,
    rate NUMERIC(19, 10) NOT NULL,
    effective_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_rate_positive CHECK (rate > 0),
    CONSTRAINT chk_different_currencies CHECK (from_currency <> to_currency)
);

CREATE INDEX idx_exchange_rates_lookup
    ON finance.exchange_rates(tenant_id, from_currency, to_currency, effective_date DESC);

CREATE TABLE finance.journal_entries (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    entry_date DATE NOT NULL,
    fiscal_period_id UUID NOT NULL REFERENCES finance.fiscal_periods(id),
    description TEXT NOT NULL,
    reference VARCHAR(100),
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL,
    status VARCHAR(20) NOT NULL,
    total_debit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_credit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    posted_at TIMESTAMPTZ,
    posted_by UUID,
    voided_at TIMESTAMPTZ,
    voided_by UUID,
    void_reason TEXT,
    reversal_of UUID REFERENCES finance.journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    UNIQUE (tenant_id, number)
);

CREATE TABLE finance.journal_lines (
    id UUID PRIMARY KEY,
    journal_entry_id UUID NOT NULL REFERENCES finance.journal_entries(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES finance.accounts(id),
    description TEXT,
    debit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    CONSTRAINT chk_one_side CHECK ((debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0)),
    UNIQUE (journal_entry_id, line_no)
);

CREATE TABLE finance.tax_rules (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    rate NUMERIC(7, 4) NOT NULL,
    lower_limit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    upper_limit NUMERIC(19, 2) NOT NULL DEFAULT 999999999999.99,
    effective_from DATE NOT NULL,
    effective_to DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_tax_limits CHECK (upper_limit > lower_limit)
);

CREATE TABLE finance.cheques (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(50) NOT NULL,
    direction VARCHAR(20) NOT NULL,
    partner_id UUID NOT NULL,
    bank_account_id UUID NOT NULL REFERENCES finance.accounts(id),
    amount NUMERIC(19, 2) NOT NULL,
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    status VARCHAR(20) NOT NULL,
    cleared_at TIMESTAMPTZ,
    bounced_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_cheque_amount CHECK (amount > 0)
);

CREATE TABLE finance.credit_notes (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    partner_id UUID NOT NULL,
    invoice_id UUID,
    amount NUMERIC(19, 2) NOT NULL,
    applied_amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    reason TEXT NOT NULL,
    status VARCHAR(20) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_credit_applied CHECK (applied_amount >= 0 AND applied_amount <= amount),
    UNIQUE (tenant_id, number)
);
";

const CRM_SQL: &str = r"
CREATE TABLE crm.business_partners (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_customer BOOLEAN NOT NULL,
    is_supplier BOOLEAN NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    tax_number VARCHAR(50),
    credit_limit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_partner_role CHECK (is_customer OR is_supplier)
);

CREATE UNIQUE INDEX idx_partners_tenant_code ON crm.business_partners(tenant_id, code) WHERE NOT is_deleted;

CREATE TABLE crm.leads (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    company VARCHAR(255),
    email VARCHAR(255),
    phone VARCHAR(50),
    source VARCHAR(100),
    status VARCHAR(20) NOT NULL,
    disqualified_reason TEXT,
    converted_opportunity_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE TABLE crm.opportunities (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    partner_id UUID REFERENCES crm.business_partners(id),
    lead_id UUID REFERENCES crm.leads(id),
    stage VARCHAR(20) NOT NULL,
    estimated_value NUMERIC(19, 2) NOT NULL DEFAULT 0,
    probability NUMERIC(5, 2) NOT NULL,
    weighted_value NUMERIC(19, 2) NOT NULL DEFAULT 0,
    expected_close_date DATE,
    currency CHAR(3) NOT NULL,
    closed_at TIMESTAMPTZ,
    lost_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_probability CHECK (probability >= 0 AND probability <= 100)
);
";

const SALES_SQL: &str = r"
CREATE TABLE sales.quotes (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    partner_id UUID NOT NULL REFERENCES crm.business_partners(id),
    quote_date DATE NOT NULL,
    valid_until DATE NOT NULL,
    status VARCHAR(20) NOT NULL,
    notes TEXT,
    converted_order_id UUID,
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL,
    subtotal NUMERIC(19, 2) NOT NULL DEFAULT 0,
    discount_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    tax_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    base_grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_quote_validity CHECK (valid_until >= quote_date),
    UNIQUE (tenant_id, number)
);

CREATE TABLE sales.orders (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    partner_id UUID NOT NULL REFERENCES crm.business_partners(id),
    order_date DATE NOT NULL,
    quote_id UUID REFERENCES sales.quotes(id),
    status VARCHAR(20) NOT NULL,
    notes TEXT,
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL,
    subtotal NUMERIC(19, 2) NOT NULL DEFAULT 0,
    discount_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    tax_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    base_grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    UNIQUE (tenant_id, number)
);

CREATE TABLE sales.invoices (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    partner_id UUID NOT NULL REFERENCES crm.business_partners(id),
    order_id UUID REFERENCES sales.orders(id),
    invoice_date DATE NOT NULL,
    due_date DATE NOT NULL,
    amount_paid NUMERIC(19, 2) NOT NULL DEFAULT 0,
    status VARCHAR(20) NOT NULL,
    notes TEXT,
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL,
    subtotal NUMERIC(19, 2) NOT NULL DEFAULT 0,
    discount_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    tax_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    base_grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_invoice_paid CHECK (amount_paid >= 0 AND amount_paid <= grand_total),
    UNIQUE (tenant_id, number)
);

CREATE TABLE sales.shipments (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    order_id UUID NOT NULL REFERENCES sales.orders(id),
    partner_id UUID NOT NULL REFERENCES crm.business_partners(id),
    carrier VARCHAR(100),
    tracking_number VARCHAR(100),
    status VARCHAR(20) NOT NULL,
    shipped_at TIMESTAMPTZ,
    delivered_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    UNIQUE (tenant_id, number)
);

CREATE TABLE sales.returns (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    invoice_id UUID NOT NULL REFERENCES sales.invoices(id),
    partner_id UUID NOT NULL REFERENCES crm.business_partners(id),
    reason TEXT NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    status VARCHAR(20) NOT NULL,
    approved_at TIMESTAMPTZ,
    received_at TIMESTAMPTZ,
    refunded_at TIMESTAMPTZ,
    rejection_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_return_amount CHECK (amount > 0),
    UNIQUE (tenant_id, number)
);

CREATE TABLE sales.commission_rules (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    salesperson_id UUID REFERENCES system.users(id),
    min_amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    max_amount NUMERIC(19, 2),
    rate_percent NUMERIC(7, 4) NOT NULL,
    flat_amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    priority INTEGER NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    effective_from DATE NOT NULL,
    effective_to DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE TABLE sales.document_lines (
    id UUID PRIMARY KEY,
    document_type VARCHAR(30) NOT NULL,
    document_id UUID NOT NULL,
    line_no INTEGER NOT NULL,
    item_code VARCHAR(100) NOT NULL,
    description TEXT,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    discount_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    tax_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    delivered_quantity NUMERIC(19, 4) NOT NULL DEFAULT 0,
    CONSTRAINT chk_sales_line_qty CHECK (quantity > 0),
    UNIQUE (document_type, document_id, line_no)
);
";

const PROCUREMENT_SQL: &str = r"
CREATE TABLE procurement.purchase_quotes (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    supplier_id UUID NOT NULL REFERENCES crm.business_partners(id),
    quote_date DATE NOT NULL,
    valid_until DATE NOT NULL,
    status VARCHAR(20) NOT NULL,
    notes TEXT,
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL,
    subtotal NUMERIC(19, 2) NOT NULL DEFAULT 0,
    discount_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    tax_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    base_grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    UNIQUE (tenant_id, number)
);

CREATE TABLE procurement.purchase_orders (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    supplier_id UUID NOT NULL REFERENCES crm.business_partners(id),
    order_date DATE NOT NULL,
    expected_date DATE,
    purchase_quote_id UUID REFERENCES procurement.purchase_quotes(id),
    status VARCHAR(20) NOT NULL,
    approved_at TIMESTAMPTZ,
    approved_by UUID,
    notes TEXT,
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL,
    subtotal NUMERIC(19, 2) NOT NULL DEFAULT 0,
    discount_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    tax_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    base_grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    UNIQUE (tenant_id, number)
);

CREATE TABLE procurement.goods_receipts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    purchase_order_id UUID NOT NULL REFERENCES procurement.purchase_orders(id),
    receipt_date DATE NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    UNIQUE (tenant_id, number)
);

CREATE TABLE procurement.goods_receipt_lines (
    id UUID PRIMARY KEY,
    goods_receipt_id UUID NOT NULL REFERENCES procurement.goods_receipts(id) ON DELETE CASCADE,
    po_line_id UUID NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    CONSTRAINT chk_receipt_qty CHECK (quantity > 0)
);

CREATE TABLE procurement.supplier_bills (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    supplier_id UUID NOT NULL REFERENCES crm.business_partners(id),
    purchase_order_id UUID REFERENCES procurement.purchase_orders(id),
    supplier_reference VARCHAR(100),
    bill_date DATE NOT NULL,
    due_date DATE NOT NULL,
    amount_paid NUMERIC(19, 2) NOT NULL DEFAULT 0,
    status VARCHAR(20) NOT NULL,
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL,
    subtotal NUMERIC(19, 2) NOT NULL DEFAULT 0,
    discount_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    tax_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    base_grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_bill_paid CHECK (amount_paid >= 0 AND amount_paid <= grand_total),
    UNIQUE (tenant_id, number)
);

CREATE TABLE procurement.document_lines (
    id UUID PRIMARY KEY,
    document_type VARCHAR(30) NOT NULL,
    document_id UUID NOT NULL,
    line_no INTEGER NOT NULL,
    item_code VARCHAR(100) NOT NULL,
    description TEXT,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    discount_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    tax_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    delivered_quantity NUMERIC(19, 4) NOT NULL DEFAULT 0,
    CONSTRAINT chk_procurement_line_qty CHECK (quantity > 0),
    CONSTRAINT chk_procurement_line_received CHECK (delivered_quantity <= quantity),
    UNIQUE (document_type, document_id, line_no)
);
";

const HR_SQL: &str = r"
CREATE TABLE hr.employees (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    code VARCHAR(50) NOT NULL,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    email VARCHAR(255),
    hire_date DATE NOT NULL,
    base_salary NUMERIC(19, 2) NOT NULL DEFAULT 0,
    monthly_allowance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    status VARCHAR(20) NOT NULL,
    termination_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE UNIQUE INDEX idx_employees_tenant_code ON hr.employees(tenant_id, code) WHERE NOT is_deleted;

CREATE TABLE hr.leave_types (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(100) NOT NULL,
    is_paid BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE TABLE hr.leave_allocations (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    employee_id UUID NOT NULL REFERENCES hr.employees(id),
    leave_type_id UUID NOT NULL REFERENCES hr.leave_types(id),
    year INTEGER NOT NULL,
    total_days_allocated NUMERIC(7, 2) NOT NULL,
    days_used NUMERIC(7, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_leave_balance CHECK (days_used >= 0 AND days_used <= total_days_allocated)
);

CREATE TABLE hr.leave_requests (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    employee_id UUID NOT NULL REFERENCES hr.employees(id),
    allocation_id UUID NOT NULL REFERENCES hr.leave_allocations(id),
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    days NUMERIC(7, 2) NOT NULL,
    reason TEXT,
    status VARCHAR(20) NOT NULL,
    rejection_reason TEXT,
    decided_at TIMESTAMPTZ,
    decided_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_leave_dates CHECK (end_date >= start_date)
);

CREATE TABLE hr.social_security_rates (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    employee_rate NUMERIC(7, 4) NOT NULL,
    employer_rate NUMERIC(7, 4) NOT NULL,
    wage_ceiling NUMERIC(19, 2),
    effective_from DATE NOT NULL,
    effective_to DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false
);

CREATE TABLE hr.payrolls (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES system.tenants(id) ON DELETE CASCADE,
    number VARCHAR(32) NOT NULL,
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    pay_date DATE NOT NULL,
    status VARCHAR(20) NOT NULL,
    total_gross NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_deductions NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_net NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_employer_cost NUMERIC(19, 2) NOT NULL DEFAULT 0,
    notes TEXT,
    calculated_at TIMESTAMPTZ,
    approved_at TIMESTAMPTZ,
    approved_by UUID,
    paid_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_payroll_period CHECK (period_start < period_end),
    UNIQUE (tenant_id, number)
);

CREATE TABLE hr.payroll_entries (
    id UUID PRIMARY KEY,
    payroll_id UUID NOT NULL REFERENCES hr.payrolls(id) ON DELETE CASCADE,
    employee_id UUID NOT NULL REFERENCES hr.employees(id),
    gross_pay NUMERIC(19, 2) NOT NULL,
    total_deductions NUMERIC(19, 2) NOT NULL,
    net_pay NUMERIC(19, 2) NOT NULL,
    employer_contribution NUMERIC(19, 2) NOT NULL,
    UNIQUE (payroll_id, employee_id)
);

CREATE TABLE hr.payroll_entry_details (
    id UUID PRIMARY KEY,
    payroll_entry_id UUID NOT NULL REFERENCES hr.payroll_entries(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    kind VARCHAR(30) NOT NULL,
    code VARCHAR(50) NOT NULL,
    description TEXT NOT NULL,
    amount NUMERIC(19, 2) NOT NULL
);
";

const DROP_ALL_SQL: &str = r"
DROP SCHEMA IF EXISTS hr CASCADE;
DROP SCHEMA IF EXISTS procurement CASCADE;
DROP SCHEMA IF EXISTS sales CASCADE;
DROP SCHEMA IF EXISTS crm CASCADE;
DROP SCHEMA IF EXISTS finance CASCADE;
DROP SCHEMA IF EXISTS system CASCADE;
";
