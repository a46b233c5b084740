//! Initial database migration.
//!
//! Creates master data, line items with monthly allocations, actuals,
//! purchase orders, currency rates and the audit log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: MASTER DATA
        // ============================================================
        db.execute_unprepared(TOWERS_SQL).await?;
        db.execute_unprepared(BUDGET_HEADS_SQL).await?;

        // ============================================================
        // PART 3: BUDGET LINE ITEMS
        // ============================================================
        db.execute_unprepared(LINE_ITEMS_SQL).await?;
        db.execute_unprepared(MONTHLY_ALLOCATIONS_SQL).await?;

        // ============================================================
        // PART 4: ACTUALS
        // ============================================================
        db.execute_unprepared(ACTUALS_SQL).await?;

        // ============================================================
        // PART 5: PURCHASE ORDERS
        // ============================================================
        db.execute_unprepared(PURCHASE_ORDERS_SQL).await?;
        db.execute_unprepared(PO_LINE_ITEMS_SQL).await?;

        // ============================================================
        // PART 6: CURRENCY RATES
        // ============================================================
        db.execute_unprepared(CURRENCY_RATES_SQL).await?;

        // ============================================================
        // PART 7: AUDIT LOG
        // ============================================================
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;
        db.execute_unprepared(AUDIT_IMMUTABLE_SQL).await?;

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

const ENUMS_SQL: &str = r"
CREATE TYPE po_status AS ENUM ('Draft', 'Approved', 'Closed', 'Cancelled');

CREATE TYPE audit_action AS ENUM ('CREATE', 'UPDATE');
";

const TOWERS_SQL: &str = r"
CREATE TABLE towers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const BUDGET_HEADS_SQL: &str = r"
CREATE TABLE budget_heads (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    tower_id UUID REFERENCES towers(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_budget_heads_tower ON budget_heads(tower_id);
";

const LINE_ITEMS_SQL: &str = r"
CREATE TABLE line_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    uid VARCHAR(100) NOT NULL UNIQUE,
    description TEXT NOT NULL,
    fiscal_year INTEGER NOT NULL,
    tower_id UUID NOT NULL REFERENCES towers(id),
    budget_head_id UUID NOT NULL REFERENCES budget_heads(id),
    total_budget NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_line_items_fiscal_year ON line_items(fiscal_year);
CREATE INDEX idx_line_items_tower ON line_items(tower_id);
CREATE INDEX idx_line_items_budget_head ON line_items(budget_head_id);
";

const MONTHLY_ALLOCATIONS_SQL: &str = r"
CREATE TABLE monthly_allocations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    line_item_id UUID NOT NULL REFERENCES line_items(id) ON DELETE CASCADE,
    month CHAR(3) NOT NULL,
    amount NUMERIC(19, 4),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_month_label CHECK (month IN (
        'Jan', 'Feb', 'Mar', 'Apr', 'May', 'Jun',
        'Jul', 'Aug', 'Sep', 'Oct', 'Nov', 'Dec'
    )),
    UNIQUE (line_item_id, month)
);
";

const ACTUALS_SQL: &str = r"
CREATE TABLE actuals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_no VARCHAR(100) NOT NULL,
    invoice_date DATE,
    vendor VARCHAR(255),
    description TEXT,
    amount NUMERIC(19, 4) NOT NULL,
    currency CHAR(3) NOT NULL,
    converted_amount NUMERIC(19, 4),
    month CHAR(3),
    line_item_id UUID REFERENCES line_items(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_actual_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_actuals_line_item ON actuals(line_item_id);
CREATE INDEX idx_actuals_created ON actuals(created_at DESC);
";

const PURCHASE_ORDERS_SQL: &str = r"
CREATE TABLE purchase_orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    po_number VARCHAR(100) NOT NULL UNIQUE,
    po_date DATE NOT NULL,
    vendor VARCHAR(255) NOT NULL,
    currency CHAR(3) NOT NULL,
    po_value NUMERIC(19, 4) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL DEFAULT 1,
    common_currency_value NUMERIC(19, 4) NOT NULL,
    value_in_lac NUMERIC(19, 6) NOT NULL,
    status po_status NOT NULL DEFAULT 'Draft',
    pr_number VARCHAR(100),
    pr_date DATE,
    pr_value NUMERIC(19, 4),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_po_value_non_negative CHECK (po_value >= 0),
    CONSTRAINT chk_po_rate_positive CHECK (exchange_rate > 0)
);

CREATE INDEX idx_purchase_orders_created ON purchase_orders(created_at DESC);
CREATE INDEX idx_purchase_orders_status ON purchase_orders(status);
CREATE INDEX idx_purchase_orders_vendor ON purchase_orders(vendor);
";

const PO_LINE_ITEMS_SQL: &str = r"
CREATE TABLE po_line_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    purchase_order_id UUID NOT NULL REFERENCES purchase_orders(id) ON DELETE CASCADE,
    line_item_id UUID NOT NULL REFERENCES line_items(id),
    allocated_amount NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_allocated_non_negative CHECK (allocated_amount >= 0),
    UNIQUE (purchase_order_id, line_item_id)
);

CREATE INDEX idx_po_line_items_line_item ON po_line_items(line_item_id);
";

const CURRENCY_RATES_SQL: &str = r"
CREATE TABLE currency_rates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    from_currency CHAR(3) NOT NULL,
    to_currency CHAR(3) NOT NULL,
    effective_date DATE NOT NULL,
    rate NUMERIC(19, 10) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_positive CHECK (rate > 0),
    CONSTRAINT chk_different_currencies CHECK (from_currency <> to_currency),
    UNIQUE (from_currency, to_currency, effective_date)
);

CREATE INDEX idx_currency_rates_lookup ON currency_rates(from_currency, to_currency, effective_date DESC);
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entity_type VARCHAR(50) NOT NULL,
    entity_id UUID NOT NULL,
    action audit_action NOT NULL,
    user_id UUID NOT NULL,
    diff JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_logs_entity ON audit_logs(entity_type, entity_id, created_at DESC);
";

const AUDIT_IMMUTABLE_SQL: &str = r"
CREATE OR REPLACE FUNCTION prevent_audit_log_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'audit_logs is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_audit_logs_immutable
    BEFORE UPDATE OR DELETE ON audit_logs
    FOR EACH ROW EXECUTE FUNCTION prevent_audit_log_modification();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TRIGGER IF EXISTS trg_audit_logs_immutable ON audit_logs;
DROP FUNCTION IF EXISTS prevent_audit_log_modification();

DROP TABLE IF EXISTS audit_logs CASCADE;
DROP TABLE IF EXISTS currency_rates CASCADE;
DROP TABLE IF EXISTS po_line_items CASCADE;
DROP TABLE IF EXISTS purchase_orders CASCADE;
DROP TABLE IF EXISTS actuals CASCADE;
DROP TABLE IF EXISTS monthly_allocations CASCADE;
DROP TABLE IF EXISTS line_items CASCADE;
DROP TABLE IF EXISTS budget_heads CASCADE;
DROP TABLE IF EXISTS towers CASCADE;

DROP TYPE IF EXISTS audit_action;
DROP TYPE IF EXISTS po_status;
";
