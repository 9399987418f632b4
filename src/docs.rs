// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Stock ---
        handlers::stock::submit_supply,
        handlers::stock::submit_closing,

        // --- Ledger ---
        handlers::ledger::post_deposit,
        handlers::ledger::set_deposit_status,
        handlers::ledger::post_expense,
        handlers::ledger::payment_callback,

        // --- Periods ---
        handlers::periods::rotate_period,
        handlers::periods::lock_period,
        handlers::periods::get_period_state,

        // --- Reports ---
        handlers::reports::get_header_totals,
        handlers::reports::get_commissions,

        // --- Admin ---
        handlers::admin::create_outlet,
        handlers::admin::create_item,
        handlers::admin::create_supervisor,
    ),
    components(
        schemas(
            // --- Outlets ---
            models::outlet::Outlet,
            models::outlet::Supervisor,

            // --- Stock ---
            models::stock::Item,
            models::stock::OpeningRow,
            models::stock::ClosingRow,

            // --- Ledger ---
            models::ledger::DepositStatus,
            models::ledger::Deposit,
            models::ledger::Expense,
            models::ledger::PaymentStatus,
            models::ledger::ExternalPayment,

            // --- Pricing ---
            models::pricing::PriceRow,
            models::pricing::PriceUpdate,

            // --- Periods ---
            models::period::PeriodState,
            models::period::PeriodLock,
            models::period::ActivePeriod,
            models::period::SnapshotClosingLine,
            models::period::SnapshotExpenseLine,
            models::period::SnapshotBody,

            // --- Commissions ---
            models::commission::CommissionStatus,
            models::commission::CommissionRecord,

            // --- Reporting ---
            models::reporting::HeaderTotals,
            models::reporting::RotationOutcome,

            // --- Payloads ---
            handlers::stock::SupplyLinePayload,
            handlers::stock::SubmitSupplyPayload,
            handlers::stock::SubmitClosingPayload,
            handlers::ledger::PostDepositPayload,
            handlers::ledger::SetDepositStatusPayload,
            handlers::ledger::PostExpensePayload,
            handlers::ledger::PaymentCallbackPayload,
            handlers::ledger::PaymentRecorded,
            handlers::periods::RotatePayload,
            handlers::periods::LockPayload,
            handlers::periods::PeriodStateResponse,
            handlers::admin::CreateOutletPayload,
            handlers::admin::CreateItemPayload,
            handlers::admin::CreateSupervisorPayload,
        )
    ),
    tags(
        (name = "Stock", description = "Daily supply and closing submissions"),
        (name = "Ledger", description = "Deposits, expenses and external payments"),
        (name = "Periods", description = "Trading period state, locking and end-of-day rotation"),
        (name = "Reports", description = "Reconciliation header and commission reports"),
        (name = "Admin", description = "Outlet, item and supervisor setup")
    )
)]
pub struct ApiDoc;
