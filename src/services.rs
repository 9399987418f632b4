pub mod commission_service;
pub mod compute;
pub mod ledger_service;
pub mod period_service;
pub mod reporting_service;
pub mod stock_service;

pub use commission_service::CommissionService;
pub use ledger_service::LedgerService;
pub use period_service::PeriodService;
pub use reporting_service::ReportingService;
pub use stock_service::StockService;
