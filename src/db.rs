pub mod commission_repo;
pub mod ledger_repo;
pub mod outlet_repo;
pub mod period_repo;
pub mod pricing_repo;
pub mod stock_repo;

pub use commission_repo::CommissionRepository;
pub use ledger_repo::LedgerRepository;
pub use outlet_repo::OutletRepository;
pub use period_repo::PeriodRepository;
pub use pricing_repo::PricingRepository;
pub use stock_repo::StockRepository;
