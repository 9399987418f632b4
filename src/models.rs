pub mod commission;
pub mod ledger;
pub mod outlet;
pub mod period;
pub mod pricing;
pub mod reporting;
pub mod stock;
