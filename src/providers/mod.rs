pub mod hg_finance;

pub use hg_finance::HgFinanceProvider;
