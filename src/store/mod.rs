pub mod portfolios;

pub use portfolios::PortfolioStore;
