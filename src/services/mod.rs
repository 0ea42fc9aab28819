pub mod investments;
pub mod market_data;
pub mod portfolio;
pub mod portfolio_csv;
pub mod transactions;
pub mod users;
