pub mod auth;
pub mod history;
pub mod import_export;
pub mod investments;
pub mod portfolio;
pub mod system;
pub mod transactions;
