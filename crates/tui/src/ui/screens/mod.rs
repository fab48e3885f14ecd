pub mod dashboard;
pub mod login;
pub mod overlays;
pub mod transactions;
