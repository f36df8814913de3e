// src/services/mod.rs
pub mod cost_of_capital;
pub mod growth;
pub mod history;
pub mod peers;
pub mod provider;
pub mod recommendation;
pub mod research;
pub mod retry;
pub mod universe;
pub mod valuation;
pub mod yahoo;
