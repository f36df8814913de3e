// src/handlers/mod.rs
pub mod company;
pub mod error;
pub mod history;
pub mod valuation;
