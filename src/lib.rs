//! Hamper
//!
//! Hamper is a market basket analysis library: it turns a transaction log into
//! a transaction × item presence matrix, mines frequent itemsets and
//! association rules, and answers "what is bought together with X?" queries.

pub mod analysis;
pub mod basket;
pub mod cache;
pub mod config;
pub mod error;
pub mod itemsets;
pub mod loader;
pub mod miners;
pub mod observability;
pub mod prelude;
pub mod report;
pub mod rules;
pub mod transactions;
