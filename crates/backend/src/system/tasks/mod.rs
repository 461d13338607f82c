pub mod builtin;
pub mod context;
pub mod contract;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod initialization;
pub mod options;
pub mod registry;
pub mod repository;
pub mod schedule;
pub mod service;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;
