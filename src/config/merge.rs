//! Merge policy and service for layered configuration

pub mod merge_policy;
pub mod service;
