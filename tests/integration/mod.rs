//! Integration tests for the folder synchronization system

mod binary;
mod sync_properties;
mod sync_scenarios;
