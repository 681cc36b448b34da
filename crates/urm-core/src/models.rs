//! Domain models for URM.
//!
//! These are the core types shared across all crates.

pub mod action;
pub mod company;
pub mod company_group;
pub mod department;
pub mod employee;
pub mod grant;
pub mod group;
pub mod permission;
pub mod position;
pub mod process;
pub mod session;
pub mod user;
