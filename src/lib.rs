//! Paynow Gateway - Paynow V3 payment gateway adapter
//!
//! Signs outbound API requests, verifies inbound notifications, and maps
//! Paynow payment statuses onto an orchestrator's payment lifecycle.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
