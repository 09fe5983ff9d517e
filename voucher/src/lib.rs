//! Voucher Desk - student lookup and graduation voucher issuing
//!
//! This library implements the core of a graduation-ceremony desk: a debounced
//! incremental search over a student roster (by ID or name), explicit selection
//! of the student a voucher is for, voucher rendering, and a client for the
//! remote print/download/attendance log.
//!
//! The roster is an immutable snapshot loaded from a spreadsheet export
//! (CSV or JSON). Search state lives in `SearchEngine`; `VoucherDesk` binds it
//! to the renderer and the event log.

pub mod attendance;
pub(crate) mod candidate;
pub mod config;
pub mod debounce;
pub mod demo_data;
pub mod desk;
pub mod engine;
pub mod interface;
pub mod models;
mod pdf;
pub mod render;
pub mod roster;
pub mod search;

pub use attendance::{LogClient, LogError, MemoryEventLog};
pub use config::{Config, ConfigError};
pub use desk::{ActionReceipt, VoucherDesk};
pub use engine::SearchEngine;
pub use interface::*;
pub use models::{CellValue, StudentRecord};
pub use render::{VoucherDocument, VoucherRenderer};
pub use roster::{Roster, RosterError};
