//! # quill-core: Pure Sales-Document Logic for Quill CRM
//!
//! Money math, line-item aggregation, invoice status derivation and the
//! document lifecycle, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quill CRM Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Front-end: line tables, badges, deal pipeline            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     quill-automation: stage-change triggers, idempotency        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ quill-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌───────────┐ ┌──────────────┐ ┌───────────────┐  │   │
//! │  │  │  money  │ │ line_item │ │invoice_status│ │  lifecycle /  │  │   │
//! │  │  │  Money  │ │ LineItem  │ │ rule table   │ │  conversion   │  │   │
//! │  │  │  totals │ │ aggregate │ │ counts       │ │  drafts       │  │   │
//! │  │  └─────────┘ └───────────┘ └──────────────┘ └───────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money`, `compute_line_totals`, `to_minor` / `from_minor`
//! - [`line_item`] - `LineItem`, `DocumentTotals`, `SalesDocument`
//! - [`invoice_status`] - derived invoice status, status counts
//! - [`lifecycle`] - stored-status transitions for quotes and orders
//! - [`conversion`] - quote → order → invoice drafts
//! - [`format`] - locale-aware display strings (presentation only)
//! - [`validation`] - opt-in caller-side input checks
//! - [`types`] - documents, payments, deals, statuses
//! - [`error`] - `CoreError`, `ValidationError`
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, every time
//! 2. **Minor Units**: every amount is an integer count of öre/cents
//! 3. **Derived, not Stored**: totals and invoice status are recomputed on read
//! 4. **Explicit Errors**: rule violations are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use quill_core::line_item::{DocumentTotals, LineItem};
//!
//! let lines = vec![
//!     LineItem::new("Consulting", 2.0, 10000)
//!         .with_discount(10.0)
//!         .with_tax_rate(25.0),
//! ];
//! let totals = DocumentTotals::from_lines(&lines);
//! assert_eq!(totals.subtotal_minor, 18000);
//! assert_eq!(totals.tax_minor, 4500);
//! assert_eq!(totals.total_minor, 22500);
//! ```

pub mod conversion;
pub mod error;
pub mod format;
pub mod invoice_status;
pub mod lifecycle;
pub mod line_item;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice_status::{derive_invoice_status, InvoiceSnapshot, StatusCounts};
pub use line_item::{DocumentTotals, LineItem, SalesDocument};
pub use money::{compute_line_totals, from_minor, to_minor, LineTotals, Money};
pub use types::*;

/// Minor units per major unit. Every supported currency is treated as
/// having two decimals.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;
