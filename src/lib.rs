//! # tarifa
//!
//! Deterministic invoice totals with pluggable tax regimes, addons and
//! scenarios.
//!
//! A [`Registry`](tax::Registry) holds the regimes (per-country rules) and
//! addons (opt-in standards such as EN 16931) that an invoice can refer
//! to. [`Invoice::calculate`](core::Invoice::calculate) resolves the regime
//! from the supplier's tax identity, runs the addons' normalizers over the
//! document, applies scenario notes and extension codes, and computes line
//! and document totals with exact decimal arithmetic.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tarifa::core::*;
//! use tarifa::tax::{CATEGORY_VAT, RATE_STANDARD, Registry};
//! use rust_decimal_macros::dec;
//!
//! let registry = Registry::with_defaults();
//! let mut invoice = InvoiceBuilder::new("2024-001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
//!     .supplier(PartyBuilder::new("Provide One B.V.").tax_id("NL", "000099995B57").build())
//!     .customer(PartyBuilder::new("Sample Consumer").build())
//!     .add_line(LineBuilder::new("Development services", dec!(10), dec!(100.00))
//!         .rate(CATEGORY_VAT, RATE_STANDARD)
//!         .build())
//!     .build()
//!     .unwrap();
//!
//! invoice.calculate(&registry).unwrap();
//! invoice.validate(&registry).unwrap();
//!
//! let totals = invoice.totals.unwrap();
//! assert_eq!(totals.sum, dec!(1000.00));
//! assert_eq!(totals.tax, dec!(210.00));
//! assert_eq!(totals.payable, dec!(1210.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `regimes` (default) | Built-in regimes: Greece, the Netherlands |
//! | `en16931` (default) | The `eu-en16931-v2017` addon |
//! | `all` | Everything |

pub mod core;
pub mod dispatch;
pub mod schema;
pub mod tax;

#[cfg(feature = "regimes")]
pub mod regimes;

#[cfg(feature = "en16931")]
pub mod addons;

// Re-export core types at crate root for convenience
pub use crate::core::*;
