//! Core billing types, calculation, validation and corrections.
//!
//! The [`Invoice`] is the root of every calculation: build one with
//! [`InvoiceBuilder`], run [`Invoice::calculate`] against a
//! [`Registry`](crate::tax::Registry) and check it with [`Invoice::validate`].

mod builder;
mod calculate;
mod correct;
pub mod currencies;
mod error;
mod percent;
mod types;
mod validation;

pub use builder::*;
pub use correct::*;
pub use currencies::is_known_currency_code;
pub use error::*;
pub use percent::Percent;
pub(crate) use percent::round_half_up;
pub use types::*;
pub use validation::*;
