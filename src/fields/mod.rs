//! Fields module
//!
//! Generic reads and writes of single fields on model instances, driven by
//! the descriptor. Includes nested sub-resource addressing and list
//! resource bulk access.
//!
//! # Overview
//!
//! - `Getter` - coerced reads, list reads, required-field collection
//! - `Setter` - compare-then-write, multi writes, list replacement
//! - `dates` / `price` - calendar and price value helpers

mod coerce;
pub mod dates;
mod getter;
pub mod price;
mod setter;

pub use coerce::is_empty;
pub use getter::Getter;
pub use setter::{merge, Setter, Updated};

#[cfg(test)]
mod tests;
