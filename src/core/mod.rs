//! Core modules: identifiers, values, the on-disk store and capture wrappers.

pub mod capture;
pub mod error;
pub mod ident;
pub mod index;
pub mod output;
pub mod store;
pub mod time;
pub mod value;
