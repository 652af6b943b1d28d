//! Built-in backends.

pub mod primary;
