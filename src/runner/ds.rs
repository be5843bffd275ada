//! Runtime data structures: values, faults, the scope stack and the governor.

pub mod error;
pub mod governor;
pub mod scope;
pub mod value;
