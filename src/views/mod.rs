//! HTML views

pub mod page;
