//! Dashboard content areas: the overview cards and the roster table.

pub mod overview;
pub mod roster;
