//! Executable lookup adapter

mod which_lookup;

pub use which_lookup::WhichLookup;
