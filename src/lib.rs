//! Validation toolkit for comparing a circuit simulator against a reference
//! simulator's exports, plus stress-test netlist generation.

pub mod compare;
pub mod core;
pub mod error;
pub mod export;
pub mod netlist;
pub mod plot;

pub use compare::{
    AggregateResult, aggregate, aggregate_and_plot, compare_pair, compute_error, extract_cutoff,
    find_pairs, load_table,
};
pub use self::core::*;
pub use error::{Error, Result};
pub use netlist::{LadderNetlist, generate_all, write_netlist};
