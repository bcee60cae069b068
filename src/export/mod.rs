//! Preparing simulator exports for comparison: splitting stepped runs into
//! separate files and resampling them onto a uniform time grid.

mod separate;
mod standardize;

pub use separate::{STEP_MARKER, StepExport, StepRun, separate, separated_dir, split_steps};
pub use standardize::{MAX_GRID_POINTS, resample, standardize_dir, standardize_file, standardized_path};
