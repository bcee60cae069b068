//! Stress-test netlist generation.

mod ladder;

pub use ladder::{CHAIN_OHMS, END_LINE, LEAK_OHMS, LadderNetlist, SOURCE_LINE, TRAN_LINE};

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{GeneratorConfig, WritePolicy};
use crate::error::{Error, Result};

/// Write one netlist into `dir`; the file handle is closed on return.
pub fn write_netlist(dir: &Path, netlist: &LadderNetlist, policy: WritePolicy) -> Result<PathBuf> {
    let path = dir.join(netlist.file_name());

    let mut file = policy.open_options().open(&path).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;
    file.write_all(netlist.render().as_bytes())
        .map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

/// Write a ladder netlist for every size in the configured sweep.
///
/// Files already written stay in place if a later write fails.
pub fn generate_all(cfg: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    cfg.sizes.validate()?;
    std::fs::create_dir_all(&cfg.output_dir).map_err(|e| Error::io(&cfg.output_dir, e))?;

    let mut written = Vec::new();
    for size in cfg.sizes.sizes() {
        let netlist = LadderNetlist::new(size)?;
        let path = write_netlist(&cfg.output_dir, &netlist, cfg.write_policy)?;
        info!(size, path = %path.display(), "netlist written");
        written.push(path);
    }

    Ok(written)
}
