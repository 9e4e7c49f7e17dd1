//! Input validation.
//!
//! Every input is checked before any probing starts so that a batch never
//! runs partway and then stops on a typo.
//!
//! # Example
//!
//! ```no_run
//! use bitrate_graph::validation::ensure_inputs_exist;
//!
//! ensure_inputs_exist(&["a.mp4", "b.mkv"])?;
//! # Ok::<(), bitrate_graph::BitrateError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::error::BitrateError;

/// Paths from `inputs` that do not exist, in input order.
pub fn missing_inputs<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    inputs
        .iter()
        .map(AsRef::as_ref)
        .filter(|path| !path.exists())
        .map(Path::to_path_buf)
        .collect()
}

/// Fail with [`BitrateError::MissingInput`] listing every missing path.
///
/// # Errors
///
/// Returns [`BitrateError::MissingInput`] if at least one input is missing.
pub fn ensure_inputs_exist<P: AsRef<Path>>(inputs: &[P]) -> Result<(), BitrateError> {
    let paths = missing_inputs(inputs);
    if paths.is_empty() {
        Ok(())
    } else {
        log::debug!("{} of {} inputs are missing", paths.len(), inputs.len());
        Err(BitrateError::MissingInput { paths })
    }
}
