//! `ffprobe` invocation and sidecar files.
//!
//! [`MediaProbe`] runs `ffprobe` against a media file and returns its raw
//! structured output. The command asks for one entry per stream unit of the
//! selected stream plus the stream's codec name:
//!
//! ```text
//! ffprobe -v error -select_streams v:0 \
//!     -show_entries frame=best_effort_timestamp_time,...,pkt_size,key_frame:stream=codec_name \
//!     -of xml input.mp4
//! ```
//!
//! The call blocks until the process exits. [`write_sidecar`] persists the
//! raw text next to the run for later inspection.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::analysis::file_stem;
use crate::configuration::AnalysisOptions;
use crate::error::BitrateError;
use crate::format::ProbeFormat;

/// `ffprobe` runner.
///
/// # Example
///
/// ```no_run
/// use bitrate_graph::{AnalysisOptions, MediaProbe};
///
/// let raw = MediaProbe::run("input.mp4", &AnalysisOptions::new())?;
/// println!("{} bytes of probe output", raw.len());
/// # Ok::<(), bitrate_graph::BitrateError>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Arguments passed to `ffprobe` for `path` under `options`.
    pub fn arguments(path: &Path, options: &AnalysisOptions) -> Vec<OsString> {
        let entries = format!(
            "{}={}:stream={}",
            options.mode.section(),
            options.mode.fields(),
            options.codec_field
        );
        vec![
            "-v".into(),
            "error".into(),
            "-select_streams".into(),
            options.stream_selector.clone().into(),
            "-show_entries".into(),
            entries.into(),
            "-of".into(),
            options.format.extension().into(),
            path.as_os_str().to_os_string(),
        ]
    }

    /// Run `ffprobe` and return its standard output as text.
    ///
    /// # Errors
    ///
    /// Returns [`BitrateError::ProbeSpawn`] if the executable cannot be
    /// started, [`BitrateError::ProbeFailed`] if it exits unsuccessfully, and
    /// [`BitrateError::Parse`] if its output is not valid UTF-8.
    pub fn run<P: AsRef<Path>>(path: P, options: &AnalysisOptions) -> Result<String, BitrateError> {
        let path = path.as_ref();
        let arguments = Self::arguments(path, options);
        log::debug!(
            "Running {} {:?}",
            options.ffprobe_path.display(),
            arguments
        );

        let output = Command::new(&options.ffprobe_path)
            .args(&arguments)
            .output()
            .map_err(|source| BitrateError::ProbeSpawn {
                program: options.ffprobe_path.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BitrateError::ProbeFailed {
                path: path.to_path_buf(),
                status: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        if !output.stderr.is_empty() {
            log::debug!(
                "ffprobe stderr for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        String::from_utf8(output.stdout).map_err(|e| {
            BitrateError::parse(options.format, format!("probe output is not UTF-8: {e}"))
        })
    }
}

/// Where the sidecar for `input` goes: `<input-stem>.<format>`, in `dir` or
/// the current directory.
pub fn sidecar_path(input: &Path, format: ProbeFormat, dir: Option<&Path>) -> PathBuf {
    let mut name = file_stem(input).into_os_string();
    name.push(".");
    name.push(format.extension());
    match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Write the raw probe output verbatim, replacing any existing file.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns [`BitrateError::IoError`] if the directory cannot be created or
/// the file cannot be written.
pub fn write_sidecar(
    input: &Path,
    format: ProbeFormat,
    raw: &str,
    dir: Option<&Path>,
) -> Result<PathBuf, BitrateError> {
    if let Some(dir) = dir {
        fs::create_dir_all(dir)?;
    }
    let path = sidecar_path(input, format, dir);
    fs::write(&path, raw)?;
    Ok(path)
}
