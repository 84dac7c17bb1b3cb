//! Directory batch runner
//!
//! Walks a reference tree depth first, entries of each directory in sorted
//! order, and checks every recognized raster. The walk stops at the first
//! reference that fails.

use crate::check::Harness;
use crate::config::HarnessConfig;
use crate::error::{Error, Result};
use crate::interleave::InterleaveMode;
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

/// Raster kind declared by a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterKind {
    Monochrome,
    Color,
    Unrecognized,
}

impl RasterKind {
    /// Classify `path` by its extension, ignoring case
    pub fn classify(path: &Path, config: &HarnessConfig) -> Self {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return RasterKind::Unrecognized;
        };
        let matches = |list: &[String]| list.iter().any(|e| e.eq_ignore_ascii_case(extension));

        if matches(&config.monochrome_extensions) {
            RasterKind::Monochrome
        } else if matches(&config.color_extensions) {
            RasterKind::Color
        } else {
            RasterKind::Unrecognized
        }
    }
}

/// Aggregate of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// References checked, including the failing one
    pub files_checked: usize,
    /// Reference that stopped the run
    pub failed: Option<PathBuf>,
}

impl BatchSummary {
    pub fn passed(&self) -> bool {
        self.failed.is_none()
    }
}

impl Harness<'_> {
    /// Check every recognized reference below `root`.
    ///
    /// A tree without references passes. Collaborator failures abort the
    /// walk and are returned as errors.
    pub fn run_directory(&mut self, root: &Path) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        if let ControlFlow::Break(failed) = self.visit(root, &mut summary)? {
            log::info!("stopping at failing reference {}", failed.display());
            summary.failed = Some(failed);
        }
        log::info!(
            "checked {} reference(s) below {}",
            summary.files_checked,
            root.display()
        );
        Ok(summary)
    }

    fn visit(
        &mut self,
        dir: &Path,
        summary: &mut BatchSummary,
    ) -> Result<ControlFlow<PathBuf>> {
        let mut entries = fs::read_dir(dir)
            .and_then(|entries| {
                entries
                    .map(|entry| entry.map(|e| e.path()))
                    .collect::<std::io::Result<Vec<_>>>()
            })
            .map_err(|e| Error::io(dir, e))?;
        entries.sort();

        for path in entries {
            let metadata = fs::symlink_metadata(&path).map_err(|e| Error::io(&path, e))?;
            let flow = if metadata.is_dir() {
                self.visit(&path, summary)?
            } else if metadata.file_type().is_symlink() && path.is_dir() {
                log::warn!("not following directory link {}", path.display());
                ControlFlow::Continue(())
            } else {
                self.check_entry(&path, summary)?
            };

            if flow.is_break() {
                return Ok(flow);
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn check_entry(
        &mut self,
        path: &Path,
        summary: &mut BatchSummary,
    ) -> Result<ControlFlow<PathBuf>> {
        let kind = RasterKind::classify(path, self.config());
        if kind == RasterKind::Unrecognized {
            return Ok(ControlFlow::Continue(()));
        }

        self.reporter().checking(path);
        let passed = match kind {
            RasterKind::Color => self.check_color_file(path)?,
            _ => self.check_file(path, InterleaveMode::None, false)?.passed(),
        };
        self.reporter().status(path, passed);

        summary.files_checked += 1;
        if passed {
            Ok(ControlFlow::Continue(()))
        } else {
            Ok(ControlFlow::Break(path.to_path_buf()))
        }
    }
}
