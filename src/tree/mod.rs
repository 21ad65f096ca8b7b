//! Index over a run's output directory.
//!
//! [`OutputTree`] never reads binary data.  It lists the immediate children of
//! the root (or of one plot directory) through a [`DirLister`], filters them
//! with [`SegmentPattern`] / [`FilePattern`], and builds paths from
//! [`crate::naming`].  A root that cannot be listed yields an empty result: a
//! run that is still in progress may not have written anything yet.
//!
//! The filesystem may change between calls; every query is answered from
//! whatever the lister returns at that moment.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::descriptor::LayoutDescriptor;
use crate::naming::{set_cut, shift_cut, ComputeUnitId, CuFileKind, PathSegment, PlaneKind, DEFAULT_PREFIX};

pub mod ancestor;
pub mod pattern;

pub use ancestor::{last_two_components, longest_common_ancestor};
pub use pattern::{FilePattern, SegmentPattern};

/// Root directory name used when none is given.
pub const DEFAULT_ROOT_NAME: &str = "tdLBOutputTreeDefault";

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Could not resolve the home directory")]
    NoHomeDir,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── Listing capability ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path:   PathBuf,
    pub is_dir: bool,
}

/// Lists the immediate children of a directory.
pub trait DirLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;
}

/// [`DirLister`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        fs::read_dir(dir)?
            .map(|entry| {
                let entry = entry?;
                Ok(DirEntry { is_dir: entry.file_type()?.is_dir(), path: entry.path() })
            })
            .collect()
    }
}

/// Sorted children of `dir`.  A directory that cannot be listed has none.
fn list_sorted<L: DirLister>(lister: &L, dir: &Path) -> Vec<DirEntry> {
    match lister.list(dir) {
        Ok(mut entries) => {
            entries.sort_by(|a, b| a.path.cmp(&b.path));
            entries
        }
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "listing unavailable");
            Vec::new()
        }
    }
}

/// Compute-unit files of `kind` in `dir`, sorted.  Needs no tree root.
pub fn cu_files_in<L: DirLister>(lister: &L, dir: &Path, kind: CuFileKind, sidecar: bool) -> Vec<PathBuf> {
    let pattern = FilePattern { kind, sidecar };
    list_sorted(lister, dir)
        .into_iter()
        .filter(|e| !e.is_dir && file_name(&e.path).is_some_and(|n| pattern.matches(n)))
        .map(|e| e.path)
        .collect()
}

// ── Options ──────────────────────────────────────────────────────────────────

/// How an [`OutputTree`] names and materializes directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    /// Prefix of every step directory the tree names or creates.
    pub prefix:      String,
    /// Create the root when the tree is constructed.
    pub create_root: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { prefix: DEFAULT_PREFIX.to_owned(), create_root: false }
    }
}

impl TreeOptions {
    pub fn creating() -> Self {
        Self { create_root: true, ..Self::default() }
    }
}

// ── Derived files ────────────────────────────────────────────────────────────

/// Post-processed per-directory fields, written to the root as
/// `<plot-dir-name>.<field>.bin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedField {
    Rho,
    Ux,
    Uy,
    Uz,
    Vorticity,
}

impl DerivedField {
    pub fn ext(self) -> &'static str {
        match self {
            DerivedField::Rho       => "rho.bin",
            DerivedField::Ux        => "ux.bin",
            DerivedField::Uy        => "uy.bin",
            DerivedField::Uz        => "uz.bin",
            DerivedField::Vorticity => "vorticity.bin",
        }
    }
}

// ── OutputTree ───────────────────────────────────────────────────────────────

pub struct OutputTree<L: DirLister = FsLister> {
    root:   PathBuf,
    prefix: String,
    lister: L,
}

impl OutputTree<FsLister> {
    /// Index `root` without touching the filesystem.
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        Self::with_lister(root, FsLister)
    }

    /// Index `root` with `options`, creating the root if asked to.
    pub fn open_with<P: AsRef<Path>>(root: P, options: TreeOptions) -> Result<Self, TreeError> {
        let tree = Self::open(root).with_prefix(options.prefix);
        if options.create_root {
            tree.materialize()?;
        }
        Ok(tree)
    }

    /// Index `root`, creating it if it does not exist.
    pub fn create<P: AsRef<Path>>(root: P) -> Result<Self, TreeError> {
        Self::open_with(root, TreeOptions::creating())
    }

    /// `disk_dir/root_name`, optionally created.
    pub fn in_dir<P: AsRef<Path>>(disk_dir: P, root_name: &str, create: bool) -> Result<Self, TreeError> {
        Self::in_dir_with(disk_dir, root_name, TreeOptions { create_root: create, ..TreeOptions::default() })
    }

    pub fn in_dir_with<P: AsRef<Path>>(disk_dir: P, root_name: &str, options: TreeOptions) -> Result<Self, TreeError> {
        Self::open_with(disk_dir.as_ref().join(root_name), options)
    }

    /// `$HOME/root_name`, optionally created.
    pub fn in_home(root_name: &str, create: bool) -> Result<Self, TreeError> {
        let dirs = directories::UserDirs::new().ok_or(TreeError::NoHomeDir)?;
        Self::in_dir(dirs.home_dir(), root_name, create)
    }

    /// [`DEFAULT_ROOT_NAME`] under the current directory.
    pub fn default_in_cwd() -> Result<Self, TreeError> {
        Self::in_dir(std::env::current_dir()?, DEFAULT_ROOT_NAME, false)
    }

    /// Root is the longest common ancestor of `dirs`, which must exist.
    pub fn from_dirs<S: AsRef<str>>(dirs: &[S]) -> Result<Self, TreeError> {
        let common = PathBuf::from(longest_common_ancestor(dirs));
        if common.as_os_str().is_empty() || !common.is_dir() {
            return Err(TreeError::RootNotFound(common));
        }
        Ok(Self::open(common))
    }
}

impl<L: DirLister> OutputTree<L> {
    pub fn with_lister<P: AsRef<Path>>(root: P, lister: L) -> Self {
        Self { root: root.as_ref().to_owned(), prefix: DEFAULT_PREFIX.to_owned(), lister }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn prefix(&self) -> &str { &self.prefix }

    /// Create the root if missing.
    pub fn materialize(&self) -> Result<(), TreeError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn children(&self, dir: &Path) -> Vec<DirEntry> {
        list_sorted(&self.lister, dir)
    }

    // ── Directories ──────────────────────────────────────────────────────────

    /// Directory for `segment`, named with this tree's prefix.
    pub fn segment_dir(&self, segment: &PathSegment) -> PathBuf {
        let named = PathSegment { prefix: self.prefix.clone(), ..segment.clone() };
        self.root.join(named.to_string())
    }

    /// Create the directory for `segment` if missing and return its path.
    pub fn create_segment_dir(&self, segment: &PathSegment) -> Result<PathBuf, TreeError> {
        let dir = self.segment_dir(segment);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Child directories of the root whose name matches `pattern`, sorted.
    pub fn list_matching(&self, pattern: &SegmentPattern) -> Vec<PathBuf> {
        self.children(&self.root)
            .into_iter()
            .filter(|e| e.is_dir && file_name(&e.path).is_some_and(|n| pattern.matches(n)))
            .map(|e| e.path)
            .collect()
    }

    /// Every step directory under the root.
    pub fn plot_dirs(&self) -> Vec<PathBuf> {
        self.list_matching(&SegmentPattern::any())
    }

    pub fn find_by_plane_kind(&self, kind: PlaneKind, cut: Option<i64>, step: Option<u64>) -> Vec<PathBuf> {
        self.list_matching(&SegmentPattern::kind(kind).with_step(step).with_cut(cut))
    }

    pub fn find_volume_dirs(&self, step: Option<u64>) -> Vec<PathBuf> {
        self.find_by_plane_kind(PlaneKind::Volume, None, step)
    }

    /// Same directory name with the cut moved by `delta`.
    pub fn shift_cut_dir(&self, dir: &Path, delta: i64) -> Option<PathBuf> {
        let name = shift_cut(file_name(dir)?, delta)?;
        Some(dir.with_file_name(name))
    }

    /// Same directory name with the cut replaced by `cut`.
    pub fn set_cut_dir(&self, dir: &Path, cut: i64) -> Option<PathBuf> {
        let name = set_cut(file_name(dir)?, cut)?;
        Some(dir.with_file_name(name))
    }

    // ── Files ────────────────────────────────────────────────────────────────

    pub fn cu_file(&self, dir: &Path, cu: ComputeUnitId, kind: CuFileKind) -> PathBuf {
        dir.join(cu.file_name(kind))
    }

    pub fn cu_sidecar(&self, dir: &Path, cu: ComputeUnitId, kind: CuFileKind) -> PathBuf {
        dir.join(cu.sidecar_name(kind))
    }

    /// Compute-unit files of `kind` in `dir`, sorted.
    pub fn find_cu_files(&self, dir: &Path, kind: CuFileKind, sidecar: bool) -> Vec<PathBuf> {
        cu_files_in(&self.lister, dir, kind, sidecar)
    }

    pub fn derived_file(&self, dir: &Path, field: DerivedField) -> PathBuf {
        let name = file_name(dir).unwrap_or_default();
        self.root.join(format!("{name}.{}", field.ext()))
    }

    pub fn velocities_exist(&self, dir: &Path) -> bool {
        [DerivedField::Rho, DerivedField::Ux, DerivedField::Uy, DerivedField::Uz]
            .into_iter()
            .all(|f| self.derived_file(dir, f).is_file())
    }

    pub fn vorticity_exists(&self, dir: &Path) -> bool {
        self.derived_file(dir, DerivedField::Vorticity).is_file()
    }

    /// Load every sidecar of `kind` in `dir`.  Unusable sidecars are skipped.
    pub fn load_descriptors(&self, dir: &Path, kind: CuFileKind) -> Vec<(PathBuf, LayoutDescriptor)> {
        let paths = self.find_cu_files(dir, kind, true);

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            paths
                .into_par_iter()
                .filter_map(|p| load_descriptor(&p).map(|d| (p, d)))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            paths
                .into_iter()
                .filter_map(|p| load_descriptor(&p).map(|d| (p, d)))
                .collect()
        }
    }
}

/// Read one sidecar, logging and returning `None` if it cannot be used.
pub fn load_descriptor(path: &Path) -> Option<LayoutDescriptor> {
    match LayoutDescriptor::read_json(path) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping sidecar");
            None
        }
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()
}
