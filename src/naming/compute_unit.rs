use std::fmt;

use super::PLOT_FILES_VERSION;

/// Sidecar suffix appended to a binary file name.
pub const SIDECAR_SUFFIX: &str = ".json";

/// Position of a compute unit in the global decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComputeUnitId {
    pub i: u64,
    pub j: u64,
    pub k: u64,
}

/// Which binary a compute unit wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CuFileKind {
    /// Flow quantities, `*.QVec.bin`.
    QVec,
    /// Force vectors, `*.F3.bin`.
    Force,
}

impl CuFileKind {
    pub fn suffix(self) -> &'static str {
        match self {
            CuFileKind::QVec  => ".QVec.bin",
            CuFileKind::Force => ".F3.bin",
        }
    }
}

/// A parsed compute-unit file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CuFileName {
    pub id:      ComputeUnitId,
    pub kind:    CuFileKind,
    pub sidecar: bool,
}

impl ComputeUnitId {
    pub fn new(i: u64, j: u64, k: u64) -> Self {
        Self { i, j, k }
    }

    /// `CUid.<i>.<j>.<k>.V5.QVec.bin` / `.F3.bin`
    pub fn file_name(&self, kind: CuFileKind) -> String {
        format!("{self}{}", kind.suffix())
    }

    /// Binary file name with the sidecar suffix appended.
    pub fn sidecar_name(&self, kind: CuFileKind) -> String {
        format!("{self}{}{SIDECAR_SUFFIX}", kind.suffix())
    }

    pub fn parse_file_name(name: &str) -> Option<CuFileName> {
        let (rest, sidecar) = match name.strip_suffix(SIDECAR_SUFFIX) {
            Some(r) => (r, true),
            None    => (name, false),
        };
        let (stem, kind) = [CuFileKind::QVec, CuFileKind::Force]
            .into_iter()
            .find_map(|k| rest.strip_suffix(k.suffix()).map(|s| (s, k)))?;

        let mut parts = stem.strip_prefix("CUid.")?.split('.');
        let i = parts.next()?.parse().ok()?;
        let j = parts.next()?.parse().ok()?;
        let k = parts.next()?.parse().ok()?;
        let version = parts.next()?.strip_prefix('V')?;
        if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) || parts.next().is_some() {
            return None;
        }

        Some(CuFileName { id: ComputeUnitId { i, j, k }, kind, sidecar })
    }
}

impl fmt::Display for ComputeUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CUid.{}.{}.{}.V{PLOT_FILES_VERSION}", self.i, self.j, self.k)
    }
}
