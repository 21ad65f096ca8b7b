use crate::naming::parse::segment_fields;
use crate::naming::{classify, cut_of, step_of, CuFileKind, ComputeUnitId, PlaneKind, PLOT_FILES_VERSION};

/// Filter over output directory names.
///
/// Built from the same tag set the formatter uses, so only names this crate
/// could have produced ever match.  Unset filters match anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPattern {
    pub version: u32,
    pub kind:    Option<PlaneKind>,
    pub step:    Option<u64>,
    pub cut:     Option<i64>,
}

impl Default for SegmentPattern {
    fn default() -> Self {
        Self { version: PLOT_FILES_VERSION, kind: None, step: None, cut: None }
    }
}

impl SegmentPattern {
    /// Any `V5` step directory.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn kind(kind: PlaneKind) -> Self {
        Self { kind: Some(kind), ..Self::default() }
    }

    pub fn with_step(mut self, step: Option<u64>) -> Self {
        self.step = step;
        self
    }

    pub fn with_cut(mut self, cut: Option<i64>) -> Self {
        self.cut = cut;
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        if !segment_fields(name).contains(&format!("V{}.step_", self.version)) {
            return false;
        }
        let Some(step) = step_of(name) else {
            return false;
        };
        if self.kind.is_some_and(|k| classify(name) != Some(k)) {
            return false;
        }
        if self.step.is_some_and(|s| s != step) {
            return false;
        }
        if let Some(cut) = self.cut {
            if cut_of(name) != Some(cut) {
                return false;
            }
        }
        true
    }
}

/// Filter over compute-unit file names inside one output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePattern {
    pub kind:    CuFileKind,
    pub sidecar: bool,
}

impl FilePattern {
    pub fn matches(&self, name: &str) -> bool {
        ComputeUnitId::parse_file_name(name)
            .is_some_and(|f| f.kind == self.kind && f.sidecar == self.sidecar)
    }
}
