//! Directory and file naming for simulation output.
//!
//! Every output step writes into its own directory directly under the run root:
//!
//! ```text
//! plot_output_np1_gridx44/
//! ├── plot.xzPlane.V5.step_00000020.cut_14/
//! │   ├── CUid.0.0.0.V5.F3.bin
//! │   ├── CUid.0.0.0.V5.F3.bin.json
//! │   ├── CUid.0.0.0.V5.QVec.bin
//! │   └── CUid.0.0.0.V5.QVec.bin.json
//! └── plot.volume.V5.step_00000050/
//!     └── CUid.1.1.1.V5.QVec.bin
//! ```
//!
//! Formatting lives here; the inverse lives in [`parse`].  Every name produced
//! by [`PathSegment`]'s `Display` impl parses back to an equal value.

use std::fmt;

pub mod compute_unit;
pub mod parse;

pub use compute_unit::{ComputeUnitId, CuFileKind, CuFileName};
pub use parse::{classify, cut_of, set_cut, shift_cut, step_of};

/// Version tag written into every directory and file name (`V5`).
pub const PLOT_FILES_VERSION: u32 = 5;
/// Prefix used when the caller does not choose one.
pub const DEFAULT_PREFIX: &str = "plot";

// ── PlaneKind ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    XyPlane,
    XzPlane,
    YzPlane,
    Volume,
    RotationalCapture,
    YzAnglePlane,
    Sector,
}

impl PlaneKind {
    /// Order in which tags are tested when classifying a name.  First match wins.
    pub const CLASSIFY_ORDER: [PlaneKind; 7] = [
        PlaneKind::XyPlane,
        PlaneKind::XzPlane,
        PlaneKind::YzPlane,
        PlaneKind::Volume,
        PlaneKind::RotationalCapture,
        PlaneKind::YzAnglePlane,
        PlaneKind::Sector,
    ];

    /// Tag as it appears in directory names.
    pub fn tag(self) -> &'static str {
        match self {
            PlaneKind::XyPlane           => "xyPlane",
            PlaneKind::XzPlane           => "xzPlane",
            PlaneKind::YzPlane           => "yzPlane",
            PlaneKind::Volume            => "volume",
            PlaneKind::RotationalCapture => "rotational_capture",
            PlaneKind::YzAnglePlane      => "yzAnglePlane",
            PlaneKind::Sector            => "sector",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::CLASSIFY_ORDER.into_iter().find(|k| k.tag() == tag)
    }

    /// Parse from a CLI string: either the tag or a short alias.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "xy" | "xyplane"                            => Some(PlaneKind::XyPlane),
            "xz" | "xzplane"                            => Some(PlaneKind::XzPlane),
            "yz" | "yzplane"                            => Some(PlaneKind::YzPlane),
            "volume"                                    => Some(PlaneKind::Volume),
            "capture" | "rotational_capture"            => Some(PlaneKind::RotationalCapture),
            "angle" | "yzangleplane"                    => Some(PlaneKind::YzAnglePlane),
            "sector"                                    => Some(PlaneKind::Sector),
            _                                           => None,
        }
    }

    /// xy, xz and yz planes are cut at an integer grid coordinate.
    pub fn is_ortho(self) -> bool {
        matches!(self, PlaneKind::XyPlane | PlaneKind::XzPlane | PlaneKind::YzPlane)
    }
}

impl fmt::Display for PlaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

// ── PathSegment ──────────────────────────────────────────────────────────────

/// Kind-specific trailer of a directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// `volume`: no trailer.
    Whole,
    /// `.cut_<n>`
    Cut(i64),
    /// `.angle_<a>.bladeId_<b>`
    Capture { angle: i64, blade_id: i64 },
    /// `.angle_<a>`
    Angle(i64),
    /// `.angle1_<a>.angle2_<b>`
    Sector { angle1: i64, angle2: i64 },
}

/// One output directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub prefix:    String,
    pub kind:      PlaneKind,
    pub version:   u32,
    pub step:      u64,
    pub placement: Placement,
}

impl PathSegment {
    fn new(kind: PlaneKind, step: u64, placement: Placement) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            kind,
            version: PLOT_FILES_VERSION,
            step,
            placement,
        }
    }

    pub fn xy_plane(step: u64, at_k: i64) -> Self {
        Self::new(PlaneKind::XyPlane, step, Placement::Cut(at_k))
    }

    pub fn xz_plane(step: u64, at_j: i64) -> Self {
        Self::new(PlaneKind::XzPlane, step, Placement::Cut(at_j))
    }

    pub fn yz_plane(step: u64, at_i: i64) -> Self {
        Self::new(PlaneKind::YzPlane, step, Placement::Cut(at_i))
    }

    /// Ortho plane of `kind` cut at `cut`.  Returns `None` for non-ortho kinds.
    pub fn ortho(kind: PlaneKind, step: u64, cut: i64) -> Option<Self> {
        kind.is_ortho().then(|| Self::new(kind, step, Placement::Cut(cut)))
    }

    pub fn volume(step: u64) -> Self {
        Self::new(PlaneKind::Volume, step, Placement::Whole)
    }

    pub fn rotational_capture(step: u64, angle: i64, blade_id: i64) -> Self {
        Self::new(PlaneKind::RotationalCapture, step, Placement::Capture { angle, blade_id })
    }

    pub fn yz_angle_plane(step: u64, angle: i64) -> Self {
        Self::new(PlaneKind::YzAnglePlane, step, Placement::Angle(angle))
    }

    pub fn sector(step: u64, angle1: i64, angle2: i64) -> Self {
        Self::new(PlaneKind::Sector, step, Placement::Sector { angle1, angle2 })
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn cut(&self) -> Option<i64> {
        match self.placement {
            Placement::Cut(c) => Some(c),
            _                 => None,
        }
    }

    pub fn angle(&self) -> Option<i64> {
        match self.placement {
            Placement::Capture { angle, .. } | Placement::Angle(angle) => Some(angle),
            Placement::Sector { angle1, .. }                           => Some(angle1),
            _                                                          => None,
        }
    }

    pub fn blade_id(&self) -> Option<i64> {
        match self.placement {
            Placement::Capture { blade_id, .. } => Some(blade_id),
            _                                   => None,
        }
    }
}

/// `<prefix>.<tag>.V<version>.step_<step:08>` without any trailer.
pub fn format_dir(prefix: &str, kind: PlaneKind, version: u32, step: u64) -> String {
    format!("{prefix}.{}.V{version}.{}", kind.tag(), format_step(step))
}

/// `step_<step:08>`
pub fn format_step(step: u64) -> String {
    format!("step_{step:08}")
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_dir(&self.prefix, self.kind, self.version, self.step))?;
        match self.placement {
            Placement::Whole                         => Ok(()),
            Placement::Cut(c)                        => write!(f, ".cut_{c}"),
            Placement::Capture { angle, blade_id }   => write!(f, ".angle_{angle}.bladeId_{blade_id}"),
            Placement::Angle(a)                      => write!(f, ".angle_{a}"),
            Placement::Sector { angle1, angle2 }     => write!(f, ".angle1_{angle1}.angle2_{angle2}"),
        }
    }
}
