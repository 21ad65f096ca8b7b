//! Output plan for a run: which volumes and ortho planes are written, where,
//! and how often.
//!
//! ```json
//! {
//!   "volume":    [{ "repeatStep": 50 }],
//!   "ortho2DXY": [{ "at": 10, "repeatStep": 10, "fromStep": 0, "toStep": 100 }],
//!   "ortho2DXZ": [],
//!   "ortho2DYZ": []
//! }
//! ```
//!
//! `toStep == 0` means "until the end of the run".

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::naming::{PathSegment, PlaneKind};

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Malformed output geometry: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub repeat_step: u64,
    #[serde(default)]
    pub from_step:   u64,
    #[serde(default)]
    pub to_step:     u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ortho2D {
    pub at:          i64,
    pub repeat_step: u64,
    #[serde(default)]
    pub from_step:   u64,
    #[serde(default)]
    pub to_step:     u64,
}

fn due(step: u64, repeat: u64, from: u64, to: u64) -> bool {
    repeat > 0 && step >= from && (to == 0 || step <= to) && step % repeat == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputGeometry {
    #[serde(default)]
    pub volume: Vec<Volume>,
    #[serde(default, rename = "ortho2DXY")]
    pub ortho_xy: Vec<Ortho2D>,
    #[serde(default, rename = "ortho2DXZ")]
    pub ortho_xz: Vec<Ortho2D>,
    #[serde(default, rename = "ortho2DYZ")]
    pub ortho_yz: Vec<Ortho2D>,
}

impl OutputGeometry {
    pub fn from_json(bytes: &[u8]) -> Result<Self, GeometryError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self, GeometryError> {
        Self::from_json(&fs::read(path)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Directories written at `step`, volumes first, then xy, xz, yz planes.
    pub fn segments_at(&self, step: u64, prefix: &str) -> Vec<PathSegment> {
        let volumes = self
            .volume
            .iter()
            .filter(|v| due(step, v.repeat_step, v.from_step, v.to_step))
            .map(|_| PathSegment::volume(step));

        let planes = [
            (PlaneKind::XyPlane, &self.ortho_xy),
            (PlaneKind::XzPlane, &self.ortho_xz),
            (PlaneKind::YzPlane, &self.ortho_yz),
        ]
        .into_iter()
        .flat_map(|(kind, list)| {
            list.iter()
                .filter(move |o| due(step, o.repeat_step, o.from_step, o.to_step))
                .filter_map(move |o| PathSegment::ortho(kind, step, o.at))
        });

        let mut out: Vec<PathSegment> = volumes
            .chain(planes)
            .map(|s| s.with_prefix(prefix))
            .collect();
        out.dedup();
        out
    }

    /// Every directory written over steps `1..=num_steps`, in step order.
    pub fn plan(&self, num_steps: u64, prefix: &str) -> Vec<PathSegment> {
        (1..=num_steps).flat_map(|s| self.segments_at(s, prefix)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "volume":    [{ "repeatStep": 50 }],
        "ortho2DXY": [{ "at": 10, "repeatStep": 10, "fromStep": 0, "toStep": 20 }],
        "ortho2DXZ": [{ "at": 14, "repeatStep": 20, "fromStep": 40 }]
    }"#;

    #[test]
    fn parses_with_defaults() {
        let g = OutputGeometry::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(g.volume, vec![Volume { repeat_step: 50, from_step: 0, to_step: 0 }]);
        assert_eq!(g.ortho_xz[0].from_step, 40);
        assert!(g.ortho_yz.is_empty());
    }

    #[test]
    fn plan_respects_windows() {
        let g = OutputGeometry::from_json(SAMPLE.as_bytes()).unwrap();
        let names: Vec<String> = g.plan(60, "plot").iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec![
            "plot.xyPlane.V5.step_00000010.cut_10",
            "plot.xyPlane.V5.step_00000020.cut_10",
            "plot.xzPlane.V5.step_00000040.cut_14",
            "plot.volume.V5.step_00000050",
            "plot.xzPlane.V5.step_00000060.cut_14",
        ]);
    }

    #[test]
    fn zero_repeat_never_fires() {
        let g = OutputGeometry {
            volume: vec![Volume { repeat_step: 0, from_step: 0, to_step: 0 }],
            ..Default::default()
        };
        assert!(g.plan(100, "plot").is_empty());
    }

    #[test]
    fn malformed_config_is_reported() {
        let err = OutputGeometry::from_json(br#"{"volume": [{"fromStep": 1}]}"#).unwrap_err();
        assert!(matches!(err, GeometryError::Malformed(_)));
    }
}
