//! JSON sidecar describing one binary output file.
//!
//! Every `*.bin` written by the simulation has a companion `*.bin.json`.  The
//! key set is fixed and every key is always written, even when empty, because
//! the sidecar is read by tools that expect the complete schema.  Unknown keys
//! are ignored on read.
//!
//! ```json
//! {
//!   "name": "", "note": "", "structName": "tDisk_colrow_Q19",
//!   "QDataType": "float", "QOutputLength": 19, "binFileSizeInStructs": 1936,
//!   "coordsType": "uint16_t", "filePath": "CUid.0.0.0.V5.QVec.bin",
//!   "hasColRowtCoords": true, "hasGridtCoords": false, "reference": "",
//!   "i0": 0, "j0": 0, "k0": 0
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::atomic::write_atomic;
use crate::layout::{LayoutError, RecordLayout};

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Malformed descriptor: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Unusable layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub name:        String,
    pub note:        String,
    #[serde(rename = "structName")]
    pub struct_name: String,

    #[serde(rename = "QDataType")]
    pub q_data_type:     String,
    #[serde(rename = "QOutputLength")]
    pub q_output_length: u32,
    #[serde(rename = "binFileSizeInStructs")]
    pub bin_file_size_in_structs: u64,
    #[serde(rename = "coordsType")]
    pub coords_type: String,
    #[serde(rename = "filePath")]
    pub file_path:   String,
    #[serde(rename = "hasColRowtCoords")]
    pub has_col_row_coords: bool,
    #[serde(rename = "hasGridtCoords")]
    pub has_grid_coords:    bool,

    pub reference: String,
    pub i0: u64,
    pub j0: u64,
    pub k0: u64,
}

impl LayoutDescriptor {
    /// Describe `record_count` records of `layout` stored at `file_path`.
    /// Metadata strings start empty and the origin at `(0, 0, 0)`.
    pub fn for_layout(layout: &RecordLayout, file_path: impl Into<String>, record_count: u64) -> Self {
        Self {
            name:        String::new(),
            note:        String::new(),
            struct_name: String::new(),
            q_data_type:     layout.quantity_type().tag().to_owned(),
            q_output_length: layout.quantity_count() as u32,
            bin_file_size_in_structs: record_count,
            coords_type: layout.coord_type().tag().to_owned(),
            file_path:   file_path.into(),
            has_col_row_coords: layout.has_col_row(),
            has_grid_coords:    layout.has_grid(),
            reference: String::new(),
            i0: 0,
            j0: 0,
            k0: 0,
        }
    }

    pub fn with_origin(mut self, i0: u64, j0: u64, k0: u64) -> Self {
        self.i0 = i0;
        self.j0 = j0;
        self.k0 = k0;
        self
    }

    pub fn origin(&self) -> (u64, u64, u64) {
        (self.i0, self.j0, self.k0)
    }

    /// Resolve the record layout this sidecar describes.
    pub fn layout(&self) -> Result<RecordLayout, LayoutError> {
        RecordLayout::from_tags(
            &self.coords_type,
            self.has_col_row_coords,
            self.has_grid_coords,
            &self.q_data_type,
            self.q_output_length as usize,
        )
    }

    /// Size the companion binary file should have.
    pub fn expected_bin_size(&self) -> Result<u64, LayoutError> {
        self.layout()?.bytes_for(self.bin_file_size_in_structs)
    }

    // ── Codec ────────────────────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Parse a sidecar and check that its layout is usable.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DescriptorError> {
        let d: LayoutDescriptor = serde_json::from_slice(bytes)?;
        d.layout()?;
        Ok(d)
    }

    /// Replace the sidecar at `path` in one step; readers listing the tree
    /// mid-run never see a truncated file.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), DescriptorError> {
        write_atomic(path.as_ref(), &self.to_json()?)?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self, DescriptorError> {
        Self::from_json(&fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CoordType, QuantityType};
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    const SAMPLE: &str = r#"{
        "name": "run-a", "note": "", "structName": "tDisk_colrow_Q19",
        "QDataType": "float", "QOutputLength": 19, "binFileSizeInStructs": 1936,
        "coordsType": "uint16_t", "filePath": "CUid.0.0.0.V5.QVec.bin",
        "hasColRowtCoords": true, "hasGridtCoords": false, "reference": "",
        "i0": 0, "j0": 44, "k0": 0
    }"#;

    #[test]
    fn parses_sample_sidecar() {
        let d = LayoutDescriptor::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(d.name, "run-a");
        assert_eq!(d.origin(), (0, 44, 0));
        let l = d.layout().unwrap();
        assert_eq!(l.quantity_byte_offset(), 4);
        assert_eq!(l.record_byte_size(), 4 + 4 * 19);
        assert_eq!(d.expected_bin_size().unwrap(), 1936 * 80);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut v: Value = serde_json::from_str(SAMPLE).unwrap();
        v["gridX"] = Value::from(44);
        let d = LayoutDescriptor::from_json(v.to_string().as_bytes()).unwrap();
        assert_eq!(d.q_output_length, 19);
    }

    #[test]
    fn missing_key_is_malformed() {
        let mut v: Value = serde_json::from_str(SAMPLE).unwrap();
        v.as_object_mut().unwrap().remove("hasGridtCoords");
        let err = LayoutDescriptor::from_json(v.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
    }

    #[test]
    fn mistyped_key_is_malformed() {
        let mut v: Value = serde_json::from_str(SAMPLE).unwrap();
        v["QOutputLength"] = Value::from("19");
        let err = LayoutDescriptor::from_json(v.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
    }

    #[test]
    fn unknown_type_tag_rejected_at_load() {
        let mut v: Value = serde_json::from_str(SAMPLE).unwrap();
        v["coordsType"] = Value::from("Int");
        let err = LayoutDescriptor::from_json(v.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DescriptorError::Layout(LayoutError::UnsupportedCoordType(_))));

        let mut v: Value = serde_json::from_str(SAMPLE).unwrap();
        v["QDataType"] = Value::from("quad");
        let err = LayoutDescriptor::from_json(v.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DescriptorError::Layout(LayoutError::UnsupportedQuantityType(_))));
    }

    #[test]
    fn absurd_sizes_are_errors_not_panics() {
        let layout = RecordLayout::new(CoordType::U32, true, true, QuantityType::F32, 19).unwrap();
        let d = LayoutDescriptor::for_layout(&layout, "x", u64::MAX / 2);
        let back = LayoutDescriptor::from_json(&d.to_json().unwrap()).unwrap();
        assert!(matches!(back.expected_bin_size().unwrap_err(), LayoutError::SizeOverflow));

        let mut v: Value = serde_json::from_str(SAMPLE).unwrap();
        v["QOutputLength"] = Value::from(u32::MAX);
        let err = LayoutDescriptor::from_json(v.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DescriptorError::Layout(LayoutError::QuantityCountTooLarge(_))));
    }

    #[test]
    fn readers_never_see_a_partial_sidecar() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("CUid.0.0.0.V5.QVec.bin.json");
        let layout = RecordLayout::new(CoordType::U32, true, true, QuantityType::F32, 19).unwrap();
        let mut d = LayoutDescriptor::for_layout(&layout, "CUid.0.0.0.V5.QVec.bin", 0);
        d.note = "x".repeat(1 << 20);

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let (path, done) = (path.clone(), Arc::clone(&done));
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    match fs::read(&path) {
                        Ok(bytes) => {
                            LayoutDescriptor::from_json(&bytes).unwrap();
                        }
                        Err(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
                    }
                }
            })
        };
        for n in 0..20 {
            d.bin_file_size_in_structs = n;
            d.write_json(&path).unwrap();
        }
        done.store(true, Ordering::Release);
        reader.join().unwrap();

        assert_eq!(LayoutDescriptor::read_json(&path).unwrap(), d);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn encoding_keeps_empty_fields() {
        let layout = RecordLayout::new(CoordType::U32, true, true, QuantityType::F64, 27).unwrap();
        let d = LayoutDescriptor::for_layout(&layout, "", 0);
        let v: Value = serde_json::from_slice(&d.to_json().unwrap()).unwrap();
        let obj = v.as_object().unwrap();
        for key in [
            "name", "note", "structName", "QDataType", "QOutputLength",
            "binFileSizeInStructs", "coordsType", "filePath", "hasColRowtCoords",
            "hasGridtCoords", "reference", "i0", "j0", "k0",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 14);
        assert_eq!(obj["note"], Value::from(""));
    }

    #[test]
    fn encode_then_decode_is_identity() {
        let layout = RecordLayout::new(CoordType::U64, false, true, QuantityType::F16, 7).unwrap();
        let mut d = LayoutDescriptor::for_layout(&layout, "/data/CUid.1.2.3.V5.QVec.bin", 512)
            .with_origin(44, 88, 132);
        d.name = "dragon".into();
        d.reference = "rev 5".into();
        let back = LayoutDescriptor::from_json(&d.to_json().unwrap()).unwrap();
        assert_eq!(back, d);
        assert_eq!(back.layout().unwrap(), layout);
    }
}
