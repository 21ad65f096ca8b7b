//! Byte geometry of one binary output record.
//!
//! A record is a flat, fixed-size blob:
//!
//! ```text
//! [col,row]?  [grid x,y,z]?  [q_0 .. q_{n-1}]
//! ```
//!
//! The col/row group (2 fields) and the grid group (3 fields) are optional and
//! share one unsigned element type.  The Q-vector follows as `quantity_count`
//! floating point values.  Offsets computed here must match what the producing
//! simulation wrote byte for byte; an unknown type tag is a hard error, never a
//! default.

use std::io;
use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Unsupported coordinate type: {0:?}")]
    UnsupportedCoordType(String),
    #[error("Unsupported quantity type: {0:?}")]
    UnsupportedQuantityType(String),
    #[error("Quantity count must be greater than zero")]
    ZeroQuantityCount,
    #[error("Quantity count {0} exceeds the maximum of {MAX_QUANTITY_COUNT}")]
    QuantityCountTooLarge(usize),
    #[error("Binary file size overflows u64")]
    SizeOverflow,
    #[error("Short record: expected {expected} bytes, got {got}")]
    ShortRecord { expected: usize, got: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── CoordType ────────────────────────────────────────────────────────────────

/// Element type of every coordinate field (col/row and grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordType {
    U16,
    U32,
    U64,
}

impl CoordType {
    pub const ALL: [CoordType; 3] = [CoordType::U16, CoordType::U32, CoordType::U64];

    /// Resolve a sidecar `coordsType` tag.
    pub fn from_tag(tag: &str) -> Result<Self, LayoutError> {
        match tag {
            "uint16_t" | "UInt16" => Ok(CoordType::U16),
            "uint32_t" | "UInt32" => Ok(CoordType::U32),
            "uint64_t" | "UInt64" => Ok(CoordType::U64),
            other                 => Err(LayoutError::UnsupportedCoordType(other.to_owned())),
        }
    }

    /// Tag written by [`LayoutDescriptor::for_layout`](crate::descriptor::LayoutDescriptor::for_layout).
    pub fn tag(self) -> &'static str {
        match self {
            CoordType::U16 => "uint16_t",
            CoordType::U32 => "uint32_t",
            CoordType::U64 => "uint64_t",
        }
    }

    #[inline]
    pub fn size(self) -> usize {
        match self {
            CoordType::U16 => 2,
            CoordType::U32 => 4,
            CoordType::U64 => 8,
        }
    }
}

// ── QuantityType ─────────────────────────────────────────────────────────────

/// Floating point type of each Q-vector component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityType {
    F16,
    F32,
    F64,
}

impl QuantityType {
    pub const ALL: [QuantityType; 3] = [QuantityType::F16, QuantityType::F32, QuantityType::F64];

    /// Resolve a sidecar `QDataType` tag.
    pub fn from_tag(tag: &str) -> Result<Self, LayoutError> {
        match tag {
            "Float16" | "float16" | "half"                  => Ok(QuantityType::F16),
            "Float32" | "float32" | "Float" | "float"       => Ok(QuantityType::F32),
            "Float64" | "float64" | "Double" | "double"     => Ok(QuantityType::F64),
            other => Err(LayoutError::UnsupportedQuantityType(other.to_owned())),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            QuantityType::F16 => "float16",
            QuantityType::F32 => "float",
            QuantityType::F64 => "double",
        }
    }

    #[inline]
    pub fn size(self) -> usize {
        match self {
            QuantityType::F16 => 2,
            QuantityType::F32 => 4,
            QuantityType::F64 => 8,
        }
    }
}

// ── RecordLayout ─────────────────────────────────────────────────────────────

/// Number of fields in the col/row group.
pub const COL_ROW_FIELDS: usize = 2;
/// Number of fields in the grid group.
pub const GRID_FIELDS: usize = 3;
/// Largest accepted Q-vector length.  Real lattices use 19 or 27; the cap keeps
/// record buffers small when a sidecar carries a nonsense length.
pub const MAX_QUANTITY_COUNT: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordLayout {
    coord_type:     CoordType,
    has_col_row:    bool,
    has_grid:       bool,
    quantity_type:  QuantityType,
    quantity_count: usize,
}

impl RecordLayout {
    pub fn new(
        coord_type:     CoordType,
        has_col_row:    bool,
        has_grid:       bool,
        quantity_type:  QuantityType,
        quantity_count: usize,
    ) -> Result<Self, LayoutError> {
        if quantity_count == 0 {
            return Err(LayoutError::ZeroQuantityCount);
        }
        if quantity_count > MAX_QUANTITY_COUNT {
            return Err(LayoutError::QuantityCountTooLarge(quantity_count));
        }
        Ok(Self { coord_type, has_col_row, has_grid, quantity_type, quantity_count })
    }

    /// Build a layout from raw sidecar tags, rejecting unknown ones.
    pub fn from_tags(
        coords_tag:     &str,
        has_col_row:    bool,
        has_grid:       bool,
        quantity_tag:   &str,
        quantity_count: usize,
    ) -> Result<Self, LayoutError> {
        Self::new(
            CoordType::from_tag(coords_tag)?,
            has_col_row,
            has_grid,
            QuantityType::from_tag(quantity_tag)?,
            quantity_count,
        )
    }

    pub fn coord_type(&self)     -> CoordType    { self.coord_type }
    pub fn has_col_row(&self)    -> bool         { self.has_col_row }
    pub fn has_grid(&self)       -> bool         { self.has_grid }
    pub fn quantity_type(&self)  -> QuantityType { self.quantity_type }
    pub fn quantity_count(&self) -> usize        { self.quantity_count }

    #[inline]
    pub fn coord_field_size(&self) -> usize { self.coord_type.size() }

    #[inline]
    pub fn quantity_size(&self) -> usize { self.quantity_type.size() }

    /// Col/row fields, when present, lead the record.
    #[inline]
    pub fn col_row_byte_offset(&self) -> usize { 0 }

    #[inline]
    pub fn grid_byte_offset(&self) -> usize {
        if self.has_col_row {
            COL_ROW_FIELDS * self.coord_field_size()
        } else {
            0
        }
    }

    pub fn quantity_byte_offset(&self) -> usize {
        let c = self.coord_field_size();
        match (self.has_col_row, self.has_grid) {
            (true, false) => COL_ROW_FIELDS * c,
            (false, true) => GRID_FIELDS * c,
            (col_row, grid) => {
                let col_row = if col_row { COL_ROW_FIELDS * c } else { 0 };
                let grid    = if grid    { GRID_FIELDS * c }    else { 0 };
                col_row + grid
            }
        }
    }

    /// Bounded by [`MAX_QUANTITY_COUNT`], so never overflows.
    #[inline]
    pub fn record_byte_size(&self) -> usize {
        self.quantity_byte_offset() + self.quantity_size() * self.quantity_count
    }

    /// Number of whole records in `bytes` bytes of binary output, or `None`
    /// if the length is not a multiple of the record size.
    pub fn records_in(&self, bytes: u64) -> Option<u64> {
        let size = self.record_byte_size() as u64;
        (bytes % size == 0).then(|| bytes / size)
    }

    /// Bytes taken by `count` records.
    pub fn bytes_for(&self, count: u64) -> Result<u64, LayoutError> {
        count
            .checked_mul(self.record_byte_size() as u64)
            .ok_or(LayoutError::SizeOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn u32_full_coords_q19() {
        let l = RecordLayout::new(CoordType::U32, true, true, QuantityType::F32, 19).unwrap();
        assert_eq!(l.col_row_byte_offset(), 0);
        assert_eq!(l.grid_byte_offset(), 8);
        assert_eq!(l.quantity_byte_offset(), 20);
        assert_eq!(l.record_byte_size(), 96);
    }

    #[test]
    fn col_row_only() {
        let l = RecordLayout::new(CoordType::U16, true, false, QuantityType::F64, 27).unwrap();
        assert_eq!(l.grid_byte_offset(), 4);
        assert_eq!(l.quantity_byte_offset(), 4);
        assert_eq!(l.record_byte_size(), 4 + 8 * 27);
    }

    #[test]
    fn grid_only() {
        let l = RecordLayout::new(CoordType::U64, false, true, QuantityType::F16, 7).unwrap();
        assert_eq!(l.grid_byte_offset(), 0);
        assert_eq!(l.quantity_byte_offset(), 24);
        assert_eq!(l.record_byte_size(), 24 + 2 * 7);
    }

    #[test]
    fn no_coords_puts_q_first() {
        let l = RecordLayout::new(CoordType::U32, false, false, QuantityType::F32, 3).unwrap();
        assert_eq!(l.quantity_byte_offset(), 0);
        assert_eq!(l.record_byte_size(), 12);
    }

    #[test]
    fn zero_quantity_count_rejected() {
        let err = RecordLayout::new(CoordType::U16, true, true, QuantityType::F32, 0).unwrap_err();
        assert!(matches!(err, LayoutError::ZeroQuantityCount));
    }

    #[test]
    fn oversized_quantity_count_rejected() {
        assert!(RecordLayout::new(CoordType::U64, true, true, QuantityType::F64, MAX_QUANTITY_COUNT).is_ok());
        let err = RecordLayout::new(CoordType::U16, true, true, QuantityType::F64, u32::MAX as usize).unwrap_err();
        assert!(matches!(err, LayoutError::QuantityCountTooLarge(n) if n == u32::MAX as usize));
    }

    #[test]
    fn bytes_for_checks_overflow() {
        let l = RecordLayout::new(CoordType::U32, true, true, QuantityType::F32, 19).unwrap();
        assert_eq!(l.bytes_for(10).unwrap(), 960);
        assert!(matches!(l.bytes_for(u64::MAX / 2).unwrap_err(), LayoutError::SizeOverflow));
    }

    #[test]
    fn tags_resolve_and_reject() {
        assert_eq!(CoordType::from_tag("UInt16").unwrap(), CoordType::U16);
        assert_eq!(CoordType::from_tag("uint64_t").unwrap(), CoordType::U64);
        assert_eq!(QuantityType::from_tag("half").unwrap(), QuantityType::F16);
        assert_eq!(QuantityType::from_tag("Double").unwrap(), QuantityType::F64);
        assert!(matches!(
            CoordType::from_tag("Int").unwrap_err(),
            LayoutError::UnsupportedCoordType(t) if t == "Int"
        ));
        assert!(matches!(
            QuantityType::from_tag("float128").unwrap_err(),
            LayoutError::UnsupportedQuantityType(_)
        ));
    }

    #[test]
    fn canonical_tags_resolve_to_themselves() {
        for c in CoordType::ALL {
            assert_eq!(CoordType::from_tag(c.tag()).unwrap(), c);
        }
        for q in QuantityType::ALL {
            assert_eq!(QuantityType::from_tag(q.tag()).unwrap(), q);
        }
    }

    #[test]
    fn records_in_requires_whole_records() {
        let l = RecordLayout::new(CoordType::U32, true, true, QuantityType::F32, 19).unwrap();
        assert_eq!(l.records_in(96 * 10), Some(10));
        assert_eq!(l.records_in(96 * 10 + 1), None);
    }

    fn any_layout() -> impl Strategy<Value = RecordLayout> {
        (0..3usize, any::<bool>(), any::<bool>(), 0..3usize, 1..64usize).prop_map(
            |(c, cr, g, q, n)| {
                RecordLayout::new(CoordType::ALL[c], cr, g, QuantityType::ALL[q], n).unwrap()
            },
        )
    }

    proptest! {
        #[test]
        fn offsets_are_ordered_and_sum(l in any_layout()) {
            prop_assert_eq!(
                l.record_byte_size(),
                l.quantity_byte_offset() + l.quantity_size() * l.quantity_count()
            );
            prop_assert!(l.col_row_byte_offset() <= l.grid_byte_offset());
            prop_assert!(l.grid_byte_offset() <= l.quantity_byte_offset());
            prop_assert!(l.quantity_byte_offset() < l.record_byte_size());
        }
    }
}
