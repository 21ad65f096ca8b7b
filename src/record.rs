use byteorder::{LittleEndian, ReadBytesExt};
use half::f16;
use std::io::{self, Read};

use crate::layout::{CoordType, LayoutError, QuantityType, RecordLayout, COL_ROW_FIELDS, GRID_FIELDS};

/// One decoded record.  Coordinates are widened to `u64`, quantities to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub col_row: Option<[u64; 2]>,
    pub grid:    Option<[u64; 3]>,
    pub q:       Vec<f64>,
}

fn read_coord<R: Read>(reader: &mut R, ty: CoordType) -> io::Result<u64> {
    Ok(match ty {
        CoordType::U16 => reader.read_u16::<LittleEndian>()? as u64,
        CoordType::U32 => reader.read_u32::<LittleEndian>()? as u64,
        CoordType::U64 => reader.read_u64::<LittleEndian>()?,
    })
}

fn read_quantity<R: Read>(reader: &mut R, ty: QuantityType) -> io::Result<f64> {
    Ok(match ty {
        QuantityType::F16 => f16::from_bits(reader.read_u16::<LittleEndian>()?).to_f64(),
        QuantityType::F32 => reader.read_f32::<LittleEndian>()? as f64,
        QuantityType::F64 => reader.read_f64::<LittleEndian>()?,
    })
}

impl RecordLayout {
    /// Decode the first record in `bytes`.  Trailing bytes are ignored.
    pub fn decode(&self, bytes: &[u8]) -> Result<Record, LayoutError> {
        let size = self.record_byte_size();
        if bytes.len() < size {
            return Err(LayoutError::ShortRecord { expected: size, got: bytes.len() });
        }

        let ct = self.coord_type();
        let col_row = if self.has_col_row() {
            let mut r = &bytes[self.col_row_byte_offset()..];
            let mut v = [0u64; COL_ROW_FIELDS];
            for slot in v.iter_mut() {
                *slot = read_coord(&mut r, ct)?;
            }
            Some(v)
        } else {
            None
        };
        let grid = if self.has_grid() {
            let mut r = &bytes[self.grid_byte_offset()..];
            let mut v = [0u64; GRID_FIELDS];
            for slot in v.iter_mut() {
                *slot = read_coord(&mut r, ct)?;
            }
            Some(v)
        } else {
            None
        };

        let mut r = &bytes[self.quantity_byte_offset()..size];
        let q = (0..self.quantity_count())
            .map(|_| read_quantity(&mut r, self.quantity_type()))
            .collect::<io::Result<Vec<f64>>>()?;

        Ok(Record { col_row, grid, q })
    }

    /// Iterate fixed-size records from `reader`.
    pub fn records<R: Read>(&self, reader: R) -> RecordReader<R> {
        RecordReader::new(reader, *self)
    }
}

// ── Streaming reader ─────────────────────────────────────────────────────────

/// Yields one [`Record`] per `record_byte_size` bytes.  A clean EOF on a record
/// boundary ends iteration; a partial trailing record is a `ShortRecord` error.
pub struct RecordReader<R: Read> {
    reader: R,
    layout: RecordLayout,
    buf:    Vec<u8>,
    done:   bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R, layout: RecordLayout) -> Self {
        Self {
            reader,
            buf: vec![0u8; layout.record_byte_size()],
            layout,
            done: false,
        }
    }

    pub fn layout(&self) -> &RecordLayout { &self.layout }

    fn fill(&mut self) -> io::Result<usize> {
        let mut filled = 0;
        while filled < self.buf.len() {
            match self.reader.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let filled = match self.fill() {
            Ok(n)  => n,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        if filled == 0 {
            self.done = true;
            return None;
        }
        if filled < self.buf.len() {
            self.done = true;
            return Some(Err(LayoutError::ShortRecord { expected: self.buf.len(), got: filled }));
        }
        Some(self.layout.decode(&self.buf))
    }
}
