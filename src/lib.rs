pub mod layout;
pub mod record;
pub mod descriptor;
pub mod naming;
pub mod tree;
pub mod geometry;
pub mod params;

mod atomic;

pub use layout::{CoordType, LayoutError, QuantityType, RecordLayout};
pub use record::{Record, RecordReader};
pub use descriptor::{DescriptorError, LayoutDescriptor};
pub use naming::{ComputeUnitId, CuFileKind, PathSegment, PlaneKind, PLOT_FILES_VERSION};
pub use tree::{longest_common_ancestor, OutputTree, SegmentPattern, TreeError, TreeOptions};
pub use geometry::OutputGeometry;
pub use params::{ComputeUnitParams, GridParams, JsonParams, ParamsError};
