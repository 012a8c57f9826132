pub mod analyze;
pub mod model;

pub use analyze::{analyze_entries, build_report, Analysis, Block, EdgeKind, EdgeOut, FunctionOut, Report};
pub use model::{load_firmware, read_u8, read_u32, is_mapped, Image, Segment};
