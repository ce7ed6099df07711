//! ASCII Tecplot exports: one frame per time step, each a quad zone written
//! variable by variable, followed by its cell connectivity.

pub mod arrays;
pub mod connectivity;
pub mod cursor;
pub mod frame;
pub mod zone_header;

pub use arrays::ArrayReader;
pub use connectivity::ConnectivityReader;
pub use cursor::TextCursor;
pub use frame::{FrameReader, FrameStage, TecplotParser};
pub use zone_header::{FrameHeader, ZoneHeaderParser};
