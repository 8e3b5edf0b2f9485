pub mod expr;
pub mod number;
pub mod path;
pub mod range;
pub mod util;

pub use number::{Literal, NumberError, normalize_int, parse_byte_count};
pub use path::normalize_path;
pub use range::{RangeDump, RangeError, dump_range, read_range, write_range};
