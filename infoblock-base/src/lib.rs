mod bitmap;
mod error;


pub use bitmap::Bitmap;
pub use error::{err, parse_err, schema_err, Error, ErrorKind, Result};
