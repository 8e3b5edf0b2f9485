use crate::util::{hex_upper, read_slice, write_slice};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum RangeError {
    #[error("couldn't find file [{}]", .path.display())]
    NotFound { path: PathBuf },
    #[error("offset [{offset}] is too big for file [{}]", .path.display())]
    OffsetTooBig { offset: u64, path: PathBuf },
    #[error("count [{count}] extends past the end of file [{}]", .path.display())]
    CountPastEnd { count: u64, path: PathBuf },
    #[error("data would extend past the end of file [{}]", .path.display())]
    DataPastEnd { path: PathBuf },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RangeError>;

/// A byte range read back from a file, ready for JSON output.
#[derive(Debug, Serialize)]
pub struct RangeDump {
    /// File the range was read from
    pub file: String,
    /// Starting offset of the range
    pub offset: u64,
    /// Number of bytes in the range
    pub count: u64,
    /// Uppercase hex of the bytes, two digits per byte
    pub hex: String,
}

/// Size of `path`, which must be a regular file.
pub fn file_size(path: &Path) -> Result<u64> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        _ => Err(RangeError::NotFound {
            path: path.to_path_buf(),
        }),
    }
}

pub fn check_offset(offset: u64, filesize: u64, path: &Path) -> Result<()> {
    if offset > filesize {
        return Err(RangeError::OffsetTooBig {
            offset,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn fits(offset: u64, len: u64, filesize: u64) -> bool {
    offset.checked_add(len).is_some_and(|end| end <= filesize)
}

/// Read `count` bytes at `offset`, or everything from `offset` to EOF when
/// `count` is `None`. The whole range must lie inside the file.
pub fn read_range(path: &Path, offset: u64, count: Option<u64>) -> Result<Vec<u8>> {
    let filesize = file_size(path)?;
    check_offset(offset, filesize, path)?;

    let count = count.unwrap_or(filesize - offset);
    if !fits(offset, count, filesize) {
        return Err(RangeError::CountPastEnd {
            count,
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(path = %path.display(), offset, count, filesize, "reading range");
    let mut f = File::open(path)?;
    Ok(read_slice(&mut f, offset, count)?)
}

/// [`read_range`] packaged with its hex rendering.
pub fn dump_range(path: &Path, offset: u64, count: Option<u64>) -> Result<RangeDump> {
    let data = read_range(path, offset, count)?;
    Ok(RangeDump {
        file: path.display().to_string(),
        offset,
        count: data.len() as u64,
        hex: hex_upper(&data),
    })
}

/// Overwrite bytes of an existing file in place.
///
/// With `checked`, the data must fit entirely inside the current file and
/// nothing is written otherwise. Without it the write goes wherever `offset`
/// points, growing the file if it lands past the end.
pub fn write_range(path: &Path, offset: u64, data: &[u8], checked: bool) -> Result<()> {
    let filesize = file_size(path)?;
    if checked {
        check_offset(offset, filesize, path)?;
        if !fits(offset, data.len() as u64, filesize) {
            return Err(RangeError::DataPastEnd {
                path: path.to_path_buf(),
            });
        }
    }

    tracing::debug!(path = %path.display(), offset, len = data.len(), filesize, checked, "writing range");
    let mut f = OpenOptions::new().write(true).open(path)?;
    write_slice(&mut f, offset, data)?;
    Ok(())
}
