use std::fmt::Write as _;
use std::io::{Read, Seek, SeekFrom, Write};

pub fn read_slice<R: Read + Seek>(r: &mut R, offset: u64, len: u64) -> std::io::Result<Vec<u8>> {
    let len = usize::try_from(len)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "length exceeds address space"))?;
    r.seek(SeekFrom::Start(offset))?;
    let mut v = vec![0u8; len];
    r.read_exact(&mut v)?;
    Ok(v)
}

pub fn write_slice<W: Write + Seek>(w: &mut W, offset: u64, data: &[u8]) -> std::io::Result<()> {
    w.seek(SeekFrom::Start(offset))?;
    w.write_all(data)?;
    w.flush()
}

/// Two uppercase hex digits per byte, no separators.
pub fn hex_upper(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Canonical view in the style of `hexdump -C`: offset, two groups of eight
/// bytes, printable characters between bars.
pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    let mut out = String::new();
    let mut offset = start_offset;
    for line in bytes.chunks(16) {
        let (left, right) = line.split_at(line.len().min(8));
        let printable: String = line
            .iter()
            .map(|&c| if c == b' ' || c.is_ascii_graphic() { c as char } else { '.' })
            .collect();
        // String as fmt::Write cannot fail
        let _ = writeln!(
            out,
            "{offset:08x}  {:<23}  {:<23}  |{printable}|",
            spaced_hex(left),
            spaced_hex(right)
        );
        offset += line.len() as u64;
    }
    out
}

fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}
