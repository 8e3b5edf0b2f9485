use anyhow::Result;
use byterange::{
    normalize_path, parse_byte_count,
    range::{check_offset, file_size, write_range},
};
use clap::{ArgAction, Parser};
use std::io::Read;

#[derive(Parser, Debug)]
#[command(version, about = "Write standard input to an arbitrary place in a file")]
struct Args {
    /// Starting offset into the file (e.g. 512, 0x200, 4k+512)
    #[arg(short, long, default_value = "0")]
    offset: String,

    /// Skip all offset/filesize checks
    #[arg(short, long, action = ArgAction::SetTrue)]
    insane: bool,

    /// Output file to write. Must already exist, and be large enough to hold the input data.
    #[arg(value_name = "OUTFILE")]
    outfile: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let offset = parse_byte_count(&args.offset)?;
    let path = normalize_path(&args.outfile);

    // fail on a bad offset before blocking on stdin
    let filesize = file_size(&path)?;
    if args.insane {
        tracing::warn!(path = %path.display(), offset, "bounds checks disabled");
    } else {
        check_offset(offset, filesize, &path)?;
    }

    let mut data = Vec::new();
    std::io::stdin().lock().read_to_end(&mut data)?;
    tracing::debug!(path = %path.display(), offset, len = data.len(), "read input");

    write_range(&path, offset, &data, !args.insane)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let a = Args::parse_from(["bytewrite", "out.bin"]);
        assert_eq!(a.offset, "0");
        assert!(!a.insane);
        assert_eq!(a.outfile, "out.bin");
    }

    #[test]
    fn flags() {
        let a = Args::parse_from(["bytewrite", "-o", "0x10", "-i", "out.bin"]);
        assert_eq!(a.offset, "0x10");
        assert!(a.insane);

        let b = Args::parse_from(["bytewrite", "--offset", "4k", "--insane", "out.bin"]);
        assert_eq!(b.offset, "4k");
        assert!(b.insane);
    }

    #[test]
    fn outfile_is_required() {
        assert!(Args::try_parse_from(["bytewrite"]).is_err());
    }
}
