use anyhow::Result;
use byterange::{
    normalize_path, parse_byte_count,
    range::{dump_range, read_range},
    util::{hex_dump, hex_upper},
};
use clap::{ArgAction, Parser};
use std::io::Write;

#[derive(Parser, Debug)]
#[command(version, about = "Read bytes from an arbitrary range of a file")]
struct Args {
    /// Don't print a newline after the requested data
    #[arg(short = 'n', long = "no-newline", action = ArgAction::SetTrue)]
    no_newline: bool,

    /// Starting offset into the file (e.g. 512, 0x200, 4k+512)
    #[arg(short, long, default_value = "0")]
    offset: String,

    /// Number of bytes to read (default: everything from offset to end of file)
    #[arg(short, long)]
    count: Option<String>,

    /// Print output as uppercase hex, two digits per byte
    #[arg(short = 'x', long, action = ArgAction::SetTrue)]
    hexdump: bool,

    /// Print a canonical hex view with offsets and an ASCII column
    #[arg(short = 'C', long, action = ArgAction::SetTrue, conflicts_with = "hexdump")]
    canonical: bool,

    /// Emit a JSON report instead of the data itself
    #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["hexdump", "canonical"])]
    json: bool,

    /// Input file to read
    #[arg(value_name = "INFILE")]
    infile: String,
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
    let count = args.count.as_deref().map(parse_byte_count).transpose()?;
    let path = normalize_path(&args.infile);
    tracing::debug!(path = %path.display(), offset, ?count, "resolved arguments");

    if args.json {
        let dump = dump_range(&path, offset, count)?;
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    let data = read_range(&path, offset, count)?;
    let out = render(data, offset, args);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&out)?;
    if needs_newline(&out, args.no_newline) {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

fn render(data: Vec<u8>, offset: u64, args: &Args) -> Vec<u8> {
    if args.canonical {
        hex_dump(&data, offset).into_bytes()
    } else if args.hexdump {
        hex_upper(&data).into_bytes()
    } else {
        data
    }
}

fn needs_newline(out: &[u8], suppressed: bool) -> bool {
    !suppressed && out.last() != Some(&b'\n')
}
