use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn byteread(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_byteread"))
        .args(args)
        .output()
        .expect("failed to run byteread")
}

fn bytewrite(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_bytewrite"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run bytewrite");
    if let Some(mut stdin) = child.stdin.take() {
        // the tool may exit before reading stdin when a check fails early
        let _ = stdin.write_all(input);
    }
    child.wait_with_output().expect("bytewrite did not finish")
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn reads_whole_file_back() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("in.txt");
    fs::write(&file, b"hello\nworld\n").unwrap();

    let out = byteread(&[path_str(&file)]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(out.stdout, b"hello\nworld\n");
}

#[test]
fn hexdump_and_newline_handling() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ab.bin");
    fs::write(&file, b"AB").unwrap();

    let out = byteread(&["-x", path_str(&file)]);
    assert!(out.status.success());
    assert_eq!(out.stdout, b"4142\n");

    let out = byteread(&["-x", "-n", path_str(&file)]);
    assert_eq!(out.stdout, b"4142");

    let out = byteread(&["--offset", "1", "--count", "0x1", path_str(&file)]);
    assert_eq!(out.stdout, b"B\n");
}

#[test]
fn json_report() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ab.bin");
    fs::write(&file, b"ABCD").unwrap();

    let out = byteread(&["--json", "-o", "1", "-c", "2", path_str(&file)]);
    assert!(out.status.success(), "{}", stderr(&out));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["offset"], 1);
    assert_eq!(v["count"], 2);
    assert_eq!(v["hex"], "4243");
}

#[test]
fn reader_errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ten.bin");
    fs::write(&file, [0u8; 10]).unwrap();

    let out = byteread(&["-o", "100", path_str(&file)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Error: offset [100] is too big"));
    assert!(out.stdout.is_empty());

    let out = byteread(&["-o", "4", "-c", "7", path_str(&file)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("count [7] extends past the end"));

    let out = byteread(&["-o", "bogus", path_str(&file)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("couldn't parse number [bogus]"));

    let missing = dir.path().join("nope.bin");
    let out = byteread(&[path_str(&missing)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("couldn't find file"));
}

#[test]
fn writer_overwrites_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.bin");
    fs::write(&file, [0u8; 10]).unwrap();

    let out = bytewrite(&["-o", "4", path_str(&file)], b"abc");
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(fs::read(&file).unwrap(), b"\0\0\0\0abc\0\0\0");
}

#[test]
fn writer_refuses_to_run_past_end() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.bin");
    fs::write(&file, [0u8; 10]).unwrap();

    let out = bytewrite(&["-o", "8", path_str(&file)], b"wxyz");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("data would extend past the end"));
    assert_eq!(fs::read(&file).unwrap(), vec![0u8; 10]);

    let out = bytewrite(&["-o", "11", path_str(&file)], b"");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("offset [11] is too big"));
    assert_eq!(fs::read(&file).unwrap(), vec![0u8; 10]);
}

#[test]
fn insane_mode_skips_checks() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.bin");
    fs::write(&file, [0u8; 10]).unwrap();

    let out = bytewrite(&["--insane", "-o", "8", path_str(&file)], b"wxyz");
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(fs::read(&file).unwrap(), b"\0\0\0\0\0\0\0\0wxyz");
}

#[test]
fn writer_needs_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("absent.bin");

    let out = bytewrite(&[path_str(&file)], b"data");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("couldn't find file"));
    assert!(!file.exists());
}
