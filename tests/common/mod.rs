#![allow(dead_code)]

use std::env;
use std::fs;
use std::path::PathBuf;

use mempat::{read_trace, Record, TraceLayout};

const UPDATE_VAR: &str = "MEMPAT_UPDATE_SNAPSHOTS";

/// Golden file under `tests/snapshots/`.
fn golden_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "snapshots", name]
        .iter()
        .collect()
}

/// 1-based number and contents of the first line where two reports differ.
/// Line endings are ignored; a side that ran out of lines shows as `<eof>`.
pub fn first_difference<'a>(golden: &'a str, rendered: &'a str) -> Option<(usize, &'a str, &'a str)> {
    let mut golden_lines = golden.lines();
    let mut rendered_lines = rendered.lines();
    for line_no in 1.. {
        match (golden_lines.next(), rendered_lines.next()) {
            (None, None) => return None,
            (g, r) if g == r => continue,
            (g, r) => return Some((line_no, g.unwrap_or("<eof>"), r.unwrap_or("<eof>"))),
        }
    }
    None
}

/// Compare `rendered` with the golden file `name`, or rewrite the golden
/// file when `MEMPAT_UPDATE_SNAPSHOTS` is set.
pub fn assert_snapshot(name: &str, rendered: &str) {
    let path = golden_path(name);
    if env::var_os(UPDATE_VAR).is_some() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).expect("golden directory is writable");
        }
        fs::write(&path, rendered).expect("golden file is writable");
        return;
    }

    let golden = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => panic!("missing golden file {} ({err}); rerun with {UPDATE_VAR}=1", path.display()),
    };
    if let Some((line_no, want, got)) = first_difference(&golden, rendered) {
        panic!(
            "{} differs at line {line_no}\n  golden:   {want:?}\n  rendered: {got:?}\nrerun with {UPDATE_VAR}=1 to accept",
            path.display()
        );
    }
}

/// Trace text with the standard header and `(size, no_scan)` rows.
pub fn trace_text(rows: &[(i64, u8)]) -> String {
    let mut text = String::from("ptr,time,pc,size,attr,type,no_scan\n");
    for (i, (size, no_scan)) in rows.iter().enumerate() {
        text.push_str(&format!("0x{:x},{},0x400000,{},0,0,{}\n", 0x1000 + i * 16, i, size, no_scan));
    }
    text
}

pub fn records(rows: &[(i64, u8)]) -> Vec<Record> {
    read_trace(trace_text(rows).as_bytes(), &TraceLayout::default()).expect("trace parses")
}
