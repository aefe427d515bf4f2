use std::fmt::Write;

use crate::histogram::{Analysis, RequestSummary, WasteReport, PAGE_SIZE};

pub(super) fn render(analysis: &Analysis) -> String {
    let mut out = String::new();
    render_requests(&mut out, &analysis.summary);
    for report in &analysis.waste {
        render_waste(&mut out, report);
    }
    out
}

fn render_requests(out: &mut String, summary: &RequestSummary) {
    let total = summary.total();

    let _ = writeln!(out, "Number of objects");
    let _ = writeln!(out, "Scanned\tNot scanned\tTotal");
    let _ = writeln!(
        out,
        "{}\t{}\t{}\n",
        summary.scanned.objects, summary.no_scan.objects, total.objects
    );

    let _ = writeln!(out, "Bytes");
    let _ = writeln!(out, "Scanned\tNot scanned\tTotal");
    let _ = writeln!(
        out,
        "{}\t{}\t{}\n",
        summary.scanned.bytes, summary.no_scan.bytes, total.bytes
    );

    let _ = writeln!(out, "Different object sizes");
    let _ = writeln!(out, "{}\n", summary.distinct_sizes);

    let _ = writeln!(out, "Objects requested");
    let _ = writeln!(out, "Bin Size\tNumber\tBytes");
    for usage in &summary.bins {
        let _ = writeln!(
            out,
            "{}\t{}\t{}",
            usage.bin.capacity, usage.usage.objects, usage.usage.bytes
        );
    }
    let _ = writeln!(
        out,
        ">{}\t{}\t{}\n",
        PAGE_SIZE, summary.overflow.objects, summary.overflow.bytes
    );
}

fn render_waste(out: &mut String, report: &WasteReport) {
    let _ = writeln!(out, "Real allocated bytes for mode {}", report.mode.label());
    let _ = writeln!(out, "Totals");
    let _ = writeln!(out, "Requested\tWasted\tTotal");
    let _ = writeln!(
        out,
        "{}\t{}\t{}",
        report.requested_bytes,
        report.total_wasted(),
        report.total_allocated()
    );
    let _ = writeln!(out, "Bin\tWasted");
    for bin in &report.bins {
        let _ = writeln!(out, "{}\t{}", bin.bin.capacity, bin.wasted);
    }
    let _ = writeln!(out, ">{}\t{}\n", PAGE_SIZE, report.overflow.wasted);
}
