use std::fmt::Write;

use crate::histogram::{percent, Analysis, RequestSummary, WasteReport};

use super::format::{byte_size, grouped, percentage, with_cumulative, with_share};

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
    let _ = writeln!(
        out,
        "Total requested: {} objects, {}",
        grouped(total.objects),
        byte_size(total.bytes)
    );
    for (label, totals) in [("Scanned", summary.scanned), ("Not scanned", summary.no_scan)] {
        let _ = writeln!(
            out,
            "\t{}: {} objects, {}",
            label,
            with_share(&grouped(totals.objects), percent(totals.objects, total.objects)),
            with_share(&byte_size(totals.bytes), percent(totals.bytes, total.bytes)),
        );
    }
    let _ = writeln!(out, "Different object sizes: {}", grouped(summary.distinct_sizes as u64));

    let _ = writeln!(out, "Objects requested with a bin size of:");
    let cumulative = summary.cumulative();
    for (i, usage) in summary.bins.iter().enumerate() {
        let u = usage.usage;
        if u.objects == 0 {
            continue;
        }
        let objects = grouped(u.objects);
        let bytes = byte_size(u.bytes);
        let (objects, bytes) = if i == 0 {
            (
                with_share(&objects, percent(u.objects, total.objects)),
                with_share(&bytes, percent(u.bytes, total.bytes)),
            )
        } else {
            (
                with_cumulative(
                    &objects,
                    percent(u.objects, total.objects),
                    percent(cumulative[i].objects, total.objects),
                ),
                with_cumulative(
                    &bytes,
                    percent(u.bytes, total.bytes),
                    percent(cumulative[i].bytes, total.bytes),
                ),
            )
        };
        let _ = writeln!(
            out,
            "\t{} bytes: {} objects, {}",
            usage.bin.capacity, objects, bytes
        );
    }

    let overflow = summary.overflow;
    if overflow.objects > 0 {
        let _ = writeln!(
            out,
            "\tmore than a page: {} objects, {}",
            with_share(&grouped(overflow.objects), percent(overflow.objects, total.objects)),
            with_share(&byte_size(overflow.bytes), percent(overflow.bytes, total.bytes)),
        );
    }
}

fn render_waste(out: &mut String, report: &WasteReport) {
    let total_wasted = report.total_wasted();
    let _ = writeln!(out, "{} mode:", report.mode.label());
    let _ = writeln!(out, "\tTotal allocated: {}", byte_size(report.total_allocated()));
    let wasted = match report.wasted_percent() {
        Some(p) => format!("{}, {}", byte_size(total_wasted), percentage(p)),
        None => byte_size(total_wasted),
    };
    let _ = writeln!(out, "\tTotal wasted: {}", wasted);

    let _ = writeln!(out, "\tWasted due to objects that should use a bin of:");
    let cumulative = report.cumulative_shares();
    for (i, bin) in report.bins.iter().enumerate() {
        if bin.objects == 0 && bin.wasted == 0 {
            continue;
        }
        let bytes = byte_size(bin.wasted);
        let line = if i == 0 {
            with_share(&bytes, report.share(bin.wasted))
        } else {
            with_cumulative(&bytes, report.share(bin.wasted), cumulative[i])
        };
        let _ = writeln!(out, "\t  {} bytes: {}", bin.bin.capacity, line);
    }

    if report.overflow.objects > 0 {
        let _ = writeln!(
            out,
            "\t  more than a page: {}",
            with_share(&byte_size(report.overflow.wasted), report.share(report.overflow.wasted))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{AnalysisConfig, SizeFrequencies};
    use crate::trace::Record;

    #[test]
    fn empty_trace_renders_without_percentages() {
        let analysis = Analysis::run(&SizeFrequencies::new(), &AnalysisConfig::default()).unwrap();
        let text = render(&analysis);
        assert!(text.contains("Total requested: 0 objects, 0 bytes"));
        assert!(text.contains("\tScanned: 0 objects, 0 bytes"));
        assert!(text.contains("\tTotal wasted: 0 bytes\n"));
        assert!(!text.contains('%'));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn skips_empty_bins_and_shows_cumulative_shares() {
        let records = [
            Record::no_scan(10).unwrap(),
            Record::no_scan(20).unwrap(),
            Record::no_scan(4097).unwrap(),
        ];
        let freqs = SizeFrequencies::from_records(&records);
        let text = render(&Analysis::run(&freqs, &AnalysisConfig::default()).unwrap());

        assert!(text.contains("\t16 bytes: 1 (33.33%) objects, 10 bytes (0.24%)"));
        assert!(text.contains("\t32 bytes: 1 (33.33%, 66.67% cumulative) objects"));
        assert!(!text.contains("\t64 bytes"));
        assert!(text.contains("\tmore than a page: 1 (33.33%) objects"));
        assert!(text.contains("Conservative mode:\n\tTotal allocated: 4,146 bytes [4.05KiB]"));
        assert!(text.contains("\t  16 bytes: 6 bytes (31.58%)"));
        assert!(text.contains("\t  32 bytes: 12 bytes (63.16%, 94.74% cumulative)"));
        assert!(text.contains("\t  more than a page: 1 bytes (5.26%)"));
    }
}
