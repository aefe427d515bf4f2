#[path = "common/mod.rs"]
mod common;
use common::{assert_snapshot, first_difference, records};
use mempat::{render, Analysis, AnalysisConfig, ReportFormat, SizeFrequencies};

#[test]
fn tsv_report_matches_golden() {
    let records = records(&[
        (10, 1),
        (20, 0),
        (13, 0),
        (100, 0),
        (100, 1),
        (3000, 0),
        (4097, 1),
        (5000, 0),
    ]);
    let freqs = SizeFrequencies::from_records(&records);
    let analysis = Analysis::run(&freqs, &AnalysisConfig::default()).unwrap();

    let actual = render(&analysis, ReportFormat::Tsv);
    assert_snapshot("report/mixed.tsv", &actual);
}

#[test]
fn golden_comparison_points_at_the_first_changed_line() {
    assert_eq!(first_difference("a\tb\r\nc\n", "a\tb\nc\n"), None);
    assert_eq!(
        first_difference("mode\n16\t6\n32\t12\n", "mode\n16\t6\n32\t13\n"),
        Some((3, "32\t12", "32\t13"))
    );
    assert_eq!(first_difference("a\n", "a\nb\n"), Some((2, "<eof>", "b")));
}
