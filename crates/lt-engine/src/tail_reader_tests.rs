use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn classifies_header_and_payload_lines() {
    assert_eq!(classify_tail_line("==> /var/log/app.log <=="), TailLine::Header);
    assert_eq!(classify_tail_line("2026-08-01 ERROR boom"), TailLine::Payload("2026-08-01 ERROR boom".to_string()));
}

#[test]
fn classifies_giving_up_and_reappeared_warnings() {
    assert_eq!(
        classify_tail_line("tail: /var/log/app.log: giving up on this name"),
        TailLine::GivingUp
    );
    assert_eq!(
        classify_tail_line("tail: '/var/log/app.log' has appeared; following new file"),
        TailLine::Reappeared
    );
    assert!(matches!(
        classify_tail_line("tail: some other diagnostic"),
        TailLine::OtherWarning(_)
    ));
}

#[test]
fn resume_point_is_beginning_when_no_timestamp_given() {
    let file = NamedTempFile::new().unwrap();
    let point = compute_resume_point(file.path().to_str().unwrap(), None).unwrap();
    assert_eq!(point, ResumePoint::Beginning);
}

#[test]
fn resume_point_finds_the_first_matching_line() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "2026-08-01T10:00:00+00:00 line one").unwrap();
    writeln!(file, "2026-08-01T11:00:00+00:00 line two").unwrap();
    writeln!(file, "2026-08-01T12:00:00+00:00 line three").unwrap();
    file.flush().unwrap();

    let point = compute_resume_point(file.path().to_str().unwrap(), Some("2026-08-01T11:00:00+00:00")).unwrap();
    assert_eq!(point, ResumePoint::FromLine(2));
}

#[test]
fn resume_point_matches_native_comma_millis_format() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "2024-01-01 00:00:00,000 : TESTRUN : first").unwrap();
    writeln!(file, "2024-01-01 00:00:01,500 : TESTRUN : second").unwrap();
    file.flush().unwrap();

    let point = compute_resume_point(file.path().to_str().unwrap(), Some("2024-01-01 00:00:01,500")).unwrap();
    assert_eq!(point, ResumePoint::FromLine(2));
}

#[test]
fn resume_point_falls_back_to_last_n_when_nothing_matches() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "no timestamps here").unwrap();
    file.flush().unwrap();

    let point = compute_resume_point(file.path().to_str().unwrap(), Some("2026-08-01T00:00:00Z")).unwrap();
    assert_eq!(point, ResumePoint::LastN(LAST_N_LINES_FALLBACK));
}
