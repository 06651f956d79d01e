//! Read paths over a document with two recorded amendments

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use lawdelta_core::errors::ExErrorKind;
use lawdelta_core::model::SectionChangeKind;
use lawdelta_core::parser::{parse_sections, section_map};
use lawdelta_core::reconstruct::ReconstructionSource;
use lawdelta_engine::commands::diff_api::{diff_between_on, history, version_at_on};
use lawdelta_engine::commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};

fn today() -> chrono::NaiveDate {
    date("2026-10-17")
}

fn section_texts(v: &lawdelta_engine::commands::diff_api::LawVersion) -> Vec<(String, String)> {
    v.sections
        .iter()
        .map(|s| (s.section.clone(), s.text.clone()))
        .collect()
}

#[test]
fn test_history_lists_amendments_chronologically() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let h = history(&conn, NUMBER).unwrap();

    assert_eq!(h.base_law_number, NUMBER);
    let numbers: Vec<_> = h.amendments.iter().map(|a| a.amendment_number.as_str()).collect();
    assert_eq!(numbers, vec!["SFS 2020:100", "SFS 2024:5"]);
    assert_eq!(
        (
            h.amendments[0].sections_added,
            h.amendments[0].sections_modified,
            h.amendments[0].sections_repealed
        ),
        (1, 1, 0)
    );
    assert_eq!(h.amendments[1].sections_repealed, 1);
    assert_eq!(
        h.available_version_dates,
        vec![date("2020-01-01"), date("2024-01-01")]
    );
}

#[test]
fn test_history_json_shape() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let json = serde_json::to_value(history(&conn, NUMBER).unwrap()).unwrap();

    assert_eq!(json["baseLawNumber"], NUMBER);
    assert_eq!(json["availableVersionDates"][0], "2020-01-01");
    assert_eq!(json["amendments"][1]["amendmentNumber"], "SFS 2024:5");
    assert_eq!(json["amendments"][1]["effectiveDate"], "2024-01-01");
}

#[test]
fn test_version_between_amendments() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let v = version_at_on(&conn, NUMBER, date("2022-06-01"), today()).unwrap();

    assert_eq!(
        section_texts(&v),
        vec![
            ("1".to_string(), "A2".to_string()),
            ("2".to_string(), "B".to_string()),
            ("3".to_string(), "C".to_string())
        ]
    );
    assert_eq!(v.applied_amendments, vec!["SFS 2020:100"]);
    assert!(!v.predates_history);
    assert_eq!(v.source, ReconstructionSource::Replay);
}

#[test]
fn test_version_after_last_amendment() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let v = version_at_on(&conn, NUMBER, date("2025-01-01"), today()).unwrap();

    assert_eq!(
        section_texts(&v),
        vec![
            ("1".to_string(), "A2".to_string()),
            ("3".to_string(), "C".to_string())
        ]
    );
    assert_eq!(v.applied_amendments, vec!["SFS 2020:100", "SFS 2024:5"]);
}

#[test]
fn test_version_today_matches_live_document() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let v = version_at_on(&conn, NUMBER, today(), today()).unwrap();

    let live: Vec<(String, String)> = section_map(&parse_sections(AFTER_2024))
        .into_values()
        .map(|s| (s.key.section_label(), s.body))
        .collect();
    assert_eq!(section_texts(&v), live);
}

#[test]
fn test_version_before_history_is_flagged() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let v = version_at_on(&conn, NUMBER, date("2010-01-01"), today()).unwrap();

    assert!(v.predates_history);
    assert!(v.applied_amendments.is_empty());
    assert_eq!(
        section_texts(&v),
        vec![
            ("1".to_string(), "A".to_string()),
            ("2".to_string(), "B".to_string())
        ]
    );
}

#[test]
fn test_applied_amendments_grow_monotonically() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let dates = ["2015-01-01", "2020-01-01", "2022-01-01", "2024-01-01", "2026-01-01"];
    let applied: Vec<Vec<String>> = dates
        .iter()
        .map(|d| {
            version_at_on(&conn, NUMBER, date(d), today())
                .unwrap()
                .applied_amendments
        })
        .collect();

    for pair in applied.windows(2) {
        assert!(pair[0].iter().all(|a| pair[1].contains(a)));
    }
}

#[test]
fn test_diff_between_dates() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let d = diff_between_on(&conn, NUMBER, date("2019-06-01"), date("2025-01-01"), today())
        .unwrap();

    let rows: Vec<_> = d
        .sections
        .iter()
        .map(|s| (s.section.as_str(), s.change_type))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("1", SectionChangeKind::Modified),
            ("2", SectionChangeKind::Repealed),
            ("3", SectionChangeKind::Added),
        ]
    );
    assert_eq!(d.summary.sections_added, 1);
    assert_eq!(d.summary.sections_removed, 1);
    assert_eq!(d.summary.sections_modified, 1);
    assert_eq!(d.amendments_between, vec!["SFS 2020:100", "SFS 2024:5"]);
    assert!(d.sections[0].word_diff.is_some());
    assert!(d.sections[1].word_diff.is_none());
}

#[test]
fn test_diff_between_swaps_reversed_dates() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let forward =
        diff_between_on(&conn, NUMBER, date("2021-01-01"), date("2025-01-01"), today()).unwrap();
    let reversed =
        diff_between_on(&conn, NUMBER, date("2025-01-01"), date("2021-01-01"), today()).unwrap();

    assert_eq!(forward, reversed);
    assert_eq!(forward.from, date("2021-01-01"));
}

#[test]
fn test_diff_json_omits_absent_texts() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let d = diff_between_on(&conn, NUMBER, date("2021-01-01"), date("2025-01-01"), today())
        .unwrap();
    let json = serde_json::to_value(&d).unwrap();

    let repealed = &json["sections"][0];
    assert_eq!(repealed["changeType"], "REPEALED");
    assert_eq!(repealed["section"], "2");
    assert_eq!(repealed["sortKey"], "000.000.002.000");
    assert_eq!(repealed["oldText"], "B");
    assert!(repealed.get("newText").is_none());
    assert_eq!(json["baseLawNumber"], NUMBER);
    assert_eq!(json["from"], "2021-01-01");
}

#[test]
fn test_unknown_document_is_not_found() {
    let (_dir, conn) = setup_db();

    assert_eq!(history(&conn, "SFS 1900:1").unwrap_err().kind(), ExErrorKind::NotFound);
    assert_eq!(
        version_at_on(&conn, "SFS 1900:1", date("2020-01-01"), today())
            .unwrap_err()
            .kind(),
        ExErrorKind::NotFound
    );
}

#[test]
fn test_engine_query_dispatch() {
    let (_dir, mut conn) = setup_db();
    seed_history(&mut conn);

    let result = apply_engine_query(
        EngineQuery::VersionAt {
            document_number: NUMBER.to_string(),
            date: date("2022-06-01"),
        },
        &conn,
        today(),
    )
    .unwrap();

    match result {
        EngineQueryResult::VersionAt(v) => assert_eq!(v.applied_amendments, vec!["SFS 2020:100"]),
        other => panic!("unexpected result: {other:?}"),
    }
}
