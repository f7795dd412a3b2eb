// tests/report_protocol.rs

use std::collections::BTreeSet;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use pmdwatch::analysis::FileViolationSet;
use pmdwatch::engine::PassOutcome;
use pmdwatch::report::diff_report;
use pmdwatch_test_utils::builders::{ViolationBuilder, session_with, violation};
use pmdwatch_test_utils::fake_engine::ScriptedEngine;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn fixed_file_is_cleared_on_the_next_pass() -> TestResult {
    let engine = ScriptedEngine::new()
        .then_ok(vec![
            ViolationBuilder::new("A.pkb")
                .at((3, 5), (3, 40))
                .rule("AvoidSelectStar")
                .priority(1)
                .description("Avoid SELECT *")
                .build(),
            violation("B.sql", 7),
        ])
        .then_ok(vec![
            ViolationBuilder::new("A.pkb")
                .at((3, 5), (3, 40))
                .rule("AvoidSelectStar")
                .priority(1)
                .description("Avoid SELECT *")
                .build(),
        ])
        .shared();
    let (mut session, h) = session_with(engine, Duration::from_millis(200));

    let first = session.run_pass().await?;
    assert_eq!(first, PassOutcome::Reported { files: 2, violations: 2 });
    assert_eq!(
        h.sink.take(),
        [
            "BEGIN-ANALYSIS A.pkb",
            "MSG 3:5 to 3:40 FATAL [AvoidSelectStar] Avoid SELECT *",
            "END-ANALYSIS A.pkb",
            "BEGIN-ANALYSIS B.sql",
            "MSG 7:1 to 7:10 WARNING [TestRule] test violation",
            "END-ANALYSIS B.sql",
        ]
    );

    session.run_pass().await?;
    assert_eq!(
        h.sink.take(),
        [
            "BEGIN-ANALYSIS A.pkb",
            "MSG 3:5 to 3:40 FATAL [AvoidSelectStar] Avoid SELECT *",
            "END-ANALYSIS A.pkb",
            "BEGIN-ANALYSIS B.sql",
            "END-ANALYSIS B.sql",
        ]
    );
    assert_eq!(
        session.previous_files(),
        &BTreeSet::from([PathBuf::from("A.pkb")])
    );

    // Same result again: identical report, no clear-notifications.
    session.run_pass().await?;
    assert_eq!(
        h.sink.take(),
        [
            "BEGIN-ANALYSIS A.pkb",
            "MSG 3:5 to 3:40 FATAL [AvoidSelectStar] Avoid SELECT *",
            "END-ANALYSIS A.pkb",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn failed_pass_keeps_the_previous_baseline() -> TestResult {
    let engine = ScriptedEngine::new()
        .then_ok(vec![violation("A.sql", 1)])
        .then_err("engine crashed")
        .then_ok(vec![])
        .shared();
    let (mut session, h) = session_with(engine, Duration::from_millis(200));

    session.run_pass().await?;
    assert!(matches!(session.run_pass().await?, PassOutcome::Failed(_)));
    assert_eq!(session.previous_files().len(), 1);
    h.sink.take();

    session.run_pass().await?;
    assert_eq!(h.sink.take(), ["BEGIN-ANALYSIS A.sql", "END-ANALYSIS A.sql"]);
    Ok(())
}

#[tokio::test]
async fn single_pass_exit_status_follows_the_outcome() -> TestResult {
    let failing = ScriptedEngine::new().then_err("pmd not found").shared();
    let (mut session, h) = session_with(failing, Duration::from_millis(200));

    let err = session.run_pass().await?.into_result().unwrap_err();
    assert!(err.to_string().contains("pmd not found"), "{err:#}");
    assert_eq!(h.sink.take(), ["ANALYSIS-FAILED pmd not found"]);

    let clean = ScriptedEngine::new().then_ok(vec![violation("A.sql", 2)]).shared();
    let (mut session, _h) = session_with(clean, Duration::from_millis(200));
    session.run_pass().await?.into_result()?;
    Ok(())
}

#[test]
fn report_order_follows_first_occurrence() {
    let set: FileViolationSet = vec![
        violation("z.sql", 1),
        violation("a.sql", 1),
        violation("z.sql", 2),
    ]
    .into_iter()
    .collect();

    let (lines, previous) = diff_report(&set, &BTreeSet::new());
    let rendered: Vec<String> = lines.iter().map(|l| l.to_string()).collect();

    assert_eq!(rendered[0], "BEGIN-ANALYSIS z.sql");
    assert_eq!(rendered[3], "END-ANALYSIS z.sql");
    assert_eq!(rendered[4], "BEGIN-ANALYSIS a.sql");
    assert_eq!(previous.len(), 2);
}
