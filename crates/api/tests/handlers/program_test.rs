use std::collections::HashMap;

use eyre::eyre;
use mockall::predicate;
use pretty_assertions::assert_eq;
use scoutplan_api::{
    handlers::program::{build_detail, ensure_activities_exist, prepare_entries},
    middleware::error_handling::AppError,
};
use scoutplan_core::{
    editor::{CommitOutcome, ProgramEditor},
    errors::PlanError,
    models::{
        activity::ActivitySummary,
        entry::{EntryInput, EntryKind, ProgramEntry},
        program::ProgramDetailResponse,
    },
    schedule,
    time::ClockTime,
};
use uuid::Uuid;

use crate::test_utils::{TestContext, sample_program};

fn activity_entry(activity_id: Uuid, position: i32) -> ProgramEntry {
    ProgramEntry {
        id: Uuid::new_v4(),
        position,
        kind: EntryKind::Activity { activity_id },
    }
}

fn custom_entry(title: &str, minutes: Option<i32>, position: i32) -> ProgramEntry {
    ProgramEntry {
        id: Uuid::new_v4(),
        position,
        kind: EntryKind::Custom {
            custom_title: title.to_string(),
            custom_duration_minutes: minutes,
        },
    }
}

fn summary(id: Uuid, name: &str, minutes: i32) -> ActivitySummary {
    ActivitySummary {
        id,
        name: name.to_string(),
        approximate_duration_minutes: minutes,
    }
}

fn input_for(entry: &ProgramEntry) -> EntryInput {
    EntryInput {
        id: Some(entry.id),
        kind: entry.kind.clone(),
        position: Some(99),
        start_time: Some("23:59".to_string()),
        end_time: None,
    }
}

// Mirrors the read path of the program detail handler against mocks.
async fn detail_from_mocks(
    ctx: &TestContext,
    program_id: Uuid,
) -> Result<ProgramDetailResponse, AppError> {
    let program = ctx
        .program_repo
        .get_program_by_id(program_id)
        .await?
        .ok_or_else(|| PlanError::NotFound(format!("Program with ID {} not found", program_id)))?;
    let entries = ctx.program_repo.get_entries_by_program_id(program_id).await?;
    let ids = entries.iter().filter_map(|e| e.kind.activity_id()).collect();
    let summaries = ctx.activity_repo.get_activity_summaries(ids).await?;

    let scheduled = schedule::compute_schedule(&entries, program.start_time, &summaries);
    Ok(build_detail(program, scheduled, &summaries))
}

#[tokio::test]
async fn test_detail_resolves_names_and_times() {
    let mut ctx = TestContext::new();
    let program = sample_program(Uuid::new_v4(), ClockTime::from_hm(18, 30));
    let program_id = program.id;
    let game = Uuid::new_v4();
    let deleted = Uuid::new_v4();
    let entries = vec![
        activity_entry(game, 0),
        custom_entry("Flag break", Some(10), 1),
        activity_entry(deleted, 2),
        custom_entry("Notices", None, 3),
    ];

    ctx.program_repo
        .expect_get_program_by_id()
        .with(predicate::eq(program_id))
        .times(1)
        .returning(move |_| Ok(Some(program.clone())));
    let stored = entries.clone();
    ctx.program_repo
        .expect_get_entries_by_program_id()
        .with(predicate::eq(program_id))
        .times(1)
        .returning(move |_| Ok(stored.clone()));
    ctx.activity_repo
        .expect_get_activity_summaries()
        .times(1)
        .returning(move |_| Ok(HashMap::from([(game, summary(game, "Capture the flag", 45))])));

    let detail = detail_from_mocks(&ctx, program_id).await.unwrap();

    let times: Vec<(String, String)> = detail
        .entries
        .iter()
        .map(|e| (e.scheduled.start_time.to_string(), e.scheduled.end_time.to_string()))
        .collect();
    assert_eq!(
        times,
        vec![
            ("18:30".to_string(), "19:15".to_string()),
            ("19:15".to_string(), "19:25".to_string()),
            ("19:25".to_string(), "19:25".to_string()),
            ("19:25".to_string(), "19:25".to_string()),
        ]
    );
    assert_eq!(detail.end_time, ClockTime::from_hm(19, 25));
    assert_eq!(detail.entries[0].activity_name.as_deref(), Some("Capture the flag"));
    assert_eq!(detail.entries[0].duration_minutes, 45);
    assert_eq!(detail.entries[2].activity_name, None);
    assert_eq!(detail.entries[1].activity_name, None);
}

#[tokio::test]
async fn test_detail_for_missing_program() {
    let mut ctx = TestContext::new();
    ctx.program_repo
        .expect_get_program_by_id()
        .returning(|_| Ok(None));

    let result = detail_from_mocks(&ctx, Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError(PlanError::NotFound(_)))));
}

#[tokio::test]
async fn test_detail_repository_failure_is_database_error() {
    let mut ctx = TestContext::new();
    ctx.program_repo
        .expect_get_program_by_id()
        .returning(|_| Err(eyre!("connection refused")));

    let result = detail_from_mocks(&ctx, Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError(PlanError::Database(_)))));
}

#[test]
fn test_empty_program_detail_ends_at_start() {
    let program = sample_program(Uuid::new_v4(), ClockTime::from_hm(10, 0));

    let detail = build_detail(program, Vec::new(), &HashMap::new());

    assert!(detail.entries.is_empty());
    assert_eq!(detail.end_time, ClockTime::from_hm(10, 0));
}

#[test]
fn test_detail_json_shape() {
    let program = sample_program(Uuid::new_v4(), ClockTime::from_hm(9, 0));
    let entries = vec![custom_entry("Opening", Some(15), 0)];
    let scheduled = schedule::compute_schedule(&entries, program.start_time, &HashMap::<Uuid, i32>::new());

    let json = serde_json::to_value(build_detail(program, scheduled, &HashMap::new())).unwrap();

    assert_eq!(json["start_time"], "09:00");
    assert_eq!(json["end_time"], "09:15");
    assert_eq!(json["entries"][0]["entry_type"], "custom");
    assert_eq!(json["entries"][0]["custom_title"], "Opening");
    assert_eq!(json["entries"][0]["start_time"], "09:00");
    assert_eq!(json["entries"][0]["end_time"], "09:15");
    assert_eq!(json["entries"][0]["duration_minutes"], 15);
}

#[test]
fn test_prepare_entries_ignores_client_positions() {
    let snapshot = vec![custom_entry("A", Some(5), 0), custom_entry("B", Some(5), 1)];
    let inputs = vec![input_for(&snapshot[1]), input_for(&snapshot[0])];

    let entries = prepare_entries(inputs, &snapshot).unwrap();

    assert_eq!(entries.iter().map(|e| e.position).collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(entries[0].id, snapshot[1].id);
    assert_eq!(entries[1].id, snapshot[0].id);
}

#[test]
fn test_prepare_entries_mints_ids_for_foreign_and_repeated_ids() {
    let snapshot = vec![custom_entry("A", Some(5), 0)];
    let foreign = custom_entry("Stranger", Some(5), 0);
    let inputs = vec![
        input_for(&snapshot[0]),
        input_for(&snapshot[0]),
        input_for(&foreign),
        EntryInput {
            id: None,
            ..input_for(&foreign)
        },
    ];

    let entries = prepare_entries(inputs, &snapshot).unwrap();

    assert_eq!(entries[0].id, snapshot[0].id);
    assert_ne!(entries[1].id, snapshot[0].id);
    assert_ne!(entries[2].id, foreign.id);
    let mut ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_prepare_entries_rejects_kind_change() {
    let snapshot = vec![custom_entry("A", Some(5), 0)];
    let input = EntryInput {
        id: Some(snapshot[0].id),
        kind: EntryKind::Activity {
            activity_id: Uuid::new_v4(),
        },
        position: None,
        start_time: None,
        end_time: None,
    };

    let result = prepare_entries(vec![input], &snapshot);

    assert!(matches!(result, Err(PlanError::Validation(_))));
}

#[test]
fn test_prepare_entries_validates_custom_blocks() {
    let blank = custom_entry("   ", Some(5), 0);
    let negative = custom_entry("Games", Some(-5), 0);

    assert!(prepare_entries(vec![input_for(&blank)], &[]).is_err());
    assert!(prepare_entries(vec![input_for(&negative)], &[]).is_err());
}

#[test]
fn test_written_activities_must_exist() {
    let known_id = Uuid::new_v4();
    let missing_id = Uuid::new_v4();
    let known = HashMap::from([(known_id, summary(known_id, "Kim's game", 15))]);

    assert!(ensure_activities_exist(&[known_id], &known).is_ok());
    assert!(ensure_activities_exist(&[], &known).is_ok());

    let result = ensure_activities_exist(&[known_id, missing_id], &known);
    match result {
        Err(PlanError::Validation(message)) => assert!(message.contains(&missing_id.to_string())),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_replace_rolls_back_on_store_failure() {
    let mut ctx = TestContext::new();
    let program_id = Uuid::new_v4();
    let original = vec![custom_entry("Opening", Some(10), 0)];
    let mut editor = ProgramEditor::new(program_id, ClockTime::from_hm(19, 0), original.clone());

    ctx.entry_store
        .expect_replace_entries()
        .withf(move |id, entries| *id == program_id && entries.len() == 2)
        .times(1)
        .returning(|_, _| Err(eyre!("deadlock detected")));

    let replacement = vec![custom_entry("Games", Some(30), 0), custom_entry("Closing", Some(5), 1)];
    let staged = prepare_entries(
        replacement
            .iter()
            .map(|e| EntryInput { id: None, ..input_for(e) })
            .collect(),
        editor.snapshot(),
    )
    .unwrap();
    editor.stage(staged);

    let outcome = editor.commit(&ctx.entry_store, &HashMap::<Uuid, i32>::new()).await;

    match outcome {
        CommitOutcome::RolledBack { schedule, .. } => {
            assert_eq!(schedule.len(), 1);
            assert_eq!(schedule[0].entry.id, original[0].id);
            assert_eq!(schedule[0].end_time, ClockTime::from_hm(19, 10));
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert_eq!(editor.view(), original.as_slice());
}

#[tokio::test]
async fn test_reorder_commits_renumbered_entries() {
    let mut ctx = TestContext::new();
    let program_id = Uuid::new_v4();
    let entries = vec![
        custom_entry("A", Some(10), 0),
        custom_entry("B", Some(20), 1),
        custom_entry("C", Some(30), 2),
    ];
    let moved = entries[2].id;
    let mut editor = ProgramEditor::new(program_id, ClockTime::from_hm(9, 0), entries);

    ctx.entry_store
        .expect_replace_entries()
        .withf(move |_, scheduled| {
            scheduled[0].entry.id == moved
                && scheduled.iter().enumerate().all(|(i, s)| s.entry.position == i as i32)
        })
        .times(1)
        .returning(|_, _| Ok(()));

    assert!(editor.stage_reorder(moved, 2, 0));
    let outcome = editor.commit(&ctx.entry_store, &HashMap::<Uuid, i32>::new()).await;

    assert!(outcome.is_committed());
    let ends: Vec<String> = outcome.schedule().iter().map(|s| s.end_time.to_string()).collect();
    assert_eq!(ends, vec!["09:30", "09:40", "10:00"]);
}
