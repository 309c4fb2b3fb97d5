use chrono::Duration;
use screening_core::model::{
    ChronologicalAge, MilestoneCatalog, MilestoneCategory, MilestoneDraft, MilestoneId,
    RecordedAnswer, Response, ScreeningId, ScreeningRecord,
};
use screening_core::scoring::score_answers;
use screening_core::time::fixed_now;
use storage::repository::{CatalogRepository, ScreeningHistoryRepository};
use storage::sqlite::SqliteRepository;

fn draft(id: u64, age: u32, category: MilestoneCategory) -> MilestoneDraft {
    MilestoneDraft {
        id: MilestoneId::new(id),
        display_name: format!("Milestone {id}"),
        description: (id % 2 == 0).then(|| format!("Description {id}")),
        expected_by_month: Some(age),
        age_equivalent_months: Some(f64::from(age) - 0.5),
        concern_if_missing_by_month: age + 3,
        red_flag: id == 1,
        category,
        display_order: id as u32,
    }
}

fn build_record(drafts: &[MilestoneDraft], responses: &[(u64, Response)]) -> ScreeningRecord {
    let catalog = MilestoneCatalog::from_drafts(drafts.to_vec()).unwrap();
    let answers: Vec<_> = responses
        .iter()
        .map(|&(id, response)| RecordedAnswer::new(MilestoneId::new(id), response))
        .collect();
    let result = score_answers(&catalog, &answers).unwrap();
    let now = fixed_now();
    ScreeningRecord::new(
        ScreeningId::generate(),
        ChronologicalAge::new(9.0).unwrap(),
        result,
        now - Duration::minutes(4),
        now,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_round_trips_the_catalog() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_catalog?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let drafts = vec![
        draft(1, 6, MilestoneCategory::Reflexes),
        draft(2, 9, MilestoneCategory::Locomotion),
        draft(3, 12, MilestoneCategory::ObjectManipulation),
    ];
    repo.replace_milestones(&drafts).await.unwrap();

    let fetched = repo.fetch_milestones().await.unwrap();
    assert_eq!(fetched, drafts);

    // Replacing is wholesale, not additive.
    let replacement = vec![draft(7, 15, MilestoneCategory::Stationary)];
    repo.replace_milestones(&replacement).await.unwrap();
    let fetched = repo.fetch_milestones().await.unwrap();
    assert_eq!(fetched, replacement);
}

#[tokio::test]
async fn sqlite_round_trips_screening_records() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_records?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let drafts = vec![
        draft(1, 6, MilestoneCategory::Stationary),
        draft(2, 9, MilestoneCategory::Locomotion),
    ];
    let record = build_record(&drafts, &[(1, Response::Yes), (2, Response::Sometimes)]);

    let id = repo.append_record(&record).await.unwrap();
    let fetched = repo.get_record(id).await.unwrap();

    assert_eq!(fetched, record);
    assert_eq!(fetched.result().raw_score(), 3);
    assert_eq!(fetched.result().answers().len(), 2);
}

#[tokio::test]
async fn sqlite_append_is_idempotent_on_screening_id() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_idempotent?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let drafts = vec![draft(1, 6, MilestoneCategory::Locomotion)];
    let record = build_record(&drafts, &[(1, Response::Yes)]);

    let first = repo.append_record(&record).await.unwrap();
    let second = repo.append_record(&record).await.unwrap();
    assert_eq!(first, second);

    let rows = repo.list_record_rows(None, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn sqlite_lists_newest_first_with_range_filter() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_listing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let drafts = vec![draft(1, 6, MilestoneCategory::Locomotion)];

    let old = {
        let base = build_record(&drafts, &[(1, Response::Yes)]);
        ScreeningRecord::new(
            base.id(),
            base.chronological_age(),
            base.result().clone(),
            base.started_at() - Duration::days(10),
            base.completed_at() - Duration::days(10),
        )
        .unwrap()
    };
    let recent = build_record(&drafts, &[(1, Response::NotYet)]);

    repo.append_record(&old).await.unwrap();
    let recent_id = repo.append_record(&recent).await.unwrap();

    let all = repo.list_record_rows(None, 10).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, recent_id);

    let filtered = repo
        .list_record_rows(Some(fixed_now() - Duration::days(5)), 10)
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].record.id(), recent.id());

    let limited = repo.list_record_rows(None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, recent_id);
}
