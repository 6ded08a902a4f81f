use rusqlite::hooks::Action;
use syncball_core::{
    CancelFlag, Country, Coverage, EntityId, League, RepoError, RepoOutcome, Repository,
    RepositoryManager, Season, TransactionState,
};

fn migrated() -> RepositoryManager {
    let manager = RepositoryManager::open_in_memory().unwrap();
    manager.migrate().unwrap();
    manager
}

fn country_with_league(manager: &RepositoryManager) -> (Country, League) {
    let mut england = Country::new("England", Some("EN"));
    manager.countries().upsert(&mut england);
    manager.complete().unwrap();
    let england = manager.countries().find_by_name("England").unwrap().unwrap();

    let mut premier = League::new(39, "Premier League", england.id);
    premier.enabled = true;
    manager.leagues().upsert(&mut premier);
    manager.complete().unwrap();
    (england, premier)
}

fn season_with_coverage(manager: &RepositoryManager, league_id: EntityId) -> Season {
    let mut season = Season::new(league_id, "2024", "2024-08-16", "2025-05-25");
    manager.seasons().upsert(&mut season);
    manager.complete().unwrap();
    let season = manager
        .seasons()
        .find_by_league_and_year(league_id, "2024")
        .unwrap()
        .unwrap();

    let mut coverage = Coverage {
        season_id: season.id,
        standings: true,
        ..Coverage::default()
    };
    manager.coverage().upsert(&mut coverage);
    manager.complete().unwrap();
    season
}

#[test]
fn commit_and_rollback_require_an_open_transaction() {
    let manager = migrated();
    assert_eq!(manager.state(), TransactionState::Idle);

    assert!(matches!(
        manager.commit_transaction(),
        Err(RepoError::TransactionState {
            operation: "commit_transaction",
            state: TransactionState::Idle,
        })
    ));
    assert!(matches!(
        manager.rollback_transaction(),
        Err(RepoError::TransactionState { .. })
    ));
}

#[test]
fn nested_begin_is_rejected() {
    let manager = migrated();
    manager.begin_transaction().unwrap();
    assert_eq!(manager.state(), TransactionState::InTransaction);

    let err = manager.begin_transaction().unwrap_err();
    assert!(err.to_string().contains("in a transaction"));
    manager.commit_transaction().unwrap();
    assert_eq!(manager.state(), TransactionState::Idle);
}

#[test]
fn commit_flushes_pending_writes() {
    let manager = migrated();
    manager.begin_transaction().unwrap();
    manager.countries().upsert(&mut Country::new("Norway", None));

    assert_eq!(manager.commit_transaction().unwrap(), 1);
    assert_eq!(manager.staged_count(), 0);
    assert!(manager.countries().exists_by_name("Norway").unwrap());
}

#[test]
fn rollback_undoes_completed_and_staged_writes() {
    let manager = migrated();
    manager.begin_transaction().unwrap();

    manager.countries().upsert(&mut Country::new("Norway", None));
    assert_eq!(manager.complete().unwrap(), 1);
    assert_eq!(manager.state(), TransactionState::InTransaction);
    assert!(manager.countries().exists_by_name("Norway").unwrap());

    manager.countries().upsert(&mut Country::new("Sweden", None));
    manager.rollback_transaction().unwrap();

    assert_eq!(manager.staged_count(), 0);
    assert!(manager.countries().get_all().is_empty());
}

#[test]
fn failed_batch_is_atomic_and_discarded() {
    let manager = migrated();
    manager.countries().upsert(&mut Country::new("Norway", None));
    manager
        .leagues()
        .upsert(&mut League::new(103, "Eliteserien", 9_999));
    assert_eq!(manager.staged_count(), 2);

    assert!(matches!(manager.complete(), Err(RepoError::Db(_))));
    assert_eq!(manager.staged_count(), 0);
    assert!(manager.countries().get_all().is_empty());
    assert!(manager.leagues().get_all().is_empty());
}

#[test]
fn deleting_country_owned_by_league_fails_and_rolls_back() {
    let manager = migrated();
    let (england, premier) = country_with_league(&manager);

    manager.begin_transaction().unwrap();
    assert_eq!(manager.countries().delete(&england), RepoOutcome::Applied);
    assert!(manager.complete().is_err());
    assert_eq!(manager.state(), TransactionState::InTransaction);
    manager.rollback_transaction().unwrap();

    assert!(manager.countries().exists(england.id));
    let league = manager.leagues().get_by_id(premier.id).unwrap();
    assert!(league.enabled);
}

#[test]
fn deleting_season_cascades_to_coverage() {
    let manager = migrated();
    let (_, premier) = country_with_league(&manager);
    let season = season_with_coverage(&manager, premier.id);
    assert!(manager.coverage().get_by_season_id(season.id).is_some());

    assert_eq!(manager.seasons().delete(&season), RepoOutcome::Applied);
    manager.complete().unwrap();

    assert!(manager.coverage().get_by_season_id(season.id).is_none());
    assert!(manager.coverage().get_all().is_empty());
}

#[test]
fn deleting_league_with_seasons_is_restricted() {
    let manager = migrated();
    let (_, premier) = country_with_league(&manager);
    season_with_coverage(&manager, premier.id);

    manager.leagues().delete(&premier);
    assert!(manager.complete().is_err());
    assert!(manager.leagues().exists(premier.id));
}

#[test]
fn raised_cancel_flag_discards_the_batch() {
    let manager = migrated();
    manager.countries().upsert(&mut Country::new("Norway", None));
    manager.countries().upsert(&mut Country::new("Sweden", None));

    let cancel = CancelFlag::new();
    let observer = cancel.clone();
    observer.cancel();

    match manager.complete_cancellable(&cancel) {
        Err(RepoError::Cancelled { discarded }) => assert_eq!(discarded, 2),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(manager.staged_count(), 0);
    assert!(manager.countries().get_all().is_empty());
}

#[test]
fn cancel_raised_mid_flush_undoes_writes_already_run() {
    let manager = migrated();
    manager.countries().upsert(&mut Country::new("Norway", None));
    manager.countries().upsert(&mut Country::new("Sweden", None));
    manager.countries().upsert(&mut Country::new("Denmark", None));

    let cancel = CancelFlag::new();
    let trip = cancel.clone();
    manager
        .connection()
        .update_hook(Some(move |_: Action, _: &str, table: &str, _: i64| {
            if table == "Countries" {
                trip.cancel();
            }
        }));

    match manager.complete_cancellable(&cancel) {
        Err(RepoError::Cancelled { discarded }) => assert_eq!(discarded, 3),
        other => panic!("unexpected result: {other:?}"),
    }
    manager
        .connection()
        .update_hook(None::<fn(Action, &str, &str, i64)>);

    assert_eq!(manager.staged_count(), 0);
    assert!(manager.countries().get_all().is_empty());
    assert!(!manager.countries().exists_by_name("Norway").unwrap());
}

#[test]
fn cancel_mid_flush_inside_a_transaction_keeps_earlier_batches() {
    let manager = migrated();
    manager.begin_transaction().unwrap();
    manager.countries().upsert(&mut Country::new("Norway", None));
    manager.complete().unwrap();

    manager.countries().upsert(&mut Country::new("Sweden", None));
    manager.countries().upsert(&mut Country::new("Denmark", None));
    let cancel = CancelFlag::new();
    let trip = cancel.clone();
    manager
        .connection()
        .update_hook(Some(move |_: Action, _: &str, _: &str, _: i64| trip.cancel()));
    assert!(matches!(
        manager.complete_cancellable(&cancel),
        Err(RepoError::Cancelled { discarded: 2 })
    ));
    manager
        .connection()
        .update_hook(None::<fn(Action, &str, &str, i64)>);

    assert_eq!(manager.state(), TransactionState::InTransaction);
    manager.commit_transaction().unwrap();
    let names: Vec<String> = manager
        .countries()
        .get_all()
        .into_iter()
        .map(|country| country.name)
        .collect();
    assert_eq!(names, vec!["Norway".to_string()]);
}

#[test]
fn untouched_cancel_flag_flushes_normally() {
    let manager = migrated();
    manager.countries().upsert(&mut Country::new("Norway", None));
    assert_eq!(manager.complete_cancellable(&CancelFlag::new()).unwrap(), 1);
}

#[test]
fn discard_staged_drops_pending_writes() {
    let manager = migrated();
    manager.countries().upsert(&mut Country::new("Norway", None));
    manager.countries().upsert(&mut Country::new("Sweden", None));

    assert_eq!(manager.discard_staged(), 2);
    assert_eq!(manager.complete().unwrap(), 0);
    assert!(manager.countries().get_all().is_empty());
}

#[test]
fn dropping_manager_mid_transaction_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("syncball.db");

    let manager = RepositoryManager::open(&path).unwrap();
    manager.migrate().unwrap();
    manager.begin_transaction().unwrap();
    manager.countries().upsert(&mut Country::new("Norway", None));
    manager.complete().unwrap();
    manager.countries().upsert(&mut Country::new("Sweden", None));
    drop(manager);

    let reopened = RepositoryManager::open(&path).unwrap();
    assert!(reopened.countries().get_all().is_empty());
    assert_eq!(reopened.state(), TransactionState::Idle);
}

#[test]
fn idle_complete_is_durable_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("syncball.db");

    let manager = RepositoryManager::open(&path).unwrap();
    manager.migrate().unwrap();
    manager.countries().upsert(&mut Country::new("Norway", None));
    manager.complete().unwrap();
    drop(manager);

    let reopened = RepositoryManager::open(&path).unwrap();
    assert!(reopened.countries().exists_by_name("Norway").unwrap());
}
