use syncball_core::{
    CancelFlag, LeagueSyncItem, LeagueSyncService, RepoError, RepoOutcome, Repository,
    RepositoryManager, TransactionState,
};

const PREMIER_LEAGUE: &str = r#"{
    "country": {
        "name": "England",
        "code": "GB",
        "flag_url": "https://media.example/flags/gb.svg"
    },
    "league": {
        "id": 39,
        "name": "Premier League",
        "type": "League",
        "logo_url": "https://media.example/leagues/39.png"
    },
    "seasons": [
        {
            "season": {
                "year": "2023",
                "start_date": "2023-08-11",
                "end_date": "2024-05-19",
                "current": false
            },
            "coverage": { "events": true, "standings": true }
        },
        {
            "season": {
                "year": "2024",
                "start_date": "2024-08-16",
                "end_date": "2025-05-25",
                "current": true
            },
            "coverage": { "events": true, "lineups": true, "odds": true }
        }
    ]
}"#;

fn migrated() -> RepositoryManager {
    let manager = RepositoryManager::open_in_memory().unwrap();
    manager.migrate().unwrap();
    manager
}

fn item() -> LeagueSyncItem {
    serde_json::from_str(PREMIER_LEAGUE).unwrap()
}

#[test]
fn first_sync_inserts_the_whole_graph() {
    let manager = migrated();
    let report = LeagueSyncService::new(&manager).sync(item()).unwrap();

    assert_eq!(report.country, RepoOutcome::Inserted);
    assert_eq!(report.league, Some(RepoOutcome::Inserted));
    assert_eq!(report.seasons.len(), 2);
    assert!(report
        .seasons
        .iter()
        .all(|season| season.coverage == Some(RepoOutcome::Inserted)));
    assert_eq!(report.rows_written, 6);
    assert_eq!(manager.state(), TransactionState::Idle);

    let country_id = report.country_id.unwrap();
    let league = manager.leagues().get_by_id(39).unwrap();
    assert_eq!(league.country_id, country_id);
    assert_eq!(league.kind, "League");

    let current = manager.seasons().get_current(39).unwrap();
    assert_eq!(current.year, "2024");
    let coverage = manager.coverage().get_by_season_id(current.id).unwrap();
    assert!(coverage.lineups);
    assert!(coverage.odds);
    assert!(!coverage.standings);
}

#[test]
fn resync_resolves_existing_rows() {
    let manager = migrated();
    let service = LeagueSyncService::new(&manager);
    let first = service.sync(item()).unwrap();
    let second = service.sync(item()).unwrap();

    let country_id = first.country_id.unwrap();
    assert_eq!(second.country, RepoOutcome::Updated(country_id));
    assert_eq!(second.league, Some(RepoOutcome::Updated(39)));
    for (before, after) in first.seasons.iter().zip(&second.seasons) {
        assert_eq!(after.season, RepoOutcome::Updated(before.season_id.unwrap()));
        assert!(matches!(after.coverage, Some(RepoOutcome::Updated(_))));
    }

    assert_eq!(manager.countries().get_all().len(), 1);
    assert_eq!(manager.seasons().get_by_league_id(39).len(), 2);
    assert_eq!(manager.coverage().get_all().len(), 2);
}

#[test]
fn rejected_season_skips_only_its_coverage() {
    let manager = migrated();
    let mut item = item();
    item.seasons[0].season.year.clear();

    let report = LeagueSyncService::new(&manager).sync(item).unwrap();
    assert!(matches!(report.seasons[0].season, RepoOutcome::Invalid(_)));
    assert_eq!(report.seasons[0].coverage, None);
    assert_eq!(report.seasons[1].coverage, Some(RepoOutcome::Inserted));
    assert_eq!(manager.seasons().get_all().len(), 1);
    assert_eq!(manager.coverage().get_all().len(), 1);
}

#[test]
fn rejected_country_skips_the_league() {
    let manager = migrated();
    let mut item = item();
    item.country.name = "X".repeat(101);

    let report = LeagueSyncService::new(&manager).sync(item).unwrap();
    assert!(report.country.is_failure());
    assert_eq!(report.league, None);
    assert_eq!(report.rows_written, 0);
    assert!(manager.leagues().get_all().is_empty());
    assert_eq!(manager.state(), TransactionState::Idle);
}

#[test]
fn cancelled_sync_rolls_everything_back() {
    let manager = migrated();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let err = LeagueSyncService::new(&manager)
        .sync_cancellable(item(), &cancel)
        .unwrap_err();
    assert!(matches!(err, RepoError::Cancelled { .. }));
    assert_eq!(manager.state(), TransactionState::Idle);
    assert!(manager.countries().get_all().is_empty());
}

#[test]
fn sync_refuses_to_join_an_open_transaction() {
    let manager = migrated();
    manager.begin_transaction().unwrap();

    let err = LeagueSyncService::new(&manager).sync(item()).unwrap_err();
    assert!(matches!(err, RepoError::TransactionState { .. }));
    manager.rollback_transaction().unwrap();
}
