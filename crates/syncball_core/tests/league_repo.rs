use syncball_core::{Country, EntityId, League, RepoOutcome, Repository, RepositoryManager};

fn migrated_with_country(name: &str) -> (RepositoryManager, EntityId) {
    let manager = RepositoryManager::open_in_memory().unwrap();
    manager.migrate().unwrap();
    let mut country = Country::new(name, None);
    manager.countries().upsert(&mut country);
    manager.complete().unwrap();
    let id = manager.countries().find_by_name(name).unwrap().unwrap().id;
    (manager, id)
}

fn league(id: EntityId, name: &str, country_id: EntityId) -> League {
    let mut league = League::new(id, name, country_id);
    league.kind = "League".to_string();
    league.logo_url = format!("https://media.example/leagues/{id}.png");
    league
}

#[test]
fn feed_assigned_id_is_kept_on_insert() {
    let (manager, england) = migrated_with_country("England");
    let mut premier = league(39, "Premier League", england);

    assert_eq!(manager.leagues().upsert(&mut premier), RepoOutcome::Inserted);
    manager.complete().unwrap();

    let stored = manager.leagues().get_by_id(39).unwrap();
    assert_eq!(stored.name, "Premier League");
    assert_eq!(stored.kind, "League");
    assert_eq!(stored.country_id, england);
}

#[test]
fn reupsert_by_id_replaces_fields() {
    let (manager, england) = migrated_with_country("England");
    manager.leagues().upsert(&mut league(40, "Championship", england));
    manager.complete().unwrap();

    let mut renamed = league(40, "EFL Championship", england);
    renamed.kind = "Cup".to_string();
    assert_eq!(manager.leagues().upsert(&mut renamed).code(), 40);
    manager.complete().unwrap();

    let stored = manager.leagues().get_by_id(40).unwrap();
    assert_eq!(stored.name, "EFL Championship");
    assert_eq!(stored.kind, "Cup");
    assert_eq!(manager.leagues().get_all().len(), 1);
}

#[test]
fn leagues_are_listed_by_owning_country() {
    let (manager, england) = migrated_with_country("England");
    let mut spain = Country::new("Spain", None);
    manager.countries().upsert(&mut spain);
    manager.complete().unwrap();
    let spain = manager.countries().find_by_name("Spain").unwrap().unwrap().id;

    let leagues = manager.leagues();
    leagues.upsert(&mut league(39, "Premier League", england));
    leagues.upsert(&mut league(45, "FA Cup", england));
    leagues.upsert(&mut league(140, "La Liga", spain));
    manager.complete().unwrap();

    let english: Vec<_> = leagues
        .get_leagues_by_country_id(england)
        .into_iter()
        .map(|league| league.id)
        .collect();
    assert_eq!(english, vec![39, 45]);
    assert_eq!(leagues.get_leagues_by_country_id(spain).len(), 1);
    assert!(leagues.get_leagues_by_country_id(0).is_empty());
}

#[test]
fn enable_league_toggles_once() {
    let (manager, england) = migrated_with_country("England");
    manager.leagues().upsert(&mut league(39, "Premier League", england));
    manager.complete().unwrap();

    let leagues = manager.leagues();
    assert_eq!(leagues.enable_league(39), RepoOutcome::Applied);
    manager.complete().unwrap();
    assert_eq!(leagues.enable_league(39), RepoOutcome::Unchanged);
    assert_eq!(leagues.get_all_enabled().len(), 1);

    assert_eq!(leagues.disable_league(39), RepoOutcome::Applied);
    manager.complete().unwrap();
    assert!(leagues.get_all_enabled().is_empty());
    assert_eq!(leagues.enable_league(7), RepoOutcome::NotFound);
    assert_eq!(leagues.enable_league(0).code(), -1);
}

#[test]
fn league_without_feed_id_is_invalid() {
    let (manager, england) = migrated_with_country("England");
    let outcome = manager.leagues().upsert(&mut league(0, "Unknown", england));
    assert!(matches!(outcome, RepoOutcome::Invalid(_)));
    assert_eq!(manager.staged_count(), 0);
}

#[test]
fn same_league_upserted_twice_keeps_unrelated_writes_in_the_batch() {
    let (manager, england) = migrated_with_country("England");
    manager.countries().upsert(&mut Country::new("Germany", Some("DE")));

    let leagues = manager.leagues();
    assert_eq!(leagues.upsert(&mut league(135, "Serie A", england)), RepoOutcome::Inserted);
    let mut renamed = league(135, "Serie A TIM", england);
    assert_eq!(leagues.upsert(&mut renamed), RepoOutcome::Inserted);
    assert_eq!(leagues.get_by_id(135).unwrap().name, "Serie A TIM");

    assert_eq!(manager.complete().unwrap(), 2);
    assert!(manager.countries().exists_by_name("Germany").unwrap());
    assert_eq!(leagues.get_all().len(), 1);
    assert_eq!(leagues.get_by_id(135).unwrap().name, "Serie A TIM");
}

#[test]
fn enable_on_a_pending_league_folds_into_its_insert() {
    let (manager, england) = migrated_with_country("England");
    let leagues = manager.leagues();
    leagues.upsert(&mut league(40, "Championship", england));

    assert_eq!(leagues.enable_league(40), RepoOutcome::Applied);
    assert_eq!(manager.staged_count(), 1);
    assert_eq!(leagues.delete(&leagues.get_by_id(40).unwrap()), RepoOutcome::Applied);
    assert_eq!(manager.staged_count(), 0);
    assert!(!leagues.exists(40));

    leagues.upsert(&mut league(40, "Championship", england));
    leagues.enable_league(40);
    manager.complete().unwrap();
    assert_eq!(leagues.get_all_enabled().len(), 1);
}
