mod support;

use findmeroom::catalog::{CatalogController, CatalogState, PropertyFilter};
use findmeroom::city::CityStore;
use findmeroom::listings::{ListingsController, MyListingsState, PostListingState};
use findmeroom::models::RegisterRequest;
use findmeroom::router::{Router, Screen, View};
use findmeroom::session::{SessionController, SessionPhase, SessionStore};
use findmeroom::storage::{MemoryStorage, Storage, TOKEN_KEY};
use findmeroom::{AppError, SharedState, StateHandle};

use support::{token_for, user, FakeApi};

#[tokio::test]
async fn login_persists_token_and_reload_restores_session() {
    let api = FakeApi::new();
    let asha = user("u1", "Asha");
    api.add_account(&asha, "secret");
    let storage = MemoryStorage::new();

    let session = SharedState::new(SessionStore::open(storage.clone()));
    let ctl = SessionController::new(api.clone(), session.clone());
    ctl.login("u1@example.com", "secret").await.unwrap();
    assert_eq!(storage.get(TOKEN_KEY), Some(token_for(&asha)));

    // reload
    let session = SharedState::new(SessionStore::open(storage.clone()));
    let router = Router::new();
    assert_eq!(session.read(|s| router.screen(s.phase())).unwrap(), Screen::Loading);

    SessionController::new(api.clone(), session.clone()).restore().await;
    assert_eq!(session.read(|s| s.user().cloned()).unwrap(), Some(asha));
    assert_eq!(session.read(|s| router.screen(s.phase())).unwrap(), Screen::Ready(View::Home));
}

#[tokio::test]
async fn rejected_token_is_cleared_on_restore() {
    let api = FakeApi::new();
    let storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, "token-gone").unwrap();

    let session = SharedState::new(SessionStore::open(storage.clone()));
    SessionController::new(api, session.clone()).restore().await;

    assert_eq!(session.read(|s| s.phase().clone()).unwrap(), SessionPhase::SignedOut);
    assert_eq!(storage.get(TOKEN_KEY), None);
}

#[tokio::test]
async fn unreachable_server_keeps_token_for_next_load() {
    let api = FakeApi::new();
    api.set_offline(true);
    let storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, "token-u1").unwrap();

    let session = SharedState::new(SessionStore::open(storage.clone()));
    SessionController::new(api, session.clone()).restore().await;

    assert!(!session.read(|s| s.is_signed_in()).unwrap());
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("token-u1"));
}

#[tokio::test]
async fn wrong_password_surfaces_server_detail() {
    let api = FakeApi::new();
    api.add_account(&user("u1", "Asha"), "secret");
    let session = SharedState::new(SessionStore::open(MemoryStorage::new()));

    let err = SessionController::new(api, session.clone())
        .login("u1@example.com", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.form_message("Login failed"), "Incorrect email or password");
    assert!(!session.read(|s| s.is_signed_in()).unwrap());
}

#[tokio::test]
async fn register_then_logout() {
    let api = FakeApi::new();
    let storage = MemoryStorage::new();
    let session = SharedState::new(SessionStore::open(storage.clone()));
    let ctl = SessionController::new(api.clone(), session.clone());

    let account = RegisterRequest {
        email: "new@example.com".into(),
        name: "Neha".into(),
        phone: "+91 98765 43210".into(),
        password: "pw".into(),
    };
    ctl.register(&account).await.unwrap();
    assert!(session.read(|s| s.is_signed_in()).unwrap());

    ctl.logout();
    assert!(!session.read(|s| s.is_signed_in()).unwrap());
    assert_eq!(storage.get(TOKEN_KEY), None);
}

#[tokio::test]
async fn selected_city_drives_an_exact_search() {
    let api = FakeApi::new();
    api.add_property("p1", "u1", "Mumbai", 9000);
    api.add_property("p2", "u1", "Delhi", 7000);
    let storage = MemoryStorage::new();

    let mut cities = CityStore::open(storage.clone());
    cities.select("Mumbai");
    // survives a reload
    let cities = CityStore::open(storage);
    assert_eq!(cities.selected(), Some("Mumbai"));

    let catalog = SharedState::new(CatalogState::default());
    CatalogController::new(api.clone(), catalog.clone())
        .search_city(cities.selected())
        .await;

    assert_eq!(api.calls(), ["GET /properties?city=Mumbai"]);
    let ids: Vec<String> = catalog.read(|c| c.properties.iter().map(|p| p.id.clone()).collect()).unwrap();
    assert_eq!(ids, ["p1"]);
}

#[tokio::test]
async fn no_city_lists_everything() {
    let api = FakeApi::new();
    api.add_property("p1", "u1", "Mumbai", 9000);
    api.add_property("p2", "u1", "Delhi", 7000);
    let catalog = SharedState::new(CatalogState::default());

    CatalogController::new(api.clone(), catalog.clone()).search(PropertyFilter::default()).await;
    assert_eq!(api.calls(), ["GET /properties"]);
    assert_eq!(catalog.read(|c| c.properties.len()).unwrap(), 2);
}

#[tokio::test]
async fn owner_posts_lists_and_deletes_a_listing() {
    let api = FakeApi::new();
    let owner = user("u1", "Asha");
    api.add_account(&owner, "secret");
    let ctl = ListingsController::new(api.clone(), token_for(&owner));

    let post = SharedState::new(PostListingState::default());
    post.write(|s| {
        s.draft.title = "Sea-facing room".into();
        s.draft.description = "Quiet".into();
        s.draft.rent = "12000".into();
        s.draft.deposit = "24000".into();
        s.draft.location = "Bandra".into();
        s.draft.city = "Mumbai".into();
        s.draft.amenities = "wifi, ac".into();
    });
    let created = ctl.post(&post).await.unwrap();
    assert_eq!(created.amenities, ["wifi", "ac"]);
    assert_eq!(post.read(|s| s.draft.title.clone()).unwrap(), "");

    let mine = SharedState::new(MyListingsState::default());
    ctl.load_mine(&mine).await;
    assert_eq!(mine.read(|s| s.properties.len()).unwrap(), 1);

    ctl.delete(&mine, &created.id).await.unwrap();
    assert!(mine.read(|s| s.properties.is_empty()).unwrap());

    // deleting again fails and leaves an inline error
    mine.write(|s| s.properties.push(created.clone()));
    assert!(ctl.delete(&mine, &created.id).await.is_err());
    mine.read(|s| {
        assert_eq!(s.properties.len(), 1);
        assert!(s.error.is_some());
    })
    .unwrap();
}

#[tokio::test]
async fn failed_post_keeps_draft_and_shows_error() {
    let api = FakeApi::new();
    let owner = user("u1", "Asha");
    api.add_account(&owner, "secret");
    let ctl = ListingsController::new(api.clone(), token_for(&owner));

    let post = SharedState::new(PostListingState::default());
    post.write(|s| {
        s.draft.title = "Garden flat".into();
        s.draft.description = "Ground floor".into();
        s.draft.rent = "9000".into();
        s.draft.deposit = "18000".into();
        s.draft.location = "Aundh".into();
        s.draft.city = "Pune".into();
    });
    api.set_offline(true);

    assert!(ctl.post(&post).await.is_err());
    assert_eq!(api.calls_to("POST /properties"), 1);
    post.read(|s| {
        assert_eq!(s.draft.title, "Garden flat");
        assert_eq!(s.draft.rent, "9000");
        assert!(s.error.is_some());
        assert!(!s.submitting);
        assert!(s.created.is_none());
    })
    .unwrap();

    // same draft goes through once back online
    api.set_offline(false);
    let created = ctl.post(&post).await.unwrap();
    assert_eq!(created.title, "Garden flat");
    assert!(post.read(|s| s.error.is_none()).unwrap());
}

#[tokio::test]
async fn second_delete_while_one_runs_is_refused() {
    let api = FakeApi::new();
    let owner = user("u1", "Asha");
    api.add_account(&owner, "secret");
    let ctl = ListingsController::new(api.clone(), token_for(&owner));

    let mine = SharedState::new(MyListingsState::default());
    mine.write(|s| s.deleting = Some("p1".into()));

    let err = ctl.delete(&mine, "p2").await.unwrap_err();
    assert_eq!(err, AppError::InFlight { action: "deleting" });
    assert_eq!(api.calls_to("DELETE"), 0);
    assert_eq!(mine.read(|s| s.deleting.clone()).unwrap().as_deref(), Some("p1"));
}
