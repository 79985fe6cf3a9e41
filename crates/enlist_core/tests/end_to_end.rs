use enlist_core::db::open_db;
use enlist_core::{
    table_counts, EnlistApp, ListError, Permission, SessionRegistry, SessionToken, SharingError,
};

#[test]
fn groceries_scenario_from_signup_to_list_deletion() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("todolist.sqlite3")).unwrap();
    let sessions = SessionRegistry::new();
    let app = EnlistApp::try_new(&conn, &sessions).unwrap();

    let ada = app.register("Ada", "ada@example.com", "pw-a").unwrap();
    let bob = app.register("Bob", "bob@example.com", "pw-b").unwrap();

    let groceries = app.create_list(&ada.token, "Groceries").unwrap();
    app.add_item(&ada.token, groceries.id, "Milk").unwrap();
    let helper = app
        .add_helper(&ada.token, groceries.id, "bob@example.com")
        .unwrap();
    assert_eq!(helper.id, bob.user.id);

    let eggs = app.add_item(&bob.token, groceries.id, "Eggs").unwrap();
    assert_eq!(eggs.position, 1);
    let bob_view = app.view_list(&bob.token, groceries.id).unwrap();
    assert_eq!(bob_view.permission, Permission::Helper);
    assert_eq!(bob_view.items.len(), 2);

    assert!(matches!(
        app.delete_list(&bob.token, groceries.id),
        Err(ListError::AccessDenied(_))
    ));
    assert!(matches!(
        app.list_helpers(&bob.token, groceries.id),
        Err(SharingError::AccessDenied(_))
    ));

    let deletion = app.delete_list(&ada.token, groceries.id).unwrap();
    assert_eq!(deletion.items_removed, 2);
    assert_eq!(deletion.helper_links_removed, 1);

    assert!(matches!(
        app.view_list(&ada.token, groceries.id),
        Err(ListError::ListNotFound(_))
    ));
    let counts = table_counts(&conn).unwrap();
    assert_eq!((counts.lists, counts.items, counts.helper_links), (0, 0, 0));
    assert_eq!(counts.users, 2);
}

#[test]
fn sessions_gate_every_operation() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("todolist.sqlite3")).unwrap();
    let sessions = SessionRegistry::new();
    let app = EnlistApp::try_new(&conn, &sessions).unwrap();

    let ada = app.register("Ada", "ada@example.com", "pw").unwrap();
    let list = app.create_list(&ada.token, "Chores").unwrap();
    app.logout(&ada.token);

    let stale = ada.token;
    assert!(app.current_user(&stale).unwrap().is_none());
    assert!(matches!(
        app.add_item(&stale, list.id, "Vacuum"),
        Err(ListError::Unauthenticated)
    ));
    let forged = SessionToken::parse("00000000-0000-4000-8000-000000000000").unwrap();
    assert!(matches!(app.my_lists(&forged), Err(ListError::Unauthenticated)));

    let again = app.authenticate("ada@example.com", "pw").unwrap();
    let overview = app.my_lists(&again.token).unwrap();
    assert_eq!(overview.owned.len(), 1);
    assert_eq!(overview.owned[0].id, list.id);

    app.delete_account(&again.token).unwrap();
    assert!(app.current_user(&again.token).unwrap().is_none());
    assert_eq!(table_counts(&conn).unwrap().lists, 0);
}
