use enlist_core::db::open_db_in_memory;
use enlist_core::model::user::NewUser;
use enlist_core::{
    permission, Actor, ListError, ListService, Permission, SharingError, SharingService,
    SqliteListRepository, SqliteUserRepository, TodoList, User, UserRepository,
};
use proptest::prelude::*;
use proptest::sample::Index;
use rusqlite::Connection;
use uuid::Uuid;

fn create_user(conn: &Connection, name: &str) -> User {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    repo.create_user(&NewUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: "unused".to_string(),
    })
    .unwrap()
}

fn services(
    conn: &Connection,
) -> (
    ListService<SqliteListRepository<'_>>,
    SharingService<SqliteListRepository<'_>, SqliteUserRepository<'_>>,
) {
    (
        ListService::new(SqliteListRepository::try_new(conn).unwrap()),
        SharingService::new(
            SqliteListRepository::try_new(conn).unwrap(),
            SqliteUserRepository::try_new(conn).unwrap(),
        ),
    )
}

#[test]
fn stranger_is_denied_all_six_protected_operations() {
    let conn = open_db_in_memory().unwrap();
    let (lists, sharing) = services(&conn);
    let owner = create_user(&conn, "Owner");
    let helper = create_user(&conn, "Helper");
    let stranger = Actor::User(create_user(&conn, "Stranger").id);

    let list = lists.create_list(Actor::User(owner.id), "Groceries").unwrap();
    let item = lists
        .add_item(Actor::User(owner.id), list.id, "Milk")
        .unwrap();
    sharing
        .add_helper(Actor::User(owner.id), list.id, &helper.email)
        .unwrap();

    assert!(matches!(
        lists.view_list(stranger, list.id),
        Err(ListError::AccessDenied(_))
    ));
    assert!(matches!(
        lists.add_item(stranger, list.id, "Eggs"),
        Err(ListError::AccessDenied(_))
    ));
    assert!(matches!(
        lists.delete_item(stranger, list.id, item.id),
        Err(ListError::AccessDenied(_))
    ));
    assert!(matches!(
        sharing.add_helper(stranger, list.id, "stranger@example.com"),
        Err(SharingError::AccessDenied(_))
    ));
    assert!(matches!(
        sharing.remove_helper(stranger, list.id, helper.id),
        Err(SharingError::AccessDenied(_))
    ));
    assert!(matches!(
        lists.delete_list(stranger, list.id),
        Err(ListError::AccessDenied(_))
    ));

    let view = lists.view_list(Actor::User(owner.id), list.id).unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.helpers, vec![helper]);
}

#[test]
fn stranger_with_invalid_input_is_still_denied() {
    let conn = open_db_in_memory().unwrap();
    let (lists, sharing) = services(&conn);
    let owner = create_user(&conn, "Owner");
    let stranger = Actor::User(create_user(&conn, "Stranger").id);
    let list = lists.create_list(Actor::User(owner.id), "Groceries").unwrap();

    let blank_item = lists.add_item(stranger, list.id, "  ").unwrap_err();
    assert!(matches!(blank_item, ListError::AccessDenied(_)));
    assert_eq!(blank_item.code(), "access_denied");

    let bad_email = sharing.add_helper(stranger, list.id, "nope").unwrap_err();
    assert!(matches!(bad_email, SharingError::AccessDenied(_)));
    assert_eq!(bad_email.code(), "access_denied");
}

#[test]
fn helper_edits_items_but_cannot_manage_or_delete_list() {
    let conn = open_db_in_memory().unwrap();
    let (lists, sharing) = services(&conn);
    let owner = create_user(&conn, "Owner");
    let helper = create_user(&conn, "Helper");
    let other = create_user(&conn, "Other");
    let as_helper = Actor::User(helper.id);

    let list = lists.create_list(Actor::User(owner.id), "Chores").unwrap();
    sharing
        .add_helper(Actor::User(owner.id), list.id, &helper.email)
        .unwrap();

    let view = lists.view_list(as_helper, list.id).unwrap();
    assert_eq!(view.permission, Permission::Helper);
    let item = lists.add_item(as_helper, list.id, "Vacuum").unwrap();
    lists.delete_item(as_helper, list.id, item.id).unwrap();

    assert!(matches!(
        sharing.add_helper(as_helper, list.id, &other.email),
        Err(SharingError::AccessDenied(_))
    ));
    assert!(matches!(
        sharing.remove_helper(as_helper, list.id, helper.id),
        Err(SharingError::AccessDenied(_))
    ));
    let denied = lists.delete_list(as_helper, list.id).unwrap_err();
    assert_eq!(denied.code(), "access_denied");
    assert_eq!(denied.http_status(), 403);

    assert!(lists
        .view_list(Actor::User(owner.id), list.id)
        .unwrap()
        .list
        .has_helper(helper.id));
}

#[test]
fn anonymous_actor_must_log_in_first() {
    let conn = open_db_in_memory().unwrap();
    let (lists, sharing) = services(&conn);
    let owner = create_user(&conn, "Owner");
    let list = lists.create_list(Actor::User(owner.id), "Groceries").unwrap();

    assert!(matches!(
        lists.create_list(Actor::Anonymous, "Mine"),
        Err(ListError::Unauthenticated)
    ));
    let err = lists.view_list(Actor::Anonymous, list.id).unwrap_err();
    assert_eq!(err.http_status(), 401);
    assert!(matches!(
        sharing.list_helpers(Actor::Anonymous, list.id),
        Err(SharingError::Unauthenticated)
    ));
}

#[test]
fn missing_list_is_not_found_before_authorization() {
    let conn = open_db_in_memory().unwrap();
    let (lists, sharing) = services(&conn);
    let user = Actor::User(create_user(&conn, "Someone").id);
    let missing = Uuid::new_v4();

    assert!(matches!(
        lists.view_list(user, missing),
        Err(ListError::ListNotFound(id)) if id == missing
    ));
    assert!(matches!(
        sharing.remove_helper(user, missing, Uuid::new_v4()),
        Err(SharingError::ListNotFound(id)) if id == missing
    ));

    let blank_item = lists.add_item(user, missing, "").unwrap_err();
    assert!(matches!(blank_item, ListError::ListNotFound(id) if id == missing));
    assert_eq!(blank_item.code(), "not_found");
    assert!(matches!(
        sharing.add_helper(user, missing, "not an email"),
        Err(SharingError::ListNotFound(id)) if id == missing
    ));
}

proptest! {
    #[test]
    fn permission_follows_author_and_helper_relation(
        seeds in prop::collection::vec(any::<u128>(), 1..8),
        author_index in any::<Index>(),
        actor_index in any::<Index>(),
        helper_mask in any::<u8>(),
    ) {
        let users: Vec<Uuid> = seeds.iter().map(|seed| Uuid::from_u128(*seed)).collect();
        let author_id = users[author_index.index(users.len())];
        let actor = users[actor_index.index(users.len())];
        let helper_ids: Vec<Uuid> = users
            .iter()
            .enumerate()
            .filter(|(index, _)| helper_mask & (1u8 << index) != 0)
            .map(|(_, id)| *id)
            .collect();
        let list = TodoList {
            id: Uuid::new_v4(),
            name: "Any".to_string(),
            author_id,
            date_created: "01-01-2024".to_string(),
            helper_ids: helper_ids.clone(),
        };

        let expected = if actor == author_id {
            Permission::Owner
        } else if helper_ids.contains(&actor) {
            Permission::Helper
        } else {
            Permission::None
        };
        prop_assert_eq!(permission(actor, &list), expected);
    }
}
