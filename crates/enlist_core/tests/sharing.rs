use enlist_core::db::open_db_in_memory;
use enlist_core::model::user::NewUser;
use enlist_core::{
    Actor, ListRepository, SharingError, SharingService, SqliteListRepository,
    SqliteUserRepository, TodoList, User, UserRepository, ValidationError,
};
use rusqlite::Connection;

struct Fixture<'conn> {
    sharing: SharingService<SqliteListRepository<'conn>, SqliteUserRepository<'conn>>,
    lists: SqliteListRepository<'conn>,
    owner: User,
    list: TodoList,
}

fn create_user(conn: &Connection, name: &str) -> User {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    repo.create_user(&NewUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: "unused".to_string(),
    })
    .unwrap()
}

fn fixture(conn: &Connection) -> Fixture<'_> {
    let owner = create_user(conn, "Owner");
    let lists = SqliteListRepository::try_new(conn).unwrap();
    let list = lists.create_list(owner.id, "Groceries").unwrap();
    Fixture {
        sharing: SharingService::new(
            SqliteListRepository::try_new(conn).unwrap(),
            SqliteUserRepository::try_new(conn).unwrap(),
        ),
        lists,
        owner,
        list,
    }
}

impl Fixture<'_> {
    fn as_owner(&self) -> Actor {
        Actor::User(self.owner.id)
    }

    fn helper_ids(&self) -> Vec<uuid::Uuid> {
        self.lists.get_list(self.list.id).unwrap().unwrap().helper_ids
    }
}

#[test]
fn add_helper_links_registered_user() {
    let conn = open_db_in_memory().unwrap();
    let fx = fixture(&conn);
    let bob = create_user(&conn, "Bob");

    let added = fx
        .sharing
        .add_helper(fx.as_owner(), fx.list.id, "  BOB@Example.com ")
        .unwrap();

    assert_eq!(added, bob);
    assert_eq!(fx.helper_ids(), vec![bob.id]);
    assert_eq!(
        fx.sharing.list_helpers(fx.as_owner(), fx.list.id).unwrap(),
        vec![bob]
    );
}

#[test]
fn add_helper_twice_is_already_permitted_and_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let fx = fixture(&conn);
    let bob = create_user(&conn, "Bob");

    fx.sharing
        .add_helper(fx.as_owner(), fx.list.id, &bob.email)
        .unwrap();
    let second = fx
        .sharing
        .add_helper(fx.as_owner(), fx.list.id, &bob.email)
        .unwrap_err();

    assert!(matches!(second, SharingError::AlreadyPermitted));
    assert_eq!(second.http_status(), 409);
    assert_eq!(fx.helper_ids(), vec![bob.id]);
}

#[test]
fn owner_cannot_become_own_helper() {
    let conn = open_db_in_memory().unwrap();
    let fx = fixture(&conn);

    let err = fx
        .sharing
        .add_helper(fx.as_owner(), fx.list.id, &fx.owner.email)
        .unwrap_err();

    assert!(matches!(err, SharingError::AlreadyPermitted));
    assert!(fx.helper_ids().is_empty());
}

#[test]
fn unknown_or_malformed_email_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let fx = fixture(&conn);

    let unknown = fx
        .sharing
        .add_helper(fx.as_owner(), fx.list.id, "nobody@example.com")
        .unwrap_err();
    assert!(matches!(unknown, SharingError::UnknownUser(ref email) if email == "nobody@example.com"));
    assert_eq!(unknown.code(), "unknown_user");

    let malformed = fx
        .sharing
        .add_helper(fx.as_owner(), fx.list.id, "not an email")
        .unwrap_err();
    assert!(matches!(
        malformed,
        SharingError::Validation(ValidationError::InvalidEmail(_))
    ));
    assert!(fx.helper_ids().is_empty());
}

#[test]
fn remove_helper_revokes_access() {
    let conn = open_db_in_memory().unwrap();
    let fx = fixture(&conn);
    let bob = create_user(&conn, "Bob");
    let carol = create_user(&conn, "Carol");
    fx.sharing
        .add_helper(fx.as_owner(), fx.list.id, &bob.email)
        .unwrap();
    fx.sharing
        .add_helper(fx.as_owner(), fx.list.id, &carol.email)
        .unwrap();

    fx.sharing
        .remove_helper(fx.as_owner(), fx.list.id, bob.id)
        .unwrap();

    assert_eq!(fx.helper_ids(), vec![carol.id]);
    let list = fx.lists.get_list(fx.list.id).unwrap().unwrap();
    assert!(!enlist_core::access::can_view(bob.id, &list));
}

#[test]
fn remove_non_helper_is_not_a_helper() {
    let conn = open_db_in_memory().unwrap();
    let fx = fixture(&conn);
    let bob = create_user(&conn, "Bob");

    let err = fx
        .sharing
        .remove_helper(fx.as_owner(), fx.list.id, bob.id)
        .unwrap_err();
    assert!(matches!(err, SharingError::NotAHelper(id) if id == bob.id));

    let owner_err = fx
        .sharing
        .remove_helper(fx.as_owner(), fx.list.id, fx.owner.id)
        .unwrap_err();
    assert!(matches!(owner_err, SharingError::NotAHelper(_)));
}
