/// Repository tests: inserts, author joins, child listings in both
/// directions, and persistence across a reopen.

use arbor_db::Database;
use arbor_db::models::Order;
use uuid::Uuid;

fn mem_db() -> Database {
    Database::open_in_memory().unwrap()
}

fn seed_user(db: &Database, username: &str) -> String {
    let id = Uuid::new_v4().to_string();
    db.create_user(
        &id,
        username,
        &format!("{}@example.com", username),
        "argon2-hash-placeholder",
    )
    .unwrap();
    id
}

#[test]
fn insert_assigns_id_and_timestamp() {
    let db = mem_db();
    let author = seed_user(&db, "firstuser");

    let row = db.insert_message("hello board", &author, None).unwrap();

    assert!(row.id > 0);
    assert_eq!(row.content, "hello board");
    assert_eq!(row.author_id, author);
    assert_eq!(row.author_username, "firstuser");
    assert_eq!(row.parent_id, None);
    assert!(!row.created_at.is_empty());
}

#[test]
fn find_message_round_trips_stored_fields() {
    let db = mem_db();
    let author = seed_user(&db, "firstuser");

    let root = db.insert_message("a root post", &author, None).unwrap();
    let reply = db
        .insert_message("a reply", &author, Some(root.id))
        .unwrap();

    let found = db.find_message(reply.id).unwrap().unwrap();
    assert_eq!(found.content, "a reply");
    assert_eq!(found.author_id, author);
    assert_eq!(found.parent_id, Some(root.id));
}

#[test]
fn find_message_missing_is_none() {
    let db = mem_db();
    assert!(db.find_message(999).unwrap().is_none());
}

#[test]
fn ids_are_unique_and_strictly_increasing() {
    let db = mem_db();
    let author = seed_user(&db, "firstuser");

    let mut last = 0;
    for i in 0..10 {
        let row = db
            .insert_message(&format!("message {}", i), &author, None)
            .unwrap();
        assert!(row.id > last);
        last = row.id;
    }
}

#[test]
fn roots_listing_excludes_replies() {
    let db = mem_db();
    let author = seed_user(&db, "firstuser");

    let root = db.insert_message("root", &author, None).unwrap();
    db.insert_message("reply", &author, Some(root.id)).unwrap();

    let roots = db.find_children(None, Order::Desc).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, root.id);
}

#[test]
fn child_listing_is_direct_children_only() {
    let db = mem_db();
    let author = seed_user(&db, "firstuser");

    let root = db.insert_message("root", &author, None).unwrap();
    let child = db.insert_message("child", &author, Some(root.id)).unwrap();
    db.insert_message("grandchild", &author, Some(child.id))
        .unwrap();

    let children = db.find_children(Some(root.id), Order::Asc).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child.id);

    let leaf = db.find_children(Some(child.id), Order::Asc).unwrap();
    assert_eq!(leaf.len(), 1);
    assert_eq!(leaf[0].content, "grandchild");
}

#[test]
fn listing_order_follows_requested_direction() {
    let db = mem_db();
    let author = seed_user(&db, "firstuser");

    let a = db.insert_message("first", &author, None).unwrap();
    let b = db.insert_message("second", &author, None).unwrap();
    let c = db.insert_message("third", &author, None).unwrap();

    // Same-second timestamps fall back to the id tie-break, so creation
    // order is still recovered exactly.
    let desc: Vec<i64> = db
        .find_children(None, Order::Desc)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(desc, vec![c.id, b.id, a.id]);

    let asc: Vec<i64> = db
        .find_children(None, Order::Asc)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(asc, vec![a.id, b.id, c.id]);
}

#[test]
fn leaf_has_no_children() {
    let db = mem_db();
    let author = seed_user(&db, "firstuser");

    let root = db.insert_message("root", &author, None).unwrap();
    assert!(db.find_children(Some(root.id), Order::Asc).unwrap().is_empty());
}

#[test]
fn duplicate_username_is_rejected() {
    let db = mem_db();
    seed_user(&db, "firstuser");

    let id = Uuid::new_v4().to_string();
    let result = db.create_user(&id, "firstuser", "other@example.com", "hash");
    assert!(result.is_err());
}

#[test]
fn user_lookup_matches_username_and_email() {
    let db = mem_db();
    let id = seed_user(&db, "firstuser");

    let by_name = db.get_user_by_username_or_email("firstuser").unwrap().unwrap();
    assert_eq!(by_name.id, id);

    let by_email = db
        .get_user_by_username_or_email("firstuser@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, id);

    assert!(db.get_user_by_username_or_email("nobody").unwrap().is_none());

    let by_id = db.get_user_by_id(&id).unwrap().unwrap();
    assert_eq!(by_id.username, "firstuser");
}

#[test]
fn concurrent_inserts_never_duplicate_ids() {
    let db = mem_db();
    let author = seed_user(&db, "firstuser");
    let root_id = db.insert_message("root", &author, None).unwrap().id;

    let ids: Vec<i64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let db = &db;
                let author = author.as_str();
                s.spawn(move || {
                    (0..5)
                        .map(|i| {
                            db.insert_message(&format!("reply {}-{}", t, i), author, Some(root_id))
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<i64>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), 20);

    let listed = db.find_children(Some(root_id), Order::Asc).unwrap();
    assert_eq!(listed.len(), 20);
}

#[test]
fn messages_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arbor.db");

    let root_id;
    {
        let db = Database::open(&path).unwrap();
        let author = seed_user(&db, "firstuser");
        root_id = db.insert_message("durable post", &author, None).unwrap().id;
    }

    let db = Database::open(&path).unwrap();
    let found = db.find_message(root_id).unwrap().unwrap();
    assert_eq!(found.content, "durable post");
    assert_eq!(found.author_username, "firstuser");
}
