use atrium_cms::models::{NewPost, PostStatus, UpdatePost};
use atrium_cms::services::{auth, posts, users};
use atrium_cms::Database;

fn create_test_db() -> Database {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let id: u32 = rng.gen();
    let name = format!("test_db_{}", id);

    let db = Database::open_memory(&name).expect("Failed to create test database");
    db.migrate().expect("Failed to run migrations");
    db
}

const TEST_PASSWORD: &str = "Password123";
const WRONG_PASSWORD: &str = "WrongPass456";

fn create_test_user(db: &Database, admin_id: &str, name: &str) -> i64 {
    auth::create_user(
        db,
        admin_id,
        name,
        &format!("{}@example.com", admin_id),
        TEST_PASSWORD,
        Default::default(),
        Default::default(),
        None,
    )
    .expect("Failed to create user")
}

fn draft_input(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        excerpt: None,
        body: "Body text for the post.".to_string(),
        status: PostStatus::Draft,
    }
}

fn published_input(title: &str) -> NewPost {
    NewPost {
        status: PostStatus::Published,
        ..draft_input(title)
    }
}

fn update_input(status: PostStatus) -> UpdatePost {
    UpdatePost {
        title: "Updated title".to_string(),
        excerpt: Some("A short summary".to_string()),
        body: "Updated body.".to_string(),
        status,
    }
}

mod post_creation_tests {
    use super::*;

    #[test]
    fn test_create_draft_post() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, draft_input("Hello World")).unwrap();

        assert_eq!(post.user_id, author);
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.published_at.is_none());
        assert!(post.deleted_at.is_none());
    }

    #[test]
    fn test_create_published_post_stamps_publish_time() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, published_input("Launch Notes")).unwrap();

        assert_eq!(post.status, PostStatus::Published);
        assert!(post.published_at.is_some());
    }

    #[test]
    fn test_duplicate_titles_get_numbered_slugs() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let first = posts::create_post(&db, author, draft_input("My Post")).unwrap();
        let second = posts::create_post(&db, author, draft_input("My Post")).unwrap();
        let third = posts::create_post(&db, author, draft_input("My Post")).unwrap();

        assert_eq!(first.slug, "my-post");
        assert_eq!(second.slug, "my-post-1");
        assert_eq!(third.slug, "my-post-2");
    }

    #[test]
    fn test_unsluggable_title_gets_random_slug() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, draft_input("!!!")).unwrap();

        assert_eq!(post.slug.len(), 10);
        assert!(post
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_create_rejects_archived_status() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let mut input = draft_input("Old News");
        input.status = PostStatus::Archived;

        let result = posts::create_post(&db, author, input);
        assert!(matches!(result, Err(posts::PostError::Validation(_))));
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let result = posts::create_post(&db, author, draft_input("   "));
        assert!(matches!(result, Err(posts::PostError::Validation(_))));
    }
}

mod post_update_tests {
    use super::*;

    #[test]
    fn test_update_keeps_slug() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, draft_input("Original Title")).unwrap();
        let updated =
            posts::update_post(&db, author, &post, update_input(PostStatus::Draft)).unwrap();

        assert_eq!(updated.slug, "original-title");
        assert_eq!(updated.title, "Updated title");
    }

    #[test]
    fn test_first_publish_sets_timestamp_once() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, draft_input("Going Live")).unwrap();
        assert!(post.published_at.is_none());

        let published =
            posts::update_post(&db, author, &post, update_input(PostStatus::Published)).unwrap();
        let stamp = published.published_at.clone().expect("publish stamp set");

        // Saving again while already published must not move the stamp.
        let republished =
            posts::update_post(&db, author, &published, update_input(PostStatus::Published))
                .unwrap();
        assert_eq!(republished.published_at.as_deref(), Some(stamp.as_str()));
    }

    #[test]
    fn test_archiving_preserves_publish_timestamp() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, published_input("Retiring Soon")).unwrap();
        let stamp = post.published_at.clone().expect("publish stamp set");

        let archived =
            posts::update_post(&db, author, &post, update_input(PostStatus::Archived)).unwrap();

        assert_eq!(archived.status, PostStatus::Archived);
        assert_eq!(archived.published_at.as_deref(), Some(stamp.as_str()));
    }

    #[test]
    fn test_unpublishing_keeps_publish_timestamp() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, published_input("Back To Draft")).unwrap();
        let stamp = post.published_at.clone().expect("publish stamp set");

        let drafted =
            posts::update_post(&db, author, &post, update_input(PostStatus::Draft)).unwrap();

        assert_eq!(drafted.status, PostStatus::Draft);
        assert_eq!(drafted.published_at.as_deref(), Some(stamp.as_str()));
    }

    #[test]
    fn test_update_by_non_owner_is_forbidden() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");
        let intruder = create_test_user(&db, "2002", "Intruder");

        let post = posts::create_post(&db, author, draft_input("Private Draft")).unwrap();
        let result = posts::update_post(&db, intruder, &post, update_input(PostStatus::Draft));

        assert!(matches!(result, Err(posts::PostError::Forbidden)));
    }
}

mod soft_delete_tests {
    use super::*;

    #[test]
    fn test_soft_deleted_post_is_not_found_by_slug() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, published_input("Going Away")).unwrap();
        posts::soft_delete_post(&db, author, &post).unwrap();

        assert!(posts::find_post_by_slug(&db, "going-away")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete_by_non_owner_is_forbidden() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");
        let intruder = create_test_user(&db, "2002", "Intruder");

        let post = posts::create_post(&db, author, draft_input("Keep Out")).unwrap();
        let result = posts::soft_delete_post(&db, intruder, &post);

        assert!(matches!(result, Err(posts::PostError::Forbidden)));
    }

    #[test]
    fn test_trashed_slug_stays_claimed() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, draft_input("My Post")).unwrap();
        posts::soft_delete_post(&db, author, &post).unwrap();

        assert!(posts::slug_exists(&db, "my-post").unwrap());

        // A new post with the same title must not recycle the trashed URL.
        let replacement = posts::create_post(&db, author, draft_input("My Post")).unwrap();
        assert_eq!(replacement.slug, "my-post-1");
    }

    #[test]
    fn test_soft_deleted_posts_leave_the_feed() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        let post = posts::create_post(&db, author, published_input("Feed Item")).unwrap();
        assert_eq!(posts::count_posts(&db, None).unwrap(), 1);

        posts::soft_delete_post(&db, author, &post).unwrap();
        assert_eq!(posts::count_posts(&db, None).unwrap(), 0);
        assert!(posts::list_posts(&db, None, 10, 0).unwrap().is_empty());
    }
}

mod feed_tests {
    use super::*;

    #[test]
    fn test_anonymous_feed_has_published_only() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        posts::create_post(&db, author, published_input("Public Post")).unwrap();
        posts::create_post(&db, author, draft_input("Secret Draft")).unwrap();

        let feed = posts::list_posts(&db, None, 10, 0).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].post.title, "Public Post");
    }

    #[test]
    fn test_owner_sees_own_drafts_in_feed() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");
        let other = create_test_user(&db, "2002", "Other");

        posts::create_post(&db, author, published_input("Public Post")).unwrap();
        posts::create_post(&db, author, draft_input("My Draft")).unwrap();
        posts::create_post(&db, other, draft_input("Their Draft")).unwrap();

        let feed = posts::list_posts(&db, Some(author), 10, 0).unwrap();
        let titles: Vec<&str> = feed.iter().map(|p| p.post.title.as_str()).collect();

        assert_eq!(feed.len(), 2);
        assert!(titles.contains(&"Public Post"));
        assert!(titles.contains(&"My Draft"));
        assert!(!titles.contains(&"Their Draft"));
    }

    #[test]
    fn test_feed_is_paginated() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Author");

        for i in 0..5 {
            posts::create_post(&db, author, published_input(&format!("Post {}", i))).unwrap();
        }

        assert_eq!(posts::count_posts(&db, None).unwrap(), 5);
        assert_eq!(posts::list_posts(&db, None, 2, 0).unwrap().len(), 2);
        assert_eq!(posts::list_posts(&db, None, 2, 4).unwrap().len(), 1);
    }

    #[test]
    fn test_feed_includes_author_name() {
        let db = create_test_db();
        let author = create_test_user(&db, "1001", "Yamada");

        posts::create_post(&db, author, published_input("Signed Post")).unwrap();

        let feed = posts::list_posts(&db, None, 10, 0).unwrap();
        assert_eq!(feed[0].author.as_ref().unwrap().name, "Yamada");
        assert_eq!(feed[0].status_label, "Published");
    }
}

mod auth_integration_tests {
    use super::*;

    #[test]
    fn test_create_and_authenticate_user() {
        let db = create_test_db();
        create_test_user(&db, "1234", "Test User");

        let user = auth::authenticate(&db, "1234", TEST_PASSWORD)
            .expect("Authentication error")
            .expect("User should be found");

        assert_eq!(user.admin_id, "1234");
        assert_eq!(user.name, "Test User");
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let db = create_test_db();
        create_test_user(&db, "1234", "Test User");

        let result = auth::authenticate(&db, "1234", WRONG_PASSWORD).expect("Authentication error");
        assert!(result.is_none());
    }

    #[test]
    fn test_authenticate_unknown_staff_id() {
        let db = create_test_db();
        let result = auth::authenticate(&db, "9999", TEST_PASSWORD).expect("Authentication error");
        assert!(result.is_none());
    }

    #[test]
    fn test_duplicate_staff_id_rejected() {
        let db = create_test_db();
        create_test_user(&db, "1234", "First");

        let result = auth::create_user(
            &db,
            "1234",
            "Second",
            "second@example.com",
            TEST_PASSWORD,
            Default::default(),
            Default::default(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_staff_id_rejected() {
        let db = create_test_db();
        let result = auth::create_user(
            &db,
            "12",
            "Short ID",
            "short@example.com",
            TEST_PASSWORD,
            Default::default(),
            Default::default(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_session_roundtrip() {
        let db = create_test_db();
        let user_id = create_test_user(&db, "1234", "Test User");

        let token = auth::create_session(&db, user_id, 7).unwrap();
        let user = auth::validate_session(&db, &token)
            .unwrap()
            .expect("session should resolve");
        assert_eq!(user.id, user_id);

        auth::delete_session(&db, &token).unwrap();
        assert!(auth::validate_session(&db, &token).unwrap().is_none());
    }

    #[test]
    fn test_update_password() {
        let db = create_test_db();
        create_test_user(&db, "1234", "Test User");

        auth::update_password(&db, "1234", "NewPass456").unwrap();

        assert!(auth::authenticate(&db, "1234", TEST_PASSWORD)
            .unwrap()
            .is_none());
        assert!(auth::authenticate(&db, "1234", "NewPass456")
            .unwrap()
            .is_some());
    }
}

mod directory_tests {
    use super::*;

    #[test]
    fn test_directory_is_ordered_by_id() {
        let db = create_test_db();
        create_test_user(&db, "3003", "Charlie");
        create_test_user(&db, "1001", "Alice");
        create_test_user(&db, "2002", "Bob");

        let page = users::list_users_page(&db, 10, 0).unwrap();
        let names: Vec<&str> = page.iter().map(|u| u.name.as_str()).collect();

        // Insertion order, not staff-ID order.
        assert_eq!(names, vec!["Charlie", "Alice", "Bob"]);
    }

    #[test]
    fn test_directory_pagination() {
        let db = create_test_db();
        for i in 0..12 {
            create_test_user(&db, &format!("10{:02}", i), &format!("User {}", i));
        }

        assert_eq!(users::count_users(&db).unwrap(), 12);
        assert_eq!(users::list_users_page(&db, 10, 0).unwrap().len(), 10);
        assert_eq!(users::list_users_page(&db, 10, 10).unwrap().len(), 2);
    }

    #[test]
    fn test_directory_entry_labels() {
        let db = create_test_db();
        create_test_user(&db, "1001", "Alice");

        let page = users::list_users_page(&db, 10, 0).unwrap();
        assert_eq!(page[0].role, "General");
        assert_eq!(page[0].qualification, "Unqualified");
        assert!(page[0].department.is_none());
    }
}
