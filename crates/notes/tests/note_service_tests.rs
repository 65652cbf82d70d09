use papaya_config::DatabaseConfig;
use papaya_database::{initialize_database, DatabaseConnection, Note, User, UserRepository};
use papaya_notes::{NoteError, NoteService};
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

struct TestContext {
    db: DatabaseConnection,
    notes: NoteService,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("notes.sqlite");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        };

        let db = initialize_database(&config).await?;
        let notes = NoteService::new(db.pool().clone());

        Ok(Self {
            db,
            notes,
            _temp_dir: temp_dir,
        })
    }

    async fn user(&self, email: &str) -> TestResult<User> {
        let user = UserRepository::new(self.db.pool().clone())
            .create(email, "$argon2id$not-a-real-hash")
            .await?;
        Ok(user)
    }

    fn notes(&self) -> &NoteService {
        &self.notes
    }
}

fn ids(notes: &[Note]) -> Vec<i64> {
    notes.iter().map(|note| note.id).collect()
}

#[tokio::test]
async fn create_fixes_owner_to_caller() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;

    let note = ctx.notes().create(alice.id, "hi", "there").await?;

    assert_eq!(note.owner_id, alice.id);
    assert_eq!(note.title, "hi");
    assert_eq!(note.content, "there");
    assert!(!note.starred);

    Ok(())
}

#[tokio::test]
async fn create_rejects_blank_title() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;

    let err = ctx
        .notes()
        .create(alice.id, "  ", "body")
        .await
        .expect_err("blank title must be rejected");
    assert!(matches!(err, NoteError::Validation(_)));
    assert!(ctx.notes().list_all(alice.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn non_owner_cannot_mutate_note() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;
    let bob = ctx.user("bob@example.com").await?;

    let note = ctx.notes().create(alice.id, "mine", "original").await?;

    assert!(matches!(
        ctx.notes().update(note.id, bob.id, "stolen", "x").await,
        Err(NoteError::Forbidden)
    ));
    assert!(matches!(
        ctx.notes().toggle_star(note.id, bob.id).await,
        Err(NoteError::Forbidden)
    ));
    assert!(matches!(
        ctx.notes().delete(note.id, bob.id).await,
        Err(NoteError::Forbidden)
    ));
    assert!(matches!(
        ctx.notes().share(note.id, bob.id, "bob@example.com").await,
        Err(NoteError::Forbidden)
    ));
    assert!(matches!(
        ctx.notes().get(note.id, bob.id).await,
        Err(NoteError::Forbidden)
    ));

    let unchanged = ctx.notes().get(note.id, alice.id).await?;
    assert_eq!(unchanged, note);

    Ok(())
}

#[tokio::test]
async fn missing_note_is_not_found() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;

    assert!(matches!(
        ctx.notes().update(404, alice.id, "t", "c").await,
        Err(NoteError::NotFound)
    ));
    assert!(matches!(
        ctx.notes().delete(404, alice.id).await,
        Err(NoteError::NotFound)
    ));
    assert!(matches!(
        ctx.notes().toggle_star(404, alice.id).await,
        Err(NoteError::NotFound)
    ));
    assert!(matches!(
        ctx.notes().share(404, alice.id, "alice@example.com").await,
        Err(NoteError::NotFound)
    ));
    assert!(matches!(
        ctx.notes().get(404, alice.id).await,
        Err(NoteError::NotFound)
    ));

    Ok(())
}

#[tokio::test]
async fn owner_can_update_and_delete() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;

    let note = ctx.notes().create(alice.id, "draft", "v1").await?;
    let updated = ctx.notes().update(note.id, alice.id, "final", "v2").await?;

    assert_eq!(updated.id, note.id);
    assert_eq!(updated.title, "final");
    assert_eq!(updated.content, "v2");
    assert_eq!(updated.owner_id, alice.id);
    assert_eq!(updated.created_at, note.created_at);

    ctx.notes().delete(note.id, alice.id).await?;
    assert!(matches!(
        ctx.notes().get(note.id, alice.id).await,
        Err(NoteError::NotFound)
    ));

    Ok(())
}

#[tokio::test]
async fn list_all_is_owned_union_shared_without_duplicates() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;
    let bob = ctx.user("bob@example.com").await?;

    let a1 = ctx.notes().create(alice.id, "a1", "").await?;
    let a2 = ctx.notes().create(alice.id, "a2", "").await?;
    let b1 = ctx.notes().create(bob.id, "b1", "").await?;
    ctx.notes().create(bob.id, "b2", "").await?;

    ctx.notes().share(b1.id, bob.id, "alice@example.com").await?;
    ctx.notes().share(b1.id, bob.id, "alice@example.com").await?;

    let visible = ctx.notes().list_all(alice.id).await?;
    assert_eq!(ids(&visible), vec![a1.id, a2.id, b1.id]);

    Ok(())
}

#[tokio::test]
async fn shared_note_is_readable_but_not_writable() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;
    let bob = ctx.user("bob@example.com").await?;

    let note = ctx.notes().create(alice.id, "hi", "there").await?;
    let share = ctx.notes().share(note.id, alice.id, "bob@example.com").await?;
    assert_eq!(share.note_id, note.id);
    assert_eq!(share.user_id, bob.id);

    assert_eq!(ctx.notes().get(note.id, bob.id).await?, note);
    assert!(matches!(
        ctx.notes().update(note.id, bob.id, "mine now", "").await,
        Err(NoteError::Forbidden)
    ));

    Ok(())
}

#[tokio::test]
async fn share_rejects_unknown_recipient_and_self() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;
    let note = ctx.notes().create(alice.id, "hi", "").await?;

    assert!(matches!(
        ctx.notes().share(note.id, alice.id, "ghost@example.com").await,
        Err(NoteError::RecipientNotFound)
    ));
    assert!(matches!(
        ctx.notes().share(note.id, alice.id, "alice@example.com").await,
        Err(NoteError::Validation(_))
    ));

    Ok(())
}

#[tokio::test]
async fn duplicate_share_returns_existing_grant() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;
    ctx.user("bob@example.com").await?;
    let note = ctx.notes().create(alice.id, "hi", "").await?;

    let first = ctx.notes().share(note.id, alice.id, "bob@example.com").await?;
    let second = ctx.notes().share(note.id, alice.id, "bob@example.com").await?;
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn deleting_note_revokes_shares() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;
    let bob = ctx.user("bob@example.com").await?;

    let note = ctx.notes().create(alice.id, "temp", "").await?;
    ctx.notes().share(note.id, alice.id, "bob@example.com").await?;
    ctx.notes().delete(note.id, alice.id).await?;

    assert!(ctx.notes().list_all(bob.id).await?.is_empty());
    let dangling: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shared_notes")
        .fetch_one(ctx.db.pool())
        .await?;
    assert_eq!(dangling, 0);

    Ok(())
}

#[tokio::test]
async fn search_matches_owned_notes_case_insensitively() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;
    let bob = ctx.user("bob@example.com").await?;

    let title_hit = ctx.notes().create(alice.id, "Grocery List", "eggs").await?;
    let content_hit = ctx.notes().create(alice.id, "Weekend", "buy GROCERIES").await?;
    ctx.notes().create(alice.id, "Work", "standup").await?;

    let shared = ctx.notes().create(bob.id, "groceries for bob", "").await?;
    ctx.notes().share(shared.id, bob.id, "alice@example.com").await?;

    let hits = ctx.notes().search(alice.id, "grocer").await?;
    assert_eq!(ids(&hits), vec![title_hit.id, content_hit.id]);

    assert!(ctx.notes().search(alice.id, "nothing like this").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn search_folds_case_beyond_ascii() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;

    let apples = ctx.notes().create(alice.id, "Äpfel kaufen", "").await?;
    let summer = ctx.notes().create(alice.id, "Urlaub", "ÉTÉ 2024").await?;

    assert_eq!(ids(&ctx.notes().search(alice.id, "äpfel").await?), vec![apples.id]);
    assert_eq!(ids(&ctx.notes().search(alice.id, "été").await?), vec![summer.id]);

    Ok(())
}

#[tokio::test]
async fn search_treats_wildcards_literally() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;

    let discount = ctx.notes().create(alice.id, "Deals", "50% off").await?;
    ctx.notes().create(alice.id, "Work", "standup").await?;

    assert_eq!(ids(&ctx.notes().search(alice.id, "0%").await?), vec![discount.id]);
    assert!(ctx.notes().search(alice.id, "_").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn toggle_star_twice_restores_original() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.user("alice@example.com").await?;
    let note = ctx.notes().create(alice.id, "hi", "there").await?;

    let once = ctx.notes().toggle_star(note.id, alice.id).await?;
    assert!(once.starred);
    assert_eq!(once.title, note.title);
    assert_eq!(once.content, note.content);

    let twice = ctx.notes().toggle_star(note.id, alice.id).await?;
    assert_eq!(twice.starred, note.starred);

    Ok(())
}
