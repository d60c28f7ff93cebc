use tokio_test::{assert_err, assert_ok};

use super::*;

/// Helper function to set up a test store
async fn setup_test_store() -> (Store, PathBuf, tempfile::TempDir) {
  let dir = tempdir().unwrap();
  let path = dir.path().join("nested").join("test.db");
  let store = Store::open(&path).await.unwrap();
  (store, path, dir)
}

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2025, 1, d).unwrap() }

fn result(paper_id: &str, score: f64) -> DigestResult {
  DigestResult {
    paper_id:        paper_id.into(),
    relevancy_score: score,
    reason:          format!("matches {paper_id}"),
  }
}

#[traced_test]
#[tokio::test]
async fn test_store_creation() {
  let (_store, path, _dir) = setup_test_store().await;
  assert!(path.exists());
}

#[test]
fn test_default_path() {
  let path = Store::default_path();
  assert!(
    path.ends_with("paperboard/paperboard.db") || path.ends_with("paperboard\\paperboard.db")
  );
}

#[tokio::test]
async fn test_reopen_keeps_data() {
  let (store, path, _dir) = setup_test_store().await;
  store.save_query("alice", "Agents", "all:agent").await.unwrap();
  drop(store);

  let store = Store::open(&path).await.unwrap();
  assert_eq!(store.queries("alice").await.unwrap().len(), 1);
}

#[traced_test]
#[tokio::test]
async fn test_saved_queries() {
  let (store, _path, _dir) = setup_test_store().await;

  let first = store.save_query("alice", " Agents ", "all:agent").await.unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  let second = store.save_query("alice", "Vision", "cat:cs.CV").await.unwrap();
  store.save_query("bob", "Other", "cat:math.PR").await.unwrap();

  assert_eq!(first.name, "Agents");
  let queries = store.queries("alice").await.unwrap();
  assert_eq!(queries.iter().map(|q| q.id.as_str()).collect::<Vec<_>>(), vec![
    second.id.as_str(),
    first.id.as_str()
  ]);

  // Owner scoping
  assert!(matches!(store.delete_query("bob", &first.id).await, Err(PaperboardError::NotFound)));
  assert_ok!(store.delete_query("alice", &first.id).await);
  assert!(matches!(store.delete_query("alice", &first.id).await, Err(PaperboardError::NotFound)));
  assert_eq!(store.queries("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_saved_query_validation() {
  let (store, _path, _dir) = setup_test_store().await;
  assert!(matches!(
    store.save_query("alice", "", "q").await,
    Err(PaperboardError::InvalidInput(_))
  ));
  assert!(matches!(
    store.save_query("alice", "n", "  ").await,
    Err(PaperboardError::InvalidInput(_))
  ));
  assert!(matches!(store.save_query("", "n", "q").await, Err(PaperboardError::InvalidInput(_))));
}

#[test]
fn test_tag_colors_match_dashboard() {
  assert_eq!(color_for_tag("a"), "bg-green-100 text-green-800");
  assert_eq!(color_for_tag("b"), "bg-yellow-100 text-yellow-800");
  assert_eq!(color_for_tag("ml"), "bg-green-100 text-green-800");
  assert_eq!(color_for_tag("Reading List"), "bg-yellow-100 text-yellow-800");
  assert_eq!(color_for_tag("transformers"), "bg-blue-100 text-blue-800");
  assert_eq!(color_for_tag("to read"), "bg-indigo-100 text-indigo-800");
  assert_eq!(color_for_tag("Important"), "bg-blue-100 text-blue-800");
  assert_eq!(
    color_for_tag("a very long tag name that overflows int32 range"),
    "bg-purple-100 text-purple-800"
  );
  assert_eq!(color_for_tag("日本語"), "bg-indigo-100 text-indigo-800");
  assert!(tags::TAG_COLORS.contains(&color_for_tag("")));
}

#[traced_test]
#[tokio::test]
async fn test_add_and_list_tags() {
  let (store, _path, _dir) = setup_test_store().await;

  let crypto = store.add_tag("alice", "2301.07041v2", "  crypto ", None).await.unwrap();
  assert_eq!(crypto.name, "crypto");
  assert_eq!(crypto.paper_id, "2301.07041");
  assert_eq!(crypto.color, color_for_tag("crypto"));

  tokio::time::sleep(Duration::from_millis(5)).await;
  let fhe =
    store.add_tag("alice", "2301.07041", "fhe", Some("bg-pink-100 text-pink-800")).await.unwrap();
  assert_eq!(fhe.color, "bg-pink-100 text-pink-800");

  let tags = store.tags_for_paper("alice", "2301.07041v1").await.unwrap();
  assert_eq!(tags, vec![fhe.clone(), crypto.clone()]);
  assert!(store.tags_for_paper("bob", "2301.07041").await.unwrap().is_empty());

  let summary = store.tag_summary("alice").await.unwrap();
  assert_eq!(summary.names, vec!["crypto", "fhe"]);
  assert_eq!(summary.colors["fhe"], "bg-pink-100 text-pink-800");
}

#[tokio::test]
async fn test_duplicate_tag() {
  let (store, _path, _dir) = setup_test_store().await;
  store.add_tag("alice", "2301.07041", "crypto", None).await.unwrap();

  let duplicate = store.add_tag("alice", "2301.07041v3", "crypto ", None).await;
  assert!(matches!(duplicate, Err(PaperboardError::DuplicateTag)));

  // Same name on another paper or for another user is fine
  assert_ok!(store.add_tag("alice", "2301.00001", "crypto", None).await);
  assert_ok!(store.add_tag("bob", "2301.07041", "crypto", None).await);
  assert!(matches!(
    store.add_tag("alice", "x", "   ", None).await,
    Err(PaperboardError::InvalidInput(_))
  ));
}

#[tokio::test]
async fn test_summary_keeps_first_color() {
  let (store, _path, _dir) = setup_test_store().await;
  store.add_tag("alice", "1", "ml", Some("bg-pink-100 text-pink-800")).await.unwrap();
  store.add_tag("alice", "2", "ml", Some("bg-blue-100 text-blue-800")).await.unwrap();

  let summary = store.tag_summary("alice").await.unwrap();
  assert_eq!(summary.names, vec!["ml"]);
  assert_eq!(summary.colors["ml"], "bg-pink-100 text-pink-800");
}

#[tokio::test]
async fn test_remove_tag_prunes_summary() {
  let (store, _path, _dir) = setup_test_store().await;
  let first = store.add_tag("alice", "1", "ml", None).await.unwrap();
  let second = store.add_tag("alice", "2", "ml", None).await.unwrap();

  assert!(matches!(store.remove_tag("bob", &first.id).await, Err(PaperboardError::NotFound)));

  store.remove_tag("alice", &first.id).await.unwrap();
  assert_eq!(store.tag_summary("alice").await.unwrap().names, vec!["ml"]);

  store.remove_tag("alice", &second.id).await.unwrap();
  assert!(store.tag_summary("alice").await.unwrap().names.is_empty());
  assert_err!(store.remove_tag("alice", &second.id).await);
}

#[tokio::test]
async fn test_paper_ids_for_tag() {
  let (store, _path, _dir) = setup_test_store().await;
  store.add_tag("alice", "1v2", "ml", None).await.unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  store.add_tag("alice", "2", "ml", None).await.unwrap();
  store.add_tag("alice", "3", "other", None).await.unwrap();

  assert_eq!(store.paper_ids_for_tag("alice", "ml").await.unwrap(), vec!["2", "1"]);
  assert!(store.paper_ids_for_tag("bob", "ml").await.unwrap().is_empty());
}

#[traced_test]
#[tokio::test]
async fn test_reading_list_toggle() {
  let (store, _path, _dir) = setup_test_store().await;
  let paper = "2401.00001v2";

  assert!(!store.in_reading_list("alice", paper).await.unwrap());
  assert_eq!(
    store.toggle_reading_list("alice", paper, ReadingListAction::Add).await.unwrap(),
    Toggle::Added
  );
  assert_eq!(
    store.toggle_reading_list("alice", paper, ReadingListAction::Add).await.unwrap(),
    Toggle::Unchanged
  );
  assert!(store.in_reading_list("alice", "2401.00001").await.unwrap());

  let summary = store.tag_summary("alice").await.unwrap();
  assert_eq!(summary.colors[tags::READING_LIST], tags::READING_LIST_COLOR);
  assert_eq!(
    store.paper_ids_for_tag("alice", tags::READING_LIST).await.unwrap(),
    vec!["2401.00001"]
  );

  assert_eq!(
    store.toggle_reading_list("alice", paper, ReadingListAction::Remove).await.unwrap(),
    Toggle::Removed
  );
  assert_eq!(
    store.toggle_reading_list("alice", paper, ReadingListAction::Remove).await.unwrap(),
    Toggle::Unchanged
  );
  assert!(!store.in_reading_list("alice", paper).await.unwrap());
  assert!(store.tag_summary("alice").await.unwrap().names.is_empty());
}

#[tokio::test]
async fn test_reading_list_reuses_summary_color() {
  let (store, _path, _dir) = setup_test_store().await;
  store.add_tag("alice", "1", tags::READING_LIST, Some("bg-pink-100 text-pink-800")).await.unwrap();
  store.toggle_reading_list("alice", "2", ReadingListAction::Add).await.unwrap();

  let tags = store.tags_for_paper("alice", "2").await.unwrap();
  assert_eq!(tags[0].color, "bg-pink-100 text-pink-800");
}

#[test]
fn test_reading_list_action_from_str() {
  assert_eq!("add".parse::<ReadingListAction>().unwrap(), ReadingListAction::Add);
  assert_eq!(" Remove ".parse::<ReadingListAction>().unwrap(), ReadingListAction::Remove);
  assert!("toggle".parse::<ReadingListAction>().is_err());
}

#[traced_test]
#[tokio::test]
async fn test_digest_crud() {
  let (store, _path, _dir) = setup_test_store().await;
  let topics = vec!["cs.LG".to_string(), " ".to_string(), " cs.AI ".to_string()];

  let digest =
    store.create_digest("alice", " Weekly ML ", &topics, "new optimizers").await.unwrap();
  assert_eq!(digest.name, "Weekly ML");
  assert_eq!(digest.topics, vec!["cs.LG", "cs.AI"]);
  assert_eq!(store.digests("alice").await.unwrap(), vec![digest.clone()]);
  assert!(store.digests("bob").await.unwrap().is_empty());

  let updated = store
    .update_digest("alice", &digest.id, "Daily ML", &["stat.ML".to_string()], "")
    .await
    .unwrap();
  assert_eq!(updated.id, digest.id);
  assert_eq!(updated.name, "Daily ML");
  assert_eq!(updated.topics, vec!["stat.ML"]);
  assert_eq!(updated.created_at, digest.created_at);

  // Only the owner may change or delete a digest
  assert!(matches!(
    store.update_digest("bob", &digest.id, "Hijacked", &[], "").await,
    Err(PaperboardError::NotFound)
  ));
  assert!(matches!(store.delete_digest("bob", &digest.id).await, Err(PaperboardError::NotFound)));

  store.delete_digest("alice", &digest.id).await.unwrap();
  assert!(store.digests("alice").await.unwrap().is_empty());
  assert!(matches!(store.delete_digest("alice", &digest.id).await, Err(PaperboardError::NotFound)));
}

#[tokio::test]
async fn test_digest_validation() {
  let (store, _path, _dir) = setup_test_store().await;
  assert!(matches!(
    store.create_digest("alice", "  ", &[], "").await,
    Err(PaperboardError::InvalidInput(_))
  ));
}

#[tokio::test]
async fn test_digest_results() {
  let (store, _path, _dir) = setup_test_store().await;
  store.record_digest_result("alice", day(2), "ML", &result("2401.00002v1", 0.4)).await.unwrap();
  store.record_digest_result("alice", day(2), "ML", &result("2401.00001", 0.9)).await.unwrap();
  store.record_digest_result("alice", day(3), "ML", &result("2401.00003", 0.5)).await.unwrap();
  store.record_digest_result("bob", day(2), "ML", &result("2401.00004", 0.5)).await.unwrap();

  let results = store.digest_results("alice", day(2), "ML").await.unwrap();
  assert_eq!(
    results.iter().map(|r| r.paper_id.as_str()).collect::<Vec<_>>(),
    vec!["2401.00001", "2401.00002"]
  );
  assert_eq!(results[0].relevancy_score, 0.9);

  // Recording the same paper again replaces the earlier match
  store.record_digest_result("alice", day(2), "ML", &result("2401.00001", 0.1)).await.unwrap();
  let results = store.digest_results("alice", day(2), "ML").await.unwrap();
  assert_eq!(results.len(), 2);
  assert_eq!(results[0].relevancy_score, 0.1);

  assert!(store.digest_results("alice", day(4), "ML").await.unwrap().is_empty());
}
