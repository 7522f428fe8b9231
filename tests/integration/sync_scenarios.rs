use crate::integration::support::{Workspace, ROOT_PAGE};
use md_publish::remote::{discover, RemoteStore, SourcePathIndex};
use md_publish::sync::SyncOptions;
use md_publish::store::CacheStore;

const PAGES: usize = 5;

#[tokio::test]
async fn fresh_publish_creates_the_page_hierarchy() {
    let ws = Workspace::handbook();
    let report = ws
        .engine()
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, PAGES);
    assert_eq!(report.updated, 0);
    assert!(report.is_success());
    assert_eq!(ws.store.page_count(), PAGES);

    let top = ws.store.child_pages(ROOT_PAGE);
    assert_eq!(top.len(), 1);
    let (root_id, root_title) = &top[0];
    assert_eq!(root_title, "Handbook");
    assert_eq!(
        ws.store.paragraph_texts(root_id),
        vec![
            "<!--md-publish:-->".to_string(),
            "Intro paragraph.".to_string()
        ]
    );

    let titles: Vec<String> = ws
        .store
        .child_pages(root_id)
        .into_iter()
        .map(|(_, title)| title)
        .collect();
    assert_eq!(titles, vec!["docs", "Notes"]);

    let pages = discover(&ws.remote(), ROOT_PAGE).await.unwrap();
    let index = SourcePathIndex::from_pages(&pages);
    let faq = index.get("docs/faq.md").unwrap();
    assert_eq!(ws.store.title_of(faq).as_deref(), Some("faq"));
}

#[tokio::test]
async fn unchanged_resync_makes_no_mutations() {
    let ws = Workspace::handbook();
    let engine = ws.engine();
    engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();
    ws.store.reset_stats();

    let report = engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.updated, 0);
    assert_eq!(report.skipped, PAGES);
    assert_eq!(ws.store.stats().mutation_calls(), 0);
    assert_eq!(ws.store.page_count(), PAGES);
}

#[tokio::test]
async fn single_edit_updates_only_that_page() {
    let ws = Workspace::handbook();
    let engine = ws.engine();
    engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    ws.write("docs/guide.md", "# Guide v2\n\nStep two.");
    let snapshot = engine.snapshot(&ws.target(), false).unwrap();
    assert_eq!(snapshot.diff.modified, vec!["docs/guide.md".to_string()]);
    assert!(snapshot.diff.added.is_empty());

    ws.store.reset_stats();
    let report = engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.created, 0);
    assert_eq!(report.skipped, PAGES - 1);
    assert_eq!(ws.store.stats().update_title_calls, 1);
    assert_eq!(ws.store.stats().create_calls, 0);

    let pages = discover(&ws.remote(), ROOT_PAGE).await.unwrap();
    let index = SourcePathIndex::from_pages(&pages);
    let guide = index.get("docs/guide.md").unwrap();
    assert_eq!(ws.store.title_of(guide).as_deref(), Some("Guide v2"));
    assert_eq!(
        ws.store.paragraph_texts(guide),
        vec![
            "<!--md-publish:docs/guide.md-->".to_string(),
            "Step two.".to_string()
        ]
    );
}

#[tokio::test]
async fn added_file_is_created_under_existing_parent() {
    let ws = Workspace::handbook();
    let engine = ws.engine();
    engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    ws.write("docs/install.md", "# Install");
    let report = engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 0);
    let pages = discover(&ws.remote(), ROOT_PAGE).await.unwrap();
    let index = SourcePathIndex::from_pages(&pages);
    let docs = index.get("docs").unwrap();
    let install = index.get("docs/install.md").unwrap();
    assert!(ws
        .store
        .child_pages(docs)
        .iter()
        .any(|(id, _)| id == install));
}

#[tokio::test]
async fn force_rewrites_every_page_without_duplicates() {
    let ws = Workspace::handbook();
    let engine = ws.engine();
    engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    let options = SyncOptions {
        dry_run: false,
        force: true,
    };
    let report = engine.sync_target(&ws.target(), options).await.unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.updated, PAGES);
    assert_eq!(ws.store.page_count(), PAGES);
}

#[tokio::test]
async fn lost_cache_recovers_pages_through_markers() {
    let ws = Workspace::handbook();
    let engine = ws.engine();
    engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();
    ws.cache.clear("handbook").unwrap();

    let report = engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.updated, PAGES);
    assert_eq!(ws.store.page_count(), PAGES);
}

#[tokio::test]
async fn failed_page_does_not_stop_siblings() {
    let ws = Workspace::handbook();
    ws.store.fail_creates_titled("Guide");

    let report = ws
        .engine()
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].source_path, "docs/guide.md");
    assert_eq!(report.created, PAGES - 1);
    assert!(ws.cache.load("handbook").unwrap().is_some());
}

#[tokio::test]
async fn rate_limits_are_retried() {
    let ws = Workspace::handbook();
    ws.store.inject_rate_limits(3);

    let report = ws
        .engine()
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.created, PAGES);
    assert_eq!(ws.store.page_count(), PAGES);
}

#[tokio::test]
async fn dry_run_leaves_remote_and_cache_alone() {
    let ws = Workspace::handbook();
    let options = SyncOptions {
        dry_run: true,
        force: false,
    };

    let report = ws.engine().sync_target(&ws.target(), options).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.created, PAGES);
    assert_eq!(ws.store.stats().create_calls, 0);
    assert_eq!(ws.store.stats().list_calls, 0);
    assert!(ws.cache.load("handbook").unwrap().is_none());
}

#[tokio::test]
async fn unmanaged_pages_are_left_alone() {
    let ws = Workspace::handbook();
    let scratch = ws.store.create_page(ROOT_PAGE, "Scratch").await.unwrap();
    ws.store
        .append_blocks(
            &scratch,
            &[md_publish::markdown::Block::plain_paragraph("hand written")],
        )
        .await
        .unwrap();

    let report = ws
        .engine()
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.created, PAGES);
    assert_eq!(ws.store.title_of(&scratch).as_deref(), Some("Scratch"));
    assert_eq!(
        ws.store.paragraph_texts(&scratch),
        vec!["hand written".to_string()]
    );
}

#[tokio::test]
async fn readme_edit_keeps_the_subtree() {
    let ws = Workspace::handbook();
    let engine = ws.engine();
    engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    ws.write("README.md", "# Handbook\n\nNew intro.");
    let report = engine
        .sync_target(&ws.target(), SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, PAGES - 1);
    assert_eq!(ws.store.page_count(), PAGES);
    let pages = discover(&ws.remote(), ROOT_PAGE).await.unwrap();
    assert_eq!(pages.len(), PAGES);
}
