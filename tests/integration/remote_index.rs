use crate::integration::support::fast_gate;
use md_publish::remote::pages::{create_managed_page, replace_page_content};
use md_publish::remote::{
    create_marker, discover, extract_source_path_from_marker, GatedRemote, MemoryStore,
    RemoteStore, SourcePathIndex,
};
use md_publish::markdown::markdown_to_blocks;
use std::sync::Arc;

#[test]
fn marker_round_trip() {
    for path in ["", "README.md", "docs/guide.md", "a b/ü.md"] {
        let marker = create_marker(path);
        assert_eq!(extract_source_path_from_marker(&marker), Some(path));
    }
    assert_eq!(extract_source_path_from_marker("<!-- other -->"), None);
    assert_eq!(extract_source_path_from_marker("plain text"), None);
}

#[tokio::test]
async fn discovery_maps_markers_to_page_ids() {
    let store = Arc::new(MemoryStore::new("root"));
    let remote = GatedRemote::new(store.clone(), fast_gate());

    let docs = create_managed_page(&remote, "root", "Docs", "docs").await.unwrap();
    let guide = create_managed_page(&remote, &docs, "Guide", "docs/guide.md")
        .await
        .unwrap();
    let manual = store.create_page("root", "Manual").await.unwrap();
    create_managed_page(&remote, &manual, "Hidden", "hidden.md")
        .await
        .unwrap();

    let pages = discover(&remote, "root").await.unwrap();
    let index = SourcePathIndex::from_pages(&pages);

    assert_eq!(index.len(), 2);
    assert_eq!(index.get("docs"), Some(&docs));
    assert_eq!(index.get("docs/guide.md"), Some(&guide));
    assert!(index.get("hidden.md").is_none());
}

#[tokio::test]
async fn replacing_content_keeps_the_marker_first() {
    let store = Arc::new(MemoryStore::new("root"));
    let remote = GatedRemote::new(store.clone(), fast_gate());
    let page = create_managed_page(&remote, "root", "Guide", "guide.md")
        .await
        .unwrap();

    replace_page_content(&remote, &page, "guide.md", &markdown_to_blocks("first\n\nsecond"))
        .await
        .unwrap();
    replace_page_content(&remote, &page, "guide.md", &markdown_to_blocks("third"))
        .await
        .unwrap();

    assert_eq!(
        store.paragraph_texts(&page),
        vec!["<!--md-publish:guide.md-->".to_string(), "third".to_string()]
    );
    let pages = discover(&remote, "root").await.unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].source_path, "guide.md");
}
