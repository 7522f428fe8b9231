use md_publish::tree::{build_hash_tree, diff, ScanEntry};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn entries(files: &BTreeMap<String, String>) -> Vec<ScanEntry> {
    files
        .iter()
        .map(|(path, content)| ScanEntry::file(path.clone(), content.clone()))
        .collect()
}

fn file_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-d]{1,3}(/[a-d]{1,3}){0,2}\\.md", "[ -~]{0,40}", 1..12)
}

proptest! {
    #[test]
    fn root_hash_ignores_scan_order(files in file_map(), rotate in 0usize..12) {
        let forward = entries(&files);
        let mut shuffled = forward.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left(rotate % len);

        let a = build_hash_tree(&forward).unwrap();
        let b = build_hash_tree(&shuffled).unwrap();
        prop_assert_eq!(&a.hash, &b.hash);
        prop_assert!(diff(Some(&a), &b).is_empty());
    }

    #[test]
    fn any_content_edit_is_reported_as_modified(
        files in file_map(),
        pick in any::<prop::sample::Index>(),
    ) {
        let before = build_hash_tree(&entries(&files)).unwrap();
        let mut edited = files.clone();
        let path = pick.get(&files.keys().cloned().collect::<Vec<_>>()).clone();
        edited.insert(path.clone(), format!("{}!", files[&path]));
        let after = build_hash_tree(&entries(&edited)).unwrap();

        let result = diff(Some(&before), &after);
        prop_assert_eq!(result.modified, vec![path]);
        prop_assert!(result.added.is_empty());
        prop_assert!(result.deleted.is_empty());
    }
}
