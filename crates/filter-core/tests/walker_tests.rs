//! Integration tests for directory tree filtering.

use filter_core::{DirectoryWalker, Error, FileFilter, PropertySource};
use filter_test_utils::FixtureTree;
use pretty_assertions::assert_eq;

fn sources() -> Vec<PropertySource> {
    vec![PropertySource::from_entries("env", [("name", "prod")])]
}

fn txt_only() -> FileFilter {
    FileFilter::new(None, Some(r".*\.txt")).unwrap()
}

#[test]
fn test_mirrors_matched_files_only() {
    let tree = FixtureTree::new();
    tree.file("in/a.txt", "a=${name}\n");
    tree.file("in/sub/b.txt", "b=${name}\n");
    tree.file("in/sub/skip.xml", "<x>${name}</x>\n");
    tree.file("in/notes.md", "${name}\n");

    let summary = DirectoryWalker::default()
        .walk(&tree.path("in"), &tree.path("out"), &txt_only(), true, &sources())
        .unwrap();

    assert_eq!(tree.files_under("out"), vec!["a.txt", "sub/b.txt"]);
    assert_eq!(tree.dirs_under("out"), vec!["sub"]);
    assert_eq!(tree.read("out/a.txt"), "a=prod\n");
    assert_eq!(tree.read("out/sub/b.txt"), "b=prod\n");
    assert_eq!(
        summary.files,
        vec![tree.path("out/a.txt"), tree.path("out/sub/b.txt")]
    );
}

#[test]
fn test_without_recurse_only_top_level_files() {
    let tree = FixtureTree::new();
    tree.file("in/a.txt", "${name}\n");
    tree.file("in/sub/b.txt", "${name}\n");

    DirectoryWalker::default()
        .walk(&tree.path("in"), &tree.path("out"), &txt_only(), false, &sources())
        .unwrap();

    assert_eq!(tree.files_under("out"), vec!["a.txt"]);
    tree.assert_absent("out/sub");
}

#[test]
fn test_directory_pattern_applies_at_every_depth() {
    let tree = FixtureTree::new();
    tree.file("in/root.txt", "${name}\n");
    tree.file("in/conf/a.txt", "${name}\n");
    tree.file("in/conf/conf/b.txt", "${name}\n");
    tree.file("in/conf/other/c.txt", "${name}\n");
    tree.file("in/other/conf/d.txt", "${name}\n");

    let filter = FileFilter::new(Some("conf"), None).unwrap();
    DirectoryWalker::default()
        .walk(&tree.path("in"), &tree.path("out"), &filter, true, &sources())
        .unwrap();

    assert_eq!(
        tree.files_under("out"),
        vec!["conf/a.txt", "conf/conf/b.txt", "root.txt"]
    );
}

#[test]
fn test_filename_pattern_does_not_gate_traversal() {
    let tree = FixtureTree::new();
    tree.file("in/nested.dir/deep/a.txt", "${name}\n");

    DirectoryWalker::default()
        .walk(&tree.path("in"), &tree.path("out"), &txt_only(), true, &sources())
        .unwrap();

    assert_eq!(tree.files_under("out"), vec!["nested.dir/deep/a.txt"]);
}

#[test]
fn test_in_place_directory_filtering() {
    let tree = FixtureTree::new();
    tree.file("work/a.txt", "a=${name}\n");
    tree.file("work/sub/b.txt", "b=${name}\n");
    tree.file("work/sub/c.xml", "c=${name}\n");

    DirectoryWalker::default()
        .walk(&tree.path("work"), &tree.path("work"), &txt_only(), true, &sources())
        .unwrap();

    assert_eq!(tree.read("work/a.txt"), "a=prod\n");
    assert_eq!(tree.read("work/sub/b.txt"), "b=prod\n");
    assert_eq!(tree.read("work/sub/c.xml"), "c=${name}\n");
}

#[test]
fn test_output_root_inside_input_is_not_walked() {
    let tree = FixtureTree::new();
    tree.file("in/a.txt", "${name}\n");
    tree.file("in/generated/stale.txt", "stale\n");

    DirectoryWalker::default()
        .walk(
            &tree.path("in"),
            &tree.path("in/generated"),
            &txt_only(),
            true,
            &sources(),
        )
        .unwrap();

    assert_eq!(tree.files_under("in/generated"), vec!["a.txt", "stale.txt"]);
    tree.assert_absent("in/generated/generated");
}

#[test]
fn test_missing_input_directory_is_resource_not_found() {
    let tree = FixtureTree::new();
    let err = DirectoryWalker::default()
        .walk(&tree.path("absent"), &tree.path("out"), &txt_only(), true, &sources())
        .unwrap_err();
    assert!(matches!(err, Error::ResourceNotFound { .. }));
}

#[test]
fn test_file_input_is_configuration_error() {
    let tree = FixtureTree::new();
    let file = tree.file("single.txt", "${name}\n");
    let err = DirectoryWalker::default()
        .walk(&file, &tree.path("out"), &txt_only(), true, &sources())
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::symlink;

    #[test]
    fn symlinked_directory_is_traversed_as_directory() {
        let tree = FixtureTree::new();
        tree.file("shared/x.txt", "x=${name}\n");
        tree.dir("in");
        symlink(tree.path("shared"), tree.path("in/linked")).unwrap();

        DirectoryWalker::default()
            .walk(&tree.path("in"), &tree.path("out"), &txt_only(), true, &sources())
            .unwrap();

        assert_eq!(tree.files_under("out"), vec!["linked/x.txt"]);
        assert_eq!(tree.read("out/linked/x.txt"), "x=prod\n");
    }

    #[test]
    fn symlink_cycle_is_visited_once() {
        let tree = FixtureTree::new();
        tree.file("in/sub/a.txt", "${name}\n");
        symlink(tree.path("in"), tree.path("in/sub/back")).unwrap();

        DirectoryWalker::default()
            .walk(&tree.path("in"), &tree.path("out"), &txt_only(), true, &sources())
            .unwrap();

        assert_eq!(tree.files_under("out"), vec!["sub/a.txt"]);
    }

    #[test]
    fn dangling_symlink_is_skipped() {
        let tree = FixtureTree::new();
        tree.file("in/a.txt", "${name}\n");
        symlink(tree.path("nowhere.txt"), tree.path("in/broken.txt")).unwrap();

        DirectoryWalker::default()
            .walk(&tree.path("in"), &tree.path("out"), &txt_only(), true, &sources())
            .unwrap();

        assert_eq!(tree.files_under("out"), vec!["a.txt"]);
    }
}
