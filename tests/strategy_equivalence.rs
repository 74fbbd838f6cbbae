use sortcopy::{sort_tree, RunStats, Strategy};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use walkdir::WalkDir;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

/// relative path -> bytes for every file under `root`
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

fn same_shape(a: &RunStats, b: &RunStats) {
    assert_eq!(a.extensions, b.extensions);
    assert_eq!(a.duplicate_fingerprint_groups(), b.duplicate_fingerprint_groups());
    assert_eq!(a.duplicate_name_groups(), b.duplicate_name_groups());
    assert_eq!(a.files_discovered, b.files_discovered);
    assert_eq!(a.files_copied, b.files_copied);
    assert_eq!(a.duplicate_files, b.duplicate_files);
    assert_eq!(a.folders_visited, b.folders_visited);
}

#[test]
fn identical_destination_without_name_collisions() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    for i in 0..20 {
        write(&src, &format!("dir{}/file{i}.txt", i % 4), &format!("text {i}"));
        write(&src, &format!("dir{}/deep/img{i}.png", i % 3), &format!("png {i}"));
    }
    // true duplicates: same name, same bytes
    write(&src, "x/shared.md", "shared");
    write(&src, "y/shared.md", "shared");
    write(&src, "z/w/shared.md", "shared");
    write(&src, "LICENSE", "mit");

    let staged = sort_tree(&src, &td.path().join("staged"), Strategy::Staged).unwrap();
    let immediate = sort_tree(&src, &td.path().join("immediate"), Strategy::Immediate).unwrap();

    same_shape(&staged, &immediate);
    assert_eq!(staged.duplicate_files, 2);
    assert_eq!(
        snapshot(&td.path().join("staged")),
        snapshot(&td.path().join("immediate"))
    );
}

#[test]
fn same_cardinalities_with_name_collisions() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    for d in 0..5 {
        write(&src, &format!("d{d}/report.pdf"), &format!("version {}", d % 3));
        write(&src, &format!("d{d}/notes"), "same everywhere");
    }

    let staged = sort_tree(&src, &td.path().join("staged"), Strategy::Staged).unwrap();
    let immediate = sort_tree(&src, &td.path().join("immediate"), Strategy::Immediate).unwrap();

    same_shape(&staged, &immediate);
    assert_eq!(staged.files_renamed, immediate.files_renamed);
    assert_eq!(staged.files_renamed, 2);

    // Which copy keeps the plain name may differ; the stored contents may not.
    let contents = |root: PathBuf| {
        let mut v: Vec<_> = snapshot(&root).into_values().collect();
        v.sort();
        v
    };
    assert_eq!(
        contents(td.path().join("staged")),
        contents(td.path().join("immediate"))
    );
}
