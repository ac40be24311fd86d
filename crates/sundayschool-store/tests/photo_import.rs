use std::fs::{self, File};
use std::path::PathBuf;

use sundayschool_store::{Database, ErrorKind, NewPhoto, StoreConfig, StoreError};

const TEN_MIB: u64 = 10 * 1024 * 1024;

fn file_of_size(dir: &tempfile::TempDir, name: &str, len: u64) -> PathBuf {
    let path = dir.path().join(name);
    File::create(&path).unwrap().set_len(len).unwrap();
    path
}

fn open(dir: &tempfile::TempDir) -> Database {
    Database::open_at(&dir.path().join("data")).unwrap()
}

fn managed_files(db: &Database) -> usize {
    fs::read_dir(db.photos_dir()).unwrap().count()
}

#[test]
fn reimporting_an_external_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    let src = file_of_size(&dir, "portrait.jpg", 64);

    let first = db.add_photo(&NewPhoto::from_path(&src)).unwrap();
    let second = db.add_photo(&NewPhoto::from_path(&src)).unwrap();

    assert_eq!(first, second);
    assert_eq!(db.count_photos().unwrap(), 1);
    assert_eq!(managed_files(&db), 1);
}

#[test]
fn reimport_after_managed_copy_vanished_copies_again() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    let src = file_of_size(&dir, "portrait.jpg", 64);

    let first = db.add_photo(&NewPhoto::from_path(&src)).unwrap();
    fs::remove_file(db.get_photo(first).unwrap().unwrap().file_path).unwrap();

    let second = db.add_photo(&NewPhoto::from_path(&src)).unwrap();
    assert_ne!(first, second);
    assert_eq!(managed_files(&db), 1);
}

#[test]
fn file_already_in_managed_storage_is_not_copied() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    fs::create_dir_all(db.photos_dir()).unwrap();
    let inside = db.photos_dir().join("already_here.png");
    fs::write(&inside, [0x89, b'P', b'N', b'G']).unwrap();

    let id = db.add_photo(&NewPhoto::from_path(&inside)).unwrap();
    let photo = db.get_photo(id).unwrap().unwrap();
    assert_eq!(PathBuf::from(&photo.file_path), inside);
    assert_eq!(photo.file_name, "already_here.png");
    assert_eq!(managed_files(&db), 1);

    // same final path, same row
    assert_eq!(db.add_photo(&NewPhoto::from_path(&inside)).unwrap(), id);
    assert_eq!(db.count_photos().unwrap(), 1);
}

#[test]
fn disallowed_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    let src = dir.path().join("notes.txt");
    fs::write(&src, "not a photo").unwrap();

    let err = db.add_photo(&NewPhoto::from_path(&src)).unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedFileType { .. }));
    assert_eq!(err.kind(), ErrorKind::File);
    assert_eq!(db.count_photos().unwrap(), 0);
}

#[test]
fn size_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let exact = file_of_size(&dir, "exact.jpg", TEN_MIB);
    assert!(db.add_photo(&NewPhoto::from_path(&exact)).is_ok());

    let over = file_of_size(&dir, "over.jpg", TEN_MIB + 1);
    let err = db.add_photo(&NewPhoto::from_path(&over)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::FileTooLarge { size, max } if size == TEN_MIB + 1 && max == TEN_MIB
    ));
    assert_eq!(db.count_photos().unwrap(), 1);
    assert_eq!(managed_files(&db), 1);
}

#[test]
fn configured_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        max_photo_bytes: 100,
        ..StoreConfig::at(dir.path().join("data"))
    };
    let db = Database::open(&config).unwrap();

    assert!(db
        .add_photo(&NewPhoto::from_path(file_of_size(&dir, "small.gif", 100)))
        .is_ok());
    assert!(matches!(
        db.add_photo(&NewPhoto::from_path(file_of_size(&dir, "big.gif", 101))),
        Err(StoreError::FileTooLarge { .. })
    ));
}

#[test]
fn same_name_from_different_folders_gets_distinct_copies() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::write(a.join("IMG_0001.jpg"), [1u8]).unwrap();
    fs::write(b.join("IMG_0001.jpg"), [2u8]).unwrap();

    let first = db.add_photo(&NewPhoto::from_path(a.join("IMG_0001.jpg"))).unwrap();
    let second = db.add_photo(&NewPhoto::from_path(b.join("IMG_0001.jpg"))).unwrap();

    assert_ne!(first, second);
    let first_path = db.get_photo(first).unwrap().unwrap().file_path;
    let second_path = db.get_photo(second).unwrap().unwrap().file_path;
    assert_ne!(first_path, second_path);
    assert_eq!(fs::read(first_path).unwrap(), vec![1u8]);
    assert_eq!(fs::read(second_path).unwrap(), vec![2u8]);
}
