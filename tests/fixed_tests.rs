use cabinet::{ErrorCode, FixedHandle, OCREAT, OTRUNC, OWRITER};
use tempfile::TempDir;

fn open_rw(dir: &TempDir) -> FixedHandle {
    FixedHandle::open(dir.path().join("casket.tcf"), OWRITER | OCREAT | OTRUNC)
        .expect("unable to open database")
}

#[test]
fn put_and_get() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    db.put(1, b"world").unwrap();
    assert_eq!(db.get(1).unwrap(), b"world");
    db.put_cat(1, b"!").unwrap();
    assert_eq!(db.get(1).unwrap(), b"world!");

    db.put_keep(2, b"first").unwrap();
    db.put_keep(2, b"second").unwrap();
    assert_eq!(db.get(2).unwrap(), b"first");

    assert_eq!(db.size(1).unwrap(), 6);
    assert_eq!(db.get(3).unwrap_err().code, ErrorCode::NoRec);

    db.close().unwrap();
}

#[test]
fn math() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    assert_eq!(db.add_int(1, 1).unwrap(), 1);
    assert_eq!(db.add_int(1, 1).unwrap(), 2);
    assert_eq!(db.add_double(2, 2.5).unwrap(), 2.5);
    assert_eq!(db.add_double(2, 2.5).unwrap(), 5.0);

    db.close().unwrap();
}

#[test]
fn keys_must_be_positive() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    assert_eq!(db.put(0, b"x").unwrap_err().code, ErrorCode::Invalid);
    assert_eq!(db.get(-1).unwrap_err().code, ErrorCode::Invalid);

    db.close().unwrap();
}

#[test]
fn iteration_is_key_ordered() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    // 乱序写入，迭代按键的数值顺序产出
    db.put(300, b"c").unwrap();
    db.put(1, b"a").unwrap();
    db.put(20, b"b").unwrap();

    let keys: Vec<i64> = db
        .iter_keys()
        .map(|item| item.expect("error while iterating over keys"))
        .collect();
    assert_eq!(keys, vec![1, 20, 300]);

    db.close().unwrap();
}

#[test]
fn transactions() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    db.put(1, b"set-outside-txn").unwrap();
    db.begin_txn().unwrap();
    db.put(1, b"set-inside-txn").unwrap();
    db.abort_txn().unwrap();
    assert_eq!(db.get(1).unwrap(), b"set-outside-txn");

    db.put(2, b"set-outside-txn").unwrap();
    db.begin_txn().unwrap();
    db.put(2, b"set-inside-txn").unwrap();
    db.commit_txn().unwrap();
    assert_eq!(db.get(2).unwrap(), b"set-inside-txn");

    db.close().unwrap();
}
