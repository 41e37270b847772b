use std::collections::HashSet;

use cabinet::{
    ErrorCode, HashHandle, HashTuning, KeyIter, OCREAT, OREADER, OTRUNC, OWRITER,
};
use slog::{o, Drain};
use tempfile::TempDir;

fn open_rw(dir: &TempDir) -> HashHandle {
    HashHandle::open(dir.path().join("casket.tch"), OWRITER | OCREAT | OTRUNC)
        .expect("unable to open database")
}

fn assert_key_set(iter: KeyIter<Vec<u8>>, expected: &[&str]) {
    let mut seen = HashSet::new();
    for item in iter {
        let key = item.expect("error while iterating over keys");
        seen.insert(String::from_utf8(key).expect("non-utf8 key"));
    }
    assert_eq!(seen.len(), expected.len());
    for key in expected {
        assert!(seen.contains(*key), "did not see expected key {}", key);
    }
}

#[test]
fn put_and_get() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    // Put, PutCat
    db.put(b"hello", b"world").unwrap();
    assert_eq!(db.get(b"hello").unwrap(), b"world");
    db.put_cat(b"hello", b"!").unwrap();
    assert_eq!(db.get(b"hello").unwrap(), b"world!");

    // 不存在的键以空值为基底
    db.put_cat(b"fresh", b"start").unwrap();
    assert_eq!(db.get(b"fresh").unwrap(), b"start");

    // PutAsync
    db.put_async(b"async", b"value").unwrap();
    db.sync().unwrap();
    assert_eq!(db.get(b"async").unwrap(), b"value");

    // PutKeep：第一次写入生效，第二次静默跳过
    db.put_keep(b"keep", b"first").unwrap();
    db.put_keep(b"keep", b"second").unwrap();
    assert_eq!(db.get(b"keep").unwrap(), b"first");

    assert_eq!(db.size(b"hello").unwrap(), 6);
    db.close().unwrap();
}

#[test]
fn math() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    assert_eq!(db.add_int(b"int", 1).unwrap(), 1);
    assert_eq!(db.add_int(b"int", 1).unwrap(), 2);
    assert_eq!(db.add_double(b"double", 2.5).unwrap(), 2.5);
    assert_eq!(db.add_double(b"double", 2.5).unwrap(), 5.0);

    // 对非数值记录递增必须报错，而不是返回哨兵值
    db.put(b"text", b"not a number").unwrap();
    assert_eq!(db.add_int(b"text", 1).unwrap_err().code, ErrorCode::Keep);
    assert_eq!(
        db.add_double(b"text", 1.0).unwrap_err().code,
        ErrorCode::Keep
    );

    db.close().unwrap();
}

#[test]
fn iteration_yields_exact_key_set() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    db.put(b"hello", b"world").unwrap();
    db.put(b"goodbye", b"world").unwrap();

    assert_key_set(db.iter_keys(), &["hello", "goodbye"]);
    db.close().unwrap();
}

#[test]
fn dropping_iterator_stops_producer() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);
    for i in 0..100 {
        db.put(format!("key-{}", i).as_bytes(), b"v").unwrap();
    }

    let mut iter = db.iter_keys();
    iter.next().unwrap().unwrap();
    drop(iter);

    // 生产者退出后句柄仍可正常使用
    db.put(b"after", b"drop").unwrap();
    assert_eq!(db.get(b"after").unwrap(), b"drop");
    db.close().unwrap();
}

#[test]
fn transactions() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    db.put(b"txn-1", b"set-outside-txn").unwrap();
    db.begin_txn().unwrap();
    db.put(b"txn-1", b"set-inside-txn").unwrap();
    db.abort_txn().unwrap();
    assert_eq!(db.get(b"txn-1").unwrap(), b"set-outside-txn");

    db.put(b"txn-2", b"set-outside-txn").unwrap();
    db.begin_txn().unwrap();
    db.put(b"txn-2", b"set-inside-txn").unwrap();
    db.commit_txn().unwrap();
    assert_eq!(db.get(b"txn-2").unwrap(), b"set-inside-txn");

    // 事务内新建的键在回滚后消失，删除的键在回滚后恢复
    db.begin_txn().unwrap();
    db.put(b"created", b"value").unwrap();
    db.remove(b"txn-2").unwrap();
    db.abort_txn().unwrap();
    assert_eq!(db.get(b"created").unwrap_err().code, ErrorCode::NoRec);
    assert_eq!(db.get(b"txn-2").unwrap(), b"set-inside-txn");

    db.close().unwrap();
}

#[test]
fn transactions_do_not_nest() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    assert_eq!(db.commit_txn().unwrap_err().code, ErrorCode::Invalid);
    assert_eq!(db.abort_txn().unwrap_err().code, ErrorCode::Invalid);

    db.begin_txn().unwrap();
    assert_eq!(db.begin_txn().unwrap_err().code, ErrorCode::Invalid);
    db.abort_txn().unwrap();

    db.close().unwrap();
}

#[test]
fn reader_mode_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("casket.tch");

    let mut db = HashHandle::open(&path, OWRITER | OCREAT).unwrap();
    db.put(b"hello", b"world").unwrap();
    db.close().unwrap();

    let mut db = HashHandle::open(&path, OREADER).unwrap();
    assert_eq!(db.get(b"hello").unwrap(), b"world");
    assert_eq!(db.put(b"hello", b"!").unwrap_err().code, ErrorCode::NoPerm);
    assert_eq!(db.remove(b"hello").unwrap_err().code, ErrorCode::NoPerm);
    assert_eq!(db.begin_txn().unwrap_err().code, ErrorCode::NoPerm);
    db.close().unwrap();
}

#[test]
fn open_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.tch");

    // 缺少OCREAT时文件必须已存在
    let err = HashHandle::open(&missing, OWRITER).unwrap_err();
    assert_eq!(err.code, ErrorCode::NoFile);

    // 模式必须包含读或写
    let err = HashHandle::open(&missing, cabinet::OpenMode::empty()).unwrap_err();
    assert_eq!(err.code, ErrorCode::Invalid);

    // OCREAT只在写模式下有效
    let err = HashHandle::open(&missing, OREADER | OCREAT).unwrap_err();
    assert_eq!(err.code, ErrorCode::Invalid);
}

#[test]
fn missing_records() {
    let dir = TempDir::new().unwrap();
    let mut db = open_rw(&dir);

    assert_eq!(db.get(b"nope").unwrap_err().code, ErrorCode::NoRec);
    assert_eq!(db.size(b"nope").unwrap_err().code, ErrorCode::NoRec);
    assert_eq!(db.remove(b"nope").unwrap_err().code, ErrorCode::NoRec);

    db.close().unwrap();
}

#[test]
fn tuned_open_with_logger() {
    let dir = TempDir::new().unwrap();

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = slog::Logger::root(drain, o!());

    let tuning = HashTuning {
        xmsiz: 8 * 1024 * 1024,
        logger: Some(logger),
        ..HashTuning::default()
    };
    let mut db =
        HashHandle::open_tuned(dir.path().join("tuned.tch"), OWRITER | OCREAT, tuning).unwrap();
    db.put(b"hello", b"world").unwrap();
    assert_eq!(db.get(b"hello").unwrap(), b"world");
    db.close().unwrap();
}
