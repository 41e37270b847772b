use slog::Logger;
use std::path::Path;

use super::discard_logger;
use super::raw::RawDb;
use crate::error::{CabinetError, ErrorCode, Result};
use crate::iter::KeyIter;
use crate::modes::OpenMode;

/// 定长数组变体的数据库句柄。
///
/// 键是从1开始的64位整数，存储为大端字节序，
/// 因此迭代顺序即键的数值顺序。值是任意字节序列。
#[derive(Debug)]
pub struct FixedHandle {
    raw: RawDb,
}

/// 把整数键编码为引擎键；键必须为正数
fn encode_key(key: i64) -> Result<[u8; 8]> {
    if key < 1 {
        return Err(CabinetError::with_msg(
            ErrorCode::Invalid,
            format!("fixed keys must be positive, got {}", key),
        ));
    }
    Ok((key as u64).to_be_bytes())
}

impl FixedHandle {
    /// 按给定模式打开数据库
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<FixedHandle> {
        FixedHandle::open_logged(path, mode, discard_logger())
    }

    /// 按给定模式打开数据库，使用调用方提供的logger
    pub fn open_logged<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        log: Logger,
    ) -> Result<FixedHandle> {
        let raw = RawDb::open(path.as_ref(), mode, sled::Config::new(), log)?;
        Ok(FixedHandle { raw })
    }

    /// 打开一个匿名内存数据库，供抽象句柄使用
    pub(crate) fn open_temporary(log: Logger) -> Result<FixedHandle> {
        Ok(FixedHandle {
            raw: RawDb::open_temporary(log)?,
        })
    }

    /// 无条件写入键值对
    pub fn put(&mut self, key: i64, value: &[u8]) -> Result<()> {
        self.raw.put(&encode_key(key)?, value)
    }

    /// 仅在键不存在时写入；键已存在则不做任何事，也不报错
    pub fn put_keep(&mut self, key: i64, value: &[u8]) -> Result<()> {
        self.raw.put_keep(&encode_key(key)?, value)
    }

    /// 把value追加到键当前存储的字节之后，键不存在时等同于put
    pub fn put_cat(&mut self, key: i64, value: &[u8]) -> Result<()> {
        self.raw.put_cat(&encode_key(key)?, value)
    }

    /// 把存储值视为本机字节序32位整数并加上delta，返回新值
    pub fn add_int(&mut self, key: i64, delta: i32) -> Result<i32> {
        self.raw.add_int(&encode_key(key)?, delta)
    }

    /// 把存储值视为本机字节序双精度浮点数并加上delta，返回新值
    pub fn add_double(&mut self, key: i64, delta: f64) -> Result<f64> {
        self.raw.add_double(&encode_key(key)?, delta)
    }

    /// 删除键值对；键不存在时报NoRec错误
    pub fn remove(&mut self, key: i64) -> Result<()> {
        self.raw.remove(&encode_key(key)?)
    }

    /// 读取键对应的值；键不存在时报NoRec错误
    pub fn get(&self, key: i64) -> Result<Vec<u8>> {
        self.raw.get(&encode_key(key)?)
    }

    /// 返回键对应值的字节长度；键不存在时报NoRec错误
    pub fn size(&self, key: i64) -> Result<usize> {
        self.raw.size(&encode_key(key)?)
    }

    /// 强制将缓冲数据刷入磁盘
    pub fn sync(&self) -> Result<()> {
        self.raw.sync()
    }

    /// 开始一个事务括号。不支持嵌套事务
    pub fn begin_txn(&mut self) -> Result<()> {
        self.raw.begin_txn()
    }

    /// 提交当前事务括号内的全部修改
    pub fn commit_txn(&mut self) -> Result<()> {
        self.raw.commit_txn()
    }

    /// 放弃当前事务括号内的全部修改
    pub fn abort_txn(&mut self) -> Result<()> {
        self.raw.abort_txn()
    }

    /// 按键的数值顺序迭代数据库中的全部键。
    /// 同一句柄同一时刻只应有一个活跃迭代
    pub fn iter_keys(&self) -> KeyIter<i64> {
        self.raw.iter_keys(|raw| {
            if raw.len() == 8 {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                Some(u64::from_be_bytes(buf) as i64)
            } else {
                None
            }
        })
    }

    /// 以十进制文本形式迭代键，供抽象句柄使用
    pub(crate) fn iter_keys_text(&self) -> KeyIter<Vec<u8>> {
        self.raw.iter_keys(|raw| {
            if raw.len() == 8 {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                Some(u64::from_be_bytes(buf).to_string().into_bytes())
            } else {
                None
            }
        })
    }

    /// 关闭数据库并消耗句柄
    pub fn close(self) -> Result<()> {
        self.raw.close()
    }
}
