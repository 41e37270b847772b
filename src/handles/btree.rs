use sled::IVec;
use slog::Logger;
use std::ops::Bound;
use std::path::Path;

use super::discard_logger;
use super::raw::RawDb;
use crate::error::{CabinetError, ErrorCode, Result};
use crate::iter::KeyIter;
use crate::modes::OpenMode;

/// B树变体的数据库句柄。
///
/// 键按字节序排序存储；不提供键迭代器，
/// 取而代之的是[`range`](BtreeHandle::range)区间查询。
#[derive(Debug)]
pub struct BtreeHandle {
    raw: RawDb,
}

impl BtreeHandle {
    /// 按给定模式打开数据库
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<BtreeHandle> {
        BtreeHandle::open_logged(path, mode, discard_logger())
    }

    /// 按给定模式打开数据库，使用调用方提供的logger
    pub fn open_logged<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        log: Logger,
    ) -> Result<BtreeHandle> {
        let raw = RawDb::open(path.as_ref(), mode, sled::Config::new(), log)?;
        Ok(BtreeHandle { raw })
    }

    /// 打开一个匿名内存数据库，供抽象句柄的"+"形式使用
    pub(crate) fn open_temporary(log: Logger) -> Result<BtreeHandle> {
        Ok(BtreeHandle {
            raw: RawDb::open_temporary(log)?,
        })
    }

    /// 无条件写入键值对
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.raw.put(key, value)
    }

    /// 仅在键不存在时写入；键已存在则不做任何事，也不报错
    pub fn put_keep(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.raw.put_keep(key, value)
    }

    /// 把value追加到键当前存储的字节之后，键不存在时等同于put
    pub fn put_cat(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.raw.put_cat(key, value)
    }

    /// 把存储值视为本机字节序32位整数并加上delta，返回新值
    pub fn add_int(&mut self, key: &[u8], delta: i32) -> Result<i32> {
        self.raw.add_int(key, delta)
    }

    /// 把存储值视为本机字节序双精度浮点数并加上delta，返回新值
    pub fn add_double(&mut self, key: &[u8], delta: f64) -> Result<f64> {
        self.raw.add_double(key, delta)
    }

    /// 删除键值对；键不存在时报NoRec错误
    pub fn remove(&mut self, key: &[u8]) -> Result<()> {
        self.raw.remove(key)
    }

    /// 读取键对应的值；键不存在时报NoRec错误
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.raw.get(key)
    }

    /// 返回键对应值的字节长度；键不存在时报NoRec错误
    pub fn size(&self, key: &[u8]) -> Result<usize> {
        self.raw.size(key)
    }

    /// 按字节序返回区间内的键。
    ///
    /// `None`边界表示该侧无界；两侧的包含性各自独立；
    /// `max`为负表示不限制结果数量。
    pub fn range(
        &self,
        start: Option<&[u8]>,
        start_inclusive: bool,
        end: Option<&[u8]>,
        end_inclusive: bool,
        max: i64,
    ) -> Result<Vec<Vec<u8>>> {
        let lower = match start {
            None => Bound::Unbounded,
            Some(key) if start_inclusive => Bound::Included(IVec::from(key)),
            Some(key) => Bound::Excluded(IVec::from(key)),
        };
        let upper = match end {
            None => Bound::Unbounded,
            Some(key) if end_inclusive => Bound::Included(IVec::from(key)),
            Some(key) => Bound::Excluded(IVec::from(key)),
        };

        let mut keys = Vec::new();
        for item in self.raw.tree().range((lower, upper)).keys() {
            if max >= 0 && keys.len() as i64 >= max {
                break;
            }
            let key = item.map_err(|e| CabinetError::engine(ErrorCode::Read, e))?;
            keys.push(key.to_vec());
        }
        Ok(keys)
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

    /// 按键序迭代全部键，供抽象句柄使用
    pub(crate) fn iter_keys_raw(&self) -> KeyIter<Vec<u8>> {
        self.raw.iter_keys(|key| Some(key.to_vec()))
    }

    /// 关闭数据库并消耗句柄
    pub fn close(self) -> Result<()> {
        self.raw.close()
    }
}
