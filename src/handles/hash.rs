use slog::Logger;
use std::path::Path;

use super::raw::RawDb;
use super::discard_logger;
use crate::error::Result;
use crate::iter::KeyIter;
use crate::modes::{OpenMode, TuneOpts};

/// 哈希变体的调优参数，在打开前一次性给定。
///
/// 字段为0（或默认值）表示沿用引擎默认。`xmsiz`映射为引擎的缓存
/// 容量（字节）；`opts`中的压缩标志映射为引擎的记录压缩。其余布局
/// 参数（`bnum`、`apow`、`fpow`、`rcnum`、`dfunit`）为接口兼容而
/// 保留，sled后端自行管理桶与空闲空间，不使用它们。
#[derive(Default)]
pub struct HashTuning {
    /// 桶数量
    pub bnum: i64,
    /// 记录对齐的2的幂
    pub apow: i8,
    /// 空闲块池大小的2的幂
    pub fpow: i8,
    /// 选项标志（大文件支持、压缩算法选择）
    pub opts: TuneOpts,
    /// 缓存记录条数
    pub rcnum: i32,
    /// 额外映射内存大小（字节）
    pub xmsiz: i64,
    /// 碎片整理步长
    pub dfunit: i32,
    /// 句柄使用的logger，缺省时日志被丢弃
    pub logger: Option<Logger>,
}

impl HashTuning {
    fn to_config(&self) -> sled::Config {
        let mut config = sled::Config::new();
        if self.xmsiz > 0 {
            config = config.cache_capacity(self.xmsiz as u64);
        }
        if self.opts.compression() {
            config = config.use_compression(true);
        }
        config
    }
}

/// 哈希表变体的数据库句柄。
///
/// 键与值都是任意字节序列；迭代顺序不做任何保证。
#[derive(Debug)]
pub struct HashHandle {
    raw: RawDb,
}

impl HashHandle {
    /// 按给定模式打开数据库，使用默认调优参数
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<HashHandle> {
        HashHandle::open_tuned(path, mode, HashTuning::default())
    }

    /// 按给定模式与调优参数打开数据库
    pub fn open_tuned<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        tuning: HashTuning,
    ) -> Result<HashHandle> {
        let log = tuning.logger.clone().unwrap_or_else(discard_logger);
        let raw = RawDb::open(path.as_ref(), mode, tuning.to_config(), log)?;
        Ok(HashHandle { raw })
    }

    /// 打开一个匿名内存数据库，供抽象句柄的"*"形式使用
    pub(crate) fn open_temporary(log: Logger) -> Result<HashHandle> {
        Ok(HashHandle {
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

    /// 缓冲写入：数据先进入引擎缓冲，由后台刷盘或下一次[`sync`](HashHandle::sync)落盘
    pub fn put_async(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.raw.put(key, value)
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

    /// 迭代数据库中的全部键。同一句柄同一时刻只应有一个活跃迭代
    pub fn iter_keys(&self) -> KeyIter<Vec<u8>> {
        self.raw.iter_keys(|key| Some(key.to_vec()))
    }

    /// 关闭数据库并消耗句柄
    pub fn close(self) -> Result<()> {
        self.raw.close()
    }
}
