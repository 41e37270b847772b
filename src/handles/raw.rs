//! 各变体共用的底层句柄实现。

use sled::IVec;
use slog::Logger;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CabinetError, ErrorCode, Result};
use crate::iter::KeyIter;
use crate::modes::{OpenMode, OCREAT, OREADER, OTRUNC, OWRITER};

/// 事务回退日志：记录事务内每个键首次被修改前的值。
/// `None`表示事务开始时该键不存在。
type UndoLog = HashMap<Vec<u8>, Option<IVec>>;

/// 持有一个sled数据库的底层句柄，实现各变体共用的操作。
///
/// 句柄是单一所有者的：修改操作要求`&mut self`，本层不做任何
/// 内部同步，也不做重试——每个失败在调用边界立即转换为
/// `CabinetError`并同步返回一次。
#[derive(Debug)]
pub(crate) struct RawDb {
    db: sled::Db,
    writable: bool,
    undo: Option<UndoLog>,
    log: Logger,
}

impl RawDb {
    /// 按给定模式打开数据库。
    ///
    /// 模式必须包含OREADER或OWRITER；OCREAT/OTRUNC只在写模式下有效；
    /// 缺少OCREAT时路径必须已存在。
    pub(crate) fn open(path: &Path, mode: OpenMode, config: sled::Config, log: Logger) -> Result<RawDb> {
        if !mode.contains(OREADER) && !mode.contains(OWRITER) {
            return Err(CabinetError::with_msg(
                ErrorCode::Invalid,
                "open mode must include OREADER or OWRITER",
            ));
        }
        if (mode.contains(OCREAT) || mode.contains(OTRUNC)) && !mode.contains(OWRITER) {
            return Err(CabinetError::with_msg(
                ErrorCode::Invalid,
                "OCREAT and OTRUNC require OWRITER",
            ));
        }
        if !mode.contains(OCREAT) && !path.exists() {
            return Err(CabinetError::with_msg(
                ErrorCode::NoFile,
                format!("no such database: {}", path.display()),
            ));
        }

        let db = config
            .path(path)
            .open()
            .map_err(|e| CabinetError::engine(ErrorCode::Open, e))?;

        if mode.contains(OTRUNC) {
            db.clear()
                .map_err(|e| CabinetError::engine(ErrorCode::Trunc, e))?;
        }

        info!(log, "database opened";
              "path" => %path.display(), "mode" => mode.bits());

        Ok(RawDb {
            db,
            writable: mode.contains(OWRITER),
            undo: None,
            log,
        })
    }

    /// 打开一个匿名的内存数据库（关闭后数据即丢弃）。
    pub(crate) fn open_temporary(log: Logger) -> Result<RawDb> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| CabinetError::engine(ErrorCode::Open, e))?;

        info!(log, "temporary database opened");

        Ok(RawDb {
            db,
            writable: true,
            undo: None,
            log,
        })
    }

    /// 返回底层sled树，供变体实现区间查询等专有操作。
    pub(crate) fn tree(&self) -> &sled::Db {
        &self.db
    }

    fn check_writable(&self) -> Result<()> {
        if self.writable {
            Ok(())
        } else {
            Err(CabinetError::new(ErrorCode::NoPerm))
        }
    }

    /// 若存在活跃事务，记录键首次被修改前的值。
    fn record_undo(&mut self, key: &[u8]) -> Result<()> {
        let undo = match self.undo.as_mut() {
            Some(undo) => undo,
            None => return Ok(()),
        };
        if !undo.contains_key(key) {
            let prior = self
                .db
                .get(key)
                .map_err(|e| CabinetError::engine(ErrorCode::Read, e))?;
            undo.insert(key.to_vec(), prior);
        }
        Ok(())
    }

    /// 无条件写入键值对
    pub(crate) fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.record_undo(key)?;
        self.db
            .insert(key, value)
            .map_err(|e| CabinetError::engine(ErrorCode::Write, e))?;
        Ok(())
    }

    /// 仅在键不存在时写入；键已存在则静默跳过，不报错
    pub(crate) fn put_keep(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.record_undo(key)?;
        // 已存在的键由compare_and_swap识别并吞掉，其余失败照常上报
        self.db
            .compare_and_swap(key, None as Option<&[u8]>, Some(value))
            .map_err(|e| CabinetError::engine(ErrorCode::Write, e))?
            .ok();
        Ok(())
    }

    /// 把value追加到键当前存储的字节之后，键不存在时等同于put
    pub(crate) fn put_cat(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.record_undo(key)?;
        let mut stored = match self
            .db
            .get(key)
            .map_err(|e| CabinetError::engine(ErrorCode::Read, e))?
        {
            Some(v) => v.to_vec(),
            None => Vec::new(),
        };
        stored.extend_from_slice(value);
        self.db
            .insert(key, stored)
            .map_err(|e| CabinetError::engine(ErrorCode::Write, e))?;
        Ok(())
    }

    /// 把存储值视为本机字节序的32位整数并加上delta，返回新值。
    ///
    /// 键不存在时从0开始；已有记录不是4字节时报Keep错误，
    /// 哨兵值不会泄漏给调用方。
    pub(crate) fn add_int(&mut self, key: &[u8], delta: i32) -> Result<i32> {
        self.check_writable()?;
        self.record_undo(key)?;
        let base = match self
            .db
            .get(key)
            .map_err(|e| CabinetError::engine(ErrorCode::Read, e))?
        {
            None => 0,
            Some(ref v) if v.len() == 4 => {
                i32::from_ne_bytes([v[0], v[1], v[2], v[3]])
            }
            Some(_) => {
                return Err(CabinetError::with_msg(
                    ErrorCode::Keep,
                    "existing record is not an int",
                ));
            }
        };
        let new = base.wrapping_add(delta);
        self.db
            .insert(key, &new.to_ne_bytes()[..])
            .map_err(|e| CabinetError::engine(ErrorCode::Write, e))?;
        Ok(new)
    }

    /// 把存储值视为本机字节序的双精度浮点数并加上delta，返回新值。
    ///
    /// 键不存在时从0开始；已有记录不是8字节时报Keep错误。
    /// 返回值不会以NaN充当错误信号。
    pub(crate) fn add_double(&mut self, key: &[u8], delta: f64) -> Result<f64> {
        self.check_writable()?;
        self.record_undo(key)?;
        let base = match self
            .db
            .get(key)
            .map_err(|e| CabinetError::engine(ErrorCode::Read, e))?
        {
            None => 0.0,
            Some(ref v) if v.len() == 8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(v);
                f64::from_ne_bytes(buf)
            }
            Some(_) => {
                return Err(CabinetError::with_msg(
                    ErrorCode::Keep,
                    "existing record is not a double",
                ));
            }
        };
        let new = base + delta;
        self.db
            .insert(key, &new.to_ne_bytes()[..])
            .map_err(|e| CabinetError::engine(ErrorCode::Write, e))?;
        Ok(new)
    }

    /// 删除键值对；键不存在时报NoRec错误
    pub(crate) fn remove(&mut self, key: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.record_undo(key)?;
        self.db
            .remove(key)
            .map_err(|e| CabinetError::engine(ErrorCode::Write, e))?
            .ok_or_else(|| CabinetError::new(ErrorCode::NoRec))?;
        Ok(())
    }

    /// 读取键对应的值；键不存在时报NoRec错误
    pub(crate) fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.db
            .get(key)
            .map_err(|e| CabinetError::engine(ErrorCode::Read, e))?
            .map(|v| v.to_vec())
            .ok_or_else(|| CabinetError::new(ErrorCode::NoRec))
    }

    /// 返回键对应值的字节长度；键不存在时报NoRec错误
    pub(crate) fn size(&self, key: &[u8]) -> Result<usize> {
        self.db
            .get(key)
            .map_err(|e| CabinetError::engine(ErrorCode::Read, e))?
            .map(|v| v.len())
            .ok_or_else(|| CabinetError::new(ErrorCode::NoRec))
    }

    /// 强制将缓冲数据刷入磁盘
    pub(crate) fn sync(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| CabinetError::engine(ErrorCode::Sync, e))?;
        Ok(())
    }

    /// 开始一个事务括号。不支持嵌套事务。
    pub(crate) fn begin_txn(&mut self) -> Result<()> {
        self.check_writable()?;
        if self.undo.is_some() {
            return Err(CabinetError::with_msg(
                ErrorCode::Invalid,
                "transaction already active",
            ));
        }
        self.undo = Some(UndoLog::new());
        debug!(self.log, "transaction started");
        Ok(())
    }

    /// 提交当前事务括号内的全部修改
    pub(crate) fn commit_txn(&mut self) -> Result<()> {
        if self.undo.take().is_none() {
            return Err(CabinetError::with_msg(
                ErrorCode::Invalid,
                "no active transaction",
            ));
        }
        self.db
            .flush()
            .map_err(|e| CabinetError::engine(ErrorCode::Sync, e))?;
        debug!(self.log, "transaction committed");
        Ok(())
    }

    /// 放弃当前事务括号内的全部修改，恢复到begin_txn时的状态
    pub(crate) fn abort_txn(&mut self) -> Result<()> {
        let undo = self.undo.take().ok_or_else(|| {
            CabinetError::with_msg(ErrorCode::Invalid, "no active transaction")
        })?;
        for (key, prior) in undo {
            match prior {
                Some(value) => {
                    self.db
                        .insert(key, value)
                        .map_err(|e| CabinetError::engine(ErrorCode::Write, e))?;
                }
                None => {
                    self.db
                        .remove(key)
                        .map_err(|e| CabinetError::engine(ErrorCode::Write, e))?;
                }
            }
        }
        debug!(self.log, "transaction aborted");
        Ok(())
    }

    /// 启动一次键迭代，见[`KeyIter`]
    pub(crate) fn iter_keys<K, F>(&self, decode: F) -> KeyIter<K>
    where
        K: Send + 'static,
        F: Fn(&IVec) -> Option<K> + Send + 'static,
    {
        debug!(self.log, "key iteration started");
        KeyIter::spawn(self.db.iter().keys(), decode)
    }

    /// 关闭数据库。消耗句柄本身，关闭后无法再发起数据操作。
    pub(crate) fn close(self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| CabinetError::engine(ErrorCode::Close, e))?;
        info!(self.log, "database closed");
        Ok(())
    }
}
