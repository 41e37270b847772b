use slog::Logger;
use std::path::Path;

use super::btree::BtreeHandle;
use super::discard_logger;
use super::fixed::FixedHandle;
use super::hash::{HashHandle, HashTuning};
use crate::error::{CabinetError, ErrorCode, Result};
use crate::iter::KeyIter;
use crate::modes::{OpenMode, OCREAT, OLCKNB, ONOLCK, OREADER, OTRUNC, OWRITER};

#[derive(Debug)]
enum Inner {
    Hash(HashHandle),
    Btree(BtreeHandle),
    Fixed(FixedHandle),
}

/// 抽象句柄：在打开时根据名字绑定到任意一种具体变体。
///
/// 名字约定：
///
/// - `"*"` —— 内存哈希数据库
/// - `"+"` —— 内存B树数据库
/// - 以`.tch`/`.tcb`/`.tcf`结尾的路径 —— 文件哈希/B树/定长数组数据库
///
/// 名字后可以用`#`附加参数，目前支持`mode=`，取值为字符组合：
/// `w`写、`r`读、`c`创建、`t`截断、`e`不加锁、`f`非阻塞锁；
/// 缺省为`wc`。键一律是字节序列；绑定到定长数组变体时，
/// 键须为十进制整数文本。
#[derive(Debug)]
pub struct AnyHandle {
    inner: Inner,
}

/// 解析`mode=`参数中的模式字符
fn parse_mode(spec: &str) -> Result<OpenMode> {
    let mut mode = OpenMode::empty();
    for ch in spec.chars() {
        mode |= match ch {
            'w' => OWRITER,
            'r' => OREADER,
            'c' => OCREAT,
            't' => OTRUNC,
            'e' => ONOLCK,
            'f' => OLCKNB,
            _ => {
                return Err(CabinetError::with_msg(
                    ErrorCode::Invalid,
                    format!("unknown mode character '{}'", ch),
                ));
            }
        };
    }
    Ok(mode)
}

/// 把定长数组变体的键从十进制文本解析为整数
fn fixed_key(key: &[u8]) -> Result<i64> {
    std::str::from_utf8(key)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            CabinetError::with_msg(
                ErrorCode::Invalid,
                "fixed database keys must be decimal integer text",
            )
        })
}

impl AnyHandle {
    /// 根据名字打开数据库
    pub fn open(name: &str) -> Result<AnyHandle> {
        AnyHandle::open_logged(name, discard_logger())
    }

    /// 根据名字打开数据库，使用调用方提供的logger
    pub fn open_logged(name: &str, log: Logger) -> Result<AnyHandle> {
        let mut parts = name.split('#');
        let base = parts.next().unwrap_or("");

        let mut mode = OWRITER | OCREAT;
        for param in parts {
            let mut kv = param.splitn(2, '=');
            match (kv.next(), kv.next()) {
                (Some("mode"), Some(spec)) => mode = parse_mode(spec)?,
                // 其余参数属于具体引擎的布局调优，这里不使用
                _ => {}
            }
        }

        let inner = match base {
            "*" => Inner::Hash(HashHandle::open_temporary(log)?),
            "+" => Inner::Btree(BtreeHandle::open_temporary(log)?),
            _ => {
                let path = Path::new(base);
                let ext = path.extension().and_then(|e| e.to_str());
                match ext {
                    Some("tch") => {
                        let tuning = HashTuning {
                            logger: Some(log),
                            ..HashTuning::default()
                        };
                        Inner::Hash(HashHandle::open_tuned(path, mode, tuning)?)
                    }
                    Some("tcb") => Inner::Btree(BtreeHandle::open_logged(path, mode, log)?),
                    Some("tcf") => Inner::Fixed(FixedHandle::open_logged(path, mode, log)?),
                    _ => {
                        return Err(CabinetError::with_msg(
                            ErrorCode::Invalid,
                            format!("unsupported database name: {}", name),
                        ));
                    }
                }
            }
        };

        Ok(AnyHandle { inner })
    }

    /// 无条件写入键值对
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        match &mut self.inner {
            Inner::Hash(db) => db.put(key, value),
            Inner::Btree(db) => db.put(key, value),
            Inner::Fixed(db) => db.put(fixed_key(key)?, value),
        }
    }

    /// 仅在键不存在时写入；键已存在则不做任何事，也不报错。
    ///
    /// 与其余变体一样，只有"键已存在"会被吞掉，其余失败照常上报。
    pub fn put_keep(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        match &mut self.inner {
            Inner::Hash(db) => db.put_keep(key, value),
            Inner::Btree(db) => db.put_keep(key, value),
            Inner::Fixed(db) => db.put_keep(fixed_key(key)?, value),
        }
    }

    /// 把value追加到键当前存储的字节之后，键不存在时等同于put
    pub fn put_cat(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        match &mut self.inner {
            Inner::Hash(db) => db.put_cat(key, value),
            Inner::Btree(db) => db.put_cat(key, value),
            Inner::Fixed(db) => db.put_cat(fixed_key(key)?, value),
        }
    }

    /// 把存储值视为本机字节序32位整数并加上delta，返回新值
    pub fn add_int(&mut self, key: &[u8], delta: i32) -> Result<i32> {
        match &mut self.inner {
            Inner::Hash(db) => db.add_int(key, delta),
            Inner::Btree(db) => db.add_int(key, delta),
            Inner::Fixed(db) => db.add_int(fixed_key(key)?, delta),
        }
    }

    /// 把存储值视为本机字节序双精度浮点数并加上delta，返回新值
    pub fn add_double(&mut self, key: &[u8], delta: f64) -> Result<f64> {
        match &mut self.inner {
            Inner::Hash(db) => db.add_double(key, delta),
            Inner::Btree(db) => db.add_double(key, delta),
            Inner::Fixed(db) => db.add_double(fixed_key(key)?, delta),
        }
    }

    /// 删除键值对；键不存在时报NoRec错误
    pub fn remove(&mut self, key: &[u8]) -> Result<()> {
        match &mut self.inner {
            Inner::Hash(db) => db.remove(key),
            Inner::Btree(db) => db.remove(key),
            Inner::Fixed(db) => db.remove(fixed_key(key)?),
        }
    }

    /// 读取键对应的值；键不存在时报NoRec错误
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        match &self.inner {
            Inner::Hash(db) => db.get(key),
            Inner::Btree(db) => db.get(key),
            Inner::Fixed(db) => db.get(fixed_key(key)?),
        }
    }

    /// 返回键对应值的字节长度；键不存在时报NoRec错误
    pub fn size(&self, key: &[u8]) -> Result<usize> {
        match &self.inner {
            Inner::Hash(db) => db.size(key),
            Inner::Btree(db) => db.size(key),
            Inner::Fixed(db) => db.size(fixed_key(key)?),
        }
    }

    /// 强制将缓冲数据刷入磁盘
    pub fn sync(&self) -> Result<()> {
        match &self.inner {
            Inner::Hash(db) => db.sync(),
            Inner::Btree(db) => db.sync(),
            Inner::Fixed(db) => db.sync(),
        }
    }

    /// 开始一个事务括号。不支持嵌套事务
    pub fn begin_txn(&mut self) -> Result<()> {
        match &mut self.inner {
            Inner::Hash(db) => db.begin_txn(),
            Inner::Btree(db) => db.begin_txn(),
            Inner::Fixed(db) => db.begin_txn(),
        }
    }

    /// 提交当前事务括号内的全部修改
    pub fn commit_txn(&mut self) -> Result<()> {
        match &mut self.inner {
            Inner::Hash(db) => db.commit_txn(),
            Inner::Btree(db) => db.commit_txn(),
            Inner::Fixed(db) => db.commit_txn(),
        }
    }

    /// 放弃当前事务括号内的全部修改
    pub fn abort_txn(&mut self) -> Result<()> {
        match &mut self.inner {
            Inner::Hash(db) => db.abort_txn(),
            Inner::Btree(db) => db.abort_txn(),
            Inner::Fixed(db) => db.abort_txn(),
        }
    }

    /// 迭代数据库中的全部键。绑定到定长数组变体时键以十进制文本产出。
    /// 同一句柄同一时刻只应有一个活跃迭代
    pub fn iter_keys(&self) -> KeyIter<Vec<u8>> {
        match &self.inner {
            Inner::Hash(db) => db.iter_keys(),
            Inner::Btree(db) => db.iter_keys_raw(),
            Inner::Fixed(db) => db.iter_keys_text(),
        }
    }

    /// 关闭数据库并消耗句柄
    pub fn close(self) -> Result<()> {
        match self.inner {
            Inner::Hash(db) => db.close(),
            Inner::Btree(db) => db.close(),
            Inner::Fixed(db) => db.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fixed_key, parse_mode};
    use crate::modes::{OCREAT, OREADER, OTRUNC, OWRITER};

    #[test]
    fn mode_spec_parses() {
        let mode = parse_mode("wct").unwrap();
        assert!(mode.contains(OWRITER | OCREAT | OTRUNC));
        assert!(!mode.contains(OREADER));
        assert!(parse_mode("x").is_err());
    }

    #[test]
    fn fixed_keys_parse_from_text() {
        assert_eq!(fixed_key(b"42").unwrap(), 42);
        assert_eq!(fixed_key(b" 7 ").unwrap(), 7);
        assert!(fixed_key(b"seven").is_err());
        assert!(fixed_key(&[0xff, 0xfe]).is_err());
    }
}
