//! 流式键迭代器。
//!
//! 底层引擎的游标是"初始化后逐个取下一个键"的顺序协议，本模块把它
//! 桥接为一个并发序列：后台生产者线程逐个取键，通过零容量的交会
//! 通道发布（生产者会阻塞到消费者取走为止，不做内部缓冲）；取键
//! 失败时在并行的错误通道上发布一次错误后结束。两个通道关闭即表示
//! 序列结束。

use crossbeam_channel::{bounded, Receiver};
use std::thread;

use crate::error::{CabinetError, ErrorCode, Result};

/// 数据库键的惰性序列。
///
/// 同一句柄同一时刻只应存在一个活跃的迭代；并发迭代不会损坏数据，
/// 但键的交错顺序由调用方自行负责。迭代不可重新开始；提前丢弃
/// `KeyIter`会断开通道，后台线程随之退出，不会泄漏。
pub struct KeyIter<K> {
    keys: Receiver<K>,
    errors: Receiver<CabinetError>,
    done: bool,
}

impl<K: Send + 'static> KeyIter<K> {
    /// 启动生产者线程，桥接给定的引擎游标。
    ///
    /// `decode`将原始键字节转换为目标键类型，返回`None`的键会被跳过。
    pub(crate) fn spawn<I, F>(cursor: I, decode: F) -> KeyIter<K>
    where
        I: Iterator<Item = sled::Result<sled::IVec>> + Send + 'static,
        F: Fn(&sled::IVec) -> Option<K> + Send + 'static,
    {
        let (key_tx, key_rx) = bounded(0);
        let (err_tx, err_rx) = bounded(1);

        thread::spawn(move || {
            for item in cursor {
                match item {
                    Ok(raw) => {
                        let key = match decode(&raw) {
                            Some(key) => key,
                            None => continue,
                        };
                        // 消费者已丢弃迭代器
                        if key_tx.send(key).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = err_tx.send(CabinetError::engine(ErrorCode::Read, e));
                        return;
                    }
                }
            }
        });

        KeyIter {
            keys: key_rx,
            errors: err_rx,
            done: false,
        }
    }
}

impl<K> Iterator for KeyIter<K> {
    type Item = Result<K>;

    fn next(&mut self) -> Option<Result<K>> {
        if self.done {
            return None;
        }
        match self.keys.recv() {
            Ok(key) => Some(Ok(key)),
            Err(_) => {
                // 键通道已关闭；错误通道中至多有一个待取的错误
                self.done = true;
                match self.errors.try_recv() {
                    Ok(e) => Some(Err(e)),
                    Err(_) => None,
                }
            }
        }
    }
}
