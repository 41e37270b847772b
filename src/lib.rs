#![deny(missing_docs)]
//! 一个基于sled的多变体键值存储库。
//!
//! 提供四种存储句柄：哈希（[`HashHandle`]）、B树（[`BtreeHandle`]）、
//! 定长数组（[`FixedHandle`]）以及可在打开时绑定任意变体的抽象句柄
//! （[`AnyHandle`]）。每种句柄暴露统一的操作集合：打开/关闭、
//! 读写删、数值递增、键迭代或区间查询、以及事务括号。

pub use error::{CabinetError, ErrorCode, Result};
pub use handles::{AnyHandle, BtreeHandle, FixedHandle, HashHandle, HashTuning};
pub use iter::KeyIter;
pub use modes::{
    OpenMode, TuneOpts, FFATAL, FOPEN, OCREAT, OLCKNB, ONOLCK, OREADER, OTRUNC, OWRITER, TBZIP,
    TDEFLATE, TEXCODEC, TLARGE, TTCBS,
};

#[macro_use]
extern crate slog;

mod error;
mod handles;
mod iter;
mod modes;
