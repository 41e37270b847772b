//! 该模块包含各个存储变体的句柄封装

use slog::Logger;

mod any;
mod btree;
mod fixed;
mod hash;
mod raw;

pub use any::AnyHandle;
pub use btree::BtreeHandle;
pub use fixed::FixedHandle;
pub use hash::{HashHandle, HashTuning};

/// 调用方未提供logger时使用的静默logger
pub(crate) fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}
