//! 打开模式与调优选项的位标志类型。

use std::ops::{BitOr, BitOrAssign};

/// 数据库打开模式，可用`|`组合多个标志。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenMode(u32);

/// 只读模式
pub const OREADER: OpenMode = OpenMode(1 << 0);
/// 读写模式
pub const OWRITER: OpenMode = OpenMode(1 << 1);
/// 数据库不存在时创建（需配合OWRITER）
pub const OCREAT: OpenMode = OpenMode(1 << 2);
/// 打开时清空已有数据（需配合OWRITER）
pub const OTRUNC: OpenMode = OpenMode(1 << 3);
/// 不加文件锁（由引擎自行决定，当前实现中仅作记录）
pub const ONOLCK: OpenMode = OpenMode(1 << 4);
/// 非阻塞加锁（由引擎自行决定，当前实现中仅作记录）
pub const OLCKNB: OpenMode = OpenMode(1 << 5);

impl OpenMode {
    /// 返回空模式
    pub fn empty() -> OpenMode {
        OpenMode(0)
    }

    /// 判断是否包含给定标志的全部位
    pub fn contains(self, other: OpenMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// 返回原始位值
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for OpenMode {
    type Output = OpenMode;

    fn bitor(self, rhs: OpenMode) -> OpenMode {
        OpenMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for OpenMode {
    fn bitor_assign(&mut self, rhs: OpenMode) {
        self.0 |= rhs.0;
    }
}

/// 状态标志：句柄已打开（只读信息位）
pub const FOPEN: u32 = 1 << 0;
/// 状态标志：发生致命错误（只读信息位，本层不会设置）
pub const FFATAL: u32 = 1 << 1;

/// 哈希变体的调优选项标志，可用`|`组合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TuneOpts(u8);

/// 使用大文件支持
pub const TLARGE: TuneOpts = TuneOpts(1 << 0);
/// 记录压缩：deflate
pub const TDEFLATE: TuneOpts = TuneOpts(1 << 1);
/// 记录压缩：bzip
pub const TBZIP: TuneOpts = TuneOpts(1 << 2);
/// 记录压缩：tcbs
pub const TTCBS: TuneOpts = TuneOpts(1 << 3);
/// 使用外部编解码器
pub const TEXCODEC: TuneOpts = TuneOpts(1 << 4);

impl TuneOpts {
    /// 判断是否包含给定标志的全部位
    pub fn contains(self, other: TuneOpts) -> bool {
        self.0 & other.0 == other.0
    }

    /// 判断是否开启了任意一种压缩
    pub fn compression(self) -> bool {
        self.0 & (TDEFLATE.0 | TBZIP.0 | TTCBS.0) != 0
    }

    /// 返回原始位值
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for TuneOpts {
    type Output = TuneOpts;

    fn bitor(self, rhs: TuneOpts) -> TuneOpts {
        TuneOpts(self.0 | rhs.0)
    }
}

impl BitOrAssign for TuneOpts {
    fn bitor_assign(&mut self, rhs: TuneOpts) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_mode_combines() {
        let mode = OWRITER | OCREAT | OTRUNC;
        assert!(mode.contains(OWRITER));
        assert!(mode.contains(OCREAT | OTRUNC));
        assert!(!mode.contains(OREADER));
        assert_eq!(mode.bits(), 0b1110);
    }

    #[test]
    fn tune_opts_compression() {
        assert!((TLARGE | TDEFLATE).compression());
        assert!(!TLARGE.compression());
        assert!(!TuneOpts::default().compression());
    }
}
