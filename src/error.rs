use failure::Fail;
use std::fmt;
use std::io;

/// 引擎错误码，与底层存储引擎的故障分类一一对应。
///
/// 数值与经典cabinet式引擎的错误码保持一致，便于调用方按码分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// 成功
    Success = 0,
    /// 线程错误
    Thread = 1,
    /// 无效操作或参数
    Invalid = 2,
    /// 文件不存在
    NoFile = 3,
    /// 没有权限
    NoPerm = 4,
    /// 元数据损坏
    Meta = 5,
    /// 记录头损坏
    RecordHeader = 6,
    /// 打开失败
    Open = 7,
    /// 关闭失败
    Close = 8,
    /// 截断失败
    Trunc = 9,
    /// 刷盘失败
    Sync = 10,
    /// stat失败
    Stat = 11,
    /// seek失败
    Seek = 12,
    /// 读取失败
    Read = 13,
    /// 写入失败
    Write = 14,
    /// mmap失败
    Mmap = 15,
    /// 加锁失败
    Lock = 16,
    /// unlink失败
    Unlink = 17,
    /// 重命名失败
    Rename = 18,
    /// mkdir失败
    Mkdir = 19,
    /// rmdir失败
    Rmdir = 20,
    /// 键已存在（仅用于抑制put_keep的错误）
    Keep = 21,
    /// 记录不存在
    NoRec = 22,
    /// 其他错误
    Misc = 9999,
}

impl ErrorCode {
    /// 返回错误码的规范描述
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::Thread => "threading error",
            ErrorCode::Invalid => "invalid operation",
            ErrorCode::NoFile => "file not found",
            ErrorCode::NoPerm => "no permission",
            ErrorCode::Meta => "invalid meta data",
            ErrorCode::RecordHeader => "invalid record header",
            ErrorCode::Open => "open error",
            ErrorCode::Close => "close error",
            ErrorCode::Trunc => "trunc error",
            ErrorCode::Sync => "sync error",
            ErrorCode::Stat => "stat error",
            ErrorCode::Seek => "seek error",
            ErrorCode::Read => "read error",
            ErrorCode::Write => "write error",
            ErrorCode::Mmap => "mmap error",
            ErrorCode::Lock => "lock error",
            ErrorCode::Unlink => "unlink error",
            ErrorCode::Rename => "rename error",
            ErrorCode::Mkdir => "mkdir error",
            ErrorCode::Rmdir => "rmdir error",
            ErrorCode::Keep => "existing record",
            ErrorCode::NoRec => "no record found",
            ErrorCode::Misc => "miscellaneous error",
        }
    }

    /// 返回错误码的数值
    pub fn value(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// cabinet错误类型，携带错误码与可读信息。
#[derive(Debug, Fail)]
#[fail(display = "cabinet error ({:?}): {}", code, msg)]
pub struct CabinetError {
    /// 错误码
    pub code: ErrorCode,
    /// 可读信息
    pub msg: String,
}

impl CabinetError {
    /// 根据错误码生成错误，信息使用规范描述
    pub fn new(code: ErrorCode) -> CabinetError {
        CabinetError {
            code,
            msg: code.message().to_string(),
        }
    }

    /// 根据错误码与自定义信息生成错误
    pub fn with_msg(code: ErrorCode, msg: impl Into<String>) -> CabinetError {
        CabinetError {
            code,
            msg: msg.into(),
        }
    }

    /// 将引擎错误转换为cabinet错误。
    ///
    /// 能够归类的失败（文件不存在、权限、数据损坏）使用对应错误码，
    /// 其余使用调用方给定的默认码。
    pub(crate) fn engine(default: ErrorCode, err: sled::Error) -> CabinetError {
        let code = match &err {
            sled::Error::Io(e) => match e.kind() {
                io::ErrorKind::NotFound => ErrorCode::NoFile,
                io::ErrorKind::PermissionDenied => ErrorCode::NoPerm,
                _ => default,
            },
            sled::Error::Corruption { .. } => ErrorCode::Meta,
            sled::Error::CollectionNotFound(_) => ErrorCode::NoFile,
            _ => default,
        };
        CabinetError {
            code,
            msg: err.to_string(),
        }
    }
}

/// cabinet中的Result类型
pub type Result<T> = std::result::Result<T, CabinetError>;
