// hook 核心错误码，0 表示成功
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Errno {
    Ok = 0,       // 成功
    Unknown = 1,  // 系统调用失败，errno 只记录日志
    Invalid = 2,  // 参数无效
    NotFound = 3, // 符号未找到，或地址不在任何 PT_LOAD 段内
    Format = 4,   // ELF / APS2 格式错误
    ElfInit = 5,  // 视图尚未初始化
}

impl Errno {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl From<Errno> for i32 {
    fn from(value: Errno) -> Self {
        value as i32
    }
}
