#![allow(dead_code)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]

#[cfg(not(any(target_os = "android", target_os = "linux")))]
compile_error!("plt_hook supports Linux and Android only");

#[cfg(not(any(target_arch = "arm", target_arch = "aarch64", target_arch = "x86_64")))]
compile_error!("plt_hook supports arm and aarch64 (x86_64 only for host development)");

// ELF 解析核心：动态段、符号表、重定位表与 GOT slot 改写
mod elf;
// 错误码定义
mod errno;
// 日志输出：Android 走 logcat，其余平台走 stderr
mod log;
// 页面保护位修改与指令缓存维护
mod memory;

pub use elf::{Elf, check_elf_header};
pub use errno::Errno;
pub use log::set_debug_enabled;
