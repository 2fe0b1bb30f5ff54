// 页面保护位修改与指令缓存维护

use crate::errno::Errno;
use crate::log;

// PT_LOAD 段的访问权限位
pub const PF_X: u32 = 0x1;
pub const PF_W: u32 = 0x2;
pub const PF_R: u32 = 0x4;

// p_flags 权限位转换成 mprotect 的 prot 位
fn pf_to_prot(flags: u32) -> i32 {
    let mut prot = libc::PROT_NONE;
    if flags & PF_R != 0 {
        prot |= libc::PROT_READ;
    }
    if flags & PF_W != 0 {
        prot |= libc::PROT_WRITE;
    }
    if flags & PF_X != 0 {
        prot |= libc::PROT_EXEC;
    }
    prot
}

fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

pub fn page_start(addr: usize) -> usize {
    addr & !(page_size() - 1)
}

pub fn page_end(addr: usize) -> usize {
    page_start(addr) + page_size()
}

// 修改 addr 所在单个页面的保护位，失败时 errno 只进日志
pub fn set_mem_access(addr: usize, flags: u32) -> Result<(), Errno> {
    let result = unsafe {
        libc::mprotect(
            page_start(addr) as *mut libc::c_void,
            page_size(),
            pf_to_prot(flags),
        )
    };
    if result != 0 {
        let err = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        log::error(format_args!("mprotect failed. errno: {err}"));
        return Err(Errno::Unknown);
    }
    Ok(())
}

// arm 上内核不保证 D-cache 写入对取指可见，改写 GOT 后按页刷新
#[cfg(target_arch = "arm")]
pub fn flush_instruction_cache(addr: usize) {
    const ARM_CACHEFLUSH: libc::c_long = 0xf0002;
    unsafe {
        libc::syscall(ARM_CACHEFLUSH, page_start(addr), page_end(addr), 0);
    }
}

// aarch64 / x86_64 上 mprotect 隐含的同步已经足够
#[cfg(not(target_arch = "arm"))]
pub fn flush_instruction_cache(addr: usize) {
    let _ = addr;
}
