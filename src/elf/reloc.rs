// 重定位条目的通用表示与固定步长遍历

use super::{ElfRel, ElfRela, ElfXword};
use std::mem;

// 与具体编码无关的单条重定位记录；REL 来源的 r_addend 恒为 0
#[derive(Debug)]
pub(super) struct RelocEntry {
    pub(super) r_offset: usize,
    pub(super) r_info: ElfXword,
    pub(super) r_addend: isize,
}

// r_info 的符号索引 / 重定位类型拆分：ELF64 为 32+32，ELF32 为 24+8
#[cfg(target_pointer_width = "64")]
#[inline]
pub(super) fn elf_r_sym(info: ElfXword) -> u32 {
    (info >> 32) as u32
}

#[cfg(target_pointer_width = "64")]
#[inline]
pub(super) fn elf_r_type(info: ElfXword) -> u32 {
    (info & 0xffff_ffff) as u32
}

#[cfg(target_pointer_width = "32")]
#[inline]
pub(super) fn elf_r_sym(info: ElfXword) -> u32 {
    info >> 8
}

#[cfg(target_pointer_width = "32")]
#[inline]
pub(super) fn elf_r_type(info: ElfXword) -> u32 {
    info & 0xff
}

// 测试辅助：按当前位宽的拆分规则合成 r_info
#[cfg(test)]
pub(super) fn make_r_info(sym: u32, rtype: u32) -> ElfXword {
    #[cfg(target_pointer_width = "64")]
    {
        ((sym as ElfXword) << 32) | rtype as ElfXword
    }
    #[cfg(target_pointer_width = "32")]
    {
        ((sym as ElfXword) << 8) | rtype as ElfXword
    }
}

// 以固定步长遍历映射中的 REL/RELA 数组
pub(super) struct PlainRelocIterator {
    cur: *const u8,
    end: *const u8,
    stride: usize,
    is_use_rela: bool,
}

impl PlainRelocIterator {
    pub(super) fn new(addr: usize, size: usize, is_use_rela: bool) -> Self {
        let cur = addr as *const u8;
        let stride = if is_use_rela {
            mem::size_of::<ElfRela>()
        } else {
            mem::size_of::<ElfRel>()
        };
        Self {
            cur,
            end: cur.wrapping_add(size),
            stride,
            is_use_rela,
        }
    }

    // 产出下一条记录，剩余字节不足一条时结束
    pub(super) unsafe fn next(&mut self) -> Option<RelocEntry> {
        if (self.end as usize) - (self.cur as usize) < self.stride {
            return None;
        }

        let entry = if self.is_use_rela {
            let rela = &*(self.cur as *const ElfRela);
            RelocEntry {
                r_offset: rela.r_offset as usize,
                r_info: rela.r_info,
                r_addend: rela.r_addend as isize,
            }
        } else {
            let rel = &*(self.cur as *const ElfRel);
            RelocEntry {
                r_offset: rel.r_offset as usize,
                r_info: rel.r_info,
                r_addend: 0,
            }
        };

        self.cur = self.cur.add(self.stride);
        Some(entry)
    }
}
