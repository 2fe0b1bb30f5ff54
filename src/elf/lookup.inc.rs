// 符号查找与 GOT slot 改写，通过 include! 嵌入 elf.rs

impl Elf {
    // 按名称查找符号索引，根据 hash 类型分派
    fn find_symidx_by_name(&self, symbol: &str) -> Result<u32, Errno> {
        if self.is_use_gnu_hash {
            self.gnu_hash_lookup(symbol)
        } else {
            self.elf_hash_lookup(symbol)
        }
    }

    // DT_HASH 的 bucket/chain 链表查找，链以 STN_UNDEF(0) 结束
    fn elf_hash_lookup(&self, symbol: &str) -> Result<u32, Errno> {
        if self.bucket_cnt == 0 {
            return Err(Errno::NotFound);
        }
        let hash = elf_hash(symbol.as_bytes());
        let mut i = unsafe { *self.bucket.add((hash % self.bucket_cnt) as usize) };
        while i != 0 {
            if let Some(name) = unsafe { self.sym_name(i) }
                && name == symbol
            {
                log::info(format_args!("found {} at symidx: {} (ELF_HASH)", symbol, i));
                return Ok(i);
            }
            i = unsafe { *self.chain.add(i as usize) };
        }
        Err(Errno::NotFound)
    }

    // GNU hash 查找：先查已定义符号，失败后回退到未定义符号区间
    fn gnu_hash_lookup(&self, symbol: &str) -> Result<u32, Errno> {
        if let Ok(symidx) = self.gnu_hash_lookup_def(symbol) {
            return Ok(symidx);
        }
        self.gnu_hash_lookup_undef(symbol)
    }

    // 已定义符号：bloom filter 快速排除 -> bucket 定位 -> chain 遍历
    fn gnu_hash_lookup_def(&self, symbol: &str) -> Result<u32, Errno> {
        if self.bucket_cnt == 0 {
            return Err(Errno::NotFound);
        }
        let hash = elf_gnu_hash(symbol.as_bytes());
        let elfclass_bits = mem::size_of::<ElfAddr>() * 8;
        let word = unsafe { *self.bloom.add((hash as usize / elfclass_bits) % self.bloom_sz as usize) };
        // 双位检测，任一位未置位则符号必然不在已定义区间
        let mask = (1usize << (hash as usize % elfclass_bits))
            | (1usize << ((hash >> self.bloom_shift) as usize % elfclass_bits));
        if (word & mask) != mask {
            return Err(Errno::NotFound);
        }

        let mut i = unsafe { *self.bucket.add((hash % self.bucket_cnt) as usize) };
        if i < self.symoffset {
            return Err(Errno::NotFound);
        }

        // chain 条目最低位为 1 表示链尾；低位相等时再比较符号名
        loop {
            let symname = unsafe { self.sym_name(i) };
            let symhash = unsafe { *self.chain.add((i - self.symoffset) as usize) };
            if let Some(name) = symname
                && (hash | 1) == (symhash | 1)
                && name == symbol
            {
                log::info(format_args!(
                    "found {} at symidx: {} (GNU_HASH DEF)",
                    symbol, i
                ));
                return Ok(i);
            }
            if (symhash & 1) != 0 {
                break;
            }
            i += 1;
        }

        Err(Errno::NotFound)
    }

    // GNU hash 不索引未定义符号，线性扫描 symoffset 之前的区间
    fn gnu_hash_lookup_undef(&self, symbol: &str) -> Result<u32, Errno> {
        let mut i = 0u32;
        while i < self.symoffset {
            if let Some(name) = unsafe { self.sym_name(i) }
                && name == symbol
            {
                log::info(format_args!(
                    "found {} at symidx: {} (GNU_HASH UNDEF)",
                    symbol, i
                ));
                return Ok(i);
            }
            i += 1;
        }
        Err(Errno::NotFound)
    }

    // 从 strtab 取符号名
    unsafe fn sym_name(&self, idx: u32) -> Option<&str> {
        if self.symtab.is_null() || self.strtab.is_null() {
            return None;
        }
        let sym = &*self.symtab.add(idx as usize);
        let name_ptr = self.strtab.add(sym.st_name as usize);
        let cstr = CStr::from_ptr(name_ptr);
        cstr.to_str().ok()
    }

    // 从包含 addr 的 PT_LOAD 段读取访问权限位
    fn get_mem_access(&self, addr: usize) -> Result<u32, Errno> {
        let phdrs = unsafe { slice::from_raw_parts(self.phdr, (*self.ehdr).e_phnum as usize) };
        for phdr in phdrs {
            if phdr.p_type != PT_LOAD {
                continue;
            }
            let seg_start = self.bias_addr + phdr.p_vaddr as usize;
            let seg_end = seg_start.saturating_add(phdr.p_memsz as usize);
            let seg_page_start = util::page_start(seg_start);
            let seg_page_end = util::page_end(seg_end);
            if addr >= seg_page_start && addr < seg_page_end {
                return Ok(phdr.p_flags);
            }
        }
        Err(Errno::NotFound)
    }

    // 匹配重定位条目的符号索引与类型，命中则改写对应 GOT slot
    unsafe fn find_and_replace(
        &self,
        section: &str,
        symbol: &str,
        new_func: *mut libc::c_void,
        old_func: *mut *mut libc::c_void,
        symidx: u32,
        entry: &RelocEntry,
    ) -> Result<bool, Errno> {
        if elf_r_sym(entry.r_info) != symidx {
            return Ok(false);
        }
        let r_type = elf_r_type(entry.r_info);
        if r_type != R_GENERIC_JUMP_SLOT && r_type != R_GENERIC_GLOB_DAT && r_type != R_GENERIC_ABS
        {
            return Ok(false);
        }

        log::info(format_args!(
            "found {} at {} offset: {:#x}",
            symbol, section, entry.r_offset
        ));

        let addr = self.bias_addr + entry.r_offset;
        self.replace_function(symbol, addr, new_func, old_func)?;
        Ok(true)
    }

    // 改写 GOT slot。写入前放开页面写权限并去掉执行权限；写入后不恢复
    unsafe fn replace_function(
        &self,
        symbol: &str,
        addr: usize,
        new_func: *mut libc::c_void,
        old_func: *mut *mut libc::c_void,
    ) -> Result<(), Errno> {
        let slot = addr as *mut *mut libc::c_void;

        let old_addr = ptr::read(slot);
        if old_addr == new_func {
            // slot 已指向新函数，只回报当前值
            if !old_func.is_null() {
                *old_func = old_addr;
            }
            return Ok(());
        }

        let mut prots = match self.get_mem_access(addr) {
            Ok(prots) => prots,
            Err(err) => {
                log::error(format_args!("get mem access fails. ret: {}", err.as_i32()));
                return Err(err);
            }
        };
        prots |= util::PF_W;
        prots &= !util::PF_X;
        util::set_mem_access(addr, prots)?;

        if !old_func.is_null() {
            *old_func = old_addr;
        }
        ptr::write(slot, new_func);

        util::flush_instruction_cache(addr);

        log::info(format_args!(
            "PLT_HK_OK {:#x}: {:p} -> {:p} {} {}",
            addr, old_addr, new_func, symbol, self.pathname
        ));
        Ok(())
    }
}
