// ELF header 校验与视图初始化，通过 include! 嵌入 elf.rs

// 校验内存中的 ELF header：magic、class、字节序、版本、类型、架构
pub unsafe fn check_elf_header(base_addr: usize) -> Result<(), Errno> {
    let ehdr = &*(base_addr as *const ElfEhdr);
    if ehdr.e_ident[..SELFMAG] != ELFMAG {
        return Err(Errno::Format);
    }

    if ehdr.e_ident[EI_CLASS] != EXPECTED_CLASS {
        return Err(Errno::Format);
    }

    if ehdr.e_ident[EI_DATA] != ELFDATA2LSB {
        return Err(Errno::Format);
    }
    if ehdr.e_ident[EI_VERSION] != EV_CURRENT {
        return Err(Errno::Format);
    }
    if ehdr.e_type != ET_EXEC && ehdr.e_type != ET_DYN {
        return Err(Errno::Format);
    }
    if ehdr.e_machine != EXPECTED_MACHINE {
        return Err(Errno::Format);
    }
    if ehdr.e_version != EV_CURRENT as ElfWord {
        return Err(Errno::Format);
    }

    Ok(())
}

impl Elf {
    // 全零视图，等待 init 填充
    pub const fn new() -> Self {
        Self {
            pathname: String::new(),
            base_addr: 0,
            bias_addr: 0,
            ehdr: ptr::null(),
            phdr: ptr::null(),
            dyn_section: ptr::null(),
            dyn_sz: 0,
            strtab: ptr::null(),
            symtab: ptr::null(),
            relplt: 0,
            relplt_sz: 0,
            reldyn: 0,
            reldyn_sz: 0,
            relandroid: 0,
            relandroid_sz: 0,
            bucket: ptr::null(),
            bucket_cnt: 0,
            chain: ptr::null(),
            chain_cnt: 0,
            bloom: ptr::null(),
            bloom_sz: 0,
            bloom_shift: 0,
            symoffset: 0,
            is_use_gnu_hash: false,
            is_use_rela: false,
        }
    }

    // 从内存映像解析 ELF，提取动态段中的符号表、重定位表、hash 表。
    // 已初始化的视图重复 init 直接返回成功；任何解析失败都会清空视图。
    pub unsafe fn init(&mut self, base_addr: usize, pathname: &str) -> Result<(), Errno> {
        if self.is_inited() {
            return Ok(());
        }
        if pathname.is_empty() || base_addr == 0 {
            return Err(Errno::Invalid);
        }

        if let Err(err) = self.parse(base_addr, pathname) {
            log::error(format_args!("elf init failed. {}", pathname));
            self.reset();
            return Err(err);
        }

        if log::is_debug_enabled() {
            self.dump();
        }

        log::info(format_args!(
            "init OK: {} ({} {} PLT:{} DYN:{} ANDROID:{})",
            self.pathname,
            if self.is_use_rela { "RELA" } else { "REL" },
            if self.is_use_gnu_hash {
                "GNU_HASH"
            } else {
                "ELF_HASH"
            },
            self.relplt_sz,
            self.reldyn_sz,
            self.relandroid_sz
        ));

        Ok(())
    }

    // 清空视图，恢复未初始化状态
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn is_inited(&self) -> bool {
        !self.pathname.is_empty()
    }

    unsafe fn parse(&mut self, base_addr: usize, pathname: &str) -> Result<(), Errno> {
        check_elf_header(base_addr)?;

        let ehdr = base_addr as *const ElfEhdr;
        let phdr = (base_addr + (*ehdr).e_phoff as usize) as *const ElfPhdr;
        let phdrs = slice::from_raw_parts(phdr, (*ehdr).e_phnum as usize);

        // 第一个 PT_LOAD 段的文件偏移必须为 0，否则映像信息不在内存中
        let lhdr = phdrs
            .iter()
            .find(|ph| ph.p_type == PT_LOAD)
            .ok_or(Errno::Format)?;
        if lhdr.p_offset != 0 {
            log::error(format_args!(
                "first load-segment offset NOT 0 (offset: {:#x}). {}",
                lhdr.p_offset, pathname
            ));
            return Err(Errno::Format);
        }
        if base_addr < lhdr.p_vaddr as usize {
            return Err(Errno::Format);
        }
        let bias_addr = base_addr - lhdr.p_vaddr as usize;

        let dhdr = phdrs
            .iter()
            .find(|ph| ph.p_type == PT_DYNAMIC)
            .ok_or(Errno::Format)?;

        self.pathname = pathname.to_string();
        self.base_addr = base_addr;
        self.bias_addr = bias_addr;
        self.ehdr = ehdr;
        self.phdr = phdr;
        self.dyn_section = (bias_addr + dhdr.p_vaddr as usize) as *const ElfDyn;
        self.dyn_sz = dhdr.p_memsz as usize;

        // 遍历动态段，提取各表地址和大小；指针型条目按 bias 重定位
        let dyn_cnt = self.dyn_sz / mem::size_of::<ElfDyn>();
        let dyn_entries = slice::from_raw_parts(self.dyn_section, dyn_cnt);
        for dyn_entry in dyn_entries {
            match dyn_entry.d_tag {
                DT_NULL => break,
                DT_STRTAB => {
                    let strtab = (bias_addr + dyn_entry.d_un as usize) as *const c_char;
                    if (strtab as usize) < base_addr {
                        return Err(Errno::Format);
                    }
                    self.strtab = strtab;
                }
                DT_SYMTAB => {
                    let symtab = (bias_addr + dyn_entry.d_un as usize) as *const ElfSym;
                    if (symtab as usize) < base_addr {
                        return Err(Errno::Format);
                    }
                    self.symtab = symtab;
                }
                DT_PLTREL => {
                    self.is_use_rela = dyn_entry.d_un as ElfSxword == DT_RELA;
                }
                DT_JMPREL => {
                    let relplt = bias_addr + dyn_entry.d_un as usize;
                    if relplt < base_addr {
                        return Err(Errno::Format);
                    }
                    self.relplt = relplt;
                }
                DT_PLTRELSZ => {
                    self.relplt_sz = dyn_entry.d_un as usize;
                }
                DT_REL | DT_RELA => {
                    let reldyn = bias_addr + dyn_entry.d_un as usize;
                    if reldyn < base_addr {
                        return Err(Errno::Format);
                    }
                    self.reldyn = reldyn;
                }
                DT_RELSZ | DT_RELASZ => {
                    self.reldyn_sz = dyn_entry.d_un as usize;
                }
                DT_ANDROID_REL | DT_ANDROID_RELA => {
                    let relandroid = bias_addr + dyn_entry.d_un as usize;
                    if relandroid < base_addr {
                        return Err(Errno::Format);
                    }
                    self.relandroid = relandroid;
                }
                DT_ANDROID_RELSZ | DT_ANDROID_RELASZ => {
                    self.relandroid_sz = dyn_entry.d_un as usize;
                }
                DT_HASH => {
                    // GNU hash 优先，已有则忽略 ELF hash
                    if self.is_use_gnu_hash {
                        continue;
                    }
                    let raw = (bias_addr + dyn_entry.d_un as usize) as *const u32;
                    if (raw as usize) < base_addr {
                        return Err(Errno::Format);
                    }
                    self.bucket_cnt = *raw;
                    self.chain_cnt = *raw.add(1);
                    self.bucket = raw.add(2);
                    self.chain = self.bucket.add(self.bucket_cnt as usize);
                }
                DT_GNU_HASH => {
                    // 布局：nbuckets | symoffset | bloom_sz | bloom_shift | bloom[] | buckets[] | chains[]
                    let raw = (bias_addr + dyn_entry.d_un as usize) as *const u32;
                    if (raw as usize) < base_addr {
                        return Err(Errno::Format);
                    }
                    self.bucket_cnt = *raw;
                    self.symoffset = *raw.add(1);
                    self.bloom_sz = *raw.add(2);
                    self.bloom_shift = *raw.add(3);
                    self.bloom = raw.add(4) as *const usize;
                    self.bucket = self.bloom.add(self.bloom_sz as usize) as *const u32;
                    self.chain = self.bucket.add(self.bucket_cnt as usize);
                    self.is_use_gnu_hash = true;
                }
                _ => {}
            }
        }

        // Android packed relocation 以 "APS2" 魔数开头，校验后剥去 4 字节
        if self.relandroid != 0 {
            if self.relandroid_sz < 4 {
                return Err(Errno::Format);
            }
            let magic = slice::from_raw_parts(self.relandroid as *const u8, 4);
            if magic != [b'A', b'P', b'S', b'2'] {
                log::error(format_args!("android rel/rela format error"));
                return Err(Errno::Format);
            }
            self.relandroid += 4;
            self.relandroid_sz -= 4;
        }

        self.check()
    }

    // 校验初始化后的关键字段是否均已填充
    fn check(&self) -> Result<(), Errno> {
        if self.base_addr == 0
            || self.bias_addr == 0
            || self.ehdr.is_null()
            || self.phdr.is_null()
            || self.strtab.is_null()
            || self.symtab.is_null()
            || self.bucket.is_null()
            || self.chain.is_null()
        {
            return Err(Errno::Format);
        }
        if self.is_use_gnu_hash && self.bloom.is_null() {
            return Err(Errno::Format);
        }
        Ok(())
    }
}

impl Default for Elf {
    fn default() -> Self {
        Self::new()
    }
}
