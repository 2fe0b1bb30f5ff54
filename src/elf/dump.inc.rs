// 解析结果的调试转储，通过 include! 嵌入 elf.rs；仅在 DEBUG 级别启用

impl Elf {
    unsafe fn dump_elfheader(&self) {
        let ehdr = &*self.ehdr;
        let mut magic = String::with_capacity(EI_NIDENT * 3);
        for byte in ehdr.e_ident {
            magic.push_str(&format!("{byte:02X} "));
        }

        log::debug(format_args!("Elf Header:"));
        log::debug(format_args!("  Magic:                             {}", magic.trim_end()));
        log::debug(format_args!("  Class:                             {:#x}", ehdr.e_ident[EI_CLASS]));
        log::debug(format_args!("  Data:                              {:#x}", ehdr.e_ident[EI_DATA]));
        log::debug(format_args!("  Version:                           {:#x}", ehdr.e_ident[EI_VERSION]));
        log::debug(format_args!("  Type:                              {:#x}", ehdr.e_type));
        log::debug(format_args!("  Machine:                           {:#x}", ehdr.e_machine));
        log::debug(format_args!("  Version:                           {:#x}", ehdr.e_version));
        log::debug(format_args!("  Entry point address:               {:#x}", ehdr.e_entry));
        log::debug(format_args!("  Start of program headers:          {:#x}", ehdr.e_phoff));
        log::debug(format_args!("  Start of section headers:          {:#x}", ehdr.e_shoff));
        log::debug(format_args!("  Flags:                             {:#x}", ehdr.e_flags));
        log::debug(format_args!("  Number of program headers:         {}", ehdr.e_phnum));
        log::debug(format_args!("  Number of section headers:         {}", ehdr.e_shnum));
    }

    unsafe fn dump_programheader(&self) {
        let phdrs = slice::from_raw_parts(self.phdr, (*self.ehdr).e_phnum as usize);

        log::debug(format_args!("Program Headers:"));
        log::debug(format_args!(
            "  {:<10} {:<12} {:<12} {:<12} {:<12} {:<6} {}",
            "Type", "Offset", "VirtAddr", "FileSiz", "MemSiz", "Flg", "Align"
        ));
        for phdr in phdrs {
            log::debug(format_args!(
                "  {:<10x} {:<12x} {:<12x} {:<12x} {:<12x} {:<6x} {:x}",
                phdr.p_type, phdr.p_offset, phdr.p_vaddr, phdr.p_filesz, phdr.p_memsz,
                phdr.p_flags, phdr.p_align
            ));
        }
    }

    unsafe fn dump_dynamic(&self) {
        let dyn_cnt = self.dyn_sz / mem::size_of::<ElfDyn>();
        let dyn_entries = slice::from_raw_parts(self.dyn_section, dyn_cnt);

        log::debug(format_args!(
            "Dynamic section contains {} entries:",
            dyn_cnt
        ));
        log::debug(format_args!("  {:<12} {}", "Tag", "Val"));
        for dyn_entry in dyn_entries {
            log::debug(format_args!(
                "  {:<12x} {:x}",
                dyn_entry.d_tag, dyn_entry.d_un
            ));
        }
    }

    unsafe fn dump_rel(&self, label: &str, rel: usize, rel_sz: usize) {
        if rel == 0 {
            return;
        }

        let stride = if self.is_use_rela {
            mem::size_of::<ElfRela>()
        } else {
            mem::size_of::<ElfRel>()
        };
        log::debug(format_args!(
            "Relocation section '.rel{}{}' contains {} entries:",
            if self.is_use_rela { "a" } else { "" },
            label,
            rel_sz / stride
        ));
        log::debug(format_args!(
            "  {:<12} {:<12} {:<8} {:<8} {:<8} {}",
            "Offset", "Info", "Type", "Sym.Idx", "Sym.Val", "Sym.Name"
        ));

        let mut iter = PlainRelocIterator::new(rel, rel_sz, self.is_use_rela);
        while let Some(entry) = iter.next() {
            let r_sym = elf_r_sym(entry.r_info);
            let sym = &*self.symtab.add(r_sym as usize);
            log::debug(format_args!(
                "  {:<12x} {:<12x} {:<8x} {:<8} {:<8x} {}",
                entry.r_offset,
                entry.r_info,
                elf_r_type(entry.r_info),
                r_sym,
                sym.st_value,
                self.sym_name(r_sym).unwrap_or("")
            ));
        }
    }

    unsafe fn dump_symtab(&self) {
        // GNU hash 下符号表条目数未知
        if self.is_use_gnu_hash {
            return;
        }

        log::debug(format_args!(
            "Symbol table '.dynsym' contains {} entries:",
            self.chain_cnt
        ));
        log::debug(format_args!("  {:<8} {:<12} {}", "Idx", "Value", "Name"));
        for i in 0..self.chain_cnt {
            let sym = &*self.symtab.add(i as usize);
            log::debug(format_args!(
                "  {:<8} {:<12x} {}",
                i,
                sym.st_value,
                self.sym_name(i).unwrap_or("")
            ));
        }
    }

    unsafe fn dump(&self) {
        log::debug(format_args!("Elf Pathname: {}", self.pathname));
        log::debug(format_args!("Elf bias addr: {:#x}", self.bias_addr));
        self.dump_elfheader();
        self.dump_programheader();
        self.dump_dynamic();
        self.dump_rel(".plt", self.relplt, self.relplt_sz);
        self.dump_rel(".dyn", self.reldyn, self.reldyn_sz);
        self.dump_symtab();
    }
}
