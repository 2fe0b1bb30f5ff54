// 对外 API：PLT/GOT hook 与导出函数查找，通过 include! 嵌入 elf.rs

impl Elf {
    // 对指定符号执行 PLT/GOT hook，依次扫描 .rel(a).plt、.rel(a).dyn、.rel(a).android。
    // old_func 可为空；非空时写入最后一个被改写 slot 的旧值
    pub unsafe fn hook(
        &self,
        symbol: &str,
        new_func: *mut libc::c_void,
        old_func: *mut *mut libc::c_void,
    ) -> Result<(), Errno> {
        if !self.is_inited() {
            log::error(format_args!("not inited"));
            return Err(Errno::ElfInit);
        }
        if symbol.is_empty() || new_func.is_null() {
            return Err(Errno::Invalid);
        }

        log::info(format_args!("hooking {} in {}", symbol, self.pathname));

        let symidx = self.find_symidx_by_name(symbol)?;

        // .rel(a).plt：一个符号至多一个 JUMP_SLOT，命中即停
        if self.relplt != 0 {
            let section = if self.is_use_rela {
                ".rela.plt"
            } else {
                ".rel.plt"
            };
            let mut iter = PlainRelocIterator::new(self.relplt, self.relplt_sz, self.is_use_rela);
            while let Some(entry) = iter.next() {
                if self.find_and_replace(section, symbol, new_func, old_func, symidx, &entry)? {
                    break;
                }
            }
        }

        // .rel(a).dyn：GLOB_DAT / ABS 可能指向多个 slot，全部改写
        if self.reldyn != 0 {
            let section = if self.is_use_rela {
                ".rela.dyn"
            } else {
                ".rel.dyn"
            };
            let mut iter = PlainRelocIterator::new(self.reldyn, self.reldyn_sz, self.is_use_rela);
            while let Some(entry) = iter.next() {
                self.find_and_replace(section, symbol, new_func, old_func, symidx, &entry)?;
            }
        }

        // .rel(a).android：packed 编码，同样全量扫描
        if self.relandroid != 0 {
            let section = if self.is_use_rela {
                ".rela.android"
            } else {
                ".rel.android"
            };
            let mut iter =
                PackedRelocIterator::new(self.relandroid, self.relandroid_sz, self.is_use_rela)?;
            while let Some(entry) = iter.next()? {
                self.find_and_replace(section, symbol, new_func, old_func, symidx, &entry)?;
            }
        }

        Ok(())
    }

    // 查找导出符号的运行时地址，未定义或值为 0 时返回 None
    pub fn find_export_function(&self, symbol: &str) -> Option<usize> {
        let symidx = self.find_symidx_by_name(symbol).ok()?;
        unsafe {
            let sym = &*self.symtab.add(symidx as usize);
            if sym.st_shndx == SHN_UNDEF || sym.st_value == 0 {
                return None;
            }
            Some(self.bias_addr + sym.st_value as usize)
        }
    }
}
