use crate::flash_map::FlashMap;
use crate::humanize::{flash_size_token, fs_size_token};
use crate::region::Region;
use crate::static_config::{FLASH_BASE, KIB};
use std::fmt::{Display, Formatter};

/// `eagle.flash.4m2m.ld` and the like.
pub fn linker_script_filename(map: &FlashMap) -> String {
    format!(
        "eagle.flash.{}{}.ld",
        flash_size_token(map.flash_size),
        fs_size_token(map.expected_fs_size)
    )
    .to_lowercase()
}

/// Linker script providing the flash layout symbols of MAP.
pub struct LinkerScript<'a>(pub &'a FlashMap);

fn write_summary(
    f: &mut Formatter<'_>,
    label: &str,
    region: &Region,
) -> std::fmt::Result {
    writeln!(
        f,
        "/* {label:<6} @0x{:08X} (~{}KB) ({}B) */",
        FLASH_BASE + region.start(),
        region.size() / KIB,
        region.size()
    )
}

impl Display for LinkerScript<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let map = self.0;
        let fs = &map.fs;
        writeln!(
            f,
            "/* Flash Split for {} chips */",
            flash_size_token(map.flash_size)
        )?;
        write_summary(f, "sketch", &map.sketch)?;
        if let Some(empty) = &map.empty {
            write_summary(f, "empty", empty)?;
        }
        if fs.is_present() {
            write_summary(f, "fs", &fs.region)?;
        }
        write_summary(f, "eeprom", &map.eeprom)?;
        write_summary(f, "rfcal", &map.rfcal)?;
        write_summary(f, "wifi", &map.sdkwifi)?;
        writeln!(f)?;
        writeln!(f, "MEMORY")?;
        writeln!(f, "{{")?;
        writeln!(
            f,
            "  dport0_0_seg :                        org = 0x3FF00000, len = 0x10"
        )?;
        writeln!(
            f,
            "  dram0_0_seg :                         org = 0x3FFE8000, len = 0x14000"
        )?;
        let irom = map.irom().map_err(|_| std::fmt::Error)?;
        writeln!(
            f,
            "  irom0_0_seg :                         org = 0x{:08X}, len = 0x{:x}",
            FLASH_BASE + irom.start(),
            irom.size()
        )?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        let symbols = [
            ("start", FLASH_BASE + fs.region.start()),
            ("end", FLASH_BASE + fs.region.end()),
        ];
        for (suffix, address) in symbols {
            writeln!(f, "PROVIDE ( _FS_{suffix} = 0x{address:08X} );")?;
        }
        writeln!(f, "PROVIDE ( _FS_page = 0x{:X} );", fs.page_size)?;
        writeln!(f, "PROVIDE ( _FS_block = 0x{:X} );", fs.block_size)?;
        writeln!(
            f,
            "PROVIDE ( _EEPROM_start = 0x{:08X} );",
            FLASH_BASE + map.eeprom.start()
        )?;
        writeln!(
            f,
            "/* The following symbols are DEPRECATED and will be REMOVED in a future release */"
        )?;
        for (suffix, address) in symbols {
            writeln!(f, "PROVIDE ( _SPIFFS_{suffix} = 0x{address:08X} );")?;
        }
        writeln!(f, "PROVIDE ( _SPIFFS_page = 0x{:X} );", fs.page_size)?;
        writeln!(f, "PROVIDE ( _SPIFFS_block = 0x{:X} );", fs.block_size)?;
        writeln!(f)?;
        writeln!(f, "INCLUDE \"local.eagle.app.v6.common.ld\"")
    }
}
