use crate::flash_map::FlashMap;
use crate::static_config::{FLASH_BASE, KIB};
use std::fmt::{Display, Formatter};

/// FlashMap.h: one FLASH_MAP_<name> initializer per symbolic name,
/// holding an entry for each flash size that uses that name.
pub struct FlashMapHeader<'a>(pub &'a [FlashMap]);

impl FlashMapHeader<'_> {
    /// Names in order of first appearance, with their maps in input
    /// order.
    pub fn groups(&self) -> Vec<(&str, Vec<&FlashMap>)> {
        let mut groups: Vec<(&str, Vec<&FlashMap>)> = Vec::new();
        for map in self.0 {
            let Some(name) = map.name.as_deref() else {
                continue;
            };
            match groups.iter_mut().find(|(x, _)| *x == name) {
                Some((_, maps)) => maps.push(map),
                None => groups.push((name, vec![map])),
            }
        }
        groups
    }
}

fn write_entry(f: &mut Formatter<'_>, map: &FlashMap) -> std::fmt::Result {
    write!(
        f,
        "        {{ .eeprom_start = 0x{:08x}, .fs_start = 0x{:08x}, .fs_end = 0x{:08x}, .fs_block_size = 0x{:x}, .fs_page_size = 0x{:x}, .flash_size_kb = {} }}",
        FLASH_BASE + map.eeprom.start(),
        FLASH_BASE + map.fs.region.start(),
        FLASH_BASE + map.fs.region.end(),
        map.fs.block_size,
        map.fs.page_size,
        map.flash_size / KIB,
    )
}

impl Display for FlashMapHeader<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "// generated by esp-flash-map-builder, do not edit")?;
        writeln!(f)?;
        writeln!(f, "#ifndef __FLASH_MAP_H")?;
        writeln!(f, "#define __FLASH_MAP_H")?;
        writeln!(f)?;
        writeln!(f, "#include <stdint.h>")?;
        writeln!(f, "#include <stddef.h>")?;
        writeln!(f)?;
        writeln!(f, "typedef struct")?;
        writeln!(f, "{{")?;
        for field in [
            "eeprom_start",
            "fs_start",
            "fs_end",
            "fs_block_size",
            "fs_page_size",
            "flash_size_kb",
        ] {
            writeln!(f, "    uint32_t {field};")?;
        }
        writeln!(f, "}} flash_map_s;")?;
        writeln!(f)?;
        writeln!(f, "/*")?;
        writeln!(f, "  Following definitions map the above structure, one per line.")?;
        writeln!(f, "  FLASH_MAP_* is a user choice in sketch:")?;
        writeln!(f, "      `FLASH_MAP_SETUP_CONFIG(FLASH_MAP_OTA_FS)`")?;
        writeln!(
            f,
            "  Configuration is made at boot with detected flash chip size (last argument 512..16384)"
        )?;
        writeln!(f, "*/")?;
        for (name, maps) in self.groups() {
            writeln!(f)?;
            writeln!(f, "#define FLASH_MAP_{name} \\")?;
            writeln!(f, "    {{ \\")?;
            for (i, map) in maps.iter().enumerate() {
                write_entry(f, map)?;
                let separator = if i + 1 < maps.len() { "," } else { "" };
                writeln!(f, "{separator} \\")?;
            }
            writeln!(f, "    }}")?;
        }
        writeln!(f)?;
        writeln!(f, "#endif // __FLASH_MAP_H")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash_map::tests::all_maps;

    #[test]
    fn test_groups_in_first_appearance_order() {
        let maps = all_maps();
        let header = FlashMapHeader(&maps);
        let groups = header.groups();
        let names: Vec<&str> = groups.iter().map(|(x, _)| *x).collect();
        assert_eq!(names, vec!["NO_FS", "OTA_FS", "MAX_FS"]);
        let ota_sizes: Vec<u32> =
            groups[1].1.iter().map(|x| x.flash_size / KIB).collect();
        assert_eq!(ota_sizes, vec![1024, 2048, 4096, 8192, 16384]);
    }

    #[test]
    fn test_header_text() {
        let maps = all_maps();
        let text = FlashMapHeader(&maps).to_string();
        assert!(text.contains("    uint32_t flash_size_kb;\n} flash_map_s;\n"));
        assert!(text.contains("#define FLASH_MAP_OTA_FS \\\n    { \\\n"));
        assert!(text.contains(
            "{ .eeprom_start = 0x405fb000, .fs_start = 0x40400000, .fs_end = 0x405fa000, .fs_block_size = 0x2000, .fs_page_size = 0x100, .flash_size_kb = 4096 }, \\\n"
        ));
        // Last entry of a group has no trailing comma.
        assert!(text.contains(".flash_size_kb = 1024 } \\\n    }\n"));
        assert_eq!(text.matches("#define FLASH_MAP_").count(), 3);
        assert!(text.trim_end().ends_with("#endif // __FLASH_MAP_H"));
    }
}
