use crate::flash_map::FlashMap;
use crate::humanize::{
    flash_size_label, flash_size_token, fs_size_label, hex, menu_token,
};
use crate::ld_script::linker_script_filename;
use crate::static_config::KIB;
use esp_flash_map_builder_config::SerdeBoard;
use std::fmt::{Display, Formatter};

/// Keys (without the board id) and values of the flash size menu entry
/// for MAP, in boards.txt order.
pub fn flash_size_menu(map: &FlashMap) -> Vec<(String, String)> {
    let token = menu_token(map.flash_size, map.expected_fs_size);
    let menu = format!(".menu.eesz.{token}");
    let label = format!(
        "{} (FS:{} OTA:~{}KB)",
        flash_size_label(map.flash_size),
        fs_size_label(map.expected_fs_size),
        // An OTA image is still a sketch; it can't exceed the upload cap.
        map.max_ota_size.min(map.max_upload_size) / KIB
    );
    let menub = format!("{menu}.build.");
    let mut result = vec![
        (menu.clone(), label),
        (menub.clone() + "flash_size", flash_size_token(map.flash_size)),
        (menub.clone() + "flash_size_bytes", hex(map.flash_size)),
        (menub.clone() + "flash_ld", linker_script_filename(map)),
        (menu + ".upload.maximum_size", map.sketch.size().to_string()),
        (menub.clone() + "rfcal_addr", hex(map.rfcal.start())),
    ];
    let fs = &map.fs;
    if fs.is_present() {
        result.extend([
            (menub.clone() + "spiffs_pagesize", fs.page_size.to_string()),
            (menub.clone() + "spiffs_start", hex(fs.region.start())),
            (menub.clone() + "spiffs_end", hex(fs.region.end())),
            (menub + "spiffs_blocksize", fs.block_size.to_string()),
        ]);
    }
    result
}

/// boards.txt fragment: for every board, its name and the flash size
/// menu entries of all MAPS whose flash size the board offers.
pub struct BoardsTxt<'a> {
    pub boards: &'a [SerdeBoard],
    pub maps: &'a [FlashMap],
}

impl Display for BoardsTxt<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "#")?;
        writeln!(
            f,
            "# this file is script-generated and is likely to be overwritten by esp-flash-map-builder"
        )?;
        writeln!(f, "#")?;
        writeln!(f)?;
        writeln!(f, "menu.eesz=Flash Size")?;
        writeln!(f)?;
        for board in self.boards {
            writeln!(
                f,
                "##############################################################"
            )?;
            writeln!(f, "{}.name={}", board.id, board.name)?;
            for size_kb in &board.flash_sizes {
                let maps =
                    self.maps.iter().filter(|x| x.flash_size / KIB == *size_kb);
                for map in maps {
                    for (key, value) in flash_size_menu(map) {
                        writeln!(f, "{}{key}={value}", board.id)?;
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
