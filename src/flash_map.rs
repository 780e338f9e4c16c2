use crate::layout::Layout;
use crate::region::{Location, Region};
use crate::static_config::{
    is_supported_flash_size, CRC_SIZE, EEPROM_SIZE, FS_BLOCK_THRESHOLD,
    FS_PAGE_SIZE, LARGE_FS_BLOCK_SIZE, MARKER_SIZE, MAX_SKETCH_SPAN, MIB,
    RFCAL_SIZE, SDK_WIFI_SIZE, SECTOR_SIZE, SKETCH_RESERVED,
    SMALL_FS_BLOCK_SIZE,
};
use esp_flash_map_builder_config::{Error, Result};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Filesystem {
    pub region: Region,
    pub block_size: u32,
    pub page_size: u32,
}

impl Filesystem {
    /// Stand-in for "no filesystem", located at AT so that the linker
    /// symbols still have a value.
    pub fn placeholder(at: Location) -> Result<Self> {
        Ok(Self {
            region: Region::new("Filesystem", at, at)?,
            block_size: 0,
            page_size: 0,
        })
    }
    pub fn is_present(&self) -> bool {
        self.region.size() > 0
    }
}

/// Block and page size the filesystem format uses for a filesystem of
/// FS_SIZE Bytes.
pub fn fs_block_page_size(fs_size: u32) -> (u32, u32) {
    if fs_size == 0 {
        (0, 0)
    } else if fs_size < FS_BLOCK_THRESHOLD {
        (SMALL_FS_BLOCK_SIZE, FS_PAGE_SIZE)
    } else {
        (LARGE_FS_BLOCK_SIZE, FS_PAGE_SIZE)
    }
}

/// The regions the SDK always keeps at the end of flash.
#[derive(Clone, Debug)]
pub struct CommonLayout {
    pub layout: Layout,
    pub sdkwifi: Region,
    pub rfcal: Region,
    pub eeprom: Region,
}

pub fn common_layout(flash_size: u32) -> Result<CommonLayout> {
    if !is_supported_flash_size(flash_size) {
        return Err(Error::UnsupportedFlashSize(flash_size));
    }
    let mut layout = Layout::new(Region::new("Flash", 0, flash_size)?);
    let sdkwifi = layout.add("SDK + WiFi", SDK_WIFI_SIZE)?;
    let rfcal = layout.add("RFCAL", RFCAL_SIZE)?;
    let eeprom = layout.add("EEPROM", EEPROM_SIZE)?;
    Ok(CommonLayout { layout, sdkwifi, rfcal, eeprom })
}

/// Result of planning one (flash size, filesystem size) combination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlashMap {
    pub name: Option<String>,
    pub layout: Layout,
    pub flash_size: u32,
    pub sdkwifi: Region,
    pub rfcal: Region,
    pub eeprom: Region,
    pub empty: Option<Region>,
    pub fs: Filesystem,
    /// What was asked for; fs.region may be smaller.
    pub expected_fs_size: u32,
    pub sketch: Region,
    pub max_upload_size: u32,
    pub max_ota_size: u32,
}

impl FlashMap {
    /// The most the sketch may occupy, right after the bootloader and
    /// image header.
    pub fn irom(&self) -> Result<Region> {
        Region::new("Header", 0, SKETCH_RESERVED)?
            .after("irom0_0_seg", self.max_upload_size)
    }
}

/// Partitions a flash chip of FLASH_SIZE Bytes into bootloader, sketch,
/// (optional) empty space, (optional) filesystem and the SDK's regions.
/// FS_SIZE == 0 means no filesystem.
pub fn flash_map(
    flash_size: u32,
    fs_size: u32,
    name: Option<&str>,
) -> Result<FlashMap> {
    let CommonLayout { mut layout, sdkwifi, rfcal, eeprom } =
        common_layout(flash_size)?;

    let (block_size, page_size) = fs_block_page_size(fs_size);

    // Legacy: on chips above 1 MiB, the SDK's tail was taken out of the
    // requested filesystem size instead of out of the sketch space. So
    // "4M2M" has a filesystem of 2 MiB - 20 kiB (minus block alignment)
    // and the filesystem starts at exactly 2 MiB. Shipped images rely
    // on these addresses. Do not change.
    let expected_fs_size = fs_size;
    let mut fs_size = fs_size;
    if fs_size > 0 && flash_size > MIB {
        fs_size = fs_size.checked_sub(layout.used()).ok_or_else(|| {
            Error::InvalidRange {
                name: "Filesystem".into(),
                start: layout.used().into(),
                end: expected_fs_size.into(),
            }
        })?;
    }

    let fs = if fs_size > 0 {
        Filesystem {
            region: layout.add_aligned("Filesystem", fs_size, block_size)?,
            block_size,
            page_size,
        }
    } else {
        Filesystem::placeholder(eeprom.start())?
    };

    let empty = if layout.free() > MAX_SKETCH_SPAN {
        let span = layout.region().from_start("", MAX_SKETCH_SPAN)?;
        Some(layout.add("Empty", layout.edge() - span.end())?)
    } else {
        None
    };

    let sketch_size = layout.free().saturating_sub(SKETCH_RESERVED);
    let sketch = layout.add("Sketch", sketch_size)?;
    layout.add("", MARKER_SIZE)?;
    layout.add("CRC", CRC_SIZE)?;
    layout.add("Bootloader", SECTOR_SIZE - MARKER_SIZE)?;
    layout.add("", MARKER_SIZE)?;

    if layout.free() != 0 {
        return Err(Error::AccountingFailure { free: layout.free() });
    }

    let max_upload_size = MAX_SKETCH_SPAN.min(flash_size) - SKETCH_RESERVED;
    let max_ota_size = match &empty {
        Some(empty) => empty.size(),
        None => max_upload_size.min(sketch.size() / 2),
    };

    Ok(FlashMap {
        name: name.map(String::from),
        layout,
        flash_size,
        sdkwifi,
        rfcal,
        eeprom,
        empty,
        fs,
        expected_fs_size,
        sketch,
        max_upload_size,
        max_ota_size,
    })
}
