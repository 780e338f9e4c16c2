use crate::region::Location;
use static_assertions::const_assert;

/* Coarse-grained flash locations (in Byte), from the top of flash down */

/*

flash_size +-----------------------------------------+
           |      SDK + WiFi settings (3 sectors)    |
           +-----------------------------------------+
           |             RFCAL (1 sector)            |
           +-----------------------------------------+
           |       EEPROM emulation (1 sector)       |
           +-----------------------------------------+ EEPROM start
           |   Alignment filler (< filesystem block) |
           +-----------------------------------------+
           |                                         |
           |     Filesystem (optional, block aligned)|
           |                                         |
           +-----------------------------------------+
           |  Empty (only when more than 1 MiB free) |
 0x10_0000 +- - - - - - - - - - - - - - - - - - - - -+ MAX_SKETCH_SPAN
           |                                         |
           |                  Sketch                 |
           |                                         |
    0x1010 +-----------------------------------------+ SKETCH_RESERVED
           |             marker (8 Byte)             |
    0x1008 +-----------------------------------------+
           |               CRC (8 Byte)              |
    0x1000 +-----------------------------------------+
           |        Bootloader (sector - 8 Byte)     |
       0x8 +-----------------------------------------+
           |             marker (8 Byte)             |
       0x0 +-----------------------------------------+

*/

/// Erase granularity of the flash chip.
pub const SECTOR_SIZE: u32 = 0x1000;

/// Where the flash is mapped into the CPU's address space. Linker script
/// and FlashMap.h addresses are relative to this.
pub const FLASH_BASE: Location = 0x4020_0000;

pub const KIB: u32 = 1024;
pub const MIB: u32 = 1024 * KIB;

/// The chip sizes the platform ships with.
pub const SUPPORTED_FLASH_SIZES: [u32; 6] =
    [512 * KIB, MIB, 2 * MIB, 4 * MIB, 8 * MIB, 16 * MIB];

pub const SDK_WIFI_SIZE: u32 = 3 * SECTOR_SIZE;
pub const RFCAL_SIZE: u32 = SECTOR_SIZE;
pub const EEPROM_SIZE: u32 = SECTOR_SIZE;

/// Filesystem programming granularity.
pub const FS_PAGE_SIZE: u32 = 0x100;
/// Filesystems below this size use SMALL_FS_BLOCK_SIZE.
pub const FS_BLOCK_THRESHOLD: u32 = 512 * KIB;
pub const SMALL_FS_BLOCK_SIZE: u32 = 0x1000;
pub const LARGE_FS_BLOCK_SIZE: u32 = 0x2000;

/// The sketch is only ever mapped within the first MiB of flash.
pub const MAX_SKETCH_SPAN: u32 = MIB;

pub const IMAGE_HEADER_SIZE: u32 = 8;
pub const CRC_SIZE: u32 = 8;
pub const MARKER_SIZE: u32 = 8;

/// Bootloader sector plus image header plus CRC block, in front of the
/// sketch.
// Note: This must not be changed.
// Shipped images put the sketch at FLASH_BASE + 0x1010.
pub const SKETCH_RESERVED: u32 = SECTOR_SIZE + IMAGE_HEADER_SIZE + 4 + 4;

const_assert!(SECTOR_SIZE.is_power_of_two());
const_assert!(SMALL_FS_BLOCK_SIZE.is_power_of_two());
const_assert!(LARGE_FS_BLOCK_SIZE.is_power_of_two());
const_assert!(FS_PAGE_SIZE.is_power_of_two());
const_assert!(SMALL_FS_BLOCK_SIZE % FS_PAGE_SIZE == 0);
const_assert!(FLASH_BASE % SECTOR_SIZE == 0);
const_assert!(
    SKETCH_RESERVED
        == MARKER_SIZE + CRC_SIZE + (SECTOR_SIZE - MARKER_SIZE) + MARKER_SIZE
);
const_assert!(SKETCH_RESERVED == 0x1010);

pub fn is_supported_flash_size(flash_size: u32) -> bool {
    SUPPORTED_FLASH_SIZES.contains(&flash_size)
}
