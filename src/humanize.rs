//! Size tokens and labels as they appear in file names, menu keys and
//! menu labels.
//!
//! Flash sizes are written as `512K`, `4M`; filesystem sizes as the
//! number of KiB below 1 MiB (`64`) and `2M` from 1 MiB on. Labels
//! shown to the user append `B`.

use crate::static_config::{KIB, MIB};
use esp_flash_map_builder_config::{Error, Result};

pub fn flash_size_token(size: u32) -> String {
    if size >= MIB && size % MIB == 0 {
        format!("{}M", size / MIB)
    } else {
        format!("{}K", size / KIB)
    }
}

/// Empty if there is no filesystem.
pub fn fs_size_token(size: u32) -> String {
    if size == 0 {
        String::new()
    } else if size >= MIB && size % MIB == 0 {
        format!("{}M", size / MIB)
    } else {
        format!("{}", size / KIB)
    }
}

/// Menu key token, for example `4M2M`, `1M64` or `512K`.
pub fn menu_token(flash_size: u32, fs_size: u32) -> String {
    flash_size_token(flash_size) + &fs_size_token(fs_size)
}

pub fn flash_size_label(size: u32) -> String {
    flash_size_token(size) + "B"
}

pub fn fs_size_label(size: u32) -> String {
    if size == 0 {
        "none".into()
    } else if size >= MIB && size % MIB == 0 {
        format!("{}MB", size / MIB)
    } else {
        format!("{}KB", size / KIB)
    }
}

pub fn hex(value: u32) -> String {
    format!("0x{value:X}")
}

/// Parses `4M`, `512K`, `64KB`, `0x1000` or a plain number of Bytes.
pub fn parse_size(text: &str) -> Result<u32> {
    let invalid = || Error::Config(format!("invalid size {text:?}"));
    let trimmed = text.trim();
    if let Some(digits) =
        trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        return u32::from_str_radix(digits, 16).map_err(|_| invalid());
    }
    let upper = trimmed.to_ascii_uppercase();
    let upper = upper.strip_suffix('B').unwrap_or(&upper);
    let (digits, unit) = if let Some(digits) = upper.strip_suffix('K') {
        (digits, KIB)
    } else if let Some(digits) = upper.strip_suffix('M') {
        (digits, MIB)
    } else {
        (upper, 1)
    };
    digits
        .parse::<u32>()
        .ok()
        .and_then(|x| x.checked_mul(unit))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        assert_eq!(flash_size_token(512 * KIB), "512K");
        assert_eq!(flash_size_token(4 * MIB), "4M");
        assert_eq!(fs_size_token(0), "");
        assert_eq!(fs_size_token(64 * KIB), "64");
        assert_eq!(fs_size_token(512 * KIB), "512");
        assert_eq!(fs_size_token(MIB), "1M");
        assert_eq!(fs_size_token(15 * MIB), "15M");
        assert_eq!(menu_token(4 * MIB, 2 * MIB), "4M2M");
        assert_eq!(menu_token(MIB, 144 * KIB), "1M144");
        assert_eq!(menu_token(512 * KIB, 0), "512K");
    }

    #[test]
    fn test_labels() {
        assert_eq!(flash_size_label(16 * MIB), "16MB");
        assert_eq!(flash_size_label(512 * KIB), "512KB");
        assert_eq!(fs_size_label(0), "none");
        assert_eq!(fs_size_label(64 * KIB), "64KB");
        assert_eq!(fs_size_label(2 * MIB), "2MB");
        assert_eq!(hex(0x3F_C000), "0x3FC000");
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("4M").unwrap(), 4 * MIB);
        assert_eq!(parse_size("512k").unwrap(), 512 * KIB);
        assert_eq!(parse_size("64KB").unwrap(), 64 * KIB);
        assert_eq!(parse_size("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_size("0").unwrap(), 0);
        assert_eq!(parse_size(" 4096 ").unwrap(), 4096);
        assert!(matches!(parse_size("4G"), Err(Error::Config(_))));
        assert!(parse_size("M").is_err());
        assert!(parse_size("8192M").is_err());
    }
}
