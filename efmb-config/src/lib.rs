use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid range {name:?}: start 0x{start:X} > end 0x{end:X}")]
    InvalidRange { name: String, start: u64, end: u64 },
    #[error("out of space for {name:?}: need {size} B, {free} B free")]
    OutOfSpace { name: String, size: u32, free: u32 },
    #[error(
        "{name:?} 0x{start:X}..0x{end:X} is outside of 0x{bound_start:X}..0x{bound_end:X}"
    )]
    OutOfBounds {
        name: String,
        start: u32,
        end: u32,
        bound_start: u32,
        bound_end: u32,
    },
    #[error("{name:?} ends at 0x{end:X}, above the packing edge 0x{edge:X}")]
    OrderingViolation { name: String, end: u32, edge: u32 },
    #[error("layout not fully accounted for: {free} B left over")]
    AccountingFailure { free: u32 },
    #[error("unsupported flash size {0} B")]
    UnsupportedFlashSize(u32),
    #[error("configuration {0}")]
    Config(String),
    #[error("Io {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T> = core::result::Result<T, Error>;

const KIB: u32 = 1024;

/// One filesystem choice offered for a flash chip size.
#[derive(
    Clone, Debug, Default, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename = "Filesystem")]
#[serde(deny_unknown_fields)]
pub struct SerdeFilesystem {
    /// Requested filesystem size in KiB; 0 means no filesystem.
    pub size_kb: u32,
    /// Symbolic name, used for the FLASH_MAP_<name> macros of FlashMap.h.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename = "FlashSize")]
#[serde(deny_unknown_fields)]
pub struct SerdeFlashSize {
    /// Flash chip size in KiB.
    pub size_kb: u32,
    pub filesystems: Vec<SerdeFilesystem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename = "Board")]
#[serde(deny_unknown_fields)]
pub struct SerdeBoard {
    /// Board id, the prefix of all keys in boards.txt.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flash chip sizes (in KiB) offered in the board's flash size menu.
    pub flash_sizes: Vec<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename = "Config")]
#[serde(deny_unknown_fields)]
pub struct SerdeConfig {
    pub flash_sizes: Vec<SerdeFlashSize>,
    #[serde(default)]
    pub boards: Vec<SerdeBoard>,
}

/// A (flash size, filesystem size) pair to plan, in bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combination<'a> {
    pub flash_size: u32,
    pub fs_size: u32,
    pub name: Option<&'a str>,
}

fn kib_to_bytes(size_kb: u32) -> Result<u32> {
    size_kb.checked_mul(KIB).ok_or_else(|| {
        Error::Config(format!("size {size_kb} KiB does not fit in 32 bits"))
    })
}

impl SerdeFlashSize {
    pub fn size(&self) -> Result<u32> {
        kib_to_bytes(self.size_kb)
    }
}

impl SerdeConfig {
    /// Checks the cross references that the schema can't express.
    pub fn validate(&self) -> Result<()> {
        let mut seen = Vec::<(u32, u32)>::new();
        for flash in &self.flash_sizes {
            flash.size()?;
            for fs in &flash.filesystems {
                kib_to_bytes(fs.size_kb)?;
                let key = (flash.size_kb, fs.size_kb);
                if seen.contains(&key) {
                    return Err(Error::Config(format!(
                        "duplicate combination {} KiB flash / {} KiB filesystem",
                        key.0, key.1
                    )));
                }
                seen.push(key);
                if let Some(name) = &fs.name {
                    if name.is_empty()
                        || !name.chars().all(|c| {
                            c.is_ascii_uppercase()
                                || c.is_ascii_digit()
                                || c == '_'
                        })
                    {
                        return Err(Error::Config(format!(
                            "name {name:?} is not a valid macro suffix"
                        )));
                    }
                }
            }
        }
        let mut board_ids = Vec::<&str>::new();
        for board in &self.boards {
            if board_ids.contains(&board.id.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate board {:?}",
                    board.id
                )));
            }
            board_ids.push(&board.id);
            for size_kb in &board.flash_sizes {
                if self.flash_size(*size_kb).is_none() {
                    return Err(Error::Config(format!(
                        "board {:?} refers to unknown flash size {} KiB",
                        board.id, size_kb
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn flash_size(&self, size_kb: u32) -> Option<&SerdeFlashSize> {
        self.flash_sizes.iter().find(|x| x.size_kb == size_kb)
    }

    /// All combinations, in configuration order.
    pub fn combinations(&self) -> Result<Vec<Combination<'_>>> {
        let mut result = Vec::new();
        for flash in &self.flash_sizes {
            let flash_size = flash.size()?;
            for fs in &flash.filesystems {
                result.push(Combination {
                    flash_size,
                    fs_size: kib_to_bytes(fs.size_kb)?,
                    name: fs.name.as_deref(),
                });
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SerdeConfig {
        SerdeConfig {
            flash_sizes: vec![
                SerdeFlashSize {
                    size_kb: 1024,
                    filesystems: vec![
                        SerdeFilesystem { size_kb: 0, name: None },
                        SerdeFilesystem {
                            size_kb: 64,
                            name: Some("OTA_FS".into()),
                        },
                    ],
                },
                SerdeFlashSize {
                    size_kb: 4096,
                    filesystems: vec![SerdeFilesystem {
                        size_kb: 2048,
                        name: Some("OTA_FS".into()),
                    }],
                },
            ],
            boards: vec![SerdeBoard {
                id: "generic".into(),
                name: "Generic ESP8266 Module".into(),
                flash_sizes: vec![1024, 4096],
            }],
        }
    }

    #[test]
    fn test_combinations_keep_order() {
        let config = config();
        config.validate().unwrap();
        let combinations = config.combinations().unwrap();
        assert_eq!(
            combinations,
            vec![
                Combination { flash_size: 0x10_0000, fs_size: 0, name: None },
                Combination {
                    flash_size: 0x10_0000,
                    fs_size: 0x1_0000,
                    name: Some("OTA_FS")
                },
                Combination {
                    flash_size: 0x40_0000,
                    fs_size: 0x20_0000,
                    name: Some("OTA_FS")
                },
            ]
        );
    }

    #[test]
    fn test_unknown_board_flash_size() {
        let mut config = config();
        config.boards[0].flash_sizes.push(8192);
        match config.validate() {
            Err(Error::Config(_)) => {}
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn test_duplicate_combination() {
        let mut config = config();
        config.flash_sizes[1]
            .filesystems
            .push(SerdeFilesystem { size_kb: 2048, name: None });
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_macro_name() {
        let mut config = config();
        config.flash_sizes[0].filesystems[0].name = Some("ota fs".into());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
