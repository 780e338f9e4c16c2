use esp_flash_map_builder_config::{Error, Result};
use serde::Serialize;

/// Byte offset into the flash.
pub type Location = u32;

/// A named half-open range `[start, end)` of flash.
/// Anonymous filler has an empty name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Region {
    name: String,
    start: Location,
    end: Location,
}

impl Region {
    pub fn new(
        name: impl Into<String>,
        start: Location,
        end: Location,
    ) -> Result<Self> {
        let name = name.into();
        if start > end {
            return Err(Error::InvalidRange {
                name,
                start: start.into(),
                end: end.into(),
            });
        }
        Ok(Self { name, start, end })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn start(&self) -> Location {
        self.start
    }
    pub fn end(&self) -> Location {
        self.end
    }
    pub fn size(&self) -> u32 {
        self.end - self.start
    }
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// The SIZE Bytes immediately above this region.
    pub fn after(&self, name: impl Into<String>, size: u32) -> Result<Self> {
        let name = name.into();
        match self.end.checked_add(size) {
            Some(end) => Self::new(name, self.end, end),
            None => Err(Error::InvalidRange {
                name,
                start: self.end.into(),
                end: u64::from(self.end) + u64::from(size),
            }),
        }
    }

    /// The top SIZE Bytes of this region.
    pub fn from_end(
        &self,
        name: impl Into<String>,
        size: u32,
    ) -> Result<Self> {
        let name = name.into();
        if size > self.size() {
            return Err(Error::InvalidRange {
                name,
                start: u64::from(self.start) + u64::from(size),
                end: self.end.into(),
            });
        }
        Self::new(name, self.end - size, self.end)
    }

    /// The bottom SIZE Bytes of this region.
    pub fn from_start(
        &self,
        name: impl Into<String>,
        size: u32,
    ) -> Result<Self> {
        let name = name.into();
        if size > self.size() {
            return Err(Error::InvalidRange {
                name,
                start: u64::from(self.start) + u64::from(size),
                end: self.end.into(),
            });
        }
        Self::new(name, self.start, self.start + size)
    }

    pub fn contains(&self, other: &Region) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[cfg(test)]
    pub fn overlaps(&self, other: &Region) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.is_anonymous() { "-" } else { &self.name };
        write!(f, "{name} [0x{:08X}, 0x{:08X})", self.start, self.end)
    }
}
