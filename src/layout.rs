use crate::region::{Location, Region};
use esp_flash_map_builder_config::{Error, Result};
use serde::Serialize;

/// Packs named regions into a bound region, from its end downwards.
/// Every byte given out is accounted for by exactly one subregion;
/// gaps have to be explicit (anonymous) filler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Layout {
    region: Region,
    free: u32,
    subregions: Vec<Region>,
}

impl Layout {
    pub fn new(region: Region) -> Self {
        let free = region.size();
        Self { region, free, subregions: Vec::new() }
    }
    pub fn region(&self) -> &Region {
        &self.region
    }
    pub fn free(&self) -> u32 {
        self.free
    }
    pub fn used(&self) -> u32 {
        self.subregions.iter().map(Region::size).sum()
    }
    /// In packing order, which is descending address order.
    pub fn subregions(&self) -> &[Region] {
        &self.subregions
    }
    /// Lowest address packed so far. The next region ends here.
    pub fn edge(&self) -> Location {
        self.subregions
            .last()
            .map(Region::start)
            .unwrap_or(self.region.end())
    }

    /// Inserts REGION, which must end at or below the current edge.
    pub fn push(&mut self, region: Region) -> Result<Region> {
        if region.size() > self.free {
            return Err(Error::OutOfSpace {
                name: region.name().into(),
                size: region.size(),
                free: self.free,
            });
        }
        if !self.region.contains(&region) {
            return Err(Error::OutOfBounds {
                name: region.name().into(),
                start: region.start(),
                end: region.end(),
                bound_start: self.region.start(),
                bound_end: self.region.end(),
            });
        }
        let edge = self.edge();
        if region.end() > edge {
            return Err(Error::OrderingViolation {
                name: region.name().into(),
                end: region.end(),
                edge,
            });
        }
        self.free -= region.size();
        self.subregions.push(region.clone());
        Ok(region)
    }

    /// Inserts a region of SIZE Bytes right below the edge.
    pub fn add(&mut self, name: impl Into<String>, size: u32) -> Result<Region> {
        let name = name.into();
        if size > self.free {
            return Err(Error::OutOfSpace { name, size, free: self.free });
        }
        let edge = self.edge();
        // Only smaller than free if push() left a gap above the edge.
        let below_edge = Region::new("", self.region.start(), edge)?;
        if size > below_edge.size() {
            return Err(Error::OutOfBounds {
                name,
                start: self.region.start(),
                end: edge,
                bound_start: self.region.start(),
                bound_end: self.region.end(),
            });
        }
        self.push(below_edge.from_end(name, size)?)
    }

    /// Like add, but makes the region's size a multiple of ALIGNMENT.
    /// The remainder is inserted as anonymous filler above the region,
    /// so the region starts where an unaligned add would have started.
    pub fn add_aligned(
        &mut self,
        name: impl Into<String>,
        size: u32,
        alignment: u32,
    ) -> Result<Region> {
        let remainder = size.checked_rem(alignment).unwrap_or(0);
        if remainder != 0 {
            self.add("", remainder)?;
        }
        self.add(name, size - remainder)
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    fn intersect(a: &Region, b: &Region) -> Option<(Location, Location)> {
        let new_start = a.start().max(b.start());
        let new_end = a.end().min(b.end());
        if new_start < new_end { Some((new_start, new_end)) } else { None }
    }
    fn layout() -> Layout {
        Layout::new(Region::new("flash", 0, 0x4_0000).unwrap())
    }

    #[test]
    fn test_layout_packs_downwards() {
        let mut layout = layout();
        assert_eq!(layout.edge(), 0x4_0000);
        let a = layout.add("a", 42).unwrap();
        let b = layout.add("b", 100).unwrap();
        assert!(intersect(&a, &b).is_none());
        assert_eq!(a.end(), 0x4_0000);
        assert_eq!(b.end(), a.start());
        assert_eq!(layout.edge(), b.start());
        assert_eq!(layout.used(), 142);
        assert_eq!(layout.free(), 0x4_0000 - 142);
        assert_eq!(layout.subregions(), &[a, b]);
    }

    #[test]
    fn test_layout_out_of_space() {
        let mut layout = layout();
        layout.add("a", 0x3_0000).unwrap();
        match layout.add("b", 0x1_0001) {
            Err(Error::OutOfSpace { size: 0x1_0001, free: 0x1_0000, .. }) => {}
            x => panic!("unexpected result {:?}", x),
        }
        layout.add("c", 0x1_0000).unwrap();
        assert_eq!(layout.free(), 0);
        assert!(matches!(
            layout.add("d", 1),
            Err(Error::OutOfSpace { .. })
        ));
        // Markers are fine even when full.
        let marker = layout.add("", 0).unwrap();
        assert_eq!((marker.start(), marker.end()), (0, 0));
    }

    #[test]
    fn test_layout_push_out_of_bounds() {
        let mut layout =
            Layout::new(Region::new("flash", 0x1000, 0x4_0000).unwrap());
        let outside = Region::new("x", 0x800, 0x1800).unwrap();
        assert!(matches!(
            layout.push(outside),
            Err(Error::OutOfBounds { start: 0x800, .. })
        ));
        assert!(layout.subregions().is_empty());
        assert_eq!(layout.free(), 0x3_f000);
    }

    #[test]
    fn test_layout_push_ordering_violation() {
        let mut layout = layout();
        layout.push(Region::new("a", 0x2_0000, 0x3_0000).unwrap()).unwrap();
        // Overlaps a.
        let x = Region::new("x", 0x2_8000, 0x2_9000).unwrap();
        assert!(matches!(
            layout.push(x),
            Err(Error::OrderingViolation { edge: 0x2_0000, .. })
        ));
        // Above a, even though that space is unused.
        let y = Region::new("y", 0x3_0000, 0x3_1000).unwrap();
        assert!(matches!(
            layout.push(y),
            Err(Error::OrderingViolation { .. })
        ));
        // Below a is fine, and the edge moves with it.
        let z = Region::new("z", 0x1_0000, 0x1_8000).unwrap();
        layout.push(z).unwrap();
        assert_eq!(layout.edge(), 0x1_0000);
    }

    #[test]
    fn test_add_aligned_inserts_filler() {
        let mut layout = layout();
        layout.add("tail", 0x5000).unwrap();
        let fs = layout.add_aligned("fs", 0x1_b000, 0x2000).unwrap();
        assert_eq!(fs.size() % 0x2000, 0);
        assert_eq!(fs.size(), 0x1_a000);
        let subregions = layout.subregions();
        assert_eq!(subregions.len(), 3);
        let filler = &subregions[1];
        assert!(filler.is_anonymous());
        assert_eq!(filler.size(), 0x1000);
        assert_eq!(filler.start(), fs.end());
        assert_eq!(layout.used(), 0x5000 + 0x1_b000);
    }

    #[test]
    fn test_add_aligned_without_remainder() {
        let mut layout = layout();
        let fs = layout.add_aligned("fs", 0x4000, 0x1000).unwrap();
        assert_eq!(fs.size(), 0x4000);
        assert_eq!(layout.subregions().len(), 1);
    }
}
