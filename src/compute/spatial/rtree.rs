//! Bounding-box index over stored records using an R*-tree.
//!
//! Each record id owns exactly one axis-aligned box. Queries return every id
//! whose box overlaps the query rectangle (touching counts), so the result is
//! a candidate set: callers must apply an exact geometry test afterwards.
//!
//! # Example
//!
//! ```rust
//! use roadrisk::compute::spatial::SpatialIndex;
//! use roadrisk_types::bbox::BoundingBox2D;
//!
//! let mut index = SpatialIndex::new();
//! index.insert(1, BoundingBox2D::new(0.0, 0.0, 5.0, 5.0));
//! index.insert(2, BoundingBox2D::new(20.0, 20.0, 30.0, 30.0));
//!
//! let hits = index.query(&BoundingBox2D::new(4.0, 4.0, 10.0, 10.0));
//! assert_eq!(hits, vec![1]);
//! ```

use roadrisk_types::bbox::BoundingBox2D;
use rstar::{AABB, RTree, RTreeObject};
use rustc_hash::FxHashMap;

/// One index entry: a record id and the box enclosing its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: u64,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl IndexEntry {
    pub fn new(id: u64, bbox: &BoundingBox2D) -> Self {
        Self {
            id,
            min_x: bbox.min_x(),
            min_y: bbox.min_y(),
            max_x: bbox.max_x(),
            max_y: bbox.max_y(),
        }
    }

    pub fn bbox(&self) -> BoundingBox2D {
        BoundingBox2D::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

/// R*-tree of record boxes with an id map for replacement and removal.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
    // Map from id to its single entry, used to locate the tree node on removal
    entries: FxHashMap<u64, IndexEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            entries: FxHashMap::default(),
        }
    }

    /// Build an index in one pass. When an id repeats, the last box wins.
    pub fn bulk_load<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (u64, BoundingBox2D)>,
    {
        let mut entries: FxHashMap<u64, IndexEntry> = FxHashMap::default();
        for (id, bbox) in items {
            entries.insert(id, IndexEntry::new(id, &bbox));
        }

        let tree = RTree::bulk_load(entries.values().cloned().collect());
        log::debug!("Bulk loaded {} boxes into spatial index", tree.size());

        Self { tree, entries }
    }

    /// Insert or replace the box for `id`. Returns the previous box, if any.
    pub fn insert(&mut self, id: u64, bbox: BoundingBox2D) -> Option<BoundingBox2D> {
        let previous = self.remove_entry(id);
        let entry = IndexEntry::new(id, &bbox);
        self.tree.insert(entry.clone());
        self.entries.insert(id, entry);
        previous.map(|e| e.bbox())
    }

    /// Remove the box for `id`. Returns `false` if the id was not indexed.
    pub fn delete(&mut self, id: u64) -> bool {
        self.remove_entry(id).is_some()
    }

    fn remove_entry(&mut self, id: u64) -> Option<IndexEntry> {
        let entry = self.entries.remove(&id)?;
        if self.tree.remove(&entry).is_none() {
            log::warn!("Index entry {} was mapped but missing from the tree", id);
        }
        Some(entry)
    }

    /// Ids whose box overlaps `rect`, in ascending order.
    ///
    /// Overlap is inclusive on every edge:
    /// `a.min_x <= b.max_x && a.max_x >= b.min_x && a.min_y <= b.max_y && a.max_y >= b.min_y`.
    pub fn query(&self, rect: &BoundingBox2D) -> Vec<u64> {
        if !rect.is_finite() {
            log::warn!("Rejecting spatial index query with non-finite coordinates");
            return Vec::new();
        }

        let envelope = AABB::from_corners(
            [rect.min_x(), rect.min_y()],
            [rect.max_x(), rect.max_y()],
        );

        let mut ids: Vec<u64> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn get(&self, id: u64) -> Option<BoundingBox2D> {
        self.entries.get(&id).map(IndexEntry::bbox)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }

    /// Get statistics about the index.
    pub fn stats(&self) -> SpatialIndexStats {
        let extent = self.entries.values().map(IndexEntry::bbox).reduce(|a, b| {
            BoundingBox2D::new(
                a.min_x().min(b.min_x()),
                a.min_y().min(b.min_y()),
                a.max_x().max(b.max_x()),
                a.max_y().max(b.max_y()),
            )
        });

        SpatialIndexStats {
            entry_count: self.entries.len(),
            extent,
        }
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about a spatial index.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialIndexStats {
    /// Number of indexed records
    pub entry_count: usize,
    /// Box enclosing every entry, `None` when empty
    pub extent: Option<BoundingBox2D>,
}
