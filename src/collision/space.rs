use crate::core::{BodyHandle, GeomHandle, HandleStorage, World};
use crate::error::PhysicsError;
use crate::math::{Aabb, Transform};
use crate::shapes::Shape;
use crate::Result;
use std::collections::HashMap;

/// Identifies a space node inside a [`Space`] tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceId(usize);

/// The broad-phase strategy a space node uses for its direct members
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpaceKind {
    /// Test every pair of members; right for small spaces
    Simple,

    /// Hash member bounds into a uniform grid of the given cell size;
    /// right for many similarly sized geoms
    Hash { cell_size: f32 },
}

/// A placed collision shape.
///
/// A geom either follows a rigid body (its pose is copied from the body
/// every update) or is static with a fixed pose.
pub struct Geom {
    shape: Shape,
    pose: Transform,
    body: Option<BodyHandle>,
    enabled: bool,
    aabb: Aabb,
    node: usize,
}

impl Geom {
    /// Returns the geom's shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the geom's world pose
    pub fn pose(&self) -> Transform {
        self.pose
    }

    /// Returns the body this geom follows, if any
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Returns whether the geom participates in collision
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the geom's cached world bounds
    pub fn bounds(&self) -> Aabb {
        self.aabb
    }
}

struct SpaceNode {
    kind: SpaceKind,
    children: Vec<usize>,
}

/// A collision space: geom storage plus a tree of broad-phase nodes.
///
/// Geoms added to the same node are tested against each other with that
/// node's strategy. A subspace acts as a single member of its parent:
/// its geoms are tested against the rest of the parent only when bounds
/// overlap, and internally with the subspace's own strategy.
///
/// [`collide`](Space::collide) returns candidate pairs in ascending
/// handle order, so identical scenes produce identical pair sequences.
pub struct Space {
    geoms: HandleStorage<GeomHandle, Geom>,
    nodes: Vec<SpaceNode>,
}

impl Space {
    /// The root node of every space tree
    pub const ROOT: SpaceId = SpaceId(0);

    /// Creates a space whose root uses the given broad-phase strategy
    pub fn new(kind: SpaceKind) -> Self {
        Self {
            geoms: HandleStorage::new(),
            nodes: vec![SpaceNode {
                kind,
                children: Vec::new(),
            }],
        }
    }

    /// Adds a subspace under the given parent node
    pub fn add_subspace(&mut self, parent: SpaceId, kind: SpaceKind) -> Result<SpaceId> {
        if parent.0 >= self.nodes.len() {
            return Err(PhysicsError::InvalidReference(format!(
                "space node #{} not found",
                parent.0
            )));
        }
        let id = self.nodes.len();
        self.nodes.push(SpaceNode {
            kind,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(SpaceId(id))
    }

    /// Adds a static geom to the root node
    pub fn add_geom(&mut self, shape: Shape, pose: Transform) -> GeomHandle {
        let aabb = shape.world_bounds(&pose);
        self.geoms.add(Geom {
            shape,
            pose,
            body: None,
            enabled: true,
            aabb,
            node: Self::ROOT.0,
        })
    }

    /// Adds a static geom to the given node
    pub fn add_geom_in(
        &mut self,
        space: SpaceId,
        shape: Shape,
        pose: Transform,
    ) -> Result<GeomHandle> {
        if space.0 >= self.nodes.len() {
            return Err(PhysicsError::InvalidReference(format!(
                "space node #{} not found",
                space.0
            )));
        }
        let aabb = shape.world_bounds(&pose);
        Ok(self.geoms.add(Geom {
            shape,
            pose,
            body: None,
            enabled: true,
            aabb,
            node: space.0,
        }))
    }

    /// Makes a geom follow a rigid body's pose
    pub fn attach_body(&mut self, geom: GeomHandle, body: BodyHandle) -> Result<()> {
        let g = self.geoms.get_mut_or_err(geom)?;
        if !g.shape.is_placeable() {
            return Err(PhysicsError::InvalidParameter(
                "planes are static and cannot follow a body".to_string(),
            ));
        }
        g.body = Some(body);
        Ok(())
    }

    /// Returns a geom by handle
    pub fn geom(&self, handle: GeomHandle) -> Result<&Geom> {
        self.geoms.get_or_err(handle)
    }

    /// Sets the pose of a static geom
    pub fn set_pose(&mut self, handle: GeomHandle, pose: Transform) -> Result<()> {
        if !pose.is_finite() {
            return Err(PhysicsError::InvalidParameter(
                "non-finite geom pose".to_string(),
            ));
        }
        let g = self.geoms.get_mut_or_err(handle)?;
        g.pose = pose;
        g.aabb = g.shape.world_bounds(&pose);
        Ok(())
    }

    /// Enables or disables a geom
    pub fn set_enabled(&mut self, handle: GeomHandle, enabled: bool) -> Result<()> {
        self.geoms.get_mut_or_err(handle)?.enabled = enabled;
        Ok(())
    }

    /// Removes a geom from the space
    pub fn remove_geom(&mut self, handle: GeomHandle) -> Option<Geom> {
        self.geoms.remove(handle)
    }

    /// Returns the number of geoms in the space
    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    /// Returns whether the space has no geoms
    pub fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }

    /// Returns an iterator over all geoms in handle order
    pub fn iter(&self) -> impl Iterator<Item = (GeomHandle, &Geom)> {
        self.geoms.iter()
    }

    /// Copies body poses onto attached geoms and refreshes cached bounds.
    ///
    /// Fails with an invalid-reference error if a geom follows a body
    /// that has been removed from the world.
    pub fn update(&mut self, world: &World) -> Result<()> {
        for (_, geom) in self.geoms.iter_mut() {
            if let Some(body) = geom.body {
                geom.pose = world.body(body)?.transform();
            }
            geom.aabb = geom.shape.world_bounds(&geom.pose);
        }
        Ok(())
    }

    /// Produces candidate pairs whose bounds overlap.
    ///
    /// Each pair appears once, ordered so the lower handle comes first,
    /// and the sequence is sorted ascending.
    pub fn collide(&self) -> Vec<(GeomHandle, GeomHandle)> {
        let mut pairs = Vec::new();
        self.collide_node(0, &mut pairs);
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    fn direct_members(&self, node: usize) -> Vec<GeomHandle> {
        self.geoms
            .iter()
            .filter(|(_, g)| g.enabled && g.node == node)
            .map(|(h, _)| h)
            .collect()
    }

    fn subtree_members(&self, node: usize, out: &mut Vec<GeomHandle>) {
        out.extend(self.direct_members(node));
        for &child in &self.nodes[node].children {
            self.subtree_members(child, out);
        }
    }

    fn collide_node(&self, node: usize, out: &mut Vec<(GeomHandle, GeomHandle)>) {
        let direct = self.direct_members(node);
        match self.nodes[node].kind {
            SpaceKind::Simple => self.simple_pairs(&direct, out),
            SpaceKind::Hash { cell_size } => self.hash_pairs(&direct, cell_size, out),
        }

        let children = &self.nodes[node].children;
        for (i, &child) in children.iter().enumerate() {
            let mut child_set = Vec::new();
            self.subtree_members(child, &mut child_set);

            self.cross_pairs(&direct, &child_set, out);
            for &sibling in &children[i + 1..] {
                let mut sibling_set = Vec::new();
                self.subtree_members(sibling, &mut sibling_set);
                self.cross_pairs(&child_set, &sibling_set, out);
            }

            self.collide_node(child, out);
        }
    }

    fn emit(&self, a: GeomHandle, b: GeomHandle, out: &mut Vec<(GeomHandle, GeomHandle)>) {
        let (Some(ga), Some(gb)) = (self.geoms.get(a), self.geoms.get(b)) else {
            return;
        };
        if ga.aabb.intersects(&gb.aabb) {
            out.push(if a < b { (a, b) } else { (b, a) });
        }
    }

    fn simple_pairs(&self, members: &[GeomHandle], out: &mut Vec<(GeomHandle, GeomHandle)>) {
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                self.emit(a, b, out);
            }
        }
    }

    fn cross_pairs(
        &self,
        left: &[GeomHandle],
        right: &[GeomHandle],
        out: &mut Vec<(GeomHandle, GeomHandle)>,
    ) {
        for &a in left {
            for &b in right {
                self.emit(a, b, out);
            }
        }
    }

    fn hash_pairs(
        &self,
        members: &[GeomHandle],
        cell_size: f32,
        out: &mut Vec<(GeomHandle, GeomHandle)>,
    ) {
        // Unbounded geoms (planes) cannot be hashed into cells; they are
        // tested against every other member instead.
        let mut large = Vec::new();
        let mut bounded = Vec::new();
        let mut cells: HashMap<(i64, i64, i64), Vec<GeomHandle>> = HashMap::new();

        let cell_of = |v: f32| (v / cell_size).floor() as i64;

        for &handle in members {
            let Some(geom) = self.geoms.get(handle) else {
                continue;
            };
            let aabb = geom.aabb;
            if !aabb.is_bounded() {
                large.push(handle);
                continue;
            }
            bounded.push(handle);
            let (x0, y0, z0) = (cell_of(aabb.min.x), cell_of(aabb.min.y), cell_of(aabb.min.z));
            let (x1, y1, z1) = (cell_of(aabb.max.x), cell_of(aabb.max.y), cell_of(aabb.max.z));
            for x in x0..=x1 {
                for y in y0..=y1 {
                    for z in z0..=z1 {
                        cells.entry((x, y, z)).or_default().push(handle);
                    }
                }
            }
        }

        // Duplicates from shared cells are removed by the caller's final
        // sort and dedup pass.
        for bucket in cells.values() {
            for (i, &a) in bucket.iter().enumerate() {
                for &b in &bucket[i + 1..] {
                    self.emit(a, b, out);
                }
            }
        }

        for (i, &a) in large.iter().enumerate() {
            for &b in &large[i + 1..] {
                self.emit(a, b, out);
            }
        }
        for &a in &large {
            for &b in &bounded {
                self.emit(a, b, out);
            }
        }
    }
}
