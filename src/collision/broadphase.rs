use crate::core::{
    object::PhysicsObject,
    pair::canonical,
    types::{Aabb, ObjectId},
};

#[derive(Debug, Clone, Copy)]
struct Proxy {
    id: ObjectId,
    bounds: Aabb,
}

/// Sort-and-sweep broad phase over the objects' motion boxes.
///
/// Proxies are sorted on the x axis; each proxy is compared only against the
/// ones whose x interval starts before it ends. Pairs are canonical
/// (`a < b`), sorted and deduplicated, so the output does not depend on the
/// order of the input slice.
#[derive(Debug, Clone, Default)]
pub struct BroadPhase {
    proxies: Vec<Proxy>,
    pairs: Vec<(ObjectId, ObjectId)>,
}

impl BroadPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the candidate list. Scratch buffers are reused across calls.
    pub fn update(&mut self, objects: &[PhysicsObject]) -> &[(ObjectId, ObjectId)] {
        self.proxies.clear();
        self.pairs.clear();

        self.proxies.extend(objects.iter().map(|object| Proxy {
            id: object.id(),
            bounds: object.motion_aabb(),
        }));
        self.proxies.sort_by(|a, b| {
            a.bounds
                .min
                .x
                .total_cmp(&b.bounds.min.x)
                .then(a.id.cmp(&b.id))
        });

        for (i, a) in self.proxies.iter().enumerate() {
            for b in &self.proxies[i + 1..] {
                if b.bounds.min.x > a.bounds.max.x {
                    break;
                }
                if a.id == b.id {
                    continue;
                }
                if a.bounds.overlaps(&b.bounds) {
                    self.pairs.push(canonical(a.id, b.id));
                }
            }
        }

        self.pairs.sort_unstable();
        self.pairs.dedup();

        log::trace!(
            "broadphase: {} proxies -> {} candidate pairs",
            self.proxies.len(),
            self.pairs.len()
        );
        &self.pairs
    }

    /// Candidate pairs from the last [`BroadPhase::update`].
    pub fn pairs(&self) -> &[(ObjectId, ObjectId)] {
        &self.pairs
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }
}
