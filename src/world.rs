use std::{collections::HashMap, time::Instant};

use crate::{
    collision::{
        broadphase::BroadPhase,
        contact::ContactTracker,
        narrowphase::{NarrowPhase, Penetration},
        queries::{Raycast, RaycastHit, RaycastQuery},
        resolver::{CollidesWith, PenetrationResolver, ReboundData, Resolution},
    },
    config::CollisionConfig,
    core::{object::PhysicsObject, pair::IdPair, types::ObjectId},
    error::{CollisionError, Result},
    utils::{logging::ScopedTimer, profiling::StepProfile},
};

/// Per-tick collision pipeline.
///
/// Owns every scratch buffer and the contacts carried between ticks; the
/// objects themselves belong to the caller and are passed to [`step`] by
/// slice.
///
/// [`step`]: CollisionWorld::step
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    config: CollisionConfig,
    broadphase: BroadPhase,
    resolver: PenetrationResolver,
    contacts: ContactTracker,
    narrowphase: NarrowPhase,
    lookup: HashMap<ObjectId, usize>,
    profile: StepProfile,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::build(CollisionConfig::default())
    }

    pub fn with_config(config: CollisionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CollisionConfig) -> Self {
        Self {
            config,
            broadphase: BroadPhase::new(),
            resolver: PenetrationResolver::new(&config),
            contacts: ContactTracker::new(config.contact_gap()),
            narrowphase: NarrowPhase::new(&config),
            lookup: HashMap::new(),
            profile: StepProfile::default(),
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Runs one collision tick over `objects`, whose positions the caller has
    /// already advanced.
    ///
    /// Overlapping solid boxes are rolled back along their motion, contacts
    /// are refreshed against the final positions, and every object's
    /// previous-tick position is moved up to its current one. Ids must be
    /// unique within the slice.
    pub fn step(&mut self, objects: &mut [PhysicsObject]) -> Result<&Resolution> {
        let started = Instant::now();
        self.profile.reset();
        self.rebuild_lookup(objects)?;

        for object in objects.iter_mut() {
            object.refresh_motion_bounds();
        }

        let pairs = {
            let _timer = ScopedTimer::accumulate("broadphase", &mut self.profile.broad_phase_time);
            self.broadphase.update(objects)
        };
        let candidate_pairs = pairs.len();

        {
            let _timer = ScopedTimer::accumulate("resolve", &mut self.profile.resolve_time);
            self.resolver
                .resolve(pairs, objects, &self.lookup, &mut self.contacts);
        }

        {
            let _timer = ScopedTimer::accumulate("contacts", &mut self.profile.contact_time);
            self.contacts.update(objects, &self.lookup);
        }

        for object in objects.iter_mut() {
            object.commit_tick();
        }

        let resolution = self.resolver.output();
        self.profile.object_count = objects.len();
        self.profile.candidate_pairs = candidate_pairs;
        self.profile.contact_count = self.contacts.len();
        self.profile.iterations = resolution.iterations;
        self.profile.converged = resolution.converged;
        self.profile.total_time = started.elapsed();
        self.profile.report();

        Ok(resolution)
    }

    fn rebuild_lookup(&mut self, objects: &[PhysicsObject]) -> Result<()> {
        self.lookup.clear();
        for (index, object) in objects.iter().enumerate() {
            if self.lookup.insert(object.id(), index).is_some() {
                return Err(CollisionError::DuplicateObject(object.id()));
            }
        }
        Ok(())
    }

    /// Output of the last step.
    pub fn resolution(&self) -> &Resolution {
        self.resolver.output()
    }

    pub fn collides_with(&self) -> &CollidesWith {
        &self.resolver.output().collides_with
    }

    pub fn rebounds(&self) -> &HashMap<IdPair, ReboundData> {
        &self.resolver.output().rebounds
    }

    pub fn rebound(&self, a: ObjectId, b: ObjectId) -> Option<&ReboundData> {
        self.resolver.output().rebound(a, b)
    }

    pub fn contacts(&self) -> &ContactTracker {
        &self.contacts
    }

    pub fn profile(&self) -> &StepProfile {
        &self.profile
    }

    pub fn narrowphase(&self) -> &NarrowPhase {
        &self.narrowphase
    }

    /// Forgets every pair that references `id`.
    pub fn remove_object(&mut self, id: ObjectId) {
        self.contacts.remove_object(id);
        self.resolver.output_mut().remove_object(id);
    }

    /// Drops all carried contacts and the last step's output.
    pub fn reset(&mut self) {
        self.contacts.clear();
        self.resolver = PenetrationResolver::new(&self.config);
        self.profile.reset();
    }

    pub fn raycast(&self, query: &RaycastQuery, objects: &[PhysicsObject]) -> Vec<RaycastHit> {
        Raycast::cast(query, objects)
    }

    /// Exact shape test between two objects at their current positions.
    pub fn collide(&self, a: &PhysicsObject, b: &PhysicsObject) -> Option<Penetration> {
        self.narrowphase.collide(a, b)
    }
}
