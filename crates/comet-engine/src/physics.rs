//! rapier2d physics integration.
//!
//! The [`PhysicsWorld`] owns a rapier2d simulation and is stored in the ECS
//! [`World`] as a resource, so that the [`Body`] lifecycle hooks can create
//! associations and release rigid bodies without any global state.
//!
//! rapier works in its own distance unit. Everything on this module's public
//! API is in world units and is converted with a single multiplicative
//! `simulation_scale`: world → physics multiplies, physics → world divides.
//! Rotations are unit-less and pass through unchanged.
//!
//! # Determinism
//!
//! rapier2d is compiled with `enhanced-determinism`. Collision pairs returned
//! by [`PhysicsWorld::step`] are sorted by entity id so their order does not
//! depend on rapier's internal event delivery.

use comet_ecs::entity::EntityId;
use comet_ecs::world::World;
use comet_ecs::EcsError;
use rapier2d::prelude::*;
use tracing::{debug, warn};

use crate::components::{Transform, Vec2};
use crate::EngineError;

/// World units → physics units factor used when none is configured.
pub const DEFAULT_SIMULATION_SCALE: f32 = 0.1;

// ---------------------------------------------------------------------------
// Body description
// ---------------------------------------------------------------------------

/// Opaque handle to a rigid body owned by a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Physics body type. Determines how rapier treats the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PhysicsBodyType {
    /// Fully simulated by physics.
    Dynamic,
    /// Moved only by the velocity game logic gives it; pushes dynamic bodies.
    Kinematic,
    /// Immovable.
    Static,
}

/// Collider shape, in world units.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ColliderShape {
    /// Box with half-extents.
    Box {
        /// Half-width along the body's local x-axis.
        half_width: f32,
        /// Half-height along the body's local y-axis.
        half_height: f32,
    },
    /// Circle with radius.
    Circle {
        /// Radius of the circle.
        radius: f32,
    },
}

/// Everything needed to create a rigid body and its single collider.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BodyDef {
    pub body_type: PhysicsBodyType,
    /// Initial position in world units.
    pub position: Vec2,
    /// Initial rotation in radians.
    pub rotation: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub collider: ColliderShape,
    pub density: f32,
    pub friction: f32,
    /// Coefficient of restitution (bounciness). 0.0 = no bounce, 1.0 = perfect bounce.
    pub restitution: f32,
    /// Detects overlaps but produces no contact response.
    pub is_sensor: bool,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: PhysicsBodyType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            collider: ColliderShape::Circle { radius: 1.0 },
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            is_sensor: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Manages rapier2d simulation state.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    /// Gravity in physics units.
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    simulation_scale: f32,
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.rigid_body_set.len())
            .field("simulation_scale", &self.simulation_scale)
            .finish()
    }
}

impl PhysicsWorld {
    /// Create a physics world with `gravity` given in world units per second².
    pub fn new(gravity: Vec2, simulation_scale: f32) -> Result<Self, EngineError> {
        check_scale(simulation_scale)?;
        Ok(Self::with_valid_scale(gravity, simulation_scale))
    }

    /// Zero gravity (top-down space) with the default simulation scale.
    pub fn new_zero_gravity() -> Self {
        Self::with_valid_scale(Vec2::ZERO, DEFAULT_SIMULATION_SCALE)
    }

    /// `simulation_scale` must already have passed `check_scale`.
    fn with_valid_scale(gravity: Vec2, simulation_scale: f32) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![
                gravity.x * simulation_scale,
                gravity.y * simulation_scale
            ],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            simulation_scale,
        }
    }

    // -- units --------------------------------------------------------------

    pub fn simulation_scale(&self) -> f32 {
        self.simulation_scale
    }

    /// Change the world → physics factor.
    ///
    /// Collider sizes are baked at creation, so this should be set before any
    /// body exists. Gravity is rescaled to keep its world-unit value.
    pub fn set_simulation_scale(&mut self, scale: f32) -> Result<(), EngineError> {
        check_scale(scale)?;
        if self.rigid_body_set.len() > 0 {
            warn!(
                bodies = self.rigid_body_set.len(),
                "simulation scale changed with live bodies; their colliders keep the old size"
            );
        }
        self.gravity *= scale / self.simulation_scale;
        self.simulation_scale = scale;
        Ok(())
    }

    /// World units → physics units.
    #[inline]
    pub fn to_physics(&self, v: Vec2) -> Vector<Real> {
        vector![v.x * self.simulation_scale, v.y * self.simulation_scale]
    }

    /// Physics units → world units.
    #[inline]
    pub fn to_world(&self, v: &Vector<Real>) -> Vec2 {
        Vec2::new(v.x / self.simulation_scale, v.y / self.simulation_scale)
    }

    /// Gravity in world units per second².
    pub fn gravity(&self) -> Vec2 {
        self.to_world(&self.gravity)
    }

    // -- bodies -------------------------------------------------------------

    /// Create a rigid body with one collider from `def`.
    ///
    /// The body is not associated with any entity until
    /// [`bind_entity`](Self::bind_entity) is called, which the [`Body`]
    /// on-create hook does.
    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let builder = match def.body_type {
            PhysicsBodyType::Dynamic => RigidBodyBuilder::dynamic(),
            PhysicsBodyType::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
            PhysicsBodyType::Static => RigidBodyBuilder::fixed(),
        };
        let rb = builder
            .translation(self.to_physics(def.position))
            .rotation(def.rotation)
            .linear_damping(def.linear_damping)
            .angular_damping(def.angular_damping)
            .user_data(EntityId::NULL.to_raw() as u128)
            .build();
        let body_handle = self.rigid_body_set.insert(rb);

        let s = self.simulation_scale;
        let shape = match def.collider {
            ColliderShape::Box {
                half_width,
                half_height,
            } => SharedShape::cuboid(half_width * s, half_height * s),
            ColliderShape::Circle { radius } => SharedShape::ball(radius * s),
        };
        let collider = ColliderBuilder::new(shape)
            .density(def.density)
            .friction(def.friction)
            .restitution(def.restitution)
            .sensor(def.is_sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        debug!(?body_handle, body_type = ?def.body_type, "created rigid body");
        BodyHandle(body_handle)
    }

    /// Remove a body and its colliders. Returns `false` if it did not exist.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        let removed = self.rigid_body_set.remove(
            handle.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        if removed.is_some() {
            debug!(body_handle = ?handle.0, "destroyed rigid body");
        }
        removed.is_some()
    }

    /// Record `entity` as the owner of `handle`, so collisions can name it.
    pub fn bind_entity(&mut self, handle: BodyHandle, entity: EntityId) -> Result<(), EngineError> {
        self.body_mut(handle)?.user_data = entity.to_raw() as u128;
        Ok(())
    }

    /// The entity bound to `handle`, or [`EntityId::NULL`].
    pub fn entity_of(&self, handle: BodyHandle) -> Result<EntityId, EngineError> {
        Ok(EntityId::from_raw(self.body(handle)?.user_data as u64))
    }

    pub fn has_body(&self, handle: BodyHandle) -> bool {
        self.rigid_body_set.contains(handle.0)
    }

    /// Number of live rigid bodies.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    // -- pose and velocity (world units) ------------------------------------

    /// Current pose as a world-space transform.
    pub fn pose(&self, handle: BodyHandle) -> Result<Transform, EngineError> {
        let rb = self.body(handle)?;
        Ok(Transform::new(
            self.to_world(rb.translation()),
            rb.rotation().angle(),
        ))
    }

    /// Teleport the body to a world-space transform.
    pub fn set_pose(&mut self, handle: BodyHandle, transform: &Transform) -> Result<(), EngineError> {
        let translation = self.to_physics(transform.position);
        let rb = self.body_mut(handle)?;
        rb.set_position(Isometry::new(translation, transform.rotation), true);
        Ok(())
    }

    /// Unit vector the body faces, `(sin θ, cos θ)`.
    pub fn forward_vector(&self, handle: BodyHandle) -> Result<Vec2, EngineError> {
        Ok(Vec2::from_angle(self.body(handle)?.rotation().angle()))
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec2, EngineError> {
        Ok(self.to_world(self.body(handle)?.linvel()))
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), EngineError> {
        let linvel = self.to_physics(velocity);
        self.body_mut(handle)?.set_linvel(linvel, true);
        Ok(())
    }

    /// Radians per second.
    pub fn angular_velocity(&self, handle: BodyHandle) -> Result<f32, EngineError> {
        Ok(self.body(handle)?.angvel())
    }

    pub fn set_angular_velocity(&mut self, handle: BodyHandle, angvel: f32) -> Result<(), EngineError> {
        self.body_mut(handle)?.set_angvel(angvel, true);
        Ok(())
    }

    fn body(&self, handle: BodyHandle) -> Result<&RigidBody, EngineError> {
        self.rigid_body_set
            .get(handle.0)
            .ok_or(EngineError::UnknownBody { handle })
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, EngineError> {
        self.rigid_body_set
            .get_mut(handle.0)
            .ok_or(EngineError::UnknownBody { handle })
    }

    // -- simulation ---------------------------------------------------------

    /// Step the physics simulation by `dt` seconds.
    ///
    /// Returns the collision pairs that started during the step, limited to
    /// bodies bound to an entity. A non-positive `dt` leaves the simulation
    /// untouched.
    pub fn step(&mut self, dt: f32) -> Vec<CollisionPair> {
        if dt <= 0.0 || !dt.is_finite() {
            return Vec::new();
        }
        self.integration_params.dt = dt;

        let (collision_send, collision_recv) =
            rapier2d::crossbeam::channel::unbounded::<CollisionEvent>();
        let (force_send, _force_recv) =
            rapier2d::crossbeam::channel::unbounded::<ContactForceEvent>();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        let mut collisions = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _flags) = event {
                if let (Some(a), Some(b)) = (self.collider_entity(h1), self.collider_entity(h2)) {
                    collisions.push(CollisionPair {
                        entity_a: a,
                        entity_b: b,
                    });
                }
            }
        }

        collisions.sort_by_key(|c| {
            let a = c.entity_a.to_raw();
            let b = c.entity_b.to_raw();
            (a.min(b), a.max(b))
        });
        collisions
    }

    fn collider_entity(&self, collider: ColliderHandle) -> Option<EntityId> {
        let parent = self.collider_set.get(collider)?.parent()?;
        let entity = EntityId::from_raw(self.rigid_body_set.get(parent)?.user_data as u64);
        (!entity.is_null()).then_some(entity)
    }
}

fn check_scale(scale: f32) -> Result<(), EngineError> {
    if scale > 0.0 && scale.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "simulation_scale must be positive and finite, got {scale}"
        )))
    }
}

// ---------------------------------------------------------------------------
// CollisionPair
// ---------------------------------------------------------------------------

/// A collision between two entities detected by the physics engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
}

impl CollisionPair {
    pub fn involves(&self, entity: EntityId) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }
}

// ---------------------------------------------------------------------------
// Body component
// ---------------------------------------------------------------------------

/// Associates an entity with a rigid body in the [`PhysicsWorld`] resource.
///
/// The physics world owns the rigid body; this component owns the
/// association. The handle stays valid from the moment the component is added
/// until its on-destroy hook releases the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Owner, bound by [`Body::on_create`].
    pub entity: EntityId,
    handle: BodyHandle,
}

impl Body {
    /// Wrap a handle returned by [`PhysicsWorld::create_body`].
    pub fn new(handle: BodyHandle) -> Self {
        Self {
            entity: EntityId::NULL,
            handle,
        }
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn forward_vector(&self, physics: &PhysicsWorld) -> Result<Vec2, EngineError> {
        physics.forward_vector(self.handle)
    }

    pub fn linear_velocity(&self, physics: &PhysicsWorld) -> Result<Vec2, EngineError> {
        physics.linear_velocity(self.handle)
    }

    pub fn set_linear_velocity(&self, physics: &mut PhysicsWorld, velocity: Vec2) -> Result<(), EngineError> {
        physics.set_linear_velocity(self.handle, velocity)
    }

    pub fn set_angular_velocity(&self, physics: &mut PhysicsWorld, angvel: f32) -> Result<(), EngineError> {
        physics.set_angular_velocity(self.handle, angvel)
    }

    /// On-create hook: record the owner here and on the rigid body.
    pub fn on_create(world: &mut World, entity: EntityId) -> Result<(), EcsError> {
        let body = world.get_component_mut::<Body>(entity)?;
        body.entity = entity;
        let handle = body.handle;
        let physics = world.resource_mut::<PhysicsWorld>()?;
        physics
            .bind_entity(handle, entity)
            .map_err(|_| EcsError::NotFound {
                entity,
                component: format!("rigid body {:?}", handle.0),
            })
    }

    /// On-destroy hook: release the rigid body while the handle is still held.
    pub fn on_destroy(world: &mut World, entity: EntityId) -> Result<(), EcsError> {
        let handle = world.get_component::<Body>(entity)?.handle;
        if !world.resource_mut::<PhysicsWorld>()?.destroy_body(handle) {
            warn!(%entity, body_handle = ?handle.0, "body handle was already released");
        }
        Ok(())
    }
}

/// Create a rigid body from `def` and attach it to `entity` as a [`Body`].
///
/// If the component cannot be attached, the freshly created rigid body is
/// destroyed again so no body is left without an owner.
pub fn attach_body(world: &mut World, entity: EntityId, def: &BodyDef) -> Result<BodyHandle, EngineError> {
    let handle = world.resource_mut::<PhysicsWorld>()?.create_body(def);
    let attached = world.add_component(entity, Body::new(handle)).map(|_| ());
    if let Err(e) = attached {
        world.resource_mut::<PhysicsWorld>()?.destroy_body(handle);
        return Err(e.into());
    }
    Ok(handle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(body_type: PhysicsBodyType, position: Vec2) -> BodyDef {
        BodyDef {
            body_type,
            position,
            collider: ColliderShape::Circle { radius: 5.0 },
            restitution: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn physics_world_creates_with_zero_gravity() {
        let pw = PhysicsWorld::new_zero_gravity();
        assert_eq!(pw.body_count(), 0);
        assert_eq!(pw.gravity(), Vec2::ZERO);
        assert_eq!(pw.simulation_scale(), DEFAULT_SIMULATION_SCALE);
        assert!(check_scale(DEFAULT_SIMULATION_SCALE).is_ok());
    }

    #[test]
    fn zero_gravity_matches_checked_constructor() {
        let quick = PhysicsWorld::new_zero_gravity();
        let checked = PhysicsWorld::new(Vec2::ZERO, DEFAULT_SIMULATION_SCALE).unwrap();
        assert_eq!(quick.gravity(), checked.gravity());
        assert_eq!(quick.simulation_scale(), checked.simulation_scale());
    }

    #[test]
    fn invalid_scale_is_rejected() {
        assert!(PhysicsWorld::new(Vec2::ZERO, 0.0).is_err());
        assert!(PhysicsWorld::new(Vec2::ZERO, f32::NAN).is_err());
        let mut pw = PhysicsWorld::new_zero_gravity();
        assert!(pw.set_simulation_scale(-1.0).is_err());
        assert_eq!(pw.simulation_scale(), DEFAULT_SIMULATION_SCALE);
    }

    #[test]
    fn gravity_is_reported_in_world_units() {
        let mut pw = PhysicsWorld::new(Vec2::new(0.0, -100.0), 0.1).unwrap();
        assert!(pw.gravity().approx_eq(Vec2::new(0.0, -100.0), 1e-4));
        pw.set_simulation_scale(0.5).unwrap();
        assert!(pw.gravity().approx_eq(Vec2::new(0.0, -100.0), 1e-4));
    }

    #[test]
    fn unit_conversion_round_trip() {
        let pw = PhysicsWorld::new(Vec2::ZERO, 0.1).unwrap();
        let p = Vec2::new(-130.0, 110.0);
        let physics = pw.to_physics(p);
        assert!((physics.x + 13.0).abs() < 1e-5);
        assert!((physics.y - 11.0).abs() < 1e-5);
        assert!(pw.to_world(&physics).approx_eq(p, 1e-4));
    }

    #[test]
    fn create_and_destroy_body() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let h = pw.create_body(&circle(PhysicsBodyType::Dynamic, Vec2::ZERO));
        assert!(pw.has_body(h));
        assert_eq!(pw.body_count(), 1);
        assert!(pw.destroy_body(h));
        assert!(!pw.has_body(h));
        assert!(!pw.destroy_body(h), "second destroy is a no-op");
        assert!(matches!(pw.pose(h), Err(EngineError::UnknownBody { .. })));
    }

    #[test]
    fn created_body_reports_initial_pose_in_world_units() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let mut def = circle(PhysicsBodyType::Static, Vec2::new(100.0, 80.0));
        def.rotation = 0.5;
        let h = pw.create_body(&def);
        let pose = pw.pose(h).unwrap();
        assert!(pose.position.approx_eq(Vec2::new(100.0, 80.0), 1e-3));
        assert!((pose.rotation - 0.5).abs() < 1e-5);
    }

    #[test]
    fn new_body_is_unbound_until_bound() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let h = pw.create_body(&circle(PhysicsBodyType::Dynamic, Vec2::ZERO));
        assert!(pw.entity_of(h).unwrap().is_null());
        let e = EntityId::new(3, 1);
        pw.bind_entity(h, e).unwrap();
        assert_eq!(pw.entity_of(h).unwrap(), e);
    }

    #[test]
    fn set_pose_then_read_back() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let h = pw.create_body(&circle(PhysicsBodyType::Kinematic, Vec2::ZERO));
        let t = Transform::new(Vec2::new(12.5, -40.0), 1.25);
        pw.set_pose(h, &t).unwrap();
        let back = pw.pose(h).unwrap();
        assert!(back.position.approx_eq(t.position, 1e-3));
        assert!((back.rotation - t.rotation).abs() < 1e-5);
    }

    #[test]
    fn velocity_is_scaled_both_ways() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let h = pw.create_body(&circle(PhysicsBodyType::Kinematic, Vec2::ZERO));
        pw.set_linear_velocity(h, Vec2::new(0.0, 30.0)).unwrap();
        assert!(pw.linear_velocity(h).unwrap().approx_eq(Vec2::new(0.0, 30.0), 1e-4));
        pw.set_angular_velocity(h, 3.0).unwrap();
        assert_eq!(pw.angular_velocity(h).unwrap(), 3.0);
    }

    #[test]
    fn kinematic_body_moves_by_its_velocity() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let h = pw.create_body(&circle(PhysicsBodyType::Kinematic, Vec2::ZERO));
        pw.set_linear_velocity(h, Vec2::new(60.0, 0.0)).unwrap();
        pw.step(1.0 / 60.0);
        let pose = pw.pose(h).unwrap();
        assert!((pose.position.x - 1.0).abs() < 1e-3, "got x={}", pose.position.x);
    }

    #[test]
    fn zero_dt_step_is_a_no_op() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let h = pw.create_body(&circle(PhysicsBodyType::Kinematic, Vec2::ZERO));
        pw.set_linear_velocity(h, Vec2::new(60.0, 0.0)).unwrap();
        assert!(pw.step(0.0).is_empty());
        assert_eq!(pw.pose(h).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn gravity_affects_dynamic_body() {
        let mut pw = PhysicsWorld::new(Vec2::new(0.0, -98.1), 0.1).unwrap();
        let h = pw.create_body(&circle(PhysicsBodyType::Dynamic, Vec2::new(0.0, 100.0)));
        for _ in 0..60 {
            pw.step(1.0 / 60.0);
        }
        let pose = pw.pose(h).unwrap();
        assert!(pose.position.y < 100.0, "body should fall, got y={}", pose.position.y);
        assert!(pw.linear_velocity(h).unwrap().y < 0.0);
    }

    #[test]
    fn two_bound_bodies_collide_produces_pair() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let ball = pw.create_body(&circle(PhysicsBodyType::Dynamic, Vec2::ZERO));
        pw.set_linear_velocity(ball, Vec2::new(1000.0, 0.0)).unwrap();
        let wall = pw.create_body(&BodyDef {
            body_type: PhysicsBodyType::Static,
            position: Vec2::new(20.0, 0.0),
            collider: ColliderShape::Box {
                half_width: 5.0,
                half_height: 100.0,
            },
            ..Default::default()
        });
        let (ball_e, wall_e) = (EntityId::new(0, 0), EntityId::new(1, 0));
        pw.bind_entity(ball, ball_e).unwrap();
        pw.bind_entity(wall, wall_e).unwrap();

        let mut all = Vec::new();
        for _ in 0..120 {
            all.extend(pw.step(1.0 / 60.0));
        }
        assert!(!all.is_empty(), "ball moving toward wall should collide");
        assert!(all[0].involves(ball_e) && all[0].involves(wall_e));
    }

    #[test]
    fn unbound_bodies_are_not_reported() {
        let mut pw = PhysicsWorld::new_zero_gravity();
        let ball = pw.create_body(&circle(PhysicsBodyType::Dynamic, Vec2::ZERO));
        pw.set_linear_velocity(ball, Vec2::new(1000.0, 0.0)).unwrap();
        pw.create_body(&circle(PhysicsBodyType::Static, Vec2::new(20.0, 0.0)));
        for _ in 0..120 {
            assert!(pw.step(1.0 / 60.0).is_empty());
        }
    }

    #[test]
    fn determinism_two_identical_runs() {
        fn run() -> Vec<(f32, f32)> {
            let mut pw = PhysicsWorld::new_zero_gravity();
            let h = pw.create_body(&circle(PhysicsBodyType::Dynamic, Vec2::ZERO));
            pw.set_linear_velocity(h, Vec2::new(50.0, 30.0)).unwrap();
            (0..100)
                .map(|_| {
                    pw.step(1.0 / 60.0);
                    let p = pw.pose(h).unwrap().position;
                    (p.x, p.y)
                })
                .collect()
        }
        assert_eq!(run(), run());
    }

    #[test]
    fn body_hooks_bind_and_release() {
        let mut world = World::new();
        world.register_component::<Body>("body");
        world.on_create_callback::<Body, _>(Body::on_create).unwrap();
        world.on_destroy_callback::<Body, _>(Body::on_destroy).unwrap();
        world.insert_resource(PhysicsWorld::new_zero_gravity());

        let e = world.spawn();
        let handle = attach_body(&mut world, e, &BodyDef::default()).unwrap();
        assert_eq!(world.get_component::<Body>(e).unwrap().entity, e);
        let physics = world.resource::<PhysicsWorld>().unwrap();
        assert_eq!(physics.entity_of(handle).unwrap(), e);

        world.remove_component::<Body>(e).unwrap();
        let physics = world.resource::<PhysicsWorld>().unwrap();
        assert!(!physics.has_body(handle));
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn attach_body_twice_releases_the_spare_body() {
        let mut world = World::new();
        world.register_component::<Body>("body");
        world.insert_resource(PhysicsWorld::new_zero_gravity());
        let e = world.spawn();
        attach_body(&mut world, e, &BodyDef::default()).unwrap();
        let err = attach_body(&mut world, e, &BodyDef::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Ecs(EcsError::DuplicateComponent { .. })
        ));
        assert_eq!(world.resource::<PhysicsWorld>().unwrap().body_count(), 1);
    }
}
