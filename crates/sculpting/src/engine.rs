//! Tick-driven sculpting session.
//!
//! [`SculptSession`] owns the mesh and every subsystem and advances
//! them one tick at a time on the host's render loop. A tick ingests at
//! most one tracking frame, routes each hand through the debounce and
//! its gesture state machine, applies at most one batched deformation,
//! and reports what happened so the host can render cursors and react
//! to commits.
//!
//! Gesture lifecycle per hand: `Idle` until a primary control point
//! appears, `Sculpting` while it drives the brush, then either straight
//! back to `Idle` with a history commit, or through `Settling` while
//! leftover grab momentum decays. Exactly one snapshot is pushed per
//! completed gesture.

use glam::{Vec2, Vec3};
use mesh::{MeshError, SculptMesh, TriangleOctree, VertexOctree};
use thiserror::Error;
use tracing::{debug, trace};

use airsculpt_scene::{OrbitCamera, OrbitController};
use tracking::{
    ControlPointSource, FrameRecord, HandDebounce, HandObservation, HandRecord, ModeSignal,
};

use crate::brush::{Brush, BrushKind, BrushSelector, RadiusTier};
use crate::config::SculptConfig;
use crate::deform::{
    accumulate_flatten, accumulate_grab, accumulate_inflate, accumulate_pinch, accumulate_smooth,
    DisplacementField, InfluencePoint,
};
use crate::history::{HistoryBuffer, Snapshot};
use crate::project::{PointKey, SurfaceProjector};
use crate::volume::{VolumeCorrection, VolumeTracker};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid base mesh: {0}")]
    InvalidBaseMesh(#[from] MeshError),
}

/// Something the host may want to react to (sound cue, UI flash, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A gesture finished and its pre-gesture state entered history.
    Committed,
    /// History popped; the mesh reverted one gesture.
    UndoApplied,
    BrushChanged(BrushKind),
    RadiusChanged(RadiusTier),
    /// The volume ratio left its band and was clamped back.
    VolumeCorrected { ratio: f32, corrected_to: f32 },
    /// The confirmatory done gesture was recognized.
    GestureComplete,
}

/// Where a driving control point ended up this tick, for cursor
/// rendering. `snapped` distinguishes a surface hit from the raw
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub hand: u8,
    pub slot: u8,
    pub position: Vec3,
    pub snapped: bool,
}

/// Everything one tick produced.
#[derive(Debug, Default)]
pub struct TickReport {
    pub events: Vec<EngineEvent>,
    pub markers: Vec<Marker>,
    /// Whether any vertex moved this tick.
    pub sculpted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GesturePhase {
    Idle,
    Sculpting,
    Settling,
}

/// Per-hand gesture state.
#[derive(Debug)]
struct HandState {
    debounce: HandDebounce,
    phase: GesturePhase,
    /// Raw primary position last tick; drives the motion gate.
    last_raw: Option<Vec3>,
    /// Projected primary position last tick; drives the grab delta.
    last_effective: Option<Vec3>,
    /// Vertex positions at gesture start, committed to history on release.
    baseline: Option<Vec<Vec3>>,
    /// Raw primary position when the orbit gesture began.
    orbit_origin: Option<Vec3>,
}

impl HandState {
    fn new(grace_ticks: u32) -> Self {
        Self {
            debounce: HandDebounce::new(grace_ticks),
            phase: GesturePhase::Idle,
            last_raw: None,
            last_effective: None,
            baseline: None,
            orbit_origin: None,
        }
    }
}

/// A live sculpting session over one fixed-topology mesh.
pub struct SculptSession {
    mesh: SculptMesh,
    config: SculptConfig,
    selector: BrushSelector,
    history: HistoryBuffer,
    volume: VolumeTracker,
    camera: OrbitCamera,
    orbit: OrbitController,
    projector: SurfaceProjector,
    field: DisplacementField,
    /// Per-vertex grab momentum, decayed while settling.
    velocities: Vec<Vec3>,
    hands: [HandState; 2],
    /// Rebuilt lazily after any vertex write.
    vertex_octree: Option<VertexOctree>,
    triangle_octree: Option<TriangleOctree>,
    /// Held ticks since the last undo pop, modulo the repeat cadence.
    undo_cooldown: u32,
    last_timestamp_ms: u64,
}

impl SculptSession {
    pub fn new(mesh: SculptMesh, config: SculptConfig) -> Self {
        let volume = VolumeTracker::begin_session(&mesh);
        let field = DisplacementField::new(mesh.vertex_count());
        let velocities = vec![Vec3::ZERO; mesh.vertex_count()];
        let history = HistoryBuffer::new(config.history_depth);
        let hands = [
            HandState::new(config.grace_ticks),
            HandState::new(config.grace_ticks),
        ];
        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "sculpting session started"
        );
        Self {
            mesh,
            config,
            selector: BrushSelector::default(),
            history,
            volume,
            camera: OrbitCamera::default(),
            orbit: OrbitController::default(),
            projector: SurfaceProjector::new(),
            field,
            velocities,
            hands,
            vertex_octree: None,
            triangle_octree: None,
            undo_cooldown: 0,
            last_timestamp_ms: 0,
        }
    }

    /// Build a session from raw geometry, validating it first.
    pub fn from_parts(
        positions: Vec<Vec3>,
        faces: Vec<[u32; 3]>,
        config: SculptConfig,
    ) -> Result<Self, SessionError> {
        Ok(Self::new(SculptMesh::from_parts(positions, faces)?, config))
    }

    pub fn mesh(&self) -> &SculptMesh {
        &self.mesh
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn config(&self) -> &SculptConfig {
        &self.config
    }

    /// Config is live: changes apply from the next tick.
    pub fn config_mut(&mut self) -> &mut SculptConfig {
        &mut self.config
    }

    /// The current selection resolved against the config.
    pub fn brush(&self) -> Brush {
        self.selector.resolve(&self.config)
    }

    /// Direct brush selection, for host-side keybinds.
    pub fn set_brush(&mut self, kind: BrushKind) {
        self.selector.kind = kind;
    }

    pub fn set_radius_tier(&mut self, tier: RadiusTier) {
        self.selector.tier = tier;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Volume relative to session start, `None` for a degenerate base.
    pub fn volume_ratio(&self) -> Option<f32> {
        self.volume.ratio(&self.mesh)
    }

    /// Pull the newest frame from a source and advance one tick.
    pub fn tick_from_source<S: ControlPointSource>(&mut self, source: &mut S) -> TickReport {
        self.tick(source.latest())
    }

    /// Advance the session by one tick, ingesting at most one frame.
    /// `None` means no frame arrived; the grace period decides whether
    /// that pauses or ends in-progress gestures.
    pub fn tick(&mut self, frame: Option<FrameRecord>) -> TickReport {
        let mut report = TickReport::default();
        if let Some(frame) = &frame {
            self.last_timestamp_ms = frame.timestamp_ms;
        }

        // Config fields are live; sync the stateful subsystems.
        self.history.set_depth(self.config.history_depth);
        self.orbit.smoothing = self.config.orbit_smoothing;
        self.orbit.sensitivity = self.config.orbit_sensitivity;

        let mut undo_held = false;
        for hand_index in 0..self.hands.len() {
            let record = frame.as_ref().and_then(|f| f.hands[hand_index].clone());
            self.hands[hand_index].debounce.set_grace_ticks(self.config.grace_ticks);

            // Detach the observation from the debounce borrow before
            // acting on the rest of the session.
            enum Step {
                Fresh(HandRecord),
                Hold,
                Drop,
            }
            let step = match self.hands[hand_index].debounce.observe(record.as_ref()) {
                HandObservation::Fresh(fresh) => Step::Fresh(fresh.clone()),
                HandObservation::Held(_) | HandObservation::Idle => Step::Hold,
                HandObservation::Dropped => Step::Drop,
            };

            match step {
                Step::Fresh(record) => {
                    self.handle_record(hand_index, &record, &mut report, &mut undo_held);
                }
                Step::Hold => {}
                Step::Drop => {
                    // A lost hand must not keep acting through momentum.
                    if self.hands[hand_index].phase == GesturePhase::Sculpting {
                        self.velocities.fill(Vec3::ZERO);
                    }
                    self.end_orbit(hand_index);
                    self.release_gesture(hand_index, &mut report);
                }
            }
        }

        self.settle_momentum(&mut report);

        if undo_held {
            let repeat = self.config.undo_repeat_ticks.max(1);
            if self.undo_cooldown == 0 {
                self.apply_undo(&mut report);
            }
            self.undo_cooldown = (self.undo_cooldown + 1) % repeat;
        } else {
            self.undo_cooldown = 0;
        }

        report
    }

    fn handle_record(
        &mut self,
        hand_index: usize,
        record: &HandRecord,
        report: &mut TickReport,
        undo_held: &mut bool,
    ) {
        if !record.active {
            self.end_orbit(hand_index);
            self.release_gesture(hand_index, report);
            return;
        }
        match record.mode {
            Some(ModeSignal::BrushCycle) => {
                let kind = self.selector.cycle_brush();
                if kind != BrushKind::Grab {
                    self.drop_stale_momentum();
                }
                debug!(?kind, "brush cycled");
                report.events.push(EngineEvent::BrushChanged(kind));
            }
            Some(ModeSignal::RadiusCycle) => {
                let tier = self.selector.cycle_radius();
                debug!(?tier, "radius tier cycled");
                report.events.push(EngineEvent::RadiusChanged(tier));
            }
            Some(ModeSignal::Undo) => *undo_held = true,
            Some(ModeSignal::CommitDone) => {
                self.release_gesture(hand_index, report);
                report.events.push(EngineEvent::GestureComplete);
            }
            Some(ModeSignal::Orbit) => self.orbit_tick(hand_index, record, report),
            Some(ModeSignal::Deform) | None => self.sculpt_tick(hand_index, record, report),
        }
    }

    /// One deformation tick for one hand.
    fn sculpt_tick(&mut self, hand_index: usize, record: &HandRecord, report: &mut TickReport) {
        self.end_orbit(hand_index);

        let Some(primary) = record.primary().copied() else {
            // The hand is tracked but nothing drives a gesture.
            self.release_gesture(hand_index, report);
            return;
        };

        if self.hands[hand_index].phase != GesturePhase::Sculpting {
            self.begin_gesture(hand_index, report);
        }

        let brush = self.selector.resolve(&self.config);
        if brush.kind != BrushKind::Grab {
            // Momentum recorded by an earlier grab stroke must not
            // survive a mid-gesture brush switch and replay at release.
            self.drop_stale_momentum();
        }

        self.ensure_octrees();
        let (Some(triangles), Some(vertices)) =
            (self.triangle_octree.as_ref(), self.vertex_octree.as_ref())
        else {
            return;
        };
        let mesh = &self.mesh;
        let camera_position = self.camera.position();
        let hysteresis = self.config.projection_hysteresis;

        let projected = self.projector.project(
            PointKey { hand: hand_index as u8, slot: primary.slot },
            camera_position,
            primary.position,
            mesh,
            triangles,
            hysteresis,
        );
        report.markers.push(Marker {
            hand: hand_index as u8,
            slot: primary.slot,
            position: projected.position,
            snapped: projected.snapped,
        });

        let mut anchors = Vec::new();
        for anchor in record.active_anchors() {
            let pinned = self.projector.project(
                PointKey { hand: hand_index as u8, slot: anchor.slot },
                camera_position,
                anchor.position,
                mesh,
                triangles,
                hysteresis,
            );
            report.markers.push(Marker {
                hand: hand_index as u8,
                slot: anchor.slot,
                position: pinned.position,
                snapped: pinned.snapped,
            });
            anchors.push(InfluencePoint {
                position: pinned.position,
                strength_scale: self.config.anchor_strength_multiplier,
            });
        }

        // Motion gate on the raw position: a held pose must not drift,
        // no matter what projection does as the surface moves.
        let moved = self.hands[hand_index]
            .last_raw
            .is_none_or(|previous| previous.distance(primary.position) >= self.config.motion_epsilon);

        let effective = projected.position;
        let delta = match self.hands[hand_index].last_effective {
            Some(previous) => effective - previous,
            None => Vec3::ZERO,
        };
        self.hands[hand_index].last_raw = Some(primary.position);
        self.hands[hand_index].last_effective = Some(effective);

        if !moved {
            return;
        }

        let falloff = self.config.falloff;
        let driver = InfluencePoint { position: effective, strength_scale: 1.0 };

        self.field.clear();
        let affected = vertices.query_sphere(effective, brush.radius);
        match brush.kind {
            BrushKind::Pinch => accumulate_pinch(
                mesh,
                &affected,
                std::slice::from_ref(&driver),
                brush.radius,
                brush.strength,
                falloff,
                &mut self.field,
            ),
            BrushKind::Grab => accumulate_grab(
                mesh,
                &affected,
                driver,
                delta * brush.strength,
                brush.radius,
                falloff,
                &mut self.field,
            ),
            BrushKind::Smooth => accumulate_smooth(
                mesh,
                &affected,
                driver,
                brush.radius,
                brush.strength,
                falloff,
                &mut self.field,
            ),
            BrushKind::Inflate => accumulate_inflate(
                mesh,
                &affected,
                driver,
                brush.radius,
                brush.strength,
                falloff,
                &mut self.field,
            ),
            BrushKind::Flatten => accumulate_flatten(
                mesh,
                &affected,
                driver,
                brush.radius,
                brush.strength,
                falloff,
                &mut self.field,
            ),
        }

        // Anchors pin regardless of the active brush: an extra
        // pinch-style pull toward each anchor, at anchor strength.
        for anchor in &anchors {
            let held = vertices.query_sphere(anchor.position, brush.radius);
            accumulate_pinch(
                mesh,
                &held,
                std::slice::from_ref(anchor),
                brush.radius,
                self.config.pinch_strength,
                falloff,
                &mut self.field,
            );
        }

        if self.field.is_empty() {
            return;
        }

        if brush.kind == BrushKind::Grab {
            // Momentum is this tick's grab displacement, nothing older.
            self.velocities.fill(Vec3::ZERO);
            for &index in self.field.touched() {
                self.velocities[index as usize] = self.field.offset(index);
            }
        }

        let moved_vertices = self.field.apply(&mut self.mesh);
        trace!(hand = hand_index, ?brush, moved_vertices, "deformation applied");
        self.after_deformation(report);
    }

    /// One orbit tick: the camera follows the hand, the mesh stays put.
    fn orbit_tick(&mut self, hand_index: usize, record: &HandRecord, report: &mut TickReport) {
        // Switching into orbit ends any sculpt gesture this hand drove.
        self.release_gesture(hand_index, report);

        let Some(primary) = record.primary().copied() else {
            self.end_orbit(hand_index);
            return;
        };

        let origin = match self.hands[hand_index].orbit_origin {
            Some(origin) => origin,
            None => {
                debug!(hand = hand_index, "orbit gesture started");
                self.orbit.begin(&self.camera);
                *self.hands[hand_index].orbit_origin.insert(primary.position)
            }
        };
        let delta = primary.position - origin;
        self.orbit.update(Vec2::new(delta.x, delta.y), &mut self.camera);
    }

    fn end_orbit(&mut self, hand_index: usize) {
        if self.hands[hand_index].orbit_origin.take().is_some() {
            self.orbit.end();
        }
    }

    fn begin_gesture(&mut self, hand_index: usize, report: &mut TickReport) {
        if self.hands[hand_index].phase == GesturePhase::Settling {
            // A new gesture preempts settling: flush leftover momentum
            // and commit the old gesture now.
            self.velocities.fill(Vec3::ZERO);
            self.commit(hand_index, report);
        }
        debug!(hand = hand_index, "gesture started");
        self.hands[hand_index].baseline = Some(self.mesh.positions().to_vec());
        self.hands[hand_index].phase = GesturePhase::Sculpting;
        self.hands[hand_index].last_raw = None;
        self.hands[hand_index].last_effective = None;
    }

    /// The primary point disappeared (or the mode changed): leave
    /// `Sculpting`, either settling momentum first or committing now.
    fn release_gesture(&mut self, hand_index: usize, report: &mut TickReport) {
        if self.hands[hand_index].phase != GesturePhase::Sculpting {
            return;
        }
        self.hands[hand_index].last_raw = None;
        self.hands[hand_index].last_effective = None;
        self.projector.forget_hand(hand_index as u8);

        if self.has_momentum() {
            debug!(hand = hand_index, "gesture released, momentum settling");
            self.hands[hand_index].phase = GesturePhase::Settling;
        } else {
            self.commit(hand_index, report);
        }
    }

    fn commit(&mut self, hand_index: usize, report: &mut TickReport) {
        self.hands[hand_index].phase = GesturePhase::Idle;
        let Some(positions) = self.hands[hand_index].baseline.take() else {
            return;
        };
        self.history.push(Snapshot { positions, timestamp_ms: self.last_timestamp_ms });
        debug!(
            hand = hand_index,
            history_len = self.history.len(),
            "gesture committed"
        );
        report.events.push(EngineEvent::Committed);
    }

    /// Zero grab momentum that nothing is entitled to anymore. A hand
    /// still settling owns the buffer and keeps it.
    fn drop_stale_momentum(&mut self) {
        if self.hands.iter().any(|h| h.phase == GesturePhase::Settling) {
            return;
        }
        self.velocities.fill(Vec3::ZERO);
    }

    fn has_momentum(&self) -> bool {
        self.velocities
            .iter()
            .any(|v| v.length() >= self.config.settle_epsilon)
    }

    /// Decay leftover grab momentum; commit settling hands once spent.
    fn settle_momentum(&mut self, report: &mut TickReport) {
        if !self.hands.iter().any(|h| h.phase == GesturePhase::Settling) {
            return;
        }

        let mut peak = 0.0f32;
        let mut any_moved = false;
        for (index, velocity) in self.velocities.iter_mut().enumerate() {
            if *velocity == Vec3::ZERO {
                continue;
            }
            let position = self.mesh.position(index as u32) + *velocity;
            self.mesh.set_position(index as u32, position);
            *velocity *= self.config.grab_damping;
            peak = peak.max(velocity.length());
            any_moved = true;
        }

        if any_moved {
            self.after_deformation(report);
        }

        if peak < self.config.settle_epsilon {
            trace!("momentum settled");
            self.velocities.fill(Vec3::ZERO);
            for hand_index in 0..self.hands.len() {
                if self.hands[hand_index].phase == GesturePhase::Settling {
                    self.commit(hand_index, report);
                }
            }
        }
    }

    /// Shared tail of every vertex write: normals, volume, spatial
    /// indices.
    fn after_deformation(&mut self, report: &mut TickReport) {
        self.mesh.recompute_normals();
        report.sculpted = true;
        if let VolumeCorrection::Corrected { ratio, corrected_to } = self.volume.correct(
            &mut self.mesh,
            self.config.volume_lower_bound,
            self.config.volume_upper_bound,
        ) {
            report.events.push(EngineEvent::VolumeCorrected { ratio, corrected_to });
        }
        self.invalidate_octrees();
    }

    fn apply_undo(&mut self, report: &mut TickReport) {
        let Some(snapshot) = self.history.pop() else {
            trace!("undo requested with empty history");
            return;
        };
        self.mesh.restore_positions(&snapshot.positions);
        self.mesh.recompute_normals();
        self.velocities.fill(Vec3::ZERO);
        self.projector.clear();
        self.invalidate_octrees();
        debug!(
            snapshot_timestamp_ms = snapshot.timestamp_ms,
            history_len = self.history.len(),
            "undo applied"
        );
        report.events.push(EngineEvent::UndoApplied);
    }

    fn ensure_octrees(&mut self) {
        if self.vertex_octree.is_none() {
            self.vertex_octree = Some(VertexOctree::from_mesh(&self.mesh));
        }
        if self.triangle_octree.is_none() {
            self.triangle_octree = Some(TriangleOctree::from_mesh(&self.mesh));
        }
    }

    fn invalidate_octrees(&mut self) {
        self.vertex_octree = None;
        self.triangle_octree = None;
    }
}
