//! The sketching session: one explicit context object that owns the scene,
//! the camera and the stroke in progress, driven by input events.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info, warn};

use crate::config::SketchConfig;
use crate::error::{Result, SketchError, StrokeformError};
use crate::export::{export_scene, ExportFormat, ExportSink};
use crate::math::Matrix4;
use crate::operations::query::{AttachmentValidator, SurfaceHitResolver};
use crate::operations::shaping::{BuildBase, BuildMode, BuildPatch};
use crate::sampling::{
    InputEvent, NullTrace, ScreenPoint, StrokeInput, StrokeSampler, StrokeTrace, SurfaceSample,
};
use crate::scene::{Color, SceneModel, Solid, SolidId, SolidRole};
use crate::view::{OrbitCamera, Placement, PlacementState, ViewportRect};

/// What pointer input does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionMode {
    /// Pointer input draws strokes.
    #[default]
    Draw,
    /// Pointer input orbits the camera.
    Orbit,
}

impl InteractionMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Draw => Self::Orbit,
            Self::Orbit => Self::Draw,
        }
    }
}

/// Where the stroke state machine is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// A stroke is collecting samples.
    Sampling,
    /// The finished stroke is being turned into a solid.
    Committing,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    InsufficientSamples,
    OffModelStart,
    NoAttachment,
    EmptyExport,
    ExportFailed(String),
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::InsufficientSamples => "Stroke too short to build a shape.".to_string(),
            Self::OffModelStart => "Additions must start on the model.".to_string(),
            Self::NoAttachment => "Additions must touch the model.".to_string(),
            Self::EmptyExport => "Nothing to export yet.".to_string(),
            Self::ExportFailed(reason) => format!("Export failed: {reason}"),
        }
    }

    /// Blocking notices need acknowledgement; the rest fade on their own.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::EmptyExport | Self::ExportFailed(_))
    }
}

impl From<&SketchError> for Notice {
    fn from(err: &SketchError) -> Self {
        match err {
            SketchError::InsufficientSamples { .. } => Self::InsufficientSamples,
            SketchError::OffModelStart => Self::OffModelStart,
            SketchError::NoAttachment => Self::NoAttachment,
            SketchError::EmptyExport => Self::EmptyExport,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Result of one input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeOutcome {
    /// Nothing was committed.
    Ignored,
    /// A stroke is in progress.
    Sampling,
    BaseCreated(SolidId),
    PatchAdded(SolidId),
    /// The stroke was discarded; the scene is unchanged.
    Rejected(SketchError),
}

/// Which pipeline the current stroke feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrokeKind {
    /// First stroke on an empty scene.
    Base,
    /// A stroke over existing solids. `pinned` is the solid under the first
    /// sample, if any.
    Surface { pinned: Option<SolidId> },
}

/// Owns everything a sketch needs and turns input into solids.
pub struct SketchSession {
    config: SketchConfig,
    scene: SceneModel,
    camera: OrbitCamera,
    placement: Placement,

    phase: SessionPhase,
    mode: InteractionMode,
    build_mode: BuildMode,
    color: Color,

    screen: StrokeSampler<ScreenPoint>,
    surface: StrokeSampler<SurfaceSample>,
    stroke: Option<StrokeKind>,
    orbit_anchor: Option<ScreenPoint>,

    trace: Box<dyn StrokeTrace>,
    notices: VecDeque<Notice>,
}

impl SketchSession {
    #[must_use]
    pub fn new(config: SketchConfig, viewport: ViewportRect) -> Self {
        Self {
            scene: SceneModel::new(),
            camera: OrbitCamera::new(&config.camera, viewport),
            placement: Placement::new(config.placement),
            phase: SessionPhase::Idle,
            mode: InteractionMode::Draw,
            build_mode: BuildMode::default(),
            color: config.default_color,
            screen: StrokeSampler::new(config.sampling.screen_min_distance),
            surface: StrokeSampler::new(config.sampling.surface_min_distance),
            stroke: None,
            orbit_anchor: None,
            trace: Box::new(NullTrace),
            notices: VecDeque::new(),
            config,
        }
    }

    /// Replaces the sink that mirrors the raw stroke path.
    #[must_use]
    pub fn with_trace(mut self, trace: impl StrokeTrace + 'static) -> Self {
        self.trace = Box::new(trace);
        self
    }

    // ── Accessors ──

    #[must_use]
    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    #[must_use]
    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    #[must_use]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn build_mode(&self) -> BuildMode {
        self.build_mode
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn placement_state(&self) -> PlacementState {
        self.placement.state()
    }

    /// Screen samples of the stroke in progress.
    #[must_use]
    pub fn stroke_path(&self) -> &[ScreenPoint] {
        self.screen.samples()
    }

    // ── Settings ──

    /// Switches between drawing and orbiting. Any stroke in progress is
    /// dropped.
    pub fn toggle_mode(&mut self) -> InteractionMode {
        self.abandon_stroke();
        self.orbit_anchor = None;
        self.mode = self.mode.toggled();
        debug!(mode = ?self.mode, "interaction mode");
        self.mode
    }

    pub fn toggle_build_mode(&mut self) -> BuildMode {
        self.build_mode = self.build_mode.toggled();
        debug!(mode = ?self.build_mode, "build mode");
        self.build_mode
    }

    /// Sets the color of solids created from now on.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Parses and sets the color of solids created from now on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColor`](crate::error::ConfigError::InvalidColor)
    /// if `hex` is not a color; the current color is kept.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<()> {
        self.color = Color::from_hex(hex)?;
        Ok(())
    }

    pub fn set_viewport(&mut self, rect: ViewportRect) {
        self.camera.set_viewport(rect);
    }

    // ── Input ──

    /// Feeds one raw input event.
    pub fn handle_input(&mut self, event: &InputEvent) -> StrokeOutcome {
        match event.normalize() {
            Some(StrokeInput::Begin(p)) => self.pointer_down(p),
            Some(StrokeInput::Extend(p)) => self.pointer_move(p),
            Some(StrokeInput::End) => self.pointer_up(),
            None => StrokeOutcome::Ignored,
        }
    }

    /// Starts a stroke, or an orbit drag in orbit mode.
    pub fn pointer_down(&mut self, at: ScreenPoint) -> StrokeOutcome {
        if self.mode == InteractionMode::Orbit {
            self.orbit_anchor = Some(at);
            return StrokeOutcome::Ignored;
        }
        if self.phase != SessionPhase::Idle {
            self.abandon_stroke();
        }

        self.screen.begin(at);
        self.trace.redraw(self.screen.samples());

        let kind = if self.scene.is_empty() {
            StrokeKind::Base
        } else {
            let hit = SurfaceHitResolver::new(&self.camera, at, None).execute(&self.scene);
            if let Some(hit) = hit {
                self.surface.begin(hit.sample());
            }
            StrokeKind::Surface {
                pinned: hit.map(|h| h.solid),
            }
        };
        debug!(kind = ?kind, "stroke started");
        self.stroke = Some(kind);
        self.phase = SessionPhase::Sampling;
        StrokeOutcome::Sampling
    }

    /// Extends the stroke, or orbits the camera in orbit mode.
    pub fn pointer_move(&mut self, at: ScreenPoint) -> StrokeOutcome {
        if self.mode == InteractionMode::Orbit {
            if let Some(anchor) = self.orbit_anchor.replace(at) {
                self.camera.rotate(at.x - anchor.x, at.y - anchor.y);
            }
            return StrokeOutcome::Ignored;
        }
        let Some(kind) = self.stroke.filter(|_| self.phase == SessionPhase::Sampling) else {
            return StrokeOutcome::Ignored;
        };

        if self.screen.extend(at) {
            self.trace.redraw(self.screen.samples());
        }
        if let StrokeKind::Surface { pinned: Some(pinned) } = kind {
            let resolver = SurfaceHitResolver::new(&self.camera, at, Some(pinned));
            if let Some(hit) = resolver.execute(&self.scene) {
                self.surface.extend(hit.sample());
            }
        }
        StrokeOutcome::Sampling
    }

    /// Ends the stroke and commits it.
    pub fn pointer_up(&mut self) -> StrokeOutcome {
        if self.mode == InteractionMode::Orbit {
            self.orbit_anchor = None;
            return StrokeOutcome::Ignored;
        }
        let Some(kind) = self.stroke.take().filter(|_| self.phase == SessionPhase::Sampling) else {
            return StrokeOutcome::Ignored;
        };

        self.phase = SessionPhase::Committing;
        let screen = self.screen.end();
        let surface = self.surface.end();
        self.trace.clear();

        let committed = match kind {
            StrokeKind::Base => self.commit_base(&screen),
            StrokeKind::Surface { pinned: None } => Err(SketchError::OffModelStart.into()),
            StrokeKind::Surface { pinned: Some(_) } => self.commit_patch(&surface),
        };
        self.phase = SessionPhase::Idle;

        match committed {
            Ok(outcome) => outcome,
            Err(err) => self.reject(err, screen.len()),
        }
    }

    /// Queues an orbit zoom. Only effective in orbit mode.
    pub fn zoom(&mut self, steps: f64) {
        if self.mode == InteractionMode::Orbit {
            self.camera.zoom(steps);
        }
    }

    /// Advances camera damping by one frame. Returns `true` if it moved.
    pub fn tick(&mut self) -> bool {
        self.camera.tick()
    }

    // ── Scene actions ──

    /// Removes the most recently added solid. Emptying the scene makes the
    /// next stroke a base stroke again.
    pub fn undo(&mut self) -> Option<Solid> {
        self.abandon_stroke();
        let removed = self.scene.undo();
        if self.scene.is_empty() {
            self.placement.reset();
        }
        removed
    }

    /// Removes every solid and resets placement.
    pub fn clear(&mut self) -> usize {
        self.abandon_stroke();
        self.placement.reset();
        self.scene.clear()
    }

    /// Re-centers the camera on the base solid. Returns `false` when there
    /// is no base.
    pub fn reframe(&mut self) -> bool {
        let base = self.scene.base();
        let Some(bounds) = base.and_then(|id| self.scene.bounding_volume(id).ok()) else {
            return false;
        };
        let framed = self.placement.frame(&mut self.camera, &bounds);
        info!(framed, "reframe");
        framed
    }

    /// Hands the scene to an export collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::EmptyExport`] for an empty scene, or the
    /// sink's error. Either way a blocking notice is queued.
    pub fn export(&mut self, format: ExportFormat, sink: &mut dyn ExportSink) -> Result<()> {
        export_scene(&self.scene, format, sink).inspect_err(|err| {
            let notice = match err.as_sketch() {
                Some(sketch) => Notice::from(sketch),
                None => Notice::ExportFailed(err.to_string()),
            };
            self.notices.push_back(notice);
        })
    }

    /// Takes every queued notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // ── Commit ──

    fn commit_base(&mut self, points: &[ScreenPoint]) -> Result<StrokeOutcome> {
        let mesh = BuildBase::new(
            points,
            self.build_mode,
            self.config.base_extrude,
            self.config.lathe,
        )
        .execute()?;
        let local_bounds = mesh.bounding_box();
        let transform = self.placement.floor_transform(&local_bounds);
        let world_bounds = local_bounds.transformed(&transform);
        let id = self
            .scene
            .add_solid(Solid::new(mesh, self.color, transform, SolidRole::Base))?;
        self.placement.place_base(&mut self.camera, &world_bounds);
        info!(points = points.len(), mode = ?self.build_mode, "base created");
        Ok(StrokeOutcome::BaseCreated(id))
    }

    fn commit_patch(&mut self, samples: &[SurfaceSample]) -> Result<StrokeOutcome> {
        let patch = BuildPatch::new(samples, self.config.patch).execute()?;
        let bounds = patch.mesh.bounding_box();
        AttachmentValidator::new(&bounds, self.config.attachment.epsilon).execute(&self.scene)?;
        let id = self.scene.add_solid(Solid::new(
            patch.mesh,
            self.color,
            Matrix4::identity(),
            SolidRole::Patch,
        ))?;
        info!(samples = samples.len(), normal = ?patch.normal.source, "patch added");
        Ok(StrokeOutcome::PatchAdded(id))
    }

    /// Turns a failed commit into a rejection with a notice. Geometry that
    /// cannot be built counts as too few usable samples.
    fn reject(&mut self, err: StrokeformError, found: usize) -> StrokeOutcome {
        let reason = match err {
            StrokeformError::Sketch(sketch) => sketch,
            other => {
                warn!(error = %other, "stroke geometry failed");
                SketchError::InsufficientSamples { found, required: 3 }
            }
        };
        warn!(reason = %reason, "stroke rejected");
        self.notices.push_back(Notice::from(&reason));
        StrokeOutcome::Rejected(reason)
    }

    fn abandon_stroke(&mut self) {
        if self.stroke.take().is_some() {
            debug!("stroke abandoned");
        }
        self.screen.end();
        self.surface.end();
        self.trace.clear();
        self.phase = SessionPhase::Idle;
    }
}

impl Default for SketchSession {
    fn default() -> Self {
        Self::new(SketchConfig::default(), ViewportRect::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sampling::PointerPhase;

    fn pt(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    fn draw(session: &mut SketchSession, points: &[ScreenPoint]) -> StrokeOutcome {
        session.pointer_down(points[0]);
        for p in &points[1..] {
            session.pointer_move(*p);
        }
        session.pointer_up()
    }

    fn triangle() -> Vec<ScreenPoint> {
        vec![pt(300.0, 400.0), pt(500.0, 400.0), pt(400.0, 200.0)]
    }

    /// Records every trace call.
    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Option<usize>>>>);

    impl StrokeTrace for Recorder {
        fn redraw(&mut self, path: &[ScreenPoint]) {
            self.0.borrow_mut().push(Some(path.len()));
        }

        fn clear(&mut self) {
            self.0.borrow_mut().push(None);
        }
    }

    // ── Base strokes ──

    #[test]
    fn first_stroke_builds_the_base() {
        let mut session = SketchSession::default();
        let outcome = draw(&mut session, &triangle());
        assert!(matches!(outcome, StrokeOutcome::BaseCreated(_)));
        assert_eq!(session.scene().len(), 1);
        assert_eq!(session.placement_state(), PlacementState::Placed);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn short_stroke_is_rejected_with_notice() {
        let mut session = SketchSession::default();
        let outcome = draw(&mut session, &[pt(10.0, 10.0), pt(50.0, 50.0)]);
        assert_eq!(
            outcome,
            StrokeOutcome::Rejected(SketchError::InsufficientSamples { found: 2, required: 3 })
        );
        assert!(session.scene().is_empty());
        assert_eq!(session.drain_notices(), [Notice::InsufficientSamples]);
        assert!(session.drain_notices().is_empty());
    }

    #[test]
    fn jitter_below_two_pixels_is_dropped() {
        let mut session = SketchSession::default();
        session.pointer_down(pt(0.0, 0.0));
        session.pointer_move(pt(1.0, 1.0));
        session.pointer_move(pt(1.5, 0.0));
        session.pointer_move(pt(10.0, 0.0));
        assert_eq!(session.stroke_path().len(), 2);
    }

    #[test]
    fn lathe_mode_builds_a_lathe_base() {
        let mut session = SketchSession::default();
        assert_eq!(session.toggle_build_mode(), BuildMode::Lathe);
        let outcome = draw(&mut session, &triangle());
        let StrokeOutcome::BaseCreated(id) = outcome else {
            panic!("expected a base, got {outcome:?}");
        };
        // 64 segments per ring plus two cap centers.
        let solid = session.scene().solid(id).unwrap();
        assert_eq!(solid.mesh.vertices.len(), 3 * 64 + 2);
    }

    #[test]
    fn color_applies_to_new_solids() {
        let mut session = SketchSession::default();
        assert_eq!(session.color(), Color::rgb(0x4d, 0x74, 0x71));
        session.set_color_hex("#2196f3").unwrap();
        assert!(session.set_color_hex("blue").is_err());
        let StrokeOutcome::BaseCreated(id) = draw(&mut session, &triangle()) else {
            panic!("expected a base");
        };
        assert_eq!(session.scene().solid(id).unwrap().color, Color::rgb(0x21, 0x96, 0xf3));
    }

    // ── Modes ──

    #[test]
    fn orbit_mode_routes_pointer_to_camera() {
        let mut session = SketchSession::default();
        assert_eq!(session.toggle_mode(), InteractionMode::Orbit);
        let before = session.camera().position();
        assert_eq!(draw(&mut session, &triangle()), StrokeOutcome::Ignored);
        assert!(session.scene().is_empty());
        while session.tick() {}
        assert!((session.camera().position() - before).norm() > 1e-3);
    }

    #[test]
    fn zoom_is_ignored_while_drawing() {
        let mut session = SketchSession::default();
        let before = session.camera().distance();
        session.zoom(3.0);
        session.tick();
        assert_eq!(session.camera().distance(), before);
        session.toggle_mode();
        session.zoom(3.0);
        session.tick();
        assert!(session.camera().distance() < before);
    }

    #[test]
    fn toggling_mode_drops_the_stroke() {
        let mut session = SketchSession::default();
        session.pointer_down(pt(10.0, 10.0));
        session.pointer_move(pt(40.0, 10.0));
        session.toggle_mode();
        session.toggle_mode();
        assert_eq!(session.pointer_up(), StrokeOutcome::Ignored);
        assert!(session.stroke_path().is_empty());
    }

    // ── Input and trace ──

    #[test]
    fn touch_events_drive_strokes() {
        let mut session = SketchSession::default();
        let path = triangle();
        session.handle_input(&InputEvent::TouchStart { touches: vec![path[0]] });
        session.handle_input(&InputEvent::TouchMove { touches: vec![path[1], pt(0.0, 0.0)] });
        session.handle_input(&InputEvent::Pointer {
            phase: PointerPhase::Move,
            position: path[2],
        });
        let outcome = session.handle_input(&InputEvent::TouchEnd);
        assert!(matches!(outcome, StrokeOutcome::BaseCreated(_)));
    }

    #[test]
    fn trace_mirrors_kept_samples_and_clears() {
        let recorder = Recorder::default();
        let mut session = SketchSession::default().with_trace(recorder.clone());
        session.pointer_down(pt(0.0, 0.0));
        session.pointer_move(pt(0.5, 0.0));
        session.pointer_move(pt(10.0, 0.0));
        session.pointer_up();
        assert_eq!(*recorder.0.borrow(), [Some(1), Some(2), None]);
    }

    // ── Scene actions ──

    #[test]
    fn undo_and_clear_reset_placement() {
        let mut session = SketchSession::default();
        draw(&mut session, &triangle());
        assert!(session.undo().is_some());
        assert_eq!(session.placement_state(), PlacementState::Unplaced);
        assert!(session.undo().is_none());

        draw(&mut session, &triangle());
        assert_eq!(session.clear(), 1);
        assert_eq!(session.placement_state(), PlacementState::Unplaced);
    }

    #[test]
    fn reframe_without_base_does_nothing() {
        let mut session = SketchSession::default();
        let before = session.camera().position();
        assert!(!session.reframe());
        assert_eq!(session.camera().position(), before);
    }

    #[test]
    fn empty_export_queues_a_blocking_notice() {
        struct Never;
        impl ExportSink for Never {
            fn write(
                &mut self,
                _: ExportFormat,
                _: &str,
                _: &[crate::export::ExportItem],
            ) -> std::result::Result<(), crate::error::ExportError> {
                unreachable!("empty scenes are not exported")
            }
        }

        let mut session = SketchSession::default();
        assert!(session.export(ExportFormat::Glb, &mut Never).is_err());
        let notices = session.drain_notices();
        assert_eq!(notices, [Notice::EmptyExport]);
        assert!(notices[0].is_blocking());
        assert_eq!(notices[0].to_string(), "Nothing to export yet.");
    }
}
