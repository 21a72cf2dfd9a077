//! Render entrypoints and game sessions
//!
//! One-shot visualizers draw straight into a caller's buffer. Games become
//! sessions that own their display buffer, the game state and a `FrameLoop`
//! over whatever frame primitive the host provides. A missing target is a
//! silent no-op.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::catalog::MaterialProfile;
use crate::consts;
use crate::controls::{NavKey, PuzzleKind, Signal, SignalQueue};
use crate::error::Result;
use crate::geometry::{EulerRotation, ShapeKind};
use crate::renderer::{
    DeflectionView, InterferenceView, OrbitDiagramParams, OrbitView, PixelBuffer,
    render_cross_section, render_lidar, render_orbit_diagram,
};
use crate::settings::Settings;
use crate::sim::{
    ClickResult, DeflectionGame, FrameHost, FrameLoop, InterferenceGame, MirrorControl, OrbitGame,
    OrbitPhase, TickControl,
};

/// Layout RNG seeded from the OS
fn session_rng() -> Pcg32 {
    Pcg32::from_rng(&mut rand::rng())
}

/// Point cloud for one object; returns points drawn
pub fn init_lidar(
    target: Option<&mut PixelBuffer>,
    object_id: &str,
    rx: f32,
    ry: f32,
    rz: f32,
    shape: &str,
) -> Option<usize> {
    let Some(buf) = target else {
        log::debug!("LIDAR target missing for {}", object_id);
        return None;
    };
    let kind = ShapeKind::from_name(shape);
    Some(render_lidar(buf, kind, &EulerRotation::new(rx, ry, rz)))
}

/// Slice through an object at depth `slice`; returns inside cells
pub fn init_cross_section(
    target: Option<&mut PixelBuffer>,
    shape: &str,
    slice: f32,
    attributes: &MaterialProfile,
) -> Option<usize> {
    let Some(buf) = target else {
        log::debug!("Cross-section target missing");
        return None;
    };
    let kind = ShapeKind::from_name(shape);
    Some(render_cross_section(buf, kind, slice, attributes, &mut rand::rng()))
}

pub fn init_orbit_diagram(target: Option<&mut PixelBuffer>, params: &OrbitDiagramParams) -> Option<()> {
    let Some(buf) = target else {
        log::debug!("Orbit diagram target missing");
        return None;
    };
    render_orbit_diagram(buf, params);
    Some(())
}

pub fn init_orbit_game<H: FrameHost>(
    target: Option<PixelBuffer>,
    host: H,
    settings: &Settings,
) -> Option<OrbitSession<H>> {
    let Some(frame) = target else {
        log::debug!("Orbit game target missing");
        return None;
    };
    Some(OrbitSession::new(frame, host, settings, session_rng()))
}

pub fn init_deflection_game<H: FrameHost>(
    target: Option<PixelBuffer>,
    host: H,
    settings: &Settings,
) -> Option<Result<DeflectionSession<H>>> {
    let Some(frame) = target else {
        log::debug!("Deflection game target missing");
        return None;
    };
    Some(DeflectionSession::new(
        frame,
        host,
        settings,
        session_rng(),
        MirrorControl::PositionOnly,
    ))
}

pub fn init_wave_game<H: FrameHost>(
    target: Option<PixelBuffer>,
    host: H,
    settings: &Settings,
) -> Option<InterferenceSession<H>> {
    let Some(frame) = target else {
        log::debug!("Wave game target missing");
        return None;
    };
    Some(InterferenceSession::new(frame, host, settings, session_rng()))
}

/// Emits `PuzzleSolved` the first time a puzzle reports completion
#[derive(Debug, Default)]
struct SolveLatch {
    solved: bool,
}

impl SolveLatch {
    fn update(&mut self, complete: bool, puzzle: PuzzleKind, signals: &mut SignalQueue) {
        if complete && !self.solved {
            self.solved = true;
            log::info!("Puzzle solved: {:?}", puzzle);
            signals.push(Signal::PuzzleSolved { puzzle });
        }
    }

    fn clear(&mut self) {
        self.solved = false;
    }
}

/// Orbit insertion game bound to a display buffer and frame host
#[derive(Debug)]
pub struct OrbitSession<H: FrameHost> {
    game: OrbitGame,
    view: OrbitView,
    frame: PixelBuffer,
    frames: FrameLoop<H>,
    show_grid: bool,
    latch: SolveLatch,
    signals: SignalQueue,
}

impl<H: FrameHost> OrbitSession<H> {
    pub fn new(frame: PixelBuffer, host: H, settings: &Settings, rng: Pcg32) -> Self {
        let resolution = settings
            .quality
            .scaled_width(consts::orbit::LOW_RES_WIDTH);
        let mut session = Self {
            game: OrbitGame::with_rng(rng),
            view: OrbitView::new(resolution),
            frame,
            frames: FrameLoop::new(host),
            show_grid: settings.show_grid,
            latch: SolveLatch::default(),
            signals: SignalQueue::new(),
        };
        session.render();
        log::info!("Orbit session started ({}px scene)", resolution);
        session
    }

    pub fn game(&self) -> &OrbitGame {
        &self.game
    }

    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn frames(&self) -> &FrameLoop<H> {
        &self.frames
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        self.signals.drain()
    }

    pub fn render(&mut self) {
        self.view.render(&self.game, &mut self.frame, self.show_grid);
    }

    /// Stop any flight and start over on a new layout
    pub fn reset(&mut self) {
        self.frames.cancel();
        self.game.reset();
        self.latch.clear();
        self.render();
    }

    pub fn current_state(&self) -> OrbitPhase {
        self.game.phase
    }

    pub fn is_success(&self) -> bool {
        self.game.is_success()
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        if self.game.pointer_moved(pos) {
            self.render();
        }
    }

    pub fn click(&mut self, pos: Vec2) {
        match self.game.click(pos) {
            ClickResult::Ignored => return,
            ClickResult::Launched => self.frames.schedule(),
            ClickResult::Reset => {
                self.frames.cancel();
                self.latch.clear();
            }
            ClickResult::StartedAiming => {}
        }
        self.render();
    }

    /// Host callback for a fired frame
    pub fn on_frame(&mut self, now_ms: f64) -> TickControl {
        let control = self.frames.on_frame(&mut self.game, now_ms);
        self.latch
            .update(self.game.is_success(), PuzzleKind::Orbit, &mut self.signals);
        self.render();
        control
    }
}

/// Ray deflection puzzle bound to a display buffer and frame host
#[derive(Debug)]
pub struct DeflectionSession<H: FrameHost> {
    game: DeflectionGame,
    view: DeflectionView,
    frame: PixelBuffer,
    frames: FrameLoop<H>,
    show_grid: bool,
    latch: SolveLatch,
    signals: SignalQueue,
}

impl<H: FrameHost> DeflectionSession<H> {
    pub fn new(
        frame: PixelBuffer,
        host: H,
        settings: &Settings,
        rng: Pcg32,
        control: MirrorControl,
    ) -> Result<Self> {
        let game = DeflectionGame::with_rng(rng, settings.generation_attempts(), control)?;
        let resolution = settings
            .quality
            .scaled_width(consts::deflection::LOW_RES_WIDTH);
        let mut session = Self {
            game,
            view: DeflectionView::new(resolution),
            frame,
            frames: FrameLoop::new(host),
            show_grid: settings.show_grid,
            latch: SolveLatch::default(),
            signals: SignalQueue::new(),
        };
        session.render();
        log::info!(
            "Deflection session ready with {} rays",
            session.game.level.rays.len()
        );
        Ok(session)
    }

    pub fn game(&self) -> &DeflectionGame {
        &self.game
    }

    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn frames(&self) -> &FrameLoop<H> {
        &self.frames
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        self.signals.drain()
    }

    /// Begin the hold-progress animation once the host can deliver frames
    pub fn start(&mut self) {
        if !self.game.is_complete() {
            self.frames.schedule();
        }
    }

    pub fn render(&mut self) {
        self.view.render(&self.game, &mut self.frame, self.show_grid);
    }

    /// New puzzle; on error the previous puzzle stays playable
    pub fn reset(&mut self) -> Result<()> {
        self.frames.cancel();
        let result = self.game.reset();
        if result.is_ok() {
            self.latch.clear();
        }
        self.render();
        self.frames.schedule();
        result.map_err(Into::into)
    }

    pub fn is_complete(&self) -> bool {
        self.game.is_complete()
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        if self.game.is_complete() {
            return;
        }
        self.game.pointer_moved(pos);
        self.render();
    }

    /// Left/right rotate a rotatable mirror; true if handled
    pub fn key_pressed(&mut self, key: &str) -> bool {
        let steps = match key {
            "a" | "A" => -1,
            "d" | "D" => 1,
            _ => match NavKey::from_key(key) {
                Some(NavKey::ArrowLeft) => -1,
                Some(NavKey::ArrowRight) => 1,
                _ => return false,
            },
        };
        let rotated = self.game.rotate(steps);
        if rotated {
            self.render();
        }
        rotated
    }

    pub fn on_frame(&mut self, now_ms: f64) -> TickControl {
        let control = self.frames.on_frame(&mut self.game, now_ms);
        self.latch
            .update(self.game.is_complete(), PuzzleKind::Deflection, &mut self.signals);
        self.render();
        control
    }
}

/// Wave interference puzzle bound to a display buffer and frame host
#[derive(Debug)]
pub struct InterferenceSession<H: FrameHost> {
    game: InterferenceGame,
    view: InterferenceView,
    frame: PixelBuffer,
    frames: FrameLoop<H>,
    show_grid: bool,
    latch: SolveLatch,
    signals: SignalQueue,
}

impl<H: FrameHost> InterferenceSession<H> {
    pub fn new(frame: PixelBuffer, host: H, settings: &Settings, rng: Pcg32) -> Self {
        use consts::interference::{LOW_RES_HEIGHT, LOW_RES_WIDTH};
        let width = settings.quality.scaled_width(LOW_RES_WIDTH);
        let height = (width * LOW_RES_HEIGHT / LOW_RES_WIDTH).max(1);
        let mut session = Self {
            game: InterferenceGame::with_rng(rng),
            view: InterferenceView::new(width, height),
            frame,
            frames: FrameLoop::new(host),
            show_grid: settings.show_grid,
            latch: SolveLatch::default(),
            signals: SignalQueue::new(),
        };
        session.render();
        log::info!(
            "Wave session started, target amplitude {:.2}",
            session.game.level.target_amplitude
        );
        session
    }

    pub fn game(&self) -> &InterferenceGame {
        &self.game
    }

    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn frames(&self) -> &FrameLoop<H> {
        &self.frames
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        self.signals.drain()
    }

    pub fn render(&mut self) {
        self.view.render(&self.game, &mut self.frame, self.show_grid);
    }

    pub fn reset(&mut self) {
        self.frames.cancel();
        self.game.reset();
        self.latch.clear();
        self.render();
    }

    pub fn is_complete(&self) -> bool {
        self.game.is_complete()
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        if self.game.pointer_down(pos).is_some() {
            self.pointer_moved(pos);
        }
    }

    /// Drag a slider; a winning move starts the completion countdown
    pub fn pointer_moved(&mut self, pos: Vec2) {
        if self.game.pointer_moved(pos) {
            if self.game.won {
                self.frames.schedule();
            }
            self.render();
        }
    }

    pub fn pointer_up(&mut self) {
        self.game.pointer_up();
    }

    pub fn on_frame(&mut self, now_ms: f64) -> TickControl {
        let control = self.frames.on_frame(&mut self.game, now_ms);
        self.latch.update(
            self.game.is_complete(),
            PuzzleKind::Interference,
            &mut self.signals,
        );
        self.render();
        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::tests::CountingHost;

    fn settings() -> Settings {
        Settings::default()
    }

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    fn orbit_session() -> OrbitSession<CountingHost> {
        let frame = PixelBuffer::new(consts::orbit::CANVAS_WIDTH, consts::orbit::CANVAS_HEIGHT);
        OrbitSession::new(frame, CountingHost::default(), &settings(), rng(5))
    }

    #[test]
    fn test_missing_target_is_noop() {
        assert_eq!(init_lidar(None, "obj", 0.0, 0.0, 0.0, "sphere"), None);
        assert_eq!(
            init_cross_section(None, "sphere", 0.0, &MaterialProfile::default()),
            None
        );
        assert_eq!(init_orbit_diagram(None, &OrbitDiagramParams::default()), None);
        assert!(init_orbit_game(None, CountingHost::default(), &settings()).is_none());
        assert!(init_deflection_game(None, CountingHost::default(), &settings()).is_none());
        assert!(init_wave_game(None, CountingHost::default(), &settings()).is_none());
    }

    #[test]
    fn test_visualizers_draw() {
        let mut buf = PixelBuffer::new(400, 400);
        let points = init_lidar(Some(&mut buf), "obj", 20.0, 30.0, 0.0, "satellite");
        assert!(points.is_some_and(|n| n > 0));
        let cells = init_cross_section(Some(&mut buf), "mystery", 0.0, &MaterialProfile::default());
        assert!(cells.is_some_and(|n| n > 0));
        assert_eq!(
            init_orbit_diagram(Some(&mut buf), &OrbitDiagramParams::default()),
            Some(())
        );
    }

    #[test]
    fn test_orbit_launch_schedules_and_reset_cancels() {
        let mut session = orbit_session();
        assert_eq!(session.current_state(), OrbitPhase::Idle);
        assert!(!session.frames().is_pending());

        session.click(Vec2::ZERO);
        assert_eq!(session.current_state(), OrbitPhase::Aiming);
        assert!(!session.frames().is_pending());

        let start = session.game().level.probe_start;
        session.pointer_moved(start + Vec2::new(0.0, 60.0));
        session.click(start + Vec2::new(0.0, 60.0));
        assert_eq!(session.current_state(), OrbitPhase::Launching);
        assert!(session.frames().is_pending());

        session.reset();
        assert!(!session.frames().is_pending());
        assert_eq!(session.frames().host().cancelled.len(), 1);
        assert_eq!(session.current_state(), OrbitPhase::Idle);
    }

    #[test]
    fn test_orbit_flight_runs_until_terminal() {
        let mut session = orbit_session();
        let start = session.game().level.probe_start;
        session.click(Vec2::ZERO);
        session.click(start + Vec2::new(0.0, 60.0));

        let mut now = 0.0;
        let mut frames = 0;
        while session.frames().is_pending() && frames < 10_000 {
            now += 16.0;
            session.on_frame(now);
            frames += 1;
        }
        assert!(!session.frames().is_pending());
        assert!(matches!(
            session.current_state(),
            OrbitPhase::Orbiting | OrbitPhase::Failed
        ));
        let solved = session
            .drain_signals()
            .iter()
            .filter(|s| matches!(s, Signal::PuzzleSolved { .. }))
            .count();
        assert_eq!(solved, usize::from(session.is_success()));
    }

    #[test]
    fn test_deflection_signals_once() {
        let frame = PixelBuffer::new(640, 480);
        let mut session = DeflectionSession::new(
            frame,
            CountingHost::default(),
            &settings(),
            rng(8),
            MirrorControl::PositionOnly,
        )
        .unwrap();
        assert!(!session.frames().is_pending());
        session.start();
        assert!(session.frames().is_pending());

        let target = session.game().level.solution.mirror_pos;
        session.pointer_moved(target);
        assert!(session.game().hits >= 1);

        let mut now = 0.0;
        while session.frames().is_pending() {
            now += 50.0;
            session.on_frame(now);
        }
        assert!(session.is_complete());
        let signals = session.drain_signals();
        assert_eq!(
            signals,
            vec![Signal::PuzzleSolved {
                puzzle: PuzzleKind::Deflection
            }]
        );

        session.on_frame(now + 16.0);
        assert!(session.drain_signals().is_empty());

        session.reset().unwrap();
        assert!(!session.is_complete());
        assert!(session.frames().is_pending());
    }

    #[test]
    fn test_deflection_keys_need_rotatable_mirror() {
        let frame = PixelBuffer::new(640, 480);
        let mut locked = DeflectionSession::new(
            frame.clone(),
            CountingHost::default(),
            &settings(),
            rng(2),
            MirrorControl::PositionOnly,
        )
        .unwrap();
        assert!(!locked.key_pressed("d"));

        let mut free = DeflectionSession::new(
            frame,
            CountingHost::default(),
            &settings(),
            rng(2),
            MirrorControl::Rotatable,
        )
        .unwrap();
        let before = free.game().mirror.angle;
        assert!(free.key_pressed("ArrowRight"));
        assert!((free.game().mirror.angle - before).abs() > 1e-3);
        assert!(!free.key_pressed("Enter"));
    }

    #[test]
    fn test_wave_win_starts_countdown() {
        let frame = PixelBuffer::new(640, 400);
        let mut session =
            InterferenceSession::new(frame, CountingHost::default(), &settings(), rng(3));
        assert!(!session.frames().is_pending());

        let solution = session.game().level.solution_offsets;
        let track = session.game().track;
        let row_height = 100.0 / consts::interference::WAVE_COUNT as f32;
        for (i, offset) in solution.iter().enumerate() {
            let y = 300.0 + row_height * (i as f32 + 0.5);
            let x = track.x_for(*offset);
            session.pointer_down(Vec2::new(x, y));
            session.pointer_up();
        }
        // Pixel snapping may leave the peak just short; set exactly
        if !session.game().won {
            for (i, offset) in solution.iter().enumerate() {
                session.game.set_offset(i, *offset);
            }
            session.frames.schedule();
        }
        assert!(session.game().won);
        assert!(session.frames().is_pending());

        let mut now = 0.0;
        while session.frames().is_pending() {
            now += 100.0;
            session.on_frame(now);
        }
        assert!(session.is_complete());
        assert_eq!(session.drain_signals().len(), 1);

        session.reset();
        assert!(!session.is_complete());
    }
}
