//! Probe Deck entry point
//!
//! The browser build is driven through the library's wasm-bindgen exports.
//! Natively this renders every visualizer and a snapshot of each game to
//! binary PPM files.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::{Path, PathBuf};

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use probe_deck::api::{self, DeflectionSession, InterferenceSession, OrbitSession};
    use probe_deck::catalog::{Density, Habitability, MaterialProfile, Organics, Value};
    use probe_deck::consts;
    use probe_deck::controls::{ORB_SIZE, RotationOrb};
    use probe_deck::geometry::ShapeKind;
    use probe_deck::renderer::{OrbitDiagramParams, PixelBuffer};
    use probe_deck::sim::{FrameHost, MirrorControl};
    use probe_deck::{Result, Settings};

    /// Frame host for a plain loop: every request is granted
    #[derive(Debug, Default)]
    struct LoopHost {
        next: u32,
    }

    impl FrameHost for LoopHost {
        type Handle = u32;

        fn request_frame(&mut self) -> Option<u32> {
            self.next += 1;
            Some(self.next)
        }

        fn cancel_frame(&mut self, _handle: u32) {}
    }

    /// Simulated 60 Hz clock
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 20_000;

    fn write_ppm(dir: &Path, name: &str, buf: &PixelBuffer) -> Result<()> {
        let path = dir.join(format!("{}.ppm", name));
        fs::write(&path, buf.to_ppm())?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }

    fn visualizers(dir: &Path) -> Result<()> {
        let size = consts::lidar::CANVAS_SIZE;
        let profile = MaterialProfile {
            habitability: Habitability::HighPossibility,
            value: Value::Medium,
            density: Density::High,
            organics: Organics::Detected,
        };

        for kind in ShapeKind::ALL {
            let mut buf = PixelBuffer::new(size, size);
            api::init_lidar(Some(&mut buf), kind.as_str(), 20.0, 30.0, 0.0, kind.as_str());
            write_ppm(dir, &format!("lidar_{}", kind), &buf)?;

            let mut buf = PixelBuffer::new(size, size);
            api::init_cross_section(Some(&mut buf), kind.as_str(), 0.5, &profile);
            write_ppm(dir, &format!("cross_section_{}", kind), &buf)?;
        }

        let mut buf = PixelBuffer::new(size, size);
        api::init_orbit_diagram(Some(&mut buf), &OrbitDiagramParams::default());
        write_ppm(dir, "orbit_diagram", &buf)?;

        let mut orb = RotationOrb::new();
        orb.pointer_down(Vec2::ZERO);
        orb.pointer_moved(Vec2::new(12.0, 6.0));
        let mut buf = PixelBuffer::new(ORB_SIZE, ORB_SIZE);
        orb.draw(&mut buf);
        write_ppm(dir, "rotation_orb", &buf)
    }

    fn orbit(dir: &Path, settings: &Settings, seed: u64) -> Result<()> {
        use consts::orbit::{CANVAS_HEIGHT, CANVAS_WIDTH};
        let frame = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let mut session = OrbitSession::new(frame, LoopHost::default(), settings, Pcg32::seed_from_u64(seed));

        let start = session.game().level.probe_start;
        let planet = session.game().level.planet.pos;
        // Pull perpendicular to the planet direction
        let aim = start + (start - planet).perp().normalize_or_zero() * 90.0;
        session.click(Vec2::ZERO);
        session.pointer_moved(aim);
        write_ppm(dir, "orbit_aiming", session.frame())?;

        session.click(aim);
        let mut now = 0.0;
        let mut frames = 0;
        while session.frames().is_pending() && frames < MAX_FRAMES {
            now += FRAME_MS;
            session.on_frame(now);
            frames += 1;
        }
        log::info!(
            "Orbit flight ended {} after {} frames",
            session.current_state().as_str(),
            frames
        );
        write_ppm(dir, "orbit_result", session.frame())
    }

    fn deflection(dir: &Path, settings: &Settings, seed: u64) -> Result<()> {
        use consts::deflection::{CANVAS_HEIGHT, CANVAS_WIDTH};
        let frame = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let mut session = DeflectionSession::new(
            frame,
            LoopHost::default(),
            settings,
            Pcg32::seed_from_u64(seed),
            MirrorControl::PositionOnly,
        )?;
        session.start();
        write_ppm(dir, "deflection_start", session.frame())?;

        let solution = session.game().level.solution.mirror_pos;
        session.pointer_moved(solution);
        let mut now = 0.0;
        for _ in 0..120 {
            now += FRAME_MS;
            session.on_frame(now);
        }
        write_ppm(dir, "deflection_analyzing", session.frame())?;

        let mut frames = 0;
        while session.frames().is_pending() && !session.game().overlay_visible() && frames < MAX_FRAMES {
            now += FRAME_MS;
            session.on_frame(now);
            frames += 1;
        }
        write_ppm(dir, "deflection_complete", session.frame())?;
        Ok(())
    }

    fn interference(dir: &Path, settings: &Settings, seed: u64) -> Result<()> {
        use consts::interference::{CANVAS_HEIGHT, CANVAS_WIDTH, WAVE_COUNT, WAVE_DISPLAY_HEIGHT};
        let frame = PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let mut session =
            InterferenceSession::new(frame, LoopHost::default(), settings, Pcg32::seed_from_u64(seed));
        write_ppm(dir, "interference_start", session.frame())?;

        let solution = session.game().level.solution_offsets;
        let track = session.game().track;
        let row = (CANVAS_HEIGHT - WAVE_DISPLAY_HEIGHT) as f32 / WAVE_COUNT as f32;
        for (i, offset) in solution.iter().enumerate() {
            let y = WAVE_DISPLAY_HEIGHT as f32 + row * (i as f32 + 0.5);
            session.pointer_down(Vec2::new(track.x_for(*offset), y));
            session.pointer_up();
        }
        let mut now = 0.0;
        for _ in 0..60 {
            if !session.frames().is_pending() {
                break;
            }
            now += FRAME_MS;
            session.on_frame(now);
        }
        write_ppm(dir, "interference_aligned", session.frame())
    }

    pub fn run() {
        env_logger::init();
        log::info!("Probe Deck (native) starting...");

        let mut args = std::env::args().skip(1);
        let dir = PathBuf::from(args.next().unwrap_or_else(|| "probe-deck-out".into()));
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);
        let settings = Settings::load();

        if let Err(e) = fs::create_dir_all(&dir) {
            log::error!("Cannot create {}: {}", dir.display(), e);
            std::process::exit(1);
        }

        let mut failed = false;
        if let Err(e) = visualizers(&dir) {
            log::error!("Visualizers: {}", e);
            failed = true;
        }
        if let Err(e) = orbit(&dir, &settings, seed) {
            log::error!("Orbit game: {}", e);
            failed = true;
        }
        if let Err(e) = deflection(&dir, &settings, seed) {
            log::error!("Deflection puzzle: {}", e);
            failed = true;
        }
        if let Err(e) = interference(&dir, &settings, seed) {
            log::error!("Interference puzzle: {}", e);
            failed = true;
        }

        if failed {
            std::process::exit(1);
        }
        println!("Snapshots written to {}", dir.display());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry points are the library's wasm-bindgen exports
}
