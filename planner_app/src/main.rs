//! Planning viewer demo
//!
//! Builds a pin placement scene over the recording surface: a clipped
//! planning viewport holding an anatomy panel and an orbitable guide pin
//! model, an animated insertion depth, a crossfade to an alternative plan
//! overlay, and a producer thread feeding the update queue. Runs headless
//! for a fixed number of frames and reports what the frames actually did.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use viz_engine::prelude::*;

const CONFIG_PATH: &str = "planner.toml";
const PIN_MODEL: &str = include_str!("../models/guide_pin.ron");

const TOTAL_FRAMES: u64 = 240;
const ORBIT_FRAMES: u64 = 150;
const TRANSITION_FRAME: u64 = 120;

/// Routes drained update events onto the scene
struct PlannerListener {
    overlay: NodeRef,
    orbit_rate: Rc<Cell<f32>>,
}

impl UpdateListener for PlannerListener {
    fn on_update(&mut self, event: &UpdateEvent) -> Result<(), UpdateError> {
        match &event.payload {
            UpdatePayload::VisibilityChanged { target, visible } if target == "plan_overlay" => {
                self.overlay.borrow_mut().set_visible(*visible);
                Ok(())
            }
            UpdatePayload::ParameterChanged { parameter, value } if parameter == "orbit_rate" => {
                self.orbit_rate.set(*value);
                Ok(())
            }
            UpdatePayload::ModelChanged { model } => {
                log::info!("Model '{model}' flagged changed by '{}'", event.source);
                Ok(())
            }
            _ => Err(UpdateError::UnexpectedPayload {
                source: event.source.clone(),
                reason: "planning viewer has no route for this update".to_string(),
            }),
        }
    }
}

struct PlannerApp {
    config: ViewerConfig,
    surface: RecordingSurface,
    scene: Scene,
    driver: FrameDriver,
    listener: PlannerListener,
    pin: Rc<RefCell<TransformNode>>,
    trackball: TrackballRef,
    transition: Rc<RefCell<ScreenTransition>>,
    depth: Rc<Cell<f32>>,
    orbit_rate: Rc<Cell<f32>>,
}

impl PlannerApp {
    fn new(config: ViewerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let surface = RecordingSurface::new(1280, 720);
        let registry = ProgramRegistry::new_shared();

        let descriptor = DescriptorLoader::parse_model(PIN_MODEL)?;
        let pin = instantiate(&descriptor, &registry)?;

        let trackball = Trackball::new_shared();
        let dolly = Dolly::new_shared();
        dolly.borrow_mut().set_zoom(1.2);

        // Anatomy stand-in the pin is planned against, plus the pin model,
        // clipped to the planning viewport region. Screen-space panels are
        // not clippable, so the view manipulators reach only the meshes.
        let anatomy = node_ref(
            QuadNode::new(Rect::new(240.0, 60.0, 800.0, 600.0), [0.35, 0.30, 0.32, 1.0])
                .with_pick_id(PickId(1)),
        );
        let mut viewport = RenderList::new();
        viewport.add(anatomy);
        viewport.add(pin.clone());
        viewport.set_clip_region(Some(Rect::new(220.0, 40.0, 840.0, 640.0)));
        viewport.set_trackball(Some(trackball.clone()));
        viewport.set_dolly(Some(dolly));

        // Marker for the alternative plan, revealed by the crossfade.
        let overlay = node_ref(
            QuadNode::new(Rect::new(900.0, 80.0, 140.0, 36.0), [0.95, 0.75, 0.10, 0.9])
                .with_pick_id(PickId(7)),
        );
        overlay.borrow_mut().set_visible(false);

        let transition = ScreenTransition::new_shared(config.transition_seconds);

        let mut scene = Scene::with_background(config.background_color);
        scene.add(node_ref(viewport));
        scene.add(overlay.clone());
        scene.add(transition.clone());

        let depth = Rc::new(Cell::new(descriptor.transform.translation[2]));
        let orbit_rate = Rc::new(Cell::new(0.6_f32));

        let mut driver = FrameDriver::new();
        driver.spawn(animator_ref(
            FloatAnimator::new(depth.get(), -1.5, 2.5)
                .with_easing(Easing::EaseInOut)
                .with_binding(depth.clone())
                .invalidating(pin.clone()),
        ));

        let listener = PlannerListener {
            overlay,
            orbit_rate: orbit_rate.clone(),
        };

        Ok(Self {
            config,
            surface,
            scene,
            driver,
            listener,
            pin,
            trackball,
            transition,
            depth,
            orbit_rate,
        })
    }

    fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let producer = self.spawn_update_producer();
        let budget = self.config.frame_budget();
        let started = Instant::now();
        let mut frames_drawn: u64 = 0;

        for frame in 0..TOTAL_FRAMES {
            self.apply_insertion_depth();
            if frame < ORBIT_FRAMES {
                self.orbit_view(budget.as_secs_f32());
            }
            if frame == TRANSITION_FRAME {
                self.start_plan_crossfade();
            }

            let stats = self.driver.run_frame(
                &mut self.scene,
                &mut self.surface,
                Some(&mut self.listener),
            )?;
            if stats.rendered {
                frames_drawn += 1;
            }
            log::debug!(
                "frame {}: {} update(s), {} animator(s), rendered={}",
                stats.frame,
                stats.events_dispatched,
                stats.animators_active,
                stats.rendered
            );
            thread::sleep(budget);
        }

        if producer.join().is_err() {
            log::error!("Update producer thread stopped with a panic");
        }

        let ops_recorded = self.surface.ops().len();
        self.report_pick_coverage()?;
        self.scene.release(&mut self.surface);

        log::info!(
            "Session closed: {}/{} frames drew ({} suppressed as clean), {} ops recorded in {:.1}s at {:.0} fps",
            frames_drawn,
            TOTAL_FRAMES,
            TOTAL_FRAMES - frames_drawn,
            ops_recorded,
            started.elapsed().as_secs_f32(),
            self.driver.average_fps()
        );
        Ok(())
    }

    /// Simulated session activity arriving from outside the render thread
    fn spawn_update_producer(&self) -> thread::JoinHandle<()> {
        let queue = self.driver.update_queue();
        thread::spawn(move || {
            queue.post(
                "session",
                UpdatePayload::ModelChanged {
                    model: "guide_pin".to_string(),
                },
            );
            for step in 1..=4 {
                thread::sleep(Duration::from_millis(200));
                queue.post(
                    "session",
                    UpdatePayload::ParameterChanged {
                        parameter: "orbit_rate".to_string(),
                        value: 0.3 + 0.15 * step as f32,
                    },
                );
            }
        })
    }

    /// Push the animated insertion depth into the pin's placement
    fn apply_insertion_depth(&mut self) {
        let depth = self.depth.get();
        let mut pin = self.pin.borrow_mut();
        let translation = pin.translation();
        if (translation.z - depth).abs() > f32::EPSILON {
            pin.set_translation(Vec3::new(translation.x, translation.y, depth));
        }
    }

    fn orbit_view(&mut self, dt_seconds: f32) {
        self.trackball
            .borrow_mut()
            .rotate(&Vec3::y_axis(), self.orbit_rate.get() * dt_seconds);
        // The shared manipulator has no back-reference to its nodes.
        self.scene.set_dirty(true);
    }

    fn start_plan_crossfade(&mut self) {
        log::info!("Switching to the alternative plan");
        match self.transition.borrow_mut().begin(&mut self.surface) {
            Ok(()) => self.driver.spawn(self.transition.clone()),
            Err(error) => log::warn!("Crossfade unavailable, cutting directly: {error}"),
        }
        self.driver.update_queue().post(
            "planner",
            UpdatePayload::VisibilityChanged {
                target: "plan_overlay".to_string(),
                visible: true,
            },
        );
    }

    fn report_pick_coverage(&mut self) -> RenderResult<()> {
        self.surface.clear_ops();
        self.scene.render_pickable(&mut self.surface)?;
        let targets = self
            .surface
            .ops()
            .iter()
            .filter(|op| {
                matches!(
                    op,
                    SurfaceOp::Quad { pick: Some(_), .. } | SurfaceOp::Mesh { pick: Some(_), .. }
                )
            })
            .count();
        log::info!("Pick pass covers {targets} hit-testable draw(s)");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_note) = match ViewerConfig::load_from_file(CONFIG_PATH) {
        Ok(config) => {
            config.validate()?;
            (config, None)
        }
        Err(error) => (ViewerConfig::default(), Some(error.to_string())),
    };

    viz_engine::foundation::logging::init_with_level(&config.log_level);
    log::info!("Starting planning viewer");
    match config_note {
        None => log::info!("Loaded settings from {CONFIG_PATH}"),
        Some(note) => log::info!("No usable {CONFIG_PATH} ({note}), using defaults"),
    }

    let mut app = PlannerApp::new(config)?;
    let result = app.run();

    match result {
        Ok(()) => {
            log::info!("Planning viewer session completed");
            Ok(())
        }
        Err(error) => {
            log::error!("Planning viewer failed: {error}");
            Err(error)
        }
    }
}
