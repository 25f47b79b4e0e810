//! The single owner of a view's pan/zoom transform.
//!
//! Every write (buttons, keys, wheel, drag, continuous pan, selection-click
//! restore, snapshot restore) goes through [`ViewportController`], so the
//! transform, the zoom percentage and the minimap's visible region can never
//! disagree. Time is passed in explicitly; the UI calls [`ViewportController::tick`]
//! once per frame.

use crate::error::ViewerError;
use crate::settings::ZoomConfig;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use synteny_protocol::ViewportTransform;
use synteny_render::Rect;

pub type SharedViewport = Rc<RefCell<ViewportController>>;

type TransformListener = Box<dyn FnMut(&ViewportTransform, &Rect)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

impl PanDirection {
    /// Translation that moves the view towards `self`, i.e. the content the
    /// opposite way.
    fn delta(self, step: f64) -> (f64, f64) {
        match self {
            PanDirection::Left => (step, 0.0),
            PanDirection::Right => (-step, 0.0),
            PanDirection::Up => (0.0, step),
            PanDirection::Down => (0.0, -step),
        }
    }
}

/// Keys the viewer reacts to, independent of the windowing backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Plus,
    Minus,
    Zero,
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    from: ViewportTransform,
    to: ViewportTransform,
    started: Instant,
    duration: Duration,
}

impl Transition {
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Copy, Debug)]
struct ContinuousPan {
    direction: PanDirection,
    next_due: Instant,
}

pub struct ViewportController {
    config: ZoomConfig,
    transform: ViewportTransform,
    transition: Option<Transition>,
    pan: Option<ContinuousPan>,
    container: (f64, f64),
    windowed_container: Option<(f64, f64)>,
    zoom_locked: bool,
    listeners: Vec<TransformListener>,
}

impl std::fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportController")
            .field("transform", &self.transform)
            .field("container", &self.container)
            .field("panning", &self.pan.is_some())
            .field("fullscreen", &self.windowed_container.is_some())
            .finish()
    }
}

impl ViewportController {
    pub fn new(config: ZoomConfig, width: f64, height: f64) -> Self {
        Self {
            config,
            transform: ViewportTransform::IDENTITY,
            transition: None,
            pan: None,
            container: (width.max(0.0), height.max(0.0)),
            windowed_container: None,
            zoom_locked: false,
            listeners: vec![],
        }
    }

    pub fn shared(self) -> SharedViewport {
        Rc::new(RefCell::new(self))
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// The committed transform: the target of any running animation.
    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    /// The transform to draw at `now`, interpolated while a zoom animates.
    pub fn displayed(&self, now: Instant) -> ViewportTransform {
        match &self.transition {
            Some(t) => t.from.lerp(&t.to, ease_cubic_in_out(t.progress(now))),
            None => self.transform,
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.transition.is_some_and(|t| t.progress(now) < 1.0)
    }

    pub fn container(&self) -> (f64, f64) {
        self.container
    }

    /// `{-x/k, -y/k, width/k, height/k}` of the displayed transform, in
    /// content coordinates.
    pub fn visible_region(&self, now: Instant) -> Rect {
        region_for(&self.displayed(now), self.container)
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.transform.k * 100.0).round().max(0.0) as u32
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ViewportTransform, &Rect) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self) {
        let region = region_for(&self.transform, self.container);
        let transform = self.transform;
        for listener in &mut self.listeners {
            listener(&transform, &region);
        }
    }

    fn commit(&mut self, target: ViewportTransform) {
        if !target.approx_eq(&self.transform) {
            self.transform = target;
            self.notify();
        }
    }

    fn animate_to(&mut self, target: ViewportTransform, now: Instant) {
        let from = self.displayed(now);
        self.transition = Some(Transition {
            from,
            to: target,
            started: now,
            duration: self.config.duration(),
        });
        self.commit(target);
    }

    /// Scales the committed transform by `factor` about a screen point,
    /// honouring the zoom bounds.
    fn scaled_about(&self, factor: f64, anchor: (f64, f64)) -> ViewportTransform {
        let t = self.transform;
        let k = self.config.clamp(t.k * factor);
        let (cx, cy) = t.invert(anchor);
        ViewportTransform::new(k, anchor.0 - cx * k, anchor.1 - cy * k)
    }

    fn center(&self) -> (f64, f64) {
        (self.container.0 / 2.0, self.container.1 / 2.0)
    }

    pub fn set_zoom_locked(&mut self, locked: bool) {
        self.zoom_locked = locked;
    }

    pub fn zoom_locked(&self) -> bool {
        self.zoom_locked
    }

    pub fn zoom_in(&mut self, now: Instant) {
        if self.zoom_locked {
            return;
        }
        let target = self.scaled_about(self.config.factor, self.center());
        self.animate_to(target, now);
    }

    pub fn zoom_out(&mut self, now: Instant) {
        if self.zoom_locked {
            return;
        }
        let target = self.scaled_about(1.0 / self.config.factor, self.center());
        self.animate_to(target, now);
    }

    pub fn reset(&mut self, now: Instant) {
        self.animate_to(ViewportTransform::IDENTITY, now);
    }

    /// Immediate zoom about a pointer position (wheel or pinch).
    pub fn zoom_by(&mut self, factor: f64, anchor: (f64, f64)) {
        if self.zoom_locked || factor <= 0.0 {
            return;
        }
        self.transition = None;
        let target = self.scaled_about(factor, anchor);
        self.commit(target);
    }

    pub fn pan_by(&mut self, direction: PanDirection) {
        let (dx, dy) = direction.delta(self.config.pan_step_px);
        self.pan_by_delta(dx, dy);
    }

    /// Immediate translation in screen pixels (drag).
    pub fn pan_by_delta(&mut self, dx: f64, dy: f64) {
        self.transition = None;
        let t = self.transform;
        self.commit(ViewportTransform::new(t.k, t.x + dx, t.y + dy));
    }

    /// Begins repeating pan steps every cadence, starting one cadence from
    /// `now`. While a pan is running only its direction is updated, so at
    /// most one repeating step is ever scheduled.
    pub fn start_pan(&mut self, direction: PanDirection, now: Instant) {
        match &mut self.pan {
            Some(pan) => pan.direction = direction,
            None => {
                self.pan = Some(ContinuousPan {
                    direction,
                    next_due: now + self.config.pan_cadence(),
                })
            }
        }
    }

    pub fn stop_pan(&mut self) {
        self.pan = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Advances animations and applies at most one continuous-pan step.
    /// Returns whether the caller should repaint.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if let Some(t) = self.transition {
            changed = true;
            if t.progress(now) >= 1.0 {
                self.transition = None;
            }
        }
        let cadence = self.config.pan_cadence();
        if let Some(pan) = self.pan.filter(|p| p.next_due <= now) {
            self.pan_by(pan.direction);
            if let Some(p) = &mut self.pan {
                // A stalled frame does not replay the missed steps.
                p.next_due = (p.next_due + cadence).max(now + cadence);
            }
            changed = true;
        }
        changed
    }

    /// Immediate write used by selection-click restore and snapshot restore.
    pub fn set_transform(&mut self, transform: ViewportTransform) {
        self.transition = None;
        let k = self.config.clamp(transform.k);
        self.commit(ViewportTransform::new(k, transform.x, transform.y));
    }

    /// New container size; the transform is reapplied unchanged.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.container = (width.max(0.0), height.max(0.0));
        self.notify();
    }

    pub fn is_fullscreen(&self) -> bool {
        self.windowed_container.is_some()
    }

    /// Fits the container into `screen` keeping its aspect ratio, then asks
    /// the platform via `request`. A rejection leaves everything as it was.
    pub fn enter_fullscreen(
        &mut self,
        screen: (f64, f64),
        request: impl FnOnce() -> Result<(), String>,
    ) -> Result<(), ViewerError> {
        if self.is_fullscreen() {
            return Ok(());
        }
        if let Err(why) = request() {
            log::warn!("Fullscreen request rejected: {why}");
            return Err(ViewerError::FullscreenRejected(why));
        }
        let (w, h) = self.container;
        let fitted = if w > 0.0 && h > 0.0 {
            let s = (screen.0 / w).min(screen.1 / h);
            (w * s, h * s)
        } else {
            screen
        };
        self.windowed_container = Some(self.container);
        self.resize(fitted.0, fitted.1);
        Ok(())
    }

    pub fn exit_fullscreen(&mut self) {
        if let Some((w, h)) = self.windowed_container.take() {
            self.resize(w, h);
        }
    }

    /// Arrow keys pan one step; `+`, `-` and `0` zoom and reset.
    pub fn handle_key(&mut self, key: ViewKey, now: Instant) {
        match key {
            ViewKey::ArrowLeft => self.pan_by(PanDirection::Left),
            ViewKey::ArrowRight => self.pan_by(PanDirection::Right),
            ViewKey::ArrowUp => self.pan_by(PanDirection::Up),
            ViewKey::ArrowDown => self.pan_by(PanDirection::Down),
            ViewKey::Plus => self.zoom_in(now),
            ViewKey::Minus => self.zoom_out(now),
            ViewKey::Zero => self.reset(now),
        }
    }

    /// Screen position to content coordinates under the displayed transform.
    pub fn screen_to_content(&self, point: (f64, f64), now: Instant) -> (f64, f64) {
        self.displayed(now).invert(point)
    }
}

fn region_for(t: &ViewportTransform, container: (f64, f64)) -> Rect {
    if t.k == 0.0 {
        return Rect::default();
    }
    Rect::new(-t.x / t.k, -t.y / t.k, container.0 / t.k, container.1 / t.k)
}
