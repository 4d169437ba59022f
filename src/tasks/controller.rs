//! The cyclic slide controller task.
//!
//! Owns all carousel state and every timer. Control events arrive on one
//! channel; render commands and preload commands leave on two others. The
//! task processes one event at a time, so a build always completes before
//! the next event is polled, and no advance can observe a half-built track.

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::CarouselOptions;
use crate::events::{ControlEvent, PreloadCommand, Priority, RenderCommand};
use crate::gesture::Gesture;
use crate::slides::{Direction, Photo, Track, partition};

/// Pending one-shot deadlines. `None` is a stopped timer; arming an armed
/// slot replaces its deadline, so starts and stops are both idempotent.
#[derive(Debug, Default)]
struct Timers {
    auto: Option<Instant>,
    resume: Option<Instant>,
    snap: Option<Instant>,
    sweep: Option<Instant>,
    rebuild: Option<Instant>,
}

impl Timers {
    fn next_deadline(&self) -> Option<Instant> {
        [self.auto, self.resume, self.snap, self.sweep, self.rebuild]
            .into_iter()
            .flatten()
            .min()
    }
}

fn take_due(slot: &mut Option<Instant>, now: Instant) -> bool {
    match slot {
        Some(at) if *at <= now => {
            *slot = None;
            true
        }
        _ => false,
    }
}

struct Controller {
    cfg: CarouselOptions,
    /// Original photo snapshot; every rebuild starts from this, never from
    /// a previously augmented sequence.
    photos: Vec<Photo>,
    /// `None` while hidden.
    track: Option<Track>,
    viewport_width: f32,
    gesture: Option<(Gesture, Instant)>,
    suppress_click: bool,
    timers: Timers,
    render_tx: Sender<RenderCommand>,
    preload_tx: Sender<PreloadCommand>,
}

impl Controller {
    fn new(
        cfg: CarouselOptions,
        render_tx: Sender<RenderCommand>,
        preload_tx: Sender<PreloadCommand>,
    ) -> Self {
        let viewport_width = cfg.viewport_width;
        Self {
            cfg,
            photos: Vec::new(),
            track: None,
            viewport_width,
            gesture: None,
            suppress_click: false,
            timers: Timers::default(),
            render_tx,
            preload_tx,
        }
    }

    fn looping(&self) -> bool {
        self.track.as_ref().is_some_and(Track::looping)
    }

    /// Partition the snapshot and enter the matching state: hidden for an
    /// empty list, static for one slide, looping otherwise.
    async fn build(&mut self, now: Instant) {
        // Stop every pending timer before touching rendered state, so a
        // stale deadline can never fire against a torn-down track.
        self.timers = Timers::default();
        self.gesture = None;
        self.suppress_click = false;

        self.track = Track::new(partition(&self.photos, self.cfg.slide_capacity));
        let _ = self.preload_tx.send(PreloadCommand::Reset).await;

        let Some(track) = self.track.as_ref() else {
            info!("no photos; gallery hidden");
            let _ = self.render_tx.send(RenderCommand::Clear).await;
            return;
        };
        let looping = track.looping();
        let slides = track.slides().to_vec();
        info!(slides = slides.len(), looping, "carousel built");
        let _ = self
            .render_tx
            .send(RenderCommand::Build { slides, looping })
            .await;
        self.settle(false).await;
        self.preload_around(now).await;
        self.start_auto(now);
    }

    /// Render the current cursor. The cursor is clamped first; callers
    /// should never push it out of the augmented range, but a render must
    /// not trust that.
    async fn settle(&mut self, animate: bool) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        track.clamp();
        let cursor = track.cursor();
        let offset_percent = track.offset_percent();
        debug!(cursor, offset_percent, animate, "settle");
        let _ = self
            .render_tx
            .send(RenderCommand::Translate {
                offset_percent,
                animate,
            })
            .await;
    }

    /// Move one slide with an animated transition, then schedule the clone
    /// check for when the transition ends. Ignored while static or hidden.
    async fn advance(&mut self, direction: Direction, now: Instant) {
        {
            let Some(track) = self.track.as_mut() else {
                return;
            };
            if !track.looping() {
                debug!("single slide; advance ignored");
                return;
            }
            track.shift(direction);
        }
        self.settle(true).await;
        self.preload_around(now).await;
        self.timers.snap = Some(now + self.cfg.transition);
    }

    /// If the transition left the cursor on an edge clone, teleport it to
    /// the real twin with an unanimated settle. The clone renders
    /// identically, so nothing visibly moves.
    async fn snap_back(&mut self, now: Instant) {
        let snapped = self.track.as_mut().and_then(Track::snap);
        if let Some(cursor) = snapped {
            debug!(cursor, "loop snap");
            self.settle(false).await;
            self.preload_around(now).await;
        }
    }

    /// Eagerly load the current, next and previous slides, and make sure a
    /// background sweep is pending for everything else.
    async fn preload_around(&mut self, now: Instant) {
        let Some(track) = self.track.as_ref() else {
            return;
        };
        let urls = track.neighborhood_urls();
        let _ = self
            .preload_tx
            .send(PreloadCommand::Fetch {
                urls,
                priority: Priority::Eager,
            })
            .await;
        let at = now + self.cfg.sweep_delay;
        self.timers.sweep = Some(self.timers.sweep.map_or(at, |cur| cur.min(at)));
    }

    async fn sweep(&mut self) {
        let Some(track) = self.track.as_ref() else {
            return;
        };
        let urls = track.all_urls();
        debug!(resources = urls.len(), "background preload sweep");
        let _ = self
            .preload_tx
            .send(PreloadCommand::Fetch {
                urls,
                priority: Priority::Background,
            })
            .await;
    }

    fn start_auto(&mut self, now: Instant) {
        if !self.looping() {
            return;
        }
        if self.timers.auto.is_none() {
            self.timers.auto = Some(now + self.cfg.auto_advance);
        }
    }

    /// Any interaction suspends auto-advance and re-arms the quiet-period
    /// resume. Static and hidden states never run these timers.
    fn reset_debounce(&mut self, now: Instant) {
        if !self.looping() {
            return;
        }
        self.timers.auto = None;
        self.timers.resume = Some(now + self.cfg.resume_after);
    }

    async fn handle(&mut self, event: ControlEvent, now: Instant) {
        match event {
            ControlEvent::SetPhotos(photos) => {
                info!(count = photos.len(), "photo list replaced");
                self.photos = photos;
                self.build(now).await;
            }
            ControlEvent::NextPressed => {
                self.advance(Direction::Forward, now).await;
                self.reset_debounce(now);
            }
            ControlEvent::PrevPressed => {
                self.advance(Direction::Backward, now).await;
                self.reset_debounce(now);
            }
            ControlEvent::PointerDown { x } => {
                if self.track.is_none() {
                    return;
                }
                self.gesture = Some((Gesture::begin(x), now));
                self.suppress_click = false;
                self.reset_debounce(now);
            }
            ControlEvent::PointerMove { x } => self.pointer_move(x).await,
            ControlEvent::PointerUp { x } => self.pointer_up(x, now).await,
            ControlEvent::Clicked { url } => {
                if self.suppress_click {
                    debug!(%url, "activation suppressed after drag");
                } else {
                    let _ = self.render_tx.send(RenderCommand::Navigate { url }).await;
                }
            }
            ControlEvent::Resized { width } => {
                self.viewport_width = width.max(1.0);
                self.timers.rebuild = Some(now + self.cfg.rebuild_debounce);
            }
        }
    }

    /// Follow the pointer: render at the cursor base plus the clamped pull,
    /// unanimated, without touching the cursor.
    async fn pointer_move(&mut self, x: f32) {
        let Some(track) = self.track.as_ref() else {
            return;
        };
        let base = track.offset_percent();
        let Some((gesture, _)) = self.gesture.as_mut() else {
            return;
        };
        let pull = gesture.pull(x, self.viewport_width, &self.cfg.swipe);
        let _ = self
            .render_tx
            .send(RenderCommand::Translate {
                offset_percent: base + pull,
                animate: false,
            })
            .await;
    }

    async fn pointer_up(&mut self, x: f32, now: Instant) {
        let Some((gesture, started)) = self.gesture.take() else {
            return;
        };
        if self.track.is_none() {
            return;
        }
        self.suppress_click = gesture.dragging();
        match gesture.classify(x, now.duration_since(started), &self.cfg.swipe) {
            Some(direction) => self.advance(direction, now).await,
            None => {
                self.settle(true).await;
                self.preload_around(now).await;
            }
        }
        self.reset_debounce(now);
    }

    async fn fire_due(&mut self, now: Instant) {
        if take_due(&mut self.timers.snap, now) {
            self.snap_back(now).await;
        }
        if take_due(&mut self.timers.resume, now) {
            self.start_auto(now);
        }
        if take_due(&mut self.timers.auto, now) {
            self.timers.auto = Some(now + self.cfg.auto_advance);
            self.advance(Direction::Forward, now).await;
        }
        if take_due(&mut self.timers.sweep, now) {
            self.sweep().await;
        }
        if take_due(&mut self.timers.rebuild, now) {
            info!("rebuilding after viewport change");
            self.build(now).await;
        }
    }
}

pub async fn run(
    cfg: CarouselOptions,
    mut control_rx: Receiver<ControlEvent>,
    render_tx: Sender<RenderCommand>,
    preload_tx: Sender<PreloadCommand>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut controller = Controller::new(cfg, render_tx, preload_tx);
    loop {
        let deadline = controller.timers.next_deadline();
        select! {
            _ = cancel.cancelled() => break,

            maybe_event = control_rx.recv() => match maybe_event {
                Some(event) => controller.handle(event, Instant::now()).await,
                None => break,
            },

            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                controller.fire_due(Instant::now()).await;
            }
        }
    }
    Ok(())
}
