//! HUD state for the abduction game: score, reticle colour, beam cues.
//! Headless, so every cue is also logged.

use grapple::{FeedbackSink, HitCategory, TargetClass};

/// Crosshair tint for what's under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reticle {
    /// Nothing grabbable.
    #[default]
    White,
    /// A cow: grab it and reel it in.
    Blue,
    /// A farmer: can be dragged but not lifted.
    Red,
}

impl Reticle {
    pub fn for_hit(category: HitCategory, class: Option<TargetClass>) -> Self {
        match (category, class) {
            (HitCategory::Capturable, Some(TargetClass::Liftable)) => Reticle::Blue,
            (HitCategory::Capturable, Some(TargetClass::HoldOnly)) => Reticle::Red,
            _ => Reticle::White,
        }
    }
}

/// Running counters for one session.
#[derive(Debug, Clone, Default)]
pub struct Hud {
    pub score: f32,
    pub abductions: u32,
    pub shots: u32,
    pub hits: u32,
    pub releases: u32,
    pub reticle: Reticle,
    /// Whether the looping reel sound would be playing.
    pub reel_playing: bool,
    /// Hull damage taken from farmer fire.
    pub damage: f32,
    /// Farmer shots that struck the hull.
    pub hits_taken: u32,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.damage += amount.max(0.0);
        self.hits_taken += 1;
        log::info!("Hull hit! {:.0} damage taken", self.damage);
    }

    pub fn accuracy(&self) -> f32 {
        if self.shots == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots as f32
        }
    }
}

impl FeedbackSink for Hud {
    fn on_fire(&mut self) {
        self.shots += 1;
        log::debug!("*zap* beam fired");
    }

    fn on_hit(&mut self, class: TargetClass) {
        self.hits += 1;
        log::info!("Beam locked onto {:?} target", class);
    }

    fn on_reel_start(&mut self) {
        self.reel_playing = true;
        log::debug!("Reel hum started");
    }

    fn on_consumed(&mut self, value: f32) {
        self.score += value;
        self.abductions += 1;
        log::info!("Moo! Score {:.0} (+{:.0})", self.score, value);
    }

    fn on_release_audio_stop(&mut self) {
        self.reel_playing = false;
        log::debug!("Reel hum stopped");
    }

    fn on_released(&mut self) {
        self.releases += 1;
    }

    fn on_reticle(&mut self, category: HitCategory, class: Option<TargetClass>) {
        self.reticle = Reticle::for_hit(category, class);
    }
}
