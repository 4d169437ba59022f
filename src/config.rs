use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    pub source: SourceOptions,
    pub carousel: CarouselOptions,
    pub contact: ContactOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde
    /// defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.source.validate()?;
        self.carousel.validate()?;
        self.contact.validate()?;
        Ok(self)
    }
}

/// Where the photo manifests live.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SourceOptions {
    /// Base URL under which `photos.<variant>.json` manifests are published.
    pub base_url: String,
    /// Layout variant to request on startup.
    pub variant: Variant,
}

impl SourceOptions {
    fn validate(&self) -> Result<()> {
        ensure!(!self.base_url.trim().is_empty(), "base-url must be set");
        Ok(())
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            variant: Variant::Desktop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    Desktop,
    Mobile,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CarouselOptions {
    /// Maximum photos shown together on one slide.
    pub slide_capacity: usize,
    /// Interval between automatic forward advances.
    #[serde(with = "humantime_serde")]
    pub auto_advance: Duration,
    /// Quiet period after an interaction before auto-advance resumes.
    #[serde(with = "humantime_serde")]
    pub resume_after: Duration,
    /// Animated transition length. The loop snap-back fires after this same
    /// value, so the two can never drift apart.
    #[serde(with = "humantime_serde")]
    pub transition: Duration,
    /// Quiet period after a resize before the track is rebuilt.
    #[serde(with = "humantime_serde")]
    pub rebuild_debounce: Duration,
    /// Delay before the low-priority preload sweep of remaining resources.
    #[serde(with = "humantime_serde")]
    pub sweep_delay: Duration,
    /// Viewport width assumed until the surface reports a resize.
    pub viewport_width: f32,
    pub swipe: SwipeOptions,
}

impl CarouselOptions {
    fn validate(&self) -> Result<()> {
        ensure!(self.slide_capacity > 0, "slide-capacity must be at least 1");
        ensure!(
            self.auto_advance > Duration::ZERO,
            "auto-advance must be positive"
        );
        ensure!(
            self.resume_after > Duration::ZERO,
            "resume-after must be positive"
        );
        ensure!(
            self.transition > Duration::ZERO,
            "transition must be positive"
        );
        ensure!(
            self.viewport_width > 0.0,
            "viewport-width must be positive"
        );
        self.swipe.validate()
    }
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            slide_capacity: 3,
            auto_advance: Duration::from_secs(5),
            resume_after: Duration::from_secs(10),
            transition: Duration::from_millis(500),
            rebuild_debounce: Duration::from_millis(250),
            sweep_delay: Duration::from_secs(1),
            viewport_width: 1280.0,
            swipe: SwipeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SwipeOptions {
    /// Pointer travel, in pixels, past which a gesture counts as a drag and
    /// link activation is suppressed.
    pub drag_threshold_px: f32,
    /// Travel past which a release is always a swipe.
    pub swipe_distance_px: f32,
    /// Shorter travel that still swipes when released inside the flick window.
    pub flick_distance_px: f32,
    #[serde(with = "humantime_serde")]
    pub flick_window: Duration,
    /// Maximum pull while the pointer is down, in percent of the viewport.
    pub max_pull_percent: f32,
}

impl SwipeOptions {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.drag_threshold_px > 0.0,
            "drag-threshold-px must be positive"
        );
        ensure!(
            self.flick_distance_px > 0.0 && self.swipe_distance_px > self.flick_distance_px,
            "swipe-distance-px must exceed flick-distance-px"
        );
        ensure!(
            self.max_pull_percent > 0.0 && self.max_pull_percent <= 100.0,
            "max-pull-percent must be in (0, 100]"
        );
        Ok(())
    }
}

impl Default for SwipeOptions {
    fn default() -> Self {
        Self {
            drag_threshold_px: 10.0,
            swipe_distance_px: 50.0,
            flick_distance_px: 20.0,
            flick_window: Duration::from_millis(300),
            max_pull_percent: 50.0,
        }
    }
}

/// Contact form submission endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ContactOptions {
    pub endpoint: String,
    /// API access key sent with every submission. Checked for presence
    /// before anything leaves the machine.
    pub access_key: String,
    /// How long the page keeps the submission outcome visible.
    #[serde(with = "humantime_serde")]
    pub result_visible: Duration,
}

impl ContactOptions {
    fn validate(&self) -> Result<()> {
        ensure!(!self.endpoint.trim().is_empty(), "contact endpoint must be set");
        Ok(())
    }
}

impl Default for ContactOptions {
    fn default() -> Self {
        Self {
            endpoint: "https://api.web3forms.com/submit".to_string(),
            access_key: String::new(),
            result_visible: Duration::from_secs(5),
        }
    }
}
