// Health meter and its visual indicator

/// Linear RGB, each channel 0..=1
pub type Rgb = [f32; 3];

pub const GREEN: Rgb = [0.0, 1.0, 0.0];
pub const YELLOW: Rgb = [1.0, 1.0, 0.0];
pub const ORANGE: Rgb = [1.0, 0.5, 0.0];
pub const RED: Rgb = [1.0, 0.0, 0.0];
pub const GREY: Rgb = [0.3, 0.3, 0.3];

/// Visual health display attached to an enemy
pub trait HealthIndicator {
    fn set_indicator_color(&mut self, rgb: Rgb);
    fn show_indicator(&mut self);
    fn hide_indicator(&mut self);
}

/// Indicator for enemies nobody is watching
#[derive(Debug, Default)]
pub struct NullIndicator;

impl HealthIndicator for NullIndicator {
    fn set_indicator_color(&mut self, _rgb: Rgb) {}
    fn show_indicator(&mut self) {}
    fn hide_indicator(&mut self) {}
}

/// Colour band for a health ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthBand {
    Green,
    Yellow,
    Orange,
    Red,
    /// Alive but nearly gone: the indicator blinks red and grey
    Critical,
    Depleted,
}

impl HealthBand {
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio >= 0.95 {
            Self::Green
        } else if ratio >= 0.65 {
            Self::Yellow
        } else if ratio >= 0.35 {
            Self::Orange
        } else if ratio >= 0.05 {
            Self::Red
        } else if ratio > 0.0 {
            Self::Critical
        } else {
            Self::Depleted
        }
    }

    /// Steady colour; blinking starts from red
    pub fn color(self) -> Option<Rgb> {
        match self {
            Self::Green => Some(GREEN),
            Self::Yellow => Some(YELLOW),
            Self::Orange => Some(ORANGE),
            Self::Red | Self::Critical => Some(RED),
            Self::Depleted => None,
        }
    }

    pub fn is_blinking(self) -> bool {
        self == Self::Critical
    }
}

/// Current and maximum health plus blink phase
#[derive(Debug, Clone)]
pub struct HealthMeter {
    current: i32,
    max: i32,
    blink_on: bool,
}

impl HealthMeter {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            blink_on: true,
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn ratio(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    pub fn band(&self) -> HealthBand {
        HealthBand::from_ratio(self.ratio())
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    /// Remove health, never going below zero. Returns the new band.
    pub fn damage(&mut self, amount: i32) -> HealthBand {
        self.current = (self.current - amount.max(0)).max(0);
        self.band()
    }

    /// Seconds between blink toggles, for the critical band only
    pub fn blink_interval(&self, slow: f64, fast: f64, fast_below: f32) -> Option<f64> {
        if !self.band().is_blinking() {
            return None;
        }
        Some(if self.ratio() < fast_below { fast } else { slow })
    }

    /// Push the steady colour for the current band
    pub fn refresh(&mut self, indicator: &mut dyn HealthIndicator) {
        self.blink_on = true;
        if let Some(color) = self.band().color() {
            indicator.set_indicator_color(color);
        }
    }

    /// Flip between red and grey. Returns the colour shown.
    pub fn toggle_blink(&mut self, indicator: &mut dyn HealthIndicator) -> Rgb {
        self.blink_on = !self.blink_on;
        let color = if self.blink_on { RED } else { GREY };
        indicator.set_indicator_color(color);
        color
    }
}

/// Test double that records what the indicator was told
#[cfg(test)]
pub mod recording {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    pub struct IndicatorLog {
        pub colors: Vec<Rgb>,
        pub visible: Option<bool>,
    }

    /// Cloneable handle so a test can inspect the log after handing the
    /// indicator to an enemy
    #[derive(Debug, Default, Clone)]
    pub struct RecordingIndicator(pub Rc<RefCell<IndicatorLog>>);

    impl RecordingIndicator {
        pub fn last_color(&self) -> Option<Rgb> {
            self.0.borrow().colors.last().copied()
        }

        pub fn visible(&self) -> Option<bool> {
            self.0.borrow().visible
        }
    }

    impl HealthIndicator for RecordingIndicator {
        fn set_indicator_color(&mut self, rgb: Rgb) {
            self.0.borrow_mut().colors.push(rgb);
        }

        fn show_indicator(&mut self) {
            self.0.borrow_mut().visible = Some(true);
        }

        fn hide_indicator(&mut self) {
            self.0.borrow_mut().visible = Some(false);
        }
    }
}
