use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::gesture::GestureAction;
use crate::layout_engine::GridConfig;
use crate::model::badges::badge_label;

const MAX_GRID_DIMENSION: u32 = 12;

static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::parse(include_str!("../../homegrid.default.toml"))
        .expect("embedded default config must parse")
});

fn home() -> PathBuf { dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")) }

pub fn data_dir() -> PathBuf {
    dirs::data_dir().map(|d| d.join("homegrid")).unwrap_or_else(|| home().join(".homegrid"))
}
pub fn placements_file() -> PathBuf { data_dir().join("placements.json") }
pub fn hidden_file() -> PathBuf { data_dir().join("hidden.ron") }
pub fn config_file() -> PathBuf { home().join(".homegrid.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Home screen grid. Changing it never re-packs existing placements.
    #[serde(default = "default_home_grid")]
    pub home: GridConfig,
    /// App drawer grid, independent of the home grid.
    #[serde(default = "default_drawer_grid")]
    pub drawer: GridConfig,
    #[serde(default)]
    pub gestures: GestureSettings,
    #[serde(default)]
    pub badges: BadgeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home: default_home_grid(),
            drawer: default_drawer_grid(),
            gestures: GestureSettings::default(),
            badges: BadgeSettings::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GestureSettings {
    #[serde(default = "default_swipe_up")]
    pub swipe_up: GestureAction,
    #[serde(default = "default_swipe_down")]
    pub swipe_down: GestureAction,
    #[serde(default)]
    pub double_tap: GestureAction,
    #[serde(default)]
    pub pinch_in: GestureAction,
    #[serde(default)]
    pub pinch_out: GestureAction,
    /// Platform touch slop in pixels.
    #[serde(default = "default_touch_slop")]
    pub touch_slop: f64,
    /// Minimum fling velocity in pixels per second.
    #[serde(default = "default_min_fling_velocity")]
    pub min_fling_velocity: f64,
    #[serde(default = "default_double_tap_timeout_ms")]
    pub double_tap_timeout_ms: u64,
    /// Fraction of the viewport height, measured from the bottom edge, in
    /// which a pointer down arms the drawer drag.
    #[serde(default = "default_trigger_zone")]
    pub drawer_trigger_zone: f64,
    #[serde(default = "default_open_threshold")]
    pub open_threshold: f64,
    #[serde(default = "default_velocity_override_min_progress")]
    pub velocity_override_min_progress: f64,
    /// Upward release velocity (px/s) that commits a short drag to open.
    #[serde(default = "default_fling_open_velocity")]
    pub fling_open_velocity: f64,
    #[serde(default = "default_dismiss_slop")]
    pub dismiss_slop: f64,
    #[serde(default = "default_dismiss_threshold")]
    pub dismiss_threshold: f64,
    /// Minimum dismiss distance in density-independent pixels.
    #[serde(default = "default_dismiss_min_distance")]
    pub dismiss_min_distance: f64,
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f64,
    #[serde(default = "default_density")]
    pub density: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            swipe_up: default_swipe_up(),
            swipe_down: default_swipe_down(),
            double_tap: GestureAction::None,
            pinch_in: GestureAction::None,
            pinch_out: GestureAction::None,
            touch_slop: default_touch_slop(),
            min_fling_velocity: default_min_fling_velocity(),
            double_tap_timeout_ms: default_double_tap_timeout_ms(),
            drawer_trigger_zone: default_trigger_zone(),
            open_threshold: default_open_threshold(),
            velocity_override_min_progress: default_velocity_override_min_progress(),
            fling_open_velocity: default_fling_open_velocity(),
            dismiss_slop: default_dismiss_slop(),
            dismiss_threshold: default_dismiss_threshold(),
            dismiss_min_distance: default_dismiss_min_distance(),
            pinch_threshold: default_pinch_threshold(),
            density: default_density(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct BadgeSettings {
    #[serde(default = "yes")]
    pub show: bool,
    /// Render the count, not just a dot.
    #[serde(default = "yes")]
    pub show_count: bool,
}

impl Default for BadgeSettings {
    fn default() -> Self { Self { show: true, show_count: true } }
}

impl BadgeSettings {
    /// What to draw on an icon with `count` notifications. An empty label
    /// is a plain dot.
    pub fn label(&self, count: u32) -> Option<String> {
        if !self.show {
            return None;
        }
        let label = badge_label(count)?;
        Some(if self.show_count { label } else { String::new() })
    }
}

fn validate_grid(name: &str, grid: &GridConfig, issues: &mut Vec<String>) {
    if grid.columns == 0 || grid.columns > MAX_GRID_DIMENSION {
        issues.push(format!(
            "{name}.columns must be between 1 and {MAX_GRID_DIMENSION}, got {}",
            grid.columns
        ));
    }
    if grid.rows == 0 || grid.rows > MAX_GRID_DIMENSION {
        issues.push(format!(
            "{name}.rows must be between 1 and {MAX_GRID_DIMENSION}, got {}",
            grid.rows
        ));
    }
}

fn fix_grid(grid: &mut GridConfig, default: GridConfig) -> usize {
    let mut fixes = 0;
    if grid.columns == 0 || grid.columns > MAX_GRID_DIMENSION {
        grid.columns = default.columns;
        fixes += 1;
    }
    if grid.rows == 0 || grid.rows > MAX_GRID_DIMENSION {
        grid.rows = default.rows;
        fixes += 1;
    }
    fixes
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        validate_grid("home", &self.home, &mut issues);
        validate_grid("drawer", &self.drawer, &mut issues);
        issues.extend(self.gestures.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        fixes += fix_grid(&mut self.home, default_home_grid());
        fixes += fix_grid(&mut self.drawer, default_drawer_grid());
        fixes += self.gestures.auto_fix_values();

        fixes
    }
}

fn is_fraction(v: f64) -> bool { (0.0..=1.0).contains(&v) }

impl GestureSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.touch_slop < 0.0 {
            issues.push(format!("touch_slop must be non-negative, got {}", self.touch_slop));
        }
        if self.min_fling_velocity < 0.0 {
            issues.push(format!(
                "min_fling_velocity must be non-negative, got {}",
                self.min_fling_velocity
            ));
        }
        if self.fling_open_velocity < 0.0 {
            issues.push(format!(
                "fling_open_velocity must be non-negative, got {}",
                self.fling_open_velocity
            ));
        }
        if self.double_tap_timeout_ms == 0 {
            issues.push("double_tap_timeout_ms must be positive".to_string());
        }
        for (name, value) in [
            ("drawer_trigger_zone", self.drawer_trigger_zone),
            ("open_threshold", self.open_threshold),
            ("velocity_override_min_progress", self.velocity_override_min_progress),
            ("dismiss_threshold", self.dismiss_threshold),
        ] {
            if !is_fraction(value) {
                issues.push(format!("{name} must be between 0 and 1, got {value}"));
            }
        }
        if self.velocity_override_min_progress > self.open_threshold {
            issues.push(format!(
                "velocity_override_min_progress ({}) should not exceed open_threshold ({})",
                self.velocity_override_min_progress, self.open_threshold
            ));
        }
        if self.dismiss_slop < 0.0 || self.dismiss_min_distance < 0.0 {
            issues.push("dismiss distances must be non-negative".to_string());
        }
        if self.pinch_threshold <= 1.0 {
            issues.push(format!(
                "pinch_threshold must be greater than 1, got {}",
                self.pinch_threshold
            ));
        }
        if self.density <= 0.0 {
            issues.push(format!("density must be positive, got {}", self.density));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.touch_slop < 0.0 {
            self.touch_slop = default_touch_slop();
            fixes += 1;
        }
        if self.min_fling_velocity < 0.0 {
            self.min_fling_velocity = default_min_fling_velocity();
            fixes += 1;
        }
        if self.fling_open_velocity < 0.0 {
            self.fling_open_velocity = default_fling_open_velocity();
            fixes += 1;
        }
        if self.double_tap_timeout_ms == 0 {
            self.double_tap_timeout_ms = default_double_tap_timeout_ms();
            fixes += 1;
        }
        if !is_fraction(self.drawer_trigger_zone) {
            self.drawer_trigger_zone = default_trigger_zone();
            fixes += 1;
        }
        if !is_fraction(self.open_threshold) {
            self.open_threshold = default_open_threshold();
            fixes += 1;
        }
        if !is_fraction(self.velocity_override_min_progress)
            || self.velocity_override_min_progress > self.open_threshold
        {
            self.velocity_override_min_progress =
                default_velocity_override_min_progress().min(self.open_threshold);
            fixes += 1;
        }
        if !is_fraction(self.dismiss_threshold) {
            self.dismiss_threshold = default_dismiss_threshold();
            fixes += 1;
        }
        if self.dismiss_slop < 0.0 {
            self.dismiss_slop = default_dismiss_slop();
            fixes += 1;
        }
        if self.dismiss_min_distance < 0.0 {
            self.dismiss_min_distance = default_dismiss_min_distance();
            fixes += 1;
        }
        if self.pinch_threshold <= 1.0 {
            self.pinch_threshold = default_pinch_threshold();
            fixes += 1;
        }
        if self.density <= 0.0 {
            self.density = default_density();
            fixes += 1;
        }

        fixes
    }
}

fn yes() -> bool { true }

fn default_home_grid() -> GridConfig { GridConfig::new(4, 5) }

fn default_drawer_grid() -> GridConfig { GridConfig::new(4, 6) }

fn default_swipe_up() -> GestureAction { GestureAction::AppDrawer }

fn default_swipe_down() -> GestureAction { GestureAction::Notifications }

fn default_touch_slop() -> f64 { 8.0 }

fn default_min_fling_velocity() -> f64 { 50.0 }

fn default_double_tap_timeout_ms() -> u64 { 300 }

fn default_trigger_zone() -> f64 { 0.3 }

fn default_open_threshold() -> f64 { 0.3 }

fn default_velocity_override_min_progress() -> f64 { 0.1 }

fn default_fling_open_velocity() -> f64 { 1000.0 }

fn default_dismiss_slop() -> f64 { 20.0 }

fn default_dismiss_threshold() -> f64 { 0.3 }

fn default_dismiss_min_distance() -> f64 { 200.0 }

fn default_pinch_threshold() -> f64 { 1.25 }

fn default_density() -> f64 { 1.0 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Reads `path` if it exists, otherwise falls back to the embedded
    /// defaults.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() { Self::read(path) } else { Ok(Self::default()) }
    }

    pub fn default() -> Config { DEFAULT_CONFIG.clone() }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }
}
