use crate::state::SourceMode;

/// Per-mode constants of the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub mode: SourceMode,
    // Attack lost per unavailable player.
    pub penalty_factor: f64,
    pub form_weighting: bool,
    pub form_window: usize,
    pub form_win: f64,
    pub form_draw: f64,
    pub form_loss: f64,
    pub draw_floor: f64,
    pub btts_divisor: f64,
    pub btts_cap: Option<f64>,
    pub goals_line: bool,
    pub goals_scale: f64,
}

impl ModelParams {
    pub fn static_catalog() -> Self {
        Self {
            mode: SourceMode::StaticCatalog,
            penalty_factor: 0.10,
            form_weighting: true,
            form_window: 4,
            form_win: 1.1,
            form_draw: 1.0,
            form_loss: 0.9,
            draw_floor: 0.15,
            btts_divisor: 2.0,
            btts_cap: Some(0.95),
            goals_line: true,
            goals_scale: 5.0,
        }
    }

    /// Smaller absence penalty, no form weighting, uncapped BTTS and no goals line.
    pub fn live_stats() -> Self {
        Self {
            mode: SourceMode::LiveStats,
            penalty_factor: 0.05,
            form_weighting: false,
            btts_divisor: 1.8,
            btts_cap: None,
            goals_line: false,
            ..Self::static_catalog()
        }
    }

    pub fn for_mode(mode: SourceMode) -> Self {
        match mode {
            SourceMode::StaticCatalog => Self::static_catalog(),
            SourceMode::LiveStats => Self::live_stats(),
        }
    }
}
