use crate::constants::SAMPLER_WINDOW;

#[derive(Clone, Debug)]
pub struct SamplerConfig {
    /// Number of recent frames averaged for FPS.
    pub window: usize,
    /// Frame gaps longer than this (tab in background, debugger pause) are
    /// dropped instead of dragging the average down.
    pub max_frame_ms: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window: SAMPLER_WINDOW,
            max_frame_ms: 1000.0,
        }
    }
}

/// Rolling frame-time statistics over a fixed ring of recent frames.
#[derive(Clone, Debug)]
pub struct PerformanceSampler {
    config: SamplerConfig,
    frames: Vec<f64>,
    next: usize,
    last_timestamp: Option<f64>,
    total_frames: u64,
}

impl Default for PerformanceSampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

impl PerformanceSampler {
    pub fn new(config: SamplerConfig) -> Self {
        let window = config.window.max(1);
        Self {
            config: SamplerConfig { window, ..config },
            frames: Vec::with_capacity(window),
            next: 0,
            last_timestamp: None,
            total_frames: 0,
        }
    }

    /// Feeds the wall-clock time of the current tick.
    ///
    /// Returns the gap to the previous tick; the very first call only
    /// establishes the reference time.
    pub fn update(&mut self, now_ms: f64) -> Option<f64> {
        if !now_ms.is_finite() {
            return None;
        }
        let dt = self.last_timestamp.map(|last| now_ms - last);
        self.last_timestamp = Some(now_ms);
        if let Some(dt) = dt {
            self.record_frame_time(dt);
        }
        dt.filter(|d| *d >= 0.0)
    }

    pub fn record_frame_time(&mut self, dt_ms: f64) {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        if dt_ms > self.config.max_frame_ms {
            log::debug!("[perf] dropping {:.0} ms frame gap", dt_ms);
            return;
        }
        if self.frames.len() < self.config.window {
            self.frames.push(dt_ms);
        } else {
            self.frames[self.next] = dt_ms;
        }
        self.next = (self.next + 1) % self.config.window;
        self.total_frames += 1;
    }

    /// Smoothed frames per second, `None` until a frame has been measured.
    pub fn fps(&self) -> Option<f32> {
        self.average_frame_time().map(|avg| (1000.0 / avg) as f32)
    }

    pub fn average_frame_time(&self) -> Option<f64> {
        if self.frames.is_empty() {
            return None;
        }
        Some(self.frames.iter().sum::<f64>() / self.frames.len() as f64)
    }

    pub fn min_frame_time(&self) -> Option<f64> {
        self.frames.iter().copied().reduce(f64::min)
    }

    pub fn max_frame_time(&self) -> Option<f64> {
        self.frames.iter().copied().reduce(f64::max)
    }

    pub fn sample_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_count(&self) -> u64 {
        self.total_frames
    }

    pub fn reset(&mut self) {
        self.frames.clear();
        self.next = 0;
        self.last_timestamp = None;
        self.total_frames = 0;
    }
}
