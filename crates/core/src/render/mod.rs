use tracing::debug;

use crate::{
    find_trigger, AudioContext, DrawSurface, Result, ScopeConfig, ScopeTap, SourceHandle,
};

/// Host capability standing in for the per-frame callback facility: ask the
/// environment to invoke [`Oscilloscope::frame`] once, roughly at the next
/// display refresh.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Embeddable oscilloscope widget owning the drawing surface, the signal tap
/// and the render-loop state.
///
/// The widget is armed with [`start`](Self::start) and disarmed with
/// [`stop`](Self::stop). While armed, the host invokes
/// [`frame`](Self::frame) for every granted frame request and the widget
/// re-requests until stopped; a request granted after `stop` runs once as a
/// no-op. Audio reaches the trace through [`connect`](Self::connect) and
/// [`push_block`](Self::push_block), independently of the render lifecycle.
#[derive(Debug)]
pub struct Oscilloscope<S: DrawSurface> {
    surface: S,
    tap: ScopeTap,
    config: ScopeConfig,
    data: Option<Vec<u8>>,
    running: bool,
}

impl<S: DrawSurface> Oscilloscope<S> {
    /// Builds the widget. The context is used to create the two-channel
    /// splitting junction and the analyser, then dropped; an unsupported
    /// `fft_size` is rejected by the analyser and the failure propagates
    /// unmodified.
    pub fn new(surface: S, ctx: &AudioContext, config: ScopeConfig) -> Result<Self> {
        let splitter = ctx.create_splitter(2);
        let analyser = ctx.create_analyser(config.fft_size)?;
        Ok(Self {
            surface,
            tap: ScopeTap::new(splitter, analyser),
            config,
            data: None,
            running: false,
        })
    }

    /// Attaches an external producer to the tap.
    pub fn connect(&mut self, source: &SourceHandle) {
        self.tap.connect(source);
    }

    /// Detaches a previously attached producer.
    pub fn disconnect(&mut self, source: &SourceHandle) -> Result<()> {
        self.tap.disconnect(source)
    }

    /// Feeds an interleaved block from `source` into the tap.
    pub fn push_block(&mut self, source: &SourceHandle, interleaved: &[f32]) {
        self.tap.push_block(source, interleaved);
    }

    /// True between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Arms the render loop: allocates the snapshot buffer at the analyser's
    /// current output length and requests the first frame. Starting while
    /// already running re-arms with a freshly allocated buffer.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.running = true;
        self.data = Some(vec![0; self.tap.snapshot_len()]);
        debug!(samples = self.tap.snapshot_len(), "render loop armed");
        scheduler.request_frame();
    }

    /// Disarms the loop and releases the snapshot buffer. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
        self.data = None;
        debug!("render loop disarmed");
    }

    /// One frame step: refresh the snapshot, redraw the trace, request the
    /// next frame. Does nothing once stopped.
    pub fn frame(&mut self, scheduler: &mut dyn FrameScheduler) {
        if !self.running {
            return;
        }
        let Some(data) = self.data.as_mut() else {
            return;
        };
        self.tap.fill_snapshot(data);

        let (width, height) = self.surface.device_size();
        self.surface.resize(width, height);
        // Stretch the buffer to twice the width: the visible window is the
        // first half past the trigger point.
        let step = (2.0 * width) / data.len() as f32;

        self.surface.fill(&self.config.background_color);

        let start = find_trigger(data, self.config.edge_threshold, self.config.edge_slope);
        self.surface.begin_path();
        let mut x = 0.0;
        for (i, &sample) in data.iter().enumerate().skip(start) {
            let v = f32::from(sample) / 128.0;
            let y = v * height / 2.0;
            if i == start {
                self.surface.move_to(x, y);
            } else {
                self.surface.line_to(x, y);
            }
            x += step;
        }
        self.surface.stroke(&self.config.line_color, self.config.line_width);

        scheduler.request_frame();
    }
}
