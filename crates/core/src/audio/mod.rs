use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::{Analyser, Result, WaveScopeError};

/// Audio rate used by hosts that do not specify their own.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle identifying an external audio producer within the host graph.
///
/// Handles are plain identities: the producer keeps pushing interleaved
/// blocks and the tap decides, from its current topology, whether a block
/// carries signal into the analyser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceHandle {
    id: u64,
    channels: usize,
}

impl SourceHandle {
    /// Number of interleaved channels in this producer's blocks.
    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// Host audio environment: carries the audio rate and creates the graph
/// pieces the widget needs. The widget uses it during construction and never
/// stores it.
#[derive(Debug, Clone)]
pub struct AudioContext {
    sample_rate: u32,
}

impl AudioContext {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Creates a splitting junction with the given fan-out.
    pub fn create_splitter(&self, outputs: usize) -> ChannelSplitter {
        ChannelSplitter::new(outputs)
    }

    /// Creates a time-domain analyser at this context's audio rate. Sizes
    /// outside the supported set are rejected by the analyser itself and the
    /// failure propagates unmodified.
    pub fn create_analyser(&self, fft_size: usize) -> Result<Analyser> {
        Analyser::new(fft_size, self.sample_rate)
    }

    /// Registers a new external producer with `channels` interleaved
    /// channels and returns its handle.
    pub fn create_source(&self, channels: usize) -> SourceHandle {
        SourceHandle {
            id: NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed),
            channels: channels.max(1),
        }
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

/// Fan-out junction exposing the channels of an interleaved stream as
/// numbered outputs. Outputs beyond a block's channel count are silent;
/// outputs beyond the junction's fan-out carry nothing.
#[derive(Debug, Clone)]
pub struct ChannelSplitter {
    outputs: usize,
}

impl ChannelSplitter {
    fn new(outputs: usize) -> Self {
        Self {
            outputs: outputs.max(1),
        }
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Copies output `output` of `interleaved` (carrying `channels`
    /// interleaved channels) into `out`, one sample per frame.
    pub fn extract(&self, interleaved: &[f32], channels: usize, output: usize, out: &mut Vec<f32>) {
        out.clear();
        if output >= self.outputs {
            return;
        }
        let channels = channels.max(1);
        let frames = interleaved.len() / channels;
        if output >= channels {
            out.resize(frames, 0.0);
            return;
        }
        out.extend(
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame[output]),
        );
    }
}

/// Signal tap of the widget: a two-channel splitting junction whose first
/// output feeds the analyser, plus the set of producer edges currently
/// attached to the junction.
#[derive(Debug)]
pub struct ScopeTap {
    splitter: ChannelSplitter,
    analyser: Analyser,
    edges: BTreeSet<u64>,
    scratch: Vec<f32>,
}

impl ScopeTap {
    pub fn new(splitter: ChannelSplitter, analyser: Analyser) -> Self {
        Self {
            splitter,
            analyser,
            edges: BTreeSet::new(),
            scratch: Vec::new(),
        }
    }

    /// Adds an edge from `source` into the junction. Repeat connections of
    /// the same source collapse into one edge, as in the host graph the tap
    /// models.
    pub fn connect(&mut self, source: &SourceHandle) {
        self.edges.insert(source.id);
    }

    /// Removes the edge from `source`. The graph reports removal of an edge
    /// that does not exist; the error passes through unmodified.
    pub fn disconnect(&mut self, source: &SourceHandle) -> Result<()> {
        if self.edges.remove(&source.id) {
            Ok(())
        } else {
            Err(WaveScopeError::NotConnected)
        }
    }

    pub fn is_connected(&self, source: &SourceHandle) -> bool {
        self.edges.contains(&source.id)
    }

    /// Forwards an interleaved block from `source` through the junction's
    /// first output into the analyser. Blocks from sources without a current
    /// edge carry no signal and are dropped.
    pub fn push_block(&mut self, source: &SourceHandle, interleaved: &[f32]) {
        if !self.is_connected(source) {
            trace!(channels = source.channels(), "dropping block from unconnected source");
            return;
        }
        self.splitter
            .extract(interleaved, source.channels(), 0, &mut self.scratch);
        self.analyser.push_samples(&self.scratch);
    }

    /// Length of the snapshots the tap's analyser produces.
    pub fn snapshot_len(&self) -> usize {
        self.analyser.time_domain_len()
    }

    /// Overwrites `out` with the analyser's current snapshot.
    pub fn fill_snapshot(&self, out: &mut [u8]) {
        self.analyser.fill_time_domain(out);
    }

    pub fn analyser(&self) -> &Analyser {
        &self.analyser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_tap(fft_size: usize) -> (AudioContext, ScopeTap) {
        let ctx = AudioContext::default();
        let splitter = ctx.create_splitter(2);
        let analyser = ctx.create_analyser(fft_size).expect("supported size");
        (ctx, ScopeTap::new(splitter, analyser))
    }

    fn snapshot(tap: &ScopeTap) -> Vec<u8> {
        let mut out = vec![0u8; tap.snapshot_len()];
        tap.fill_snapshot(&mut out);
        out
    }

    #[test]
    fn splitter_separates_interleaved_channels() {
        let splitter = ChannelSplitter::new(2);
        assert_eq!(splitter.outputs(), 2);
        let block = [1.0, -1.0, 0.5, -0.5];

        let mut out = Vec::new();
        splitter.extract(&block, 2, 0, &mut out);
        assert_eq!(out, vec![1.0, 0.5]);
        splitter.extract(&block, 2, 1, &mut out);
        assert_eq!(out, vec![-1.0, -0.5]);
    }

    #[test]
    fn splitter_outputs_silence_for_missing_channels() {
        let splitter = ChannelSplitter::new(2);
        let mono = [0.25, 0.75];

        let mut out = Vec::new();
        splitter.extract(&mono, 1, 1, &mut out);
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn splitter_carries_nothing_beyond_its_fan_out() {
        let splitter = ChannelSplitter::new(2);
        let block = [1.0, -1.0, 0.5, -0.5];

        let mut out = vec![9.0];
        splitter.extract(&block, 2, 2, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn source_handles_are_unique() {
        let ctx = AudioContext::default();
        let first = ctx.create_source(2);
        let second = ctx.create_source(2);
        assert_ne!(first, second);
        assert_eq!(first.channels(), 2);
    }

    #[test]
    fn unconnected_sources_never_reach_the_analyser() {
        let (ctx, mut tap) = stereo_tap(32);
        assert_eq!(tap.analyser().sample_rate(), DEFAULT_SAMPLE_RATE);

        let source = ctx.create_source(1);
        tap.push_block(&source, &[1.0; 32]);
        assert!(snapshot(&tap).iter().all(|&byte| byte == 128));
    }

    #[test]
    fn connected_sources_flow_through_the_first_channel() {
        let (ctx, mut tap) = stereo_tap(32);
        let source = ctx.create_source(2);
        tap.connect(&source);

        // left at full positive scale, right inverted; only the left lands
        let mut block = Vec::new();
        for _ in 0..32 {
            block.push(1.0);
            block.push(-1.0);
        }
        tap.push_block(&source, &block);
        assert!(snapshot(&tap).iter().all(|&byte| byte == 255));
    }

    #[test]
    fn disconnect_requires_an_existing_edge() {
        let (ctx, mut tap) = stereo_tap(32);
        let source = ctx.create_source(1);

        assert!(matches!(
            tap.disconnect(&source),
            Err(WaveScopeError::NotConnected)
        ));

        tap.connect(&source);
        tap.connect(&source);
        assert!(tap.is_connected(&source));
        tap.disconnect(&source).expect("edge exists");
        assert!(matches!(
            tap.disconnect(&source),
            Err(WaveScopeError::NotConnected)
        ));
    }

    #[test]
    fn blocks_after_disconnect_are_dropped() {
        let (ctx, mut tap) = stereo_tap(32);
        let source = ctx.create_source(1);
        tap.connect(&source);
        tap.push_block(&source, &[1.0; 32]);

        tap.disconnect(&source).expect("edge exists");
        tap.push_block(&source, &[-1.0; 32]);
        assert!(snapshot(&tap).iter().all(|&byte| byte == 255));
    }
}
