//! Core library for the WaveScope oscilloscope widget.
//!
//! The crate renders a real-time, trigger-stabilised time-domain trace of a
//! live audio signal onto an injected 2D drawing surface. Each module owns a
//! distinct concern: the host audio graph interface, the snapshot-producing
//! analyser, edge detection, the drawing-surface capability and the
//! render-loop state machine. Hosts drive the widget cooperatively: audio
//! blocks are pushed in as they arrive and one frame step runs per granted
//! display refresh.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod render;
pub mod surface;
pub mod trigger;

pub use analysis::{Analyser, SUPPORTED_FFT_SIZES};
pub use audio::{AudioContext, ChannelSplitter, ScopeTap, SourceHandle, DEFAULT_SAMPLE_RATE};
pub use config::ScopeConfig;
pub use error::{Result, WaveScopeError};
pub use render::{FrameScheduler, Oscilloscope};
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};
pub use trigger::{find_trigger, EdgeSlope};
