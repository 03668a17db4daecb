use serde::Serialize;

use crate::Result;

/// Minimal 2D surface capability the renderer draws through.
///
/// `device_size` reports the dimensions the environment currently wants the
/// surface to have (layout size with the device pixel ratio applied);
/// `resize` commits them to the backing store, which the renderer does every
/// frame so responsive layouts stay sharp. The path calls mirror an
/// immediate-mode 2D canvas.
pub trait DrawSurface {
    /// Target width and height in device pixels.
    fn device_size(&self) -> (f32, f32);
    /// Resizes the backing store.
    fn resize(&mut self, width: f32, height: f32);
    /// Fills the whole surface with an opaque color string.
    fn fill(&mut self, color: &str);
    /// Starts a new stroke path.
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    /// Strokes the accumulated path.
    fn stroke(&mut self, color: &str, width: f32);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawCommand {
    Resize { width: f32, height: f32 },
    Fill { color: String },
    BeginPath,
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    Stroke { color: String, width: f32 },
}

/// Headless surface recording every drawing call.
///
/// Serves as the injected test double for the renderer and as the backend
/// for the command line demo, which serialises the log to JSON.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    device_width: f32,
    device_height: f32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(device_width: f32, device_height: f32) -> Self {
        Self {
            device_width,
            device_height,
            commands: Vec::new(),
        }
    }

    /// Simulates a layout or device-pixel-ratio change picked up on the next
    /// frame.
    pub fn set_device_size(&mut self, width: f32, height: f32) {
        self.device_width = width;
        self.device_height = height;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Serialises the recorded command log to a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.commands)?)
    }
}

impl DrawSurface for RecordingSurface {
    fn device_size(&self) -> (f32, f32) {
        (self.device_width, self.device_height)
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.commands.push(DrawCommand::Resize { width, height });
    }

    fn fill(&mut self, color: &str) {
        self.commands.push(DrawCommand::Fill {
            color: color.to_string(),
        });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn stroke(&mut self, color: &str, width: f32) {
        self.commands.push(DrawCommand::Stroke {
            color: color.to_string(),
            width,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_drawing_calls_in_order() {
        let mut surface = RecordingSurface::new(10.0, 20.0);
        assert_eq!(surface.device_size(), (10.0, 20.0));

        surface.resize(10.0, 20.0);
        surface.fill("black");
        surface.begin_path();
        surface.move_to(0.0, 1.0);
        surface.line_to(2.0, 3.0);
        surface.stroke("gray", 5.0);

        assert_eq!(
            surface.commands(),
            &[
                DrawCommand::Resize {
                    width: 10.0,
                    height: 20.0
                },
                DrawCommand::Fill {
                    color: "black".to_string()
                },
                DrawCommand::BeginPath,
                DrawCommand::MoveTo { x: 0.0, y: 1.0 },
                DrawCommand::LineTo { x: 2.0, y: 3.0 },
                DrawCommand::Stroke {
                    color: "gray".to_string(),
                    width: 5.0
                },
            ]
        );
    }

    #[test]
    fn device_size_tracks_layout_changes_without_recording() {
        let mut surface = RecordingSurface::new(10.0, 20.0);
        surface.set_device_size(40.0, 30.0);
        assert_eq!(surface.device_size(), (40.0, 30.0));
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn serialises_the_command_log_to_json() {
        let mut surface = RecordingSurface::default();
        surface.begin_path();
        surface.move_to(1.0, 2.0);

        let json = surface.to_json().unwrap();
        assert!(json.contains("beginPath"));
        assert!(json.contains("moveTo"));
    }
}
