//! Debug panel.

/// Floating "Debug" window with the texture toggle.
pub(crate) struct DebugPanel {
    textures: bool,
}

impl DebugPanel {
    pub fn new(textures_enabled: bool) -> Self {
        Self {
            textures: textures_enabled,
        }
    }

    /// Draw the panel. Returns the new toggle value when the user changed it.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<bool> {
        self.draw(ctx)
            .filter(egui::Response::changed)
            .map(|_| self.textures)
    }

    /// Draw the window and return the checkbox response, if it was laid out.
    fn draw(&mut self, ctx: &egui::Context) -> Option<egui::Response> {
        egui::Window::new("Debug")
            .default_open(true)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
            .show(ctx, |ui| ui.checkbox(&mut self.textures, "texture"))
            .and_then(|window| window.inner)
    }
}
