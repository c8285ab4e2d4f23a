//! The annotation overlay: input state, frame canvas, persisted visibility
//! and export plumbing behind one handle.
//!
//! Hosts forward pointer and keyboard events through [`Overlay::input_mut`],
//! call [`Overlay::pump_commands`] after each event and repaint from
//! [`Overlay::render_frame`] whenever [`Overlay::needs_redraw`] is set.

use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use cairo::ImageSurface;

use crate::capture::{
    BytesCallback, ExclusionFilter, ExportDestination, ExportError, ExportManager, ExportRequest,
    ExportResult, FileSaveConfig, Viewport, chrome_filter,
};
use crate::config::{Command, Config, ExportConfig};
use crate::draw::{Canvas, RasterError, RasterImage, Scene};
use crate::input::{InputSettings, InputState};
use crate::store::{OverlayPreferences, PreferenceStore};

pub struct Overlay<S: PreferenceStore> {
    input: InputState,
    canvas: Canvas,
    prefs: OverlayPreferences<S>,
    export_config: ExportConfig,
    exports: Option<ExportManager>,
    exclude: ExclusionFilter,
    on_bytes: Option<BytesCallback>,
}

impl<S: PreferenceStore> Overlay<S> {
    /// Builds an overlay of `width` x `height` logical pixels.
    ///
    /// Visibility comes from the preference store, falling back to
    /// `overlay.visible_by_default`.
    pub fn new(config: &Config, store: S, width: u32, height: u32) -> Result<Self> {
        let command_map = config
            .keybindings
            .build_command_map()
            .map_err(|e| anyhow!("Invalid keybindings: {}", e))?;

        let prefs = OverlayPreferences::new(
            store,
            config.overlay.visibility_key.clone(),
            config.overlay.visible_by_default,
        );

        let mut input = InputState::new(InputSettings::from_config(config), command_map);
        input.set_overlay_visible(prefs.overlay_visible());
        input.set_dock_open(config.overlay.dock_open_by_default);

        let canvas = Canvas::new(width, height, config.overlay.device_scale)
            .context("failed to create overlay canvas")?;

        log::info!(
            "Overlay ready: {}x{} @{}x, visible={}",
            width,
            height,
            canvas.scale(),
            input.overlay_visible()
        );

        Ok(Self {
            input,
            canvas,
            prefs,
            export_config: config.export.clone(),
            exports: None,
            exclude: chrome_filter(),
            on_bytes: None,
        })
    }

    /// Enables export commands.
    pub fn with_export_manager(mut self, manager: ExportManager) -> Self {
        self.exports = Some(manager);
        self
    }

    /// Replaces the chrome filter handed to snapshot sources.
    pub fn set_exclusion_filter(&mut self, exclude: ExclusionFilter) {
        self.exclude = exclude;
    }

    /// Every successful export's PNG bytes are also passed to `callback`.
    pub fn set_bytes_callback(&mut self, callback: BytesCallback) {
        self.on_bytes = Some(callback);
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn preferences(&self) -> &OverlayPreferences<S> {
        &self.prefs
    }

    pub fn needs_redraw(&self) -> bool {
        self.input.needs_redraw
    }

    pub fn resize(&mut self, width: u32, height: u32, scale: f64) -> Result<(), RasterError> {
        self.canvas.resize(width, height, scale)?;
        self.input.needs_redraw = true;
        Ok(())
    }

    /// Replays the log, the live draft included, into the canvas.
    pub fn render_frame(&mut self) -> Result<&ImageSurface, RasterError> {
        self.canvas
            .render(&self.input.scene(), &self.input.settings.font)?;
        self.input.needs_redraw = false;
        Ok(self.canvas.surface())
    }

    /// Copy of the current frame.
    pub fn frame_snapshot(&mut self) -> Result<RasterImage, RasterError> {
        self.render_frame()?;
        self.canvas.snapshot()
    }

    /// Committed annotations only: drafts and open text sessions are not
    /// part of an export.
    fn export_frame(&mut self) -> Result<RasterImage, RasterError> {
        let scene = Scene::committed(self.input.actions());
        self.canvas.render(&scene, &self.input.settings.font)?;
        let image = self.canvas.snapshot();
        self.input.needs_redraw = true;
        image
    }

    pub fn overlay_visible(&self) -> bool {
        self.input.overlay_visible()
    }

    /// Shows or hides the overlay and persists the choice.
    pub fn set_overlay_visible(&mut self, visible: bool) {
        self.input.set_overlay_visible(visible);
        if let Err(e) = self.prefs.set_overlay_visible(visible) {
            log::warn!("Failed to persist overlay visibility: {}", e);
        }
    }

    pub fn toggle_overlay(&mut self) {
        self.set_overlay_visible(!self.input.overlay_visible());
    }

    /// Builds the export request for the current log.
    pub fn export_request(
        &mut self,
        destination: ExportDestination,
    ) -> Result<ExportRequest, ExportError> {
        let annotations = self.export_frame()?;
        let (width, height) = self.canvas.logical_size();

        Ok(ExportRequest {
            annotations,
            viewport: Viewport::new(width, height, self.canvas.scale()),
            exclude: self.exclude.clone(),
            destination,
            save_config: destination
                .wants_file()
                .then(|| FileSaveConfig::from_config(&self.export_config)),
            snapshot_timeout: Duration::from_millis(self.export_config.snapshot_timeout_ms),
            on_bytes: self.on_bytes.clone(),
        })
    }

    /// Starts a background export. Fails with `Busy` while one is running.
    pub fn request_export(&mut self, destination: ExportDestination) -> Result<(), ExportError> {
        let manager = self.exports.clone().ok_or(ExportError::NotRunning)?;
        manager.request_export(self.export_request(destination)?)
    }

    /// Runs an export to completion.
    pub async fn export(
        &mut self,
        destination: ExportDestination,
    ) -> Result<ExportResult, ExportError> {
        let manager = self.exports.clone().ok_or(ExportError::NotRunning)?;
        let request = self.export_request(destination)?;
        manager.export(request).await
    }

    /// Executes commands the input state queued for the host.
    pub fn pump_commands(&mut self) {
        while let Some(command) = self.input.take_pending_command() {
            match command {
                Command::ToggleOverlay => self.toggle_overlay(),
                Command::CopyExport => self.start_export(ExportDestination::ClipboardOnly),
                Command::SaveExport => self.start_export(ExportDestination::FileOnly),
                other => self.input.handle_command(other),
            }
        }
    }

    fn start_export(&mut self, destination: ExportDestination) {
        if let Err(e) = self.request_export(destination) {
            log::warn!("Export not started: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, MouseButton, Tool};
    use crate::store::MemoryStore;
    use crate::util::Point;

    fn overlay(store: MemoryStore) -> Overlay<MemoryStore> {
        Overlay::new(&Config::default(), store, 64, 48).unwrap()
    }

    fn draw_line(overlay: &mut Overlay<MemoryStore>) {
        let input = overlay.input_mut();
        input.select_tool(Tool::Pen);
        input.on_pointer_down(MouseButton::Left, Point::new(10.0, 10.0));
        input.on_pointer_move(Point::new(40.0, 10.0));
        input.on_pointer_up(MouseButton::Left, Point::new(40.0, 30.0));
    }

    #[test]
    fn visibility_comes_from_store() {
        let store = MemoryStore::new();
        store
            .set("overlay.visible", serde_json::Value::Bool(false))
            .unwrap();
        let overlay = overlay(store);
        assert!(!overlay.overlay_visible());
    }

    #[test]
    fn toggle_overlay_command_persists() {
        let mut overlay = overlay(MemoryStore::new());
        assert!(overlay.overlay_visible());

        let input = overlay.input_mut();
        input.on_key_press(Key::Ctrl);
        input.on_key_press(Key::Shift);
        input.on_key_press(Key::Char('A'));
        overlay.pump_commands();

        assert!(!overlay.overlay_visible());
        assert_eq!(
            overlay.preferences().store().get("overlay.visible").unwrap(),
            Some(serde_json::Value::Bool(false))
        );
    }

    #[test]
    fn render_frame_clears_redraw_flag() {
        let mut overlay = overlay(MemoryStore::new());
        draw_line(&mut overlay);
        assert!(overlay.needs_redraw());

        let surface = overlay.render_frame().unwrap();
        assert_eq!(surface.width(), 64);
        assert!(!overlay.needs_redraw());
        assert!(!overlay.frame_snapshot().unwrap().is_blank());
    }

    #[test]
    fn export_request_uses_committed_log() {
        let mut overlay = overlay(MemoryStore::new());
        {
            let input = overlay.input_mut();
            input.select_tool(Tool::Pen);
            input.on_pointer_down(MouseButton::Left, Point::new(10.0, 10.0));
            input.on_pointer_move(Point::new(40.0, 10.0));
        }

        let request = overlay.export_request(ExportDestination::BytesOnly).unwrap();
        assert!(request.annotations.is_blank());
        assert_eq!(request.viewport, Viewport::new(64, 48, 1.0));
        assert!(request.save_config.is_none());
        assert!(overlay.needs_redraw());
    }

    #[test]
    fn export_without_manager_is_not_running() {
        let mut overlay = overlay(MemoryStore::new());
        draw_line(&mut overlay);
        let err = overlay
            .request_export(ExportDestination::ClipboardOnly)
            .unwrap_err();
        assert!(matches!(err, ExportError::NotRunning));
    }
}
