//! Presentation sinks driven by the selection controller.
//!
//! The controller never inspects rendering state; it only issues full-replace
//! commands. Two contracts exist:
//! - [`GeometryLayer`]: "show these polygons" / "clear" (selection and hover layers)
//! - [`HostForm`]: the token field, the count message, the view/select panel
//!   switch and the deep link
//!
//! Both come with a channel-backed implementation (`channel_layer`,
//! `channel_form`) so the UI thread can drain commands once per frame, and an
//! in-memory mirror (`LayerState`, `FormState`) that applies them.

use std::sync::mpsc::{Receiver, Sender};

use crate::data::grid::GeoPolygon;

/// Full-replace geometry sink.
pub trait GeometryLayer {
    fn show_geometries(&mut self, geometries: Vec<GeoPolygon>);
    fn clear(&mut self);
}

/// Messages sent over a layer channel.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerCommand {
    Show(Vec<GeoPolygon>),
    Clear,
}

/// Sender half of a geometry layer channel.
#[derive(Clone)]
pub struct LayerSink {
    tx: Sender<LayerCommand>,
}

/// Create a layer sink and the receiver the renderer drains.
pub fn channel_layer() -> (LayerSink, Receiver<LayerCommand>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (LayerSink { tx }, rx)
}

impl GeometryLayer for LayerSink {
    fn show_geometries(&mut self, geometries: Vec<GeoPolygon>) {
        if self.tx.send(LayerCommand::Show(geometries)).is_err() {
            tracing::trace!("geometry layer receiver dropped");
        }
    }

    fn clear(&mut self) {
        if self.tx.send(LayerCommand::Clear).is_err() {
            tracing::trace!("geometry layer receiver dropped");
        }
    }
}

/// What a layer currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerState {
    pub geometries: Vec<GeoPolygon>,
}

impl LayerState {
    pub fn apply(&mut self, cmd: LayerCommand) {
        match cmd {
            LayerCommand::Show(geometries) => self.geometries = geometries,
            LayerCommand::Clear => self.geometries.clear(),
        }
    }

    /// Apply every pending command. Returns `true` if anything arrived.
    pub fn drain(&mut self, rx: &Receiver<LayerCommand>) -> bool {
        let mut changed = false;
        while let Ok(cmd) = rx.try_recv() {
            self.apply(cmd);
            changed = true;
        }
        changed
    }
}

impl GeometryLayer for LayerState {
    fn show_geometries(&mut self, geometries: Vec<GeoPolygon>) {
        self.apply(LayerCommand::Show(geometries));
    }

    fn clear(&mut self) {
        self.apply(LayerCommand::Clear);
    }
}

/// Which set of form controls is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelMode {
    /// "Grab some data" start button.
    #[default]
    View,
    /// Cancel / reset / submit controls while picking cells.
    Select,
}

/// The host form the selection is written into.
pub trait HostForm {
    /// Value of the hidden `cells` field.
    fn set_token(&mut self, token: &str);
    /// Human readable count message.
    fn set_status(&mut self, message: &str);
    fn set_panel_mode(&mut self, mode: PanelMode);
    fn set_deep_link(&mut self, url: &str);
}

/// Messages sent over a form channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Token(String),
    Status(String),
    Panel(PanelMode),
    DeepLink(String),
}

/// Sender half of a host form channel.
#[derive(Clone)]
pub struct FormSink {
    tx: Sender<FormCommand>,
}

/// Create a form sink and the receiver the UI drains.
pub fn channel_form() -> (FormSink, Receiver<FormCommand>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (FormSink { tx }, rx)
}

impl FormSink {
    fn send(&self, cmd: FormCommand) {
        if self.tx.send(cmd).is_err() {
            tracing::trace!("host form receiver dropped");
        }
    }
}

impl HostForm for FormSink {
    fn set_token(&mut self, token: &str) {
        self.send(FormCommand::Token(token.to_string()));
    }

    fn set_status(&mut self, message: &str) {
        self.send(FormCommand::Status(message.to_string()));
    }

    fn set_panel_mode(&mut self, mode: PanelMode) {
        self.send(FormCommand::Panel(mode));
    }

    fn set_deep_link(&mut self, url: &str) {
        self.send(FormCommand::DeepLink(url.to_string()));
    }
}

/// Current contents of the host form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub token: String,
    pub status: String,
    pub panel: PanelMode,
    pub deep_link: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            token: String::new(),
            status: "Select at least one cell from the map.".to_string(),
            panel: PanelMode::View,
            deep_link: None,
        }
    }
}

impl FormState {
    pub fn apply(&mut self, cmd: FormCommand) {
        match cmd {
            FormCommand::Token(t) => self.token = t,
            FormCommand::Status(s) => self.status = s,
            FormCommand::Panel(p) => self.panel = p,
            FormCommand::DeepLink(l) => self.deep_link = Some(l),
        }
    }

    /// Apply every pending command. Returns `true` if anything arrived.
    pub fn drain(&mut self, rx: &Receiver<FormCommand>) -> bool {
        let mut changed = false;
        while let Ok(cmd) = rx.try_recv() {
            self.apply(cmd);
            changed = true;
        }
        changed
    }
}

impl HostForm for FormState {
    fn set_token(&mut self, token: &str) {
        self.token = token.to_string();
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
    }

    fn set_panel_mode(&mut self, mode: PanelMode) {
        self.panel = mode;
    }

    fn set_deep_link(&mut self, url: &str) {
        self.deep_link = Some(url.to_string());
    }
}
