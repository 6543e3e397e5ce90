//! The shell: host application, panels, chrome and unlock prompt wired to the
//! input stream.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::appearance::Appearance;
use crate::chrome::{CHROME_HEIGHT, Chrome};
use crate::content::{ContentLoader, ContentSource};
use crate::error::{ShellError, ShellResult};
use crate::host::HostView;
use crate::keybindings::{Action, KeyBindings, PanelSlot};
use crate::overlay::{
    ClampMargins, FrameDecorator, PanelId, PanelRegistry, PanelSpec, Viewport, ViewportMonitor,
};
use crate::prefs::PreferenceStore;
use crate::ui::UiFrame;
use crate::unlock::{GateResponse, UnlockGate};

pub const DEFAULT_DIAGNOSTIC_COMMAND: &str = "top";
pub const LEADERBOARD_DOCUMENT: &str = "leaderboard.md";

/// Startup settings gathered from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub assets: PathBuf,
    pub unlock_code: Option<String>,
    pub diagnostic_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            unlock_code: None,
            diagnostic_command: DEFAULT_DIAGNOSTIC_COMMAND.to_string(),
        }
    }
}

/// The three panels, in declaration order.
pub fn default_panel_specs(config: &Config) -> Vec<PanelSpec> {
    vec![
        PanelSpec::new(
            PanelSlot::Leaderboard.id(),
            PanelSlot::Leaderboard.label(),
            ContentSource::document(LEADERBOARD_DOCUMENT),
        )
        .at(4, 4)
        .sized(48, 16),
        PanelSpec::new(
            PanelSlot::ToolA.id(),
            PanelSlot::ToolA.label(),
            ContentSource::command(config.diagnostic_command.clone()),
        )
        .at(10, 6)
        .sized(80, 22)
        .gated(),
        PanelSpec::new(
            PanelSlot::ToolB.id(),
            PanelSlot::ToolB.label(),
            ContentSource::EventLog,
        )
        .at(16, 8)
        .sized(72, 18)
        .gated(),
    ]
}

pub struct App {
    registry: PanelRegistry,
    monitor: ViewportMonitor,
    host: Option<HostView>,
    gate: UnlockGate,
    prefs: PreferenceStore,
    appearance: Appearance,
    bindings: KeyBindings,
    chrome: Chrome,
    decorator: FrameDecorator,
    mouse_capture_enabled: bool,
    mouse_capture_dirty: bool,
    quit: bool,
}

impl App {
    pub fn new(
        config: &Config,
        loader: Box<dyn ContentLoader>,
        host: Option<HostView>,
        prefs: PreferenceStore,
        viewport: Viewport,
    ) -> ShellResult<Self> {
        let registry =
            PanelRegistry::from_specs(default_panel_specs(config), ClampMargins::chrome(), loader)?;
        let gate = UnlockGate::new(config.unlock_code.clone());
        if !gate.is_configured() {
            info!("no unlock code configured; diagnostic panels stay locked");
        }
        Ok(Self::from_parts(registry, host, gate, prefs, viewport))
    }

    pub fn from_parts(
        registry: PanelRegistry,
        host: Option<HostView>,
        gate: UnlockGate,
        prefs: PreferenceStore,
        viewport: Viewport,
    ) -> Self {
        let appearance = Appearance::from_prefs(&prefs);
        Self {
            registry,
            monitor: ViewportMonitor::new(viewport),
            host,
            gate,
            prefs,
            appearance,
            bindings: KeyBindings::standard(),
            chrome: Chrome::new(),
            decorator: FrameDecorator,
            mouse_capture_enabled: true,
            mouse_capture_dirty: false,
            quit: false,
        }
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn viewport(&self) -> Viewport {
        self.monitor.viewport()
    }

    pub fn gate(&self) -> &UnlockGate {
        &self.gate
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn mouse_capture_enabled(&self) -> bool {
        self.mouse_capture_enabled
    }

    /// Turning capture off hands the mouse back to the terminal, so any drag
    /// in progress ends here; no pointer-up will follow.
    pub fn set_mouse_capture_enabled(&mut self, enabled: bool) {
        if self.mouse_capture_enabled == enabled {
            return;
        }
        if !enabled {
            self.registry.release_pointer_capture();
        }
        info!(enabled, "mouse capture");
        self.mouse_capture_enabled = enabled;
        self.mouse_capture_dirty = true;
    }

    /// The capture setting, once per change, for the input driver to apply.
    pub fn take_mouse_capture_change(&mut self) -> Option<bool> {
        if !self.mouse_capture_dirty {
            return None;
        }
        self.mouse_capture_dirty = false;
        Some(self.mouse_capture_enabled)
    }

    /// Ask for a panel by id the way the toolbar does: gated panels that are
    /// hidden go through the unlock prompt.
    pub fn request_panel(&mut self, id: &str) -> ShellResult<()> {
        let Some(panel) = self.registry.panel(id) else {
            return Err(ShellError::UnknownPanel(id.to_string()));
        };
        if panel.spec().gated && !panel.is_visible() {
            self.registry.release_pointer_capture();
            self.gate.open(PanelId::from(id));
        } else {
            self.registry.open(id, self.viewport());
        }
        Ok(())
    }

    pub fn perform(&mut self, action: Action) {
        debug!(%action, "action");
        match action {
            Action::Quit => self.quit = true,
            Action::TogglePanel(slot) => {
                if let Err(err) = self.request_panel(slot.id()) {
                    warn!(%err, "toggle ignored");
                }
            }
            Action::CloseTopmost => {
                self.registry.hide_topmost();
            }
            Action::CycleFilter => {
                self.appearance.cycle_filter(&mut self.prefs);
            }
            Action::CycleBackground => {
                self.appearance.cycle_background(&mut self.prefs);
            }
            Action::ToggleMouseCapture => {
                self.set_mouse_capture_enabled(!self.mouse_capture_enabled);
            }
        }
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Resize(width, height) => {
                self.monitor.on_resize(*width, *height, &mut self.registry);
                if let Some(host) = &mut self.host {
                    host.request_resize(Chrome::host_area(Rect::new(0, 0, *width, *height)), now);
                }
            }
            Event::FocusLost => {
                self.registry.release_pointer_capture();
            }
            Event::FocusGained => {}
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(_) => {
                if self.gate.is_active() {
                    return;
                }
                if !self.registry.handle_key(event)
                    && let Some(host) = &mut self.host
                {
                    host.handle_event(event);
                }
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        match self.gate.handle_key(key) {
            GateResponse::Ignored => {}
            GateResponse::Signal(signal) => {
                let viewport = self.viewport();
                self.registry.apply_signal(signal, viewport);
                return;
            }
            GateResponse::Consumed | GateResponse::Cancelled | GateResponse::Rejected => return,
        }
        if let Some(action) = self.bindings.action_for_key(key) {
            self.perform(action);
            return;
        }
        let event = Event::Key(*key);
        if !self.registry.handle_key(&event)
            && let Some(host) = &mut self.host
        {
            host.handle_event(&event);
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        if self.gate.is_active() {
            match mouse.kind {
                MouseEventKind::Down(_) => {
                    let prompt = UnlockGate::rect_for(self.screen());
                    if !prompt.contains((mouse.column, mouse.row).into()) {
                        self.gate.cancel();
                    }
                }
                MouseEventKind::Up(_) => {
                    self.registry.release_pointer_capture();
                }
                _ => {}
            }
            return;
        }
        if self.registry.capture().is_none() && mouse.row < CHROME_HEIGHT {
            if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                && let Some(action) = self.chrome.hit(mouse.column, mouse.row)
            {
                self.perform(action);
            }
            return;
        }
        let viewport = self.viewport();
        if self.registry.handle_mouse(mouse, viewport) {
            return;
        }
        if let Some(host) = &mut self.host {
            host.handle_event(&Event::Mouse(*mouse));
        }
    }

    /// Time-driven work: settle a pending host resize and notice the host
    /// exiting.
    pub fn tick(&mut self, now: Instant) {
        let Some(host) = &mut self.host else {
            return;
        };
        host.tick(now);
        if host.finished() {
            info!("host application exited");
            self.quit = true;
        }
    }

    fn screen(&self) -> Rect {
        let viewport = self.viewport();
        Rect::new(0, 0, viewport.width, viewport.height)
    }

    pub fn draw(&mut self, frame: &mut UiFrame<'_>) {
        let screen = frame.area();
        let host_area = Chrome::host_area(screen);
        let host_focused = !self.gate.is_active() && self.registry.topmost().is_none();
        if let Some(host) = &mut self.host {
            host.render(frame, host_focused);
        }
        self.appearance
            .paint_background(frame.buffer_mut(), host_area);
        self.appearance.filter_host(frame.buffer_mut(), host_area);
        self.registry.render(frame, &self.decorator);
        self.chrome
            .render(frame, &self.bindings, &self.registry, self.appearance);
        self.gate.render(frame, screen);
        self.appearance.filter_screen(frame.buffer_mut(), screen);
    }
}
