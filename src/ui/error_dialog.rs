// ── Program-error dialog: event model and controller ─────────────────────────
//
// Pure Rust state machine for the modal error dialog.  The Win32 dialog
// procedure translates window messages into `DialogEvent`s and implements
// `DialogHost` over the real controls; tests drive the same controller with
// an in-memory host.

use bitflags::bitflags;

use crate::{
    config::ErrorDialogConfig,
    error::Result,
    ui::anchor::{Anchors, Point, Rect, ResizeState, Size},
};

bitflags! {
    /// Options passed along with the error text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DialogFlags: u32 {
        /// Enable the Suppress button.
        const ALLOW_SUPPRESS = 0x1;
        /// The caller will break into the debugger itself; informational.
        const MANUAL_BREAK = 0x2;
    }
}

/// The user's answer to the error dialog.
///
/// The discriminants double as the dialog result codes, so `0` and `-1`
/// (the failure values of the modal dialog call) never collide with a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReaction {
    /// Ignore the error and carry on.
    Continue = 1,
    /// Carry on and do not report this error again.
    Suppress = 2,
    /// Break into the debugger.
    Break = 3,
    /// Terminate the program.
    Exit = 4,
}

impl ErrorReaction {
    pub fn code(self) -> isize {
        self as isize
    }

    /// Map a dialog result code back to a reaction.
    pub fn from_code(code: isize) -> Option<Self> {
        match code {
            1 => Some(Self::Continue),
            2 => Some(Self::Suppress),
            3 => Some(Self::Break),
            4 => Some(Self::Exit),
            _ => None,
        }
    }
}

// ── Controls ──────────────────────────────────────────────────────────────────

/// The push buttons along the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Continue,
    Suppress,
    Break,
    Exit,
    Copy,
}

/// Every control in the dialog, with its dialog item ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    Text,
    Button(ButtonId),
}

impl ControlId {
    pub const ALL: [ControlId; 6] = [
        ControlId::Text,
        ControlId::Button(ButtonId::Continue),
        ControlId::Button(ButtonId::Suppress),
        ControlId::Button(ButtonId::Break),
        ControlId::Button(ButtonId::Exit),
        ControlId::Button(ButtonId::Copy),
    ];

    pub fn item_id(self) -> i32 {
        match self {
            Self::Text => 1000,
            Self::Button(ButtonId::Continue) => 1001,
            Self::Button(ButtonId::Suppress) => 1002,
            Self::Button(ButtonId::Break) => 1003,
            Self::Button(ButtonId::Exit) => 1004,
            Self::Button(ButtonId::Copy) => 1005,
        }
    }

    pub fn from_item_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.item_id() == id)
    }

    /// Edges the control follows when the dialog is resized.
    pub fn anchors(self) -> Anchors {
        match self {
            Self::Text => Anchors::ALL,
            Self::Button(ButtonId::Copy) => Anchors::RIGHT | Anchors::BOTTOM,
            Self::Button(_) => Anchors::LEFT | Anchors::BOTTOM,
        }
    }
}

impl From<ButtonId> for ControlId {
    fn from(b: ButtonId) -> Self {
        Self::Button(b)
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeKind {
    Restored,
    Minimized,
    Maximized,
}

/// The messages the dialog reacts to.
#[derive(Debug)]
pub enum DialogEvent<'a> {
    Init,
    Command(ButtonId),
    /// New client-area size.
    Resize { kind: ResizeKind, size: Size },
    /// New screen position of the client area's top-left corner.
    Move(Point),
    /// The window manager asks for the minimum tracking size (96-DPI pixels).
    MinMaxQuery(&'a mut Size),
    /// The caption's close box or Alt+F4.
    SystemClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Handled,
    PassThrough,
}

/// What the controller needs from the window that hosts it.
pub trait DialogHost {
    /// Current bounds of a control in screen coordinates.
    fn control_rect(&self, id: ControlId) -> Option<Rect>;
    /// Place a control at `rect` in client coordinates.
    fn move_control(&mut self, id: ControlId, rect: Rect);
    fn disable_control(&mut self, id: ControlId);
    fn use_fixed_font(&mut self, id: ControlId);
    fn set_text(&mut self, id: ControlId, text: &[u16]);
    /// Copy the control's text into `buf`; returns the number of units written.
    fn read_text(&self, id: ControlId, buf: &mut [u16]) -> usize;
    fn copy_to_clipboard(&mut self, text: &[u16]) -> Result<()>;
    /// Close the dialog with `reaction` as its result.
    fn end(&mut self, reaction: ErrorReaction);
}

// ── Controller ────────────────────────────────────────────────────────────────

/// State of one open error dialog.
pub struct ErrorDialog {
    text: Vec<u16>,
    flags: DialogFlags,
    min_track: Size,
    copy_buffer_chars: usize,
    fixed_font: bool,
    resize: ResizeState,
    reaction: Option<ErrorReaction>,
}

impl ErrorDialog {
    /// `text` is what the text area shows, already in edit-control form
    /// (see [`edit_text`]).
    pub fn new(text: Vec<u16>, flags: DialogFlags, config: &ErrorDialogConfig) -> Self {
        Self {
            text,
            flags,
            min_track: Size {
                width: config.min_track_width,
                height: config.min_track_height,
            },
            copy_buffer_chars: config.copy_buffer_chars,
            fixed_font: config.fixed_font,
            resize: ResizeState::new(),
            reaction: None,
        }
    }

    /// The choice the dialog was dismissed with, once it has been.
    pub fn reaction(&self) -> Option<ErrorReaction> {
        self.reaction
    }

    pub fn handle<H: DialogHost>(&mut self, host: &mut H, event: DialogEvent<'_>) -> EventOutcome {
        match event {
            DialogEvent::Init => {
                self.init(host);
                EventOutcome::Handled
            }
            DialogEvent::Command(ButtonId::Copy) => {
                self.copy(host);
                EventOutcome::Handled
            }
            DialogEvent::Command(button) => {
                let reaction = match button {
                    ButtonId::Suppress => ErrorReaction::Suppress,
                    ButtonId::Break => ErrorReaction::Break,
                    ButtonId::Exit => ErrorReaction::Exit,
                    ButtonId::Continue | ButtonId::Copy => ErrorReaction::Continue,
                };
                self.dismiss(host, reaction);
                EventOutcome::Handled
            }
            DialogEvent::SystemClose => {
                self.dismiss(host, ErrorReaction::Continue);
                EventOutcome::Handled
            }
            DialogEvent::Move(origin) => {
                self.resize.record_origin(origin);
                EventOutcome::PassThrough
            }
            DialogEvent::Resize { kind, size } => {
                // Minimizing would push controls to negative coordinates,
                // which Windows clips; restoring could then not undo it.
                if kind != ResizeKind::Minimized {
                    self.relayout(host, size);
                }
                EventOutcome::PassThrough
            }
            DialogEvent::MinMaxQuery(min_track) => {
                *min_track = self.min_track;
                EventOutcome::Handled
            }
        }
    }

    fn init<H: DialogHost>(&mut self, host: &mut H) {
        self.resize = ResizeState::new();
        self.reaction = None;

        if !self.flags.contains(DialogFlags::ALLOW_SUPPRESS) {
            host.disable_control(ButtonId::Suppress.into());
        }
        if self.fixed_font {
            host.use_fixed_font(ControlId::Text);
        }
        host.set_text(ControlId::Text, &self.text);
    }

    fn copy<H: DialogHost>(&self, host: &mut H) {
        // Too big for the stack; lives only for this click.
        let mut buf = vec![0u16; self.copy_buffer_chars];
        let len = host.read_text(ControlId::Text, &mut buf);
        if let Err(e) = host.copy_to_clipboard(&buf[..len]) {
            log::warn!("error dialog: copy to clipboard failed: {e}");
        }
    }

    fn dismiss<H: DialogHost>(&mut self, host: &mut H, reaction: ErrorReaction) {
        log::debug!("error dialog: dismissed with {reaction:?}");
        self.reaction = Some(reaction);
        host.end(reaction);
    }

    fn relayout<H: DialogHost>(&mut self, host: &mut H, size: Size) {
        let Some(delta) = self.resize.on_resize(size) else {
            return;
        };
        log::trace!("error dialog: resize by {delta:?}");

        let origin = self.resize.origin();
        for id in ControlId::ALL {
            if let Some(screen) = host.control_rect(id) {
                let rect = screen.relative_to(origin).anchored(delta, id.anchors());
                host.move_control(id, rect);
            }
        }
    }
}

// ── Text conversion ───────────────────────────────────────────────────────────

/// Convert `text` to UTF-16 for a multiline edit control, which only breaks
/// lines at `\r\n`.  No terminator is appended.
pub fn edit_text(text: &str) -> Vec<u16> {
    let units: Vec<u16> = text.encode_utf16().collect();
    edit_text_wide(&units)
}

/// [`edit_text`] for text that is already UTF-16.  Stops at the first NUL.
pub fn edit_text_wide(text: &[u16]) -> Vec<u16> {
    const CR: u16 = b'\r' as u16;
    const LF: u16 = b'\n' as u16;

    let mut out = Vec::with_capacity(text.len() + text.len() / 16);
    let mut prev = 0u16;
    for &unit in text.iter().take_while(|&&u| u != 0) {
        if unit == LF && prev != CR {
            out.push(CR);
        }
        out.push(unit);
        prev = unit;
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
