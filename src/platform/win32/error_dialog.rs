// ── Program-error dialog (Win32 side) ─────────────────────────────────────────
//
// Builds the dialog template in memory, runs it modally, and translates
// window messages into `DialogEvent`s for the controller in
// `ui::error_dialog`.  All behaviour lives in the controller; this file only
// moves data between it and the real controls.

#![allow(unsafe_code)]

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{FALSE, HINSTANCE, HWND, LPARAM, POINT, RECT, WPARAM},
        Graphics::Gdi::{GetStockObject, SYSTEM_FIXED_FONT},
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Input::KeyboardAndMouse::EnableWindow,
            WindowsAndMessaging::{
                DialogBoxIndirectParamW, EndDialog, GetDlgItem, GetDlgItemTextW,
                GetWindowLongPtrW, GetWindowRect, SendMessageW, SetDlgItemTextW,
                SetWindowLongPtrW, SetWindowPos, DLGTEMPLATE, DS_CENTER, DS_MODALFRAME,
                DS_SETFONT, GWLP_USERDATA, IDCANCEL, MINMAXINFO, SC_CLOSE, SIZE_MAXIMIZED,
                SIZE_MINIMIZED, SWP_NOACTIVATE, SWP_NOZORDER, WM_COMMAND, WM_GETMINMAXINFO,
                WM_INITDIALOG, WM_MOVE, WM_SETFONT, WM_SIZE, WM_SYSCOMMAND, WS_CAPTION,
                WS_CHILD, WS_POPUP, WS_SYSMENU, WS_TABSTOP, WS_THICKFRAME, WS_VISIBLE,
                WS_VSCROLL,
            },
        },
    },
};

use crate::{
    config::ErrorDialogConfig,
    error::Result,
    ui::{
        anchor::{Point, Rect, Size},
        error_dialog::{
            edit_text, edit_text_wide, ButtonId, ControlId, DialogEvent, DialogFlags,
            DialogHost, ErrorDialog, ErrorReaction, EventOutcome, ResizeKind,
        },
    },
};

use super::{
    clipboard, dpi, message,
    window::{find_app_main_window, last_error, DeferredQuit},
};

// ── Control styles ────────────────────────────────────────────────────────────

const ES_MULTILINE: u32 = 0x0004;
const ES_AUTOVSCROLL: u32 = 0x0040;
const ES_READONLY: u32 = 0x0800;
const BS_PUSHBUTTON: u32 = 0x0000;
const BS_DEFPUSHBUTTON: u32 = 0x0001;

/// Predefined window-class atoms for dialog items.
const CLASS_BUTTON: u16 = 0x0080;
const CLASS_EDIT: u16 = 0x0081;

// BN_CLICKED; menu and accelerator commands also arrive with code 0.
const BN_CLICKED: usize = 0;

// ── Template layout (dialog units) ────────────────────────────────────────────

const DIALOG_WIDTH: i16 = 300;
const DIALOG_HEIGHT: i16 = 160;
const MARGIN: i16 = 7;
const BUTTON_WIDTH: i16 = 50;
const BUTTON_HEIGHT: i16 = 14;
const BUTTON_GAP: i16 = 4;
const BUTTON_Y: i16 = DIALOG_HEIGHT - MARGIN - BUTTON_HEIGHT;

const FONT_NAME: &str = "MS Shell Dlg";
const FONT_POINTS: u16 = 8;

/// One dialog item in the template.
struct ItemSpec {
    id: ControlId,
    class: u16,
    style: u32,
    x: i16,
    y: i16,
    cx: i16,
    cy: i16,
    caption: &'static str,
}

fn item_specs() -> Vec<ItemSpec> {
    let button = |id: ButtonId, slot: i16, caption, default: bool| ItemSpec {
        id: id.into(),
        class: CLASS_BUTTON,
        style: WS_TABSTOP.0 | if default { BS_DEFPUSHBUTTON } else { BS_PUSHBUTTON },
        x: MARGIN + slot * (BUTTON_WIDTH + BUTTON_GAP),
        y: BUTTON_Y,
        cx: BUTTON_WIDTH,
        cy: BUTTON_HEIGHT,
        caption,
    };

    vec![
        ItemSpec {
            id: ControlId::Text,
            class: CLASS_EDIT,
            style: WS_VSCROLL.0 | ES_MULTILINE | ES_AUTOVSCROLL | ES_READONLY,
            x: MARGIN,
            y: MARGIN,
            cx: DIALOG_WIDTH - 2 * MARGIN,
            cy: BUTTON_Y - 2 * MARGIN,
            caption: "",
        },
        button(ButtonId::Continue, 0, "&Continue", true),
        button(ButtonId::Suppress, 1, "&Suppress", false),
        button(ButtonId::Break, 2, "&Break", false),
        button(ButtonId::Exit, 3, "E&xit", false),
        ItemSpec {
            x: DIALOG_WIDTH - MARGIN - BUTTON_WIDTH,
            ..button(ButtonId::Copy, 0, "C&opy", false)
        },
    ]
}

// ── Template builder ──────────────────────────────────────────────────────────

/// Little-endian byte stream in `DLGTEMPLATE` format.
#[derive(Default)]
struct TemplateWriter {
    bytes: Vec<u8>,
}

impl TemplateWriter {
    fn word(&mut self, w: u16) {
        self.bytes.extend_from_slice(&w.to_le_bytes());
    }

    fn short(&mut self, v: i16) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    fn dword(&mut self, d: u32) {
        self.bytes.extend_from_slice(&d.to_le_bytes());
    }

    /// NUL-terminated UTF-16.
    fn text(&mut self, s: &str) {
        for c in s.encode_utf16() {
            self.word(c);
        }
        self.word(0);
    }

    fn align_dword(&mut self) {
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }
    }

    /// The template as DWORDs, so the buffer handed to Windows is aligned.
    fn into_dwords(mut self) -> Vec<u32> {
        self.align_dword();
        self.bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }
}

fn build_template(title: &str) -> Vec<u32> {
    let items = item_specs();
    let mut w = TemplateWriter::default();

    // DLGTEMPLATE header.
    let ds = (DS_SETFONT | DS_MODALFRAME | DS_CENTER) as u32;
    w.dword(ds | WS_POPUP.0 | WS_CAPTION.0 | WS_SYSMENU.0 | WS_THICKFRAME.0);
    w.dword(0); // extended style
    w.word(items.len() as u16);
    w.short(0);
    w.short(0);
    w.short(DIALOG_WIDTH);
    w.short(DIALOG_HEIGHT);
    w.word(0); // no menu
    w.word(0); // default dialog class
    w.text(title);
    w.word(FONT_POINTS);
    w.text(FONT_NAME);

    for item in &items {
        w.align_dword();
        w.dword(WS_CHILD.0 | WS_VISIBLE.0 | item.style);
        w.dword(0);
        w.short(item.x);
        w.short(item.y);
        w.short(item.cx);
        w.short(item.cy);
        w.word(item.id.item_id() as u16);
        w.word(0xFFFF);
        w.word(item.class);
        w.text(item.caption);
        w.word(0); // no creation data
    }

    w.into_dwords()
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Show the program-error dialog with `text` and wait for the user's choice.
///
/// Uses the default dialog settings; see [`display_error_with`].
pub fn display_error(text: &str, flags: DialogFlags) -> ErrorReaction {
    show(&ErrorDialogConfig::default(), edit_text(text), flags)
}

/// [`display_error`] for UTF-16 text, which ends at its first NUL.
pub fn display_error_wide(text: &[u16], flags: DialogFlags) -> ErrorReaction {
    show(&ErrorDialogConfig::default(), edit_text_wide(text), flags)
}

/// [`display_error`] with explicit dialog settings.
pub fn display_error_with(
    config: &ErrorDialogConfig,
    text: &str,
    flags: DialogFlags,
) -> ErrorReaction {
    show(config, edit_text(text), flags)
}

fn show(config: &ErrorDialogConfig, text: Vec<u16>, flags: DialogFlags) -> ErrorReaction {
    let mut dialog = ErrorDialog::new(text, flags, config);
    let template = build_template(&config.title);

    // Held until return so the fallback message box is not swallowed either.
    let _quit = DeferredQuit::take();
    let parent = find_app_main_window();

    // SAFETY: a null name asks for the executable's own module handle.
    let ret = match unsafe { GetModuleHandleW(None) } {
        // SAFETY: the template is a well-formed, DWORD-aligned DLGTEMPLATE
        // that outlives the modal call; `dialog` is exclusively borrowed by
        // dialog_proc through GWLP_USERDATA until DialogBoxIndirectParamW
        // returns, and is not touched here in between.
        Ok(module) => unsafe {
            DialogBoxIndirectParamW(
                HINSTANCE(module.0),
                template.as_ptr().cast::<DLGTEMPLATE>(),
                parent,
                Some(dialog_proc),
                LPARAM(&mut dialog as *mut ErrorDialog as isize),
            )
        },
        Err(e) => {
            log::warn!("error dialog: GetModuleHandleW failed: {e}");
            0
        }
    };

    match ErrorReaction::from_code(ret) {
        Some(reaction) => reaction,
        None => {
            log::warn!(
                "error dialog: DialogBoxIndirectParamW returned {ret}: {}",
                last_error("DialogBoxIndirectParamW")
            );
            message::display_msg("Error", "Unable to display detailed error dialog.");
            ErrorReaction::Continue
        }
    }
}

// ── Dialog procedure ──────────────────────────────────────────────────────────

fn loword(v: usize) -> u16 {
    (v & 0xFFFF) as u16
}

fn hiword(v: usize) -> u16 {
    ((v >> 16) & 0xFFFF) as u16
}

// SAFETY: registered only by `show`, whose WM_INITDIALOG lParam is a live
// `*mut ErrorDialog` for the lifetime of the dialog.
unsafe extern "system" fn dialog_proc(
    hdlg: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> isize {
    if msg == WM_INITDIALOG {
        SetWindowLongPtrW(hdlg, GWLP_USERDATA, lparam.0);
    }
    // Messages sent before WM_INITDIALOG (WM_GETMINMAXINFO among them) find
    // no context and get default handling.
    let ctx = GetWindowLongPtrW(hdlg, GWLP_USERDATA) as *mut ErrorDialog;
    if ctx.is_null() {
        return 0;
    }
    // SAFETY: see above; the dialog is modal, so no other reference exists
    // while a message is being handled.
    let dialog = &mut *ctx;
    let mut host = Win32DialogHost { hdlg };

    let outcome = match msg {
        WM_INITDIALOG => {
            dialog.handle(&mut host, DialogEvent::Init);
            // TRUE: let the system focus the default button.
            return 1;
        }
        WM_COMMAND if hiword(wparam.0) as usize == BN_CLICKED => {
            let id = i32::from(loword(wparam.0));
            match ControlId::from_item_id(id) {
                Some(ControlId::Button(button)) => {
                    dialog.handle(&mut host, DialogEvent::Command(button))
                }
                // Escape.
                None if id == IDCANCEL.0 => dialog.handle(&mut host, DialogEvent::SystemClose),
                _ => EventOutcome::PassThrough,
            }
        }
        WM_SYSCOMMAND if (wparam.0 & 0xFFF0) as u32 == SC_CLOSE => {
            dialog.handle(&mut host, DialogEvent::SystemClose)
        }
        WM_SIZE => {
            let kind = match wparam.0 as u32 {
                SIZE_MINIMIZED => ResizeKind::Minimized,
                SIZE_MAXIMIZED => ResizeKind::Maximized,
                _ => ResizeKind::Restored,
            };
            let size = Size {
                width: i32::from(loword(lparam.0 as usize)),
                height: i32::from(hiword(lparam.0 as usize)),
            };
            dialog.handle(&mut host, DialogEvent::Resize { kind, size })
        }
        WM_MOVE => {
            // Signed: the client area can sit left of or above a monitor.
            let origin = Point {
                x: i32::from(loword(lparam.0 as usize) as i16),
                y: i32::from(hiword(lparam.0 as usize) as i16),
            };
            dialog.handle(&mut host, DialogEvent::Move(origin))
        }
        WM_GETMINMAXINFO => {
            let mut min_track = Size { width: 0, height: 0 };
            let outcome = dialog.handle(&mut host, DialogEvent::MinMaxQuery(&mut min_track));
            if outcome == EventOutcome::Handled {
                let dpi = dpi::get_for_window(hdlg);
                // SAFETY: for WM_GETMINMAXINFO, lParam points at a MINMAXINFO
                // owned by the system for the duration of the message.
                let info = &mut *(lparam.0 as *mut MINMAXINFO);
                info.ptMinTrackSize = POINT {
                    x: dpi::scale(min_track.width, dpi),
                    y: dpi::scale(min_track.height, dpi),
                };
            }
            outcome
        }
        _ => EventOutcome::PassThrough,
    };

    match outcome {
        EventOutcome::Handled => 1,
        EventOutcome::PassThrough => 0,
    }
}

// ── Host over the real controls ───────────────────────────────────────────────

struct Win32DialogHost {
    hdlg: HWND,
}

impl Win32DialogHost {
    fn item(&self, id: ControlId) -> Option<HWND> {
        // SAFETY: hdlg is the live dialog this host was created for.
        unsafe { GetDlgItem(self.hdlg, id.item_id()) }.ok()
    }
}

impl DialogHost for Win32DialogHost {
    fn control_rect(&self, id: ControlId) -> Option<Rect> {
        let item = self.item(id)?;
        let mut rc = RECT::default();
        // SAFETY: item is a child of the live dialog; rc is a valid out-param.
        unsafe { GetWindowRect(item, &mut rc) }.ok()?;
        Some(Rect::from_edges(rc.left, rc.top, rc.right, rc.bottom))
    }

    fn move_control(&mut self, id: ControlId, rect: Rect) {
        let Some(item) = self.item(id) else { return };
        // SAFETY: item is a child of the live dialog; SWP_NOZORDER makes
        // the insert-after handle irrelevant.
        let moved = unsafe {
            SetWindowPos(
                item,
                HWND::default(),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                SWP_NOZORDER | SWP_NOACTIVATE,
            )
        };
        if let Err(e) = moved {
            log::warn!("error dialog: moving control {id:?} failed: {e}");
        }
    }

    fn disable_control(&mut self, id: ControlId) {
        if let Some(item) = self.item(id) {
            // SAFETY: item is a child of the live dialog.  The return value
            // is the previous state, not an error.
            unsafe {
                let _ = EnableWindow(item, FALSE);
            }
        }
    }

    fn use_fixed_font(&mut self, id: ControlId) {
        let Some(item) = self.item(id) else { return };
        // SAFETY: stock objects are never freed; WM_SETFONT only stores the
        // handle.  lParam 0: no redraw, the text is set next.
        unsafe {
            let font = GetStockObject(SYSTEM_FIXED_FONT);
            let _ = SendMessageW(item, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(0));
        }
    }

    fn set_text(&mut self, id: ControlId, text: &[u16]) {
        let wide = super::to_wide_z(text);
        // SAFETY: wide is NUL-terminated and outlives the call.
        if let Err(e) = unsafe { SetDlgItemTextW(self.hdlg, id.item_id(), PCWSTR(wide.as_ptr())) }
        {
            log::warn!("error dialog: setting text of {id:?} failed: {e}");
        }
    }

    fn read_text(&self, id: ControlId, buf: &mut [u16]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        // SAFETY: buf is writable for its full length, which the binding
        // passes as the capacity.
        let len = unsafe { GetDlgItemTextW(self.hdlg, id.item_id(), buf) } as usize;
        len.min(buf.len())
    }

    fn copy_to_clipboard(&mut self, text: &[u16]) -> Result<()> {
        clipboard::set_wide(text)
    }

    fn end(&mut self, reaction: ErrorReaction) {
        // SAFETY: hdlg is the modal dialog created by DialogBoxIndirectParamW.
        if let Err(e) = unsafe { EndDialog(self.hdlg, reaction.code()) } {
            log::warn!("error dialog: EndDialog failed: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn words(template: &[u32]) -> Vec<u16> {
        template
            .iter()
            .flat_map(|d| [(*d & 0xFFFF) as u16, (*d >> 16) as u16])
            .collect()
    }

    #[test]
    fn header_declares_all_controls_and_font() {
        let t = build_template("Program Error");
        let style = t[0];
        assert_ne!(style & WS_THICKFRAME.0, 0);
        assert_ne!(style & DS_SETFONT as u32, 0);
        assert_eq!(t[1], 0);

        let w = words(&t);
        assert_eq!(w[4] as usize, ControlId::ALL.len());
        // Title follows the size, menu and class words.
        let title: Vec<u16> = "Program Error\0".encode_utf16().collect();
        assert_eq!(&w[11..11 + title.len()], title.as_slice());
        let after_title = 11 + title.len();
        assert_eq!(w[after_title], FONT_POINTS);
        let font: Vec<u16> = "MS Shell Dlg\0".encode_utf16().collect();
        assert_eq!(&w[after_title + 1..after_title + 1 + font.len()], font.as_slice());
    }

    #[test]
    fn every_control_id_is_in_template() {
        let w = words(&build_template("x"));
        for id in ControlId::ALL {
            let class = match id {
                ControlId::Text => CLASS_EDIT,
                ControlId::Button(_) => CLASS_BUTTON,
            };
            let found = w
                .windows(3)
                .any(|s| s == [id.item_id() as u16, 0xFFFF, class]);
            assert!(found, "{id:?} missing");
        }
    }

    #[test]
    fn layout_stays_inside_dialog() {
        for item in item_specs() {
            assert!(item.x >= 0 && item.y >= 0);
            assert!(item.x + item.cx <= DIALOG_WIDTH, "{:?}", item.id);
            assert!(item.y + item.cy <= DIALOG_HEIGHT, "{:?}", item.id);
        }
    }

    #[test]
    fn copy_button_is_right_aligned() {
        let copy = item_specs()
            .into_iter()
            .find(|i| i.id == ControlId::Button(ButtonId::Copy))
            .expect("copy button");
        assert_eq!(copy.x + copy.cx, DIALOG_WIDTH - MARGIN);
    }

    #[test]
    fn text_area_is_read_only_multiline() {
        let text = item_specs()
            .into_iter()
            .find(|i| i.id == ControlId::Text)
            .expect("text area");
        assert_eq!(text.style & ES_READONLY, ES_READONLY);
        assert_eq!(text.style & ES_MULTILINE, ES_MULTILINE);
    }

    #[test]
    fn word_helpers_split_wparam() {
        let v = (0x0001_usize << 16) | 1003;
        assert_eq!(loword(v), 1003);
        assert_eq!(hiword(v), 1);
    }

    /// Interactive: resize the dialog, try Copy, then press Break.
    #[test]
    #[ignore]
    fn shows_and_returns_break() {
        let _ = env_logger::builder().is_test(true).try_init();
        let reaction = display_error(
            "Assertion failed: index < len\nfile: src/lib.rs\nline: 42",
            DialogFlags::ALLOW_SUPPRESS,
        );
        assert_eq!(reaction, ErrorReaction::Break);
    }

    /// Interactive: Suppress must be greyed out; close with the caption button.
    #[test]
    #[ignore]
    fn close_box_continues_without_suppress() {
        let _ = env_logger::builder().is_test(true).try_init();
        let text: Vec<u16> = "wide text\0ignored".encode_utf16().collect();
        assert_eq!(
            display_error_wide(&text, DialogFlags::empty()),
            ErrorReaction::Continue
        );
    }
}
