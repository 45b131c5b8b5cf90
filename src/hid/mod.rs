//! HID keyboard emulation: report layouts, report map, layout table and
//! the keystroke typer.

pub mod keyboard;
pub mod keymap;
pub mod report_map;
pub mod report_protocol;
pub mod typer;


pub use keyboard::{InputReport, OutputReport, NO_KEY_PRESSED};
pub use keymap::{FunctionKey, KeyMapping, KEYMAP};
pub use report_map::REPORT_MAP;
pub use typer::{type_text, ReportSink};
