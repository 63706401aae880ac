// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Minimal structured logging with severity levels
//! OWNERS: @kernel-team
//! STATUS: Functional
//! PUBLIC API: log_* macros, emit(level,target,args), install_console(sink)
//! DEPENDS_ON: spin::Once (console registration)
//! INVARIANTS: Debug/Trace only in debug builds; single-line emission; never called from
//!             the translation or dispatch hot paths
//!
//! Lines are rendered into a fixed stack buffer and handed to the board
//! console in one piece. Until a console is installed every line is dropped.

use core::fmt::{Arguments, Write};

/// Maximum rendered length of one log line, including the `[LEVEL target] ` prefix.
pub const LINE_CAPACITY: usize = 192;

/// Board console receiving complete lines (without trailing newline).
pub type ConsoleSink = fn(&str);

static CONSOLE: spin::Once<ConsoleSink> = spin::Once::new();

/// Logging severity used by the kernel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    const fn tag(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    const fn enabled(self) -> bool {
        match self {
            Level::Debug | Level::Trace => cfg!(debug_assertions),
            _ => true,
        }
    }
}

/// Installs the console that receives rendered lines.
///
/// Returns `false` if a console was already installed; the first one wins.
pub fn install_console(sink: ConsoleSink) -> bool {
    let mut installed = false;
    CONSOLE.call_once(|| {
        installed = true;
        sink
    });
    installed
}

/// Stack buffer that silently truncates once full.
struct LineBuffer {
    data: [u8; LINE_CAPACITY],
    len: usize,
}

impl LineBuffer {
    const fn new() -> Self {
        Self { data: [0; LINE_CAPACITY], len: 0 }
    }

    fn as_str(&self) -> &str {
        match core::str::from_utf8(&self.data[..self.len]) {
            Ok(s) => s,
            // Truncation may split a multi-byte character; keep the valid prefix.
            Err(err) => core::str::from_utf8(&self.data[..err.valid_up_to()]).unwrap_or_default(),
        }
    }
}

impl Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let take = bytes.len().min(LINE_CAPACITY - self.len);
        self.data[self.len..self.len + take].copy_from_slice(&bytes[..take]);
        self.len += take;
        Ok(())
    }
}

/// Emits a structured log line if the level is enabled for the current build.
pub fn emit(level: Level, target: &'static str, args: Arguments<'_>) {
    if !level.enabled() {
        return;
    }
    let Some(console) = CONSOLE.get() else {
        return;
    };

    let mut line = LineBuffer::new();
    let _ = write!(line, "[{} {}] ", level.tag(), target);
    let _ = line.write_fmt(args);
    console(line.as_str());
}

/// Emits at an explicit level; the `log_*` macros forward here.
#[macro_export]
macro_rules! log_at {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        $crate::log::emit($level, $target, format_args!($($arg)+))
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::log::emit($level, module_path!(), format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::log_at!($crate::log::Level::Error, $($arg)+) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => { $crate::log_at!($crate::log::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::log_at!($crate::log::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::log_at!($crate::log::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => { $crate::log_at!($crate::log::Level::Trace, $($arg)+) };
}
