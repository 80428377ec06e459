//! Logging initialization.
//!
//! DHCP hooks run detached from any terminal, so the default destination is
//! syslog. `console` is for running the helper by hand.

use std::ffi::{CStr, CString};
use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use libc::c_int;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// syslog identity.
const SYSLOG_IDENT: &CStr = c"6rd";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDestination {
    /// stdout, warnings and errors to stderr.
    Console,
    /// The local syslog daemon.
    Syslog,
}

/// Writer for a single syslog record.
///
/// tracing formats an event into one buffer and writes it in one go; the
/// record is sent when the writer is dropped.
struct SyslogRecord {
    priority: c_int,
    buf: Vec<u8>,
}

impl SyslogRecord {
    fn new(priority: c_int) -> Self {
        Self {
            priority,
            buf: Vec::new(),
        }
    }

    fn send(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            let Ok(msg) = CString::new(line) else {
                continue;
            };
            // SAFETY: both pointers are valid NUL-terminated strings and the
            // format consumes exactly one string argument.
            unsafe { libc::syslog(self.priority, c"%s".as_ptr(), msg.as_ptr()) };
        }
        self.buf.clear();
    }
}

impl Write for SyslogRecord {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send();
        Ok(())
    }
}

impl Drop for SyslogRecord {
    fn drop(&mut self) {
        self.send();
    }
}

/// Makes one [`SyslogRecord`] per event, with a priority matching its level.
struct Syslog;

impl Syslog {
    fn open() -> Self {
        // SAFETY: the identity is a 'static C string, as openlog requires.
        unsafe { libc::openlog(SYSLOG_IDENT.as_ptr(), libc::LOG_PID, libc::LOG_DAEMON) };
        Self
    }
}

impl<'a> MakeWriter<'a> for Syslog {
    type Writer = SyslogRecord;

    fn make_writer(&'a self) -> Self::Writer {
        SyslogRecord::new(libc::LOG_NOTICE)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SyslogRecord::new(priority_for(meta.level()))
    }
}

fn priority_for(level: &Level) -> c_int {
    match *level {
        Level::ERROR => libc::LOG_ERR,
        Level::WARN => libc::LOG_WARNING,
        _ => libc::LOG_NOTICE,
    }
}

/// Install the global subscriber for `destination`.
pub fn init(destination: LogDestination) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match destination {
        LogDestination::Console => {
            let writer = io::stderr.with_max_level(Level::WARN).or_else(io::stdout);
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogDestination::Syslog => {
            // syslog stamps records itself
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .without_time()
                .with_target(false)
                .with_ansi(false)
                .with_level(false)
                .with_writer(Syslog::open());

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
