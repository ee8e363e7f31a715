use std::path::Path;

use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::sync::watch::Sender;
use tokio::task::JoinHandle;
use tokio::time;
use tokio::time::Duration;

use crate::error::HexError;
use crate::notify::UnknownRecord;

pub struct Spinner {
    tx: Sender<bool>,
    handle: JoinHandle<()>
}
impl Spinner {
    pub fn spawn<S>(message: S) -> Self
        where
            S: AsRef<str>
    {
        let style = ProgressStyle::default_spinner()
            .template("{spinner}  {wide_msg}");
        let progress = ProgressBar::new_spinner();
        progress.set_style(style);
        progress.set_message(message.as_ref());

        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            while !*rx.borrow() {
                progress.tick();
                time::sleep(Duration::from_millis(50)).await;
            }
            progress.finish();
        });

        Spinner { tx, handle }
    }

    pub async fn finish(self) {
        let _ = self.tx.send(true);
        let _ = self.handle.await;
    }
}

/// Progress over a known number of steps, e.g. files being decoded.
pub struct Bar {
    tx: Sender<(u64, u64)>,
    handle: JoinHandle<()>,
    len: u64
}
impl Bar {
    pub fn spawn<S>(message: S, len: u64) -> Self
        where
            S: AsRef<str>
    {
        let style = ProgressStyle::default_bar()
            .template("{spinner}  {msg:24} [{bar:64.cyan/blue}]  {pos}/{len}")
            .progress_chars("#>-");
        let progress = ProgressBar::new(len);
        progress.set_style(style);
        progress.set_message(message.as_ref());

        let (tx, rx) = watch::channel((0, len));

        let handle = tokio::spawn(async move {
            loop {
                let (val, max) = *rx.borrow();
                progress.set_length(max);
                progress.set_position(val);
                if val >= max { break; }
                time::sleep(Duration::from_millis(50)).await;
            }
            progress.finish();
        });

        Bar { tx, handle, len }
    }

    pub fn progress(&mut self, value: u64) {
        let _ = self.tx.send((value, self.len));
    }

    pub async fn finish(self) {
        let _ = self.tx.send((self.len, self.len));
        let _ = self.handle.await;
    }
}

pub fn info<S: AsRef<str>>(title: &str, message: S) {
    println!("{} {} {}", Emoji("ℹ️", "ℹ"), style(title).bright().cyan(), message.as_ref());
}

pub fn success<S: AsRef<str>>(title: &str, message: S) {
    println!("{} {} {}", Emoji("✔️", "✔"), style(title).bright().green(), message.as_ref());
}

pub fn warning<S: AsRef<str>>(title: &str, message: S) {
    println!("{} {} {}", Emoji("⚠️", "⚠"), style(title).bright().yellow(), message.as_ref());
}

pub fn error<S: AsRef<str>>(title: &str, message: S) {
    println!("{} {} {}", Emoji("❌", "X"), style(title).bright().red(), message.as_ref());
}

pub fn report_unknown(path: &Path, record: &UnknownRecord) {
    warning("Skipped:", format!(
        "{}:{}: {} record (type {:#04X}, {} byte(s) at {:#07X}, checksum {:#04X}) `{}`",
        path.display(),
        record.line_number,
        record.record_type.as_str(),
        record.record_type.code(),
        record.byte_count,
        record.address,
        record.checksum,
        record.line
    ));
}

pub fn report_error(path: &Path, err: &HexError) {
    error("Error:", format!("`{}`: {}", path.display(), err));
}
