//! Background output writer.
//!
//! Sessions print through a [`SharedPrintHandler`]. For the binary that
//! handler feeds a `crossbeam` channel drained by one writer thread, so
//! evaluation never waits on the terminal. [`Output::finish`] closes the
//! channel and joins the writer; nothing queued is lost at exit.

use chi_eval::{buffer_handler, channel_handler, SharedPrintHandler};
use std::io::Write;
use std::thread::JoinHandle;

pub struct Output {
    handler: SharedPrintHandler,
    writer: Option<JoinHandle<()>>,
}

impl Output {
    /// Start a writer thread that copies every line to stdout.
    pub fn spawn() -> Self {
        let (sender, receiver) = crossbeam::channel::unbounded::<String>();
        let writer = std::thread::Builder::new()
            .name("chi-output".to_string())
            .spawn(move || {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                for line in receiver {
                    if writeln!(out, "{line}").is_err() {
                        break;
                    }
                }
                let _ = out.flush();
            });

        match writer {
            Ok(writer) => Output {
                handler: channel_handler(sender),
                writer: Some(writer),
            },
            Err(error) => {
                // No thread: write synchronously.
                tracing::warn!(%error, "cannot start the output writer");
                Output {
                    handler: chi_eval::stdout_handler(),
                    writer: None,
                }
            }
        }
    }

    /// Capture everything in memory, for tests.
    pub fn buffered() -> Self {
        Output {
            handler: buffer_handler(),
            writer: None,
        }
    }

    /// Handle to give to a session.
    pub fn handler(&self) -> SharedPrintHandler {
        self.handler.clone()
    }

    pub fn line(&self, line: &str) {
        self.handler.println(line);
    }

    /// Lines captured by a buffered output.
    pub fn captured(&self) -> String {
        self.handler.captured()
    }

    /// Close the queue and wait until the writer has drained it.
    ///
    /// Every other clone of the handler must be dropped first, or the
    /// writer never sees the end of the queue.
    pub fn finish(self) {
        let Output { handler, writer } = self;
        drop(handler);
        if let Some(writer) = writer {
            if writer.join().is_err() {
                tracing::error!("output writer panicked");
            }
        }
    }
}
