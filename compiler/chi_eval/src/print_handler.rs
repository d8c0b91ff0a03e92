//! Where `print` and test reports go.
//!
//! Enum dispatch over the few sinks a session can write to: the process's
//! stdout, a queue drained by a writer thread, an in-memory buffer for tests,
//! or nowhere.

use crossbeam::channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;

pub enum PrintHandler {
    Stdout,
    /// Lines are sent to a consumer thread; a closed channel drops them.
    Channel(Sender<String>),
    Buffer(Mutex<String>),
    Silent,
}

impl PrintHandler {
    /// Emit one line.
    pub fn println(&self, line: &str) {
        match self {
            PrintHandler::Stdout => println!("{line}"),
            PrintHandler::Channel(sender) => {
                let _ = sender.send(line.to_owned());
            }
            PrintHandler::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(line);
                buffer.push('\n');
            }
            PrintHandler::Silent => {}
        }
    }

    /// Everything captured so far. Empty for sinks that don't capture.
    pub fn captured(&self) -> String {
        match self {
            PrintHandler::Buffer(buffer) => buffer.lock().clone(),
            PrintHandler::Stdout | PrintHandler::Channel(_) | PrintHandler::Silent => String::new(),
        }
    }

    /// Drop captured output.
    pub fn clear(&self) {
        if let PrintHandler::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

pub type SharedPrintHandler = Arc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

pub fn channel_handler(sender: Sender<String>) -> SharedPrintHandler {
    Arc::new(PrintHandler::Channel(sender))
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}
