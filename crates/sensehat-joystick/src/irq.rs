//! Interrupt line watcher
//!
//! The board asserts a GPIO line when fresh joystick data is latched. One
//! watcher thread blocks in `poll(2)` on the line's sysfs value file and
//! forwards a token per edge over a channel; whoever consumes the channel
//! drives the engine, one invocation at a time.

use crate::JoystickError;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// One "data ready" assertion of the interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupt;

/// Poll timeout so the watcher thread notices a stop request
const STOP_POLL_MS: libc::c_int = 500;

/// Watches a GPIO interrupt line via sysfs
pub struct IrqWatcher {
    gpio: u32,
    tx: Sender<Interrupt>,
    rx: Receiver<Interrupt>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl IrqWatcher {
    pub fn new(gpio: u32) -> Self {
        let (tx, rx) = channel();
        Self {
            gpio,
            tx,
            rx,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Arm the interrupt line and start the watcher thread.
    ///
    /// Export, edge configuration, and open failures are fatal: a handler
    /// must never be considered armed when the line is not.
    pub fn start(&mut self) -> Result<(), JoystickError> {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let value_file = self.setup_line()?;

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let tx = self.tx.clone();
        let gpio = self.gpio;

        self.worker = Some(std::thread::spawn(move || {
            tracing::info!("Interrupt watcher started on GPIO {gpio}");
            watch_loop(value_file, running, tx);
            tracing::info!("Interrupt watcher on GPIO {gpio} stopped");
        }));

        Ok(())
    }

    /// Stop the watcher thread and release the line registration.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Get the interrupt receiver
    pub fn interrupts(&self) -> &Receiver<Interrupt> {
        &self.rx
    }

    /// Try to receive an interrupt without blocking
    pub fn try_recv(&self) -> Option<Interrupt> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next interrupt
    pub fn recv(&self) -> Option<Interrupt> {
        self.rx.recv().ok()
    }

    /// Wait for an interrupt with timeout
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Interrupt> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Export the line, select rising-edge reporting, open the value file.
    fn setup_line(&self) -> Result<File, JoystickError> {
        let setup = |err: std::io::Error| JoystickError::IrqSetup {
            gpio: self.gpio,
            source: err,
        };

        let base = PathBuf::from(format!("/sys/class/gpio/gpio{}", self.gpio));

        if !base.exists() {
            // EBUSY from export means someone already exported the line,
            // which is fine as long as the gpioN directory appears.
            let mut export = OpenOptions::new()
                .write(true)
                .open("/sys/class/gpio/export")
                .map_err(setup)?;
            export
                .write_all(self.gpio.to_string().as_bytes())
                .or_else(|e| {
                    if e.raw_os_error() == Some(libc::EBUSY) {
                        Ok(())
                    } else {
                        Err(e)
                    }
                })
                .map_err(setup)?;
        }

        std::fs::write(base.join("direction"), b"in").map_err(setup)?;
        std::fs::write(base.join("edge"), b"rising").map_err(setup)?;

        OpenOptions::new()
            .read(true)
            .open(base.join("value"))
            .map_err(setup)
    }
}

impl Drop for IrqWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch_loop(mut value_file: File, running: Arc<AtomicBool>, tx: Sender<Interrupt>) {
    // Consume the current value so the first poll waits for a real edge
    let mut scratch = [0u8; 8];
    let _ = value_file.read(&mut scratch);

    while running.load(Ordering::SeqCst) {
        let mut fds = libc::pollfd {
            fd: value_file.as_raw_fd(),
            events: libc::POLLPRI | libc::POLLERR,
            revents: 0,
        };

        // SAFETY: fds points at one initialized pollfd for the duration of
        // the call.
        let rc = unsafe { libc::poll(&mut fds, 1, STOP_POLL_MS) };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            tracing::error!("poll on interrupt line failed: {err}");
            break;
        }
        if rc == 0 {
            // Timeout, re-check the stop flag
            continue;
        }

        if fds.revents & libc::POLLPRI != 0 {
            // Sysfs requires a rewind-and-read to rearm edge reporting
            let _ = value_file.seek(SeekFrom::Start(0));
            let _ = value_file.read(&mut scratch);

            if tx.send(Interrupt).is_err() {
                // Consumer gone, nothing left to drive
                break;
            }
        }
    }
}
