//! Linux i2c-dev transport
//!
//! Talks to the board through the kernel's `/dev/i2c-N` character devices.
//! The peripheral address is bound once with the `I2C_SLAVE` ioctl; a
//! register read is a register-pointer write followed by a one-byte read.

use crate::{BusError, RegisterBus, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// `I2C_SLAVE` from linux/i2c-dev.h
const I2C_SLAVE: libc::c_ulong = 0x0703;

/// An open i2c-dev bus bound to one peripheral address.
pub struct I2cBus {
    device: File,
    path: PathBuf,
    address: u16,
}

impl I2cBus {
    /// Open an i2c-dev device and bind the peripheral address.
    ///
    /// Both steps are construction-time failures: a bus that cannot be
    /// opened or bound must never reach the interrupt path.
    pub fn open(path: &Path, address: u16) -> Result<Self> {
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| BusError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        // SAFETY: ioctl on an owned, open fd with an integer argument as
        // defined by the i2c-dev ABI.
        let rc = unsafe { libc::ioctl(device.as_raw_fd(), I2C_SLAVE, libc::c_long::from(address)) };
        if rc < 0 {
            return Err(BusError::Bind {
                address,
                source: std::io::Error::last_os_error(),
            });
        }

        tracing::info!(
            "Opened I2C bus {} (peripheral address {:#04x})",
            path.display(),
            address
        );

        Ok(Self {
            device,
            path: path.to_path_buf(),
            address,
        })
    }

    /// Path of the underlying character device.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bound peripheral address.
    pub fn address(&self) -> u16 {
        self.address
    }

    fn classify(&self, err: std::io::Error) -> BusError {
        match err.raw_os_error() {
            // The i2c core reports an unacknowledged transfer as a remote
            // IO failure, some adapters as a missing device.
            Some(libc::EREMOTEIO) | Some(libc::ENXIO) => BusError::Nack {
                address: self.address,
            },
            Some(libc::ETIMEDOUT) => BusError::Timeout,
            _ => BusError::Io(err),
        }
    }
}

impl RegisterBus for I2cBus {
    fn read(&mut self, register: u8) -> Result<u8> {
        if let Err(err) = self.device.write_all(&[register]) {
            return Err(self.classify(err));
        }

        let mut value = [0u8; 1];
        if let Err(err) = self.device.read_exact(&mut value) {
            return Err(self.classify(err));
        }

        Ok(value[0])
    }
}
