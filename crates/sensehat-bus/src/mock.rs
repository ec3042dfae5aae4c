//! Mock bus for testing without real hardware
//!
//! Holds a full 256-register image in memory behind shared state, so tests
//! can flip register values and inject transport faults while the code under
//! test only sees the [`RegisterBus`] contract.

use crate::{BusError, RegisterBus, Result};
use std::sync::{Arc, RwLock};

/// Shared mock state for manipulation from tests
#[derive(Debug)]
pub struct MockBusState {
    /// Register image, one byte per address
    pub registers: [u8; 256],
    /// Number of reads still to fail before succeeding again
    pub failing_reads: u32,
    /// Total reads attempted (including failed ones)
    pub reads: u64,
}

impl MockBusState {
    pub fn new() -> Self {
        Self {
            registers: [0; 256],
            failing_reads: 0,
            reads: 0,
        }
    }
}

impl Default for MockBusState {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory register bus for tests
pub struct MockBus {
    state: Arc<RwLock<MockBusState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockBusState::new())),
        }
    }

    /// Get shared state for manipulation in tests
    pub fn state(&self) -> Arc<RwLock<MockBusState>> {
        Arc::clone(&self.state)
    }

    /// Latch a value into a register
    pub fn set_register(&self, register: u8, value: u8) {
        if let Ok(mut state) = self.state.write() {
            state.registers[register as usize] = value;
        }
    }

    /// Make the next `count` reads fail with a NACK
    pub fn fail_next_reads(&self, count: u32) {
        if let Ok(mut state) = self.state.write() {
            state.failing_reads = count;
        }
    }

    /// Total reads attempted so far
    pub fn reads(&self) -> u64 {
        self.state.read().map(|s| s.reads).unwrap_or(0)
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for MockBus {
    fn read(&mut self, register: u8) -> Result<u8> {
        let mut state = self
            .state
            .write()
            .map_err(|_| BusError::Io(std::io::Error::other("mock state poisoned")))?;

        state.reads += 1;

        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            tracing::debug!("[MOCK] Injected read failure at register {:#04x}", register);
            return Err(BusError::Nack { address: 0x46 });
        }

        Ok(state.registers[register as usize])
    }
}
