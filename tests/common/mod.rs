/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use embedded_hal::blocking::i2c::{Read, Write};
use embedded_hal_mock::delay::MockNoop;

use sr030pc30_i2c::power::{DEVICE_ID, IDENTITY_REGISTER};
use sr030pc30_i2c::{Bus, CompiledTables, InterfaceParams, Platform, PowerState, Sr030pc30};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeError {
    Nack,
}

struct Registers {
    map: [u8; 256],
    pointer: u8,
    writes: Vec<(u8, u8)>,
    failing: HashSet<u8>,
    absent: bool,
}

/// Register-level model of the sensor behind the two-wire bus.
///
/// Clones share the same registers, so a test keeps one handle while the
/// driver owns another.
#[derive(Clone)]
pub struct FakeSensor {
    inner: Rc<RefCell<Registers>>,
}

impl FakeSensor {
    pub fn new() -> Self {
        let mut map = [0u8; 256];
        map[IDENTITY_REGISTER as usize] = DEVICE_ID;
        Self {
            inner: Rc::new(RefCell::new(Registers {
                map,
                pointer: 0,
                writes: Vec::new(),
                failing: HashSet::new(),
                absent: false,
            })),
        }
    }

    /// Every transfer addressed to `register` is NACKed
    pub fn fail_register(&self, register: u8) {
        self.inner.borrow_mut().failing.insert(register);
    }

    pub fn heal_register(&self, register: u8) {
        self.inner.borrow_mut().failing.remove(&register);
    }

    /// Nothing answers on the bus
    pub fn unplug(&self) {
        self.inner.borrow_mut().absent = true;
    }

    pub fn set_register(&self, register: u8, value: u8) {
        self.inner.borrow_mut().map[register as usize] = value;
    }

    pub fn register(&self, register: u8) -> u8 {
        self.inner.borrow().map[register as usize]
    }

    pub fn registers(&self) -> [u8; 256] {
        self.inner.borrow().map
    }

    /// Successful register writes, oldest first
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.inner.borrow().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.inner.borrow_mut().writes.clear();
    }
}

impl Write for FakeSensor {
    type Error = FakeError;

    fn write(&mut self, _address: u8, bytes: &[u8]) -> Result<(), FakeError> {
        let mut inner = self.inner.borrow_mut();
        if inner.absent || bytes.is_empty() || inner.failing.contains(&bytes[0]) {
            return Err(FakeError::Nack);
        }
        match *bytes {
            [register] => inner.pointer = register,
            [register, value] => {
                inner.map[register as usize] = value;
                inner.writes.push((register, value));
            }
            _ => return Err(FakeError::Nack),
        }
        Ok(())
    }
}

impl Read for FakeSensor {
    type Error = FakeError;

    fn read(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), FakeError> {
        let inner = self.inner.borrow();
        if inner.absent || inner.failing.contains(&inner.pointer) {
            return Err(FakeError::Nack);
        }
        for byte in buffer.iter_mut() {
            *byte = inner.map[inner.pointer as usize];
        }
        Ok(())
    }
}

/// Records rail changes instead of switching anything
#[derive(Clone, Default)]
pub struct FakePlatform {
    calls: Rc<RefCell<Vec<PowerState>>>,
}

impl FakePlatform {
    pub fn calls(&self) -> Vec<PowerState> {
        self.calls.borrow().clone()
    }
}

impl Platform for FakePlatform {
    type PrivateData = &'static str;

    fn set_power(&mut self, state: PowerState) {
        self.calls.borrow_mut().push(state);
    }

    fn interface_params(&self) -> InterfaceParams {
        InterfaceParams {
            clock_hz: 12_000_000,
            hsync_active_high: true,
            vsync_active_high: false,
            pclk_rising_edge: true,
        }
    }

    fn private_data(&self) -> &&'static str {
        &"reference board"
    }
}

pub type TestBus = Bus<FakeSensor, MockNoop>;
pub type Driver = Sr030pc30<TestBus, FakePlatform, CompiledTables>;

pub fn bus(sensor: &FakeSensor) -> TestBus {
    Bus::default(sensor.clone(), MockNoop::new())
}

/// Driver over `sensor` reading compiled tables, plus a handle on its platform
pub fn driver(sensor: &FakeSensor) -> (Driver, FakePlatform) {
    let platform = FakePlatform::default();
    let driver = Sr030pc30::new(bus(sensor), platform.clone(), CompiledTables);
    (driver, platform)
}

/// Driver that has been powered on and has not streamed yet
pub fn powered(sensor: &FakeSensor) -> (Driver, FakePlatform) {
    let (mut driver, platform) = driver(sensor);
    driver.power_on().unwrap();
    sensor.clear_writes();
    (driver, platform)
}

pub fn entries(batch: &sr030pc30_i2c::RegisterBatch) -> Vec<(u8, u8)> {
    batch.entries().iter().map(|e| (e.address, e.value)).collect()
}
