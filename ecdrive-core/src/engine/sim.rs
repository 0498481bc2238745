//! Simulated panel for engine tests
//!
//! Records every actuator and delay call into one ordered log, and serves
//! scripted segment readings. Segments without a script read a healthy value
//! for the level they were last driven to.

use core::cell::{Cell, RefCell};

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use super::{EcDisplay, StopFlag};
use crate::config::types::test_config;
use crate::state::MAX_SEGMENTS;
use crate::traits::ElectrodeActuator;

/// Healthy colored reading at mid-supply (color_low is 2184)
pub const COLORED_OK: u16 = 2600;
/// Healthy bleached reading at mid-supply (bleach_high is 1911)
pub const BLEACHED_OK: u16 = 1500;

/// One recorded hardware call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Counter(u16),
    CounterOff,
    Drive(usize, bool),
    Read(usize, u16),
    Release(usize),
    ReleaseAll,
    Delay(u32),
}

pub struct Bench {
    count: usize,
    ops: RefCell<Vec<Op, 1024>>,
    scripts: RefCell<[Vec<u16, 16>; MAX_SEGMENTS]>,
    last_level: RefCell<[Option<bool>; MAX_SEGMENTS]>,
    stop: StopFlag,
    stop_when: Cell<Option<fn(&Op) -> bool>>,
}

impl Bench {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ops: RefCell::new(Vec::new()),
            scripts: RefCell::new(core::array::from_fn(|_| Vec::new())),
            last_level: RefCell::new([None; MAX_SEGMENTS]),
            stop: StopFlag::new(),
            stop_when: Cell::new(None),
        }
    }

    pub fn stop(&self) -> &StopFlag {
        &self.stop
    }

    /// Queue readings for a segment, served one per sample
    pub fn script(&self, index: usize, readings: &[u16]) {
        let mut scripts = self.scripts.borrow_mut();
        for &r in readings {
            scripts[index].push(r).unwrap();
        }
    }

    /// Raise the stop flag right after the first op matching `trigger`
    pub fn stop_when(&self, trigger: fn(&Op) -> bool) {
        self.stop_when.set(Some(trigger));
    }

    pub fn ops(&self) -> Vec<Op, 1024> {
        self.ops.borrow().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    /// Delays in order, excluding counter electrode settles
    pub fn holds(&self) -> Vec<u32, 64> {
        let mut holds = Vec::new();
        for op in self.ops.borrow().iter() {
            if let Op::Delay(ms) = op {
                if *ms != crate::config::COUNTER_SETTLE_MS {
                    holds.push(*ms).unwrap();
                }
            }
        }
        holds
    }

    pub fn drives(&self) -> Vec<(usize, bool), 256> {
        let mut drives = Vec::new();
        for op in self.ops.borrow().iter() {
            if let Op::Drive(i, high) = op {
                drives.push((*i, *high)).unwrap();
            }
        }
        drives
    }

    fn record(&self, op: Op) {
        self.ops.borrow_mut().push(op).unwrap();
        if let Some(trigger) = self.stop_when.get() {
            if trigger(&op) {
                self.stop.request();
                self.stop_when.set(None);
            }
        }
    }

    fn sample(&self, index: usize) -> u16 {
        let mut scripts = self.scripts.borrow_mut();
        if !scripts[index].is_empty() {
            return scripts[index].remove(0);
        }
        match self.last_level.borrow()[index] {
            Some(true) => COLORED_OK,
            _ => BLEACHED_OK,
        }
    }
}

pub struct SimPanel<'b> {
    bench: &'b Bench,
}

impl<'b> SimPanel<'b> {
    pub fn new(bench: &'b Bench) -> Self {
        Self { bench }
    }
}

impl ElectrodeActuator for SimPanel<'_> {
    fn segment_count(&self) -> usize {
        self.bench.count
    }

    fn set_counter_level(&mut self, level: u16) {
        self.bench.record(Op::Counter(level));
    }

    fn disable_counter(&mut self) {
        self.bench.record(Op::CounterOff);
    }

    fn drive_segment(&mut self, index: usize, high: bool) {
        self.bench.last_level.borrow_mut()[index] = Some(high);
        self.bench.record(Op::Drive(index, high));
    }

    fn read_segment(&mut self, index: usize) -> u16 {
        let value = self.bench.sample(index);
        self.bench.record(Op::Read(index, value));
        value
    }

    fn release_segment(&mut self, index: usize) {
        self.bench.record(Op::Release(index));
    }

    fn release_all(&mut self) {
        self.bench.record(Op::ReleaseAll);
    }
}

pub struct SimDelay<'b> {
    bench: &'b Bench,
}

impl<'b> SimDelay<'b> {
    pub fn new(bench: &'b Bench) -> Self {
        Self { bench }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.bench.record(Op::Delay(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.bench.record(Op::Delay(ms));
    }
}

pub type SimDisplay<'b> = EcDisplay<'b, SimPanel<'b>, SimDelay<'b>>;

/// Display on a 3.0 V supply with the shared test configuration
pub fn healthy_display(bench: &Bench) -> SimDisplay<'_> {
    match EcDisplay::new(
        SimPanel::new(bench),
        SimDelay::new(bench),
        bench.stop(),
        test_config(),
        3000,
    ) {
        Ok(display) => display,
        Err(e) => panic!("sim display rejected: {:?}", e),
    }
}
