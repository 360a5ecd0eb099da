use crate::domain_port::FaultSource;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct RandomFaultSource;

impl FaultSource for RandomFaultSource {
    fn roll(&self, sides: u32) -> u32 {
        rand::thread_rng().gen_range(1..=sides.max(1))
    }
}

/// Replays a fixed list of rolls, then keeps returning `exhausted`.
#[derive(Debug)]
pub struct ScriptedFaultSource {
    rolls: Mutex<VecDeque<u32>>,
    exhausted: u32,
}

impl ScriptedFaultSource {
    pub fn new(rolls: impl IntoIterator<Item = u32>, exhausted: u32) -> Self {
        ScriptedFaultSource {
            rolls: Mutex::new(rolls.into_iter().collect()),
            exhausted,
        }
    }

    /// Queues more rolls behind the ones not yet consumed.
    pub fn push(&self, rolls: impl IntoIterator<Item = u32>) {
        self.rolls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(rolls);
    }

    /// Scripted rolls not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rolls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl FaultSource for ScriptedFaultSource {
    fn roll(&self, _sides: u32) -> u32 {
        self.rolls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.exhausted)
    }
}
