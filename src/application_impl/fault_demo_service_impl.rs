use crate::application_port::*;
use crate::domain_port::FaultSource;
use crate::logger::warn;
use std::sync::Arc;

/// Odds of the simulated dependency failing: a roll in `1..=sides` at or
/// below `target` fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultOdds {
    pub target: u32,
    pub sides: u32,
}

impl Default for FaultOdds {
    fn default() -> Self {
        FaultOdds {
            target: 2,
            sides: 6,
        }
    }
}

pub struct DiceFaultDemoService {
    source: Arc<dyn FaultSource>,
    odds: FaultOdds,
}

impl DiceFaultDemoService {
    pub fn new(source: Arc<dyn FaultSource>, odds: FaultOdds) -> Self {
        DiceFaultDemoService { source, odds }
    }
}

#[async_trait::async_trait]
impl FaultDemoService for DiceFaultDemoService {
    async fn run(&self) -> Result<DemoReport, ServiceError> {
        let roll = self.source.roll(self.odds.sides);
        if roll <= self.odds.target {
            warn!(
                "fault demo rolled {} against target {}, failing",
                roll, self.odds.target
            );
            return Err(ServiceError::Upstream(format!(
                "injected fault (rolled {})",
                roll
            )));
        }
        Ok(DemoReport { worked: true })
    }
}
