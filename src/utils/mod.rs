use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Level of the crawl a timer covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Crawl,
    Season,
    League,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Crawl => "crawl",
            Stage::Season => "season",
            Stage::League => "league",
        })
    }
}

/// Times one crawl stage and logs the duration when dropped: the whole crawl
/// at info, seasons and leagues at debug.
pub struct StageTimer {
    stage: Stage,
    label: String,
    start: Instant,
}

impl StageTimer {
    pub fn start(stage: Stage, label: impl Into<String>) -> Self {
        let label = label.into();
        debug!("{} {} started", stage, label);
        Self {
            stage,
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        match self.stage {
            Stage::Crawl => info!("{} {} took {:.2?}", self.stage, self.label, self.elapsed()),
            _ => debug!("{} {} took {:.2?}", self.stage, self.label, self.elapsed()),
        }
    }
}
