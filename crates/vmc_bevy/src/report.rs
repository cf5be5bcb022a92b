use std::time::{Duration, Instant};

use bevy::prelude::*;
use tracing::info;

use crate::VmcSession;
use crate::LOG_METRICS;

/// Throttle for [`report_status`].
#[derive(Resource, Debug)]
pub struct StatusReportTimer {
    pub interval: Duration,
    pub last: Instant,
}

impl StatusReportTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }
}

/// Log the session report once per interval.
pub fn report_status(session: Res<VmcSession>, mut timer: ResMut<StatusReportTimer>) {
    let now = Instant::now();
    if now.duration_since(timer.last) < timer.interval {
        return;
    }
    timer.last = now;

    info!(target: LOG_METRICS, "session report\n{}", session.report());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vmc_protocol::Receiver;

    #[test]
    fn timer_advances_after_interval() {
        let mut app = App::new();
        app.insert_resource(VmcSession(Arc::new(Receiver::default())));
        app.insert_resource(StatusReportTimer::new(Duration::from_millis(1)));
        app.add_systems(Update, report_status);

        let start = app.world().resource::<StatusReportTimer>().last;
        std::thread::sleep(Duration::from_millis(2));
        app.update();

        let timer = app.world().resource::<StatusReportTimer>();
        assert!(timer.last > start);
    }
}
