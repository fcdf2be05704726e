use std::time::{Duration, Instant};

/// Wall-clock timings of the pipeline stages, in run order
pub struct StageTimer {
    started: Instant,
    last: Instant,
    stages: Vec<(String, Duration)>,
}

impl StageTimer {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last: now,
            stages: Vec::new(),
        }
    }

    /// Close the current stage under `name` and return its duration
    pub fn lap(&mut self, name: &str) -> Duration {
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        self.stages.push((name.to_string(), elapsed));
        elapsed
    }

    pub fn stages(&self) -> &[(String, Duration)] {
        &self.stages
    }

    pub fn total(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Format time as "xx h xx m xx.xxx s" format
pub fn format_time_used(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs_f64();
    let hours = (total_secs / 3600.0) as u64;
    let minutes = ((total_secs % 3600.0) / 60.0) as u64;
    let seconds = total_secs % 60.0;

    if hours > 0 {
        format!("[Time used] {:02} h {:02} m {:05.3} s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("[Time used] {:02} m {:05.3} s", minutes, seconds)
    } else {
        format!("[Time used] {:05.3} s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_magnitude() {
        assert_eq!(format_time_used(Duration::from_millis(1500)), "[Time used] 1.500 s");
        assert_eq!(format_time_used(Duration::from_secs(125)), "[Time used] 02 m 5.000 s");
        assert_eq!(
            format_time_used(Duration::from_secs(3725)),
            "[Time used] 01 h 02 m 5.000 s"
        );
    }

    #[test]
    fn laps_are_recorded_in_order() {
        let mut timer = StageTimer::start();
        timer.lap("read");
        timer.lap("aggregate");
        let names: Vec<&str> = timer.stages().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["read", "aggregate"]);
        assert!(timer.total() >= timer.stages()[0].1);
    }
}
