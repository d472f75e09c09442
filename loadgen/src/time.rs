/// Wall-clock format every event timestamp uses.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait TimeSource {
    // Local wall clock in TIMESTAMP_FORMAT
    fn current_time(&self) -> String;
}

#[derive(Clone)]
pub struct SystemTime {}

impl TimeSource for SystemTime {
    fn current_time(&self) -> String {
        chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Pinned clock for deterministic tests.
#[derive(Clone)]
pub struct FixedTime {
    pub time: String,
}

impl TimeSource for FixedTime {
    fn current_time(&self) -> String {
        self.time.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{SystemTime, TimeSource};

    #[test]
    fn system_time_matches_the_wire_format() {
        let now = SystemTime {}.current_time();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(now.len(), 19);
        assert_eq!(&now[4..5], "-");
        assert_eq!(&now[10..11], " ");
        assert_eq!(&now[13..14], ":");
    }
}
