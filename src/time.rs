use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

pub struct Timer<'a> {
    name: &'a str,
    start: std::time::Instant,
}

impl<'a> Timer<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            start: std::time::Instant::now(),
        }
    }
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        let elapsed_time = self.start.elapsed();
        let time_in_s = elapsed_time.as_secs_f32();
        match elapsed_time.as_nanos().ilog10() {
            0..3 => println!("{} took {:.1}ns", self.name, time_in_s * 1e9),
            3..6 => println!("{} took {:.1}μs", self.name, time_in_s * 1e6),
            6..9 => println!("{} took {:.1}ms", self.name, time_in_s * 1e3),
            9..12 => println!("{} took {:.1}s", self.name, time_in_s),
            12.. => println!("{} took {:.0}s", self.name, time_in_s),
        }
    }
}

const MIGRATION_TIMESTAMP: &[FormatItem] = format_description!("[year][month][day][hour][minute][second]");

/// Renders the `YYYYMMDDHHMMSS` UTC timestamp used as a migration file prefix.
pub fn migration_timestamp(now: OffsetDateTime) -> String {
    now.to_offset(time::UtcOffset::UTC)
        .format(MIGRATION_TIMESTAMP)
        .expect("timestamp format is a compile-time constant")
}

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_utc_timestamp() {
        let moment = datetime!(2024-03-05 13:07:09 UTC);
        assert_eq!(migration_timestamp(moment), "20240305130709");
    }
}
