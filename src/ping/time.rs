/// Split timestamp of one ping, as recorded in the survey file.
///
/// `hseconds` (hundredths of a second) is reconstructed by the store when
/// the recorder leaves it zeroed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PingTime {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub hseconds: u32,
}

impl PingTime {
    /// Absolute second count on a fixed calendar-independent scale used
    /// only for time differences. Every month counts 31 days.
    pub fn to_abs_seconds(&self) -> f64 {
        self.year as f64
            + self.month as f64 * 31.0 * 86_400.0
            + self.day as f64 * 86_400.0
            + self.hour as f64 * 3_600.0
            + self.minute as f64 * 60.0
            + self.second as f64
            + self.hseconds as f64 / 100.0
    }

    /// Whether two timestamps name the same whole second.
    pub fn same_whole_second(&self, other: &PingTime) -> bool {
        self.year == other.year
            && self.month == other.month
            && self.day == other.day
            && self.hour == other.hour
            && self.minute == other.minute
            && self.second == other.second
    }
}
