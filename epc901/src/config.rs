use crate::error::{Error, Result};
use core::{
    fmt,
    fmt::{Debug, Display},
    time::Duration,
};

/// Baud rate the breakout board firmware ships with
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// How long to wait for a single reply line
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Parameters used when opening a serial connection to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum CaptureMode {
    /// One trigger per frame, spaced by the burst interval
    #[default]
    Normal,
    /// Back-to-back triggers, sensor decides the cadence and the interval is ignored
    Fast,
}

impl CaptureMode {
    pub fn is_fast(self) -> bool {
        self == CaptureMode::Fast
    }
}

impl From<bool> for CaptureMode {
    fn from(fast: bool) -> Self {
        if fast {
            CaptureMode::Fast
        } else {
            CaptureMode::Normal
        }
    }
}

impl Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Normal => f.write_str("normal"),
            CaptureMode::Fast => f.write_str("fast"),
        }
    }
}

/// Client side burst bookkeeping. The device has no command for this, so it only drives how many
/// triggers and transfers the controller issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstConfig {
    frame_count: u32,
    interval_ms: u64,
}

impl BurstConfig {
    pub fn try_new(frame_count: i64, interval_ms: i64) -> Result<Self> {
        if frame_count < 1 {
            return Err(Error::InvalidConfig("frame count must be at least 1"));
        }
        if interval_ms < 0 {
            return Err(Error::InvalidConfig("interval must not be negative"));
        }
        let frame_count = u32::try_from(frame_count)
            .map_err(|_| Error::InvalidConfig("frame count is too large"))?;
        Ok(BurstConfig {
            frame_count,
            // Checked to be non-negative above
            interval_ms: interval_ms as u64,
        })
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Everything needed for one complete acquisition run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionConfig {
    pub exposure_us: u32,
    pub burst: BurstConfig,
    pub mode: CaptureMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;

    #[test]
    fn serial_defaults() {
        let conf = SerialConfig::default();
        assert_eq!(conf.baud_rate, 115_200);
        assert_eq!(conf.timeout, Duration::from_secs(1));
    }

    #[test]
    fn burst_config_validation() {
        assert_matches!(BurstConfig::try_new(0, 0), Err(Error::InvalidConfig(_)));
        assert_matches!(BurstConfig::try_new(-1, 0), Err(Error::InvalidConfig(_)));
        assert_matches!(BurstConfig::try_new(5, -1), Err(Error::InvalidConfig(_)));
        assert_matches!(
            BurstConfig::try_new(i64::from(u32::MAX) + 1, 0),
            Err(Error::InvalidConfig(_))
        );

        let conf = assert_ok!(BurstConfig::try_new(5, 0));
        assert_eq!(conf.frame_count(), 5);
        assert_eq!(conf.interval(), Duration::ZERO);

        let conf = assert_ok!(BurstConfig::try_new(1, 250));
        assert_eq!(conf.interval(), Duration::from_millis(250));
    }

    #[test]
    fn capture_mode_from_flag() {
        assert_eq!(CaptureMode::from(true), CaptureMode::Fast);
        assert_eq!(CaptureMode::from(false), CaptureMode::Normal);
        assert_eq!(CaptureMode::Fast.to_string(), "fast");
    }
}
