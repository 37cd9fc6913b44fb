//! Multi-frame acquisition on top of [`Protocol`].
//!
//! [`BurstController`] walks the board through
//! `Closed -> Opened -> Ready -> ExposureSet -> Capturing -> Captured -> Transferring -> Ready`
//! and refuses calls that do not fit its current state. Closing is allowed from anywhere and also
//! happens on drop, so the board gets its echo back even if acquisition fails half way.

use crate::{
    config::{AcquisitionConfig, BurstConfig, CaptureMode},
    error::{Error, ProtocolError, Result},
    io_adapter::Transport,
    protocol::Protocol,
    response::{Frame, Transfer},
};
use core::{fmt, fmt::Display, time::Duration};
use log::{debug, info, warn};

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BurstState {
    Closed,
    /// Transport is open, handshake is in progress
    Opened,
    Ready,
    ExposureSet,
    Capturing,
    /// All triggers were acknowledged, frames are waiting on the board
    Captured,
    Transferring,
}

impl Display for BurstState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BurstState::*;
        f.write_str(match self {
            Closed => "closed",
            Opened => "opened",
            Ready => "ready",
            ExposureSet => "ready with exposure set",
            Capturing => "capturing",
            Captured => "waiting for transfer",
            Transferring => "transferring",
        })
    }
}

/// Result of a single burst run
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Session {
    pub port: String,
    pub frame_count: u32,
    pub interval_ms: u64,
    pub fast_mode: bool,
    pub frames: Vec<Frame>,
}

impl Session {
    /// Board ran out of frames before the requested amount was transferred
    pub fn is_short(&self) -> bool {
        self.frames.len() < self.frame_count as usize
    }

    /// Pixel count shared by every frame of the session
    pub fn pixel_count(&self) -> Option<usize> {
        self.frames.first().map(|f| f.pixels().len())
    }

    pub fn timestamps(&self) -> impl Iterator<Item = u64> + '_ {
        self.frames.iter().map(Frame::timestamp_ms)
    }
}

pub struct BurstController<T: Transport> {
    protocol: Protocol<T>,
    state: BurstState,
    burst: Option<BurstConfig>,
    mode: CaptureMode,
}

impl<T: Transport> BurstController<T> {
    /// Takes over an open transport, disables echo and resets the sensor. If the handshake fails
    /// the transport is closed before the error is returned.
    pub fn open(transport: T) -> Result<Self> {
        Self::open_protocol(transport.into_protocol())
    }

    pub fn open_protocol(protocol: Protocol<T>) -> Result<Self> {
        let mut controller = BurstController {
            protocol,
            state: BurstState::Opened,
            burst: None,
            mode: CaptureMode::default(),
        };
        debug!("Initializing board on {}", controller.port());
        controller.protocol.echo_off()?;
        controller.protocol.reset_sensor()?;
        controller.state = BurstState::Ready;
        Ok(controller)
    }

    pub fn state(&self) -> BurstState {
        self.state
    }

    pub fn port(&self) -> &str {
        self.protocol.transport().port()
    }

    pub fn burst_config(&self) -> Option<BurstConfig> {
        self.burst
    }

    fn ensure(&self, operation: &'static str, allowed: &[BurstState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::IllegalState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, state: BurstState) {
        debug!("{} -> {}", self.state, state);
        self.state = state;
    }

    pub fn configure_exposure(&mut self, exposure_us: u32) -> Result<()> {
        use BurstState::*;
        self.ensure("set exposure", &[Ready, ExposureSet])?;
        self.protocol.set_exposure(exposure_us)?;
        self.transition(ExposureSet);
        Ok(())
    }

    /// Stores frame count and interval for the next capture, nothing is sent to the board
    pub fn configure_burst(&mut self, frame_count: i64, interval_ms: i64) -> Result<()> {
        self.apply_burst(BurstConfig::try_new(frame_count, interval_ms)?)
    }

    /// Same as [`Self::configure_burst`] for an already validated config
    pub fn apply_burst(&mut self, burst: BurstConfig) -> Result<()> {
        use BurstState::*;
        self.ensure("configure burst", &[Ready, ExposureSet])?;
        self.burst = Some(burst);
        Ok(())
    }

    /// Issues one capture trigger per configured frame. In fast mode triggers go out back to back,
    /// otherwise the configured interval is slept between them. Nothing is decoded yet.
    pub fn capture_burst(&mut self, mode: CaptureMode) -> Result<()> {
        use BurstState::*;
        self.ensure("capture", &[Ready, ExposureSet])?;
        let burst = self.burst.ok_or(Error::IllegalState {
            operation: "capture before configuring burst",
            state: self.state,
        })?;

        self.mode = mode;
        self.transition(Capturing);
        let pause = match mode {
            CaptureMode::Fast => Duration::ZERO,
            CaptureMode::Normal => burst.interval(),
        };
        for n in 0..burst.frame_count() {
            if n > 0 && !pause.is_zero() {
                std::thread::sleep(pause);
            }
            self.protocol.capture()?;
        }
        debug!("Captured {} frames in {} mode", burst.frame_count(), mode);
        self.transition(Captured);
        Ok(())
    }

    /// Pulls frames off the board until it runs out or the configured amount is collected.
    /// Running out early is not an error, the session is just shorter.
    pub fn transfer_all(&mut self) -> Result<Session> {
        use BurstState::*;
        self.ensure("transfer", &[Captured])?;
        // Captured is only reachable through capture_burst, which requires a burst config
        let burst = self.burst.ok_or(Error::IllegalState {
            operation: "transfer",
            state: self.state,
        })?;
        self.transition(Transferring);

        let mut frames: Vec<Frame> = Vec::with_capacity(burst.frame_count() as usize);
        while frames.len() < burst.frame_count() as usize {
            let frame = match self.protocol.transfer()? {
                Transfer::Frame(frame) => frame,
                Transfer::Exhausted => {
                    debug!("Board ran out of frames after {}", frames.len());
                    break;
                }
            };
            let frame = self.admit(&frames, frame)?;
            frames.push(frame);
        }

        let session = Session {
            port: self.port().to_owned(),
            frame_count: burst.frame_count(),
            interval_ms: burst.interval_ms(),
            fast_mode: self.mode.is_fast(),
            frames,
        };
        if session.is_short() {
            info!(
                "Got {} out of {} requested frames",
                session.frames.len(),
                session.frame_count
            );
        }
        self.transition(Ready);
        Ok(session)
    }

    /// Numbers frame by its position and checks it against frames already collected
    fn admit(&self, collected: &[Frame], frame: Frame) -> Result<Frame> {
        let position = collected.len() as u32;
        let frame = if frame.index() != position {
            warn!(
                "Board numbered frame {} as {}, using transfer order",
                position,
                frame.index()
            );
            frame.renumbered(position)
        } else {
            frame
        };
        if let Some(prev) = collected.last() {
            if prev.pixels().len() != frame.pixels().len() {
                return Err(ProtocolError::PixelCountMismatch {
                    expected: prev.pixels().len(),
                    actual: frame.pixels().len(),
                }
                .into());
            }
            if frame.timestamp_ms() < prev.timestamp_ms() {
                warn!(
                    "Frame {} timestamp {} ms is earlier than previous {} ms",
                    position,
                    frame.timestamp_ms(),
                    prev.timestamp_ms()
                );
            }
        }
        debug!("Transferred frame {}", position);
        Ok(frame)
    }

    /// Gives echo back to the board and releases transport. Errors are logged and swallowed since
    /// acquisition results are final at this point. Calling it again does nothing.
    pub fn close(&mut self) {
        if self.state == BurstState::Closed {
            return;
        }
        if self.protocol.transport().is_open() {
            if let Err(e) = self.protocol.echo_on() {
                warn!("Could not re-enable echo on {}: {}", self.port(), e);
            }
        }
        self.protocol.transport_mut().close();
        self.transition(BurstState::Closed);
    }

    /// Opens, configures, captures, transfers and closes in one go
    pub fn run(transport: T, conf: &AcquisitionConfig) -> Result<Session> {
        let mut controller = Self::open(transport)?;
        controller.configure_exposure(conf.exposure_us)?;
        controller.apply_burst(conf.burst)?;
        controller.capture_burst(conf.mode)?;
        let session = controller.transfer_all()?;
        controller.close();
        Ok(session)
    }
}

impl<T: Transport> Drop for BurstController<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(feature = "serial")]
impl BurstController<crate::io_adapter::serial::SerialAdapter> {
    /// Opens serial device and runs the handshake on it
    pub fn open_serial(port: &str, conf: &crate::config::SerialConfig) -> Result<Self> {
        let transport = crate::io_adapter::serial::open_serial(port, conf)?;
        Self::open_protocol(Protocol::with_timeout(transport, conf.timeout))
    }
}
