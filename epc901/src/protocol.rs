use crate::{
    command::Command,
    config::DEFAULT_TIMEOUT,
    error::{ProtocolError, Result},
    io_adapter::Transport,
    response::{
        parser::{parse_metadata, parse_pixel_data},
        Frame, Transfer,
    },
};
use core::time::Duration;
use log::{debug, trace};

/// Command vocabulary of the EPC901 breakout board. Every call is a single write followed by the
/// reply lines that command produces, nothing is pipelined.
pub struct Protocol<T: Transport> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> Protocol<T> {
    pub fn new(transport: T) -> Self {
        Self::with_timeout(transport, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(transport: T, timeout: Duration) -> Self {
        Protocol { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn send_command(&mut self, cmd: Command) -> Result<()> {
        self.transport.write_line(&cmd.encode())
    }

    fn receive_ack(&mut self, cmd: Command) -> Result<()> {
        for _ in 0..cmd.ack_lines() {
            match self.transport.read_line(self.timeout)? {
                Some(line) => trace!("{} acknowledged with {:?}", cmd, line),
                None => {
                    return Err(ProtocolError::MissingAck {
                        command: cmd.to_string(),
                    }
                    .into())
                }
            }
        }
        Ok(())
    }

    fn execute(&mut self, cmd: Command) -> Result<()> {
        self.send_command(cmd)?;
        self.receive_ack(cmd)
    }

    /// Disables local echo, board answers with a banner and an acknowledgment
    pub fn echo_off(&mut self) -> Result<()> {
        self.execute(Command::EchoOff)
    }

    pub fn echo_on(&mut self) -> Result<()> {
        self.execute(Command::EchoOn)
    }

    pub fn reset_sensor(&mut self) -> Result<()> {
        self.execute(Command::ResetSensor)
    }

    pub fn set_exposure(&mut self, exposure_us: u32) -> Result<()> {
        self.execute(Command::Exposure(exposure_us))
    }

    /// Triggers a single exposure, board keeps the frame until it is transferred
    pub fn capture(&mut self) -> Result<()> {
        self.execute(Command::Capture)
    }

    /// Requests next stored frame. Both reply lines are always consumed before anything is
    /// decoded, so a malformed frame does not leave stray lines behind. Only the data line may
    /// time out or come back empty to signal the end of burst; a board that does not answer with
    /// metadata at all is a protocol error.
    pub fn transfer(&mut self) -> Result<Transfer> {
        self.send_command(Command::Transfer)?;
        let meta = self
            .transport
            .read_line(self.timeout)?
            .ok_or_else(|| ProtocolError::MissingReply {
                command: Command::Transfer.to_string(),
            })?;
        // Timing out on pixel data is the documented way of running out of frames
        let data = self.transport.read_line(self.timeout)?.unwrap_or_default();
        let (meta, data) = (meta.trim(), data.trim());

        let meta = if meta.is_empty() {
            None
        } else {
            Some(parse_metadata(meta)?)
        };
        if data.is_empty() {
            debug!("No pixel data after {}, treating as end of burst", Command::Transfer);
            return Ok(Transfer::Exhausted);
        }
        let meta = meta.ok_or(ProtocolError::UnexpectedPixelData)?;
        let pixels = parse_pixel_data(data)?;
        trace!("Decoded frame {} with {} pixels", meta.index, pixels.len());
        Ok(Transfer::Frame(Frame::new(meta, pixels)))
    }

    /// Captures and transfers a single frame outside of any burst bookkeeping
    pub fn snap(&mut self) -> Result<Transfer> {
        self.capture()?;
        self.transfer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, io_adapter::std_io::StdIoAdapter, response::FrameMeta};
    use claims::*;
    use pretty_assertions::assert_eq;
    use utilities::{Exchange, FakeBoard, FRAME_EXAMPLE_DATA, FRAME_EXAMPLE_META};

    const SHORT_TIMEOUT: Duration = Duration::from_millis(20);

    fn protocol(board: FakeBoard) -> Protocol<StdIoAdapter<FakeBoard>> {
        Protocol::with_timeout(StdIoAdapter::new(board), SHORT_TIMEOUT)
    }

    #[test]
    fn echo_off_consumes_banner() {
        let (board, journal) = FakeBoard::new();
        let mut proto = protocol(board);
        assert_ok!(proto.echo_off());
        assert_ok!(proto.reset_sensor());
        assert_eq!(
            journal.exchanges(),
            vec![
                Exchange::Sent("@echo off".to_owned()),
                Exchange::Received("EPC901 breakout".to_owned()),
                Exchange::Received("OK".to_owned()),
                Exchange::Sent("@reset sensor".to_owned()),
                Exchange::Received("OK".to_owned()),
            ]
        );
    }

    #[test]
    fn missing_ack_is_protocol_error() {
        let (board, _) = FakeBoard::new();
        let mut proto = protocol(board.muted("@exposure 250"));
        assert_err_eq!(
            proto.set_exposure(250).map_err(|e| match e {
                Error::Protocol(p) => p,
                other => panic!("Expected protocol error, got {other:?}"),
            }),
            ProtocolError::MissingAck {
                command: "@exposure 250".to_owned()
            }
        );
    }

    #[test]
    fn transfer_decodes_frame() {
        let (board, _) = FakeBoard::new();
        let mut proto = protocol(board.with_reply("3,1500,1000", "0001000fffff"));
        let frame = assert_ok!(proto.transfer());
        assert_eq!(
            frame,
            Transfer::Frame(Frame::new(
                FrameMeta {
                    index: 3,
                    timestamp_ms: 1500,
                    exposure_us: 1000
                },
                vec![1, 15, 65535]
            ))
        );
    }

    #[test]
    fn transfer_full_sensor_line() {
        let (board, _) = FakeBoard::new();
        let mut proto = protocol(board.with_reply(&FRAME_EXAMPLE_META, &FRAME_EXAMPLE_DATA));
        match assert_ok!(proto.transfer()) {
            Transfer::Frame(frame) => {
                assert_eq!(frame.index(), 7);
                assert_eq!(frame.timestamp_ms(), 1532);
                assert_eq!(frame.pixels().len(), crate::SENSOR_PIXEL_COUNT);
                assert_eq!(frame.min(), Some(600));
                assert_eq!(frame.max(), Some(2419));
            }
            Transfer::Exhausted => panic!("Expected a frame"),
        }
    }

    #[test]
    fn empty_data_line_is_exhaustion() {
        let (board, _) = FakeBoard::new();
        let mut proto = protocol(board.with_reply("4,1600,1000", ""));
        assert_ok_eq!(proto.transfer(), Transfer::Exhausted);
        // Board without queued frames replies with two empty lines
        assert_ok_eq!(proto.transfer(), Transfer::Exhausted);
    }

    #[test]
    fn silent_board_is_protocol_error() {
        let (board, journal) = FakeBoard::new();
        let mut proto = protocol(board.muted("@transfer"));
        assert_err_eq!(
            proto.transfer().map_err(|e| match e {
                Error::Protocol(p) => p,
                other => panic!("Expected protocol error, got {other:?}"),
            }),
            ProtocolError::MissingReply {
                command: "@transfer".to_owned()
            }
        );
        assert_eq!(journal.exchanges(), vec![Exchange::Sent("@transfer".to_owned())]);
    }

    #[test]
    fn malformed_metadata_before_empty_data() {
        let (board, journal) = FakeBoard::new();
        let mut proto = protocol(board.with_reply("garbage!!", ""));
        assert_err_eq!(
            proto.transfer().map_err(|e| match e {
                Error::Protocol(p) => p,
                other => panic!("Expected protocol error, got {other:?}"),
            }),
            ProtocolError::MalformedMetadata("garbage!!".to_owned())
        );
        // Data line was still consumed
        assert_eq!(journal.exchanges().len(), 3);
    }

    #[test]
    fn metadata_without_data_is_exhaustion() {
        let (board, _) = FakeBoard::new();
        let mut proto = protocol(board.with_reply("4,1600,1000", ""));
        assert_ok_eq!(proto.transfer(), Transfer::Exhausted);
    }

    #[test]
    fn malformed_replies_are_protocol_errors() {
        let (board, journal) = FakeBoard::new();
        let board = board
            .with_reply("3,1500", "0001")
            .with_reply("3,1500,1000", "00010")
            .with_reply("3,1500,1000", "000g")
            .with_reply("", "0001");
        let mut proto = protocol(board);

        assert_matches!(
            proto.transfer(),
            Err(Error::Protocol(ProtocolError::MalformedMetadata(_)))
        );
        assert_matches!(
            proto.transfer(),
            Err(Error::Protocol(ProtocolError::MalformedPixelData(_)))
        );
        assert_matches!(
            proto.transfer(),
            Err(Error::Protocol(ProtocolError::MalformedPixelData(_)))
        );
        assert_matches!(
            proto.transfer(),
            Err(Error::Protocol(ProtocolError::UnexpectedPixelData))
        );
        // Every reply was consumed in full
        assert_eq!(journal.exchanges().len(), 4 * 3);
    }

    #[test]
    fn snap_single_frame() {
        let (board, journal) = FakeBoard::new();
        let mut proto = protocol(board.with_frame(0, 12, 50, &[0x3FFF, 0]));
        match assert_ok!(proto.snap()) {
            Transfer::Frame(frame) => assert_eq!(frame.pixels(), &[0x3FFF, 0]),
            Transfer::Exhausted => panic!("Expected a frame"),
        }
        assert_eq!(journal.sent(), vec!["@capture", "@transfer"]);
    }
}
