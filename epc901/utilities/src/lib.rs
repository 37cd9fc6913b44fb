use lazy_static::lazy_static;
use manifest_dir_macros::exist_relative_path;
use mockall::mock;
use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, ErrorKind, Read, Write},
    rc::Rc,
};

/// Canned `@transfer` reply recorded from a 1024 pixel sensor
pub const FRAME_EXAMPLE: &str = include_str!(exist_relative_path!("resources/test/frame_example.txt"));

lazy_static! {
    pub static ref FRAME_EXAMPLE_META: &'static str = FRAME_EXAMPLE
        .lines()
        .next()
        .expect("resources/test/frame_example.txt has no metadata line");
    pub static ref FRAME_EXAMPLE_DATA: &'static str = FRAME_EXAMPLE
        .lines()
        .nth(1)
        .expect("resources/test/frame_example.txt has no data line");
}

/// Formats pixels the way the breakout board sends them, 4 hex digits each without separators
pub fn encode_pixels(pixels: &[u16]) -> String {
    pixels.iter().map(|p| format!("{p:04x}")).collect()
}

mock! {
    pub IO {}
    impl Read for IO {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
    }
    impl Write for IO {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;
        fn flush(&mut self) -> std::io::Result<()>;
    }
}

/// Single line crossing the wire, as seen from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// Command written by the host, without line terminator
    Sent(String),
    /// Line handed back to the host, without line terminator
    Received(String),
}

/// Shared record of everything a [`FakeBoard`] saw, readable after the board was moved away
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Exchange>>>);

impl Journal {
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.0.borrow().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Exchange::Sent(cmd) => Some(cmd.clone()),
                Exchange::Received(_) => None,
            })
            .collect()
    }

    pub fn count_sent(&self, cmd: &str) -> usize {
        self.sent().iter().filter(|c| *c == cmd).count()
    }

    fn push(&self, exchange: Exchange) {
        self.0.borrow_mut().push(exchange);
    }
}

/// Scripted stand-in for the EPC901 breakout board. Acknowledges every command with "OK", hands
/// out queued frames on `@transfer` and replies with two empty lines once they run out. Reads
/// with nothing pending fail with `TimedOut`, like a serial port would.
pub struct FakeBoard {
    frames: VecDeque<(String, String)>,
    muted: Vec<String>,
    // Bytes waiting to be read by the host
    pending: VecDeque<u8>,
    // Partial line currently being handed out
    outgoing: Vec<u8>,
    // Partial command written by the host
    incoming: Vec<u8>,
    journal: Journal,
}

impl FakeBoard {
    pub fn new() -> (Self, Journal) {
        let journal = Journal::default();
        let board = FakeBoard {
            frames: VecDeque::new(),
            muted: Vec::new(),
            pending: VecDeque::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            journal: journal.clone(),
        };
        (board, journal)
    }

    /// Queues raw metadata and data lines for the next `@transfer`
    pub fn with_reply(mut self, meta: &str, data: &str) -> Self {
        self.frames.push_back((meta.to_owned(), data.to_owned()));
        self
    }

    /// Queues a well formed frame
    pub fn with_frame(self, index: u32, timestamp_ms: u64, exposure_us: u32, pixels: &[u16]) -> Self {
        self.with_reply(
            &format!("{index},{timestamp_ms},{exposure_us}"),
            &encode_pixels(pixels),
        )
    }

    /// Board will not answer to given command at all
    pub fn muted(mut self, cmd: &str) -> Self {
        self.muted.push(cmd.to_owned());
        self
    }

    fn reply(&mut self, lines: &[&str]) {
        for line in lines {
            self.pending.extend(line.as_bytes());
            self.pending.extend(b"\r\n");
        }
    }

    fn handle_command(&mut self, cmd: String) {
        self.journal.push(Exchange::Sent(cmd.clone()));
        if self.muted.contains(&cmd) {
            return;
        }
        match cmd.as_str() {
            "@echo off" => self.reply(&["EPC901 breakout", "OK"]),
            "@transfer" => match self.frames.pop_front() {
                Some((meta, data)) => self.reply(&[meta.as_str(), data.as_str()]),
                None => self.reply(&["", ""]),
            },
            _ => self.reply(&["OK"]),
        }
    }
}

impl Read for FakeBoard {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut count = 0;
        while count < buf.len() {
            let Some(b) = self.pending.pop_front() else {
                break;
            };
            buf[count] = b;
            count += 1;
            if b == b'\n' {
                let line = String::from_utf8_lossy(&self.outgoing)
                    .trim_end_matches('\r')
                    .to_owned();
                self.outgoing.clear();
                self.journal.push(Exchange::Received(line));
            } else {
                self.outgoing.push(b);
            }
        }
        if count == 0 {
            Err(io::Error::new(ErrorKind::TimedOut, "no reply from fake board"))
        } else {
            Ok(count)
        }
    }
}

impl Write for FakeBoard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for b in buf {
            if *b == b'\n' {
                let cmd = String::from_utf8_lossy(&self.incoming).into_owned();
                self.incoming.clear();
                self.handle_command(cmd);
            } else {
                self.incoming.push(*b);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
