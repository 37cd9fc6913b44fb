use core::{fmt, fmt::Display};

/// Line that can be sent to the breakout board
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Command {
    EchoOff,
    EchoOn,
    ResetSensor,
    /// Exposure time in microseconds
    Exposure(u32),
    Capture,
    Transfer,
}

impl Command {
    /// Encodes command as a newline terminated ASCII line
    pub fn encode(&self) -> Vec<u8> {
        format!("{self}\n").into_bytes()
    }

    /// Amount of opaque lines the board replies with. Transfer replies are decoded separately.
    pub fn ack_lines(&self) -> usize {
        use Command::*;
        match self {
            // Board prints a banner before acknowledging
            EchoOff => 2,
            EchoOn | ResetSensor | Exposure(_) | Capture => 1,
            Transfer => 0,
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Command::*;
        match self {
            EchoOff => f.write_str("@echo off"),
            EchoOn => f.write_str("@echo on"),
            ResetSensor => f.write_str("@reset sensor"),
            Exposure(us) => write!(f, "@exposure {us}"),
            Capture => f.write_str("@capture"),
            Transfer => f.write_str("@transfer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encode_commands() {
        assert_eq!(Command::EchoOff.encode(), b"@echo off\n");
        assert_eq!(Command::EchoOn.encode(), b"@echo on\n");
        assert_eq!(Command::ResetSensor.encode(), b"@reset sensor\n");
        assert_eq!(Command::Exposure(1000).encode(), b"@exposure 1000\n");
        assert_eq!(Command::Exposure(0).encode(), b"@exposure 0\n");
        assert_eq!(Command::Capture.encode(), b"@capture\n");
        assert_eq!(Command::Transfer.encode(), b"@transfer\n");
    }

    #[test]
    fn ack_line_counts() {
        assert_eq!(Command::EchoOff.ack_lines(), 2);
        assert_eq!(Command::Exposure(5).ack_lines(), 1);
        assert_eq!(Command::Transfer.ack_lines(), 0);
    }
}
