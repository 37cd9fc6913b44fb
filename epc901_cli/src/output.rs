use epc901::{Frame, Session};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Stdout that is only coloured when attached to a terminal
pub fn terminal() -> StandardStream {
    let choice = match atty::is(atty::Stream::Stdout) {
        true => ColorChoice::Auto,
        false => ColorChoice::Never,
    };
    StandardStream::stdout(choice)
}

/// Writes a coloured header followed by one port per line
pub fn print_ports(out: &mut impl WriteColor, ports: &[String]) -> io::Result<()> {
    let (color, header) = if ports.is_empty() {
        (Color::Red, "No serial ports found, is the breakout board plugged in?")
    } else {
        (Color::Green, "Serial ports:")
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    writeln!(out, "{header}")?;
    out.reset()?;
    for port in ports {
        writeln!(out, "  {port}")?;
    }
    Ok(())
}

pub fn frame_summary(frame: &Frame) -> String {
    log::trace!("Summarizing frame {}", frame.index());
    format!(
        "frame {:>4}  {:>8} ms  exposure {:>6} us  min {:>5}  max {:>5}",
        frame.index(),
        frame.timestamp_ms(),
        frame.exposure_us(),
        frame.min().unwrap_or_default(),
        frame.max().unwrap_or_default(),
    )
}

pub fn session_summary(session: &Session) -> Vec<String> {
    let mut lines: Vec<_> = session.frames.iter().map(frame_summary).collect();
    let mode = if session.fast_mode { "fast" } else { "normal" };
    lines.push(format!(
        "{} of {} frames from {} ({} mode, {} pixels each)",
        session.frames.len(),
        session.frame_count,
        session.port,
        mode,
        session.pixel_count().unwrap_or_default(),
    ));
    if session.is_short() {
        lines.push("Board ran out of frames before the burst was complete".to_owned());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use epc901::FrameMeta;
    use termcolor::NoColor;

    fn frame(index: u32, pixels: Vec<u16>) -> Frame {
        Frame::new(
            FrameMeta {
                index,
                timestamp_ms: 1500,
                exposure_us: 1000,
            },
            pixels,
        )
    }

    #[test]
    fn summarize_frame() {
        let line = frame_summary(&frame(3, vec![1, 15, 65535]));
        assert_eq!(
            line,
            "frame    3      1500 ms  exposure   1000 us  min     1  max 65535"
        );
    }

    #[test]
    fn summarize_short_session() {
        let session = Session {
            port: "/dev/ttyACM0".to_owned(),
            frame_count: 3,
            interval_ms: 0,
            fast_mode: true,
            frames: vec![frame(0, vec![5, 6]), frame(1, vec![7, 8])],
        };
        let lines = session_summary(&session);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "2 of 3 frames from /dev/ttyACM0 (fast mode, 2 pixels each)");
        assert!(lines[3].contains("ran out"));
    }

    #[test]
    fn list_ports() {
        let mut out = NoColor::new(Vec::new());
        print_ports(&mut out, &["/dev/ttyACM0".to_owned(), "/dev/ttyUSB1".to_owned()]).unwrap();
        assert_eq!(
            String::from_utf8(out.into_inner()).unwrap(),
            "Serial ports:\n  /dev/ttyACM0\n  /dev/ttyUSB1\n"
        );

        let mut out = NoColor::new(Vec::new());
        print_ports(&mut out, &[]).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.starts_with("No serial ports found"));
        assert_eq!(text.lines().count(), 1);
    }
}
