use std::fmt;
use std::str::FromStr;

/// Maximum characters per LCD line on the 16x2 display.
pub const LCD_LINE_WIDTH: usize = 16;

/// A single line understood by the fan/door/LCD controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ToggleFan,
    ToggleDoor,
    SetFan(bool),
    SetDoor(bool),
    Display { line1: String, line2: String },
}

impl Command {
    /// Build an LCD command, clipping each line to the display width.
    pub fn display(line1: &str, line2: &str) -> Self {
        Command::Display {
            line1: lcd_line(line1),
            line2: lcd_line(line2),
        }
    }

    /// Single-line message form, rendered as `M<text>|`.
    pub fn message(text: &str) -> Self {
        Self::display(text, "")
    }
}

/// First 16 characters of `text`, with line terminators flattened so the
/// command stays on one wire line.
fn lcd_line(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(LCD_LINE_WIDTH)
        .collect()
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ToggleFan => f.write_str("F"),
            Command::ToggleDoor => f.write_str("D"),
            Command::SetFan(on) => write!(f, "F:{}", u8::from(*on)),
            Command::SetDoor(open) => write!(f, "D:{}", u8::from(*open)),
            Command::Display { line1, line2 } => write!(f, "M{line1}|{line2}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised device command '{}'", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line {
            "F" => Ok(Command::ToggleFan),
            "D" => Ok(Command::ToggleDoor),
            "F:1" => Ok(Command::SetFan(true)),
            "F:0" => Ok(Command::SetFan(false)),
            "D:1" => Ok(Command::SetDoor(true)),
            "D:0" => Ok(Command::SetDoor(false)),
            _ => {
                // The firmware treats a missing separator as "line 1 only".
                let body = line
                    .strip_prefix('M')
                    .ok_or_else(|| UnknownCommand(line.to_string()))?;
                let (line1, line2) = body.split_once('|').unwrap_or((body, ""));
                Ok(Command::display(line1, line2))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_wire_forms() {
        assert_eq!(Command::ToggleFan.to_string(), "F");
        assert_eq!(Command::ToggleDoor.to_string(), "D");
        assert_eq!(Command::SetFan(true).to_string(), "F:1");
        assert_eq!(Command::SetFan(false).to_string(), "F:0");
        assert_eq!(Command::SetDoor(true).to_string(), "D:1");
        assert_eq!(Command::SetDoor(false).to_string(), "D:0");
        assert_eq!(Command::display("Temp: 22C", "").to_string(), "MTemp: 22C|");
        assert_eq!(Command::message("Bye").to_string(), "MBye|");
    }

    #[test]
    fn display_lines_are_clipped_to_sixteen_chars() {
        let cmd = Command::display("Hello World 123456", "abcdefghijklmnopqrstuvwxyz");
        assert_eq!(cmd.to_string(), "MHello World 1234|abcdefghijklmnop");
    }

    #[test]
    fn clipping_counts_characters_not_bytes() {
        let cmd = Command::message("åäöåäöåäöåäöåäöåäö");
        assert_eq!(cmd.to_string(), "Måäöåäöåäöåäöåäöå|");
    }

    #[test]
    fn line_terminators_are_flattened() {
        let cmd = Command::display("two\nlines", "a\r\nb");
        assert_eq!(cmd.to_string(), "Mtwo lines|a  b");
    }

    #[test]
    fn parses_known_lines() {
        assert_eq!("F".parse::<Command>(), Ok(Command::ToggleFan));
        assert_eq!("D:0".parse::<Command>(), Ok(Command::SetDoor(false)));
        assert_eq!(
            "MHi|there".parse::<Command>(),
            Ok(Command::display("Hi", "there"))
        );
        assert_eq!("MHi".parse::<Command>(), Ok(Command::message("Hi")));
    }

    #[test]
    fn rejects_unknown_lines() {
        assert!("X".parse::<Command>().is_err());
        assert!("f".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
