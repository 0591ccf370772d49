use std::fmt;

/// The spawn contract for an external encoder: an executable plus its
/// ordered argument list. Built once per session, before the pipe opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for EncoderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_program_and_args() {
        let command = EncoderCommand {
            program: "ffmpeg".to_string(),
            args: vec!["-y".to_string(), "-i".to_string(), "pipe:".to_string()],
        };
        assert_eq!(command.to_string(), "ffmpeg -y -i pipe:");
    }

    #[test]
    fn test_display_without_args() {
        let command = EncoderCommand {
            program: "cat".to_string(),
            args: Vec::new(),
        };
        assert_eq!(command.to_string(), "cat");
    }
}
