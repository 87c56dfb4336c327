use std::io::Write;

use crate::Byte;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    /// Emitted by `PRN`.
    Decimal(Byte),
    /// Emitted by `PRA`.
    Character(Byte),
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Decimal(value) => writeln!(f, "{value}"),
            Output::Character(value) => write!(f, "{}", *value as char),
        }
    }
}

pub struct Console {
    print_callback: Box<dyn FnMut(Output) + Send>,
}

impl Console {
    pub fn new(print_callback: impl FnMut(Output) + Send + 'static) -> Self {
        Self {
            print_callback: Box::new(print_callback),
        }
    }

    pub fn stdout() -> Self {
        Self::new(|output| {
            let mut stdout = std::io::stdout().lock();
            // a closed stdout must not stop the machine
            let _ = write!(stdout, "{output}");
            let _ = stdout.flush();
        })
    }

    pub fn print(&mut self, output: Output) {
        (self.print_callback)(output)
    }
}
