use std::{
    cell::RefCell,
    fmt,
    io::{self, Write},
    rc::Rc,
};

/// Where the report lines are printed, shared by the receive callbacks and
/// the stats reporter.
#[derive(Clone)]
pub struct Console(Rc<RefCell<dyn Write>>);

/// An in-memory [`Console`], to read back what was printed.
#[derive(Clone, Default)]
pub struct Captured(Rc<RefCell<Vec<u8>>>);

impl Console {
    pub fn stdout() -> Self {
        Self(Rc::new(RefCell::new(io::stdout())))
    }

    /// A console writing to memory.
    pub fn captured() -> (Self, Captured) {
        let captured = Captured::default();
        let writer: Rc<RefCell<dyn Write>> = captured.0.clone();
        (Self(writer), captured)
    }

    /// Print one line.
    pub fn line(&self, args: fmt::Arguments<'_>) -> io::Result<()> {
        let mut writer = self.0.borrow_mut();
        writer.write_fmt(args)?;
        writer.write_all(b"\n")
    }

    pub fn flush(&self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

impl Captured {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.borrow())
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Console").finish_non_exhaustive()
    }
}

impl fmt::Debug for Captured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Captured")
            .field(&self.0.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_lines() {
        let (console, captured) = Console::captured();
        console.line(format_args!("Time [{}]", 1)).unwrap();
        console.line(format_args!("second")).unwrap();

        assert_eq!(captured.lines(), ["Time [1]", "second"]);
    }
}
