use std::io::Write;
use std::time::Duration;

use cocktail_types::{CocktailError, CocktailResult};

/// Writes one pump frame per tick to a real serial device, 115200 8N1.
pub struct SerialPumpChannel {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialPumpChannel {
    pub fn open(path: &str) -> CocktailResult<Self> {
        let port = serialport::new(path, 115_200)
            .timeout(Duration::from_millis(50))
            .open()
            .map_err(|e| CocktailError::Transport(format!("failed to open serial port {path}: {e}")))?;
        Ok(Self { port })
    }

    pub fn send(&mut self, byte: u8) -> CocktailResult<()> {
        self.port.write_all(&[byte]).map_err(|e| CocktailError::Transport(format!("serial write failed: {e}")))
    }
}
