use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

use cocktail_types::{CocktailError, CocktailResult};

use crate::robot::RobotTransport;

/// Drives the robot controller's ASCII line protocol over a real TCP
/// connection. Host-side lines are terminated `\r\n`; the controller
/// terminates its replies with a bare `\r`.
pub struct TcpRobotTransport {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl TcpRobotTransport {
    pub fn connect(address: &str, timeout: Duration) -> CocktailResult<Self> {
        let stream = TcpStream::connect(address).map_err(|e| CocktailError::Transport(format!("connect {address}: {e}")))?;
        stream.set_read_timeout(Some(timeout)).map_err(|e| CocktailError::Transport(e.to_string()))?;
        let reader = BufReader::new(stream.try_clone().map_err(|e| CocktailError::Transport(e.to_string()))?);
        Ok(Self { stream, reader })
    }
}

impl RobotTransport for TcpRobotTransport {
    fn exchange(&mut self, line: &str) -> CocktailResult<Option<String>> {
        if self.stream.write_all(line.as_bytes()).is_err() {
            return Ok(None);
        }

        let mut reply = String::new();
        match self.reader.read_line(&mut reply) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(reply.trim_end_matches(['\r', '\n']).to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(CocktailError::Transport(e.to_string())),
        }
    }
}
