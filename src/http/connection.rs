use crate::http::request::find_subsequence;
use crate::prelude::*;

#[derive(Debug, PartialEq)]
pub enum ReadOutcome {
    Ok,
    ClosedByPeer,
    Error,
}

/// One accepted socket. The worker owns it exclusively; after the single
/// response drains from `write_buffer` the connection is torn down.
#[derive(Debug)]
pub struct Connection {
    pub stream: TcpStream,
    pub peer_addr: SocketAddr,
    pub recv_buffer: Vec<u8>,
    pub write_buffer: Vec<u8>,
    pub last_activity: Instant,
    pub closed: bool,
}

impl Connection {
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self {
            stream,
            peer_addr,
            recv_buffer: Vec::with_capacity(READ_BUF_SIZE),
            write_buffer: Vec::new(),
            last_activity: Instant::now(),
            closed: false,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Drains the socket into `recv_buffer`, at most `MAX_EVENT_READ` bytes
    /// per readiness event so one peer cannot monopolize the loop.
    pub fn read_data(&mut self) -> ReadOutcome {
        let mut buf = [0u8; READ_BUF_SIZE];
        let mut read_this_event = 0;

        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => return ReadOutcome::ClosedByPeer,
                Ok(n) => {
                    self.recv_buffer.extend_from_slice(&buf[..n]);
                    self.touch();
                    read_this_event += n;
                    if read_this_event >= MAX_EVENT_READ {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return ReadOutcome::Error,
            }
        }
        ReadOutcome::Ok
    }

    /// Flushes what the socket will take. Returns true on a fatal error.
    pub fn write_data(&mut self) -> bool {
        while !self.write_buffer.is_empty() {
            match self.stream.write(&self.write_buffer) {
                Ok(0) => return true,
                Ok(n) => {
                    self.write_buffer.drain(..n);
                    self.touch();
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return false,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return true,
            }
        }
        false
    }

    pub fn should_close(&self) -> bool {
        self.closed && self.write_buffer.is_empty()
    }
}

/// The framing decision of the assembler: a request is complete once the
/// header terminator is present and, when a Content-Length header precedes
/// it, at least that many body bytes have arrived. Chunked requests are
/// never recognized here; they sit until the timeout sweep reaps them.
pub fn request_complete(buffer: &[u8]) -> bool {
    let Some(term) = find_subsequence(buffer, b"\r\n\r\n", 0) else {
        return false;
    };

    let declared = match content_length_in_head(&buffer[..term]) {
        Some(len) => len,
        None => return true,
    };

    buffer.len() - (term + 4) >= declared
}

fn content_length_in_head(head: &[u8]) -> Option<usize> {
    let head = String::from_utf8_lossy(head);
    for line in head.split("\r\n").skip(1) {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-length") {
                return Some(value.trim().parse::<usize>().unwrap_or(0));
            }
        }
    }
    None
}
