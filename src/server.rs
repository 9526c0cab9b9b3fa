use crate::handlers::handle_request;
use crate::prelude::*;

const LISTENER: Token = Token(0);
// Readiness wait quantum; timeout sweeps run at least this often
const POLL_QUANTUM: Duration = Duration::from_secs(5);

/// One worker: one listening port, one poll, one connection table.
/// Single-threaded and cooperative; nothing here is shared.
pub struct Worker {
    config: ServerConfig,
    listener: TcpListener,
    poll: Poll,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    running: Arc<AtomicBool>,
}

impl Worker {
    pub fn new(config: ServerConfig, running: Arc<AtomicBool>) -> Result<Worker> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
        let mut listener = TcpListener::bind(addr)?;

        let poll = Poll::new()?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)?;

        info!("Server listening on {}:{}...", config.host, config.port);
        Ok(Worker {
            config,
            listener,
            poll,
            connections: HashMap::new(),
            next_token: 1,
            running,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut events = Events::with_capacity(MAX_CLIENTS);

        while self.running.load(Ordering::Acquire) {
            if let Err(e) = self.poll.poll(&mut events, Some(POLL_QUANTUM)) {
                if e.kind() == ErrorKind::Interrupted {
                    continue;
                }
                return Err(e.into());
            }

            for event in events.iter() {
                match event.token() {
                    LISTENER => self.accept_connections(),
                    token => self.handle_connection_event(token, event),
                }
            }

            self.check_timeouts();
        }

        info!("Server stopped: {}", self.config.server_name);
        Ok(())
    }

    fn accept_connections(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer_addr)) => {
                    if self.connections.len() >= MAX_CLIENTS {
                        warn!("Connection table full, refusing {}", peer_addr);
                        drop(stream);
                        continue;
                    }

                    let token = Token(self.next_token);
                    self.next_token += 1;

                    let mut conn = Connection::new(stream, peer_addr);
                    if let Err(e) =
                        self.poll
                            .registry()
                            .register(&mut conn.stream, token, Interest::READABLE)
                    {
                        warn!("Failed to register {}: {}", peer_addr, e);
                        continue;
                    }

                    info!(
                        "New connection from {} ({} active)",
                        peer_addr,
                        self.connections.len() + 1
                    );
                    self.connections.insert(token, conn);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    break;
                }
            }
        }
    }

    fn handle_connection_event(&mut self, token: Token, event: &Event) {
        let mut dispose = false;

        if let Some(conn) = self.connections.get_mut(&token) {
            if event.is_readable() && !conn.closed {
                let outcome = conn.read_data();

                if request_complete(&conn.recv_buffer) {
                    let response =
                        process_request(&conn.recv_buffer, conn.peer_addr, &self.config);
                    conn.recv_buffer.clear();
                    conn.write_buffer.extend_from_slice(&response);
                    conn.closed = true;
                    let _ = self.poll.registry().reregister(
                        &mut conn.stream,
                        token,
                        Interest::READABLE | Interest::WRITABLE,
                    );
                } else {
                    match outcome {
                        ReadOutcome::Ok => {
                            if buffer_over_capacity(&self.config, conn.recv_buffer.len()) {
                                let response = error_response(
                                    HTTP_PAYLOAD_TOO_LARGE,
                                    "HTTP/1.1",
                                    Some(&self.config),
                                )
                                .to_bytes();
                                conn.recv_buffer.clear();
                                conn.write_buffer.extend_from_slice(&response);
                                conn.closed = true;
                                let _ = self.poll.registry().reregister(
                                    &mut conn.stream,
                                    token,
                                    Interest::READABLE | Interest::WRITABLE,
                                );
                            }
                        }
                        ReadOutcome::ClosedByPeer => {
                            trace!("Peer {} closed the connection", conn.peer_addr);
                            dispose = true;
                        }
                        ReadOutcome::Error => dispose = true,
                    }
                }
            }

            if !dispose && event.is_writable() && !conn.write_buffer.is_empty() {
                dispose = conn.write_data();
            }

            if conn.should_close() {
                dispose = true;
            }
        }

        if dispose {
            self.remove_connection(token);
        }
    }

    /// Advisory sweep; a complete request handled before the deadline has
    /// already been answered by the time this runs.
    fn check_timeouts(&mut self) {
        if self.config.client_timeout == 0 {
            return;
        }
        let timeout = Duration::from_secs(self.config.client_timeout);
        let registry = self.poll.registry();

        self.connections.retain(|_, conn| {
            if conn.last_activity.elapsed() >= timeout {
                info!("Client timeout: {}", conn.peer_addr);
                let _ = registry.deregister(&mut conn.stream);
                return false;
            }
            true
        });
    }

    fn remove_connection(&mut self, token: Token) {
        if let Some(mut conn) = self.connections.remove(&token) {
            trace!(
                "Removing connection {} ({} active)",
                conn.peer_addr,
                self.connections.len()
            );
            let _ = self.poll.registry().deregister(&mut conn.stream);
        }
    }
}

/// parser -> router -> handler -> composer, one buffer in, one response out.
pub fn process_request(buffer: &[u8], peer_addr: SocketAddr, config: &ServerConfig) -> Vec<u8> {
    match HttpRequest::parse(buffer, &config.root) {
        Ok(request) => {
            info!("{} {} from {}", request.method, request.uri, peer_addr);
            let response = handle_request(&request, Some(peer_addr), config);
            info!("-> {} {}", response.status_code, response.reason);
            response.to_bytes()
        }
        Err(e) => {
            warn!("Bad request from {}: {}", peer_addr, e);
            error_response(HTTP_BAD_REQUEST, "HTTP/1.1", Some(config)).to_bytes()
        }
    }
}

fn buffer_over_capacity(config: &ServerConfig, len: usize) -> bool {
    config.client_max_body_size > 0 && len > config.client_max_body_size + HEADERS_MAX
}
