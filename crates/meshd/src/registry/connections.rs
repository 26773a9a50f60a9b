//! Control-channel connection table.

/// In-flight attempt to reach a `ConnectTo` peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRecord {
    peer: String,
    attempts: u32,
}

impl OutgoingRecord {
    /// Starts tracking an attempt towards `peer`.
    #[must_use]
    pub fn new(peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            attempts: 1,
        }
    }

    /// Peer being connected to.
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Attempts made so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// A control-channel session with a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    name: String,
    outgoing: Option<OutgoingRecord>,
    active: bool,
}

impl Connection {
    /// Connection accepted from, or pending to, `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outgoing: None,
            active: true,
        }
    }

    /// Connection created by an outgoing attempt.
    #[must_use]
    pub fn outgoing(record: OutgoingRecord) -> Self {
        let mut connection = Self::new(record.peer());
        connection.outgoing = Some(record);
        connection
    }

    /// Peer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outgoing record, if the connection was initiated locally.
    #[must_use]
    pub fn outgoing_record(&self) -> Option<&OutgoingRecord> {
        self.outgoing.as_ref()
    }

    /// Whether the connection has not been terminated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the connection closed and frees its outgoing record. Returns
    /// whether a record was freed.
    pub fn terminate(&mut self) -> bool {
        self.active = false;
        self.outgoing.take().is_some()
    }
}

/// Counts from [`ConnectionRegistry::terminate_all`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Terminated {
    /// Connections closed.
    pub connections: usize,
    /// Outgoing records freed.
    pub outgoing: usize,
}

/// Every open control-channel connection.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Vec<Connection>,
}

impl ConnectionRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `connection`.
    pub fn insert(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Open connections.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Number of connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Terminates and removes every connection.
    pub fn terminate_all(&mut self) -> Terminated {
        let mut terminated = Terminated::default();
        for mut connection in self.connections.drain(..) {
            terminated.connections += 1;
            if connection.terminate() {
                terminated.outgoing += 1;
            }
        }
        terminated
    }
}
