use crate::config::WalkerConfig;
use crate::dns::DNSPacket;
use crate::dns::enums::{DNSResourceType, ResponseCode};
use crate::dns::resource::DNSResource;
use crate::error::{Result, WalkError};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

static QUERY_ID_COUNTER: AtomicU16 = AtomicU16::new(1);

/// Seam between the traversal engines and the network
///
/// `query` returns the full response packet (the walkers dig through the
/// authority section); `resolve` returns answer records only. Both retry
/// internally up to the configured bound.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn query(&self, name: &str, rtype: DNSResourceType) -> Result<DNSPacket>;
    async fn resolve(&self, name: &str, rtype: DNSResourceType) -> Result<Vec<DNSResource>>;
}

/// Pool of connected UDP sockets, one stack per upstream server
#[derive(Debug)]
struct ConnectionPool {
    udp_sockets: Arc<Mutex<HashMap<SocketAddr, Vec<UdpSocket>>>>,
    max_sockets_per_server: usize,
}

impl ConnectionPool {
    fn new(max_sockets_per_server: usize) -> Self {
        Self {
            udp_sockets: Arc::new(Mutex::new(HashMap::new())),
            max_sockets_per_server,
        }
    }

    async fn get_udp_socket(&self, server_addr: SocketAddr) -> Result<UdpSocket> {
        let mut pool = self.udp_sockets.lock().await;

        if let Some(sockets) = pool.get_mut(&server_addr) {
            if let Some(socket) = sockets.pop() {
                trace!("Reusing pooled UDP socket for {}", server_addr);
                return Ok(socket);
            }
        }
        drop(pool);

        debug!("Creating new UDP socket for {}", server_addr);
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;
        socket
            .connect(server_addr)
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;

        Ok(socket)
    }

    async fn return_udp_socket(&self, server_addr: SocketAddr, socket: UdpSocket) {
        let mut pool = self.udp_sockets.lock().await;
        let sockets = pool.entry(server_addr).or_insert_with(Vec::new);
        if sockets.len() < self.max_sockets_per_server {
            sockets.push(socket);
        }
    }
}

/// DNSSEC-aware query client: UDP first, TCP on truncation, bounded
/// timeout per attempt, nameserver picked at random per query
#[derive(Debug)]
pub struct QueryClient {
    nameservers: Vec<SocketAddr>,
    query_timeout: Duration,
    max_retries: u8,
    connection_pool: ConnectionPool,
}

impl QueryClient {
    pub fn new(nameservers: Vec<SocketAddr>, config: &WalkerConfig) -> Self {
        let nameservers = if nameservers.is_empty() {
            WalkerConfig::default().nameservers
        } else {
            nameservers
        };
        debug!("Query client using nameservers: {:?}", nameservers);

        Self {
            nameservers,
            query_timeout: config.query_timeout,
            max_retries: config.max_retries.max(1),
            connection_pool: ConnectionPool::new(4),
        }
    }

    pub fn from_config(config: &WalkerConfig) -> Self {
        Self::new(config.nameservers.clone(), config)
    }

    pub fn nameservers(&self) -> &[SocketAddr] {
        &self.nameservers
    }

    fn pick_server(&self) -> SocketAddr {
        let mut rng = rand::rng();
        match self.nameservers.choose(&mut rng) {
            Some(addr) => *addr,
            // Constructor guarantees a non-empty list
            None => "1.1.1.1:53".parse().expect("Cloudflare DNS is valid"),
        }
    }

    /// One query attempt against one randomly chosen nameserver
    async fn query_once(&self, name: &str, rtype: DNSResourceType) -> Result<DNSPacket> {
        let id = QUERY_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let query = DNSPacket::query(id, name, rtype);
        let query_bytes = query
            .serialize()
            .map_err(|e| WalkError::Parse(format!("Failed to serialize query: {}", e)))?;

        let server = self.pick_server();
        trace!("Sending {} bytes to {} for {}", query_bytes.len(), server, name);

        let query_future = async {
            let response = self.send_udp_query(&query_bytes, server).await?;
            if response.header.tc {
                debug!("UDP response truncated, retrying {} over TCP", name);
                self.send_tcp_query(&query_bytes, server).await
            } else {
                Ok(response)
            }
        };

        timeout(self.query_timeout, query_future)
            .await
            .map_err(|_| WalkError::Timeout)?
    }

    async fn send_udp_query(&self, query_bytes: &[u8], server: SocketAddr) -> Result<DNSPacket> {
        let socket = self.connection_pool.get_udp_socket(server).await?;

        socket
            .send(query_bytes)
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;

        let mut response_buf = vec![0u8; 4096];
        let response_len = socket
            .recv(&mut response_buf)
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;

        self.connection_pool.return_udp_socket(server, socket).await;

        DNSPacket::parse(&response_buf[..response_len]).map_err(|e| {
            debug!("Failed to parse UDP response from {}: {}", server, e);
            WalkError::Parse(format!("Failed to parse response: {}", e))
        })
    }

    async fn send_tcp_query(&self, query_bytes: &[u8], server: SocketAddr) -> Result<DNSPacket> {
        let mut stream = TcpStream::connect(server)
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;

        let query_length = query_bytes.len() as u16;
        stream
            .write_all(&query_length.to_be_bytes())
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;
        stream
            .write_all(query_bytes)
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;
        stream.flush().await.map_err(|e| WalkError::Io(e.to_string()))?;

        let mut length_buf = [0u8; 2];
        stream
            .read_exact(&mut length_buf)
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;
        let response_length = u16::from_be_bytes(length_buf) as usize;

        let mut response_buf = vec![0; response_length];
        stream
            .read_exact(&mut response_buf)
            .await
            .map_err(|e| WalkError::Io(e.to_string()))?;

        DNSPacket::parse(&response_buf).map_err(|e| {
            debug!("Failed to parse TCP response from {}: {}", server, e);
            WalkError::Parse(format!("Failed to parse response: {}", e))
        })
    }

    /// Discover the zone's own authoritative nameservers: its NS set,
    /// then an address per server. Queries from then on go to the source.
    pub async fn discover_nameservers(&self, zone: &str) -> Result<Vec<SocketAddr>> {
        let ns_records = self.resolve(zone, DNSResourceType::NS).await?;

        let mut addrs = Vec::new();
        for ns in &ns_records {
            let Some(ns_name) = &ns.parsed_rdata else {
                continue;
            };
            let ns_name = ns_name.trim_end_matches('.');
            match self.resolve(ns_name, DNSResourceType::A).await {
                Ok(answers) => {
                    if let Some(addr) = answers
                        .iter()
                        .filter_map(|rr| rr.parsed_rdata.as_ref())
                        .filter_map(|ip| ip.parse::<std::net::Ipv4Addr>().ok())
                        .next()
                    {
                        addrs.push(SocketAddr::new(addr.into(), 53));
                    }
                }
                Err(e) => warn!("Failed to resolve nameserver {}: {}", ns_name, e),
            }
        }

        if addrs.is_empty() {
            return Err(WalkError::NoAnswer {
                name: zone.to_string(),
                rtype: DNSResourceType::NS.mnemonic(),
            });
        }
        Ok(addrs)
    }
}

#[async_trait]
impl QueryService for QueryClient {
    /// Query with the bounded retry loop; timeouts and transport errors
    /// are retried, the last error surfaces once attempts run out
    async fn query(&self, name: &str, rtype: DNSResourceType) -> Result<DNSPacket> {
        let mut last_error = WalkError::Timeout;
        for attempt in 0..self.max_retries {
            match self.query_once(name, rtype).await {
                Ok(response) => {
                    if attempt > 0 {
                        debug!("Query for {} succeeded on attempt {}", name, attempt + 1);
                    }
                    return Ok(response);
                }
                Err(e) => {
                    debug!("Query attempt {} for {} failed: {}", attempt + 1, name, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Fetch answer records of one type, distinguishing NXDOMAIN and
    /// empty answers so callers can swallow legitimately absent types
    async fn resolve(&self, name: &str, rtype: DNSResourceType) -> Result<Vec<DNSResource>> {
        let response = self.query(name, rtype).await?;

        if ResponseCode::from_u8(response.header.rcode) == ResponseCode::NameError {
            return Err(WalkError::NxDomain(name.to_string()));
        }

        let answers: Vec<DNSResource> = response
            .answers
            .into_iter()
            .filter(|rr| rr.rtype == rtype || rr.rtype == DNSResourceType::CNAME)
            .collect();

        if answers.is_empty() {
            return Err(WalkError::NoAnswer {
                name: name.to_string(),
                rtype: rtype.mnemonic(),
            });
        }
        Ok(answers)
    }
}
