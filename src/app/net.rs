// src/app/net.rs
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, warn};

use crate::app::error::{AppError, Result};
use crate::app::tmdb::MovieSource;
use crate::app::types::{Movie, PosterSize, RemoteList};

/// Reachability check run before any remote call.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Opens (and immediately drops) a TCP connection to a well-known public
/// address.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    fn resolve(&self) -> Option<SocketAddr> {
        match self.addr.to_socket_addrs() {
            Ok(mut addrs) => addrs.next(),
            Err(e) => {
                warn!("probe address {} unusable: {e}", self.addr);
                None
            }
        }
    }
}

impl Connectivity for TcpProbe {
    fn is_online(&self) -> bool {
        let Some(addr) = self.resolve() else {
            return false;
        };
        match TcpStream::connect_timeout(&addr, self.timeout) {
            Ok(_) => true,
            Err(e) => {
                debug!("connectivity probe to {addr} failed: {e}");
                false
            }
        }
    }
}

/// A `MovieSource` that refuses to touch the network while offline.
pub struct Gated<C, S> {
    probe: C,
    inner: S,
}

impl<C: Connectivity, S: MovieSource> Gated<C, S> {
    pub fn new(probe: C, inner: S) -> Self {
        Self { probe, inner }
    }

    fn ensure_online(&self) -> Result<()> {
        if self.probe.is_online() {
            Ok(())
        } else {
            Err(AppError::NetworkUnavailable)
        }
    }
}

impl<C: Connectivity, S: MovieSource> MovieSource for Gated<C, S> {
    fn fetch_movies(&self, list: RemoteList) -> Result<Vec<Movie>> {
        self.ensure_online()?;
        self.inner.fetch_movies(list)
    }

    fn fetch_detail(&self, movie_id: i64) -> Result<Movie> {
        self.ensure_online()?;
        self.inner.fetch_detail(movie_id)
    }

    fn fetch_poster(&self, poster_path: &str, size: PosterSize) -> Result<Vec<u8>> {
        self.ensure_online()?;
        self.inner.fetch_poster(poster_path, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(bool);

    impl Connectivity for Fixed {
        fn is_online(&self) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl MovieSource for Counting {
        fn fetch_movies(&self, _list: RemoteList) -> Result<Vec<Movie>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        fn fetch_detail(&self, movie_id: i64) -> Result<Movie> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Movie {
                movie_id,
                ..Movie::default()
            })
        }
        fn fetch_poster(&self, _poster_path: &str, _size: PosterSize) -> Result<Vec<u8>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0xFF])
        }
    }

    #[test]
    fn offline_gate_blocks_every_call() {
        let gated = Gated::new(Fixed(false), Counting::default());
        assert!(matches!(
            gated.fetch_movies(RemoteList::Popular),
            Err(AppError::NetworkUnavailable)
        ));
        assert!(matches!(gated.fetch_detail(550), Err(AppError::NetworkUnavailable)));
        assert!(matches!(
            gated.fetch_poster("/p.jpg", PosterSize::W92),
            Err(AppError::NetworkUnavailable)
        ));
        assert_eq!(gated.inner.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn online_gate_passes_through() {
        let gated = Gated::new(Fixed(true), Counting::default());
        assert_eq!(gated.fetch_detail(550).unwrap().movie_id, 550);
        assert_eq!(gated.inner.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tcp_probe_reaches_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(TcpProbe::new(addr.to_string(), Duration::from_millis(500)).is_online());
        drop(listener);
        assert!(!TcpProbe::new("not an address", Duration::from_millis(50)).is_online());
    }
}
