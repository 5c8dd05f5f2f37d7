use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
};
use tracing::{debug, instrument, warn};

/// Length of one game creation window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// How many more games a client may create in the current window. The
/// allowance goes back to its limit once the window has passed.
#[derive(Debug)]
pub struct CreationAllowance {
    remaining: u32,
    limit: u32,
    window_start: Instant,
}

impl CreationAllowance {
    fn new(limit: u32, now: Instant) -> Self {
        Self {
            remaining: limit,
            limit,
            window_start: now,
        }
    }

    fn roll_window(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) >= WINDOW {
            self.remaining = self.limit;
            self.window_start = now;
        }
    }

    fn try_take(&mut self, now: Instant) -> bool {
        self.roll_window(now);
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    /// True when nothing has been taken in the current window, which makes
    /// the entry equivalent to a fresh one.
    fn is_untouched(&mut self, now: Instant) -> bool {
        self.roll_window(now);
        self.remaining == self.limit
    }
}

pub type RateLimiter = Arc<DashMap<IpAddr, CreationAllowance>>;

pub fn create_rate_limiter() -> RateLimiter {
    Arc::new(DashMap::new())
}

/// Address of the caller, honouring reverse-proxy headers.
#[derive(Debug)]
pub struct ClientIp(pub IpAddr);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let header_ip = |name: &str| -> Option<IpAddr> {
            req.headers()
                .get_one(name)
                .and_then(|value| value.split(',').next())
                .and_then(|ip| ip.trim().parse().ok())
        };
        let ip = header_ip("X-Forwarded-For")
            .or_else(|| header_ip("X-Real-IP"))
            .or_else(|| req.client_ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        request::Outcome::Success(ClientIp(ip))
    }
}

/// Spends one game creation from the caller's allowance.
#[instrument(level = "trace", skip(rate_limiter))]
pub fn check_rate_limit(
    rate_limiter: &RateLimiter,
    ip: &IpAddr,
    games_per_minute: u32,
) -> Result<(), Status> {
    let now = Instant::now();
    let mut allowance = rate_limiter
        .entry(*ip)
        .or_insert_with(|| CreationAllowance::new(games_per_minute, now));

    if allowance.try_take(now) {
        debug!("{} may create {} more games", ip, allowance.remaining);
        Ok(())
    } else {
        warn!("Rate limit exceeded for {} - rejecting request", ip);
        Err(Status::TooManyRequests)
    }
}

/// Drops allowances nobody has drawn on this window. Returns how many went.
pub fn prune_rate_limiter(rate_limiter: &RateLimiter, now: Instant) -> usize {
    let before = rate_limiter.len();
    rate_limiter.retain(|_, allowance| !allowance.is_untouched(now));
    let pruned = before.saturating_sub(rate_limiter.len());
    if pruned > 0 {
        debug!("Pruned {} idle rate limit entries", pruned);
    }
    pruned
}
