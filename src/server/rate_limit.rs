use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

use crate::config::RateLimitSettings;

/// Fixed-window request counter per client IP. This is the only lock
/// in the repository; the query core itself is stateless.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    state: Mutex<LimiterState>,
}

struct LimiterState {
    hits: HashMap<IpAddr, WindowCount>,
    last_sweep: Instant,
}

struct WindowCount {
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            window: Duration::from_secs(settings.window_secs),
            max_requests: settings.max_requests,
            state: Mutex::new(LimiterState {
                hits: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap();

        // At most one sweep per window, so idle clients are released
        // instead of staying resident forever.
        if now.duration_since(state.last_sweep) >= self.window {
            let window = self.window;
            state.hits.retain(|_, w| now.duration_since(w.window_start) < window);
            state.last_sweep = now;
        }

        let entry = state.hits.entry(client).or_insert(WindowCount {
            window_start: now,
            count: 0,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.window_start = now;
            entry.count = 0;
        }

        entry.count += 1;
        entry.count <= self.max_requests
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.state.lock().unwrap().hits.len()
    }
}

/// Fails with 429 once the caller exhausts its window; the message
/// comes from the status catcher.
pub struct RateLimitGuard;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RateLimitGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let limiter = match req.rocket().state::<RateLimiter>() {
            Some(limiter) => limiter,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        // Requests without a resolvable peer address share one bucket.
        let client = req
            .client_ip()
            .unwrap_or(IpAddr::from([0, 0, 0, 0]));

        if limiter.check(client) {
            Outcome::Success(RateLimitGuard)
        } else {
            Outcome::Error((Status::TooManyRequests, ()))
        }
    }
}
