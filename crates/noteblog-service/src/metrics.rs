//! Lightweight Prometheus-compatible metrics using atomic counters.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Application-wide session and account counters.
pub struct Metrics {
    sessions_created_total: AtomicU64,
    sessions_ended_total: AtomicU64,
    sessions_evicted_total: AtomicU64,
    logins_total: AtomicU64,
    login_failures_total: AtomicU64,
    registrations_total: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            sessions_created_total: AtomicU64::new(0),
            sessions_ended_total: AtomicU64::new(0),
            sessions_evicted_total: AtomicU64::new(0),
            logins_total: AtomicU64::new(0),
            login_failures_total: AtomicU64::new(0),
            registrations_total: AtomicU64::new(0),
        }
    }

    pub fn record_session_created(&self) {
        self.sessions_created_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_ended(&self) {
        self.sessions_ended_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sessions_evicted(&self, count: usize) {
        self.sessions_evicted_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_login(&self) {
        self.logins_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_login_failure(&self) {
        self.login_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration(&self) {
        self.registrations_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sessions_created(&self) -> u64 {
        self.sessions_created_total.load(Ordering::Relaxed)
    }

    pub fn logins(&self) -> u64 {
        self.logins_total.load(Ordering::Relaxed)
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self, active_sessions: usize, uptime_secs: u64) -> String {
        let mut out = String::with_capacity(1024);

        gauge(
            &mut out,
            "noteblog_active_sessions",
            "Number of sessions currently held in memory.",
            active_sessions,
        );
        gauge(
            &mut out,
            "noteblog_uptime_seconds",
            "Server uptime in seconds.",
            uptime_secs,
        );

        let counters: [(&str, &str, &AtomicU64); 6] = [
            (
                "noteblog_sessions_created_total",
                "Sessions issued to visitors.",
                &self.sessions_created_total,
            ),
            (
                "noteblog_sessions_ended_total",
                "Sessions ended by logout.",
                &self.sessions_ended_total,
            ),
            (
                "noteblog_sessions_evicted_total",
                "Sessions removed after exceeding the idle timeout.",
                &self.sessions_evicted_total,
            ),
            (
                "noteblog_logins_total",
                "Successful logins.",
                &self.logins_total,
            ),
            (
                "noteblog_login_failures_total",
                "Rejected login attempts.",
                &self.login_failures_total,
            ),
            (
                "noteblog_registrations_total",
                "Accounts created through registration.",
                &self.registrations_total,
            ),
        ];
        for (name, help, value) in counters {
            counter(&mut out, name, help, value.load(Ordering::Relaxed));
        }

        out
    }
}

fn gauge(out: &mut String, name: &str, help: &str, value: impl std::fmt::Display) {
    writeln!(out, "# HELP {name} {help}").unwrap();
    writeln!(out, "# TYPE {name} gauge").unwrap();
    writeln!(out, "{name} {value}").unwrap();
}

fn counter(out: &mut String, name: &str, help: &str, value: u64) {
    writeln!(out, "# HELP {name} {help}").unwrap();
    writeln!(out, "# TYPE {name} counter").unwrap();
    writeln!(out, "{name} {value}").unwrap();
}
