use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::config::Bounds;

/// Parse `"a..b"`, `"a.."`, `"..b"` or `".."` into `Bounds`
pub fn parse_bounds<T: std::str::FromStr>(s: &str) -> Result<Bounds<T>, String>
where
    <T as std::str::FromStr>::Err: std::fmt::Display,
{
    let Some((lo, hi)) = s.split_once("..") else {
        return Err(format!("Could not find '..' when parsing range `{s}`"))
    };
    let parse = |x: &str| -> Result<Option<T>, String> {
        let x = x.trim();
        if x.is_empty() { Ok(None) }
        else            { x.parse().map(Some).map_err(|e| format!("`{x}`: {e}")) }
    };
    Ok(Bounds { min: parse(lo)?, max: parse(hi)? })
}

/// Group numeric digits to facilitate reading long numbers
pub fn group_digits<F: std::fmt::Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}

pub mod timing {

    use super::group_digits;
    use std::time::Instant;
    use std::io::Write;

    pub struct Progress {
        previous: Instant,
    }

    impl Progress {

        #[allow(clippy::new_without_default)]
        pub fn new() -> Self { Self { previous: Instant::now() } }

        /// Print message, append ellipsis, flush stdout, stay on same line, start timer.
        pub fn start(&mut self, message: &str) {
            print!("{message} ... ");
            // A failed flush only delays the message
            let _ = std::io::stdout().flush();
            self.start_timer();
        }

        // Print time elapsed since last start or done
        pub fn done(&mut self) {
            println!("{} ms", group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        // Print message followed by time elapsed since last start or done
        pub fn done_with_message(&mut self, message: &str) {
            println!("{message}: {} ms",
                     group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}

#[derive(Debug, Default, Clone)]
struct Timer {
    running: Option<Instant>,
    total  : Duration,
    calls  : u32,
}

/// Named cumulative timers.
///
/// Starting a running timer, or stopping one that is not running, is ignored.
#[derive(Debug, Default, Clone)]
pub struct Profiler {
    timers: HashMap<String, Timer>,
}

impl Profiler {

    pub fn new() -> Self { Self::default() }

    pub fn start(&mut self, name: &str) {
        let timer = self.timers.entry(name.to_string()).or_default();
        if timer.running.is_none() { timer.running = Some(Instant::now()) }
    }

    pub fn stop(&mut self, name: &str) {
        if let Some(timer) = self.timers.get_mut(name) {
            if let Some(started) = timer.running.take() {
                timer.total += started.elapsed();
                timer.calls += 1;
            }
        }
    }

    /// Time `f` under `name`
    pub fn time<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        self.start(name);
        let result = f();
        self.stop(name);
        result
    }

    /// Add time measured elsewhere, such as on another thread
    pub fn record(&mut self, name: &str, elapsed: Duration, calls: u32) {
        let timer = self.timers.entry(name.to_string()).or_default();
        timer.total += elapsed;
        timer.calls += calls;
    }

    /// Total time and number of completed calls
    pub fn get(&self, name: &str) -> Option<(Duration, u32)> {
        self.timers.get(name).map(|t| (t.total, t.calls))
    }

    pub fn reset(&mut self) { self.timers.clear() }

    /// Table of all timers, longest first
    pub fn report(&self) -> String {
        let total: Duration = self.timers.values().map(|t| t.total).sum();
        let mut timers: Vec<_> = self.timers.iter().collect();
        timers.sort_by(|(na, a), (nb, b)| b.total.cmp(&a.total).then_with(|| na.cmp(nb)));

        let rule = "-".repeat(86);
        let mut out = String::new();
        let _ = writeln!(out, "{:<35}{:>12}{:>12}{:>15}{:>12}", "Operation", "Time (s)", "Calls", "Avg (ms)", "Percent");
        let _ = writeln!(out, "{rule}");
        for (name, timer) in timers {
            let seconds = timer.total.as_secs_f64();
            let average = if timer.calls > 0 { 1000.0 * seconds / timer.calls as f64 } else { 0.0 };
            let percent = if total > Duration::ZERO { 100.0 * seconds / total.as_secs_f64() } else { 0.0 };
            let _ = writeln!(out, "{name:<35}{seconds:>12.3}{:>12}{average:>15.3}{percent:>11.3}%", group_digits(timer.calls));
        }
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:<35}{:>12.3}", "TOTAL", total.as_secs_f64());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("2..5", Bounds { min: Some(2), max: Some(5) })]
    #[case("2.." , Bounds { min: Some(2), max: None    })]
    #[case("..5" , Bounds { min: None   , max: Some(5) })]
    #[case(".."  , Bounds { min: None   , max: None    })]
    fn bounds_parse(#[case] input: &str, #[case] expected: Bounds<u32>) {
        assert_eq!(parse_bounds::<u32>(input), Ok(expected));
    }

    #[test]
    fn bounds_parse_errors() {
        assert!(parse_bounds::<u32>("25").is_err());
        assert!(parse_bounds::<u32>("a..5").is_err());
    }

    #[test]
    fn digits_are_grouped() {
        assert_eq!(group_digits(1234567), "1,234,567");
        assert_eq!(group_digits(12), "12");
    }

    #[test]
    fn profiler_counts_calls() {
        let mut p = Profiler::new();
        for _ in 0..3 { p.time("event", || ()) }
        p.stop("never started");
        assert_eq!(p.get("event").map(|(_, calls)| calls), Some(3));
        assert_eq!(p.get("never started"), None);
    }

    #[test]
    fn profiler_ignores_restart_while_running() {
        let mut p = Profiler::new();
        p.start("a");
        p.start("a");
        p.stop("a");
        p.stop("a");
        assert_eq!(p.get("a").map(|(_, calls)| calls), Some(1));
    }

    #[test]
    fn profiler_report_longest_first() {
        let mut p = Profiler::new();
        p.record("short", Duration::from_millis( 10), 1);
        p.record("long" , Duration::from_millis(300), 2);
        let report = p.report();
        let long  = report.find("long" ).unwrap();
        let short = report.find("short").unwrap();
        assert!(long < short);
        assert!(report.contains("TOTAL"));
        assert!(report.contains("150.000")); // average of `long`, ms
        p.reset();
        assert_eq!(p.get("long"), None);
    }
}
