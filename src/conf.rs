use std::{net::IpAddr, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Conf {
    pub log_level: tracing::Level,
    pub addr: IpAddr,
    pub port: u16,
    /// Directory static files are served from.
    pub root: PathBuf,
}

impl Default for Conf {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            addr: "0.0.0.0".parse().unwrap_or_else(|_| {
                unreachable!("Fat-fingered default IP address!")
            }),
            port: DEFAULT_PORT,
            root: PathBuf::from("."),
        }
    }
}

impl Conf {
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }
}

/// Picks the listening port from the raw command-line values.
///
/// The positional form wins when it parses. Otherwise `--port` is tried, and
/// anything unparsable falls back to [`DEFAULT_PORT`].
#[must_use]
pub fn resolve_port(positional: Option<&str>, flag: Option<&str>) -> u16 {
    let parse = |s: &str| s.trim().parse::<u16>().ok();
    positional
        .and_then(parse)
        .or_else(|| flag.and_then(parse))
        .unwrap_or(DEFAULT_PORT)
}

/// Resolves the port from the raw argument list (program name excluded):
/// the first argument as a port, else the value following `--port`.
#[must_use]
pub fn port_from_args<S: AsRef<str>>(args: &[S]) -> u16 {
    let positional = args.first().map(<S as AsRef<str>>::as_ref);
    let flag = args
        .iter()
        .position(|arg| arg.as_ref() == "--port")
        .and_then(|i| args.get(i + 1))
        .map(<S as AsRef<str>>::as_ref);
    resolve_port(positional, flag)
}

#[cfg(test)]
mod tests {
    use super::{port_from_args, resolve_port, Conf, DEFAULT_PORT};

    #[test]
    fn positional() {
        assert_eq!(resolve_port(Some("8081"), None), 8081);
    }

    #[test]
    fn flag() {
        assert_eq!(resolve_port(None, Some("8081")), 8081);
    }

    #[test]
    fn nothing_given() {
        assert_eq!(resolve_port(None, None), DEFAULT_PORT);
    }

    #[test]
    fn garbage_positional_falls_through_to_flag() {
        assert_eq!(resolve_port(Some("abc"), Some("9000")), 9000);
        assert_eq!(resolve_port(Some("abc"), None), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("abc"), Some("xyz")), DEFAULT_PORT);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(resolve_port(Some("70000"), None), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("-1"), None), DEFAULT_PORT);
    }

    #[test]
    fn positional_wins() {
        assert_eq!(resolve_port(Some("8081"), Some("9000")), 8081);
    }

    #[test]
    fn from_args() {
        let none: [&str; 0] = [];
        assert_eq!(port_from_args(&none), DEFAULT_PORT);
        assert_eq!(port_from_args(&["8081"]), 8081);
        assert_eq!(port_from_args(&["--port", "8081"]), 8081);
        assert_eq!(port_from_args(&["--port"]), DEFAULT_PORT);
        assert_eq!(port_from_args(&["-v", "--port", "7000"]), 7000);
    }

    #[test]
    fn defaults() {
        let conf = Conf::default();
        assert_eq!(conf.port, 8080);
        assert_eq!(conf.log_level, tracing::Level::INFO);
        assert!(conf.addr.is_unspecified());
        assert_eq!(Conf::with_port(1234).port, 1234);
    }
}
