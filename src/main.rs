use color_eyre::eyre::{Result, WrapErr, bail};
use streampeer::{StreamPeer, UnixPeerConfig, UnixStreamPeer};

use tracing::info;

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streampeer=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] == "-h" || args[1] == "--help" {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let env_config = UnixPeerConfig::from_env().wrap_err("Invalid environment configuration")?;
    let (config, messages) = parse_args(&args[1..], env_config)?;

    info!(socket_path = %config.socket_path.display(), "Connecting to Unix domain stream socket");
    let mut peer = UnixStreamPeer::connect(&config)
        .wrap_err_with(|| format!("Failed to open {}", config.socket_path.display()))?;

    for message in messages {
        peer.put_data(message.as_bytes())
            .wrap_err("Failed to send message")?;

        let mut reply = vec![0u8; message.len()];
        peer.get_data(&mut reply)
            .wrap_err("Failed to read reply")?;

        println!("{}", String::from_utf8_lossy(&reply));
        info!(sent = message.len(), pending = peer.get_available_bytes(), "Round trip complete");
    }

    peer.close();
    Ok(())
}

/// Splits `args` (without the program name) into the peer configuration and the messages to send
///
/// `-s`/`--socket <path>` overrides the socket path from `config`.
fn parse_args(args: &[String], mut config: UnixPeerConfig) -> Result<(UnixPeerConfig, &[String])> {
    let mut messages = args;
    if let Some(flag) = args.first() {
        if flag == "-s" || flag == "--socket" {
            let Some(path) = args.get(1) else {
                bail!("{flag} requires a socket path");
            };
            config = config.with_socket_path(path.into());
            messages = &args[2..];
        }
    }

    if messages.is_empty() {
        bail!("No messages given");
    }

    // Replies are read with get_data, which needs a blocking socket
    if !config.blocking {
        bail!("Non-blocking mode is not supported by this tool, unset STREAMPEER_BLOCKING or set it to true");
    }

    Ok((config, messages))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [-s|--socket <socket_path>] <message>...");
    eprintln!("  socket_path: Unix domain socket to connect to (default: $STREAMPEER_SOCKET or /tmp/streampeer.sock)");
    eprintln!("  message:     Sent to the peer; the same number of bytes is read back and printed");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} --socket /tmp/echo.sock hello world   # Two round trips against an echo server");
    eprintln!("  STREAMPEER_SOCKET=/tmp/echo.sock {program} ping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_socket_flag_sets_path() {
        let args = args(&["--socket", "/tmp/not_created_yet.sock", "hello", "world"]);
        let (config, messages) = parse_args(&args, UnixPeerConfig::default()).unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/not_created_yet.sock"));
        assert_eq!(messages, &args[2..]);
    }

    #[test]
    fn test_short_socket_flag() {
        let args = args(&["-s", "/run/echo.sock", "ping"]);
        let (config, messages) = parse_args(&args, UnixPeerConfig::default()).unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/run/echo.sock"));
        assert_eq!(messages, &args[2..]);
    }

    #[test]
    fn test_positional_path_is_a_message() {
        // Without the flag a path-like argument is just data
        let args = args(&["/tmp/typo.sock", "hello"]);
        let (config, messages) = parse_args(&args, UnixPeerConfig::default()).unwrap();
        assert_eq!(config.socket_path, UnixPeerConfig::default().socket_path);
        assert_eq!(messages, &args[..]);
    }

    #[test]
    fn test_socket_flag_without_value() {
        assert!(parse_args(&args(&["--socket"]), UnixPeerConfig::default()).is_err());
    }

    #[test]
    fn test_no_messages() {
        assert!(parse_args(&args(&["-s", "/tmp/a.sock"]), UnixPeerConfig::default()).is_err());
    }

    #[test]
    fn test_nonblocking_environment_rejected() {
        let config = UnixPeerConfig::default().with_blocking(false);
        let err = parse_args(&args(&["hello"]), config).unwrap_err();
        assert!(err.to_string().contains("Non-blocking"));
    }
}
