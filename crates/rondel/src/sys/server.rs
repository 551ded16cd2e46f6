use crate::events::MenuEvent;
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

const SOCKET_PATH: &str = "/tmp/rondel.sock";

/// One control line, e.g. `next`, `prev`, `select 3`, `close`.
pub fn parse_control_line(line: &str) -> Option<MenuEvent> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "next" => Some(MenuEvent::Next),
        "prev" => Some(MenuEvent::Prev),
        "close" => Some(MenuEvent::CloseSubmenu),
        "select" => parts.next()?.parse().ok().map(MenuEvent::Select),
        "reload" => Some(MenuEvent::ConfigReload),
        _ => None,
    }
}

pub async fn run_server(tx: Sender<MenuEvent>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_control_line(line.trim()) {
                            Some(event) => {
                                let _ = tx.send(event).await;
                            }
                            None => log::debug!("Ignoring control line: {:?}", line),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_control_line() {
        assert!(matches!(parse_control_line("next"), Some(MenuEvent::Next)));
        assert!(matches!(parse_control_line("prev"), Some(MenuEvent::Prev)));
        assert!(matches!(
            parse_control_line("close"),
            Some(MenuEvent::CloseSubmenu)
        ));
        assert!(matches!(
            parse_control_line("select 3"),
            Some(MenuEvent::Select(3))
        ));
        assert!(matches!(
            parse_control_line("reload"),
            Some(MenuEvent::ConfigReload)
        ));

        assert!(parse_control_line("").is_none());
        assert!(parse_control_line("select").is_none());
        assert!(parse_control_line("select x").is_none());
        assert!(parse_control_line("open sesame").is_none());
    }
}
