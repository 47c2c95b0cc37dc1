use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::admin::unblock_user;
use crate::handlers::message_guard::{guard_message, IncomingMessage};
use crate::services::spam::clock::Clock;

const UNBLOCK_COMMAND: &str = "/unblock";
const ACCESS_DENIED_REPLY: &str = "Sorry, you do not have access to this command.";

/// Parse one input line into a message.
///
/// Lines look like `<user_id>[:<username>] [text...]`. Everything after the
/// first whitespace is the message text; a line with only a user id is a
/// message without text.
pub fn parse_line(line: &str) -> Result<IncomingMessage, Error> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (sender, text) = match line.split_once(char::is_whitespace) {
        Some((sender, text)) => (sender, Some(text.to_string())),
        None => (line, None),
    };

    let (id, username) = match sender.split_once(':') {
        Some((id, name)) => (id, Some(name.to_string()).filter(|n| !n.is_empty())),
        None => (sender, None),
    };

    let user_id = id
        .parse::<u64>()
        .map_err(|_| Error::InvalidInput(format!("bad user id {:?}", id)))?;

    Ok(IncomingMessage {
        user_id,
        username,
        text,
    })
}

/// Guard a message, then hand it to the matching handler. Returns the reply.
pub fn dispatch<C: Clock>(data: &Data<C>, message: &IncomingMessage) -> String {
    if let Some(reason) = guard_message(data, message) {
        return reason;
    }

    let text = message.text().trim();
    let Some(args) = command_args(text, UNBLOCK_COMMAND) else {
        return "ok".to_string();
    };

    let target = match args.trim().parse::<u64>() {
        Ok(target) => target,
        Err(_) => return format!("usage: {} <user_id>", UNBLOCK_COMMAND),
    };

    match unblock_user(data, message.user_id, target) {
        Ok(()) => format!("User {} unblocked.", target),
        Err(Error::PermissionDenied(_)) => ACCESS_DENIED_REPLY.to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

/// Arguments after `command` when `text` invokes it, `None` otherwise
fn command_args<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(command)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

/// Read lines until end of input, writing one reply per message
pub async fn run<C, R, W>(data: Arc<Data<C>>, input: R, mut output: W) -> Result<(), Error>
where
    C: Clock,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0u64;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match parse_line(&line) {
            Ok(message) => {
                handled += 1;
                dispatch(&data, &message)
            }
            Err(e) => {
                debug!("Ignoring malformed line: {}", e);
                format!("usage: <user_id>[:<username>] [text] ({})", e)
            }
        };

        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }

    info!("Input closed after {} messages", handled);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::services::spam::clock::ManualClock;

    fn data() -> Data<ManualClock> {
        let settings = Settings::from_lookup(|key| match key {
            "RATE_LIMIT_MESSAGES_PER_MINUTE" => Some("3".to_string()),
            "RATE_LIMIT_MAX_SIMILAR_MESSAGES" => Some("2".to_string()),
            "RATE_LIMIT_BLOCK_MINUTES" => Some("1".to_string()),
            "ADMIN_IDS" => Some("1".to_string()),
            _ => None,
        })
        .unwrap();
        Data::with_clock(settings, ManualClock::new())
    }

    #[test]
    fn test_parse_line() {
        let message = parse_line("42:alice hello there").unwrap();
        assert_eq!(message.user_id, 42);
        assert_eq!(message.username.as_deref(), Some("alice"));
        assert_eq!(message.text.as_deref(), Some("hello there"));

        let message = parse_line("42").unwrap();
        assert_eq!(message.username, None);
        assert_eq!(message.text, None);

        let message = parse_line("42: ").unwrap();
        assert_eq!(message.username, None);
        assert_eq!(message.text.as_deref(), Some(""));

        assert!(matches!(parse_line("bob hi"), Err(Error::InvalidInput(_))));
        assert!(parse_line("-1 hi").is_err());
    }

    #[test]
    fn test_command_args() {
        assert_eq!(command_args("/unblock 5", UNBLOCK_COMMAND), Some(" 5"));
        assert_eq!(command_args("/unblock", UNBLOCK_COMMAND), Some(""));
        assert_eq!(command_args("/unblock5", UNBLOCK_COMMAND), None);
        assert_eq!(command_args("/unblockme", UNBLOCK_COMMAND), None);
        assert_eq!(command_args("hello", UNBLOCK_COMMAND), None);
    }

    #[test]
    fn test_glued_command_is_plain_text() {
        let data = data();
        assert_eq!(dispatch(&data, &IncomingMessage::new(1, "/unblock5")), "ok");
        assert_eq!(dispatch(&data, &IncomingMessage::new(1, "/unblockme")), "ok");
        assert_eq!(
            dispatch(&data, &IncomingMessage::new(1, "/unblock")),
            "usage: /unblock <user_id>"
        );
    }

    #[test]
    fn test_dispatch_unblock() {
        let data = data();

        assert_eq!(dispatch(&data, &IncomingMessage::new(5, "x")), "ok");
        assert_eq!(dispatch(&data, &IncomingMessage::new(5, "x")), "ok");
        assert!(dispatch(&data, &IncomingMessage::new(5, "x")).starts_with("Repeated-message"));

        assert_eq!(
            dispatch(&data, &IncomingMessage::new(6, "/unblock 5")),
            ACCESS_DENIED_REPLY
        );
        assert_eq!(
            dispatch(&data, &IncomingMessage::new(1, "/unblock five")),
            "usage: /unblock <user_id>"
        );
        assert_eq!(
            dispatch(&data, &IncomingMessage::new(1, "/unblock 5")),
            "User 5 unblocked."
        );
        assert_eq!(dispatch(&data, &IncomingMessage::new(5, "x")), "ok");
    }

    #[test]
    fn test_run_replies_per_line() {
        let data = Arc::new(data());
        let input = "42 a\n\n42 a\nnope\n42 a\n42 b\n".as_bytes();
        let mut output = Vec::new();

        tokio_test::block_on(run(data, input, &mut output)).unwrap();

        let output = String::from_utf8(output).unwrap();
        let replies: Vec<&str> = output.lines().collect();
        assert_eq!(replies.len(), 5);
        assert_eq!(replies[0], "ok");
        assert_eq!(replies[1], "ok");
        assert!(replies[2].starts_with("usage:"));
        assert_eq!(
            replies[3],
            "Repeated-message spam detected. Blocked for 1 minutes."
        );
        assert_eq!(replies[4], "You are temporarily blocked. 60 seconds left.");
    }
}
