//! Root shell
//!
//! Where a connection lands when no session is active: on connect to `/`,
//! and after a session hands control back with `quit`. The shell only picks
//! the next session; it never broadcasts.

/// Greeting listing the shell commands
pub const SHELL_HELP: &str = "Commands:\n  \
     room [name]  join the chat room\n  \
     chatbot      talk to the chatbot\n  \
     help         show this list\n  \
     exit         close the connection";

/// Where a connection should go next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Stay in the shell
    Shell,
    /// Join the chat room with a requested name (may be blank)
    Room { name: String },
    /// One-to-one chatbot session
    Chatbot,
}

impl Route {
    /// Pick the initial route from a WebSocket request path
    ///
    /// `/room` (optionally `?name=<name>`) and `/chatbot` enter a session
    /// directly; anything else starts in the shell.
    pub fn from_path(path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };

        match path.trim_end_matches('/').to_ascii_lowercase().as_str() {
            "/room" => Route::Room {
                name: query.and_then(name_param).unwrap_or_default(),
            },
            "/chatbot" => Route::Chatbot,
            _ => Route::Shell,
        }
    }
}

/// `name` from a query string, with `+` and `%20` read as spaces
fn name_param(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "name")
        .map(|(_, value)| value.replace('+', " ").replace("%20", " "))
}

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Switch to a session
    Enter(Route),
    Help,
    Exit,
    /// Nothing typed
    Empty,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "" => ShellCommand::Empty,
            "room" => ShellCommand::Enter(Route::Room {
                name: rest.to_string(),
            }),
            "chatbot" | "bot" => ShellCommand::Enter(Route::Chatbot),
            "help" | "?" => ShellCommand::Help,
            "exit" => ShellCommand::Exit,
            _ => ShellCommand::Unknown(input.to_string()),
        }
    }
}

/// Reply to an unknown shell command
pub fn unknown_command(input: &str) -> String {
    format!("Unknown command '{}'. Type \"help\" for a list of commands.", input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_from_path() {
        assert_eq!(Route::from_path("/"), Route::Shell);
        assert_eq!(Route::from_path("/anything"), Route::Shell);
        assert_eq!(Route::from_path("/chatbot"), Route::Chatbot);
        assert_eq!(Route::from_path("/Chatbot/"), Route::Chatbot);
        assert_eq!(
            Route::from_path("/room"),
            Route::Room {
                name: String::new()
            }
        );
        assert_eq!(
            Route::from_path("/room?lang=en&name=Mary+Jane"),
            Route::Room {
                name: "Mary Jane".to_string()
            }
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ShellCommand::parse("room Alice Smith"),
            ShellCommand::Enter(Route::Room {
                name: "Alice Smith".to_string()
            })
        );
        assert_eq!(
            ShellCommand::parse("ROOM"),
            ShellCommand::Enter(Route::Room {
                name: String::new()
            })
        );
        assert_eq!(ShellCommand::parse("Chatbot"), ShellCommand::Enter(Route::Chatbot));
        assert_eq!(ShellCommand::parse(" help "), ShellCommand::Help);
        assert_eq!(ShellCommand::parse("exit"), ShellCommand::Exit);
        assert_eq!(ShellCommand::parse("   "), ShellCommand::Empty);
        assert_eq!(
            ShellCommand::parse("dance"),
            ShellCommand::Unknown("dance".to_string())
        );
    }
}
