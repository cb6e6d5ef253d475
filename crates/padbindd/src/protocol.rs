//! Line protocol spoken on the session socket.
//!
//! Every message is one UTF-8 line. Requests start with a keyword followed
//! by `:` (arguments follow) or `.` (no arguments).

use std::borrow::Cow;
use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use padbind_engine::MenuRequest;

pub const DAEMON_NAME: &str = "SCCDaemon";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const OK: &str = "OK.";
pub const READY: &str = "Ready.";
pub const RECONFIGURED: &str = "Reconfigured.";
pub const UNKNOWN_COMMAND: &str = "Fail: Unknown command";
pub const NO_OSD_DAEMON: &str = "Cannot show OSD; there is no scc-osd-daemon registered";

/// Helper that registered itself on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Osd,
    Autoswitch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request<'a> {
    /// Load and activate the profile at the given path.
    Profile(&'a str),
    Lock(Vec<&'a str>),
    Observe(Vec<&'a str>),
    Unlock,
    /// A menu item was picked in the OSD. `None` when the arguments do not
    /// name exactly one menu and one item.
    Selected(Option<(String, String)>),
    Reconfigure,
    Register(Role),
    Osd(&'a str),
}

/// Parse one request line. `None` for anything unrecognized.
pub fn parse_request(line: &str) -> Option<Request<'_>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.starts_with("Unlock.") {
        return Some(Request::Unlock);
    }
    if line.starts_with("Reconfigure.") {
        return Some(Request::Reconfigure);
    }

    let (keyword, rest) = line.split_once(':')?;
    let rest = rest.trim_matches([' ', '\t']);
    let request = match keyword {
        "Profile" => Request::Profile(rest),
        "Lock" => Request::Lock(rest.split_whitespace().collect()),
        "Observe" => Request::Observe(rest.split_whitespace().collect()),
        "Selected" => Request::Selected(split_args(rest).and_then(|args| {
            let [menu, item]: [String; 2] = args.try_into().ok()?;
            Some((menu, item))
        })),
        "Register" => match rest {
            "osd" => Request::Register(Role::Osd),
            "autoswitch" => Request::Register(Role::Autoswitch),
            _ => return None,
        },
        "OSD" => Request::Osd(rest),
        _ => return None,
    };
    Some(request)
}

/// Lines sent to a fresh session before anything else.
pub fn greeting(profile: &Path, error: Option<&str>) -> [String; 5] {
    [
        DAEMON_NAME.to_string(),
        format!("Version: {VERSION}"),
        format!("PID: {}", std::process::id()),
        format!("Current profile: {}", profile.display()),
        status_line(error),
    ]
}

/// `Ready.` or `Error: <reason>`.
pub fn status_line(error: Option<&str>) -> String {
    match error {
        None => READY.to_string(),
        Some(reason) => format!("Error: {reason}"),
    }
}

pub fn fail(reason: impl Display) -> String {
    format!("Fail: {reason}")
}

/// Arguments for a text message.
pub fn osd_message(text: &str, timeout: Option<Duration>) -> Vec<String> {
    let mut args = vec!["message".to_string()];
    if let Some(timeout) = timeout {
        args.push("-t".to_string());
        args.push(timeout.as_secs_f64().to_string());
    }
    args.push(text.to_string());
    args
}

/// Where the OSD helper reads a menu from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSource<'a> {
    /// A menu of the profile file at this path.
    Profile(&'a Path),
    /// A stand-alone menu file.
    File(&'a Path),
}

/// Arguments for showing a menu.
pub fn osd_menu(request: &MenuRequest, source: MenuSource<'_>) -> Vec<String> {
    let mut args = vec![
        request.kind.command().to_string(),
        "--confirm-with".to_string(),
        request.confirm_with.clone(),
        "--cancel-with".to_string(),
        request.cancel_with.clone(),
        "--control-with".to_string(),
        request.control_with.to_string(),
        "-x".to_string(),
        request.position.0.to_string(),
        "-y".to_string(),
        request.position.1.to_string(),
    ];
    if request.use_cursor {
        args.push("--use-cursor".to_string());
    }
    match source {
        MenuSource::Profile(profile) => {
            args.push("--from-profile".to_string());
            args.push(profile.display().to_string());
            args.push(request.menu.clone());
        }
        MenuSource::File(path) => {
            args.push("--from-file".to_string());
            args.push(path.display().to_string());
        }
    }
    args
}

/// `OSD: <args>` with every argument shell-quoted.
pub fn osd_line<S: AsRef<str>>(args: &[S]) -> String {
    let joined: Vec<Cow<'_, str>> = args.iter().map(|arg| quote(arg.as_ref())).collect();
    format!("OSD: {}", joined.join(" "))
}

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c)
}

/// Quote `arg` for a POSIX shell when it needs it.
pub fn quote(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && arg.chars().all(is_plain) {
        return Cow::Borrowed(arg);
    }
    Cow::Owned(format!("'{}'", arg.replace('\'', r#"'"'"'"#)))
}

/// Split a shell-quoted argument list. `None` on an unterminated quote.
pub fn split_args(input: &str) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_arg = true;
                loop {
                    match chars.next()? {
                        '\'' => break,
                        c => current.push(c),
                    }
                }
            }
            '"' => {
                in_arg = true;
                loop {
                    match chars.next()? {
                        '"' => break,
                        '\\' => match chars.next()? {
                            c @ ('"' | '\\' | '$' | '`') => current.push(c),
                            c => {
                                current.push('\\');
                                current.push(c);
                            }
                        },
                        c => current.push(c),
                    }
                }
            }
            '\\' => {
                in_arg = true;
                current.push(chars.next()?);
            }
            c if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                in_arg = true;
                current.push(c);
            }
        }
    }
    if in_arg {
        args.push(current);
    }
    Some(args)
}

#[cfg(test)]
mod tests {
    use padbind_engine::{MenuKind, Source};

    use super::*;

    #[test]
    fn parses_every_request() {
        assert_eq!(
            parse_request("Profile:  /tmp/a b.yaml"),
            Some(Request::Profile("/tmp/a b.yaml"))
        );
        assert_eq!(
            parse_request("Lock: A  LEFT B"),
            Some(Request::Lock(vec!["A", "LEFT", "B"]))
        );
        assert_eq!(parse_request("Observe: STICK"), Some(Request::Observe(vec!["STICK"])));
        assert_eq!(parse_request("Unlock."), Some(Request::Unlock));
        assert_eq!(parse_request("Reconfigure."), Some(Request::Reconfigure));
        assert_eq!(parse_request("Register: osd"), Some(Request::Register(Role::Osd)));
        assert_eq!(
            parse_request("Register: autoswitch"),
            Some(Request::Register(Role::Autoswitch))
        );
        assert_eq!(parse_request("OSD: hello there"), Some(Request::Osd("hello there")));
    }

    #[test]
    fn unknown_requests_are_rejected() {
        for line in ["", "Hello", "Unlock", "Lock A", "Register: gui", "profile: x"] {
            assert_eq!(parse_request(line), None, "{line:?}");
        }
    }

    #[test]
    fn selected_takes_two_quoted_arguments() {
        assert_eq!(
            parse_request("Selected: main 'item one'"),
            Some(Request::Selected(Some(("main".into(), "item one".into()))))
        );
        assert_eq!(parse_request("Selected: main"), Some(Request::Selected(None)));
        assert_eq!(parse_request("Selected: 'main item"), Some(Request::Selected(None)));
    }

    #[test]
    fn quoting_survives_splitting() {
        let args = ["message", "-t", "2.5", "it's done", ""];
        let line = osd_line(&args);
        assert_eq!(line, r#"OSD: message -t 2.5 'it'"'"'s done' ''"#);

        let split = split_args(line.trim_start_matches("OSD: ")).unwrap();
        assert_eq!(split, args);
    }

    #[test]
    fn greeting_reports_status() {
        let lines = greeting(Path::new("/p.yaml"), None);
        assert_eq!(lines[0], "SCCDaemon");
        assert!(lines[1].starts_with("Version: "));
        assert_eq!(lines[3], "Current profile: /p.yaml");
        assert_eq!(lines[4], "Ready.");
        assert_eq!(
            greeting(Path::new("/p.yaml"), Some("no device"))[4],
            "Error: no device"
        );
    }

    #[test]
    fn menu_arguments_name_the_profile() {
        let request = MenuRequest {
            menu: "main".into(),
            kind: MenuKind::List,
            control_with: Source::LeftPad,
            confirm_with: "LPADTOUCH".into(),
            cancel_with: "B".into(),
            position: (10, -10),
            use_cursor: true,
        };
        assert_eq!(
            osd_line(&osd_menu(&request, MenuSource::Profile(Path::new("/p.yaml")))),
            "OSD: menu --confirm-with LPADTOUCH --cancel-with B --control-with LEFT \
             -x 10 -y -10 --use-cursor --from-profile /p.yaml main"
        );
    }

    #[test]
    fn file_menus_use_their_kind_and_path() {
        let request = MenuRequest {
            menu: "tools.menu".into(),
            kind: MenuKind::Radial,
            control_with: Source::Stick,
            confirm_with: "A".into(),
            cancel_with: "B".into(),
            position: (10, -10),
            use_cursor: false,
        };
        assert_eq!(
            osd_menu(&request, MenuSource::File(Path::new("/ws/menus/tools.menu"))),
            [
                "radialmenu",
                "--confirm-with",
                "A",
                "--cancel-with",
                "B",
                "--control-with",
                "STICK",
                "-x",
                "10",
                "-y",
                "-10",
                "--from-file",
                "/ws/menus/tools.menu",
            ]
        );
    }

    #[test]
    fn message_timeout_is_in_seconds() {
        assert_eq!(
            osd_message("hi", Some(Duration::from_millis(1500))),
            ["message", "-t", "1.5", "hi"]
        );
        assert_eq!(osd_message("hi", None), ["message", "hi"]);
    }
}
