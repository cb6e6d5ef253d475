use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use colored::Colorize;
use crossbeam_channel::{unbounded, Receiver};
use padbind_engine::{print_debug, print_error, print_info, InterceptError, SessionHandle};
use thiserror::Error;

use crate::protocol::{self, Request};
use crate::state::DaemonState;

/// Error type for the session server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("session socket error: {0}")]
    Io(#[from] io::Error),
}

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Unix socket accepting control sessions. The socket file is removed on
/// drop.
pub struct SessionServer {
    socket_path: PathBuf,
}

impl SessionServer {
    /// Bind `socket_path`, replacing a stale socket, and start accepting.
    pub fn start(socket_path: &Path, state: Arc<DaemonState>) -> ServerResult<Self> {
        if socket_path.exists() {
            fs::remove_file(socket_path)?;
        }
        let listener = UnixListener::bind(socket_path)?;
        fs::set_permissions(socket_path, fs::Permissions::from_mode(0o600))?;
        print_info!("Session socket listening at {}", socket_path.display());

        thread::Builder::new()
            .name("padbindd-sessions".into())
            .spawn(move || {
                for stream in listener.incoming() {
                    match stream {
                        Ok(stream) => {
                            let state = Arc::clone(&state);
                            if let Err(e) = spawn_session(stream, state) {
                                print_error!("Cannot start session: {e}");
                            }
                        }
                        Err(e) => {
                            print_error!("Session socket accept error: {e}");
                            break;
                        }
                    }
                }
            })?;

        Ok(Self {
            socket_path: socket_path.to_owned(),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for SessionServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.socket_path);
    }
}

fn spawn_session(stream: UnixStream, state: Arc<DaemonState>) -> io::Result<()> {
    let writer = stream.try_clone()?;
    let (tx, rx) = unbounded::<String>();
    let handle = state.connect(tx);
    let id = handle.id();

    thread::Builder::new()
        .name(format!("padbindd-session-{id}-out"))
        .spawn(move || write_lines(writer, &rx))?;
    let spawned = thread::Builder::new()
        .name(format!("padbindd-session-{id}"))
        .spawn({
            let state = Arc::clone(&state);
            move || serve(stream, &state, &handle)
        });
    if let Err(e) = spawned {
        state.runtime().disconnect(id);
        return Err(e);
    }
    Ok(())
}

/// Writes queued lines until the session is dropped or the peer is gone.
fn write_lines(stream: UnixStream, rx: &Receiver<String>) {
    let mut writer = BufWriter::new(stream);
    while let Ok(line) = rx.recv() {
        let written = writeln!(writer, "{line}").and_then(|()| {
            if rx.is_empty() {
                writer.flush()
            } else {
                Ok(())
            }
        });
        if written.is_err() {
            break;
        }
    }
}

fn serve(stream: UnixStream, state: &DaemonState, handle: &SessionHandle) {
    let id = handle.id();
    print_debug!("Session {id} opened");
    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        print_debug!("session {id} <- {line}");
        handle_line(state, handle, &line);
    }

    state.forget(id);
    state.runtime().disconnect(id);
    print_debug!("Session {id} closed");
}

/// Execute one request and queue the reply on the session.
pub fn handle_line(state: &DaemonState, handle: &SessionHandle, line: &str) {
    let runtime = state.runtime();
    let Some(request) = protocol::parse_request(line) else {
        handle.send(protocol::UNKNOWN_COMMAND);
        return;
    };

    let reply = match request {
        Request::Profile(path) => match runtime.load_profile(Path::new(path)) {
            Ok(()) => protocol::OK.to_string(),
            Err(e) => {
                print_error!("{e}");
                protocol::fail(e)
            }
        },
        Request::Lock(names) => {
            if names.is_empty() {
                protocol::fail(InterceptError::UnknownSource(String::new()))
            } else {
                reply_to(runtime.lock(handle.id(), &names))
            }
        }
        Request::Observe(names) => {
            if names.is_empty() {
                protocol::fail(InterceptError::UnknownSource(String::new()))
            } else {
                reply_to(runtime.observe(handle.id(), &names))
            }
        }
        Request::Unlock => reply_to(runtime.unlock(handle.id())),
        Request::Selected(selection) => {
            let selected = selection
                .ok_or(())
                .and_then(|(menu, item)| runtime.select_menu_item(&menu, &item).map_err(|_| ()));
            match selected {
                Ok(()) => protocol::OK.to_string(),
                Err(()) => protocol::fail("Selected menu item is no longer valid"),
            }
        }
        Request::Reconfigure => {
            handle.send(protocol::OK);
            if let Err(e) = state.reconfigure() {
                print_error!("Failed to reload configuration: {e}");
            }
            return;
        }
        Request::Register(role) => {
            state.register(role, handle.clone());
            protocol::OK.to_string()
        }
        Request::Osd(text) => {
            if !state.has_osd() {
                protocol::fail(protocol::NO_OSD_DAEMON)
            } else if state.show_osd(&protocol::osd_message(text, None)) {
                protocol::OK.to_string()
            } else {
                protocol::fail("cannot display OSD")
            }
        }
    };
    handle.send(reply);
}

fn reply_to(result: Result<(), InterceptError>) -> String {
    match result {
        Ok(()) => protocol::OK.to_string(),
        Err(e) => protocol::fail(e),
    }
}
