//! SFTP-backed transport.
//!
//! The SSH session lives on a dedicated worker thread that executes requests
//! in arrival order and posts each reply back through a channel.

use std::net::TcpStream;
use std::path::Path;
use std::thread;

use flume::{Receiver, Sender};
use ssh2::{
    Error as SshError, ErrorCode, FileStat, Session as Ssh2Session, Sftp,
};

use crate::config::{SftpAuth, SftpConfig};
use crate::error::TransportError;
use crate::protocol::{
    Drive, DriveKind, RemoteEntry, Reply, ReplyPayload, Request, RequestKind,
};
use crate::status::FileStatus;

use super::{
    ChannelConfig, ReplyReceiver, Transport, build_channel, map_send_error,
};

const WORKER_NAME: &str = "otty-sftp";
const DIRECTORY_MODE: i32 = 0o755;

const LIBSSH2_FX_NO_SUCH_FILE: i32 = 2;
const LIBSSH2_FX_PERMISSION_DENIED: i32 = 3;
const LIBSSH2_FX_BAD_MESSAGE: i32 = 5;
const LIBSSH2_FX_OP_UNSUPPORTED: i32 = 8;
const LIBSSH2_FX_NO_SUCH_PATH: i32 = 10;
const LIBSSH2_FX_FILE_ALREADY_EXISTS: i32 = 11;
const LIBSSH2_FX_WRITE_PROTECT: i32 = 12;
const LIBSSH2_FX_NO_SPACE_ON_FILESYSTEM: i32 = 14;
const LIBSSH2_FX_QUOTA_EXCEEDED: i32 = 15;
const LIBSSH2_FX_DIR_NOT_EMPTY: i32 = 18;
const LIBSSH2_FX_NOT_A_DIRECTORY: i32 = 19;
const LIBSSH2_FX_INVALID_FILENAME: i32 = 20;

/// [`Transport`] that executes requests over SFTP on a worker thread.
#[derive(Debug, Clone)]
pub struct SftpTransport {
    requests: Sender<Request>,
}

impl SftpTransport {
    /// Connect, authenticate and start the worker thread.
    pub fn connect(
        config: &SftpConfig,
        channels: &ChannelConfig,
    ) -> crate::Result<(Self, ReplyReceiver)> {
        Ok(Self::start(config, channels)?)
    }

    fn start(
        config: &SftpConfig,
        channels: &ChannelConfig,
    ) -> Result<(Self, ReplyReceiver), TransportError> {
        let session = open_session(config)?;
        let sftp = session.sftp()?;
        let home = sftp
            .realpath(Path::new("."))
            .ok()
            .map(|path| path.to_string_lossy().into_owned())
            .filter(|path| path != "/");
        log::info!("sftp connected to {}", config.address());

        let (request_tx, request_rx) = build_channel(channels.request_capacity);
        let (reply_tx, reply_rx) = build_channel(channels.reply_capacity);

        let worker = SftpWorker {
            _session: session,
            sftp,
            home,
        };
        thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn(move || worker.run(request_rx, reply_tx))?;

        let transport = Self {
            requests: request_tx,
        };
        Ok((transport, ReplyReceiver::new(reply_rx)))
    }
}

impl Transport for SftpTransport {
    fn send(&self, request: Request) -> Result<(), TransportError> {
        self.requests.try_send(request).map_err(map_send_error)
    }
}

/// Establish the SSH connection and authenticate, trying the agent first.
fn open_session(config: &SftpConfig) -> Result<Ssh2Session, TransportError> {
    let stream = TcpStream::connect(config.address())?;
    stream.set_nodelay(true)?;

    let mut session = Ssh2Session::new()?;
    session.set_tcp_stream(stream);
    session.handshake()?;

    let user = config.user.as_str();
    if let Ok(mut agent) = session.agent() {
        if agent.connect().is_ok() && agent.list_identities().is_ok() {
            for id in agent.identities().unwrap_or_default() {
                if agent.userauth(user, &id).is_ok() {
                    break;
                }
            }
        }
    }

    if !session.authenticated() {
        match &config.auth {
            SftpAuth::Password { password } => {
                session.userauth_password(user, password)?;
            },
            SftpAuth::KeyFile {
                private_key_path,
                passphrase,
            } => {
                session.userauth_pubkey_file(
                    user,
                    None,
                    Path::new(private_key_path),
                    passphrase.as_deref(),
                )?;
            },
        }
    }

    Ok(session)
}

struct SftpWorker {
    _session: Ssh2Session,
    sftp: Sftp,
    home: Option<String>,
}

impl SftpWorker {
    fn run(self, requests: Receiver<Request>, replies: Sender<Reply>) {
        for request in requests.iter() {
            let reply = self.handle(request);
            if replies.send(reply).is_err() {
                break;
            }
        }

        log::debug!("sftp worker stopped");
    }

    fn handle(&self, request: Request) -> Reply {
        let outcome = match request.kind() {
            RequestKind::DriveList => Ok(self.drive_list()),
            RequestKind::FileList { path } => self.file_list(path.as_str()),
            RequestKind::CreateDirectory { path } => self
                .sftp
                .mkdir(Path::new(path), DIRECTORY_MODE)
                .map(|()| ReplyPayload::None),
            RequestKind::Rename { old_path, new_path } => self
                .sftp
                .rename(Path::new(old_path), Path::new(new_path), None)
                .map(|()| ReplyPayload::None),
            RequestKind::Remove { path, is_directory } => {
                let path = Path::new(path);
                let removed = if *is_directory {
                    self.sftp.rmdir(path)
                } else {
                    self.sftp.unlink(path)
                };
                removed.map(|()| ReplyPayload::None)
            },
        };

        match outcome {
            Ok(payload) => Reply::success(request, payload),
            Err(err) => {
                log::warn!("sftp {:?} failed: {err}", request.kind());
                Reply::failure(request, status_for(&err))
            },
        }
    }

    fn drive_list(&self) -> ReplyPayload {
        let mut drives = vec![Drive::new(DriveKind::Fixed, "/")];
        if let Some(home) = &self.home {
            drives.push(Drive::new(DriveKind::HomeFolder, home.as_str()));
        }

        ReplyPayload::DriveList(drives)
    }

    fn file_list(&self, path: &str) -> Result<ReplyPayload, SshError> {
        let entries = self
            .sftp
            .readdir(Path::new(path))?
            .iter()
            .filter_map(|(path, stat)| remote_entry(path, stat))
            .collect();

        Ok(ReplyPayload::FileList(entries))
    }
}

fn remote_entry(path: &Path, stat: &FileStat) -> Option<RemoteEntry> {
    let name = path.file_name()?.to_string_lossy();
    if name == "." || name == ".." {
        return None;
    }

    let modified = stat.mtime.unwrap_or_default() as i64;
    Some(if stat.is_dir() {
        RemoteEntry::directory(name, modified)
    } else {
        RemoteEntry::file(name, stat.size.unwrap_or_default(), modified)
    })
}

/// Translate an SFTP failure into the browser's status vocabulary.
fn status_for(err: &SshError) -> FileStatus {
    match err.code() {
        ErrorCode::SFTP(code) => match code {
            LIBSSH2_FX_NO_SUCH_FILE
            | LIBSSH2_FX_NO_SUCH_PATH
            | LIBSSH2_FX_NOT_A_DIRECTORY => FileStatus::PathNotFound,
            LIBSSH2_FX_PERMISSION_DENIED
            | LIBSSH2_FX_WRITE_PROTECT
            | LIBSSH2_FX_DIR_NOT_EMPTY => FileStatus::AccessDenied,
            LIBSSH2_FX_FILE_ALREADY_EXISTS => FileStatus::PathAlreadyExists,
            LIBSSH2_FX_NO_SPACE_ON_FILESYSTEM | LIBSSH2_FX_QUOTA_EXCEEDED => {
                FileStatus::DiskFull
            },
            LIBSSH2_FX_INVALID_FILENAME => FileStatus::InvalidPathName,
            LIBSSH2_FX_BAD_MESSAGE | LIBSSH2_FX_OP_UNSUPPORTED => {
                FileStatus::InvalidRequest
            },
            other => FileStatus::Unknown(other),
        },
        ErrorCode::Session(code) => FileStatus::Unknown(code),
    }
}
