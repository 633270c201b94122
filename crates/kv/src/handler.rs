use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tracing::debug;

use ttlpaste_common::ConnectionError;
use ttlpaste_protocol::{Command, Connection, Frame};
use ttlpaste_storage::Db;

const DEFAULT_USER: &str = "default";

/// Estado de autenticação de uma conexão.
#[derive(Debug, Clone)]
pub struct Session {
    requirepass: Option<Arc<str>>,
    authenticated: bool,
}

impl Session {
    pub fn new(requirepass: Option<Arc<str>>) -> Self {
        let authenticated = requirepass.is_none();
        Self {
            requirepass,
            authenticated,
        }
    }

    fn authenticate(&mut self, username: Option<&str>, password: &str) -> Frame {
        let Some(expected) = self.requirepass.as_deref() else {
            return Frame::Error(
                "ERR AUTH <password> called without any password configured for the default user. \
                 Are you sure your configuration is correct?"
                    .into(),
            );
        };
        let user_ok = username.is_none_or(|u| u == DEFAULT_USER);
        if user_ok && password == expected {
            self.authenticated = true;
            Frame::ok()
        } else {
            Frame::Error("WRONGPASS invalid username-password pair or user is disabled.".into())
        }
    }
}

/// Loop principal de tratamento de uma conexão.
pub async fn handle_connection<S>(
    mut conn: Connection<S>,
    db: Db,
    mut session: Session,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let frame = tokio::select! {
            result = conn.read_frame() => result?,
            _ = shutdown.recv() => {
                return Ok(());
            }
        };

        let frame = match frame {
            Some(f) => f,
            None => return Ok(()), // EOF
        };

        let cmd = match Command::from_frame(frame) {
            Ok(cmd) => cmd,
            Err(e) => {
                let response = Frame::Error(format!("ERR {e}"));
                conn.write_frame(&response).await?;
                continue;
            }
        };

        debug!("comando recebido: {cmd:?}");

        let response = match cmd {
            Command::Auth { username, password } => {
                session.authenticate(username.as_deref(), &password)
            }
            _ if !session.authenticated => Frame::Error("NOAUTH Authentication required.".into()),
            cmd => execute_command(cmd, &db),
        };

        conn.write_frame(&response).await?;
    }
}

/// Executa um comando e retorna o Frame de resposta.
fn execute_command(cmd: Command, db: &Db) -> Frame {
    match cmd {
        Command::Ping(msg) => match msg {
            Some(m) => Frame::Bulk(m),
            None => Frame::Simple("PONG".into()),
        },
        Command::Get(key) => match db.get(&key) {
            Some(value) => Frame::Bulk(value),
            None => Frame::Null,
        },
        Command::Set {
            key,
            value,
            options,
        } => {
            if db.set(key, value, &options) {
                Frame::ok()
            } else {
                Frame::Null // NX/XX condition not met
            }
        }
        Command::Ttl(key) => Frame::Integer(db.ttl(&key)),
        Command::Del(keys) => Frame::Integer(db.del(&keys) as i64),
        Command::Auth { .. } => unreachable!("handled above"),
        Command::Unknown(name) => Frame::Error(format!("ERR unknown command '{name}'")),
    }
}
