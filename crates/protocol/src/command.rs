use bytes::Bytes;
use ttlpaste_common::CommandError;

use crate::{Frame, Parse};

/// Condição para SET (NX ou XX).
#[derive(Debug, Clone, PartialEq)]
pub enum SetCondition {
    /// Só seta se a chave não existir.
    Nx,
    /// Só seta se a chave já existir.
    Xx,
}

/// Opções do comando SET.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetOptions {
    pub expire_ms: Option<u64>,
    pub condition: Option<SetCondition>,
}

impl SetOptions {
    /// SET EX <secs> NX: grava uma chave nova com expiração.
    pub fn create_with_ttl(ttl_secs: u64) -> Self {
        Self {
            expire_ms: Some(ttl_secs * 1000),
            condition: Some(SetCondition::Nx),
        }
    }
}

/// Subconjunto de comandos Redis falado entre gateway e backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping(Option<Bytes>),
    Auth {
        username: Option<String>,
        password: String,
    },
    Get(String),
    Set {
        key: String,
        value: Bytes,
        options: SetOptions,
    },
    Ttl(String),
    Del(Vec<String>),
    Unknown(String),
}

impl Command {
    /// Faz o parse de um Frame em um Command.
    pub fn from_frame(frame: Frame) -> Result<Command, CommandError> {
        let mut parse = Parse::new(frame)?;
        let cmd_name = parse.next_string()?.to_uppercase();

        let cmd = match cmd_name.as_str() {
            "PING" => {
                let msg = if parse.has_remaining() {
                    Some(parse.next_bytes()?)
                } else {
                    None
                };
                parse.finish()?;
                Command::Ping(msg)
            }
            "AUTH" => {
                let first = parse
                    .next_string()
                    .map_err(|_| CommandError::WrongArity("AUTH".into()))?;
                if parse.has_remaining() {
                    let password = parse.next_string()?;
                    parse
                        .finish()
                        .map_err(|_| CommandError::WrongArity("AUTH".into()))?;
                    Command::Auth {
                        username: Some(first),
                        password,
                    }
                } else {
                    Command::Auth {
                        username: None,
                        password: first,
                    }
                }
            }
            "GET" => {
                let key = parse.next_string()?;
                parse.finish()?;
                Command::Get(key)
            }
            "SET" => parse_set(&mut parse)?,
            "TTL" => {
                let key = parse.next_string()?;
                parse.finish()?;
                Command::Ttl(key)
            }
            "DEL" => {
                if !parse.has_remaining() {
                    return Err(CommandError::WrongArity("DEL".into()));
                }
                let mut keys = Vec::new();
                while parse.has_remaining() {
                    keys.push(parse.next_string()?);
                }
                Command::Del(keys)
            }
            _ => Command::Unknown(cmd_name),
        };

        Ok(cmd)
    }

    /// Encoda o comando como Frame para envio via RESP.
    pub fn to_frame(&self) -> Frame {
        match self {
            Command::Ping(None) => Frame::Array(vec![Frame::bulk("PING")]),
            Command::Ping(Some(msg)) => {
                Frame::Array(vec![Frame::bulk("PING"), Frame::Bulk(msg.clone())])
            }
            Command::Auth { username, password } => {
                let mut parts = vec![Frame::bulk("AUTH")];
                if let Some(user) = username {
                    parts.push(Frame::bulk(user));
                }
                parts.push(Frame::bulk(password));
                Frame::Array(parts)
            }
            Command::Get(key) => Frame::Array(vec![Frame::bulk("GET"), Frame::bulk(key)]),
            Command::Set {
                key,
                value,
                options,
            } => {
                let mut parts = vec![
                    Frame::bulk("SET"),
                    Frame::bulk(key),
                    Frame::Bulk(value.clone()),
                ];
                match options.expire_ms {
                    Some(ms) if ms % 1000 == 0 => {
                        parts.push(Frame::bulk("EX"));
                        parts.push(Frame::bulk(&(ms / 1000).to_string()));
                    }
                    Some(ms) => {
                        parts.push(Frame::bulk("PX"));
                        parts.push(Frame::bulk(&ms.to_string()));
                    }
                    None => {}
                }
                match options.condition {
                    Some(SetCondition::Nx) => parts.push(Frame::bulk("NX")),
                    Some(SetCondition::Xx) => parts.push(Frame::bulk("XX")),
                    None => {}
                }
                Frame::Array(parts)
            }
            Command::Ttl(key) => Frame::Array(vec![Frame::bulk("TTL"), Frame::bulk(key)]),
            Command::Del(keys) => {
                let mut parts = vec![Frame::bulk("DEL")];
                parts.extend(keys.iter().map(|k| Frame::bulk(k)));
                Frame::Array(parts)
            }
            Command::Unknown(name) => Frame::Array(vec![Frame::bulk(name)]),
        }
    }
}

fn parse_set(parse: &mut Parse) -> Result<Command, CommandError> {
    let key = parse.next_string()?;
    let value = parse.next_bytes()?;

    let mut options = SetOptions::default();

    while parse.has_remaining() {
        let opt = parse.next_string()?.to_uppercase();
        match opt.as_str() {
            "EX" => {
                let secs = parse.next_int()?;
                if secs <= 0 {
                    return Err(CommandError::InvalidSetOption(
                        "EX deve ser positivo".into(),
                    ));
                }
                options.expire_ms = Some(secs as u64 * 1000);
            }
            "PX" => {
                let ms = parse.next_int()?;
                if ms <= 0 {
                    return Err(CommandError::InvalidSetOption(
                        "PX deve ser positivo".into(),
                    ));
                }
                options.expire_ms = Some(ms as u64);
            }
            "NX" => options.condition = Some(SetCondition::Nx),
            "XX" => options.condition = Some(SetCondition::Xx),
            other => {
                return Err(CommandError::InvalidSetOption(other.to_string()));
            }
        }
    }

    Ok(Command::Set {
        key,
        value,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, CommandError> {
        Command::from_frame(Frame::array_from_strs(args))
    }

    #[test]
    fn parse_ping() {
        assert_eq!(parse(&["PING"]).unwrap(), Command::Ping(None));
        assert_eq!(
            parse(&["ping", "hello"]).unwrap(),
            Command::Ping(Some(Bytes::from("hello")))
        );
    }

    #[test]
    fn parse_auth_password_only() {
        assert_eq!(
            parse(&["AUTH", "s3cret"]).unwrap(),
            Command::Auth {
                username: None,
                password: "s3cret".into(),
            }
        );
    }

    #[test]
    fn parse_auth_with_username() {
        assert_eq!(
            parse(&["AUTH", "default", "s3cret"]).unwrap(),
            Command::Auth {
                username: Some("default".into()),
                password: "s3cret".into(),
            }
        );
    }

    #[test]
    fn auth_wrong_arity() {
        assert!(matches!(parse(&["AUTH"]), Err(CommandError::WrongArity(_))));
        assert!(matches!(
            parse(&["AUTH", "a", "b", "c"]),
            Err(CommandError::WrongArity(_))
        ));
    }

    #[test]
    fn parse_set_with_ex_nx() {
        let cmd = parse(&["SET", "k", "v", "EX", "600", "NX"]).unwrap();
        assert_eq!(
            cmd,
            Command::Set {
                key: "k".into(),
                value: Bytes::from("v"),
                options: SetOptions::create_with_ttl(600),
            }
        );
    }

    #[test]
    fn parse_set_px_xx() {
        match parse(&["set", "k", "v", "px", "1500", "xx"]).unwrap() {
            Command::Set { options, .. } => {
                assert_eq!(options.expire_ms, Some(1500));
                assert_eq!(options.condition, Some(SetCondition::Xx));
            }
            other => panic!("expected Set, got {other:?}"),
        }
    }

    #[test]
    fn set_rejects_non_positive_expiry() {
        assert!(matches!(
            parse(&["SET", "k", "v", "EX", "0"]),
            Err(CommandError::InvalidSetOption(_))
        ));
        assert!(matches!(
            parse(&["SET", "k", "v", "PX", "-10"]),
            Err(CommandError::InvalidSetOption(_))
        ));
    }

    #[test]
    fn invalid_set_option() {
        assert!(parse(&["SET", "k", "v", "KEEPTTL"]).is_err());
    }

    #[test]
    fn parse_ttl_and_del() {
        assert_eq!(parse(&["TTL", "k"]).unwrap(), Command::Ttl("k".into()));
        assert_eq!(
            parse(&["DEL", "a", "b"]).unwrap(),
            Command::Del(vec!["a".into(), "b".into()])
        );
        assert!(matches!(parse(&["DEL"]), Err(CommandError::WrongArity(_))));
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(
            parse(&["FLUSHALL"]).unwrap(),
            Command::Unknown("FLUSHALL".into())
        );
    }

    #[test]
    fn set_encodes_whole_seconds_as_ex() {
        let cmd = Command::Set {
            key: "k".into(),
            value: Bytes::from("v"),
            options: SetOptions::create_with_ttl(1800),
        };
        assert_eq!(
            cmd.to_frame(),
            Frame::array_from_strs(&["SET", "k", "v", "EX", "1800", "NX"])
        );
    }

    #[test]
    fn set_encodes_sub_second_expiry_as_px() {
        let cmd = Command::Set {
            key: "k".into(),
            value: Bytes::from("v"),
            options: SetOptions {
                expire_ms: Some(250),
                condition: None,
            },
        };
        assert_eq!(
            cmd.to_frame(),
            Frame::array_from_strs(&["SET", "k", "v", "PX", "250"])
        );
    }

    #[test]
    fn to_frame_parses_back() {
        let cmds = [
            Command::Ping(None),
            Command::Auth {
                username: Some("app".into()),
                password: "pw".into(),
            },
            Command::Get("file:py-1:data".into()),
            Command::Ttl("file:py-1:data".into()),
            Command::Del(vec!["file:py-1:data".into()]),
        ];
        for cmd in cmds {
            assert_eq!(Command::from_frame(cmd.to_frame()).unwrap(), cmd);
        }
    }
}
