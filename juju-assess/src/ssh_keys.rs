//! Parser for `juju ssh-keys` output
//!
//! ```text
//! Keys used in model: admin@local/assesssshkeys-env
//! 47:2d:88:82:a6:84:9a:ca:44:3e:54:79:ed:bc:e4:64 (abentley@speedy)
//! b4:e9:ce:a4:a4:d0:71:5b:d1:da:ae:a6:53:97:80:c2 (juju-system-key)
//! ```

use std::fmt;
use std::str::FromStr;

pub const KEYS_HEADER: &str = "Keys used in model: ";
pub const JUJU_SYSTEM_KEY: &str = "juju-system-key";
pub const JUJU_CLIENT_KEY: &str = "juju-client-key";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected 'Keys used in model: <model>' header, got {found:?}")]
    MissingHeader { found: String },

    #[error("keys listed for model {found:?}, expected {expected:?}")]
    ModelMismatch { expected: String, found: String },

    #[error("key line has no parenthesized comment: {line:?}")]
    MissingComment { line: String },

    #[error("key line has no fingerprint: {line:?}")]
    EmptyFingerprint { line: String },
}

/// One line of an ssh key listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SshKey {
    fingerprint: String,
    comment: String,
}

impl SshKey {
    /// Parse `<fingerprint> (<comment>)`
    pub fn from_fingerprint_line(line: &str) -> Result<Self, ParseError> {
        let Some((fingerprint, rest)) = line.split_once(' ') else {
            return Err(ParseError::MissingComment {
                line: line.to_string(),
            });
        };
        if fingerprint.is_empty() {
            return Err(ParseError::EmptyFingerprint {
                line: line.to_string(),
            });
        }
        let comment = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| ParseError::MissingComment {
                line: line.to_string(),
            })?;

        Ok(Self {
            fingerprint: fingerprint.to_string(),
            comment: comment.to_string(),
        })
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn is_juju_system_key(&self) -> bool {
        self.comment == JUJU_SYSTEM_KEY
    }

    pub fn is_juju_client_key(&self) -> bool {
        self.comment == JUJU_CLIENT_KEY
    }
}

impl fmt::Display for SshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.fingerprint, self.comment)
    }
}

impl FromStr for SshKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fingerprint_line(s)
    }
}

/// Parse a key listing, checking it belongs to `expected_model`.
///
/// The header may qualify the model with its owner
/// (`admin@local/assess-env`); the part after the last `/` must match.
pub fn parse_ssh_keys_output(output: &str, expected_model: &str) -> Result<Vec<SshKey>, ParseError> {
    let mut lines = output.lines();
    let header = lines.next().unwrap_or("");
    let Some(model) = header.strip_prefix(KEYS_HEADER) else {
        return Err(ParseError::MissingHeader {
            found: header.to_string(),
        });
    };

    let model = model.trim_end();
    let model_name = model.rsplit('/').next().unwrap_or(model);
    if model_name != expected_model {
        return Err(ParseError::ModelMismatch {
            expected: expected_model.to_string(),
            found: model.to_string(),
        });
    }

    lines
        .filter(|line| !line.trim().is_empty())
        .map(SshKey::from_fingerprint_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_OUTPUT: &str = "Keys used in model: admin@local/assesssshkeys-env\n\
        47:2d:88:82:a6:84:9a:ca:44:3e:54:79:ed:bc:e4:64 (abentley@speedy)\n\
        b4:e9:ce:a4:a4:d0:71:5b:d1:da:ae:a6:53:97:80:c2 (juju-system-key)\n\
        7b:36:c7:2c:14:74:69:50:65:37:49:c3:af:f6:db:94 (juju-client-key)\n";

    #[test]
    fn test_ssh_keys() {
        let keys = parse_ssh_keys_output(VALID_OUTPUT, "assesssshkeys-env").unwrap();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let expected: Vec<&str> = VALID_OUTPUT.lines().skip(1).collect();
        assert_eq!(rendered, expected);
        assert_eq!(keys[0].comment(), "abentley@speedy");
        assert!(keys[1].is_juju_system_key());
        assert!(keys[2].is_juju_client_key());
    }

    #[test]
    fn test_reparse_rendered_output() {
        let keys = parse_ssh_keys_output(VALID_OUTPUT, "assesssshkeys-env").unwrap();
        let mut rendered = String::from("Keys used in model: assesssshkeys-env\n");
        for key in &keys {
            rendered.push_str(&format!("{key}\n"));
        }
        assert_eq!(parse_ssh_keys_output(&rendered, "assesssshkeys-env").unwrap(), keys);
    }

    #[test]
    fn test_wrong_model() {
        let err = parse_ssh_keys_output(VALID_OUTPUT, "other-env").unwrap_err();
        assert_eq!(
            err,
            ParseError::ModelMismatch {
                expected: "other-env".to_string(),
                found: "admin@local/assesssshkeys-env".to_string(),
            }
        );
    }

    #[test]
    fn test_suffix_is_not_a_model_match() {
        let output = "Keys used in model: admin@local/x-assesssshkeys-env\n";
        assert!(matches!(
            parse_ssh_keys_output(output, "assesssshkeys-env"),
            Err(ParseError::ModelMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            parse_ssh_keys_output("", "assess-env").unwrap_err(),
            ParseError::MissingHeader {
                found: String::new()
            }
        );
        let headless = "47:2d:88:82:a6:84:9a:ca:44:3e:54:79:ed:bc:e4:64 (abentley@speedy)\n";
        assert!(matches!(
            parse_ssh_keys_output(headless, "assess-env"),
            Err(ParseError::MissingHeader { .. })
        ));
    }

    #[test]
    fn test_no_keys() {
        let keys = parse_ssh_keys_output("Keys used in model: assess-env\n", "assess-env").unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let output = "Keys used in model: assess-env\n\naa:bb (juju-client-key)\n\n";
        let keys = parse_ssh_keys_output(output, "assess-env").unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].fingerprint(), "aa:bb");
    }

    #[test]
    fn test_malformed_lines() {
        for line in [
            "47:2d:88:82:a6:84:9a:ca:44:3e:54:79:ed:bc:e4:64",
            "47:2d:88:82:a6:84:9a:ca:44:3e:54:79:ed:bc:e4:64 abentley@speedy",
            "47:2d:88:82:a6:84:9a:ca:44:3e:54:79:ed:bc:e4:64 (abentley@speedy",
        ] {
            assert_eq!(
                line.parse::<SshKey>().unwrap_err(),
                ParseError::MissingComment {
                    line: line.to_string()
                }
            );
        }
        assert!(matches!(
            " (juju-system-key)".parse::<SshKey>(),
            Err(ParseError::EmptyFingerprint { .. })
        ));
    }

    #[test]
    fn test_malformed_line_fails_whole_listing() {
        let output = "Keys used in model: assess-env\naa:bb (juju-client-key)\ncc:dd\n";
        assert!(matches!(
            parse_ssh_keys_output(output, "assess-env"),
            Err(ParseError::MissingComment { .. })
        ));
    }

    #[test]
    fn test_comment_keeps_inner_spaces_and_parens() {
        let key: SshKey = "aa:bb (user@host (laptop))".parse().unwrap();
        assert_eq!(key.comment(), "user@host (laptop)");
        assert_eq!(key.to_string(), "aa:bb (user@host (laptop))");
    }

    #[test]
    fn test_whitespace_only_lines_skipped() {
        let output = "Keys used in model: assess-env\n   \naa:bb (juju-client-key)\n\t\n";
        let keys = parse_ssh_keys_output(output, "assess-env").unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].is_juju_client_key());
    }

    #[test]
    fn test_header_trailing_whitespace() {
        let output = "Keys used in model: admin/assess-env \r\naa:bb (juju-system-key)\r\n";
        let keys = parse_ssh_keys_output(output, "assess-env").unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].is_juju_system_key());
    }

    #[test]
    fn test_edge_comments() {
        for line in ["aa:bb (x) (y)", "aa:bb (a b c)", "aa:bb ()"] {
            let key: SshKey = line.parse().unwrap();
            assert_eq!(key.to_string(), line);
        }
        assert_eq!("aa:bb ()".parse::<SshKey>().unwrap().comment(), "");
        assert_eq!("aa:bb (x) (y)".parse::<SshKey>().unwrap().comment(), "x) (y");
    }
}
