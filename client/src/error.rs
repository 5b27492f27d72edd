use thiserror::Error;

pub const NETWORK_ERROR: &str = "Network error. Please check if server is running.";

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with `success: false`; the message is shown as-is.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Network error. Please check if server is running.")]
    Network(#[from] reqwest::Error),
    #[error("Not logged in")]
    NotAuthenticated,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_server_message() {
        let error = ClientError::Api {
            status: 400,
            message: "Email already registered".to_string(),
        };
        assert_eq!(error.to_string(), "Email already registered");
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_not_authenticated_has_no_status() {
        assert_eq!(ClientError::NotAuthenticated.status(), None);
    }
}
