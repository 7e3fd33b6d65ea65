use chatrelay_llm::GatewayError;
use chatrelay_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("{0} is required")]
    MissingComponent(&'static str),
}

impl SessionError {
    pub fn as_gateway(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
