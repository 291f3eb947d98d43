use super::super::storage::StorageError;
use super::super::traits::OrderError;
use shared::order::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Map a storage failure to an error code (clients localize the message)
pub(crate) fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    if let StorageError::Serialization(_) = e {
        return CommandErrorCode::InternalError;
    }
    classify_storage_message(&e.to_string())
}

/// redb errors are classified by their message
fn classify_storage_message(message: &str) -> CommandErrorCode {
    let err_str = message.to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }

    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return CommandErrorCode::OutOfMemory;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    // Database/Transaction/Table/Commit errors
    CommandErrorCode::SystemBusy
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string();
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            ManagerError::Order(OrderError::Storage(msg)) => {
                let code = classify_storage_message(&msg);
                tracing::error!(error = %msg, error_code = ?code, "Storage error occurred");
                (code, msg)
            }
            ManagerError::Order(e) => (e.code(), e.to_string()),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg),
        };
        CommandError::new(code, message)
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
