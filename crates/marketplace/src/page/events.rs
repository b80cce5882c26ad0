//! Events a page reports to its presentation layer.

use std::fmt;

use crate::error::RequestError;
use crate::models::Profile;
use crate::validation::FieldErrors;

/// Network operation performed by the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchProfile,
    UpdateProfile,
    DeleteAccount,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::FetchProfile => "fetch profile",
            Operation::UpdateProfile => "update profile",
            Operation::DeleteAccount => "delete account",
        })
    }
}

/// Confirmation shown to the user after an action succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ProfileUpdated,
    AccountDeleted,
    LoggedOut,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::ProfileUpdated => "User Updated",
            Notice::AccountDeleted => "deleted",
            Notice::LoggedOut => "Logged out",
        }
    }
}

/// A failed network operation, kept until the next success of the same kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub operation: Operation,
    pub error: RequestError,
}

impl PageError {
    pub fn user_message(&self) -> &'static str {
        self.error.user_message()
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to {}: {}", self.operation, self.error.user_message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    ProfileLoaded(Profile),
    Notice(Notice),
    ValidationFailed(FieldErrors),
    RequestFailed(PageError),
}
