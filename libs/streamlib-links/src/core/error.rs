// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;

use thiserror::Error;

use crate::core::links::LinkIdError;

/// Which end of a link a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSide {
    Source,
    Destination,
}

impl fmt::Display for PortSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSide::Source => write!(f, "Source"),
            PortSide::Destination => write!(f, "Destination"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StreamError {
    /// A port that already carries a link was handed to `bind`.
    ///
    /// This is a topology bug. Graph construction should abort rather than retry.
    #[error("{side} port \"{port}\" already initialized")]
    DoubleInitialize { side: PortSide, port: String },

    #[error("{side} port \"{port}\" is not wired to a link")]
    LinkNotWired { side: PortSide, port: String },

    #[error("Link already exists: {0}")]
    LinkAlreadyExists(String),

    #[error("Link not found: {0}")]
    LinkNotFound(String),

    #[error("Link {link} did not drain in time ({queued} items still queued)")]
    DrainTimeout { link: String, queued: usize },

    /// The edge has a swap that stalled on its drain and was not resumed.
    #[error("Swap onto {pending} is stalled until {retiring} drains, call resume_swap first")]
    SwapStalled { pending: String, retiring: String },

    #[error("Cannot resume swap onto {link}: {reason}")]
    ResumeMismatch { link: String, reason: String },

    #[error("Link allocator exit requested: {0}")]
    ExitRequested(String),

    #[error("Invalid link id: {0}")]
    InvalidLinkId(#[from] LinkIdError),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
