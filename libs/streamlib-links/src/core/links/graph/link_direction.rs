// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::core::error::PortSide;

/// Direction of a link port, fixed when the port is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkDirection {
    /// Input port (receives data, destination side of a link)
    Input,
    /// Output port (sends data, source side of a link)
    Output,
}

impl LinkDirection {
    /// The side of a link this direction corresponds to.
    pub fn side(&self) -> PortSide {
        match self {
            LinkDirection::Output => PortSide::Source,
            LinkDirection::Input => PortSide::Destination,
        }
    }
}
