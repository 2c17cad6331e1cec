// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CompileError, Result};

/// Type of a variable or port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariableType {
    String,
    StringArray,
    File,
    FileArray,
    RemoteFile,
    RemoteFileArray,
}

impl VariableType {
    pub const ALL: [VariableType; 6] = [
        VariableType::String,
        VariableType::StringArray,
        VariableType::File,
        VariableType::FileArray,
        VariableType::RemoteFile,
        VariableType::RemoteFileArray,
    ];

    /// Canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::StringArray => "string[]",
            Self::File => "file",
            Self::FileArray => "file[]",
            Self::RemoteFile => "remote-file",
            Self::RemoteFileArray => "remote-file[]",
        }
    }

    /// Parse a type name, ignoring case.
    pub fn parse(name: &str) -> Result<Self> {
        let lowered = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == lowered)
            .ok_or_else(|| CompileError::parsing("variable type", format!("unknown type '{}'", name)))
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::StringArray | Self::FileArray | Self::RemoteFileArray
        )
    }

    /// Local file types; remote files are not included.
    pub fn is_file(self) -> bool {
        matches!(self, Self::File | Self::FileArray)
    }

    pub fn is_remote_file(self) -> bool {
        matches!(self, Self::RemoteFile | Self::RemoteFileArray)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for VariableType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for VariableType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).map_err(serde::de::Error::custom)
    }
}
