/*
    This module helps with parsing deriveration paths passed in as strings
    as vectors of ChildOptions that can be used to derive a child key.

    "m/44'/0'/0'" is absolute and only applies to a master key,
    "./0/1" is relative to whatever key it is applied to.
*/

use std::{fmt, str::FromStr};

use crate::hdwallet::{
    ChildOptions,
    ExtendedKey,
    HDWError,
    HARDENED_OFFSET
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub children: Vec<ChildOptions>,
    pub absolute: bool
}

impl Path {
    /// Relative path with no steps.
    pub fn empty() -> Self {
        Self {
            children: vec![],
            absolute: false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl FromStr for Path {
    type Err = HDWError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim_matches(|c: char| c == ' ' || c == '/');
        let mut steps = trimmed.split('/').map(str::trim);

        let absolute = match steps.next() {
            Some("m") => true,
            Some(".") => false,
            _ => return Err(HDWError::BadPath(path.to_string()))
        };

        let children = steps
            .map(|step| step_to_index(step).map(ChildOptions::from_index))
            .collect::<Result<Vec<ChildOptions>, HDWError>>()?;

        Ok(Self { children, absolute })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.absolute { "m" } else { "." })?;
        for child in &self.children {
            match child {
                ChildOptions::Normal(x) => write!(f, "/{}", x)?,
                ChildOptions::Hardened(x) => write!(f, "/{}'", x)?
            }
        }
        Ok(())
    }
}

/**
    Full 32 bit index of one path step.
    "44" is a normal index, "44'" is 44 + 2^31.
*/
pub fn step_to_index(step: &str) -> Result<u32, HDWError> {
    let (number, hardened) = match step.strip_suffix('\'') {
        Some(number) => (number, true),
        None => (step, false)
    };

    let index: u32 = number
        .parse()
        .map_err(|_| HDWError::BadPath(step.to_string()))?;
    if index >= HARDENED_OFFSET {
        return Err(HDWError::IndexTooLarge(index))
    }

    Ok(if hardened { index + HARDENED_OFFSET } else { index })
}

/**
    Parse the path and derive the key it points at.
*/
pub fn ckd_path<K: ExtendedKey>(xkey: &K, path: &str) -> Result<K, HDWError> {
    let path: Path = path.parse()?;
    log::trace!("deriving {} from depth {}", path, xkey.depth());
    xkey.derive_from_path(&path)
}
