//! Derivation paths such as `m/84'/0'/0'/0/5`.

use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;

const HARDENED_BIT: u32 = 0x8000_0000;

/// One step of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildNumber {
    Normal(u32),
    Hardened(u32),
}

impl ChildNumber {
    /// Index as it appears on the wire, hardened bit included.
    pub fn to_u32(self) -> u32 {
        match self {
            ChildNumber::Normal(index) => index,
            ChildNumber::Hardened(index) => index | HARDENED_BIT,
        }
    }

    pub fn from_u32(raw: u32) -> Self {
        if raw & HARDENED_BIT != 0 {
            ChildNumber::Hardened(raw & !HARDENED_BIT)
        } else {
            ChildNumber::Normal(raw)
        }
    }

    pub fn is_hardened(self) -> bool {
        matches!(self, ChildNumber::Hardened(_))
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildNumber::Normal(index) => write!(f, "{index}"),
            ChildNumber::Hardened(index) => write!(f, "{index}'"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivationPath {
    steps: Vec<ChildNumber>,
}

impl DerivationPath {
    pub fn iter(&self) -> impl Iterator<Item = ChildNumber> + '_ {
        self.steps.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Appends `child`, returning the extended path.
    pub fn child(&self, child: ChildNumber) -> Self {
        let mut steps = self.steps.clone();
        steps.push(child);
        Self { steps }
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(steps: Vec<ChildNumber>) -> Self {
        Self { steps }
    }
}

impl FromStr for DerivationPath {
    type Err = KeyError;

    /// Accepts `m`, `m/0'/1/2h`, or the same without the leading `m/`.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| KeyError::InvalidPath {
            path: path.to_string(),
            reason,
        };

        let body = match path.trim() {
            "m" | "M" | "" => return Ok(Self::default()),
            trimmed => trimmed
                .strip_prefix("m/")
                .or_else(|| trimmed.strip_prefix("M/"))
                .unwrap_or(trimmed),
        };

        let steps = body
            .split('/')
            .map(|component| {
                let (digits, hardened) = match component
                    .strip_suffix('\'')
                    .or_else(|| component.strip_suffix('h'))
                    .or_else(|| component.strip_suffix('H'))
                {
                    Some(digits) => (digits, true),
                    None => (component, false),
                };
                let index: u32 = digits
                    .parse()
                    .map_err(|e| invalid(format!("component {component:?}: {e}")))?;
                if index & HARDENED_BIT != 0 {
                    return Err(invalid(format!("component {component:?} exceeds 2^31 - 1")));
                }
                Ok(if hardened {
                    ChildNumber::Hardened(index)
                } else {
                    ChildNumber::Normal(index)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.steps {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}
