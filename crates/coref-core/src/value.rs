//! The coreference judgment made by an annotator about a pair of items.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Whether two content items refer to the same entity.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CorefValue {
  /// The two items are not coreferent.
  Negative,
  /// It is unknown whether the two items are coreferent.
  Unknown,
  /// The two items are coreferent.
  Positive,
}

impl CorefValue {
  pub fn as_i64(self) -> i64 {
    match self {
      Self::Negative => -1,
      Self::Unknown => 0,
      Self::Positive => 1,
    }
  }

  /// Short operator used when rendering a label for humans.
  pub fn symbol(self) -> &'static str {
    match self {
      Self::Negative => "!=",
      Self::Unknown => "??",
      Self::Positive => "==",
    }
  }
}

impl TryFrom<i64> for CorefValue {
  type Error = Error;

  fn try_from(raw: i64) -> Result<Self> {
    match raw {
      -1 => Ok(Self::Negative),
      0 => Ok(Self::Unknown),
      1 => Ok(Self::Positive),
      other => Err(Error::InvalidValue(other)),
    }
  }
}

impl From<CorefValue> for i64 {
  fn from(v: CorefValue) -> Self { v.as_i64() }
}

impl fmt::Display for CorefValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_i64())
  }
}

/// Accepts either the integer form (`-1`, `0`, `1`) or the variant name.
impl FromStr for CorefValue {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    if let Ok(raw) = s.parse::<i64>() {
      return Self::try_from(raw);
    }
    match s.to_ascii_lowercase().as_str() {
      "negative" => Ok(Self::Negative),
      "unknown" => Ok(Self::Unknown),
      "positive" => Ok(Self::Positive),
      _ => Err(Error::UnrecognizedValue(s.to_owned())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_integers_map_to_variants() {
    assert_eq!(CorefValue::try_from(-1).unwrap(), CorefValue::Negative);
    assert_eq!(CorefValue::try_from(0).unwrap(), CorefValue::Unknown);
    assert_eq!(CorefValue::try_from(1).unwrap(), CorefValue::Positive);
  }

  #[test]
  fn out_of_range_integer_is_invalid() {
    let err = CorefValue::try_from(2).unwrap_err();
    assert!(matches!(err, Error::InvalidValue(2)));
  }

  #[test]
  fn parses_names_and_integers() {
    assert_eq!("-1".parse::<CorefValue>().unwrap(), CorefValue::Negative);
    assert_eq!("Positive".parse::<CorefValue>().unwrap(), CorefValue::Positive);
    assert!(matches!(
      "7".parse::<CorefValue>(),
      Err(Error::InvalidValue(7))
    ));
    assert!("maybe".parse::<CorefValue>().is_err());
  }

  #[test]
  fn display_is_the_integer() {
    assert_eq!(CorefValue::Negative.to_string(), "-1");
    assert_eq!(CorefValue::Positive.symbol(), "==");
  }

  #[test]
  fn serialises_as_lowercase_name() {
    let json = serde_json::to_string(&CorefValue::Unknown).unwrap();
    assert_eq!(json, "\"unknown\"");
  }
}
