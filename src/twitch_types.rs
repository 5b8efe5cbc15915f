use serde::{de, Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Country code of one of the Twitch follow graphs.
#[derive(Hash, Ord, PartialOrd, Eq, PartialEq, Debug, Copy, Clone)]
pub enum Country {
  Ptbr,
  De,
  Engb,
  Es,
  Fr,
  Ru,
}

impl Country {
  pub const ALL: [Country; 6] = [
    Country::Ptbr,
    Country::De,
    Country::Engb,
    Country::Es,
    Country::Fr,
    Country::Ru,
  ];

  pub fn code(self) -> &'static str {
    match self {
      Self::Ptbr => "PTBR",
      Self::De => "DE",
      Self::Engb => "ENGB",
      Self::Es => "ES",
      Self::Fr => "FR",
      Self::Ru => "RU",
    }
  }
}

impl fmt::Display for Country {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

impl FromStr for Country {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    Self::ALL
      .iter()
      .cloned()
      .find(|country| country.code().eq_ignore_ascii_case(s))
      .ok_or_else(|| {
        anyhow::anyhow!(
          "unknown country code \"{}\" (expected one of {})",
          s,
          itertools::join(Self::ALL.iter(), ", ")
        )
      })
  }
}

#[derive(Hash, Ord, PartialOrd, Eq, PartialEq, Debug, Copy, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcasterType {
  Partner,
  Affiliate,
  AccountDeleted,
  NonStreamer,
}

impl BroadcasterType {
  pub const ALL: [BroadcasterType; 4] = [
    BroadcasterType::Partner,
    BroadcasterType::Affiliate,
    BroadcasterType::AccountDeleted,
    BroadcasterType::NonStreamer,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::Partner => "partner",
      Self::Affiliate => "affiliate",
      Self::AccountDeleted => "account_deleted",
      Self::NonStreamer => "non_streamer",
    }
  }
}

impl Default for BroadcasterType {
  fn default() -> Self {
    Self::NonStreamer
  }
}

impl fmt::Display for BroadcasterType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for BroadcasterType {
  type Err = anyhow::Error;

  /// Case insensitive, the raw exports mix `account_Deleted` and
  /// `account_deleted`. Regular accounts have an empty type.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if s.is_empty() {
      return Ok(Self::NonStreamer);
    }
    Self::ALL
      .iter()
      .cloned()
      .find(|t| t.name().eq_ignore_ascii_case(s))
      .ok_or_else(|| anyhow::anyhow!("unknown broadcaster type \"{}\"", s))
  }
}

impl<'de> Deserialize<'de> for BroadcasterType {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
  }
}

/// Attributes of a node listed in the target table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeAttributes {
  pub views: u64,
  pub partner: bool,
  pub mature: bool,
  pub days: u64,
  pub broadcaster_type: BroadcasterType,
  pub game_name: Option<String>,
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn country_codes() {
    for &country in &Country::ALL {
      assert_eq!(country.code().parse::<Country>().unwrap(), country);
      assert_eq!(country.to_string(), country.code());
    }
    assert_eq!("ptbr".parse::<Country>().unwrap(), Country::Ptbr);
    assert!("US".parse::<Country>().is_err());
  }

  #[test]
  fn broadcaster_type_is_case_insensitive() {
    assert_eq!(
      "account_Deleted".parse::<BroadcasterType>().unwrap(),
      BroadcasterType::AccountDeleted
    );
    assert_eq!(
      "non_Streamer".parse::<BroadcasterType>().unwrap(),
      BroadcasterType::NonStreamer
    );
    assert_eq!(
      "".parse::<BroadcasterType>().unwrap(),
      BroadcasterType::NonStreamer
    );
    assert_eq!(
      "Partner".parse::<BroadcasterType>().unwrap(),
      BroadcasterType::Partner
    );
    assert!("streamer".parse::<BroadcasterType>().is_err());
  }
}
